//! Flat record list to forest materialization
//!
//! [`build_forest`] turns an unordered slice of [`CategoryRecord`]s into a
//! [`Forest`] of owned [`CategoryNode`]s:
//!
//! ```text
//! Electronics (parent: -)          - Electronics
//! Laptops     (parent: Computers)     - Computers
//! Computers   (parent: Electronics)     - Laptops
//! ```
//!
//! ## Policies
//!
//! - Siblings keep the relative order they had in the input. No sorting.
//! - A `parent_id` that matches no record makes that record a root and is
//!   reported as [`HierarchyAnomaly::DanglingParent`].
//! - A repeated id keeps its first occurrence; later ones are skipped and
//!   reported as [`HierarchyAnomaly::DuplicateId`].
//! - Parent links that close a loop are cut and reported as
//!   [`HierarchyAnomaly::Cycle`]. Loops with no natural root are entered at
//!   their earliest input record, which is appended after the natural roots.
//!
//! Expansion runs on an explicit work stack, so input depth never turns into
//! call-stack depth.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::slice;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::record::CategoryRecord;

/// A materialized category with its children in input order
///
/// `Clone`, `PartialEq`, `Debug` and `Drop` are written out by hand so that
/// none of them recurse once per level.
pub struct CategoryNode {
    pub id: Uuid,
    pub name: String,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    pub fn leaf(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Nodes in this subtree, including `self`
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Levels in this subtree; a leaf has depth 1
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children.iter().map(|c| (c, depth + 1)));
        }
        deepest
    }

    /// Pre-order traversal of this subtree
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }
}

/// A node being cloned, with the children still to copy
struct CloneFrame<'a> {
    source: &'a CategoryNode,
    pending: slice::Iter<'a, CategoryNode>,
    children: Vec<CategoryNode>,
}

impl<'a> CloneFrame<'a> {
    fn new(source: &'a CategoryNode) -> Self {
        Self {
            source,
            pending: source.children.iter(),
            children: Vec::with_capacity(source.children.len()),
        }
    }

    fn finish(self) -> CategoryNode {
        CategoryNode {
            id: self.source.id,
            name: self.source.name.clone(),
            children: self.children,
        }
    }
}

impl Clone for CategoryNode {
    fn clone(&self) -> Self {
        let mut root = CloneFrame::new(self);
        let mut stack: Vec<CloneFrame<'_>> = Vec::new();
        loop {
            let top = stack.last_mut().unwrap_or(&mut root);
            if let Some(child) = top.pending.next() {
                stack.push(CloneFrame::new(child));
                continue;
            }
            match stack.pop() {
                Some(done) => {
                    let node = done.finish();
                    stack.last_mut().unwrap_or(&mut root).children.push(node);
                }
                None => return root.finish(),
            }
        }
    }
}

impl PartialEq for CategoryNode {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if a.id != b.id || a.name != b.name || a.children.len() != b.children.len() {
                return false;
            }
            stack.extend(a.children.iter().zip(&b.children));
        }
        true
    }
}

impl Eq for CategoryNode {}

impl fmt::Debug for CategoryNode {
    // Direct children only; walk the subtree with `iter` for more.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let children: Vec<&str> = self.children.iter().map(|c| c.name.as_str()).collect();
        f.debug_struct("CategoryNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("children", &children)
            .finish()
    }
}

impl Drop for CategoryNode {
    // Flatten before dropping so long chains do not recurse once per level.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Ordered root nodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
    roots: Vec<CategoryNode>,
}

impl Forest {
    pub fn new(roots: Vec<CategoryNode>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[CategoryNode] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<CategoryNode> {
        self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of root nodes
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Total nodes across every tree
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    pub fn max_depth(&self) -> usize {
        self.roots.iter().map(CategoryNode::depth).max().unwrap_or(0)
    }

    /// Pre-order traversal over all trees, roots in order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: self.roots.iter().rev().collect(),
        }
    }

    pub fn find(&self, id: Uuid) -> Option<&CategoryNode> {
        self.iter().find(|node| node.id == id)
    }
}

impl<'a> IntoIterator for &'a Forest {
    type Item = &'a CategoryNode;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Pre-order node iterator
pub struct Iter<'a> {
    stack: Vec<&'a CategoryNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a CategoryNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// A parent link that was cut because it closed a loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CycleBreak {
    /// Record whose parent link was dropped
    pub id: Uuid,
    /// The parent it pointed at, itself a descendant of `id`
    pub parent_id: Uuid,
}

/// Irregularities found while building; none of them abort the build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HierarchyAnomaly {
    /// `parent_id` matched no record, so `id` was made a root
    DanglingParent { id: Uuid, parent_id: Uuid },
    /// The ancestor chain of `id` looped back onto itself
    Cycle(CycleBreak),
    /// A later record reused an id; it was skipped
    DuplicateId { id: Uuid },
}

impl fmt::Display for HierarchyAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HierarchyAnomaly::DanglingParent { id, parent_id } => {
                write!(f, "{} references missing parent {}, treated as root", id, parent_id)
            }
            HierarchyAnomaly::Cycle(cycle) => {
                write!(f, "{} -> {} closes a parent cycle, link cut", cycle.id, cycle.parent_id)
            }
            HierarchyAnomaly::DuplicateId { id } => {
                write!(f, "{} appears more than once, later record skipped", id)
            }
        }
    }
}

/// The input encoded at least one parent-id cycle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed hierarchy: {} parent cycle(s), first at {}", .cycles.len(), first_cycle(.cycles))]
pub struct MalformedHierarchyError {
    pub cycles: Vec<CycleBreak>,
}

fn first_cycle(cycles: &[CycleBreak]) -> String {
    cycles
        .first()
        .map(|c| c.id.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Result of [`build_forest`]: the forest plus everything worth reporting
#[derive(Debug, Clone, Default)]
pub struct ForestBuild {
    pub forest: Forest,
    pub anomalies: Vec<HierarchyAnomaly>,
}

impl ForestBuild {
    /// True when no cycle was detected. Dangling parents and duplicates do
    /// not count against well-formedness.
    pub fn is_well_formed(&self) -> bool {
        self.cycles().next().is_none()
    }

    pub fn cycles(&self) -> impl Iterator<Item = &CycleBreak> {
        self.anomalies.iter().filter_map(|a| match a {
            HierarchyAnomaly::Cycle(cycle) => Some(cycle),
            _ => None,
        })
    }

    pub fn dangling_parents(&self) -> impl Iterator<Item = (Uuid, Uuid)> + '_ {
        self.anomalies.iter().filter_map(|a| match a {
            HierarchyAnomaly::DanglingParent { id, parent_id } => Some((*id, *parent_id)),
            _ => None,
        })
    }

    /// Fail with every cut cycle if the build is not well formed
    pub fn check_well_formed(&self) -> Result<(), MalformedHierarchyError> {
        let cycles: Vec<CycleBreak> = self.cycles().copied().collect();
        if cycles.is_empty() {
            Ok(())
        } else {
            Err(MalformedHierarchyError { cycles })
        }
    }

    /// Reject the build if any cycle was found
    pub fn into_strict(self) -> Result<Forest, MalformedHierarchyError> {
        self.check_well_formed()?;
        Ok(self.forest)
    }
}

/// Materialize `records` into a forest.
///
/// Runs in O(N): one pass to index ids, one to group by parent, and each
/// record is expanded at most once.
pub fn build_forest(records: &[CategoryRecord]) -> ForestBuild {
    let mut anomalies = Vec::new();

    let mut index_of: HashMap<Uuid, usize> = HashMap::with_capacity(records.len());
    let mut accepted = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        match index_of.entry(record.id) {
            Entry::Occupied(_) => anomalies.push(HierarchyAnomaly::DuplicateId { id: record.id }),
            Entry::Vacant(slot) => {
                slot.insert(i);
                accepted.push(i);
            }
        }
    }

    let mut children_of: HashMap<Uuid, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();
    for &i in &accepted {
        let record = &records[i];
        match record.parent_id {
            Some(parent_id) if index_of.contains_key(&parent_id) => {
                children_of.entry(parent_id).or_default().push(i);
            }
            Some(parent_id) => {
                anomalies.push(HierarchyAnomaly::DanglingParent {
                    id: record.id,
                    parent_id,
                });
                roots.push(i);
            }
            None => roots.push(i),
        }
    }

    let mut expander = Expander {
        records,
        children_of: &children_of,
        visited: vec![false; records.len()],
        on_path: HashSet::new(),
        anomalies,
    };

    let mut trees = Vec::with_capacity(roots.len());
    for &root in &roots {
        expander.expand(root, &mut trees);
    }

    // Anything still unvisited sits on, or hangs below, a loop with no root.
    for &i in &accepted {
        if !expander.visited[i] {
            let entry = loop_entry(records, &index_of, i);
            expander.expand(entry, &mut trees);
        }
    }

    ForestBuild {
        forest: Forest::new(trees),
        anomalies: expander.anomalies,
    }
}

/// Follow parent links from `start` until an index repeats, then return the
/// loop member that comes first in the input.
///
/// Every record reached here has an unvisited parent: a visited parent would
/// already have expanded it.
fn loop_entry(records: &[CategoryRecord], index_of: &HashMap<Uuid, usize>, start: usize) -> usize {
    let mut position: HashMap<usize, usize> = HashMap::new();
    let mut trail = Vec::new();
    let mut current = start;
    loop {
        if let Some(&pos) = position.get(&current) {
            return trail[pos..].iter().copied().min().unwrap_or(current);
        }
        position.insert(current, trail.len());
        trail.push(current);

        match records[current].parent_id.and_then(|p| index_of.get(&p)) {
            Some(&parent) => current = parent,
            None => return current,
        }
    }
}

struct Frame<'r> {
    index: usize,
    children: Vec<CategoryNode>,
    pending: slice::Iter<'r, usize>,
}

struct Expander<'r> {
    records: &'r [CategoryRecord],
    children_of: &'r HashMap<Uuid, Vec<usize>>,
    visited: Vec<bool>,
    /// Ids on the current root-to-frame path
    on_path: HashSet<Uuid>,
    anomalies: Vec<HierarchyAnomaly>,
}

impl<'r> Expander<'r> {
    fn expand(&mut self, root: usize, out: &mut Vec<CategoryNode>) {
        let records = self.records;
        let mut stack = vec![self.enter(root)];

        while let Some(frame) = stack.last_mut() {
            match frame.pending.next() {
                Some(&next) => {
                    let child = &records[next];
                    if self.on_path.contains(&child.id) {
                        self.anomalies.push(HierarchyAnomaly::Cycle(CycleBreak {
                            id: child.id,
                            parent_id: records[frame.index].id,
                        }));
                    } else {
                        let entered = self.enter(next);
                        stack.push(entered);
                    }
                }
                None => {
                    let Some(done) = stack.pop() else { break };
                    let node = self.leave(done);
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => out.push(node),
                    }
                }
            }
        }
    }

    fn enter(&mut self, index: usize) -> Frame<'r> {
        let children_of = self.children_of;
        let id = self.records[index].id;
        self.visited[index] = true;
        self.on_path.insert(id);

        let pending: &'r [usize] = children_of.get(&id).map(Vec::as_slice).unwrap_or(&[]);
        Frame {
            index,
            children: Vec::with_capacity(pending.len()),
            pending: pending.iter(),
        }
    }

    fn leave(&mut self, frame: Frame<'r>) -> CategoryNode {
        let record = &self.records[frame.index];
        self.on_path.remove(&record.id);
        CategoryNode {
            id: record.id,
            name: record.name.clone(),
            children: frame.children,
        }
    }
}
