//! Console rendering of a forest

use std::io::{self, Write};
use std::slice;

use crate::codec::CompactIdCodec;
use crate::config::OutputConfig;
use crate::error::TreeError;
use crate::tree::{CategoryNode, Forest};

/// Indented outline printer:
///
/// ```text
/// - Electronics
///   - Computers
///     - Laptops
/// - Clothing
/// ```
#[derive(Debug, Clone)]
pub struct TreePrinter {
    indent: usize,
    ids: Option<CompactIdCodec>,
}

impl Default for TreePrinter {
    fn default() -> Self {
        Self::new(2)
    }
}

impl TreePrinter {
    pub fn new(indent: usize) -> Self {
        Self { indent, ids: None }
    }

    pub fn from_config(output: &OutputConfig, codec: CompactIdCodec) -> Self {
        let printer = Self::new(output.indent);
        if output.show_ids {
            printer.with_ids(codec)
        } else {
            printer
        }
    }

    /// Append each node's compact id after its name
    pub fn with_ids(mut self, codec: CompactIdCodec) -> Self {
        self.ids = Some(codec);
        self
    }

    pub fn write<W: Write>(&self, forest: &Forest, out: &mut W) -> io::Result<()> {
        for line in self.lines(forest) {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }

    pub fn render(&self, forest: &Forest) -> String {
        let mut text = String::new();
        for line in self.lines(forest) {
            text.push_str(&line);
            text.push('\n');
        }
        text
    }

    /// Outline lines in pre-order, without trailing newlines
    fn lines<'a>(&'a self, forest: &'a Forest) -> impl Iterator<Item = String> + 'a {
        let mut stack: Vec<_> = forest.roots().iter().rev().map(|n| (n, 0usize)).collect();
        std::iter::from_fn(move || {
            let (node, level) = stack.pop()?;
            stack.extend(node.children.iter().rev().map(|c| (c, level + 1)));
            Some(self.line(node, level))
        })
    }

    fn line(&self, node: &CategoryNode, level: usize) -> String {
        let pad = level * self.indent;
        match &self.ids {
            Some(codec) => format!("{:pad$}- {} [{}]", "", node.name, codec.encode(node.id)),
            None => format!("{:pad$}- {}", "", node.name),
        }
    }
}

/// An open JSON array: the nodes still to write and whether one was written
struct JsonArray<'a> {
    pending: slice::Iter<'a, CategoryNode>,
    started: bool,
}

/// Compact JSON on one line: an array of `{"id", "name", "children"}`
/// objects, with `children` left out on leaves.
///
/// Nesting is tracked on an explicit stack so arbitrarily deep chains are
/// written without recursion.
pub fn write_json<W: Write>(forest: &Forest, out: &mut W) -> Result<(), TreeError> {
    out.write_all(b"[")?;
    let mut stack = vec![JsonArray {
        pending: forest.roots().iter(),
        started: false,
    }];

    while let Some(array) = stack.last_mut() {
        let Some(node) = array.pending.next() else {
            stack.pop();
            out.write_all(b"]")?;
            if !stack.is_empty() {
                // Closes the object that owns this children array
                out.write_all(b"}")?;
            }
            continue;
        };

        if array.started {
            out.write_all(b",")?;
        }
        array.started = true;

        write!(out, "{{\"id\":\"{}\",\"name\":", node.id)?;
        serde_json::to_writer(&mut *out, &node.name)?;
        if node.children.is_empty() {
            out.write_all(b"}")?;
        } else {
            out.write_all(b",\"children\":[")?;
            stack.push(JsonArray {
                pending: node.children.iter(),
                started: false,
            });
        }
    }

    writeln!(out)?;
    Ok(())
}
