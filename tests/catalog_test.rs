//! Tree building over the bundled sample catalog

use std::path::PathBuf;

use category_tree::{
    build_forest, CategoryRecord, JsonFileSource, RecordSource, TreePrinter, TreeService,
};

fn catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/categories.json")
}

fn catalog() -> Vec<CategoryRecord> {
    JsonFileSource::new(catalog_path()).fetch_all().expect("bundled catalog parses")
}

#[test]
fn test_catalog_shape() {
    let records = catalog();
    assert_eq!(records.len(), 17);

    let build = build_forest(&records);
    assert!(build.anomalies.is_empty());
    assert_eq!(build.forest.node_count(), records.len());
    assert_eq!(build.forest.len(), 2);
    // Electronics -> Phones -> Smartphones -> Android -> Flagships
    assert_eq!(build.forest.max_depth(), 5);
}

#[test]
fn test_catalog_outline() {
    let build = build_forest(&catalog());
    let expected = "\
- Electronics
  - Computers
    - Laptops
      - Gaming Laptops
      - Ultrabooks
    - Desktops
  - Phones
    - Smartphones
      - Android
        - Flagships
        - Budget
      - iOS
- Clothing
  - Men's
    - Shirts
      - Casual Shirts
      - Formal Shirts
";
    assert_eq!(TreePrinter::default().render(&build.forest), expected);
}

#[test]
fn test_catalog_order_independent_structure() {
    let records = catalog();
    let mut reversed = records.clone();
    reversed.reverse();

    let forward = build_forest(&records);
    let backward = build_forest(&reversed);
    assert!(backward.anomalies.is_empty());
    assert_eq!(backward.forest.node_count(), forward.forest.node_count());
    assert_eq!(backward.forest.max_depth(), forward.forest.max_depth());

    // Same parent for every node, siblings in reversed order
    let roots: Vec<&str> = backward.forest.roots().iter().map(|n| n.name.as_str()).collect();
    assert_eq!(roots, ["Clothing", "Electronics"]);
    for record in &records {
        let node = backward.forest.find(record.id).expect("every record materialized");
        let mut child_ids: Vec<_> = node.children.iter().map(|c| c.id).collect();
        child_ids.reverse();
        let expected: Vec<_> = forward
            .forest
            .find(record.id)
            .unwrap()
            .children
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(child_ids, expected);
    }
}

#[test]
fn test_catalog_with_injected_cycle() {
    let mut records = catalog();
    // Re-parent Electronics under Flagships, its own descendant
    let flagships = records.iter().find(|r| r.name == "Flagships").unwrap().id;
    records[0].parent_id = Some(flagships);

    let build = build_forest(&records);
    assert_eq!(build.forest.node_count(), records.len());
    assert_eq!(build.cycles().count(), 1);
    assert!(!build.is_well_formed());

    // Clothing is untouched and now the only natural root
    assert_eq!(build.forest.roots()[0].name, "Clothing");
    assert_eq!(build.forest.roots()[0].node_count(), 5);
}

#[test]
fn test_service_over_catalog_file() {
    let timed = TreeService::new(JsonFileSource::new(catalog_path()))
        .strict(true)
        .build_tree()
        .unwrap();
    assert_eq!(timed.record_count, 17);
    assert_eq!(timed.build.forest.node_count(), 17);
}
