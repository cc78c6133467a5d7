use pagegraph_core::{PageGraph, SchemaConverter};
use serde_json::json;
use std::collections::BTreeSet;

fn empty_graph() -> PageGraph {
    PageGraph::from_value(
        json!({"version": 2, "pages": {}, "labels": {}, "notes": []}),
        &SchemaConverter,
    )
    .unwrap()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Members listed by the index equal the pages that carry the label.
fn assert_label_symmetry(graph: &PageGraph, urls: &[&str]) {
    for label in graph.labels() {
        let indexed: BTreeSet<&str> = graph.get_label(label).iter().map(String::as_str).collect();
        let carried: BTreeSet<&str> = urls
            .iter()
            .copied()
            .filter(|url| graph.get_page(url).has_label(label))
            .collect();
        assert_eq!(indexed, carried, "label `{label}` out of sync");
    }
    graph.verify_integrity().unwrap();
}

#[test]
fn add_label_updates_page_and_index() {
    let mut graph = empty_graph();
    graph.add_label("A", "Red");

    assert_eq!(graph.get_label("Red"), strings(&["A"]));
    assert_eq!(graph.get_page("A").labels(), strings(&["Red"]));
}

#[test]
fn rem_label_clears_page_and_index() {
    let mut graph = empty_graph();
    graph.add_label("A", "Red");
    graph.rem_label("A", "Red");

    assert!(graph.get_label("Red").is_empty());
    assert!(graph.get_page("A").labels().is_empty());
    assert_eq!(graph.labels().collect::<Vec<_>>(), vec!["Red"]);
}

#[test]
fn delete_label_removes_it_from_every_carrier() {
    let mut graph = empty_graph();
    graph.add_label("A", "Red");
    graph.add_label("B", "Red");
    graph.add_label("B", "Blue");

    graph.delete_label("Red");

    assert!(graph.get_label("Red").is_empty());
    assert!(!graph.get_page("A").has_label("Red"));
    assert_eq!(graph.get_page("B").labels(), strings(&["Blue"]));
    assert_eq!(graph.labels().collect::<Vec<_>>(), vec!["Blue"]);
    assert_label_symmetry(&graph, &["A", "B"]);
}

#[test]
fn re_adding_a_label_changes_nothing() {
    let mut once = empty_graph();
    once.add_label("A", "Red");

    let mut twice = empty_graph();
    twice.add_label("A", "Red");
    twice.add_label("A", "Red");

    assert_eq!(once, twice);
}

#[test]
fn labels_keep_insertion_order() {
    let mut graph = empty_graph();
    graph.add_label("A", "Zeta");
    graph.add_label("A", "Alpha");
    graph.add_label("C", "Zeta");
    graph.add_label("B", "Zeta");

    assert_eq!(graph.get_page("A").labels(), strings(&["Zeta", "Alpha"]));
    assert_eq!(graph.get_label("Zeta"), strings(&["A", "C", "B"]));

    graph.rem_label("C", "Zeta");
    assert_eq!(graph.get_label("Zeta"), strings(&["A", "B"]));
    assert_label_symmetry(&graph, &["A", "B", "C"]);
}

#[test]
fn label_names_keep_first_added_order() {
    let mut graph = empty_graph();
    graph.add_label("A", "Zeta");
    graph.add_label("A", "Alpha");
    graph.add_label("B", "Mid");
    graph.rem_label("A", "Zeta");

    assert_eq!(graph.labels().collect::<Vec<_>>(), vec!["Zeta", "Alpha", "Mid"]);

    let text = graph.to_json_string().unwrap();
    assert!(text.contains(r#""labels":{"Zeta":[],"Alpha":["A"],"Mid":["B"]}"#));

    let reloaded = PageGraph::from_json(&text, &SchemaConverter).unwrap();
    assert_eq!(reloaded.labels().collect::<Vec<_>>(), vec!["Zeta", "Alpha", "Mid"]);
    assert_eq!(reloaded.to_json_string().unwrap(), text);
}

#[test]
fn no_op_label_mutations_leave_state_untouched() {
    let mut graph = empty_graph();
    graph.add_label("A", "Red");
    let before = graph.clone();

    graph.add_label("A", "");
    graph.rem_label("A", "");
    graph.rem_label("unknown", "Red");
    graph.rem_label("A", "Blue");
    graph.delete_label("Blue");

    assert_eq!(graph, before);
}

#[test]
fn add_label_creates_unknown_pages() {
    let mut graph = empty_graph();
    graph.add_label("fresh", "Red");

    assert!(graph.contains_page("fresh"));
    assert_eq!(graph.get_page("fresh").display().as_text(), "fresh");
}

#[test]
fn scripted_label_workload_keeps_index_symmetric() {
    let urls = ["a", "b", "c", "d"];
    let labels = ["red", "green", "blue"];
    let mut graph = empty_graph();

    for step in 0..60_usize {
        let url = urls[step % urls.len()];
        let label = labels[(step / 2) % labels.len()];
        match step % 5 {
            0 | 1 | 2 => graph.add_label(url, label),
            3 => graph.rem_label(url, label),
            _ => {
                if step % 20 == 4 {
                    graph.delete_label(label);
                } else {
                    graph.add_label(url, label);
                }
            }
        }
        assert_label_symmetry(&graph, &urls);
    }
}
