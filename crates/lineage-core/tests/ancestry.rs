use lineage_core::graph::Graph;
use lineage_core::node::{Node, State};
use std::io::Cursor;

fn graph_from_csv(csv: &str) -> Graph {
    let mut graph = Graph::new();
    graph.load_relationships(Cursor::new(csv)).unwrap();
    graph
}

#[test]
fn test_node_without_parents_yields_itself() {
    let mut graph = Graph::new();
    graph
        .load_models(Cursor::new(
            "info:fedora/root:1,info:fedora/islandora:collectionCModel,info:fedora/fedora-system:def/model#Active\n",
        ))
        .unwrap();

    let lineages = graph.ancestries_of("root:1").unwrap();
    assert_eq!(lineages.len(), 1);
    assert_eq!(lineages[0].len(), 1);
    assert_eq!(lineages[0].target().unwrap().pid, "root:1");
    assert_eq!(lineages[0].root().unwrap().pid, "root:1");
}

#[test]
fn test_two_parents_yield_two_lineages() {
    let mut graph = graph_from_csv("a:1,b:1\na:1,c:1\n");

    let lineages = graph.ancestries_of("a:1").unwrap();
    let pids: Vec<Vec<&str>> = lineages.iter().map(|l| l.pids()).collect();
    assert_eq!(pids, vec![vec!["b:1", "a:1"], vec!["c:1", "a:1"]]);
}

#[test]
fn test_two_node_cycle_terminates_with_loop_marker() {
    let mut graph = graph_from_csv("x:1,y:1\ny:1,x:1\n");

    let lineages = graph.ancestries_of("x:1").unwrap();
    assert_eq!(lineages.len(), 1);
    let lineage = &lineages[0];
    assert_eq!(lineage.pids(), vec!["x:1", "y:1", "x:1"]);
    assert_eq!(lineage.root().unwrap().state, Some(State::Loop));
    assert_eq!(lineage.target().unwrap().pid, "x:1");
    assert!(lineage.has_loop());
    // The loop marker is not inserted into the graph
    assert_eq!(graph.lookup("x:1").unwrap().state, Some(State::Missing));
}

#[test]
fn test_self_parent() {
    let mut graph = graph_from_csv("x:1,x:1\n");
    let lineages = graph.ancestries_of("x:1").unwrap();
    assert_eq!(lineages.len(), 1);
    assert_eq!(lineages[0].pids(), vec!["x:1", "x:1"]);
    assert!(lineages[0].root().unwrap().is_loop());
}

#[test]
fn test_diamond_enumerates_every_path() {
    // page -> {book:1, book:2} -> coll
    let mut graph = graph_from_csv(
        "\
info:fedora/page:1,info:fedora/book:1
info:fedora/page:1,info:fedora/book:2
info:fedora/book:1,info:fedora/coll:1
info:fedora/book:2,info:fedora/coll:1
",
    );

    let lineages = graph.ancestries_of("page:1").unwrap();
    let pids: Vec<Vec<&str>> = lineages.iter().map(|l| l.pids()).collect();
    assert_eq!(
        pids,
        vec![
            vec!["coll:1", "book:1", "page:1"],
            vec!["coll:1", "book:2", "page:1"],
        ]
    );
}

#[test]
fn test_missing_ancestor_ends_branch() {
    let mut graph = Graph::new();
    graph
        .load_relationships(Cursor::new("info:fedora/page:1,info:fedora/book:1\n"))
        .unwrap();
    graph
        .load_models(Cursor::new(
            "info:fedora/page:1,info:fedora/islandora:pageCModel,info:fedora/fedora-system:def/model#Active\n",
        ))
        .unwrap();

    let lineages = graph.ancestries_of("page:1").unwrap();
    assert_eq!(lineages.len(), 1);
    assert!(lineages[0].has_missing());
    assert!(lineages[0].root().unwrap().is_missing());
    assert_eq!(graph.node_count(), 2);
}

#[test]
fn test_ancestries_of_detached_node() {
    // A node that is not in the graph can still be walked
    let mut graph = graph_from_csv("b:1,c:1\n");
    let mut probe = Node::new("info:fedora/probe:1", None, Vec::new());
    probe.add_parent("b:1");

    let lineages = graph.ancestries(&probe);
    assert_eq!(lineages.len(), 1);
    assert_eq!(lineages[0].pids(), vec!["c:1", "b:1", "probe:1"]);
    assert!(graph.lookup("probe:1").is_none());
}

#[test]
fn test_lineages_serialize_root_first() {
    let mut graph = graph_from_csv("a:1,b:1\n");
    let lineages = graph.ancestries_of("a:1").unwrap();
    let json = serde_json::to_value(&lineages).unwrap();
    assert_eq!(json[0][0]["pid"], "b:1");
    assert_eq!(json[0][0]["state"], "missing");
    assert_eq!(json[0][1]["pid"], "a:1");
}
