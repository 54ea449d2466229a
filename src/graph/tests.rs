use super::*;

fn graph_with(units: &[&str]) -> UnitGraph {
    let mut graph = UnitGraph::new();
    for unit in units {
        graph.add_unit(unit);
    }
    graph
}

fn sorted(mut ids: Vec<String>) -> Vec<String> {
    ids.sort();
    ids
}

#[test]
fn test_add_unit_is_idempotent() {
    let mut graph = UnitGraph::new();

    assert!(graph.add_unit("a"));
    assert!(!graph.add_unit("a"));
    assert_eq!(graph.unit_count(), 1);
    assert!(graph.has_unit("a"));
}

#[test]
fn test_add_connection_sets_parent_and_children() {
    let mut graph = graph_with(&["a", "b"]);

    let previous = graph.add_connection("c1", "a", "b").unwrap();

    assert_eq!(previous, None);
    assert!(graph.has_connection("c1"));
    assert_eq!(graph.unit("a").unwrap().children(), &["b".to_string()]);
    assert_eq!(graph.unit("b").unwrap().parent(), Some("a"));
    assert!(graph.is_group_root("a"));
    assert!(!graph.is_group_root("b"));
}

#[test]
fn test_add_connection_with_unknown_endpoint_leaves_graph_unchanged() {
    let mut graph = graph_with(&["a"]);

    let result = graph.add_connection("c1", "a", "ghost");

    assert_eq!(result, Err(GraphError::UnknownUnit("ghost".to_string())));
    assert!(!graph.has_connection("c1"));
    assert!(!graph.unit("a").unwrap().has_children());

    let result = graph.add_connection("c2", "ghost", "a");
    assert_eq!(result, Err(GraphError::UnknownUnit("ghost".to_string())));
    assert!(!graph.unit("a").unwrap().has_parent());
}

#[test]
fn test_self_connection_is_rejected() {
    let mut graph = graph_with(&["a"]);

    let result = graph.add_connection("c1", "a", "a");

    assert!(matches!(result, Err(GraphError::CycleDetected { .. })));
    assert_eq!(graph.connection_count(), 0);
}

#[test]
fn test_cycle_is_rejected() {
    let mut graph = graph_with(&["a", "b", "c"]);
    graph.add_connection("c1", "a", "b").unwrap();
    graph.add_connection("c2", "b", "c").unwrap();

    // c -> a would close a -> b -> c -> a
    let result = graph.add_connection("c3", "c", "a");

    assert_eq!(
        result,
        Err(GraphError::CycleDetected {
            parent: "c".to_string(),
            child: "a".to_string()
        })
    );
    assert!(!graph.has_connection("c3"));
    assert!(!graph.unit("a").unwrap().has_parent());
    assert_eq!(sorted(graph.descendants_of("a")), vec!["b", "c"]);
}

#[test]
fn test_descendants_of_returns_transitive_closure() {
    let mut graph = graph_with(&["root", "b", "c", "d", "e", "lonely"]);
    graph.add_connection("c1", "root", "b").unwrap();
    graph.add_connection("c2", "root", "c").unwrap();
    graph.add_connection("c3", "b", "d").unwrap();
    graph.add_connection("c4", "d", "e").unwrap();

    let descendants = graph.descendants_of("root");

    // Direct children first, then each subtree
    assert_eq!(descendants, vec!["b", "c", "d", "e"]);
    assert_eq!(graph.descendants_of("d"), vec!["e"]);
    assert!(graph.descendants_of("lonely").is_empty());
    assert!(graph.descendants_of("unknown").is_empty());
}

#[test]
fn test_remove_connection_clears_edge() {
    let mut graph = graph_with(&["a", "b", "c"]);
    graph.add_connection("c1", "a", "b").unwrap();
    graph.add_connection("c2", "b", "c").unwrap();

    let edge = graph.remove_connection("c1").unwrap();

    assert_eq!(edge.parent, "a");
    assert_eq!(edge.child, "b");
    assert!(!graph.has_connection("c1"));
    assert!(!graph.descendants_of("a").contains(&"b".to_string()));
    assert!(!graph.unit("b").unwrap().has_parent());
    assert!(graph.is_group_root("b"));
    assert!(!graph.is_group_root("a"));
}

#[test]
fn test_remove_unknown_connection_fails() {
    let mut graph = graph_with(&["a", "b"]);
    graph.add_connection("c1", "a", "b").unwrap();

    let result = graph.remove_connection("never-added");

    assert_eq!(
        result,
        Err(GraphError::UnknownConnection("never-added".to_string()))
    );
    assert!(graph.has_connection("c1"));
    assert_eq!(graph.descendants_of("a"), vec!["b"]);
}

#[test]
fn test_remove_connection_with_missing_endpoint_still_consumes_record() {
    let mut graph = graph_with(&["a", "b"]);
    graph.add_connection("c1", "a", "b").unwrap();
    graph.remove_unit("b");

    let result = graph.remove_connection("c1");

    assert_eq!(result, Err(GraphError::UnknownUnit("b".to_string())));
    assert!(!graph.has_connection("c1"));
    // The parent keeps its dangling child entry since the edge could not be repaired
    assert_eq!(graph.unit("a").unwrap().children(), &["b".to_string()]);
}

#[test]
fn test_remove_unit_does_not_cascade() {
    let mut graph = graph_with(&["a", "b"]);
    graph.add_connection("c1", "a", "b").unwrap();

    assert!(graph.remove_unit("a").is_some());

    assert!(graph.has_connection("c1"));
    assert_eq!(graph.unit("b").unwrap().parent(), Some("a"));
}

#[test]
fn test_reparenting_moves_child() {
    let mut graph = graph_with(&["a", "b", "child"]);
    graph.add_connection("c1", "a", "child").unwrap();

    let previous = graph.add_connection("c2", "b", "child").unwrap();

    assert_eq!(previous, Some("a".to_string()));
    assert_eq!(graph.unit("child").unwrap().parent(), Some("b"));
    assert!(graph.descendants_of("a").is_empty());
    assert_eq!(graph.descendants_of("b"), vec!["child"]);
    // The superseded connection record is gone
    assert!(!graph.has_connection("c1"));
    assert_eq!(graph.connection_count(), 1);
}

#[test]
fn test_readding_same_connection_is_noop() {
    let mut graph = graph_with(&["a", "b"]);
    graph.add_connection("c1", "a", "b").unwrap();

    assert_eq!(graph.add_connection("c1", "a", "b"), Ok(None));

    assert_eq!(graph.unit("a").unwrap().children().len(), 1);
    assert_eq!(graph.connection_count(), 1);
}

#[test]
fn test_readding_connection_guid_replaces_edge() {
    let mut graph = graph_with(&["a", "b", "c"]);
    graph.add_connection("c1", "a", "b").unwrap();

    graph.add_connection("c1", "a", "c").unwrap();

    assert_eq!(graph.descendants_of("a"), vec!["c"]);
    assert!(!graph.unit("b").unwrap().has_parent());
    assert_eq!(
        graph.connection("c1"),
        Some(&Edge {
            parent: "a".to_string(),
            child: "c".to_string()
        })
    );
}

#[test]
fn test_reversing_connection_guid_is_not_a_cycle() {
    let mut graph = graph_with(&["a", "b"]);
    graph.add_connection("c1", "a", "b").unwrap();

    graph.add_connection("c1", "b", "a").unwrap();

    assert_eq!(graph.descendants_of("b"), vec!["a"]);
    assert!(graph.descendants_of("a").is_empty());
    assert!(graph.is_group_root("b"));
    assert_eq!(graph.connection_count(), 1);
}

#[test]
fn test_replacing_connection_guid_still_rejects_real_cycle() {
    let mut graph = graph_with(&["a", "b", "c", "d"]);
    graph.add_connection("c1", "a", "b").unwrap();
    graph.add_connection("c2", "b", "c").unwrap();
    graph.add_connection("c3", "a", "d").unwrap();

    // Dropping a -> d does not break the chain a -> b -> c
    let result = graph.add_connection("c3", "c", "a");

    assert_eq!(
        result,
        Err(GraphError::CycleDetected {
            parent: "c".to_string(),
            child: "a".to_string()
        })
    );
    assert_eq!(graph.descendants_of("a"), vec!["b", "d", "c"]);
}

#[test]
fn test_descendants_have_no_duplicates() {
    let mut graph = graph_with(&["a", "b", "c", "d"]);
    graph.add_connection("c1", "a", "b").unwrap();
    graph.add_connection("c2", "a", "c").unwrap();
    graph.add_connection("c3", "c", "d").unwrap();
    // Same child under the same parent via a second guid
    graph.add_connection("c4", "a", "b").unwrap();

    let descendants = graph.descendants_of("a");
    let mut deduped = descendants.clone();
    deduped.sort();
    deduped.dedup();

    assert_eq!(descendants.len(), deduped.len());
    assert_eq!(deduped, vec!["b", "c", "d"]);
}
