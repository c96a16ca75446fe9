//! Tests for the taxonomy Navigator state machine

use std::sync::Arc;

use rstest::rstest;

use feelflow::domain::{
    DomainError, EmotionNode, NavEvent, NavInput, NavState, Navigator, Taxonomy,
};
use feelflow::util::testing;

/// A(A1, A2), B
fn two_level() -> Arc<Taxonomy> {
    let json = r#"[
        {"id": "a", "name": "A", "children": [
            {"id": "a1", "name": "A1"},
            {"id": "a2", "name": "A2", "children": []}
        ]},
        {"id": "b", "name": "B"}
    ]"#;
    Arc::new(Taxonomy::from_json(json).unwrap())
}

fn single_root() -> Arc<Taxonomy> {
    Arc::new(Taxonomy::from_json(r#"[{"id": "a", "name": "A"}]"#).unwrap())
}

fn builtin() -> Arc<Taxonomy> {
    Arc::new(Taxonomy::builtin().unwrap())
}

fn names(nodes: &[Arc<EmotionNode>]) -> Vec<&str> {
    nodes.iter().map(|n| n.name.as_str()).collect()
}

// ============================================================
// Concrete walks
// ============================================================

#[test]
fn given_two_level_taxonomy_when_advance_skip_advance_then_a2_pending() {
    testing::init_test_setup();
    let mut nav = Navigator::new(two_level());

    let event = nav.apply(NavInput::Advance).unwrap();
    assert_eq!(event, NavEvent::Descended { depth: 2 });
    let traversal = nav.browsing().unwrap();
    assert_eq!(names(traversal.level()), vec!["A1", "A2"]);
    assert_eq!(names(traversal.path()), vec!["A"]);
    assert_eq!(traversal.cursor(), 0);

    nav.apply(NavInput::Skip).unwrap();
    assert_eq!(nav.browsing().unwrap().current().name, "A2");

    let event = nav.apply(NavInput::Advance).unwrap();
    let pending = match event {
        NavEvent::SelectionPending(pending) => pending,
        other => panic!("expected a pending selection, got {other:?}"),
    };
    assert_eq!(pending.path_names(), vec!["A", "A2"]);
    assert_eq!(pending.leaf().name, "A2");
    assert_eq!(nav.pending(), Some(&pending));
    assert!(nav.browsing().is_none());
}

#[test]
fn given_single_root_when_skip_then_cursor_stays_at_zero() {
    let mut nav = Navigator::new(single_root());

    let event = nav.apply(NavInput::Skip).unwrap();

    assert_eq!(event, NavEvent::Skipped { cursor: 0 });
    assert_eq!(nav.browsing().unwrap().cursor(), 0);
}

#[test]
fn given_single_root_leaf_when_advance_then_pending_immediately() {
    let mut nav = Navigator::new(single_root());

    nav.apply(NavInput::Advance).unwrap();

    let pending = nav.pending().unwrap();
    assert_eq!(pending.path_names(), vec!["A"]);
    assert_eq!(pending.leaf().id, "a");
}

#[test]
fn given_leaf_root_b_when_skip_then_advance_then_path_is_only_b() {
    let mut nav = Navigator::new(two_level());

    nav.apply(NavInput::Skip).unwrap();
    nav.apply(NavInput::Advance).unwrap();

    assert_eq!(nav.pending().unwrap().path_names(), vec!["B"]);
}

// ============================================================
// Invariants
// ============================================================

#[rstest]
#[case(1)]
#[case(7)]
#[case(8)]
#[case(15)]
fn given_root_level_when_skipping_n_times_then_cursor_is_n_mod_len(#[case] n: usize) {
    let taxonomy = builtin();
    let len = taxonomy.roots().len();
    let mut nav = Navigator::new(taxonomy);

    for _ in 0..n {
        nav.apply(NavInput::Skip).unwrap();
    }

    assert_eq!(nav.browsing().unwrap().cursor(), n % len);
}

#[test]
fn given_builtin_taxonomy_when_always_advancing_then_reaches_leaf_within_max_depth() {
    let taxonomy = builtin();
    let max_depth = taxonomy.max_depth();

    for root in 0..taxonomy.roots().len() {
        let mut nav = Navigator::new(Arc::clone(&taxonomy));
        for _ in 0..root {
            nav.apply(NavInput::Skip).unwrap();
        }

        let mut advances = 0;
        while nav.pending().is_none() {
            nav.apply(NavInput::Advance).unwrap();
            advances += 1;
            assert!(advances <= max_depth, "no leaf after {advances} advances");
        }
        let pending = nav.pending().unwrap();
        assert!(pending.leaf().is_leaf());
        assert_eq!(pending.path().len(), advances);
    }
}

/// Sibling index at each level, root first, for every leaf below `nodes`.
fn leaf_index_paths(
    nodes: &[Arc<EmotionNode>],
    prefix: &[usize],
    out: &mut Vec<(Vec<usize>, String)>,
) {
    for (idx, node) in nodes.iter().enumerate() {
        let mut path = prefix.to_vec();
        path.push(idx);
        if node.is_leaf() {
            out.push((path, node.id.clone()));
        } else {
            leaf_index_paths(&node.children, &path, out);
        }
    }
}

#[test]
fn given_builtin_taxonomy_when_walking_to_each_leaf_then_every_leaf_commits() {
    let taxonomy = builtin();
    let mut paths = Vec::new();
    leaf_index_paths(taxonomy.roots(), &[], &mut paths);
    assert_eq!(paths.len(), taxonomy.leaves().len());

    for (indices, leaf_id) in paths {
        let mut nav = Navigator::new(Arc::clone(&taxonomy));
        let mut last = None;
        for &idx in &indices {
            for _ in 0..idx {
                nav.apply(NavInput::Skip).unwrap();
            }
            last = Some(nav.apply(NavInput::Advance).unwrap());
        }

        let pending = match last {
            Some(NavEvent::SelectionPending(pending)) => pending,
            other => panic!("leaf {leaf_id} did not commit: {other:?}"),
        };
        assert_eq!(pending.leaf().id, leaf_id);
        assert_eq!(pending.path().len(), indices.len());
        assert!(matches!(nav.state(), NavState::AwaitingContext { .. }));
    }
}

#[test]
fn given_descents_when_advancing_then_path_grows_by_one_each_time() {
    let mut nav = Navigator::new(builtin());

    nav.apply(NavInput::Advance).unwrap();
    assert_eq!(nav.browsing().unwrap().path().len(), 1);
    nav.apply(NavInput::Skip).unwrap();
    assert_eq!(nav.browsing().unwrap().path().len(), 1);
    nav.apply(NavInput::Advance).unwrap();
    assert_eq!(nav.browsing().unwrap().path().len(), 2);
    assert_eq!(nav.browsing().unwrap().depth(), 3);
}

#[test]
fn given_pending_when_cancel_then_restores_pre_commit_traversal() {
    let mut nav = Navigator::new(two_level());
    nav.apply(NavInput::Advance).unwrap();
    nav.apply(NavInput::Skip).unwrap();
    let before = nav.browsing().unwrap().clone();

    nav.apply(NavInput::Advance).unwrap();
    let event = nav.apply(NavInput::CancelContext).unwrap();

    assert_eq!(event, NavEvent::ContextCancelled);
    assert_eq!(nav.browsing(), Some(&before));
    assert_eq!(nav.browsing().unwrap().current().name, "A2");
}

#[rstest]
#[case::fresh(vec![])]
#[case::after_skip(vec![NavInput::Skip])]
#[case::descended(vec![NavInput::Advance, NavInput::Skip])]
#[case::pending(vec![NavInput::Advance, NavInput::Advance])]
fn given_any_state_when_reset_then_back_at_first_root(#[case] inputs: Vec<NavInput>) {
    let taxonomy = two_level();
    let mut nav = Navigator::new(Arc::clone(&taxonomy));
    for input in inputs {
        nav.apply(input).unwrap();
    }

    let event = nav.apply(NavInput::Reset).unwrap();

    assert_eq!(event, NavEvent::Reset);
    let traversal = nav.browsing().unwrap();
    assert_eq!(traversal.cursor(), 0);
    assert!(traversal.path().is_empty());
    assert_eq!(traversal.level(), taxonomy.roots());
}

// ============================================================
// Rejected inputs
// ============================================================

#[rstest]
#[case(NavInput::Skip)]
#[case(NavInput::Advance)]
fn given_pending_when_browsing_input_then_rejected_without_change(#[case] input: NavInput) {
    let mut nav = Navigator::new(single_root());
    nav.apply(NavInput::Advance).unwrap();
    let before = nav.state().clone();

    let err = nav.apply(input).unwrap_err();

    assert!(matches!(
        err,
        DomainError::InvalidTransition {
            state: "awaiting context",
            ..
        }
    ));
    assert_eq!(nav.state(), &before);
    assert!(matches!(nav.state(), NavState::AwaitingContext { .. }));
}

#[test]
fn given_browsing_when_cancel_context_then_rejected() {
    let mut nav = Navigator::new(two_level());

    let err = nav.apply(NavInput::CancelContext).unwrap_err();

    assert_eq!(
        err,
        DomainError::InvalidTransition {
            input: "cancel",
            state: "browsing",
        }
    );
}
