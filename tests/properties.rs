//! Property tests for the selector codec and the workflow model invariants.
use mechaway_studio::workflow::selector::{parse, serialize};
use mechaway_studio::workflow::{Position, SelectorSegment, Step, Workflow};
use proptest::prelude::*;
use std::collections::HashSet;

fn segment() -> impl Strategy<Value = SelectorSegment> {
    prop_oneof![
        any::<u64>().prop_map(SelectorSegment::Index),
        "[a-zA-Z_][a-zA-Z0-9_-]{0,8}".prop_map(SelectorSegment::Key),
    ]
}

proptest! {
    #[test]
    fn selector_text_round_trips(segments in prop::collection::vec(segment(), 1..6)) {
        let text = serialize(&segments);
        prop_assert_eq!(parse(&text), segments);
    }

    #[test]
    fn parsed_text_is_stable_under_reserialization(text in "\\PC{0,20}") {
        let parsed = parse(&text);
        prop_assert_eq!(parse(&serialize(&parsed)), parsed);
    }

    #[test]
    fn dotted_text_with_blanks_is_stable(
        tokens in prop::collection::vec(prop_oneof!["", " ", " 2", "0", "a b", "x", "\u{3000}"], 0..6),
    ) {
        let parsed = parse(&tokens.join("."));
        prop_assert_eq!(parse(&serialize(&parsed)), parsed);
    }

    #[test]
    fn digit_tokens_become_indices(index in any::<u64>()) {
        prop_assert_eq!(parse(&index.to_string()), vec![SelectorSegment::Index(index)]);
    }
}

#[derive(Debug, Clone)]
enum Op {
    AddStep(u8),
    RemoveStep(u8),
    AddTransition(u8, u8),
    RemoveTransition(u8, u8),
    SetStart(Option<u8>),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u8..6).prop_map(Op::AddStep),
        1 => (0u8..6).prop_map(Op::RemoveStep),
        3 => (0u8..6, 0u8..6).prop_map(|(s, d)| Op::AddTransition(s, d)),
        1 => (0u8..6, 0u8..6).prop_map(|(s, d)| Op::RemoveTransition(s, d)),
        1 => prop::option::of(0u8..6).prop_map(Op::SetStart),
    ]
}

fn uid(n: u8) -> String {
    format!("s{}", n)
}

fn step(n: u8) -> Step {
    Step {
        uid: uid(n),
        name: uid(n),
        app: "Utilities".into(),
        action: "echo".into(),
        position: Position::new(f64::from(n), 0.0),
        ..Step::default()
    }
}

fn assert_consistent(workflow: &Workflow) -> Result<(), TestCaseError> {
    let steps: HashSet<&str> = workflow.steps.iter().map(|s| s.uid.as_str()).collect();
    prop_assert_eq!(steps.len(), workflow.steps.len());

    let mut pairs = HashSet::new();
    let mut uids = HashSet::new();
    for t in &workflow.next_steps {
        prop_assert!(steps.contains(t.source_uid.as_str()));
        prop_assert!(steps.contains(t.destination_uid.as_str()));
        prop_assert!(pairs.insert((t.source_uid.as_str(), t.destination_uid.as_str())));
        prop_assert!(uids.insert(t.uid.as_str()));
    }

    if let Some(start) = workflow.start.as_deref() {
        prop_assert!(steps.contains(start));
    }
    Ok(())
}

proptest! {
    #[test]
    fn model_stays_consistent(ops in prop::collection::vec(op(), 0..40)) {
        let mut workflow = Workflow::new("prop");
        for op in ops {
            match op {
                Op::AddStep(n) => {
                    let _ = workflow.add_step(step(n));
                }
                Op::RemoveStep(n) => {
                    let had_start = workflow.start.as_deref() == Some(uid(n).as_str());
                    if workflow.remove_step(&uid(n)).is_ok() && had_start {
                        prop_assert_eq!(workflow.start.is_some(), !workflow.steps.is_empty());
                    }
                }
                Op::AddTransition(s, d) => {
                    let _ = workflow.add_transition(&uid(s), &uid(d));
                }
                Op::RemoveTransition(s, d) => {
                    workflow.remove_transition(&uid(s), &uid(d));
                }
                Op::SetStart(n) => {
                    let _ = workflow.set_start(n.map(uid).as_deref());
                }
            }
            assert_consistent(&workflow)?;
        }
    }

    #[test]
    fn default_start_is_first_root(
        count in 1u8..6,
        edges in prop::collection::vec((0u8..6, 0u8..6), 0..10),
    ) {
        let mut workflow = Workflow::new("roots");
        for n in 0..count {
            workflow.add_step(step(n)).unwrap();
        }
        for (s, d) in edges {
            let _ = workflow.add_transition(&uid(s), &uid(d));
        }

        let targets: HashSet<&str> = workflow
            .next_steps
            .iter()
            .map(|t| t.destination_uid.as_str())
            .collect();
        let expected = workflow
            .steps
            .iter()
            .find(|s| !targets.contains(s.uid.as_str()))
            .unwrap_or(&workflow.steps[0])
            .uid
            .clone();

        workflow.set_start(None).unwrap();
        prop_assert_eq!(workflow.start, Some(expected));
    }
}
