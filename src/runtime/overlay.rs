/// Execution overlay
///
/// Paints execution outcomes onto the view and keeps a log of every received result. The
/// overlay never touches the workflow: highlighting lives only on view nodes.

use crate::graph::{GraphView, Highlight};
use crate::workflow::WorkflowResult;
use chrono::{DateTime, Utc};

/// A received result with its arrival time
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedResult {
    pub result: WorkflowResult,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct ExecutionOverlay {
    results: Vec<LoggedResult>,
}

impl ExecutionOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag the result's node and log the result
    ///
    /// Results for steps not in the view (another workflow, or a deleted step) are still
    /// logged. Returns whether a node was tagged.
    pub fn apply(&mut self, view: &mut dyn GraphView, result: WorkflowResult) -> bool {
        let highlight = if result.is_success() {
            Highlight::Good
        } else {
            Highlight::Bad
        };

        let tagged = view.add_class(&result.step_uid, highlight);
        if tagged {
            tracing::debug!("🎨 Step '{}' marked {}", result.step_uid, highlight.class_name());
        } else {
            tracing::debug!("👻 Result for step '{}' not in view", result.step_uid);
        }

        self.results.push(LoggedResult {
            result,
            received_at: Utc::now(),
        });
        tagged
    }

    /// Remove both highlight tags from every node; the log is kept
    pub fn clear_highlighting(&self, view: &mut dyn GraphView) {
        view.remove_classes(&[Highlight::Good, Highlight::Bad]);
    }

    /// Every result received so far, in arrival order
    pub fn results(&self) -> &[LoggedResult] {
        &self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MemoryGraph, NodeKind, ViewElement, ViewNode};
    use crate::workflow::Position;

    fn result(uid: &str, kind: &str) -> WorkflowResult {
        WorkflowResult {
            step_uid: uid.into(),
            kind: kind.into(),
            name: Some("echo".into()),
            result: None,
        }
    }

    fn view() -> MemoryGraph {
        let mut view = MemoryGraph::new();
        for id in ["a", "b"] {
            view.add(vec![ViewElement::Node(ViewNode::new(id, id, NodeKind::Action, Position::default()))]);
        }
        view
    }

    #[test]
    fn test_success_and_failure_tags() {
        let mut view = view();
        let mut overlay = ExecutionOverlay::new();

        assert!(overlay.apply(&mut view, result("a", "SUCCESS")));
        assert!(overlay.apply(&mut view, result("b", "ERROR")));

        assert!(view.node("a").unwrap().classes.contains(&Highlight::Good));
        assert!(view.node("b").unwrap().classes.contains(&Highlight::Bad));
    }

    #[test]
    fn test_unknown_step_is_logged_only() {
        let mut view = view();
        let mut overlay = ExecutionOverlay::new();

        assert!(!overlay.apply(&mut view, result("zzz", "SUCCESS")));
        assert_eq!(overlay.results().len(), 1);
        assert!(view.node("a").unwrap().classes.is_empty());
    }

    #[test]
    fn test_clear_keeps_log() {
        let mut view = view();
        let mut overlay = ExecutionOverlay::new();
        overlay.apply(&mut view, result("a", "SUCCESS"));
        overlay.apply(&mut view, result("a", "FAILURE"));

        overlay.clear_highlighting(&mut view);
        assert!(view.node("a").unwrap().classes.is_empty());
        assert_eq!(overlay.results().len(), 2);
        assert_eq!(overlay.results()[1].result.kind, "FAILURE");
    }
}
