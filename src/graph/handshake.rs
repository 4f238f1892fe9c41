/// Edge creation handshake
///
/// Drawing an edge is not an undoable action in the view, so the adapter turns every
/// drawn edge into a short-lived draft: `Drawn -> Rejected | Committed`. Committed drafts
/// are removed and re-added through the undo-tracked facility as one entry.

use crate::error::StudioError;
use crate::graph::view::ViewEdge;
use crate::workflow::Workflow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftState {
    Drawn,
    Rejected,
    Committed,
}

/// One tentatively drawn edge
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeDraft {
    pub edge: ViewEdge,
    pub state: DraftState,
}

impl EdgeDraft {
    pub fn drawn(mut edge: ViewEdge) -> Self {
        edge.temp = true;
        Self {
            edge,
            state: DraftState::Drawn,
        }
    }

    /// Decide the draft against the workflow
    ///
    /// A pair that already has a transition (or an endpoint that is not a step) rejects
    /// the draft. Otherwise the transition is created with the edge's uid.
    pub fn resolve(&mut self, workflow: &mut Workflow) -> DraftState {
        if self.state != DraftState::Drawn {
            return self.state;
        }

        self.state = match workflow.add_transition_with_uid(
            self.edge.id.clone(),
            &self.edge.source,
            &self.edge.target,
        ) {
            Ok(_) => DraftState::Committed,
            Err(StudioError::DuplicateTransition { .. }) => {
                tracing::debug!(
                    "↩️ Rejected duplicate edge '{}' → '{}'",
                    self.edge.source,
                    self.edge.target
                );
                DraftState::Rejected
            }
            Err(e) => {
                tracing::warn!("⚠️ Rejected drawn edge '{}': {}", self.edge.id, e);
                DraftState::Rejected
            }
        };
        self.state
    }

    /// The edge as it should be re-added once committed
    pub fn committed_edge(&self) -> Option<ViewEdge> {
        (self.state == DraftState::Committed).then(|| ViewEdge {
            temp: false,
            ..self.edge.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::Step;

    fn workflow() -> Workflow {
        let mut wf = Workflow::new("wf");
        for uid in ["a", "b"] {
            wf.add_step(Step {
                uid: uid.into(),
                ..Step::default()
            })
            .unwrap();
        }
        wf
    }

    #[test]
    fn test_commit_creates_transition_with_edge_uid() {
        let mut wf = workflow();
        let mut draft = EdgeDraft::drawn(ViewEdge::new("e1", "a", "b"));
        assert!(draft.edge.temp);

        assert_eq!(draft.resolve(&mut wf), DraftState::Committed);
        assert_eq!(wf.transition("e1").unwrap().destination_uid, "b");

        let edge = draft.committed_edge().unwrap();
        assert!(!edge.temp);
        assert_eq!(edge.id, "e1");
    }

    #[test]
    fn test_duplicate_is_rejected() {
        let mut wf = workflow();
        wf.add_transition("a", "b").unwrap();

        let mut draft = EdgeDraft::drawn(ViewEdge::new("e2", "a", "b"));
        assert_eq!(draft.resolve(&mut wf), DraftState::Rejected);
        assert!(draft.committed_edge().is_none());
        assert_eq!(wf.next_steps.len(), 1);
    }

    #[test]
    fn test_resolve_is_final() {
        let mut wf = workflow();
        let mut draft = EdgeDraft::drawn(ViewEdge::new("e1", "a", "b"));
        draft.resolve(&mut wf);
        // a second resolve must not try to add the transition again
        assert_eq!(draft.resolve(&mut wf), DraftState::Committed);
        assert_eq!(wf.next_steps.len(), 1);
    }
}
