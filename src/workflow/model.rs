/// Workflow mutation operations
///
/// Every mutation validates first and writes second, so a failed call leaves the workflow
/// exactly as it was. Step enumeration order is insertion order; root selection relies on it.

use crate::error::{Result, StudioError};
use crate::workflow::types::{
    Step, Transition, Workflow, DEFAULT_TRANSITION_PRIORITY, DEFAULT_TRANSITION_STATUS,
};
use std::collections::HashSet;
use uuid::Uuid;

impl Workflow {
    /// Create an empty workflow
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn step(&self, uid: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.uid == uid)
    }

    pub fn step_mut(&mut self, uid: &str) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| s.uid == uid)
    }

    pub fn has_step(&self, uid: &str) -> bool {
        self.step(uid).is_some()
    }

    pub fn transition(&self, uid: &str) -> Option<&Transition> {
        self.next_steps.iter().find(|t| t.uid == uid)
    }

    /// Transition for the ordered (source, destination) pair, if any
    pub fn transition_between(&self, source_uid: &str, destination_uid: &str) -> Option<&Transition> {
        self.next_steps
            .iter()
            .find(|t| t.source_uid == source_uid && t.destination_uid == destination_uid)
    }

    /// Steps with no incoming transition, in insertion order
    pub fn roots(&self) -> Vec<&Step> {
        self.steps
            .iter()
            .filter(|s| !self.next_steps.iter().any(|t| t.destination_uid == s.uid))
            .collect()
    }

    /// Steps that may feed the given step
    ///
    /// Every step is offered for now; this does not walk the graph backwards.
    pub fn previous_steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps running the given action, used to disambiguate display names
    pub fn count_action(&self, action: &str) -> usize {
        self.steps.iter().filter(|s| s.action == action).count()
    }

    /// Append a step
    pub fn add_step(&mut self, step: Step) -> Result<()> {
        if self.has_step(&step.uid) {
            return Err(StudioError::DuplicateStep(step.uid));
        }
        tracing::debug!("➕ Added step '{}' ({})", step.name, step.uid);
        self.steps.push(step);
        Ok(())
    }

    /// Remove a step, every transition touching it, and reassign start if needed
    pub fn remove_step(&mut self, uid: &str) -> Result<Step> {
        let position = self
            .steps
            .iter()
            .position(|s| s.uid == uid)
            .ok_or_else(|| StudioError::UnknownStep(uid.to_string()))?;

        let step = self.steps.remove(position);
        let before = self.next_steps.len();
        self.next_steps
            .retain(|t| t.source_uid != uid && t.destination_uid != uid);

        tracing::debug!(
            "🗑️ Removed step '{}' and {} attached transitions",
            uid,
            before - self.next_steps.len()
        );

        if self.start.as_deref() == Some(uid) {
            self.set_start(None)?;
        }

        Ok(step)
    }

    /// Add a transition with a generated uid
    pub fn add_transition(&mut self, source_uid: &str, destination_uid: &str) -> Result<&Transition> {
        let uid = Uuid::new_v4().to_string();
        self.add_transition_with_uid(uid, source_uid, destination_uid)
    }

    /// Add a transition whose uid was already minted by the graph view
    pub fn add_transition_with_uid(
        &mut self,
        uid: impl Into<String>,
        source_uid: &str,
        destination_uid: &str,
    ) -> Result<&Transition> {
        for endpoint in [source_uid, destination_uid] {
            if !self.has_step(endpoint) {
                return Err(StudioError::UnknownStep(endpoint.to_string()));
            }
        }
        if self.transition_between(source_uid, destination_uid).is_some() {
            return Err(StudioError::DuplicateTransition {
                source_uid: source_uid.to_string(),
                destination_uid: destination_uid.to_string(),
            });
        }

        self.next_steps.push(Transition {
            uid: uid.into(),
            source_uid: source_uid.to_string(),
            destination_uid: destination_uid.to_string(),
            priority: DEFAULT_TRANSITION_PRIORITY,
            status: DEFAULT_TRANSITION_STATUS.to_string(),
            conditions: Vec::new(),
        });

        tracing::debug!("🔗 Added transition '{}' → '{}'", source_uid, destination_uid);

        // just pushed
        Ok(&self.next_steps[self.next_steps.len() - 1])
    }

    /// Remove the transition for an ordered pair
    pub fn remove_transition(&mut self, source_uid: &str, destination_uid: &str) -> Option<Transition> {
        let position = self
            .next_steps
            .iter()
            .position(|t| t.source_uid == source_uid && t.destination_uid == destination_uid)?;
        Some(self.next_steps.remove(position))
    }

    /// Remove a transition by uid
    pub fn remove_transition_by_uid(&mut self, uid: &str) -> Result<Transition> {
        let position = self
            .next_steps
            .iter()
            .position(|t| t.uid == uid)
            .ok_or_else(|| StudioError::UnknownTransition(uid.to_string()))?;
        Ok(self.next_steps.remove(position))
    }

    /// Set the start step
    ///
    /// With a uid, the step must exist. Without one, the first root in insertion order is
    /// chosen; a graph made only of cycles falls back to the first step; an empty workflow
    /// ends up with no start. Returns the resulting start.
    pub fn set_start(&mut self, uid: Option<&str>) -> Result<Option<&str>> {
        let start = match uid {
            Some(uid) => {
                if !self.has_step(uid) {
                    return Err(StudioError::UnknownStep(uid.to_string()));
                }
                Some(uid.to_string())
            }
            None => self
                .roots()
                .first()
                .map(|s| s.uid.clone())
                .or_else(|| self.steps.first().map(|s| s.uid.clone())),
        };

        tracing::debug!("🎯 Start step set to {:?}", start);
        self.start = start;
        Ok(self.start.as_deref())
    }

    /// Check the structural invariants of a workflow built outside these methods
    ///
    /// Step uids must be unique, every transition must connect existing steps, and each
    /// ordered pair may carry at most one transition. `start` is not checked here.
    pub fn validate(&self) -> Result<()> {
        let mut steps = HashSet::new();
        for step in &self.steps {
            if !steps.insert(step.uid.as_str()) {
                return Err(StudioError::DuplicateStep(step.uid.clone()));
            }
        }

        let mut pairs = HashSet::new();
        for transition in &self.next_steps {
            for endpoint in [&transition.source_uid, &transition.destination_uid] {
                if !steps.contains(endpoint.as_str()) {
                    return Err(StudioError::UnknownStep(endpoint.clone()));
                }
            }
            if !pairs.insert((transition.source_uid.as_str(), transition.destination_uid.as_str())) {
                return Err(StudioError::DuplicateTransition {
                    source_uid: transition.source_uid.clone(),
                    destination_uid: transition.destination_uid.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(uid: &str) -> Step {
        Step {
            uid: uid.to_string(),
            name: uid.to_string(),
            app: "Utilities".to_string(),
            action: "echo".to_string(),
            ..Step::default()
        }
    }

    fn workflow(uids: &[&str]) -> Workflow {
        let mut workflow = Workflow::new("wf");
        for uid in uids {
            workflow.add_step(step(uid)).unwrap();
        }
        workflow
    }

    #[test]
    fn test_add_transition_defaults() {
        let mut wf = workflow(&["a", "b"]);
        let transition = wf.add_transition("a", "b").unwrap();
        assert_eq!(transition.priority, 1);
        assert_eq!(transition.status, "Success");
        assert!(transition.conditions.is_empty());
    }

    #[test]
    fn test_duplicate_transition_rejected() {
        let mut wf = workflow(&["a", "b"]);
        wf.add_transition("a", "b").unwrap();

        let err = wf.add_transition("a", "b").unwrap_err();
        assert!(matches!(err, StudioError::DuplicateTransition { .. }));
        assert_eq!(wf.next_steps.len(), 1);

        // reverse direction is a different pair
        wf.add_transition("b", "a").unwrap();
        assert_eq!(wf.next_steps.len(), 2);
    }

    #[test]
    fn test_transition_to_unknown_step_rejected() {
        let mut wf = workflow(&["a"]);
        let err = wf.add_transition("a", "ghost").unwrap_err();
        assert!(matches!(err, StudioError::UnknownStep(uid) if uid == "ghost"));
        assert!(wf.next_steps.is_empty());
    }

    #[test]
    fn test_duplicate_step_rejected() {
        let mut wf = workflow(&["a"]);
        assert!(matches!(
            wf.add_step(step("a")),
            Err(StudioError::DuplicateStep(_))
        ));
        assert_eq!(wf.steps.len(), 1);
    }

    #[test]
    fn test_remove_step_cascades() {
        let mut wf = workflow(&["A", "B", "C"]);
        wf.add_transition("A", "B").unwrap();
        wf.add_transition("B", "C").unwrap();

        wf.remove_step("B").unwrap();

        let uids: Vec<&str> = wf.steps.iter().map(|s| s.uid.as_str()).collect();
        assert_eq!(uids, vec!["A", "C"]);
        assert!(wf.next_steps.is_empty());
    }

    #[test]
    fn test_remove_unknown_step() {
        let mut wf = workflow(&["a"]);
        assert!(matches!(
            wf.remove_step("zz"),
            Err(StudioError::UnknownStep(_))
        ));
    }

    #[test]
    fn test_remove_start_reassigns_to_root() {
        let mut wf = workflow(&["a", "b", "c"]);
        wf.add_transition("a", "b").unwrap();
        wf.add_transition("c", "b").unwrap();
        wf.set_start(Some("a")).unwrap();

        wf.remove_step("a").unwrap();
        // b still has an incoming edge from c
        assert_eq!(wf.start.as_deref(), Some("c"));
    }

    #[test]
    fn test_remove_last_step_clears_start() {
        let mut wf = workflow(&["a"]);
        wf.set_start(Some("a")).unwrap();
        wf.remove_step("a").unwrap();
        assert!(wf.start.is_none());
    }

    #[test]
    fn test_set_start_unknown() {
        let mut wf = workflow(&["a"]);
        assert!(matches!(
            wf.set_start(Some("nope")),
            Err(StudioError::UnknownStep(_))
        ));
        assert!(wf.start.is_none());
    }

    #[test]
    fn test_set_start_none_picks_first_root_in_insertion_order() {
        let mut wf = workflow(&["x", "y", "z"]);
        wf.add_transition("x", "y").unwrap();
        assert_eq!(wf.set_start(None).unwrap(), Some("x"));

        wf.add_transition("z", "x").unwrap();
        assert_eq!(wf.set_start(None).unwrap(), Some("z"));
    }

    #[test]
    fn test_set_start_none_cycle_only_falls_back_to_first_step() {
        let mut wf = workflow(&["p", "q"]);
        wf.add_transition("p", "q").unwrap();
        wf.add_transition("q", "p").unwrap();

        assert!(wf.roots().is_empty());
        assert_eq!(wf.set_start(None).unwrap(), Some("p"));
    }

    #[test]
    fn test_set_start_none_on_empty_workflow() {
        let mut wf = Workflow::new("empty");
        assert_eq!(wf.set_start(None).unwrap(), None);
    }

    #[test]
    fn test_remove_transition_by_pair_and_uid() {
        let mut wf = workflow(&["a", "b"]);
        let uid = wf.add_transition("a", "b").unwrap().uid.clone();
        assert!(wf.remove_transition("b", "a").is_none());

        let removed = wf.remove_transition_by_uid(&uid).unwrap();
        assert_eq!(removed.source_uid, "a");
        assert!(wf.next_steps.is_empty());
    }

    #[test]
    fn test_validate_rejects_broken_transitions() {
        let mut wf = workflow(&["a", "b"]);
        wf.add_transition("a", "b").unwrap();
        assert!(wf.validate().is_ok());

        let mut dangling = wf.clone();
        let mut ghost = dangling.next_steps[0].clone();
        ghost.uid = "t-ghost".to_string();
        ghost.destination_uid = "ghost".to_string();
        dangling.next_steps.push(ghost);
        assert!(matches!(dangling.validate(), Err(StudioError::UnknownStep(uid)) if uid == "ghost"));

        let mut repeated = wf.clone();
        let mut again = repeated.next_steps[0].clone();
        again.uid = "t-again".to_string();
        repeated.next_steps.push(again);
        assert!(matches!(repeated.validate(), Err(StudioError::DuplicateTransition { .. })));

        let mut twice = wf.clone();
        twice.steps.push(step("a"));
        assert!(matches!(twice.validate(), Err(StudioError::DuplicateStep(_))));
    }

    #[test]
    fn test_previous_steps_offers_every_step() {
        let mut wf = workflow(&["a", "b", "c"]);
        wf.add_transition("a", "b").unwrap();
        let uids: Vec<&str> = wf.previous_steps().iter().map(|s| s.uid.as_str()).collect();
        assert_eq!(uids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_count_action() {
        let wf = workflow(&["a", "b"]);
        assert_eq!(wf.count_action("echo"), 2);
        assert_eq!(wf.count_action("other"), 0);
    }
}
