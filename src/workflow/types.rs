/// Core playbook type definitions
///
/// Defines playbooks, workflows, steps, transitions and their argument trees. These types
/// are serialized/deserialized from JSON when talking to the playbook store.

use crate::workflow::selector::Selector;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status assigned to freshly drawn transitions
pub const DEFAULT_TRANSITION_STATUS: &str = "Success";

/// Priority assigned to freshly drawn transitions
pub const DEFAULT_TRANSITION_PRIORITY: i64 = 1;

/// Result type reported by the execution stream for a successful step
pub const RESULT_SUCCESS: &str = "SUCCESS";

/// A named collection of workflows
///
/// Playbook names are unique within the playbook set returned by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Playbook {
    #[serde(default)]
    pub uid: Option<String>,
    pub name: String,
    #[serde(default)]
    pub workflows: Vec<Workflow>,
}

/// A directed graph of steps connected by transitions
///
/// `start` must, whenever set, be the uid of one of `steps`. The mutation methods in
/// `workflow::model` keep that (and every other structural invariant) intact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub name: String,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub next_steps: Vec<Transition>,
}

/// A single executable unit in the workflow graph
///
/// The uid doubles as the identity of the corresponding graph-view node.
/// `app` + `action` name an entry in the action catalog; `name` is a display label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub uid: String,
    pub name: String,
    pub app: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<i64>,
    #[serde(default)]
    pub inputs: Vec<Argument>,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    #[serde(default)]
    pub position: Position,
}

/// Graph coordinates of a step
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Directed, conditioned edge from one step to another (`next_steps` entry)
///
/// At most one transition exists per ordered (source, destination) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub uid: String,
    pub source_uid: String,
    pub destination_uid: String,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

fn default_priority() -> i64 {
    DEFAULT_TRANSITION_PRIORITY
}

fn default_status() -> String {
    DEFAULT_TRANSITION_STATUS.to_string()
}

/// Condition attached to a transition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub app: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub args: Vec<Argument>,
    #[serde(default)]
    pub transforms: Vec<Transform>,
}

/// Trigger attached to a step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(default)]
    pub app: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub args: Vec<Argument>,
    #[serde(default)]
    pub transforms: Vec<Transform>,
}

/// Data transform applied before a condition or trigger is evaluated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    #[serde(default)]
    pub app: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub args: Vec<Argument>,
}

/// A named argument: either a literal value or a reference to another step's output
///
/// A reference and a literal value are mutually exclusive once persisted; the save
/// sanitizer clears `value` whenever `reference` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<Selector>,
}

impl Argument {
    /// True when the argument points at another step's output
    pub fn has_reference(&self) -> bool {
        self.reference.as_deref().is_some_and(|r| !r.is_empty())
    }
}

/// Event record from the execution result stream
///
/// `type == "SUCCESS"` means the step succeeded; any other value is a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub step_uid: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl WorkflowResult {
    pub fn is_success(&self) -> bool {
        self.kind == RESULT_SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::selector::SelectorSegment;
    use serde_json::json;

    #[test]
    fn test_workflow_deserializes_with_missing_collections() {
        let workflow: Workflow = serde_json::from_value(json!({ "name": "wf" })).unwrap();
        assert_eq!(workflow.name, "wf");
        assert!(workflow.start.is_none());
        assert!(workflow.steps.is_empty());
        assert!(workflow.next_steps.is_empty());
    }

    #[test]
    fn test_argument_selector_accepts_both_forms() {
        let canonical: Argument =
            serde_json::from_value(json!({ "name": "a", "selector": ["x", 2] })).unwrap();
        assert_eq!(
            canonical.selector,
            Some(Selector::Path(vec![
                SelectorSegment::Key("x".into()),
                SelectorSegment::Index(2)
            ]))
        );

        let editable: Argument =
            serde_json::from_value(json!({ "name": "a", "selector": "x.2" })).unwrap();
        assert_eq!(editable.selector, Some(Selector::Text("x.2".into())));
    }

    #[test]
    fn test_cleared_value_is_omitted() {
        let arg = Argument {
            name: "a".into(),
            value: None,
            reference: Some("step-1".into()),
            selector: None,
        };
        let encoded = serde_json::to_value(&arg).unwrap();
        assert!(encoded.get("value").is_none());
        assert_eq!(encoded["reference"], "step-1");
    }

    #[test]
    fn test_result_type_field() {
        let result: WorkflowResult =
            serde_json::from_value(json!({ "step_uid": "s1", "type": "SUCCESS" })).unwrap();
        assert!(result.is_success());

        let failed: WorkflowResult =
            serde_json::from_value(json!({ "step_uid": "s1", "type": "ERROR" })).unwrap();
        assert!(!failed.is_success());
    }
}
