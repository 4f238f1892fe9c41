/// Action catalog type definitions
///
/// Describes the apps installed on the playbook server: their actions, conditions,
/// transforms and device types. The catalog is read-only from the editor's point of view.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An installed app and everything it exposes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppApi {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub action_apis: Vec<ActionApi>,
    #[serde(default)]
    pub condition_apis: Vec<ConditionApi>,
    #[serde(default)]
    pub transform_apis: Vec<TransformApi>,
    #[serde(default)]
    pub device_apis: Vec<DeviceApi>,
}

/// An action a step can run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionApi {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterApi>,
    #[serde(default)]
    pub returns: Vec<ReturnApi>,
    /// Event-driven actions wait for an external event before running
    #[serde(default)]
    pub event: bool,
}

/// A declared action/condition/transform parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterApi {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub schema: ParameterSchema,
}

/// JSON-schema fragment describing a parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Remaining schema keywords (enum, minimum, ...) kept verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A possible return status of an action; transitions branch on these
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnApi {
    pub status: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub schema: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionApi {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterApi>,
    #[serde(default)]
    pub data_in: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformApi {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterApi>,
    #[serde(default)]
    pub data_in: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceApi {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<Value>,
}

/// A configured device instance of some app
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: i64,
    pub name: String,
    pub app: String,
    #[serde(default)]
    pub description: Option<String>,
}
