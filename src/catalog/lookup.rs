/// Catalog lookups by name
///
/// Apps and actions are looked up by string key at use time. Every lookup returns a typed
/// result or an explicit not-found error instead of assuming the entry exists.

use crate::catalog::types::{
    ActionApi, AppApi, ConditionApi, Device, DeviceApi, ParameterApi, TransformApi,
};
use crate::error::{Result, StudioError};

/// Snapshot of installed apps and configured devices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    apps: Vec<AppApi>,
    devices: Vec<Device>,
}

impl Catalog {
    /// Build a catalog; apps are kept sorted by name for display
    pub fn new(mut apps: Vec<AppApi>, devices: Vec<Device>) -> Self {
        apps.sort_by(|a, b| a.name.cmp(&b.name));
        Self { apps, devices }
    }

    pub fn apps(&self) -> &[AppApi] {
        &self.apps
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn app(&self, app: &str) -> Result<&AppApi> {
        self.apps
            .iter()
            .find(|a| a.name == app)
            .ok_or_else(|| StudioError::UnknownApp(app.to_string()))
    }

    pub fn action(&self, app: &str, action: &str) -> Result<&ActionApi> {
        self.app(app)?
            .action_apis
            .iter()
            .find(|a| a.name == action)
            .ok_or_else(|| StudioError::UnknownAction {
                app: app.to_string(),
                action: action.to_string(),
            })
    }

    /// Declared parameter of an action, `None` if the action has no such input
    pub fn parameter(&self, app: &str, action: &str, input: &str) -> Result<Option<&ParameterApi>> {
        Ok(self
            .action(app, action)?
            .parameters
            .iter()
            .find(|p| p.name == input))
    }

    pub fn condition_apis(&self, app: &str) -> Result<&[ConditionApi]> {
        Ok(&self.app(app)?.condition_apis)
    }

    pub fn transform_apis(&self, app: &str) -> Result<&[TransformApi]> {
        Ok(&self.app(app)?.transform_apis)
    }

    pub fn device_apis(&self, app: &str) -> Result<&[DeviceApi]> {
        Ok(&self.app(app)?.device_apis)
    }

    /// Apps offering at least one action, i.e. the ones worth showing in the palette
    pub fn apps_with_actions(&self) -> Vec<&AppApi> {
        self.apps
            .iter()
            .filter(|a| !a.action_apis.is_empty())
            .collect()
    }

    /// Configured devices belonging to an app
    pub fn devices_for_app(&self, app: &str) -> Vec<Device> {
        self.devices
            .iter()
            .filter(|d| d.app == app)
            .cloned()
            .collect()
    }
}
