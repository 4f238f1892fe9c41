/// Remote Collaborator Layer
///
/// This module defines the interfaces the editor uses to reach the outside world and
/// their HTTP implementations:
/// - Playbook store (load/save/list and playbook/workflow management)
/// - Action catalog source
/// - Workflow execution trigger
/// - Access token provider for the result stream

use crate::catalog::{AppApi, Device};
use crate::error::Result;
use crate::workflow::{Playbook, Workflow};
use futures::future::BoxFuture;

// reqwest client for the playbook server
pub mod http;

// Access token acquisition
pub mod auth;

pub use auth::{RefreshingAuth, StaticToken};
pub use http::HttpPlaybookClient;

/// Playbook persistence collaborator
///
/// Failures surface as `RemoteFailure` (or `Storage` for local stores); callers report them
/// and keep their in-memory state.
pub trait PlaybookStore: Send + Sync {
    /// All playbooks with their workflow names
    fn list_playbooks(&self) -> BoxFuture<'_, Result<Vec<Playbook>>>;

    fn load_workflow<'a>(&'a self, playbook: &'a str, workflow: &'a str) -> BoxFuture<'a, Result<Workflow>>;

    fn save_workflow<'a>(
        &'a self,
        playbook: &'a str,
        workflow_name: &'a str,
        workflow: &'a Workflow,
    ) -> BoxFuture<'a, Result<()>>;

    /// Create an empty workflow, creating the playbook if it does not exist
    fn new_workflow<'a>(&'a self, playbook: &'a str, workflow: &'a str) -> BoxFuture<'a, Result<Workflow>>;

    fn rename_playbook<'a>(&'a self, playbook: &'a str, new_name: &'a str) -> BoxFuture<'a, Result<()>>;

    fn duplicate_playbook<'a>(&'a self, playbook: &'a str, new_name: &'a str) -> BoxFuture<'a, Result<()>>;

    fn delete_playbook<'a>(&'a self, playbook: &'a str) -> BoxFuture<'a, Result<()>>;

    fn rename_workflow<'a>(
        &'a self,
        playbook: &'a str,
        workflow: &'a str,
        new_name: &'a str,
    ) -> BoxFuture<'a, Result<()>>;

    /// Copy a workflow inside its playbook, returning the copy
    fn duplicate_workflow<'a>(
        &'a self,
        playbook: &'a str,
        workflow: &'a str,
        new_name: &'a str,
    ) -> BoxFuture<'a, Result<Workflow>>;

    fn delete_workflow<'a>(&'a self, playbook: &'a str, workflow: &'a str) -> BoxFuture<'a, Result<()>>;
}

/// Read-only source of the action catalog
pub trait CatalogSource: Send + Sync {
    fn list_apps(&self) -> BoxFuture<'_, Result<Vec<AppApi>>>;

    fn list_devices(&self) -> BoxFuture<'_, Result<Vec<Device>>>;
}

/// Starts execution of a stored workflow; results come back on the result stream
pub trait ExecutionService: Send + Sync {
    fn execute_workflow<'a>(&'a self, playbook: &'a str, workflow: &'a str) -> BoxFuture<'a, Result<()>>;
}

/// Source of short-lived bearer credentials
pub trait AccessTokenProvider: Send + Sync {
    /// A freshly refreshed access token
    fn access_token(&self) -> BoxFuture<'_, Result<String>>;
}
