/// HTTP client for the playbook server
///
/// Implements the store, catalog and execution collaborators over the server's REST API.
/// Names are always sent as escaped path segments, so playbooks like "My Playbook" work.

use crate::api::{CatalogSource, ExecutionService, PlaybookStore};
use crate::catalog::{AppApi, Device};
use crate::error::{Result, StudioError};
use crate::workflow::{Playbook, Workflow};
use futures::future::BoxFuture;
use reqwest::{Client, Response, Url};
use serde_json::json;

/// reqwest-based playbook server client
#[derive(Debug, Clone)]
pub struct HttpPlaybookClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpPlaybookClient {
    /// Create a client for the server at `base_url` (e.g., "http://localhost:5000")
    pub fn new(http: Client, base_url: &str) -> Result<Self> {
        Ok(Self {
            http,
            base_url: parse_base_url(base_url)?,
            token: None,
        })
    }

    /// Send a bearer token with every API request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Absolute URL for a list of path segments below the base URL
    pub fn endpoint<S: AsRef<str>>(&self, segments: &[S]) -> Result<Url> {
        join_segments(&self.base_url, segments)
    }

    /// Address of the result stream, carrying the access token as a query parameter
    pub fn stream_url(&self, stream_path: &str, access_token: &str) -> Result<Url> {
        let segments: Vec<&str> = stream_path.split('/').filter(|s| !s.is_empty()).collect();
        let mut url = self.endpoint(&segments)?;
        url.query_pairs_mut().append_pair("access_token", access_token);
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

/// Parse a server root URL, refusing URLs that cannot carry a path
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url)
        .map_err(|e| StudioError::RemoteFailure(format!("Invalid server URL '{}': {}", base_url, e)))?;
    if url.cannot_be_a_base() {
        return Err(StudioError::RemoteFailure(format!(
            "Server URL cannot be used as a base: {}",
            url
        )));
    }
    Ok(url)
}

/// Append escaped path segments to `base`, keeping any path it already has
pub(crate) fn join_segments<S: AsRef<str>>(base: &Url, segments: &[S]) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| StudioError::RemoteFailure("Server URL cannot be a base".to_string()))?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(url)
}

/// Turn non-success statuses into `RemoteFailure` carrying the response body
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    Err(StudioError::RemoteFailure(format!("HTTP {}: {}", status, body)))
}

impl PlaybookStore for HttpPlaybookClient {
    fn list_playbooks(&self) -> BoxFuture<'_, Result<Vec<Playbook>>> {
        Box::pin(async move {
            let url = self.endpoint(&["api", "playbooks"])?;
            let response = check(self.request(reqwest::Method::GET, url).send().await?).await?;
            Ok(response.json().await?)
        })
    }

    fn load_workflow<'a>(&'a self, playbook: &'a str, workflow: &'a str) -> BoxFuture<'a, Result<Workflow>> {
        Box::pin(async move {
            tracing::debug!("📥 Loading workflow {} - {}", playbook, workflow);
            let url = self.endpoint(&["api", "playbooks", playbook, "workflows", workflow])?;
            let response = check(self.request(reqwest::Method::GET, url).send().await?).await?;
            Ok(response.json().await?)
        })
    }

    fn save_workflow<'a>(
        &'a self,
        playbook: &'a str,
        workflow_name: &'a str,
        workflow: &'a Workflow,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            tracing::debug!("📤 Saving workflow {} - {}", playbook, workflow_name);
            let url = self.endpoint(&["api", "playbooks", playbook, "workflows", workflow_name, "save"])?;
            check(self.request(reqwest::Method::POST, url).json(workflow).send().await?).await?;
            Ok(())
        })
    }

    fn new_workflow<'a>(&'a self, playbook: &'a str, workflow: &'a str) -> BoxFuture<'a, Result<Workflow>> {
        Box::pin(async move {
            let url = self.endpoint(&["api", "playbooks", playbook, "workflows"])?;
            let response = check(
                self.request(reqwest::Method::PUT, url)
                    .json(&json!({ "name": workflow }))
                    .send()
                    .await?,
            )
            .await?;
            Ok(response.json().await?)
        })
    }

    fn rename_playbook<'a>(&'a self, playbook: &'a str, new_name: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let url = self.endpoint(&["api", "playbooks", playbook])?;
            check(
                self.request(reqwest::Method::POST, url)
                    .json(&json!({ "new_name": new_name }))
                    .send()
                    .await?,
            )
            .await?;
            Ok(())
        })
    }

    fn duplicate_playbook<'a>(&'a self, playbook: &'a str, new_name: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let url = self.endpoint(&["api", "playbooks", playbook, "copy"])?;
            check(
                self.request(reqwest::Method::POST, url)
                    .json(&json!({ "playbook": new_name }))
                    .send()
                    .await?,
            )
            .await?;
            Ok(())
        })
    }

    fn delete_playbook<'a>(&'a self, playbook: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let url = self.endpoint(&["api", "playbooks", playbook])?;
            check(self.request(reqwest::Method::DELETE, url).send().await?).await?;
            Ok(())
        })
    }

    fn rename_workflow<'a>(
        &'a self,
        playbook: &'a str,
        workflow: &'a str,
        new_name: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let url = self.endpoint(&["api", "playbooks", playbook, "workflows", workflow])?;
            check(
                self.request(reqwest::Method::POST, url)
                    .json(&json!({ "new_name": new_name }))
                    .send()
                    .await?,
            )
            .await?;
            Ok(())
        })
    }

    fn duplicate_workflow<'a>(
        &'a self,
        playbook: &'a str,
        workflow: &'a str,
        new_name: &'a str,
    ) -> BoxFuture<'a, Result<Workflow>> {
        Box::pin(async move {
            let url = self.endpoint(&["api", "playbooks", playbook, "workflows", workflow, "copy"])?;
            let response = check(
                self.request(reqwest::Method::POST, url)
                    .json(&json!({ "playbook": playbook, "workflow": new_name }))
                    .send()
                    .await?,
            )
            .await?;
            Ok(response.json().await?)
        })
    }

    fn delete_workflow<'a>(&'a self, playbook: &'a str, workflow: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let url = self.endpoint(&["api", "playbooks", playbook, "workflows", workflow])?;
            check(self.request(reqwest::Method::DELETE, url).send().await?).await?;
            Ok(())
        })
    }
}

impl CatalogSource for HttpPlaybookClient {
    fn list_apps(&self) -> BoxFuture<'_, Result<Vec<AppApi>>> {
        Box::pin(async move {
            let url = self.endpoint(&["api", "apps", "apis"])?;
            let response = check(self.request(reqwest::Method::GET, url).send().await?).await?;
            Ok(response.json().await?)
        })
    }

    fn list_devices(&self) -> BoxFuture<'_, Result<Vec<Device>>> {
        Box::pin(async move {
            let url = self.endpoint(&["api", "devices"])?;
            let response = check(self.request(reqwest::Method::GET, url).send().await?).await?;
            Ok(response.json().await?)
        })
    }
}

impl ExecutionService for HttpPlaybookClient {
    fn execute_workflow<'a>(&'a self, playbook: &'a str, workflow: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            tracing::info!("▶️ Requesting execution of {} - {}", playbook, workflow);
            let url = self.endpoint(&["api", "playbooks", playbook, "workflows", workflow, "execute"])?;
            check(self.request(reqwest::Method::POST, url).send().await?).await?;
            Ok(())
        })
    }
}
