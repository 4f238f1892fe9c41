/// Access token acquisition
///
/// The result stream is opened with a bearer credential passed in the subscription
/// address. Tokens are fetched once per subscription; expiry is not tracked here.

use crate::api::http::{join_segments, parse_base_url};
use crate::api::AccessTokenProvider;
use crate::error::{Result, StudioError};
use futures::future::BoxFuture;
use serde::Deserialize;

/// A token known up front (tests, scripted sessions)
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl AccessTokenProvider for StaticToken {
    fn access_token(&self) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move { Ok(self.0.clone()) })
    }
}

/// Exchanges a refresh token for a new access token on every request
#[derive(Debug, Clone)]
pub struct RefreshingAuth {
    http: reqwest::Client,
    refresh_url: reqwest::Url,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
}

impl RefreshingAuth {
    /// `base_url` is the playbook server root; the refresh endpoint is `api/auth/refresh` below it
    pub fn new(http: reqwest::Client, base_url: &str, refresh_token: impl Into<String>) -> Result<Self> {
        let base = parse_base_url(base_url)?;
        let refresh_url = join_segments(&base, &["api", "auth", "refresh"])?;

        Ok(Self {
            http,
            refresh_url,
            refresh_token: refresh_token.into(),
        })
    }
}

impl AccessTokenProvider for RefreshingAuth {
    fn access_token(&self) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move {
            tracing::debug!("🔑 Refreshing access token");

            let response = self
                .http
                .post(self.refresh_url.clone())
                .bearer_auth(&self.refresh_token)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(StudioError::RemoteFailure(format!(
                    "Token refresh failed with HTTP {}",
                    response.status()
                )));
            }

            let body: RefreshResponse = response.json().await?;
            Ok(body.access_token)
        })
    }
}
