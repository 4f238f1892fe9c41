/// Configuration management for Mechaway Studio
///
/// Handles remote server addresses, result stream settings, optional local storage,
/// and editor defaults.

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote server configuration
    pub server: ServerConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Local storage configuration
    pub storage: StorageConfig,
    /// Editor defaults
    pub editor: EditorConfig,
}

/// Remote playbook server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the playbook server (e.g., "http://localhost:5000")
    pub base_url: String,
    /// Path of the server-sent-event stream carrying workflow results
    pub stream_path: String,
}

/// Credentials used to obtain access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Long-lived refresh token exchanged for short-lived access tokens
    pub refresh_token: Option<String>,
}

/// Optional local SQLite store used instead of the remote server for playbooks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// sqlx connection URL (e.g., "sqlite://studio.db")
    pub database_url: Option<String>,
}

/// Editor defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Playbook to open on startup
    pub playbook: Option<String>,
    /// Workflow to open on startup
    pub workflow: Option<String>,
    /// Offset applied to pasted nodes so they don't sit on top of their originals
    pub paste_offset: f64,
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for container deployment
    fn default() -> Self {
        Self {
            server: ServerConfig {
                base_url: std::env::var("STUDIO_SERVER_URL")
                    .unwrap_or_else(|_| "http://localhost:5000".to_string()),
                stream_path: std::env::var("STUDIO_STREAM_PATH")
                    .unwrap_or_else(|_| "workflowresults/stream-steps".to_string()),
            },
            auth: AuthConfig {
                refresh_token: std::env::var("STUDIO_REFRESH_TOKEN").ok(),
            },
            storage: StorageConfig {
                database_url: std::env::var("STUDIO_DATABASE_URL").ok(),
            },
            editor: EditorConfig {
                playbook: std::env::var("STUDIO_PLAYBOOK").ok(),
                workflow: std::env::var("STUDIO_WORKFLOW").ok(),
                paste_offset: std::env::var("STUDIO_PASTE_OFFSET")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(20.0),
            },
        }
    }
}
