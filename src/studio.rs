/// Studio setup and initialization
///
/// Wires together all components: playbook store, action catalog, graph view, editor
/// session and the workflow result stream. Provides the factory used by the binary.

use crate::{
    api::{AccessTokenProvider, CatalogSource, HttpPlaybookClient, PlaybookStore, RefreshingAuth, StaticToken},
    catalog::CatalogRegistry,
    config::Config,
    editor::EditorSession,
    graph::MemoryGraph,
    runtime::{ResultSubscription, StreamMessage},
    store::SqlitePlaybookStore,
};
use anyhow::Result;
use std::sync::Arc;

/// A ready-to-use studio: the editing session plus what it needs to reach the server
pub struct Studio {
    pub session: EditorSession<MemoryGraph>,
    pub client: HttpPlaybookClient,
    pub auth: Arc<dyn AccessTokenProvider>,
    /// Whether playbooks come from the local database instead of the server
    pub offline: bool,
}

/// Create the studio with all components initialized
///
/// Uses the local SQLite store when a database URL is configured, otherwise the playbook
/// server. Opens the configured workflow if one is set.
pub async fn create_studio(config: &Config) -> Result<Studio> {
    let http = reqwest::Client::new();

    tracing::info!("🔑 Initializing authentication");
    let auth: Arc<dyn AccessTokenProvider> = match &config.auth.refresh_token {
        Some(token) => Arc::new(RefreshingAuth::new(http.clone(), &config.server.base_url, token.clone())?),
        None => {
            tracing::warn!("⚠️ No refresh token configured, talking to the server anonymously");
            Arc::new(StaticToken(String::new()))
        }
    };

    let mut client = HttpPlaybookClient::new(http, &config.server.base_url)?;
    if config.auth.refresh_token.is_some() {
        client = client.with_token(auth.access_token().await?);
    }

    let (store, catalog_source, offline): (Arc<dyn PlaybookStore>, Arc<dyn CatalogSource>, bool) =
        match &config.storage.database_url {
            Some(url) => {
                tracing::info!("📋 Opening local playbook store: {}", url);
                let sqlite = Arc::new(SqlitePlaybookStore::connect(url).await?);
                let store: Arc<dyn PlaybookStore> = sqlite.clone();
                let source: Arc<dyn CatalogSource> = sqlite;
                (store, source, true)
            }
            None => {
                tracing::info!("🌐 Using playbook server at {}", config.server.base_url);
                let remote = Arc::new(client.clone());
                let store: Arc<dyn PlaybookStore> = remote.clone();
                let source: Arc<dyn CatalogSource> = remote;
                (store, source, false)
            }
        };

    tracing::info!("📚 Loading action catalog");
    let catalog = Arc::new(CatalogRegistry::default());
    catalog.reload(catalog_source.as_ref()).await?;

    let view = MemoryGraph::new().with_paste_offset(config.editor.paste_offset);
    let mut session = EditorSession::new(store, catalog, view);
    if !offline {
        session = session.with_executor(Arc::new(client.clone()));
    }

    match session.refresh_playbooks().await {
        Ok(()) => tracing::info!("📋 Found {} playbooks", session.playbooks().len()),
        Err(e) => tracing::warn!("⚠️ Failed to list playbooks: {}", e),
    }

    if let (Some(playbook), Some(workflow)) = (&config.editor.playbook, &config.editor.workflow) {
        session.load_workflow(playbook, workflow).await?;
    }

    tracing::info!("✅ Studio initialized successfully");

    Ok(Studio {
        session,
        client,
        auth,
        offline,
    })
}

/// Run the studio as a result monitor until interrupted
///
/// Subscribes to the workflow result stream and paints every result onto the loaded
/// workflow's graph as it arrives.
pub async fn run_studio(config: Config) -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting Mechaway Studio...");

    let mut studio = create_studio(&config).await?;

    if !studio.offline {
        match ResultSubscription::connect(&studio.client, &config.server.stream_path, studio.auth.as_ref()).await {
            Ok(subscription) => studio.session.attach_results(subscription),
            Err(e) => tracing::error!("❌ Failed to subscribe to workflow results: {}", e),
        }
    }

    loop {
        tokio::select! {
            message = studio.session.next_result() => match message {
                Some(StreamMessage::Result(result)) => {
                    tracing::info!("📨 {} result for step {}", result.kind, result.step_uid);
                }
                Some(StreamMessage::Failed(_)) | None => {
                    tracing::warn!("📴 No result stream, waiting for shutdown");
                    tokio::signal::ctrl_c().await?;
                    break;
                }
            },
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
        }
    }

    tracing::info!(
        "👋 Shutting down after {} workflow results",
        studio.session.overlay().results().len()
    );
    studio.session.detach_results();

    Ok(())
}
