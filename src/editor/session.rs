/// Editor session
///
/// Owns everything one operator works with: the loaded workflow, the graph view, the
/// adapter, the execution overlay, the clipboard, the playbook list and the notices shown
/// to the operator. All handlers run on `&mut self`, one at a time; the result stream only
/// reaches the session through its subscription channel.

use crate::api::{CatalogSource, ExecutionService, PlaybookStore};
use crate::catalog::{Catalog, CatalogRegistry};
use crate::editor::clipboard::{ClipboardManager, InsertAt};
use crate::error::{Result, StudioError};
use crate::graph::{GraphAdapter, GraphView, Selection};
use crate::runtime::{ExecutionOverlay, ResultSubscription, StreamMessage};
use crate::workflow::sanitize::{prepare_for_edit, prepare_for_save};
use crate::workflow::{Playbook, Workflow};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// Operator-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// The workflow currently open in the editor
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedWorkflow {
    pub playbook: String,
    pub name: String,
    pub workflow: Workflow,
}

pub struct EditorSession<V: GraphView> {
    store: Arc<dyn PlaybookStore>,
    executor: Option<Arc<dyn ExecutionService>>,
    catalog: Arc<CatalogRegistry>,
    view: V,
    adapter: GraphAdapter,
    overlay: ExecutionOverlay,
    clipboard: ClipboardManager,
    playbooks: Vec<Playbook>,
    loaded: Option<LoadedWorkflow>,
    notices: Vec<Notice>,
    results: Option<ResultSubscription>,
}

impl<V: GraphView> EditorSession<V> {
    pub fn new(store: Arc<dyn PlaybookStore>, catalog: Arc<CatalogRegistry>, view: V) -> Self {
        Self {
            store,
            executor: None,
            catalog,
            view,
            adapter: GraphAdapter::new(),
            overlay: ExecutionOverlay::new(),
            clipboard: ClipboardManager::new(),
            playbooks: Vec::new(),
            loaded: None,
            notices: Vec::new(),
            results: None,
        }
    }

    pub fn with_executor(mut self, executor: Arc<dyn ExecutionService>) -> Self {
        self.executor = Some(executor);
        self
    }

    // Accessors

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Direct access for user gestures (select, draw, move); call `process_events` after
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn loaded(&self) -> Option<&LoadedWorkflow> {
        self.loaded.as_ref()
    }

    pub fn workflow(&self) -> Option<&Workflow> {
        self.loaded.as_ref().map(|l| &l.workflow)
    }

    /// Property edits on the loaded workflow (step names, arguments, conditions)
    pub fn workflow_mut(&mut self) -> Option<&mut Workflow> {
        self.loaded.as_mut().map(|l| &mut l.workflow)
    }

    pub fn selection(&self) -> &Selection {
        self.adapter.selection()
    }

    pub fn overlay(&self) -> &ExecutionOverlay {
        &self.overlay
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.snapshot()
    }

    pub fn playbooks(&self) -> &[Playbook] {
        &self.playbooks
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, level: NoticeLevel, message: String) {
        match level {
            NoticeLevel::Success => tracing::info!("✅ {}", message),
            NoticeLevel::Warning => tracing::warn!("⚠️ {}", message),
            NoticeLevel::Error => tracing::error!("❌ {}", message),
        }
        self.notices.push(Notice { level, message });
    }

    fn loaded_mut(&mut self) -> Result<&mut LoadedWorkflow> {
        self.loaded.as_mut().ok_or(StudioError::NoWorkflowLoaded)
    }

    // Catalog

    /// Reload apps and devices; the previous catalog stays on failure
    pub async fn reload_catalog(&mut self, source: &dyn CatalogSource) -> Result<()> {
        if let Err(e) = self.catalog.reload(source).await {
            self.notify(NoticeLevel::Error, format!("Error loading action catalog: {}", e));
            return Err(e);
        }
        Ok(())
    }

    // Load / save

    /// Fetch a workflow, project it into the view and make it the loaded workflow
    ///
    /// Nothing changes until the fetch, validation and projection all succeeded. A workflow
    /// without a (valid) start gets its first root as start.
    pub async fn load_workflow(&mut self, playbook: &str, workflow: &str) -> Result<()> {
        let store = Arc::clone(&self.store);
        let catalog = self.catalog.snapshot();

        let prepared = async {
            let mut fetched = store.load_workflow(playbook, workflow).await?;
            fetched.validate()?;
            let has_valid_start = fetched
                .start
                .as_deref()
                .is_some_and(|start| fetched.has_step(start));
            if !has_valid_start {
                fetched.set_start(None)?;
            }
            let elements = GraphAdapter::project(&fetched, &catalog)?;
            Ok::<_, StudioError>((fetched, elements))
        }
        .await;

        let (mut fetched, elements) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => {
                self.notify(
                    NoticeLevel::Error,
                    format!("Error loading workflow {} - {}: {}", playbook, workflow, e),
                );
                return Err(e);
            }
        };

        prepare_for_edit(&mut fetched);
        self.adapter.load(&fetched, &mut self.view, elements);
        self.loaded = Some(LoadedWorkflow {
            playbook: playbook.to_string(),
            name: workflow.to_string(),
            workflow: fetched,
        });

        tracing::info!("📂 Loaded workflow {} - {}", playbook, workflow);
        Ok(())
    }

    /// Sanitize a copy of the loaded workflow and hand it to the store
    ///
    /// In-memory edits are kept whatever the outcome.
    pub async fn save(&mut self) -> Result<()> {
        let positions = self.view.positions();
        let (playbook, name, sanitized) = {
            let loaded = self.loaded_mut()?;
            let sanitized = prepare_for_save(&loaded.workflow, &positions);
            (loaded.playbook.clone(), loaded.name.clone(), sanitized)
        };

        let sanitized = match sanitized {
            Ok(sanitized) => sanitized,
            Err(e) => {
                self.notify(NoticeLevel::Warning, "Workflow cannot be saved without a starting step.".to_string());
                return Err(e);
            }
        };

        let store = Arc::clone(&self.store);
        match store.save_workflow(&playbook, &name, &sanitized).await {
            Ok(()) => {
                self.notify(NoticeLevel::Success, format!("Successfully saved workflow {} - {}.", playbook, name));
                Ok(())
            }
            Err(e) => {
                self.notify(NoticeLevel::Error, format!("Error saving workflow {} - {}: {}", playbook, name, e));
                Err(e)
            }
        }
    }

    /// Close the loaded workflow and empty the view
    pub fn close_workflow(&mut self) {
        if let Some(loaded) = self.loaded.take() {
            tracing::info!("📕 Closed workflow {} - {}", loaded.playbook, loaded.name);
        }
        self.adapter.clear_selection();
        self.view.clear();
    }

    /// Start the loaded workflow as it is stored on the server
    pub async fn execute_workflow(&mut self) -> Result<()> {
        let (playbook, name) = {
            let loaded = self.loaded_mut()?;
            (loaded.playbook.clone(), loaded.name.clone())
        };

        let Some(executor) = self.executor.clone() else {
            let e = StudioError::RemoteFailure("no execution service configured".to_string());
            self.notify(NoticeLevel::Error, format!("Error starting execution of {} - {}: {}", playbook, name, e));
            return Err(e);
        };

        match executor.execute_workflow(&playbook, &name).await {
            Ok(()) => {
                self.notify(NoticeLevel::Success, format!("Starting execution of {} - {}.", playbook, name));
                Ok(())
            }
            Err(e) => {
                self.notify(NoticeLevel::Error, format!("Error starting execution of {} - {}: {}", playbook, name, e));
                Err(e)
            }
        }
    }

    // Event loop

    /// Dispatch pending view events until the view is quiescent
    ///
    /// Handlers may cause further events (the edge handshake removes and re-adds edges);
    /// those are picked up in the next round. Returns the number of events handled.
    pub fn process_events(&mut self) -> usize {
        let catalog = self.catalog.snapshot();
        let mut handled = 0;

        loop {
            let events = self.view.take_events();
            if events.is_empty() {
                break;
            }

            let Some(loaded) = self.loaded.as_mut() else {
                tracing::debug!("🗑️ Dropping {} view events, no workflow loaded", events.len());
                continue;
            };

            for event in events {
                handled += 1;
                if let Err(e) = self
                    .adapter
                    .handle_event(event, &mut loaded.workflow, &mut self.view, &catalog)
                {
                    tracing::warn!("⚠️ View event rejected: {}", e);
                    self.notices.push(Notice {
                        level: NoticeLevel::Warning,
                        message: e.to_string(),
                    });
                }
            }
        }

        handled
    }

    // Editing helpers; each runs the event loop afterwards

    pub fn insert_step(&mut self, app: &str, action: &str, at: InsertAt) -> Result<String> {
        let catalog = self.catalog.snapshot();
        let loaded = self.loaded.as_mut().ok_or(StudioError::NoWorkflowLoaded)?;
        let uid = self
            .clipboard
            .insert(&mut loaded.workflow, &mut self.view, &catalog, app, action, at)?;
        self.process_events();
        Ok(uid)
    }

    pub fn insert_step_at_center(&mut self, app: &str, action: &str) -> Result<String> {
        let center = self.view.extent().center();
        self.insert_step(app, action, InsertAt::Model(center))
    }

    pub fn set_start(&mut self, uid: &str) -> Result<()> {
        let loaded = self.loaded.as_mut().ok_or(StudioError::NoWorkflowLoaded)?;
        self.adapter.set_start(&mut loaded.workflow, &mut self.view, Some(uid))
    }

    pub fn copy(&mut self) -> Result<()> {
        let loaded = self.loaded.as_ref().ok_or(StudioError::NoWorkflowLoaded)?;
        self.clipboard.copy(&loaded.workflow, &mut self.view);
        Ok(())
    }

    pub fn cut(&mut self) -> Result<()> {
        let loaded = self.loaded.as_ref().ok_or(StudioError::NoWorkflowLoaded)?;
        self.clipboard.cut(&loaded.workflow, &mut self.view);
        self.process_events();
        Ok(())
    }

    pub fn paste(&mut self) -> Result<Vec<String>> {
        let loaded = self.loaded.as_mut().ok_or(StudioError::NoWorkflowLoaded)?;
        let uids = self.clipboard.paste(&mut loaded.workflow, &mut self.view)?;
        self.process_events();
        Ok(uids)
    }

    pub fn remove_selected(&mut self) {
        self.clipboard.remove_selected(&mut self.view);
        self.process_events();
    }

    // Execution results

    /// Start consuming a result subscription, replacing any previous one
    pub fn attach_results(&mut self, subscription: ResultSubscription) {
        self.results = Some(subscription);
    }

    pub fn detach_results(&mut self) {
        if let Some(mut subscription) = self.results.take() {
            subscription.close();
        }
    }

    /// Apply every result that already arrived; returns how many messages were handled
    pub fn drain_results(&mut self) -> usize {
        let mut handled = 0;
        while let Some(message) = self.results.as_mut().and_then(ResultSubscription::try_next) {
            self.apply_message(message);
            handled += 1;
        }
        handled
    }

    /// Wait for the next stream message and apply it; `None` when no stream is attached
    pub async fn next_result(&mut self) -> Option<StreamMessage> {
        let message = match self.results.as_mut() {
            Some(subscription) => subscription.next().await,
            None => return None,
        };

        match message {
            Some(message) => {
                self.apply_message(message.clone());
                Some(message)
            }
            None => {
                self.results = None;
                None
            }
        }
    }

    fn apply_message(&mut self, message: StreamMessage) {
        match message {
            StreamMessage::Result(result) => {
                self.overlay.apply(&mut self.view, result);
            }
            StreamMessage::Failed(reason) => {
                self.notify(NoticeLevel::Error, format!("Error retrieving workflow results: {}", reason));
                self.results = None;
            }
        }
    }

    pub fn clear_highlighting(&mut self) {
        self.overlay.clear_highlighting(&mut self.view);
    }

    // Playbook list maintenance

    fn sort_playbooks(&mut self) {
        self.playbooks.sort_by(|a, b| a.name.cmp(&b.name));
        for playbook in &mut self.playbooks {
            playbook.workflows.sort_by(|a, b| a.name.cmp(&b.name));
        }
    }

    fn playbook_mut(&mut self, name: &str) -> Option<&mut Playbook> {
        self.playbooks.iter_mut().find(|p| p.name == name)
    }

    /// Add a workflow to the local list, creating the playbook entry if needed
    fn list_workflow(&mut self, playbook: &str, workflow: Workflow) {
        match self.playbooks.iter().position(|p| p.name == playbook) {
            Some(idx) => self.playbooks[idx].workflows.push(workflow),
            None => self.playbooks.push(Playbook {
                uid: None,
                name: playbook.to_string(),
                workflows: vec![workflow],
            }),
        }
        self.sort_playbooks();
    }

    fn is_loaded(&self, playbook: &str, workflow: Option<&str>) -> bool {
        self.loaded.as_ref().is_some_and(|l| {
            l.playbook == playbook && workflow.map_or(true, |w| l.name == w)
        })
    }

    /// Report a store call: success notice, or error notice plus the error
    fn report(&mut self, result: Result<()>, success: String, failure: String) -> Result<()> {
        match result {
            Ok(()) => {
                self.notify(NoticeLevel::Success, success);
                Ok(())
            }
            Err(e) => {
                self.notify(NoticeLevel::Error, format!("{}: {}", failure, e));
                Err(e)
            }
        }
    }

    pub async fn refresh_playbooks(&mut self) -> Result<()> {
        let store = Arc::clone(&self.store);
        match store.list_playbooks().await {
            Ok(playbooks) => {
                self.playbooks = playbooks;
                self.sort_playbooks();
                Ok(())
            }
            Err(e) => {
                self.notify(NoticeLevel::Error, format!("Error loading playbooks: {}", e));
                Err(e)
            }
        }
    }

    pub async fn rename_playbook(&mut self, playbook: &str, new_name: &str) -> Result<()> {
        let store = Arc::clone(&self.store);
        let result = store.rename_playbook(playbook, new_name).await;
        if result.is_ok() {
            if let Some(entry) = self.playbook_mut(playbook) {
                entry.name = new_name.to_string();
            }
            if let Some(loaded) = self.loaded.as_mut().filter(|l| l.playbook == playbook) {
                loaded.playbook = new_name.to_string();
            }
            self.sort_playbooks();
        }
        self.report(
            result,
            format!("Successfully renamed playbook \"{}\".", new_name),
            format!("Error renaming playbook \"{}\"", new_name),
        )
    }

    pub async fn duplicate_playbook(&mut self, playbook: &str, new_name: &str) -> Result<()> {
        let store = Arc::clone(&self.store);
        let result = store.duplicate_playbook(playbook, new_name).await;
        if result.is_ok() {
            let mut copy = self
                .playbooks
                .iter()
                .find(|p| p.name == playbook)
                .cloned()
                .unwrap_or_default();
            copy.uid = None;
            copy.name = new_name.to_string();
            self.playbooks.push(copy);
            self.sort_playbooks();
        }
        self.report(
            result,
            format!("Successfully duplicated playbook \"{}\" as \"{}\".", playbook, new_name),
            format!("Error duplicating playbook \"{}\"", new_name),
        )
    }

    pub async fn delete_playbook(&mut self, playbook: &str) -> Result<()> {
        let store = Arc::clone(&self.store);
        let result = store.delete_playbook(playbook).await;
        if result.is_ok() {
            self.playbooks.retain(|p| p.name != playbook);
            if self.is_loaded(playbook, None) {
                self.close_workflow();
            }
        }
        self.report(
            result,
            format!("Successfully deleted playbook \"{}\".", playbook),
            format!("Error deleting playbook \"{}\"", playbook),
        )
    }

    /// Create a workflow (and its playbook if needed); it is opened when nothing is loaded
    pub async fn new_workflow(&mut self, playbook: &str, workflow: &str) -> Result<()> {
        let store = Arc::clone(&self.store);
        let created = store.new_workflow(playbook, workflow).await;

        let result = created.map(|created| self.list_workflow(playbook, created));
        let created_ok = result.is_ok();

        self.report(
            result,
            format!("Created workflow \"{} - {}\".", playbook, workflow),
            format!("Error creating workflow \"{} - {}\"", playbook, workflow),
        )?;

        if created_ok && self.loaded.is_none() {
            self.load_workflow(playbook, workflow).await?;
        }
        Ok(())
    }

    pub async fn rename_workflow(&mut self, playbook: &str, workflow: &str, new_name: &str) -> Result<()> {
        let store = Arc::clone(&self.store);
        let result = store.rename_workflow(playbook, workflow, new_name).await;
        if result.is_ok() {
            if let Some(entry) = self
                .playbook_mut(playbook)
                .and_then(|p| p.workflows.iter_mut().find(|w| w.name == workflow))
            {
                entry.name = new_name.to_string();
            }
            if self.is_loaded(playbook, Some(workflow)) {
                if let Some(loaded) = self.loaded.as_mut() {
                    loaded.name = new_name.to_string();
                    loaded.workflow.name = new_name.to_string();
                }
            }
            self.sort_playbooks();
        }
        self.report(
            result,
            format!("Successfully renamed workflow \"{} - {}\".", playbook, new_name),
            format!("Error renaming workflow \"{} - {}\"", playbook, new_name),
        )
    }

    pub async fn duplicate_workflow(&mut self, playbook: &str, workflow: &str, new_name: &str) -> Result<()> {
        let store = Arc::clone(&self.store);
        let duplicated = store.duplicate_workflow(playbook, workflow, new_name).await;

        let result = duplicated.map(|copy| self.list_workflow(playbook, copy));

        self.report(
            result,
            format!("Successfully duplicated workflow \"{} - {}\".", playbook, new_name),
            format!("Error duplicating workflow \"{} - {}\"", playbook, new_name),
        )
    }

    /// Delete a workflow; a playbook left without workflows is dropped from the list
    pub async fn delete_workflow(&mut self, playbook: &str, workflow: &str) -> Result<()> {
        let store = Arc::clone(&self.store);
        let result = store.delete_workflow(playbook, workflow).await;
        if result.is_ok() {
            if let Some(entry) = self.playbook_mut(playbook) {
                entry.workflows.retain(|w| w.name != workflow);
            }
            self.playbooks
                .retain(|p| p.name != playbook || !p.workflows.is_empty());
            if self.is_loaded(playbook, Some(workflow)) {
                self.close_workflow();
            }
        }
        self.report(
            result,
            format!("Successfully deleted workflow \"{} - {}\".", playbook, workflow),
            format!("Error deleting workflow \"{} - {}\"", playbook, workflow),
        )
    }

    pub fn does_workflow_exist(&self, playbook: &str, workflow: &str) -> bool {
        self.playbooks
            .iter()
            .find(|p| p.name == playbook)
            .is_some_and(|p| p.workflows.iter().any(|w| w.name == workflow))
    }

    pub fn playbook_names(&self) -> Vec<String> {
        self.playbooks.iter().map(|p| p.name.clone()).collect()
    }
}
