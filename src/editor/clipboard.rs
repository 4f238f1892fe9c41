/// Clipboard and insertion manager
///
/// Creates steps from catalog actions and runs copy/cut/paste against the view clipboard.
/// The view only copies nodes; the matching steps are snapshotted here at copy time so a
/// paste still finds them after the originals were cut.

use crate::catalog::Catalog;
use crate::error::Result;
use crate::graph::{GraphAdapter, GraphView, UndoOp, ViewElement};
use crate::workflow::{Argument, Position, Selector, Step, Workflow};
use std::collections::HashMap;
use uuid::Uuid;

/// Where a new step lands
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InsertAt {
    /// Screen coordinates, e.g. a drop point
    Rendered(Position),
    /// Model coordinates
    Model(Position),
}

#[derive(Debug, Default)]
pub struct ClipboardManager {
    /// Steps behind the copied nodes, keyed by their uid at copy time
    snapshots: HashMap<String, Step>,
}

impl ClipboardManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new step for `app`/`action` and its node, returning the new uid
    ///
    /// Inputs are pre-filled from the parameter schema defaults. The step is named after
    /// the action, numbered when the action is already used ("echo", "echo 2", ...).
    pub fn insert(
        &mut self,
        workflow: &mut Workflow,
        view: &mut dyn GraphView,
        catalog: &Catalog,
        app: &str,
        action: &str,
        at: InsertAt,
    ) -> Result<String> {
        let action_api = catalog.action(app, action)?;

        let inputs = action_api
            .parameters
            .iter()
            .map(|parameter| Argument {
                name: parameter.name.clone(),
                value: parameter.schema.default.clone(),
                reference: None,
                selector: Some(Selector::Text(String::new())),
            })
            .collect();

        let existing = workflow.count_action(action);
        let name = if existing == 0 {
            action.to_string()
        } else {
            format!("{} {}", action, existing + 1)
        };

        let position = match at {
            InsertAt::Rendered(rendered) => view.model_position(rendered),
            InsertAt::Model(position) => position,
        };

        let step = Step {
            uid: Uuid::new_v4().to_string(),
            name,
            app: app.to_string(),
            action: action.to_string(),
            inputs,
            position,
            ..Step::default()
        };
        let node = GraphAdapter::node_for_step(&step, catalog, false)?;
        let uid = step.uid.clone();

        workflow.add_step(step)?;
        view.perform(UndoOp::Add(vec![ViewElement::Node(node)]));

        tracing::info!("➕ Inserted step '{}' ({}/{})", uid, app, action);
        Ok(uid)
    }

    /// Insert at the center of the visible area
    pub fn insert_at_center(
        &mut self,
        workflow: &mut Workflow,
        view: &mut dyn GraphView,
        catalog: &Catalog,
        app: &str,
        action: &str,
    ) -> Result<String> {
        let center = view.extent().center();
        self.insert(workflow, view, catalog, app, action, InsertAt::Model(center))
    }

    /// Copy the selected elements into the view clipboard
    pub fn copy(&mut self, workflow: &Workflow, view: &mut dyn GraphView) {
        let selected = view.selected();
        self.snapshots = selected
            .iter()
            .filter_map(|uid| workflow.step(uid).map(|s| (uid.clone(), s.clone())))
            .collect();
        view.copy(&selected);
    }

    /// Copy the selection, then remove it as one undoable operation
    pub fn cut(&mut self, workflow: &Workflow, view: &mut dyn GraphView) {
        let selected = view.selected();
        if selected.is_empty() {
            return;
        }
        self.copy(workflow, view);
        view.perform(UndoOp::Remove(selected));
    }

    /// Paste the view clipboard, creating one step per pasted node
    ///
    /// Each new step is a copy of the step the node was copied from, under the node's fresh
    /// uid and position. Transitions are not recreated. Returns the new uids.
    pub fn paste(&mut self, workflow: &mut Workflow, view: &mut dyn GraphView) -> Result<Vec<String>> {
        let pasted = view.perform(UndoOp::Paste);
        let mut uids = Vec::with_capacity(pasted.len());
        let mut orphans = Vec::new();

        for element in pasted {
            let ViewElement::Node(node) = element else {
                continue;
            };

            let origin = node
                .origin
                .as_deref()
                .and_then(|origin| workflow.step(origin).or_else(|| self.snapshots.get(origin)))
                .cloned();

            let Some(mut step) = origin else {
                tracing::warn!("⚠️ Pasted node '{}' has no source step, dropping it", node.id);
                orphans.push(node.id);
                continue;
            };

            step.uid = node.id.clone();
            step.position = node.position;
            view.set_start_marker(&node.id, false);
            workflow.add_step(step)?;
            uids.push(node.id);
        }

        if !orphans.is_empty() {
            view.remove(&orphans);
        }

        tracing::debug!("📋 Pasted {} steps", uids.len());
        Ok(uids)
    }

    /// Remove the selected elements as one undoable operation
    pub fn remove_selected(&mut self, view: &mut dyn GraphView) {
        let selected = view.selected();
        if !selected.is_empty() {
            view.perform(UndoOp::Remove(selected));
        }
    }
}
