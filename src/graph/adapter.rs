/// Graph view adapter
///
/// Translates the workflow into view nodes/edges on load and translates view events back
/// into workflow mutations. The adapter owns no domain entities: steps and view nodes are
/// two separate containers joined only through their shared uid, and every handler gets
/// the current workflow, view and catalog passed in explicitly.

use crate::catalog::{Catalog, Device, ReturnApi};
use crate::error::{Result, StudioError};
use crate::graph::handshake::{DraftState, EdgeDraft};
use crate::graph::view::{
    ElementRef, GraphEvent, GraphView, NodeKind, UndoOp, ViewEdge, ViewElement, ViewNode,
};
use crate::workflow::{Step, Workflow};

/// What the operator is currently editing
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Selection {
    #[default]
    None,
    Step(StepSelection),
    Transition(TransitionSelection),
}

/// A selected step plus the devices it may run against
#[derive(Debug, Clone, PartialEq)]
pub struct StepSelection {
    pub uid: String,
    pub relevant_devices: Vec<Device>,
}

/// A selected transition plus the return statuses of its source action
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionSelection {
    pub transition_uid: String,
    pub return_types: Vec<ReturnApi>,
    pub app: String,
    pub action: String,
}

/// Bidirectional translator between a workflow and a graph view
#[derive(Debug, Default)]
pub struct GraphAdapter {
    selection: Selection,
}

impl GraphAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
    }

    /// View node for a step; the node kind comes from the catalog action
    pub fn node_for_step(step: &Step, catalog: &Catalog, is_start: bool) -> Result<ViewNode> {
        let kind = if catalog.action(&step.app, &step.action)?.event {
            NodeKind::EventAction
        } else {
            NodeKind::Action
        };

        let mut node = ViewNode::new(&step.uid, &step.name, kind, step.position);
        node.is_start_node = is_start;
        Ok(node)
    }

    /// Project a workflow into view elements: nodes first, then edges
    pub fn project(workflow: &Workflow, catalog: &Catalog) -> Result<Vec<ViewElement>> {
        let mut elements = Vec::with_capacity(workflow.steps.len() + workflow.next_steps.len());

        for step in &workflow.steps {
            let is_start = workflow.start.as_deref() == Some(step.uid.as_str());
            elements.push(ViewElement::Node(Self::node_for_step(step, catalog, is_start)?));
        }
        for transition in &workflow.next_steps {
            elements.push(ViewElement::Edge(ViewEdge::new(
                &transition.uid,
                &transition.source_uid,
                &transition.destination_uid,
            )));
        }

        Ok(elements)
    }

    /// Replace the view contents with the given projection
    ///
    /// Events produced by the projection itself are discarded; handlers only see what
    /// happens after the load.
    pub fn load(&mut self, workflow: &Workflow, view: &mut dyn GraphView, elements: Vec<ViewElement>) {
        view.clear();
        view.add(elements);
        Self::apply_start_marker(workflow, view);
        view.take_events();
        self.selection = Selection::None;

        tracing::info!(
            "🗺️ Projected workflow '{}' into view ({} nodes, {} edges)",
            workflow.name,
            workflow.steps.len(),
            workflow.next_steps.len()
        );
    }

    /// Set the start step and keep exactly one node carrying the start marker
    pub fn set_start(&mut self, workflow: &mut Workflow, view: &mut dyn GraphView, uid: Option<&str>) -> Result<()> {
        workflow.set_start(uid)?;
        Self::apply_start_marker(workflow, view);
        Ok(())
    }

    /// Clear the start marker everywhere, then mark the current start node (if any)
    pub fn apply_start_marker(workflow: &Workflow, view: &mut dyn GraphView) {
        for id in view.node_ids() {
            view.set_start_marker(&id, false);
        }
        if let Some(start) = workflow.start.as_deref() {
            view.set_start_marker(start, true);
        }
    }

    /// Dispatch one view event
    pub fn handle_event(
        &mut self,
        event: GraphEvent,
        workflow: &mut Workflow,
        view: &mut dyn GraphView,
        catalog: &Catalog,
    ) -> Result<()> {
        match event {
            GraphEvent::Selected(ElementRef::Node(id)) => {
                self.on_node_select(&id, workflow, catalog);
                Ok(())
            }
            GraphEvent::Selected(ElementRef::Edge(id)) => self.on_edge_select(&id, workflow, catalog),
            GraphEvent::Unselected(_) => {
                self.on_unselect(workflow, view);
                Ok(())
            }
            GraphEvent::NodeAdded(node) => self.on_node_added(&node, workflow, view),
            GraphEvent::NodeRemoved(node) => self.on_node_removed(&node, workflow, view),
            GraphEvent::EdgeRemoved(edge) => {
                self.on_edge_removed(&edge, workflow);
                Ok(())
            }
            GraphEvent::EdgeDrawn { edges, .. } => {
                self.on_edge_drawn(edges, workflow, view);
                Ok(())
            }
            // permanent edges are committed by the handshake, nothing to do on add
            GraphEvent::EdgeAdded(_) => Ok(()),
        }
    }

    fn on_node_select(&mut self, uid: &str, workflow: &Workflow, catalog: &Catalog) {
        self.selection = match workflow.step(uid) {
            Some(step) => Selection::Step(StepSelection {
                uid: step.uid.clone(),
                relevant_devices: catalog.devices_for_app(&step.app),
            }),
            None => {
                tracing::debug!("❓ Selected node '{}' has no step", uid);
                Selection::None
            }
        };
    }

    fn on_edge_select(&mut self, uid: &str, workflow: &Workflow, catalog: &Catalog) -> Result<()> {
        self.selection = Selection::None;

        let transition = workflow
            .transition(uid)
            .ok_or_else(|| StudioError::UnknownTransition(uid.to_string()))?;
        let source = workflow
            .step(&transition.source_uid)
            .ok_or_else(|| StudioError::UnknownStep(transition.source_uid.clone()))?;
        let action = catalog.action(&source.app, &source.action)?;

        self.selection = Selection::Transition(TransitionSelection {
            transition_uid: transition.uid.clone(),
            return_types: action.returns.clone(),
            app: source.app.clone(),
            action: source.action.clone(),
        });
        Ok(())
    }

    fn on_unselect(&mut self, workflow: &Workflow, view: &mut dyn GraphView) {
        // commit label edits made while the step was selected
        if let Selection::Step(selected) = &self.selection {
            if let Some(step) = workflow.step(&selected.uid) {
                view.set_label(&step.uid, &step.name);
            }
        }

        if view.selected().is_empty() {
            self.selection = Selection::None;
        }
    }

    fn on_node_added(&mut self, node: &ViewNode, workflow: &mut Workflow, view: &mut dyn GraphView) -> Result<()> {
        if view.node_count() == 1 && view.node(&node.id).is_some() {
            tracing::debug!("🎯 Only node in graph, making '{}' the start", node.id);
            self.set_start(workflow, view, Some(&node.id))?;
        }
        Ok(())
    }

    fn on_node_removed(&mut self, node: &ViewNode, workflow: &mut Workflow, view: &mut dyn GraphView) -> Result<()> {
        if matches!(&self.selection, Selection::Step(s) if s.uid == node.id) {
            self.selection = Selection::None;
        }

        if !workflow.has_step(&node.id) {
            return Ok(());
        }

        let was_start = workflow.start.as_deref() == Some(node.id.as_str());
        workflow.remove_step(&node.id)?;
        if was_start {
            Self::apply_start_marker(workflow, view);
        }
        Ok(())
    }

    fn on_edge_removed(&mut self, edge: &ViewEdge, workflow: &mut Workflow) {
        if edge.temp {
            return;
        }

        if matches!(&self.selection, Selection::Transition(t) if t.transition_uid == edge.id) {
            self.selection = Selection::None;
        }

        if workflow.remove_transition(&edge.source, &edge.target).is_some() {
            tracing::debug!("✂️ Removed transition '{}' → '{}'", edge.source, edge.target);
        }
    }

    /// Run the edge creation handshake for freshly drawn edges
    ///
    /// Every drawn edge is marked temporary and taken out of the view; duplicates stay
    /// out, the rest get their transition and come back through one undo-tracked add.
    pub fn on_edge_drawn(&mut self, edges: Vec<ViewEdge>, workflow: &mut Workflow, view: &mut dyn GraphView) -> Vec<EdgeDraft> {
        let mut drafts: Vec<EdgeDraft> = edges.into_iter().map(EdgeDraft::drawn).collect();
        let ids: Vec<String> = drafts.iter().map(|d| d.edge.id.clone()).collect();

        for id in &ids {
            view.set_edge_temp(id, true);
        }
        for draft in &mut drafts {
            draft.resolve(workflow);
        }

        view.remove(&ids);

        let committed: Vec<ViewElement> = drafts
            .iter()
            .filter_map(EdgeDraft::committed_edge)
            .map(ViewElement::Edge)
            .collect();
        if !committed.is_empty() {
            view.perform(UndoOp::Add(committed));
        }

        let rejected = drafts.iter().filter(|d| d.state == DraftState::Rejected).count();
        if rejected > 0 {
            tracing::warn!("🚫 Rejected {} drawn edges that duplicate existing transitions", rejected);
        }

        drafts
    }
}
