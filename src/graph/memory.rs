/// In-memory graph view backed by petgraph
///
/// A headless `GraphView` used by the monitor binary and the tests. It keeps nodes and
/// edges in a `StableDiGraph` with uid <-> index maps, queues events the way an
/// interactive canvas would emit them, and records every undo-tracked operation.

use crate::graph::view::{
    ElementRef, Extent, GraphEvent, GraphView, Highlight, UndoOp, ViewEdge, ViewElement, ViewNode,
};
use crate::workflow::Position;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::Direction;
use std::collections::HashMap;
use uuid::Uuid;

/// Pan/zoom state; rendered = model * zoom + pan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub pan: Position,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Position::default(),
            zoom: 1.0,
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Headless graph view
#[derive(Debug, Default)]
pub struct MemoryGraph {
    /// Node and edge storage; indices stay valid across removals
    graph: StableDiGraph<ViewNode, ViewEdge>,
    /// Mapping from element id to graph index
    node_index: HashMap<String, NodeIndex>,
    edge_index: HashMap<String, EdgeIndex>,
    /// Node ids in insertion order (petgraph reuses vacant indices)
    node_order: Vec<String>,
    selected: Vec<String>,
    clipboard: Vec<ViewNode>,
    history: Vec<UndoOp>,
    events: Vec<GraphEvent>,
    viewport: Viewport,
    paste_offset: f64,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset applied to pasted nodes
    pub fn with_paste_offset(mut self, offset: f64) -> Self {
        self.paste_offset = offset;
        self
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Undo-tracked operations performed so far, oldest first
    pub fn history(&self) -> &[UndoOp] {
        &self.history
    }

    pub fn edge_ids(&self) -> Vec<String> {
        self.graph
            .edge_indices()
            .filter_map(|idx| self.graph.edge_weight(idx).map(|e| e.id.clone()))
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_index.len()
    }

    pub fn clipboard(&self) -> &[ViewNode] {
        &self.clipboard
    }

    // User gestures

    /// Select an element, emitting `Selected`
    pub fn select(&mut self, id: &str) {
        let Some(element) = self.element_ref(id) else {
            tracing::warn!("❓ Cannot select unknown element '{}'", id);
            return;
        };
        if !self.selected.iter().any(|s| s == id) {
            self.selected.push(id.to_string());
            self.events.push(GraphEvent::Selected(element));
        }
    }

    /// Unselect an element, emitting `Unselected`
    pub fn unselect(&mut self, id: &str) {
        if let Some(pos) = self.selected.iter().position(|s| s == id) {
            self.selected.remove(pos);
            if let Some(element) = self.element_ref(id) {
                self.events.push(GraphEvent::Unselected(element));
            }
        }
    }

    pub fn unselect_all(&mut self) {
        for id in self.selected.clone() {
            self.unselect(&id);
        }
    }

    /// Drag a node to a new model position
    pub fn move_node(&mut self, id: &str, position: Position) {
        if let Some(node) = self.node_index.get(id).and_then(|idx| self.graph.node_weight_mut(*idx)) {
            node.position = position;
        }
    }

    /// Draw edges from `source` to each target, as an edge-drawing gesture would
    ///
    /// The edges are materialized immediately (emitting `EdgeAdded`) and then announced
    /// together in one `EdgeDrawn` event. Returns the new edge ids.
    pub fn draw_edges(&mut self, source: &str, targets: &[&str]) -> Vec<String> {
        let mut drawn = Vec::new();
        for target in targets {
            let edge = ViewEdge::new(Uuid::new_v4().to_string(), source, *target);
            if self.insert_edge(edge.clone()) {
                drawn.push(edge);
            }
        }

        let ids = drawn.iter().map(|e| e.id.clone()).collect();
        if !drawn.is_empty() {
            self.events.push(GraphEvent::EdgeDrawn {
                source: source.to_string(),
                edges: drawn,
            });
        }
        ids
    }

    // Internals

    fn element_ref(&self, id: &str) -> Option<ElementRef> {
        if self.node_index.contains_key(id) {
            Some(ElementRef::Node(id.to_string()))
        } else if self.edge_index.contains_key(id) {
            Some(ElementRef::Edge(id.to_string()))
        } else {
            None
        }
    }

    fn insert_node(&mut self, node: ViewNode) -> bool {
        if self.node_index.contains_key(&node.id) {
            tracing::warn!("⚠️ Node '{}' already in graph, skipping", node.id);
            return false;
        }

        let id = node.id.clone();
        let idx = self.graph.add_node(node.clone());
        self.node_index.insert(id.clone(), idx);
        self.node_order.push(id);
        self.events.push(GraphEvent::NodeAdded(node));
        true
    }

    fn insert_edge(&mut self, edge: ViewEdge) -> bool {
        if self.edge_index.contains_key(&edge.id) {
            tracing::warn!("⚠️ Edge '{}' already in graph, skipping", edge.id);
            return false;
        }
        let (Some(&from), Some(&to)) = (self.node_index.get(&edge.source), self.node_index.get(&edge.target)) else {
            tracing::warn!(
                "⚠️ Edge '{}' references unknown node: {} → {}",
                edge.id,
                edge.source,
                edge.target
            );
            return false;
        };

        let idx = self.graph.add_edge(from, to, edge.clone());
        self.edge_index.insert(edge.id.clone(), idx);
        self.events.push(GraphEvent::EdgeAdded(edge));
        true
    }

    fn remove_edge_by_id(&mut self, id: &str) -> Option<ViewEdge> {
        let idx = self.edge_index.remove(id)?;
        let edge = self.graph.remove_edge(idx)?;
        self.selected.retain(|s| s != id);
        self.events.push(GraphEvent::EdgeRemoved(edge.clone()));
        Some(edge)
    }

    fn remove_element(&mut self, id: &str) -> Vec<ViewElement> {
        if let Some(&idx) = self.node_index.get(id) {
            let mut removed = Vec::new();

            // connected edges go first, as a canvas would remove them
            let incident: Vec<String> = self
                .graph
                .edges_directed(idx, Direction::Outgoing)
                .chain(self.graph.edges_directed(idx, Direction::Incoming))
                .map(|e| e.weight().id.clone())
                .collect();
            for edge_id in incident {
                if let Some(edge) = self.remove_edge_by_id(&edge_id) {
                    removed.push(ViewElement::Edge(edge));
                }
            }

            self.node_index.remove(id);
            self.node_order.retain(|n| n != id);
            self.selected.retain(|s| s != id);
            if let Some(node) = self.graph.remove_node(idx) {
                self.events.push(GraphEvent::NodeRemoved(node.clone()));
                removed.push(ViewElement::Node(node));
            }
            return removed;
        }

        self.remove_edge_by_id(id)
            .map(|e| vec![ViewElement::Edge(e)])
            .unwrap_or_default()
    }

    fn add_elements(&mut self, elements: Vec<ViewElement>) -> Vec<ViewElement> {
        // nodes before edges so edges can find their endpoints
        let (nodes, edges): (Vec<_>, Vec<_>) = elements
            .into_iter()
            .partition(|e| matches!(e, ViewElement::Node(_)));

        let mut added = Vec::new();
        for element in nodes.into_iter().chain(edges) {
            let inserted = match &element {
                ViewElement::Node(n) => self.insert_node(n.clone()),
                ViewElement::Edge(e) => self.insert_edge(e.clone()),
            };
            if inserted {
                added.push(element);
            }
        }
        added
    }

    fn paste_clipboard(&mut self) -> Vec<ViewElement> {
        let mut pasted = Vec::new();
        for original in self.clipboard.clone() {
            let mut node = original.clone();
            node.id = Uuid::new_v4().to_string();
            node.origin = Some(original.id.clone());
            node.is_start_node = false;
            node.classes.clear();
            node.position = Position::new(
                original.position.x + self.paste_offset,
                original.position.y + self.paste_offset,
            );
            if self.insert_node(node.clone()) {
                pasted.push(ViewElement::Node(node));
            }
        }
        pasted
    }
}

impl GraphView for MemoryGraph {
    fn add(&mut self, elements: Vec<ViewElement>) {
        self.add_elements(elements);
    }

    fn remove(&mut self, ids: &[String]) -> Vec<ViewElement> {
        ids.iter().flat_map(|id| self.remove_element(id)).collect()
    }

    fn perform(&mut self, op: UndoOp) -> Vec<ViewElement> {
        let affected = match &op {
            UndoOp::Add(elements) => self.add_elements(elements.clone()),
            UndoOp::Remove(ids) => ids.iter().flat_map(|id| self.remove_element(id)).collect(),
            UndoOp::Paste => self.paste_clipboard(),
        };
        self.history.push(op);
        affected
    }

    fn clear(&mut self) {
        self.graph.clear();
        self.node_index.clear();
        self.edge_index.clear();
        self.node_order.clear();
        self.selected.clear();
        self.history.clear();
        self.events.clear();
    }

    fn node(&self, id: &str) -> Option<&ViewNode> {
        self.node_index
            .get(id)
            .and_then(|idx| self.graph.node_weight(*idx))
    }

    fn edge(&self, id: &str) -> Option<&ViewEdge> {
        self.edge_index
            .get(id)
            .and_then(|idx| self.graph.edge_weight(*idx))
    }

    fn node_ids(&self) -> Vec<String> {
        self.node_order.clone()
    }

    fn node_count(&self) -> usize {
        self.node_order.len()
    }

    fn selected(&self) -> Vec<String> {
        self.selected.clone()
    }

    fn set_label(&mut self, id: &str, label: &str) {
        if let Some(node) = self.node_index.get(id).and_then(|idx| self.graph.node_weight_mut(*idx)) {
            node.label = label.to_string();
        }
    }

    fn set_start_marker(&mut self, id: &str, is_start: bool) {
        if let Some(node) = self.node_index.get(id).and_then(|idx| self.graph.node_weight_mut(*idx)) {
            node.is_start_node = is_start;
        }
    }

    fn set_edge_temp(&mut self, id: &str, temp: bool) {
        if let Some(edge) = self.edge_index.get(id).and_then(|idx| self.graph.edge_weight_mut(*idx)) {
            edge.temp = temp;
        }
    }

    fn add_class(&mut self, id: &str, class: Highlight) -> bool {
        match self.node_index.get(id).and_then(|idx| self.graph.node_weight_mut(*idx)) {
            Some(node) => {
                node.classes.insert(class);
                true
            }
            None => false,
        }
    }

    fn remove_classes(&mut self, classes: &[Highlight]) {
        for node in self.graph.node_weights_mut() {
            for class in classes {
                node.classes.remove(class);
            }
        }
    }

    fn copy(&mut self, ids: &[String]) {
        // nodes only; edges are not carried through the clipboard
        self.clipboard = ids
            .iter()
            .filter_map(|id| self.node(id).cloned())
            .collect();
        tracing::debug!("📋 Copied {} nodes to clipboard", self.clipboard.len());
    }

    fn model_position(&self, rendered: Position) -> Position {
        let Viewport { pan, zoom, .. } = self.viewport;
        Position::new((rendered.x - pan.x) / zoom, (rendered.y - pan.y) / zoom)
    }

    fn extent(&self) -> Extent {
        let Viewport { pan, zoom, width, height } = self.viewport;
        Extent {
            x1: -pan.x / zoom,
            y1: -pan.y / zoom,
            x2: (width - pan.x) / zoom,
            y2: (height - pan.y) / zoom,
        }
    }

    fn take_events(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.events)
    }
}
