/// Graph view collaborator interface
///
/// The interactive graph is an external component that renders nodes and edges, tracks
/// selection, and keeps an undo log. The editor talks to it only through `GraphView`,
/// and hears back from it only through `GraphEvent`s keyed by the shared uid.

use crate::workflow::Position;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Node styling kind derived from the catalog action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Action,
    EventAction,
}

/// Execution overlay tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Highlight {
    #[serde(rename = "good-highlighted")]
    Good,
    #[serde(rename = "bad-highlighted")]
    Bad,
}

impl Highlight {
    pub fn class_name(&self) -> &'static str {
        match self {
            Highlight::Good => "good-highlighted",
            Highlight::Bad => "bad-highlighted",
        }
    }
}

/// View-native node; `id` equals the uid of the step it shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewNode {
    pub id: String,
    pub label: String,
    pub is_start_node: bool,
    pub kind: NodeKind,
    pub position: Position,
    #[serde(default)]
    pub classes: BTreeSet<Highlight>,
    /// Id of the node this one was pasted from
    #[serde(default)]
    pub origin: Option<String>,
}

impl ViewNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind, position: Position) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            is_start_node: false,
            kind,
            position,
            classes: BTreeSet::new(),
            origin: None,
        }
    }
}

/// View-native edge; `id` equals the uid of the transition it shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Set while an edge-drawing handshake removes and re-adds the edge
    #[serde(default)]
    pub temp: bool,
}

impl ViewEdge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            temp: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewElement {
    Node(ViewNode),
    Edge(ViewEdge),
}

impl ViewElement {
    pub fn id(&self) -> &str {
        match self {
            ViewElement::Node(n) => &n.id,
            ViewElement::Edge(e) => &e.id,
        }
    }
}

/// Identity of a view element in selection events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementRef {
    Node(String),
    Edge(String),
}

/// Event emitted by the view
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    Selected(ElementRef),
    Unselected(ElementRef),
    NodeAdded(ViewNode),
    NodeRemoved(ViewNode),
    EdgeAdded(ViewEdge),
    EdgeRemoved(ViewEdge),
    /// The user finished drawing edges from `source`; the edges are already materialized
    EdgeDrawn { source: String, edges: Vec<ViewEdge> },
}

/// Operation routed through the view's undo-tracked facility
#[derive(Debug, Clone, PartialEq)]
pub enum UndoOp {
    Add(Vec<ViewElement>),
    Remove(Vec<String>),
    Paste,
}

/// Visible area in model coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Extent {
    pub fn center(&self) -> Position {
        Position::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }
}

/// Interactive graph collaborator
pub trait GraphView {
    /// Add elements outside the undo log (projection on load)
    fn add(&mut self, elements: Vec<ViewElement>);

    /// Remove elements outside the undo log; removing a node also removes its edges.
    /// Returns what was removed.
    fn remove(&mut self, ids: &[String]) -> Vec<ViewElement>;

    /// Run an operation as one undo log entry, returning the affected elements
    /// (for `Paste`, the newly created nodes)
    fn perform(&mut self, op: UndoOp) -> Vec<ViewElement>;

    /// Drop every element, the selection and the undo log
    fn clear(&mut self);

    fn node(&self, id: &str) -> Option<&ViewNode>;

    fn edge(&self, id: &str) -> Option<&ViewEdge>;

    /// Node ids in insertion order
    fn node_ids(&self) -> Vec<String>;

    fn node_count(&self) -> usize {
        self.node_ids().len()
    }

    /// Currently selected element ids
    fn selected(&self) -> Vec<String>;

    fn set_label(&mut self, id: &str, label: &str);

    fn set_start_marker(&mut self, id: &str, is_start: bool);

    fn set_edge_temp(&mut self, id: &str, temp: bool);

    /// Tag a node; false if no such node exists
    fn add_class(&mut self, id: &str, class: Highlight) -> bool;

    /// Remove the given tags from every node
    fn remove_classes(&mut self, classes: &[Highlight]);

    /// Put clones of the given elements into the view clipboard
    fn copy(&mut self, ids: &[String]);

    /// Convert a rendered (screen) position into model coordinates
    fn model_position(&self, rendered: Position) -> Position;

    fn extent(&self) -> Extent;

    /// Drain pending events in emission order
    fn take_events(&mut self) -> Vec<GraphEvent>;

    /// Current node positions keyed by id
    fn positions(&self) -> HashMap<String, Position> {
        self.node_ids()
            .into_iter()
            .filter_map(|id| self.node(&id).map(|n| (id.clone(), n.position)))
            .collect()
    }
}
