/// Graph View Layer
///
/// Everything between the workflow model and the interactive node/edge canvas:
/// - The `GraphView` collaborator interface and its event vocabulary
/// - A petgraph-backed headless view
/// - The edge creation handshake
/// - The adapter translating in both directions

// Collaborator interface (nodes, edges, events, undo ops)
pub mod view;

// Headless StableDiGraph implementation of GraphView
pub mod memory;

// Drawn -> Rejected | Committed edge drafts
pub mod handshake;

// Workflow <-> view translation and event handlers
pub mod adapter;

pub use adapter::{GraphAdapter, Selection, StepSelection, TransitionSelection};
pub use handshake::{DraftState, EdgeDraft};
pub use memory::{MemoryGraph, Viewport};
pub use view::{
    ElementRef, Extent, GraphEvent, GraphView, Highlight, NodeKind, UndoOp, ViewEdge, ViewElement,
    ViewNode,
};
