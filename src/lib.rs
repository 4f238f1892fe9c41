/// Mechaway Studio: workflow graph synchronization engine
///
/// This library keeps a playbook/workflow domain model in sync with an interactive
/// node/edge graph view, persists workflows through a playbook store, and paints live
/// execution results onto the graph.

// Core configuration and setup
pub mod config;

// Error taxonomy shared by every layer
pub mod error;

// Workflow domain layer - types, invariant-preserving mutations, selectors, sanitizer
pub mod workflow;

// Action catalog - installed apps, actions and devices with hot reload
pub mod catalog;

// Graph view layer - view interface, petgraph-backed view, adapter and edge handshake
pub mod graph;

// Execution monitoring - result stream and overlay
pub mod runtime;

// Editor layer - insertion, clipboard and the editing session
pub mod editor;

// Remote collaborators - playbook server client and authentication
pub mod api;

// Local SQLite playbook store
pub mod store;

// Studio setup and initialization
pub mod studio;

// Re-export commonly used types for external consumers
pub use editor::EditorSession;
pub use error::{Result, StudioError};
pub use graph::{GraphAdapter, GraphView, MemoryGraph};
pub use studio::{create_studio, run_studio};
pub use workflow::{Playbook, Step, Transition, Workflow};
