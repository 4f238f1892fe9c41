/// Workflow Domain Layer
///
/// This module holds the in-memory model of playbooks and workflows and the rules that
/// keep it valid:
/// - Type definitions (Playbook, Workflow, Step, Transition, Argument)
/// - Mutation operations that preserve structural invariants
/// - The argument selector codec
/// - The save sanitizer

// Core playbook type definitions
pub mod types;

// Invariant-preserving mutations on Workflow
pub mod model;

// Dotted-string <-> segment selector conversion
pub mod selector;

// Argument normalization before persistence
pub mod sanitize;

// Re-export commonly used types
pub use selector::{Selector, SelectorSegment};
pub use types::{
    Argument, Condition, Playbook, Position, Step, Transform, Transition, Trigger, Workflow,
    WorkflowResult,
};
