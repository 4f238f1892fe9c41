/// Editor Layer
///
/// The operator-facing half of the studio:
/// - Step insertion and copy/cut/paste
/// - The editing session tying store, view, adapter and result stream together

// Catalog-driven insertion and clipboard handling
pub mod clipboard;

// Loaded workflow, event loop, notices and playbook list
pub mod session;

pub use clipboard::{ClipboardManager, InsertAt};
pub use session::{EditorSession, LoadedWorkflow, Notice, NoticeLevel};
