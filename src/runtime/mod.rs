/// Execution Monitoring Layer
///
/// Live feedback from workflow runs:
/// - SSE parsing of the server's result stream
/// - A background subscription that forwards decoded results
/// - The overlay that paints outcomes onto the graph view

// Incremental server-sent events parser
pub mod sse;

// Background result stream subscription
pub mod stream;

// Success/failure highlighting and result log
pub mod overlay;

pub use overlay::{ExecutionOverlay, LoggedResult};
pub use stream::{ResultSubscription, StreamMessage};
