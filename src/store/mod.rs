/// Local Storage Layer
///
/// Offline implementation of the playbook store and catalog source.

// SQLite tables for playbooks, workflows, apps and devices
pub mod sqlite;

pub use sqlite::SqlitePlaybookStore;
