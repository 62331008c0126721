// File reads, checksums and atomic writes
pub mod file;

// Code-fence stripping for model replies
pub mod sanitize;

// Edit and review prompt composition
pub mod prompt;

// LLM provider clients
pub mod provider;

// Backup / restore / edit transaction
pub mod controller;

// Task-based shared access to a controller
pub mod session;

// Language detection
pub mod language;

// Configuration
pub mod config;

// JSON output module
pub mod json;

pub mod logging;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

// Re-exports
pub use config::{Config, ProviderConfig, ProviderKind, load_config};
pub use controller::{EditController, TransactionError};
pub use file::{FileContent, FileError, checksum, read_file, write_atomic};
pub use json::{CommandContext, CommandResponse, generate_execution_id};
pub use language::{Language, detect_language};
pub use prompt::{DEFAULT_INSTRUCTION, EditRequest, ReviewRequest};
pub use provider::{EditClient, ProviderError, client_from_config};
pub use sanitize::sanitize;
pub use session::{ControllerHandle, Operation, TaskState, join_task};
