//! Backup / restore / edit transaction over one working file.
//!
//! An edit attempt either succeeds completely (file rewritten, backup holds
//! the previous content) or leaves the working file as it was. The order is
//! fixed: backup, then the provider call, then the write. The provider is
//! never contacted without a fresh backup on disk.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::file::{self, FileError, read_file, write_atomic};
use crate::prompt::EditRequest;
use crate::provider::{EditClient, ProviderError};
use crate::sanitize::sanitize;

/// Errors surfaced by [`EditController`] operations.
///
/// All of them are recoverable; the caller decides whether to retry or restore.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("file is not valid UTF-8: {}", .0.display())]
    Decode(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no backup exists at {}", .0.display())]
    NoBackup(PathBuf),

    #[error("backup failed, edit aborted: {0}")]
    BackupFailed(#[source] Box<TransactionError>),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("writing {} failed (backup still available): {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: FileError,
    },

    #[error("an edit is already in progress")]
    Busy,

    #[error("background task aborted: {0}")]
    TaskAborted(String),
}

impl TransactionError {
    /// Stable machine-readable tag.
    pub fn kind(&self) -> &'static str {
        match self {
            TransactionError::NotFound(_) => "not_found",
            TransactionError::Decode(_) => "decode_error",
            TransactionError::Io { .. } => "io_error",
            TransactionError::NoBackup(_) => "no_backup",
            TransactionError::BackupFailed(_) => "backup_failed",
            TransactionError::Provider(_) => "provider_error",
            TransactionError::WriteFailed { .. } => "write_failed",
            TransactionError::Busy => "busy",
            TransactionError::TaskAborted(_) => "task_aborted",
        }
    }
}

impl From<FileError> for TransactionError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::NotFound(p) => TransactionError::NotFound(p),
            FileError::InvalidUtf8(p) => TransactionError::Decode(p),
            FileError::Io { path, source } => TransactionError::Io { path, source },
        }
    }
}

/// Owner of one working file and its one-deep backup slot.
///
/// Operations run sequentially and to completion. Wrap the controller in a
/// [`ControllerHandle`](crate::session::ControllerHandle) to share it between
/// tasks.
pub struct EditController {
    working_path: PathBuf,
    content: Option<String>,
    backup_path: PathBuf,
    client: Arc<dyn EditClient>,
}

impl EditController {
    pub fn new(
        working_path: impl Into<PathBuf>,
        backup_path: impl Into<PathBuf>,
        client: Arc<dyn EditClient>,
    ) -> Self {
        Self {
            working_path: working_path.into(),
            content: None,
            backup_path: backup_path.into(),
            client,
        }
    }

    pub fn from_config(config: &Config, client: Arc<dyn EditClient>) -> Self {
        Self::new(&config.working_file, &config.backup_file, client)
    }

    pub fn working_path(&self) -> &Path {
        &self.working_path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// In-memory content, if the working file has been loaded.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Whether the backup slot has ever been created.
    pub fn has_backup(&self) -> bool {
        self.backup_path.is_file()
    }

    /// Read `path` and make it the working file.
    ///
    /// On failure the previously tracked path and content are kept.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<&str, TransactionError> {
        let loaded = read_file(path.as_ref())?;
        info!(path = %loaded.path.display(), checksum = %loaded.checksum, "loaded working file");
        self.working_path = loaded.path;
        Ok(self.content.insert(loaded.content).as_str())
    }

    /// Re-read the tracked working file from disk.
    pub fn reload(&mut self) -> Result<&str, TransactionError> {
        let path = self.working_path.clone();
        self.load(path)
    }

    /// Copy the working file as it is on disk into the backup slot, replacing
    /// any earlier backup. The in-memory content is refreshed too.
    pub fn backup(&mut self) -> Result<(), TransactionError> {
        self.snapshot_to_backup().map(|_| ())
    }

    /// Re-read the working file, write it to the backup slot and hand back
    /// the content that was saved.
    fn snapshot_to_backup(&mut self) -> Result<String, TransactionError> {
        let snapshot = self.reload()?.to_string();
        write_atomic(&self.backup_path, &snapshot)?;
        info!(
            backup = %self.backup_path.display(),
            checksum = %file::checksum(&snapshot),
            "backup created"
        );
        Ok(snapshot)
    }

    /// Put the backup content back into the working file, on disk and in memory.
    ///
    /// Reverts exactly one generation. The backup slot is left untouched.
    pub fn restore(&mut self) -> Result<String, TransactionError> {
        if !self.has_backup() {
            return Err(TransactionError::NoBackup(self.backup_path.clone()));
        }
        let backup = read_file(&self.backup_path).map_err(|e| match e {
            FileError::NotFound(p) => TransactionError::NoBackup(p),
            other => other.into(),
        })?;

        write_atomic(&self.working_path, &backup.content)?;
        info!(
            path = %self.working_path.display(),
            checksum = %backup.checksum,
            "restored working file from backup"
        );
        self.content = Some(backup.content.clone());
        Ok(backup.content)
    }

    /// Rewrite the working file according to `instruction`.
    ///
    /// # Returns
    /// * `Ok(String)` - The sanitized content now on disk
    /// * `Err(TransactionError::BackupFailed)` - Nothing was sent to the provider
    /// * `Err(TransactionError::Provider)` - Working file untouched, backup refreshed
    /// * `Err(TransactionError::WriteFailed)` - Backup holds the pre-edit content
    #[instrument(skip_all, fields(file = %self.working_path.display()))]
    pub async fn apply_edit(&mut self, instruction: &str) -> Result<String, TransactionError> {
        let snapshot = self.snapshot_to_backup().map_err(|e| {
            warn!(error = %e, "backup failed; provider not contacted");
            TransactionError::BackupFailed(Box::new(e))
        })?;

        let request = EditRequest::new(instruction, &snapshot);
        debug!(instruction = request.instruction(), "composed edit request");
        let prompt = request.render();

        let raw = self.client.generate(&prompt).await.map_err(|e| {
            warn!(error = %e, "provider call failed; working file untouched");
            TransactionError::Provider(e)
        })?;

        let cleaned = sanitize(&raw);
        debug!(raw_len = raw.len(), sanitized_len = cleaned.len(), "sanitized response");
        if cleaned.is_empty() {
            warn!("provider response was empty after sanitization");
            return Err(ProviderError::Empty.into());
        }

        write_atomic(&self.working_path, &cleaned).map_err(|source| {
            warn!(error = %source, "write failed; restore from backup to recover");
            TransactionError::WriteFailed {
                path: self.working_path.clone(),
                source,
            }
        })?;
        info!(checksum = %file::checksum(&cleaned), "edit applied");

        self.content = Some(cleaned.clone());
        Ok(cleaned)
    }

    /// Advisory review of the working file as it is on disk. Writes nothing.
    pub async fn review(&mut self) -> Result<String, TransactionError> {
        let content = self.reload()?.to_string();
        let commentary = self.client.review(&content).await?;
        if commentary.is_empty() {
            return Err(ProviderError::Empty.into());
        }
        Ok(commentary)
    }
}
