use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Content of a text file read into memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    /// Path the content was read from
    pub path: PathBuf,
    /// File content as valid UTF-8 string
    pub content: String,
    /// BLAKE3 hash of the content (hex-encoded)
    pub checksum: String,
}

/// Error types for file operations
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid UTF-8 in file: {}", .0.display())]
    InvalidUtf8(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileError {
    fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            FileError::NotFound(path.to_path_buf())
        } else {
            FileError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Hex-encoded BLAKE3 checksum of `content`.
pub fn checksum(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}

/// Read a file from disk with UTF-8 validation
///
/// # Arguments
/// * `path` - Path to the file to read
///
/// # Returns
/// * `Ok(FileContent)` - File content with its checksum
/// * `Err(FileError)` - File not found, I/O error, or invalid UTF-8
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<FileContent, FileError> {
    let path_ref = path.as_ref();

    let bytes = fs::read(path_ref).map_err(|e| FileError::io(path_ref, e))?;

    let content =
        String::from_utf8(bytes).map_err(|_| FileError::InvalidUtf8(path_ref.to_path_buf()))?;

    let checksum = checksum(&content);
    debug!(path = %path_ref.display(), len = content.len(), %checksum, "read file");

    Ok(FileContent {
        path: path_ref.to_path_buf(),
        content,
        checksum,
    })
}

/// Replace the file at `path` with `contents` (temp file + rename).
///
/// The temp file lives next to the target so the rename never crosses a
/// filesystem. A reader observes either the old or the new content.
pub fn write_atomic<P: AsRef<Path>>(path: P, contents: &str) -> Result<(), FileError> {
    let path_ref = path.as_ref();
    let tmp_path = temp_path_for(path_ref);

    if let Err(e) = fs::write(&tmp_path, contents) {
        let _ = fs::remove_file(&tmp_path);
        return Err(FileError::io(&tmp_path, e));
    }
    if let Err(e) = fs::rename(&tmp_path, path_ref) {
        let _ = fs::remove_file(&tmp_path);
        return Err(FileError::io(path_ref, e));
    }

    debug!(path = %path_ref.display(), len = contents.len(), "wrote file");
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.devalchemy.tmp"))
}
