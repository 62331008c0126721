use serde::{Deserialize, Serialize};
use std::path::Path;

/// Web languages a working file can be written in
///
/// Detected from the file extension only; the content is never parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// HTML (.html, .htm, .xhtml)
    Html,
    /// CSS (.css)
    Css,
    /// JavaScript (.js, .mjs, .cjs)
    JavaScript,
    /// Anything else
    Unknown,
}

impl Language {
    /// Get the file extensions associated with this language
    ///
    /// # Returns
    /// A slice of extension strings (without the dot)
    pub fn extensions(&self) -> &[&str] {
        match self {
            Language::Html => &["html", "htm", "xhtml"],
            Language::Css => &["css"],
            Language::JavaScript => &["js", "mjs", "cjs"],
            Language::Unknown => &[],
        }
    }

    /// Get the language name as a string
    pub fn name(&self) -> &str {
        match self {
            Language::Html => "HTML",
            Language::Css => "CSS",
            Language::JavaScript => "JavaScript",
            Language::Unknown => "Unknown",
        }
    }

    /// Look up a language by extension (case-insensitive, without the dot)
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_ascii_lowercase();
        [Language::Html, Language::Css, Language::JavaScript]
            .into_iter()
            .find(|lang| lang.extensions().contains(&ext.as_str()))
            .unwrap_or(Language::Unknown)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Detect the language of a file from its path
///
/// # Arguments
/// * `path` - Path to the file
///
/// # Returns
/// * The detected `Language`, or `Language::Unknown` when the extension is
///   missing or not recognized
pub fn detect_language<P: AsRef<Path>>(path: P) -> Language {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(Language::from_extension)
        .unwrap_or(Language::Unknown)
}
