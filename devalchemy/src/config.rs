//! Configuration stored in `devalchemy.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Default config file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "devalchemy.toml";

/// Top-level configuration (TOML).
///
/// Missing fields fall back to defaults, so an absent or empty file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Document edited in place.
    pub working_file: PathBuf,

    /// One-deep backup slot, overwritten on every backup.
    pub backup_file: PathBuf,

    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Ollama,
}

impl ProviderKind {
    pub fn default_api_base(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com",
            ProviderKind::Ollama => "http://localhost:11434",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "models/gemini-2.5-flash",
            ProviderKind::Ollama => "llama3",
        }
    }
}

/// Text-generation provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,

    /// Model identifier as the provider expects it (e.g. `models/gemini-2.5-flash`);
    /// the kind's default model when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Base URL; the kind's public endpoint when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Name of the environment variable holding the API key (Gemini only).
    pub api_key_env: String,

    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,

    /// Whole-request timeout for one provider call.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Gemini,
            model: None,
            api_base: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            temperature: 0.7,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 50_000,
            timeout_secs: 300,
        }
    }
}

impl ProviderConfig {
    /// Configured model, or the kind's default.
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.kind.default_model())
    }

    /// Configured base URL without a trailing slash.
    pub fn api_base(&self) -> String {
        self.api_base
            .as_deref()
            .unwrap_or_else(|| self.kind.default_api_base())
            .trim_end_matches('/')
            .to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            working_file: PathBuf::from("index.html"),
            backup_file: PathBuf::from("backup.bak"),
            provider: ProviderConfig::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.working_file.as_os_str().is_empty() {
            return Err(anyhow!("working_file must not be empty"));
        }
        if self.backup_file.as_os_str().is_empty() {
            return Err(anyhow!("backup_file must not be empty"));
        }
        if self.working_file == self.backup_file {
            return Err(anyhow!("working_file and backup_file must differ"));
        }
        let p = &self.provider;
        if p.model().trim().is_empty() {
            return Err(anyhow!("provider.model must not be empty"));
        }
        if !(0.0..=2.0).contains(&p.temperature) {
            return Err(anyhow!("provider.temperature must be within 0..=2"));
        }
        if !(0.0..=1.0).contains(&p.top_p) {
            return Err(anyhow!("provider.top_p must be within 0..=1"));
        }
        if p.max_output_tokens == 0 {
            return Err(anyhow!("provider.max_output_tokens must be > 0"));
        }
        if p.timeout_secs == 0 {
            return Err(anyhow!("provider.timeout_secs must be > 0"));
        }
        Ok(())
    }

    /// Serialize as pretty TOML (used by `devalchemy config`).
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serialize config toml")
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `Config::default()`.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        let cfg = Config::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: Config =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.working_file, PathBuf::from("index.html"));
        assert_eq!(cfg.backup_file, PathBuf::from("backup.bak"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("devalchemy.toml");
        fs::write(
            &path,
            "working_file = \"site/page.html\"\n\n[provider]\nkind = \"ollama\"\nmodel = \"llama3\"\ntemperature = 0.2\n",
        )
        .expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.working_file, PathBuf::from("site/page.html"));
        assert_eq!(cfg.backup_file, PathBuf::from("backup.bak"));
        assert_eq!(cfg.provider.kind, ProviderKind::Ollama);
        assert_eq!(cfg.provider.model(), "llama3");
        assert_eq!(cfg.provider.temperature, 0.2);
        assert_eq!(cfg.provider.max_output_tokens, 50_000);
        assert_eq!(cfg.provider.api_base(), "http://localhost:11434");
    }

    #[test]
    fn model_defaults_follow_provider_kind() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("devalchemy.toml");
        fs::write(&path, "[provider]\nkind = \"ollama\"\n").expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.provider.model, None);
        assert_eq!(cfg.provider.model(), "llama3");
        assert_eq!(Config::default().provider.model(), "models/gemini-2.5-flash");
    }

    #[test]
    fn to_toml_round_trips() {
        let cfg = Config::default();
        let parsed: Config = toml::from_str(&cfg.to_toml().expect("toml")).expect("parse");
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn api_base_trims_trailing_slash() {
        let provider = ProviderConfig {
            api_base: Some("http://127.0.0.1:8080/".to_string()),
            ..ProviderConfig::default()
        };
        assert_eq!(provider.api_base(), "http://127.0.0.1:8080");
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = Config::default();
        cfg.backup_file = cfg.working_file.clone();
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.provider.temperature = 3.5;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.provider.max_output_tokens = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.provider.model = Some("  ".to_string());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn unparseable_file_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("devalchemy.toml");
        fs::write(&path, "working_file = [").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parse"));
    }
}
