use serde::{Deserialize, Serialize};

use crate::controller::TransactionError;
use crate::language::Language;

/// Structured result of one CLI command (`--json`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandResponse {
    /// Unique id of this invocation (UUID v4)
    pub execution_id: String,
    /// Command name (`show`, `backup`, `restore`, `edit`, `review`)
    pub command: String,
    pub success: bool,
    pub working_file: String,
    pub backup_file: String,
    pub language: Language,
    /// BLAKE3 checksum of the working file content after the command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// Working file content after the command (show / restore / edit)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Commentary returned by `review`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    /// Machine-readable error tag (see `TransactionError::kind`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Where a command ran: ids and paths shared by success and failure responses.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub execution_id: String,
    pub command: String,
    pub working_file: String,
    pub backup_file: String,
    pub language: Language,
}

impl CommandResponse {
    pub fn success(ctx: &CommandContext) -> Self {
        Self {
            execution_id: ctx.execution_id.clone(),
            command: ctx.command.clone(),
            success: true,
            working_file: ctx.working_file.clone(),
            backup_file: ctx.backup_file.clone(),
            language: ctx.language,
            checksum: None,
            content: None,
            review: None,
            error_kind: None,
            error: None,
        }
    }

    pub fn failure(ctx: &CommandContext, err: &TransactionError) -> Self {
        Self {
            success: false,
            error_kind: Some(err.kind().to_string()),
            error: Some(err.to_string()),
            ..Self::success(ctx)
        }
    }

    /// Attach content and its checksum.
    pub fn with_content(mut self, content: &str) -> Self {
        self.checksum = Some(crate::file::checksum(content));
        self.content = Some(content.to_string());
        self
    }

    pub fn with_review(mut self, review: &str) -> Self {
        self.review = Some(review.to_string());
        self
    }
}

/// Generate a new execution id.
pub fn generate_execution_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn ctx() -> CommandContext {
        CommandContext {
            execution_id: generate_execution_id(),
            command: "edit".to_string(),
            working_file: "index.html".to_string(),
            backup_file: "backup.bak".to_string(),
            language: Language::Html,
        }
    }

    #[test]
    fn test_execution_ids_are_unique_uuids() {
        let a = generate_execution_id();
        let b = generate_execution_id();
        assert_ne!(a, b);
        assert!(uuid::Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn test_success_with_content_serializes() {
        let resp = CommandResponse::success(&ctx()).with_content("<p>x</p>");
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["language"], "html");
        assert_eq!(json["content"], "<p>x</p>");
        assert_eq!(json["checksum"], crate::file::checksum("<p>x</p>"));
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_failure_carries_error_kind() {
        let err = TransactionError::NoBackup(PathBuf::from("backup.bak"));
        let resp = CommandResponse::failure(&ctx(), &err);

        assert!(!resp.success);
        assert_eq!(resp.error_kind.as_deref(), Some("no_backup"));
        assert!(resp.error.unwrap().contains("backup.bak"));
        assert!(resp.content.is_none());
    }
}
