// DevOps Gateway - Error Taxonomy
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Every failure a tool call can hit. Raised with `?` anywhere in the
// pipeline, rendered to text only by format.rs.

use crate::gate::Denial;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown operation '{name}'")]
    UnknownOperation {
        name: String,
        available: Vec<String>,
    },

    #[error("operation '{0}' is already registered")]
    DuplicateOperation(String),

    #[error("missing required parameter '{0}'")]
    MissingParameter(String),

    #[error("invalid value '{value}' for parameter '{param}' (allowed: {})", allowed.join(", "))]
    InvalidEnumValue {
        param: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("parameter '{param}' must be {expected}, got {found}")]
    TypeMismatch {
        param: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{0}")]
    PolicyDenied(Denial),

    #[error("{action} failed: {detail}")]
    ActionFailed {
        action: String,
        detail: String,
        hint: Option<String>,
    },
}

impl ToolError {
    /// Failure of an underlying side effect (process exit, filesystem call)
    pub fn action(action: impl Into<String>, detail: impl ToString) -> Self {
        ToolError::ActionFailed {
            action: action.into(),
            detail: detail.to_string().trim_end().to_string(),
            hint: None,
        }
    }

    /// Attach a remediation hint. No-op for variants that carry none.
    pub fn with_hint(mut self, text: impl Into<String>) -> Self {
        if let ToolError::ActionFailed { ref mut hint, .. } = self {
            *hint = Some(text.into());
        }
        self
    }

    /// Remediation shown under the error line, if any
    pub fn hint(&self) -> Option<String> {
        match self {
            ToolError::UnknownOperation { available, .. } => {
                Some(format!("Available operations: {}", available.join(", ")))
            }
            ToolError::MissingParameter(_) | ToolError::TypeMismatch { .. } => {
                Some("Use tools/list to see the parameter schema".to_string())
            }
            ToolError::ActionFailed { hint, .. } => hint.clone(),
            _ => None,
        }
    }
}

pub type ToolResult<T> = Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_error_lists_allowed_values() {
        let err = ToolError::InvalidEnumValue {
            param: "format".into(),
            value: "fancy".into(),
            allowed: vec!["oneline".into(), "short".into(), "full".into()],
        };
        assert_eq!(
            err.to_string(),
            "invalid value 'fancy' for parameter 'format' (allowed: oneline, short, full)"
        );
    }

    #[test]
    fn hint_only_attaches_to_action_failures() {
        let err = ToolError::MissingParameter("path".into()).with_hint("ignored");
        assert_eq!(err.hint().as_deref(), Some("Use tools/list to see the parameter schema"));

        let err = ToolError::action("Reading file", "No such file or directory\n")
            .with_hint("Check the path");
        assert_eq!(err.to_string(), "Reading file failed: No such file or directory");
        assert_eq!(err.hint().as_deref(), Some("Check the path"));
    }
}
