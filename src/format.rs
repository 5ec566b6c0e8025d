// DevOps Gateway - Response Formatter
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Single boundary where results and errors become text. Success and failure
// share one envelope shape; callers tell them apart by the leading marker.

use crate::error::{ToolError, ToolResult};
use serde::{Deserialize, Serialize};

pub const SUCCESS_MARKER: &str = "OK";
pub const FAILURE_MARKER: &str = "ERROR";
pub const PREVIEW_MARKER: &str = "PREVIEW";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

/// Uniform tool response: `{ "content": [ { "type": "text", "text": ... } ] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub content: Vec<ContentBlock>,
}

impl Envelope {
    pub fn text(text: String) -> Self {
        Self { content: vec![ContentBlock::Text { text }] }
    }

    /// Text of the first block
    pub fn first_text(&self) -> &str {
        match self.content.first() {
            Some(ContentBlock::Text { text }) => text,
            None => "",
        }
    }

    pub fn is_failure(&self) -> bool {
        self.first_text().starts_with(FAILURE_MARKER)
    }

    /// Process exit status for one-shot CLI calls: 1 on the failure marker
    pub fn exit_code(&self) -> i32 {
        if self.is_failure() {
            1
        } else {
            0
        }
    }
}

/// Informational notice that a payload was shortened. Not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncation {
    pub shown: usize,
    pub total: usize,
}

/// Successful outcome of a handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub title: String,
    pub body: String,
    pub truncated: Option<Truncation>,
}

impl Reply {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { title: title.into(), body: body.into(), truncated: None }
    }

    pub fn truncated(mut self, truncation: Option<Truncation>) -> Self {
        self.truncated = truncation;
        self
    }
}

pub fn success(reply: &Reply) -> Envelope {
    let mut text = format!("{} | {}", SUCCESS_MARKER, reply.title);
    if let Some(t) = reply.truncated {
        text.push_str(&format!(
            "\n{} | truncated at {} of {} bytes",
            PREVIEW_MARKER, t.shown, t.total
        ));
    }
    if !reply.body.is_empty() {
        text.push_str("\n\n");
        text.push_str(&reply.body);
    }
    Envelope::text(text)
}

pub fn failure(err: &ToolError) -> Envelope {
    let mut text = format!("{} | {}", FAILURE_MARKER, err);
    if let Some(hint) = err.hint() {
        text.push_str("\n\nHint: ");
        text.push_str(&hint);
    }
    Envelope::text(text)
}

pub fn render(result: ToolResult<Reply>) -> Envelope {
    match result {
        Ok(reply) => success(&reply),
        Err(err) => failure(&err),
    }
}

// ============================================================================
// TESTS
// ============================================================================
