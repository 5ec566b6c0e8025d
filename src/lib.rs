// DevOps Gateway - Library Root
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// All modules exported here for use by the binary and tests.

pub mod paths;
pub mod config;
pub mod error;
pub mod gate;
pub mod validate;
pub mod invoke;
pub mod format;
pub mod dispatch;
pub mod fs;
pub mod mcp;

// ============================================================================
// MCP SURFACES
// ============================================================================

/// Operations served through tools/call
pub mod tools;

/// Declarative resources served through resources/read
pub mod resources;

/// Prompt templates served through prompts/get
pub mod prompts;
