// DevOps Gateway - Configuration
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Loads allow-lists, history location and read threshold from a JSON file.
// Every key is optional; anything missing falls back to compiled defaults.

use crate::paths;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Master gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub policy: PolicyConfig,
    /// Shell history file read by get_terminal_history
    pub history_file: PathBuf,
    /// Reads above this many bytes are truncated and marked as a preview
    pub max_read_bytes: usize,
    /// Append-only call log. Disabled when unset.
    pub call_log: Option<PathBuf>,
}

/// Allow-lists consulted by the policy gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Permitted leading tokens for run_command
    pub allowed_commands: Vec<String>,
    /// Path prefixes readable through file and search operations
    pub read_prefixes: Vec<String>,
    /// Path prefixes writable through write/mkdir/move. Keep this a subset of read_prefixes.
    pub write_prefixes: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allowed_commands: [
                "ls", "pwd", "echo", "cat", "grep", "find", "df", "du",
                "docker", "docker-compose", "git", "npm", "node",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            read_prefixes: vec![
                paths::home_prefix(""),
                "/tmp/".to_string(),
                "/var/log/".to_string(),
            ],
            write_prefixes: vec![
                paths::home_prefix("projects"),
                paths::home_prefix("Documents"),
                "/tmp/".to_string(),
            ],
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            policy: PolicyConfig::default(),
            history_file: paths::home_dir().join(".zsh_history"),
            max_read_bytes: 100_000,
            call_log: None,
        }
    }
}

impl GatewayConfig {
    /// Load config from JSON file, falling back to defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {:?}", path))?;
            let config: Self = serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON in config {:?}", path))?;
            log::info!("Config loaded from {:?}", path);
            Ok(config)
        } else {
            log::warn!("Config not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save config to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Write the compiled defaults to `path`. An existing file is only
    /// replaced when `force` is set.
    pub fn init(path: &Path, force: bool) -> anyhow::Result<()> {
        if path.exists() && !force {
            anyhow::bail!("{:?} already exists (use --force to overwrite)", path);
        }
        Self::default()
            .save(path)
            .with_context(|| format!("Failed to write config {:?}", path))?;
        log::info!("Default config written to {:?}", path);
        Ok(())
    }

    /// One-line-per-setting summary for the status command
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Allowed commands: {}\n", self.policy.allowed_commands.join(", ")));
        out.push_str(&format!("Read prefixes:    {}\n", self.policy.read_prefixes.join(", ")));
        out.push_str(&format!("Write prefixes:   {}\n", self.policy.write_prefixes.join(", ")));
        out.push_str(&format!("History file:     {}\n", self.history_file.display()));
        out.push_str(&format!("Read threshold:   {} bytes\n", self.max_read_bytes));
        match &self.call_log {
            Some(p) => out.push_str(&format!("Call log:         {}", p.display())),
            None => out.push_str("Call log:         disabled"),
        }
        out
    }
}

// ============================================================================
// TESTS
// ============================================================================
