// DevOps Gateway - Policy Gate
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Allow-list checks run before any side effect. Each operation declares
// which check applies: command token, read path, or write path.
//
// LIMITATION: these are token and prefix matches, not a sandbox.
// The token ends at the first space, so `ls && rm x` and `ls | rm x` pass
// the command check (`ls;rm` and `ls|rm` do not). `..` segments and symlinks are not
// resolved before the prefix match. They stop accidental misuse only.

use crate::config::PolicyConfig;
use crate::error::{ToolError, ToolResult};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Read => write!(f, "read"),
            Access::Write => write!(f, "write"),
        }
    }
}

/// What was refused
#[derive(Debug, Clone, PartialEq)]
pub enum Denial {
    Command { token: String, permitted: Vec<String> },
    Path { path: String, access: Access, permitted: Vec<String> },
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::Command { token, permitted } => {
                let token = if token.is_empty() { "(empty)" } else { token.as_str() };
                write!(
                    f,
                    "BLOCKED: command not allowed: {}\n\nAllowed commands: {}",
                    token,
                    permitted.join(", ")
                )
            }
            Denial::Path { path, access, permitted } => write!(
                f,
                "BLOCKED: {} access not allowed for path: {}\n\nAllowed {} prefixes: {}",
                access,
                path,
                access,
                permitted.join(", ")
            ),
        }
    }
}

/// Gate decision, produced per check and consumed immediately by the handler
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyDecision {
    Allowed,
    Denied(Denial),
}

impl PolicyDecision {
    pub fn allowed(&self) -> bool {
        matches!(self, PolicyDecision::Allowed)
    }

    pub fn reason(&self) -> Option<String> {
        match self {
            PolicyDecision::Allowed => None,
            PolicyDecision::Denied(denial) => Some(denial.to_string()),
        }
    }

    /// Convert to a result so handlers can gate with `?`
    pub fn into_result(self) -> ToolResult<()> {
        match self {
            PolicyDecision::Allowed => Ok(()),
            PolicyDecision::Denied(denial) => Err(ToolError::PolicyDenied(denial)),
        }
    }
}

/// Leading program token of a command line: everything before the first
/// space. Tabs and newlines stay inside the token.
pub fn leading_token(command: &str) -> Option<&str> {
    command
        .trim_start_matches(' ')
        .split(' ')
        .next()
        .filter(|token| !token.is_empty())
}

pub struct PolicyGate {
    policy: PolicyConfig,
}

impl PolicyGate {
    pub fn new(policy: PolicyConfig) -> Self {
        Self { policy }
    }

    /// Leading token of `command` must be in the allowed set
    pub fn check_command(&self, command: &str) -> PolicyDecision {
        let token = leading_token(command).unwrap_or("");
        if !token.is_empty() && self.policy.allowed_commands.iter().any(|c| c == token) {
            return PolicyDecision::Allowed;
        }
        log::warn!("gate: command token '{}' denied", token);
        PolicyDecision::Denied(Denial::Command {
            token: token.to_string(),
            permitted: self.policy.allowed_commands.clone(),
        })
    }

    /// `path` must start with one of the prefixes for `access`
    pub fn check_path(&self, path: &str, access: Access) -> PolicyDecision {
        let prefixes = match access {
            Access::Read => &self.policy.read_prefixes,
            Access::Write => &self.policy.write_prefixes,
        };
        if prefixes.iter().any(|prefix| path.starts_with(prefix.as_str())) {
            return PolicyDecision::Allowed;
        }
        log::warn!("gate: {} of '{}' denied", access, path);
        PolicyDecision::Denied(Denial::Path {
            path: path.to_string(),
            access,
            permitted: prefixes.clone(),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> PolicyGate {
        PolicyGate::new(PolicyConfig {
            allowed_commands: vec!["ls".into(), "docker".into(), "git".into()],
            read_prefixes: vec!["/home/ops/".into(), "/var/log/".into()],
            write_prefixes: vec!["/home/ops/projects/".into()],
        })
    }

    #[test]
    fn allowed_command_passes() {
        assert!(gate().check_command("docker ps -a").allowed());
        assert!(gate().check_command("  ls   -la").allowed());
    }

    #[test]
    fn denied_command_names_token_and_permitted_set() {
        let decision = gate().check_command("sudo rm -rf /");
        assert!(!decision.allowed());
        let reason = decision.reason().unwrap();
        assert!(reason.contains("sudo"));
        assert!(reason.contains("ls, docker, git"));
    }

    #[test]
    fn token_match_is_exact() {
        assert!(!gate().check_command("lsblk").allowed());
        assert!(!gate().check_command("/bin/ls").allowed());
    }

    #[test]
    fn token_ends_at_first_space_only() {
        assert_eq!(leading_token("  ls -la"), Some("ls"));
        assert_eq!(leading_token("ls\nrm -rf /tmp/x"), Some("ls\nrm"));
        assert_eq!(leading_token("ls\tx"), Some("ls\tx"));
        assert_eq!(leading_token("   "), None);

        assert!(!gate().check_command("ls\nrm -rf /tmp/x").allowed());
        assert!(!gate().check_command("ls;rm x").allowed());
        assert!(!gate().check_command("ls|rm").allowed());
        // chaining after a space is outside what the token check can see
        assert!(gate().check_command("ls && rm x").allowed());
        assert!(gate().check_command("ls | rm x").allowed());
    }

    #[test]
    fn empty_command_denied() {
        let decision = gate().check_command("   ");
        assert!(decision.reason().unwrap().contains("(empty)"));
    }

    #[test]
    fn read_prefixes() {
        assert!(gate().check_path("/home/ops/a.txt", Access::Read).allowed());
        assert!(gate().check_path("/var/log/syslog", Access::Read).allowed());
        let decision = gate().check_path("/etc/passwd", Access::Read);
        let reason = decision.reason().unwrap();
        assert!(reason.contains("/etc/passwd"));
        assert!(reason.contains("/home/ops/, /var/log/"));
    }

    #[test]
    fn write_list_is_stricter() {
        assert!(gate().check_path("/home/ops/projects/app/x.rs", Access::Write).allowed());
        assert!(!gate().check_path("/home/ops/a.txt", Access::Write).allowed());
        assert!(!gate().check_path("/var/log/syslog", Access::Write).allowed());
    }

    #[test]
    fn prefix_match_is_lexical() {
        // Documented limitation: no normalisation before matching
        assert!(gate().check_path("/home/ops/../../etc/passwd", Access::Read).allowed());
        assert!(!gate().check_path("/home/ops", Access::Read).allowed());
    }

    #[test]
    fn decision_into_result() {
        assert!(gate().check_command("git status").into_result().is_ok());
        match gate().check_command("rm x").into_result() {
            Err(ToolError::PolicyDenied(Denial::Command { token, .. })) => assert_eq!(token, "rm"),
            other => panic!("expected command denial, got {:?}", other),
        }
    }
}
