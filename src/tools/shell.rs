// DevOps Gateway - Shell Operations
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// get_terminal_history: newest-first tail of the shell history file.
// run_command: allow-listed command lines through `sh -c`.

use crate::dispatch::{Context, OperationSpec};
use crate::error::{ToolError, ToolResult};
use crate::format::Reply;
use crate::gate::Access;
use crate::invoke::{self, CommandSpec};
use crate::validate::{Field, ParamKind, Params, Schema};
use serde::Deserialize;

pub fn operations() -> Vec<OperationSpec> {
    vec![
        OperationSpec::new(
            "get_terminal_history",
            "Return the most recent shell history entries, newest first.",
            Schema::new(vec![
                Field::optional("limit", ParamKind::Count, "Number of commands to return").default(50),
            ]),
            terminal_history,
        ),
        OperationSpec::new(
            "run_command",
            "Run an allow-listed command line. Only the leading program token, up to the first space, is checked.",
            Schema::new(vec![
                Field::required("command", ParamKind::String, "Command line to execute"),
                Field::optional("cwd", ParamKind::String, "Working directory"),
            ]),
            run_command,
        ),
    ]
}

/// Commands from a history file, oldest first.
/// zsh extended entries (`: 1700000000:0;git status`) are reduced to the command.
pub fn parse_history(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                return None;
            }
            if line.starts_with(':') {
                return line.split_once(';').map(|(_, cmd)| cmd.to_string());
            }
            Some(line.to_string())
        })
        .filter(|cmd| !cmd.trim().is_empty())
        .collect()
}

#[derive(Deserialize)]
struct HistoryArgs {
    limit: usize,
}

fn terminal_history(ctx: &Context, params: Params) -> ToolResult<Reply> {
    let args: HistoryArgs = params.parse()?;
    let path = &ctx.config.history_file;

    // zsh metafies non-ASCII bytes, so decode lossily
    let raw = std::fs::read(path).map_err(|e| {
        ToolError::action("Reading terminal history", format!("{}: {}", path.display(), e))
            .with_hint(format!("Check that {} exists", path.display()))
    })?;
    let commands = parse_history(&String::from_utf8_lossy(&raw));

    let skip = commands.len().saturating_sub(args.limit);
    let recent: Vec<&str> = commands[skip..].iter().rev().map(String::as_str).collect();

    Ok(Reply::new(
        format!("Last {} terminal commands", recent.len()),
        recent.join("\n"),
    ))
}

#[derive(Deserialize)]
struct RunArgs {
    command: String,
    cwd: Option<String>,
}

fn run_command(ctx: &Context, params: Params) -> ToolResult<Reply> {
    let args: RunArgs = params.parse()?;
    ctx.gate.check_command(&args.command).into_result()?;
    let cwd = super::gated_opt_path(ctx, args.cwd.as_deref(), Access::Read)?;

    let spec = CommandSpec::shell(&args.command).cwd(cwd);
    let output = invoke::run_checked(ctx.runner.as_ref(), &spec, "Running command")
        .map_err(|e| e.with_hint("Check the command syntax and the working directory"))?;

    let body = output.combined();
    let body = if body.is_empty() { "(no output)".to_string() } else { body };
    Ok(Reply::new(format!("Command executed: {}", args.command), body))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use crate::invoke::testing::MockRunner;
    use crate::invoke::ProcessOutput;
    use crate::tools::test_support::{call, config_for, dispatcher};
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn parse_plain_and_extended_history() {
        let content = "ls -la\n: 1700000000:0;git status\n\n: broken\ndocker ps\n";
        assert_eq!(parse_history(content), vec!["ls -la", "git status", "docker ps"]);
    }

    #[test]
    fn history_returns_last_entries_newest_first() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let history = dir.path().join(".zsh_history");
        std::fs::write(&history, "one\ntwo\nthree\nfour\nfive\n")?;
        let config = GatewayConfig { history_file: history, ..GatewayConfig::default() };

        let d = dispatcher(config, MockRunner::new());
        let env = call(&d, "get_terminal_history", json!({"limit": 2}));
        assert_eq!(env.first_text(), "OK | Last 2 terminal commands\n\nfive\nfour");
        Ok(())
    }

    #[test]
    fn history_limit_above_size_returns_everything() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let history = dir.path().join(".zsh_history");
        std::fs::write(&history, "a\nb\n")?;
        let config = GatewayConfig { history_file: history, ..GatewayConfig::default() };

        let env = call(&dispatcher(config, MockRunner::new()), "get_terminal_history", json!({}));
        assert!(env.first_text().ends_with("b\na"));
        Ok(())
    }

    #[test]
    fn missing_history_is_failure_with_hint() {
        let config = GatewayConfig {
            history_file: "/nonexistent/.zsh_history".into(),
            ..GatewayConfig::default()
        };
        let env = call(&dispatcher(config, MockRunner::new()), "get_terminal_history", json!({}));
        assert!(env.is_failure());
        assert!(env.first_text().contains("Hint: Check that /nonexistent/.zsh_history exists"));
    }

    #[test]
    fn allowed_command_returns_stdout_verbatim() {
        let stdout = "CONTAINER ID   IMAGE   STATUS\nabc123   nginx   Up 2 hours\n";
        let runner = MockRunner::new().ok("sh -c 'docker ps'", stdout);
        let d = dispatcher(GatewayConfig::default(), runner.clone());

        let env = call(&d, "run_command", json!({"command": "docker ps"}));
        assert!(env.first_text().starts_with("OK | Command executed: docker ps"));
        assert!(env.first_text().contains(stdout));
        assert_eq!(runner.calls(), vec![CommandSpec::shell("docker ps")]);
    }

    #[test]
    fn denied_command_never_spawns() {
        let runner = MockRunner::new();
        let d = dispatcher(GatewayConfig::default(), runner.clone());

        let env = call(&d, "run_command", json!({"command": "sudo rm -rf /"}));
        assert!(env.is_failure());
        assert!(env.first_text().contains("command not allowed: sudo"));
        assert!(env.first_text().contains("ls, pwd, echo, cat, grep, find, df, du, docker, docker-compose, git, npm, node"));
        assert!(runner.calls().is_empty());

        let env = call(&d, "run_command", json!({"command": "rm -rf /tmp/x"}));
        assert!(env.first_text().contains("command not allowed: rm"));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn newline_joined_command_never_spawns() {
        let runner = MockRunner::new().ok("sh -c", "");
        let d = dispatcher(GatewayConfig::default(), runner.clone());

        let env = call(&d, "run_command", json!({"command": "ls\nrm -rf /tmp/victim"}));
        assert!(env.is_failure());
        assert!(env.first_text().contains("command not allowed: ls\nrm"));
        assert!(runner.calls().is_empty());

        let env = call(&d, "run_command", json!({"command": "ls\tx"}));
        assert!(env.is_failure());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn cwd_is_gated_and_forwarded() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let runner = MockRunner::new().ok("sh -c", "");
        let d = dispatcher(config_for(dir.path()), runner.clone());

        let env = call(&d, "run_command", json!({"command": "ls", "cwd": "/etc"}));
        assert!(env.is_failure());
        assert!(runner.calls().is_empty());

        let cwd = dir.path().join("app");
        let env = call(&d, "run_command", json!({"command": "ls", "cwd": cwd.to_str()}));
        assert_eq!(env.first_text(), "OK | Command executed: ls\n\n(no output)");
        assert_eq!(runner.calls()[0].cwd.as_deref(), Some(cwd.as_path()));
        Ok(())
    }

    #[test]
    fn non_zero_exit_reports_stderr() {
        let runner = MockRunner::new().respond(
            "sh -c",
            ProcessOutput { code: Some(2), stdout: String::new(), stderr: "ls: cannot access 'x'".into() },
        );
        let env = call(&dispatcher(GatewayConfig::default(), runner), "run_command", json!({"command": "ls x"}));
        assert!(env.first_text().starts_with("ERROR | Running command failed: ls: cannot access 'x'"));
    }

    #[test]
    fn missing_command_names_parameter() {
        let runner = MockRunner::new();
        let env = call(&dispatcher(GatewayConfig::default(), runner.clone()), "run_command", json!({}));
        assert!(env.first_text().contains("missing required parameter 'command'"));
        assert!(runner.calls().is_empty());
    }
}
