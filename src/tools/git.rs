// DevOps Gateway - Git Operations
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Read-only git queries. A repository path, when given, must pass the read
// prefixes; without one git runs in the gateway's working directory.

use crate::dispatch::{Context, OperationSpec};
use crate::error::ToolResult;
use crate::format::Reply;
use crate::gate::Access;
use crate::invoke::{self, CommandSpec, ProcessOutput};
use crate::validate::{Field, ParamKind, Params, Schema};
use serde::Deserialize;

const LOG_FORMATS: &[&str] = &["oneline", "short", "full"];
const REPO_HINT: &str = "Check that the path is inside a git repository";

pub fn operations() -> Vec<OperationSpec> {
    let path = || Field::optional("path", ParamKind::String, "Repository path (default: server working directory)");
    vec![
        OperationSpec::new(
            "git_status",
            "Show the short status and current branch of a repository.",
            Schema::new(vec![path()]),
            status,
        ),
        OperationSpec::new(
            "git_log",
            "Show recent commits.",
            Schema::new(vec![
                path(),
                Field::optional("count", ParamKind::Count, "Number of commits").default(10),
                Field::optional("format", ParamKind::Enum(LOG_FORMATS), "Output format").default("oneline"),
            ]),
            commit_log,
        ),
        OperationSpec::new(
            "git_branches",
            "List branches of a repository.",
            Schema::new(vec![
                path(),
                Field::optional("remote", ParamKind::Boolean, "Include remote-tracking branches").default(false),
            ]),
            branches,
        ),
    ]
}

fn git(ctx: &Context, path: Option<&str>, args: &[String], action: &str) -> ToolResult<ProcessOutput> {
    let repo = super::gated_opt_path(ctx, path, Access::Read)?;
    let mut spec = CommandSpec::new("git");
    if let Some(repo) = repo {
        spec = spec.arg("-C").arg(repo.to_string_lossy());
    }
    let spec = spec.args(args.iter().cloned());
    invoke::run_checked(ctx.runner.as_ref(), &spec, action).map_err(|e| e.with_hint(REPO_HINT))
}

fn repo_label(path: &Option<String>) -> &str {
    path.as_deref().unwrap_or(".")
}

#[derive(Deserialize)]
struct StatusArgs {
    path: Option<String>,
}

fn status(ctx: &Context, params: Params) -> ToolResult<Reply> {
    let args: StatusArgs = params.parse()?;
    let out = git(
        ctx,
        args.path.as_deref(),
        &["status".into(), "--short".into(), "--branch".into()],
        "Reading git status",
    )?;
    let body = out.stdout.trim_end();
    // --branch always prints the "## branch" header, so one line means clean
    let body = if body.lines().count() <= 1 {
        format!("{}\nWorking tree clean", body)
    } else {
        body.to_string()
    };
    Ok(Reply::new(format!("Git status: {}", repo_label(&args.path)), body))
}

#[derive(Deserialize)]
struct LogArgs {
    path: Option<String>,
    count: u64,
    format: String,
}

fn commit_log(ctx: &Context, params: Params) -> ToolResult<Reply> {
    let args: LogArgs = params.parse()?;
    let out = git(
        ctx,
        args.path.as_deref(),
        &["log".into(), "-n".into(), args.count.to_string(), format!("--pretty={}", args.format)],
        "Reading git log",
    )?;
    let body = if out.stdout.trim().is_empty() { "No commits".to_string() } else { out.stdout };
    Ok(Reply::new(
        format!("Git log: {} (last {} commits)", repo_label(&args.path), args.count),
        body,
    ))
}

#[derive(Deserialize)]
struct BranchArgs {
    path: Option<String>,
    remote: bool,
}

fn branches(ctx: &Context, params: Params) -> ToolResult<Reply> {
    let args: BranchArgs = params.parse()?;
    let mut git_args = vec!["branch".to_string()];
    if args.remote {
        git_args.push("-a".into());
    }
    let out = git(ctx, args.path.as_deref(), &git_args, "Listing git branches")?;
    Ok(Reply::new(format!("Git branches: {}", repo_label(&args.path)), out.stdout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use crate::invoke::testing::MockRunner;
    use crate::tools::test_support::{call, config_for, dispatcher};
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn status_without_path_runs_in_cwd() {
        let runner = MockRunner::new().ok("git status", "## main...origin/main\n");
        let d = dispatcher(GatewayConfig::default(), runner.clone());

        let env = call(&d, "git_status", json!({}));
        assert_eq!(env.first_text(), "OK | Git status: .\n\n## main...origin/main\nWorking tree clean");
        assert_eq!(runner.calls()[0].to_string(), "git status --short --branch");
    }

    #[test]
    fn status_with_path_is_gated() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let runner = MockRunner::new().ok("git -C", "## main\n M src/lib.rs\n");
        let d = dispatcher(config_for(dir.path()), runner.clone());

        let env = call(&d, "git_status", json!({"path": "/etc"}));
        assert!(env.is_failure());
        assert!(runner.calls().is_empty());

        let repo = dir.path().join("repo");
        let env = call(&d, "git_status", json!({"path": repo.to_str()}));
        assert!(env.first_text().ends_with("## main\n M src/lib.rs"));
        assert_eq!(runner.calls()[0].args[..2], ["-C".to_string(), repo.display().to_string()]);
        Ok(())
    }

    #[test]
    fn log_format_enum_is_enforced() {
        let runner = MockRunner::new();
        let d = dispatcher(GatewayConfig::default(), runner.clone());

        let env = call(&d, "git_log", json!({"format": "graph"}));
        assert!(env.is_failure());
        assert!(env.first_text().contains("(allowed: oneline, short, full)"));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn log_passes_count_and_format() {
        let runner = MockRunner::new().ok("git log", "abc123 Fix deploy\n");
        let d = dispatcher(GatewayConfig::default(), runner.clone());

        let env = call(&d, "git_log", json!({"count": 3, "format": "short"}));
        assert!(env.first_text().starts_with("OK | Git log: . (last 3 commits)"));
        assert_eq!(runner.calls()[0].to_string(), "git log -n 3 --pretty=short");
    }

    #[test]
    fn branches_remote_flag() {
        let runner = MockRunner::new().ok("git branch", "* main\n  remotes/origin/main\n");
        let d = dispatcher(GatewayConfig::default(), runner.clone());
        call(&d, "git_branches", json!({"remote": true}));
        assert_eq!(runner.calls()[0].to_string(), "git branch -a");
    }

    #[test]
    fn not_a_repository() {
        let runner = MockRunner::new().fail("git status", 128, "fatal: not a git repository");
        let env = call(&dispatcher(GatewayConfig::default(), runner), "git_status", json!({}));
        assert!(env.first_text().contains("fatal: not a git repository"));
        assert!(env.first_text().contains(REPO_HINT));
    }
}
