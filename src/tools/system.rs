// DevOps Gateway - Host Summaries
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Read-only inspection commands assembled into text reports.
// system_report() also backs the system://info resource.

use crate::dispatch::{Context, OperationSpec};
use crate::error::ToolResult;
use crate::format::Reply;
use crate::invoke::{self, CommandSpec};
use crate::validate::{Params, Schema};

const TOOL_PROBES: &[(&str, &str, &[&str])] = &[
    ("Docker", "docker", &["--version"]),
    ("Docker Compose", "docker-compose", &["--version"]),
    ("Git", "git", &["--version"]),
    ("Node.js", "node", &["--version"]),
    ("npm", "npm", &["--version"]),
];

pub fn operations() -> Vec<OperationSpec> {
    vec![
        OperationSpec::new(
            "get_environment_info",
            "Report installed tool versions, shell, user and working directory.",
            Schema::empty(),
            environment_info,
        ),
        OperationSpec::new(
            "get_system_info",
            "Report hostname, uptime, memory and root disk usage.",
            Schema::empty(),
            system_info,
        ),
    ]
}

fn env_or(var: &str, fallback: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| fallback.to_string())
}

/// Tool versions and session facts. Missing tools are listed, never fatal.
pub fn environment_report(ctx: &Context) -> String {
    let mut lines = Vec::new();
    for (label, program, args) in TOOL_PROBES {
        let spec = CommandSpec::new(program).args(args.iter().copied());
        let version = invoke::probe(ctx.runner.as_ref(), &spec)
            .and_then(|out| out.lines().next().map(str::to_string))
            .unwrap_or_else(|| "not available".to_string());
        lines.push(format!("{}: {}", label, version));
    }
    lines.push(String::new());
    lines.push(format!("Shell: {}", env_or("SHELL", "unknown")));
    lines.push(format!("User: {}", env_or("USER", "unknown")));
    let cwd = std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    lines.push(format!("Working directory: {}", cwd));
    lines.join("\n")
}

/// First line of `text` starting with `prefix`
fn line_starting_with<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    text.lines().find(|l| l.trim_start().starts_with(prefix)).map(str::trim)
}

/// hostname, uptime, memory and disk. Fails if any probe fails.
pub fn system_report(ctx: &Context) -> ToolResult<String> {
    let runner = ctx.runner.as_ref();
    let hint = "These facts come from hostname, uptime, free and df";

    let run = |spec: CommandSpec, action: &str| {
        invoke::run_checked(runner, &spec, action).map_err(|e| e.with_hint(hint))
    };

    let hostname = run(CommandSpec::new("hostname"), "Reading hostname")?;
    let uptime = run(CommandSpec::new("uptime").arg("-p"), "Reading uptime")?;
    let memory = run(CommandSpec::new("free").arg("-h"), "Reading memory")?;
    let disk = run(CommandSpec::new("df").args(["-h", "/"]), "Reading disk usage")?;

    let memory = line_starting_with(&memory.stdout, "Mem").unwrap_or("unknown").to_string();
    let disk = disk.stdout.lines().last().map(str::trim).unwrap_or("unknown").to_string();

    Ok(format!(
        "Hostname: {}\nUptime: {}\nMemory: {}\nDisk: {}\nUser: {}",
        hostname.stdout.trim(),
        uptime.stdout.trim(),
        memory,
        disk,
        env_or("USER", "unknown"),
    ))
}

fn environment_info(ctx: &Context, _params: Params) -> ToolResult<Reply> {
    Ok(Reply::new("Environment", environment_report(ctx)))
}

fn system_info(ctx: &Context, _params: Params) -> ToolResult<Reply> {
    Ok(Reply::new("System information", system_report(ctx)?))
}
