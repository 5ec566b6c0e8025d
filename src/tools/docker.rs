// DevOps Gateway - Docker Operations
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Container listing and logs, plus the daemon summary behind docker://status.

use crate::dispatch::{Context, OperationSpec};
use crate::error::{ToolError, ToolResult};
use crate::format::Reply;
use crate::invoke::{self, CommandSpec};
use crate::validate::{Field, ParamKind, Params, Schema};
use serde::Deserialize;

const DAEMON_HINT: &str = "Check whether Docker is running: systemctl status docker";

pub fn operations() -> Vec<OperationSpec> {
    vec![
        OperationSpec::new(
            "list_docker_containers",
            "List Docker containers with name, status, image and ports.",
            Schema::new(vec![
                Field::optional("all", ParamKind::Boolean, "Include stopped containers").default(true),
            ]),
            list_containers,
        ),
        OperationSpec::new(
            "get_docker_logs",
            "Fetch the last lines of a container's log, stdout and stderr interleaved.",
            Schema::new(vec![
                Field::required("container", ParamKind::String, "Container name or ID"),
                Field::optional("lines", ParamKind::Count, "Number of log lines").default(100),
            ]),
            container_logs,
        ),
    ]
}

#[derive(Deserialize)]
struct ListArgs {
    all: bool,
}

fn list_containers(ctx: &Context, params: Params) -> ToolResult<Reply> {
    let args: ListArgs = params.parse()?;
    let mut spec = CommandSpec::new("docker").arg("ps");
    if args.all {
        spec = spec.arg("-a");
    }
    let spec = spec.args(["--format", "table {{.Names}}\t{{.Status}}\t{{.Image}}\t{{.Ports}}"]);

    let output = invoke::run_checked(ctx.runner.as_ref(), &spec, "Listing containers")
        .map_err(|e| e.with_hint(DAEMON_HINT))?;
    Ok(Reply::new("Docker containers", output.stdout))
}

#[derive(Deserialize)]
struct LogsArgs {
    container: String,
    lines: u64,
}

/// `docker logs` with stderr folded into stdout by the shell so both streams
/// keep their relative order. Values travel as positional parameters.
const LOGS_SCRIPT: &str = r#"exec docker logs --tail "$1" -- "$2" 2>&1"#;

fn container_logs(ctx: &Context, params: Params) -> ToolResult<Reply> {
    let args: LogsArgs = params.parse()?;
    let spec = CommandSpec::shell(LOGS_SCRIPT)
        .arg("sh")
        .arg(args.lines.to_string())
        .arg(args.container.as_str());

    let output = invoke::run_checked(ctx.runner.as_ref(), &spec, "Fetching container logs")
        .map_err(|e| e.with_hint("Check that the container exists: docker ps -a"))?;

    Ok(Reply::new(
        format!("Logs for container \"{}\" (last {} lines)", args.container, args.lines),
        output.stdout,
    ))
}

// ============================================================================
// DAEMON SUMMARY
// ============================================================================

/// Subset of `docker info --format "{{json .}}"`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct DaemonInfo {
    server_version: String,
    images: u64,
    mem_total: u64,
    driver: String,
}

/// One line of `docker ps -a --format "{{json .}}"`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ContainerRow {
    names: String,
    image: String,
    state: String,
}

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

fn decode_failure(what: &str, err: serde_json::Error) -> ToolError {
    ToolError::action("Reading Docker status", format!("unexpected {} output: {}", what, err))
}

/// Server version, container counts, images, memory, driver and running containers
pub fn status_report(ctx: &Context) -> ToolResult<String> {
    let runner = ctx.runner.as_ref();
    let json_format = ["--format", "{{json .}}"];

    let info = CommandSpec::new("docker").arg("info").args(json_format);
    let info = invoke::run_checked(runner, &info, "Reading Docker status")
        .map_err(|e| e.with_hint(DAEMON_HINT))?;
    let info: DaemonInfo = serde_json::from_str(info.stdout.trim()).map_err(|e| decode_failure("docker info", e))?;

    let ps = CommandSpec::new("docker").args(["ps", "-a"]).args(json_format);
    let ps = invoke::run_checked(runner, &ps, "Reading Docker status")
        .map_err(|e| e.with_hint(DAEMON_HINT))?;
    let containers = ps
        .stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(serde_json::from_str::<ContainerRow>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| decode_failure("docker ps", e))?;

    let running: Vec<&ContainerRow> = containers.iter().filter(|c| c.state == "running").collect();
    let running_lines = if running.is_empty() {
        "No running containers".to_string()
    } else {
        running
            .iter()
            .map(|c| format!("- {}: {}", c.names, c.image))
            .collect::<Vec<_>>()
            .join("\n")
    };

    Ok(format!(
        "Server: {}\nContainers: {} running / {} total\nImages: {}\nMemory: {}GiB\nDriver: {}\n\nRunning containers:\n{}",
        info.server_version,
        running.len(),
        containers.len(),
        info.images,
        (info.mem_total as f64 / GIB).round(),
        info.driver,
        running_lines,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use crate::invoke::testing::MockRunner;
    use crate::invoke::ProcessOutput;
    use crate::tools::test_support::{call, dispatcher};
    use serde_json::json;

    #[test]
    fn list_all_by_default() {
        let runner = MockRunner::new().ok("docker ps", "NAMES\tSTATUS\nweb\tUp\n");
        let d = dispatcher(GatewayConfig::default(), runner.clone());

        let env = call(&d, "list_docker_containers", json!({}));
        assert_eq!(env.first_text(), "OK | Docker containers\n\nNAMES\tSTATUS\nweb\tUp\n");
        assert_eq!(runner.calls()[0].args[..2], ["ps".to_string(), "-a".to_string()]);

        call(&d, "list_docker_containers", json!({"all": false}));
        assert_eq!(runner.calls()[1].args[1], "--format");
    }

    #[test]
    fn daemon_down_gets_hint() {
        let runner = MockRunner::new().fail("docker ps", 1, "Cannot connect to the Docker daemon");
        let env = call(&dispatcher(GatewayConfig::default(), runner), "list_docker_containers", json!({}));
        assert!(env.is_failure());
        assert!(env.first_text().contains("systemctl status docker"));
    }

    #[test]
    fn logs_share_one_pipe_and_pass_tail() {
        let runner = MockRunner::new().ok("sh -c", "GET /\nwarn: slow\nGET /health\n");
        let d = dispatcher(GatewayConfig::default(), runner.clone());

        let env = call(&d, "get_docker_logs", json!({"container": "web", "lines": 5}));
        assert_eq!(
            env.first_text(),
            "OK | Logs for container \"web\" (last 5 lines)\n\nGET /\nwarn: slow\nGET /health\n"
        );
        let spawned = &runner.calls()[0];
        assert_eq!(spawned.program, "sh");
        assert_eq!(spawned.args, vec!["-c", LOGS_SCRIPT, "sh", "5", "web"]);
    }

    #[test]
    fn container_name_is_not_shell_text() {
        let runner = MockRunner::new().ok("sh -c", "");
        let d = dispatcher(GatewayConfig::default(), runner.clone());
        call(&d, "get_docker_logs", json!({"container": "web; rm -rf /", "lines": 1}));
        let spawned = &runner.calls()[0];
        assert_eq!(spawned.args[1], LOGS_SCRIPT);
        assert_eq!(spawned.args[4], "web; rm -rf /");
    }

    #[test]
    fn missing_container_reports_docker_error() {
        let runner = MockRunner::new().respond(
            "sh -c",
            ProcessOutput { code: Some(1), stdout: "Error: No such container: ghost\n".into(), stderr: String::new() },
        );
        let env = call(&dispatcher(GatewayConfig::default(), runner), "get_docker_logs", json!({"container": "ghost"}));
        assert!(env.first_text().starts_with("ERROR | Fetching container logs failed: Error: No such container: ghost"));
        assert!(env.first_text().contains("docker ps -a"));
    }

    #[test]
    fn logs_require_container() {
        let runner = MockRunner::new();
        let env = call(&dispatcher(GatewayConfig::default(), runner.clone()), "get_docker_logs", json!({"lines": 5}));
        assert!(env.first_text().contains("missing required parameter 'container'"));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn logs_reject_string_line_count() {
        let runner = MockRunner::new();
        let env = call(
            &dispatcher(GatewayConfig::default(), runner.clone()),
            "get_docker_logs",
            json!({"container": "web", "lines": "50"}),
        );
        assert!(env.first_text().contains("parameter 'lines' must be a non-negative integer, got a string"));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn status_report_counts_running_containers() {
        let info = r#"{"ServerVersion":"27.1.1","Images":12,"MemTotal":16647962624,"Driver":"overlay2","Containers":3}"#;
        let ps = concat!(
            r#"{"Names":"web","Image":"nginx:1.27","State":"running"}"#, "\n",
            r#"{"Names":"db","Image":"postgres:16","State":"running"}"#, "\n",
            r#"{"Names":"job","Image":"alpine","State":"exited"}"#, "\n",
        );
        let runner = MockRunner::new().ok("docker info", info).ok("docker ps -a", ps);
        let ctx = crate::dispatch::Context::new(GatewayConfig::default(), Box::new(runner));

        let report = status_report(&ctx).unwrap();
        assert!(report.starts_with("Server: 27.1.1\nContainers: 2 running / 3 total\nImages: 12\nMemory: 16GiB\nDriver: overlay2"));
        assert!(report.ends_with("Running containers:\n- web: nginx:1.27\n- db: postgres:16"));
    }

    #[test]
    fn status_report_with_nothing_running() {
        let runner = MockRunner::new().ok("docker info", "{}").ok("docker ps -a", "");
        let ctx = crate::dispatch::Context::new(GatewayConfig::default(), Box::new(runner));
        let report = status_report(&ctx).unwrap();
        assert!(report.contains("Containers: 0 running / 0 total"));
        assert!(report.ends_with("No running containers"));
    }

    #[test]
    fn status_report_daemon_down() {
        let runner = MockRunner::new().fail("docker info", 1, "Cannot connect to the Docker daemon");
        let ctx = crate::dispatch::Context::new(GatewayConfig::default(), Box::new(runner));
        let err = status_report(&ctx).unwrap_err();
        assert!(err.to_string().contains("Cannot connect to the Docker daemon"));
        assert_eq!(err.hint().as_deref(), Some(DAEMON_HINT));
    }
}
