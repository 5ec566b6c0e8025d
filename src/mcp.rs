// DevOps Gateway - MCP Server
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// JSON-RPC 2.0 over stdio, one message per line. stdout carries protocol
// traffic only; diagnostics go to stderr through the log facade.

use crate::dispatch::{Dispatcher, Request};
use crate::error::ToolError;
use crate::{prompts, resources};
use anyhow::{Context, Result};
use chrono::Local;
use serde_json::{json, Value};
use std::fs::OpenOptions;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "devops-gateway";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

/// Summarize tool params for logging (truncate large values)
fn param_summary(name: &str, args: &Value) -> String {
    let field = |key: &str| args.get(key).and_then(Value::as_str).unwrap_or("?").to_string();
    match name {
        "run_command" => clip(&format!("cmd={}", field("command")), 200),
        "write_file" => {
            let size = args.get("content").and_then(Value::as_str).map(str::len).unwrap_or(0);
            format!("path={} content_len={}", field("path"), size)
        }
        "move_file" => format!("{} -> {}", field("source"), field("destination")),
        "search_files" => format!("path={} pattern={}", field("path"), field("pattern")),
        _ if args.get("path").is_some() => format!("path={}", field("path")),
        _ => clip(&args.to_string(), 300),
    }
}

fn clip(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

fn response(id: &Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn error_response(id: &Value, code: i64, message: &str) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })
}

pub struct Server {
    dispatcher: Dispatcher,
    call_log: Option<PathBuf>,
}

impl Server {
    pub fn new(dispatcher: Dispatcher) -> Self {
        let call_log = dispatcher.context().config.call_log.clone();
        Self { dispatcher, call_log }
    }

    /// Append one timestamped line to the persistent call log, if configured
    fn record(&self, msg: &str) {
        let Some(path) = &self.call_log else { return };
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(mut f) => {
                let ts = Local::now().format("%Y-%m-%d %H:%M:%S");
                if let Err(e) = writeln!(f, "[{}] {}", ts, msg) {
                    log::warn!("call log write failed: {}", e);
                }
            }
            Err(e) => log::warn!("call log {} unavailable: {}", path.display(), e),
        }
    }

    fn initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {}, "resources": {}, "prompts": {} },
            "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION }
        })
    }

    fn call_tool(&self, params: &Value) -> Value {
        let name = params["name"].as_str().unwrap_or("");
        let args = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        log::info!("CALL {} | {}", name, param_summary(name, &args));
        self.record(&format!("CALL {} | {}", name, param_summary(name, &args)));

        let envelope = self.dispatcher.handle(&Request::new(name, args));
        if envelope.is_failure() {
            let snippet: String = envelope.first_text().chars().take(200).collect();
            let snippet = snippet.replace('\n', " ");
            self.record(&format!("FAIL {} | {}", name, snippet));
        }
        json!(envelope)
    }

    /// Route one JSON-RPC message. None for notifications and unanswerable input.
    pub fn handle_message(&self, msg: &Value) -> Option<Value> {
        let method = msg["method"].as_str().unwrap_or("");
        let id = &msg["id"];
        let params = &msg["params"];
        log::debug!("received {}", method);

        let result = match method {
            "initialize" => Ok(self.initialize()),
            "notifications/initialized" => return None,
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.dispatcher.definitions() })),
            "tools/call" => Ok(self.call_tool(params)),
            "resources/list" => Ok(resources::list()),
            "resources/read" => {
                let uri = params["uri"].as_str().unwrap_or("");
                resources::read(self.dispatcher.context(), uri)
                    .ok_or_else(|| (INVALID_PARAMS, format!("Unknown resource: {}", uri)))
            }
            "prompts/list" => Ok(prompts::list()),
            "prompts/get" => {
                let name = params["name"].as_str().unwrap_or("");
                let args = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
                prompts::get(name, &args).map_err(|e| match e {
                    ToolError::UnknownOperation { .. } => (INVALID_PARAMS, format!("Unknown prompt: {}", name)),
                    other => (INVALID_PARAMS, other.to_string()),
                })
            }
            _ => Err((METHOD_NOT_FOUND, format!("Unknown method: {}", method))),
        };

        // Requests without an id are notifications and get no reply
        if id.is_null() {
            return None;
        }
        Some(match result {
            Ok(value) => response(id, value),
            Err((code, message)) => {
                log::warn!("{} -> {}", method, message);
                error_response(id, code, &message)
            }
        })
    }

    /// Serve until `reader` reaches EOF. Malformed lines are logged and skipped;
    /// only a failed write ends the loop early.
    pub fn run<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<()> {
        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    log::warn!("stdin read error: {}", e);
                    continue;
                }
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let msg: Value = match serde_json::from_str(line) {
                Ok(v) => v,
                Err(e) => {
                    log::warn!("JSON parse error: {}", e);
                    continue;
                }
            };

            if let Some(reply) = self.handle_message(&msg) {
                serde_json::to_writer(&mut writer, &reply).context("Failed to write response")?;
                writer.write_all(b"\n").context("Failed to write response")?;
                writer.flush().context("Failed to flush stdout")?;
            }
        }
        Ok(())
    }
}

/// Run the MCP server on stdin/stdout until EOF
pub fn serve(dispatcher: Dispatcher) -> Result<()> {
    log::info!(
        "{} v{} serving {} operations on stdio",
        SERVER_NAME,
        SERVER_VERSION,
        dispatcher.registry().len()
    );
    let server = Server::new(dispatcher);
    let stdin = io::stdin();
    let stdout = io::stdout();
    server.run(stdin.lock(), stdout.lock())
}

// ============================================================================
// TESTS
// ============================================================================
