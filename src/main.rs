// DevOps Gateway - Main Entry Point
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// CLI and MCP stdio server.
// Usage:
//   devops-gateway serve                               # Run MCP server (stdio), the default
//   devops-gateway call <operation> [params-json]      # One-shot dispatch
//   devops-gateway tools                               # Print tool definitions
//   devops-gateway check-command <command-line>        # One-shot command gate check
//   devops-gateway check-path <path> [--write]         # One-shot path gate check
//   devops-gateway status                              # Show configuration summary
//   devops-gateway init-config [--force]               # Write default config file

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use devops_gateway::{
    config::GatewayConfig,
    dispatch::{Context, Dispatcher, Request},
    gate::{Access, PolicyDecision, PolicyGate},
    invoke::SystemRunner,
    mcp, paths, tools,
};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "devops-gateway")]
#[command(author = "Joseph Stone")]
#[command(version)]
#[command(about = "DevOps Gateway - allow-listed MCP access to shell, Docker, git and files")]
struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, global = true, default_value_os_t = paths::default_config_path())]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run MCP server (stdio JSON-RPC)
    Serve,

    /// Dispatch one operation and print the response envelope
    Call {
        /// Operation name (see `tools`)
        operation: String,

        /// Parameters as JSON object
        #[arg(default_value = "{}")]
        params: String,
    },

    /// Print tool definitions as served by tools/list
    Tools,

    /// Check a command line against the command allow-list
    CheckCommand {
        /// Full command line; only the leading token is checked
        command: String,
    },

    /// Check a path against the read (or write) prefixes
    CheckPath {
        path: String,

        /// Check write access instead of read
        #[arg(long)]
        write: bool,
    },

    /// Show configuration summary
    Status,

    /// Write the default configuration to the --config path
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn build_dispatcher(config: GatewayConfig) -> Result<Dispatcher> {
    let registry = tools::registry().context("Failed to build operation registry")?;
    Ok(Dispatcher::new(registry, Context::new(config, Box::new(SystemRunner))))
}

fn report_decision(decision: PolicyDecision) {
    match decision.reason() {
        Some(reason) => {
            println!("{}", reason);
            std::process::exit(1);
        }
        None => println!("ALLOWED"),
    }
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries JSON-RPC
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();

    let cli = Cli::parse();
    let config = GatewayConfig::load(&cli.config)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            mcp::serve(build_dispatcher(config)?)?;
        }

        Commands::Call { operation, params } => {
            let params: Value = serde_json::from_str(&params)
                .with_context(|| format!("Invalid params JSON: {}", params))?;
            let dispatcher = build_dispatcher(config)?;

            let envelope = dispatcher.handle(&Request::new(operation, params));
            println!("{}", serde_json::to_string_pretty(&envelope)?);

            let code = envelope.exit_code();
            if code != 0 {
                std::process::exit(code);
            }
        }

        Commands::Tools => {
            let dispatcher = build_dispatcher(config)?;
            println!("{}", serde_json::to_string_pretty(&dispatcher.definitions())?);
        }

        Commands::CheckCommand { command } => {
            report_decision(PolicyGate::new(config.policy).check_command(&command));
        }

        Commands::CheckPath { path, write } => {
            let access = if write { Access::Write } else { Access::Read };
            let gate = PolicyGate::new(config.policy);
            report_decision(gate.check_path(&paths::expand_tilde(&path), access));
        }

        Commands::Status => {
            println!("DevOps Gateway v{}", env!("CARGO_PKG_VERSION"));
            println!("Config: {:?}", cli.config);
            println!();
            println!("{}", config.summary());
            println!();
            let registry = tools::registry()?;
            println!("Operations ({}): {}", registry.len(), registry.names().join(", "));
        }

        Commands::InitConfig { force } => {
            GatewayConfig::init(&cli.config, force)?;
            println!("Default config written to {:?}", cli.config);
        }
    }

    Ok(())
}
