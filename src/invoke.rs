// DevOps Gateway - Process Invoker
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// The only place that spawns processes. Handlers describe a spawn as a
// CommandSpec and hand it to a ProcessRunner. Internal operations pass argv
// directly; only run_command goes through `sh -c`.

use crate::error::{ToolError, ToolResult};
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: &str) -> Self {
        Self { program: program.to_string(), args: Vec::new(), cwd: None }
    }

    /// Free-form command line interpreted by /bin/sh
    pub fn shell(line: &str) -> Self {
        Self::new("sh").arg("-c").arg(line)
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: Option<PathBuf>) -> Self {
        self.cwd = dir;
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, None when killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// stdout followed by a STDERR section when stderr is non-empty
    pub fn combined(&self) -> String {
        let mut out = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("\nSTDERR:\n");
            out.push_str(&self.stderr);
        }
        out
    }
}

/// Process-spawning facility
pub trait ProcessRunner {
    /// Spawn, wait, capture. Err only when the process could not be started.
    fn run(&self, spec: &CommandSpec) -> io::Result<ProcessOutput>;
}

/// Real runner over std::process::Command
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> io::Result<ProcessOutput> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }
        let output = cmd.output()?;
        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Run `spec` and treat spawn failure or non-zero exit as ActionFailed.
/// The failure detail is stderr, or stdout when stderr is empty.
pub fn run_checked(runner: &dyn ProcessRunner, spec: &CommandSpec, action: &str) -> ToolResult<ProcessOutput> {
    log::debug!("spawn: {}", spec);
    let output = runner
        .run(spec)
        .map_err(|e| ToolError::action(action, format!("could not start '{}': {}", spec.program, e)))?;

    if output.success() {
        return Ok(output);
    }

    let detail = if !output.stderr.trim().is_empty() {
        output.stderr.clone()
    } else if !output.stdout.trim().is_empty() {
        output.stdout.clone()
    } else {
        match output.code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    };
    log::warn!("'{}' exited with {:?}", spec, output.code);
    Err(ToolError::action(action, detail))
}

/// Run `spec`, returning trimmed stdout or None on any failure.
/// For best-effort probes where a missing tool is reported, not raised.
pub fn probe(runner: &dyn ProcessRunner, spec: &CommandSpec) -> Option<String> {
    match runner.run(spec) {
        Ok(out) if out.success() => Some(out.stdout.trim().to_string()),
        _ => None,
    }
}

// ============================================================================
// TEST SUPPORT
// ============================================================================


// ============================================================================
// TESTS
// ============================================================================
