// DevOps Gateway - File Operations
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Read-side operations check the read prefixes, mutating operations the
// (smaller) write prefixes. Paths are gated before any filesystem call.

use crate::dispatch::{Context, OperationSpec};
use crate::error::{ToolError, ToolResult};
use crate::format::Reply;
use crate::fs;
use crate::gate::Access;
use crate::invoke::CommandSpec;
use crate::validate::{Field, ParamKind, Params, Schema};
use serde::Deserialize;

const SEARCH_MODES: &[&str] = &["name", "content"];

pub fn operations() -> Vec<OperationSpec> {
    let path = |desc: &'static str| Field::required("path", ParamKind::String, desc);
    vec![
        OperationSpec::new(
            "read_file",
            "Read a text file, or its first N lines. Large files are returned as a truncated preview.",
            Schema::new(vec![
                path("Absolute path to the file"),
                Field::optional("lines", ParamKind::Count, "Only return the first N lines"),
            ]),
            read_file,
        ),
        OperationSpec::new(
            "write_file",
            "Write a text file. Optionally back up the existing file first.",
            Schema::new(vec![
                path("Absolute path to the file"),
                Field::required("content", ParamKind::String, "File content"),
                Field::optional("backup", ParamKind::Boolean, "Copy an existing file to a timestamped backup first")
                    .default(false),
            ]),
            write_file,
        ),
        OperationSpec::new(
            "list_directory",
            "List a directory: type, size and name of each entry.",
            Schema::new(vec![
                path("Directory to list"),
                Field::optional("show_hidden", ParamKind::Boolean, "Include dotfiles").default(false),
            ]),
            list_directory,
        ),
        OperationSpec::new(
            "create_directory",
            "Create a directory and any missing parents.",
            Schema::new(vec![path("Directory to create")]),
            create_directory,
        ),
        OperationSpec::new(
            "move_file",
            "Move or rename a file or directory. Never overwrites.",
            Schema::new(vec![
                Field::required("source", ParamKind::String, "Current path"),
                Field::required("destination", ParamKind::String, "New path"),
            ]),
            move_file,
        ),
        OperationSpec::new(
            "search_files",
            "Find files by name pattern or search file contents.",
            Schema::new(vec![
                path("Directory to search"),
                Field::required("pattern", ParamKind::String, "Name glob (name mode) or regex (content mode)"),
                Field::optional("mode", ParamKind::Enum(SEARCH_MODES), "Search file names or contents")
                    .default("name"),
                Field::optional("max_results", ParamKind::Count, "Maximum results").default(100),
            ]),
            search_files,
        ),
        OperationSpec::new(
            "get_file_info",
            "Show type, size, permissions, modification time and SHA-256 of a path.",
            Schema::new(vec![path("Path to inspect")]),
            file_info,
        ),
    ]
}

#[derive(Deserialize)]
struct ReadArgs {
    path: String,
    lines: Option<usize>,
}

fn read_file(ctx: &Context, params: Params) -> ToolResult<Reply> {
    let args: ReadArgs = params.parse()?;
    let path = super::gated_path(ctx, &args.path, Access::Read)?;
    let read = fs::read_text(&path, args.lines, ctx.config.max_read_bytes)?;
    Ok(Reply::new(format!("File: {}", path.display()), read.content).truncated(read.truncated))
}

#[derive(Deserialize)]
struct WriteArgs {
    path: String,
    content: String,
    backup: bool,
}

fn write_file(ctx: &Context, params: Params) -> ToolResult<Reply> {
    let args: WriteArgs = params.parse()?;
    let path = super::gated_path(ctx, &args.path, Access::Write)?;
    let outcome = fs::write_text(&path, &args.content, args.backup)?;
    let body = match outcome.backup {
        Some(backup) => format!("Backup saved to: {}", backup.display()),
        None => String::new(),
    };
    Ok(Reply::new(format!("Written: {} ({} bytes)", path.display(), outcome.bytes), body))
}

#[derive(Deserialize)]
struct ListArgs {
    path: String,
    show_hidden: bool,
}

fn list_directory(ctx: &Context, params: Params) -> ToolResult<Reply> {
    let args: ListArgs = params.parse()?;
    let path = super::gated_path(ctx, &args.path, Access::Read)?;
    let entries = fs::list_dir(&path, args.show_hidden)?;
    let body = if entries.is_empty() {
        "(empty)".to_string()
    } else {
        entries.iter().map(fs::DirEntry::line).collect::<Vec<_>>().join("\n")
    };
    Ok(Reply::new(format!("Directory: {} ({} entries)", path.display(), entries.len()), body))
}

#[derive(Deserialize)]
struct PathArgs {
    path: String,
}

fn create_directory(ctx: &Context, params: Params) -> ToolResult<Reply> {
    let args: PathArgs = params.parse()?;
    let path = super::gated_path(ctx, &args.path, Access::Write)?;
    let title = if fs::make_dir(&path)? {
        format!("Directory created: {}", path.display())
    } else {
        format!("Directory already exists: {}", path.display())
    };
    Ok(Reply::new(title, ""))
}

#[derive(Deserialize)]
struct MoveArgs {
    source: String,
    destination: String,
}

fn move_file(ctx: &Context, params: Params) -> ToolResult<Reply> {
    let args: MoveArgs = params.parse()?;
    let source = super::gated_path(ctx, &args.source, Access::Write)?;
    let destination = super::gated_path(ctx, &args.destination, Access::Write)?;
    fs::move_path(&source, &destination)?;
    Ok(Reply::new(format!("Moved: {} -> {}", source.display(), destination.display()), ""))
}

#[derive(Deserialize)]
struct SearchArgs {
    path: String,
    pattern: String,
    mode: String,
    max_results: usize,
}

fn search_files(ctx: &Context, params: Params) -> ToolResult<Reply> {
    let args: SearchArgs = params.parse()?;
    let root = super::gated_path(ctx, &args.path, Access::Read)?;
    let root_str = root.to_string_lossy().to_string();

    // argv only, no shell interpolation
    let spec = match args.mode.as_str() {
        "content" => CommandSpec::new("grep").args(["-rnI", "--", args.pattern.as_str(), root_str.as_str()]),
        _ => CommandSpec::new("find").args([root_str.as_str(), "-name", args.pattern.as_str()]),
    };

    let output = ctx.runner.run(&spec).map_err(|e| {
        ToolError::action("Searching files", format!("could not start '{}': {}", spec.program, e))
    })?;
    let matches: Vec<&str> = output.stdout.lines().filter(|l| !l.is_empty()).collect();

    // grep exits 1 on no match; find exits 1 on unreadable subdirectories
    if !output.success() && matches.is_empty() && !output.stderr.trim().is_empty() {
        return Err(ToolError::action("Searching files", output.stderr.trim())
            .with_hint("Check the pattern syntax and that the directory exists"));
    }

    if matches.is_empty() {
        return Ok(Reply::new(format!("No matches for '{}' in {}", args.pattern, root_str), ""));
    }

    let shown = matches.len().min(args.max_results);
    let mut title = format!("Found {} matches for '{}' in {}", matches.len(), args.pattern, root_str);
    if shown < matches.len() {
        title.push_str(&format!(" (showing first {})", shown));
    }
    Ok(Reply::new(title, matches[..shown].join("\n")))
}

fn file_info(ctx: &Context, params: Params) -> ToolResult<Reply> {
    let args: PathArgs = params.parse()?;
    let path = super::gated_path(ctx, &args.path, Access::Read)?;
    let info = fs::file_info(&path)?;

    let mut lines = vec![
        format!("Path: {}", info.path),
        format!("Type: {}", info.file_type.label()),
        format!("Size: {} bytes", info.size),
    ];
    if let Some(mode) = info.mode {
        lines.push(format!("Permissions: {:04o}", mode));
    }
    if let Some(modified) = info.modified {
        lines.push(format!("Modified: {}", modified));
    }
    if let Some(checksum) = info.checksum {
        lines.push(format!("SHA256: {}", checksum));
    }
    Ok(Reply::new(format!("File info: {}", path.display()), lines.join("\n")))
}

// ============================================================================
// TESTS
// ============================================================================
