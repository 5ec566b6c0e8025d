// DevOps Gateway - Operation Registry
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Every operation exposed through tools/call, registered once at start-up.
// Handlers: typed args from validated params -> gate -> invoke -> Reply.

pub mod docker;
pub mod files;
pub mod git;
pub mod shell;
pub mod system;

use crate::dispatch::{Context, Registry};
use crate::error::ToolResult;
use crate::gate::Access;
use crate::paths;
use std::path::PathBuf;

/// Build the full operation registry
pub fn registry() -> ToolResult<Registry> {
    let mut registry = Registry::new();
    for spec in shell::operations()
        .into_iter()
        .chain(docker::operations())
        .chain(git::operations())
        .chain(files::operations())
        .chain(system::operations())
    {
        registry.register(spec)?;
    }
    log::debug!("registered {} operations", registry.len());
    Ok(registry)
}

/// Expand `~` and run the path check for `access`
pub(crate) fn gated_path(ctx: &Context, raw: &str, access: Access) -> ToolResult<PathBuf> {
    let path = paths::expand_tilde(raw);
    ctx.gate.check_path(&path, access).into_result()?;
    Ok(PathBuf::from(path))
}

/// Same as gated_path for an optional parameter
pub(crate) fn gated_opt_path(ctx: &Context, raw: Option<&str>, access: Access) -> ToolResult<Option<PathBuf>> {
    raw.map(|p| gated_path(ctx, p, access)).transpose()
}
