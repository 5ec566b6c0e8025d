// DevOps Gateway - Declarative Resources
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Parameterless read-only snapshots, recomputed on every resources/read.

use crate::dispatch::Context;
use crate::error::ToolResult;
use crate::format;
use crate::tools::{docker, system};
use serde_json::{json, Value};

pub const MIME_TYPE: &str = "text/plain";

pub struct ResourceSpec {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    render: fn(&Context) -> ToolResult<String>,
}

const RESOURCES: &[ResourceSpec] = &[
    ResourceSpec {
        uri: "docker://status",
        name: "Docker status",
        description: "Server version, container counts, images, memory, storage driver and running containers",
        render: docker::status_report,
    },
    ResourceSpec {
        uri: "system://info",
        name: "System information",
        description: "Hostname, uptime, memory and root disk usage",
        render: system::system_report,
    },
];

pub fn find(uri: &str) -> Option<&'static ResourceSpec> {
    RESOURCES.iter().find(|r| r.uri == uri)
}

/// resources/list result
pub fn list() -> Value {
    let resources: Vec<Value> = RESOURCES
        .iter()
        .map(|r| {
            json!({
                "uri": r.uri,
                "name": r.name,
                "description": r.description,
                "mimeType": MIME_TYPE,
            })
        })
        .collect();
    json!({ "resources": resources })
}

/// resources/read result, or None for an unknown uri.
/// A failed snapshot still answers, with the failure text as content.
pub fn read(ctx: &Context, uri: &str) -> Option<Value> {
    let resource = find(uri)?;
    let text = match (resource.render)(ctx) {
        Ok(text) => text,
        Err(err) => {
            log::warn!("{} -> {}", uri, err);
            format::failure(&err).first_text().to_string()
        }
    };
    Some(json!({
        "contents": [{ "uri": resource.uri, "mimeType": MIME_TYPE, "text": text }]
    }))
}
