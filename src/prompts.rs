// DevOps Gateway - Prompt Templates
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Text generators for prompts/get. Pure: no gate, no processes, no files.

use crate::error::{ToolError, ToolResult};
use crate::validate::{self, Field, ParamKind, Params, Schema};
use serde::Deserialize;
use serde_json::{json, Value};

pub struct PromptSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: Schema,
    render: fn(Params) -> ToolResult<String>,
}

pub fn catalog() -> Vec<PromptSpec> {
    vec![
        PromptSpec {
            name: "analyze_deployment",
            description: "Ask for a step-by-step analysis of an application's deployment",
            arguments: Schema::new(vec![
                Field::required("appName", ParamKind::String, "Application name"),
                Field::optional("issue", ParamKind::String, "Specific problem being seen"),
            ]),
            render: analyze_deployment,
        },
        PromptSpec {
            name: "generate_documentation",
            description: "Ask for complete operational documentation of a project",
            arguments: Schema::new(vec![
                Field::required("projectName", ParamKind::String, "Project name"),
                Field::optional("audience", ParamKind::String, "Intended readers (default: the operations team)"),
            ]),
            render: generate_documentation,
        },
    ]
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeploymentArgs {
    app_name: String,
    issue: Option<String>,
}

fn analyze_deployment(params: Params) -> ToolResult<String> {
    let args: DeploymentArgs = params.parse()?;
    let issue = args
        .issue
        .filter(|i| !i.trim().is_empty())
        .map(|i| format!(" with the following problem: {}", i))
        .unwrap_or_default();
    Ok(format!(
        "Analyze the deployment of the application \"{}\"{}.\n\n\
         Please:\n\
         1. List the related containers\n\
         2. Check the recent logs\n\
         3. Check the status of the services\n\
         4. Suggest possible fixes\n\
         5. Document what was found",
        args.app_name, issue
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentationArgs {
    project_name: String,
    audience: Option<String>,
}

fn generate_documentation(params: Params) -> ToolResult<String> {
    let args: DocumentationArgs = params.parse()?;
    let audience = args.audience.unwrap_or_else(|| "the operations team".to_string());
    Ok(format!(
        "Write complete documentation for the project \"{}\", aimed at {}.\n\n\
         Cover:\n\
         1. Purpose and architecture overview\n\
         2. Prerequisites and local setup\n\
         3. Build, deployment and configuration\n\
         4. Containers, services and their dependencies\n\
         5. Monitoring, logs and troubleshooting\n\
         6. Common operational tasks\n\n\
         Inspect the repository, git history and running containers before writing.",
        args.project_name, audience
    ))
}

/// prompts/list result
pub fn list() -> Value {
    let prompts: Vec<Value> = catalog()
        .iter()
        .map(|p| {
            let arguments: Vec<Value> = p
                .arguments
                .fields()
                .iter()
                .map(|f| json!({ "name": f.name, "description": f.description, "required": f.required }))
                .collect();
            json!({ "name": p.name, "description": p.description, "arguments": arguments })
        })
        .collect();
    json!({ "prompts": prompts })
}

/// prompts/get result. Unknown names and bad arguments are errors.
pub fn get(name: &str, arguments: &Value) -> ToolResult<Value> {
    let catalog = catalog();
    let prompt = catalog.iter().find(|p| p.name == name).ok_or_else(|| ToolError::UnknownOperation {
        name: name.to_string(),
        available: catalog.iter().map(|p| p.name.to_string()).collect(),
    })?;
    let params = validate::validate(&prompt.arguments, arguments)?;
    let text = (prompt.render)(params)?;
    Ok(json!({
        "description": prompt.description,
        "messages": [{ "role": "user", "content": { "type": "text", "text": text } }]
    }))
}
