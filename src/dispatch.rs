// DevOps Gateway - Dispatcher
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Registry of operations and the per-request pipeline:
// lookup -> validate -> handler (gate + invoke) -> format.
// Nothing raised inside the pipeline escapes; every outcome is an Envelope.

use crate::config::GatewayConfig;
use crate::error::{ToolError, ToolResult};
use crate::format::{self, Envelope, Reply};
use crate::gate::PolicyGate;
use crate::invoke::ProcessRunner;
use crate::validate::{self, Params, Schema};
use serde_json::{json, Value};

/// Everything a handler may touch
pub struct Context {
    pub config: GatewayConfig,
    pub gate: PolicyGate,
    pub runner: Box<dyn ProcessRunner>,
}

impl Context {
    pub fn new(config: GatewayConfig, runner: Box<dyn ProcessRunner>) -> Self {
        let gate = PolicyGate::new(config.policy.clone());
        Self { config, gate, runner }
    }
}

pub type Handler = fn(&Context, Params) -> ToolResult<Reply>;

pub struct OperationSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: Schema,
    pub handler: Handler,
}

impl OperationSpec {
    pub fn new(name: &'static str, description: &'static str, schema: Schema, handler: Handler) -> Self {
        Self { name, description, schema, handler }
    }

    /// MCP tools/list entry
    pub fn definition(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.schema.to_json_schema(),
        })
    }
}

/// Inbound tool call
#[derive(Debug, Clone)]
pub struct Request {
    pub operation: String,
    pub parameters: Value,
}

impl Request {
    pub fn new(operation: impl Into<String>, parameters: Value) -> Self {
        Self { operation: operation.into(), parameters }
    }
}

/// Operations in registration order. Built once at start-up.
#[derive(Default)]
pub struct Registry {
    ops: Vec<OperationSpec>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, spec: OperationSpec) -> ToolResult<()> {
        if self.get(spec.name).is_some() {
            return Err(ToolError::DuplicateOperation(spec.name.to_string()));
        }
        self.ops.push(spec);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&OperationSpec> {
        self.ops.iter().find(|op| op.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.ops.iter().map(|op| op.name.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

pub struct Dispatcher {
    registry: Registry,
    ctx: Context,
}

impl Dispatcher {
    pub fn new(registry: Registry, ctx: Context) -> Self {
        Self { registry, ctx }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn definitions(&self) -> Vec<Value> {
        self.registry.ops.iter().map(OperationSpec::definition).collect()
    }

    pub fn handle(&self, request: &Request) -> Envelope {
        let result = self.execute(request);
        if let Err(ref e) = result {
            log::warn!("{} -> {}", request.operation, e);
        }
        format::render(result)
    }

    fn execute(&self, request: &Request) -> ToolResult<Reply> {
        let op = self
            .registry
            .get(&request.operation)
            .ok_or_else(|| ToolError::UnknownOperation {
                name: request.operation.clone(),
                available: self.registry.names(),
            })?;
        let params = validate::validate(&op.schema, &request.parameters)?;
        (op.handler)(&self.ctx, params)
    }
}

// ============================================================================
// TESTS
// ============================================================================
