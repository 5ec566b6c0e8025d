// DevOps Gateway - Parameter Validator
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Checks a raw parameter payload against an operation's declared schema:
// - Required fields present
// - Optional fields filled with declared defaults
// - Declared kinds hold (no silent coercion)
// - Enum values are members of the declared set
// Unknown fields are ignored. Pure, no side effects.

use crate::error::{ToolError, ToolResult};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

/// Declared kind of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    /// Non-negative integer
    Count,
    Boolean,
    Enum(&'static [&'static str]),
}

impl ParamKind {
    fn expected(&self) -> &'static str {
        match self {
            ParamKind::String | ParamKind::Enum(_) => "a string",
            ParamKind::Count => "a non-negative integer",
            ParamKind::Boolean => "a boolean",
        }
    }

    /// JSON Schema fragment advertised through tools/list
    fn json_schema(&self) -> Value {
        match self {
            ParamKind::String => json!({"type": "string"}),
            ParamKind::Count => json!({"type": "integer", "minimum": 0}),
            ParamKind::Boolean => json!({"type": "boolean"}),
            ParamKind::Enum(values) => json!({"type": "string", "enum": values}),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub default: Option<Value>,
    pub description: &'static str,
}

impl Field {
    pub fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self { name, kind, required: true, default: None, description }
    }

    pub fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self { name, kind, required: false, default: None, description }
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// Ordered parameter schema of one operation
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// JSON Schema object for MCP inputSchema
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in &self.fields {
            let mut prop = field.kind.json_schema();
            prop["description"] = json!(field.description);
            if let Some(default) = &field.default {
                prop["default"] = default.clone();
            }
            properties.insert(field.name.to_string(), prop);
            if field.required {
                required.push(field.name);
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Parameters after schema application. Every declared kind holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Map<String, Value>);

impl Params {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Deserialize into an operation's typed argument struct
    pub fn parse<T: DeserializeOwned>(self) -> ToolResult<T> {
        serde_json::from_value(Value::Object(self.0)).map_err(|e| ToolError::TypeMismatch {
            param: "arguments".to_string(),
            expected: "arguments matching the operation schema",
            found: serde_error_kind(&e),
        })
    }
}

fn serde_error_kind(e: &serde_json::Error) -> &'static str {
    if e.is_data() {
        "mismatched data"
    } else {
        "malformed data"
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_u64() || n.is_i64() => "an integer",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn check_kind(field: &Field, value: &Value) -> ToolResult<()> {
    let ok = match (field.kind, value) {
        (ParamKind::String, Value::String(_)) => true,
        (ParamKind::Boolean, Value::Bool(_)) => true,
        (ParamKind::Count, Value::Number(n)) => n.is_u64(),
        (ParamKind::Enum(allowed), Value::String(s)) => {
            if !allowed.contains(&s.as_str()) {
                return Err(ToolError::InvalidEnumValue {
                    param: field.name.to_string(),
                    value: s.clone(),
                    allowed: allowed.iter().map(|a| a.to_string()).collect(),
                });
            }
            true
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(ToolError::TypeMismatch {
            param: field.name.to_string(),
            expected: field.kind.expected(),
            found: json_type(value),
        })
    }
}

/// Apply `schema` to a raw payload
pub fn validate(schema: &Schema, raw: &Value) -> ToolResult<Params> {
    let empty = Map::new();
    let raw = match raw {
        Value::Object(map) => map,
        Value::Null => &empty,
        other => {
            return Err(ToolError::TypeMismatch {
                param: "arguments".to_string(),
                expected: "an object",
                found: json_type(other),
            })
        }
    };

    let mut out = Map::new();
    for field in &schema.fields {
        // An explicit null counts as absent
        match raw.get(field.name).filter(|v| !v.is_null()) {
            Some(value) => {
                check_kind(field, value)?;
                out.insert(field.name.to_string(), value.clone());
            }
            None if field.required => {
                return Err(ToolError::MissingParameter(field.name.to_string()));
            }
            None => {
                if let Some(default) = &field.default {
                    out.insert(field.name.to_string(), default.clone());
                }
            }
        }
    }
    Ok(Params(out))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    const FORMATS: &[&str] = &["oneline", "short", "full"];

    fn schema() -> Schema {
        Schema::new(vec![
            Field::required("container", ParamKind::String, "Container name"),
            Field::optional("lines", ParamKind::Count, "Line count").default(100),
            Field::optional("follow", ParamKind::Boolean, "Follow"),
            Field::optional("format", ParamKind::Enum(FORMATS), "Format").default("oneline"),
        ])
    }

    #[test]
    fn missing_required_names_field() {
        let err = validate(&schema(), &json!({"lines": 5})).unwrap_err();
        assert!(matches!(err, ToolError::MissingParameter(ref f) if f == "container"));
    }

    #[test]
    fn null_counts_as_missing() {
        let err = validate(&schema(), &json!({"container": null})).unwrap_err();
        assert!(matches!(err, ToolError::MissingParameter(_)));
    }

    #[test]
    fn defaults_filled_and_optional_left_absent() {
        let params = validate(&schema(), &json!({"container": "web"})).unwrap();
        assert_eq!(params.get("lines"), Some(&json!(100)));
        assert_eq!(params.get("format"), Some(&json!("oneline")));
        assert_eq!(params.get("follow"), None);
    }

    #[test]
    fn string_where_count_declared_is_rejected() {
        let err = validate(&schema(), &json!({"container": "web", "lines": "5"})).unwrap_err();
        match err {
            ToolError::TypeMismatch { param, expected, found } => {
                assert_eq!(param, "lines");
                assert_eq!(expected, "a non-negative integer");
                assert_eq!(found, "a string");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn negative_and_fractional_counts_rejected() {
        assert!(validate(&schema(), &json!({"container": "web", "lines": -1})).is_err());
        assert!(validate(&schema(), &json!({"container": "web", "lines": 1.5})).is_err());
    }

    #[test]
    fn enum_outside_set_lists_allowed() {
        let err = validate(&schema(), &json!({"container": "web", "format": "fancy"})).unwrap_err();
        match err {
            ToolError::InvalidEnumValue { allowed, value, .. } => {
                assert_eq!(value, "fancy");
                assert_eq!(allowed, vec!["oneline", "short", "full"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn extra_fields_ignored() {
        let params = validate(&schema(), &json!({"container": "web", "colour": "red"})).unwrap();
        assert!(params.get("colour").is_none());
    }

    #[test]
    fn non_object_payload_rejected() {
        assert!(validate(&schema(), &json!(["web"])).is_err());
        assert!(validate(&Schema::empty(), &Value::Null).is_ok());
    }

    #[test]
    fn parse_into_typed_args() {
        #[derive(Deserialize)]
        struct Args {
            container: String,
            lines: u64,
            follow: Option<bool>,
        }
        let args: Args = validate(&schema(), &json!({"container": "web"})).unwrap().parse().unwrap();
        assert_eq!(args.container, "web");
        assert_eq!(args.lines, 100);
        assert_eq!(args.follow, None);
    }

    #[test]
    fn json_schema_lists_required_and_defaults() {
        let js = schema().to_json_schema();
        assert_eq!(js["required"], json!(["container"]));
        assert_eq!(js["properties"]["lines"]["default"], json!(100));
        assert_eq!(js["properties"]["format"]["enum"], json!(["oneline", "short", "full"]));
    }
}
