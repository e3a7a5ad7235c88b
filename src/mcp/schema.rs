// ABOUTME: MCP protocol schema definitions and message structures
// ABOUTME: Tool descriptors, JSON Schema subset with argument validation, and initialize payloads
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

//! MCP Protocol Schema Definitions
//!
//! Type-safe definitions for the MCP payloads this gateway produces, plus the
//! small JSON Schema subset tools declare their inputs with. Properties are
//! kept in a `BTreeMap` so `tools/list` renders identically on every call.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Server Information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Server name
    pub name: String,
    /// Server version
    pub version: String,
}

/// MCP Tool Schema Definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name
    pub name: String,
    /// Human readable description
    pub description: String,
    /// Declared input schema
    #[serde(rename = "inputSchema")]
    pub input_schema: JsonSchema,
}

/// JSON Schema Definition for tool arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchema {
    /// Always `"object"` for tool inputs
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Declared properties
    pub properties: BTreeMap<String, PropertySchema>,
    /// Required property names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

/// JSON Schema Property Definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    /// Primitive type: string, integer, number, boolean, array, object
    #[serde(rename = "type")]
    pub property_type: String,
    /// Human readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Allowed string values
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Inclusive lower bound for numbers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    /// Inclusive upper bound for numbers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
    /// Value assumed when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl PropertySchema {
    fn typed(property_type: &str, description: &str) -> Self {
        Self {
            property_type: property_type.to_owned(),
            description: Some(description.to_owned()),
            enum_values: None,
            minimum: None,
            maximum: None,
            default: None,
        }
    }

    /// String property
    #[must_use]
    pub fn string(description: &str) -> Self {
        Self::typed("string", description)
    }

    /// Integer property
    #[must_use]
    pub fn integer(description: &str) -> Self {
        Self::typed("integer", description)
    }

    /// Boolean property
    #[must_use]
    pub fn boolean(description: &str) -> Self {
        Self::typed("boolean", description)
    }

    /// String property restricted to `values`
    #[must_use]
    pub fn one_of(description: &str, values: &[&str]) -> Self {
        Self {
            enum_values: Some(values.iter().map(|v| (*v).to_owned()).collect()),
            ..Self::string(description)
        }
    }

    /// Constrain a numeric property to `[min, max]`
    #[must_use]
    pub const fn range(mut self, min: i64, max: i64) -> Self {
        self.minimum = Some(min);
        self.maximum = Some(max);
        self
    }

    /// Document the default value
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    fn check(&self, name: &str, value: &Value) -> Result<(), String> {
        let type_ok = match self.property_type.as_str() {
            "string" => value.is_string(),
            "integer" => value.is_i64() || value.is_u64(),
            "number" => value.is_number(),
            "boolean" => value.is_boolean(),
            "array" => value.is_array(),
            "object" => value.is_object(),
            _ => true,
        };
        if !type_ok {
            return Err(format!("{name} must be of type {}", self.property_type));
        }

        if let (Some(allowed), Some(text)) = (&self.enum_values, value.as_str()) {
            if !allowed.iter().any(|a| a == text) {
                return Err(format!("{name} must be one of: {}", allowed.join(", ")));
            }
        }

        if let Some(number) = value.as_i64() {
            if self.minimum.is_some_and(|min| number < min)
                || self.maximum.is_some_and(|max| number > max)
            {
                return Err(format!(
                    "{name} must be between {} and {}",
                    self.minimum.map_or_else(|| "-inf".to_owned(), |m| m.to_string()),
                    self.maximum.map_or_else(|| "inf".to_owned(), |m| m.to_string()),
                ));
            }
        }
        Ok(())
    }
}

impl JsonSchema {
    /// Object schema with the given properties and required names
    #[must_use]
    pub fn object(properties: Vec<(&str, PropertySchema)>, required: &[&str]) -> Self {
        Self {
            schema_type: "object".to_owned(),
            properties: properties
                .into_iter()
                .map(|(name, schema)| (name.to_owned(), schema))
                .collect(),
            required: required.iter().map(|r| (*r).to_owned()).collect(),
        }
    }

    /// Check `args` against this schema
    ///
    /// Unknown properties are tolerated; `null` counts as absent.
    ///
    /// # Errors
    ///
    /// Returns a human readable description of every violation found
    pub fn validate(&self, args: &Value) -> Result<(), String> {
        let empty = serde_json::Map::new();
        let object = match args {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => return Err("arguments must be an object".to_owned()),
        };

        let mut problems: Vec<String> = self
            .required
            .iter()
            .filter(|name| object.get(*name).map_or(true, Value::is_null))
            .map(|name| format!("missing required field {name}"))
            .collect();

        for (name, schema) in &self.properties {
            if let Some(value) = object.get(name).filter(|v| !v.is_null()) {
                if let Err(problem) = schema.check(name, value) {
                    problems.push(problem);
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }
}

/// Content block of a tool call result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Content {
    /// Plain text
    #[serde(rename = "text")]
    Text {
        /// Text body
        text: String,
    },
}

/// `tools/call` result payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Content blocks
    pub content: Vec<Content>,
    /// Present and true only for failed tool calls
    #[serde(rename = "isError", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

/// Capability flag with list-change notification support
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCapability {
    /// Whether the server emits list-changed notifications
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

/// Capabilities advertised by `initialize`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCapabilities {
    /// Tool support
    pub tools: ListCapability,
    /// Resource support (listing only, always empty)
    pub resources: ListCapability,
    /// Prompt support (listing only, always empty)
    pub prompts: ListCapability,
}

/// `initialize` result payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeResponse {
    /// Protocol revision implemented
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Advertised capabilities
    pub capabilities: ServerCapabilities,
    /// Server identification
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}
