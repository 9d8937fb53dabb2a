//! Spec Classifiers: turn raw store entries into typed capability specs.
//!
//! Each capability class owns a key prefix. Entries under the prefix are
//! decoded into a per-class document, checked for required fields, and
//! projected into the public spec. A bad entry is logged and dropped; it
//! never fails the batch.

use crate::error::{Error, Result};
use crate::model::{CapabilityKind, ConfigEntry, PromptSpec, ResourceSpec, ToolSpec};
use serde::Deserialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Input schemas are accepted either bare or wrapped as `{ "json": schema }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InputSchemaDocument {
    Wrapped { json: Value },
    Direct(Value),
}

impl InputSchemaDocument {
    fn into_schema(self) -> Option<Value> {
        let schema = match self {
            Self::Wrapped { json } => json,
            Self::Direct(value) => value,
        };
        (!schema.is_null()).then_some(schema)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolDocument {
    name: Option<String>,
    description: Option<String>,
    input_schema: Option<InputSchemaDocument>,
}

#[derive(Debug, Deserialize)]
struct ResourceDocument {
    name: Option<String>,
    description: Option<String>,
    uri: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptDocument {
    name: Option<String>,
    description: Option<String>,
    input_schema: Option<InputSchemaDocument>,
    content: Option<String>,
}

fn decode<T: serde::de::DeserializeOwned>(entry: &ConfigEntry) -> Result<T> {
    serde_json::from_str(&entry.value).map_err(|e| Error::config_parse(&entry.name, e.to_string()))
}

fn required(entry: &ConfigEntry, field: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::config_parse(
            &entry.name,
            format!("missing required field `{field}`"),
        )),
    }
}

// ---------------------------------------------------------------------------
// Per-class parsers
// ---------------------------------------------------------------------------

/// Parse a single tool entry.
pub fn parse_tool(entry: &ConfigEntry) -> Result<ToolSpec> {
    let doc: ToolDocument = decode(entry)?;
    Ok(ToolSpec {
        name: required(entry, "name", doc.name)?,
        description: doc.description,
        input_schema: doc.input_schema.and_then(InputSchemaDocument::into_schema),
    })
}

/// Parse a single resource entry. `name`, `uri` and `content` are required.
pub fn parse_resource(entry: &ConfigEntry) -> Result<ResourceSpec> {
    let doc: ResourceDocument = decode(entry)?;
    Ok(ResourceSpec {
        name: required(entry, "name", doc.name)?,
        uri: required(entry, "uri", doc.uri)?,
        content: required(entry, "content", doc.content)?,
        description: doc.description,
    })
}

/// Parse a single prompt entry. `name` and `content` are required.
pub fn parse_prompt(entry: &ConfigEntry) -> Result<PromptSpec> {
    let doc: PromptDocument = decode(entry)?;
    Ok(PromptSpec {
        name: required(entry, "name", doc.name)?,
        content: required(entry, "content", doc.content)?,
        description: doc.description,
        input_schema: doc.input_schema.and_then(InputSchemaDocument::into_schema),
    })
}

// ---------------------------------------------------------------------------
// Classifiers
// ---------------------------------------------------------------------------

fn classify<T>(
    entries: &[ConfigEntry],
    prefix: Option<&str>,
    kind: CapabilityKind,
    parse: fn(&ConfigEntry) -> Result<T>,
) -> Vec<T> {
    let Some(prefix) = prefix else {
        log::debug!("No {kind} prefix configured; skipping {kind} classification");
        return Vec::new();
    };

    entries
        .iter()
        .filter(|entry| {
            let matched = entry.name.starts_with(prefix);
            if !matched {
                log::trace!("Entry '{}' is outside {kind} prefix '{prefix}'", entry.name);
            }
            matched
        })
        .filter_map(|entry| match parse(entry) {
            Ok(spec) => Some(spec),
            Err(err) => {
                log::warn!("Dropping {kind} entry: {err}");
                None
            }
        })
        .collect()
}

/// Classify tool entries under `prefix`, preserving fetch order.
pub fn classify_tools(entries: &[ConfigEntry], prefix: Option<&str>) -> Vec<ToolSpec> {
    classify(entries, prefix, CapabilityKind::Tool, parse_tool)
}

/// Classify resource entries under `prefix`, preserving fetch order.
pub fn classify_resources(entries: &[ConfigEntry], prefix: Option<&str>) -> Vec<ResourceSpec> {
    classify(entries, prefix, CapabilityKind::Resource, parse_resource)
}

/// Classify prompt entries under `prefix`, preserving fetch order.
pub fn classify_prompts(entries: &[ConfigEntry], prefix: Option<&str>) -> Vec<PromptSpec> {
    classify(entries, prefix, CapabilityKind::Prompt, parse_prompt)
}

// ============================================================================
// Tests
// ============================================================================
