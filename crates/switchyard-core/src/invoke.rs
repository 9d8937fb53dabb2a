//! Invocation Adapter: call a tool's remote compute unit and normalize the
//! response into [`ContentItem`]s.
//!
//! # Response contract
//!
//! The decoded body is one of:
//!
//! ```text
//! { "errorType": "...", "errorMessage": "..." }           platform failure
//! { "status": "error", "content": [{ "text": "..." }] }   tool failure
//! { "content": [ item, ... ] }                            success
//! ```
//!
//! where each item carries one of `text`, `json`, or
//! `image: { format, source: { bytes } }`. Items with none of these are
//! dropped.

use crate::error::{Error, Result};
use crate::model::{ContentItem, InvocationContext};
use crate::ports::ComputeInvoker;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;

const TOOL_FAILED: &str = "Tool execution failed";

/// Map an image format name to its MIME type.
///
/// Recognized: `gif`, `jpeg`/`jpg`, `png`, `webp` (case-insensitive).
pub fn mime_type_for(format: &str) -> Option<&'static str> {
    match format.to_ascii_lowercase().as_str() {
        "gif" => Some("image/gif"),
        "jpeg" | "jpg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Build the request payload sent to a compute unit.
pub fn tool_payload(input: &Value) -> Value {
    json!({ "toolUseId": null, "name": null, "input": input })
}

// ============================================================================
// Response documents
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseEnvelope {
    error_type: Option<String>,
    error_message: Option<String>,
    status: Option<String>,
    content: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentDocument {
    #[serde(default)]
    text: Value,
    #[serde(default)]
    json: Value,
    #[serde(default)]
    image: Value,
}

#[derive(Debug, Deserialize)]
struct ImageDocument {
    format: Option<String>,
    source: Option<ImageSource>,
}

#[derive(Debug, Deserialize)]
struct ImageSource {
    bytes: Option<ImageBytes>,
}

/// The shapes image bytes arrive in.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImageBytes {
    Raw(Vec<u8>),
    Buffer { data: Vec<u8> },
    Text(String),
}

impl ImageBytes {
    fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Raw(bytes) | Self::Buffer { data: bytes } => bytes,
            Self::Text(text) => text.into_bytes(),
        }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn map_item(item: &Value) -> Option<ContentItem> {
    let doc: ContentDocument = serde_json::from_value(item.clone()).ok()?;

    if let Value::String(text) = &doc.text
        && !text.is_empty()
    {
        return Some(ContentItem::text(text.clone()));
    }

    if truthy(&doc.json) {
        return serde_json::to_string(&doc.json).ok().map(ContentItem::text);
    }

    // A malformed image drops only the image part.
    let image: ImageDocument = serde_json::from_value(doc.image).ok()?;
    let bytes = image.source?.bytes?.into_bytes();
    let mime = image.format.as_deref().and_then(mime_type_for);
    Some(ContentItem::image(STANDARD.encode(bytes), mime))
}

/// Normalize response content items, dropping anything unrecognized.
pub fn map_content(items: &[Value]) -> Vec<ContentItem> {
    items
        .iter()
        .filter_map(|item| {
            let mapped = map_item(item);
            if mapped.is_none() {
                log::debug!("Dropping unrecognized content item: {item}");
            }
            mapped
        })
        .collect()
}

/// Decode a raw compute response body.
pub fn decode_response(body: &[u8]) -> Result<Vec<ContentItem>> {
    let text = std::str::from_utf8(body)
        .map_err(|e| Error::invocation(format!("response is not valid UTF-8: {e}")))?;
    let envelope: ResponseEnvelope = serde_json::from_str(text)
        .map_err(|e| Error::invocation(format!("response is not a valid JSON object: {e}")))?;

    if let Some(error_type) = envelope.error_type.filter(|t| !t.is_empty()) {
        return Err(Error::invocation(
            envelope.error_message.unwrap_or(error_type),
        ));
    }

    if envelope.status.as_deref() == Some("error") {
        let message = envelope
            .content
            .as_deref()
            .and_then(<[Value]>::first)
            .and_then(|first| first.get("text"))
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .unwrap_or(TOOL_FAILED);
        return Err(Error::tool_execution(message));
    }

    let content = envelope
        .content
        .ok_or_else(|| Error::invocation("response has no content array"))?;
    Ok(map_content(&content))
}

// ============================================================================
// ToolInvoker
// ============================================================================

/// Routes tool calls to their remote compute units.
#[derive(Clone)]
pub struct ToolInvoker {
    compute: Arc<dyn ComputeInvoker>,
    unit_prefix: String,
}

impl ToolInvoker {
    /// Create an invoker; unit ids are `unit_prefix + tool_name`.
    pub fn new(compute: Arc<dyn ComputeInvoker>, unit_prefix: impl Into<String>) -> Self {
        Self {
            compute,
            unit_prefix: unit_prefix.into(),
        }
    }

    /// The compute unit bound to `tool_name`.
    pub fn unit_id(&self, tool_name: &str) -> String {
        format!("{}{tool_name}", self.unit_prefix)
    }

    /// Invoke `tool_name` with `input`, passing `context` alongside.
    pub async fn invoke(
        &self,
        tool_name: &str,
        input: &Value,
        context: &InvocationContext,
    ) -> Result<Vec<ContentItem>> {
        if tool_name.is_empty() {
            return Err(Error::tool_not_found(tool_name));
        }

        let unit_id = self.unit_id(tool_name);
        log::debug!("Invoking compute unit '{unit_id}' for tool '{tool_name}'");

        let body = self
            .compute
            .invoke(&unit_id, &tool_payload(input), &context.to_value())
            .await?;
        let content = decode_response(&body)?;

        log::debug!(
            "Tool '{tool_name}' returned {} content item(s)",
            content.len()
        );
        Ok(content)
    }
}

impl fmt::Debug for ToolInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolInvoker")
            .field("unit_prefix", &self.unit_prefix)
            .finish_non_exhaustive()
    }
}
