//! Capability data model.
//!
//! Everything here is plain data: entries as they come out of the store,
//! the three capability specifications the classifiers produce, the opaque
//! invocation context, and the normalized content envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// ============================================================================
// Configuration entries
// ============================================================================

/// A single key/value entry from the configuration store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Hierarchical key, e.g. `/mcp/tools/echo`.
    pub name: String,
    /// Raw JSON document describing one capability.
    pub value: String,
}

impl ConfigEntry {
    /// Create an entry.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One page of a store listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigPage {
    /// Entries on this page, in store order.
    pub entries: Vec<ConfigEntry>,
    /// Continuation token for the next page, if any.
    pub next_token: Option<String>,
}

// ============================================================================
// Capability specifications
// ============================================================================

/// The three capability classes exposed to protocol clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    /// Callable tool backed by a remote compute unit.
    Tool,
    /// Static resource served under a URI.
    Resource,
    /// Templated prompt.
    Prompt,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tool => write!(f, "tool"),
            Self::Resource => write!(f, "resource"),
            Self::Prompt => write!(f, "prompt"),
        }
    }
}

/// A tool; the remote compute unit is derived from `name`.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolSpec {
    /// Tool name, unique among tools.
    pub name: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// Declared JSON-Schema for the tool's arguments.
    pub input_schema: Option<Value>,
}

/// A static resource.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceSpec {
    /// Resource name, unique among resources.
    pub name: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// URI the resource is published under.
    pub uri: String,
    /// Static body returned on every read.
    pub content: String,
}

/// A templated prompt.
#[derive(Clone, Debug, PartialEq)]
pub struct PromptSpec {
    /// Prompt name, unique among prompts.
    pub name: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// Declared JSON-Schema for the prompt's arguments.
    pub input_schema: Option<Value>,
    /// Template rendered against `{ input, context }`.
    pub content: String,
}

// ============================================================================
// InvocationContext
// ============================================================================

/// Opaque caller-identifying data threaded into every handler.
///
/// The core never inspects the contents; it only passes them along to the
/// template renderer and the remote compute unit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationContext(Map<String, Value>);

impl InvocationContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` when no fields are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The context as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for InvocationContext {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ============================================================================
// ContentItem
// ============================================================================

/// Normalized unit of response content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// Binary image, base64 encoded.
    Image {
        /// Base64-encoded image bytes.
        data: String,
        /// MIME type; `None` when the declared format is not recognized.
        #[serde(rename = "mimeType")]
        mime_type: Option<String>,
    },
}

impl ContentItem {
    /// A text item.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// An image item.
    pub fn image(data: impl Into<String>, mime_type: Option<&str>) -> Self {
        Self::Image {
            data: data.into(),
            mime_type: mime_type.map(str::to_string),
        }
    }

    /// The text of a text item.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Image { .. } => None,
        }
    }
}

// ============================================================================
// Prompt messages
// ============================================================================

/// Speaker of a prompt message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The end user.
    User,
    /// The model.
    Assistant,
}

/// One rendered prompt message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Who speaks.
    pub role: MessageRole,
    /// Message text.
    pub text: String,
}

impl PromptMessage {
    /// A user-role message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
        }
    }
}
