//! Prompt template rendering.
//!
//! Templates are Handlebars over a root object
//! `{ "input": <caller arguments>, "context": <invocation context> }`:
//! `Hello {{input.name}}, calling from {{context.agent}}`.

use crate::error::{Error, Result};
use crate::model::InvocationContext;
use crate::ports::TemplateRenderer;
use handlebars::Handlebars;
use serde_json::{Value, json};

/// Handlebars renderer.
///
/// Double-stash output is HTML-escaped, triple-stash (`{{{x}}}`) is raw.
/// Paths that do not resolve render as the empty string. Block helpers
/// (`#if`, `#each`, `#with`, `#unless`) are the Handlebars built-ins.
#[derive(Clone, Debug, Default)]
pub struct HandlebarsRenderer {
    registry: Handlebars<'static>,
}

impl HandlebarsRenderer {
    /// Create a renderer with the default (non-strict) registry.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    fn render(&self, template: &str, input: &Value, context: &InvocationContext) -> Result<String> {
        let root = json!({ "input": input, "context": context.to_value() });
        self.registry
            .render_template(template, &root)
            .map_err(|e| Error::render(e.to_string()))
    }
}
