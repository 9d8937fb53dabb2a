//! Schema Adapter: declared JSON-Schema to [`ParameterShape`].
//!
//! The protocol server validates call arguments field by field. A declared
//! input schema must be an object schema; each of its properties becomes a
//! compiled per-field validator.

use crate::error::{Error, Result};
use jsonschema::Validator;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// One declared parameter.
#[derive(Clone)]
pub struct FieldShape {
    name: String,
    schema: Value,
    required: bool,
    validator: Arc<Validator>,
}

impl FieldShape {
    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The property schema as declared.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Whether the caller must supply this parameter.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The `description` keyword of the property schema, if any.
    pub fn description(&self) -> Option<&str> {
        self.schema.get("description").and_then(Value::as_str)
    }

    fn check(&self, value: &Value, failures: &mut Vec<String>) {
        if self.validator.is_valid(value) {
            return;
        }
        failures.extend(
            self.validator
                .iter_errors(value)
                .map(|e| format!("{}: {e}", self.name)),
        );
    }
}

impl fmt::Debug for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldShape")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

/// The argument shape a capability accepts.
#[derive(Clone, Debug, Default)]
pub struct ParameterShape {
    fields: Vec<FieldShape>,
}

impl ParameterShape {
    /// A shape with no declared parameters.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Declared parameters, in schema order.
    pub fn fields(&self) -> &[FieldShape] {
        &self.fields
    }

    /// Returns `true` when no parameters are declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check call arguments against the declared parameters.
    ///
    /// Missing required parameters and per-field schema violations are
    /// reported together. Undeclared arguments are passed through.
    pub fn validate(&self, capability: &str, args: &Map<String, Value>) -> Result<()> {
        let mut failures = Vec::new();
        for field in &self.fields {
            match args.get(&field.name) {
                Some(value) => field.check(value, &mut failures),
                None if field.required => {
                    failures.push(format!("{}: required parameter is missing", field.name));
                }
                None => {}
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::invalid_arguments(capability, failures.join("; ")))
        }
    }

    /// Re-assemble the shape as an object JSON-Schema for listing.
    pub fn to_json_schema(&self) -> Map<String, Value> {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.schema.clone()))
            .collect();
        let required: Vec<Value> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| Value::String(f.name.clone()))
            .collect();

        let mut schema = Map::new();
        schema.insert("type".to_string(), Value::String("object".to_string()));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        schema
    }
}

/// Convert an optional declared schema into a [`ParameterShape`].
///
/// `capability` names the owner in error messages. No schema yields an empty
/// shape; a schema whose top-level `type` is not `"object"` is rejected.
pub fn to_parameter_shape(capability: &str, schema: Option<&Value>) -> Result<ParameterShape> {
    let Some(schema) = schema else {
        return Ok(ParameterShape::empty());
    };

    let object = schema
        .as_object()
        .ok_or_else(|| Error::schema(capability, "schema must be a JSON object"))?;

    match object.get("type").and_then(Value::as_str) {
        Some("object") => {}
        Some(other) => {
            return Err(Error::schema(
                capability,
                format!("top-level type must be \"object\", found \"{other}\""),
            ));
        }
        None => {
            return Err(Error::schema(
                capability,
                "top-level type must be \"object\"",
            ));
        }
    }

    let required = required_names(capability, object.get("required"))?;

    let properties = match object.get("properties") {
        None | Some(Value::Null) => return Ok(ParameterShape::empty()),
        Some(Value::Object(props)) => props,
        Some(_) => return Err(Error::schema(capability, "`properties` must be an object")),
    };

    let fields = properties
        .iter()
        .map(|(name, field_schema)| {
            let validator = jsonschema::validator_for(field_schema).map_err(|e| {
                Error::schema(capability, format!("property '{name}': {e}"))
            })?;
            Ok(FieldShape {
                name: name.clone(),
                schema: field_schema.clone(),
                required: required.iter().any(|r| r == name),
                validator: Arc::new(validator),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ParameterShape { fields })
}

fn required_names(capability: &str, required: Option<&Value>) -> Result<Vec<String>> {
    match required {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    Error::schema(capability, "`required` must list property names")
                })
            })
            .collect(),
        Some(_) => Err(Error::schema(capability, "`required` must be an array")),
    }
}
