//! Narrow accessors over a DID document payload.
//!
//! The contract treats the document as opaque JSON and only ever touches two
//! fields: `id` (the store key) and `issued` (immutable after creation).
//! Everything else passes through untouched.

use serde_json::{Map, Value};

use crate::error::{ContractError, ContractResult};

/// Key of the DID inside the document.
pub const ID_FIELD: &str = "id";

/// Key of the creation timestamp inside the document.
pub const ISSUED_FIELD: &str = "issued";

/// A parsed DID document.
#[derive(Debug, Clone, PartialEq)]
pub struct DidDocument {
    fields: Map<String, Value>,
}

impl DidDocument {
    /// Parse raw document text. The payload must be a JSON object.
    ///
    /// Numbers keep their exact source text, so a parse followed by
    /// [`DidDocument::to_json_string`] never rounds or rejects them.
    ///
    /// # Errors
    /// `MalformedDocument` if `raw` is not well-formed JSON or not an object.
    pub fn parse(raw: &str) -> ContractResult<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ContractError::malformed(format!("document is not valid JSON: {e}")))?;
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(ContractError::malformed(format!(
                "document must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// The DID this document describes.
    ///
    /// # Errors
    /// `MalformedDocument` if `id` is missing, not a string, or blank.
    pub fn id(&self) -> ContractResult<&str> {
        match self.fields.get(ID_FIELD) {
            Some(Value::String(id)) if !id.trim().is_empty() => Ok(id.as_str()),
            Some(Value::String(_)) => Err(ContractError::malformed("field 'id' is empty")),
            Some(other) => Err(ContractError::malformed(format!(
                "field 'id' must be a string, got {}",
                json_kind(other)
            ))),
            None => Err(ContractError::malformed("required field 'id' is missing")),
        }
    }

    /// The creation timestamp, if present.
    #[must_use]
    pub fn issued(&self) -> Option<&Value> {
        self.fields.get(ISSUED_FIELD).filter(|v| !v.is_null())
    }

    /// Set the `issued` field to the given value, keeping every other field.
    #[must_use]
    pub fn with_issued(mut self, issued: Value) -> Self {
        self.fields.insert(ISSUED_FIELD.to_string(), issued);
        self
    }

    /// Serialize back to compact JSON with keys in ascending order.
    ///
    /// # Errors
    /// `MalformedDocument` if encoding fails.
    pub fn to_json_string(&self) -> ContractResult<String> {
        serde_json::to_string(&self.fields)
            .map_err(|e| ContractError::malformed(format!("encode document: {e}")))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
