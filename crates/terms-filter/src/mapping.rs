//! Field resolution: mapping declared field names to index fields.
//!
//! The compiler asks a [`FieldResolver`] about the field named in a terms
//! filter. A resolved field replaces the declared name in every leaf and may
//! carry a [`ValueEncoder`] that turns each raw term into its indexed form.
//! Unmapped fields are used as written.
//!
//! [`MappingResolver`] is a resolver driven by a [`MappingConfig`], which
//! deserializes from TOML or JSON:
//!
//! ```toml
//! doc_types = ["post"]
//!
//! [fields.status]
//! type = "keyword"
//!
//! [fields.age]
//! index_name = "user_age"
//! type = "long"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::evaluator::Document;
use crate::terms::token::kind_of;
use crate::terms::{FilterError, FilterNode, FilterResult};

/// Index field holding a document's type.
pub const TYPE_FIELD: &str = "_type";

/// Turns a raw term into its indexed form.
///
/// Any `Fn(&str) -> Result<String, String>` is an encoder.
pub trait ValueEncoder: Send + Sync {
    /// Encodes `raw`, or explains why it cannot be encoded.
    fn encode(&self, raw: &str) -> Result<String, String>;
}

impl<F> ValueEncoder for F
where
    F: Fn(&str) -> Result<String, String> + Send + Sync,
{
    fn encode(&self, raw: &str) -> Result<String, String> {
        self(raw)
    }
}

/// The outcome of resolving a mapped field.
#[derive(Clone)]
pub struct ResolvedField {
    /// Index-level field name used in every leaf.
    pub canonical_name: String,
    /// Encoder applied to each term, if the field has one.
    pub encoder: Option<Arc<dyn ValueEncoder>>,
    /// Document type named by a `type.field` prefix, if any.
    pub doc_type: Option<String>,
}

impl fmt::Debug for ResolvedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedField")
            .field("canonical_name", &self.canonical_name)
            .field("has_encoder", &self.encoder.is_some())
            .field("doc_type", &self.doc_type)
            .finish()
    }
}

impl ResolvedField {
    /// Creates a resolved field without an encoder.
    pub fn new(canonical_name: impl Into<String>) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            encoder: None,
            doc_type: None,
        }
    }

    /// Sets the encoder.
    pub fn with_encoder(mut self, encoder: impl ValueEncoder + 'static) -> Self {
        self.encoder = Some(Arc::new(encoder));
        self
    }

    /// Sets the document type.
    pub fn with_doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    /// Encodes one raw term for this field.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidTermValue` if the encoder rejects the term.
    pub fn encode(&self, raw: &str) -> FilterResult<String> {
        match &self.encoder {
            Some(encoder) => encoder
                .encode(raw)
                .map_err(|reason| FilterError::InvalidTermValue {
                    field: self.canonical_name.clone(),
                    value: raw.to_string(),
                    reason,
                }),
            None => Ok(raw.to_string()),
        }
    }
}

/// Field resolution collaborator.
pub trait FieldResolver: Send + Sync {
    /// Resolves a declared field name, or returns `None` if it is unmapped.
    fn resolve(&self, field_name: &str) -> Option<ResolvedField>;

    /// Wraps a compiled filter for the resolution that produced it.
    ///
    /// Called for every compiled filter, mapped or not. The default returns
    /// the filter unchanged.
    fn wrap(&self, filter: FilterNode, resolved: Option<&ResolvedField>) -> FilterNode {
        let _ = resolved;
        filter
    }
}

/// A resolver with no mapped fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMappings;

impl FieldResolver for NoMappings {
    fn resolve(&self, _field_name: &str) -> Option<ResolvedField> {
        None
    }
}

/// The indexed type of a mapped field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Stored verbatim.
    #[default]
    Keyword,
    /// Lowercased.
    Lowercase,
    /// 64-bit integer.
    Long,
    /// 64-bit float.
    Double,
    /// Boolean, indexed as `T` or `F`.
    Boolean,
    /// Timestamp, indexed as epoch milliseconds.
    Date,
}

impl ValueEncoder for FieldType {
    fn encode(&self, raw: &str) -> Result<String, String> {
        match self {
            FieldType::Keyword => Ok(raw.to_string()),
            FieldType::Lowercase => Ok(raw.to_lowercase()),
            FieldType::Long => raw
                .trim()
                .parse::<i64>()
                .map(|n| n.to_string())
                .map_err(|e| format!("not a long: {}", e)),
            FieldType::Double => raw
                .trim()
                .parse::<f64>()
                .map(|n| n.to_string())
                .map_err(|e| format!("not a double: {}", e)),
            FieldType::Boolean => match raw.trim().to_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => Ok("T".to_string()),
                "false" | "off" | "no" | "0" => Ok("F".to_string()),
                _ => Err("not a boolean".to_string()),
            },
            FieldType::Date => parse_epoch_millis(raw.trim()).map(|ms| ms.to_string()),
        }
    }
}

/// Parses epoch millis, an RFC 3339 timestamp, a local `YYYY-MM-DDTHH:MM:SS`
/// (read as UTC) or a `YYYY-MM-DD` date.
fn parse_epoch_millis(raw: &str) -> Result<i64, String> {
    if let Ok(ms) = raw.parse::<i64>() {
        return Ok(ms);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.timestamp_millis());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt.and_utc().timestamp_millis());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }
    Err("not a date (expected RFC 3339, YYYY-MM-DD or epoch millis)".to_string())
}

/// One mapped field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Index-level name; defaults to the declared name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,

    /// Indexed type.
    #[serde(default, rename = "type")]
    pub field_type: FieldType,
}

/// Declarative field mappings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Document types usable as `type.field` prefixes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub doc_types: Vec<String>,

    /// Mapped fields by declared name.
    #[serde(default)]
    pub fields: BTreeMap<String, FieldMapping>,
}

/// A [`FieldResolver`] backed by a [`MappingConfig`].
///
/// Names resolve exactly first. Failing that, a name of the form
/// `type.field` whose prefix is a configured document type resolves to
/// `field`, and filters on it are scoped to that type.
#[derive(Debug, Clone, Default)]
pub struct MappingResolver {
    config: MappingConfig,
}

impl MappingResolver {
    /// Creates a resolver for `config`.
    pub fn new(config: MappingConfig) -> Self {
        Self { config }
    }

    /// Returns the underlying mappings.
    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    fn resolve_direct(&self, name: &str) -> Option<ResolvedField> {
        let mapping = self.config.fields.get(name)?;
        let index_name = mapping.index_name.as_deref().unwrap_or(name);
        Some(ResolvedField::new(index_name).with_encoder(mapping.field_type))
    }
}

impl FieldResolver for MappingResolver {
    fn resolve(&self, field_name: &str) -> Option<ResolvedField> {
        if let Some(resolved) = self.resolve_direct(field_name) {
            return Some(resolved);
        }

        let (doc_type, rest) = field_name.split_once('.')?;
        if !self.config.doc_types.iter().any(|t| t == doc_type) {
            return None;
        }
        self.resolve_direct(rest)
            .map(|resolved| resolved.with_doc_type(doc_type))
    }

    fn wrap(&self, filter: FilterNode, resolved: Option<&ResolvedField>) -> FilterNode {
        match resolved.and_then(|r| r.doc_type.as_deref()) {
            Some(doc_type) => {
                FilterNode::all_of(vec![filter, FilterNode::term(TYPE_FIELD, doc_type)])
            }
            None => filter,
        }
    }
}

/// Builds an indexed [`Document`] from a JSON source object.
///
/// Each member is resolved like a filter field: mapped fields are stored
/// under their index name with encoded values, unmapped fields as written.
/// Arrays contribute every element; nulls are skipped.
///
/// # Errors
///
/// Returns `FilterError::MalformedFilter` if `source` is not an object or a
/// member holds a nested object, and `FilterError::InvalidTermValue` if a
/// value cannot be encoded.
pub fn index_document(resolver: &dyn FieldResolver, source: &Value) -> FilterResult<Document> {
    let Value::Object(members) = source else {
        return Err(FilterError::malformed(format!(
            "document must be an object, got {}",
            kind_of(source)
        )));
    };

    let mut document = Document::new();
    for (name, value) in members {
        let raw_values = scalar_texts(name, value)?;
        match resolver.resolve(name) {
            Some(resolved) => {
                for raw in raw_values {
                    let encoded = resolved.encode(&raw)?;
                    document.add_value(&resolved.canonical_name, encoded);
                }
            }
            None => {
                for raw in raw_values {
                    document.add_value(name, raw);
                }
            }
        }
    }
    Ok(document)
}

fn scalar_texts(name: &str, value: &Value) -> FilterResult<Vec<String>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Number(n) => Ok(vec![n.to_string()]),
        Value::Bool(b) => Ok(vec![b.to_string()]),
        Value::Array(items) => {
            let mut texts = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Array(_) | Value::Object(_) => {
                        return Err(FilterError::malformed(format!(
                            "field [{}] holds a nested {}",
                            name,
                            kind_of(item)
                        )))
                    }
                    other => texts.extend(scalar_texts(name, other)?),
                }
            }
            Ok(texts)
        }
        Value::Object(_) => Err(FilterError::malformed(format!(
            "field [{}] holds a nested object",
            name
        ))),
    }
}
