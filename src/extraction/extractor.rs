//! Layered fallback extraction of named fields from model output.

use super::strategies::{line_heuristic, KeyPattern, StructuredLiteral};
use super::{Confidence, ExtractionError, FieldSchema, Strategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every required field of a schema, recovered from free-form text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedResult {
    /// Field values by name. All non-empty.
    pub fields: BTreeMap<String, String>,
    /// Weakest strategy used across fields.
    pub confidence: Confidence,
    /// The text the fields were recovered from.
    pub raw_source: String,
    /// Strategy that resolved each field.
    pub field_sources: BTreeMap<String, Strategy>,
}

impl ExtractedResult {
    /// Value of a field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Strategy that produced a field.
    pub fn source_of(&self, name: &str) -> Option<Strategy> {
        self.field_sources.get(name).copied()
    }
}

/// Stateless extractor for one schema.
///
/// Patterns are compiled once in [`StructuredExtractor::new`]; repeated
/// calls to [`extract`](StructuredExtractor::extract) on the same text
/// return identical results.
#[derive(Debug, Clone)]
pub struct StructuredExtractor {
    schema: FieldSchema,
    literal: StructuredLiteral,
    key_patterns: Vec<KeyPattern>,
}

impl StructuredExtractor {
    /// Compile the strategies for `schema`.
    pub fn new(schema: FieldSchema) -> Result<Self, ExtractionError> {
        if schema.is_empty() {
            return Err(ExtractionError::EmptySchema);
        }

        let literal = StructuredLiteral::compile(&schema)?;
        let key_patterns = schema
            .fields()
            .iter()
            .map(KeyPattern::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            schema,
            literal,
            key_patterns,
        })
    }

    /// Extractor for the `{title, description}` listing schema.
    pub fn product_listing() -> Result<Self, ExtractionError> {
        Self::new(FieldSchema::product_listing())
    }

    /// The schema this extractor resolves.
    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// Recover every schema field from `raw_text`.
    ///
    /// Strategies run in order: structured literal, key pattern, line
    /// heuristic. A field keeps the value of the earliest strategy that
    /// resolved it.
    ///
    /// # Errors
    /// [`ExtractionError::ExtractionFailed`] when a field is still missing
    /// after all three strategies.
    pub fn extract(&self, raw_text: &str) -> Result<ExtractedResult, ExtractionError> {
        if let Some(values) = self.literal.apply(raw_text) {
            let field_sources = values
                .keys()
                .map(|name| (name.clone(), Strategy::StructuredLiteral))
                .collect();
            return Ok(ExtractedResult {
                fields: values,
                confidence: Confidence::Json,
                raw_source: raw_text.to_string(),
                field_sources,
            });
        }

        let mut fields = BTreeMap::new();
        let mut field_sources = BTreeMap::new();

        for (spec, pattern) in self.schema.fields().iter().zip(&self.key_patterns) {
            if let Some(value) = pattern.apply(raw_text) {
                fields.insert(spec.name.clone(), value);
                field_sources.insert(spec.name.clone(), Strategy::KeyPattern);
            }
        }

        for spec in self.schema.fields() {
            if fields.contains_key(&spec.name) {
                continue;
            }
            if let Some(value) = line_heuristic(spec, raw_text) {
                fields.insert(spec.name.clone(), value);
                field_sources.insert(spec.name.clone(), Strategy::LineHeuristic);
            }
        }

        let missing: Vec<String> = self
            .schema
            .names()
            .filter(|name| !fields.contains_key(*name))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(ExtractionError::failed(Strategy::ALL.to_vec(), missing, raw_text));
        }

        let confidence = field_sources
            .values()
            .map(|s: &Strategy| s.confidence())
            .max()
            .unwrap_or(Confidence::Json);

        Ok(ExtractedResult {
            fields,
            confidence,
            raw_source: raw_text.to_string(),
            field_sources,
        })
    }
}

/// One-shot extraction without keeping the compiled extractor.
pub fn extract(raw_text: &str, schema: &FieldSchema) -> Result<ExtractedResult, ExtractionError> {
    StructuredExtractor::new(schema.clone())?.extract(raw_text)
}
