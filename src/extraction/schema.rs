//! Field schemas and strategy/confidence labels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A required field and the keywords that identify it in free-form lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name, used as the JSON key and the key-pattern literal.
    pub name: String,
    /// Lowercase keywords for the line heuristic. Always includes `name`.
    pub synonyms: Vec<String>,
}

impl FieldSpec {
    /// Create a field whose only keyword is its own name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let synonyms = vec![name.to_lowercase()];
        Self { name, synonyms }
    }

    /// Add a keyword recognized by the line heuristic.
    pub fn with_synonym(mut self, synonym: impl Into<String>) -> Self {
        let synonym = synonym.into().to_lowercase();
        if !self.synonyms.contains(&synonym) {
            self.synonyms.push(synonym);
        }
        self
    }
}

/// Ordered list of required fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldSchema {
    fields: Vec<FieldSpec>,
}

impl FieldSchema {
    /// Create a schema from field names, in order.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: names.into_iter().map(FieldSpec::new).collect(),
        }
    }

    /// Create a schema from fully specified fields.
    pub fn from_specs(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// The `{title, description}` schema used for product listings,
    /// with Turkish keywords for the line heuristic.
    pub fn product_listing() -> Self {
        Self::from_specs(vec![
            FieldSpec::new("title").with_synonym("başlık"),
            FieldSpec::new("description").with_synonym("açıklama"),
        ])
    }

    /// Fields in schema order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Field names in schema order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema names no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parsing strategy, in the order they are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Strict JSON parse of a brace-delimited substring.
    StructuredLiteral,
    /// Per-field `key: value` regex variants.
    KeyPattern,
    /// Keyword match on individual lines.
    LineHeuristic,
}

impl Strategy {
    /// All strategies in attempt order.
    pub const ALL: [Strategy; 3] = [
        Strategy::StructuredLiteral,
        Strategy::KeyPattern,
        Strategy::LineHeuristic,
    ];

    /// Confidence label of a value produced by this strategy.
    pub fn confidence(self) -> Confidence {
        match self {
            Strategy::StructuredLiteral => Confidence::Json,
            Strategy::KeyPattern => Confidence::KeyValue,
            Strategy::LineHeuristic => Confidence::Heuristic,
        }
    }

    /// Kebab-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::StructuredLiteral => "structured-literal",
            Strategy::KeyPattern => "key-pattern",
            Strategy::LineHeuristic => "line-heuristic",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence of an extraction, ordered strongest first.
///
/// A result's confidence is the maximum (weakest) over its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Every field came from a strict JSON parse.
    Json,
    /// At least one field came from a key pattern.
    KeyValue,
    /// At least one field came from the line heuristic.
    Heuristic,
}

impl Confidence {
    /// Lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::Json => "json",
            Confidence::KeyValue => "keyvalue",
            Confidence::Heuristic => "heuristic",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
