//! The three parsing strategies, each compiled once per schema.

use super::{ExtractionError, FieldSchema, FieldSpec};
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::collections::BTreeMap;

/// Brace-delimited substring containing every field key in schema order,
/// parsed as strict JSON.
#[derive(Debug, Clone)]
pub(crate) struct StructuredLiteral {
    candidate: Regex,
    fields: Vec<String>,
}

impl StructuredLiteral {
    pub(crate) fn compile(schema: &FieldSchema) -> Result<Self, ExtractionError> {
        let mut pattern = String::from(r"\{");
        for name in schema.names() {
            pattern.push_str(r#".*?""#);
            pattern.push_str(&regex::escape(name));
            pattern.push('"');
        }
        pattern.push_str(r".*?\}");

        let candidate = RegexBuilder::new(&pattern)
            .dot_matches_new_line(true)
            .build()
            .map_err(|e| ExtractionError::InvalidPattern {
                field: schema.names().collect::<Vec<_>>().join(","),
                message: e.to_string(),
            })?;

        Ok(Self {
            candidate,
            fields: schema.names().map(str::to_string).collect(),
        })
    }

    /// First candidate that parses and has a non-empty string for every field.
    pub(crate) fn apply(&self, text: &str) -> Option<BTreeMap<String, String>> {
        self.candidate
            .find_iter(text)
            .find_map(|m| self.parse_candidate(m.as_str()))
    }

    fn parse_candidate(&self, candidate: &str) -> Option<BTreeMap<String, String>> {
        let Value::Object(object) = serde_json::from_str::<Value>(candidate).ok()? else {
            return None;
        };

        let mut values = BTreeMap::new();
        for name in &self.fields {
            let value = object.get(name)?.as_str()?.trim();
            if value.is_empty() {
                return None;
            }
            values.insert(name.clone(), value.to_string());
        }
        Some(values)
    }
}

/// Ordered `key: value` regex variants for one field.
#[derive(Debug, Clone)]
pub(crate) struct KeyPattern {
    variants: Vec<Regex>,
}

impl KeyPattern {
    pub(crate) fn compile(field: &FieldSpec) -> Result<Self, ExtractionError> {
        let key = regex::escape(&field.name);
        let sources = [
            format!(r#""{key}"\s*:\s*"([^"]+)""#),
            format!(r#""{key}"\s*:\s*'([^']+)'"#),
            format!(r#"{key}:\s*"([^"]+)""#),
            format!(r#"{key}:\s*'([^']+)'"#),
        ];

        let variants = sources
            .iter()
            .map(|source| {
                RegexBuilder::new(source)
                    .case_insensitive(true)
                    .dot_matches_new_line(true)
                    .build()
                    .map_err(|e| ExtractionError::InvalidPattern {
                        field: field.name.clone(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { variants })
    }

    /// Value captured by the first matching variant, if non-empty.
    pub(crate) fn apply(&self, text: &str) -> Option<String> {
        self.variants.iter().find_map(|variant| {
            let value = variant.captures(text)?.get(1)?.as_str().trim();
            (!value.is_empty()).then(|| value.to_string())
        })
    }
}

/// First line mentioning one of the field's keywords with a non-empty
/// value after its first colon.
pub(crate) fn line_heuristic(field: &FieldSpec, text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let lowered = line.to_lowercase();
        if !field.synonyms.iter().any(|s| lowered.contains(s.as_str())) {
            return None;
        }
        let (_, rest) = line.split_once(':')?;
        let value = rest
            .trim()
            .trim_matches(|c| matches!(c, '"' | ',' | '\''))
            .trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> FieldSchema {
        FieldSchema::product_listing()
    }

    #[test]
    fn test_structured_literal_skips_unparseable_candidates() {
        let literal = StructuredLiteral::compile(&listing()).unwrap();
        let text = r#"{"title": broken, "description": x} then {"title": "A", "description": "B"}"#;
        let values = literal.apply(text).unwrap();
        assert_eq!(values["title"], "A");
        assert_eq!(values["description"], "B");
    }

    #[test]
    fn test_structured_literal_requires_schema_key_order() {
        let literal = StructuredLiteral::compile(&listing()).unwrap();
        assert!(literal
            .apply(r#"{"description": "B", "title": "A"}"#)
            .is_none());
    }

    #[test]
    fn test_structured_literal_rejects_empty_values() {
        let literal = StructuredLiteral::compile(&listing()).unwrap();
        assert!(literal
            .apply(r#"{"title": "  ", "description": "B"}"#)
            .is_none());
    }

    #[test]
    fn test_key_pattern_variant_order() {
        let field = FieldSpec::new("title");
        let pattern = KeyPattern::compile(&field).unwrap();
        assert_eq!(pattern.apply("TITLE: 'single'").as_deref(), Some("single"));
        assert_eq!(
            pattern.apply("title: 'single' and \"Title\": \"double\"").as_deref(),
            Some("double")
        );
    }

    #[test]
    fn test_key_pattern_value_spans_newlines() {
        let field = FieldSpec::new("description");
        let pattern = KeyPattern::compile(&field).unwrap();
        let value = pattern.apply("\"description\": \"line one\nline two\"").unwrap();
        assert_eq!(value, "line one\nline two");
    }

    #[test]
    fn test_line_heuristic_strips_punctuation() {
        let field = FieldSpec::new("title").with_synonym("başlık");
        assert_eq!(
            line_heuristic(&field, "Başlık: \"Kırmızı Ayakkabı\",").as_deref(),
            Some("Kırmızı Ayakkabı")
        );
    }

    #[test]
    fn test_line_heuristic_skips_lines_without_value() {
        let field = FieldSpec::new("title");
        let text = "Here is the title:\nTitle: Blue Mug";
        assert_eq!(line_heuristic(&field, text).as_deref(), Some("Blue Mug"));
    }

    #[test]
    fn test_line_heuristic_splits_on_first_colon_only() {
        let field = FieldSpec::new("description");
        assert_eq!(
            line_heuristic(&field, "Description: Ratio 16:9 display").as_deref(),
            Some("Ratio 16:9 display")
        );
    }
}
