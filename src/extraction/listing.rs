//! Typed product listing record.

use super::{ExtractedResult, ExtractionError, FieldSchema};
use serde::{Deserialize, Serialize};

/// SEO title and description of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductListing {
    /// Product title
    pub title: String,
    /// Product description
    pub description: String,
}

impl ProductListing {
    /// Schema resolving this record.
    pub fn schema() -> FieldSchema {
        FieldSchema::product_listing()
    }
}

impl TryFrom<&ExtractedResult> for ProductListing {
    type Error = ExtractionError;

    fn try_from(result: &ExtractedResult) -> Result<Self, Self::Error> {
        let field = |name: &str| {
            result
                .get(name)
                .map(str::to_string)
                .ok_or_else(|| ExtractionError::missing_field(name))
        };
        Ok(Self {
            title: field("title")?,
            description: field("description")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::StructuredExtractor;

    #[test]
    fn test_listing_from_extracted_result() {
        let result = StructuredExtractor::product_listing()
            .unwrap()
            .extract(r#"{"title": "Mug", "description": "Ceramic"}"#)
            .unwrap();
        let listing = ProductListing::try_from(&result).unwrap();
        assert_eq!(listing.title, "Mug");
        assert_eq!(listing.description, "Ceramic");
    }

    #[test]
    fn test_listing_requires_both_fields() {
        let result = crate::extraction::extract(r#"{"name": "Mug"}"#, &FieldSchema::new(["name"])).unwrap();
        let err = ProductListing::try_from(&result).unwrap_err();
        assert_eq!(err, ExtractionError::missing_field("title"));
    }
}
