//! Resilient recovery of named string fields from model output.
//!
//! Model answers are usually, but not reliably, JSON. The
//! [`StructuredExtractor`] layers three strategies, from strict to lenient:
//!
//! 1. **structured literal** - brace-delimited substring parsed as JSON
//! 2. **key pattern** - `"field": "value"` and its quote variants
//! 3. **line heuristic** - a line mentioning a field keyword, split on `:`
//!
//! Extraction is all-or-nothing: a result has every schema field, or the
//! call fails with [`ExtractionError::ExtractionFailed`].
//!
//! # Example
//!
//! ```
//! use stox_agent::extraction::{Confidence, ProductListing, StructuredExtractor};
//!
//! let extractor = StructuredExtractor::product_listing().unwrap();
//! let result = extractor
//!     .extract("title: 'Oak Desk'\ndescription: \"Solid oak, 120cm\"")
//!     .unwrap();
//! assert_eq!(result.confidence, Confidence::KeyValue);
//!
//! let listing = ProductListing::try_from(&result).unwrap();
//! assert_eq!(listing.title, "Oak Desk");
//! ```

pub mod error;
pub mod extractor;
pub mod listing;
pub mod schema;
mod strategies;

pub use error::{preview, ExtractionError, PREVIEW_CHARS};
pub use extractor::{extract, ExtractedResult, StructuredExtractor};
pub use listing::ProductListing;
pub use schema::{Confidence, FieldSchema, FieldSpec, Strategy};
