//! Core schema merging for model type generation.
//!
//! This crate turns a set of independently derived JSON-Schema documents,
//! one per exported model, into a single document a generic
//! schema-to-types generator can consume:
//!
//! - [`merge_documents`] — deduplicates documents, flattens every `$defs`
//!   into one [`Namespace`], rewrites references and wraps the result in a
//!   [`CombinedSchema`].
//! - [`transform_namespace`] — optional [`CaseRule`] renaming of property
//!   names and `required` lists.
//! - [`rewrite_references`] — the pure `$ref` rewrite used by the merger.
//! - [`validate_combined`] — reference integrity checks on the output.
//!
//! Everything here is an in-memory tree transform; loading documents and
//! running generators live in `model-typegen-discovery`.
//!
//! # Example
//!
//! ```
//! use model_typegen_core::*;
//! use serde_json::json;
//!
//! let docs = vec![json!({
//!     "title": "Account",
//!     "properties": {
//!         "user_name": {"title": "User Name", "type": "string"},
//!         "owner": {"$ref": "#/$defs/Owner"}
//!     },
//!     "required": ["user_name"],
//!     "$defs": {"Owner": {"properties": {"is_admin": {"type": "boolean"}}}}
//! })];
//!
//! let mut merged = merge_documents(docs, MergeOptions::default()).unwrap();
//! transform_namespace(&mut merged.schema.definitions, CaseRule::Camel).unwrap();
//! assert!(validate_combined(&merged.schema).is_empty());
//!
//! let account = merged.schema.definitions.get("Account").unwrap();
//! assert_eq!(account["required"], json!(["userName"]));
//! assert_eq!(account["properties"]["owner"]["$ref"], "#/definitions/Owner");
//! ```

mod casing;
mod merge;
mod reference;
mod types;
mod validate;

pub use casing::{CaseError, CaseRule, transform_definition, transform_namespace};
pub use merge::{
    MergeError, MergeOptions, MergeOutput, MergeReport, dedupe_documents, merge_documents,
    strip_property_titles,
};
pub use reference::{
    collect_references, definition_pointer, reference_name, rewrite_known_references,
    rewrite_references,
};
pub use types::*;
pub use validate::{ValidationError, validate_combined};
