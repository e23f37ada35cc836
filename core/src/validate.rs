//! Combined schema validation.
//!
//! Checks reference integrity of a merged [`CombinedSchema`] before it is
//! handed to a generator: every local pointer must land on an existing
//! definition.
//!
//! # Examples
//!
//! ```
//! use model_typegen_core::*;
//! use serde_json::json;
//!
//! let mut namespace = Namespace::new();
//! namespace.insert("A", json!({"properties": {"b": {"$ref": "#/definitions/B"}}}));
//! let combined = CombinedSchema::new(namespace);
//!
//! let errors = validate_combined(&combined);
//! assert_eq!(
//!     errors,
//!     vec![ValidationError::DanglingReference {
//!         definition: "A".into(),
//!         target: "#/definitions/B".into(),
//!     }]
//! );
//! ```

use thiserror::Error;

use crate::reference::{collect_references, reference_name};
use crate::types::{CombinedSchema, DEFINITIONS_PREFIX};

/// Reference integrity problems found in a combined schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A definition is registered under an empty name.
    #[error("definition name cannot be empty")]
    EmptyDefinitionName,
    /// A `#/definitions/...` pointer names a missing definition.
    #[error("definition '{definition}' references unknown definition '{target}'")]
    DanglingReference { definition: String, target: String },
    /// A local pointer that was never moved into the combined namespace.
    #[error("definition '{definition}' keeps unresolved local reference '{target}'")]
    UnresolvedLocalReference { definition: String, target: String },
    /// A `oneOf` entry names a missing definition.
    #[error("root oneOf references unknown definition '{0}'")]
    DanglingRootReference(String),
}

/// Validates a combined schema, returning every problem found.
///
/// Non-local references (URLs, relative files) are not checked.
pub fn validate_combined(schema: &CombinedSchema) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let definitions = &schema.definitions;

    for (name, definition) in definitions.iter() {
        if name.trim().is_empty() {
            errors.push(ValidationError::EmptyDefinitionName);
        }

        for target in collect_references(definition) {
            if target.starts_with(DEFINITIONS_PREFIX) {
                if !definitions.contains(&reference_name(target)) {
                    errors.push(ValidationError::DanglingReference {
                        definition: name.to_string(),
                        target: target.to_string(),
                    });
                }
            } else if target.starts_with('#') {
                errors.push(ValidationError::UnresolvedLocalReference {
                    definition: name.to_string(),
                    target: target.to_string(),
                });
            }
        }
    }

    for reference in &schema.one_of {
        let target = reference.name();
        if !definitions.contains(&target) {
            errors.push(ValidationError::DanglingRootReference(target));
        }
    }

    errors
}
