//! Merging independently derived schema documents into one namespace.
//!
//! Every exported model arrives as its own JSON-Schema document with its own
//! `$defs` and `#/$defs/...` pointers. [`merge_documents`] flattens them into
//! a single [`CombinedSchema`]:
//!
//! 1. structurally identical documents are deduplicated;
//! 2. titled documents become *parent* definitions under their title;
//! 3. `$defs` entries become *child* definitions, unless a parent already
//!    owns the name;
//! 4. every reference to a known definition is rewritten to
//!    `#/definitions/<name>`;
//! 5. the root lists every definition in `oneOf`.
//!
//! # Example
//!
//! ```
//! use model_typegen_core::*;
//! use serde_json::json;
//!
//! let docs = vec![
//!     json!({"title": "A", "properties": {"x": {"type": "string"}}}),
//!     json!({
//!         "title": "B",
//!         "properties": {"a": {"$ref": "#/$defs/Inner"}},
//!         "$defs": {"Inner": {"type": "integer"}}
//!     }),
//! ];
//!
//! let merged = merge_documents(docs, MergeOptions::default()).unwrap();
//! let names: Vec<_> = merged.schema.definitions.names().collect();
//! assert_eq!(names, vec!["A", "B", "Inner"]);
//! assert_eq!(
//!     merged.schema.definitions.get("B").unwrap()["properties"]["a"]["$ref"],
//!     "#/definitions/Inner"
//! );
//! ```

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::reference::rewrite_known_references;
use crate::types::{CombinedSchema, DEFS_KEY, Namespace, PROPERTIES_KEY, TITLE_KEY};

/// Knobs controlling [`merge_documents`].
///
/// # Examples
///
/// ```
/// use model_typegen_core::MergeOptions;
///
/// let options = MergeOptions::default();
/// assert!(options.strip_property_titles);
/// assert!(!options.strict);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    /// Drop the `title` keyword from every property schema. Modeling
    /// libraries title each property, and generic generators turn those
    /// titles into extra named types.
    pub strip_property_titles: bool,
    /// Reject documents that carry neither a `title` nor `$defs` instead of
    /// skipping them.
    pub strict: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            strip_property_titles: true,
            strict: false,
        }
    }
}

/// Structural problems that stop a merge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// Input is a scalar or array rather than an object.
    #[error("schema document #{index} is not a JSON object")]
    NotAnObject { index: usize },
    /// `title` is present but not a string.
    #[error("schema document #{index} has a non-string title")]
    InvalidTitle { index: usize },
    /// `$defs` is present but not an object.
    #[error("schema document #{index} has a $defs value that is not an object")]
    InvalidDefinitions { index: usize },
    /// Strict mode only: the document would contribute nothing.
    #[error("schema document #{index} has neither a title nor $defs")]
    UntitledDocument { index: usize },
}

/// Bookkeeping of one merge, for logging and `--report` style output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Documents handed to the merger.
    pub input_documents: usize,
    /// Documents dropped as structural duplicates.
    pub duplicates_removed: usize,
    /// Parent definition names, input order.
    pub parents: Vec<String>,
    /// Child definition names, input order.
    pub children: Vec<String>,
    /// Child names dropped because a parent owns the name.
    pub shadowed: Vec<String>,
    /// Names whose definition was replaced by different content.
    pub overwritten: Vec<String>,
    /// Input indices of documents that contributed nothing.
    pub skipped: Vec<usize>,
    /// Number of `$ref` values pointed into the combined namespace.
    pub references_rewritten: usize,
}

/// Result of [`merge_documents`].
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutput {
    pub schema: CombinedSchema,
    pub report: MergeReport,
}

/// Merges schema documents into one [`CombinedSchema`].
///
/// # Errors
///
/// Returns a [`MergeError`] when a document is not an object, carries a
/// malformed `title` or `$defs`, or (in strict mode) carries neither.
pub fn merge_documents(
    documents: Vec<Value>,
    options: MergeOptions,
) -> Result<MergeOutput, MergeError> {
    let mut report = MergeReport {
        input_documents: documents.len(),
        ..MergeReport::default()
    };

    let mut unique = dedupe_documents(documents);
    report.duplicates_removed = report.input_documents - unique.len();

    let mut parent_names: HashSet<String> = HashSet::new();
    for (index, document) in &unique {
        let Some(object) = document.as_object() else {
            return Err(MergeError::NotAnObject { index: *index });
        };
        match object.get(TITLE_KEY) {
            Some(Value::String(title)) => {
                parent_names.insert(title.clone());
            }
            Some(_) => return Err(MergeError::InvalidTitle { index: *index }),
            None => {}
        }
    }

    let mut children: Vec<(String, Value)> = Vec::new();
    for (index, document) in &mut unique {
        let Some(object) = document.as_object_mut() else {
            continue;
        };
        let has_title = object.contains_key(TITLE_KEY);
        match object.shift_remove(DEFS_KEY) {
            Some(Value::Object(defs)) => {
                for (name, definition) in defs {
                    if parent_names.contains(&name) {
                        debug!(name = %name, "Child definition shadowed by parent model");
                        push_unique(&mut report.shadowed, &name);
                        continue;
                    }
                    children.push((name, definition));
                }
            }
            Some(_) => return Err(MergeError::InvalidDefinitions { index: *index }),
            None if !has_title => {
                if options.strict {
                    return Err(MergeError::UntitledDocument { index: *index });
                }
                warn!(
                    index = *index,
                    "Schema document has neither a title nor $defs, skipping"
                );
                report.skipped.push(*index);
            }
            None => {}
        }
    }

    let mut namespace = Namespace::new();
    for (_, document) in unique {
        let Some(title) = document
            .get(TITLE_KEY)
            .and_then(Value::as_str)
            .map(str::to_string)
        else {
            continue;
        };
        register(&mut namespace, &mut report, &title, document);
        push_unique(&mut report.parents, &title);
    }
    for (name, definition) in children {
        register(&mut namespace, &mut report, &name, definition);
        push_unique(&mut report.children, &name);
    }

    let known: HashSet<String> = namespace.names().map(str::to_string).collect();
    for (name, definition) in namespace.iter_mut() {
        if options.strip_property_titles {
            strip_property_titles(definition);
        }
        let rewritten = rewrite_known_references(definition, &known);
        if rewritten > 0 {
            debug!(definition = name, rewritten, "Rewrote references");
        }
        report.references_rewritten += rewritten;
    }

    info!(
        documents = report.input_documents,
        duplicates = report.duplicates_removed,
        definitions = namespace.len(),
        "Merged schema documents"
    );

    Ok(MergeOutput {
        schema: CombinedSchema::new(namespace),
        report,
    })
}

/// Drops structurally identical documents, keeping the first occurrence.
///
/// Each survivor is paired with its index in the input.
///
/// # Examples
///
/// ```
/// use model_typegen_core::dedupe_documents;
/// use serde_json::json;
///
/// let docs = vec![json!({"title": "A"}), json!({"title": "B"}), json!({"title": "A"})];
/// let unique = dedupe_documents(docs);
/// assert_eq!(unique.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![0, 1]);
/// ```
pub fn dedupe_documents(documents: Vec<Value>) -> Vec<(usize, Value)> {
    let mut unique: Vec<(usize, Value)> = Vec::with_capacity(documents.len());
    for (index, document) in documents.into_iter().enumerate() {
        if unique.iter().any(|(_, kept)| *kept == document) {
            debug!(index, "Dropping duplicate schema document");
            continue;
        }
        unique.push((index, document));
    }
    unique
}

/// Removes `title` from each entry of the definition's `properties`.
pub fn strip_property_titles(definition: &mut Value) {
    let Some(properties) = definition
        .get_mut(PROPERTIES_KEY)
        .and_then(Value::as_object_mut)
    else {
        return;
    };
    for property in properties.values_mut() {
        if let Some(property) = property.as_object_mut() {
            property.shift_remove(TITLE_KEY);
        }
    }
}

fn register(namespace: &mut Namespace, report: &mut MergeReport, name: &str, definition: Value) {
    if let Some(existing) = namespace.get(name) {
        if *existing != definition {
            warn!(name, "Definition name collision, last definition wins");
            push_unique(&mut report.overwritten, name);
        }
    }
    namespace.insert(name, definition);
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|existing| existing == name) {
        names.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::reference::collect_references;
    use crate::types::DEFINITIONS_PREFIX;

    use super::*;

    fn scenario_documents() -> Vec<Value> {
        vec![
            json!({"title": "A", "properties": {"x": {"type": "string"}}}),
            json!({
                "title": "B",
                "properties": {"a": {"$ref": "#/$defs/Inner"}},
                "$defs": {"Inner": {"type": "integer"}}
            }),
        ]
    }

    #[test]
    fn test_merge_flattens_children_and_rewrites_references() {
        let merged = merge_documents(scenario_documents(), MergeOptions::default()).unwrap();
        let schema = merged.schema.to_value();

        assert_eq!(
            schema["definitions"],
            json!({
                "A": {"title": "A", "properties": {"x": {"type": "string"}}},
                "B": {"title": "B", "properties": {"a": {"$ref": "#/definitions/Inner"}}},
                "Inner": {"type": "integer"}
            })
        );
        assert_eq!(
            schema["oneOf"],
            json!([
                {"$ref": "#/definitions/A"},
                {"$ref": "#/definitions/B"},
                {"$ref": "#/definitions/Inner"}
            ])
        );
        assert_eq!(merged.report.parents, vec!["A", "B"]);
        assert_eq!(merged.report.children, vec!["Inner"]);
        assert_eq!(merged.report.references_rewritten, 1);
    }

    #[test]
    fn test_merge_is_idempotent_byte_for_byte() {
        let first = merge_documents(scenario_documents(), MergeOptions::default()).unwrap();
        let second = merge_documents(scenario_documents(), MergeOptions::default()).unwrap();
        assert_eq!(
            serde_json::to_string(&first.schema.to_value()).unwrap(),
            serde_json::to_string(&second.schema.to_value()).unwrap()
        );
    }

    #[test]
    fn test_merge_deduplicates_identical_documents() {
        let doc = json!({"title": "Shared", "properties": {"id": {"type": "integer"}}});
        let merged =
            merge_documents(vec![doc.clone(), doc.clone(), doc], MergeOptions::default())
                .unwrap();

        assert_eq!(merged.schema.definitions.len(), 1);
        assert_eq!(merged.schema.one_of.len(), 1);
        assert_eq!(merged.report.duplicates_removed, 2);
        assert!(merged.report.overwritten.is_empty());
    }

    #[test]
    fn test_parent_takes_precedence_over_same_named_child() {
        let parent = json!({"title": "Foo", "properties": {"real": {"type": "string"}}});
        let other = json!({
            "title": "Bar",
            "properties": {"foo": {"$ref": "#/$defs/Foo"}},
            "$defs": {"Foo": {"title": "Foo", "properties": {"stale": {"type": "string"}}}}
        });

        let merged = merge_documents(vec![other, parent.clone()], MergeOptions::default())
            .unwrap();
        let definitions = &merged.schema.definitions;

        assert_eq!(definitions.get("Foo"), Some(&parent));
        assert_eq!(merged.report.shadowed, vec!["Foo"]);
        assert_eq!(
            definitions.get("Bar").unwrap()["properties"]["foo"]["$ref"],
            "#/definitions/Foo"
        );
        assert_eq!(definitions.names().collect::<Vec<_>>(), vec!["Bar", "Foo"]);
    }

    #[test]
    fn test_shared_children_collapse_without_overwrite_warning() {
        let option = json!({"enum": ["A", "B"], "type": "string"});
        let first = json!({
            "title": "First",
            "properties": {"o": {"$ref": "#/$defs/Option"}},
            "$defs": {"Option": option.clone()}
        });
        let second = json!({
            "title": "Second",
            "properties": {"o": {"$ref": "#/$defs/Option"}},
            "$defs": {"Option": option}
        });

        let merged = merge_documents(vec![first, second], MergeOptions::default()).unwrap();
        assert_eq!(
            merged.schema.definitions.names().collect::<Vec<_>>(),
            vec!["First", "Second", "Option"]
        );
        assert!(merged.report.overwritten.is_empty());
        assert_eq!(merged.report.children, vec!["Option"]);
    }

    #[test]
    fn test_conflicting_children_last_write_wins() {
        let first = json!({"$defs": {"Thing": {"type": "string"}}});
        let second = json!({"$defs": {"Thing": {"type": "integer"}}});

        let merged = merge_documents(vec![first, second], MergeOptions::default()).unwrap();
        assert_eq!(
            merged.schema.definitions.get("Thing"),
            Some(&json!({"type": "integer"}))
        );
        assert_eq!(merged.report.overwritten, vec!["Thing"]);
    }

    #[test]
    fn test_document_without_title_or_defs_is_skipped() {
        let docs = vec![json!({"type": "object"}), json!({"title": "Kept"})];
        let merged = merge_documents(docs, MergeOptions::default()).unwrap();

        assert_eq!(merged.report.skipped, vec![0]);
        assert_eq!(merged.schema.definitions.names().collect::<Vec<_>>(), vec!["Kept"]);
    }

    #[test]
    fn test_strict_mode_rejects_untitled_document() {
        let options = MergeOptions {
            strict: true,
            ..MergeOptions::default()
        };
        let err = merge_documents(vec![json!({"type": "object"})], options).unwrap_err();
        assert_eq!(err, MergeError::UntitledDocument { index: 0 });
    }

    #[test]
    fn test_malformed_documents_are_rejected() {
        assert_eq!(
            merge_documents(vec![json!([1, 2])], MergeOptions::default()).unwrap_err(),
            MergeError::NotAnObject { index: 0 }
        );
        assert_eq!(
            merge_documents(vec![json!({"title": 3})], MergeOptions::default()).unwrap_err(),
            MergeError::InvalidTitle { index: 0 }
        );
        assert_eq!(
            merge_documents(
                vec![json!({"title": "A", "$defs": []})],
                MergeOptions::default()
            )
            .unwrap_err(),
            MergeError::InvalidDefinitions { index: 0 }
        );
    }

    #[test]
    fn test_property_titles_are_stripped_unless_disabled() {
        let doc = json!({
            "title": "User",
            "properties": {"user_name": {"title": "User Name", "type": "string"}}
        });

        let stripped = merge_documents(vec![doc.clone()], MergeOptions::default()).unwrap();
        assert_eq!(
            stripped.schema.definitions.get("User").unwrap()["properties"]["user_name"],
            json!({"type": "string"})
        );
        assert_eq!(stripped.schema.definitions.get("User").unwrap()["title"], "User");

        let options = MergeOptions {
            strip_property_titles: false,
            ..MergeOptions::default()
        };
        let kept = merge_documents(vec![doc], options).unwrap();
        assert_eq!(
            kept.schema.definitions.get("User").unwrap()["properties"]["user_name"]["title"],
            "User Name"
        );
    }

    #[test]
    fn test_every_rewritten_reference_resolves() {
        let docs = vec![
            json!({
                "title": "Tree",
                "properties": {
                    "children": {"type": "array", "items": {"$ref": "#/$defs/Tree"}},
                    "leaf": {"anyOf": [{"$ref": "#/$defs/Leaf"}, {"type": "null"}]}
                },
                "$defs": {
                    "Leaf": {"properties": {"tag": {"$ref": "#/$defs/Tag"}}},
                    "Tag": {"enum": ["x", "y"]}
                }
            }),
        ];

        let merged = merge_documents(docs, MergeOptions::default()).unwrap();
        for (_, definition) in merged.schema.definitions.iter() {
            for target in collect_references(definition) {
                let name = target.strip_prefix(DEFINITIONS_PREFIX).unwrap();
                assert!(merged.schema.definitions.contains(name), "dangling {target}");
            }
        }
    }

    #[test]
    fn test_empty_input_produces_empty_namespace() {
        let merged = merge_documents(Vec::new(), MergeOptions::default()).unwrap();
        assert!(merged.schema.definitions.is_empty());
        assert!(merged.schema.one_of.is_empty());
    }
}
