//! Exported model extraction.
//!
//! Picks the schema documents that are exported from everything found on
//! disk. Which documents count as exported is decided by an explicit
//! [`ExportSelection`] passed in by the caller: an `x-export` marker keyword
//! on the document, a list of model titles, or both.
//!
//! # Example
//!
//! ```
//! use model_typegen_discovery::extractor::{ExportSelection, select_models};
//! use model_typegen_discovery::discover::SourcedDocument;
//! use serde_json::json;
//!
//! let documents = vec![
//!     SourcedDocument {
//!         source: "a.json".into(),
//!         document: json!({"title": "A", "x-export": true}),
//!     },
//!     SourcedDocument { source: "a.json".into(), document: json!({"title": "Helper"}) },
//! ];
//! let selection = ExportSelection { require_marker: true, ..ExportSelection::default() };
//!
//! let models = select_models(documents, &selection);
//! assert_eq!(models.len(), 1);
//! assert_eq!(models[0].name.as_deref(), Some("A"));
//! assert!(models[0].document.get("x-export").is_none());
//! ```

use std::path::PathBuf;

use model_typegen_core::TITLE_KEY;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::discover::{DiscoverError, SourcedDocument, collect_schema_paths, load_schema_documents};

/// Keyword marking a document as exported.
pub const EXPORT_MARKER: &str = "x-export";

/// Which discovered documents are exported.
///
/// The default selects every document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSelection {
    /// Only select documents whose title is listed. Empty selects all.
    pub names: Vec<String>,
    /// Only select documents carrying `"x-export": true`.
    pub require_marker: bool,
}

impl ExportSelection {
    /// Returns `true` if the document passes every configured filter.
    pub fn is_selected(&self, document: &Value) -> bool {
        if self.require_marker && document.get(EXPORT_MARKER).and_then(Value::as_bool) != Some(true)
        {
            return false;
        }
        if self.names.is_empty() {
            return true;
        }
        document
            .get(TITLE_KEY)
            .and_then(Value::as_str)
            .is_some_and(|title| self.names.iter().any(|name| name == title))
    }
}

/// One exported model schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedModel {
    /// The document's title, when it has one.
    pub name: Option<String>,
    pub source: PathBuf,
    pub document: Value,
}

/// Discovers schema files under `inputs` and returns the exported models.
pub fn extract_models(
    inputs: &[PathBuf],
    recursive: bool,
    selection: &ExportSelection,
) -> Result<Vec<ExportedModel>, DiscoverError> {
    let paths = collect_schema_paths(inputs, recursive)?;
    debug!(files = paths.len(), "Collected schema files");
    let documents = load_schema_documents(&paths)?;
    let models = select_models(documents, selection);
    info!(models = models.len(), "Extracted exported models");
    Ok(models)
}

/// Filters documents through `selection` and strips the export marker.
pub fn select_models(
    documents: Vec<SourcedDocument>,
    selection: &ExportSelection,
) -> Vec<ExportedModel> {
    let mut models = Vec::new();

    for SourcedDocument {
        source,
        mut document,
    } in documents
    {
        if !selection.is_selected(&document) {
            debug!(source = %source.display(), "Document not exported");
            continue;
        }
        if let Some(object) = document.as_object_mut() {
            object.shift_remove(EXPORT_MARKER);
        }
        let name = document
            .get(TITLE_KEY)
            .and_then(Value::as_str)
            .map(str::to_string);
        models.push(ExportedModel {
            name,
            source,
            document,
        });
    }

    for wanted in &selection.names {
        if !models.iter().any(|model| model.name.as_deref() == Some(wanted)) {
            warn!(name = %wanted, "Export name matched no schema document");
        }
    }

    models
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;

    use super::*;

    fn sourced(document: Value) -> SourcedDocument {
        SourcedDocument {
            source: PathBuf::from("models.json"),
            document,
        }
    }

    #[test]
    fn test_default_selection_exports_everything() {
        let models = select_models(
            vec![sourced(json!({"title": "A"})), sourced(json!({"$defs": {}}))],
            &ExportSelection::default(),
        );
        assert_eq!(models.len(), 2);
        assert_eq!(models[1].name, None);
    }

    #[test]
    fn test_named_selection_filters_by_title() {
        let selection = ExportSelection {
            names: vec!["B".to_string()],
            require_marker: false,
        };
        let models = select_models(
            vec![sourced(json!({"title": "A"})), sourced(json!({"title": "B"}))],
            &selection,
        );
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].name.as_deref(), Some("B"));
    }

    #[test]
    fn test_marker_must_be_literal_true() {
        let selection = ExportSelection {
            names: Vec::new(),
            require_marker: true,
        };
        assert!(selection.is_selected(&json!({"x-export": true})));
        assert!(!selection.is_selected(&json!({"x-export": "yes"})));
        assert!(!selection.is_selected(&json!({"x-export": false})));
        assert!(!selection.is_selected(&json!({})));
    }

    #[test]
    fn test_marker_is_stripped_even_without_marker_filter() {
        let models = select_models(
            vec![sourced(json!({"title": "A", "x-export": true}))],
            &ExportSelection::default(),
        );
        assert_eq!(models[0].document, json!({"title": "A"}));
    }

    #[test]
    fn test_extract_models_reads_directory() {
        let root = tempfile::tempdir().unwrap();
        fs::write(
            root.path().join("models.json"),
            r#"[{"title": "A", "x-export": true}, {"title": "Internal"}]"#,
        )
        .unwrap();

        let selection = ExportSelection {
            names: Vec::new(),
            require_marker: true,
        };
        let models = extract_models(&[root.path().to_path_buf()], false, &selection).unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].source, root.path().join("models.json"));
    }
}
