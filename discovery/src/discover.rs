//! Schema file discovery and loading.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

/// File extensions recognized as schema documents.
pub const SCHEMA_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// Typed error for schema discovery file operations.
#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    /// Filesystem I/O failure.
    #[error("IO error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing failure.
    #[error("JSON error in '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// YAML parsing failure.
    #[error("YAML error in '{path}': {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Invalid or missing input (e.g. non-existent path, wrong extension).
    #[error("{0}")]
    InvalidInput(String),
}

/// A schema document together with the file it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedDocument {
    pub source: PathBuf,
    pub document: Value,
}

/// Collects schema file paths from input files and/or directories.
///
/// Directories are scanned for [`SCHEMA_EXTENSIONS`]; subdirectories are
/// only entered when `recursive` is set. Explicit files must carry one of
/// those extensions. The result is sorted and free of duplicates, and may be
/// empty when the directories hold no schema files.
pub fn collect_schema_paths(
    inputs: &[PathBuf],
    recursive: bool,
) -> Result<Vec<PathBuf>, DiscoverError> {
    if inputs.is_empty() {
        return Err(DiscoverError::InvalidInput(
            "No input paths were provided".to_string(),
        ));
    }

    let mut paths = BTreeSet::new();

    for input in inputs {
        if input.is_dir() {
            collect_dir(input, recursive, &mut paths)?;
            continue;
        }

        if input.is_file() {
            if !has_schema_extension(input) {
                return Err(DiscoverError::InvalidInput(format!(
                    "Schema file '{}' must end in .json, .yaml or .yml",
                    input.display()
                )));
            }
            paths.insert(input.clone());
            continue;
        }

        return Err(DiscoverError::InvalidInput(format!(
            "Schema path '{}' does not exist",
            input.display(),
        )));
    }

    Ok(paths.into_iter().collect())
}

fn collect_dir(
    dir: &Path,
    recursive: bool,
    paths: &mut BTreeSet<PathBuf>,
) -> Result<(), DiscoverError> {
    let entries = fs::read_dir(dir).map_err(|source| DiscoverError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| DiscoverError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                collect_dir(&path, recursive, paths)?;
            }
            continue;
        }
        if has_schema_extension(&path) {
            paths.insert(path);
        }
    }

    Ok(())
}

fn has_schema_extension(path: &Path) -> bool {
    SCHEMA_EXTENSIONS
        .iter()
        .any(|ext| path.extension() == Some(OsStr::new(ext)))
}

/// Parses one schema file.
///
/// A file holds either a single document object or an array of document
/// objects. YAML files are parsed into the same JSON tree.
pub fn load_schema_file(path: &Path) -> Result<Vec<Value>, DiscoverError> {
    let raw = fs::read_to_string(path).map_err(|source| DiscoverError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_yaml = matches!(
        path.extension().and_then(OsStr::to_str),
        Some("yaml" | "yml")
    );
    let value: Value = if is_yaml {
        serde_yaml::from_str(&raw).map_err(|source| DiscoverError::Yaml {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        serde_json::from_str(&raw).map_err(|source| DiscoverError::Json {
            path: path.to_path_buf(),
            source,
        })?
    };

    let documents = match value {
        Value::Array(items) => items,
        other => vec![other],
    };

    if let Some(position) = documents.iter().position(|doc| !doc.is_object()) {
        return Err(DiscoverError::InvalidInput(format!(
            "Schema file '{}' entry #{position} is not a JSON object",
            path.display()
        )));
    }

    debug!(path = %path.display(), documents = documents.len(), "Loaded schema file");
    Ok(documents)
}

/// Loads every document from every path, in path order.
pub fn load_schema_documents(paths: &[PathBuf]) -> Result<Vec<SourcedDocument>, DiscoverError> {
    let mut documents = Vec::with_capacity(paths.len());

    for path in paths {
        for document in load_schema_file(path)? {
            documents.push(SourcedDocument {
                source: path.clone(),
                document,
            });
        }
    }

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_collect_schema_paths_filters_extensions_and_respects_recursion() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("nested");
        fs::create_dir_all(&nested).unwrap();

        let json_path = root.path().join("a.json");
        let yaml_path = root.path().join("b.yaml");
        let nested_path = nested.join("c.yml");
        fs::write(&json_path, "{}").unwrap();
        fs::write(&yaml_path, "{}").unwrap();
        fs::write(&nested_path, "{}").unwrap();
        fs::write(root.path().join("notes.txt"), "ignore").unwrap();

        let shallow = collect_schema_paths(&[root.path().to_path_buf()], false).unwrap();
        assert_eq!(shallow, vec![json_path.clone(), yaml_path.clone()]);

        let deep = collect_schema_paths(&[root.path().to_path_buf()], true).unwrap();
        assert_eq!(deep, vec![json_path, yaml_path, nested_path]);
    }

    #[test]
    fn test_collect_schema_paths_rejects_missing_and_wrong_extension() {
        let root = tempfile::tempdir().unwrap();
        let txt = root.path().join("model.txt");
        fs::write(&txt, "{}").unwrap();

        assert!(matches!(
            collect_schema_paths(&[txt], false),
            Err(DiscoverError::InvalidInput(_))
        ));
        assert!(matches!(
            collect_schema_paths(&[root.path().join("missing.json")], false),
            Err(DiscoverError::InvalidInput(_))
        ));
        assert!(collect_schema_paths(&[], false).is_err());
    }

    #[test]
    fn test_collect_schema_paths_dedupes_repeated_inputs() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("a.json");
        fs::write(&file, "{}").unwrap();

        let paths =
            collect_schema_paths(&[file.clone(), root.path().to_path_buf()], false).unwrap();
        assert_eq!(paths, vec![file]);
    }

    #[test]
    fn test_load_schema_file_accepts_arrays_and_yaml() {
        let root = tempfile::tempdir().unwrap();
        let array = root.path().join("many.json");
        fs::write(&array, r#"[{"title": "A"}, {"title": "B"}]"#).unwrap();
        let yaml = root.path().join("one.yaml");
        fs::write(&yaml, "title: C\nproperties:\n  x:\n    type: string\n").unwrap();

        assert_eq!(
            load_schema_file(&array).unwrap(),
            vec![json!({"title": "A"}), json!({"title": "B"})]
        );
        assert_eq!(
            load_schema_file(&yaml).unwrap(),
            vec![json!({"title": "C", "properties": {"x": {"type": "string"}}})]
        );
    }

    #[test]
    fn test_load_schema_file_rejects_scalars_and_bad_json() {
        let root = tempfile::tempdir().unwrap();
        let scalar = root.path().join("scalar.json");
        fs::write(&scalar, "[{}, 3]").unwrap();
        let broken = root.path().join("broken.json");
        fs::write(&broken, "{").unwrap();

        assert!(matches!(
            load_schema_file(&scalar),
            Err(DiscoverError::InvalidInput(_))
        ));
        assert!(matches!(
            load_schema_file(&broken),
            Err(DiscoverError::Json { .. })
        ));
    }
}
