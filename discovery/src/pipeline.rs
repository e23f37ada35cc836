//! End-to-end generation runs.
//!
//! A run extracts the exported models, merges them into one combined schema,
//! applies the optional casing rule, hands the result to a
//! [`TypeGenerator`] and writes the assembled artifact. Nothing is written
//! unless every step succeeds.

use std::path::{Path, PathBuf};

use model_typegen_core::{
    CaseRule, MergeOptions, MergeOutput, dedupe_documents, merge_documents,
    strip_property_titles, transform_definition, transform_namespace, validate_combined,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::assemble::{assemble, write_output};
use crate::config::{GenerationMode, TypegenConfig};
use crate::error::{Result, TypegenError};
use crate::extractor::{ExportedModel, extract_models};
use crate::generator::TypeGenerator;

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// No exported models were found; nothing was written.
    NoSchemas,
    /// The artifact was written.
    Written {
        path: PathBuf,
        /// Exported models that fed the run.
        models: usize,
        /// Generator invocations whose output was assembled.
        parts: usize,
        /// Merge bookkeeping, present in combined mode.
        merge: Option<MergeOutput>,
    },
}

/// Extracts exported models as configured.
pub fn extract(config: &TypegenConfig) -> Result<Vec<ExportedModel>> {
    if config.inputs.is_empty() {
        return Err(TypegenError::InvalidConfig(
            "at least one input path is required".to_string(),
        ));
    }
    Ok(extract_models(
        &config.inputs,
        config.recursive,
        &config.export_selection(),
    )?)
}

/// Merges models into a combined schema and applies the casing rule.
///
/// Reference integrity problems are logged, not fatal: a pointer to a model
/// outside the exported set stays as it was.
pub fn merge_models(
    models: Vec<ExportedModel>,
    options: MergeOptions,
    case: Option<CaseRule>,
) -> Result<MergeOutput> {
    let documents = models.into_iter().map(|model| model.document).collect();
    let mut merged = merge_documents(documents, options)?;

    if let Some(rule) = case {
        transform_namespace(&mut merged.schema.definitions, rule)?;
    }

    for problem in validate_combined(&merged.schema) {
        warn!(%problem, "Combined schema reference problem");
    }

    Ok(merged)
}

/// Runs extraction, merging and generation, then writes the artifact to
/// `output`.
pub fn run(
    config: &TypegenConfig,
    output: &Path,
    generator: &dyn TypeGenerator,
) -> Result<RunOutcome> {
    let models = extract(config)?;
    if models.is_empty() {
        info!("No schemas found");
        return Ok(RunOutcome::NoSchemas);
    }
    let model_count = models.len();
    info!(models = model_count, "Total schemas");

    let (parts, merge) = match config.mode {
        GenerationMode::Combined => {
            let merged = merge_models(models, config.merge_options(), config.case)?;
            let generated = generator.generate(&merged.schema.to_value())?;
            (vec![generated], Some(merged))
        }
        GenerationMode::PerModel => (generate_per_model(models, config, generator)?, None),
    };

    let content = assemble(&parts);
    write_output(output, &content)?;
    info!(path = %output.display(), "Wrote generated types");

    Ok(RunOutcome::Written {
        path: output.to_path_buf(),
        models: model_count,
        parts: parts.len(),
        merge,
    })
}

/// Generates each deduplicated model on its own.
///
/// Every document keeps its own `$defs`, so shared sub-schemas are emitted
/// once per model that embeds them.
pub fn generate_per_model(
    models: Vec<ExportedModel>,
    config: &TypegenConfig,
    generator: &dyn TypeGenerator,
) -> Result<Vec<String>> {
    let documents = models.into_iter().map(|model| model.document).collect();
    let mut parts = Vec::new();

    for (_, mut document) in dedupe_documents(documents) {
        refine_standalone(&mut document, config)?;
        parts.push(generator.generate(&document)?);
    }

    Ok(parts)
}

fn refine_standalone(document: &mut Value, config: &TypegenConfig) -> Result<()> {
    let name = document
        .get(model_typegen_core::TITLE_KEY)
        .and_then(Value::as_str)
        .unwrap_or("<untitled>")
        .to_string();

    if config.strip_property_titles {
        strip_property_titles(document);
    }
    if let Some(rule) = config.case {
        transform_definition(&name, document, rule)?;
    }

    if let Some(defs) = document
        .get_mut(model_typegen_core::DEFS_KEY)
        .and_then(Value::as_object_mut)
    {
        for (def_name, definition) in defs.iter_mut() {
            if config.strip_property_titles {
                strip_property_titles(definition);
            }
            if let Some(rule) = config.case {
                transform_definition(def_name, definition, rule)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;
    use crate::generator::GeneratorError;

    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<Value>>,
    }

    impl TypeGenerator for Recorder {
        fn generate(&self, schema: &Value) -> std::result::Result<String, GeneratorError> {
            self.seen.borrow_mut().push(schema.clone());
            Ok(format!("// part {}\n", self.seen.borrow().len()))
        }
    }

    #[test]
    fn test_refine_standalone_touches_document_and_defs() {
        let mut document = json!({
            "title": "Outer",
            "properties": {"outer_field": {"title": "Outer Field", "$ref": "#/$defs/Inner"}},
            "required": ["outer_field"],
            "$defs": {
                "Inner": {"properties": {"inner_field": {"title": "Inner Field", "type": "string"}}}
            }
        });
        let config = TypegenConfig {
            case: Some(CaseRule::Camel),
            ..TypegenConfig::default()
        };

        refine_standalone(&mut document, &config).unwrap();

        assert_eq!(
            document,
            json!({
                "title": "Outer",
                "properties": {"outerField": {"$ref": "#/$defs/Inner"}},
                "required": ["outerField"],
                "$defs": {"Inner": {"properties": {"innerField": {"type": "string"}}}}
            })
        );
    }

    #[test]
    fn test_per_model_generation_dedupes_documents() {
        let doc = json!({"title": "A"});
        let models = vec![
            ExportedModel {
                name: Some("A".to_string()),
                source: PathBuf::from("a.json"),
                document: doc.clone(),
            },
            ExportedModel {
                name: Some("A".to_string()),
                source: PathBuf::from("b.json"),
                document: doc,
            },
        ];
        let recorder = Recorder::default();

        let parts = generate_per_model(models, &TypegenConfig::default(), &recorder).unwrap();
        assert_eq!(parts, vec!["// part 1\n".to_string()]);
    }

    #[test]
    fn test_extract_requires_inputs() {
        assert!(matches!(
            extract(&TypegenConfig::default()),
            Err(TypegenError::InvalidConfig(_))
        ));
    }
}
