//! Output formatting for combined schemas, merge reports and model lists.

use model_typegen_core::{CombinedSchema, MergeReport};

use crate::extractor::ExportedModel;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Formats a combined schema in the requested output format.
pub fn format_combined(schema: &CombinedSchema, format: OutputFormat) -> Result<String, String> {
    let value = schema.to_value();
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&value)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(&value).map_err(|e| format!("YAML serialization failed: {e}"))
        }
    }
}

/// Formats a merge report in the requested output format.
pub fn format_report(report: &MergeReport, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(report).map_err(|e| format!("YAML serialization failed: {e}"))
        }
    }
}

/// Renders exported models as an aligned two-column table.
pub fn models_to_table(models: &[ExportedModel]) -> String {
    let names: Vec<&str> = models
        .iter()
        .map(|model| model.name.as_deref().unwrap_or("<untitled>"))
        .collect();
    let width = names
        .iter()
        .map(|name| name.len())
        .chain(std::iter::once("MODEL".len()))
        .max()
        .unwrap_or_default();

    let mut out = format!("{:<width$}  SOURCE\n", "MODEL");
    for (name, model) in names.iter().zip(models) {
        out.push_str(&format!("{name:<width$}  {}\n", model.source.display()));
    }
    out
}

/// One-line human summary of a merge report.
pub fn report_summary(report: &MergeReport) -> String {
    let mut summary = format!(
        "{} document(s), {} duplicate(s) removed, {} parent and {} child definition(s)",
        report.input_documents,
        report.duplicates_removed,
        report.parents.len(),
        report.children.len(),
    );
    if !report.shadowed.is_empty() {
        summary.push_str(&format!(", shadowed: {}", report.shadowed.join(", ")));
    }
    if !report.overwritten.is_empty() {
        summary.push_str(&format!(", overwritten: {}", report.overwritten.join(", ")));
    }
    if !report.skipped.is_empty() {
        summary.push_str(&format!(", {} skipped", report.skipped.len()));
    }
    summary
}
