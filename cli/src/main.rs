use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use model_typegen_core::CaseRule;
use model_typegen_discovery::assemble::write_output;
use model_typegen_discovery::config::{GenerationMode, TypegenConfig};
use model_typegen_discovery::generator::Json2Ts;
use model_typegen_discovery::output::{
    OutputFormat, format_combined, format_report, models_to_table, report_summary,
};
use model_typegen_discovery::pipeline::{RunOutcome, extract, merge_models, run};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// CLI-specific casing enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliCaseRule {
    Camel,
    Pascal,
    Snake,
}

impl From<CliCaseRule> for CaseRule {
    fn from(rule: CliCaseRule) -> Self {
        match rule {
            CliCaseRule::Camel => Self::Camel,
            CliCaseRule::Pascal => Self::Pascal,
            CliCaseRule::Snake => Self::Snake,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "model-typegen")]
#[command(about = "Generate TypeScript types from exported model JSON schemas")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Merge exported schemas and generate one TypeScript file.
    Generate(GenerateArgs),
    /// Merge exported schemas and print the combined schema.
    Merge(MergeArgs),
    /// List the exported models that would be generated.
    List(ListArgs),
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Schema files and/or directories containing .json/.yaml/.yml schemas.
    inputs: Vec<PathBuf>,
    /// Scan input directories recursively.
    #[arg(short, long)]
    recursive: bool,
    /// Export only the model with this title (repeatable).
    #[arg(long = "export", value_name = "NAME")]
    exports: Vec<String>,
    /// Export only documents marked with `"x-export": true`.
    #[arg(long)]
    require_marker: bool,
    /// YAML configuration file; command-line flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ShapeArgs {
    /// Rename properties to camelCase (same as `--case camel`).
    #[arg(long, conflicts_with = "case")]
    camelize: bool,
    /// Property-name casing rule.
    #[arg(long, value_enum)]
    case: Option<CliCaseRule>,
    /// Fail on schema documents that have neither a title nor $defs.
    #[arg(long)]
    strict: bool,
    /// Keep the `title` of each property schema.
    #[arg(long)]
    keep_property_titles: bool,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[command(flatten)]
    source: SourceArgs,
    #[command(flatten)]
    shape: ShapeArgs,
    /// Output TypeScript file path.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Generate each model separately instead of one combined schema.
    #[arg(long)]
    per_model: bool,
    /// Generator executable name or path (default: json2ts).
    #[arg(long, value_name = "PATH")]
    generator: Option<String>,
    /// Kill the generator after this many milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[derive(Debug, Args)]
struct MergeArgs {
    #[command(flatten)]
    source: SourceArgs,
    #[command(flatten)]
    shape: ShapeArgs,
    /// Write the combined schema here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
    /// Also print the merge report to stderr.
    #[arg(long)]
    report: bool,
}

#[derive(Debug, Args)]
struct ListArgs {
    #[command(flatten)]
    source: SourceArgs,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Merge(args) => run_merge(args),
        Command::List(args) => run_list(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_generate(args: GenerateArgs) -> Result<(), String> {
    let mut config = load_config(&args.source)?;
    apply_shape(&mut config, &args.shape);
    if args.per_model {
        config.mode = GenerationMode::PerModel;
    }
    if let Some(executable) = args.generator {
        config.generator.executable = executable;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.generator.timeout_ms = Some(timeout_ms);
    }

    let output = args
        .output
        .or_else(|| config.output.clone())
        .ok_or_else(|| "--output is required (or set `output` in the config file)".to_string())?;

    let generator = Json2Ts::new(config.generator.clone());
    match run(&config, &output, &generator).map_err(|e| e.to_string())? {
        RunOutcome::NoSchemas => println!("No schemas found"),
        RunOutcome::Written {
            path,
            models,
            parts,
            merge,
        } => {
            if let Some(merge) = merge {
                println!("{}", report_summary(&merge.report));
            }
            println!(
                "Generated types for {models} model(s) with {parts} generator run(s) into '{}'.",
                path.display()
            );
        }
    }

    Ok(())
}

fn run_merge(args: MergeArgs) -> Result<(), String> {
    let mut config = load_config(&args.source)?;
    apply_shape(&mut config, &args.shape);

    let models = extract(&config).map_err(|e| e.to_string())?;
    if models.is_empty() {
        println!("No schemas found");
        return Ok(());
    }

    let merged = merge_models(models, config.merge_options(), config.case)
        .map_err(|e| e.to_string())?;
    let raw = format_combined(&merged.schema, args.format)?;

    match args.output {
        Some(path) => {
            write_output(&path, &raw)
                .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
            eprintln!(
                "Wrote combined schema with {} definition(s) to '{}'.",
                merged.schema.definitions.len(),
                path.display()
            );
        }
        None => println!("{raw}"),
    }

    if args.report {
        eprintln!("{}", format_report(&merged.report, args.format)?);
    }

    Ok(())
}

fn run_list(args: ListArgs) -> Result<(), String> {
    let config = load_config(&args.source)?;
    let models = extract(&config).map_err(|e| e.to_string())?;
    if models.is_empty() {
        println!("No schemas found");
        return Ok(());
    }
    print!("{}", models_to_table(&models));
    Ok(())
}

fn load_config(source: &SourceArgs) -> Result<TypegenConfig, String> {
    let mut config = match &source.config {
        Some(path) => TypegenConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
        None => TypegenConfig::default(),
    };

    if !source.inputs.is_empty() {
        config.inputs = source.inputs.clone();
    }
    if config.inputs.is_empty() {
        return Err(
            "Specify at least one input path or set `inputs` in the config file".to_string(),
        );
    }
    if source.recursive {
        config.recursive = true;
    }
    if !source.exports.is_empty() {
        config.exports = source.exports.clone();
    }
    if source.require_marker {
        config.require_marker = true;
    }

    debug!(?config, "resolved configuration");
    Ok(config)
}

fn apply_shape(config: &mut TypegenConfig, shape: &ShapeArgs) {
    if shape.camelize {
        config.case = Some(CaseRule::Camel);
    } else if let Some(rule) = shape.case {
        config.case = Some(rule.into());
    }
    if shape.strict {
        config.strict = true;
    }
    if shape.keep_property_titles {
        config.strip_property_titles = false;
    }
}
