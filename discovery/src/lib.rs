//! Schema discovery, type generation and output assembly.
//!
//! This crate provides the adapters around the merge core in
//! `model-typegen-core`:
//!
//! - [`discover`] — find `.json`/`.yaml`/`.yml` schema files and load them.
//! - [`extractor`] — select exported models via an explicit
//!   [`ExportSelection`](extractor::ExportSelection).
//! - [`generator`] — run an external schema-to-types generator
//!   ([`Json2Ts`](generator::Json2Ts) by default).
//! - [`assemble`] — banner plus generated text, written atomically.
//! - [`pipeline`] — the whole run, from input paths to the written file.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use model_typegen_discovery::config::TypegenConfig;
//! use model_typegen_discovery::generator::Json2Ts;
//! use model_typegen_discovery::pipeline::{RunOutcome, run};
//!
//! let config = TypegenConfig {
//!     inputs: vec!["models".into()],
//!     recursive: true,
//!     ..TypegenConfig::default()
//! };
//! let generator = Json2Ts::new(config.generator.clone());
//! match run(&config, Path::new("web/src/types.ts"), &generator).unwrap() {
//!     RunOutcome::NoSchemas => println!("No schemas found"),
//!     RunOutcome::Written { path, .. } => println!("wrote {}", path.display()),
//! }
//! ```

pub mod assemble;
pub mod config;
pub mod discover;
mod error;
pub mod extractor;
pub mod generator;
pub mod output;
pub mod pipeline;

pub use error::{Result, TypegenError};
