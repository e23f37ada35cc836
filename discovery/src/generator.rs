//! External schema-to-types generator adapter.
//!
//! [`Json2Ts`] hands a schema document to the `json2ts` executable from the
//! `json-schema-to-typescript` npm package and returns the generated
//! TypeScript. Any other generator can be plugged in through
//! [`TypeGenerator`].
//!
//! # Example
//!
//! ```no_run
//! use model_typegen_discovery::generator::{GeneratorConfig, Json2Ts, TypeGenerator};
//! use serde_json::json;
//!
//! let generator = Json2Ts::new(GeneratorConfig::default());
//! let types = generator.generate(&json!({"title": "A", "type": "object"})).unwrap();
//! println!("{types}");
//! ```

use std::ffi::OsString;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use wait_timeout::ChildExt;

/// Default generator executable.
pub const DEFAULT_EXECUTABLE: &str = "json2ts";
/// npm package providing [`DEFAULT_EXECUTABLE`].
pub const DEFAULT_PACKAGE: &str = "json-schema-to-typescript";

/// Turns one JSON-Schema document into type-definition text.
pub trait TypeGenerator {
    fn generate(&self, schema: &Value) -> Result<String, GeneratorError>;
}

/// Generator invocation failures. All of them abort the run.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// The executable could not be found.
    #[error("{package} is not installed. Please install it using `npm install -g {package}`.")]
    Missing { package: String, executable: String },

    /// The executable ran and exited unsuccessfully.
    #[error("{executable} exited with {}: {}", exit_label(.code), .stderr.trim_end())]
    Failed {
        executable: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The executable outlived the configured timeout and was killed.
    #[error("{executable} did not finish within {timeout_ms} ms")]
    TimedOut { executable: String, timeout_ms: u64 },

    /// Spawning, piping, or the schema handoff file failed.
    #[error("generator I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The schema could not be serialized for the generator.
    #[error("generator JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

/// Settings for the `json2ts` invocation.
///
/// # Examples
///
/// ```
/// use model_typegen_discovery::generator::GeneratorConfig;
///
/// let config = GeneratorConfig::default();
/// assert_eq!(config.executable, "json2ts");
/// assert!(!config.additional_properties);
/// assert!(config.unknown_any);
/// assert_eq!(config.timeout_ms, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Executable name looked up on `PATH`, or a path to it.
    pub executable: String,
    /// Package named in the installation hint.
    pub package: String,
    /// Kill the generator after this many milliseconds. `None` waits forever.
    pub timeout_ms: Option<u64>,
    /// Allow additional properties on generated types.
    pub additional_properties: bool,
    /// Type untyped values as `unknown` instead of `any`.
    pub unknown_any: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            executable: DEFAULT_EXECUTABLE.to_string(),
            package: DEFAULT_PACKAGE.to_string(),
            timeout_ms: None,
            additional_properties: false,
            unknown_any: true,
        }
    }
}

/// `json-schema-to-typescript` adapter.
#[derive(Debug, Clone)]
pub struct Json2Ts {
    config: GeneratorConfig,
}

impl Json2Ts {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Locates the executable on `PATH` (honouring `PATHEXT` on Windows),
    /// or checks it as given when it is a path. Fails with an installation
    /// hint.
    pub fn resolve(&self) -> Result<PathBuf, GeneratorError> {
        which::which(&self.config.executable).map_err(|_| self.missing())
    }

    /// Command-line arguments passed after the input file.
    ///
    /// The banner comment is suppressed; the assembler writes its own.
    pub fn arguments(&self, input: &Path) -> Vec<OsString> {
        vec![
            input.as_os_str().to_os_string(),
            "--bannerComment".into(),
            "".into(),
            "--additionalProperties".into(),
            self.config.additional_properties.to_string().into(),
            "--unknownAny".into(),
            self.config.unknown_any.to_string().into(),
        ]
    }

    fn missing(&self) -> GeneratorError {
        GeneratorError::Missing {
            package: self.config.package.clone(),
            executable: self.config.executable.clone(),
        }
    }
}

impl TypeGenerator for Json2Ts {
    fn generate(&self, schema: &Value) -> Result<String, GeneratorError> {
        let executable = self.resolve()?;

        let mut input = tempfile::Builder::new()
            .prefix("model-typegen-")
            .suffix(".json")
            .tempfile()?;
        serde_json::to_writer(&mut input, schema)?;
        input.flush()?;

        let mut command = Command::new(&executable);
        command
            .args(self.arguments(input.path()))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(executable = %executable.display(), "Running type generator");
        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(self.missing()),
            Err(e) => return Err(e.into()),
        };

        // Drain both pipes while waiting so a chatty generator cannot block
        // on a full pipe buffer.
        let stdout_thread = child.stdout.take().map(drain);
        let stderr_thread = child.stderr.take().map(drain);

        let status = match self.config.timeout_ms {
            Some(timeout_ms) => match child.wait_timeout(Duration::from_millis(timeout_ms))? {
                Some(status) => status,
                None => {
                    debug!(timeout_ms, "Type generator timed out, killing process");
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(GeneratorError::TimedOut {
                        executable: self.config.executable.clone(),
                        timeout_ms,
                    });
                }
            },
            None => child.wait()?,
        };

        let stdout = join_output(stdout_thread)?;
        let stderr = join_output(stderr_thread)?;

        if !status.success() {
            return Err(GeneratorError::Failed {
                executable: self.config.executable.clone(),
                code: status.code(),
                stderr,
            });
        }

        debug!(bytes = stdout.len(), "Type generator finished");
        Ok(stdout)
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn join_output(
    handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
) -> Result<String, GeneratorError> {
    let Some(handle) = handle else {
        return Ok(String::new());
    };
    let buf = handle
        .join()
        .map_err(|_| std::io::Error::other("generator output reader panicked"))??;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
