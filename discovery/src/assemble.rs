//! Output artifact assembly.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tracing::debug;

/// Banner placed at the top of every generated file.
pub const BANNER: [&str; 2] = [
    "// This file is auto-generated by model-typegen",
    "// Do not modify this file manually",
];

/// Joins the banner and every generated part with newlines.
///
/// # Examples
///
/// ```
/// use model_typegen_discovery::assemble::assemble;
///
/// let out = assemble(&["export type A = string;\n".to_string()]);
/// assert!(out.starts_with("// This file is auto-generated by model-typegen\n"));
/// assert!(out.ends_with("export type A = string;\n"));
/// ```
pub fn assemble(parts: &[String]) -> String {
    BANNER
        .iter()
        .map(|line| line.to_string())
        .chain(parts.iter().cloned())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Writes `content` to `path`, replacing any existing file.
///
/// Content goes to a temporary file next to `path` first and is renamed into
/// place, so a failed write never leaves a truncated artifact behind.
pub fn write_output(path: &Path, content: &str) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut staged = tempfile::NamedTempFile::new_in(parent)?;
    staged.write_all(content.as_bytes())?;
    staged.flush()?;
    staged.persist(path).map_err(|err| err.error)?;

    debug!(path = %path.display(), bytes = content.len(), "Wrote output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_puts_banner_before_parts() {
        let out = assemble(&["a".to_string(), "b".to_string()]);
        assert_eq!(
            out,
            "// This file is auto-generated by model-typegen\n\
             // Do not modify this file manually\n\
             a\nb"
        );
    }

    #[test]
    fn test_write_output_creates_parents_and_overwrites() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("web").join("types.ts");

        write_output(&path, "first").unwrap();
        write_output(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .collect();
        assert_eq!(leftovers.len(), 1);
    }
}
