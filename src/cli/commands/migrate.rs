//! Migrate command implementation.
//!
//! Reads a safelist export (stdin or `--input`), adds `hash_key` where it
//! is missing and writes the result (stdout, `--output`, or
//! `<input>-hashed.json`). Safe to run again on its own output.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::MigrateArgs;
use crate::error::Result;
use crate::migrate::{HashScheme, MigrateOptions, migrate_document};

/// Execute the migrate command.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed, or if any entry
/// is rejected. Nothing is written in that case.
pub fn execute(args: &MigrateArgs, json: bool, quiet: bool) -> Result<()> {
    let input = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let options = MigrateOptions {
        strict: args.strict,
        scheme: if args.content_hash {
            HashScheme::Content
        } else {
            HashScheme::Sentinel
        },
    };

    let document = serde_json::from_str(&input)?;
    let migrated = migrate_document(document, &options)?;
    let count = migrated.as_array().map_or(0, Vec::len);
    let payload = serde_json::to_string(&migrated)?;

    let output = args
        .output
        .clone()
        .or_else(|| args.input.as_deref().map(default_output_path));

    let Some(path) = output else {
        println!("{payload}");
        return Ok(());
    };

    fs::write(&path, payload)?;
    debug!(path = %path.display(), count, "Wrote migrated safelist");

    if json {
        let output = serde_json::json!({
            "output": path.display().to_string(),
            "entries": count,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else if !quiet {
        println!("Wrote {count} entries to {}", path.display());
    }

    Ok(())
}

/// `dir/safelist.json` → `dir/safelist-hashed.json`
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "safelist".into(), |s| s.to_string_lossy());
    input.with_file_name(format!("{stem}-hashed.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::TempDir;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/data/whitelist.json")),
            PathBuf::from("/data/whitelist-hashed.json")
        );
        assert_eq!(
            default_output_path(Path::new("export")),
            PathBuf::from("export-hashed.json")
        );
    }

    #[test]
    fn test_migrate_file_to_default_output() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("whitelist.json");
        fs::write(&input, r#"[{"type":"ip","comment":"dns"}]"#).unwrap();

        let args = MigrateArgs {
            input: Some(input),
            ..MigrateArgs::default()
        };
        execute(&args, false, true).unwrap();

        let written = fs::read_to_string(temp_dir.path().join("whitelist-hashed.json")).unwrap();
        let value: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value[0]["hash_key"], -99999);
    }

    #[test]
    fn test_rejected_input_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("whitelist.json");
        let output = temp_dir.path().join("out.json");
        fs::write(&input, r#"[{"type":"hostname"}]"#).unwrap();

        let args = MigrateArgs {
            input: Some(input),
            output: Some(output.clone()),
            ..MigrateArgs::default()
        };
        let err = execute(&args, false, true).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(!output.exists());
    }
}
