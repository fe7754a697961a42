use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

pub fn ensure_output_not_same(output: &Path, input: &Path) -> Result<()> {
    let out_norm = normalize_for_compare(output)
        .with_context(|| format!("failed to normalize output path {}", output.display()))?;
    let in_norm = normalize_for_compare(input)
        .with_context(|| format!("failed to normalize input path {}", input.display()))?;
    if out_norm == in_norm {
        bail!(
            "refusing to overwrite source file: output {} matches input {}",
            output.display(),
            input.display()
        );
    }
    Ok(())
}

/// Sibling `<stem>_cradlepoint.json` of the input file.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "config".to_string());
    input.with_file_name(format!("{stem}_cradlepoint.json"))
}

fn normalize_for_compare(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return path
            .canonicalize()
            .with_context(|| format!("canonicalize {}", path.display()));
    }

    // Outputs that do not exist yet cannot be canonicalized; `..` is left as is.
    let base = if path.is_absolute() {
        PathBuf::new()
    } else {
        std::env::current_dir().context("current_dir")?
    };
    Ok(base.join(path))
}
