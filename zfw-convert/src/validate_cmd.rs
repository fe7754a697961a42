use std::fs;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use zfw_convert::report::render_validation;
use zfw_convert::validate::validate;

use crate::cli::{OutputFormat, ValidateArgs};

pub fn run_validate(args: ValidateArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.document)
        .with_context(|| format!("failed to read {}", args.document.display()))?;
    let document: Value = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse JSON {}", args.document.display()))?;
    let issues = validate(&document);

    match args.format {
        OutputFormat::Text => println!("{}", render_validation(&issues)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&issues)?),
    }

    if !issues.is_empty() {
        bail!("validate failed: {} issues", issues.len());
    }
    Ok(())
}
