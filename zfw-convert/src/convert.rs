//! `convert` subcommand.

use std::fs;

use anyhow::{bail, Context, Result};
use zfw_convert::conversion_summary::render as render_conversion_summary;
use zfw_convert::engine::{convert_file, ConvertOptions};
use zfw_convert::ids::IdMode;
use zfw_convert::report::{render_diagnostics, render_validation};

use crate::cli::ConvertArgs;
use crate::path_guard::{default_output_path, ensure_output_not_same};

pub fn run_convert(args: ConvertArgs) -> Result<()> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    ensure_output_not_same(&output, &args.input)?;

    let options = ConvertOptions {
        add_internet_zone: args.add_internet_zone,
        internet_zone_name: args.internet_zone_name,
        id_mode: if args.deterministic_ids {
            IdMode::Deterministic
        } else {
            IdMode::Random
        },
        ..ConvertOptions::default()
    }
    .with_profile(args.profile.as_deref())
    .context("failed to load target profile")?;

    let outcome = convert_file(&args.input, &options)
        .with_context(|| format!("failed to convert {}", args.input.display()))?;

    let json = serde_json::to_string_pretty(&outcome.document)?;
    fs::write(&output, json)
        .with_context(|| format!("failed to write output JSON {}", output.display()))?;

    println!("{}", render_validation(&outcome.validation));
    if !outcome.diagnostics.is_empty() {
        println!("{}", render_diagnostics(&outcome.diagnostics));
    }
    println!("Output written to {}", output.display());
    println!("{}", render_conversion_summary(outcome.summary));

    if args.strict && !outcome.validation.is_empty() {
        bail!(
            "convert failed in strict mode: {} validation issues",
            outcome.validation.len()
        );
    }
    Ok(())
}
