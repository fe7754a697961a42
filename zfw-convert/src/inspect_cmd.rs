use anyhow::{Context, Result};
use ios_config_core::parse_file;
use zfw_convert::inspect::build_inspect_report;
use zfw_convert::report::render_inspect;

use crate::cli::{InspectArgs, OutputFormat};

pub fn run_inspect(args: InspectArgs) -> Result<()> {
    let config = parse_file(&args.input)
        .with_context(|| format!("failed to parse {}", args.input.display()))?;
    let report = build_inspect_report(&config);

    match args.format {
        OutputFormat::Text => println!("{}", render_inspect(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}
