use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use zfw_convert::engine::DEFAULT_INTERNET_ZONE;

#[derive(Parser, Debug)]
#[command(name = "zfw-convert")]
#[command(about = "Convert Cisco IOS zone-based firewall configuration to Cradlepoint JSON")]
pub struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Convert one IOS configuration to a Cradlepoint zone firewall export.
    Convert(ConvertArgs),
    /// Parse one IOS configuration and show what was recognized.
    Inspect(InspectArgs),
    /// Check an existing export document.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// IOS configuration file to convert.
    pub input: PathBuf,
    /// Output file path (defaults to `<input stem>_cradlepoint.json`).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Add a WAN-triggered zone that every other zone forwards to.
    #[arg(long)]
    pub add_internet_zone: bool,
    #[arg(long, default_value = DEFAULT_INTERNET_ZONE)]
    pub internet_zone_name: String,
    /// Derive object ids from names so repeated runs produce identical output.
    #[arg(long)]
    pub deterministic_ids: bool,
    /// Target profile TOML (defaults to the embedded profile).
    #[arg(long)]
    pub profile: Option<PathBuf>,
    /// Fail when the generated document has validation issues.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    pub input: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Export document to check.
    pub document: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
