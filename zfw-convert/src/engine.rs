//! One-shot conversion pipeline.
//!
//! A [`ConversionSession`] owns every accumulator of one run (id generator,
//! literal identities, diagnostics) and is consumed by [`ConversionSession::run`].

use std::path::Path;

use indexmap::IndexMap;
use ios_config_core::{parse, parse_file, ParseError, ParsedConfig};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::conversion_summary::{summarize, ConversionSummary};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::emit::{build_document, to_value};
use crate::forwarding::{add_internet_zone, build_forwardings, build_zones};
use crate::identity::{IdentityTable, LiteralIdentities};
use crate::ids::{IdGenerator, IdMode};
use crate::policy::PolicyBuilder;
use crate::profile::{load_profile, ProfileError, TargetProfile};
use crate::schema::{Identities, ZfwSection};
use crate::validate::{validate, ValidationIssue};

pub const DEFAULT_INTERNET_ZONE: &str = "EXT-Internet";

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub add_internet_zone: bool,
    pub internet_zone_name: String,
    pub id_mode: IdMode,
    pub profile: TargetProfile,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            add_internet_zone: false,
            internet_zone_name: DEFAULT_INTERNET_ZONE.to_string(),
            id_mode: IdMode::Random,
            profile: TargetProfile::default(),
        }
    }
}

impl ConvertOptions {
    /// Replace the profile with one loaded from `path`, or the embedded default.
    pub fn with_profile(mut self, path: Option<&Path>) -> Result<Self, ConvertError> {
        self.profile = load_profile(path)?;
        Ok(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutcome {
    pub document: Value,
    pub validation: Vec<ValidationIssue>,
    pub diagnostics: Vec<Diagnostic>,
    pub summary: ConversionSummary,
}

pub struct ConversionSession<'a> {
    config: &'a ParsedConfig,
    options: &'a ConvertOptions,
    ids: IdGenerator,
    literals: LiteralIdentities,
    diagnostics: Diagnostics,
}

impl<'a> ConversionSession<'a> {
    pub fn new(config: &'a ParsedConfig, options: &'a ConvertOptions) -> Self {
        let mut diagnostics = Diagnostics::default();
        for entry in &config.unparsed {
            diagnostics.record_unparsed(entry);
        }
        Self {
            config,
            options,
            ids: IdGenerator::new(options.id_mode),
            literals: LiteralIdentities::default(),
            diagnostics,
        }
    }

    pub fn run(mut self) -> Result<ConversionOutcome, ConvertError> {
        info!("generating configuration");
        let config = self.config;
        let options = self.options;

        let table = IdentityTable::build(config, &mut self.ids, &mut self.diagnostics);
        let mut zones = build_zones(config, &mut self.ids);
        let policies = PolicyBuilder {
            config,
            table: &table,
            literals: &mut self.literals,
            ids: &mut self.ids,
            diagnostics: &mut self.diagnostics,
            legacy_tcp_only: options.profile.legacy_tcp_only,
        }
        .build();
        let mut policies: IndexMap<_, _> = policies.into_iter().map(|p| (p.id.clone(), p)).collect();
        let mut forwardings =
            build_forwardings(config, &zones, &policies, &mut self.ids, &mut self.diagnostics);
        if options.add_internet_zone {
            add_internet_zone(
                &options.internet_zone_name,
                &mut zones,
                &mut policies,
                &mut forwardings,
                &mut self.ids,
            );
        }

        let identities = Identities {
            ip: table
                .ip_identities()
                .iter()
                .chain(self.literals.ip_identities())
                .cloned()
                .collect(),
            port: table
                .port_identities()
                .iter()
                .chain(self.literals.port_identities())
                .cloned()
                .collect(),
            mac: Vec::new(),
        };
        let zfw = ZfwSection {
            zones,
            filter_policies: policies,
            forwardings,
        };
        let document = to_value(&build_document(zfw, identities, &options.profile))?;

        info!("validating configuration");
        let validation = validate(&document);
        for issue in &validation {
            warn!(code = %issue.code, "{}", issue.message);
        }
        let summary = summarize(&document);

        Ok(ConversionOutcome {
            document,
            validation,
            diagnostics: self.diagnostics.into_vec(),
            summary,
        })
    }
}

pub fn convert_parsed(config: &ParsedConfig, options: &ConvertOptions) -> Result<ConversionOutcome, ConvertError> {
    ConversionSession::new(config, options).run()
}

pub fn convert_str(text: &str, options: &ConvertOptions) -> Result<ConversionOutcome, ConvertError> {
    info!("parsing configuration");
    let config = parse(text);
    convert_parsed(&config, options)
}

pub fn convert_file(path: &Path, options: &ConvertOptions) -> Result<ConversionOutcome, ConvertError> {
    info!(path = %path.display(), "parsing configuration");
    let config = parse_file(path)?;
    convert_parsed(&config, options)
}

#[cfg(test)]
mod tests {
    use super::{convert_str, ConvertError, ConvertOptions};
    use crate::ids::IdMode;
    use std::path::Path;

    fn deterministic() -> ConvertOptions {
        ConvertOptions {
            id_mode: IdMode::Deterministic,
            ..ConvertOptions::default()
        }
    }

    #[test]
    fn empty_input_still_yields_default_policies() {
        let outcome = convert_str("", &deterministic()).expect("convert");
        assert_eq!(outcome.summary.filter_policies, 2);
        let codes: Vec<&str> = outcome.validation.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["no_zones", "no_forwardings"]);
    }

    #[test]
    fn unparsed_lines_surface_as_diagnostics() {
        let text = "ip access-list extended ACL_X\n permit tcp 10.0.0.0 0.0.0.255 any\n";
        let outcome = convert_str(text, &deterministic()).expect("convert");
        let unparsed = outcome
            .diagnostics
            .iter()
            .find(|d| d.code == "unparsed_line")
            .expect("unparsed diagnostic");
        assert_eq!(unparsed.line, Some(2));
    }

    #[test]
    fn deterministic_runs_are_identical() {
        let text = "zone security LAN\nzone security WAN\nzone-pair security LAN-WAN source LAN destination WAN\n";
        let first = convert_str(text, &deterministic()).expect("convert");
        let second = convert_str(text, &deterministic()).expect("convert");
        assert_eq!(first.document, second.document);
    }

    #[test]
    fn missing_profile_file_is_a_profile_error() {
        let err = ConvertOptions::default()
            .with_profile(Some(Path::new("/nonexistent/profile.toml")))
            .expect_err("missing profile");
        assert!(matches!(err, ConvertError::Profile(_)));
    }
}
