//! Section parsers.
//!
//! Each submodule is a single forward pass over the shared [`ConfigLine`] list
//! with a `None -> InBlock -> None` state machine. A block is entered on its
//! header line and left on a blank/comment separator, an `end` line, or an
//! unindented top-level directive. Lines a block does not recognize are
//! skipped without complaint.

mod acls;
mod class_maps;
mod interfaces;
mod object_groups;
mod policy_maps;
mod zone_pairs;
mod zones;

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::lines::{classify, ConfigLine};
use crate::model::ParsedConfig;

pub use acls::{has_service_prefix, parse_acl_rule};

/// Errors that can occur while loading a configuration.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Failed to read input file.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    /// Input bytes were not valid UTF-8.
    #[error("configuration is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Parse configuration text. Never fails: unknown content is ignored.
pub fn parse(text: &str) -> ParsedConfig {
    let lines = classify(text);

    let mut zones = zones::parse_zones(&lines);
    let interfaces = interfaces::parse_interfaces(&lines, &mut zones);
    let object_groups = object_groups::parse_object_groups(&lines);
    let (acls, mut unparsed) = acls::parse_acls(&lines);
    let class_maps = class_maps::parse_class_maps(&lines);
    let policy_maps = policy_maps::parse_policy_maps(&lines);
    let (zone_pairs, pair_diagnostics) = zone_pairs::parse_zone_pairs(&lines);
    unparsed.extend(pair_diagnostics);

    debug!(
        zones = zones.len(),
        interfaces = interfaces.len(),
        object_groups = object_groups.len(),
        acls = acls.len(),
        class_maps = class_maps.len(),
        policy_maps = policy_maps.len(),
        zone_pairs = zone_pairs.len(),
        unparsed = unparsed.len(),
        "parsed configuration sections"
    );

    ParsedConfig {
        lines,
        zones,
        interfaces,
        object_groups,
        acls,
        class_maps,
        policy_maps,
        zone_pairs,
        unparsed,
    }
}

/// Parse raw configuration bytes.
pub fn parse_bytes(bytes: &[u8]) -> Result<ParsedConfig, ParseError> {
    let text = std::str::from_utf8(bytes)?;
    Ok(parse(text))
}

/// Read and parse a configuration file.
pub fn parse_file(path: &Path) -> Result<ParsedConfig, ParseError> {
    let bytes = fs::read(path)?;
    parse_bytes(&bytes)
}

/// First tokens that open a new top-level configuration section.
const TOP_LEVEL_KEYWORDS: &[&str] = &[
    "aaa",
    "access-list",
    "alias",
    "archive",
    "banner",
    "boot",
    "class-map",
    "control-plane",
    "crypto",
    "dial-peer",
    "enable",
    "end",
    "gatekeeper",
    "hostname",
    "interface",
    "ip",
    "ipv6",
    "license",
    "line",
    "logging",
    "mgcp",
    "no",
    "ntp",
    "object-group",
    "parameter-map",
    "policy-map",
    "redundancy",
    "route-map",
    "router",
    "scheduler",
    "service",
    "snmp-server",
    "spanning-tree",
    "tacacs",
    "tacacs-server",
    "track",
    "username",
    "version",
    "vlan",
    "voice",
    "zone",
    "zone-pair",
];

fn is_top_level_directive(text: &str) -> bool {
    text.split_whitespace()
        .next()
        .is_some_and(|first| TOP_LEVEL_KEYWORDS.contains(&first))
}

/// A blank/comment separator or `end` closes any open block before `line`.
pub(crate) fn is_separator(line: &ConfigLine) -> bool {
    line.after_break || line.text == "end"
}

/// An unindented top-level directive closes any open block.
pub(crate) fn is_top_level(line: &ConfigLine) -> bool {
    line.indent == 0 && is_top_level_directive(&line.text)
}

/// Return the remainder of `text` after `prefix`, trimmed, if non-empty.
pub(crate) fn header_value<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(prefix)?.trim();
    (!rest.is_empty()).then_some(rest)
}
