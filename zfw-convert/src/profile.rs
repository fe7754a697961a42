use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Export metadata and output switches for the target device.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TargetProfile {
    pub firmware_version: String,
    pub firmware_build_timestamp: String,
    pub firmware_multi_image: bool,
    pub export_type: String,
    /// Synthetic rules carry a fixed TCP protocol instead of following their group.
    pub legacy_tcp_only: bool,
    pub path_order: Vec<Vec<String>>,
}

impl Default for TargetProfile {
    fn default() -> Self {
        Self {
            firmware_version: "7.25.10".to_string(),
            firmware_build_timestamp: "2025-05-12T17:01:24+00:00".to_string(),
            firmware_multi_image: false,
            export_type: "group".to_string(),
            legacy_tcp_only: false,
            path_order: default_path_order(),
        }
    }
}

fn default_path_order() -> Vec<Vec<String>> {
    const ENTRIES: &[(&str, &str)] = &[
        ("forwardings", "00000003-9532-3d3e-968c-e2f54a0cad18"),
        ("forwardings", "00000002-9532-3d3e-968c-e2f54a0cad18"),
        ("forwardings", "00000001-9532-3d3e-968c-e2f54a0cad18"),
        ("forwardings", "00000000-9532-3d3e-968c-e2f54a0cad18"),
        ("filter_policies", "00000001-77db-3b20-980e-2de482869073"),
        ("filter_policies", "00000000-77db-3b20-980e-2de482869073"),
        ("zones", "00000004-695c-3d87-95cb-d0ee2029d0b5"),
        ("zones", "00000003-695c-3d87-95cb-d0ee2029d0b5"),
        ("zones", "00000002-695c-3d87-95cb-d0ee2029d0b5"),
    ];
    ENTRIES
        .iter()
        .map(|&(section, id)| {
            ["security", "zfw", section, id]
                .iter()
                .map(|part| (*part).to_string())
                .collect()
        })
        .collect()
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read profile {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid profile {origin}: {source}")]
    Toml {
        origin: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Load the profile at `path`, or the embedded default when no path is given.
///
/// Keys missing from a profile file keep their default values.
pub fn load_profile(path: Option<&Path>) -> Result<TargetProfile, ProfileError> {
    match path {
        Some(path) => load_profile_file(path),
        None => embedded_profile(),
    }
}

pub fn embedded_profile() -> Result<TargetProfile, ProfileError> {
    let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/profiles/default.toml"));
    parse_profile(raw, "embedded")
}

fn load_profile_file(path: &Path) -> Result<TargetProfile, ProfileError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_profile(&raw, &format!("file:{}", path.display()))
}

fn parse_profile(raw: &str, origin: &str) -> Result<TargetProfile, ProfileError> {
    toml::from_str::<TargetProfile>(raw).map_err(|source| ProfileError::Toml {
        origin: origin.to_string(),
        source,
    })
}
