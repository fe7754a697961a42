//! Parse-only view of a configuration.

use ios_config_core::{ParsedConfig, Unparsed};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionCounts {
    pub zones: usize,
    pub interfaces: usize,
    pub object_groups: usize,
    pub acls: usize,
    pub acl_rules: usize,
    pub class_maps: usize,
    pub policy_maps: usize,
    pub zone_pairs: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    pub sections: SectionCounts,
    /// Zone pairs that no service-policy binds.
    pub unbound_zone_pairs: Vec<String>,
    pub unparsed: Vec<Unparsed>,
}

pub fn build_inspect_report(config: &ParsedConfig) -> InspectReport {
    InspectReport {
        sections: SectionCounts {
            zones: config.zones.len(),
            interfaces: config.interfaces.len(),
            object_groups: config.object_groups.len(),
            acls: config.acls.len(),
            acl_rules: config.acls.iter().map(|acl| acl.rules.len()).sum(),
            class_maps: config.class_maps.len(),
            policy_maps: config.policy_maps.len(),
            zone_pairs: config.zone_pairs.len(),
        },
        unbound_zone_pairs: config
            .zone_pairs
            .iter()
            .filter(|pair| pair.policy_map.is_none())
            .map(|pair| pair.name.clone())
            .collect(),
        unparsed: config.unparsed.clone(),
    }
}
