//! Assemble the export document.

use indexmap::IndexMap;
use serde_json::Value;

use crate::policy::is_allow_all;
use crate::profile::TargetProfile;
use crate::schema::{
    ConfigurationBody, Document, FilterPolicy, Identities, SecuritySection, ZfwSection,
};

/// Move the first allow-all policy to the front; the rest keep their order.
pub fn order_policies(policies: IndexMap<String, FilterPolicy>) -> IndexMap<String, FilterPolicy> {
    let Some(first) = policies.values().position(|p| is_allow_all(&p.name)) else {
        return policies;
    };
    let mut policies = policies;
    policies.move_index(first, 0);
    policies
}

pub fn build_document(zfw: ZfwSection, identities: Identities, profile: &TargetProfile) -> Document {
    let zfw = ZfwSection {
        filter_policies: order_policies(zfw.filter_policies),
        ..zfw
    };
    Document {
        configuration: (
            ConfigurationBody {
                security: SecuritySection { zfw },
                identities,
            },
            profile.path_order.clone(),
        ),
        firmware_version: profile.firmware_version.clone(),
        firmware_build_timestamp: profile.firmware_build_timestamp.clone(),
        firmware_multi_image: profile.firmware_multi_image,
        config_encryption_id: None,
        export_type: profile.export_type.clone(),
    }
}

pub fn to_value(document: &Document) -> Result<Value, serde_json::Error> {
    serde_json::to_value(document)
}
