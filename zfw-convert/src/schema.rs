//! Typed rendering of the target zone firewall export document.
//!
//! Lists that the target device stores as "index-keyed objects" serialize as
//! `[]` when empty and as `{"0": ..., "1": ...}` otherwise. Everything keyed by
//! id is an [`IndexMap`] so output order follows insertion order.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

use ios_config_core::Action;

pub const IP_VERSION: &str = "ip4";

fn serialize_indexed<S, T, I>(serializer: S, len: usize, items: I) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
    I: Iterator<Item = T>,
{
    if len == 0 {
        return serializer.serialize_seq(Some(0))?.end();
    }
    let mut map = serializer.serialize_map(Some(len))?;
    for (idx, item) in items.enumerate() {
        map.serialize_entry(&idx.to_string(), &item)?;
    }
    map.end()
}

#[derive(Serialize)]
struct IdentityEntry<'a, T> {
    identity: &'a T,
}

/// References to identities (or protocol numbers) in the device list encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRefs<T>(pub Vec<T>);

impl<T> IdentityRefs<T> {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }
}

impl<T> Default for IdentityRefs<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<Vec<T>> for IdentityRefs<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T: Serialize> Serialize for IdentityRefs<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_indexed(
            serializer,
            self.0.len(),
            self.0.iter().map(|identity| IdentityEntry { identity }),
        )
    }
}

pub type AddressRefs = IdentityRefs<String>;
pub type ProtocolRefs = IdentityRefs<u8>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressMember {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpIdentity {
    #[serde(rename = "_id_")]
    pub id: String,
    pub name: String,
    pub friendly_name: String,
    pub members: Vec<AddressMember>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PortMember {
    pub start: u16,
    pub end: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortIdentity {
    #[serde(rename = "_id_")]
    pub id: String,
    pub name: String,
    pub members: Vec<PortMember>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Identities {
    pub ip: Vec<IpIdentity>,
    pub port: Vec<PortIdentity>,
    pub mac: Vec<Value>,
}

/// Address and port match of one rule side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleMatch {
    pub ip: AddressRefs,
    pub port: AddressRefs,
}

/// Source side of a rule. Catch-all rules carry only the empty MAC list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceMatch {
    #[serde(flatten)]
    pub addresses: Option<RuleMatch>,
    pub mac: AddressRefs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterRule {
    pub action: Action,
    pub ip_version: String,
    pub name: String,
    pub priority: u32,
    pub app_sets: Vec<String>,
    pub protocols: ProtocolRefs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst: Option<RuleMatch>,
    pub src: SourceMatch,
}

impl FilterRule {
    /// A rule with address and port matches on both sides.
    pub fn matching(
        action: Action,
        name: String,
        priority: u32,
        protocols: ProtocolRefs,
        src: RuleMatch,
        dst: RuleMatch,
    ) -> Self {
        Self {
            action,
            ip_version: IP_VERSION.to_string(),
            name,
            priority,
            app_sets: Vec::new(),
            protocols,
            dst: Some(dst),
            src: SourceMatch {
                addresses: Some(src),
                mac: IdentityRefs::empty(),
            },
        }
    }

    /// A rule that matches every address and port.
    pub fn catch_all(action: Action, name: String, priority: u32, protocols: ProtocolRefs) -> Self {
        Self {
            action,
            ip_version: IP_VERSION.to_string(),
            name,
            priority,
            app_sets: Vec::new(),
            protocols,
            dst: None,
            src: SourceMatch::default(),
        }
    }

    pub fn src_ip(&self) -> &[String] {
        match &self.src.addresses {
            Some(side) => &side.ip.0,
            None => &[],
        }
    }

    pub fn src_port(&self) -> &[String] {
        match &self.src.addresses {
            Some(side) => &side.port.0,
            None => &[],
        }
    }

    pub fn dst_ip(&self) -> &[String] {
        match &self.dst {
            Some(side) => &side.ip.0,
            None => &[],
        }
    }

    pub fn dst_port(&self) -> &[String] {
        match &self.dst {
            Some(side) => &side.port.0,
            None => &[],
        }
    }
}

/// Rules of a policy, re-indexed `"0".."n"` on output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyRules(pub Vec<FilterRule>);

impl Serialize for PolicyRules {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_indexed(serializer, self.0.len(), self.0.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterPolicy {
    #[serde(rename = "_id_")]
    pub id: String,
    pub name: String,
    pub default_action: Action,
    pub rules: PolicyRules,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneDevice {
    #[serde(rename = "_id_")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Predicate that assigns devices to a zone dynamically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceTrigger {
    pub trigger_field: String,
    pub trigger_group: String,
    pub trigger_neg: bool,
    pub trigger_predicate: String,
    pub trigger_value: String,
}

impl DeviceTrigger {
    /// Matches every WAN device.
    pub fn wan() -> Self {
        Self {
            trigger_field: "type".to_string(),
            trigger_group: "wan".to_string(),
            trigger_neg: false,
            trigger_predicate: "is".to_string(),
            trigger_value: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ZoneDevices {
    Interfaces(IndexMap<String, ZoneDevice>),
    Triggers(Vec<DeviceTrigger>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Zone {
    #[serde(rename = "_id_")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devices: Option<ZoneDevices>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneForwarding {
    #[serde(rename = "_id_")]
    pub id: String,
    pub src_zone_id: String,
    pub dst_zone_id: String,
    pub enabled: bool,
    pub filter_policy_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ZfwSection {
    pub zones: IndexMap<String, Zone>,
    pub filter_policies: IndexMap<String, FilterPolicy>,
    pub forwardings: IndexMap<String, ZoneForwarding>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecuritySection {
    pub zfw: ZfwSection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationBody {
    pub security: SecuritySection,
    pub identities: Identities,
}

/// The full export document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// The configuration object followed by the path-ordering array.
    pub configuration: (ConfigurationBody, Vec<Vec<String>>),
    pub firmware_version: String,
    pub firmware_build_timestamp: String,
    pub firmware_multi_image: bool,
    pub config_encryption_id: Option<String>,
    pub export_type: String,
}

#[cfg(test)]
mod tests {
    use super::{AddressRefs, FilterRule, IdentityRefs, ProtocolRefs, RuleMatch};
    use ios_config_core::Action;
    use serde_json::json;

    #[test]
    fn empty_reference_lists_are_arrays() {
        let refs: AddressRefs = IdentityRefs::empty();
        assert_eq!(serde_json::to_value(&refs).expect("json"), json!([]));
    }

    #[test]
    fn reference_lists_are_index_keyed_objects() {
        let refs: ProtocolRefs = vec![6, 17].into();
        assert_eq!(
            serde_json::to_value(&refs).expect("json"),
            json!({"0": {"identity": 6}, "1": {"identity": 17}})
        );
    }

    #[test]
    fn catch_all_rule_has_only_a_mac_list_on_the_source() {
        let rule = FilterRule::catch_all(Action::Deny, "Deny All".to_string(), 20, IdentityRefs::empty());
        let value = serde_json::to_value(&rule).expect("json");
        assert_eq!(value["src"], json!({"mac": []}));
        assert!(value.get("dst").is_none());
        assert_eq!(value["action"], "deny");
        assert_eq!(value["ip_version"], "ip4");
    }

    #[test]
    fn matching_rule_serializes_both_sides() {
        let rule = FilterRule::matching(
            Action::Allow,
            "WEB".to_string(),
            10,
            vec![6].into(),
            RuleMatch {
                ip: vec!["src-id".to_string()].into(),
                port: IdentityRefs::empty(),
            },
            RuleMatch::default(),
        );
        let value = serde_json::to_value(&rule).expect("json");
        assert_eq!(
            value["src"],
            json!({"ip": {"0": {"identity": "src-id"}}, "port": [], "mac": []})
        );
        assert_eq!(value["dst"], json!({"ip": [], "port": []}));
    }
}
