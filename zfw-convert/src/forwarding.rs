//! Zones, zone forwardings and the optional internet zone.

use indexmap::IndexMap;
use ios_config_core::{Action, ParsedConfig};
use tracing::debug;

use crate::diagnostics::Diagnostics;
use crate::ids::IdGenerator;
use crate::policy::{is_allow_all, ALLOW_ALL, DEFAULT_DENY_ALL};
use crate::schema::{
    DeviceTrigger, FilterPolicy, PolicyRules, Zone, ZoneDevice, ZoneDevices, ZoneForwarding,
};

/// One zone per `zone security` declaration with its member interfaces.
pub fn build_zones(config: &ParsedConfig, ids: &mut IdGenerator) -> IndexMap<String, Zone> {
    let mut zones = IndexMap::new();
    for zone in &config.zones {
        let id = ids.next("zone", &zone.name);
        let devices = (!zone.interfaces.is_empty()).then(|| {
            let members = zone
                .interfaces
                .iter()
                .map(|interface| {
                    let device_id = ids.next("zone_device", interface);
                    let device = ZoneDevice {
                        id: device_id.clone(),
                        name: interface.clone(),
                        kind: "interface".to_string(),
                    };
                    (device_id, device)
                })
                .collect();
            ZoneDevices::Interfaces(members)
        });
        zones.insert(
            id.clone(),
            Zone {
                id,
                name: zone.name.clone(),
                devices,
            },
        );
    }
    zones
}

fn zone_id_by_name<'z>(zones: &'z IndexMap<String, Zone>, name: &str) -> Option<&'z str> {
    zones
        .values()
        .find(|zone| zone.name == name)
        .map(|zone| zone.id.as_str())
}

fn policy_id_by_name<'p>(policies: &'p IndexMap<String, FilterPolicy>, name: &str) -> Option<&'p str> {
    policies
        .values()
        .find(|policy| policy.name == name)
        .map(|policy| policy.id.as_str())
}

/// One forwarding per zone pair.
///
/// Unresolvable zones and policies become empty ids. A pair without a bound
/// policy map falls back to `Default Deny All` when that policy exists.
pub fn build_forwardings(
    config: &ParsedConfig,
    zones: &IndexMap<String, Zone>,
    policies: &IndexMap<String, FilterPolicy>,
    ids: &mut IdGenerator,
    diagnostics: &mut Diagnostics,
) -> IndexMap<String, ZoneForwarding> {
    let mut forwardings = IndexMap::new();
    for pair in &config.zone_pairs {
        let mut zone_id = |name: &str| match zone_id_by_name(zones, name) {
            Some(id) => id.to_string(),
            None => {
                diagnostics.record(
                    "unknown_zone",
                    format!("zone-pair {} references undeclared zone {name}", pair.name),
                );
                String::new()
            }
        };
        let src_zone_id = zone_id(pair.source_zone.as_str());
        let dst_zone_id = zone_id(pair.destination_zone.as_str());

        let filter_policy_id = pair
            .policy_map
            .as_deref()
            .and_then(|name| policy_id_by_name(policies, name))
            .or_else(|| policy_id_by_name(policies, DEFAULT_DENY_ALL))
            .unwrap_or_default()
            .to_string();

        let id = ids.next("forwarding", &pair.name);
        forwardings.insert(
            id.clone(),
            ZoneForwarding {
                id,
                src_zone_id,
                dst_zone_id,
                enabled: true,
                filter_policy_id,
            },
        );
    }
    forwardings
}

/// Add a WAN-triggered zone and forward every existing zone to it.
///
/// The forwardings use an existing `Default Allow All` or `ALLOW ALL` policy
/// when present, otherwise an `ALLOW ALL` policy that allows by default is
/// created.
pub fn add_internet_zone(
    name: &str,
    zones: &mut IndexMap<String, Zone>,
    policies: &mut IndexMap<String, FilterPolicy>,
    forwardings: &mut IndexMap<String, ZoneForwarding>,
    ids: &mut IdGenerator,
) {
    let internet_id = ids.next("zone", name);

    let existing = policies
        .values()
        .find(|policy| is_allow_all(&policy.name))
        .map(|policy| policy.id.clone());
    let policy_id = match existing {
        Some(id) => id,
        None => {
            let id = ids.next("filter_policy", ALLOW_ALL);
            policies.insert(
                id.clone(),
                FilterPolicy {
                    id: id.clone(),
                    name: ALLOW_ALL.to_string(),
                    default_action: Action::Allow,
                    rules: PolicyRules::default(),
                },
            );
            id
        }
    };

    for src_zone_id in zones.keys() {
        let id = ids.next("forwarding", &format!("{src_zone_id}->{name}"));
        forwardings.insert(
            id.clone(),
            ZoneForwarding {
                id,
                src_zone_id: src_zone_id.clone(),
                dst_zone_id: internet_id.clone(),
                enabled: true,
                filter_policy_id: policy_id.clone(),
            },
        );
    }
    debug!(zone = name, forwardings = zones.len(), "added internet zone");

    zones.insert(
        internet_id.clone(),
        Zone {
            id: internet_id,
            name: name.to_string(),
            devices: Some(ZoneDevices::Triggers(vec![DeviceTrigger::wan()])),
        },
    );
}

#[cfg(test)]
mod tests {
    use super::{add_internet_zone, build_forwardings, build_zones};
    use crate::diagnostics::Diagnostics;
    use crate::ids::{IdGenerator, IdMode};
    use crate::policy::default_policies;
    use crate::schema::{FilterPolicy, PolicyRules, ZoneDevices};
    use indexmap::IndexMap;
    use ios_config_core::{parse, Action};
    use serde_json::json;

    const ZONES: &str = "zone security LAN\nzone security WAN\n!\ninterface Gi0/0\n zone-member security LAN\n!\nzone-pair security LAN-WAN source LAN destination WAN\n!\nzone-pair security WAN-GUEST source WAN destination GUEST\n";

    fn index(policies: Vec<FilterPolicy>) -> IndexMap<String, FilterPolicy> {
        policies.into_iter().map(|p| (p.id.clone(), p)).collect()
    }

    #[test]
    fn zones_carry_member_interfaces_only_when_present() {
        let config = parse(ZONES);
        let mut ids = IdGenerator::new(IdMode::Deterministic);
        let zones = build_zones(&config, &mut ids);
        let values: Vec<_> = zones.values().collect();
        assert_eq!(values[0].name, "LAN");
        match &values[0].devices {
            Some(ZoneDevices::Interfaces(devices)) => {
                let device = devices.values().next().expect("device");
                assert_eq!(device.name, "Gi0/0");
                assert_eq!(device.kind, "interface");
            }
            other => panic!("unexpected devices: {other:?}"),
        }
        assert!(values[1].devices.is_none());
        let wan = serde_json::to_value(values[1]).expect("json");
        assert!(wan.get("devices").is_none());
    }

    #[test]
    fn pairs_without_policy_fall_back_to_default_deny() {
        let config = parse(ZONES);
        let mut ids = IdGenerator::new(IdMode::Deterministic);
        let mut diagnostics = Diagnostics::default();
        let zones = build_zones(&config, &mut ids);
        let policies = index(default_policies(&mut ids, false));
        let deny_id = policies.values().nth(1).map(|p| p.id.clone()).expect("deny policy");

        let forwardings = build_forwardings(&config, &zones, &policies, &mut ids, &mut diagnostics);
        let values: Vec<_> = forwardings.values().collect();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].filter_policy_id, deny_id);
        assert!(values[0].enabled);
        assert_eq!(values[1].dst_zone_id, "");
        assert!(diagnostics.entries().iter().any(|d| d.code == "unknown_zone"));
    }

    #[test]
    fn missing_policies_leave_the_id_empty() {
        let config = parse(ZONES);
        let mut ids = IdGenerator::new(IdMode::Random);
        let mut diagnostics = Diagnostics::default();
        let zones = build_zones(&config, &mut ids);
        let forwardings = build_forwardings(&config, &zones, &IndexMap::new(), &mut ids, &mut diagnostics);
        assert!(forwardings.values().all(|f| f.filter_policy_id.is_empty()));
    }

    #[test]
    fn internet_zone_forwards_every_existing_zone() {
        let config = parse(ZONES);
        let mut ids = IdGenerator::new(IdMode::Deterministic);
        let mut zones = build_zones(&config, &mut ids);
        let mut policies = IndexMap::new();
        let mut forwardings = IndexMap::new();

        add_internet_zone("EXT-Internet", &mut zones, &mut policies, &mut forwardings, &mut ids);

        assert_eq!(zones.len(), 3);
        let internet = zones.values().last().expect("internet zone");
        assert_eq!(internet.name, "EXT-Internet");
        assert_eq!(
            serde_json::to_value(internet).expect("json")["devices"][0]["trigger_group"],
            json!("wan")
        );

        let allow = policies.values().next().expect("allow policy");
        assert_eq!(allow.name, "ALLOW ALL");
        assert_eq!(allow.default_action, Action::Allow);
        assert_eq!(serde_json::to_value(&allow.rules).expect("json"), json!([]));

        assert_eq!(forwardings.len(), 2);
        for forwarding in forwardings.values() {
            assert_eq!(forwarding.dst_zone_id, internet.id);
            assert_eq!(forwarding.filter_policy_id, allow.id);
            assert_ne!(forwarding.src_zone_id, internet.id);
        }
    }

    #[test]
    fn internet_zone_reuses_default_allow_all() {
        let config = parse(ZONES);
        let mut ids = IdGenerator::new(IdMode::Deterministic);
        let mut zones = build_zones(&config, &mut ids);
        let mut policies = index(default_policies(&mut ids, false));
        let allow_id = policies.keys().next().cloned().expect("allow id");
        let mut forwardings = IndexMap::new();

        add_internet_zone("NET", &mut zones, &mut policies, &mut forwardings, &mut ids);
        assert_eq!(policies.len(), 2);
        assert!(forwardings.values().all(|f| f.filter_policy_id == allow_id));
    }

    #[test]
    fn internet_zone_reuses_a_configured_allow_all_policy() {
        let config = parse(ZONES);
        let mut ids = IdGenerator::new(IdMode::Deterministic);
        let mut zones = build_zones(&config, &mut ids);
        let existing = FilterPolicy {
            id: ids.next("filter_policy", "ALLOW ALL"),
            name: "ALLOW ALL".to_string(),
            default_action: Action::Allow,
            rules: PolicyRules::default(),
        };
        let allow_id = existing.id.clone();
        let mut policies = index(vec![existing]);
        let mut forwardings = IndexMap::new();

        add_internet_zone("EXT-Internet", &mut zones, &mut policies, &mut forwardings, &mut ids);
        assert_eq!(policies.len(), 1);
        assert_eq!(forwardings.len(), 2);
        assert!(forwardings.values().all(|f| f.filter_policy_id == allow_id));
    }
}
