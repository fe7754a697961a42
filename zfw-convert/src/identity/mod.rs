//! Identities built from object groups.
//!
//! The group table is built once per conversion and is read-only afterwards.
//! Identities for literal addresses and ports met while translating rules
//! live in [`literal::LiteralIdentities`].

pub mod literal;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::net::IpAddr;

use ios_config_core::{GroupKind, Member, ObjectGroup, ParsedConfig, PortValue, ServiceProtocol};
use ipnet::ipv4_mask_to_prefix;

use crate::diagnostics::Diagnostics;
use crate::ids::IdGenerator;
use crate::schema::{AddressMember, IpIdentity, PortIdentity, PortMember};

pub use literal::LiteralIdentities;

/// Transport protocols present in a service group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceProtocols {
    pub tcp: bool,
    pub udp: bool,
}

impl ServiceProtocols {
    pub fn is_mixed(self) -> bool {
        self.tcp && self.udp
    }
}

/// Transport protocol of one split port identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Tcp,
    Udp,
}

impl Transport {
    pub fn id(self) -> u8 {
        match self {
            Self::Tcp => 6,
            Self::Udp => 17,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Self::Tcp => "TCP",
            Self::Udp => "UDP",
        }
    }
}

/// Key under which the split identity of a mixed service group is registered.
pub fn split_key(group: &str, transport: Transport) -> String {
    format!("{group}-{}", transport.suffix())
}

#[derive(Debug, Clone, Default)]
pub struct IdentityTable {
    ip: Vec<IpIdentity>,
    port: Vec<PortIdentity>,
    by_key: HashMap<String, String>,
    protocols: HashMap<String, ServiceProtocols>,
}

impl IdentityTable {
    pub fn build(config: &ParsedConfig, ids: &mut IdGenerator, diagnostics: &mut Diagnostics) -> Self {
        let mut table = Self::default();

        for group in config.object_groups.iter().filter(|g| g.kind == GroupKind::Network) {
            let members = network_members(config, group, diagnostics);
            if members.is_empty() {
                continue;
            }
            let id = ids.next("ip_identity", &group.name);
            table.by_key.insert(group.name.clone(), id.clone());
            table.ip.push(IpIdentity {
                id,
                name: group.name.clone(),
                friendly_name: String::new(),
                members,
            });
        }

        for group in config.object_groups.iter().filter(|g| g.kind == GroupKind::Service) {
            let ports = service_ports(config, group, diagnostics);
            let protocols = ServiceProtocols {
                tcp: !ports.tcp.is_empty(),
                udp: !ports.udp.is_empty(),
            };
            table.protocols.insert(group.name.clone(), protocols);

            if protocols.is_mixed() {
                table.add_split(ids, &group.name, Transport::Tcp, sorted(ports.tcp));
                table.add_split(ids, &group.name, Transport::Udp, sorted(ports.udp));
            } else if !ports.ordered.is_empty() {
                let id = ids.next("port_identity", &group.name);
                table.by_key.insert(group.name.clone(), id.clone());
                table.port.push(PortIdentity {
                    id,
                    name: group.name.clone(),
                    members: ports.ordered,
                });
            }
        }

        table
    }

    fn add_split(&mut self, ids: &mut IdGenerator, group: &str, transport: Transport, members: Vec<PortMember>) {
        let name = split_key(group, transport);
        let id = ids.next("port_identity", &name);
        self.by_key
            .insert(format!("{group}-{}", transport.suffix().to_lowercase()), id.clone());
        self.by_key.insert(name.clone(), id.clone());
        // TCP registers first, so the bare group name resolves to it.
        self.by_key.entry(group.to_string()).or_insert_with(|| id.clone());
        self.port.push(PortIdentity { id, name, members });
    }

    /// Identity id registered for a group name or a split `<group>-TCP|UDP` key.
    pub fn group_identity(&self, key: &str) -> Option<&str> {
        self.by_key.get(key).map(String::as_str)
    }

    /// Protocols of a service group. Unknown or empty groups count as TCP.
    pub fn protocols_for(&self, group: &str) -> ServiceProtocols {
        match self.protocols.get(group) {
            Some(p) if p.tcp || p.udp => *p,
            _ => ServiceProtocols { tcp: true, udp: false },
        }
    }

    pub fn ip_identities(&self) -> &[IpIdentity] {
        &self.ip
    }

    pub fn port_identities(&self) -> &[PortIdentity] {
        &self.port
    }
}

fn sorted(ports: Vec<PortMember>) -> Vec<PortMember> {
    ports.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Convert a mask to a `/prefix` suffix.
///
/// Dotted netmasks and wildcard masks are counted, `/n` and bare `n` are
/// kept, anything else is a single host.
pub fn prefix_suffix(mask: &str) -> String {
    if let Some(bits) = mask.strip_prefix('/').unwrap_or(mask).parse::<u8>().ok().filter(|b| *b <= 32) {
        return format!("/{bits}");
    }
    if let Ok(addr) = mask.parse::<std::net::Ipv4Addr>() {
        if let Ok(bits) = ipv4_mask_to_prefix(addr) {
            return format!("/{bits}");
        }
        if let Ok(bits) = ipv4_mask_to_prefix(std::net::Ipv4Addr::from(!u32::from(addr))) {
            return format!("/{bits}");
        }
    }
    "/32".to_string()
}

pub(crate) fn is_valid_address(address: &str) -> bool {
    address.parse::<IpAddr>().is_ok()
}

fn network_members(config: &ParsedConfig, group: &ObjectGroup, diagnostics: &mut Diagnostics) -> Vec<AddressMember> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut visiting = HashSet::new();
    collect_network(config, group, diagnostics, &mut visiting, &mut |address| {
        if seen.insert(address.clone()) {
            out.push(AddressMember { address });
        }
    });
    out
}

fn collect_network(
    config: &ParsedConfig,
    group: &ObjectGroup,
    diagnostics: &mut Diagnostics,
    visiting: &mut HashSet<String>,
    emit: &mut dyn FnMut(String),
) {
    if !visiting.insert(group.name.clone()) {
        diagnostics.record(
            "group_cycle",
            format!("object-group {} references itself through group-object", group.name),
        );
        return;
    }

    for member in &group.members {
        match member {
            Member::Host { address } if is_valid_address(address) => emit(address.clone()),
            Member::Network { address, mask } if is_valid_address(address) => {
                emit(format!("{address}{}", prefix_suffix(mask)));
            }
            Member::Range { start, end } if is_valid_address(start) && is_valid_address(end) => {
                emit(start.clone());
                emit(end.clone());
            }
            Member::GroupRef { name } => match config.object_group(name) {
                Some(nested) if nested.kind == GroupKind::Network => {
                    collect_network(config, nested, diagnostics, visiting, emit);
                }
                _ => diagnostics.record(
                    "unknown_group",
                    format!("object-group {} references unknown network group {name}", group.name),
                ),
            },
            Member::Host { address } | Member::Network { address, .. } => diagnostics.record(
                "invalid_address",
                format!("object-group {}: skipping invalid address {address}", group.name),
            ),
            Member::Range { start, end } => diagnostics.record(
                "invalid_address",
                format!("object-group {}: skipping invalid range {start} {end}", group.name),
            ),
            Member::Port { .. } | Member::PortRange { .. } => {}
        }
    }

    visiting.remove(&group.name);
}

#[derive(Debug, Default)]
struct ServicePorts {
    tcp: Vec<PortMember>,
    udp: Vec<PortMember>,
    /// Every distinct member in declaration order, for single-protocol groups.
    ordered: Vec<PortMember>,
}

impl ServicePorts {
    fn add(&mut self, protocol: ServiceProtocol, member: PortMember) {
        if protocol.includes_tcp() {
            self.tcp.push(member);
        }
        if protocol.includes_udp() {
            self.udp.push(member);
        }
        if !self.ordered.contains(&member) {
            self.ordered.push(member);
        }
    }
}

fn service_ports(config: &ParsedConfig, group: &ObjectGroup, diagnostics: &mut Diagnostics) -> ServicePorts {
    let mut ports = ServicePorts::default();
    let mut visiting = HashSet::new();
    collect_service(config, group, diagnostics, &mut visiting, &mut ports);
    ports
}

fn collect_service(
    config: &ParsedConfig,
    group: &ObjectGroup,
    diagnostics: &mut Diagnostics,
    visiting: &mut HashSet<String>,
    ports: &mut ServicePorts,
) {
    if !visiting.insert(group.name.clone()) {
        diagnostics.record(
            "group_cycle",
            format!("object-group {} references itself through group-object", group.name),
        );
        return;
    }

    for member in &group.members {
        match member {
            Member::Port { protocol, port } => {
                if let Some(n) = port_number(&group.name, port, diagnostics) {
                    ports.add(*protocol, PortMember { start: n, end: n });
                }
            }
            Member::PortRange { protocol, start, end } => {
                let (Some(start), Some(end)) = (
                    port_number(&group.name, start, diagnostics),
                    port_number(&group.name, end, diagnostics),
                ) else {
                    continue;
                };
                ports.add(*protocol, PortMember { start, end });
            }
            Member::GroupRef { name } => match config.object_group(name) {
                Some(nested) if nested.kind == GroupKind::Service => {
                    collect_service(config, nested, diagnostics, visiting, ports);
                }
                _ => diagnostics.record(
                    "unknown_group",
                    format!("object-group {} references unknown service group {name}", group.name),
                ),
            },
            Member::Host { .. } | Member::Network { .. } | Member::Range { .. } => {}
        }
    }

    visiting.remove(&group.name);
}

fn port_number(group: &str, port: &PortValue, diagnostics: &mut Diagnostics) -> Option<u16> {
    let number = port.number();
    if number.is_none() {
        if let PortValue::Name(name) = port {
            diagnostics.record(
                "unknown_port",
                format!("object-group {group}: skipping unknown port name {name}"),
            );
        }
    }
    number
}

#[cfg(test)]
mod tests {
    use super::{prefix_suffix, IdentityTable, ServiceProtocols};
    use crate::diagnostics::Diagnostics;
    use crate::ids::{IdGenerator, IdMode};
    use crate::schema::PortMember;
    use ios_config_core::parse;

    fn build(text: &str) -> (IdentityTable, Diagnostics) {
        let config = parse(text);
        let mut ids = IdGenerator::new(IdMode::Deterministic);
        let mut diagnostics = Diagnostics::default();
        let table = IdentityTable::build(&config, &mut ids, &mut diagnostics);
        (table, diagnostics)
    }

    #[test]
    fn masks_become_prefix_lengths() {
        assert_eq!(prefix_suffix("255.255.255.0"), "/24");
        assert_eq!(prefix_suffix("255.255.0.0"), "/16");
        assert_eq!(prefix_suffix("0.0.0.255"), "/24");
        assert_eq!(prefix_suffix("/28"), "/28");
        assert_eq!(prefix_suffix("30"), "/30");
        assert_eq!(prefix_suffix("bogus"), "/32");
        assert_eq!(prefix_suffix("255.0.255.0"), "/32");
    }

    #[test]
    fn network_groups_become_ip_identities() {
        let (table, diagnostics) = build(
            "object-group network NET-A\n host 10.0.0.1\n network 10.1.0.0 255.255.0.0\n range 10.2.0.1 10.2.0.5\n host not-an-ip\n",
        );
        let ip = &table.ip_identities()[0];
        assert_eq!(ip.name, "NET-A");
        let addresses: Vec<&str> = ip.members.iter().map(|m| m.address.as_str()).collect();
        assert_eq!(addresses, vec!["10.0.0.1", "10.1.0.0/16", "10.2.0.1", "10.2.0.5"]);
        assert_eq!(table.group_identity("NET-A"), Some(ip.id.as_str()));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn empty_network_groups_get_no_identity() {
        let (table, _) = build("object-group network NET-EMPTY\n description nothing here\n");
        assert!(table.ip_identities().is_empty());
        assert_eq!(table.group_identity("NET-EMPTY"), None);
    }

    #[test]
    fn nested_groups_are_flattened_without_looping() {
        let (table, diagnostics) = build(
            "object-group network NET-A\n host 10.0.0.1\n group-object NET-B\n!\nobject-group network NET-B\n host 10.0.0.2\n group-object NET-A\n",
        );
        let a = &table.ip_identities()[0];
        assert_eq!(a.members.len(), 2);
        assert!(diagnostics.entries().iter().any(|d| d.code == "group_cycle"));
    }

    #[test]
    fn mixed_service_group_splits_per_protocol() {
        let (table, _) = build(
            "object-group service SVC-INFRA\n udp eq ntp\n tcp eq domain\n udp eq domain\n tcp-udp eq 8080\n",
        );
        let names: Vec<&str> = table.port_identities().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["SVC-INFRA-TCP", "SVC-INFRA-UDP"]);

        let tcp = &table.port_identities()[0];
        assert_eq!(
            tcp.members,
            vec![PortMember { start: 53, end: 53 }, PortMember { start: 8080, end: 8080 }]
        );
        let udp = &table.port_identities()[1];
        assert_eq!(udp.members.len(), 3);
        assert_eq!(udp.members[0], PortMember { start: 53, end: 53 });

        assert_eq!(table.group_identity("SVC-INFRA"), Some(tcp.id.as_str()));
        assert_eq!(table.group_identity("SVC-INFRA-tcp"), Some(tcp.id.as_str()));
        assert_eq!(table.group_identity("SVC-INFRA-UDP"), Some(udp.id.as_str()));
        assert!(table.protocols_for("SVC-INFRA").is_mixed());
    }

    #[test]
    fn single_protocol_group_keeps_declaration_order() {
        let (table, diagnostics) = build(
            "object-group service SVC-WEB\n tcp eq 443\n tcp eq www\n tcp range 8000 8010\n tcp eq mystery\n",
        );
        let web = &table.port_identities()[0];
        assert_eq!(web.name, "SVC-WEB");
        assert_eq!(
            web.members,
            vec![
                PortMember { start: 443, end: 443 },
                PortMember { start: 80, end: 80 },
                PortMember { start: 8000, end: 8010 },
            ]
        );
        assert_eq!(diagnostics.entries()[0].code, "unknown_port");
        assert_eq!(
            table.protocols_for("SVC-WEB"),
            ServiceProtocols { tcp: true, udp: false }
        );
    }

    #[test]
    fn nested_service_groups_contribute_their_ports() {
        let (table, _) = build(
            "object-group service SVC-MAIL\n tcp eq smtp\n!\nobject-group service SVC-ALL\n udp eq snmp\n group-object SVC-MAIL\n",
        );
        assert!(table.protocols_for("SVC-ALL").is_mixed());
        assert!(table.group_identity("SVC-MAIL").is_some());
        assert!(table.group_identity("SVC-ALL-UDP").is_some());
    }

    #[test]
    fn unknown_service_group_defaults_to_tcp() {
        let (table, _) = build("");
        assert_eq!(
            table.protocols_for("SVC-MISSING"),
            ServiceProtocols { tcp: true, udp: false }
        );
    }
}
