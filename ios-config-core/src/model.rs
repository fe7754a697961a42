//! Normalized model of the zone-based firewall sections of an IOS configuration.
//!
//! Every entity is a closed type: object-group members, ACL endpoints and
//! policy actions are enums rather than loosely keyed rows, so consumers match
//! on variants instead of probing for fields.

use serde::Serialize;

use crate::lines::ConfigLine;
use crate::ports::resolve_port;

/// A `zone security NAME` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityZone {
    pub name: String,
    pub description: Option<String>,
    /// Interfaces that declared `zone-member security NAME`, in order.
    pub interfaces: Vec<String>,
}

impl SecurityZone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            interfaces: Vec::new(),
        }
    }
}

/// An `interface NAME` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interface {
    pub name: String,
    pub zone: Option<String>,
    pub ip_address: Option<String>,
    pub subnet_mask: Option<String>,
    /// ACL names applied with `ip access-group NAME in|out`.
    pub access_groups: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    Network,
    Service,
    /// Protocol, ICMP-type and other group flavours; recorded without members.
    Other,
}

impl GroupKind {
    pub fn from_token(token: &str) -> Self {
        match token {
            "network" => Self::Network,
            "service" => Self::Service,
            _ => Self::Other,
        }
    }
}

/// Transport protocol qualifier of a service object-group entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceProtocol {
    Tcp,
    Udp,
    TcpUdp,
}

impl ServiceProtocol {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "tcp" => Some(Self::Tcp),
            "udp" => Some(Self::Udp),
            "tcp-udp" => Some(Self::TcpUdp),
            _ => None,
        }
    }

    pub fn includes_tcp(self) -> bool {
        matches!(self, Self::Tcp | Self::TcpUdp)
    }

    pub fn includes_udp(self) -> bool {
        matches!(self, Self::Udp | Self::TcpUdp)
    }
}

/// A port as written in the configuration.
///
/// Well-known service names are resolved at parse time; anything that is
/// neither numeric nor in the table stays a `Name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(u16),
    Name(String),
}

impl PortValue {
    pub fn parse(token: &str) -> Self {
        match resolve_port(token) {
            Some(port) => Self::Number(port),
            None => Self::Name(token.to_string()),
        }
    }

    pub fn number(&self) -> Option<u16> {
        match self {
            Self::Number(port) => Some(*port),
            Self::Name(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Member {
    Host {
        address: String,
    },
    Network {
        address: String,
        mask: String,
    },
    Range {
        start: String,
        end: String,
    },
    Port {
        protocol: ServiceProtocol,
        port: PortValue,
    },
    PortRange {
        protocol: ServiceProtocol,
        start: PortValue,
        end: PortValue,
    },
    GroupRef {
        name: String,
    },
}

/// An `object-group network|service NAME` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectGroup {
    pub name: String,
    pub kind: GroupKind,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Allow,
    Deny,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        }
    }
}

/// Protocol keyword of an ACL line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Ip,
    Tcp,
    Udp,
    Icmp,
}

impl Protocol {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "ip" => Some(Self::Ip),
            "tcp" => Some(Self::Tcp),
            "udp" => Some(Self::Udp),
            "icmp" => Some(Self::Icmp),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Ip => "ip",
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Icmp => "icmp",
        }
    }

    /// IANA protocol number; `ip` is 0 and means any protocol.
    pub fn id(self) -> u8 {
        match self {
            Self::Ip => 0,
            Self::Tcp => 6,
            Self::Udp => 17,
            Self::Icmp => 1,
        }
    }

    pub fn is_any(self) -> bool {
        self == Self::Ip
    }
}

/// One side of an ACL rule. Exactly one of literal, group or any holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AclEndpoint {
    Any,
    Host(String),
    Group(String),
}

impl AclEndpoint {
    pub fn group(&self) -> Option<&str> {
        match self {
            Self::Group(name) => Some(name),
            _ => None,
        }
    }

    pub fn host(&self) -> Option<&str> {
        match self {
            Self::Host(ip) => Some(ip),
            _ => None,
        }
    }
}

/// Literal destination port qualifier of an ACL line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PortSpec {
    Eq { port: String },
    Range { start: String, end: String },
}

impl PortSpec {
    /// Human-readable form used in generated rule names.
    pub fn label(&self) -> String {
        match self {
            Self::Eq { port } => port.clone(),
            Self::Range { start, end } => format!("{start}-{end}"),
        }
    }
}

/// A recognized `permit|deny` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AclRule {
    pub action: Action,
    pub protocol: Protocol,
    /// Service object-group carrying the destination ports, if any.
    pub service: Option<String>,
    pub source: AclEndpoint,
    pub destination: AclEndpoint,
    pub port: Option<PortSpec>,
    pub line: usize,
}

/// A line the parser saw but could not model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unparsed {
    pub line: usize,
    pub text: String,
    pub reason: String,
}

/// Outcome of parsing one ACL entry line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AclLine {
    Rule(AclRule),
    Unparsed(Unparsed),
}

/// An `ip access-list extended NAME` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acl {
    pub name: String,
    pub rules: Vec<AclRule>,
}

/// A `class-map type inspect match-any NAME` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassMap {
    pub name: String,
    pub acl_refs: Vec<String>,
    pub group_refs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "parameter", rename_all = "lowercase")]
pub enum PolicyAction {
    Inspect(Option<String>),
    Drop,
    Pass,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyClass {
    pub class_name: String,
    pub actions: Vec<PolicyAction>,
}

impl PolicyClass {
    pub fn is_class_default(&self) -> bool {
        self.class_name == "class-default"
    }
}

/// A `policy-map type inspect NAME` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyMap {
    pub name: String,
    pub classes: Vec<PolicyClass>,
}

/// A `zone-pair security NAME source S destination D` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZonePair {
    pub name: String,
    pub source_zone: String,
    pub destination_zone: String,
    pub policy_map: Option<String>,
    pub line: usize,
}

/// Everything the section parsers extracted from one configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedConfig {
    #[serde(skip)]
    pub lines: Vec<ConfigLine>,
    pub zones: Vec<SecurityZone>,
    pub interfaces: Vec<Interface>,
    pub object_groups: Vec<ObjectGroup>,
    pub acls: Vec<Acl>,
    pub class_maps: Vec<ClassMap>,
    pub policy_maps: Vec<PolicyMap>,
    pub zone_pairs: Vec<ZonePair>,
    pub unparsed: Vec<Unparsed>,
}

impl ParsedConfig {
    pub fn zone(&self, name: &str) -> Option<&SecurityZone> {
        self.zones.iter().find(|z| z.name == name)
    }

    pub fn object_group(&self, name: &str) -> Option<&ObjectGroup> {
        self.object_groups.iter().find(|g| g.name == name)
    }

    pub fn acl(&self, name: &str) -> Option<&Acl> {
        self.acls.iter().find(|a| a.name == name)
    }

    pub fn class_map(&self, name: &str) -> Option<&ClassMap> {
        self.class_maps.iter().find(|c| c.name == name)
    }

    /// Whether `name` is a service object-group.
    pub fn is_service_group(&self, name: &str) -> bool {
        self.object_group(name)
            .is_some_and(|g| g.kind == GroupKind::Service)
    }
}

/// Insert `item` or replace the existing entry with the same name in place.
///
/// A repeated block header redefines the entity but keeps its original position.
pub(crate) fn upsert<T>(items: &mut Vec<T>, item: T, name_of: impl Fn(&T) -> &str) {
    let name = name_of(&item).to_string();
    match items.iter().position(|existing| name_of(existing) == name) {
        Some(idx) => items[idx] = item,
        None => items.push(item),
    }
}
