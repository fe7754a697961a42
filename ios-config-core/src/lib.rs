//! Line-oriented Cisco IOS configuration parsing for zone-based firewall sections.
//!
//! The parser is a set of independent single-pass scanners over one classified
//! line list. Each scanner recognizes one kind of block (zones, interfaces,
//! object groups, extended ACLs, inspect class maps, inspect policy maps and
//! zone pairs) and everything it does not understand is ignored.

pub mod lines;
pub mod model;
pub mod parser;
pub mod ports;

pub use lines::{classify, ConfigLine};
pub use model::{
    Acl, AclEndpoint, AclLine, AclRule, Action, ClassMap, GroupKind, Interface, Member,
    ObjectGroup, ParsedConfig, PolicyAction, PolicyClass, PolicyMap, PortSpec, PortValue,
    Protocol, SecurityZone, ServiceProtocol, Unparsed, ZonePair,
};
pub use parser::{has_service_prefix, parse, parse_acl_rule, parse_bytes, parse_file, ParseError};
