//! ACL rule to filter rule translation.
//!
//! One [`AclRule`] becomes one filter rule, or one rule per protocol when it
//! references a service group holding both TCP and UDP ports. Group
//! identities come from the read-only [`IdentityTable`]; literal addresses and
//! ports go through the mutable [`LiteralIdentities`] accumulator.

use ios_config_core::{has_service_prefix, AclEndpoint, AclRule, GroupKind, ParsedConfig};

use crate::diagnostics::Diagnostics;
use crate::identity::{split_key, IdentityTable, LiteralIdentities, Transport};
use crate::ids::IdGenerator;
use crate::schema::{FilterRule, RuleMatch};

/// Where a rule is being translated.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleContext<'a> {
    /// ACL the rule came from; drives the rule name.
    pub acl_name: Option<&'a str>,
    /// Destination zone, used in fallback names.
    pub destination_zone: Option<&'a str>,
    /// Position of the first produced rule within its policy.
    pub base_index: u32,
    /// Rule number to suffix onto the name of a multi-rule ACL.
    pub index: Option<u32>,
}

pub struct Translator<'a> {
    pub config: &'a ParsedConfig,
    pub table: &'a IdentityTable,
    pub literals: &'a mut LiteralIdentities,
    pub ids: &'a mut IdGenerator,
    pub diagnostics: &'a mut Diagnostics,
}

impl Translator<'_> {
    pub fn translate(&mut self, rule: &AclRule, ctx: &RuleContext<'_>) -> Vec<FilterRule> {
        let src_ip = self.address_side(&rule.source, "source");
        let dst_service = rule.destination.group().filter(|g| self.is_service_reference(g));
        let dst_ip = if dst_service.is_some() {
            Vec::new()
        } else {
            self.address_side(&rule.destination, "destination")
        };

        let service = match (rule.service.as_deref(), dst_service) {
            (Some(service), Some(extra)) => {
                self.diagnostics.record(
                    "ignored_service",
                    format!("line {}: destination service group {extra} ignored, {service} already applies", rule.line),
                );
                Some(service)
            }
            (service, extra) => service.or(extra),
        };

        let literal_ports: Vec<String> = rule
            .port
            .as_ref()
            .and_then(|spec| {
                self.literals
                    .port_identity(spec, self.config, self.table, self.ids, self.diagnostics)
            })
            .into_iter()
            .collect();

        let base_name = rule_name(rule, ctx, self.config);
        let src = RuleMatch {
            ip: src_ip.into(),
            port: Vec::new().into(),
        };
        let make = |name: String, priority: u32, protocols: Vec<u8>, ports: Vec<String>| {
            FilterRule::matching(
                rule.action,
                name,
                priority,
                protocols.into(),
                src.clone(),
                RuleMatch {
                    ip: dst_ip.clone().into(),
                    port: ports.into(),
                },
            )
        };

        let Some(service) = service else {
            let protocols = if rule.protocol.is_any() {
                Vec::new()
            } else {
                vec![rule.protocol.id()]
            };
            return vec![make(base_name, priority(ctx.base_index), protocols, literal_ports)];
        };

        if self.config.object_group(service).is_none() {
            self.diagnostics.record(
                "unknown_group",
                format!("line {}: service group {service} is not defined", rule.line),
            );
        }

        let protocols = self.table.protocols_for(service);
        if protocols.is_mixed() {
            return [Transport::Tcp, Transport::Udp]
                .into_iter()
                .zip(0u32..)
                .map(|(transport, offset)| {
                    let mut ports: Vec<String> = self
                        .table
                        .group_identity(&split_key(service, transport))
                        .map(str::to_string)
                        .into_iter()
                        .collect();
                    ports.extend(literal_ports.iter().cloned());
                    make(
                        format!("{base_name}-{}", transport.suffix()),
                        priority(ctx.base_index.saturating_add(offset)),
                        vec![transport.id()],
                        ports,
                    )
                })
                .collect();
        }

        let transport = if protocols.tcp { Transport::Tcp } else { Transport::Udp };
        let mut ports: Vec<String> = self
            .table
            .group_identity(service)
            .map(str::to_string)
            .into_iter()
            .collect();
        ports.extend(literal_ports);
        vec![make(base_name, priority(ctx.base_index), vec![transport.id()], ports)]
    }

    /// Declared groups are services by kind; undeclared names by prefix.
    fn is_service_reference(&self, group: &str) -> bool {
        match self.config.object_group(group) {
            Some(declared) => declared.kind == GroupKind::Service,
            None => has_service_prefix(group),
        }
    }

    fn address_side(&mut self, endpoint: &AclEndpoint, side: &str) -> Vec<String> {
        match endpoint {
            AclEndpoint::Any => Vec::new(),
            AclEndpoint::Host(address) => self
                .literals
                .ip_identity(address, self.ids, self.diagnostics)
                .into_iter()
                .collect(),
            AclEndpoint::Group(name) => {
                if self.config.is_service_group(name) {
                    self.diagnostics.record(
                        "ignored_service",
                        format!("service group {name} cannot be used as a {side} address"),
                    );
                    return Vec::new();
                }
                match self.table.group_identity(name) {
                    Some(id) => vec![id.to_string()],
                    None => {
                        self.diagnostics.record(
                            "unknown_group",
                            format!("{side} group {name} has no address identity"),
                        );
                        Vec::new()
                    }
                }
            }
        }
    }
}

/// Position of the next rule in a policy holding `len` rules.
pub fn rule_position(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Rule priority for a position; positions are spaced by ten.
pub fn priority(position: u32) -> u32 {
    position.saturating_mul(10)
}

/// Clean an ACL name for use as a rule name.
pub fn clean_acl_name(name: &str) -> String {
    name.replace("ACL_", "").replace("ACL-", "").replace('_', "-")
}

fn rule_name(rule: &AclRule, ctx: &RuleContext<'_>, config: &ParsedConfig) -> String {
    if let Some(acl_name) = ctx.acl_name {
        let clean = clean_acl_name(acl_name);
        let rule_count = config.acl(acl_name).map_or(0, |acl| acl.rules.len());
        return match ctx.index {
            Some(index) if rule_count > 1 => format!("{clean}-{}", index + 1),
            _ => clean,
        };
    }

    let zone = ctx.destination_zone.unwrap_or("ANY");
    let service = if let Some(port) = &rule.port {
        port.label()
    } else if let Some(group) = rule.destination.group() {
        normalize_group_name(group)
    } else if let Some(host) = rule.destination.host() {
        normalize_group_name(&host.replace('.', "-"))
    } else if !rule.protocol.is_any() {
        rule.protocol.name().to_uppercase()
    } else {
        "ANY".to_string()
    };
    format!("{zone} {service}")
}

/// Strip group keywords and address prefixes for a readable label.
pub fn normalize_group_name(name: &str) -> String {
    let mut out = name.replace("object-group", "").replace("service-group", "");
    for prefix in ["NET-", "HOSTG-", "HOST-", "NETG-"] {
        out = out.replace(prefix, "");
    }
    let out = out.trim();
    if out.is_empty() {
        "GROUP".to_string()
    } else {
        out.to_uppercase()
    }
}
