//! Filter policy assembly.
//!
//! Two passes build the policy list: standalone ACLs that are applied
//! somewhere but never referenced by a class map, then one policy per inspect
//! policy map. When neither pass yields anything the pair of default
//! allow/deny policies is created instead.

use ios_config_core::{Action, ParsedConfig, PolicyAction, PolicyMap};
use tracing::debug;

use crate::consolidate::consolidate;
use crate::diagnostics::Diagnostics;
use crate::identity::{split_key, IdentityTable, LiteralIdentities, Transport};
use crate::ids::IdGenerator;
use crate::schema::{FilterPolicy, FilterRule, PolicyRules, ProtocolRefs, RuleMatch};
use crate::translate::{priority, rule_position, RuleContext, Translator};

pub const DEFAULT_ALLOW_ALL: &str = "Default Allow All";
pub const DEFAULT_DENY_ALL: &str = "Default Deny All";
pub const ALLOW_ALL: &str = "ALLOW ALL";

/// Zone assumed for policy maps that no zone pair binds.
const FALLBACK_ZONE: &str = "WAN";

/// Whether a policy name is one of the allow-all policies.
pub fn is_allow_all(name: &str) -> bool {
    name == ALLOW_ALL || name == DEFAULT_ALLOW_ALL
}

pub struct PolicyBuilder<'a> {
    pub config: &'a ParsedConfig,
    pub table: &'a IdentityTable,
    pub literals: &'a mut LiteralIdentities,
    pub ids: &'a mut IdGenerator,
    pub diagnostics: &'a mut Diagnostics,
    /// Synthetic rules carry protocol 6 and object-group rules always match on address.
    pub legacy_tcp_only: bool,
}

impl PolicyBuilder<'_> {
    pub fn build(mut self) -> Vec<FilterPolicy> {
        let config = self.config;
        let mut policies = self.orphan_acl_policies();
        for policy_map in &config.policy_maps {
            policies.push(self.policy_map_policy(policy_map));
        }
        if policies.is_empty() {
            debug!("no policies found, creating default allow and deny policies");
            policies = default_policies(self.ids, self.legacy_tcp_only);
        }
        policies
    }

    fn translator(&mut self) -> Translator<'_> {
        Translator {
            config: self.config,
            table: self.table,
            literals: &mut *self.literals,
            ids: &mut *self.ids,
            diagnostics: &mut *self.diagnostics,
        }
    }

    fn orphan_acl_policies(&mut self) -> Vec<FilterPolicy> {
        let config = self.config;
        let mut policies = Vec::new();
        for acl in &config.acls {
            let in_class_map = config
                .class_maps
                .iter()
                .any(|cm| cm.acl_refs.contains(&acl.name));
            if in_class_map || !is_acl_applied(config, &acl.name) {
                continue;
            }

            let mut rules = Vec::new();
            for rule in &acl.rules {
                let ctx = RuleContext {
                    acl_name: Some(&acl.name),
                    destination_zone: None,
                    base_index: rule_position(rules.len()),
                    index: None,
                };
                let translated = self.translator().translate(rule, &ctx);
                rules.extend(translated);
            }
            if rules.is_empty() {
                continue;
            }
            debug!(acl = %acl.name, rules = rules.len(), "standalone ACL policy");
            policies.push(FilterPolicy {
                id: self.ids.next("filter_policy", &acl.name),
                name: acl.name.clone(),
                default_action: Action::Deny,
                rules: PolicyRules(consolidate(rules)),
            });
        }
        policies
    }

    fn policy_map_policy(&mut self, policy_map: &PolicyMap) -> FilterPolicy {
        let config = self.config;
        let destination_zone = config
            .zone_pairs
            .iter()
            .find(|pair| pair.policy_map.as_deref() == Some(policy_map.name.as_str()))
            .map_or(FALLBACK_ZONE, |pair| pair.destination_zone.as_str());

        let mut rules: Vec<FilterRule> = Vec::new();
        for class in &policy_map.classes {
            if class.is_class_default() {
                continue;
            }
            match config.class_map(&class.class_name) {
                Some(class_map) => {
                    for acl_name in &class_map.acl_refs {
                        let Some(acl) = config.acl(acl_name) else {
                            self.diagnostics.record(
                                "unknown_acl",
                                format!("class-map {} references undefined ACL {acl_name}", class_map.name),
                            );
                            continue;
                        };
                        for rule in &acl.rules {
                            let ctx = RuleContext {
                                acl_name: Some(&acl.name),
                                destination_zone: Some(destination_zone),
                                base_index: rule_position(rules.len()),
                                index: None,
                            };
                            let translated = self.translator().translate(rule, &ctx);
                            rules.extend(translated);
                        }
                    }
                    for group in &class_map.group_refs {
                        let base = rule_position(rules.len());
                        rules.extend(self.object_group_rules(group, base));
                    }
                }
                None => self.diagnostics.record(
                    "unknown_class_map",
                    format!("policy-map {} references undefined class-map {}", policy_map.name, class.class_name),
                ),
            }

            if class.actions.contains(&PolicyAction::Drop) {
                rules.push(FilterRule::catch_all(
                    Action::Deny,
                    format!("DENY-{}", class.class_name),
                    priority(rule_position(rules.len())),
                    self.synthetic_protocols(),
                ));
            }
        }

        debug!(policy_map = %policy_map.name, zone = destination_zone, rules = rules.len(), "policy-map policy");
        FilterPolicy {
            id: self.ids.next("filter_policy", &policy_map.name),
            name: policy_map.name.clone(),
            default_action: Action::Deny,
            rules: PolicyRules(consolidate(rules)),
        }
    }

    /// `OBJ-<group>` rules for a class map's `match object-group` reference.
    fn object_group_rules(&mut self, group: &str, base: u32) -> Vec<FilterRule> {
        let name = format!("OBJ-{group}");
        let Some(identity) = self.table.group_identity(group).map(str::to_string) else {
            self.diagnostics.record(
                "unknown_group",
                format!("class-map object-group {group} has no identity"),
            );
            return Vec::new();
        };

        let address_rule = |name: String, priority: u32, protocols: ProtocolRefs, ip: Vec<String>, port: Vec<String>| {
            FilterRule::matching(
                Action::Allow,
                name,
                priority,
                protocols,
                RuleMatch::default(),
                RuleMatch {
                    ip: ip.into(),
                    port: port.into(),
                },
            )
        };

        if self.legacy_tcp_only || !self.config.is_service_group(group) {
            return vec![address_rule(
                name,
                priority(base),
                self.synthetic_protocols(),
                vec![identity],
                Vec::new(),
            )];
        }

        let protocols = self.table.protocols_for(group);
        if protocols.is_mixed() {
            return [Transport::Tcp, Transport::Udp]
                .into_iter()
                .zip(0u32..)
                .filter_map(|(transport, offset)| {
                    let id = self.table.group_identity(&split_key(group, transport))?;
                    Some(address_rule(
                        format!("{name}-{}", transport.suffix()),
                        priority(base.saturating_add(offset)),
                        vec![transport.id()].into(),
                        Vec::new(),
                        vec![id.to_string()],
                    ))
                })
                .collect();
        }
        let transport = if protocols.tcp { Transport::Tcp } else { Transport::Udp };
        vec![address_rule(
            name,
            priority(base),
            vec![transport.id()].into(),
            Vec::new(),
            vec![identity],
        )]
    }

    fn synthetic_protocols(&self) -> ProtocolRefs {
        synthetic_protocols(self.legacy_tcp_only)
    }
}

fn synthetic_protocols(legacy_tcp_only: bool) -> ProtocolRefs {
    if legacy_tcp_only {
        vec![Transport::Tcp.id()].into()
    } else {
        ProtocolRefs::empty()
    }
}

/// `Default Allow All` and `Default Deny All`, used when nothing else exists.
pub fn default_policies(ids: &mut IdGenerator, legacy_tcp_only: bool) -> Vec<FilterPolicy> {
    [
        (DEFAULT_ALLOW_ALL, Action::Allow, "Allow All", 10),
        (DEFAULT_DENY_ALL, Action::Deny, "Deny All", 20),
    ]
    .into_iter()
    .map(|(name, action, rule_name, priority)| FilterPolicy {
        id: ids.next("filter_policy", name),
        name: name.to_string(),
        default_action: Action::Deny,
        rules: PolicyRules(vec![FilterRule::catch_all(
            action,
            rule_name.to_string(),
            priority,
            synthetic_protocols(legacy_tcp_only),
        )]),
    })
    .collect()
}

/// Whether an ACL is applied to an interface or named on a zone-pair or
/// service-policy line. Names match whole tokens only.
pub fn is_acl_applied(config: &ParsedConfig, acl_name: &str) -> bool {
    config.lines.iter().any(|line| {
        let tokens = line.tokens();
        let applied = tokens
            .windows(2)
            .any(|pair| pair[0] == "access-group" && pair[1] == acl_name);
        let named = tokens.contains(&acl_name)
            && tokens
                .iter()
                .any(|token| *token == "service-policy" || *token == "zone-pair");
        applied || named
    })
}
