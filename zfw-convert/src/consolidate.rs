//! Merge rules of one policy that differ only in their destination addresses.

use std::collections::HashMap;

use indexmap::IndexMap;
use ios_config_core::Action;

use crate::schema::{FilterRule, RuleMatch};

/// Everything but the destination address set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    action: Action,
    protocols: Vec<u8>,
    dst_ports: Vec<String>,
    src_ports: Vec<String>,
    src_ips: Vec<String>,
    has_dst: bool,
}

impl GroupKey {
    fn of(rule: &FilterRule) -> Self {
        Self {
            action: rule.action,
            protocols: sorted(rule.protocols.iter().copied()),
            dst_ports: sorted(rule.dst_port().iter().cloned()),
            src_ports: sorted(rule.src_port().iter().cloned()),
            src_ips: sorted(rule.src_ip().iter().cloned()),
            has_dst: rule.dst.is_some(),
        }
    }
}

fn sorted<T: Ord>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut out: Vec<T> = items.collect();
    out.sort();
    out.dedup();
    out
}

/// Group, merge and de-duplicate rule names.
///
/// Groups keep the order of their first member. A merged rule is a copy of
/// its first member with the union of every member's references.
pub fn consolidate(rules: Vec<FilterRule>) -> Vec<FilterRule> {
    let mut groups: IndexMap<GroupKey, Vec<FilterRule>> = IndexMap::new();
    for rule in rules {
        groups.entry(GroupKey::of(&rule)).or_default().push(rule);
    }

    let merged: Vec<FilterRule> = groups.into_values().filter_map(merge).collect();
    dedupe_names(merged)
}

fn merge(members: Vec<FilterRule>) -> Option<FilterRule> {
    let mut members = members.into_iter();
    let mut merged = members.next()?;
    for rule in members {
        union_side(merged.src.addresses.as_mut(), rule.src.addresses.as_ref(), false);
        union_side(merged.dst.as_mut(), rule.dst.as_ref(), true);
    }
    Some(merged)
}

/// Union `other` into `into`. An empty destination address list means any,
/// and any absorbs every specific address.
fn union_side(into: Option<&mut RuleMatch>, other: Option<&RuleMatch>, any_absorbs: bool) {
    let (Some(into), Some(other)) = (into, other) else {
        return;
    };
    if any_absorbs && (into.ip.is_empty() || other.ip.is_empty()) {
        into.ip.0.clear();
    } else {
        union_refs(&mut into.ip.0, &other.ip.0);
    }
    union_refs(&mut into.port.0, &other.port.0);
}

fn union_refs(into: &mut Vec<String>, other: &[String]) {
    for id in other {
        if !into.contains(id) {
            into.push(id.clone());
        }
    }
}

/// Suffix `-<position>` onto names shared by more than one rule.
fn dedupe_names(mut rules: Vec<FilterRule>) -> Vec<FilterRule> {
    let mut totals: HashMap<String, usize> = HashMap::new();
    for rule in &rules {
        *totals.entry(rule.name.clone()).or_default() += 1;
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    for rule in &mut rules {
        if totals.get(&rule.name).copied().unwrap_or(0) < 2 {
            continue;
        }
        let position = seen.entry(rule.name.clone()).or_default();
        *position += 1;
        rule.name = format!("{}-{position}", rule.name);
    }
    rules
}
