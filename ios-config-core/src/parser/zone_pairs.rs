//! Zone pairs and their inspect service policies.
//!
//! `service-policy type inspect PM` lines are not tied to a block state.
//! Pairs and policies are collected with their line numbers first, then
//! every policy binds to the nearest zone pair declared above it.

use tracing::warn;

use crate::lines::ConfigLine;
use crate::model::{upsert, Unparsed, ZonePair};

pub(crate) fn parse_zone_pairs(lines: &[ConfigLine]) -> (Vec<ZonePair>, Vec<Unparsed>) {
    let mut pairs: Vec<ZonePair> = Vec::new();
    let mut policies: Vec<(&ConfigLine, String)> = Vec::new();
    let mut unparsed = Vec::new();

    for line in lines {
        let tokens = line.tokens();
        match tokens.as_slice() {
            ["zone-pair", "security", name, rest @ ..] => match endpoints(rest) {
                Some((source_zone, destination_zone)) => upsert(
                    &mut pairs,
                    ZonePair {
                        name: (*name).to_string(),
                        source_zone,
                        destination_zone,
                        policy_map: None,
                        line: line.number,
                    },
                    |p| p.name.as_str(),
                ),
                None => unparsed.push(Unparsed {
                    line: line.number,
                    text: line.text.clone(),
                    reason: "zone-pair without source and destination".to_string(),
                }),
            },
            ["service-policy", "type", "inspect", policy_map, ..] => {
                policies.push((line, (*policy_map).to_string()));
            }
            _ => {}
        }
    }

    for (line, policy_map) in policies {
        let owner = pairs
            .iter_mut()
            .filter(|pair| pair.line < line.number)
            .max_by_key(|pair| pair.line);
        match owner {
            Some(pair) => pair.policy_map = Some(policy_map),
            None => {
                warn!(line = line.number, policy_map = %policy_map, "service-policy without a preceding zone-pair");
                unparsed.push(Unparsed {
                    line: line.number,
                    text: line.text.clone(),
                    reason: "service-policy without a preceding zone-pair".to_string(),
                });
            }
        }
    }

    (pairs, unparsed)
}

fn endpoints(tokens: &[&str]) -> Option<(String, String)> {
    let after = |keyword: &str| {
        tokens
            .windows(2)
            .find(|pair| pair[0] == keyword)
            .map(|pair| pair[1].to_string())
    };
    Some((after("source")?, after("destination")?))
}

#[cfg(test)]
mod tests {
    use super::parse_zone_pairs;
    use crate::lines::classify;

    #[test]
    fn service_policy_binds_to_the_nearest_preceding_pair() {
        let lines = classify(
            "zone-pair security IN-OUT source LAN destination WAN\n service-policy type inspect PM-IN-OUT\nzone-pair security DMZ-OUT source DMZ destination WAN\n!\nzone-pair security OUT-IN source WAN destination LAN\n service-policy type inspect PM-OUT-IN\n",
        );
        let (pairs, unparsed) = parse_zone_pairs(&lines);
        assert!(unparsed.is_empty());
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].policy_map.as_deref(), Some("PM-IN-OUT"));
        assert_eq!(pairs[1].policy_map, None);
        assert_eq!(pairs[2].source_zone, "WAN");
        assert_eq!(pairs[2].policy_map.as_deref(), Some("PM-OUT-IN"));
    }

    #[test]
    fn orphan_service_policy_is_reported() {
        let lines = classify(
            " service-policy type inspect PM-LOST\nzone-pair security A-B source A destination B\n",
        );
        let (pairs, unparsed) = parse_zone_pairs(&lines);
        assert_eq!(pairs[0].policy_map, None);
        assert_eq!(unparsed.len(), 1);
        assert_eq!(unparsed[0].line, 1);
    }

    #[test]
    fn incomplete_pair_is_reported() {
        let lines = classify("zone-pair security BROKEN source LAN\n");
        let (pairs, unparsed) = parse_zone_pairs(&lines);
        assert!(pairs.is_empty());
        assert_eq!(unparsed[0].reason, "zone-pair without source and destination");
    }
}
