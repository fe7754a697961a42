use tracing::debug;

use crate::lines::ConfigLine;
use crate::model::{upsert, GroupKind, Member, ObjectGroup, PortValue, ServiceProtocol};

use super::{is_separator, is_top_level};

/// Collect `object-group network|service NAME` blocks.
pub(crate) fn parse_object_groups(lines: &[ConfigLine]) -> Vec<ObjectGroup> {
    let mut groups = Vec::new();
    let mut current: Option<ObjectGroup> = None;

    for line in lines {
        let tokens = line.tokens();
        if let ["object-group", kind, name, ..] = tokens.as_slice() {
            if line.indent == 0 {
                flush(&mut groups, current.take());
                current = Some(ObjectGroup {
                    name: (*name).to_string(),
                    kind: GroupKind::from_token(kind),
                    members: Vec::new(),
                });
                continue;
            }
        }
        let Some(group) = current.as_mut() else {
            continue;
        };
        if is_separator(line) {
            flush(&mut groups, current.take());
            continue;
        }

        let member = match group.kind {
            GroupKind::Network => network_member(&tokens, line),
            GroupKind::Service => service_member(&tokens),
            GroupKind::Other => None,
        };
        match member {
            Some(member) => group.members.push(member),
            None if is_top_level(line) => flush(&mut groups, current.take()),
            None => debug!(line = line.number, text = %line.text, "ignored object-group entry"),
        }
    }
    flush(&mut groups, current);

    groups
}

fn flush(groups: &mut Vec<ObjectGroup>, group: Option<ObjectGroup>) {
    if let Some(group) = group {
        upsert(groups, group, |g| g.name.as_str());
    }
}

fn network_member(tokens: &[&str], line: &ConfigLine) -> Option<Member> {
    match tokens {
        ["description", ..] => None,
        ["host", address, ..] => Some(Member::Host {
            address: (*address).to_string(),
        }),
        ["network", address, mask, ..] => Some(Member::Network {
            address: (*address).to_string(),
            mask: (*mask).to_string(),
        }),
        ["range", start, end, ..] => Some(Member::Range {
            start: (*start).to_string(),
            end: (*end).to_string(),
        }),
        ["group-object", name, ..] => Some(Member::GroupRef {
            name: (*name).to_string(),
        }),
        _ if is_top_level(line) => None,
        [address, mask, ..] => Some(Member::Network {
            address: (*address).to_string(),
            mask: (*mask).to_string(),
        }),
        [address] => Some(Member::Host {
            address: (*address).to_string(),
        }),
        [] => None,
    }
}

fn service_member(tokens: &[&str]) -> Option<Member> {
    match tokens {
        ["group-object" | "object-group", name, ..] => Some(Member::GroupRef {
            name: (*name).to_string(),
        }),
        [proto, "eq", port, ..] => Some(Member::Port {
            protocol: ServiceProtocol::from_token(proto)?,
            port: PortValue::parse(port),
        }),
        [proto, "range", start, end, ..] => Some(Member::PortRange {
            protocol: ServiceProtocol::from_token(proto)?,
            start: PortValue::parse(start),
            end: PortValue::parse(end),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_object_groups;
    use crate::lines::classify;
    use crate::model::{GroupKind, Member, PortValue, ServiceProtocol};

    #[test]
    fn network_members_cover_every_form() {
        let lines = classify(
            "object-group network NET-SERVERS\n description app tier\n host 10.0.0.5\n network 10.1.0.0 255.255.0.0\n range 10.2.0.1 10.2.0.9\n 10.3.0.0 255.255.255.0\n 10.4.0.1\n group-object NET-OTHER\n",
        );
        let groups = parse_object_groups(&lines);
        assert_eq!(groups.len(), 1);
        let members = &groups[0].members;
        assert_eq!(members.len(), 6);
        assert_eq!(
            members[0],
            Member::Host {
                address: "10.0.0.5".to_string()
            }
        );
        assert!(matches!(&members[3], Member::Network { address, .. } if address == "10.3.0.0"));
        assert!(matches!(&members[4], Member::Host { address } if address == "10.4.0.1"));
        assert!(matches!(&members[5], Member::GroupRef { name } if name == "NET-OTHER"));
    }

    #[test]
    fn service_members_keep_their_protocol() {
        let lines = classify(
            "object-group service SVC-WEB\n tcp eq www\n udp eq 53\n tcp-udp range 5000 5010\n icmp echo\n group-object SVC-MAIL\n",
        );
        let groups = parse_object_groups(&lines);
        let members = &groups[0].members;
        assert_eq!(groups[0].kind, GroupKind::Service);
        assert_eq!(members.len(), 4);
        assert_eq!(
            members[0],
            Member::Port {
                protocol: ServiceProtocol::Tcp,
                port: PortValue::Number(80)
            }
        );
        assert!(matches!(
            &members[2],
            Member::PortRange { protocol: ServiceProtocol::TcpUdp, start: PortValue::Number(5000), .. }
        ));
    }

    #[test]
    fn unindented_directive_ends_the_group() {
        let lines = classify("object-group network NET-A\n host 10.0.0.1\nip route 0.0.0.0 0.0.0.0 1.1.1.1\n");
        let groups = parse_object_groups(&lines);
        assert_eq!(groups[0].members.len(), 1);
    }

    #[test]
    fn other_group_kinds_are_kept_empty() {
        let lines = classify("object-group protocol PROTOS\n tcp\n udp\n");
        let groups = parse_object_groups(&lines);
        assert_eq!(groups[0].kind, GroupKind::Other);
        assert!(groups[0].members.is_empty());
    }

    #[test]
    fn redefinition_replaces_in_place() {
        let lines = classify(
            "object-group network A\n host 1.1.1.1\n!\nobject-group network B\n host 2.2.2.2\n!\nobject-group network A\n host 3.3.3.3\n",
        );
        let groups = parse_object_groups(&lines);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "A");
        assert!(matches!(&groups[0].members[0], Member::Host { address } if address == "3.3.3.3"));
    }
}
