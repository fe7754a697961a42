use tracing::warn;

use crate::lines::ConfigLine;
use crate::model::{Interface, SecurityZone};

use super::{header_value, is_separator, is_top_level};

/// Collect interface blocks and record zone membership on both sides.
///
/// A `zone-member security Z` line sets the interface's zone and appends the
/// interface to zone `Z`'s member list once. Membership in an undeclared zone
/// is kept on the interface only. A repeated `interface` header reopens the
/// existing entry.
pub(crate) fn parse_interfaces(
    lines: &[ConfigLine],
    zones: &mut [SecurityZone],
) -> Vec<Interface> {
    let mut interfaces: Vec<Interface> = Vec::new();
    let mut current: Option<usize> = None;

    for line in lines {
        if let Some(name) = header_value(&line.text, "interface ") {
            current = match interfaces.iter().position(|iface| iface.name == name) {
                Some(idx) => Some(idx),
                None => {
                    interfaces.push(Interface {
                        name: name.to_string(),
                        zone: None,
                        ip_address: None,
                        subnet_mask: None,
                        access_groups: Vec::new(),
                    });
                    Some(interfaces.len() - 1)
                }
            };
            continue;
        }
        let Some(idx) = current else {
            continue;
        };
        if is_separator(line) {
            current = None;
            continue;
        }

        let iface = &mut interfaces[idx];
        let tokens = line.tokens();
        match tokens.as_slice() {
            ["zone-member", "security", zone_name, ..] => {
                iface.zone = Some((*zone_name).to_string());
                match zones.iter_mut().find(|z| z.name == *zone_name) {
                    Some(zone) => {
                        if !zone.interfaces.contains(&iface.name) {
                            zone.interfaces.push(iface.name.clone());
                        }
                    }
                    None => warn!(
                        interface = %iface.name,
                        zone = %zone_name,
                        "interface joins undeclared zone"
                    ),
                }
            }
            ["ip", "address", address, rest @ ..] => {
                iface.ip_address = Some((*address).to_string());
                iface.subnet_mask = rest.first().map(|m| (*m).to_string());
            }
            ["ip", "access-group", acl, ..] => {
                if !iface.access_groups.iter().any(|existing| existing == acl) {
                    iface.access_groups.push((*acl).to_string());
                }
            }
            _ if is_top_level(line) => current = None,
            _ => {}
        }
    }

    interfaces
}

#[cfg(test)]
mod tests {
    use super::parse_interfaces;
    use crate::lines::classify;
    use crate::model::SecurityZone;

    #[test]
    fn zone_membership_is_recorded_on_interface_and_zone() {
        let lines = classify(
            "interface GigabitEthernet0/0\n ip address 10.1.1.1 255.255.255.0\n ip access-group ACL-IN in\n zone-member security LAN\n!\ninterface Gi0/1\n zone-member security DMZ\n",
        );
        let mut zones = vec![SecurityZone::new("LAN")];
        let interfaces = parse_interfaces(&lines, &mut zones);

        assert_eq!(interfaces.len(), 2);
        assert_eq!(interfaces[0].zone.as_deref(), Some("LAN"));
        assert_eq!(interfaces[0].ip_address.as_deref(), Some("10.1.1.1"));
        assert_eq!(interfaces[0].subnet_mask.as_deref(), Some("255.255.255.0"));
        assert_eq!(interfaces[0].access_groups, vec!["ACL-IN".to_string()]);
        assert_eq!(zones[0].interfaces, vec!["GigabitEthernet0/0".to_string()]);
        assert_eq!(interfaces[1].zone.as_deref(), Some("DMZ"));
    }

    #[test]
    fn top_level_directive_closes_the_interface() {
        let lines = classify("interface Gi0/0\nhostname r1\n zone-member security LAN\n");
        let mut zones = vec![SecurityZone::new("LAN")];
        let interfaces = parse_interfaces(&lines, &mut zones);
        assert_eq!(interfaces[0].zone, None);
        assert!(zones[0].interfaces.is_empty());
    }

    #[test]
    fn redeclared_interface_is_listed_once() {
        let lines = classify(
            "zone security LAN\n!\ninterface Gi0/2\n zone-member security LAN\n!\ninterface Gi0/2\n ip address 10.2.2.1 255.255.255.0\n zone-member security LAN\n",
        );
        let mut zones = vec![SecurityZone::new("LAN")];
        let interfaces = parse_interfaces(&lines, &mut zones);

        assert_eq!(interfaces.len(), 1);
        assert_eq!(interfaces[0].ip_address.as_deref(), Some("10.2.2.1"));
        assert_eq!(zones[0].interfaces, vec!["Gi0/2".to_string()]);
    }
}
