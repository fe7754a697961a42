use std::collections::HashMap;

use ios_config_core::ports::resolve_port;
use ios_config_core::{ParsedConfig, PortSpec};

use super::{is_valid_address, IdentityTable};
use crate::diagnostics::Diagnostics;
use crate::ids::IdGenerator;
use crate::schema::{AddressMember, IpIdentity, PortIdentity, PortMember};

/// Memoized `IP-a-b-c-d` and `PORT-n` identities created while translating rules.
#[derive(Debug, Clone, Default)]
pub struct LiteralIdentities {
    ip: Vec<IpIdentity>,
    port: Vec<PortIdentity>,
    by_name: HashMap<String, String>,
}

impl LiteralIdentities {
    /// Identity for a literal host address, or `None` when it is not an IP.
    pub fn ip_identity(
        &mut self,
        address: &str,
        ids: &mut IdGenerator,
        diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        if !is_valid_address(address) {
            diagnostics.record("invalid_address", format!("skipping invalid host address {address}"));
            return None;
        }
        let name = format!("IP-{}", address.replace('.', "-"));
        if let Some(id) = self.by_name.get(&name) {
            return Some(id.clone());
        }

        let id = ids.next("ip_identity", &name);
        self.by_name.insert(name.clone(), id.clone());
        self.ip.push(IpIdentity {
            id: id.clone(),
            name,
            friendly_name: String::new(),
            members: vec![AddressMember {
                address: address.to_string(),
            }],
        });
        Some(id)
    }

    /// Identity for a literal destination port qualifier.
    ///
    /// A token naming a service group resolves to that group's identity.
    pub fn port_identity(
        &mut self,
        spec: &PortSpec,
        config: &ParsedConfig,
        table: &IdentityTable,
        ids: &mut IdGenerator,
        diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        match spec {
            PortSpec::Eq { port } if config.is_service_group(port) => {
                let id = table.group_identity(port).map(str::to_string);
                if id.is_none() {
                    diagnostics.record("unknown_port", format!("service group {port} has no usable ports"));
                }
                id
            }
            PortSpec::Eq { port } => match resolve_port(port) {
                Some(n) => Some(self.port_entry(ids, format!("PORT-{n}"), PortMember { start: n, end: n })),
                None => {
                    diagnostics.record("unknown_port", format!("skipping unknown port {port}"));
                    None
                }
            },
            PortSpec::Range { start, end } => match (resolve_port(start), resolve_port(end)) {
                (Some(a), Some(b)) => Some(self.port_entry(ids, format!("PORT-{a}-{b}"), PortMember { start: a, end: b })),
                _ => {
                    diagnostics.record("unknown_port", format!("skipping unknown port range {start} {end}"));
                    None
                }
            },
        }
    }

    fn port_entry(&mut self, ids: &mut IdGenerator, name: String, member: PortMember) -> String {
        if let Some(id) = self.by_name.get(&name) {
            return id.clone();
        }
        let id = ids.next("port_identity", &name);
        self.by_name.insert(name.clone(), id.clone());
        self.port.push(PortIdentity {
            id: id.clone(),
            name,
            members: vec![member],
        });
        id
    }

    pub fn ip_identities(&self) -> &[IpIdentity] {
        &self.ip
    }

    pub fn port_identities(&self) -> &[PortIdentity] {
        &self.port
    }
}
