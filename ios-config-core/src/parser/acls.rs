//! Extended ACL blocks and the entry shape recognizer.
//!
//! Entries are matched against a fixed, ordered list of shapes. The first
//! shape that fits wins and must consume every token after the protocol;
//! anything left over turns the entry into an [`Unparsed`] diagnostic instead
//! of a partially understood rule.

use std::net::Ipv4Addr;

use tracing::{debug, warn};

use crate::lines::ConfigLine;
use crate::model::{upsert, Acl, AclEndpoint, AclLine, AclRule, Action, PortSpec, Protocol, Unparsed};

use super::{header_value, is_separator, is_top_level};

const SERVICE_PREFIXES: &[&str] = &["SVC-", "SVCG-"];

/// Whether a group name follows the service-group naming convention.
pub fn has_service_prefix(name: &str) -> bool {
    SERVICE_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

pub(crate) fn parse_acls(lines: &[ConfigLine]) -> (Vec<Acl>, Vec<Unparsed>) {
    let mut acls = Vec::new();
    let mut unparsed = Vec::new();
    let mut current: Option<Acl> = None;

    for line in lines {
        if line.indent == 0 {
            if let Some(name) = header_value(&line.text, "ip access-list extended ") {
                flush(&mut acls, current.take());
                current = Some(Acl {
                    name: name.to_string(),
                    rules: Vec::new(),
                });
                continue;
            }
        }
        let Some(acl) = current.as_mut() else {
            continue;
        };
        if is_separator(line) {
            flush(&mut acls, current.take());
            continue;
        }

        let tokens = line.tokens();
        match strip_sequence(&tokens).first() {
            Some(&("permit" | "deny")) => match parse_acl_rule(line.number, &line.text) {
                AclLine::Rule(rule) => acl.rules.push(rule),
                AclLine::Unparsed(entry) => {
                    warn!(acl = %acl.name, line = entry.line, reason = %entry.reason, "unrecognized ACL entry");
                    unparsed.push(entry);
                }
            },
            Some(&"remark") => {}
            _ if is_top_level(line) => flush(&mut acls, current.take()),
            _ => debug!(line = line.number, text = %line.text, "ignored ACL sub-command"),
        }
    }
    flush(&mut acls, current);

    (acls, unparsed)
}

fn flush(acls: &mut Vec<Acl>, acl: Option<Acl>) {
    if let Some(acl) = acl {
        upsert(acls, acl, |a| a.name.as_str());
    }
}

/// Drop a leading sequence number (`10 permit ...`).
fn strip_sequence<'a, 'b>(tokens: &'a [&'b str]) -> &'a [&'b str] {
    match tokens {
        [first, rest @ ..] if first.parse::<u32>().is_ok() => rest,
        _ => tokens,
    }
}

/// Recognize one `permit|deny` entry.
///
/// `line` is the 1-based source line number carried into the result.
pub fn parse_acl_rule(line: usize, text: &str) -> AclLine {
    let unparsed = |reason: &str| {
        AclLine::Unparsed(Unparsed {
            line,
            text: text.trim().to_string(),
            reason: reason.to_string(),
        })
    };

    let all: Vec<&str> = text.split_whitespace().collect();
    let mut tokens = strip_sequence(&all);
    while let [rest @ .., "log" | "log-input"] = tokens {
        tokens = rest;
    }

    let (action, after_action) = match tokens {
        ["permit", rest @ ..] => (Action::Allow, rest),
        ["deny", rest @ ..] => (Action::Deny, rest),
        _ => return unparsed("not a permit or deny entry"),
    };
    let (protocol, rest) = match after_action {
        [first, rest @ ..] => match Protocol::from_token(first) {
            Some(protocol) => (protocol, rest),
            None => (Protocol::Ip, after_action),
        },
        [] => return unparsed("entry has no endpoints"),
    };

    let Some(shape) = recognize(rest) else {
        return unparsed("no recognized endpoint shape");
    };
    if shape.consumed < rest.len() {
        return unparsed("unexpected trailing tokens");
    }

    AclLine::Rule(AclRule {
        action,
        protocol,
        service: shape.service,
        source: shape.source,
        destination: shape.destination,
        port: shape.port,
        line,
    })
}

struct Shape {
    service: Option<String>,
    source: AclEndpoint,
    destination: AclEndpoint,
    port: Option<PortSpec>,
    consumed: usize,
}

fn group(name: &str) -> AclEndpoint {
    AclEndpoint::Group(name.to_string())
}

fn recognize(rest: &[&str]) -> Option<Shape> {
    match rest {
        // service group, source group, destination group
        ["object-group", service, "object-group", source, "object-group", destination, ..] => {
            Some(Shape {
                service: Some((*service).to_string()),
                source: group(source),
                destination: group(destination),
                port: None,
                consumed: 6,
            })
        }
        // service group (by prefix), source group, optional destination
        ["object-group", service, "object-group", source, tail @ ..] if has_service_prefix(service) => {
            let (destination, used) = if tail.is_empty() {
                (AclEndpoint::Any, 0)
            } else {
                endpoint(tail)?
            };
            Some(Shape {
                service: Some((*service).to_string()),
                source: group(source),
                destination,
                port: None,
                consumed: 4 + used,
            })
        }
        // source group, destination group, optional literal port; this also
        // covers the `object-group A object-group B eq P` form
        ["object-group", source, "object-group", destination, tail @ ..] => {
            let (port, used) = port_spec(tail);
            Some(Shape {
                service: None,
                source: group(source),
                destination: group(destination),
                port,
                consumed: 4 + used,
            })
        }
        // source group, destination host, optional literal port
        ["object-group", source, "host", address, tail @ ..] => {
            let (port, used) = port_spec(tail);
            Some(Shape {
                service: None,
                source: group(source),
                destination: AclEndpoint::Host((*address).to_string()),
                port,
                consumed: 4 + used,
            })
        }
        _ => {
            let (source, first) = endpoint(rest)?;
            let remaining = &rest[first..];
            if remaining.is_empty() {
                return Some(Shape {
                    service: None,
                    source,
                    destination: AclEndpoint::Any,
                    port: None,
                    consumed: first,
                });
            }
            let (destination, second) = endpoint(remaining)?;
            Some(Shape {
                service: None,
                source,
                destination,
                port: None,
                consumed: first + second,
            })
        }
    }
}

/// One endpoint at the start of `tokens` and the number of tokens it used.
fn endpoint(tokens: &[&str]) -> Option<(AclEndpoint, usize)> {
    match tokens {
        ["any", ..] => Some((AclEndpoint::Any, 1)),
        ["host", address, ..] => Some((AclEndpoint::Host((*address).to_string()), 2)),
        ["object-group", name, ..] => Some((AclEndpoint::Group((*name).to_string()), 2)),
        [name, ..] if is_bare_group(name) => Some((AclEndpoint::Group((*name).to_string()), 1)),
        _ => None,
    }
}

/// Address/wildcard pairs and operator keywords are not group names.
fn is_bare_group(token: &str) -> bool {
    !matches!(token, "eq" | "neq" | "lt" | "gt" | "range" | "host" | "object-group")
        && token.parse::<Ipv4Addr>().is_err()
}

fn port_spec(tokens: &[&str]) -> (Option<PortSpec>, usize) {
    match tokens {
        ["eq", port, ..] => (
            Some(PortSpec::Eq {
                port: (*port).to_string(),
            }),
            2,
        ),
        ["range", start, end, ..] => (
            Some(PortSpec::Range {
                start: (*start).to_string(),
                end: (*end).to_string(),
            }),
            3,
        ),
        ["lt" | "gt", _, ..] => (None, 2),
        _ => (None, 0),
    }
}
