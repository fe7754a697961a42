use tracing::debug;

use crate::lines::ConfigLine;
use crate::model::{upsert, PolicyAction, PolicyClass, PolicyMap};

use super::{header_value, is_separator, is_top_level};

/// Collect `policy-map type inspect NAME` blocks.
///
/// `class type inspect C` and `class class-default` open a class; action
/// lines attach to the most recent class and are ignored before the first.
pub(crate) fn parse_policy_maps(lines: &[ConfigLine]) -> Vec<PolicyMap> {
    let mut policy_maps = Vec::new();
    let mut current: Option<PolicyMap> = None;

    for line in lines {
        if let Some(name) = header_value(&line.text, "policy-map type inspect ") {
            flush(&mut policy_maps, current.take());
            current = Some(PolicyMap {
                name: name.to_string(),
                classes: Vec::new(),
            });
            continue;
        }
        let Some(policy_map) = current.as_mut() else {
            continue;
        };
        if is_separator(line) {
            flush(&mut policy_maps, current.take());
            continue;
        }

        let tokens = line.tokens();
        let action = match tokens.as_slice() {
            ["class", "type", "inspect", class_name, ..] => {
                policy_map.classes.push(PolicyClass {
                    class_name: (*class_name).to_string(),
                    actions: Vec::new(),
                });
                continue;
            }
            ["class", "class-default", ..] => {
                policy_map.classes.push(PolicyClass {
                    class_name: "class-default".to_string(),
                    actions: Vec::new(),
                });
                continue;
            }
            ["inspect"] => PolicyAction::Inspect(None),
            ["inspect", parameter, ..] => PolicyAction::Inspect(Some((*parameter).to_string())),
            ["drop", ..] => PolicyAction::Drop,
            ["pass", ..] => PolicyAction::Pass,
            _ if is_top_level(line) => {
                flush(&mut policy_maps, current.take());
                continue;
            }
            _ => {
                debug!(line = line.number, text = %line.text, "ignored policy-map entry");
                continue;
            }
        };
        match policy_map.classes.last_mut() {
            Some(class) => class.actions.push(action),
            None => debug!(line = line.number, "policy-map action before any class"),
        }
    }
    flush(&mut policy_maps, current);

    policy_maps
}

fn flush(policy_maps: &mut Vec<PolicyMap>, policy_map: Option<PolicyMap>) {
    if let Some(policy_map) = policy_map {
        upsert(policy_maps, policy_map, |p| p.name.as_str());
    }
}
