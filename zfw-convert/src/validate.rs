//! Structural checks over an export document.
//!
//! The checks work on a JSON value so documents read back from disk can be
//! validated the same way as freshly generated ones.

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub code: String,
    pub message: String,
}

fn issue(code: &str, message: impl Into<String>) -> ValidationIssue {
    ValidationIssue {
        code: code.to_string(),
        message: message.into(),
    }
}

/// `{}` and `[]` both count as empty lists.
fn entries(section: Option<&Value>) -> Option<&Map<String, Value>> {
    section.and_then(Value::as_object).filter(|map| !map.is_empty())
}

pub fn validate(document: &Value) -> Vec<ValidationIssue> {
    let Some(zfw) = document
        .get("configuration")
        .and_then(|c| c.get(0))
        .and_then(|body| body.get("security"))
        .and_then(|security| security.get("zfw"))
    else {
        return vec![issue(
            "missing_zfw_section",
            "configuration[0].security.zfw not found",
        )];
    };

    let mut issues = Vec::new();
    let zones = entries(zfw.get("zones"));
    let policies = entries(zfw.get("filter_policies"));
    let forwardings = entries(zfw.get("forwardings"));

    if zones.is_none() {
        issues.push(issue("no_zones", "No zones found"));
    }
    if policies.is_none() {
        issues.push(issue("no_filter_policies", "No filter policies found"));
    }
    let Some(forwardings) = forwardings else {
        issues.push(issue("no_forwardings", "No zone forwardings found"));
        return issues;
    };

    for (id, forwarding) in forwardings {
        let policy_id = forwarding
            .get("filter_policy_id")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if policy_id.is_empty() {
            continue;
        }
        if !policies.is_some_and(|p| p.contains_key(policy_id)) {
            issues.push(issue(
                "invalid_filter_policy_ref",
                format!("Forwarding {id} references invalid filter_policy_id: {policy_id}"),
            ));
        }
    }
    issues
}
