use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    pub zones: usize,
    pub filter_policies: usize,
    pub forwardings: usize,
    pub ip_identities: usize,
    pub mac_identities: usize,
    pub port_identities: usize,
}

pub fn summarize(document: &Value) -> ConversionSummary {
    let body = document.get("configuration").and_then(|c| c.get(0));
    let zfw = body
        .and_then(|b| b.get("security"))
        .and_then(|s| s.get("zfw"));
    let identities = body.and_then(|b| b.get("identities"));

    ConversionSummary {
        zones: count(zfw.and_then(|z| z.get("zones"))),
        filter_policies: count(zfw.and_then(|z| z.get("filter_policies"))),
        forwardings: count(zfw.and_then(|z| z.get("forwardings"))),
        ip_identities: count(identities.and_then(|i| i.get("ip"))),
        mac_identities: count(identities.and_then(|i| i.get("mac"))),
        port_identities: count(identities.and_then(|i| i.get("port"))),
    }
}

fn count(section: Option<&Value>) -> usize {
    match section {
        Some(Value::Object(map)) => map.len(),
        Some(Value::Array(items)) => items.len(),
        _ => 0,
    }
}

pub fn render(summary: ConversionSummary) -> String {
    format!(
        "Zones: {}\nFilter Policies: {}\nZone Forwardings: {}\nIP Identities: {}\nPort Identities: {}",
        summary.zones,
        summary.filter_policies,
        summary.forwardings,
        summary.ip_identities,
        summary.port_identities
    )
}

#[cfg(test)]
mod tests {
    use super::{render, summarize, ConversionSummary};
    use serde_json::json;

    #[test]
    fn counts_object_and_array_sections() {
        let doc = json!({"configuration": [{
            "security": {"zfw": {
                "zones": {"a": {}, "b": {}},
                "filter_policies": {"p": {}},
                "forwardings": {}
            }},
            "identities": {"ip": [{}, {}, {}], "port": [{}], "mac": []}
        }, []]});
        assert_eq!(
            summarize(&doc),
            ConversionSummary {
                zones: 2,
                filter_policies: 1,
                forwardings: 0,
                ip_identities: 3,
                mac_identities: 0,
                port_identities: 1,
            }
        );
    }

    #[test]
    fn missing_sections_count_as_zero() {
        assert_eq!(summarize(&json!({})), ConversionSummary::default());
    }

    #[test]
    fn render_lists_one_count_per_line() {
        let text = render(ConversionSummary {
            zones: 3,
            filter_policies: 2,
            forwardings: 1,
            ..ConversionSummary::default()
        });
        assert!(text.starts_with("Zones: 3\nFilter Policies: 2\nZone Forwardings: 1\n"));
        assert!(text.ends_with("Port Identities: 0"));
    }
}
