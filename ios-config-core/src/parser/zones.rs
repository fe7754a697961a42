use crate::lines::ConfigLine;
use crate::model::{upsert, SecurityZone};

use super::{header_value, is_separator, is_top_level};

/// Collect `zone security NAME` declarations and their descriptions.
pub(crate) fn parse_zones(lines: &[ConfigLine]) -> Vec<SecurityZone> {
    let mut zones = Vec::new();
    let mut current: Option<SecurityZone> = None;

    for line in lines {
        if let Some(name) = header_value(&line.text, "zone security ") {
            flush(&mut zones, current.take());
            current = Some(SecurityZone::new(name));
            continue;
        }
        let Some(zone) = current.as_mut() else {
            continue;
        };
        if is_separator(line) || is_top_level(line) {
            flush(&mut zones, current.take());
            continue;
        }
        if let Some(text) = header_value(&line.text, "description ") {
            zone.description = Some(text.to_string());
        }
    }
    flush(&mut zones, current);

    zones
}

fn flush(zones: &mut Vec<SecurityZone>, zone: Option<SecurityZone>) {
    if let Some(zone) = zone {
        upsert(zones, zone, |z| z.name.as_str());
    }
}
