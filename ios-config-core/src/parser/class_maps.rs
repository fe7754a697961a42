use tracing::debug;

use crate::lines::ConfigLine;
use crate::model::{upsert, ClassMap};

use super::{header_value, is_separator, is_top_level};

/// Collect `class-map type inspect match-any NAME` blocks.
pub(crate) fn parse_class_maps(lines: &[ConfigLine]) -> Vec<ClassMap> {
    let mut class_maps = Vec::new();
    let mut current: Option<ClassMap> = None;

    for line in lines {
        if let Some(name) = header_value(&line.text, "class-map type inspect match-any ") {
            flush(&mut class_maps, current.take());
            current = Some(ClassMap {
                name: name.to_string(),
                acl_refs: Vec::new(),
                group_refs: Vec::new(),
            });
            continue;
        }
        let Some(class_map) = current.as_mut() else {
            continue;
        };
        if is_separator(line) {
            flush(&mut class_maps, current.take());
            continue;
        }

        let tokens = line.tokens();
        match tokens.as_slice() {
            ["match", "access-group", "name", acl, ..] => class_map.acl_refs.push((*acl).to_string()),
            ["match", "object-group", group, ..] => class_map.group_refs.push((*group).to_string()),
            _ if is_top_level(line) => flush(&mut class_maps, current.take()),
            _ => debug!(line = line.number, text = %line.text, "ignored class-map match"),
        }
    }
    flush(&mut class_maps, current);

    class_maps
}

fn flush(class_maps: &mut Vec<ClassMap>, class_map: Option<ClassMap>) {
    if let Some(class_map) = class_map {
        upsert(class_maps, class_map, |c| c.name.as_str());
    }
}
