use colored::Colorize;

use crate::diagnostics::Diagnostic;
use crate::inspect::InspectReport;
use crate::validate::ValidationIssue;

/// Render validation findings, or the pass line when there are none.
pub fn render_validation(issues: &[ValidationIssue]) -> String {
    if issues.is_empty() {
        return "Configuration validation passed!".green().to_string();
    }
    let mut out = vec!["Validation errors:".red().to_string()];
    for issue in issues {
        out.push(format!("  - {}", issue.message));
    }
    out.join("\n")
}

/// Render conversion diagnostics, one per line.
pub fn render_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut out = Vec::new();
    for diagnostic in diagnostics {
        let location = diagnostic
            .line
            .map(|line| format!(" line={line}"))
            .unwrap_or_default();
        out.push(format!(
            "{} {}{location}: {}",
            "WARN".yellow(),
            diagnostic.code,
            diagnostic.message
        ));
    }
    out.join("\n")
}

pub fn render_inspect(report: &InspectReport) -> String {
    let s = &report.sections;
    let mut out = vec![
        "sections".cyan().to_string(),
        format!("- zones: {}", s.zones),
        format!("- interfaces: {}", s.interfaces),
        format!("- object_groups: {}", s.object_groups),
        format!("- acls: {} (rules={})", s.acls, s.acl_rules),
        format!("- class_maps: {}", s.class_maps),
        format!("- policy_maps: {}", s.policy_maps),
        format!("- zone_pairs: {}", s.zone_pairs),
    ];
    if !report.unbound_zone_pairs.is_empty() {
        out.push(String::new());
        out.push("unbound_zone_pairs".cyan().to_string());
        out.extend(report.unbound_zone_pairs.iter().map(|name| format!("- {name}")));
    }
    if !report.unparsed.is_empty() {
        out.push(String::new());
        out.push("unparsed".magenta().to_string());
        for entry in &report.unparsed {
            out.push(format!("- line {}: {} ({})", entry.line, entry.text, entry.reason));
        }
    }
    out.join("\n")
}
