use serde::Serialize;

/// One meaningful configuration line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigLine {
    /// 1-based line number in the source text.
    pub number: usize,
    /// Leading whitespace width before trimming.
    pub indent: usize,
    /// Trimmed line text.
    pub text: String,
    /// A blank or `!` comment line came directly before this one.
    pub after_break: bool,
}

impl ConfigLine {
    /// Whitespace-separated tokens of the trimmed text.
    pub fn tokens(&self) -> Vec<&str> {
        self.text.split_whitespace().collect()
    }
}

/// Split configuration text into trimmed lines, dropping blanks and comments.
///
/// Dropped lines still matter to block parsers, so the next kept line is
/// flagged with `after_break`.
pub fn classify(text: &str) -> Vec<ConfigLine> {
    let mut out = Vec::new();
    let mut pending_break = false;

    for (idx, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('!') {
            pending_break = true;
            continue;
        }
        let indent = raw.len() - raw.trim_start().len();
        out.push(ConfigLine {
            number: idx + 1,
            indent,
            text: trimmed.to_string(),
            after_break: pending_break,
        });
        pending_break = false;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::classify;

    #[test]
    fn drops_blank_and_comment_lines_and_flags_the_next_line() {
        let lines = classify("hostname r1\n!\n\ninterface Gi0/0\n zone-member security LAN\n");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text, "hostname r1");
        assert!(!lines[0].after_break);
        assert!(lines[1].after_break);
        assert_eq!(lines[1].number, 4);
        assert_eq!(lines[2].indent, 1);
        assert_eq!(lines[2].text, "zone-member security LAN");
    }

    #[test]
    fn handles_crlf_input() {
        let lines = classify("zone security LAN\r\n description inside\r\n");
        assert_eq!(lines[0].text, "zone security LAN");
        assert_eq!(lines[1].tokens(), vec!["description", "inside"]);
    }
}
