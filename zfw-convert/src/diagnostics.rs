use serde::Serialize;
use tracing::warn;

use ios_config_core::Unparsed;

/// Something the conversion skipped or could not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

/// Ordered diagnostic list; every entry is also logged as a warning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn record(&mut self, code: &str, message: impl Into<String>) {
        let message = message.into();
        warn!(code, "{message}");
        self.entries.push(Diagnostic {
            code: code.to_string(),
            message,
            line: None,
        });
    }

    /// Carry a parser diagnostic over without logging it twice.
    pub fn record_unparsed(&mut self, entry: &Unparsed) {
        self.entries.push(Diagnostic {
            code: "unparsed_line".to_string(),
            message: format!("{}: {}", entry.reason, entry.text),
            line: Some(entry.line),
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
