use std::collections::HashMap;

use uuid::Uuid;

/// How generated objects get their `_id_`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdMode {
    /// Random v4 UUIDs.
    #[default]
    Random,
    /// v5 UUIDs over kind, name and occurrence, stable across runs.
    Deterministic,
}

#[derive(Debug, Clone)]
pub struct IdGenerator {
    mode: IdMode,
    namespace: Uuid,
    seen: HashMap<(String, String), u32>,
}

impl IdGenerator {
    pub fn new(mode: IdMode) -> Self {
        Self {
            mode,
            namespace: Uuid::new_v5(&Uuid::NAMESPACE_URL, b"urn:zfw-convert"),
            seen: HashMap::new(),
        }
    }

    /// Next id for an object of `kind` named `name`.
    pub fn next(&mut self, kind: &str, name: &str) -> String {
        match self.mode {
            IdMode::Random => Uuid::new_v4().to_string(),
            IdMode::Deterministic => {
                let occurrence = self
                    .seen
                    .entry((kind.to_string(), name.to_string()))
                    .or_insert(0);
                *occurrence += 1;
                let seed = format!("{kind}/{name}/{occurrence}");
                Uuid::new_v5(&self.namespace, seed.as_bytes()).to_string()
            }
        }
    }
}
