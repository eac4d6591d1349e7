use crate::entry::ScriptEntry;
use crate::repair::repair;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;

/// The persisted index: scripts unique by name, in append order.
///
/// `totalScripts` is derived from `scripts` when serializing and ignored when
/// reading, so it cannot drift.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexDocument {
    scripts: Vec<ScriptEntry>,
}

/// Result of [`IndexDocument::replace_by_name`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub added: usize,
    pub replaced: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedIndexDocument<'a> {
    total_scripts: usize,
    scripts: &'a [ScriptEntry],
}

impl IndexDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from entries, keeping the first entry per name.
    pub fn from_entries(entries: impl IntoIterator<Item = ScriptEntry>) -> Self {
        let mut document = Self::new();
        document.merge_by_name(entries);
        document
    }

    /// Append entries whose name is not present yet, in the order supplied.
    ///
    /// Existing entries are never touched. Returns the number appended.
    pub fn merge_by_name(&mut self, entries: impl IntoIterator<Item = ScriptEntry>) -> usize {
        let mut known: HashSet<String> = self.scripts.iter().map(|s| s.name.clone()).collect();
        let before = self.scripts.len();
        for entry in entries {
            if known.contains(&entry.name) {
                log::debug!("Skipping already indexed script {}", entry.name);
                continue;
            }
            known.insert(entry.name.clone());
            self.scripts.push(entry);
        }
        self.scripts.len() - before
    }

    /// Replace entries with a matching name in place and append the rest.
    ///
    /// This is the explicit update path; [`Self::merge_by_name`] never
    /// overwrites.
    pub fn replace_by_name(
        &mut self,
        entries: impl IntoIterator<Item = ScriptEntry>,
    ) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        for entry in entries {
            match self.scripts.iter_mut().find(|s| s.name == entry.name) {
                Some(existing) => {
                    *existing = entry;
                    outcome.replaced += 1;
                }
                None => {
                    self.scripts.push(entry);
                    outcome.added += 1;
                }
            }
        }
        outcome
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ScriptEntry> {
        self.scripts.iter().find(|s| s.name == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names of all indexed scripts
    #[must_use]
    pub fn names(&self) -> HashSet<&str> {
        self.scripts.iter().map(|s| s.name.as_str()).collect()
    }

    #[must_use]
    pub fn scripts(&self) -> &[ScriptEntry] {
        &self.scripts
    }

    /// Always equal to the number of scripts
    #[must_use]
    pub fn total_scripts(&self) -> usize {
        self.scripts.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

impl Serialize for IndexDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PersistedIndexDocument {
            total_scripts: self.scripts.len(),
            scripts: &self.scripts,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for IndexDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(repair(&raw))
    }
}
