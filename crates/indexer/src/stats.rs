use serde::{Deserialize, Serialize};

/// Statistics about one indexing run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Sources reported by the provider
    pub listed: usize,

    /// Sources skipped because the index already had their name
    pub known: usize,

    /// Sources fetched and turned into entries
    pub indexed: usize,

    /// Sources that could not be fetched, decoded, or were empty
    pub skipped: usize,

    /// Entries appended to the index
    pub added: usize,

    /// Entries that overwrote an existing one (refresh only)
    pub replaced: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,

    /// Errors encountered
    pub errors: Vec<String>,
}

impl IndexStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: String) {
        self.skipped += 1;
        self.errors.push(error);
    }

    /// Whether the run changed the document
    #[must_use]
    pub fn changed(&self) -> bool {
        self.added > 0 || self.replaced > 0
    }
}

impl std::fmt::Display for IndexStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} listed, {} already indexed, {} indexed ({} added, {} replaced), {} skipped in {} ms",
            self.listed,
            self.known,
            self.indexed,
            self.added,
            self.replaced,
            self.skipped,
            self.time_ms
        )
    }
}
