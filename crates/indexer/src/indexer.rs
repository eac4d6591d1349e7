use crate::entry::build_entry;
use crate::error::Result;
use crate::source::SourceProvider;
use crate::stats::IndexStats;
use script_index_store::{
    repair_with_report, IndexDocument, IndexStore, ScriptEntry, DEFAULT_INDEX_FILE_NAME,
};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// Index file the runs read and write
    pub index_path: PathBuf,
}

impl IndexerConfig {
    pub fn new(index_path: impl Into<PathBuf>) -> Self {
        Self {
            index_path: index_path.into(),
        }
    }
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX_FILE_NAME)
    }
}

/// How a run combines fresh entries with the stored index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    /// Build every source into a new document
    Full,
    /// Fetch only names the index lacks and append them
    Incremental,
    /// Rebuild every source and overwrite entries with the same name
    Refresh,
}

/// Outcome of one run
#[derive(Debug, Clone)]
pub struct IndexRun {
    pub document: IndexDocument,
    pub stats: IndexStats,
    /// Whether the document was written to disk
    pub saved: bool,
}

/// Builds and maintains one index file from a [`SourceProvider`]
pub struct ScriptIndexer {
    store: IndexStore,
}

impl ScriptIndexer {
    pub fn new(config: IndexerConfig) -> Self {
        Self {
            store: IndexStore::new(&config.index_path),
        }
    }

    #[must_use]
    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    /// Build all sources into a fresh document and save it.
    pub async fn index_full(&self, provider: &dyn SourceProvider) -> Result<IndexRun> {
        self.index_with_mode(provider, IndexMode::Full).await
    }

    /// Add sources whose names the stored index lacks. An unreadable index is
    /// rebuilt from scratch.
    pub async fn index_incremental(&self, provider: &dyn SourceProvider) -> Result<IndexRun> {
        self.index_with_mode(provider, IndexMode::Incremental).await
    }

    /// Rebuild all sources and replace stored entries with the same name.
    pub async fn refresh(&self, provider: &dyn SourceProvider) -> Result<IndexRun> {
        self.index_with_mode(provider, IndexMode::Refresh).await
    }

    pub async fn index_with_mode(
        &self,
        provider: &dyn SourceProvider,
        mode: IndexMode,
    ) -> Result<IndexRun> {
        let start = Instant::now();
        let mut stats = IndexStats::new();

        log::info!(
            "Indexing {} into {} ({mode:?})",
            provider.describe(),
            self.store.path().display()
        );

        let sources = provider.list_sources().await?;
        stats.listed = sources.len();

        let (mut document, store_needs_write) = match mode {
            IndexMode::Full => (IndexDocument::new(), true),
            IndexMode::Incremental | IndexMode::Refresh => self.load_existing().await,
        };

        let known: HashSet<String> = if mode == IndexMode::Incremental {
            document.names().into_iter().map(str::to_string).collect()
        } else {
            HashSet::new()
        };

        let mut seen = HashSet::new();
        let mut entries: Vec<ScriptEntry> = Vec::new();
        for source in sources {
            if known.contains(&source.name) {
                stats.known += 1;
                continue;
            }
            if !seen.insert(source.name.clone()) {
                log::warn!(
                    "Duplicate script name {} at {}; keeping the first",
                    source.name,
                    source.path
                );
                stats.skipped += 1;
                continue;
            }

            match provider.fetch_text(&source).await {
                Ok(text) if text.trim().is_empty() => {
                    log::warn!("Skipping empty script {}", source.path);
                    stats.skipped += 1;
                }
                Ok(text) => {
                    log::debug!("Indexed {}", source.path);
                    entries.push(build_entry(&source.name, &text));
                    stats.indexed += 1;
                }
                Err(e) => {
                    log::warn!("Failed to read {}: {e}", source.path);
                    stats.add_error(format!("{}: {e}", source.path));
                }
            }
        }

        match mode {
            IndexMode::Full => {
                document = IndexDocument::from_entries(entries);
                stats.added = document.len();
            }
            IndexMode::Incremental => {
                stats.added = document.merge_by_name(entries);
            }
            IndexMode::Refresh => {
                let outcome = document.replace_by_name(entries);
                stats.added = outcome.added;
                stats.replaced = outcome.replaced;
            }
        }

        if mode == IndexMode::Incremental && stats.added == 0 {
            log::info!("No new scripts found");
        }

        let saved = match mode {
            IndexMode::Full | IndexMode::Refresh => true,
            IndexMode::Incremental => stats.changed() || store_needs_write,
        };
        if saved {
            self.store.save(&document).await?;
        }

        stats.time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        log::info!("Indexing completed: {stats}");

        Ok(IndexRun {
            document,
            stats,
            saved,
        })
    }

    /// Stored document plus whether it must be written back even when no
    /// entry is added (missing, unreadable, or repaired on load).
    async fn load_existing(&self) -> (IndexDocument, bool) {
        match self.store.load_raw().await {
            Ok(Some(raw)) => {
                let (document, report) = repair_with_report(&raw);
                if !report.is_clean() {
                    log::info!("Existing index needed repair: {report:?}");
                }
                log::info!("Loaded {} existing scripts", document.len());
                (document, !report.is_clean())
            }
            Ok(None) => {
                log::info!("No existing index, building from scratch");
                (IndexDocument::new(), true)
            }
            Err(e) => {
                log::warn!("Failed to load existing index: {e}, starting fresh");
                (IndexDocument::new(), true)
            }
        }
    }
}
