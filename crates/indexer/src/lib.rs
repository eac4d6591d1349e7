//! # Script Indexer
//!
//! Builds and maintains a JSON index of a script library.
//!
//! ## Pipeline
//!
//! ```text
//! SourceProvider (local directory or GitHub branch)
//!     │
//!     ├──> list_sources
//!     │      └─> SourceRef { path, name }
//!     │
//!     ├──> fetch_text + build_entry
//!     │      └─> ScriptEntry (classes, classified functions, tags, timestamp)
//!     │
//!     └──> IndexStore (merge / replace, atomic save)
//!            └─> script_index.json
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use script_index_indexer::{IndexerConfig, LocalSource, ScriptIndexer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let indexer = ScriptIndexer::new(IndexerConfig::new("script_index.json"));
//!     let source = LocalSource::new("Assets/Scripts", "cs");
//!     let run = indexer.index_incremental(&source).await?;
//!
//!     println!("Added {} scripts ({} total)", run.stats.added, run.document.len());
//!     Ok(())
//! }
//! ```

mod entry;
mod error;
mod github;
mod indexer;
mod scanner;
mod source;
mod stats;

pub use entry::{build_entry, build_entry_at, derive_tags, format_timestamp, summarize};
pub use error::{IndexerError, Result};
pub use github::{GitHubSource, DEFAULT_API_BASE};
pub use indexer::{IndexMode, IndexRun, IndexerConfig, ScriptIndexer};
pub use scanner::FileScanner;
pub use source::{LocalSource, SourceProvider, SourceRef};
pub use stats::IndexStats;
