//! # Script Index Store
//!
//! The persisted JSON index of a script library and the operations that keep
//! it healthy.
//!
//! ## Schema
//!
//! ```text
//! {
//!   "totalScripts": 1,
//!   "scripts": [
//!     {
//!       "name": "GloveHaptics.cs",
//!       "description": "...",
//!       "classes": ["GloveHaptics"],
//!       "functions": [{ "name": "Update", "declarationText": "void Update", "description": "..." }],
//!       "tags": ["glove", "haptics"],
//!       "lastUpdated": "2026-10-18T09:30:00.000000Z"
//!     }
//!   ]
//! }
//! ```
//!
//! - [`repair`] turns anything (bare arrays, legacy snake_case documents,
//!   string entries, string functions) into that schema. It never fails and
//!   applying it twice changes nothing.
//! - [`IndexDocument::merge_by_name`] only appends unknown names;
//!   [`IndexDocument::replace_by_name`] is the explicit overwrite.
//! - [`IndexStore`] loads (missing file → empty document) and saves through
//!   a temp file + rename.

mod document;
mod entry;
mod error;
mod repair;
mod store;

pub use document::{IndexDocument, MergeOutcome};
pub use entry::{
    is_sentinel, sentinel_function, ScriptEntry, AUTO_ADDED_DESCRIPTION, AUTO_FIXED_DESCRIPTION,
    NO_DESCRIPTION, RECOVERED_FUNCTION_DESCRIPTION, SENTINEL_FUNCTION_DESCRIPTION,
    SENTINEL_FUNCTION_NAME, UNNAMED_SCRIPT,
};
pub use error::{Result, StoreError};
pub use repair::{repair, repair_with_report, RepairReport};
pub use script_index_signatures::FunctionSignature;
pub use store::{IndexStore, DEFAULT_INDEX_FILE_NAME};
