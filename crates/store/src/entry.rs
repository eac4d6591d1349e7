use script_index_signatures::FunctionSignature;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const UNNAMED_SCRIPT: &str = "Unnamed Script";
pub const NO_DESCRIPTION: &str = "No description available.";
pub const AUTO_ADDED_DESCRIPTION: &str = "Auto-added script entry";
pub const SENTINEL_FUNCTION_NAME: &str = "UnknownFunction";
pub const SENTINEL_FUNCTION_DESCRIPTION: &str = "No function details available.";
pub const RECOVERED_FUNCTION_DESCRIPTION: &str = "Recovered function";
pub const AUTO_FIXED_DESCRIPTION: &str = "Auto-fixed description.";

/// One indexed script. `name` is the primary key of the index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScriptEntry {
    pub name: String,

    pub description: String,

    /// Class names in declaration order (duplicates allowed)
    #[serde(default)]
    pub classes: Vec<String>,

    /// Functions in declaration order; never empty in canonical form
    pub functions: Vec<FunctionSignature>,

    /// Lower-cased keywords derived from the script name
    #[serde(default)]
    pub tags: BTreeSet<String>,

    /// ISO-8601 UTC timestamp of the last (re)build
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl ScriptEntry {
    /// Entry synthesized for a script known only by name.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: AUTO_ADDED_DESCRIPTION.to_string(),
            classes: Vec::new(),
            functions: vec![sentinel_function()],
            tags: BTreeSet::new(),
            last_updated: None,
        }
    }

    /// True when the only function is the "nothing detected" sentinel.
    #[must_use]
    pub fn has_only_sentinel(&self) -> bool {
        matches!(self.functions.as_slice(), [only] if is_sentinel(only))
    }
}

/// Placeholder function used when a script has no detected functions.
#[must_use]
pub fn sentinel_function() -> FunctionSignature {
    FunctionSignature::new(SENTINEL_FUNCTION_NAME, SENTINEL_FUNCTION_DESCRIPTION)
}

#[must_use]
pub fn is_sentinel(function: &FunctionSignature) -> bool {
    function.name == SENTINEL_FUNCTION_NAME
        && function.description == SENTINEL_FUNCTION_DESCRIPTION
        && function.declaration_text.is_none()
}
