use serde::{Deserialize, Serialize};

/// A function declaration found in a script
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSignature {
    /// Identifier of the function (never empty)
    pub name: String,

    /// Declaration text up to, but not including, the argument list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration_text: Option<String>,

    /// Generated description (never empty)
    pub description: String,
}

impl FunctionSignature {
    /// Create a signature with a description and no declaration text
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declaration_text: None,
            description: description.into(),
        }
    }

    /// Builder: attach the matched declaration text
    #[must_use]
    pub fn with_declaration(mut self, text: impl Into<String>) -> Self {
        self.declaration_text = Some(text.into());
        self
    }
}
