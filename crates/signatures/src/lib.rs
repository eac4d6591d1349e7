//! # Script Index Signatures
//!
//! Lexical extraction of class names and function signatures from script
//! sources, plus the heuristic classifier that turns a function name into a
//! short human-readable description.
//!
//! ## Pipeline
//!
//! ```text
//! Source text
//!     │
//!     ├──> Class pattern      (`class <identifier>`)
//!     │      └─> Vec<String>
//!     │
//!     └──> Declaration pattern (modifier? static? return-type name `(`)
//!            ├─> FunctionSignature { name, declaration_text }
//!            └─> Classifier → description
//! ```
//!
//! Extraction is pattern matching, not parsing. It does not track braces,
//! strings or comments, so it can both miss declarations and report false
//! positives. Downstream consumers tolerate that noise.
//!
//! ## Example
//!
//! ```rust
//! use script_index_signatures::{classify, extract};
//!
//! let extraction = extract("public class Glove { public void StartCalibration() { } }");
//! assert_eq!(extraction.classes, vec!["Glove".to_string()]);
//! assert_eq!(extraction.functions[0].name, "StartCalibration");
//! assert_eq!(classify("StartCalibration"), extraction.functions[0].description);
//! ```

mod classifier;
mod extractor;
mod types;

pub use classifier::{categorize, classify, Category};
pub use extractor::{extract, extract_classes, extract_functions, Extraction};
pub use types::FunctionSignature;
