use crate::classifier::classify;
use crate::types::FunctionSignature;
use once_cell::sync::Lazy;
use regex::Regex;

static CLASS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"class\s+([A-Za-z0-9_]+)").expect("class pattern compiles"));

// Best-effort declaration shape: optional access modifier, optional `static`,
// a return-type token (keyword or identifier with at most one level of
// `<...>` and any number of `[]`/`[,]` suffixes), the identifier, then `(`.
// Multi-line signatures and attribute-prefixed lines can be missed, and call
// expressions such as `return Foo(` match as declarations.
static FUNCTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?:(?P<modifier>public|private|protected|internal))?\s*",
        r"(?:(?P<static>static)\s+)?",
        r"(?P<return_type>(?:void|int|float|bool|string|\w+)(?:<[\w\s,.]*>)?(?:\[,*\])*)\s+",
        r"(?P<name>[A-Za-z0-9_]+)\s*\(",
    ))
    .expect("function pattern compiles")
});

/// Classes and functions found in one source text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub classes: Vec<String>,
    pub functions: Vec<FunctionSignature>,
}

/// Run both patterns over `source`.
#[must_use]
pub fn extract(source: &str) -> Extraction {
    Extraction {
        classes: extract_classes(source),
        functions: extract_functions(source),
    }
}

/// Class names in order of occurrence, duplicates preserved.
#[must_use]
pub fn extract_classes(source: &str) -> Vec<String> {
    CLASS_PATTERN
        .captures_iter(source)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Function signatures in declaration order. Overloads stay separate entries.
#[must_use]
pub fn extract_functions(source: &str) -> Vec<FunctionSignature> {
    FUNCTION_PATTERN
        .captures_iter(source)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.name("name")?;
            let declaration = source[whole.start()..name.end()].trim();
            Some(
                FunctionSignature::new(name.as_str(), classify(name.as_str()))
                    .with_declaration(declaration),
            )
        })
        .collect()
}
