//! Normalization of a possibly malformed index into the canonical schema.
//!
//! Repair never fails and is idempotent: feeding its output back in yields
//! the same document. Legacy snake_case keys (`script_name`, `summary`,
//! `last_updated`, `signature`) are read and written back in canonical form.

use crate::document::IndexDocument;
use crate::entry::{
    sentinel_function, ScriptEntry, AUTO_FIXED_DESCRIPTION, NO_DESCRIPTION,
    RECOVERED_FUNCTION_DESCRIPTION, SENTINEL_FUNCTION_NAME, UNNAMED_SCRIPT,
};
use script_index_signatures::FunctionSignature;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// What repair had to change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairReport {
    /// Bare-string entries turned into placeholder entries
    pub placeholders: usize,
    /// Missing or empty name/description/functions replaced by defaults
    pub defaulted_fields: usize,
    /// Bare-string functions wrapped into signatures
    pub recovered_functions: usize,
    /// Entries that were neither objects nor strings
    pub dropped_entries: usize,
    /// Entries discarded because an earlier entry had the same name
    pub duplicate_names: usize,
}

impl RepairReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Repair a raw index value (wrapper object or bare array).
#[must_use]
pub fn repair(raw: &Value) -> IndexDocument {
    repair_with_report(raw).0
}

/// Like [`repair`], also reporting what was fixed.
#[must_use]
pub fn repair_with_report(raw: &Value) -> (IndexDocument, RepairReport) {
    let mut report = RepairReport::default();
    let items: &[Value] = match raw {
        Value::Array(items) => items,
        Value::Object(obj) => obj
            .get("scripts")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    };

    let entries: Vec<ScriptEntry> = items
        .iter()
        .filter_map(|item| repair_entry(item, &mut report))
        .collect();
    let candidates = entries.len();
    let document = IndexDocument::from_entries(entries);
    report.duplicate_names = candidates - document.len();

    if !report.is_clean() {
        log::debug!("Repaired index: {report:?}");
    }
    (document, report)
}

fn repair_entry(item: &Value, report: &mut RepairReport) -> Option<ScriptEntry> {
    match item {
        Value::String(name) => {
            report.placeholders += 1;
            let name = if name.trim().is_empty() {
                UNNAMED_SCRIPT
            } else {
                name.as_str()
            };
            Some(ScriptEntry::placeholder(name))
        }
        Value::Object(obj) => Some(repair_object(obj, report)),
        _ => {
            report.dropped_entries += 1;
            None
        }
    }
}

fn repair_object(obj: &Map<String, Value>, report: &mut RepairReport) -> ScriptEntry {
    let name = text_field(obj, &["name", "script_name"]).unwrap_or_else(|| {
        report.defaulted_fields += 1;
        UNNAMED_SCRIPT
    });
    let description = text_field(obj, &["description", "summary"]).unwrap_or_else(|| {
        report.defaulted_fields += 1;
        NO_DESCRIPTION
    });

    let mut functions: Vec<FunctionSignature> = obj
        .get("functions")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| repair_function(item, report))
                .collect()
        })
        .unwrap_or_default();
    if functions.is_empty() {
        report.defaulted_fields += 1;
        functions.push(sentinel_function());
    }

    ScriptEntry {
        name: name.to_string(),
        description: description.to_string(),
        classes: string_items(obj.get("classes")).map(str::to_string).collect(),
        functions,
        tags: string_items(obj.get("tags"))
            .map(str::to_lowercase)
            .collect::<BTreeSet<_>>(),
        last_updated: text_field(obj, &["lastUpdated", "last_updated"]).map(str::to_string),
    }
}

fn repair_function(item: &Value, report: &mut RepairReport) -> Option<FunctionSignature> {
    match item {
        Value::String(name) if !name.trim().is_empty() => {
            report.recovered_functions += 1;
            Some(FunctionSignature::new(
                name.as_str(),
                RECOVERED_FUNCTION_DESCRIPTION,
            ))
        }
        Value::Object(obj) => {
            let name = text_field(obj, &["name"]).unwrap_or(SENTINEL_FUNCTION_NAME);
            let description = text_field(obj, &["description"]).unwrap_or_else(|| {
                report.defaulted_fields += 1;
                AUTO_FIXED_DESCRIPTION
            });
            let mut function = FunctionSignature::new(name, description);
            if let Some(text) = text_field(obj, &["declarationText", "signature"]) {
                function = function.with_declaration(text);
            }
            Some(function)
        }
        _ => None,
    }
}

/// First non-blank string among `keys`.
fn text_field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .filter_map(Value::as_str)
        .find(|text| !text.trim().is_empty())
}

fn string_items(value: Option<&Value>) -> impl Iterator<Item = &str> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}
