use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use script_index_signatures::extract;
use script_index_store::{sentinel_function, ScriptEntry};
use std::collections::BTreeSet;
use std::path::Path;

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z][a-z]+").expect("tag pattern compiles"));

/// Canned summaries keyed by fragments of the script's base name
/// (case-sensitive). First match wins.
const SUMMARY_RULES: &[(&[&str], &str)] = &[
    (
        &["Grab"],
        "Manages object grabbing, releasing, or physics interactions.",
    ),
    (
        &["Hand"],
        "Handles tracking, animation, or feedback for glove hands.",
    ),
    (
        &["XR"],
        "Integrates the glove SDK with XR tracking and controllers.",
    ),
    (
        &["Material"],
        "Defines or detects materials for haptic responses.",
    ),
    (
        &["Waveform", "Haptic"],
        "Defines vibration or haptic signal patterns for feedback.",
    ),
    (
        &["Core"],
        "Provides SDK initialization and core system management.",
    ),
];

/// Build the index entry for one script, stamped with the current time.
#[must_use]
pub fn build_entry(script_name: &str, source: &str) -> ScriptEntry {
    build_entry_at(script_name, source, Utc::now())
}

/// Build the index entry for one script with an explicit timestamp.
#[must_use]
pub fn build_entry_at(script_name: &str, source: &str, at: DateTime<Utc>) -> ScriptEntry {
    let extraction = extract(source);
    let description = summarize(
        script_name,
        extraction.classes.len(),
        extraction.functions.len(),
    );

    let mut functions = extraction.functions;
    if functions.is_empty() {
        functions.push(sentinel_function());
    }

    ScriptEntry {
        name: script_name.to_string(),
        description,
        classes: extraction.classes,
        functions,
        tags: derive_tags(script_name),
        last_updated: Some(format_timestamp(at)),
    }
}

/// Lower-cased capitalized fragments of the name (`SG_HandPoser.cs` →
/// `{"hand", "poser"}`).
#[must_use]
pub fn derive_tags(script_name: &str) -> BTreeSet<String> {
    TAG_PATTERN
        .find_iter(script_name)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Entry description: a canned summary when the base name carries a known
/// keyword, otherwise the class/function counts.
#[must_use]
pub fn summarize(script_name: &str, class_count: usize, function_count: usize) -> String {
    let base = base_name(script_name);
    SUMMARY_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| base.contains(needle)))
        .map(|(_, summary)| (*summary).to_string())
        .unwrap_or_else(|| {
            format!(
                "Auto-generated entry for {script_name}. Found {class_count} class(es) and {function_count} function(s)."
            )
        })
}

/// ISO-8601 UTC with microseconds and a `Z` suffix.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn base_name(script_name: &str) -> &str {
    Path::new(script_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(script_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use script_index_store::SENTINEL_FUNCTION_NAME;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap()
    }

    #[test]
    fn builds_calibration_script() {
        let entry = build_entry_at("Calib.cs", "public void StartCalibration() { }", at());

        assert_eq!(entry.name, "Calib.cs");
        assert!(entry.classes.is_empty());
        assert_eq!(entry.functions.len(), 1);
        assert_eq!(entry.functions[0].name, "StartCalibration");
        assert_eq!(entry.functions[0].description, "Handles calibration logic.");
        assert_eq!(
            entry.description,
            "Auto-generated entry for Calib.cs. Found 0 class(es) and 1 function(s)."
        );
        assert_eq!(
            entry.last_updated.as_deref(),
            Some("2026-10-18T09:30:00.000000Z")
        );
        assert_eq!(
            entry.tags.into_iter().collect::<Vec<_>>(),
            vec!["calib".to_string()]
        );
    }

    #[test]
    fn name_heuristics_take_precedence_in_order() {
        assert_eq!(
            summarize("SG_GrabHand.cs", 1, 4),
            "Manages object grabbing, releasing, or physics interactions."
        );
        assert_eq!(
            summarize("SG_HandPoser.cs", 1, 4),
            "Handles tracking, animation, or feedback for glove hands."
        );
        assert_eq!(
            summarize("SG_HapticGlove.cs", 0, 0),
            "Defines vibration or haptic signal patterns for feedback."
        );
        assert_eq!(
            summarize("SG_XR_Rig.cs", 0, 0),
            "Integrates the glove SDK with XR tracking and controllers."
        );
        // Heuristics are case-sensitive against the base name.
        assert_eq!(
            summarize("grabber.cs", 2, 3),
            "Auto-generated entry for grabber.cs. Found 2 class(es) and 3 function(s)."
        );
    }

    #[test]
    fn tags_are_lowercased_and_deduplicated() {
        let tags = derive_tags("SG_HandHandPoser.cs");
        assert_eq!(
            tags.into_iter().collect::<Vec<_>>(),
            vec!["hand".to_string(), "poser".to_string()]
        );
        assert!(derive_tags("calib.cs").is_empty());
    }

    #[test]
    fn scripts_without_functions_carry_the_sentinel() {
        let entry = build_entry_at("Data.cs", "public class Data { public int x; }", at());
        assert_eq!(entry.classes, vec!["Data"]);
        assert!(entry.has_only_sentinel());
        assert_eq!(entry.functions[0].name, SENTINEL_FUNCTION_NAME);
        assert_eq!(
            entry.description,
            "Auto-generated entry for Data.cs. Found 1 class(es) and 0 function(s)."
        );
    }

    #[test]
    fn built_entries_survive_repair_unchanged() {
        let entry = build_entry_at(
            "GloveHaptics.cs",
            "class GloveHaptics { void Update() {} int Go() { return 1; } }",
            at(),
        );
        let doc = script_index_store::IndexDocument::from_entries([entry]);
        let repaired = script_index_store::repair(&serde_json::to_value(&doc).unwrap());
        assert_eq!(repaired, doc);
    }
}
