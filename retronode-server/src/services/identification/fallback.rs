//! Heuristic names and best-effort JSON handling for backend replies

use retronode_common::events::RomScanResult;
use serde::Deserialize;
use serde_json::Value;

/// Derive a readable title from a ROM filename
///
/// Strips a trailing `.<word characters>` extension, turns each run of
/// `_`, `-` and `.` into one space and trims. If nothing is left the raw
/// filename is returned.
///
/// ```
/// use retronode_server::services::identification::derive_fallback_name;
///
/// assert_eq!(derive_fallback_name("Super_Mario_Bros.zip"), "Super Mario Bros");
/// ```
pub fn derive_fallback_name(filename: &str) -> String {
    let stem = match filename.rfind('.') {
        Some(idx)
            if idx + 1 < filename.len()
                && filename[idx + 1..]
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_') =>
        {
            &filename[..idx]
        }
        _ => filename,
    };

    let mut name = String::with_capacity(stem.len());
    let mut in_separator_run = false;
    for c in stem.chars() {
        if matches!(c, '_' | '-' | '.') {
            if !in_separator_run {
                name.push(' ');
                in_separator_run = true;
            }
        } else {
            name.push(c);
            in_separator_run = false;
        }
    }

    let name = name.trim();
    if name.is_empty() {
        filename.to_string()
    } else {
        name.to_string()
    }
}

pub fn fallback_description(platform_name: &str) -> String {
    format!("A {} game.", platform_name)
}

/// Unidentified result for one filename
pub fn fallback_result(platform_name: &str, filename: &str) -> RomScanResult {
    RomScanResult {
        filename: filename.to_string(),
        name: derive_fallback_name(filename),
        description: fallback_description(platform_name),
        success: false,
    }
}

pub fn fallback_batch(platform_name: &str, filenames: &[String]) -> Vec<RomScanResult> {
    filenames
        .iter()
        .map(|f| fallback_result(platform_name, f))
        .collect()
}

/// Pull a JSON value out of free-form model output
///
/// Tries the span from the first `{` to the last `}`, then the span from
/// the first `[` to the last `]`.
pub fn extract_json(text: &str) -> Option<Value> {
    span_between(text, '{', '}')
        .and_then(|s| serde_json::from_str(s).ok())
        .or_else(|| span_between(text, '[', ']').and_then(|s| serde_json::from_str(s).ok()))
}

fn span_between(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// One identification entry as a model tends to phrase it
#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    success: Option<bool>,
}

/// Entries of a reply: a bare array, the first field of an object holding a
/// non-empty array of objects, or a single object standing for one entry
///
/// Field order in an object is not meaningful, so empty or scalar arrays
/// (`"notes": []`) never shadow the real result list.
fn candidate_entries(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map
            .values()
            .filter_map(Value::as_array)
            .find(|items| !items.is_empty() && items.iter().any(Value::is_object))
            .map(|items| items.iter().collect())
            .unwrap_or_else(|| vec![value]),
        _ => Vec::new(),
    }
}

/// Fill gaps in one entry with fallback values
pub fn complete_entry(
    platform_name: &str,
    filename: &str,
    entry: Option<&Value>,
) -> RomScanResult {
    let candidate = entry
        .and_then(|v| serde_json::from_value::<Candidate>(v.clone()).ok())
        .unwrap_or_default();

    let name = candidate
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    let description = candidate
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    RomScanResult {
        filename: filename.to_string(),
        success: name.is_some() && candidate.success.unwrap_or(false),
        name: name.unwrap_or_else(|| derive_fallback_name(filename)),
        description: description.unwrap_or_else(|| fallback_description(platform_name)),
    }
}

/// Align a batch reply to `filenames` by position
///
/// Missing or malformed entries get the fallback for their filename; extra
/// entries are ignored.
pub fn align_results(
    platform_name: &str,
    filenames: &[String],
    reply: &Value,
) -> Vec<RomScanResult> {
    let entries = candidate_entries(reply);
    filenames
        .iter()
        .enumerate()
        .map(|(i, filename)| complete_entry(platform_name, filename, entries.get(i).copied()))
        .collect()
}
