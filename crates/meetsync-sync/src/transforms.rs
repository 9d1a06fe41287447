//! Field normalization from WordPress custom fields to BMLT's expectations.
//!
//! The source data is hand-entered: times come as `19`, `19.30`, or `19:30`;
//! durations as strings or numbers; taxonomy fields as strings or lists with
//! Finnish separators. Every function here is total — bad input degrades to
//! an empty/default value, never an error, because a single mangled field
//! should drop at most one meeting.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// BMLT caps `comments` at this many characters.
const COMMENTS_MAX: usize = 512;

/// Duration applied when the source value is missing or unparseable.
const DEFAULT_DURATION_MINUTES: i64 = 90;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(https?://\S+)").expect("static regex"));
static PHONE_COMPACT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\+\d{6,15}|\b0\d{6,15}\b)").expect("static regex"));
static PHONE_LOOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\+\d[\d\s\-]{6,20}|\b0\d[\d\s\-]{6,20})").expect("static regex"));
static NON_PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\d+]").expect("static regex"));
static PAREN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("static regex"));
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// Finnish weekday name → BMLT day index (Sunday = 0).
#[must_use]
pub fn weekday_index(name: &str) -> Option<u8> {
    match name.trim() {
        "Sunnuntai" => Some(0),
        "Maanantai" => Some(1),
        "Tiistai" => Some(2),
        "Keskiviikko" => Some(3),
        "Torstai" => Some(4),
        "Perjantai" => Some(5),
        "Lauantai" => Some(6),
        _ => None,
    }
}

/// Normalizes a start time to `HH:MM`. `19` → `19:00`, `19.30` → `19:30`.
/// Inputs that do not look like a time at all are passed through unchanged
/// (the server rejects them and the meeting fails loudly instead of
/// silently shifting).
#[must_use]
pub fn normalize_time(raw: &str) -> String {
    let s = raw.trim().replace('.', ":");
    if s.is_empty() {
        return String::new();
    }
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() == 1 {
        if let Ok(hours) = parts[0].parse::<u32>() {
            return format!("{hours:02}:00");
        }
        return s;
    }
    match (parts[0].trim().parse::<u32>(), parts[1].trim().parse::<u32>()) {
        (Ok(hours), Ok(minutes)) => format!("{hours:02}:{minutes:02}"),
        _ => s,
    }
}

/// Converts a duration in minutes to BMLT's `HH:MM`, defaulting to 90
/// minutes when missing, unparseable, or non-positive.
#[must_use]
pub fn duration_hm(raw: Option<&str>) -> String {
    let minutes = raw
        .and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|m| *m > 0)
        .unwrap_or(DEFAULT_DURATION_MINUTES);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Strips HTML-ish markup: `<br>` variants become newlines, everything else
/// between `<` and `>` is dropped, blank lines are removed.
#[must_use]
pub fn strip_html_like(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let with_breaks = s
        .replace("<br />", "\n")
        .replace("<br/>", "\n")
        .replace("<br>", "\n");

    let mut out = String::with_capacity(with_breaks.len());
    let mut in_tag = false;
    for ch in with_breaks.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }

    let normalized = out.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = normalized
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    lines.join("\n")
}

/// Caps a comment at [`COMMENTS_MAX`] characters, replacing the tail with a
/// single ellipsis when truncation happens.
#[must_use]
pub fn truncate_comments(s: &str) -> String {
    if s.chars().count() <= COMMENTS_MAX {
        return s.to_owned();
    }
    let mut truncated: String = s.chars().take(COMMENTS_MAX - 1).collect();
    truncated.push('…');
    truncated
}

/// Splits a taxonomy field into tokens. Lists pass through element-wise;
/// strings are split on `,`, `" ja "`, `" & "`, and `;` (the separators the
/// site's editors actually use).
#[must_use]
pub fn split_tokens(value: Option<&Value>) -> Vec<String> {
    let Some(value) = value else {
        return Vec::new();
    };
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_owned()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => {
            let mut joined = s.clone();
            for sep in [" ja ", " & ", ";"] {
                joined = joined.replace(sep, ",");
            }
            joined
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_owned)
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Heuristic for virtual meetings: the city says "internet", or a
/// zoom/teams marker shows up in the street or map link.
#[must_use]
pub fn is_virtual(street: &str, city: &str, link: &str) -> bool {
    let street = street.to_lowercase();
    let city = city.to_lowercase();
    let link = link.to_lowercase();
    city.contains("internet")
        || street.contains("zoom")
        || link.contains("zoom")
        || link.contains("teams")
}

/// First `http(s)://` URL in the text, with trailing punctuation trimmed.
#[must_use]
pub fn extract_first_url(text: &str) -> Option<String> {
    let found = URL_RE.find(text)?;
    let trimmed = found
        .as_str()
        .trim_end_matches([')', '.', ',', ']'])
        .to_owned();
    Some(trimmed)
}

/// Pulls a phone number out of free-form text: first by compacting spaces
/// and hyphens away, then by a looser match whose non-digits are stripped.
#[must_use]
pub fn extract_phone_number(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let stripped = strip_html_like(text);
    let compact = stripped.replace([' ', '-'], "");
    if let Some(found) = PHONE_COMPACT_RE.find(&compact) {
        return Some(found.as_str().to_owned());
    }
    let found = PHONE_LOOSE_RE.find(&stripped)?;
    Some(NON_PHONE_RE.replace_all(found.as_str(), "").into_owned())
}

/// Builds a Nominatim query from address parts: parenthesised asides are
/// dropped, slashes become spaces, whitespace collapses, and the non-empty
/// parts join with ", ".
#[must_use]
pub fn clean_geocode_query(street: &str, postal: &str, city: &str, country: &str) -> String {
    let clean = |part: &str| -> String {
        let no_parens = PAREN_RE.replace_all(part.trim(), "");
        let no_slashes = no_parens.replace('/', " ");
        WS_RE.replace_all(&no_slashes, " ").trim().to_owned()
    };
    [street, postal, city, country]
        .iter()
        .map(|part| clean(part))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
