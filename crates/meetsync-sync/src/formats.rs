//! Mapping from WordPress taxonomy tokens to BMLT format ids.

use meetsync_bmlt::FormatIndex;
use serde_json::Value;

use crate::transforms::split_tokens;

/// WordPress token → BMLT format key. Languages first, then meeting types.
/// The `L/R` key must exist on the server for Russian-language meetings to
/// carry a format.
const FORMAT_KEY_MAP: &[(&str, &str)] = &[
    ("suomi", "FIN"),
    ("englanti", "ENG"),
    ("venäjä", "L/R"),
    ("Avoin", "O"),
    ("Suljettu", "C"),
    ("Meditaatio", "ME"),
    ("Puhujakokous", "So"),
    ("Askeltyökokous", "St"),
    ("Hybridi", "HY"),
];

/// The format key attached to every virtual meeting.
const VIRTUAL_FORMAT_KEY: &str = "VM";

/// Language fallback applied when filtering leaves a meeting with no
/// formats at all.
const FALLBACK_FORMAT_KEY: &str = "FIN";

/// Outcome of resolving a meeting's taxonomy tokens against the server's
/// format list.
#[derive(Debug, Default, Clone)]
pub struct FormatSelection {
    /// Ids the server accepts, in token order.
    pub ids: Vec<i64>,
    /// Mapped keys the server does not know at all.
    pub missing_keys: Vec<String>,
    /// Ids that mapped but were rejected by the server's allowed set.
    pub removed_ids: Vec<i64>,
}

#[must_use]
fn key_for_token(token: &str) -> Option<&'static str> {
    FORMAT_KEY_MAP
        .iter()
        .find(|(wp_token, _)| *wp_token == token)
        .map(|(_, key)| *key)
}

/// Resolves the `rel_kokousmuodot`/`rel_kokouskielet` taxonomy fields into
/// server-valid format ids.
///
/// Virtual meetings get the `VM` key prepended. Tokens map through
/// [`FORMAT_KEY_MAP`] with order-preserving dedup; ids the server does not
/// allow are dropped (and reported in `removed_ids`); if nothing survives,
/// the `FIN` language format is used as a fallback so the meeting is not
/// lost for format reasons alone.
#[must_use]
pub fn select_format_ids(
    muodot: Option<&Value>,
    kielet: Option<&Value>,
    virtual_meeting: bool,
    index: &FormatIndex,
) -> FormatSelection {
    let mut tokens = split_tokens(muodot);
    tokens.extend(split_tokens(kielet));

    let mut keys: Vec<&str> = Vec::new();
    if virtual_meeting {
        keys.push(VIRTUAL_FORMAT_KEY);
    }
    for token in &tokens {
        if let Some(key) = key_for_token(token) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }

    let mut selection = FormatSelection::default();
    let mut mapped: Vec<i64> = Vec::new();
    for key in keys {
        match index.id_for_key(key) {
            Some(id) => mapped.push(id),
            None => selection.missing_keys.push(key.to_owned()),
        }
    }

    for id in mapped {
        if index.is_allowed(id) {
            selection.ids.push(id);
        } else {
            selection.removed_ids.push(id);
        }
    }

    if selection.ids.is_empty() {
        if let Some(fin) = index.id_for_key(FALLBACK_FORMAT_KEY) {
            if index.is_allowed(fin) {
                selection.ids.push(fin);
            }
        }
    }

    selection
}
