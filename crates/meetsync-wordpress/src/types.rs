//! Wire types for the WordPress REST API's custom `kokoukset` post type.
//!
//! The custom fields come out of WordPress with loose typing: times and
//! durations may be strings or numbers, and the `rel_*` taxonomy fields may
//! be a string or a list. Deserialization tolerates all of these; callers
//! normalise the values downstream.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A rendered-content wrapper, e.g. `{"rendered": "Tiistairyhmä"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct WpRendered {
    #[serde(default)]
    pub rendered: String,
}

/// One meeting post from `/wp-json/wp/v2/kokoukset`.
///
/// Field names are the site's Finnish custom-field slugs: `alkamisaika`
/// (start time), `kesto` (duration in minutes), `katuosoite` (street),
/// `postinumero` (postal code), `kaupunki` (city), `maa` (country),
/// `karttalinkki` (map/meeting link), `lisatiedot` (extra info).
#[derive(Debug, Clone, Deserialize)]
pub struct WpMeeting {
    pub id: i64,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: Option<WpRendered>,
    #[serde(default)]
    pub weekday: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub alkamisaika: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub kesto: Option<String>,
    #[serde(default)]
    pub katuosoite: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub postinumero: Option<String>,
    #[serde(default)]
    pub kaupunki: Option<String>,
    #[serde(default)]
    pub maa: Option<String>,
    #[serde(default)]
    pub karttalinkki: Option<String>,
    #[serde(default)]
    pub lisatiedot: Option<String>,
    #[serde(default)]
    pub rel_kokousmuodot: Option<Value>,
    #[serde(default)]
    pub rel_kokouskielet: Option<Value>,
}

impl WpMeeting {
    /// Display name for logs and the BMLT `name` field: rendered title,
    /// falling back to the slug, falling back to `WP-{id}`.
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(title) = &self.title {
            if !title.rendered.trim().is_empty() {
                return title.rendered.clone();
            }
        }
        if let Some(slug) = &self.slug {
            if !slug.trim().is_empty() {
                return slug.clone();
            }
        }
        format!("WP-{}", self.id)
    }
}

/// Accepts a JSON string or number and yields it as a string; null and other
/// shapes become `None`.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_full_meeting() {
        let raw = serde_json::json!({
            "id": 42,
            "slug": "tiistairyhma",
            "title": {"rendered": "Tiistairyhmä"},
            "weekday": "Tiistai",
            "alkamisaika": "19.00",
            "kesto": 90,
            "katuosoite": "Esimerkkikatu 1",
            "postinumero": 150,
            "kaupunki": "Helsinki",
            "maa": "Suomi",
            "karttalinkki": "https://maps.example.org/x",
            "lisatiedot": "Ovi sisäpihalta",
            "rel_kokousmuodot": ["Avoin", "Hybridi"],
            "rel_kokouskielet": "suomi"
        });
        let meeting: WpMeeting = serde_json::from_value(raw).expect("should deserialize");
        assert_eq!(meeting.id, 42);
        assert_eq!(meeting.display_name(), "Tiistairyhmä");
        assert_eq!(meeting.alkamisaika.as_deref(), Some("19.00"));
        // Numeric custom fields come back as strings.
        assert_eq!(meeting.kesto.as_deref(), Some("90"));
        assert_eq!(meeting.postinumero.as_deref(), Some("150"));
    }

    #[test]
    fn tolerates_missing_custom_fields() {
        let raw = serde_json::json!({"id": 7});
        let meeting: WpMeeting = serde_json::from_value(raw).expect("should deserialize");
        assert!(meeting.weekday.is_none());
        assert!(meeting.kesto.is_none());
        assert!(meeting.rel_kokousmuodot.is_none());
        assert_eq!(meeting.display_name(), "WP-7");
    }

    #[test]
    fn display_name_falls_back_to_slug() {
        let raw = serde_json::json!({"id": 9, "slug": "ilta-ryhma", "title": {"rendered": ""}});
        let meeting: WpMeeting = serde_json::from_value(raw).expect("should deserialize");
        assert_eq!(meeting.display_name(), "ilta-ryhma");
    }

    #[test]
    fn null_custom_field_becomes_none() {
        let raw = serde_json::json!({"id": 3, "kesto": null, "alkamisaika": false});
        let meeting: WpMeeting = serde_json::from_value(raw).expect("should deserialize");
        assert!(meeting.kesto.is_none());
        assert!(meeting.alkamisaika.is_none());
    }
}
