//! Wire types for the BMLT Admin API v4.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::Value;

/// One entry from `/formats`.
#[derive(Debug, Clone, Deserialize)]
pub struct Format {
    pub id: i64,
    #[serde(default)]
    pub translations: Vec<FormatTranslation>,
}

/// A per-language translation of a format; `key` is the short code
/// (`O`, `C`, `VM`, `FIN`, ...) meetings reference.
#[derive(Debug, Clone, Deserialize)]
pub struct FormatTranslation {
    #[serde(default)]
    pub key: Option<String>,
}

/// Lookup structure built from the server's format list: short code → id,
/// plus the set of ids the server will actually accept on a meeting.
#[derive(Debug, Clone, Default)]
pub struct FormatIndex {
    by_key: HashMap<String, i64>,
    allowed: HashSet<i64>,
}

impl FormatIndex {
    #[must_use]
    pub fn from_formats(formats: &[Format]) -> Self {
        let mut by_key = HashMap::new();
        let mut allowed = HashSet::new();
        for format in formats {
            allowed.insert(format.id);
            for translation in &format.translations {
                if let Some(key) = translation.key.as_deref() {
                    let key = key.trim();
                    if !key.is_empty() {
                        by_key.insert(key.to_owned(), format.id);
                    }
                }
            }
        }
        Self { by_key, allowed }
    }

    #[must_use]
    pub fn id_for_key(&self, key: &str) -> Option<i64> {
        self.by_key.get(key).copied()
    }

    #[must_use]
    pub fn is_allowed(&self, id: i64) -> bool {
        self.allowed.contains(&id)
    }

    /// Number of distinct format keys known to the server.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.by_key.len()
    }
}

/// Venue type codes the Admin API expects on a meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenueType {
    InPerson,
    Virtual,
    Hybrid,
}

impl VenueType {
    #[must_use]
    pub fn as_int(self) -> u8 {
        match self {
            VenueType::InPerson => 1,
            VenueType::Virtual => 2,
            VenueType::Hybrid => 3,
        }
    }
}

/// A meeting to create via `POST /meetings`.
///
/// The struct keeps one field per datum; [`MeetingPayload::to_wire`] emits
/// the request body, duplicating location and virtual fields in both
/// camelCase and snake_case because validator builds in the wild disagree
/// on which casing they read.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingPayload {
    pub service_body_id: i64,
    pub name: String,
    /// Weekday, 0 (Sunday) through 6 (Saturday).
    pub day: u8,
    /// `HH:MM`.
    pub start_time: String,
    /// `HH:MM`.
    pub duration: String,
    pub published: bool,
    pub venue_type: VenueType,
    pub latitude: f64,
    pub longitude: f64,
    pub format_ids: Vec<i64>,
    pub location_street: String,
    pub location_city: String,
    pub location_postal_code: String,
    pub location_country: String,
    pub location_url: String,
    pub location_province: String,
    pub virtual_meeting_link: String,
    pub phone_meeting_number: String,
    pub comments: String,
    pub external_id: String,
}

impl MeetingPayload {
    /// Serializes the payload into the Admin API request body.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        serde_json::json!({
            "serviceBodyId": self.service_body_id,
            "name": self.name,
            "day": self.day,
            "startTime": self.start_time,
            "duration": self.duration,
            "published": self.published,
            "venueType": self.venue_type.as_int(),
            "latitude": self.latitude,
            "longitude": self.longitude,
            "formatIds": self.format_ids,
            "locationStreet": self.location_street,
            "locationCity": self.location_city,
            "locationPostalCode": self.location_postal_code,
            "locationCountry": self.location_country,
            "locationUrl": self.location_url,
            "locationProvince": self.location_province,
            "location_street": self.location_street,
            "location_municipality": self.location_city,
            "location_postal_code": self.location_postal_code,
            "location_country": self.location_country,
            "location_url": self.location_url,
            "location_province": self.location_province,
            "virtualMeetingLink": self.virtual_meeting_link,
            "virtual_meeting_link": self.virtual_meeting_link,
            "phoneMeetingNumber": self.phone_meeting_number,
            "phone_meeting_number": self.phone_meeting_number,
            "comments": self.comments,
            "externalId": self.external_id,
        })
    }
}
