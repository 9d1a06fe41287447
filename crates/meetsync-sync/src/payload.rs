//! Change fingerprints for meeting payloads.
//!
//! A meeting is only re-sent to BMLT when its payload differs from the one
//! recorded by the previous run. Coordinates are excluded from the
//! fingerprint: geocoding results drift (cache misses, provider updates)
//! and must not make an otherwise unchanged meeting look new.

use sha2::{Digest, Sha256};

use meetsync_bmlt::MeetingPayload;

/// SHA-256 over the canonical wire body, minus `latitude`/`longitude`.
///
/// Canonical means serde_json's default object ordering (sorted keys), so
/// the digest is stable across runs for identical payloads.
#[must_use]
pub fn fingerprint(payload: &MeetingPayload) -> String {
    let mut wire = payload.to_wire();
    if let Some(fields) = wire.as_object_mut() {
        fields.remove("latitude");
        fields.remove("longitude");
    }
    // Serialization of a Value we just built cannot fail.
    let blob = serde_json::to_vec(&wire).unwrap_or_default();
    let digest = Sha256::digest(&blob);
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meetsync_bmlt::VenueType;

    fn sample() -> MeetingPayload {
        MeetingPayload {
            service_body_id: 1,
            name: "Tiistairyhmä".to_owned(),
            day: 2,
            start_time: "19:00".to_owned(),
            duration: "01:30".to_owned(),
            published: true,
            venue_type: VenueType::InPerson,
            latitude: 60.17,
            longitude: 24.94,
            format_ids: vec![5],
            location_street: "Esimerkkikatu 1".to_owned(),
            location_city: "Helsinki".to_owned(),
            location_postal_code: "00100".to_owned(),
            location_country: "Finland".to_owned(),
            location_url: String::new(),
            location_province: "Uusimaa".to_owned(),
            virtual_meeting_link: String::new(),
            phone_meeting_number: String::new(),
            comments: String::new(),
            external_id: "wp:42".to_owned(),
        }
    }

    #[test]
    fn fingerprint_is_stable() {
        assert_eq!(fingerprint(&sample()), fingerprint(&sample()));
    }

    #[test]
    fn fingerprint_ignores_coordinates() {
        let mut moved = sample();
        moved.latitude = 61.0;
        moved.longitude = 25.0;
        assert_eq!(fingerprint(&sample()), fingerprint(&moved));
    }

    #[test]
    fn fingerprint_tracks_content_changes() {
        let mut renamed = sample();
        renamed.name = "Keskiviikkoryhmä".to_owned();
        assert_ne!(fingerprint(&sample()), fingerprint(&renamed));

        let mut rescheduled = sample();
        rescheduled.start_time = "20:00".to_owned();
        assert_ne!(fingerprint(&sample()), fingerprint(&rescheduled));
    }

    #[test]
    fn fingerprint_is_hex_sha256() {
        let fp = fingerprint(&sample());
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
