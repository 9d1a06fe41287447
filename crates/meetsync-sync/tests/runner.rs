//! End-to-end sync-run tests with every upstream mocked via wiremock.

use std::path::Path;
use std::time::Duration;

use meetsync_bmlt::BmltClient;
use meetsync_geocode::NominatimClient;
use meetsync_sync::{run_sync_with_clients, RunState, SyncOptions, USER_AGENT};
use meetsync_wordpress::WordPressClient;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options(data_dir: &Path) -> SyncOptions {
    SyncOptions {
        admin_user: "admin".to_owned(),
        admin_pass: "hunter2".to_owned(),
        service_body_id: 1,
        default_lat: 60.1699,
        default_lon: 24.9384,
        allow_fallback_coords: false,
        default_province: "Uusimaa".to_owned(),
        data_dir: data_dir.to_path_buf(),
        geocode_delay: Duration::ZERO,
    }
}

fn clients(server: &MockServer) -> (WordPressClient, BmltClient, NominatimClient) {
    let wp = WordPressClient::new(&server.uri(), 30, USER_AGENT).expect("wp client");
    let bmlt = BmltClient::new(&server.uri(), "/api/v1", 30, USER_AGENT).expect("bmlt client");
    let geocoder =
        NominatimClient::with_base_url(30, USER_AGENT, &server.uri()).expect("geocoder");
    (wp, bmlt, geocoder)
}

async fn mount_auth_and_formats(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "tok"})),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/formats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 5, "translations": [{"key": "O"}]},
            {"id": 9, "translations": [{"key": "FIN"}]},
            {"id": 20, "translations": [{"key": "VM"}]}
        ])))
        .mount(server)
        .await;
}

async fn mount_meetings(server: &MockServer, meetings: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/kokoukset"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(meetings))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/kokoukset"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(400))
        .mount(server)
        .await;
}

fn in_person_meeting() -> serde_json::Value {
    serde_json::json!({
        "id": 42,
        "title": {"rendered": "Tiistairyhmä"},
        "weekday": "Tiistai",
        "alkamisaika": "19.00",
        "kesto": "90",
        "katuosoite": "Esimerkkikatu 1",
        "postinumero": "00100",
        "kaupunki": "Helsinki",
        "rel_kokousmuodot": ["Avoin"],
        "rel_kokouskielet": "suomi"
    })
}

fn virtual_meeting() -> serde_json::Value {
    serde_json::json!({
        "id": 77,
        "title": {"rendered": "Verkkoryhmä"},
        "weekday": "Torstai",
        "alkamisaika": "20:00",
        "kesto": 60,
        "kaupunki": "Internet",
        "karttalinkki": "https://zoom.us/j/12345",
        "rel_kokouskielet": "suomi"
    })
}

#[tokio::test]
async fn full_run_creates_meetings_and_second_run_skips_unchanged() {
    let server = MockServer::start().await;
    let data_dir = tempfile::tempdir().expect("tempdir");

    mount_auth_and_formats(&server).await;
    mount_meetings(
        &server,
        serde_json::json!([
            in_person_meeting(),
            // No weekday: counted, never sent.
            {"id": 43, "title": {"rendered": "Rikki"}, "alkamisaika": "18:00"}
        ]),
    )
    .await;

    // Exactly one live geocode across both runs: the second run hits the cache.
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Esimerkkikatu 1, 00100, Helsinki, Finland"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!([{"lat": "60.1710", "lon": "24.9420"}]),
        ))
        .expect(1)
        .mount(&server)
        .await;

    // Exactly one create across both runs: the second run sees an unchanged
    // fingerprint and never posts.
    Mock::given(method("POST"))
        .and(path("/api/v1/meetings"))
        .and(body_partial_json(serde_json::json!({
            "externalId": "wp:42",
            "day": 2,
            "startTime": "19:00",
            "duration": "01:30",
            "venueType": 1,
            "formatIds": [5, 9],
            "locationProvince": "Uusimaa"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 9000})))
        .expect(1)
        .mount(&server)
        .await;

    let (wp, bmlt, geocoder) = clients(&server);
    let opts = options(data_dir.path());

    let first = run_sync_with_clients(&wp, &bmlt, &geocoder, &opts)
        .await
        .expect("first run");
    assert_eq!(first.fetched, 2);
    assert_eq!(first.created, 1);
    assert_eq!(first.skipped, 1);
    assert_eq!(first.skipped_reasons.get("missing_day_or_time"), Some(&1));
    assert_eq!(first.failed, 0);

    let state = RunState::load(&RunState::path_in(data_dir.path()));
    assert!(state.fingerprints.contains_key("42"));
    assert!(state.last_run.is_some());

    let second = run_sync_with_clients(&wp, &bmlt, &geocoder, &opts)
        .await
        .expect("second run");
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped_reasons.get("unchanged"), Some(&1));
    assert_eq!(second.skipped_reasons.get("missing_day_or_time"), Some(&1));
}

#[tokio::test]
async fn virtual_meeting_is_created_without_geocoding() {
    let server = MockServer::start().await;
    let data_dir = tempfile::tempdir().expect("tempdir");

    mount_auth_and_formats(&server).await;
    mount_meetings(&server, serde_json::json!([virtual_meeting()])).await;

    // No /search mock is mounted: a geocode attempt would error out and the
    // meeting would be skipped, so a successful create proves the virtual
    // path never geocodes.
    Mock::given(method("POST"))
        .and(path("/api/v1/meetings"))
        .and(body_partial_json(serde_json::json!({
            "externalId": "wp:77",
            "venueType": 2,
            "formatIds": [20, 9],
            "virtualMeetingLink": "https://zoom.us/j/12345",
            "virtual_meeting_link": "https://zoom.us/j/12345"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 9001})))
        .expect(1)
        .mount(&server)
        .await;

    let (wp, bmlt, geocoder) = clients(&server);
    let report = run_sync_with_clients(&wp, &bmlt, &geocoder, &options(data_dir.path()))
        .await
        .expect("run");
    assert_eq!(report.created, 1);
    assert_eq!(report.skipped, 0);
}

#[tokio::test]
async fn create_rejection_is_counted_not_fatal() {
    let server = MockServer::start().await;
    let data_dir = tempfile::tempdir().expect("tempdir");

    mount_auth_and_formats(&server).await;
    mount_meetings(&server, serde_json::json!([virtual_meeting()])).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/meetings"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(serde_json::json!({"errors": {"duration": ["bad"]}})),
        )
        .mount(&server)
        .await;

    let (wp, bmlt, geocoder) = clients(&server);
    let report = run_sync_with_clients(&wp, &bmlt, &geocoder, &options(data_dir.path()))
        .await
        .expect("run should survive a rejected create");
    assert_eq!(report.created, 0);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failed_reasons.get("422"), Some(&1));

    // The failed meeting must not be fingerprinted as done.
    let state = RunState::load(&RunState::path_in(data_dir.path()));
    assert!(!state.fingerprints.contains_key("77"));
    assert_eq!(state.failed, 1);
}

#[tokio::test]
async fn failed_login_aborts_the_run() {
    let server = MockServer::start().await;
    let data_dir = tempfile::tempdir().expect("tempdir");

    mount_meetings(&server, serde_json::json!([virtual_meeting()])).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (wp, bmlt, geocoder) = clients(&server);
    let result = run_sync_with_clients(&wp, &bmlt, &geocoder, &options(data_dir.path())).await;
    assert!(result.is_err(), "login failure should abort the run");
}
