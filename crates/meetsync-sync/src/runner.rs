//! The synchronization run: WordPress meetings in, BMLT meetings out.
//!
//! One run is a full pass: fetch every meeting post, authenticate, resolve
//! formats, then process meetings one at a time. Per-meeting problems are
//! counted and logged rather than propagated, so a single bad post never
//! aborts the run. Meetings whose payload fingerprint matches the previous
//! run are skipped without an API call.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use meetsync_bmlt::{BmltClient, BmltError, FormatIndex, MeetingPayload, VenueType};
use meetsync_core::AppConfig;
use meetsync_geocode::{GeocodeCache, NominatimClient};
use meetsync_wordpress::{WordPressClient, WpMeeting};

use crate::error::SyncError;
use crate::formats::select_format_ids;
use crate::payload::fingerprint;
use crate::state::RunState;
use crate::transforms;

/// User agent sent by every outbound client.
pub const USER_AGENT: &str = "meetsync/0.1 (wp-to-bmlt)";

/// Politeness delay after each live Nominatim lookup.
const GEOCODE_DELAY: Duration = Duration::from_millis(1100);

/// Progress log cadence during large imports.
const CREATED_LOG_EVERY: u32 = 25;

/// Everything a run needs besides the HTTP clients.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub admin_user: String,
    pub admin_pass: String,
    pub service_body_id: i64,
    pub default_lat: f64,
    pub default_lon: f64,
    pub allow_fallback_coords: bool,
    pub default_province: String,
    pub data_dir: PathBuf,
    /// Zero in tests; [`GEOCODE_DELAY`] in production.
    pub geocode_delay: Duration,
}

impl SyncOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            admin_user: config.bmlt_admin_user.clone(),
            admin_pass: config.bmlt_admin_pass.clone(),
            service_body_id: config.service_body_id,
            default_lat: config.default_lat,
            default_lon: config.default_lon,
            allow_fallback_coords: config.allow_fallback_coords,
            default_province: config.default_province.clone(),
            data_dir: config.data_dir.clone(),
            geocode_delay: GEOCODE_DELAY,
        }
    }
}

/// Totals for one sync run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub fetched: usize,
    pub created: u32,
    pub skipped: u32,
    pub failed: u32,
    pub skipped_reasons: BTreeMap<String, u32>,
    pub failed_reasons: BTreeMap<String, u32>,
}

/// Outcome of processing a single meeting post.
enum MeetingOutcome {
    Created { fingerprint: String },
    Skipped { reason: &'static str },
    Failed { reason: String },
}

struct RunContext<'a> {
    bmlt: &'a BmltClient,
    geocoder: &'a NominatimClient,
    token: &'a str,
    formats: &'a FormatIndex,
    opts: &'a SyncOptions,
    cache: &'a mut GeocodeCache,
    known_fingerprints: &'a BTreeMap<String, String>,
}

/// Runs one synchronization pass with clients built from `config`.
///
/// # Errors
///
/// Returns [`SyncError`] when the run as a whole cannot proceed: client
/// construction, the WordPress fetch, BMLT login or format loading, or
/// persisting the cache/state afterwards.
pub async fn run_sync(config: &AppConfig) -> Result<RunReport, SyncError> {
    let wp = WordPressClient::new(&config.wp_base, config.http_timeout_secs, USER_AGENT)?;
    let bmlt = BmltClient::new(
        &config.bmlt_base_url,
        &config.bmlt_api_prefix,
        config.http_timeout_secs,
        USER_AGENT,
    )?;
    let geocoder = NominatimClient::new(config.http_timeout_secs, USER_AGENT)?;
    run_sync_with_clients(&wp, &bmlt, &geocoder, &SyncOptions::from_config(config)).await
}

/// Runs one synchronization pass against explicit clients.
///
/// Split out from [`run_sync`] so tests can point every client at a mock
/// server and zero out the geocode delay.
///
/// # Errors
///
/// See [`run_sync`].
pub async fn run_sync_with_clients(
    wp: &WordPressClient,
    bmlt: &BmltClient,
    geocoder: &NominatimClient,
    opts: &SyncOptions,
) -> Result<RunReport, SyncError> {
    let meetings = wp.fetch_all_meetings().await?;
    tracing::info!(count = meetings.len(), "fetched meetings from WordPress");

    let token = bmlt.login(&opts.admin_user, &opts.admin_pass).await?;
    tracing::info!("authenticated to BMLT API");

    let formats = bmlt.get_formats(&token).await?;
    tracing::info!(keys = formats.key_count(), "loaded format keys from BMLT");

    let mut cache = GeocodeCache::load(GeocodeCache::path_in(&opts.data_dir));
    let state_path = RunState::path_in(&opts.data_dir);
    let mut state = RunState::load(&state_path);

    let mut report = RunReport {
        fetched: meetings.len(),
        ..RunReport::default()
    };

    for meeting in &meetings {
        let outcome = {
            let mut ctx = RunContext {
                bmlt,
                geocoder,
                token: &token,
                formats: &formats,
                opts,
                cache: &mut cache,
                known_fingerprints: &state.fingerprints,
            };
            process_meeting(&mut ctx, meeting).await
        };

        match outcome {
            MeetingOutcome::Created { fingerprint } => {
                report.created += 1;
                state.fingerprints.insert(meeting.id.to_string(), fingerprint);
                if report.created % CREATED_LOG_EVERY == 0 {
                    tracing::info!(created = report.created, "created meetings so far");
                }
            }
            MeetingOutcome::Skipped { reason } => {
                report.skipped += 1;
                *report.skipped_reasons.entry(reason.to_owned()).or_insert(0) += 1;
            }
            MeetingOutcome::Failed { reason } => {
                report.failed += 1;
                *report.failed_reasons.entry(reason).or_insert(0) += 1;
            }
        }
    }

    cache.save()?;

    state.last_run = Some(chrono::Utc::now());
    state.created = report.created;
    state.skipped = report.skipped;
    state.failed = report.failed;
    state.skipped_reasons = report.skipped_reasons.clone();
    state.failed_reasons = report.failed_reasons.clone();
    state.save(&state_path)?;

    tracing::info!(
        created = report.created,
        skipped = report.skipped,
        failed = report.failed,
        "sync run complete"
    );
    if !report.skipped_reasons.is_empty() {
        tracing::info!(reasons = ?report.skipped_reasons, "skip reasons");
    }
    if !report.failed_reasons.is_empty() {
        tracing::info!(reasons = ?report.failed_reasons, "failure reasons");
    }

    Ok(report)
}

/// Decide what to do with one meeting post and, when it survives the data
/// checks, create it via the Admin API.
async fn process_meeting(ctx: &mut RunContext<'_>, meeting: &WpMeeting) -> MeetingOutcome {
    let wp_id = meeting.id;

    let day = meeting
        .weekday
        .as_deref()
        .and_then(transforms::weekday_index);
    let start_time = transforms::normalize_time(meeting.alkamisaika.as_deref().unwrap_or(""));
    let duration = transforms::duration_hm(meeting.kesto.as_deref());

    let Some(day) = day else {
        return MeetingOutcome::Skipped {
            reason: "missing_day_or_time",
        };
    };
    if start_time.is_empty() {
        return MeetingOutcome::Skipped {
            reason: "missing_day_or_time",
        };
    }

    let trimmed = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_owned()
    };
    let street = trimmed(&meeting.katuosoite);
    let postal = trimmed(&meeting.postinumero);
    let city = trimmed(&meeting.kaupunki);
    let map_url = trimmed(&meeting.karttalinkki);
    let country = {
        let maa = trimmed(&meeting.maa);
        if maa.is_empty() {
            "Finland".to_owned()
        } else {
            maa
        }
    };

    let info_raw = meeting.lisatiedot.as_deref().unwrap_or("");
    let comments_stripped = transforms::strip_html_like(info_raw);
    let comments = transforms::truncate_comments(&comments_stripped);

    let virtual_meeting = transforms::is_virtual(&street, &city, &map_url);
    let mut virtual_link = String::new();
    let mut phone_number = String::new();
    if virtual_meeting {
        if map_url.starts_with("http://") || map_url.starts_with("https://") {
            virtual_link.clone_from(&map_url);
        }
        if virtual_link.is_empty() {
            virtual_link = transforms::extract_first_url(&comments_stripped).unwrap_or_default();
        }
        phone_number = transforms::extract_phone_number(info_raw).unwrap_or_default();
        if virtual_link.is_empty() && phone_number.is_empty() {
            tracing::warn!(wp_id, "skipping virtual meeting without link or phone");
            return MeetingOutcome::Skipped {
                reason: "virtual_missing_link_or_phone",
            };
        }
    }

    if !virtual_meeting && (street.is_empty() || (city.is_empty() && postal.is_empty())) {
        tracing::warn!(wp_id, "skipping in-person meeting without street or city/postal");
        return MeetingOutcome::Skipped {
            reason: "in_person_missing_address",
        };
    }

    let mut venue_type = if virtual_meeting {
        VenueType::Virtual
    } else {
        VenueType::InPerson
    };
    let muodot_tokens = transforms::split_tokens(meeting.rel_kokousmuodot.as_ref());
    if muodot_tokens.iter().any(|t| t == "Hybridi") {
        venue_type = if !street.is_empty() && (!city.is_empty() || !postal.is_empty()) {
            VenueType::Hybrid
        } else {
            VenueType::Virtual
        };
    }

    let selection = select_format_ids(
        meeting.rel_kokousmuodot.as_ref(),
        meeting.rel_kokouskielet.as_ref(),
        virtual_meeting,
        ctx.formats,
    );
    if selection.ids.is_empty() {
        tracing::warn!(
            wp_id,
            missing = ?selection.missing_keys,
            removed = ?selection.removed_ids,
            "skipping meeting with no valid formats"
        );
        return MeetingOutcome::Skipped {
            reason: "no_valid_formats",
        };
    }

    let mut latitude = ctx.opts.default_lat;
    let mut longitude = ctx.opts.default_lon;
    if venue_type != VenueType::Virtual {
        let query = transforms::clean_geocode_query(&street, &postal, &city, &country);
        if !query.is_empty() {
            if let Some((lat, lon)) = ctx.cache.get(&query) {
                latitude = lat;
                longitude = lon;
            } else {
                match ctx.geocoder.geocode(&query).await {
                    Ok(result) => {
                        if !ctx.opts.geocode_delay.is_zero() {
                            tokio::time::sleep(ctx.opts.geocode_delay).await;
                        }
                        if let Some((lat, lon)) = result {
                            latitude = lat;
                            longitude = lon;
                            ctx.cache.insert(query, (lat, lon));
                        } else if !ctx.opts.allow_fallback_coords {
                            tracing::warn!(wp_id, %query, "skipping meeting that could not be geocoded");
                            return MeetingOutcome::Skipped {
                                reason: "geocode_failed",
                            };
                        }
                    }
                    Err(e) => {
                        if !ctx.opts.allow_fallback_coords {
                            tracing::warn!(wp_id, error = %e, "skipping meeting after geocode error");
                            return MeetingOutcome::Skipped {
                                reason: "geocode_error",
                            };
                        }
                    }
                }
            }
        }
    }

    let payload = MeetingPayload {
        service_body_id: ctx.opts.service_body_id,
        name: transforms::strip_html_like(&meeting.display_name()),
        day,
        start_time,
        duration,
        published: true,
        venue_type,
        latitude,
        longitude,
        format_ids: selection.ids.clone(),
        location_street: street,
        location_city: city,
        location_postal_code: postal,
        location_country: country,
        location_url: map_url,
        location_province: ctx.opts.default_province.clone(),
        virtual_meeting_link: virtual_link,
        phone_meeting_number: phone_number,
        comments,
        external_id: format!("wp:{wp_id}"),
    };

    let fp = fingerprint(&payload);
    if ctx.known_fingerprints.get(&wp_id.to_string()) == Some(&fp) {
        return MeetingOutcome::Skipped { reason: "unchanged" };
    }

    match ctx.bmlt.create_meeting(ctx.token, &payload).await {
        Ok(()) => {
            if !selection.missing_keys.is_empty() {
                tracing::info!(wp_id, missing = ?selection.missing_keys, "format keys not present in BMLT");
            }
            if !selection.removed_ids.is_empty() {
                tracing::info!(wp_id, removed = ?selection.removed_ids, "dropped format ids the server does not accept");
            }
            MeetingOutcome::Created { fingerprint: fp }
        }
        Err(BmltError::UnexpectedStatus { status, body, .. }) => {
            tracing::error!(wp_id, status, body = %body, "meeting create rejected");
            MeetingOutcome::Failed {
                reason: status.to_string(),
            }
        }
        Err(e) => {
            tracing::error!(wp_id, error = %e, "meeting create failed");
            MeetingOutcome::Failed {
                reason: "exception".to_owned(),
            }
        }
    }
}
