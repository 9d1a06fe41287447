use thiserror::Error;

use crate::state::StateError;

/// A sync-run failure that aborts the whole run.
///
/// Per-meeting problems (bad data, geocode misses, create rejections) are
/// counted in the run report instead; only source/API/persistence failures
/// that make the run as a whole meaningless surface here.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("WordPress fetch failed: {0}")]
    Source(#[from] meetsync_wordpress::WordPressError),

    #[error("BMLT API error: {0}")]
    Api(#[from] meetsync_bmlt::BmltError),

    #[error("geocoding error: {0}")]
    Geocode(#[from] meetsync_geocode::GeocodeError),

    #[error(transparent)]
    State(#[from] StateError),
}
