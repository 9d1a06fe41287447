//! Startup readiness gate for the BMLT API.
//!
//! The first sync of a fresh deployment races the BMLT container's own
//! startup, so the daemon probes the API root until it answers. This is a
//! best-effort gate, not a precondition: exhausting the budget logs a
//! warning and startup continues, letting the periodic schedule succeed
//! once the dependency recovers.

use std::time::Duration;

use meetsync_bmlt::BmltClient;

/// Probe budget before giving up and proceeding.
pub const MAX_ATTEMPTS: u32 = 60;

/// Fixed delay between probes.
pub const POLL_DELAY: Duration = Duration::from_secs(5);

/// What the poll loop observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessOutcome {
    pub reachable: bool,
    /// Probes actually issued before stopping.
    pub attempts: u32,
}

/// Polls the API root until it answers 200 or 401, or `max_attempts` probes
/// have been spent.
///
/// 401 counts as reachable: the API is up and enforcing authentication,
/// which is all the gate needs to know — credential validation belongs to
/// the sync run. Network errors and other statuses consume an attempt and
/// the loop sleeps `delay` before the next probe.
pub async fn wait_for_api(
    client: &BmltClient,
    max_attempts: u32,
    delay: Duration,
) -> ReadinessOutcome {
    for attempt in 1..=max_attempts {
        match client.probe().await {
            Ok(status @ (200 | 401)) => {
                tracing::info!(attempt, status, "BMLT API is reachable");
                return ReadinessOutcome {
                    reachable: true,
                    attempts: attempt,
                };
            }
            Ok(status) => {
                tracing::debug!(attempt, status, "BMLT API not ready yet");
            }
            Err(e) => {
                tracing::debug!(attempt, error = %e, "BMLT API probe failed");
            }
        }
        if attempt < max_attempts && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    tracing::warn!(
        max_attempts,
        "BMLT API not reachable within the polling budget; continuing anyway"
    );
    ReadinessOutcome {
        reachable: false,
        attempts: max_attempts,
    }
}
