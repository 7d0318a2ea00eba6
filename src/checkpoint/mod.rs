//! Checkpoint passing validation and recording
//!
//! The hunt is a strictly ordered chain: checkpoint `k` is reachable only
//! after checkpoint `k-1`, each with an enforced minimum dwell time.
//! Duplicate submissions (double-clicks, replayed redirects) are accepted
//! as no-ops rather than rejected, and a recorded timestamp is never
//! overwritten.
//!
//! The decision itself is a pure function over the user's record so it can
//! be tested without a database; [`CheckpointGate`] drives it against the
//! store.

pub mod store;

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::db::schemas::{CheckpointConfigDoc, PasserDoc};
use crate::types::WaypointError;

pub use store::CheckpointStore;

/// What the gate should do for a passing attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// First-ever passing of checkpoint 0: create the user record
    Create,
    /// Record this checkpoint on the existing record
    Record,
    /// Already recorded: accept without mutation
    AlreadyPassed,
}

/// User-visible reason a passing attempt was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The previous checkpoint in the chain has not been passed
    PredecessorNotPassed { ordinal: u32 },
    /// The minimum dwell time since the previous checkpoint has not elapsed
    TooFast { remaining_ms: i64 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::PredecessorNotPassed { .. } => {
                write!(f, "You have not passed the previous checkpoint yet.")
            }
            Rejection::TooFast { remaining_ms } => {
                write!(
                    f,
                    "You arrived too fast. This checkpoint unlocks in {}.",
                    format_remaining(*remaining_ms)
                )
            }
        }
    }
}

/// Outcome of a successful passing attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Passing {
    Recorded,
    AlreadyPassed,
}

/// Failure of a passing attempt
///
/// Rejections carry an explanation for the visitor; storage faults are a
/// distinct kind so the caller can show a generic message while the
/// detail goes to the server log.
#[derive(Debug)]
pub enum PassingError {
    Rejected(Rejection),
    Unavailable(WaypointError),
}

/// Decide what a passing attempt at `ordinal` should do
///
/// Checkpoint 0 has no predecessor: a missing record means create, an
/// existing record means the user already started and the attempt is a
/// no-op. For `k > 0` the predecessor must be recorded and the minimum
/// interval satisfied; a replay of an already-recorded checkpoint is a
/// no-op regardless of timing.
pub fn evaluate(
    record: Option<&PasserDoc>,
    ordinal: u32,
    now_ms: i64,
    min_interval_ms: Option<i64>,
) -> Result<Decision, Rejection> {
    if ordinal == 0 {
        return Ok(match record {
            Some(_) => Decision::AlreadyPassed,
            None => Decision::Create,
        });
    }

    let record = record.ok_or(Rejection::PredecessorNotPassed { ordinal })?;
    let prev = record
        .checkpoint_at(ordinal - 1)
        .ok_or(Rejection::PredecessorNotPassed { ordinal })?;

    if let Some(min_interval) = min_interval_ms {
        let unlocks_at = prev.timestamp_millis() + min_interval;
        if unlocks_at > now_ms {
            return Err(Rejection::TooFast {
                remaining_ms: unlocks_at - now_ms,
            });
        }
    }

    if record.checkpoint_at(ordinal).is_some() {
        return Ok(Decision::AlreadyPassed);
    }

    Ok(Decision::Record)
}

/// Human-readable remaining wait, rounded up to whole seconds above 1s
fn format_remaining(ms: i64) -> String {
    if ms < 1000 {
        return format!("{}ms", ms);
    }

    let total_secs = (ms + 999) / 1000;
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Validation and recording gate for one configured checkpoint
///
/// Holds the immutable checkpoint configuration loaded at startup and the
/// store; all reads and writes of passer records go through here.
pub struct CheckpointGate {
    store: CheckpointStore,
    config: CheckpointConfigDoc,
}

impl CheckpointGate {
    pub fn new(store: CheckpointStore, config: CheckpointConfigDoc) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &CheckpointConfigDoc {
        &self.config
    }

    /// Validate and record a passing of the configured checkpoint
    pub async fn log_passing(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Passing, PassingError> {
        let ordinal = self.config.id;

        let record = self
            .store
            .get_passer(user_id)
            .await
            .map_err(PassingError::Unavailable)?;

        let decision = evaluate(
            record.as_ref(),
            ordinal,
            now.timestamp_millis(),
            self.config.min_interval_ms,
        )
        .map_err(PassingError::Rejected)?;

        let at = bson::DateTime::from_chrono(now);
        match decision {
            Decision::AlreadyPassed => {
                debug!("Checkpoint {} replay for {}, accepting as no-op", ordinal, user_id);
                Ok(Passing::AlreadyPassed)
            }
            Decision::Create => {
                self.store
                    .create_passer(user_id, ordinal, at)
                    .await
                    .map_err(PassingError::Unavailable)?;
                info!("Recorded first passing for {} at checkpoint {}", user_id, ordinal);
                Ok(Passing::Recorded)
            }
            Decision::Record => {
                let wrote = self
                    .store
                    .record_checkpoint(user_id, ordinal, at)
                    .await
                    .map_err(PassingError::Unavailable)?;
                if wrote {
                    info!("Recorded passing for {} at checkpoint {}", user_id, ordinal);
                    Ok(Passing::Recorded)
                } else {
                    // Lost a race with a concurrent duplicate submission;
                    // the earlier timestamp stands.
                    debug!("Checkpoint {} already recorded for {}", ordinal, user_id);
                    Ok(Passing::AlreadyPassed)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passer_with(entries: &[(u32, i64)]) -> PasserDoc {
        let mut passer = PasserDoc::new(
            "184810".to_string(),
            entries[0].0,
            bson::DateTime::from_millis(entries[0].1),
        );
        for (ordinal, at) in &entries[1..] {
            passer
                .checkpoints
                .insert(ordinal.to_string(), bson::DateTime::from_millis(*at));
        }
        passer
    }

    #[test]
    fn test_first_passing_creates_record() {
        assert_eq!(evaluate(None, 0, 5_000, None), Ok(Decision::Create));
    }

    #[test]
    fn test_checkpoint_zero_replay_is_noop() {
        let passer = passer_with(&[(0, 1_000)]);
        assert_eq!(
            evaluate(Some(&passer), 0, 9_000, None),
            Ok(Decision::AlreadyPassed)
        );
    }

    #[test]
    fn test_missing_record_rejects_later_checkpoint() {
        assert_eq!(
            evaluate(None, 2, 5_000, None),
            Err(Rejection::PredecessorNotPassed { ordinal: 2 })
        );
    }

    #[test]
    fn test_missing_predecessor_rejects() {
        // Passed 0 but not 1, attempting 2
        let passer = passer_with(&[(0, 1_000)]);
        assert_eq!(
            evaluate(Some(&passer), 2, 5_000, None),
            Err(Rejection::PredecessorNotPassed { ordinal: 2 })
        );
    }

    #[test]
    fn test_too_fast_reports_exact_remaining_wait() {
        let passer = passer_with(&[(0, 1_000)]);
        // min interval 500ms, arriving 1ms early
        assert_eq!(
            evaluate(Some(&passer), 1, 1_499, Some(500)),
            Err(Rejection::TooFast { remaining_ms: 1 })
        );
    }

    #[test]
    fn test_exact_boundary_passes() {
        let passer = passer_with(&[(0, 1_000)]);
        assert_eq!(
            evaluate(Some(&passer), 1, 1_500, Some(500)),
            Ok(Decision::Record)
        );
    }

    #[test]
    fn test_no_min_interval_passes_immediately() {
        let passer = passer_with(&[(0, 1_000)]);
        assert_eq!(
            evaluate(Some(&passer), 1, 1_000, None),
            Ok(Decision::Record)
        );
    }

    #[test]
    fn test_replay_of_recorded_checkpoint_is_noop() {
        let passer = passer_with(&[(0, 1_000), (1, 2_000)]);
        assert_eq!(
            evaluate(Some(&passer), 1, 50_000, Some(500)),
            Ok(Decision::AlreadyPassed)
        );
    }

    #[test]
    fn test_rejection_messages() {
        let predecessor = Rejection::PredecessorNotPassed { ordinal: 3 };
        assert_eq!(
            predecessor.to_string(),
            "You have not passed the previous checkpoint yet."
        );

        let too_fast = Rejection::TooFast { remaining_ms: 125_000 };
        assert_eq!(
            too_fast.to_string(),
            "You arrived too fast. This checkpoint unlocks in 2m 5s."
        );
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(1), "1ms");
        assert_eq!(format_remaining(999), "999ms");
        assert_eq!(format_remaining(1_000), "1s");
        assert_eq!(format_remaining(1_001), "2s");
        assert_eq!(format_remaining(60_000), "1m 0s");
        assert_eq!(format_remaining(3_600_000), "1h 0m 0s");
    }
}
