//! Critical vs. advisory work.
//!
//! Critical steps of an operation propagate their errors with `?`. Advisory
//! steps (streak bookkeeping, auto-queueing a missed item, daily activity
//! aggregation) go through [`run_advisory`], which logs a failure and turns
//! it into an [`AdvisoryOutcome`] instead of aborting the caller.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::warn;

use crate::error::ProctorResult;

/// Non-critical side effects of recording an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AdvisoryTask {
    StreakUpdate,
    AutoQueueOnMiss,
    DailyActivity,
}

/// What happened to an advisory task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdvisoryOutcome {
    /// The side effect was written.
    Applied,
    /// Nothing to do (e.g. the review entry already existed).
    Skipped,
    /// The side effect failed and was ignored.
    Failed { reason: String },
}

impl AdvisoryOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcome of one advisory task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryRecord {
    pub task: AdvisoryTask,
    #[serde(flatten)]
    pub outcome: AdvisoryOutcome,
}

/// Absorb the result of an advisory task.
///
/// `Ok(true)` means the side effect was applied, `Ok(false)` that it was a
/// no-op. Errors are logged and never propagated.
pub fn run_advisory(task: AdvisoryTask, result: ProctorResult<bool>) -> AdvisoryRecord {
    let outcome = match result {
        Ok(true) => AdvisoryOutcome::Applied,
        Ok(false) => AdvisoryOutcome::Skipped,
        Err(e) => {
            warn!(task = %task, error = %e, "Advisory task failed; continuing");
            AdvisoryOutcome::Failed {
                reason: e.to_string(),
            }
        }
    };
    AdvisoryRecord { task, outcome }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProctorError;

    #[test]
    fn test_failure_is_absorbed() {
        let record = run_advisory(
            AdvisoryTask::AutoQueueOnMiss,
            Err(ProctorError::store("database is locked")),
        );
        assert_eq!(record.task, AdvisoryTask::AutoQueueOnMiss);
        assert!(record.outcome.is_failed());
    }

    #[test]
    fn test_applied_and_skipped() {
        assert_eq!(
            run_advisory(AdvisoryTask::StreakUpdate, Ok(true)).outcome,
            AdvisoryOutcome::Applied
        );
        assert_eq!(
            run_advisory(AdvisoryTask::StreakUpdate, Ok(false)).outcome,
            AdvisoryOutcome::Skipped
        );
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = AdvisoryRecord {
            task: AdvisoryTask::DailyActivity,
            outcome: AdvisoryOutcome::Failed {
                reason: "boom".to_string(),
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["task"], "daily_activity");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "boom");
    }
}
