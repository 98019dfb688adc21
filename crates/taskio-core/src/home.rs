use taskio_gui_shared::{TaskStatsDto, TaskStatus};
use tracing::info;

use crate::api::TaskApi;
use crate::error::AppError;
use crate::notify::Notifier;

/// Counters shown on the home view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSummary {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
}

impl StatsSummary {
    pub fn from_stats(stats: &TaskStatsDto) -> Self {
        Self {
            total: stats.total,
            completed: stats.count_for(TaskStatus::Done),
            pending: stats.count_for(TaskStatus::Todo) + stats.count_for(TaskStatus::InProgress),
        }
    }
}

/// Fetches the statistics summary; on failure the user gets a toast and
/// the caller keeps its placeholders.
#[tracing::instrument(skip_all)]
pub async fn load_summary(
    api: &dyn TaskApi,
    notifier: &dyn Notifier,
) -> Result<StatsSummary, AppError> {
    match api.statistics().await {
        Ok(stats) => {
            let summary = StatsSummary::from_stats(&stats);
            info!(
                total = summary.total,
                completed = summary.completed,
                pending = summary.pending,
                "statistics loaded"
            );
            Ok(summary)
        }
        Err(err) => {
            let err = AppError::from(err);
            notifier.fail("Could not load statistics", &err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use taskio_gui_shared::StatusCount;

    use super::*;

    fn count(status: &str, count: u64) -> StatusCount {
        StatusCount {
            status: status.to_string(),
            count,
        }
    }

    #[test]
    fn pending_sums_open_columns() {
        let stats = TaskStatsDto {
            total: 9,
            by_status: vec![count("todo", 3), count("in-progress", 2), count("done", 4)],
        };
        assert_eq!(
            StatsSummary::from_stats(&stats),
            StatsSummary {
                total: 9,
                completed: 4,
                pending: 5,
            }
        );
    }

    #[test]
    fn missing_entries_count_as_zero() {
        let stats = TaskStatsDto {
            total: 2,
            by_status: vec![count("done", 2)],
        };
        let summary = StatsSummary::from_stats(&stats);
        assert_eq!(summary.pending, 0);
        assert_eq!(summary.completed, 2);
    }
}
