// src/services/dashboard_service.rs

use chrono::Utc;
use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    services::expense_service::month_bounds,
    models::{
        dashboard::{DashboardSummary, StageCount},
        product::Stage,
    },
};

/// Uma entrada por etapa do catálogo, na ordem do pipeline; etapas sem produto ficam com zero.
pub fn fill_stage_counts(counts: &[StageCount]) -> Vec<StageCount> {
    Stage::ALL
        .iter()
        .map(|stage| StageCount {
            stage: *stage,
            total: counts
                .iter()
                .find(|c| c.stage == *stage)
                .map_or(0, |c| c.total),
        })
        .collect()
}

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    pub async fn get_summary<'e, E>(&self, executor: E) -> Result<DashboardSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let today = Utc::now().date_naive();
        let mut summary = self
            .repo
            .get_summary(executor, today, month_bounds(today)?)
            .await?;
        summary.products_by_stage = fill_stage_counts(&summary.products_by_stage);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_stages_are_filled_with_zero() {
        let counts = vec![
            StageCount { stage: Stage::Testing, total: 3 },
            StageCount { stage: Stage::Idea, total: 2 },
        ];

        let filled = fill_stage_counts(&counts);

        assert_eq!(filled.len(), Stage::ALL.len());
        assert_eq!(filled[0].stage, Stage::Idea);
        assert_eq!(filled[0].total, 2);
        assert_eq!(filled[Stage::Testing.index()].total, 3);
        assert_eq!(filled[Stage::Launched.index()].total, 0);
    }
}
