//! Read-only views for the dashboard: the status board and portfolio totals.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use pmo_core::project::{group_by_status, partition_archived, BoardColumn, ProjectStatus};
use pmo_db::models::project::{Project, ProjectFilter};
use pmo_db::repositories::ProjectRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Board {
    pub columns: Vec<BoardColumn<Project>>,
    /// Active projects whose stored status is not a known column.
    pub unrecognized: Vec<Project>,
}

#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total: usize,
    pub active: usize,
    pub archived: usize,
    /// Active projects per status; every status is present.
    pub by_status: BTreeMap<String, usize>,
    pub total_budget: f64,
    pub total_award_amount: f64,
    #[serde(rename = "totalSavingsOMR")]
    pub total_savings_omr: f64,
    /// Mean completion over active projects, two decimals. Zero when empty.
    pub average_percentage: f64,
}

/// Totals are computed over active projects only.
pub fn summarize(projects: Vec<Project>) -> PortfolioSummary {
    let total = projects.len();
    let (active, archived) = partition_archived(projects);

    let mut by_status: BTreeMap<String, usize> = ProjectStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    for p in &active {
        *by_status.entry(p.status.clone()).or_default() += 1;
    }

    let sum = |f: fn(&Project) -> Option<f64>| active.iter().filter_map(f).sum::<f64>();
    let average_percentage = if active.is_empty() {
        0.0
    } else {
        let mean = active.iter().map(|p| f64::from(p.percentage)).sum::<f64>()
            / active.len() as f64;
        (mean * 100.0).round() / 100.0
    };

    PortfolioSummary {
        total,
        active: active.len(),
        archived: archived.len(),
        by_status,
        total_budget: sum(|p| p.budget),
        total_award_amount: sum(|p| p.award_amount),
        total_savings_omr: sum(|p| p.savings_omr),
        average_percentage,
    }
}

/// GET /api/dashboard/kanban
pub async fn kanban(State(state): State<AppState>) -> AppResult<Json<Board>> {
    let projects = ProjectRepo::list(&state.pool, &ProjectFilter::default()).await?;
    let (columns, unrecognized) = group_by_status(projects);
    if !unrecognized.is_empty() {
        tracing::warn!(count = unrecognized.len(), "Projects with unrecognized status");
    }
    Ok(Json(Board {
        columns,
        unrecognized,
    }))
}

/// GET /api/dashboard/summary
pub async fn summary(State(state): State<AppState>) -> AppResult<Json<PortfolioSummary>> {
    let projects = ProjectRepo::list(&state.pool, &ProjectFilter::default()).await?;
    Ok(Json(summarize(projects)))
}
