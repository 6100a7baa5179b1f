//! Dashboard statistics endpoints.

use api_types::stats::{CategoryStat, DashboardStats, RecentAsset, RecentQuery};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use engine::Session;

use crate::{ServerError, server::ServerState};

const DEFAULT_RECENT_LIMIT: u64 = 10;

/// Refreshes and returns the stored dashboard counters.
pub async fn get_stats(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<DashboardStats>, ServerError> {
    let snapshot = state.engine.refresh_dashboard_stats(&session).await?;
    Ok(Json(DashboardStats {
        total_assets: snapshot.total_assets,
        active_assets: snapshot.active_assets,
        in_repair_assets: snapshot.in_repair_assets,
        disposed_assets: snapshot.disposed_assets,
        updated_at: snapshot.updated_at,
    }))
}

pub async fn category_breakdown(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryStat>>, ServerError> {
    let stats = state.engine.category_breakdown(&session).await?;
    Ok(Json(
        stats
            .into_iter()
            .map(|stat| CategoryStat {
                category_id: stat.category_id,
                category_name: stat.category_name,
                count: stat.count,
                percentage: stat.percentage,
            })
            .collect(),
    ))
}

pub async fn recent_assets(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<RecentAsset>>, ServerError> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let rows = state.engine.recent_assets(&session, limit).await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| RecentAsset {
                asset_id: row.asset_id,
                asset_code: row.asset_code,
                asset_name: row.asset_name,
                category_name: row.category_name,
                status_name: row.status_name,
                created_date: row.created_date,
            })
            .collect(),
    ))
}
