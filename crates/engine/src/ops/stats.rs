use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, Statement,
    TransactionTrait, prelude::*,
};

use crate::{
    ResultEngine, Session, asset_statuses, assets, categories, dashboard_stats,
};

use super::{Engine, with_tx};

/// The dashboard counters, as last refreshed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DashboardSnapshot {
    pub total_assets: i64,
    pub active_assets: i64,
    pub in_repair_assets: i64,
    pub disposed_assets: i64,
    pub updated_at: DateTime<Utc>,
}

/// Per-category share of the active asset stock.
#[derive(Clone, Debug)]
pub struct CategoryStat {
    pub category_id: i32,
    pub category_name: String,
    pub count: i64,
    pub percentage: f64,
}

/// Newest assets for the dashboard feed.
#[derive(Clone, Debug)]
pub struct RecentAsset {
    pub asset_id: i32,
    pub asset_code: String,
    pub asset_name: String,
    pub category_name: String,
    pub status_name: String,
    pub created_date: DateTime<Utc>,
}

async fn count_scalar(
    db_tx: &DatabaseTransaction,
    sql: &str,
    values: Vec<sea_orm::Value>,
) -> ResultEngine<i64> {
    let stmt = Statement::from_sql_and_values(db_tx.get_database_backend(), sql, values);
    let row = db_tx.query_one(stmt).await?;
    Ok(row.and_then(|r| r.try_get("", "cnt").ok()).unwrap_or(0))
}

impl Engine {
    /// Recomputes the dashboard counters and rewrites the stored aggregate
    /// row, returning the fresh numbers.
    ///
    /// Totals cover active rows; the disposed counter covers all rows so
    /// retired stock stays visible.
    pub async fn refresh_dashboard_stats(
        &self,
        _session: &Session,
    ) -> ResultEngine<DashboardSnapshot> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let total_assets = count_scalar(
                &db_tx,
                "SELECT COUNT(*) AS cnt FROM assets WHERE is_active = ?",
                vec![true.into()],
            )
            .await?;
            let by_status = "SELECT COUNT(*) AS cnt FROM assets a \
                 JOIN asset_statuses s ON s.status_id = a.status_id \
                 WHERE s.status_name = ?";
            let active_assets = count_scalar(
                &db_tx,
                by_status,
                vec![asset_statuses::ACTIVE_STATUS_NAME.into()],
            )
            .await?;
            let in_repair_assets = count_scalar(
                &db_tx,
                by_status,
                vec![asset_statuses::IN_REPAIR_STATUS_NAME.into()],
            )
            .await?;
            let disposed_assets = count_scalar(
                &db_tx,
                by_status,
                vec![asset_statuses::DISPOSED_STATUS_NAME.into()],
            )
            .await?;

            let existing = dashboard_stats::Entity::find().one(&db_tx).await?;
            match existing {
                Some(row) => {
                    let active = dashboard_stats::ActiveModel {
                        stat_id: ActiveValue::Set(row.stat_id),
                        total_assets: ActiveValue::Set(total_assets),
                        active_assets: ActiveValue::Set(active_assets),
                        in_repair_assets: ActiveValue::Set(in_repair_assets),
                        disposed_assets: ActiveValue::Set(disposed_assets),
                        updated_at: ActiveValue::Set(now),
                    };
                    active.update(&db_tx).await?;
                }
                None => {
                    let active = dashboard_stats::ActiveModel {
                        total_assets: ActiveValue::Set(total_assets),
                        active_assets: ActiveValue::Set(active_assets),
                        in_repair_assets: ActiveValue::Set(in_repair_assets),
                        disposed_assets: ActiveValue::Set(disposed_assets),
                        updated_at: ActiveValue::Set(now),
                        ..Default::default()
                    };
                    active.insert(&db_tx).await?;
                }
            }

            Ok(DashboardSnapshot {
                total_assets,
                active_assets,
                in_repair_assets,
                disposed_assets,
                updated_at: now,
            })
        })
    }

    /// Active asset counts per category, descending, with percentage shares.
    pub async fn category_breakdown(&self, _session: &Session) -> ResultEngine<Vec<CategoryStat>> {
        with_tx!(self, |db_tx| {
            let models = assets::Entity::find()
                .filter(assets::Column::IsActive.eq(true))
                .all(&db_tx)
                .await?;
            let total = models.len() as i64;

            let mut counts: HashMap<i32, i64> = HashMap::new();
            for model in &models {
                *counts.entry(model.category_id).or_insert(0) += 1;
            }

            let category_names: HashMap<i32, String> = categories::Entity::find()
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|m| (m.category_id, m.category_name))
                .collect();

            let mut stats: Vec<CategoryStat> = counts
                .into_iter()
                .filter_map(|(category_id, count)| {
                    category_names.get(&category_id).map(|name| CategoryStat {
                        category_id,
                        category_name: name.clone(),
                        count,
                        percentage: if total > 0 {
                            count as f64 * 100.0 / total as f64
                        } else {
                            0.0
                        },
                    })
                })
                .collect();
            stats.sort_by(|a, b| b.count.cmp(&a.count).then(a.category_name.cmp(&b.category_name)));
            Ok(stats)
        })
    }

    /// Newest active assets by creation date.
    pub async fn recent_assets(
        &self,
        _session: &Session,
        limit: u64,
    ) -> ResultEngine<Vec<RecentAsset>> {
        with_tx!(self, |db_tx| {
            let models = assets::Entity::find()
                .filter(assets::Column::IsActive.eq(true))
                .order_by_desc(assets::Column::CreatedDate)
                .limit(limit)
                .all(&db_tx)
                .await?;

            let category_names: HashMap<i32, String> = categories::Entity::find()
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|m| (m.category_id, m.category_name))
                .collect();
            let status_names: HashMap<i32, String> = asset_statuses::Entity::find()
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|m| (m.status_id, m.status_name))
                .collect();

            let unknown = || "—".to_string();
            Ok(models
                .into_iter()
                .map(|model| RecentAsset {
                    asset_id: model.asset_id,
                    asset_code: model.asset_code,
                    asset_name: model.asset_name,
                    category_name: category_names
                        .get(&model.category_id)
                        .cloned()
                        .unwrap_or_else(unknown),
                    status_name: status_names
                        .get(&model.status_id)
                        .cloned()
                        .unwrap_or_else(unknown),
                    created_date: model.created_date,
                })
                .collect())
        })
    }
}
