//! Refreshable dashboard aggregate (single row, rewritten on refresh).

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "dashboard_stats")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub stat_id: i32,
    pub total_assets: i64,
    pub active_assets: i64,
    pub in_repair_assets: i64,
    pub disposed_assets: i64,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
