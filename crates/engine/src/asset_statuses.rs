//! Asset status registry.
//!
//! Statuses are resolved by name: the record named [`DISPOSED_STATUS_NAME`]
//! drives the dispose operation and the status-derived activity policy.

use sea_orm::entity::prelude::*;

/// Retired assets carry this status.
pub const DISPOSED_STATUS_NAME: &str = "Списан";
/// In-service status, used by the dashboard counters.
pub const ACTIVE_STATUS_NAME: &str = "Активен";
/// Under-repair status, used by the dashboard counters.
pub const IN_REPAIR_STATUS_NAME: &str = "На ремонте";
/// Stocked-but-unassigned status.
pub const IN_STOCK_STATUS_NAME: &str = "На складе";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "asset_statuses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub status_id: i32,
    pub status_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
