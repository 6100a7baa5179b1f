//! Assets table.
//!
//! `asset_code` is the business key: unique across the table and immutable
//! after creation. `is_active` is governed by the engine's activity policy.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub asset_id: i32,
    #[sea_orm(unique)]
    pub asset_code: String,
    pub asset_name: String,
    pub description: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub category_id: i32,
    pub status_id: i32,
    pub location_id: i32,
    pub manufacturer_id: Option<i32>,
    pub responsible_employee_id: Option<i32>,
    pub purchase_date: Option<Date>,
    pub purchase_price: Option<Decimal>,
    pub is_active: bool,
    pub created_date: DateTimeUtc,
    pub created_by_user_id: i32,
    pub modified_date: Option<DateTimeUtc>,
    pub modified_by_user_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::asset_movements::Entity")]
    Movements,
}

impl Related<super::asset_movements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
