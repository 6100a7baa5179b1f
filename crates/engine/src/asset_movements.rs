//! Asset relocation history.
//!
//! Rows here block hard deletion of the referenced asset.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "asset_movements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub movement_id: i32,
    pub asset_id: i32,
    pub from_location_id: Option<i32>,
    pub to_location_id: i32,
    pub moved_date: DateTimeUtc,
    pub moved_by_user_id: i32,
    pub note: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assets::Entity",
        from = "Column::AssetId",
        to = "super::assets::Column::AssetId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Assets,
}

impl Related<super::assets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
