use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    EngineError, ResultEngine, Session, asset_statuses, assets, categories, departments,
    locations, manufacturers, positions, user_roles,
    util::{normalize_optional, normalize_required},
};

use super::{Engine, with_tx};

/// Category editor payload; `category_id` present means update.
#[derive(Clone, Debug, Default)]
pub struct CategoryDraft {
    pub category_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug)]
pub struct CategoryRow {
    pub category_id: i32,
    pub name: String,
    pub description: Option<String>,
}

/// One id → name reference entry.
#[derive(Clone, Debug)]
pub struct LookupItem {
    pub id: i32,
    pub name: String,
}

/// Every reference table, loaded wholesale and sorted by name. Feeds the
/// editor dropdowns.
#[derive(Clone, Debug)]
pub struct Lookups {
    pub categories: Vec<LookupItem>,
    pub statuses: Vec<LookupItem>,
    pub locations: Vec<LookupItem>,
    pub manufacturers: Vec<LookupItem>,
    pub departments: Vec<LookupItem>,
    pub positions: Vec<LookupItem>,
    pub roles: Vec<LookupItem>,
}

impl Engine {
    /// Lists categories sorted by name, optionally filtered by a
    /// case-insensitive substring.
    pub async fn list_categories(
        &self,
        _session: &Session,
        search: Option<&str>,
    ) -> ResultEngine<Vec<CategoryRow>> {
        with_tx!(self, |db_tx| {
            let mut query =
                categories::Entity::find().order_by_asc(categories::Column::CategoryName);
            if let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) {
                let pattern = format!("%{}%", term.to_lowercase());
                query = query.filter(Expr::cust("LOWER(category_name)").like(pattern));
            }
            let models = query.all(&db_tx).await?;
            Ok(models
                .into_iter()
                .map(|m| CategoryRow {
                    category_id: m.category_id,
                    name: m.category_name,
                    description: m.description,
                })
                .collect())
        })
    }

    /// Creates or renames a category; names are unique case-insensitively.
    pub async fn save_category(
        &self,
        session: &Session,
        draft: &CategoryDraft,
    ) -> ResultEngine<i32> {
        self.require_manage(session)?;
        let name = normalize_required(&draft.name, "category name")?;
        let description = normalize_optional(draft.description.as_deref());
        with_tx!(self, |db_tx| {
            let mut query = categories::Entity::find()
                .filter(Expr::cust("LOWER(category_name)").eq(name.to_lowercase()));
            if let Some(id) = draft.category_id {
                query = query.filter(categories::Column::CategoryId.ne(id));
            }
            if query.one(&db_tx).await?.is_some() {
                return Err(EngineError::Duplicate(name));
            }

            match draft.category_id {
                None => {
                    let active = categories::ActiveModel {
                        category_name: ActiveValue::Set(name),
                        description: ActiveValue::Set(description),
                        ..Default::default()
                    };
                    let model = active.insert(&db_tx).await?;
                    Ok(model.category_id)
                }
                Some(id) => {
                    categories::Entity::find_by_id(id)
                        .one(&db_tx)
                        .await?
                        .ok_or_else(|| EngineError::KeyNotFound("category".to_string()))?;
                    let active = categories::ActiveModel {
                        category_id: ActiveValue::Set(id),
                        category_name: ActiveValue::Set(name),
                        description: ActiveValue::Set(description),
                    };
                    active.update(&db_tx).await?;
                    Ok(id)
                }
            }
        })
    }

    /// Deletes a category (administrator only). Blocked while assets still
    /// reference it.
    pub async fn delete_category(&self, session: &Session, category_id: i32) -> ResultEngine<()> {
        self.require_admin(session)?;
        with_tx!(self, |db_tx| {
            categories::Entity::find_by_id(category_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("category".to_string()))?;

            let linked = assets::Entity::find()
                .filter(assets::Column::CategoryId.eq(category_id))
                .one(&db_tx)
                .await?
                .is_some();
            if linked {
                return Err(EngineError::Conflict(
                    "assets reference this category; reassign them first".to_string(),
                ));
            }

            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Loads every reference list sorted by name.
    pub async fn lookups(&self, _session: &Session) -> ResultEngine<Lookups> {
        with_tx!(self, |db_tx| {
            let categories = categories::Entity::find()
                .order_by_asc(categories::Column::CategoryName)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|m| LookupItem {
                    id: m.category_id,
                    name: m.category_name,
                })
                .collect();
            let statuses = asset_statuses::Entity::find()
                .order_by_asc(asset_statuses::Column::StatusName)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|m| LookupItem {
                    id: m.status_id,
                    name: m.status_name,
                })
                .collect();
            let locations = locations::Entity::find()
                .order_by_asc(locations::Column::LocationName)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|m| LookupItem {
                    id: m.location_id,
                    name: m.location_name,
                })
                .collect();
            let manufacturers = manufacturers::Entity::find()
                .order_by_asc(manufacturers::Column::ManufacturerName)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|m| LookupItem {
                    id: m.manufacturer_id,
                    name: m.manufacturer_name,
                })
                .collect();
            let departments = departments::Entity::find()
                .order_by_asc(departments::Column::DepartmentName)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|m| LookupItem {
                    id: m.department_id,
                    name: m.department_name,
                })
                .collect();
            let positions = positions::Entity::find()
                .order_by_asc(positions::Column::PositionName)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|m| LookupItem {
                    id: m.position_id,
                    name: m.position_name,
                })
                .collect();
            let roles = user_roles::Entity::find()
                .order_by_asc(user_roles::Column::RoleName)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|m| LookupItem {
                    id: m.role_id,
                    name: m.role_name,
                })
                .collect();

            Ok(Lookups {
                categories,
                statuses,
                locations,
                manufacturers,
                departments,
                positions,
                roles,
            })
        })
    }
}
