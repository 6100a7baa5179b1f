use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    EngineError, ResultEngine, Session, asset_movements, asset_statuses, assets, categories,
    employees, locations,
    paging::{self, NO_LIMIT, Page},
    price::parse_price,
    util::{normalize_optional, normalize_required, require_selected},
};

use super::{ActivePolicy, Engine, with_tx};

/// Everything the asset editor submits on save.
///
/// Required selections are `Option` because the form's combo boxes may be
/// left unselected; the engine turns missing ones into validation errors.
/// `price_text` carries the raw form input (currency glyph and separators
/// included).
#[derive(Clone, Debug, Default)]
pub struct AssetDraft {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub category_id: Option<i32>,
    pub status_id: Option<i32>,
    pub location_id: Option<i32>,
    pub manufacturer_id: Option<i32>,
    pub responsible_employee_id: Option<i32>,
    pub purchase_date: Option<Date>,
    pub price_text: Option<String>,
    pub is_active: Option<bool>,
}

/// Filters for listing assets.
///
/// `page` is 1-based; `page_size` 0 disables pagination.
#[derive(Clone, Debug, Default)]
pub struct AssetListFilter {
    pub search: Option<String>,
    pub status_id: Option<i32>,
    pub category_id: Option<i32>,
    pub location_id: Option<i32>,
    pub page: u64,
    pub page_size: u64,
}

/// One asset listing row, hydrated with reference names.
#[derive(Clone, Debug)]
pub struct AssetRow {
    pub asset_id: i32,
    pub asset_code: String,
    pub asset_name: String,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub category_name: String,
    pub status_name: String,
    pub location_name: String,
    pub responsible_name: Option<String>,
    pub purchase_date: Option<Date>,
    pub purchase_price: Option<Decimal>,
    pub is_active: bool,
    pub created_date: DateTimeUtc,
}

/// Result of a hard-delete batch: assets with movement history are skipped,
/// never silently dropped.
#[derive(Clone, Debug, Default)]
pub struct DeleteOutcome {
    pub deleted: Vec<i32>,
    pub skipped: Vec<i32>,
}

struct AssetFields {
    code: String,
    name: String,
    description: Option<String>,
    model: Option<String>,
    serial_number: Option<String>,
    category_id: i32,
    status_id: i32,
    location_id: i32,
    manufacturer_id: Option<i32>,
    responsible_employee_id: Option<i32>,
    purchase_date: Option<Date>,
    price: Option<Decimal>,
}

fn validate_draft(draft: &AssetDraft) -> ResultEngine<AssetFields> {
    let code = normalize_required(&draft.code, "asset code")?;
    let name = normalize_required(&draft.name, "asset name")?;
    let category_id = require_selected(draft.category_id, "category")?;
    let status_id = require_selected(draft.status_id, "status")?;
    let location_id = require_selected(draft.location_id, "location")?;
    let price = match draft.price_text.as_deref() {
        Some(text) => parse_price(text)?,
        None => None,
    };
    Ok(AssetFields {
        code,
        name,
        description: normalize_optional(draft.description.as_deref()),
        model: normalize_optional(draft.model.as_deref()),
        serial_number: normalize_optional(draft.serial_number.as_deref()),
        category_id,
        status_id,
        location_id,
        manufacturer_id: draft.manufacturer_id,
        responsible_employee_id: draft.responsible_employee_id,
        purchase_date: draft.purchase_date,
        price,
    })
}

impl Engine {
    async fn check_asset_references(
        &self,
        db_tx: &DatabaseTransaction,
        fields: &AssetFields,
    ) -> ResultEngine<()> {
        self.require_category(db_tx, fields.category_id).await?;
        self.require_status(db_tx, fields.status_id).await?;
        self.require_location(db_tx, fields.location_id).await?;
        if let Some(id) = fields.manufacturer_id {
            self.require_manufacturer(db_tx, id).await?;
        }
        if let Some(id) = fields.responsible_employee_id {
            self.require_employee(db_tx, id).await?;
        }
        Ok(())
    }

    async fn require_unique_code(
        &self,
        db_tx: &DatabaseTransaction,
        code: &str,
        exclude_id: Option<i32>,
    ) -> ResultEngine<()> {
        let mut query = assets::Entity::find().filter(assets::Column::AssetCode.eq(code));
        if let Some(id) = exclude_id {
            query = query.filter(assets::Column::AssetId.ne(id));
        }
        if query.one(db_tx).await?.is_some() {
            return Err(EngineError::Duplicate(code.to_string()));
        }
        Ok(())
    }

    async fn resolve_is_active(
        &self,
        db_tx: &DatabaseTransaction,
        status_id: i32,
        submitted: Option<bool>,
    ) -> ResultEngine<bool> {
        match self.active_policy {
            ActivePolicy::Manual => Ok(submitted.unwrap_or(true)),
            ActivePolicy::StatusDerived => Ok(match self.disposed_status_id(db_tx).await? {
                Some(disposed_id) => status_id != disposed_id,
                None => true,
            }),
        }
    }

    /// Creates an asset record and returns the generated id.
    ///
    /// Stamps `created_date`/`created_by_user_id` from the acting session.
    pub async fn create_asset(&self, session: &Session, draft: &AssetDraft) -> ResultEngine<i32> {
        self.require_manage(session)?;
        let fields = validate_draft(draft)?;
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            self.check_asset_references(&db_tx, &fields).await?;
            self.require_unique_code(&db_tx, &fields.code, None).await?;
            let is_active = self
                .resolve_is_active(&db_tx, fields.status_id, draft.is_active)
                .await?;

            let active = assets::ActiveModel {
                asset_code: ActiveValue::Set(fields.code.clone()),
                asset_name: ActiveValue::Set(fields.name.clone()),
                description: ActiveValue::Set(fields.description.clone()),
                model: ActiveValue::Set(fields.model.clone()),
                serial_number: ActiveValue::Set(fields.serial_number.clone()),
                category_id: ActiveValue::Set(fields.category_id),
                status_id: ActiveValue::Set(fields.status_id),
                location_id: ActiveValue::Set(fields.location_id),
                manufacturer_id: ActiveValue::Set(fields.manufacturer_id),
                responsible_employee_id: ActiveValue::Set(fields.responsible_employee_id),
                purchase_date: ActiveValue::Set(fields.purchase_date),
                purchase_price: ActiveValue::Set(fields.price),
                is_active: ActiveValue::Set(is_active),
                created_date: ActiveValue::Set(now),
                created_by_user_id: ActiveValue::Set(session.user_id),
                modified_date: ActiveValue::Set(None),
                modified_by_user_id: ActiveValue::Set(None),
                ..Default::default()
            };
            let model = active.insert(&db_tx).await?;
            Ok(model.asset_id)
        })
    }

    /// Overwrites an asset's mutable fields and stamps the modifier.
    ///
    /// The asset code is immutable after creation: the stored code is kept,
    /// though the submitted code is still checked for collisions (excluding
    /// this asset) so the editor reports duplicates consistently.
    pub async fn update_asset(
        &self,
        session: &Session,
        asset_id: i32,
        draft: &AssetDraft,
    ) -> ResultEngine<()> {
        self.require_manage(session)?;
        let fields = validate_draft(draft)?;
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let model = assets::Entity::find_by_id(asset_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("asset".to_string()))?;
            self.check_asset_references(&db_tx, &fields).await?;
            self.require_unique_code(&db_tx, &fields.code, Some(asset_id))
                .await?;
            let is_active = self
                .resolve_is_active(&db_tx, fields.status_id, draft.is_active)
                .await?;

            let active = assets::ActiveModel {
                asset_id: ActiveValue::Set(asset_id),
                asset_code: ActiveValue::Set(model.asset_code),
                asset_name: ActiveValue::Set(fields.name.clone()),
                description: ActiveValue::Set(fields.description.clone()),
                model: ActiveValue::Set(fields.model.clone()),
                serial_number: ActiveValue::Set(fields.serial_number.clone()),
                category_id: ActiveValue::Set(fields.category_id),
                status_id: ActiveValue::Set(fields.status_id),
                location_id: ActiveValue::Set(fields.location_id),
                manufacturer_id: ActiveValue::Set(fields.manufacturer_id),
                responsible_employee_id: ActiveValue::Set(fields.responsible_employee_id),
                purchase_date: ActiveValue::Set(fields.purchase_date),
                purchase_price: ActiveValue::Set(fields.price),
                is_active: ActiveValue::Set(is_active),
                modified_date: ActiveValue::Set(Some(now)),
                modified_by_user_id: ActiveValue::Set(Some(session.user_id)),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Retires the selected assets: disposed status, `is_active = false`,
    /// modifier stamps. Fails the whole batch (nothing changed) when the
    /// disposed status is missing from the reference table.
    pub async fn dispose_assets(&self, session: &Session, ids: &[i32]) -> ResultEngine<u64> {
        self.require_manage(session)?;
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let disposed_id = self.require_disposed_status_id(&db_tx).await?;
            let models = assets::Entity::find()
                .filter(assets::Column::AssetId.is_in(ids.iter().copied()))
                .all(&db_tx)
                .await?;

            let mut count = 0u64;
            for model in models {
                let active = assets::ActiveModel {
                    asset_id: ActiveValue::Set(model.asset_id),
                    status_id: ActiveValue::Set(disposed_id),
                    is_active: ActiveValue::Set(false),
                    modified_date: ActiveValue::Set(Some(now)),
                    modified_by_user_id: ActiveValue::Set(Some(session.user_id)),
                    ..Default::default()
                };
                active.update(&db_tx).await?;
                count += 1;
            }
            Ok(count)
        })
    }

    /// Hard-deletes the selected assets (administrator only).
    ///
    /// An asset with movement history is skipped and reported; the rest of
    /// the batch still goes through.
    pub async fn delete_assets(
        &self,
        session: &Session,
        ids: &[i32],
    ) -> ResultEngine<DeleteOutcome> {
        self.require_admin(session)?;
        with_tx!(self, |db_tx| {
            let models = assets::Entity::find()
                .filter(assets::Column::AssetId.is_in(ids.iter().copied()))
                .all(&db_tx)
                .await?;

            let mut outcome = DeleteOutcome::default();
            for model in models {
                let has_history = asset_movements::Entity::find()
                    .filter(asset_movements::Column::AssetId.eq(model.asset_id))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if has_history {
                    outcome.skipped.push(model.asset_id);
                    continue;
                }
                assets::Entity::delete_by_id(model.asset_id)
                    .exec(&db_tx)
                    .await?;
                outcome.deleted.push(model.asset_id);
            }
            Ok(outcome)
        })
    }

    /// Relocates an asset and appends the movement-history row in the same
    /// transaction.
    pub async fn move_asset(
        &self,
        session: &Session,
        asset_id: i32,
        to_location_id: i32,
        note: Option<&str>,
    ) -> ResultEngine<()> {
        self.require_manage(session)?;
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let model = assets::Entity::find_by_id(asset_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("asset".to_string()))?;
            self.require_location(&db_tx, to_location_id).await?;

            let movement = asset_movements::ActiveModel {
                asset_id: ActiveValue::Set(asset_id),
                from_location_id: ActiveValue::Set(Some(model.location_id)),
                to_location_id: ActiveValue::Set(to_location_id),
                moved_date: ActiveValue::Set(now),
                moved_by_user_id: ActiveValue::Set(session.user_id),
                note: ActiveValue::Set(normalize_optional(note)),
                ..Default::default()
            };
            movement.insert(&db_tx).await?;

            let active = assets::ActiveModel {
                asset_id: ActiveValue::Set(asset_id),
                location_id: ActiveValue::Set(to_location_id),
                modified_date: ActiveValue::Set(Some(now)),
                modified_by_user_id: ActiveValue::Set(Some(session.user_id)),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Lists assets most-recent-first with ANDed filters and page clamping.
    ///
    /// The free-text term matches code, name, model and serial number
    /// case-insensitively by substring.
    pub async fn list_assets(
        &self,
        _session: &Session,
        filter: &AssetListFilter,
    ) -> ResultEngine<Page<AssetRow>> {
        with_tx!(self, |db_tx| {
            let mut query = assets::Entity::find();

            if let Some(term) = filter
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
            {
                let pattern = format!("%{}%", term.to_lowercase());
                query = query.filter(
                    Condition::any()
                        .add(Expr::cust("LOWER(asset_code)").like(pattern.clone()))
                        .add(Expr::cust("LOWER(asset_name)").like(pattern.clone()))
                        .add(Expr::cust("LOWER(COALESCE(model, ''))").like(pattern.clone()))
                        .add(Expr::cust("LOWER(COALESCE(serial_number, ''))").like(pattern)),
                );
            }
            if let Some(id) = filter.status_id {
                query = query.filter(assets::Column::StatusId.eq(id));
            }
            if let Some(id) = filter.category_id {
                query = query.filter(assets::Column::CategoryId.eq(id));
            }
            if let Some(id) = filter.location_id {
                query = query.filter(assets::Column::LocationId.eq(id));
            }

            let total_items = query.clone().count(&db_tx).await?;
            let total_pages = paging::total_pages(total_items, filter.page_size);
            let page = paging::clamp_page(filter.page, total_pages);

            let mut query = query.order_by_desc(assets::Column::AssetId);
            if filter.page_size != NO_LIMIT {
                query = query
                    .offset((page - 1) * filter.page_size)
                    .limit(filter.page_size);
            }
            let models = query.all(&db_tx).await?;

            let items = self.hydrate_asset_rows(&db_tx, models).await?;
            Ok(Page {
                items,
                page,
                total_items,
                total_pages,
            })
        })
    }

    async fn hydrate_asset_rows(
        &self,
        db_tx: &DatabaseTransaction,
        models: Vec<assets::Model>,
    ) -> ResultEngine<Vec<AssetRow>> {
        let category_names: HashMap<i32, String> = categories::Entity::find()
            .all(db_tx)
            .await?
            .into_iter()
            .map(|m| (m.category_id, m.category_name))
            .collect();
        let status_names: HashMap<i32, String> = asset_statuses::Entity::find()
            .all(db_tx)
            .await?
            .into_iter()
            .map(|m| (m.status_id, m.status_name))
            .collect();
        let location_names: HashMap<i32, String> = locations::Entity::find()
            .all(db_tx)
            .await?
            .into_iter()
            .map(|m| (m.location_id, m.location_name))
            .collect();

        let responsible_ids: Vec<i32> = models
            .iter()
            .filter_map(|m| m.responsible_employee_id)
            .collect();
        let responsible_names: HashMap<i32, String> = if responsible_ids.is_empty() {
            HashMap::new()
        } else {
            employees::Entity::find()
                .filter(employees::Column::EmployeeId.is_in(responsible_ids))
                .all(db_tx)
                .await?
                .into_iter()
                .map(|m| (m.employee_id, m.full_name()))
                .collect()
        };

        let unknown = || "—".to_string();
        Ok(models
            .into_iter()
            .map(|model| AssetRow {
                asset_id: model.asset_id,
                asset_code: model.asset_code,
                asset_name: model.asset_name,
                model: model.model,
                serial_number: model.serial_number,
                category_name: category_names
                    .get(&model.category_id)
                    .cloned()
                    .unwrap_or_else(unknown),
                status_name: status_names
                    .get(&model.status_id)
                    .cloned()
                    .unwrap_or_else(unknown),
                location_name: location_names
                    .get(&model.location_id)
                    .cloned()
                    .unwrap_or_else(unknown),
                responsible_name: model
                    .responsible_employee_id
                    .and_then(|id| responsible_names.get(&id).cloned()),
                purchase_date: model.purchase_date,
                purchase_price: model.purchase_price,
                is_active: model.is_active,
                created_date: model.created_date,
            })
            .collect())
    }
}
