use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    EngineError, ResultEngine, Session, assets, departments, employees,
    paging::{self, NO_LIMIT, Page},
    password::md5_hex,
    positions, users,
    util::{is_valid_email, normalize_optional, normalize_required, require_selected},
};

use super::{Engine, with_tx};

/// Optional account block of the employee editor.
///
/// A missing `password` on update keeps the stored hash; a new account
/// without a password is rejected.
#[derive(Clone, Debug)]
pub struct AccountDraft {
    pub username: String,
    pub password: Option<String>,
    pub role_id: i32,
    pub is_active: Option<bool>,
}

/// Everything the employee editor submits on save.
#[derive(Clone, Debug, Default)]
pub struct EmployeeDraft {
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position_id: Option<i32>,
    pub department_id: Option<i32>,
    /// Defaults to today when absent.
    pub hire_date: Option<Date>,
    pub is_active: Option<bool>,
    pub photo: Option<Vec<u8>>,
    /// "Create account" toggle: `Some` keeps/creates the linked account,
    /// `None` soft-deactivates an existing one.
    pub account: Option<AccountDraft>,
}

/// Filters for listing employees.
#[derive(Clone, Debug, Default)]
pub struct EmployeeListFilter {
    pub search: Option<String>,
    pub department_id: Option<i32>,
    pub position_id: Option<i32>,
    /// Tri-state filter over the linked account's activity. Employees
    /// without an account count as active.
    pub active: Option<bool>,
    pub page: u64,
    pub page_size: u64,
}

/// One employee listing row, hydrated with reference names and the linked
/// account's state.
#[derive(Clone, Debug)]
pub struct EmployeeRow {
    pub employee_id: i32,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position_name: String,
    pub department_name: String,
    pub hire_date: Date,
    pub employee_active: bool,
    /// `None` when the employee has no account.
    pub account_active: Option<bool>,
}

struct EmployeeFields {
    last_name: String,
    first_name: String,
    middle_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    position_id: i32,
    department_id: i32,
    hire_date: Date,
    is_active: bool,
}

fn validate_draft(draft: &EmployeeDraft) -> ResultEngine<EmployeeFields> {
    let last_name = normalize_required(&draft.last_name, "last name")?;
    let first_name = normalize_required(&draft.first_name, "first name")?;
    let position_id = require_selected(draft.position_id, "position")?;
    let department_id = require_selected(draft.department_id, "department")?;

    let email = normalize_optional(draft.email.as_deref());
    if let Some(email) = email.as_deref()
        && !is_valid_email(email)
    {
        return Err(EngineError::Format(format!("invalid email: {email}")));
    }

    Ok(EmployeeFields {
        last_name,
        first_name,
        middle_name: normalize_optional(draft.middle_name.as_deref()),
        email,
        phone: normalize_optional(draft.phone.as_deref()),
        position_id,
        department_id,
        hire_date: draft
            .hire_date
            .unwrap_or_else(|| Utc::now().date_naive()),
        is_active: draft.is_active.unwrap_or(true),
    })
}

impl Engine {
    async fn require_unique_email(
        &self,
        db_tx: &DatabaseTransaction,
        email: &str,
        exclude_id: Option<i32>,
    ) -> ResultEngine<()> {
        let mut query = employees::Entity::find().filter(employees::Column::Email.eq(email));
        if let Some(id) = exclude_id {
            query = query.filter(employees::Column::EmployeeId.ne(id));
        }
        if query.one(db_tx).await?.is_some() {
            return Err(EngineError::Duplicate(email.to_string()));
        }
        Ok(())
    }

    async fn require_unique_username(
        &self,
        db_tx: &DatabaseTransaction,
        username: &str,
        exclude_user_id: Option<i32>,
    ) -> ResultEngine<()> {
        let mut query = users::Entity::find().filter(users::Column::Username.eq(username));
        if let Some(id) = exclude_user_id {
            query = query.filter(users::Column::UserId.ne(id));
        }
        if query.one(db_tx).await?.is_some() {
            return Err(EngineError::Duplicate(username.to_string()));
        }
        Ok(())
    }

    /// Inserts or updates the linked account. The employee row must already
    /// exist: the account's `employee_id` references its generated id.
    async fn apply_account_draft(
        &self,
        db_tx: &DatabaseTransaction,
        employee_id: i32,
        existing: Option<users::Model>,
        draft: &AccountDraft,
    ) -> ResultEngine<()> {
        let username = normalize_required(&draft.username, "username")?;
        self.require_role(db_tx, draft.role_id).await?;
        let password = draft
            .password
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());

        match existing {
            None => {
                let password = password.ok_or_else(|| {
                    EngineError::Validation("a new account needs a password".to_string())
                })?;
                self.require_unique_username(db_tx, &username, None).await?;
                let active = users::ActiveModel {
                    username: ActiveValue::Set(username),
                    password_hash: ActiveValue::Set(md5_hex(password)),
                    role_id: ActiveValue::Set(draft.role_id),
                    employee_id: ActiveValue::Set(Some(employee_id)),
                    is_active: ActiveValue::Set(draft.is_active.unwrap_or(true)),
                    created_date: ActiveValue::Set(Utc::now()),
                    last_login_date: ActiveValue::Set(None),
                    ..Default::default()
                };
                active.insert(db_tx).await?;
            }
            Some(user) => {
                self.require_unique_username(db_tx, &username, Some(user.user_id))
                    .await?;
                let mut active = users::ActiveModel {
                    user_id: ActiveValue::Set(user.user_id),
                    username: ActiveValue::Set(username),
                    role_id: ActiveValue::Set(draft.role_id),
                    is_active: ActiveValue::Set(draft.is_active.unwrap_or(true)),
                    ..Default::default()
                };
                if let Some(password) = password {
                    active.password_hash = ActiveValue::Set(md5_hex(password));
                }
                active.update(db_tx).await?;
            }
        }
        Ok(())
    }

    async fn account_for_employee(
        &self,
        db_tx: &DatabaseTransaction,
        employee_id: i32,
    ) -> ResultEngine<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::EmployeeId.eq(employee_id))
            .one(db_tx)
            .await
            .map_err(Into::into)
    }

    /// Creates an employee (and optionally the linked account) in one save.
    ///
    /// The employee row is inserted first so the account's foreign key can
    /// carry the generated id.
    pub async fn create_employee(
        &self,
        session: &Session,
        draft: &EmployeeDraft,
    ) -> ResultEngine<i32> {
        self.require_manage(session)?;
        let fields = validate_draft(draft)?;
        with_tx!(self, |db_tx| {
            self.require_position(&db_tx, fields.position_id).await?;
            self.require_department(&db_tx, fields.department_id)
                .await?;
            if let Some(email) = fields.email.as_deref() {
                self.require_unique_email(&db_tx, email, None).await?;
            }

            let active = employees::ActiveModel {
                last_name: ActiveValue::Set(fields.last_name.clone()),
                first_name: ActiveValue::Set(fields.first_name.clone()),
                middle_name: ActiveValue::Set(fields.middle_name.clone()),
                email: ActiveValue::Set(fields.email.clone()),
                phone: ActiveValue::Set(fields.phone.clone()),
                position_id: ActiveValue::Set(fields.position_id),
                department_id: ActiveValue::Set(fields.department_id),
                hire_date: ActiveValue::Set(fields.hire_date),
                is_active: ActiveValue::Set(fields.is_active),
                photo: ActiveValue::Set(draft.photo.clone()),
                ..Default::default()
            };
            let model = active.insert(&db_tx).await?;

            if let Some(account) = &draft.account {
                self.apply_account_draft(&db_tx, model.employee_id, None, account)
                    .await?;
            }
            Ok(model.employee_id)
        })
    }

    /// Updates an employee and reconciles the linked account: present draft
    /// upserts it, absent draft deactivates an existing one (accounts are
    /// never deleted implicitly).
    pub async fn update_employee(
        &self,
        session: &Session,
        employee_id: i32,
        draft: &EmployeeDraft,
    ) -> ResultEngine<()> {
        self.require_manage(session)?;
        let fields = validate_draft(draft)?;
        with_tx!(self, |db_tx| {
            let model = employees::Entity::find_by_id(employee_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("employee".to_string()))?;
            self.require_position(&db_tx, fields.position_id).await?;
            self.require_department(&db_tx, fields.department_id)
                .await?;
            if let Some(email) = fields.email.as_deref() {
                self.require_unique_email(&db_tx, email, Some(employee_id))
                    .await?;
            }

            let photo = draft.photo.clone().or(model.photo);
            let active = employees::ActiveModel {
                employee_id: ActiveValue::Set(employee_id),
                last_name: ActiveValue::Set(fields.last_name.clone()),
                first_name: ActiveValue::Set(fields.first_name.clone()),
                middle_name: ActiveValue::Set(fields.middle_name.clone()),
                email: ActiveValue::Set(fields.email.clone()),
                phone: ActiveValue::Set(fields.phone.clone()),
                position_id: ActiveValue::Set(fields.position_id),
                department_id: ActiveValue::Set(fields.department_id),
                hire_date: ActiveValue::Set(fields.hire_date),
                is_active: ActiveValue::Set(fields.is_active),
                photo: ActiveValue::Set(photo),
                ..Default::default()
            };
            active.update(&db_tx).await?;

            let existing = self.account_for_employee(&db_tx, employee_id).await?;
            match (&draft.account, existing) {
                (Some(account), existing) => {
                    self.apply_account_draft(&db_tx, employee_id, existing, account)
                        .await?;
                }
                (None, Some(user)) => {
                    let active = users::ActiveModel {
                        user_id: ActiveValue::Set(user.user_id),
                        is_active: ActiveValue::Set(false),
                        ..Default::default()
                    };
                    active.update(&db_tx).await?;
                }
                (None, None) => {}
            }
            Ok(())
        })
    }

    /// Flips the linked account's activity and returns the new state.
    ///
    /// Reports `KeyNotFound` when the employee has no account.
    pub async fn toggle_employee_status(
        &self,
        session: &Session,
        employee_id: i32,
    ) -> ResultEngine<bool> {
        self.require_manage(session)?;
        with_tx!(self, |db_tx| {
            let user = self
                .account_for_employee(&db_tx, employee_id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("account".to_string()))?;
            let new_state = !user.is_active;
            let active = users::ActiveModel {
                user_id: ActiveValue::Set(user.user_id),
                is_active: ActiveValue::Set(new_state),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(new_state)
        })
    }

    /// Hard-deletes an employee together with the linked account
    /// (administrator only). Blocked while any asset lists the employee as
    /// responsible.
    pub async fn delete_employee(&self, session: &Session, employee_id: i32) -> ResultEngine<()> {
        self.require_admin(session)?;
        with_tx!(self, |db_tx| {
            employees::Entity::find_by_id(employee_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("employee".to_string()))?;

            let responsible_for = assets::Entity::find()
                .filter(assets::Column::ResponsibleEmployeeId.eq(employee_id))
                .one(&db_tx)
                .await?
                .is_some();
            if responsible_for {
                return Err(EngineError::Conflict(
                    "employee is responsible for assets; reassign them first".to_string(),
                ));
            }

            users::Entity::delete_many()
                .filter(users::Column::EmployeeId.eq(employee_id))
                .exec(&db_tx)
                .await?;
            employees::Entity::delete_by_id(employee_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Lists employees most-recent-first with ANDed filters and page
    /// clamping. Free text matches the full name, email and phone.
    pub async fn list_employees(
        &self,
        _session: &Session,
        filter: &EmployeeListFilter,
    ) -> ResultEngine<Page<EmployeeRow>> {
        with_tx!(self, |db_tx| {
            let mut query = employees::Entity::find()
                .join(JoinType::LeftJoin, employees::Relation::Users.def());

            if let Some(term) = filter
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
            {
                let pattern = format!("%{}%", term.to_lowercase());
                query = query.filter(
                    Condition::any()
                        .add(
                            Expr::cust(
                                "LOWER(last_name || ' ' || first_name || ' ' || COALESCE(middle_name, ''))",
                            )
                            .like(pattern.clone()),
                        )
                        .add(Expr::cust("LOWER(COALESCE(email, ''))").like(pattern.clone()))
                        .add(Expr::cust("COALESCE(phone, '')").like(pattern)),
                );
            }
            if let Some(id) = filter.department_id {
                query = query.filter(employees::Column::DepartmentId.eq(id));
            }
            if let Some(id) = filter.position_id {
                query = query.filter(employees::Column::PositionId.eq(id));
            }
            match filter.active {
                Some(true) => {
                    query = query.filter(
                        Condition::any()
                            .add(users::Column::IsActive.eq(true))
                            .add(users::Column::UserId.is_null()),
                    );
                }
                Some(false) => {
                    query = query.filter(users::Column::IsActive.eq(false));
                }
                None => {}
            }

            let total_items = query.clone().count(&db_tx).await?;
            let total_pages = paging::total_pages(total_items, filter.page_size);
            let page = paging::clamp_page(filter.page, total_pages);

            let mut query = query.order_by_desc(employees::Column::EmployeeId);
            if filter.page_size != NO_LIMIT {
                query = query
                    .offset((page - 1) * filter.page_size)
                    .limit(filter.page_size);
            }
            let models = query.all(&db_tx).await?;

            let items = self.hydrate_employee_rows(&db_tx, models).await?;
            Ok(Page {
                items,
                page,
                total_items,
                total_pages,
            })
        })
    }

    async fn hydrate_employee_rows(
        &self,
        db_tx: &DatabaseTransaction,
        models: Vec<employees::Model>,
    ) -> ResultEngine<Vec<EmployeeRow>> {
        let position_names: HashMap<i32, String> = positions::Entity::find()
            .all(db_tx)
            .await?
            .into_iter()
            .map(|m| (m.position_id, m.position_name))
            .collect();
        let department_names: HashMap<i32, String> = departments::Entity::find()
            .all(db_tx)
            .await?
            .into_iter()
            .map(|m| (m.department_id, m.department_name))
            .collect();

        let ids: Vec<i32> = models.iter().map(|m| m.employee_id).collect();
        let accounts: HashMap<i32, bool> = if ids.is_empty() {
            HashMap::new()
        } else {
            users::Entity::find()
                .filter(users::Column::EmployeeId.is_in(ids))
                .all(db_tx)
                .await?
                .into_iter()
                .filter_map(|m| m.employee_id.map(|id| (id, m.is_active)))
                .collect()
        };

        let unknown = || "—".to_string();
        Ok(models
            .into_iter()
            .map(|model| EmployeeRow {
                employee_id: model.employee_id,
                full_name: model.full_name(),
                position_name: position_names
                    .get(&model.position_id)
                    .cloned()
                    .unwrap_or_else(unknown),
                department_name: department_names
                    .get(&model.department_id)
                    .cloned()
                    .unwrap_or_else(unknown),
                hire_date: model.hire_date,
                employee_active: model.is_active,
                account_active: accounts.get(&model.employee_id).copied(),
                email: model.email,
                phone: model.phone,
            })
            .collect())
    }
}
