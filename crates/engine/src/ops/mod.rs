use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod access;
mod assets;
mod auth;
mod categories;
mod employees;
mod stats;

pub use assets::{AssetDraft, AssetListFilter, AssetRow, DeleteOutcome};
pub use categories::{CategoryDraft, CategoryRow, LookupItem, Lookups};
pub use employees::{AccountDraft, EmployeeDraft, EmployeeListFilter, EmployeeRow};
pub use stats::{CategoryStat, DashboardSnapshot, RecentAsset};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Governs how `Asset.is_active` is determined on save.
///
/// One engine applies exactly one policy; the two variants are never mixed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActivePolicy {
    /// The submitted flag is stored as-is (defaults to `true` on create).
    Manual,
    /// Derived: an asset is active unless its status is the disposed one.
    /// Falls back to "always active" when no disposed status exists.
    #[default]
    StatusDerived,
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    active_policy: ActivePolicy,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    active_policy: ActivePolicy,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the asset activity policy (defaults to status-derived).
    pub fn active_policy(mut self, policy: ActivePolicy) -> EngineBuilder {
        self.active_policy = policy;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            active_policy: self.active_policy,
        })
    }
}
