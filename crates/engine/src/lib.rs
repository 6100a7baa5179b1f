pub use error::EngineError;
pub use ops::{
    AccountDraft, ActivePolicy, AssetDraft, AssetListFilter, AssetRow, CategoryDraft, CategoryRow,
    CategoryStat, DashboardSnapshot, DeleteOutcome, Engine, EngineBuilder, EmployeeDraft,
    EmployeeListFilter, EmployeeRow, LookupItem, Lookups, RecentAsset,
};
pub use paging::{NO_LIMIT, Page};
pub use password::md5_hex;
pub use price::parse_price;
pub use session::{Role, Session, can_delete_hard, can_manage};

mod asset_movements;
mod asset_statuses;
mod assets;
mod categories;
mod dashboard_stats;
mod departments;
mod employees;
mod error;
mod locations;
mod manufacturers;
mod ops;
mod paging;
mod password;
mod positions;
mod price;
mod session;
mod user_roles;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
