use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod asset {
    use super::*;

    /// Asset editor payload, shared by create and update.
    ///
    /// `price` carries the raw form text (currency glyph and either decimal
    /// separator allowed); the server parses it.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssetSave {
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
        pub purchase_date: Option<NaiveDate>,
        pub price: Option<String>,
        pub is_active: Option<bool>,
    }

    /// Listing query parameters. `page` is 1-based; `page_size` 0 means
    /// "show all".
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AssetList {
        pub search: Option<String>,
        pub status_id: Option<i32>,
        pub category_id: Option<i32>,
        pub location_id: Option<i32>,
        pub page: Option<u64>,
        pub page_size: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssetView {
        pub asset_id: i32,
        pub asset_code: String,
        pub asset_name: String,
        pub model: Option<String>,
        pub serial_number: Option<String>,
        pub category_name: String,
        pub status_name: String,
        pub location_name: String,
        pub responsible_name: Option<String>,
        pub purchase_date: Option<NaiveDate>,
        pub purchase_price: Option<Decimal>,
        pub is_active: bool,
        pub created_date: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssetPage {
        pub items: Vec<AssetView>,
        pub page: u64,
        pub total_items: u64,
        pub total_pages: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssetCreated {
        pub id: i32,
    }

    /// Batch of asset ids for dispose/delete actions.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssetIds {
        pub ids: Vec<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DisposedReport {
        pub disposed: u64,
    }

    /// Hard-delete outcome: assets with movement history are skipped.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DeleteReport {
        pub deleted: Vec<i32>,
        pub skipped: Vec<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssetMove {
        pub to_location_id: i32,
        pub note: Option<String>,
    }
}

pub mod employee {
    use super::*;

    /// Account block of the employee editor. Omitted password on update
    /// keeps the stored one.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountSave {
        pub username: String,
        pub password: Option<String>,
        pub role_id: i32,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EmployeeSave {
        pub last_name: String,
        pub first_name: String,
        pub middle_name: Option<String>,
        pub email: Option<String>,
        pub phone: Option<String>,
        pub position_id: Option<i32>,
        pub department_id: Option<i32>,
        pub hire_date: Option<NaiveDate>,
        pub is_active: Option<bool>,
        /// "Create account" toggle: present keeps/creates the linked
        /// account, absent deactivates an existing one.
        pub account: Option<AccountSave>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EmployeeList {
        pub search: Option<String>,
        pub department_id: Option<i32>,
        pub position_id: Option<i32>,
        pub active: Option<bool>,
        pub page: Option<u64>,
        pub page_size: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EmployeeView {
        pub employee_id: i32,
        pub full_name: String,
        pub email: Option<String>,
        pub phone: Option<String>,
        pub position_name: String,
        pub department_name: String,
        pub hire_date: NaiveDate,
        pub employee_active: bool,
        pub account_active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EmployeePage {
        pub items: Vec<EmployeeView>,
        pub page: u64,
        pub total_items: u64,
        pub total_pages: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EmployeeCreated {
        pub id: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ToggleResult {
        pub is_active: bool,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategorySave {
        pub category_id: Option<i32>,
        pub name: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub category_id: i32,
        pub name: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryList {
        pub search: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategorySaved {
        pub id: i32,
    }
}

pub mod lookups {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LookupItem {
        pub id: i32,
        pub name: String,
    }

    /// Reference lists for the editor dropdowns, each sorted by name.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Lookups {
        pub categories: Vec<LookupItem>,
        pub statuses: Vec<LookupItem>,
        pub locations: Vec<LookupItem>,
        pub manufacturers: Vec<LookupItem>,
        pub departments: Vec<LookupItem>,
        pub positions: Vec<LookupItem>,
        pub roles: Vec<LookupItem>,
    }
}

pub mod stats {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardStats {
        pub total_assets: i64,
        pub active_assets: i64,
        pub in_repair_assets: i64,
        pub disposed_assets: i64,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryStat {
        pub category_id: i32,
        pub category_name: String,
        pub count: i64,
        pub percentage: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecentAsset {
        pub asset_id: i32,
        pub asset_code: String,
        pub asset_name: String,
        pub category_name: String,
        pub status_name: String,
        pub created_date: DateTime<Utc>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RecentQuery {
        pub limit: Option<u64>,
    }
}

pub mod user {
    use super::*;

    /// The caller's resolved identity and capability flags; clients use the
    /// flags to hide affordances (the server still enforces every action).
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionInfo {
        pub user_id: i32,
        pub role_id: i32,
        pub can_manage: bool,
        pub can_delete_hard: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChangePassword {
        pub current_password: String,
        pub new_password: String,
    }
}
