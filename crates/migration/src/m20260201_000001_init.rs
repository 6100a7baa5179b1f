//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for АКТИВ+:
//!
//! - `user_roles`, `departments`, `positions`, `categories`, `locations`,
//!   `manufacturers`, `asset_statuses`: id → name reference tables
//! - `employees`: staff records
//! - `users`: login accounts, optionally linked to an employee
//! - `assets`: tracked physical items with audit stamps
//! - `asset_movements`: relocation history (blocks hard deletion)
//! - `dashboard_stats`: refreshable aggregate counters

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum UserRoles {
    Table,
    RoleId,
    RoleName,
}

#[derive(Iden)]
enum Departments {
    Table,
    DepartmentId,
    DepartmentName,
}

#[derive(Iden)]
enum Positions {
    Table,
    PositionId,
    PositionName,
}

#[derive(Iden)]
enum Categories {
    Table,
    CategoryId,
    CategoryName,
    Description,
}

#[derive(Iden)]
enum Locations {
    Table,
    LocationId,
    LocationName,
}

#[derive(Iden)]
enum Manufacturers {
    Table,
    ManufacturerId,
    ManufacturerName,
}

#[derive(Iden)]
enum AssetStatuses {
    Table,
    StatusId,
    StatusName,
}

#[derive(Iden)]
enum Employees {
    Table,
    EmployeeId,
    LastName,
    FirstName,
    MiddleName,
    Email,
    Phone,
    PositionId,
    DepartmentId,
    HireDate,
    IsActive,
    Photo,
}

#[derive(Iden)]
enum Users {
    Table,
    UserId,
    Username,
    PasswordHash,
    RoleId,
    EmployeeId,
    IsActive,
    CreatedDate,
    LastLoginDate,
}

#[derive(Iden)]
enum Assets {
    Table,
    AssetId,
    AssetCode,
    AssetName,
    Description,
    Model,
    SerialNumber,
    CategoryId,
    StatusId,
    LocationId,
    ManufacturerId,
    ResponsibleEmployeeId,
    PurchaseDate,
    PurchasePrice,
    IsActive,
    CreatedDate,
    CreatedByUserId,
    ModifiedDate,
    ModifiedByUserId,
}

#[derive(Iden)]
enum AssetMovements {
    Table,
    MovementId,
    AssetId,
    FromLocationId,
    ToLocationId,
    MovedDate,
    MovedByUserId,
    Note,
}

#[derive(Iden)]
enum DashboardStats {
    Table,
    StatId,
    TotalAssets,
    ActiveAssets,
    InRepairAssets,
    DisposedAssets,
    UpdatedAt,
}

fn pk_auto<T: Iden + 'static>(col: T) -> ColumnDef {
    let mut def = ColumnDef::new(col);
    def.integer().not_null().auto_increment().primary_key();
    def
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Reference tables
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(UserRoles::Table)
                    .if_not_exists()
                    .col(&mut pk_auto(UserRoles::RoleId))
                    .col(ColumnDef::new(UserRoles::RoleName).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Departments::Table)
                    .if_not_exists()
                    .col(&mut pk_auto(Departments::DepartmentId))
                    .col(
                        ColumnDef::new(Departments::DepartmentName)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Positions::Table)
                    .if_not_exists()
                    .col(&mut pk_auto(Positions::PositionId))
                    .col(ColumnDef::new(Positions::PositionName).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(&mut pk_auto(Categories::CategoryId))
                    .col(
                        ColumnDef::new(Categories::CategoryName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Categories::Description).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Locations::Table)
                    .if_not_exists()
                    .col(&mut pk_auto(Locations::LocationId))
                    .col(ColumnDef::new(Locations::LocationName).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Manufacturers::Table)
                    .if_not_exists()
                    .col(&mut pk_auto(Manufacturers::ManufacturerId))
                    .col(
                        ColumnDef::new(Manufacturers::ManufacturerName)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AssetStatuses::Table)
                    .if_not_exists()
                    .col(&mut pk_auto(AssetStatuses::StatusId))
                    .col(
                        ColumnDef::new(AssetStatuses::StatusName)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Employees
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(&mut pk_auto(Employees::EmployeeId))
                    .col(ColumnDef::new(Employees::LastName).string().not_null())
                    .col(ColumnDef::new(Employees::FirstName).string().not_null())
                    .col(ColumnDef::new(Employees::MiddleName).string())
                    .col(ColumnDef::new(Employees::Email).string())
                    .col(ColumnDef::new(Employees::Phone).string())
                    .col(ColumnDef::new(Employees::PositionId).integer().not_null())
                    .col(
                        ColumnDef::new(Employees::DepartmentId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Employees::HireDate).date().not_null())
                    .col(
                        ColumnDef::new(Employees::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Employees::Photo).binary())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-employees-position_id")
                            .from(Employees::Table, Employees::PositionId)
                            .to(Positions::Table, Positions::PositionId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-employees-department_id")
                            .from(Employees::Table, Employees::DepartmentId)
                            .to(Departments::Table, Departments::DepartmentId),
                    )
                    .to_owned(),
            )
            .await?;

        // Email is unique when present (NULLs do not collide).
        manager
            .create_index(
                Index::create()
                    .name("idx-employees-email-unique")
                    .table(Employees::Table)
                    .col(Employees::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(&mut pk_auto(Users::UserId))
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::RoleId).integer().not_null())
                    .col(ColumnDef::new(Users::EmployeeId).integer())
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Users::CreatedDate).timestamp().not_null())
                    .col(ColumnDef::new(Users::LastLoginDate).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-users-role_id")
                            .from(Users::Table, Users::RoleId)
                            .to(UserRoles::Table, UserRoles::RoleId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-users-employee_id")
                            .from(Users::Table, Users::EmployeeId)
                            .to(Employees::Table, Employees::EmployeeId),
                    )
                    .to_owned(),
            )
            .await?;

        // One account per employee.
        manager
            .create_index(
                Index::create()
                    .name("idx-users-employee_id-unique")
                    .table(Users::Table)
                    .col(Users::EmployeeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Assets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Assets::Table)
                    .if_not_exists()
                    .col(&mut pk_auto(Assets::AssetId))
                    .col(
                        ColumnDef::new(Assets::AssetCode)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Assets::AssetName).string().not_null())
                    .col(ColumnDef::new(Assets::Description).string())
                    .col(ColumnDef::new(Assets::Model).string())
                    .col(ColumnDef::new(Assets::SerialNumber).string())
                    .col(ColumnDef::new(Assets::CategoryId).integer().not_null())
                    .col(ColumnDef::new(Assets::StatusId).integer().not_null())
                    .col(ColumnDef::new(Assets::LocationId).integer().not_null())
                    .col(ColumnDef::new(Assets::ManufacturerId).integer())
                    .col(ColumnDef::new(Assets::ResponsibleEmployeeId).integer())
                    .col(ColumnDef::new(Assets::PurchaseDate).date())
                    .col(ColumnDef::new(Assets::PurchasePrice).decimal_len(12, 2))
                    .col(
                        ColumnDef::new(Assets::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Assets::CreatedDate).timestamp().not_null())
                    .col(
                        ColumnDef::new(Assets::CreatedByUserId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Assets::ModifiedDate).timestamp())
                    .col(ColumnDef::new(Assets::ModifiedByUserId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assets-category_id")
                            .from(Assets::Table, Assets::CategoryId)
                            .to(Categories::Table, Categories::CategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assets-status_id")
                            .from(Assets::Table, Assets::StatusId)
                            .to(AssetStatuses::Table, AssetStatuses::StatusId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assets-location_id")
                            .from(Assets::Table, Assets::LocationId)
                            .to(Locations::Table, Locations::LocationId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assets-manufacturer_id")
                            .from(Assets::Table, Assets::ManufacturerId)
                            .to(Manufacturers::Table, Manufacturers::ManufacturerId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assets-responsible_employee_id")
                            .from(Assets::Table, Assets::ResponsibleEmployeeId)
                            .to(Employees::Table, Employees::EmployeeId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assets-created_by_user_id")
                            .from(Assets::Table, Assets::CreatedByUserId)
                            .to(Users::Table, Users::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assets-modified_by_user_id")
                            .from(Assets::Table, Assets::ModifiedByUserId)
                            .to(Users::Table, Users::UserId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-assets-status_id")
                    .table(Assets::Table)
                    .col(Assets::StatusId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-assets-category_id")
                    .table(Assets::Table)
                    .col(Assets::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-assets-location_id")
                    .table(Assets::Table)
                    .col(Assets::LocationId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Asset movements
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(AssetMovements::Table)
                    .if_not_exists()
                    .col(&mut pk_auto(AssetMovements::MovementId))
                    .col(ColumnDef::new(AssetMovements::AssetId).integer().not_null())
                    .col(ColumnDef::new(AssetMovements::FromLocationId).integer())
                    .col(
                        ColumnDef::new(AssetMovements::ToLocationId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssetMovements::MovedDate)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssetMovements::MovedByUserId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AssetMovements::Note).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-asset_movements-asset_id")
                            .from(AssetMovements::Table, AssetMovements::AssetId)
                            .to(Assets::Table, Assets::AssetId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-asset_movements-to_location_id")
                            .from(AssetMovements::Table, AssetMovements::ToLocationId)
                            .to(Locations::Table, Locations::LocationId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-asset_movements-moved_by_user_id")
                            .from(AssetMovements::Table, AssetMovements::MovedByUserId)
                            .to(Users::Table, Users::UserId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-asset_movements-asset_id")
                    .table(AssetMovements::Table)
                    .col(AssetMovements::AssetId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Dashboard stats
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(DashboardStats::Table)
                    .if_not_exists()
                    .col(&mut pk_auto(DashboardStats::StatId))
                    .col(
                        ColumnDef::new(DashboardStats::TotalAssets)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DashboardStats::ActiveAssets)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DashboardStats::InRepairAssets)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DashboardStats::DisposedAssets)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DashboardStats::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(DashboardStats::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AssetMovements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Employees::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AssetStatuses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Manufacturers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Locations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Positions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Departments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserRoles::Table).to_owned())
            .await?;
        Ok(())
    }
}
