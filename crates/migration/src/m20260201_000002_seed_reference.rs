//! Seeds the reference rows the application resolves by name.
//!
//! Roles carry fixed ids (1 = Администратор, 2 = Менеджер,
//! 3 = Пользователь); statuses are looked up by name, «Списан» in
//! particular drives the dispose flow and the activity policy.

use sea_orm::{ConnectionTrait, Statement};
use sea_orm_migration::prelude::*;

const ROLES: [(i32, &str); 3] = [
    (1, "Администратор"),
    (2, "Менеджер"),
    (3, "Пользователь"),
];

const STATUSES: [&str; 4] = ["Активен", "На складе", "На ремонте", "Списан"];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();

        for (role_id, role_name) in ROLES {
            db.execute(Statement::from_sql_and_values(
                backend,
                "INSERT INTO user_roles (role_id, role_name) VALUES (?, ?)",
                vec![role_id.into(), role_name.into()],
            ))
            .await?;
        }

        for status_name in STATUSES {
            db.execute(Statement::from_sql_and_values(
                backend,
                "INSERT INTO asset_statuses (status_name) VALUES (?)",
                vec![status_name.into()],
            ))
            .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();

        for status_name in STATUSES {
            db.execute(Statement::from_sql_and_values(
                backend,
                "DELETE FROM asset_statuses WHERE status_name = ?",
                vec![status_name.into()],
            ))
            .await?;
        }
        for (role_id, _) in ROLES {
            db.execute(Statement::from_sql_and_values(
                backend,
                "DELETE FROM user_roles WHERE role_id = ?",
                vec![role_id.into()],
            ))
            .await?;
        }

        Ok(())
    }
}
