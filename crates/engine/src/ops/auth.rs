use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    EngineError, ResultEngine, Role, Session, password::md5_hex, users, util::normalize_required,
};

use super::{Engine, with_tx};

impl Engine {
    /// Verifies credentials against the stored MD5 digest, stamps
    /// `last_login_date` and returns the caller's session.
    ///
    /// Unknown username, wrong password and a deactivated account all fail
    /// the same way so the login form leaks nothing.
    pub async fn login(&self, username: &str, password: &str) -> ResultEngine<Session> {
        let username = normalize_required(username, "username")?;
        if password.is_empty() {
            return Err(EngineError::Validation(
                "password must not be empty".to_string(),
            ));
        }
        let hash = md5_hex(password);

        with_tx!(self, |db_tx| {
            let user = users::Entity::find()
                .filter(users::Column::Username.eq(username.clone()))
                .filter(users::Column::PasswordHash.eq(hash.clone()))
                .filter(users::Column::IsActive.eq(true))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user".to_string()))?;

            let role = Role::try_from(user.role_id)?;
            let active = users::ActiveModel {
                user_id: ActiveValue::Set(user.user_id),
                last_login_date: ActiveValue::Set(Some(Utc::now())),
                ..Default::default()
            };
            active.update(&db_tx).await?;

            Ok(Session {
                user_id: user.user_id,
                role,
            })
        })
    }

    /// Replaces the caller's own password after verifying the current one.
    pub async fn change_password(
        &self,
        session: &Session,
        current: &str,
        new: &str,
    ) -> ResultEngine<()> {
        let new = normalize_required(new, "new password")?;
        with_tx!(self, |db_tx| {
            let user = users::Entity::find_by_id(session.user_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user".to_string()))?;

            if md5_hex(current) != user.password_hash {
                return Err(EngineError::Validation(
                    "current password is incorrect".to_string(),
                ));
            }

            let active = users::ActiveModel {
                user_id: ActiveValue::Set(user.user_id),
                password_hash: ActiveValue::Set(md5_hex(&new)),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }
}
