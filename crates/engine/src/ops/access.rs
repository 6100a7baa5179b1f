use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};

use crate::{
    EngineError, ResultEngine, Session, asset_statuses, categories, departments, employees,
    locations, manufacturers, positions, user_roles,
};

use super::Engine;

/// Generates `_exists` and `require_` methods for a reference entity.
macro_rules! impl_reference_exists {
    ($exists_fn:ident, $require_fn:ident, $entity:path, $err_msg:literal) => {
        async fn $exists_fn(&self, db: &DatabaseTransaction, id: i32) -> ResultEngine<bool> {
            <$entity>::find_by_id(id)
                .one(db)
                .await
                .map(|model| model.is_some())
                .map_err(Into::into)
        }

        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            id: i32,
        ) -> ResultEngine<()> {
            if !self.$exists_fn(db, id).await? {
                return Err(EngineError::KeyNotFound($err_msg.to_string()));
            }
            Ok(())
        }
    };
}

impl Engine {
    impl_reference_exists!(
        category_exists,
        require_category,
        categories::Entity,
        "category"
    );

    impl_reference_exists!(
        status_exists,
        require_status,
        asset_statuses::Entity,
        "status"
    );

    impl_reference_exists!(
        location_exists,
        require_location,
        locations::Entity,
        "location"
    );

    impl_reference_exists!(
        manufacturer_exists,
        require_manufacturer,
        manufacturers::Entity,
        "manufacturer"
    );

    impl_reference_exists!(
        department_exists,
        require_department,
        departments::Entity,
        "department"
    );

    impl_reference_exists!(
        position_exists,
        require_position,
        positions::Entity,
        "position"
    );

    impl_reference_exists!(role_exists, require_role, user_roles::Entity, "role");

    impl_reference_exists!(
        employee_exists,
        require_employee,
        employees::Entity,
        "employee"
    );

    /// Add/edit/dispose gate: administrator or manager.
    ///
    /// The UI hides the corresponding affordances as well, but this check is
    /// the boundary.
    pub(super) fn require_manage(&self, session: &Session) -> ResultEngine<()> {
        if !session.role.can_manage() {
            return Err(EngineError::Forbidden(
                "administrator or manager role required".to_string(),
            ));
        }
        Ok(())
    }

    /// Irreversible-delete gate: administrator only.
    pub(super) fn require_admin(&self, session: &Session) -> ResultEngine<()> {
        if !session.role.can_delete_hard() {
            return Err(EngineError::Forbidden(
                "administrator role required".to_string(),
            ));
        }
        Ok(())
    }

    /// Id of the status named «Списан», if present in the reference table.
    pub(super) async fn disposed_status_id(
        &self,
        db: &DatabaseTransaction,
    ) -> ResultEngine<Option<i32>> {
        let model = asset_statuses::Entity::find()
            .filter(
                asset_statuses::Column::StatusName.eq(asset_statuses::DISPOSED_STATUS_NAME),
            )
            .one(db)
            .await?;
        Ok(model.map(|m| m.status_id))
    }

    pub(super) async fn require_disposed_status_id(
        &self,
        db: &DatabaseTransaction,
    ) -> ResultEngine<i32> {
        self.disposed_status_id(db).await?.ok_or_else(|| {
            EngineError::KeyNotFound(format!(
                "status '{}'",
                asset_statuses::DISPOSED_STATUS_NAME
            ))
        })
    }
}
