//! Acting-user session and role predicates.
//!
//! A [`Session`] is produced by a successful login and passed explicitly to
//! every engine operation; there is no process-wide current-user state.

use crate::EngineError;

/// Account role, stored as an integer in the `users` table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Administrator,
    Manager,
    User,
}

impl Role {
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Administrator => 1,
            Self::Manager => 2,
            Self::User => 3,
        }
    }

    /// True for roles allowed to add/edit/dispose records.
    pub fn can_manage(self) -> bool {
        matches!(self, Self::Administrator | Self::Manager)
    }

    /// True for the role allowed to hard-delete records.
    pub fn can_delete_hard(self) -> bool {
        matches!(self, Self::Administrator)
    }
}

impl TryFrom<i32> for Role {
    type Error = EngineError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Administrator),
            2 => Ok(Self::Manager),
            3 => Ok(Self::User),
            other => Err(EngineError::Validation(format!("invalid role id: {other}"))),
        }
    }
}

/// Authenticated caller identity, resolved once per request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Session {
    pub user_id: i32,
    pub role: Role,
}

/// `true` when a session is present and its role may add/edit/dispose.
pub fn can_manage(session: Option<&Session>) -> bool {
    session.is_some_and(|s| s.role.can_manage())
}

/// `true` when a session is present and its role may hard-delete.
pub fn can_delete_hard(session: Option<&Session>) -> bool {
    session.is_some_and(|s| s.role.can_delete_hard())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> Session {
        Session { user_id: 7, role }
    }

    #[test]
    fn manage_allowed_for_admin_and_manager() {
        assert!(can_manage(Some(&session(Role::Administrator))));
        assert!(can_manage(Some(&session(Role::Manager))));
    }

    #[test]
    fn manage_denied_for_plain_user_and_missing_session() {
        assert!(!can_manage(Some(&session(Role::User))));
        assert!(!can_manage(None));
    }

    #[test]
    fn hard_delete_is_admin_only() {
        assert!(can_delete_hard(Some(&session(Role::Administrator))));
        assert!(!can_delete_hard(Some(&session(Role::Manager))));
        assert!(!can_delete_hard(Some(&session(Role::User))));
        assert!(!can_delete_hard(None));
    }

    #[test]
    fn role_roundtrip() {
        for id in 1..=3 {
            assert_eq!(Role::try_from(id).unwrap().as_i32(), id);
        }
        assert!(Role::try_from(0).is_err());
        assert!(Role::try_from(4).is_err());
    }
}
