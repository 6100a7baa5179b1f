//! Session info and profile endpoints.

use api_types::user::{ChangePassword, SessionInfo};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::Session;

use crate::{ServerError, server::ServerState};

/// Returns the caller's identity and capability flags.
///
/// Clients use the flags to hide add/edit/delete affordances; the engine
/// still checks every mutation, so this is convenience, not the boundary.
pub async fn get_session(
    Extension(session): Extension<Session>,
) -> Result<Json<SessionInfo>, ServerError> {
    Ok(Json(SessionInfo {
        user_id: session.user_id,
        role_id: session.role.as_i32(),
        can_manage: session.role.can_manage(),
        can_delete_hard: session.role.can_delete_hard(),
    }))
}

pub async fn change_password(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<ChangePassword>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .change_password(&session, &payload.current_password, &payload.new_password)
        .await?;
    Ok(StatusCode::OK)
}
