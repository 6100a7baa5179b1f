//! Category management and reference-list endpoints.

use api_types::category::{CategoryList, CategorySave, CategorySaved, CategoryView};
use api_types::lookups::{LookupItem, Lookups};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{CategoryDraft, Session};

use crate::{ServerError, server::ServerState};

fn lookup_items(items: Vec<engine::LookupItem>) -> Vec<LookupItem> {
    items
        .into_iter()
        .map(|item| LookupItem {
            id: item.id,
            name: item.name,
        })
        .collect()
}

pub async fn list(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Query(query): Query<CategoryList>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let rows = state
        .engine
        .list_categories(&session, query.search.as_deref())
        .await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| CategoryView {
                category_id: row.category_id,
                name: row.name,
                description: row.description,
            })
            .collect(),
    ))
}

pub async fn save(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<CategorySave>,
) -> Result<(StatusCode, Json<CategorySaved>), ServerError> {
    let creating = payload.category_id.is_none();
    let draft = CategoryDraft {
        category_id: payload.category_id,
        name: payload.name,
        description: payload.description,
    };
    let id = state.engine.save_category(&session, &draft).await?;
    let status = if creating {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(CategorySaved { id })))
}

pub async fn delete(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(category_id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category(&session, category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Every reference list in one call, for the editor dropdowns.
pub async fn lookups(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<Lookups>, ServerError> {
    let lookups = state.engine.lookups(&session).await?;
    Ok(Json(Lookups {
        categories: lookup_items(lookups.categories),
        statuses: lookup_items(lookups.statuses),
        locations: lookup_items(lookups.locations),
        manufacturers: lookup_items(lookups.manufacturers),
        departments: lookup_items(lookups.departments),
        positions: lookup_items(lookups.positions),
        roles: lookup_items(lookups.roles),
    }))
}
