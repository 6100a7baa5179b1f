//! Assets API endpoints.

use api_types::asset::{
    AssetCreated, AssetIds, AssetList, AssetMove, AssetPage, AssetSave, AssetView, DeleteReport,
    DisposedReport,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use engine::{AssetDraft, AssetListFilter, AssetRow, Session};

use crate::{ServerError, server::ServerState};

fn draft_from_payload(payload: AssetSave) -> AssetDraft {
    AssetDraft {
        code: payload.code,
        name: payload.name,
        description: payload.description,
        model: payload.model,
        serial_number: payload.serial_number,
        category_id: payload.category_id,
        status_id: payload.status_id,
        location_id: payload.location_id,
        manufacturer_id: payload.manufacturer_id,
        responsible_employee_id: payload.responsible_employee_id,
        purchase_date: payload.purchase_date,
        price_text: payload.price,
        is_active: payload.is_active,
    }
}

fn filter_from_query(query: AssetList) -> AssetListFilter {
    AssetListFilter {
        search: query.search,
        status_id: query.status_id,
        category_id: query.category_id,
        location_id: query.location_id,
        page: query.page.unwrap_or(1),
        page_size: query.page_size.unwrap_or(20),
    }
}

fn view_from_row(row: AssetRow) -> AssetView {
    AssetView {
        asset_id: row.asset_id,
        asset_code: row.asset_code,
        asset_name: row.asset_name,
        model: row.model,
        serial_number: row.serial_number,
        category_name: row.category_name,
        status_name: row.status_name,
        location_name: row.location_name,
        responsible_name: row.responsible_name,
        purchase_date: row.purchase_date,
        purchase_price: row.purchase_price,
        is_active: row.is_active,
        created_date: row.created_date,
    }
}

pub async fn list(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Query(query): Query<AssetList>,
) -> Result<Json<AssetPage>, ServerError> {
    let filter = filter_from_query(query);
    let page = state.engine.list_assets(&session, &filter).await?;

    Ok(Json(AssetPage {
        items: page.items.into_iter().map(view_from_row).collect(),
        page: page.page,
        total_items: page.total_items,
        total_pages: page.total_pages,
    }))
}

pub async fn create(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<AssetSave>,
) -> Result<(StatusCode, Json<AssetCreated>), ServerError> {
    let draft = draft_from_payload(payload);
    let id = state.engine.create_asset(&session, &draft).await?;
    Ok((StatusCode::CREATED, Json(AssetCreated { id })))
}

pub async fn update(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(asset_id): Path<i32>,
    Json(payload): Json<AssetSave>,
) -> Result<StatusCode, ServerError> {
    let draft = draft_from_payload(payload);
    state.engine.update_asset(&session, asset_id, &draft).await?;
    Ok(StatusCode::OK)
}

pub async fn dispose(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<AssetIds>,
) -> Result<Json<DisposedReport>, ServerError> {
    if payload.ids.is_empty() {
        return Err(ServerError::Generic("ids must not be empty".to_string()));
    }
    let disposed = state.engine.dispose_assets(&session, &payload.ids).await?;
    Ok(Json(DisposedReport { disposed }))
}

pub async fn delete_hard(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<AssetIds>,
) -> Result<Json<DeleteReport>, ServerError> {
    if payload.ids.is_empty() {
        return Err(ServerError::Generic("ids must not be empty".to_string()));
    }
    let outcome = state.engine.delete_assets(&session, &payload.ids).await?;
    Ok(Json(DeleteReport {
        deleted: outcome.deleted,
        skipped: outcome.skipped,
    }))
}

pub async fn relocate(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(asset_id): Path<i32>,
    Json(payload): Json<AssetMove>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .move_asset(
            &session,
            asset_id,
            payload.to_location_id,
            payload.note.as_deref(),
        )
        .await?;
    Ok(StatusCode::OK)
}

/// Exports the filtered listing as a CSV report (page size is forced to
/// "show all").
pub async fn export_csv(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Query(query): Query<AssetList>,
) -> Result<impl IntoResponse, ServerError> {
    let mut filter = filter_from_query(query);
    filter.page = 1;
    filter.page_size = engine::NO_LIMIT;
    let page = state.engine.list_assets(&session, &filter).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "ID",
        "Код",
        "Название",
        "Модель",
        "Серийный номер",
        "Категория",
        "Статус",
        "Местоположение",
        "Ответственный",
        "Цена",
        "Дата покупки",
    ])?;
    for row in page.items {
        writer.write_record([
            row.asset_id.to_string(),
            row.asset_code,
            row.asset_name,
            row.model.unwrap_or_default(),
            row.serial_number.unwrap_or_default(),
            row.category_name,
            row.status_name,
            row.location_name,
            row.responsible_name.unwrap_or_default(),
            row.purchase_price
                .map(|p| p.to_string())
                .unwrap_or_default(),
            row.purchase_date
                .map(|d| d.format("%d.%m.%Y").to_string())
                .unwrap_or_default(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ServerError::Generic(err.to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        bytes,
    ))
}
