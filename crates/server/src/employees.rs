//! Employees API endpoints.

use api_types::employee::{
    EmployeeCreated, EmployeeList, EmployeePage, EmployeeSave, EmployeeView, ToggleResult,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use engine::{AccountDraft, EmployeeDraft, EmployeeListFilter, EmployeeRow, Session};

use crate::{ServerError, server::ServerState};

fn draft_from_payload(payload: EmployeeSave) -> EmployeeDraft {
    EmployeeDraft {
        last_name: payload.last_name,
        first_name: payload.first_name,
        middle_name: payload.middle_name,
        email: payload.email,
        phone: payload.phone,
        position_id: payload.position_id,
        department_id: payload.department_id,
        hire_date: payload.hire_date,
        is_active: payload.is_active,
        photo: None,
        account: payload.account.map(|account| AccountDraft {
            username: account.username,
            password: account.password,
            role_id: account.role_id,
            is_active: account.is_active,
        }),
    }
}

fn filter_from_query(query: EmployeeList) -> EmployeeListFilter {
    EmployeeListFilter {
        search: query.search,
        department_id: query.department_id,
        position_id: query.position_id,
        active: query.active,
        page: query.page.unwrap_or(1),
        page_size: query.page_size.unwrap_or(20),
    }
}

fn view_from_row(row: EmployeeRow) -> EmployeeView {
    EmployeeView {
        employee_id: row.employee_id,
        full_name: row.full_name,
        email: row.email,
        phone: row.phone,
        position_name: row.position_name,
        department_name: row.department_name,
        hire_date: row.hire_date,
        employee_active: row.employee_active,
        account_active: row.account_active,
    }
}

pub async fn list(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Query(query): Query<EmployeeList>,
) -> Result<Json<EmployeePage>, ServerError> {
    let filter = filter_from_query(query);
    let page = state.engine.list_employees(&session, &filter).await?;

    Ok(Json(EmployeePage {
        items: page.items.into_iter().map(view_from_row).collect(),
        page: page.page,
        total_items: page.total_items,
        total_pages: page.total_pages,
    }))
}

pub async fn create(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<EmployeeSave>,
) -> Result<(StatusCode, Json<EmployeeCreated>), ServerError> {
    let draft = draft_from_payload(payload);
    let id = state.engine.create_employee(&session, &draft).await?;
    Ok((StatusCode::CREATED, Json(EmployeeCreated { id })))
}

pub async fn update(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(employee_id): Path<i32>,
    Json(payload): Json<EmployeeSave>,
) -> Result<StatusCode, ServerError> {
    let draft = draft_from_payload(payload);
    state
        .engine
        .update_employee(&session, employee_id, &draft)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn toggle_status(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(employee_id): Path<i32>,
) -> Result<Json<ToggleResult>, ServerError> {
    let is_active = state
        .engine
        .toggle_employee_status(&session, employee_id)
        .await?;
    Ok(Json(ToggleResult { is_active }))
}

pub async fn delete_hard(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(employee_id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_employee(&session, employee_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Exports the filtered listing as a CSV report.
pub async fn export_csv(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Query(query): Query<EmployeeList>,
) -> Result<impl IntoResponse, ServerError> {
    let mut filter = filter_from_query(query);
    filter.page = 1;
    filter.page_size = engine::NO_LIMIT;
    let page = state.engine.list_employees(&session, &filter).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "ФИО",
        "Email",
        "Телефон",
        "Должность",
        "Отдел",
        "Дата найма",
        "Статус",
    ])?;
    for row in page.items {
        let status = match row.account_active {
            Some(false) => "Неактивен",
            _ => "Активен",
        };
        writer.write_record([
            row.full_name,
            row.email.unwrap_or_default(),
            row.phone.unwrap_or_default(),
            row.position_name,
            row.department_name,
            row.hire_date.format("%d.%m.%Y").to_string(),
            status.to_string(),
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
