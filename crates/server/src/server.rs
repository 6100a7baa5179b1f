use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{assets, categories, employees, statistics, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Resolves Basic credentials to a [`engine::Session`] on every request.
///
/// Credentials go through `Engine::login`, so a successful request also
/// stamps the account's last-login time. The resulting session travels in
/// request extensions; handlers never see the password.
async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let session = state
        .engine
        .login(auth_header.username(), auth_header.password())
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/session", get(user::get_session))
        .route("/user/password", post(user::change_password))
        .route("/assets", get(assets::list).post(assets::create))
        .route("/assets/export", get(assets::export_csv))
        .route("/assets/dispose", post(assets::dispose))
        .route("/assets/delete", post(assets::delete_hard))
        .route("/assets/{id}", axum::routing::patch(assets::update))
        .route("/assets/{id}/move", post(assets::relocate))
        .route("/employees", get(employees::list).post(employees::create))
        .route("/employees/export", get(employees::export_csv))
        .route(
            "/employees/{id}",
            axum::routing::patch(employees::update).delete(employees::delete_hard),
        )
        .route("/employees/{id}/toggle", post(employees::toggle_status))
        .route(
            "/categories",
            get(categories::list).post(categories::save),
        )
        .route(
            "/categories/{id}",
            axum::routing::delete(categories::delete),
        )
        .route("/lookups", get(categories::lookups))
        .route("/stats", get(statistics::get_stats))
        .route("/stats/categories", get(statistics::category_breakdown))
        .route("/stats/recent", get(statistics::recent_assets))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
