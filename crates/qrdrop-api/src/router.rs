use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::middleware::resolve_session;
use crate::{manage, qr, transfers};

pub async fn health() -> &'static str {
    "ok"
}

/// Every route sees a `Session` extension; anonymous callers are turned
/// away by the handlers that need a login.
pub fn router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/transfer", get(transfers::load).post(transfers::save))
        .route("/manage/accounts", get(manage::get_accounts))
        .route("/manage/accounts/{id}", post(manage::update_account))
        .layer(middleware::from_fn_with_state(state.clone(), resolve_session))
        .with_state(state.clone());

    let public_routes = Router::new()
        .route("/qr", get(qr::get_qr))
        .route("/text", get(qr::get_text))
        .route("/health", get(health))
        .with_state(state);

    Router::new()
        .merge(session_routes)
        .merge(public_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
