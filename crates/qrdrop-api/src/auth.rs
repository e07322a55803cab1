use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{error, info};
use url::Url;

use qrdrop_db::Database;
use qrdrop_types::access::Session;
use qrdrop_types::api::{AccountResponse, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use qrdrop_types::{Account, AccountFlags, Error as CoreError};

use crate::credential;
use crate::error::ApiError;
use crate::middleware::create_token;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// Base URL the service is reachable at, with a trailing slash.
    pub public_url: Url,
}

/// Run blocking DB work off the async runtime.
pub async fn run_blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("background task failed"))
        })?
}

/// Load an account that callers expect to exist (session owner, listed id).
pub fn load_account(db: &Database, id: i64) -> Result<Account, ApiError> {
    let row = db.get_account_by_id(id)?.ok_or(CoreError::NotFound(id))?;
    Ok(row.into_account()?)
}

/// Loose structural check: one `@`, non-empty local part, dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

pub fn register_account(db: &Database, session: Session, req: &RegisterRequest) -> Result<Account, ApiError> {
    if session.is_logged_in() {
        return Err(ApiError::Conflict("Already logged in to an account".into()));
    }

    let email = req.email.trim();
    if email.is_empty() {
        return Err(ApiError::bad_request("Missing email"));
    }
    if !is_valid_email(email) {
        return Err(ApiError::bad_request("Invalid email"));
    }
    if req.password.is_empty() || req.password_confirm.is_empty() {
        return Err(ApiError::bad_request("Missing password or password confirmation"));
    }
    if req.password != req.password_confirm {
        return Err(ApiError::bad_request("Passwords do not match"));
    }
    if req.password.chars().count() < 8 {
        return Err(ApiError::bad_request("Password must be at least 8 characters"));
    }

    if db.get_account_by_email(email)?.is_some() {
        return Err(ApiError::Conflict("Email already used".into()));
    }

    let account = Account::new_uninserted(email, credential::hash_password(&req.password)?, AccountFlags::NONE);
    let id = db.insert_account(account.email(), account.credential(), account.flags())?;
    let account = account
        .into_inserted(id)
        .ok_or_else(|| anyhow::anyhow!("Fresh account already had an id"))?;

    info!("Account {} registered ({})", id, account.email());
    Ok(account)
}

pub fn authenticate(db: &Database, session: Session, req: &LoginRequest) -> Result<Account, ApiError> {
    if session.is_logged_in() {
        return Err(ApiError::Conflict("Already logged in to an account".into()));
    }
    let email = req.email.trim();
    if email.is_empty() {
        return Err(ApiError::bad_request("Missing email"));
    }
    if !is_valid_email(email) {
        return Err(ApiError::bad_request("Invalid email"));
    }
    if req.password.is_empty() {
        return Err(ApiError::bad_request("Missing password"));
    }

    let account = db
        .get_account_by_email(email)?
        .ok_or(ApiError::InvalidCredentials)?
        .into_account()?;

    if !credential::verify_password(&req.password, account.credential()) {
        return Err(ApiError::InvalidCredentials);
    }

    Ok(account)
}

pub async fn register(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let account = run_blocking(&state, move |db| register_account(db, session, &req)).await?;
    let account_id = account
        .id()
        .ok_or_else(|| anyhow::anyhow!("Registered account has no id"))?;

    let token = create_token(&state.jwt_secret, account_id, account.email())?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            account_id,
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let account = run_blocking(&state, move |db| authenticate(db, session, &req)).await?;
    let account_id = account
        .id()
        .ok_or_else(|| anyhow::anyhow!("Stored account has no id"))?;

    let token = create_token(&state.jwt_secret, account_id, account.email())?;

    Ok(Json(LoginResponse {
        account_id,
        email: account.email().to_string(),
        token,
    }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, ApiError> {
    let id = session.require_login()?;
    let account = run_blocking(&state, move |db| load_account(db, id)).await?;
    Ok(Json(AccountResponse::new(id, &account)))
}
