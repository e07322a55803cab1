use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::info;

use qrdrop_db::Database;
use qrdrop_types::access::{self, PremiumAction, Session};
use qrdrop_types::api::{AccountResponse, AccountSummary, ManageAccountRequest};
use qrdrop_types::Account;

use crate::auth::{AppState, load_account, run_blocking};
use crate::error::ApiError;

/// The logged-in account, provided it carries `MANAGER`.
fn require_manager_session(db: &Database, session: Session) -> Result<Account, ApiError> {
    let actor = load_account(db, session.require_login()?)?;
    access::require_manager(&actor)?;
    Ok(actor)
}

/// Every account with its premium status. Stored transfers are not exposed.
pub fn list_accounts(db: &Database, session: Session) -> Result<Vec<AccountSummary>, ApiError> {
    require_manager_session(db, session)?;

    let accounts = db
        .list_accounts()?
        .into_iter()
        .map(|row| row.into_summary())
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(accounts)
}

/// Upgrade or downgrade `target_id` and persist the new flags.
pub fn set_premium(
    db: &Database,
    session: Session,
    target_id: i64,
    action: PremiumAction,
) -> Result<Account, ApiError> {
    let actor = require_manager_session(db, session)?;
    let target = load_account(db, target_id)?;

    let flags = access::change_premium(&actor, &target, action)?;
    db.update_account_flags(target_id, flags)?;

    info!(
        "Manager {} changed premium on account {} ({:?}): flags {} -> {}",
        actor.email(),
        target_id,
        action,
        target.flags().bits(),
        flags.bits()
    );
    Ok(target.with_flags(flags))
}

pub async fn get_accounts(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, ApiError> {
    let accounts = run_blocking(&state, move |db| list_accounts(db, session)).await?;
    Ok(Json(accounts))
}

pub async fn update_account(
    State(state): State<AppState>,
    Path(target_id): Path<i64>,
    Extension(session): Extension<Session>,
    Json(req): Json<ManageAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let account = run_blocking(&state, move |db| {
        set_premium(db, session, target_id, req.action)
    })
    .await?;

    Ok(Json(AccountResponse::new(target_id, &account)))
}
