use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use qrdrop_db::Database;
use qrdrop_types::access::{self, Session, TransferView};
use qrdrop_types::api::{SaveTransferRequest, StoredTransferResponse, TransferResponse};
use qrdrop_types::{Transfer, TransferKind};

use crate::auth::{AppState, load_account, run_blocking};
use crate::error::ApiError;

/// Transfers are meant for small things, not documents.
pub const MAX_CONTENT_CHARS: usize = 500;

/// Validate form input into a fresh transfer stamped at `now`.
pub fn new_transfer(kind: &str, content: &str, now: DateTime<Utc>) -> Result<Transfer, ApiError> {
    let kind: TransferKind = kind.parse()?;
    if content.trim().is_empty() {
        return Err(ApiError::bad_request("Transfer content is required"));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(ApiError::bad_request(format!(
            "Transfer content is limited to {} characters",
            MAX_CONTENT_CHARS
        )));
    }
    Ok(Transfer::new(kind, now, content)?)
}

/// Replace whatever the session's account had stored.
pub fn save_transfer(
    db: &Database,
    session: Session,
    kind: &str,
    content: &str,
    now: DateTime<Utc>,
) -> Result<Transfer, ApiError> {
    let account_id = session.require_login()?;
    let transfer = new_transfer(kind, content, now)?;
    // A valid token can outlive its account row
    load_account(db, account_id)?;
    db.upsert_transfer_for_account(account_id, &transfer.encode())?;
    info!("Account {} saved a {} transfer", account_id, transfer.kind());
    Ok(transfer)
}

/// What the session's account may see of its stored transfer at `now`.
pub fn load_transfer(db: &Database, session: Session, now: DateTime<Utc>) -> Result<TransferView, ApiError> {
    let account_id = session.require_login()?;
    let Some(raw) = db.get_transfer_for_account(account_id)? else {
        return Ok(TransferView::Nothing);
    };
    let stored = Transfer::decode(&raw)?;

    // Owner flags only matter once the window has passed
    if !stored.is_expired(now) {
        return Ok(TransferView::Visible(stored));
    }
    let owner = load_account(db, account_id)?;
    let view = access::visible_transfer(&owner, Some(stored), now);
    if view == TransferView::Expired {
        debug!("Stored transfer for account {} has expired", account_id);
    }
    Ok(view)
}

pub async fn save(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<SaveTransferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now();
    let transfer = run_blocking(&state, move |db| {
        save_transfer(db, session, &req.kind, &req.content, now)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(TransferResponse::from(transfer))))
}

pub async fn load(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now();
    let view = run_blocking(&state, move |db| load_transfer(db, session, now)).await?;

    let response = match view {
        TransferView::Visible(transfer) => StoredTransferResponse {
            transfer: Some(transfer.into()),
            expired: false,
        },
        TransferView::Expired => StoredTransferResponse { transfer: None, expired: true },
        TransferView::Nothing => StoredTransferResponse { transfer: None, expired: false },
    };
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use qrdrop_types::{AccountFlags, Denial, Error as CoreError};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap()
    }

    fn db_with_account(flags: AccountFlags) -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_account("owner@example.com", "cred", flags).unwrap();
        (db, id)
    }

    fn visible_content(view: TransferView) -> Option<String> {
        view.into_transfer().map(Transfer::into_content)
    }

    #[test]
    fn regular_account_sees_content_only_inside_window() {
        let (db, id) = db_with_account(AccountFlags::NONE);
        let session = Session::logged_in(id);
        save_transfer(&db, session, "text", "hello", t0()).unwrap();

        let at_30 = load_transfer(&db, session, t0() + Duration::seconds(30)).unwrap();
        assert_eq!(visible_content(at_30), Some("hello".into()));

        let at_90 = load_transfer(&db, session, t0() + Duration::seconds(90)).unwrap();
        assert_eq!(at_90, TransferView::Expired);

        // Hidden, not deleted
        assert!(db.get_transfer_for_account(id).unwrap().is_some());
    }

    #[test]
    fn premium_account_keeps_content() {
        let (db, id) = db_with_account(AccountFlags::PREMIUM);
        let session = Session::logged_in(id);
        save_transfer(&db, session, "text", "hello", t0()).unwrap();

        let at_90 = load_transfer(&db, session, t0() + Duration::seconds(90)).unwrap();
        assert_eq!(visible_content(at_90), Some("hello".into()));
    }

    #[test]
    fn new_save_resets_the_window() {
        let (db, id) = db_with_account(AccountFlags::NONE);
        let session = Session::logged_in(id);
        save_transfer(&db, session, "url", "https://old.example", t0()).unwrap();
        save_transfer(&db, session, "url", "https://new.example", t0() + Duration::seconds(120)).unwrap();

        let view = load_transfer(&db, session, t0() + Duration::seconds(150)).unwrap();
        assert_eq!(visible_content(view), Some("https://new.example".into()));
    }

    #[test]
    fn nothing_stored_yet() {
        let (db, id) = db_with_account(AccountFlags::NONE);
        let view = load_transfer(&db, Session::logged_in(id), t0()).unwrap();
        assert_eq!(view, TransferView::Nothing);
    }

    #[test]
    fn anonymous_cannot_save_or_load() {
        let (db, _) = db_with_account(AccountFlags::NONE);
        let err = save_transfer(&db, Session::anonymous(), "text", "hi", t0()).unwrap_err();
        assert!(matches!(err, ApiError::Core(CoreError::Unauthorized(Denial::LoginRequired))));

        let err = load_transfer(&db, Session::anonymous(), t0()).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn unknown_account_is_not_found() {
        let (db, id) = db_with_account(AccountFlags::NONE);
        let session = Session::logged_in(id + 100);

        let err = save_transfer(&db, session, "text", "hi", t0()).unwrap_err();
        assert!(matches!(err, ApiError::Core(CoreError::NotFound(missing)) if missing == id + 100));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn malformed_row_surfaces_as_error() {
        let (db, id) = db_with_account(AccountFlags::PREMIUM);
        db.upsert_transfer_for_account(id, "garbage").unwrap();
        let err = load_transfer(&db, Session::logged_in(id), t0()).unwrap_err();
        assert!(matches!(err, ApiError::Core(CoreError::MalformedRecord(_))));
    }

    #[test]
    fn input_validation() {
        assert!(matches!(
            new_transfer("image", "x", t0()),
            Err(ApiError::Core(CoreError::UnknownKind(_)))
        ));
        assert_eq!(new_transfer("text", "   ", t0()).unwrap_err().status(), StatusCode::BAD_REQUEST);

        let at_limit = "é".repeat(MAX_CONTENT_CHARS);
        assert!(new_transfer("text", &at_limit, t0()).is_ok());
        let too_long = "a".repeat(MAX_CONTENT_CHARS + 1);
        assert_eq!(new_transfer("text", &too_long, t0()).unwrap_err().status(), StatusCode::BAD_REQUEST);

        let far = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            new_transfer("text", "hi", far),
            Err(ApiError::Core(CoreError::MalformedRecord(_)))
        ));
    }
}
