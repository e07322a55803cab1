use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::access::PremiumAction;
use crate::flags::AccountFlags;
use crate::models::Account;
use crate::transfer::{Transfer, TransferKind};

// -- JWT Claims --

/// Bearer token claims. `sub` is the account id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub account_id: i64,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub account_id: i64,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: i64,
    pub email: String,
    pub flags: AccountFlags,
    pub premium: bool,
    pub manager: bool,
}

impl AccountResponse {
    pub fn new(id: i64, account: &Account) -> Self {
        Self {
            id,
            email: account.email().to_string(),
            flags: account.flags(),
            premium: account.has_flag(AccountFlags::PREMIUM),
            manager: account.has_flag(AccountFlags::MANAGER),
        }
    }
}

// -- Transfers --

/// `kind` is the raw form token (`url` or `text`).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveTransferRequest {
    pub kind: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferResponse {
    pub kind: TransferKind,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Transfer> for TransferResponse {
    fn from(transfer: Transfer) -> Self {
        Self {
            kind: transfer.kind(),
            created_at: transfer.created_at(),
            content: transfer.into_content(),
        }
    }
}

/// `transfer` is `None` when nothing is stored or the stored content has
/// expired; `expired` tells the two apart.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredTransferResponse {
    pub transfer: Option<TransferResponse>,
    pub expired: bool,
}

// -- Management --

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: i64,
    pub email: String,
    pub premium: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManageAccountRequest {
    pub action: PremiumAction,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
