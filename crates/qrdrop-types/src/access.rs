use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Denial, Error};
use crate::flags::AccountFlags;
use crate::models::Account;
use crate::transfer::Transfer;

/// Who is making the request. Passed explicitly into every check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Session {
    account_id: Option<i64>,
}

impl Session {
    pub const fn anonymous() -> Self {
        Self { account_id: None }
    }

    pub const fn logged_in(account_id: i64) -> Self {
        Self {
            account_id: Some(account_id),
        }
    }

    pub fn account_id(&self) -> Option<i64> {
        self.account_id
    }

    pub fn is_logged_in(&self) -> bool {
        self.account_id.is_some()
    }

    /// Saving and viewing a per-account transfer both need a login.
    pub fn require_login(&self) -> Result<i64, Error> {
        self.account_id
            .ok_or(Error::Unauthorized(Denial::LoginRequired))
    }
}

/// What the owner gets to see of their stored transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferView {
    Visible(Transfer),
    /// A row exists but is past the window; shown as nothing stored.
    Expired,
    Nothing,
}

impl TransferView {
    pub fn into_transfer(self) -> Option<Transfer> {
        match self {
            TransferView::Visible(transfer) => Some(transfer),
            TransferView::Expired | TransferView::Nothing => None,
        }
    }
}

/// Premium owners bypass expiration entirely. Expired content is hidden,
/// never deleted; a later save overwrites it.
pub fn visible_transfer(owner: &Account, stored: Option<Transfer>, now: DateTime<Utc>) -> TransferView {
    match stored {
        None => TransferView::Nothing,
        Some(transfer) if !transfer.is_expired(now) => TransferView::Visible(transfer),
        Some(transfer) if owner.has_flag(AccountFlags::PREMIUM) => TransferView::Visible(transfer),
        Some(_) => TransferView::Expired,
    }
}

pub fn require_manager(actor: &Account) -> Result<(), Error> {
    if actor.has_flag(AccountFlags::MANAGER) {
        Ok(())
    } else {
        Err(Error::Unauthorized(Denial::ManagerRequired))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PremiumAction {
    Upgrade,
    Downgrade,
}

/// Compute the target's new flags for a premium toggle by `actor`.
///
/// Only `PREMIUM` is ever touched, so a manager can never be demoted
/// through this path. Persisting the result is the caller's job.
pub fn change_premium(
    actor: &Account,
    target: &Account,
    action: PremiumAction,
) -> Result<AccountFlags, Error> {
    require_manager(actor)?;

    let current = target.flags();
    let premium = current.has(AccountFlags::PREMIUM);
    match action {
        PremiumAction::Upgrade if premium => Err(Error::AlreadyPremium),
        PremiumAction::Upgrade => Ok(current.grant(AccountFlags::PREMIUM)),
        PremiumAction::Downgrade if !premium => Err(Error::NotPremium),
        PremiumAction::Downgrade => Ok(current.revoke(AccountFlags::PREMIUM)),
    }
}
