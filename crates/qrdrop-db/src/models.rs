use anyhow::{Result, anyhow};
use qrdrop_types::api::AccountSummary;
use qrdrop_types::{Account, AccountFlags};

/// Database row types. These map directly to SQLite rows.
/// Distinct from qrdrop-types models to keep the DB layer independent.
pub struct AccountRow {
    pub id: i64,
    pub email: String,
    pub credential: String,
    pub flags: i64,
    pub created_at: String,
}

fn stored_flags(id: i64, flags: i64) -> Result<AccountFlags> {
    let bits = u32::try_from(flags).map_err(|_| anyhow!("Corrupt flags {} on account {}", flags, id))?;
    Ok(AccountFlags::from_bits(bits))
}

impl AccountRow {
    pub fn into_account(self) -> Result<Account> {
        let flags = stored_flags(self.id, self.flags)?;
        Ok(Account::from_stored(self.id, &self.email, self.credential, flags))
    }
}

/// Listing row for the management view; no credential.
pub struct AccountSummaryRow {
    pub id: i64,
    pub email: String,
    pub flags: i64,
}

impl AccountSummaryRow {
    pub fn into_summary(self) -> Result<AccountSummary> {
        let flags = stored_flags(self.id, self.flags)?;
        Ok(AccountSummary {
            id: self.id,
            email: self.email,
            premium: flags.has(AccountFlags::PREMIUM),
        })
    }
}
