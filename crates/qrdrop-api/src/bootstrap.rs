use anyhow::Result;
use tracing::{debug, info};

use qrdrop_db::Database;
use qrdrop_types::{Account, AccountFlags};

use crate::credential;

/// Make sure `email` maps to a manager account that accepts `password`.
///
/// Existing accounts keep their id and other flags; `MANAGER` is OR'd in
/// and the credential is replaced only when `password` no longer verifies
/// against it. Running this repeatedly is a no-op after the first call.
pub fn ensure_manager_account(db: &Database, email: &str, password: &str) -> Result<i64> {
    let Some(row) = db.get_account_by_email(email)? else {
        let account = Account::new_uninserted(email, credential::hash_password(password)?, AccountFlags::MANAGER);
        let id = db.insert_account(account.email(), account.credential(), account.flags())?;
        info!("Created manager account {} ({})", id, account.email());
        return Ok(id);
    };

    let id = row.id;
    let account = row.into_account()?;
    let is_manager = account.has_flag(AccountFlags::MANAGER);
    let credential_ok = credential::verify_password(password, account.credential());

    if is_manager && credential_ok {
        debug!("Manager account {} already in place", id);
        return Ok(id);
    }

    if !is_manager {
        let flags = account.flags().grant(AccountFlags::MANAGER);
        db.update_account_flags(id, flags)?;
        info!("Granted manager flag to account {} ({})", id, account.email());
    }

    if !credential_ok {
        db.update_account_credential(id, &credential::hash_password(password)?)?;
        info!("Reset manager credential for account {}", id);
    }

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMAIL: &str = "admin@qrdrop.test";
    const PASSWORD: &str = "!aSecurePassword";

    #[test]
    fn creates_missing_manager() {
        let db = Database::open_in_memory().unwrap();
        let id = ensure_manager_account(&db, EMAIL, PASSWORD).unwrap();

        let account = db.get_account_by_id(id).unwrap().unwrap().into_account().unwrap();
        assert!(account.has_flag(AccountFlags::MANAGER));
        assert!(credential::verify_password(PASSWORD, account.credential()));
    }

    #[test]
    fn idempotent() {
        let db = Database::open_in_memory().unwrap();
        let first = ensure_manager_account(&db, EMAIL, PASSWORD).unwrap();
        let stored = db.get_account_by_id(first).unwrap().unwrap().credential;

        let second = ensure_manager_account(&db, EMAIL, PASSWORD).unwrap();
        assert_eq!(first, second);

        let accounts = db.list_accounts().unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].flags, i64::from(AccountFlags::MANAGER.bits()));

        // Matching credential is left alone
        let after = db.get_account_by_id(first).unwrap().unwrap().credential;
        assert_eq!(stored, after);
    }

    #[test]
    fn promotes_existing_account_and_keeps_premium() {
        let db = Database::open_in_memory().unwrap();
        let existing = db
            .insert_account(EMAIL, &credential::hash_password("old password").unwrap(), AccountFlags::PREMIUM)
            .unwrap();

        let id = ensure_manager_account(&db, "Admin@QRDrop.test", PASSWORD).unwrap();
        assert_eq!(id, existing);

        let account = db.get_account_by_id(id).unwrap().unwrap().into_account().unwrap();
        assert!(account.has_flag(AccountFlags::MANAGER));
        assert!(account.has_flag(AccountFlags::PREMIUM));
        assert!(credential::verify_password(PASSWORD, account.credential()));
        assert!(!credential::verify_password("old password", account.credential()));
    }

    #[test]
    fn resets_credential_of_existing_manager() {
        let db = Database::open_in_memory().unwrap();
        let existing = db
            .insert_account(EMAIL, "not-a-phc-string", AccountFlags::MANAGER)
            .unwrap();

        let id = ensure_manager_account(&db, EMAIL, PASSWORD).unwrap();
        assert_eq!(id, existing);

        let row = db.get_account_by_id(id).unwrap().unwrap();
        assert_eq!(row.flags, i64::from(AccountFlags::MANAGER.bits()));
        assert!(credential::verify_password(PASSWORD, &row.credential));
    }
}
