use crate::models::{AccountRow, AccountSummaryRow};
use crate::Database;
use anyhow::Result;
use qrdrop_types::AccountFlags;
use qrdrop_types::models::normalize_email;
use rusqlite::Connection;

impl Database {
    // -- Accounts --

    /// Insert a new account and return its assigned id.
    pub fn insert_account(&self, email: &str, credential: &str, flags: AccountFlags) -> Result<i64> {
        let email = normalize_email(email);
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO accounts (email, credential, flags) VALUES (?1, ?2, ?3)",
                rusqlite::params![email, credential, i64::from(flags.bits())],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_account_by_email(&self, email: &str) -> Result<Option<AccountRow>> {
        let email = normalize_email(email);
        self.with_conn(|conn| query_account(conn, "email", &email))
    }

    pub fn get_account_by_id(&self, id: i64) -> Result<Option<AccountRow>> {
        self.with_conn(|conn| query_account(conn, "id", &id))
    }

    pub fn list_accounts(&self) -> Result<Vec<AccountSummaryRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, email, flags FROM accounts ORDER BY id")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(AccountSummaryRow {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        flags: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_account_flags(&self, id: i64, flags: AccountFlags) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE accounts SET flags = ?1 WHERE id = ?2",
                rusqlite::params![i64::from(flags.bits()), id],
            )?;
            Ok(())
        })
    }

    pub fn update_account_credential(&self, id: i64, credential: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE accounts SET credential = ?1 WHERE id = ?2",
                rusqlite::params![credential, id],
            )?;
            Ok(())
        })
    }

    // -- Transfers --

    /// Raw encoded transfer for the account, if one was ever saved.
    pub fn get_transfer_for_account(&self, account_id: i64) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT content FROM transfers WHERE account_id = ?1",
                [account_id],
                |row| row.get(0),
            )
            .optional()
        })
    }

    /// Last write wins; there is no history.
    pub fn upsert_transfer_for_account(&self, account_id: i64, raw: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO transfers (account_id, content) VALUES (?1, ?2)
                 ON CONFLICT(account_id) DO UPDATE SET content = excluded.content",
                rusqlite::params![account_id, raw],
            )?;
            Ok(())
        })
    }
}

fn query_account(
    conn: &Connection,
    column: &str,
    value: &dyn rusqlite::types::ToSql,
) -> Result<Option<AccountRow>> {
    let sql = format!(
        "SELECT id, email, credential, flags, created_at FROM accounts WHERE {} = ?1",
        column
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(AccountRow {
                id: row.get(0)?,
                email: row.get(1)?,
                credential: row.get(2)?,
                flags: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
