use crate::flags::AccountFlags;

/// A registered user.
///
/// `id` is `None` until the account has been persisted and never changes
/// afterwards. The credential is an opaque password-hash string; this type
/// never sees a raw password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: Option<i64>,
    email: String,
    credential: String,
    flags: AccountFlags,
}

impl Account {
    /// An account that has not been stored yet.
    pub fn new_uninserted(email: &str, credential: String, flags: AccountFlags) -> Self {
        Self {
            id: None,
            email: normalize_email(email),
            credential,
            flags,
        }
    }

    /// An account loaded from storage.
    pub fn from_stored(id: i64, email: &str, credential: String, flags: AccountFlags) -> Self {
        Self {
            id: Some(id),
            email: normalize_email(email),
            credential,
            flags,
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn flags(&self) -> AccountFlags {
        self.flags
    }

    pub fn has_flag(&self, bit: AccountFlags) -> bool {
        self.flags.has(bit)
    }

    /// Record the id assigned by storage. Returns `None` if the account
    /// already had one.
    pub fn into_inserted(self, id: i64) -> Option<Self> {
        if self.id.is_some() {
            return None;
        }
        Some(Self { id: Some(id), ..self })
    }

    /// Flags after a successful write; the caller performs the write.
    pub fn with_flags(self, flags: AccountFlags) -> Self {
        Self { flags, ..self }
    }

    pub fn with_credential(self, credential: String) -> Self {
        Self { credential, ..self }
    }
}

/// Emails are compared and stored lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_lowercased() {
        let account = Account::new_uninserted("Alice@Example.COM", "hash".into(), AccountFlags::NONE);
        assert_eq!(account.email(), "alice@example.com");
        assert_eq!(account.id(), None);
    }

    #[test]
    fn id_assigned_once() {
        let account = Account::new_uninserted("a@b.co", "hash".into(), AccountFlags::NONE);
        let stored = account.into_inserted(7).unwrap();
        assert_eq!(stored.id(), Some(7));
        assert!(stored.into_inserted(8).is_none());
    }

    #[test]
    fn with_flags_keeps_identity() {
        let account = Account::from_stored(3, "a@b.co", "hash".into(), AccountFlags::NONE);
        let upgraded = account.with_flags(AccountFlags::PREMIUM);
        assert_eq!(upgraded.id(), Some(3));
        assert!(upgraded.has_flag(AccountFlags::PREMIUM));
    }
}
