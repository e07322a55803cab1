use serde::{Deserialize, Serialize};

/// Account permission bitmask.
///
/// Bit values are persisted and must never be renumbered. The gap between
/// `PREMIUM` and `MANAGER` is reserved for future flags. Unknown bits read
/// from storage are carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountFlags(u32);

impl AccountFlags {
    pub const NONE: Self = Self(0);
    /// Stored transfers never expire.
    pub const PREMIUM: Self = Self(1);
    /// May grant or revoke `PREMIUM` on other accounts.
    pub const MANAGER: Self = Self(64);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// `(flags & bit) == bit`. Check combinations one bit at a time.
    pub const fn has(self, bit: Self) -> bool {
        self.0 & bit.0 == bit.0
    }

    pub const fn grant(self, bit: Self) -> Self {
        Self(self.0 | bit.0)
    }

    pub const fn revoke(self, bit: Self) -> Self {
        Self(self.0 & !bit.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_then_has() {
        assert!(AccountFlags::NONE.grant(AccountFlags::PREMIUM).has(AccountFlags::PREMIUM));
        assert!(!AccountFlags::NONE.has(AccountFlags::PREMIUM));
    }

    #[test]
    fn revoke_clears_only_that_bit() {
        let flags = AccountFlags::PREMIUM.revoke(AccountFlags::PREMIUM);
        assert!(!flags.has(AccountFlags::PREMIUM));
        assert_eq!(flags, AccountFlags::NONE);
    }

    #[test]
    fn premium_and_manager_are_independent() {
        let manager = AccountFlags::MANAGER;
        let both = manager.grant(AccountFlags::PREMIUM);
        assert!(both.has(AccountFlags::MANAGER));
        assert!(both.has(AccountFlags::PREMIUM));
        assert_eq!(both.bits(), 65);

        let demoted = both.revoke(AccountFlags::PREMIUM);
        assert_eq!(demoted, AccountFlags::MANAGER);

        let premium_only = both.revoke(AccountFlags::MANAGER);
        assert_eq!(premium_only, AccountFlags::PREMIUM);
    }

    #[test]
    fn unknown_bits_survive() {
        let flags = AccountFlags::from_bits(0b1000_0010);
        let upgraded = flags.grant(AccountFlags::PREMIUM).revoke(AccountFlags::PREMIUM);
        assert_eq!(upgraded.bits(), 0b1000_0010);
    }

    #[test]
    fn none_is_always_contained() {
        assert!(AccountFlags::NONE.has(AccountFlags::NONE));
        assert!(AccountFlags::MANAGER.has(AccountFlags::NONE));
    }

    #[test]
    fn serializes_as_plain_integer() {
        let json = serde_json::to_string(&AccountFlags::MANAGER.grant(AccountFlags::PREMIUM)).unwrap();
        assert_eq!(json, "65");
    }
}
