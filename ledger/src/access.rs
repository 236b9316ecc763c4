//! Privileged-call gating.

use crate::error::AccessError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tcrank_types::AccountId;

pub trait AccessControl {
    fn is_admin(&self, caller: &AccountId) -> bool;

    fn require_admin(&self, caller: &AccountId) -> Result<(), AccessError> {
        if self.is_admin(caller) {
            Ok(())
        } else {
            Err(AccessError::NotAdmin(caller.clone()))
        }
    }
}

/// A fixed set of administrator accounts.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AdminSet {
    admins: BTreeSet<AccountId>,
}

impl AdminSet {
    pub fn new<I>(admins: I) -> Self
    where
        I: IntoIterator<Item = AccountId>,
    {
        Self {
            admins: admins.into_iter().collect(),
        }
    }

    pub fn single(admin: AccountId) -> Self {
        Self::new([admin])
    }

    pub fn grant(&mut self, account: AccountId) -> bool {
        self.admins.insert(account)
    }

    pub fn revoke(&mut self, account: &AccountId) -> bool {
        self.admins.remove(account)
    }
}

impl AccessControl for AdminSet {
    fn is_admin(&self, caller: &AccountId) -> bool {
        self.admins.contains(caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_listed_accounts_pass() {
        let mut acl = AdminSet::single(AccountId::new("root"));
        assert!(acl.require_admin(&AccountId::new("root")).is_ok());
        assert_eq!(
            acl.require_admin(&AccountId::new("mallory")),
            Err(AccessError::NotAdmin(AccountId::new("mallory")))
        );
        acl.grant(AccountId::new("mallory"));
        assert!(acl.is_admin(&AccountId::new("mallory")));
        acl.revoke(&AccountId::new("root"));
        assert!(!acl.is_admin(&AccountId::new("root")));
    }
}
