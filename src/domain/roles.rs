//! Role-based capability checks.
//!
//! Mutating vault operations name their caller and are gated by an
//! explicit allowed-caller predicate at the head of the operation:
//! Admin for the configuration surface, Game for the payout and
//! house-edge seam granted to wager games.

use std::collections::{HashMap, HashSet};

use super::error::LedgerError;
use super::token::Address;

/// Capabilities an account can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Configuration surface: token registration and parameters.
    Admin,
    /// Payout seam: pull pool funds and credit house edge.
    Game,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "ADMIN"),
            Self::Game => write!(f, "GAME"),
        }
    }
}

/// Allowed-caller sets per role.
#[derive(Debug, Clone, Default)]
pub struct RoleStore {
    grants: HashMap<Address, HashSet<Role>>,
}

impl RoleStore {
    /// Create a store with `admin` holding the Admin role.
    pub fn with_admin(admin: Address) -> Self {
        let mut store = Self::default();
        store.grant(admin, Role::Admin);
        store
    }

    /// Grant `role` to `account`. Idempotent.
    pub fn grant(&mut self, account: Address, role: Role) {
        self.grants.entry(account).or_default().insert(role);
    }

    /// Revoke `role` from `account`. Idempotent.
    pub fn revoke(&mut self, account: &Address, role: Role) {
        if let Some(roles) = self.grants.get_mut(account) {
            roles.remove(&role);
            if roles.is_empty() {
                self.grants.remove(account);
            }
        }
    }

    /// Whether `account` holds `role`.
    pub fn has(&self, account: &Address, role: Role) -> bool {
        self.grants
            .get(account)
            .is_some_and(|roles| roles.contains(&role))
    }

    /// Reject unless `account` holds `role`.
    pub fn ensure(&self, account: &Address, role: Role) -> Result<(), LedgerError> {
        if self.has(account, role) {
            Ok(())
        } else {
            Err(LedgerError::MissingRole {
                account: *account,
                role: role.to_string(),
            })
        }
    }
}
