//! Liquidity-pool share accounting.
//!
//! A token's pool tracks a balance and the shares that lay claim to it.
//! Shares are minted proportionally on deposit and burned on
//! withdrawal; all division floors, so rounding dust always stays with
//! the pool rather than leaking to the redeeming holder.

use std::collections::HashMap;

use super::error::LedgerError;
use super::token::{Address, Amount};

/// Floor of `a * b / d` with a full 256-bit intermediate product.
///
/// 18-decimal pool balances multiply well past `u128`, so the product
/// is carried as two 128-bit limbs and reduced by restoring division.
/// Saturates if the true quotient does not fit (`d` must be non-zero).
pub fn mul_div(a: Amount, b: Amount, d: Amount) -> Amount {
    debug_assert!(d != 0);
    let (hi, lo) = mul_wide(a, b);
    if hi == 0 {
        return lo / d;
    }
    if hi >= d {
        return Amount::MAX;
    }
    div_wide(hi, lo, d)
}

/// 128x128 -> 256 multiplication as (hi, lo) limbs.
const fn mul_wide(a: Amount, b: Amount) -> (Amount, Amount) {
    const MASK: Amount = (1 << 64) - 1;
    let (ah, al) = (a >> 64, a & MASK);
    let (bh, bl) = (b >> 64, b & MASK);

    let ll = al * bl;
    let lh = al * bh;
    let hl = ah * bl;
    let hh = ah * bh;

    let (mid, mid_carry) = lh.overflowing_add(hl);
    let (lo, lo_carry) = ll.overflowing_add(mid << 64);
    let hi = hh
        + (mid >> 64)
        + ((mid_carry as Amount) << 64)
        + lo_carry as Amount;
    (hi, lo)
}

/// 256 / 128 restoring division; the caller guarantees `hi < d`, which
/// makes the quotient fit in 128 bits.
fn div_wide(mut hi: Amount, mut lo: Amount, d: Amount) -> Amount {
    let mut quotient: Amount = 0;
    let mut remainder: Amount = 0;
    for _ in 0..256 {
        // The bit shifted out of the 128-bit remainder window; if set,
        // the 129-bit remainder necessarily exceeds `d`.
        let spill = remainder >> 127;
        remainder = (remainder << 1) | (hi >> 127);
        hi = (hi << 1) | (lo >> 127);
        lo <<= 1;
        quotient <<= 1;
        if spill == 1 || remainder >= d {
            remainder = remainder.wrapping_sub(d);
            quotient |= 1;
        }
    }
    quotient
}

/// Shares minted for a deposit into a pool.
///
/// An empty pool mints 1:1; otherwise the depositor receives
/// `deposit * total_shares / pool_balance`.
pub fn shares_for_deposit(deposit: Amount, total_shares: Amount, pool_balance: Amount) -> Amount {
    if total_shares == 0 || pool_balance == 0 {
        deposit
    } else {
        mul_div(deposit, total_shares, pool_balance)
    }
}

/// Pool balance released when burning `shares` of `total_shares`.
pub fn amount_for_shares(shares: Amount, total_shares: Amount, pool_balance: Amount) -> Amount {
    if total_shares == 0 {
        0
    } else {
        mul_div(shares, pool_balance, total_shares)
    }
}

/// Per-token liquidity pool: pooled balance, outstanding shares, and
/// each provider's share account.
#[derive(Debug, Clone, Default)]
pub struct TokenPool {
    /// Pooled token balance backing the shares.
    pub balance: Amount,
    /// Total shares outstanding.
    pub total_shares: Amount,
    /// Share balance per provider.
    accounts: HashMap<Address, Amount>,
}

impl TokenPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shares held by `account`.
    pub fn shares_of(&self, account: &Address) -> Amount {
        self.accounts.get(account).copied().unwrap_or(0)
    }

    /// Credit a deposit and mint the proportional shares to `account`.
    ///
    /// Returns the shares minted.
    pub fn deposit(&mut self, account: Address, amount: Amount) -> Amount {
        let minted = shares_for_deposit(amount, self.total_shares, self.balance);
        self.balance += amount;
        self.total_shares += minted;
        *self.accounts.entry(account).or_insert(0) += minted;
        minted
    }

    /// Burn `shares` from `account` and release the proportional balance.
    ///
    /// Returns the amount released.
    pub fn withdraw(&mut self, account: &Address, shares: Amount) -> Result<Amount, LedgerError> {
        let held = self.shares_of(account);
        if shares > held {
            return Err(LedgerError::InsufficientShares {
                account: *account,
                held,
                requested: shares,
            });
        }
        let released = amount_for_shares(shares, self.total_shares, self.balance);
        self.balance -= released;
        self.total_shares -= shares;
        if let Some(entry) = self.accounts.get_mut(account) {
            *entry -= shares;
            if *entry == 0 {
                self.accounts.remove(account);
            }
        }
        Ok(released)
    }

    /// Credit an inflow (house-edge bank share, harvested dividends) that
    /// accrues to existing shareholders without minting shares.
    pub fn credit(&mut self, amount: Amount) {
        self.balance += amount;
    }

    /// Debit a payout from the pool without burning shares.
    pub fn debit(&mut self, token: &Address, amount: Amount) -> Result<(), LedgerError> {
        if amount > self.balance {
            return Err(LedgerError::InsufficientPoolBalance {
                token: *token,
                held: self.balance,
                requested: amount,
            });
        }
        self.balance -= amount;
        Ok(())
    }
}
