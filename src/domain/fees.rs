//! House-edge fee splitting.
//!
//! Every fee the casino collects is divided among five recipients —
//! bank (the liquidity pool itself), dividend, partner, treasury, and
//! team — according to per-token basis-point weights that must sum to
//! exactly [`SPLIT_DENOMINATOR`].

use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::token::Amount;

/// Fixed denominator the five split weights must sum to.
pub const SPLIT_DENOMINATOR: u16 = 10_000;

/// Five-way basis-point breakdown of house-edge revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseEdgeSplit {
    /// Share credited straight to the liquidity pool.
    pub bank: u16,
    /// Share accrued for dividend distribution.
    pub dividend: u16,
    /// Share accrued for the token's partner.
    pub partner: u16,
    /// Share accrued for the treasury.
    pub treasury: u16,
    /// Share accrued for the team.
    pub team: u16,
}

impl HouseEdgeSplit {
    /// Build a split, validating that the weights sum to the denominator.
    pub fn new(
        bank: u16,
        dividend: u16,
        partner: u16,
        treasury: u16,
        team: u16,
    ) -> Result<Self, LedgerError> {
        let split = Self { bank, dividend, partner, treasury, team };
        split.validate()?;
        Ok(split)
    }

    /// The even 2000-bps-each split used throughout the fixtures.
    pub const fn even() -> Self {
        Self {
            bank: 2000,
            dividend: 2000,
            partner: 2000,
            treasury: 2000,
            team: 2000,
        }
    }

    /// Check the weights sum to exactly [`SPLIT_DENOMINATOR`].
    pub fn validate(&self) -> Result<(), LedgerError> {
        let sum = u32::from(self.bank)
            + u32::from(self.dividend)
            + u32::from(self.partner)
            + u32::from(self.treasury)
            + u32::from(self.team);
        if sum == u32::from(SPLIT_DENOMINATOR) {
            Ok(())
        } else {
            Err(LedgerError::InvalidSplit {
                sum,
                expected: u32::from(SPLIT_DENOMINATOR),
            })
        }
    }

    /// Divide `fee` across the five recipients.
    ///
    /// Integer flooring per share; the rounding remainder accrues to the
    /// bank share so the allocation always totals `fee` exactly.
    pub fn allocate(&self, fee: Amount) -> FeeAllocation {
        let share = |bps: u16| fee * Amount::from(bps) / Amount::from(SPLIT_DENOMINATOR);
        let dividend = share(self.dividend);
        let partner = share(self.partner);
        let treasury = share(self.treasury);
        let team = share(self.team);
        let bank = fee - dividend - partner - treasury - team;
        FeeAllocation { bank, dividend, partner, treasury, team }
    }
}

impl Default for HouseEdgeSplit {
    fn default() -> Self {
        Self::even()
    }
}

/// Concrete amounts resulting from one fee split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeAllocation {
    pub bank: Amount,
    pub dividend: Amount,
    pub partner: Amount,
    pub treasury: Amount,
    pub team: Amount,
}

impl FeeAllocation {
    /// Sum of all five shares; always equals the fee that was split.
    pub fn total(&self) -> Amount {
        self.bank + self.dividend + self.partner + self.treasury + self.team
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::UNIT;

    #[test]
    fn test_even_split_is_valid() {
        assert!(HouseEdgeSplit::even().validate().is_ok());
    }

    #[test]
    fn test_bad_sum_rejected() {
        let err = HouseEdgeSplit::new(2000, 2000, 2000, 2000, 1999).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidSplit { sum: 9999, expected: 10000 }
        ));
        assert!(HouseEdgeSplit::new(4000, 3000, 2000, 1000, 1000).is_err());
    }

    #[test]
    fn test_uneven_but_complete_split_accepted() {
        let split = HouseEdgeSplit::new(4000, 3000, 1500, 1000, 500).unwrap();
        assert_eq!(split.bank, 4000);
    }

    #[test]
    fn test_even_allocation() {
        let fee = UNIT / 5; // 0.2 tokens, the two 0.1 fees of one bet
        let alloc = HouseEdgeSplit::even().allocate(fee);
        assert_eq!(alloc.bank, fee / 5);
        assert_eq!(alloc.dividend, fee / 5);
        assert_eq!(alloc.total(), fee);
    }

    #[test]
    fn test_rounding_remainder_goes_to_bank() {
        let split = HouseEdgeSplit::even();
        let alloc = split.allocate(7);
        // 7 * 2000 / 10000 floors to 1 for each non-bank share.
        assert_eq!(alloc.dividend, 1);
        assert_eq!(alloc.partner, 1);
        assert_eq!(alloc.treasury, 1);
        assert_eq!(alloc.team, 1);
        assert_eq!(alloc.bank, 3);
        assert_eq!(alloc.total(), 7);
    }

    #[test]
    fn test_zero_fee_allocates_zero() {
        let alloc = HouseEdgeSplit::even().allocate(0);
        assert_eq!(alloc.total(), 0);
    }
}
