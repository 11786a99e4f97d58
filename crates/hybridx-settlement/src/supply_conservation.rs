//! Supply conservation invariant checker.
//!
//! Invariant enforced after every batch:
//! ```text
//! ∀ asset: Σ balances == Σ deposits - Σ withdrawals
//! ```
//!
//! Transfers only move value between accounts, so any drift means a batch
//! was applied partially or twice.

use std::collections::BTreeMap;

use hybridx_types::{Amount, Asset, HybridxError, Result};

/// Per-asset deposit and withdrawal totals.
#[derive(Debug, Clone, Default)]
pub struct SupplyConservation {
    deposits: BTreeMap<Asset, Amount>,
    withdrawals: BTreeMap<Asset, Amount>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_deposit(&mut self, asset: Asset, amount: Amount) -> Result<()> {
        let total = self.deposits.entry(asset).or_insert(0);
        *total = total
            .checked_add(amount)
            .ok_or(HybridxError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn record_withdrawal(&mut self, asset: Asset, amount: Amount) -> Result<()> {
        let total = self.withdrawals.entry(asset).or_insert(0);
        *total = total
            .checked_add(amount)
            .ok_or(HybridxError::ArithmeticOverflow)?;
        Ok(())
    }

    #[must_use]
    pub fn total_deposits(&self, asset: Asset) -> Amount {
        self.deposits.get(&asset).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_withdrawals(&self, asset: Asset) -> Amount {
        self.withdrawals.get(&asset).copied().unwrap_or(0)
    }

    /// Deposits minus withdrawals.
    pub fn expected_supply(&self, asset: Asset) -> Result<Amount> {
        self.total_deposits(asset)
            .checked_sub(self.total_withdrawals(asset))
            .ok_or(HybridxError::ArithmeticUnderflow)
    }

    /// Compare the summed balances of `asset` with the expected supply.
    pub fn verify(&self, asset: Asset, actual_supply: Amount) -> Result<()> {
        let expected = self.expected_supply(asset)?;
        if actual_supply != expected {
            return Err(HybridxError::SupplyInvariantViolation {
                reason: format!(
                    "{asset}: actual supply {actual_supply} != expected {expected} \
                     (deposits={}, withdrawals={})",
                    self.total_deposits(asset),
                    self.total_withdrawals(asset),
                ),
            });
        }
        Ok(())
    }
}
