//! Protocol fee and maker subsidy on book fills.
//!
//! Computation ([`FeeSchedule::apply`]) is pure; crediting happens in the
//! engine's settlement batch, and [`FeeLedger`] totals are only updated
//! after that batch was applied.
//!
//! Deduction order: the protocol fee is taken from the taker's gross
//! proceeds, then the subsidy is carved out of the protocol fee.

use std::collections::BTreeMap;

use hybridx_curve::{Rounding, mul_div};
use hybridx_types::constants::BASIS_POINTS_DENOMINATOR;
use hybridx_types::{Amount, Asset, BookConfig, HybridxError, Result};

/// Fee rates in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule {
    pub protocol_fee_rate: u32,
    pub subsidy_fee_rate: u32,
}

/// How one gross fill amount is split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeBreakdown {
    pub gross: Amount,
    /// `floor(gross * protocol_fee_rate / 10_000)`.
    pub protocol_fee: Amount,
    /// `floor(protocol_fee * subsidy_fee_rate / 10_000)`, paid to the maker.
    pub subsidy: Amount,
    /// What the protocol account keeps.
    pub protocol_net: Amount,
    /// What the taker receives.
    pub net: Amount,
}

impl FeeSchedule {
    #[must_use]
    pub fn new(protocol_fee_rate: u32, subsidy_fee_rate: u32) -> Self {
        Self {
            protocol_fee_rate,
            subsidy_fee_rate,
        }
    }

    #[must_use]
    pub fn from_config(config: &BookConfig) -> Self {
        Self::new(config.protocol_fee_rate, config.subsidy_fee_rate)
    }

    /// The same protocol rate with the subsidy rate a maker rested under.
    #[must_use]
    pub fn for_maker(self, subsidy_fee_rate: u32) -> Self {
        Self {
            subsidy_fee_rate,
            ..self
        }
    }

    pub fn apply(&self, gross: Amount) -> Result<FeeBreakdown> {
        let denominator = u128::from(BASIS_POINTS_DENOMINATOR);
        let protocol_fee = mul_div(
            gross,
            u128::from(self.protocol_fee_rate),
            denominator,
            Rounding::Floor,
        )?;
        let subsidy = mul_div(
            protocol_fee,
            u128::from(self.subsidy_fee_rate),
            denominator,
            Rounding::Floor,
        )?;
        Ok(FeeBreakdown {
            gross,
            protocol_fee,
            subsidy,
            protocol_net: protocol_fee
                .checked_sub(subsidy)
                .ok_or(HybridxError::ArithmeticUnderflow)?,
            net: gross
                .checked_sub(protocol_fee)
                .ok_or(HybridxError::ArithmeticUnderflow)?,
        })
    }
}

/// Running per-asset fee totals of one book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeLedger {
    protocol_accrued: BTreeMap<Asset, Amount>,
    subsidy_paid: BTreeMap<Asset, Amount>,
}

impl FeeLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Net protocol fees accrued in `asset`.
    #[must_use]
    pub fn protocol_accrued(&self, asset: Asset) -> Amount {
        self.protocol_accrued.get(&asset).copied().unwrap_or(0)
    }

    /// Subsidies paid to makers in `asset`.
    #[must_use]
    pub fn subsidy_paid(&self, asset: Asset) -> Amount {
        self.subsidy_paid.get(&asset).copied().unwrap_or(0)
    }

    pub(crate) fn record(&mut self, asset: Asset, fees: &FeeBreakdown) -> Result<()> {
        let accrued = self
            .protocol_accrued(asset)
            .checked_add(fees.protocol_net)
            .ok_or(HybridxError::ArithmeticOverflow)?;
        let paid = self
            .subsidy_paid(asset)
            .checked_add(fees.subsidy)
            .ok_or(HybridxError::ArithmeticOverflow)?;
        self.protocol_accrued.insert(asset, accrued);
        self.subsidy_paid.insert(asset, paid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rates_split() {
        let fees = FeeSchedule::new(30, 5_000).apply(1_000_000).unwrap();
        assert_eq!(fees.protocol_fee, 3_000);
        assert_eq!(fees.subsidy, 1_500);
        assert_eq!(fees.protocol_net, 1_500);
        assert_eq!(fees.net, 997_000);
        assert_eq!(fees.net + fees.protocol_net + fees.subsidy, fees.gross);
    }

    #[test]
    fn maker_rate_replaces_subsidy_only() {
        let schedule = FeeSchedule::new(100, 0).for_maker(5_000);
        assert_eq!(schedule, FeeSchedule::new(100, 5_000));
        let fees = schedule.apply(10_000).unwrap();
        assert_eq!(fees.protocol_fee, 100);
        assert_eq!(fees.subsidy, 50);
        assert_eq!(fees.net, 9_900);
    }

    #[test]
    fn small_fills_round_fee_down() {
        let fees = FeeSchedule::new(30, 5_000).apply(333).unwrap();
        assert_eq!(fees.protocol_fee, 0);
        assert_eq!(fees.net, 333);

        let fees = FeeSchedule::new(30, 5_000).apply(334).unwrap();
        assert_eq!(fees.protocol_fee, 1);
        assert_eq!(fees.subsidy, 0);
        assert_eq!(fees.protocol_net, 1);
    }

    #[test]
    fn zero_rates_pass_everything_through() {
        let fees = FeeSchedule::new(0, 5_000).apply(10).unwrap();
        assert_eq!(fees, FeeBreakdown { gross: 10, net: 10, ..FeeBreakdown::default() });
    }

    #[test]
    fn full_subsidy_leaves_protocol_nothing() {
        let fees = FeeSchedule::new(100, 10_000).apply(10_000).unwrap();
        assert_eq!(fees.protocol_fee, 100);
        assert_eq!(fees.subsidy, 100);
        assert_eq!(fees.protocol_net, 0);
    }

    #[test]
    fn ledger_accumulates_per_asset() {
        let schedule = FeeSchedule::new(30, 5_000);
        let mut ledger = FeeLedger::new();
        ledger.record(Asset::Base, &schedule.apply(1_000_000).unwrap()).unwrap();
        ledger.record(Asset::Base, &schedule.apply(1_000_000).unwrap()).unwrap();
        ledger.record(Asset::Quote, &schedule.apply(10_000).unwrap()).unwrap();

        assert_eq!(ledger.protocol_accrued(Asset::Base), 3_000);
        assert_eq!(ledger.subsidy_paid(Asset::Base), 3_000);
        assert_eq!(ledger.protocol_accrued(Asset::Quote), 15);
        assert_eq!(ledger.subsidy_paid(Asset::Quote), 15);
    }
}
