//! In-memory token ledger implementing [`Settlement`].
//!
//! Balances are tracked per `(Account, Asset)`. A batch is first replayed on
//! a scratch copy of the touched balances; only when every transfer succeeds
//! are the results written back, so a failing batch leaves the ledger
//! unchanged.

use std::collections::HashMap;

use hybridx_types::{Account, Amount, Asset, HybridxError, Result, Settlement, Transfer};

use crate::SupplyConservation;

type Key = (Account, Asset);

/// Balances of every account known to one market.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    balances: HashMap<Key, Amount>,
    supply: SupplyConservation,
}

impl Ledger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` from outside the ledger.
    pub fn deposit(&mut self, account: Account, asset: Asset, amount: Amount) -> Result<()> {
        let balance = self.balances.entry((account, asset)).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(HybridxError::ArithmeticOverflow)?;
        self.supply.record_deposit(asset, amount)?;
        tracing::debug!(account = %account, asset = %asset, amount, "Deposit");
        Ok(())
    }

    /// Debit `amount` to outside the ledger.
    pub fn withdraw(&mut self, account: Account, asset: Asset, amount: Amount) -> Result<()> {
        let available = self.balance(account, asset);
        if available < amount {
            return Err(HybridxError::InsufficientBalance {
                account,
                asset,
                needed: amount,
                available,
            });
        }
        self.balances.insert((account, asset), available - amount);
        self.supply.record_withdrawal(asset, amount)?;
        tracing::debug!(account = %account, asset = %asset, amount, "Withdrawal");
        Ok(())
    }

    /// Sum of every account's balance in `asset`.
    pub fn total_supply(&self, asset: Asset) -> Result<Amount> {
        self.balances
            .iter()
            .filter(|((_, a), _)| *a == asset)
            .try_fold(0u128, |acc, (_, amount)| acc.checked_add(*amount))
            .ok_or(HybridxError::ArithmeticOverflow)
    }

    /// Check that balances still add up to deposits minus withdrawals.
    pub fn verify_supply(&self) -> Result<()> {
        for asset in [Asset::Base, Asset::Quote] {
            self.supply.verify(asset, self.total_supply(asset)?)?;
        }
        Ok(())
    }

    /// Replay `transfers` on a scratch copy of the balances they touch.
    fn simulate(&self, transfers: &[Transfer]) -> Result<HashMap<Key, Amount>> {
        let mut scratch: HashMap<Key, Amount> = HashMap::new();
        for t in transfers {
            let from = (t.from, t.asset);
            let available = scratch
                .get(&from)
                .copied()
                .unwrap_or_else(|| self.balance(t.from, t.asset));
            let debited = available
                .checked_sub(t.amount)
                .ok_or(HybridxError::InsufficientBalance {
                    account: t.from,
                    asset: t.asset,
                    needed: t.amount,
                    available,
                })?;
            scratch.insert(from, debited);

            let to = (t.to, t.asset);
            let current = scratch
                .get(&to)
                .copied()
                .unwrap_or_else(|| self.balance(t.to, t.asset));
            let credited = current
                .checked_add(t.amount)
                .ok_or(HybridxError::ArithmeticOverflow)?;
            scratch.insert(to, credited);
        }
        Ok(scratch)
    }
}

impl Settlement for Ledger {
    fn check(&self, transfers: &[Transfer]) -> Result<()> {
        self.simulate(transfers).map(|_| ())
    }

    fn apply(&mut self, transfers: &[Transfer]) -> Result<()> {
        let updated = self.simulate(transfers).inspect_err(|e| {
            tracing::warn!(transfers = transfers.len(), error = %e, "Transfer batch rejected");
        })?;
        self.balances.extend(updated);
        tracing::debug!(transfers = transfers.len(), "Transfer batch applied");
        Ok(())
    }

    fn balance(&self, account: Account, asset: Asset) -> Amount {
        self.balances.get(&(account, asset)).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use hybridx_types::AccountId;

    use super::*;

    fn user(b: u8) -> Account {
        Account::User(AccountId::from_byte(b))
    }

    #[test]
    fn deposit_and_withdraw() {
        let mut ledger = Ledger::new();
        ledger.deposit(user(1), Asset::Quote, 1_000).unwrap();
        ledger.withdraw(user(1), Asset::Quote, 400).unwrap();
        assert_eq!(ledger.balance(user(1), Asset::Quote), 600);
        assert!(ledger.verify_supply().is_ok());
    }

    #[test]
    fn withdraw_more_than_balance() {
        let mut ledger = Ledger::new();
        ledger.deposit(user(1), Asset::Base, 5).unwrap();
        let err = ledger.withdraw(user(1), Asset::Base, 6).unwrap_err();
        assert_eq!(
            err,
            HybridxError::InsufficientBalance {
                account: user(1),
                asset: Asset::Base,
                needed: 6,
                available: 5
            }
        );
    }

    #[test]
    fn batch_applies_in_order() {
        let mut ledger = Ledger::new();
        ledger.deposit(user(1), Asset::Quote, 100).unwrap();
        // Escrow is empty until the first transfer funds it.
        let batch = [
            Transfer::new(user(1), Account::Escrow, Asset::Quote, 100),
            Transfer::new(Account::Escrow, user(2), Asset::Quote, 70),
            Transfer::new(Account::Escrow, Account::Protocol, Asset::Quote, 30),
        ];
        ledger.check(&batch).unwrap();
        ledger.apply(&batch).unwrap();
        assert_eq!(ledger.balance(user(1), Asset::Quote), 0);
        assert_eq!(ledger.balance(user(2), Asset::Quote), 70);
        assert_eq!(ledger.balance(Account::Protocol, Asset::Quote), 30);
        assert_eq!(ledger.balance(Account::Escrow, Asset::Quote), 0);
        assert!(ledger.verify_supply().is_ok());
    }

    #[test]
    fn failing_batch_changes_nothing() {
        let mut ledger = Ledger::new();
        ledger.deposit(user(1), Asset::Base, 10).unwrap();
        let batch = [
            Transfer::new(user(1), Account::Escrow, Asset::Base, 10),
            Transfer::new(Account::Escrow, user(2), Asset::Base, 11),
        ];
        assert!(matches!(
            ledger.check(&batch),
            Err(HybridxError::InsufficientBalance { .. })
        ));
        assert!(ledger.apply(&batch).is_err());
        assert_eq!(ledger.balance(user(1), Asset::Base), 10);
        assert_eq!(ledger.balance(Account::Escrow, Asset::Base), 0);
    }

    #[test]
    fn assets_do_not_mix() {
        let mut ledger = Ledger::new();
        ledger.deposit(user(1), Asset::Base, 10).unwrap();
        let batch = [Transfer::new(user(1), user(2), Asset::Quote, 1)];
        assert!(ledger.check(&batch).is_err());
    }

    #[test]
    fn total_supply_sums_accounts() {
        let mut ledger = Ledger::new();
        ledger.deposit(user(1), Asset::Base, 3).unwrap();
        ledger.deposit(Account::Pool, Asset::Base, 4).unwrap();
        ledger.deposit(Account::Pool, Asset::Quote, 9).unwrap();
        assert_eq!(ledger.total_supply(Asset::Base).unwrap(), 7);
        assert_eq!(ledger.total_supply(Asset::Quote).unwrap(), 9);
    }
}
