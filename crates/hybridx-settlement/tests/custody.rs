//! Pool reserves and the ledger's pool account move in lockstep.

use hybridx_settlement::{ConstantProductPool, Ledger};
use hybridx_types::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn venue(base: Amount, quote: Amount) -> (Ledger, ConstantProductPool) {
    let mut ledger = Ledger::new();
    ledger.deposit(Account::Pool, Asset::Base, base).unwrap();
    ledger.deposit(Account::Pool, Asset::Quote, quote).unwrap();
    (ledger, ConstantProductPool::new(base, quote))
}

/// Swap through the pool and settle the same legs on the ledger.
fn swap(
    ledger: &mut Ledger,
    pool: &mut ConstantProductPool,
    trader: AccountId,
    asset_in: Asset,
    amount_in: Amount,
) -> Result<Amount> {
    let batch = |out: Amount| {
        [
            Transfer::new(Account::User(trader), Account::Pool, asset_in, amount_in),
            Transfer::new(Account::Pool, Account::User(trader), asset_in.other(), out),
        ]
    };
    ledger.check(&batch(0))?;
    let out = pool.swap(SwapRequest {
        asset_in,
        amount_in,
        min_amount_out: 0,
    })?;
    ledger.apply(&batch(out))?;
    Ok(out)
}

fn assert_in_sync(ledger: &Ledger, pool: &ConstantProductPool) {
    let reserves = pool.reserves();
    assert_eq!(ledger.balance(Account::Pool, Asset::Base), reserves.base);
    assert_eq!(ledger.balance(Account::Pool, Asset::Quote), reserves.quote);
    ledger.verify_supply().unwrap();
}

#[test]
fn swaps_settle_against_pool_account() {
    let (mut ledger, mut pool) = venue(5_000, 10_000);
    let trader = AccountId::from_byte(1);
    ledger.deposit(Account::User(trader), Asset::Quote, 1_000).unwrap();

    let out = swap(&mut ledger, &mut pool, trader, Asset::Quote, 1_000).unwrap();

    assert!(out > 0);
    assert_eq!(ledger.balance(Account::User(trader), Asset::Base), out);
    assert_eq!(ledger.balance(Account::User(trader), Asset::Quote), 0);
    assert_in_sync(&ledger, &pool);
}

#[test]
fn unfunded_swap_leaves_pool_untouched() {
    let (mut ledger, mut pool) = venue(5_000, 10_000);
    let trader = AccountId::from_byte(1);

    let err = swap(&mut ledger, &mut pool, trader, Asset::Base, 10).unwrap_err();

    assert!(matches!(err, HybridxError::InsufficientBalance { .. }));
    assert_eq!(pool.reserves(), Reserves::new(5_000, 10_000));
    assert_in_sync(&ledger, &pool);
}

#[test]
fn random_swaps_keep_custody_in_sync() {
    let mut rng = StdRng::seed_from_u64(7);
    let (mut ledger, mut pool) = venue(1_000_000_000, 3_000_000_000);
    let traders: Vec<AccountId> = (1..=4).map(AccountId::from_byte).collect();
    for t in &traders {
        ledger.deposit(Account::User(*t), Asset::Base, 500_000_000).unwrap();
        ledger.deposit(Account::User(*t), Asset::Quote, 500_000_000).unwrap();
    }

    for _ in 0..500 {
        let trader = traders[rng.gen_range(0..traders.len())];
        let asset = if rng.gen_bool(0.5) { Asset::Base } else { Asset::Quote };
        let amount = rng.gen_range(1..5_000_000);
        let k = pool.k().unwrap();
        if swap(&mut ledger, &mut pool, trader, asset, amount).is_ok() {
            assert!(pool.k().unwrap() >= k);
        }
        assert_in_sync(&ledger, &pool);
    }
}
