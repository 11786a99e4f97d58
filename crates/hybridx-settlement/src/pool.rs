//! Constant-product pool implementing [`LiquidityPool`].
//!
//! Reserves only; token custody is the [`Ledger`](crate::Ledger)'s `Pool`
//! account. A swap is fully validated before reserves change.

use hybridx_curve::{invariant_holds, swap_out};
use hybridx_types::{Amount, Asset, HybridxError, LiquidityPool, Reserves, Result, SwapRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantProductPool {
    reserves: Reserves,
}

impl ConstantProductPool {
    #[must_use]
    pub fn new(base: Amount, quote: Amount) -> Self {
        Self {
            reserves: Reserves::new(base, quote),
        }
    }

    /// Product of the reserves.
    #[must_use]
    pub fn k(&self) -> Option<u128> {
        self.reserves.base.checked_mul(self.reserves.quote)
    }
}

impl LiquidityPool for ConstantProductPool {
    fn reserves(&self) -> Reserves {
        self.reserves
    }

    fn swap(&mut self, request: SwapRequest) -> Result<Amount> {
        let reserve_in = self.reserves.of(request.asset_in);
        let reserve_out = self.reserves.of(request.asset_in.other());
        if request.amount_in == 0 || self.reserves.is_empty() {
            return Err(HybridxError::InsufficientLiquidity);
        }

        let amount_out = swap_out(request.amount_in, reserve_in, reserve_out)?;
        if amount_out < request.min_amount_out {
            return Err(HybridxError::SlippageExceeded {
                expected: request.min_amount_out,
                actual: amount_out,
            });
        }
        if amount_out == 0 || amount_out >= reserve_out {
            return Err(HybridxError::InsufficientLiquidity);
        }
        if !invariant_holds(reserve_in, reserve_out, request.amount_in, amount_out)? {
            return Err(HybridxError::PoolInvariantViolation {
                reason: format!(
                    "in {} out {} against reserves {reserve_in}/{reserve_out}",
                    request.amount_in, amount_out
                ),
            });
        }

        let new_in = reserve_in
            .checked_add(request.amount_in)
            .ok_or(HybridxError::ArithmeticOverflow)?;
        let new_out = reserve_out - amount_out;
        self.reserves = match request.asset_in {
            Asset::Base => Reserves::new(new_in, new_out),
            Asset::Quote => Reserves::new(new_out, new_in),
        };
        tracing::debug!(
            asset_in = %request.asset_in,
            amount_in = request.amount_in,
            amount_out,
            base = self.reserves.base,
            quote = self.reserves.quote,
            "Pool swap"
        );
        Ok(amount_out)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn request(asset_in: Asset, amount_in: Amount, min_amount_out: Amount) -> SwapRequest {
        SwapRequest {
            asset_in,
            amount_in,
            min_amount_out,
        }
    }

    #[test]
    fn swap_quote_for_base() {
        let mut pool = ConstantProductPool::new(1_000, 1_000);
        let out = pool.swap(request(Asset::Quote, 1_000, 0)).unwrap();
        assert_eq!(out, 499);
        assert_eq!(pool.reserves(), Reserves::new(501, 2_000));
    }

    #[test]
    fn swap_base_for_quote() {
        let mut pool = ConstantProductPool::new(1_000_000_000, 1_000_000_000);
        let out = pool.swap(request(Asset::Base, 1_000_000, 0)).unwrap();
        assert_eq!(out, 996_006);
        assert_eq!(pool.reserves(), Reserves::new(1_001_000_000, 999_003_994));
    }

    #[test]
    fn slippage_guard_leaves_reserves() {
        let mut pool = ConstantProductPool::new(1_000, 1_000);
        let err = pool.swap(request(Asset::Quote, 1_000, 500)).unwrap_err();
        assert_eq!(
            err,
            HybridxError::SlippageExceeded {
                expected: 500,
                actual: 499
            }
        );
        assert_eq!(pool.reserves(), Reserves::new(1_000, 1_000));
    }

    #[test]
    fn empty_pool_and_zero_input_rejected() {
        let mut pool = ConstantProductPool::new(0, 0);
        assert_eq!(
            pool.swap(request(Asset::Base, 10, 0)).unwrap_err(),
            HybridxError::InsufficientLiquidity
        );
        let mut pool = ConstantProductPool::new(10, 10);
        assert_eq!(
            pool.swap(request(Asset::Base, 0, 0)).unwrap_err(),
            HybridxError::InsufficientLiquidity
        );
        // Output rounds to zero.
        assert_eq!(
            pool.swap(request(Asset::Base, 1, 0)).unwrap_err(),
            HybridxError::InsufficientLiquidity
        );
    }

    #[test]
    fn random_swaps_never_decrease_k() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut pool = ConstantProductPool::new(1_000_000_000_000, 2_000_000_000_000);
        for _ in 0..1_000 {
            let before = pool.k().unwrap();
            let asset = if rng.gen_bool(0.5) { Asset::Base } else { Asset::Quote };
            let amount = rng.gen_range(1_000..1_000_000_000);
            if pool.swap(request(asset, amount, 0)).is_ok() {
                assert!(pool.k().unwrap() >= before);
            }
        }
    }
}
