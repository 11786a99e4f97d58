//! Error types for the HybridX order book.
//!
//! All errors use the `HX_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Validation errors
//! - 2xx: Authorization errors
//! - 3xx: Lookup errors
//! - 4xx: Arithmetic / invariant errors
//! - 5xx: Settlement and pool errors
//! - 6xx: Market registry errors
//! - 9xx: Configuration / internal errors

use thiserror::Error;

use crate::{Account, Amount, Asset, MarketPair, OrderId};

/// Central error enum for all HybridX operations.
///
/// Every variant aborts the request that produced it; no state is mutated
/// when one of these is returned from a book operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HybridxError {
    // =================================================================
    // Validation (1xx)
    // =================================================================
    /// Limit price is zero, or quantizes to zero.
    #[error("HX_ERR_100: Price invalid")]
    PriceInvalid,

    /// Offered amount is below the book's minimum order size.
    #[error("HX_ERR_101: Amount invalid: offered {offered}, minimum {minimum}")]
    AmountInvalid { offered: Amount, minimum: Amount },

    // =================================================================
    // Authorization (2xx)
    // =================================================================
    /// Caller is neither the order owner nor the book administrator.
    #[error("HX_ERR_200: Forbidden")]
    Forbidden,

    // =================================================================
    // Lookup (3xx)
    // =================================================================
    /// The order does not exist or is already terminal.
    #[error("HX_ERR_300: Order not found: {0}")]
    OrderNotFound(OrderId),

    // =================================================================
    // Arithmetic / invariant (4xx)
    // =================================================================
    /// A checked computation exceeded its integer range.
    #[error("HX_ERR_400: Arithmetic overflow")]
    ArithmeticOverflow,

    /// A checked subtraction would have gone below zero.
    #[error("HX_ERR_401: Arithmetic underflow")]
    ArithmeticUnderflow,

    /// Division by a zero denominator.
    #[error("HX_ERR_402: Division by zero")]
    DivisionByZero,

    /// A pool trade would decrease the fee-adjusted constant product.
    #[error("HX_ERR_403: Pool invariant violation: {reason}")]
    PoolInvariantViolation { reason: String },

    // =================================================================
    // Settlement and pool (5xx)
    // =================================================================
    /// An account cannot cover a transfer.
    #[error("HX_ERR_500: Insufficient balance for {account} {asset}: need {needed}, have {available}")]
    InsufficientBalance {
        account: Account,
        asset: Asset,
        needed: Amount,
        available: Amount,
    },

    /// Requested output is not available in the pool.
    #[error("HX_ERR_501: Insufficient liquidity")]
    InsufficientLiquidity,

    /// Pool output fell below the caller's minimum.
    #[error("HX_ERR_502: Slippage exceeded: expected at least {expected}, got {actual}")]
    SlippageExceeded { expected: Amount, actual: Amount },

    /// The settlement collaborator rejected a transfer batch.
    #[error("HX_ERR_503: Settlement failed: {reason}")]
    SettlementFailed { reason: String },

    /// Ledger balances no longer add up to deposits minus withdrawals.
    #[error("HX_ERR_504: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // Market registry (6xx)
    // =================================================================
    /// No book is registered for this pair.
    #[error("HX_ERR_600: Market not found: {0}")]
    MarketNotFound(MarketPair),

    /// A book is already registered for this pair.
    #[error("HX_ERR_601: Market already exists: {0}")]
    DuplicateMarket(MarketPair),

    // =================================================================
    // Configuration / internal (9xx)
    // =================================================================
    /// A configuration value is out of range.
    #[error("HX_ERR_900: Invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// Unrecoverable internal error.
    #[error("HX_ERR_901: Internal error: {0}")]
    Internal(String),
}

impl HybridxError {
    /// Stable reason code (`HX_ERR_nnn`) for callers mapping errors to
    /// wire-level status codes.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::PriceInvalid => "HX_ERR_100",
            Self::AmountInvalid { .. } => "HX_ERR_101",
            Self::Forbidden => "HX_ERR_200",
            Self::OrderNotFound(_) => "HX_ERR_300",
            Self::ArithmeticOverflow => "HX_ERR_400",
            Self::ArithmeticUnderflow => "HX_ERR_401",
            Self::DivisionByZero => "HX_ERR_402",
            Self::PoolInvariantViolation { .. } => "HX_ERR_403",
            Self::InsufficientBalance { .. } => "HX_ERR_500",
            Self::InsufficientLiquidity => "HX_ERR_501",
            Self::SlippageExceeded { .. } => "HX_ERR_502",
            Self::SettlementFailed { .. } => "HX_ERR_503",
            Self::SupplyInvariantViolation { .. } => "HX_ERR_504",
            Self::MarketNotFound(_) => "HX_ERR_600",
            Self::DuplicateMarket(_) => "HX_ERR_601",
            Self::InvalidConfig { .. } => "HX_ERR_900",
            Self::Internal(_) => "HX_ERR_901",
        }
    }

    /// Validation errors are recoverable by resubmitting corrected input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::PriceInvalid | Self::AmountInvalid { .. })
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, HybridxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = HybridxError::OrderNotFound(OrderId(7));
        let msg = format!("{err}");
        assert!(msg.starts_with("HX_ERR_300"), "Got: {msg}");
        assert!(msg.contains('7'));
    }

    #[test]
    fn amount_invalid_display() {
        let err = HybridxError::AmountInvalid {
            offered: 5,
            minimum: 100,
        };
        let msg = format!("{err}");
        assert!(msg.contains("HX_ERR_101"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn code_matches_display_prefix() {
        let errors = vec![
            HybridxError::PriceInvalid,
            HybridxError::Forbidden,
            HybridxError::ArithmeticOverflow,
            HybridxError::ArithmeticUnderflow,
            HybridxError::DivisionByZero,
            HybridxError::InsufficientLiquidity,
            HybridxError::PoolInvariantViolation {
                reason: "k decreased".into(),
            },
            HybridxError::SettlementFailed {
                reason: "x".into(),
            },
            HybridxError::SupplyInvariantViolation {
                reason: "x".into(),
            },
            HybridxError::MarketNotFound(MarketPair::new("ETH", "USDC")),
            HybridxError::InvalidConfig {
                reason: "x".into(),
            },
            HybridxError::Internal("x".into()),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(msg.starts_with(err.code()), "{msg} vs {}", err.code());
        }
    }

    #[test]
    fn validation_classification() {
        assert!(HybridxError::PriceInvalid.is_validation());
        assert!(!HybridxError::Forbidden.is_validation());
    }
}
