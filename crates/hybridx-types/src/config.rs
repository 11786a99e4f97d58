//! Configuration types for HybridX books and markets.
//!
//! [`MarketConfig`] is the operator-facing form in human units (decimal tick
//! size and minimum order size). [`BookConfig`] is the scaled-integer form a
//! book runs with.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, HybridxError, Price, Result, constants};

/// Runtime configuration of one book.
///
/// Changes made through the book's admin operations apply to orders created
/// afterwards; resting orders keep the level they were quantized into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookConfig {
    /// Price granularity; limit prices are quantized to a multiple of it.
    pub price_step: Price,
    /// Minimum offered amount for a new order, in the offered asset.
    pub min_amount: Amount,
    /// Fee on taker proceeds of book fills, in basis points.
    pub protocol_fee_rate: u32,
    /// Share of the protocol fee paid to the maker, in basis points.
    pub subsidy_fee_rate: u32,
    /// Decimal places of scaled prices.
    pub price_decimals: u32,
    /// Only account allowed to change this configuration.
    pub admin: AccountId,
}

impl BookConfig {
    /// Defaults: finest step, minimum of one unit, default fee rates.
    #[must_use]
    pub fn new(admin: AccountId) -> Self {
        Self {
            price_step: 1,
            min_amount: 1,
            protocol_fee_rate: constants::DEFAULT_PROTOCOL_FEE_RATE,
            subsidy_fee_rate: constants::DEFAULT_SUBSIDY_FEE_RATE,
            price_decimals: constants::DEFAULT_PRICE_DECIMALS,
            admin,
        }
    }

    #[must_use]
    pub fn with_price_step(mut self, price_step: Price) -> Self {
        self.price_step = price_step;
        self
    }

    #[must_use]
    pub fn with_min_amount(mut self, min_amount: Amount) -> Self {
        self.min_amount = min_amount;
        self
    }

    #[must_use]
    pub fn with_fee_rates(mut self, protocol_fee_rate: u32, subsidy_fee_rate: u32) -> Self {
        self.protocol_fee_rate = protocol_fee_rate;
        self.subsidy_fee_rate = subsidy_fee_rate;
        self
    }

    #[must_use]
    pub fn with_price_decimals(mut self, price_decimals: u32) -> Self {
        self.price_decimals = price_decimals;
        self
    }

    /// Reject out-of-range values.
    pub fn validate(&self) -> Result<()> {
        validate_price_step(self.price_step)?;
        validate_fee_rate("protocol_fee_rate", self.protocol_fee_rate)?;
        validate_fee_rate("subsidy_fee_rate", self.subsidy_fee_rate)?;
        if self.price_decimals > constants::MAX_PRICE_DECIMALS {
            return Err(HybridxError::InvalidConfig {
                reason: format!(
                    "price_decimals {} exceeds {}",
                    self.price_decimals,
                    constants::MAX_PRICE_DECIMALS
                ),
            });
        }
        Ok(())
    }

    /// `10^price_decimals`: the scaled representation of a price of one.
    pub fn price_scale(&self) -> Result<u128> {
        pow10(self.price_decimals)
    }
}

/// A price step of zero would make quantization meaningless.
pub fn validate_price_step(price_step: Price) -> Result<()> {
    if price_step == 0 {
        return Err(HybridxError::InvalidConfig {
            reason: "price_step must be positive".into(),
        });
    }
    Ok(())
}

/// Fee rates are basis points of [`constants::BASIS_POINTS_DENOMINATOR`].
pub fn validate_fee_rate(name: &str, rate: u32) -> Result<()> {
    if rate > constants::BASIS_POINTS_DENOMINATOR {
        return Err(HybridxError::InvalidConfig {
            reason: format!(
                "{name} {rate} exceeds {}",
                constants::BASIS_POINTS_DENOMINATOR
            ),
        });
    }
    Ok(())
}

fn pow10(exp: u32) -> Result<u128> {
    10u128
        .checked_pow(exp)
        .ok_or(HybridxError::ArithmeticOverflow)
}

/// Per-market configuration in human units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Base asset (e.g., "ETH").
    pub base: String,
    /// Quote asset (e.g., "USDC").
    pub quote: String,
    /// Decimal places of token amounts.
    pub amount_decimals: u32,
    /// Decimal places of scaled prices.
    #[serde(default = "default_price_decimals")]
    pub price_decimals: u32,
    /// Tick size (price granularity) in quote per base.
    pub tick_size: Decimal,
    /// Minimum offered amount of a new order.
    pub min_order_size: Decimal,
    #[serde(default = "default_protocol_fee_rate")]
    pub protocol_fee_rate: u32,
    #[serde(default = "default_subsidy_fee_rate")]
    pub subsidy_fee_rate: u32,
}

fn default_price_decimals() -> u32 {
    constants::DEFAULT_PRICE_DECIMALS
}

fn default_protocol_fee_rate() -> u32 {
    constants::DEFAULT_PROTOCOL_FEE_RATE
}

fn default_subsidy_fee_rate() -> u32 {
    constants::DEFAULT_SUBSIDY_FEE_RATE
}

impl MarketConfig {
    /// Create a default ETH/USDC market config with 18-decimal tokens.
    #[must_use]
    pub fn eth_usdc() -> Self {
        Self {
            base: "ETH".to_string(),
            quote: "USDC".to_string(),
            amount_decimals: 18,
            price_decimals: constants::DEFAULT_PRICE_DECIMALS,
            tick_size: Decimal::new(1, 2),      // 0.01 USDC
            min_order_size: Decimal::new(1, 3), // 0.001
            protocol_fee_rate: constants::DEFAULT_PROTOCOL_FEE_RATE,
            subsidy_fee_rate: constants::DEFAULT_SUBSIDY_FEE_RATE,
        }
    }

    /// Returns the market symbol (e.g., "ETH/USDC").
    #[must_use]
    pub fn symbol(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }

    /// Scale the human-unit values into a validated [`BookConfig`].
    pub fn to_book_config(&self, admin: AccountId) -> Result<BookConfig> {
        let config = BookConfig {
            price_step: scale_decimal(self.tick_size, self.price_decimals)?,
            min_amount: scale_decimal(self.min_order_size, self.amount_decimals)?,
            protocol_fee_rate: self.protocol_fee_rate,
            subsidy_fee_rate: self.subsidy_fee_rate,
            price_decimals: self.price_decimals,
            admin,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Convert a non-negative decimal into an integer scaled by `10^decimals`.
///
/// Values carrying more fractional digits than `decimals` are rejected
/// rather than silently truncated.
pub fn scale_decimal(value: Decimal, decimals: u32) -> Result<u128> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(HybridxError::InvalidConfig {
            reason: format!("negative value {value}"),
        });
    }
    let value = value.normalize();
    let mantissa = value.mantissa().unsigned_abs();
    let scale = value.scale();
    if scale <= decimals {
        mantissa
            .checked_mul(pow10(decimals - scale)?)
            .ok_or(HybridxError::ArithmeticOverflow)
    } else {
        let divisor = pow10(scale - decimals)?;
        if mantissa % divisor != 0 {
            return Err(HybridxError::InvalidConfig {
                reason: format!("{value} has more than {decimals} decimal places"),
            });
        }
        Ok(mantissa / divisor)
    }
}
