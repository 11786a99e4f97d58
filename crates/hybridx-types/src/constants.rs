//! System-wide constants for the HybridX order book.

/// Denominator for fee rates expressed in basis points (10000 = 100%).
pub const BASIS_POINTS_DENOMINATOR: u32 = 10_000;

/// Pool fee multiplier numerator: 997 / 1000 of every input is swapped.
pub const POOL_FEE_NUMERATOR: u128 = 997;

/// Pool fee multiplier denominator.
pub const POOL_FEE_DENOMINATOR: u128 = 1000;

/// Default price precision (decimal places of the scaled price).
pub const DEFAULT_PRICE_DECIMALS: u32 = 18;

/// Largest supported price precision; `10^38` is the largest power of ten
/// representable in a `u128`.
pub const MAX_PRICE_DECIMALS: u32 = 38;

/// Default protocol fee charged on taker proceeds of book fills (0.3%).
pub const DEFAULT_PROTOCOL_FEE_RATE: u32 = 30;

/// Default share of the protocol fee paid to the maker (50%).
pub const DEFAULT_SUBSIDY_FEE_RATE: u32 = 5_000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "HybridX";
