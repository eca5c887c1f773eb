//! System-wide constants for the Mintsel engine.

/// Number of sub-units in one whole currency unit.
pub const FRACTION_BASE: u32 = 100_000_000;

/// Number of decimal digits represented by [`FRACTION_BASE`].
pub const FRACTION_DIGITS: u32 = 8;

/// Largest whole-unit value an amount may carry (2^52).
pub const AMOUNT_MAX_VALUE: u64 = 1 << 52;

/// Maximum length of a currency code. The signed encoding reserves
/// 12 bytes, one of which is the terminating zero.
pub const MAX_CURRENCY_LEN: usize = 11;

// A base that is not a power of ten breaks parsing and display, and a base
// that does not fit the 8 fractional digits breaks the signed encoding.
const _: () = assert!(FRACTION_BASE == 10u32.pow(FRACTION_DIGITS));

/// Signature purpose: master key signs a denomination's validity.
pub const PURPOSE_MASTER_DENOMINATION_KEY_VALIDITY: u32 = 1025;

/// Signature purpose: master key signs a wire fee entry.
pub const PURPOSE_MASTER_WIRE_FEES: u32 = 1028;

/// Signature purpose: master key signs a wire account.
pub const PURPOSE_MASTER_WIRE_DETAILS: u32 = 1030;

/// Default cap on the number of coins in a single selection.
pub const DEFAULT_MAX_COINS: u32 = 1024;

/// Default number of states the dynamic-programming fallback may visit.
pub const DEFAULT_DP_STATE_BUDGET: u64 = 1_000_000;

/// Default safety margin before `stamp_expire_withdraw`, in seconds.
pub const DEFAULT_WITHDRAW_EXPIRY_MARGIN_SECS: u64 = 0;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Mintsel";
