//! Mortgage recast calculations.
//!
//! Builds fixed-payment amortization schedules and models the effect of a
//! recast: a lump-sum principal payment followed by re-amortization of the
//! remaining balance over the remaining term at the existing rate. All math
//! is done in `rust_decimal::Decimal`.

pub mod amortization;
pub mod error;
pub mod time_value;
pub mod types;

pub use error::RecastError;
pub use types::*;

/// Standard result type for all recast-core operations
pub type EngineResult<T> = Result<T, RecastError>;
