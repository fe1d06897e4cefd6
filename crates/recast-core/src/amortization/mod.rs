//! Fixed-rate amortization and mortgage recast analysis.

pub mod payment;
pub mod recast;
pub mod schedule;

pub use payment::{
    compute_monthly_payment, round_money, MAX_TERM_MONTHS, MONEY_DP, ROUNDING_TOLERANCE,
};
pub use recast::{analyze_recast, recast, LoanInputs, RecastResult};
pub use schedule::{build_schedule, AmortizationRow, AmortizationSchedule};
