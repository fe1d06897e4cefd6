//! Level-payment annuity math and the rounding rules shared by schedules.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::RecastError;
use crate::time_value;
use crate::types::{Money, Percent, Rate};
use crate::EngineResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Decimal places money is carried at between periods (cents).
pub const MONEY_DP: u32 = 2;

/// One cent. Tolerance for every "equal within rounding" comparison.
pub const ROUNDING_TOLERANCE: Money = dec!(0.01);

/// Upper bound on the quoted annual rate.
pub const MAX_ANNUAL_RATE_PERCENT: Percent = dec!(100);

/// Longest term accepted, in months (100 years).
pub const MAX_TERM_MONTHS: u32 = 1200;

pub(crate) const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Round a money amount to cents, half away from zero.
pub fn round_money(amount: Money) -> Money {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a quoted annual percentage into a monthly periodic rate.
pub fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / dec!(100) / MONTHS_PER_YEAR
}

/// Level monthly payment that fully amortizes `principal` over `term_months`.
///
/// Returned at full precision; schedules round it to cents. At a zero rate
/// the payment is exactly `principal / term_months`.
pub fn compute_monthly_payment(
    principal: Money,
    annual_rate_percent: Percent,
    term_months: u32,
) -> EngineResult<Money> {
    validate_loan_terms(principal, annual_rate_percent, term_months)?;

    let r = monthly_rate(annual_rate_percent);
    if r.is_zero() {
        return Ok(principal / Decimal::from(term_months));
    }

    // P·r·(1+r)^n / ((1+r)^n − 1), expressed through PMT with the borrower's
    // sign flipped.
    let payment = -time_value::pmt(r, term_months, principal, Decimal::ZERO)?;
    log::debug!(
        "monthly payment for {principal} at {annual_rate_percent}% over {term_months} months: {payment}"
    );
    Ok(payment)
}

/// Shared validation for anything that amortizes a principal.
pub(crate) fn validate_loan_terms(
    principal: Money,
    annual_rate_percent: Percent,
    term_months: u32,
) -> EngineResult<()> {
    if principal <= Decimal::ZERO {
        return Err(RecastError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if annual_rate_percent < Decimal::ZERO {
        return Err(RecastError::InvalidInput {
            field: "annual_rate_percent".into(),
            reason: "Annual rate cannot be negative".into(),
        });
    }
    if annual_rate_percent > MAX_ANNUAL_RATE_PERCENT {
        return Err(RecastError::InvalidInput {
            field: "annual_rate_percent".into(),
            reason: format!("Annual rate cannot exceed {MAX_ANNUAL_RATE_PERCENT}%"),
        });
    }
    if term_months == 0 {
        return Err(RecastError::InvalidInput {
            field: "term_months".into(),
            reason: "Term must be at least one month".into(),
        });
    }
    if term_months > MAX_TERM_MONTHS {
        return Err(RecastError::InvalidInput {
            field: "term_months".into(),
            reason: format!("Term cannot exceed {MAX_TERM_MONTHS} months"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
