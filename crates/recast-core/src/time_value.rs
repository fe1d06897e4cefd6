use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::RecastError;
use crate::types::{Money, Rate};
use crate::EngineResult;

/// Compound growth factor `(1 + rate)^nper` by repeated multiplication.
///
/// Integer periods only, so the result is exact up to Decimal's 28
/// significant digits. Fails instead of panicking when the factor leaves
/// Decimal range.
pub fn compound_factor(rate: Rate, nper: u32) -> EngineResult<Decimal> {
    let base = Decimal::ONE + rate;
    let mut factor = Decimal::ONE;
    for _ in 0..nper {
        factor = factor
            .checked_mul(base)
            .ok_or_else(|| RecastError::InvalidInput {
                field: "rate".into(),
                reason: format!("Compounding {rate} over {nper} periods overflows"),
            })?;
    }
    Ok(factor)
}

/// Payment (PMT)
///
/// Spreadsheet sign convention: a positive `present_value` (cash received)
/// yields a negative payment.
pub fn pmt(rate: Rate, nper: u32, present_value: Money, future_value: Money) -> EngineResult<Money> {
    if nper == 0 {
        return Err(RecastError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }
    if rate <= dec!(-1) {
        return Err(RecastError::InvalidInput {
            field: "rate".into(),
            reason: "Periodic rate must be greater than -100%".into(),
        });
    }

    if rate.is_zero() {
        return Ok(-(present_value + future_value) / Decimal::from(nper));
    }

    let factor = compound_factor(rate, nper)?;
    let annuity_factor = (factor - Decimal::ONE) / rate;

    if annuity_factor.is_zero() {
        return Err(RecastError::InvalidInput {
            field: "rate".into(),
            reason: "PMT annuity factor is zero".into(),
        });
    }

    Ok(-(present_value * factor + future_value) / annuity_factor)
}
