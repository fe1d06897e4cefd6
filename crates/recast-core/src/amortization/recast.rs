//! Mortgage recast: lump-sum principal reduction plus re-amortization.
//!
//! The balance left after the lump sum (and the financed recast fee) is
//! re-amortized over the same remaining term at the same rate. Both the
//! existing and the recast schedules are returned so the caller can compare
//! interest cost period by period.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::payment::{
    compute_monthly_payment, monthly_rate, MAX_ANNUAL_RATE_PERCENT, MAX_TERM_MONTHS,
    MONTHS_PER_YEAR,
};
use super::schedule::{build_schedule, AmortizationSchedule};
use crate::error::RecastError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Years};
use crate::EngineResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Everything needed to evaluate a recast of an existing fixed-rate loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInputs {
    /// Amount originally borrowed.
    pub original_principal: Money,
    /// Outstanding balance today.
    pub current_balance: Money,
    /// Annual interest rate as a percentage (e.g., 6.0 = 6%).
    pub annual_rate_percent: Percent,
    /// Years left on the loan. Converted to whole months.
    pub remaining_term_years: Years,
    /// Monthly principal and interest payment currently being made.
    pub current_monthly_payment: Money,
    /// Lump sum applied to principal at recast.
    #[serde(default)]
    pub lump_sum_payment: Money,
    /// Lender's recast fee, financed into the re-amortized balance.
    #[serde(default)]
    pub recast_fee: Money,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Side-by-side comparison of the loan without and with a recast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecastResult {
    /// Existing loan run to term at the current payment.
    pub pre_recast_schedule: AmortizationSchedule,
    /// Recast loan run to term at the new payment.
    pub post_recast_schedule: AmortizationSchedule,
    /// Full-precision level payment after recast. The schedule pays this
    /// rounded to cents, and never less than one cent.
    pub new_monthly_payment: Money,
    /// Balance re-amortized: current balance less lump sum and fee.
    pub balance_after_lump_sum: Money,
    pub total_interest_before: Money,
    pub total_interest_after: Money,
    /// Interest before less interest after. Negative when the recast costs
    /// more interest than it saves.
    pub interest_savings: Money,
    /// Recast fee less interest savings. Informational.
    pub effective_cost_of_recast: Money,
    /// Current payment less new payment.
    pub monthly_payment_reduction: Money,
    /// All payments on the existing schedule.
    pub total_payments_before: Money,
    /// All payments on the recast schedule plus lump sum and fee.
    pub total_payments_after: Money,
    /// Whole-month term used for both schedules.
    pub term_months: u32,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Evaluate a recast and wrap it in the standard computation envelope.
pub fn analyze_recast(inputs: &LoanInputs) -> EngineResult<ComputationOutput<RecastResult>> {
    let start = Instant::now();
    let result = recast(inputs)?;
    let warnings = collect_warnings(inputs, &result);
    for w in &warnings {
        log::warn!("{w}");
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Mortgage Recast (fixed-rate re-amortization over remaining term)",
        inputs,
        warnings,
        elapsed,
        result,
    ))
}

/// Evaluate a recast of `inputs`.
pub fn recast(inputs: &LoanInputs) -> EngineResult<RecastResult> {
    validate_inputs(inputs)?;
    let term_months = term_in_months(inputs.remaining_term_years)?;
    let rate = inputs.annual_rate_percent;

    let pre_recast_schedule = build_schedule(
        inputs.current_balance,
        rate,
        term_months,
        Some(inputs.current_monthly_payment),
    )?;

    let balance_after_lump_sum =
        inputs.current_balance - inputs.lump_sum_payment - inputs.recast_fee;
    if balance_after_lump_sum < Decimal::ZERO {
        return Err(RecastError::InvalidInput {
            field: "recast_fee".into(),
            reason: format!(
                "Lump sum {} plus fee {} exceeds current balance {}",
                inputs.lump_sum_payment, inputs.recast_fee, inputs.current_balance
            ),
        });
    }

    let (new_monthly_payment, post_recast_schedule) = if balance_after_lump_sum.is_zero() {
        (
            Decimal::ZERO,
            AmortizationSchedule::paid_off(term_months, monthly_rate(rate)),
        )
    } else {
        let payment = compute_monthly_payment(balance_after_lump_sum, rate, term_months)?;
        let schedule = build_schedule(balance_after_lump_sum, rate, term_months, None)?;
        (payment, schedule)
    };

    let total_interest_before = pre_recast_schedule.total_interest();
    let total_interest_after = post_recast_schedule.total_interest();
    let interest_savings = total_interest_before - total_interest_after;
    let total_payments_before = pre_recast_schedule.total_paid();
    let total_payments_after =
        post_recast_schedule.total_paid() + inputs.lump_sum_payment + inputs.recast_fee;

    log::debug!(
        "recast over {term_months} months: payment {} -> {new_monthly_payment}, interest saved {interest_savings}",
        inputs.current_monthly_payment
    );

    Ok(RecastResult {
        new_monthly_payment,
        balance_after_lump_sum,
        total_interest_before,
        total_interest_after,
        interest_savings,
        effective_cost_of_recast: inputs.recast_fee - interest_savings,
        monthly_payment_reduction: inputs.current_monthly_payment - new_monthly_payment,
        total_payments_before,
        total_payments_after,
        term_months,
        pre_recast_schedule,
        post_recast_schedule,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_inputs(inputs: &LoanInputs) -> EngineResult<()> {
    if inputs.original_principal <= Decimal::ZERO {
        return Err(RecastError::InvalidInput {
            field: "original_principal".into(),
            reason: "Original principal must be positive".into(),
        });
    }
    if inputs.current_balance <= Decimal::ZERO {
        return Err(RecastError::InvalidInput {
            field: "current_balance".into(),
            reason: "Current balance must be positive".into(),
        });
    }
    if inputs.current_balance > inputs.original_principal {
        return Err(RecastError::InvalidInput {
            field: "current_balance".into(),
            reason: "Current balance cannot exceed original principal".into(),
        });
    }
    if inputs.annual_rate_percent < Decimal::ZERO
        || inputs.annual_rate_percent > MAX_ANNUAL_RATE_PERCENT
    {
        return Err(RecastError::InvalidInput {
            field: "annual_rate_percent".into(),
            reason: format!("Annual rate must be between 0 and {MAX_ANNUAL_RATE_PERCENT}%"),
        });
    }
    if inputs.remaining_term_years <= Decimal::ZERO {
        return Err(RecastError::InvalidInput {
            field: "remaining_term_years".into(),
            reason: "Remaining term must be positive".into(),
        });
    }
    if inputs.current_monthly_payment <= Decimal::ZERO {
        return Err(RecastError::InvalidInput {
            field: "current_monthly_payment".into(),
            reason: "Current monthly payment must be positive".into(),
        });
    }
    if inputs.lump_sum_payment < Decimal::ZERO {
        return Err(RecastError::InvalidInput {
            field: "lump_sum_payment".into(),
            reason: "Lump sum cannot be negative".into(),
        });
    }
    if inputs.lump_sum_payment > inputs.current_balance {
        return Err(RecastError::InvalidInput {
            field: "lump_sum_payment".into(),
            reason: "Lump sum exceeds the remaining loan amount".into(),
        });
    }
    if inputs.recast_fee < Decimal::ZERO {
        return Err(RecastError::InvalidInput {
            field: "recast_fee".into(),
            reason: "Recast fee cannot be negative".into(),
        });
    }
    Ok(())
}

/// Whole months in `years`, rounded to the nearest month.
fn term_in_months(years: Years) -> EngineResult<u32> {
    let months = (years * MONTHS_PER_YEAR)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let months = months
        .to_u32()
        .filter(|m| *m <= MAX_TERM_MONTHS)
        .ok_or_else(|| RecastError::InvalidInput {
            field: "remaining_term_years".into(),
            reason: format!(
                "Remaining term of {years} years exceeds {MAX_TERM_MONTHS} months"
            ),
        })?;
    if months == 0 {
        return Err(RecastError::InvalidInput {
            field: "remaining_term_years".into(),
            reason: "Remaining term is shorter than one month".into(),
        });
    }
    Ok(months)
}

fn collect_warnings(inputs: &LoanInputs, result: &RecastResult) -> Vec<String> {
    let mut warnings = Vec::new();
    let pre = &result.pre_recast_schedule;

    let exact_months = inputs.remaining_term_years * MONTHS_PER_YEAR;
    if exact_months != Decimal::from(result.term_months) {
        warnings.push(format!(
            "Remaining term of {} years rounded to {} months",
            inputs.remaining_term_years, result.term_months
        ));
    }
    if pre.is_paid_off_early() {
        warnings.push(format!(
            "Current payment pays the loan off in {} of {} months",
            pre.payoff_period(),
            pre.term_months
        ));
    } else if pre.final_payment_adjustment() > pre.scheduled_payment {
        warnings.push(format!(
            "Current payment does not amortize the balance; final payment includes a balloon of {}",
            pre.final_payment_adjustment()
        ));
    }
    if result.balance_after_lump_sum.is_zero() {
        warnings.push("Lump sum and fee retire the loan; no payments remain after recast".into());
    }
    if result.interest_savings < Decimal::ZERO {
        warnings.push(format!(
            "Recast increases total interest by {}",
            -result.interest_savings
        ));
    }
    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
