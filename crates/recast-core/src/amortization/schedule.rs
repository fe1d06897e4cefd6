//! Fixed-payment amortization schedules.
//!
//! Money is carried at cents between periods: the level payment and each
//! period's interest are rounded with [`round_money`], and principal is the
//! exact difference. The final period of the term sweeps whatever balance is
//! left, so a complete schedule always repays its starting balance exactly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::payment::{
    compute_monthly_payment, monthly_rate, round_money, validate_loan_terms, ROUNDING_TOLERANCE,
};
use crate::error::RecastError;
use crate::types::{Money, Percent, Rate};
use crate::EngineResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One period of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based payment number.
    pub period: u32,
    /// Total paid this period (principal + interest).
    pub payment: Money,
    /// Portion of the payment that reduces the balance.
    pub principal: Money,
    /// Portion of the payment that covers interest accrued this period.
    pub interest: Money,
    /// Balance outstanding after this payment.
    pub remaining_balance: Money,
}

/// Chronological period-by-period breakdown of a fixed-payment loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    /// Balance at the start of period 1.
    pub starting_balance: Money,
    /// Periodic (monthly) rate applied to the running balance.
    pub monthly_rate: Rate,
    /// Level payment, rounded to cents.
    pub scheduled_payment: Money,
    /// Nominal term. The schedule may end sooner if the loan is overpaid.
    pub term_months: u32,
    pub rows: Vec<AmortizationRow>,
}

impl AmortizationSchedule {
    /// Schedule for a loan with nothing left to amortize.
    pub fn paid_off(term_months: u32, monthly_rate: Rate) -> Self {
        Self {
            starting_balance: Decimal::ZERO,
            monthly_rate,
            scheduled_payment: Decimal::ZERO,
            term_months,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_interest(&self) -> Money {
        self.rows.iter().map(|r| r.interest).sum()
    }

    pub fn total_principal(&self) -> Money {
        self.rows.iter().map(|r| r.principal).sum()
    }

    pub fn total_paid(&self) -> Money {
        self.rows.iter().map(|r| r.payment).sum()
    }

    /// Balance after the last emitted period.
    pub fn final_balance(&self) -> Money {
        self.rows
            .last()
            .map(|r| r.remaining_balance)
            .unwrap_or(self.starting_balance)
    }

    /// Number of payments actually made.
    pub fn payoff_period(&self) -> u32 {
        self.rows.len() as u32
    }

    /// True when the balance reached zero before the nominal term.
    pub fn is_paid_off_early(&self) -> bool {
        !self.rows.is_empty() && self.payoff_period() < self.term_months
    }

    /// Difference between the last payment and the level payment.
    ///
    /// Positive when the final period carries a balloon (rounding drift or
    /// an under-sized payment), negative when the loan is overpaid.
    pub fn final_payment_adjustment(&self) -> Money {
        self.rows
            .last()
            .map(|r| r.payment - self.scheduled_payment)
            .unwrap_or(Decimal::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build a fixed-payment amortization schedule.
///
/// With `fixed_payment` absent, the payment that fully amortizes `principal`
/// over `term_months` is used, never less than one cent. Periods stop early
/// once the balance reaches zero; on period `term_months` any remaining
/// balance is swept into the final payment.
///
/// A payment smaller than the first period's interest is rejected: the
/// balance would grow every period instead of amortizing.
pub fn build_schedule(
    principal: Money,
    annual_rate_percent: Percent,
    term_months: u32,
    fixed_payment: Option<Money>,
) -> EngineResult<AmortizationSchedule> {
    validate_loan_terms(principal, annual_rate_percent, term_months)?;

    let r = monthly_rate(annual_rate_percent);
    let payment = match fixed_payment {
        Some(p) => round_money(p),
        None => round_money(compute_monthly_payment(
            principal,
            annual_rate_percent,
            term_months,
        )?)
        .max(ROUNDING_TOLERANCE),
    };
    if payment <= Decimal::ZERO {
        return Err(RecastError::InvalidInput {
            field: "fixed_payment".into(),
            reason: "Payment must be at least one cent".into(),
        });
    }

    // Interest only falls as the balance falls, so the first period is the
    // worst case.
    let first_interest = round_money(principal * r);
    if payment < first_interest {
        return Err(RecastError::InvalidInput {
            field: "fixed_payment".into(),
            reason: format!(
                "Payment {payment} is below first-period interest {first_interest} \
                 (negative amortization)"
            ),
        });
    }

    let mut balance = principal;
    let mut rows = Vec::with_capacity(term_months as usize);

    for period in 1..=term_months {
        let interest = round_money(balance * r);
        let mut principal_portion = payment - interest;
        let mut period_payment = payment;

        if principal_portion >= balance || period == term_months {
            principal_portion = balance;
            period_payment = interest + balance;
        }

        balance -= principal_portion;
        rows.push(AmortizationRow {
            period,
            payment: period_payment,
            principal: principal_portion,
            interest,
            remaining_balance: balance,
        });

        if balance.is_zero() {
            break;
        }
    }

    log::debug!(
        "schedule for {principal}: {} of {term_months} periods at payment {payment}",
        rows.len()
    );

    Ok(AmortizationSchedule {
        starting_balance: principal,
        monthly_rate: r,
        scheduled_payment: payment,
        term_months,
        rows,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::payment::MAX_TERM_MONTHS;
    use rust_decimal_macros::dec;

    fn standard_schedule() -> AmortizationSchedule {
        build_schedule(dec!(200_000), dec!(6.0), 360, None).unwrap()
    }

    #[test]
    fn test_full_term_length() {
        let s = standard_schedule();
        assert_eq!(s.len(), 360);
        assert_eq!(s.scheduled_payment, dec!(1199.10));
        assert!(!s.is_paid_off_early());
    }

    #[test]
    fn test_principal_sums_to_starting_balance() {
        let s = standard_schedule();
        assert!((s.total_principal() - s.starting_balance).abs() <= ROUNDING_TOLERANCE);
        assert_eq!(s.total_principal(), dec!(200_000));
    }

    #[test]
    fn test_final_balance_is_zero() {
        let s = standard_schedule();
        assert_eq!(s.final_balance(), Decimal::ZERO);
    }

    #[test]
    fn test_final_adjustment_only_absorbs_drift() {
        let s = standard_schedule();
        // Rounding the level payment down by a tenth of a cent leaves ~$1.
        assert!(s.final_payment_adjustment().abs() < dec!(5));
    }

    #[test]
    fn test_first_row_split() {
        let s = standard_schedule();
        let first = &s.rows[0];
        assert_eq!(first.period, 1);
        assert_eq!(first.interest, dec!(1000.00));
        assert_eq!(first.principal, dec!(199.10));
        assert_eq!(first.remaining_balance, dec!(199_800.90));
    }

    #[test]
    fn test_periods_consecutive_and_balances_non_negative() {
        let s = standard_schedule();
        let mut prev = s.starting_balance;
        for (i, row) in s.rows.iter().enumerate() {
            assert_eq!(row.period, i as u32 + 1);
            assert!(row.remaining_balance >= Decimal::ZERO);
            assert!(row.remaining_balance <= prev);
            assert_eq!(row.payment, row.principal + row.interest);
            prev = row.remaining_balance;
        }
    }

    #[test]
    fn test_interest_declines_over_time() {
        let s = standard_schedule();
        assert!(s.rows[0].interest > s.rows[180].interest);
        assert!(s.rows[180].interest > s.rows[359].interest);
    }

    #[test]
    fn test_zero_rate_linear_amortization() {
        let s = build_schedule(dec!(12_000), Decimal::ZERO, 12, None).unwrap();
        assert_eq!(s.len(), 12);
        assert_eq!(s.total_interest(), Decimal::ZERO);
        for row in &s.rows {
            assert_eq!(row.principal, dec!(1000));
        }
        assert_eq!(s.final_balance(), Decimal::ZERO);
    }

    #[test]
    fn test_overpayment_truncates_early() {
        let s = build_schedule(dec!(10_000), Decimal::ZERO, 12, Some(dec!(5000))).unwrap();
        assert_eq!(s.len(), 2);
        assert!(s.is_paid_off_early());
        assert_eq!(s.final_balance(), Decimal::ZERO);
    }

    #[test]
    fn test_early_payoff_last_row_capped() {
        let s = build_schedule(dec!(10_000), Decimal::ZERO, 12, Some(dec!(3000))).unwrap();
        assert_eq!(s.len(), 4);
        let last = s.rows.last().unwrap();
        assert_eq!(last.principal, dec!(1000));
        assert_eq!(last.payment, dec!(1000));
        assert_eq!(s.final_payment_adjustment(), dec!(-2000));
    }

    #[test]
    fn test_underpayment_ends_in_balloon() {
        let required = compute_monthly_payment(dec!(100_000), dec!(6.0), 120).unwrap();
        let s = build_schedule(dec!(100_000), dec!(6.0), 120, Some(dec!(800))).unwrap();
        assert!(dec!(800) < required);
        assert_eq!(s.len(), 120);
        assert_eq!(s.final_balance(), Decimal::ZERO);
        assert!(s.final_payment_adjustment() > dec!(800));
    }

    #[test]
    fn test_interest_only_payment_accepted_with_balloon() {
        let s = build_schedule(dec!(100_000), dec!(6.0), 12, Some(dec!(500))).unwrap();
        assert_eq!(s.len(), 12);
        assert!(s.rows[..11].iter().all(|r| r.principal.is_zero()));
        let last = s.rows.last().unwrap();
        assert_eq!(last.principal, dec!(100_000));
        assert_eq!(last.payment, dec!(100_500));
    }

    #[test]
    fn test_negative_amortization_rejected() {
        let err = build_schedule(dec!(100_000), dec!(6.0), 360, Some(dec!(499.99))).unwrap_err();
        assert_eq!(err.field(), Some("fixed_payment"));
    }

    #[test]
    fn test_non_positive_payment_rejected() {
        assert!(build_schedule(dec!(1000), dec!(5), 12, Some(Decimal::ZERO)).is_err());
        assert!(build_schedule(dec!(1000), dec!(5), 12, Some(dec!(0.004))).is_err());
    }

    #[test]
    fn test_zero_term_rejected() {
        let err = build_schedule(dec!(1000), dec!(5), 0, None).unwrap_err();
        assert_eq!(err.field(), Some("term_months"));
    }

    #[test]
    fn test_sub_cent_amortizing_payment_floored_to_one_cent() {
        let s = build_schedule(dec!(0.50), dec!(6.0), 300, None).unwrap();
        assert_eq!(s.scheduled_payment, dec!(0.01));
        assert_eq!(s.len(), 50);
        assert!(s.is_paid_off_early());
        assert_eq!(s.total_principal(), dec!(0.50));
        assert_eq!(s.final_balance(), Decimal::ZERO);
    }

    #[test]
    fn test_one_cent_principal() {
        let s = build_schedule(dec!(0.01), dec!(6.0), 300, None).unwrap();
        assert_eq!(s.len(), 1);
        assert_eq!(s.rows[0].payment, dec!(0.01));
        assert_eq!(s.final_balance(), Decimal::ZERO);
    }

    #[test]
    fn test_term_beyond_maximum_rejected() {
        let err =
            build_schedule(dec!(1000), Decimal::ZERO, MAX_TERM_MONTHS + 1, None).unwrap_err();
        assert_eq!(err.field(), Some("term_months"));
        let err = build_schedule(dec!(1000), Decimal::ZERO, u32::MAX, Some(dec!(10))).unwrap_err();
        assert_eq!(err.field(), Some("term_months"));
    }

    #[test]
    fn test_single_period_schedule() {
        let s = build_schedule(dec!(1000), dec!(12), 1, None).unwrap();
        assert_eq!(s.len(), 1);
        assert_eq!(s.rows[0].interest, dec!(10));
        assert_eq!(s.rows[0].payment, dec!(1010));
        assert_eq!(s.final_balance(), Decimal::ZERO);
    }

    #[test]
    fn test_paid_off_schedule_is_empty() {
        let s = AmortizationSchedule::paid_off(300, dec!(0.005));
        assert!(s.is_empty());
        assert_eq!(s.total_interest(), Decimal::ZERO);
        assert_eq!(s.final_balance(), Decimal::ZERO);
        assert!(!s.is_paid_off_early());
        assert_eq!(s.final_payment_adjustment(), Decimal::ZERO);
    }
}
