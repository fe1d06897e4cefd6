use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;

use recast_core::amortization::{
    analyze_recast, build_schedule, compute_monthly_payment, round_money, AmortizationSchedule,
    LoanInputs,
};
use recast_core::with_metadata;

use crate::input;

/// Arguments for a recast comparison
#[derive(Args)]
pub struct RecastArgs {
    /// Amount originally borrowed
    #[arg(long)]
    pub original_principal: Option<Decimal>,

    /// Outstanding balance today
    #[arg(long)]
    pub current_balance: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 6.0 for 6%)
    #[arg(long, alias = "rate")]
    pub annual_rate_percent: Option<Decimal>,

    /// Years left on the loan
    #[arg(long, alias = "years")]
    pub remaining_years: Option<Decimal>,

    /// Current monthly principal and interest payment
    #[arg(long)]
    pub current_payment: Option<Decimal>,

    /// Lump sum applied to principal at recast
    #[arg(long)]
    pub lump_sum: Option<Decimal>,

    /// Lender's recast fee
    #[arg(long)]
    pub recast_fee: Option<Decimal>,

    /// Include every period of both schedules in the output
    #[arg(long)]
    pub schedules: bool,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a standalone amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long, alias = "rate")]
    pub annual_rate_percent: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term_months: Option<u32>,

    /// Fixed monthly payment (defaults to the fully amortizing payment)
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a monthly payment calculation
#[derive(Args)]
pub struct PaymentArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate in percent
    #[arg(long, alias = "rate")]
    pub annual_rate_percent: Decimal,

    /// Term in months
    #[arg(long)]
    pub term_months: u32,
}

/// File/stdin shape for the `schedule` command.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub principal: Decimal,
    pub annual_rate_percent: Decimal,
    pub term_months: u32,
    #[serde(default)]
    pub fixed_payment: Option<Decimal>,
}

pub fn run_recast(args: RecastArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan: LoanInputs = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        LoanInputs {
            original_principal: args
                .original_principal
                .ok_or("--original-principal is required (or provide --input)")?,
            current_balance: args
                .current_balance
                .ok_or("--current-balance is required (or provide --input)")?,
            annual_rate_percent: args
                .annual_rate_percent
                .ok_or("--annual-rate-percent is required (or provide --input)")?,
            remaining_term_years: args
                .remaining_years
                .ok_or("--remaining-years is required (or provide --input)")?,
            current_monthly_payment: args
                .current_payment
                .ok_or("--current-payment is required (or provide --input)")?,
            lump_sum_payment: args.lump_sum.unwrap_or(dec!(0)),
            recast_fee: args.recast_fee.unwrap_or(dec!(0)),
        }
    };

    let output = analyze_recast(&loan)?;
    let mut value = serde_json::to_value(&output)?;
    if !args.schedules {
        let result = &output.result;
        value["result"]["pre_recast_schedule"] = schedule_summary(&result.pre_recast_schedule);
        value["result"]["post_recast_schedule"] = schedule_summary(&result.post_recast_schedule);
    }
    Ok(value)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: ScheduleRequest = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ScheduleRequest {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_percent: args
                .annual_rate_percent
                .ok_or("--annual-rate-percent is required (or provide --input)")?,
            term_months: args
                .term_months
                .ok_or("--term-months is required (or provide --input)")?,
            fixed_payment: args.payment,
        }
    };

    let start = Instant::now();
    let schedule = build_schedule(
        request.principal,
        request.annual_rate_percent,
        request.term_months,
        request.fixed_payment,
    )?;
    let mut warnings = Vec::new();
    if schedule.is_paid_off_early() {
        warnings.push(format!(
            "Loan is paid off after {} of {} months",
            schedule.payoff_period(),
            schedule.term_months
        ));
    }
    let output = with_metadata(
        "Fixed-payment amortization schedule",
        &request,
        warnings,
        start.elapsed().as_micros() as u64,
        schedule,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let payment =
        compute_monthly_payment(args.principal, args.annual_rate_percent, args.term_months)?;
    let output = with_metadata(
        "Level-payment annuity",
        &json!({
            "principal": args.principal,
            "annual_rate_percent": args.annual_rate_percent,
            "term_months": args.term_months,
        }),
        Vec::new(),
        start.elapsed().as_micros() as u64,
        json!({
            "monthly_payment": round_money(payment),
            "exact_payment": payment,
        }),
    );
    Ok(serde_json::to_value(output)?)
}

/// Headline figures of a schedule, shown in place of its rows.
fn schedule_summary(schedule: &AmortizationSchedule) -> Value {
    json!({
        "periods": schedule.payoff_period(),
        "scheduled_payment": schedule.scheduled_payment,
        "final_payment": schedule.rows.last().map(|r| r.payment).unwrap_or_default(),
        "total_interest": schedule.total_interest(),
        "total_paid": schedule.total_paid(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    /// Writes `contents` to a per-process file in the temp dir.
    fn fixture(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("recast-{}-{name}", std::process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    fn recast_args(input: &PathBuf, schedules: bool) -> RecastArgs {
        RecastArgs {
            original_principal: None,
            current_balance: None,
            annual_rate_percent: None,
            remaining_years: None,
            current_payment: None,
            lump_sum: None,
            recast_fee: None,
            schedules,
            input: Some(input.display().to_string()),
        }
    }

    const WORKED_EXAMPLE: &str = "\
original_principal: \"300000\"
current_balance: \"280000\"
annual_rate_percent: \"6.0\"
remaining_term_years: \"25\"
current_monthly_payment: \"1804.16\"
lump_sum_payment: \"50000\"
recast_fee: \"500\"
";

    #[test]
    fn test_recast_from_yaml_summarizes_schedules() {
        let path = fixture("summary.yaml", WORKED_EXAMPLE);
        let value = run_recast(recast_args(&path, false)).unwrap();
        fs::remove_file(&path).ok();

        let result = &value["result"];
        assert_eq!(result["balance_after_lump_sum"], json!("229500"));
        assert_eq!(result["post_recast_schedule"]["periods"], json!(300));
        assert_eq!(result["post_recast_schedule"]["scheduled_payment"], json!("1478.67"));
        assert!(result["post_recast_schedule"].get("rows").is_none());
    }

    #[test]
    fn test_recast_with_schedules_keeps_rows() {
        let path = fixture("rows.yaml", WORKED_EXAMPLE);
        let value = run_recast(recast_args(&path, true)).unwrap();
        fs::remove_file(&path).ok();

        let rows = value["result"]["post_recast_schedule"]["rows"]
            .as_array()
            .unwrap();
        assert_eq!(rows.len(), 300);
        assert_eq!(rows[0]["period"], json!(1));
    }

    #[test]
    fn test_recast_leaving_under_a_dollar() {
        let yaml = WORKED_EXAMPLE
            .replace("\"50000\"", "\"279999.50\"")
            .replace("\"500\"", "\"0\"");
        let path = fixture("remainder.yaml", &yaml);
        let value = run_recast(recast_args(&path, false)).unwrap();
        fs::remove_file(&path).ok();

        let post = &value["result"]["post_recast_schedule"];
        assert_eq!(post["periods"], json!(50));
        assert_eq!(post["scheduled_payment"], json!("0.01"));
    }

    #[test]
    fn test_schedule_from_yaml() {
        let path = fixture(
            "schedule.yml",
            "principal: \"1200\"\nannual_rate_percent: \"0\"\nterm_months: 12\nfixed_payment: \"300\"\n",
        );
        let value = run_schedule(ScheduleArgs {
            principal: None,
            annual_rate_percent: None,
            term_months: None,
            payment: None,
            input: Some(path.display().to_string()),
        })
        .unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(value["result"]["rows"].as_array().unwrap().len(), 4);
        let warnings = value["warnings"].as_array().unwrap();
        assert_eq!(warnings[0], json!("Loan is paid off after 4 of 12 months"));
    }

    #[test]
    fn test_schedule_rejects_overlong_term() {
        let path = fixture(
            "long.yaml",
            "principal: \"1000\"\nannual_rate_percent: \"0\"\nterm_months: 1201\n",
        );
        let err = run_schedule(ScheduleArgs {
            principal: None,
            annual_rate_percent: None,
            term_months: None,
            payment: None,
            input: Some(path.display().to_string()),
        })
        .unwrap_err();
        fs::remove_file(&path).ok();

        assert!(err.to_string().contains("term_months"));
    }

    #[test]
    fn test_payment_rounds_to_cents() {
        let value = run_payment(PaymentArgs {
            principal: dec!(200_000),
            annual_rate_percent: dec!(6.0),
            term_months: 360,
        })
        .unwrap();
        assert_eq!(value["result"]["monthly_payment"], json!("1199.10"));
    }
}
