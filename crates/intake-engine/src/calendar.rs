use chrono::{Datelike, Months, NaiveDate};
use shared_types::CalculationRule;

/// December 31 of the year after `today`.
///
/// Swiss basic health insurance can only be cancelled for the end of a
/// calendar year, so this is the default termination date.
pub fn end_of_next_year(today: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(today.year() + 1, 12, 31)
}

/// Last day of the month `months` months after `today`
pub fn end_of_month_after(today: NaiveDate, months: u32) -> Option<NaiveDate> {
    let target = today.with_day(1)?.checked_add_months(Months::new(months))?;
    last_day_of_month(target)
}

/// Last day of the month containing `date`
pub fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

/// Apply a calculation rule relative to `today`
pub fn apply_rule(rule: CalculationRule, today: NaiveDate) -> Option<NaiveDate> {
    match rule {
        CalculationRule::EndOfNextYear => end_of_next_year(today),
        CalculationRule::Today => Some(today),
        CalculationRule::EndOfMonthAfter { months } => end_of_month_after(today, months),
    }
}
