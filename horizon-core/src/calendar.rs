//! Calendar arithmetic on `NaiveDate`
//!
//! Month arithmetic clamps to the last valid day (Jan 31 + 1 month = Feb 28/29).

use chrono::{Datelike, Months, NaiveDate};

/// Add (or subtract, when negative) calendar months, clamping the day
pub fn add_months_clamped(date: NaiveDate, months: i32) -> NaiveDate {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(if months >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}

pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    add_months_clamped(first, 1).pred_opt().unwrap_or(date)
}

pub fn end_of_quarter(date: NaiveDate) -> NaiveDate {
    let quarter_end_month = ((date.month() - 1) / 3 + 1) * 3;
    let in_last_month = NaiveDate::from_ymd_opt(date.year(), quarter_end_month, 1).unwrap_or(date);
    end_of_month(in_last_month)
}

pub fn end_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_months_clamps_day() {
        assert_eq!(add_months_clamped(date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(add_months_clamped(date(2023, 1, 31), 1), date(2023, 2, 28));
        assert_eq!(add_months_clamped(date(2024, 3, 31), -1), date(2024, 2, 29));
        assert_eq!(add_months_clamped(date(2024, 6, 15), 12), date(2025, 6, 15));
    }

    #[test]
    fn test_period_ends() {
        assert_eq!(end_of_month(date(2024, 2, 10)), date(2024, 2, 29));
        assert_eq!(end_of_month(date(2024, 12, 31)), date(2024, 12, 31));
        assert_eq!(end_of_quarter(date(2024, 2, 10)), date(2024, 3, 31));
        assert_eq!(end_of_quarter(date(2024, 11, 1)), date(2024, 12, 31));
        assert_eq!(end_of_year(date(2024, 7, 4)), date(2024, 12, 31));
    }
}
