//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use chrono::{DateTime, Months, NaiveDate, TimeZone, Utc};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, ResultEngine};

/// Collapse inner whitespace and trim; returns an error when nothing is left.
pub(crate) fn normalize_category_display(input: &str) -> ResultEngine<String> {
    let mut out = String::new();
    for token in input.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token);
    }
    if out.is_empty() {
        return Err(EngineError::InvalidInput(
            "category name must not be empty".to_string(),
        ));
    }
    Ok(out)
}

/// Comparison key for category names.
///
/// NFKD, combining marks dropped, lowercased, any run of non-alphanumeric
/// characters folded into a single space. "Saúde" and "saude" collide.
pub(crate) fn normalize_category_key(input: &str) -> ResultEngine<String> {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    let normalized = out.trim();
    if normalized.is_empty() {
        return Err(EngineError::InvalidInput(
            "category name must contain letters or digits".to_string(),
        ));
    }
    Ok(normalized.to_string())
}

/// Shift `date` forward by `months` calendar months.
///
/// Days past the end of the target month clamp to its last day
/// (Jan 31 + 1 month = Feb 28/29).
pub(crate) fn add_months(date: DateTime<Utc>, months: u32) -> ResultEngine<DateTime<Utc>> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| EngineError::InvalidInput("date out of range".to_string()))
}

/// Half-open UTC range `[first day of month, first day of next month)`.
pub(crate) fn month_bounds(month: u32, year: i32) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| EngineError::InvalidInput("invalid month".to_string()))?;
    let start = Utc.from_utc_datetime(&start);
    let end = add_months(start, 1)?;
    Ok((start, end))
}

pub(crate) fn validate_budget_period(month: i32, year: i32) -> ResultEngine<()> {
    if !(1..=12).contains(&month) {
        return Err(EngineError::InvalidInput(
            "month must be between 1 and 12".to_string(),
        ));
    }
    if !(2000..=2100).contains(&year) {
        return Err(EngineError::InvalidInput(
            "year must be between 2000 and 2100".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_day_of_month(value: Option<i32>, label: &str) -> ResultEngine<()> {
    if let Some(day) = value
        && !(1..=31).contains(&day)
    {
        return Err(EngineError::InvalidInput(format!(
            "{label} must be between 1 and 31"
        )));
    }
    Ok(())
}

pub(crate) fn validate_last_four_digits(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.len() != 4 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(EngineError::InvalidInput(
            "last four digits must be exactly 4 digits".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn require_positive(amount_minor: i64, label: &str) -> ResultEngine<()> {
    if amount_minor <= 0 {
        return Err(EngineError::InvalidAmount(format!("{label} must be > 0")));
    }
    Ok(())
}

/// Split `amount_minor` into `count` shares; the remainder lands on the last.
pub(crate) fn split_installments(amount_minor: i64, count: i32) -> Vec<i64> {
    let count = i64::from(count.max(1));
    let base = amount_minor / count;
    let remainder = amount_minor % count;
    (1..=count)
        .map(|i| if i == count { base + remainder } else { base })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn category_key_folds_accents_and_punctuation() {
        assert_eq!(normalize_category_key("  Saúde ").unwrap(), "saude");
        assert_eq!(
            normalize_category_key("Bills & Utilities").unwrap(),
            "bills utilities"
        );
        assert!(normalize_category_key("  --  ").is_err());
    }

    #[test]
    fn category_display_collapses_whitespace() {
        assert_eq!(
            normalize_category_display("  Eating   out ").unwrap(),
            "Eating out"
        );
        assert!(normalize_category_display("   ").is_err());
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        let jan_31 = Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap();
        let feb = add_months(jan_31, 1).unwrap();
        assert_eq!(feb, Utc.with_ymd_and_hms(2025, 2, 28, 12, 0, 0).unwrap());
        let mar = add_months(jan_31, 2).unwrap();
        assert_eq!(mar, Utc.with_ymd_and_hms(2025, 3, 31, 12, 0, 0).unwrap());
    }

    #[test]
    fn month_bounds_wraps_year() {
        let (start, end) = month_bounds(12, 2025).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn split_installments_puts_remainder_last() {
        assert_eq!(split_installments(300, 3), vec![100, 100, 100]);
        assert_eq!(split_installments(1000, 3), vec![333, 333, 334]);
        assert_eq!(split_installments(1000, 3).iter().sum::<i64>(), 1000);
    }

    #[test]
    fn budget_period_bounds() {
        assert!(validate_budget_period(1, 2000).is_ok());
        assert!(validate_budget_period(12, 2100).is_ok());
        assert!(validate_budget_period(0, 2025).is_err());
        assert!(validate_budget_period(13, 2025).is_err());
        assert!(validate_budget_period(6, 1999).is_err());
    }

    #[test]
    fn last_four_digits_must_be_digits() {
        assert_eq!(validate_last_four_digits(" 1234 ").unwrap(), "1234");
        assert!(validate_last_four_digits("12a4").is_err());
        assert!(validate_last_four_digits("12345").is_err());
    }
}
