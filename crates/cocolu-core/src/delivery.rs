//! # Delivery Estimation
//!
//! Maps a lead time in days to a calendar delivery date.
//!
//! The default is a flat calendar-day count. Deployments that ship only on
//! business days plug in a [`BusinessCalendar`]; the estimate then rolls
//! forward to the next business day.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Upper bound on days skipped while looking for a business day.
const MAX_CALENDAR_ROLL_DAYS: u32 = 366;

/// Answers whether goods can be delivered on a given date.
pub trait BusinessCalendar: Send + Sync {
    fn is_business_day(&self, date: NaiveDate) -> bool;
}

/// Monday to Friday, no holidays.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekdayCalendar;

impl BusinessCalendar for WeekdayCalendar {
    fn is_business_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

/// `today + lead_time_days` calendar days.
///
/// Negative lead times are treated as zero.
///
/// ```rust
/// use chrono::NaiveDate;
/// use cocolu_core::delivery::estimate_delivery_date;
///
/// let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// assert_eq!(
///     estimate_delivery_date(today, 14),
///     NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
/// );
/// ```
pub fn estimate_delivery_date(today: NaiveDate, lead_time_days: i64) -> NaiveDate {
    let days = u64::try_from(lead_time_days.max(0)).unwrap_or(0);
    today.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

/// Like [`estimate_delivery_date`], then rolls forward to a business day.
pub fn estimate_delivery_date_with(
    today: NaiveDate,
    lead_time_days: i64,
    calendar: &dyn BusinessCalendar,
) -> NaiveDate {
    let mut date = estimate_delivery_date(today, lead_time_days);

    for _ in 0..MAX_CALENDAR_ROLL_DAYS {
        if calendar.is_business_day(date) {
            break;
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    date
}
