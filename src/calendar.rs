//! Pure date stepping for recurring definitions.

use time::{Date, Duration, Month, util};

use crate::models::Frequency;

/// The date of the occurrence that follows `date` for a definition with
/// `frequency`.
///
/// Weekly and bi-weekly stepping add exactly 7 or 14 days. Monthly
/// stepping moves to the next calendar month, keeping the day-of-month
/// where the target month has that day and otherwise clamping to the
/// month's final day. Stepping always applies to the previous occurrence,
/// so a clamp carries forward: `2024-01-31` steps to `2024-02-29`, which
/// steps to `2024-03-29`.
pub fn next_occurrence(date: Date, frequency: Frequency) -> Date {
    match frequency {
        Frequency::Weekly => date.saturating_add(Duration::weeks(1)),
        Frequency::BiWeekly => date.saturating_add(Duration::weeks(2)),
        Frequency::Monthly => add_one_month(date),
    }
}

fn add_one_month(date: Date) -> Date {
    let (year, month) = match date.month() {
        Month::December => (date.year() + 1, Month::January),
        month => (date.year(), month.next()),
    };

    let day = date.day().min(util::days_in_year_month(year, month));

    Date::from_calendar_date(year, month, day)
        .expect("the day is clamped to the length of the target month")
}
