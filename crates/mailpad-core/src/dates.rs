/// Work-week date helpers used by weekly-report templates.
///
/// Dates render as `Y.M.D` without zero padding, e.g. `2024.2.5`.
use chrono::{Datelike, Days, Local, NaiveDate};

/// Monday of the week containing `date`. Sunday belongs to the week that
/// started six days earlier.
pub fn week_monday(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

pub fn week_friday(date: NaiveDate) -> NaiveDate {
    let monday = week_monday(date);
    monday.checked_add_days(Days::new(4)).unwrap_or(monday)
}

pub fn format_short_date(date: NaiveDate) -> String {
    format!("{}.{}.{}", date.year(), date.month(), date.day())
}

/// `Monday-Friday` of the week containing `date`, e.g. `2024.2.5-2024.2.9`.
pub fn work_week_range(date: NaiveDate) -> String {
    format!(
        "{}-{}",
        format_short_date(week_monday(date)),
        format_short_date(week_friday(date))
    )
}

/// Friday of the week containing `date`, formatted.
pub fn last_workday_of_week(date: NaiveDate) -> String {
    format_short_date(week_friday(date))
}

pub fn current_work_week_range() -> String {
    work_week_range(Local::now().date_naive())
}
