use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// The Friday on or after the given date.
pub fn upcoming_friday(date: NaiveDate) -> NaiveDate {
    let days = (4 + 7 - date.weekday().num_days_from_monday() as i64) % 7;
    date + Duration::days(days)
}

/// Monthly option expiration: the third Friday of the date's month.
pub fn monthly_option_expiration(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap();
    let day = 21 - (first.weekday().num_days_from_monday() + 2) % 7;
    first.with_day(day).unwrap()
}

/// The monthly option expiration two months out. Always in the future,
/// unlike the current month's expiration which may already have passed.
pub fn following_month_expiry(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap();
    let month0 = first.month0() + 2;
    let first_two_out = first
        .with_month0(month0 % 12)
        .unwrap()
        .with_year(first.year() + (month0 / 12) as i32)
        .unwrap();
    monthly_option_expiration(first_two_out)
}

/// Candidate expiry dates from a given day: the next two Fridays, plus
/// the monthly expirations of this month and the next two. This month's
/// entry can lie in the past once its third Friday has gone by.
pub fn generate_expiry_dates(today: NaiveDate) -> Vec<NaiveDate> {
    let next_month0 = today.with_day(1).unwrap().month0() + 1;
    let next_month = today
        .with_day(1)
        .unwrap()
        .with_month0(next_month0 % 12)
        .unwrap()
        .with_year(today.year() + (next_month0 / 12) as i32)
        .unwrap();

    vec![
        upcoming_friday(today),
        upcoming_friday(today + Duration::days(7)),
        monthly_option_expiration(today),
        monthly_option_expiration(next_month),
        following_month_expiry(today),
    ]
}

/// Count weekdays in the half-open range `[start, end)`. Returns 0 when
/// `end <= start`. Holidays are not excluded; this matches a plain
/// business-day count between today and expiry.
pub fn business_days_between(start: NaiveDate, end: NaiveDate) -> u32 {
    let mut count = 0;
    let mut day = start;
    while day < end {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            count += 1;
        }
        day += Duration::days(1);
    }
    count
}
