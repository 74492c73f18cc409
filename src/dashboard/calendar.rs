use chrono::{Datelike, Duration, Months, NaiveDate};

/// Weeks covering `anchor`'s month, Sunday first. Leading and trailing days
/// from the neighbouring months fill out the first and last week.
pub fn month_grid(anchor: NaiveDate) -> Vec<[NaiveDate; 7]> {
    let first = anchor.with_day(1).unwrap_or(anchor);
    let start = first - Duration::days(i64::from(first.weekday().num_days_from_sunday()));
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first);

    let mut weeks = Vec::new();
    let mut day = start;
    while day <= last {
        let mut week = [day; 7];
        for (offset, slot) in week.iter_mut().enumerate() {
            *slot = day + Duration::days(offset as i64);
        }
        weeks.push(week);
        day += Duration::days(7);
    }
    weeks
}

/// Move `date` by whole months, clamping to the target month's last day.
pub fn shift_month(date: NaiveDate, delta: i32) -> NaiveDate {
    let months = Months::new(delta.unsigned_abs());
    let shifted = if delta >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    };
    shifted.unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn october_2026_grid() {
        let weeks = month_grid(d(2026, 10, 16));
        // Oct 1 2026 is a Thursday.
        assert_eq!(weeks[0][0], d(2026, 9, 27));
        assert_eq!(weeks[0][4], d(2026, 10, 1));
        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks[4][6], d(2026, 10, 31));
    }

    #[test]
    fn every_week_starts_on_sunday() {
        for week in month_grid(d(2027, 2, 1)) {
            assert_eq!(week[0].weekday(), Weekday::Sun);
            assert_eq!(week[6].weekday(), Weekday::Sat);
        }
    }

    #[test]
    fn grid_spans_whole_month() {
        let weeks = month_grid(d(2026, 8, 10));
        let days: Vec<NaiveDate> = weeks.iter().flatten().copied().collect();
        assert!(days.contains(&d(2026, 8, 1)));
        assert!(days.contains(&d(2026, 8, 31)));
        assert_eq!(days.len() % 7, 0);
    }

    #[test]
    fn shift_month_clamps_day() {
        assert_eq!(shift_month(d(2026, 1, 31), 1), d(2026, 2, 28));
        assert_eq!(shift_month(d(2026, 3, 31), -1), d(2026, 2, 28));
        assert_eq!(shift_month(d(2026, 12, 15), 1), d(2027, 1, 15));
        assert_eq!(shift_month(d(2026, 10, 16), 0), d(2026, 10, 16));
    }
}
