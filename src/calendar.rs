//! Calendar arithmetic used by the day rules and the fire time search.
use std::cmp::Ordering;

/// Type of every calendar value the rules work with: seconds, minutes, hours, days, months, weekdays.
pub(crate) type FieldValue = u32;

/// Weekday numbers, Sunday is `0`.
pub(crate) const SUNDAY: FieldValue = 0;
pub(crate) const SATURDAY: FieldValue = 6;

/// Returns `true` if provided year is leap.
#[inline]
pub(crate) fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Returns number of days in specified month.
pub(crate) fn days_in_month(year: i32, month: FieldValue) -> FieldValue {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => panic!("Invalid month: {month}"),
    }
}

/// Calculates day of week for specified date, `0` is Sunday.
pub(crate) fn day_of_week(year: i32, month: FieldValue, day: FieldValue) -> FieldValue {
    if year < 1 || day == 0 || month == 0 || month > 12 || day > days_in_month(year, month) {
        panic!("Invalid date: {year:04}-{month:02}-{day:02}");
    }

    let month_offset: FieldValue = if is_leap_year(year) {
        [0, 3, 4, 0, 2, 5, 0, 3, 6, 1, 4, 6]
    } else {
        [0, 3, 3, 6, 1, 4, 6, 2, 5, 0, 3, 5]
    }[(month - 1) as usize];

    let year = (year - 1) as FieldValue;

    (day + month_offset + 5 * (year % 4) + 4 * (year % 100) + 6 * (year % 400)) % 7
}

/// Returns `true` for Monday to Friday.
#[inline]
pub(crate) fn is_business_day(weekday: FieldValue) -> bool {
    weekday != SUNDAY && weekday != SATURDAY
}

/// Everything a day rule may need to know about a particular month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct MonthContext {
    days: FieldValue,
    first_weekday: FieldValue,
}

impl MonthContext {
    pub(crate) fn new(year: i32, month: FieldValue) -> Self {
        Self {
            days: days_in_month(year, month),
            first_weekday: day_of_week(year, month, 1),
        }
    }

    /// Number of the last day, which is the length of the month as well.
    #[inline]
    pub(crate) fn last_day(&self) -> FieldValue {
        self.days
    }

    /// Day of week of the specified day of this month.
    #[inline]
    pub(crate) fn weekday(&self, day: FieldValue) -> FieldValue {
        debug_assert!(day >= 1 && day <= self.days);
        (self.first_weekday + day - 1) % 7
    }

    /// Day of the last specified day of the week.
    pub(crate) fn last_weekday(&self, weekday: FieldValue) -> FieldValue {
        let last_day_weekday = self.weekday(self.days);
        self.days - (last_day_weekday + 7 - weekday) % 7
    }

    /// Day of the `n`-th specified day of the week, if the month has that many.
    pub(crate) fn nth_weekday(&self, weekday: FieldValue, n: FieldValue) -> Option<FieldValue> {
        if n == 0 {
            return None;
        }

        let mut day = 1 + (n - 1) * 7;
        match self.first_weekday.cmp(&weekday) {
            Ordering::Greater => day += 7 - (self.first_weekday - weekday),
            Ordering::Less => day += weekday - self.first_weekday,
            Ordering::Equal => {}
        }

        (day <= self.days).then_some(day)
    }

    /// Last Monday to Friday of the month.
    pub(crate) fn last_business_day(&self) -> FieldValue {
        let mut day = self.days;
        while !is_business_day(self.weekday(day)) {
            day -= 1;
        }
        day
    }

    /// Business day nearest to the specified day, without leaving the month.
    ///
    /// Returns `None` if the month is shorter than `day`.
    pub(crate) fn nearest_business_day(&self, day: FieldValue) -> Option<FieldValue> {
        if day == 0 || day > self.days {
            return None;
        }

        let nearest = match self.weekday(day) {
            SUNDAY if day == self.days => day - 2,
            SUNDAY => day + 1,
            SATURDAY if day == 1 => day + 2,
            SATURDAY => day - 1,
            _ => day,
        };

        Some(nearest)
    }
}
