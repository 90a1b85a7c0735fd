//! Search of the next calendar timestamp which matches the expression.
//!
//! The search works with naive (wall-clock) timestamps only. It walks the calendar fields
//! from the most significant to the least significant one; when a field has no matching value
//! left, the next more significant field is incremented and all less significant fields are
//! reset to their minimums, like a carry in an adder.
use crate::{
    calendar::{days_in_month, FieldValue, MonthContext},
    expression::CronExpression,
    field::{MAX_YEAR, MIN_YEAR},
};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use tracing::{debug, trace};

/// Number of years the search looks through before it gives up.
///
/// The Gregorian calendar repeats itself every 400 years,
/// so an expression without a match in that many years doesn't match at all.
pub const SEARCH_HORIZON_YEARS: u32 = 400;

/// Position of the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Cursor {
    year: i32,
    month: FieldValue,
    day: FieldValue,
    hour: FieldValue,
    minute: FieldValue,
    second: FieldValue,
}

impl Cursor {
    fn set_year(&mut self, year: i32) {
        self.year = year;
        self.month = 1;
        self.day = 1;
        self.hour = 0;
        self.minute = 0;
        self.second = 0;
    }

    fn set_month(&mut self, month: FieldValue) {
        self.month = month;
        self.day = 1;
        self.hour = 0;
        self.minute = 0;
        self.second = 0;
    }

    fn set_day(&mut self, day: FieldValue) {
        self.day = day;
        self.hour = 0;
        self.minute = 0;
        self.second = 0;
    }

    fn set_hour(&mut self, hour: FieldValue) {
        self.hour = hour;
        self.minute = 0;
        self.second = 0;
    }

    fn set_minute(&mut self, minute: FieldValue) {
        self.minute = minute;
        self.second = 0;
    }

    fn inc_year(&mut self) {
        self.set_year(self.year + 1);
    }

    fn inc_month(&mut self) {
        if self.month < 12 {
            self.set_month(self.month + 1);
        } else {
            self.inc_year();
        }
    }

    fn inc_day(&mut self) {
        if self.day < days_in_month(self.year, self.month) {
            self.set_day(self.day + 1);
        } else {
            self.inc_month();
        }
    }

    fn inc_hour(&mut self) {
        if self.hour < 23 {
            self.set_hour(self.hour + 1);
        } else {
            self.inc_day();
        }
    }

    fn inc_minute(&mut self) {
        if self.minute < 59 {
            self.set_minute(self.minute + 1);
        } else {
            self.inc_hour();
        }
    }

    fn to_naive(self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_opt(self.hour, self.minute, self.second)
    }
}

impl From<NaiveDateTime> for Cursor {
    fn from(value: NaiveDateTime) -> Self {
        Self {
            year: value.year(),
            month: value.month(),
            day: value.day(),
            hour: value.hour(),
            minute: value.minute(),
            second: value.second(),
        }
    }
}

/// Returns the earliest wall-clock timestamp at or after `floor` (whole seconds) matching the `expression`.
///
/// Returns `None` if there is no such timestamp up to [`MAX_YEAR`]
/// or within [`SEARCH_HORIZON_YEARS`] from the `floor`.
pub(crate) fn next_match(expression: &CronExpression, floor: NaiveDateTime) -> Option<NaiveDateTime> {
    let mut cursor = Cursor::from(floor);
    if cursor.year < MIN_YEAR as i32 {
        cursor.set_year(MIN_YEAR as i32);
    }

    let mut current_year = cursor.year;
    let mut years = 1;

    loop {
        if cursor.year != current_year {
            current_year = cursor.year;
            years += 1;
        }
        if years > SEARCH_HORIZON_YEARS || cursor.year > MAX_YEAR as i32 {
            debug!(expression = %expression.as_str(), %floor, "no matching time within the search horizon");
            return None;
        }

        let year = cursor.year as FieldValue;
        if !expression.year.matches(year) {
            match expression.year.next_from(year + 1, MAX_YEAR) {
                Some(next) => {
                    trace!(year, next, "year doesn't match");
                    cursor.set_year(next as i32);
                    continue;
                }
                None => {
                    debug!(expression = %expression.as_str(), %floor, "no more matching years");
                    return None;
                }
            }
        }

        match expression.month.next_from(cursor.month, 12) {
            Some(month) if month == cursor.month => {}
            Some(month) => cursor.set_month(month),
            None => {
                cursor.inc_year();
                continue;
            }
        }

        let context = MonthContext::new(cursor.year, cursor.month);
        match (cursor.day..=context.last_day()).find(|day| expression.matches_day(*day, &context)) {
            Some(day) if day == cursor.day => {}
            Some(day) => cursor.set_day(day),
            None => {
                trace!(year = cursor.year, month = cursor.month, "no matching days in month");
                cursor.inc_month();
                continue;
            }
        }

        match expression.hour.next_from(cursor.hour, 23) {
            Some(hour) if hour == cursor.hour => {}
            Some(hour) => cursor.set_hour(hour),
            None => {
                cursor.inc_day();
                continue;
            }
        }

        match expression.minute.next_from(cursor.minute, 59) {
            Some(minute) if minute == cursor.minute => {}
            Some(minute) => cursor.set_minute(minute),
            None => {
                cursor.inc_hour();
                continue;
            }
        }

        match expression.second.next_from(cursor.second, 59) {
            Some(second) => cursor.second = second,
            None => {
                cursor.inc_minute();
                continue;
            }
        }

        return cursor.to_naive();
    }
}
