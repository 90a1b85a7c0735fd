//! Quartz-style crontab trigger: 7-field cron expression parser and next fire time calculator.
#![deny(unsafe_code, missing_docs)]

//! This crate is intended to:
//! - parse and validate Quartz-style cron expressions with seconds and years;
//! - calculate the next time such an expression fires in a particular timezone,
//!   correctly across month and year boundaries, leap years and daylight saving time transitions.
//!
//! _This is not a jobs scheduler or runner._ The trigger is a pure computation,
//! a scheduler asks it for the next fire time and decides what to do with it.
//!
//! ## Cron expression format
//!
//! Expression has 7 fields: seconds, minutes, hours, days of month, months, days of week and years.
//! Trailing fields may be omitted:
//! - if 6 fields are specified, _years_ is `*`;
//! - if 5 fields are specified, both _days of week_ and _years_ are `*`.
//!
//! The table below describes valid values and patterns of each field:
//!
//! | Field        | Allowed values           | Allowed special characters         |
//! |--------------|--------------------------|------------------------------------|
//! | Seconds      | 0-59                     | * , - /                            |
//! | Minutes      | 0-59                     | * , - /                            |
//! | Hours        | 0-23                     | * , - /                            |
//! | Day of Month | 1-31                     | * , - / ? L LW L-n nW              |
//! | Month        | 1-12 or JAN-DEC          | * , - /                            |
//! | Day of Week  | 0-7 or SUN-SAT (0, 7 - Sunday) | * , - / ? L # 1st-..5th- last- |
//! | Year         | 1-9999                   | * , - /                            |
//!
//! Patterns meanings:
//! - `*` - each possible value, i.e. `0,1,2,...,59` for minutes;
//! - `,` - list of values or patterns, i.e. `1,7,12`, `SUN,FRI`;
//! - `-` - range of values, i.e. `0-15`, `JAN-MAR`;
//! - `/` - repeating values, i.e. `*/12`, `10/5`, `30-59/2`; in days of week `*/n` and `d/n` end on Saturday,
//!   so `mon/2` is Monday, Wednesday and Friday;
//! - `?` - for days of month or week means that the value doesn't matter, the other day field decides,
//!   `?/n` is the same as `*/n`;
//! - `L` - the last day of the month (day of month), or Saturday (day of week);
//! - `LW` - the last business day (Monday to Friday) of the month;
//! - `L-n` - `n` days before the last day of the month, i.e. `L-5`;
//! - `nW` - the business day nearest to the day `n` within the same month, i.e. `15W`;
//! - `d#n`, `1st-d`..`5th-d` - the `n`-th particular day of week of the month, i.e. `mon#1`, `2nd-wed`;
//! - `dL`, `last-d` - the last particular day of week of the month, i.e. `5L`, `thuL`, `last-thu`.
//!
//! Names are case-insensitive. If both day fields are restricted (none of them is `*` or `?`),
//! a day matches if it satisfies **either** of them, as in Quartz.
//!
//! Aliases `@yearly`, `@annually`, `@monthly`, `@weekly`, `@daily`, `@midnight` and `@hourly` are accepted as well.
//!
//! ## Daylight saving time
//!
//! Expressions are evaluated in wall-clock time of the trigger's timezone:
//! - wall-clock times skipped by a spring-forward transition never fire,
//!   the search goes on from the first existing time after the gap;
//! - wall-clock times repeated by a fall-back transition fire once, at the earlier occurrence.
//!
//! ## How to use
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use cron_trigger::{CronTabTrigger, Result};
//!
//! fn last_day_of_month() -> Result<()> {
//!     let start = Utc.with_ymd_and_hms(2021, 9, 19, 0, 0, 0).unwrap();
//!     let trigger = CronTabTrigger::new("0 0 0 L * ? *", start, None, Some("Europe/Berlin"))?;
//!
//!     let next = trigger.next_fire_time(None, &start).unwrap();
//!     assert_eq!(next.to_rfc3339(), "2021-09-30T00:00:00+02:00");
//!
//!     // The following fire times, each one after the previous one
//!     trigger.iter(&start).take(10).for_each(|t| println!("next: {t}"));
//!
//!     Ok(())
//! }
//! # last_day_of_month().unwrap();
//! ```
//!
//! # Feature flags
//! * `serde` (default): adds [`Serialize`](https://docs.rs/serde/latest/serde/trait.Serialize.html) and
//!   [`Deserialize`](https://docs.rs/serde/latest/serde/trait.Deserialize.html) trait implementations
//!   for [`CronExpression`] (as a string) and [`CronTabTrigger`] (as its constructor arguments).

mod calendar;
/// Crate specific Error implementation.
pub mod error;
/// Cron expression parser.
pub mod expression;
mod field;
mod rule;
mod search;
mod timezone;
/// Crontab trigger and its fire time calculation.
pub mod trigger;

// Re-export of public entities.
pub use error::CronParserError;
pub use expression::CronExpression;
pub use field::{MAX_YEAR, MIN_YEAR};
pub use search::SEARCH_HORIZON_YEARS;
pub use trigger::CronTabTrigger;

/// Convenient alias for `Result`.
pub type Result<T, E = CronParserError> = std::result::Result<T, E>;
