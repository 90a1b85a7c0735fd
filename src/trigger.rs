use crate::{
    error::{CronParserError, TermError},
    expression::CronExpression,
    search,
    timezone::{self, Resolution},
    Result,
};
use chrono::{DateTime, TimeDelta, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use tracing::debug;

/// Upper bound of the attempts to place a matched wall-clock time into the timezone.
const MAX_RESOLVE_ATTEMPTS: usize = 16;

/// Trigger which fires according to a cron expression in a particular timezone.
///
/// The trigger is immutable: it's created once from the expression string, the start bound,
/// the optional end bound and the IANA timezone name (`UTC` if omitted),
/// and then it's queried with [`CronTabTrigger::next_fire_time`] as many times as needed.
///
/// With the `serde` feature, the trigger is (de)serialized as its constructor arguments:
/// the original expression text, the bounds and the timezone name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "TriggerState"))]
#[cfg_attr(feature = "serde", serde(into = "TriggerState"))]
pub struct CronTabTrigger {
    expression: CronExpression,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    timezone: Tz,
}

impl CronTabTrigger {
    /// Parses the `expression` and constructs the trigger.
    ///
    /// Returns [`CronParserError`] if the expression is invalid or the `timezone` is unknown;
    /// the latter is reported as the field `timezone` with index `0`.
    pub fn new<T: TimeZone>(
        expression: impl Into<String>,
        start_date: DateTime<T>,
        end_date: Option<DateTime<T>>,
        timezone: Option<&str>,
    ) -> Result<Self> {
        let expression = CronExpression::new(expression)?;
        let timezone = match timezone {
            None => Tz::UTC,
            Some(name) => name.parse::<Tz>().map_err(|_| {
                CronParserError::new(
                    expression.as_str(),
                    0,
                    "timezone",
                    TermError::new(name, format!("Unknown timezone \"{name}\"")),
                )
            })?,
        };

        let trigger = Self {
            expression,
            start_date: start_date.with_timezone(&Utc),
            end_date: end_date.map(|end_date| end_date.with_timezone(&Utc)),
            timezone,
        };

        debug!(
            expression = %trigger.expression.as_str(),
            start_date = %trigger.start_date,
            end_date = ?trigger.end_date,
            timezone = %trigger.timezone,
            "crontab trigger created"
        );

        Ok(trigger)
    }

    /// Returns the next time the trigger fires.
    ///
    /// The search starts at the latest of `now` and the start bound. If `previous_fire_time`
    /// isn't earlier than that, the search starts one second after it, so the same time
    /// is never returned twice in a row. Fractions of a second are rounded up.
    ///
    /// Returns `None` if the schedule is exhausted or the next fire time is beyond the end bound.
    pub fn next_fire_time<T: TimeZone>(
        &self,
        previous_fire_time: Option<&DateTime<T>>,
        now: &DateTime<T>,
    ) -> Option<DateTime<Tz>> {
        let mut floor = now.with_timezone(&Utc).max(self.start_date);
        if let Some(previous) = previous_fire_time.map(|previous| previous.with_timezone(&Utc)) {
            if previous >= floor {
                floor = previous.with_nanosecond(0)?.checked_add_signed(TimeDelta::seconds(1))?;
            }
        }

        self.next_from(ceil_to_second(floor)?)
    }

    /// Returns iterator of fire times starting from `now`.
    ///
    /// Each item is the next fire time after the previous item.
    #[inline]
    pub fn iter<T: TimeZone>(&self, now: &DateTime<T>) -> impl Iterator<Item = DateTime<Tz>> + '_ {
        FireTimes {
            trigger: self,
            next: self.next_fire_time(None, now),
        }
    }

    /// Parsed expression of the trigger.
    pub fn expression(&self) -> &CronExpression {
        &self.expression
    }

    /// Start bound: the trigger never fires earlier.
    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    /// Optional end bound: the trigger never fires later.
    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    /// Timezone the expression is evaluated in.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    fn next_from(&self, floor: DateTime<Utc>) -> Option<DateTime<Tz>> {
        let mut local = floor.with_timezone(&self.timezone).naive_local();

        for _ in 0..MAX_RESOLVE_ATTEMPTS {
            let candidate = search::next_match(&self.expression, local)?;
            match timezone::resolve(&self.timezone, candidate, &floor) {
                Resolution::Fire(fire) => {
                    return match self.end_date {
                        Some(end_date) if fire > end_date => {
                            debug!(expression = %self.expression.as_str(), %fire, %end_date, "next fire time is beyond the end date");
                            None
                        }
                        _ => Some(fire),
                    };
                }
                Resolution::Retry(next) => local = next,
                Resolution::Skip => local = candidate.checked_add_signed(TimeDelta::seconds(1))?,
            }
        }

        debug!(expression = %self.expression.as_str(), %floor, "unable to place the fire time into the timezone");
        None
    }
}

/// Rounds up to the whole second.
fn ceil_to_second(value: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if value.nanosecond() == 0 {
        Some(value)
    } else {
        value.with_nanosecond(0)?.checked_add_signed(TimeDelta::seconds(1))
    }
}

/// Contains iterator state.
#[derive(Debug, Clone)]
struct FireTimes<'a> {
    trigger: &'a CronTabTrigger,
    next: Option<DateTime<Tz>>,
}

impl Iterator for FireTimes<'_> {
    type Item = DateTime<Tz>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = self.trigger.next_fire_time(Some(&current), &current);
        Some(current)
    }
}

/// Constructor arguments of the trigger, its serialized form.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct TriggerState {
    expression: String,
    start_date: DateTime<Utc>,
    #[serde(default)]
    end_date: Option<DateTime<Utc>>,
    timezone: String,
}

#[cfg(feature = "serde")]
impl TryFrom<TriggerState> for CronTabTrigger {
    type Error = CronParserError;

    fn try_from(value: TriggerState) -> Result<Self> {
        Self::new(value.expression, value.start_date, value.end_date, Some(&value.timezone))
    }
}

#[cfg(feature = "serde")]
impl From<CronTabTrigger> for TriggerState {
    fn from(value: CronTabTrigger) -> Self {
        Self {
            expression: value.expression.into(),
            start_date: value.start_date,
            end_date: value.end_date,
            timezone: value.timezone.name().to_owned(),
        }
    }
}
