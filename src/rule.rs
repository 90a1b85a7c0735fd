//! Rule variants of the cron fields.
//!
//! Each family of fields has its own closed set of rules:
//! - [`ValueRule`] for seconds, minutes, hours, months and years;
//! - [`DayOfMonthRule`] for days of month;
//! - [`DayOfWeekRule`] for days of week.
//!
//! Day rules which depend on the particular month (`L`, `LW`, `L-n`, `nW`, `d#n`, `dL`)
//! resolve into a concrete day of the month with the help of [`MonthContext`].
use crate::{
    calendar::{FieldValue, MonthContext, SATURDAY, SUNDAY},
    error::TermError,
    field::FieldKind,
};
use std::fmt::Display;

/// Common behavior of the field rules.
pub(crate) trait Rule: Sized {
    /// Parses a single term (a comma-separated part) of the field.
    fn parse(kind: FieldKind, term: &str) -> Result<Self, TermError>;

    /// The rule is `*`.
    fn is_all(&self) -> bool;

    /// The rule is `?`.
    fn is_question_mark(&self) -> bool {
        false
    }
}

/// Rule of a day field, which may need the whole month to decide about a single day.
pub(crate) trait DayRule: Rule {
    fn matches(&self, day: FieldValue, context: &MonthContext) -> bool;
}

/// Values `start..=end` stepped by `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct StepRange {
    start: FieldValue,
    end: FieldValue,
    step: FieldValue,
}

impl StepRange {
    pub(crate) fn new(start: FieldValue, end: FieldValue, step: FieldValue) -> Self {
        debug_assert!(start <= end && step > 0);
        Self { start, end, step }
    }

    pub(crate) fn single(value: FieldValue) -> Self {
        Self::new(value, value, 1)
    }

    #[inline]
    pub(crate) fn matches(&self, value: FieldValue) -> bool {
        value >= self.start && value <= self.end && (value - self.start) % self.step == 0
    }

    /// Parses `*`, `*/s`, `a`, `a/s`, `a-b` and `a-b/s` terms, and `?/s` in the day fields.
    ///
    /// Open ranges (`*/s`, `a/s`) end at [`FieldKind::open_max`].
    pub(crate) fn parse(kind: FieldKind, term: &str) -> Result<Self, TermError> {
        let (min, _) = kind.min_max();
        let max = kind.open_max();
        let (base, step) = match term.split_once('/') {
            Some((base, step)) => (base, Some(step)),
            None => (term, None),
        };
        let value = |token: &str| kind.parse_value(token).map_err(|reason| TermError::new(term, reason));

        let (start, end, explicit_end) = if base == "*" || (base == "?" && step.is_some() && kind.is_day()) {
            (min, max, false)
        } else if let Some((first, last)) = base.split_once('-') {
            let start = value(first)?;
            let end = value(last)?;
            if start > end {
                return Err(TermError::new(
                    term,
                    format!("The first value {first} is higher than the last value {last}"),
                ));
            }
            (start, end, true)
        } else {
            let start = value(base)?;
            (start, if step.is_some() { max.max(start) } else { start }, false)
        };

        let Some(step) = step else {
            return Ok(Self::new(start, end, 1));
        };

        let step = match step.parse::<FieldValue>() {
            Ok(step) if step > 0 => step,
            _ => {
                return Err(TermError::new(
                    term,
                    format!("The step value must be a positive integer, got \"{step}\""),
                ))
            }
        };

        if explicit_end && step > end - start {
            return Err(TermError::new(
                term,
                format!(
                    "the step value {step} is higher than the range of {} {base}",
                    kind.unit()
                ),
            ));
        }

        Ok(Self::new(start, end, step))
    }
}

impl Display for StepRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // a step wider than the range leaves the start only
        if self.start == self.end || self.step > self.end - self.start {
            write!(f, "{}", self.start)
        } else if self.step == 1 {
            write!(f, "{}-{}", self.start, self.end)
        } else {
            write!(f, "{}-{}/{}", self.start, self.end, self.step)
        }
    }
}

/// Rule of a plain numeric field: second, minute, hour, month or year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum ValueRule {
    All,
    Range(StepRange),
}

impl ValueRule {
    #[inline]
    pub(crate) fn matches(&self, value: FieldValue) -> bool {
        match self {
            Self::All => true,
            Self::Range(range) => range.matches(value),
        }
    }
}

impl Rule for ValueRule {
    fn parse(kind: FieldKind, term: &str) -> Result<Self, TermError> {
        match term {
            "*" => Ok(Self::All),
            "?" => Err(question_mark_not_allowed()),
            _ => Ok(Self::Range(StepRange::parse(kind, term)?)),
        }
    }

    fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl Display for ValueRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "*"),
            Self::Range(range) => write!(f, "{range}"),
        }
    }
}

/// Rule of the day-of-month field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum DayOfMonthRule {
    All,
    QuestionMark,
    Range(StepRange),
    /// `L`
    Last,
    /// `LW`
    LastBusinessDay,
    /// `L-n`
    DaysBeforeEnd(FieldValue),
    /// `nW`
    NearestBusinessDay(FieldValue),
}

impl DayOfMonthRule {
    /// Concrete day of the month for the month-relative rules.
    ///
    /// Returns `None` for the value-based rules (`*`, `?`, ranges),
    /// and when the rule has no such day in the month.
    pub(crate) fn resolve(&self, context: &MonthContext) -> Option<FieldValue> {
        match self {
            Self::All | Self::QuestionMark | Self::Range(_) => None,
            Self::Last => Some(context.last_day()),
            Self::LastBusinessDay => Some(context.last_business_day()),
            Self::DaysBeforeEnd(days) => context.last_day().checked_sub(*days).filter(|day| *day >= 1),
            Self::NearestBusinessDay(day) => context.nearest_business_day(*day),
        }
    }
}

impl DayRule for DayOfMonthRule {
    fn matches(&self, day: FieldValue, context: &MonthContext) -> bool {
        match self {
            Self::All | Self::QuestionMark => true,
            Self::Range(range) => day <= context.last_day() && range.matches(day),
            _ => self.resolve(context) == Some(day),
        }
    }
}

impl Rule for DayOfMonthRule {
    fn parse(kind: FieldKind, term: &str) -> Result<Self, TermError> {
        match term {
            "*" => return Ok(Self::All),
            "?" => return Ok(Self::QuestionMark),
            _ => {}
        }

        let days_before_end = term
            .get(..2)
            .filter(|prefix| prefix.eq_ignore_ascii_case("L-"))
            .map(|_| &term[2..]);

        if term.eq_ignore_ascii_case("L") {
            Ok(Self::Last)
        } else if term.eq_ignore_ascii_case("LW") {
            Ok(Self::LastBusinessDay)
        } else if let Some(days) = days_before_end {
            match days.parse::<FieldValue>() {
                Ok(days) if (1..=30).contains(&days) => Ok(Self::DaysBeforeEnd(days)),
                _ => Err(TermError::new(
                    term,
                    format!("The days before the end of month {days} must be between 1 and 30"),
                )),
            }
        } else if let Some(day) = term.strip_suffix(|c: char| c == 'W' || c == 'w') {
            let day = kind.parse_value(day).map_err(|reason| TermError::new(term, reason))?;
            Ok(Self::NearestBusinessDay(day))
        } else {
            Ok(Self::Range(StepRange::parse(kind, term)?))
        }
    }

    fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    fn is_question_mark(&self) -> bool {
        matches!(self, Self::QuestionMark)
    }
}

impl Display for DayOfMonthRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "*"),
            Self::QuestionMark => write!(f, "?"),
            Self::Range(range) => write!(f, "{range}"),
            Self::Last => write!(f, "L"),
            Self::LastBusinessDay => write!(f, "LW"),
            Self::DaysBeforeEnd(days) => write!(f, "L-{days}"),
            Self::NearestBusinessDay(day) => write!(f, "{day}W"),
        }
    }
}

/// Rule of the day-of-week field.
///
/// Weekday numbers in the ranges are kept as written (`0..=7`, both `0` and `7` are Sunday),
/// weekdays of `NthWeekday` and `LastWeekday` are normalized to `0..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum DayOfWeekRule {
    All,
    QuestionMark,
    Range(StepRange),
    /// `d#n` or `1st-d`
    NthWeekday { weekday: FieldValue, n: FieldValue },
    /// `dL` or `last-d`
    LastWeekday(FieldValue),
}

impl DayOfWeekRule {
    const ORDINALS: [&str; 5] = ["1st-", "2nd-", "3rd-", "4th-", "5th-"];

    /// Concrete day of the month for the month-relative rules.
    ///
    /// Returns `None` for the value-based rules (`*`, `?`, ranges),
    /// and when the month has no such day, i.e. the fifth Monday of a short month.
    pub(crate) fn resolve(&self, context: &MonthContext) -> Option<FieldValue> {
        match self {
            Self::All | Self::QuestionMark | Self::Range(_) => None,
            Self::NthWeekday { weekday, n } => context.nth_weekday(*weekday, *n),
            Self::LastWeekday(weekday) => Some(context.last_weekday(*weekday)),
        }
    }

    fn parse_weekday(term: &str, token: &str) -> Result<FieldValue, TermError> {
        FieldKind::DayOfWeek
            .parse_value(token)
            .map(|weekday| weekday % 7)
            .map_err(|reason| TermError::new(term, reason))
    }
}

impl Rule for DayOfWeekRule {
    fn parse(kind: FieldKind, term: &str) -> Result<Self, TermError> {
        match term {
            "*" => return Ok(Self::All),
            "?" => return Ok(Self::QuestionMark),
            "L" | "l" => return Ok(Self::Range(StepRange::single(SATURDAY))),
            _ => {}
        }

        let lower = term.to_ascii_lowercase();
        if lower.starts_with("last-") {
            return Ok(Self::LastWeekday(Self::parse_weekday(term, &term["last-".len()..])?));
        }

        if let Some((n, prefix)) = Self::ORDINALS
            .iter()
            .enumerate()
            .find(|(_, prefix)| lower.starts_with(*prefix))
        {
            return Ok(Self::NthWeekday {
                weekday: Self::parse_weekday(term, &term[prefix.len()..])?,
                n: n as FieldValue + 1,
            });
        }

        if let Some((weekday, n)) = term.split_once('#') {
            let weekday = Self::parse_weekday(term, weekday)?;
            return match n.parse::<FieldValue>() {
                Ok(n) if (1..=5).contains(&n) => Ok(Self::NthWeekday { weekday, n }),
                _ => Err(TermError::new(
                    term,
                    format!("The weekday occurrence {n} must be between 1 and 5"),
                )),
            };
        }

        if let Some(weekday) = term.strip_suffix(|c: char| c == 'L' || c == 'l') {
            return Ok(Self::LastWeekday(Self::parse_weekday(term, weekday)?));
        }

        Ok(Self::Range(StepRange::parse(kind, term)?))
    }

    fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    fn is_question_mark(&self) -> bool {
        matches!(self, Self::QuestionMark)
    }
}

impl DayRule for DayOfWeekRule {
    fn matches(&self, day: FieldValue, context: &MonthContext) -> bool {
        match self {
            Self::All | Self::QuestionMark => true,
            Self::Range(range) => {
                let weekday = context.weekday(day);
                range.matches(weekday) || (weekday == SUNDAY && range.matches(7))
            }
            _ => self.resolve(context) == Some(day),
        }
    }
}

impl Display for DayOfWeekRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "*"),
            Self::QuestionMark => write!(f, "?"),
            Self::Range(range) => write!(f, "{range}"),
            Self::NthWeekday { weekday, n } => write!(f, "{weekday}#{n}"),
            Self::LastWeekday(weekday) => write!(f, "{weekday}L"),
        }
    }
}

fn question_mark_not_allowed() -> TermError {
    TermError::new(
        "?",
        "The question mark is only allowed in day_of_month and day_of_week",
    )
}
