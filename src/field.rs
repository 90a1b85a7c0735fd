use crate::{
    calendar::{FieldValue, MonthContext, SATURDAY},
    error::TermError,
    rule::{DayRule, Rule, ValueRule},
};
use std::fmt::Display;

/// Smallest year the year field accepts.
pub const MIN_YEAR: u32 = 1;
/// Largest year the year field accepts.
pub const MAX_YEAR: u32 = 9999;

/// Kind (position) of the cron expression field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum FieldKind {
    Second,
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
    Year,
}

impl FieldKind {
    const DAYS_OF_WEEK: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];
    const MONTHS: [&str; 12] = [
        "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
    ];

    /// All kinds in the order they appear in the expression.
    pub(crate) const ALL: [FieldKind; 7] = [
        Self::Second,
        Self::Minute,
        Self::Hour,
        Self::DayOfMonth,
        Self::Month,
        Self::DayOfWeek,
        Self::Year,
    ];

    /// 1-based position of the field in the expression.
    pub(crate) fn index(&self) -> usize {
        *self as usize + 1
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::DayOfMonth => "day_of_month",
            Self::Month => "month",
            Self::DayOfWeek => "day_of_week",
            Self::Year => "year",
        }
    }

    /// Plural unit name used in the messages.
    pub(crate) fn unit(&self) -> &'static str {
        match self {
            Self::Second => "seconds",
            Self::Minute => "minutes",
            Self::Hour => "hours",
            Self::DayOfMonth | Self::DayOfWeek => "days",
            Self::Month => "months",
            Self::Year => "years",
        }
    }

    pub(crate) fn min_max(&self) -> (FieldValue, FieldValue) {
        match self {
            Self::Second => (0, 59),
            Self::Minute => (0, 59),
            Self::Hour => (0, 23),
            Self::DayOfMonth => (1, 31),
            Self::Month => (1, 12),
            // both 0 and 7 are Sunday
            Self::DayOfWeek => (0, 7),
            Self::Year => (MIN_YEAR, MAX_YEAR),
        }
    }

    /// Upper bound of the open ranges `*/s` and `a/s`.
    pub(crate) fn open_max(&self) -> FieldValue {
        match self {
            // Sunday is counted at 0 already
            Self::DayOfWeek => SATURDAY,
            _ => self.min_max().1,
        }
    }

    /// Day of month or day of week.
    #[inline]
    pub(crate) fn is_day(&self) -> bool {
        matches!(self, Self::DayOfMonth | Self::DayOfWeek)
    }

    /// Converts single numeric or mnemonic value into a number, with bounds validation.
    ///
    /// Returns the reason of the failure as an error.
    pub(crate) fn parse_value(&self, input: &str) -> Result<FieldValue, String> {
        let (min, max) = self.min_max();

        if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) {
            return match input.parse::<FieldValue>() {
                Ok(value) if value >= min && value <= max => Ok(value),
                _ => Err(format!(
                    "The value {input} is out of range for {} ({min}-{max})",
                    self.name()
                )),
            };
        }

        match self {
            Self::DayOfWeek => parse_string_value(input, &Self::DAYS_OF_WEEK)
                .ok_or_else(|| format!("Invalid weekday name \"{input}\"")),
            Self::Month => parse_string_value(input, &Self::MONTHS)
                .map(|value| value + 1)
                .ok_or_else(|| format!("Invalid month name \"{input}\"")),
            _ => Err(format!("Invalid value \"{input}\"")),
        }
    }
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Converts string with mnemonic value representation into its index in `values`.
fn parse_string_value(input: &str, values: &[&str]) -> Option<FieldValue> {
    if input.is_empty() {
        None
    } else {
        values
            .iter()
            .position(|x| x.eq_ignore_ascii_case(input))
            .map(|i| i as FieldValue)
    }
}

/// Ordered set of terms of a single field, matched with OR semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CronField<R> {
    terms: Vec<R>,
}

impl<R: Rule> CronField<R> {
    /// Splits the field on commas and parses each term in isolation.
    ///
    /// Every term is parsed, the first failure (in the order of terms) is returned.
    pub(crate) fn parse(kind: FieldKind, input: &str) -> Result<Self, TermError> {
        let results = input
            .split(',')
            .map(|term| match term {
                "" => Err(TermError::unrecognized(term)),
                term => R::parse(kind, term),
            })
            .collect::<Vec<_>>();

        let mut terms = Vec::with_capacity(results.len());
        for result in results {
            terms.push(result?);
        }

        if terms.len() > 1 && terms.iter().any(Rule::is_question_mark) {
            return Err(TermError::new(
                "?",
                "The question mark cannot be combined with other values",
            ));
        }

        Ok(Self { terms })
    }

    /// The field is a single `?`.
    pub(crate) fn is_question_mark(&self) -> bool {
        self.terms.len() == 1 && self.terms[0].is_question_mark()
    }

    /// The field doesn't narrow anything down: `*` or `?`.
    pub(crate) fn is_unrestricted(&self) -> bool {
        self.terms.iter().all(|term| term.is_question_mark() || term.is_all())
    }
}

impl CronField<ValueRule> {
    #[inline]
    pub(crate) fn matches(&self, value: FieldValue) -> bool {
        self.terms.iter().any(|term| term.matches(value))
    }

    /// Smallest matching value in `start..=max`.
    pub(crate) fn next_from(&self, start: FieldValue, max: FieldValue) -> Option<FieldValue> {
        (start..=max).find(|value| self.matches(*value))
    }
}

impl<R: DayRule> CronField<R> {
    #[inline]
    pub(crate) fn matches_day(&self, day: FieldValue, context: &MonthContext) -> bool {
        self.terms.iter().any(|term| term.matches(day, context))
    }
}

impl<R: Display> Display for CronField<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let terms = self.terms.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(",");
        write!(f, "{terms}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{DayOfMonthRule, DayOfWeekRule, StepRange};
    use rstest::rstest;

    #[rstest]
    #[case(FieldKind::Second, "0", 0)]
    #[case(FieldKind::Second, "59", 59)]
    #[case(FieldKind::Second, "05", 5)]
    #[case(FieldKind::Minute, "33", 33)]
    #[case(FieldKind::Hour, "23", 23)]
    #[case(FieldKind::DayOfMonth, "1", 1)]
    #[case(FieldKind::DayOfMonth, "31", 31)]
    #[case(FieldKind::Month, "12", 12)]
    #[case(FieldKind::Month, "Jan", 1)]
    #[case(FieldKind::Month, "JUN", 6)]
    #[case(FieldKind::Month, "dec", 12)]
    #[case(FieldKind::DayOfWeek, "0", 0)]
    #[case(FieldKind::DayOfWeek, "7", 7)]
    #[case(FieldKind::DayOfWeek, "Sun", 0)]
    #[case(FieldKind::DayOfWeek, "mon", 1)]
    #[case(FieldKind::DayOfWeek, "SAT", 6)]
    #[case(FieldKind::Year, "1", 1)]
    #[case(FieldKind::Year, "2021", 2021)]
    #[case(FieldKind::Year, "9999", 9999)]
    fn test_parse_valid_value(#[case] kind: FieldKind, #[case] input: &str, #[case] expected: FieldValue) {
        assert_eq!(kind.parse_value(input), Ok(expected), "kind = {kind}, input = {input}");
    }

    #[rstest]
    #[case(FieldKind::Second, "60", "The value 60 is out of range for second (0-59)")]
    #[case(FieldKind::Minute, "99999999999", "The value 99999999999 is out of range for minute (0-59)")]
    #[case(FieldKind::Hour, "24", "The value 24 is out of range for hour (0-23)")]
    #[case(FieldKind::Hour, "-1", "Invalid value \"-1\"")]
    #[case(FieldKind::DayOfMonth, "0", "The value 0 is out of range for day_of_month (1-31)")]
    #[case(FieldKind::Month, "13", "The value 13 is out of range for month (1-12)")]
    #[case(FieldKind::Month, "ja", "Invalid month name \"ja\"")]
    #[case(FieldKind::Month, "", "Invalid month name \"\"")]
    #[case(FieldKind::DayOfWeek, "8", "The value 8 is out of range for day_of_week (0-7)")]
    #[case(FieldKind::DayOfWeek, "bla", "Invalid weekday name \"bla\"")]
    #[case(FieldKind::DayOfWeek, "M@n", "Invalid weekday name \"M@n\"")]
    #[case(FieldKind::Year, "0", "The value 0 is out of range for year (1-9999)")]
    #[case(FieldKind::Year, "abc", "Invalid value \"abc\"")]
    fn test_parse_invalid_value(#[case] kind: FieldKind, #[case] input: &str, #[case] reason: &str) {
        assert_eq!(kind.parse_value(input), Err(reason.to_owned()));
    }

    #[test]
    fn test_kind_positions_and_names() {
        let names = FieldKind::ALL.iter().map(|k| (k.index(), k.name())).collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                (1, "second"),
                (2, "minute"),
                (3, "hour"),
                (4, "day_of_month"),
                (5, "month"),
                (6, "day_of_week"),
                (7, "year"),
            ]
        );
    }

    #[test]
    fn test_parse_string_value() {
        let months = &["jan", "feb", "mar"];
        assert_eq!(parse_string_value("feb", months), Some(1));
        assert_eq!(parse_string_value("FEB", months), Some(1));
        assert_eq!(parse_string_value("dec", months), None);
        assert_eq!(parse_string_value("", months), None);
        assert_eq!(parse_string_value(" feb", months), None);
    }

    #[test]
    fn test_parse_list() {
        let field = CronField::<ValueRule>::parse(FieldKind::Minute, "3,1,10-20/5,*/30").unwrap();
        assert_eq!(
            field.terms,
            &[
                ValueRule::Range(StepRange::single(3)),
                ValueRule::Range(StepRange::single(1)),
                ValueRule::Range(StepRange::new(10, 20, 5)),
                ValueRule::Range(StepRange::new(0, 59, 30)),
            ]
        );
        assert_eq!(field.next_from(0, 59), Some(0));
        assert_eq!(field.next_from(4, 59), Some(10));
        assert_eq!(field.next_from(21, 59), Some(30));
        assert_eq!(field.next_from(31, 59), None);
        assert_eq!(field.to_string(), "3,1,10-20/5,0-59/30");
    }

    #[test]
    fn test_parse_reports_first_failed_term() {
        let error = CronField::<ValueRule>::parse(FieldKind::Hour, "1,25,bla").unwrap_err();
        assert_eq!(error.sequence, "25");
        assert_eq!(error.reasons, vec!["The value 25 is out of range for hour (0-23)".to_owned()]);
    }

    #[rstest]
    #[case("1,,2")]
    #[case(",")]
    #[case("5,")]
    fn test_parse_empty_term(#[case] input: &str) {
        let error = CronField::<ValueRule>::parse(FieldKind::Second, input).unwrap_err();
        assert_eq!(error.sequence, "");
        assert_eq!(error.reasons, vec!["Unrecognized sequence \"\"".to_owned()]);
    }

    #[rstest]
    #[case("?,1")]
    #[case("1,?")]
    #[case("?,?")]
    fn test_question_mark_in_list(#[case] input: &str) {
        let error = CronField::<DayOfMonthRule>::parse(FieldKind::DayOfMonth, input).unwrap_err();
        assert_eq!(error.sequence, "?");
        assert_eq!(error.reasons[0], "The question mark cannot be combined with other values");

        let error = CronField::<DayOfWeekRule>::parse(FieldKind::DayOfWeek, input).unwrap_err();
        assert_eq!(error.reasons[0], "The question mark cannot be combined with other values");
    }

    #[rstest]
    #[case("*", false, true)]
    #[case("?", true, true)]
    #[case("L", false, false)]
    #[case("1,*", false, false)]
    fn test_unrestricted(#[case] input: &str, #[case] question_mark: bool, #[case] unrestricted: bool) {
        let field = CronField::<DayOfMonthRule>::parse(FieldKind::DayOfMonth, input).unwrap();
        assert_eq!(field.is_question_mark(), question_mark);
        assert_eq!(field.is_unrestricted(), unrestricted);
    }
}
