use crate::{
    calendar::{FieldValue, MonthContext},
    error::{CronParserError, TermError},
    field::{CronField, FieldKind},
    rule::{DayOfMonthRule, DayOfWeekRule, Rule, ValueRule},
    Result,
};
use std::{fmt::Display, str::FromStr};

/// Which of the day fields decides whether a day matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum DaySelector {
    /// Both day fields are `*` or `?`.
    Any,
    /// Day of week is deferred (`?` or `*`).
    DayOfMonth,
    /// Day of month is deferred (`?` or `*`).
    DayOfWeek,
    /// Both fields are restricted, a day matches if either of them does.
    Either,
}

/// Parsed and validated 7-field cron expression.
///
/// Fields are `second minute hour day_of_month month day_of_week year`.
/// Expressions with 5 or 6 fields are completed with `*` up to 7 fields,
/// and a few aliases are accepted as well:
///
/// | Alias                    | Expression        |
/// |--------------------------|-------------------|
/// | `@yearly`, `@annually`   | `0 0 0 1 1 ? *`   |
/// | `@monthly`               | `0 0 0 1 * ? *`   |
/// | `@weekly`                | `0 0 0 ? * 0 *`   |
/// | `@daily`, `@midnight`    | `0 0 0 * * ? *`   |
/// | `@hourly`                | `0 0 * * * ? *`   |
///
/// The expression keeps the original text it was parsed from, see [`CronExpression::as_str`],
/// and renders a normalized spelling with [`Display`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String"))]
#[cfg_attr(feature = "serde", serde(into = "String"))]
pub struct CronExpression {
    source: String,
    pub(crate) second: CronField<ValueRule>,
    pub(crate) minute: CronField<ValueRule>,
    pub(crate) hour: CronField<ValueRule>,
    pub(crate) day_of_month: CronField<DayOfMonthRule>,
    pub(crate) month: CronField<ValueRule>,
    pub(crate) day_of_week: CronField<DayOfWeekRule>,
    pub(crate) year: CronField<ValueRule>,
    days: DaySelector,
}

impl CronExpression {
    /// Parses and validates provided `expression`.
    ///
    /// Returns [`CronParserError`] pointing to the first invalid field and term.
    pub fn new(expression: impl Into<String>) -> Result<Self> {
        let source = expression.into();
        let fields = split_fields(&source)?;

        let second = parse_field(&source, &fields, FieldKind::Second)?;
        let minute = parse_field(&source, &fields, FieldKind::Minute)?;
        let hour = parse_field(&source, &fields, FieldKind::Hour)?;
        let day_of_month = parse_field::<DayOfMonthRule>(&source, &fields, FieldKind::DayOfMonth)?;
        let month = parse_field(&source, &fields, FieldKind::Month)?;
        let day_of_week = parse_field::<DayOfWeekRule>(&source, &fields, FieldKind::DayOfWeek)?;
        let year = parse_field(&source, &fields, FieldKind::Year)?;

        if day_of_month.is_question_mark() && day_of_week.is_question_mark() {
            return Err(field_error(
                &source,
                FieldKind::DayOfWeek,
                TermError::new(
                    "?",
                    "The question mark cannot be used in both day_of_month and day_of_week",
                ),
            ));
        }

        let days = match (day_of_month.is_unrestricted(), day_of_week.is_unrestricted()) {
            (true, true) => DaySelector::Any,
            (false, true) => DaySelector::DayOfMonth,
            (true, false) => DaySelector::DayOfWeek,
            (false, false) => DaySelector::Either,
        };

        Ok(Self {
            source,
            second,
            minute,
            hour,
            day_of_month,
            month,
            day_of_week,
            year,
            days,
        })
    }

    /// Original text of the expression.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns `true` if the day of the month satisfies day fields of the expression.
    pub(crate) fn matches_day(&self, day: FieldValue, context: &MonthContext) -> bool {
        match self.days {
            DaySelector::Any => true,
            DaySelector::DayOfMonth => self.day_of_month.matches_day(day, context),
            DaySelector::DayOfWeek => self.day_of_week.matches_day(day, context),
            DaySelector::Either => {
                self.day_of_month.matches_day(day, context) || self.day_of_week.matches_day(day, context)
            }
        }
    }
}

/// Splits the expression into 7 fields, expanding aliases and filling in omitted trailing fields.
fn split_fields(source: &str) -> Result<Vec<&str>> {
    let mut fields: Vec<&str> = source.split_whitespace().collect();

    if let [alias] = fields.as_slice() {
        if alias.starts_with('@') {
            let expanded = match alias.to_ascii_lowercase().as_str() {
                "@yearly" | "@annually" => "0 0 0 1 1 ? *",
                "@monthly" => "0 0 0 1 * ? *",
                "@weekly" => "0 0 0 ? * 0 *",
                "@daily" | "@midnight" => "0 0 0 * * ? *",
                "@hourly" => "0 0 * * * ? *",
                _ => return Err(field_error(source, FieldKind::Second, TermError::unrecognized(alias))),
            };
            return Ok(expanded.split_whitespace().collect());
        }
    }

    match fields.len() {
        5 | 6 => fields.resize(7, "*"),
        7 => {}
        count if count < 5 => {
            return Err(field_error(
                source,
                FieldKind::ALL[count],
                TermError::new("", format!("The expression must have from 5 to 7 fields, got {count}")),
            ))
        }
        count => {
            return Err(CronParserError::new(
                source,
                FieldKind::ALL.len() + 1,
                "unexpected",
                TermError::new(
                    fields[FieldKind::ALL.len()],
                    format!("The expression must have from 5 to 7 fields, got {count}"),
                ),
            ))
        }
    }

    Ok(fields)
}

fn parse_field<R: Rule>(source: &str, fields: &[&str], kind: FieldKind) -> Result<CronField<R>> {
    CronField::parse(kind, fields[kind.index() - 1]).map_err(|failure| field_error(source, kind, failure))
}

fn field_error(source: &str, kind: FieldKind, failure: TermError) -> CronParserError {
    CronParserError::new(source, kind.index(), kind.name(), failure)
}

impl Display for CronExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.second, self.minute, self.hour, self.day_of_month, self.month, self.day_of_week, self.year
        )
    }
}

impl From<CronExpression> for String {
    fn from(value: CronExpression) -> Self {
        value.source
    }
}

impl From<&CronExpression> for String {
    fn from(value: &CronExpression) -> Self {
        value.source.clone()
    }
}

impl TryFrom<String> for CronExpression {
    type Error = CronParserError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&String> for CronExpression {
    type Error = CronParserError;

    fn try_from(value: &String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for CronExpression {
    type Error = CronParserError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl FromStr for CronExpression {
    type Err = CronParserError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0 0 0 L * ? *", "0 0 0 L * ? *")]
    #[case("0 0 0 ? * mon-tue *", "0 0 0 ? * 1-2 *")]
    #[case("0 0 0 ? jan,Mar * 2021", "0 0 0 ? 1,3 * 2021")]
    #[case("0 0 0 ? AUG-dec/2 sun-sat *", "0 0 0 ? 8-12/2 0-6 *")]
    #[case("0 0 12 15W * ? 2021-2030/2", "0 0 12 15W * ? 2021-2030/2")]
    #[case("0 30 10 ? * 2#3,thuL *", "0 30 10 ? * 2#3,4L *")]
    #[case("0 30 10 ? * 1st-mon,last-fri *", "0 30 10 ? * 1#1,5L *")]
    #[case("0 0 0 L-3,LW * ? *", "0 0 0 L-3,LW * ? *")]
    #[case("*/20 0/15 * * * ? *", "0-59/20 0-59/15 * * * ? *")]
    #[case("0 */5 * * * *", "0 0-59/5 * * * * *")]
    #[case("0 0 0 ? * mon/2 *", "0 0 0 ? * 1-6/2 *")]
    #[case("0 0 0 ? * ?/1 *", "0 0 0 ? * 0-6 *")]
    #[case("0 0 0 ?/10 * ? *", "0 0 0 1-31/10 * ? *")]
    #[case("0 0 * * *", "0 0 * * * * *")]
    #[case("  0   0 0 1 *  ?  * ", "0 0 0 1 * ? *")]
    #[case("@yearly", "0 0 0 1 1 ? *")]
    #[case("@ANNUALLY", "0 0 0 1 1 ? *")]
    #[case("@monthly", "0 0 0 1 * ? *")]
    #[case("@weekly", "0 0 0 ? * 0 *")]
    #[case("@daily", "0 0 0 * * ? *")]
    #[case("@midnight", "0 0 0 * * ? *")]
    #[case("@hourly", "0 0 * * * ? *")]
    fn test_canonical_display(#[case] expression: &str, #[case] expected: &str) {
        let parsed = CronExpression::new(expression).unwrap();
        assert_eq!(parsed.to_string(), expected, "expression = {expression}");
        assert_eq!(parsed.as_str(), expression);

        // normalized spelling is stable under re-parse
        let reparsed = CronExpression::new(parsed.to_string()).unwrap();
        assert_eq!(reparsed.to_string(), expected);
    }

    #[rstest]
    #[case("0 0 0 ? * * *", DaySelector::Any)]
    #[case("0 0 0 * * ? *", DaySelector::Any)]
    #[case("0 0 0 * * * *", DaySelector::Any)]
    #[case("0 0 0 L * ? *", DaySelector::DayOfMonth)]
    #[case("0 0 0 15 * * *", DaySelector::DayOfMonth)]
    #[case("0 0 0 ? * mon *", DaySelector::DayOfWeek)]
    #[case("0 0 0 * * mon *", DaySelector::DayOfWeek)]
    #[case("0 0 0 15 * mon *", DaySelector::Either)]
    fn test_day_selector(#[case] expression: &str, #[case] expected: DaySelector) {
        assert_eq!(CronExpression::new(expression).unwrap().days, expected);
    }

    #[test]
    fn test_either_day_field_matches() {
        let expression = CronExpression::new("0 0 0 15 * mon *").unwrap();
        // November 2021: 1st is Monday, 15th is Monday too, 16th is Tuesday
        let november = MonthContext::new(2021, 11);
        let matched = (1..=november.last_day())
            .filter(|day| expression.matches_day(*day, &november))
            .collect::<Vec<_>>();
        assert_eq!(matched, vec![1, 8, 15, 22, 29]);

        // December 2021: 15th is Wednesday
        let december = MonthContext::new(2021, 12);
        let matched = (1..=december.last_day())
            .filter(|day| expression.matches_day(*day, &december))
            .collect::<Vec<_>>();
        assert_eq!(matched, vec![6, 13, 15, 20, 27]);
    }

    #[rstest]
    #[case("0 0 0 ? * ? *", 6, "day_of_week", "?", "The question mark cannot be used in both day_of_month and day_of_week")]
    #[case("0 0 0 1,? * * *", 4, "day_of_month", "?", "The question mark cannot be combined with other values")]
    #[case("0 0 ? * * * *", 3, "hour", "?", "The question mark is only allowed in day_of_month and day_of_week")]
    #[case("0 0 0 * * * ?", 7, "year", "?", "The question mark is only allowed in day_of_month and day_of_week")]
    #[case("60 0 0 * * ? *", 1, "second", "60", "The value 60 is out of range for second (0-59)")]
    #[case("0 0 0 * foo ? *", 5, "month", "foo", "Invalid month name \"foo\"")]
    #[case("0 0 0 * * ? 0", 7, "year", "0", "The value 0 is out of range for year (1-9999)")]
    #[case("0 0 0 32 * ? *", 4, "day_of_month", "32", "The value 32 is out of range for day_of_month (1-31)")]
    #[case("0 0 0 1,,2 * ? *", 4, "day_of_month", "", "Unrecognized sequence \"\"")]
    #[case("@every", 1, "second", "@every", "Unrecognized sequence \"@every\"")]
    #[case("", 1, "second", "", "The expression must have from 5 to 7 fields, got 0")]
    #[case("* * * *", 5, "month", "", "The expression must have from 5 to 7 fields, got 4")]
    #[case("* * * * * * * *", 8, "unexpected", "*", "The expression must have from 5 to 7 fields, got 8")]
    fn test_parse_errors(
        #[case] expression: &str,
        #[case] field_index: usize,
        #[case] field_name: &str,
        #[case] sequence: &str,
        #[case] reason: &str,
    ) {
        let error = CronExpression::new(expression).unwrap_err();
        assert_eq!(error.expression, expression);
        assert_eq!(error.field_index, field_index, "expression = {expression}");
        assert_eq!(error.field_name, field_name, "expression = {expression}");
        assert_eq!(error.sequence, sequence, "expression = {expression}");
        assert_eq!(error.reasons, vec![reason.to_owned()], "expression = {expression}");
    }

    #[test]
    fn test_conversions() {
        let expression = "0 0 0 ? * mon-fri *";
        let from_str: CronExpression = expression.parse().unwrap();
        let try_from_str = CronExpression::try_from(expression).unwrap();
        let try_from_string = CronExpression::try_from(expression.to_owned()).unwrap();

        assert_eq!(from_str, try_from_str);
        assert_eq!(from_str, try_from_string);
        assert_eq!(String::from(&from_str), expression);
        assert_eq!(String::from(from_str), expression);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde() {
        let expression = CronExpression::new("0 0 0 L-5 * ? *").unwrap();
        let json = serde_json::to_string(&expression).unwrap();
        assert_eq!(json, "\"0 0 0 L-5 * ? *\"");

        let deserialized: CronExpression = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, expression);

        let invalid = serde_json::from_str::<CronExpression>("\"0 0 0 ? * mon-tue/7 *\"");
        assert!(invalid.is_err());
    }
}
