use chrono::{TimeZone, Utc};
use cron_trigger::{CronExpression, CronParserError, CronTabTrigger};
use rstest::rstest;

#[rstest]
#[case(
    "0 0 0 ? * mon-tue/7 *",
    "mon-tue/7",
    "the step value 7 is higher than the range of days mon-tue"
)]
#[case(
    "0 0 0 ? * mon-tue/55 *",
    "mon-tue/55",
    "the step value 55 is higher than the range of days mon-tue"
)]
#[case(
    "0 0 0 ? * 4-sat/55 *",
    "4-sat/55",
    "the step value 55 is higher than the range of days 4-sat"
)]
#[case("0 0 0 ? * bla-blu/55 *", "bla-blu/55", "Invalid weekday name \"bla\"")]
#[case("0 0 0 ? * 7-1/55 *", "7-1/55", "The first value 7 is higher than the last value 1")]
#[case("0 0 0 ? * ? *", "?", "The question mark cannot be used in both day_of_month and day_of_week")]
#[case("0 0 0 ? * mon#6 *", "mon#6", "The weekday occurrence 6 must be between 1 and 5")]
#[case("0 0 0 ? * 8 *", "8", "The value 8 is out of range for day_of_week (0-7)")]
fn test_day_of_week_errors(#[case] expression: &str, #[case] sequence: &str, #[case] reason: &str) {
    let error = CronExpression::new(expression).unwrap_err();

    assert_eq!(error.expression, expression);
    assert_eq!(error.field_index, 6);
    assert_eq!(error.field_name, "day_of_week");
    assert_eq!(error.sequence, sequence);
    assert_eq!(error.reasons, vec![reason.to_string()]);
}

#[rstest]
#[case("60 * * * * ? *", 1, "second", "60")]
#[case("* 0-60 * * * ? *", 2, "minute", "0-60")]
#[case("* * 24 * * ? *", 3, "hour", "24")]
#[case("* * * 0 * ? *", 4, "day_of_month", "0")]
#[case("* * * L-31 * ? *", 4, "day_of_month", "L-31")]
#[case("* * * 32W * ? *", 4, "day_of_month", "32W")]
#[case("* * * ? foo * *", 5, "month", "foo")]
#[case("* * * ? 13 * *", 5, "month", "13")]
#[case("* * * ? * * 10000", 7, "year", "10000")]
#[case("? * * * * ? *", 1, "second", "?")]
#[case("* * * ?,1 * ? *", 4, "day_of_month", "?")]
#[case("* * * 1,,2 * ? *", 4, "day_of_month", "")]
#[case("*/0 * * * * ? *", 1, "second", "*/0")]
#[case("@every", 1, "second", "@every")]
#[case("* * * *", 5, "month", "")]
#[case("* * * * * ? * *", 8, "unexpected", "*")]
fn test_field_errors(
    #[case] expression: &str,
    #[case] field_index: usize,
    #[case] field_name: &str,
    #[case] sequence: &str,
) {
    let error = CronExpression::new(expression).unwrap_err();

    assert_eq!(error.field_index, field_index, "{error}");
    assert_eq!(error.field_name, field_name, "{error}");
    assert_eq!(error.sequence, sequence, "{error}");
    assert!(!error.reason().is_empty());
}

#[test]
fn test_trigger_propagates_parser_error() {
    let start = Utc.with_ymd_and_hms(2021, 9, 19, 0, 0, 0).unwrap();

    let error: CronParserError =
        CronTabTrigger::new("0 0 0 ? * mon-tue/55 *", start, None, Some("Europe/Berlin")).unwrap_err();

    assert_eq!(error, CronExpression::new("0 0 0 ? * mon-tue/55 *").unwrap_err());
    assert_eq!(
        error.to_string(),
        "invalid cron expression \"0 0 0 ? * mon-tue/55 *\": field 6 (day_of_week), sequence \"mon-tue/55\": \
         the step value 55 is higher than the range of days mon-tue"
    );
}
