use thiserror::Error;

/// Structured failure to parse a cron expression.
///
/// Carries enough context to point at the exact offending piece of the expression:
/// the whole expression, the position and name of the field, the term inside that field
/// and one or more human-readable reasons.
#[derive(Debug, Error, Clone, PartialEq, Eq, Hash)]
#[error(
    "invalid cron expression \"{expression}\": field {field_index} ({field_name}), sequence \"{sequence}\": {}",
    .reasons.join("; ")
)]
pub struct CronParserError {
    /// Full original expression.
    pub expression: String,
    /// 1-based position of the failed field: `second` is 1, `year` is 7.
    pub field_index: usize,
    /// Name of the failed field, i.e. `day_of_week`.
    pub field_name: String,
    /// Offending sub-token of the field.
    pub sequence: String,
    /// Ordered list of reasons; usually a single entry.
    pub reasons: Vec<String>,
}

impl CronParserError {
    pub(crate) fn new(
        expression: impl Into<String>,
        field_index: usize,
        field_name: impl Into<String>,
        failure: TermError,
    ) -> Self {
        Self {
            expression: expression.into(),
            field_index,
            field_name: field_name.into(),
            sequence: failure.sequence,
            reasons: failure.reasons,
        }
    }

    /// Returns the first (main) reason of the failure.
    pub fn reason(&self) -> &str {
        self.reasons.first().map(String::as_str).unwrap_or_default()
    }
}

/// Failure of a single term, before it's attached to the expression and field it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct TermError {
    pub(crate) sequence: String,
    pub(crate) reasons: Vec<String>,
}

impl TermError {
    pub(crate) fn new(sequence: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            sequence: sequence.into(),
            reasons: vec![reason.into()],
        }
    }

    pub(crate) fn unrecognized(sequence: &str) -> Self {
        Self::new(sequence, format!("Unrecognized sequence \"{sequence}\""))
    }
}
