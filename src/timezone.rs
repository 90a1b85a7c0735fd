//! Conversion of the matched wall-clock timestamps into instants of the trigger's timezone.
use chrono::{DateTime, LocalResult, NaiveDateTime, TimeDelta, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use tracing::debug;

/// Longest gap in the local time we try to skip over, one day.
const MAX_GAP_MINUTES: u32 = 24 * 60;

/// Outcome of the conversion of a matched wall-clock timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// The timestamp exists and isn't earlier than the floor.
    Fire(DateTime<Tz>),
    /// The timestamp doesn't exist, the search should go on from the first local time after the gap.
    Retry(NaiveDateTime),
    /// Every occurrence of the timestamp is earlier than the floor.
    Skip,
}

/// Places the wall-clock `local` timestamp into the `timezone`.
///
/// - A timestamp inside of a spring-forward gap makes the search restart
///   at the first existing local minute after the gap.
/// - An ambiguous timestamp (fall-back fold) resolves to its earlier occurrence,
///   unless only the later one isn't before the `floor`.
pub(crate) fn resolve(timezone: &Tz, local: NaiveDateTime, floor: &DateTime<Utc>) -> Resolution {
    match timezone.from_local_datetime(&local) {
        LocalResult::Single(fire) if fire >= *floor => Resolution::Fire(fire),
        LocalResult::Single(_) => Resolution::Skip,
        LocalResult::Ambiguous(earliest, latest) => {
            let fire = if earliest >= *floor {
                earliest
            } else if latest >= *floor {
                latest
            } else {
                return Resolution::Skip;
            };
            debug!(%local, %timezone, %fire, "ambiguous local time resolved");
            Resolution::Fire(fire)
        }
        LocalResult::None => match skip_gap(timezone, local) {
            Some(next) => {
                debug!(%local, %timezone, %next, "nonexistent local time skipped");
                Resolution::Retry(next)
            }
            None => Resolution::Skip,
        },
    }
}

/// Returns the first minute after `local` which exists in the `timezone`.
fn skip_gap(timezone: &Tz, local: NaiveDateTime) -> Option<NaiveDateTime> {
    let mut candidate = local.with_second(0)?;
    for _ in 0..MAX_GAP_MINUTES {
        candidate = candidate.checked_add_signed(TimeDelta::minutes(1))?;
        if !matches!(timezone.from_local_datetime(&candidate), LocalResult::None) {
            return Some(candidate);
        }
    }

    None
}
