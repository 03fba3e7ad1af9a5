//! Cron expression handling — thin wrapper over the `cron` crate.
//!
//! Accepts standard 5-field expressions (`MIN HOUR DOM MON DOW`) by prepending
//! a seconds field, and 6/7-field expressions as-is. When a schedule carries a
//! timezone, the expression is evaluated in that zone; otherwise UTC.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use tempo_core::{Result, TempoError};

/// Parse a cron expression, normalizing 5-field syntax to the 6-field form the
/// `cron` crate expects.
pub fn parse(expression: &str) -> Result<Schedule> {
    let fields = expression.split_whitespace().count();
    let normalized = if fields == 5 {
        format!("0 {expression}")
    } else {
        expression.to_string()
    };
    Schedule::from_str(&normalized)
        .map_err(|e| TempoError::Schedule(format!("invalid cron expression '{expression}': {e}")))
}

/// Parse a timezone name (e.g. "America/Bogota").
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| TempoError::Schedule(format!("unknown timezone '{name}'")))
}

/// Next fire time strictly after `after`, evaluated in the schedule's timezone.
pub fn next_fire(
    expression: &str,
    timezone: Option<&str>,
    after: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>> {
    let schedule = parse(expression)?;
    match timezone {
        Some(name) => {
            let tz = parse_timezone(name)?;
            let local = after.with_timezone(&tz);
            Ok(schedule.after(&local).next().map(|t| t.with_timezone(&Utc)))
        }
        None => Ok(schedule.after(&after).next()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_five_field_every_hour() {
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 10, 30, 0).unwrap();
        let next = next_fire("0 * * * *", None, after).unwrap().unwrap();
        assert_eq!(next.hour(), 11);
        assert_eq!(next.minute(), 0);
    }

    #[test]
    fn test_five_field_specific_time() {
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 7, 0, 0).unwrap();
        let next = next_fire("0 8 * * *", None, after).unwrap().unwrap();
        assert_eq!(next.hour(), 8);
        assert_eq!(next.minute(), 0);
    }

    #[test]
    fn test_six_field_passthrough() {
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 10, 0, 0).unwrap();
        let next = next_fire("30 */15 * * * *", None, after).unwrap().unwrap();
        assert_eq!(next.minute(), 15);
        assert_eq!(next.second(), 30);
    }

    #[test]
    fn test_timezone_scoping() {
        // 08:00 in Bogota is 13:00 UTC (UTC-5, no DST).
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 0, 0, 0).unwrap();
        let next = next_fire("0 8 * * *", Some("America/Bogota"), after)
            .unwrap()
            .unwrap();
        assert_eq!(next.hour(), 13);
    }

    #[test]
    fn test_invalid_expression_rejected() {
        assert!(parse("not a cron").is_err());
        assert!(next_fire("bad", None, Utc::now()).is_err());
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        assert!(parse_timezone("Mars/Olympus").is_err());
    }
}
