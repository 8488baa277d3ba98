//! Natural-language time parsing.
//!
//! Two entry points: [`time_of_day`] resolves a clock-time phrase
//! ("noon", "3pm", "10:30 am", "15:00") and is what condition strings
//! use; [`datetime`] resolves a full date/time phrase relative to a
//! reference instant and backs date-type questions and the `--date`
//! flag. Both return `None` rather than erroring — callers decide
//! whether an unresolvable phrase is fatal.

use std::str::FromStr;

use jiff::civil::{self, Date, DateTime, Time};
use jiff::{Timestamp, Zoned};

/// Resolve a clock-time phrase to a civil time.
pub fn time_of_day(text: &str) -> Option<Time> {
    let text = text.trim().to_lowercase();

    match text.as_str() {
        "noon" => return Some(civil::time(12, 0, 0, 0)),
        "midnight" => return Some(Time::midnight()),
        _ => {}
    }

    // "3pm", "10:30 am", "15:00", "15:00:30"
    let (clock, meridiem) = if let Some(rest) = text.strip_suffix("am") {
        (rest.trim_end(), Some(Meridiem::Am))
    } else if let Some(rest) = text.strip_suffix("pm") {
        (rest.trim_end(), Some(Meridiem::Pm))
    } else {
        (text.as_str(), None)
    };

    let mut parts = clock.split(':');
    let hour: i8 = parts.next()?.trim().parse().ok()?;
    let minute: i8 = match parts.next() {
        Some(m) => m.trim().parse().ok()?,
        None => 0,
    };
    let second: i8 = match parts.next() {
        Some(s) => s.trim().parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }

    let hour = match meridiem {
        Some(Meridiem::Am) if hour == 12 => 0,
        Some(Meridiem::Pm) if (1..=11).contains(&hour) => hour + 12,
        Some(_) if !(1..=12).contains(&hour) => return None,
        _ => hour,
    };

    Time::new(hour, minute, second, 0).ok()
}

enum Meridiem {
    Am,
    Pm,
}

/// Resolve a date/time phrase relative to `as_of`.
///
/// Accepts, in order of preference: "now", a zoned or RFC 3339
/// timestamp, a civil date-time or date, a day word ("today",
/// "yesterday", "tomorrow") with an optional trailing time, or a bare
/// time-of-day applied to `as_of`'s calendar date.
pub fn datetime(text: &str, as_of: &Zoned) -> Option<Zoned> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if text.eq_ignore_ascii_case("now") {
        return Some(as_of.clone());
    }

    if let Ok(zoned) = Zoned::from_str(text) {
        return Some(zoned);
    }
    if let Ok(ts) = Timestamp::from_str(text) {
        return Some(ts.to_zoned(as_of.time_zone().clone()));
    }
    if let Some(dt) = parse_civil(text) {
        return dt.to_zoned(as_of.time_zone().clone()).ok();
    }

    // Day word with optional time: "yesterday 5pm".
    let (word, rest) = match text.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (text, ""),
    };
    if let Some(date) = day_word(word, as_of) {
        let time = if rest.is_empty() {
            Time::midnight()
        } else {
            time_of_day(rest)?
        };
        return date.to_datetime(time).to_zoned(as_of.time_zone().clone()).ok();
    }

    // Bare time-of-day on the reference date.
    let time = time_of_day(text)?;
    as_of
        .date()
        .to_datetime(time)
        .to_zoned(as_of.time_zone().clone())
        .ok()
}

fn parse_civil(text: &str) -> Option<DateTime> {
    if let Ok(dt) = DateTime::from_str(text) {
        return Some(dt);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = DateTime::strptime(fmt, text) {
            return Some(dt);
        }
    }
    Date::from_str(text).map(|d| d.to_datetime(Time::midnight())).ok()
}

fn day_word(word: &str, as_of: &Zoned) -> Option<Date> {
    let today = as_of.date();
    match word.to_lowercase().as_str() {
        "today" => Some(today),
        "yesterday" => today.yesterday().ok(),
        "tomorrow" => today.tomorrow().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    fn reference() -> Zoned {
        date(2025, 6, 15)
            .at(14, 0, 0, 0)
            .to_zoned(jiff::tz::TimeZone::UTC)
            .unwrap()
    }

    #[test]
    fn named_times() {
        assert_eq!(time_of_day("noon"), Some(civil::time(12, 0, 0, 0)));
        assert_eq!(time_of_day("midnight"), Some(Time::midnight()));
        assert_eq!(time_of_day("NOON"), Some(civil::time(12, 0, 0, 0)));
    }

    #[test]
    fn meridiem_times() {
        assert_eq!(time_of_day("3pm"), Some(civil::time(15, 0, 0, 0)));
        assert_eq!(time_of_day("10:30 am"), Some(civil::time(10, 30, 0, 0)));
        assert_eq!(time_of_day("12am"), Some(Time::midnight()));
        assert_eq!(time_of_day("12pm"), Some(civil::time(12, 0, 0, 0)));
    }

    #[test]
    fn twenty_four_hour_times() {
        assert_eq!(time_of_day("15:00"), Some(civil::time(15, 0, 0, 0)));
        assert_eq!(time_of_day("09:05:30"), Some(civil::time(9, 5, 30, 0)));
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(time_of_day("half past never"), None);
        assert_eq!(time_of_day("25:00"), None);
        assert_eq!(time_of_day(""), None);
    }

    #[test]
    fn datetime_now_and_day_words() {
        let as_of = reference();
        assert_eq!(datetime("now", &as_of), Some(as_of.clone()));

        let yesterday = datetime("yesterday 5pm", &as_of).unwrap();
        assert_eq!(yesterday.date(), date(2025, 6, 14));
        assert_eq!(yesterday.hour(), 17);

        let tomorrow = datetime("tomorrow", &as_of).unwrap();
        assert_eq!(tomorrow.date(), date(2025, 6, 16));
        assert_eq!(tomorrow.hour(), 0);
    }

    #[test]
    fn datetime_iso_forms() {
        let as_of = reference();
        let dt = datetime("2025-01-02 08:30", &as_of).unwrap();
        assert_eq!(dt.date(), date(2025, 1, 2));
        assert_eq!((dt.hour(), dt.minute()), (8, 30));

        let d = datetime("2025-01-02", &as_of).unwrap();
        assert_eq!(d.date(), date(2025, 1, 2));
    }

    #[test]
    fn datetime_bare_time_uses_reference_date() {
        let as_of = reference();
        let dt = datetime("9am", &as_of).unwrap();
        assert_eq!(dt.date(), as_of.date());
        assert_eq!(dt.hour(), 9);
    }

    #[test]
    fn datetime_garbage_is_none() {
        assert_eq!(datetime("whenever", &reference()), None);
    }
}
