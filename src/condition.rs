//! Visibility conditions for sections and questions.
//!
//! A condition is a comparator plus a time phrase, e.g. `"after 3pm"`
//! or `"<= noon"`, evaluated against the run's reference instant.
//! Anything that doesn't match the grammar places no restriction at
//! all, so a stray condition string never hides a question; a matching
//! condition whose time phrase can't be resolved is a configuration
//! error and halts the run.

use std::sync::OnceLock;

use jiff::Zoned;
use regex::Regex;

use crate::timeparse;

#[derive(Debug, thiserror::Error)]
pub enum ConditionError {
    #[error("invalid time {0:?} in condition")]
    BadTime(String),
}

fn grammar() -> &'static Regex {
    static RX: OnceLock<Regex> = OnceLock::new();
    RX.get_or_init(|| {
        Regex::new(
            r"(?i)(?P<comp><=|>=|<|>|before|after)\s+(?P<time>(?:noon|midnight|[0-9]+(?::[0-9]{2})?)\s*(?:am|pm)?)$",
        )
        .expect("condition grammar is valid")
    })
}

/// Evaluate a condition string against the reference instant.
///
/// Returns `Ok(true)` for any string that doesn't match the grammar.
pub fn evaluate(condition: &str, as_of: &Zoned) -> Result<bool, ConditionError> {
    let Some(caps) = grammar().captures(condition) else {
        return Ok(true);
    };

    let phrase = &caps["time"];
    let time = timeparse::time_of_day(phrase)
        .ok_or_else(|| ConditionError::BadTime(phrase.to_string()))?;

    // Same-day comparison instant: the resolved time on as_of's date.
    let instant = as_of
        .date()
        .to_datetime(time)
        .to_zoned(as_of.time_zone().clone())
        .map_err(|_| ConditionError::BadTime(phrase.to_string()))?;

    let comp = caps["comp"].to_lowercase();
    Ok(match comp.as_str() {
        "<=" => *as_of <= instant,
        ">=" => *as_of >= instant,
        "<" | "before" => *as_of < instant,
        _ => *as_of > instant, // ">" | "after"
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    fn at(hour: i8, minute: i8) -> Zoned {
        date(2025, 6, 15)
            .at(hour, minute, 0, 0)
            .to_zoned(jiff::tz::TimeZone::UTC)
            .unwrap()
    }

    #[test]
    fn non_matching_strings_are_true() {
        for text in ["", "always", "on tuesdays", "3pm", "before"] {
            assert!(evaluate(text, &at(9, 0)).unwrap(), "{text:?}");
        }
    }

    #[test]
    fn after_compares_against_same_day_time() {
        assert!(!evaluate("after 3pm", &at(14, 0)).unwrap());
        assert!(evaluate("after 3pm", &at(15, 30)).unwrap());
    }

    #[test]
    fn before_and_symbolic_comparators() {
        assert!(evaluate("before noon", &at(9, 0)).unwrap());
        assert!(!evaluate("before noon", &at(12, 0)).unwrap());
        assert!(evaluate("<= noon", &at(12, 0)).unwrap());
        assert!(evaluate(">= 9am", &at(9, 0)).unwrap());
        assert!(!evaluate("< 9am", &at(9, 0)).unwrap());
        assert!(evaluate("> 8:30pm", &at(21, 0)).unwrap());
    }

    #[test]
    fn comparators_are_case_insensitive() {
        assert!(evaluate("AFTER 1pm", &at(14, 0)).unwrap());
        assert!(evaluate("Before 5PM", &at(14, 0)).unwrap());
    }

    #[test]
    fn unresolvable_time_is_fatal() {
        let err = evaluate("after 27pm", &at(14, 0)).unwrap_err();
        assert!(matches!(err, ConditionError::BadTime(_)));
    }
}
