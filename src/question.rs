//! Asking a single configured question.
//!
//! A question only produces an answer when its own condition and its
//! section's condition both hold and the user gives non-blank input.
//! Numeric answers outside the configured bounds are re-prompted
//! indefinitely rather than rejected; everything else is one shot.

use std::io;

use jiff::Zoned;

use crate::answer::Answer;
use crate::condition::{self, ConditionError};
use crate::config::{QuestionConfig, QuestionKind};
use crate::prompt::PromptProvider;
use crate::timeparse;
use crate::weather::{WeatherError, WeatherProvider};

/// Everything a question needs from the surrounding run, threaded
/// explicitly so components agree on "now" without ambient state.
pub struct RunContext<'a> {
    pub as_of: Zoned,
    pub prompter: &'a mut dyn PromptProvider,
    pub weather: &'a dyn WeatherProvider,
}

#[derive(Debug, thiserror::Error)]
pub enum AskError {
    #[error(transparent)]
    Condition(#[from] ConditionError),

    #[error(transparent)]
    Weather(#[from] WeatherError),

    #[error("input error: {0}")]
    Io(#[from] io::Error),
}

/// One configured prompt, ready to ask.
pub struct Question<'a> {
    cfg: &'a QuestionConfig,
}

impl<'a> Question<'a> {
    pub fn new(cfg: &'a QuestionConfig) -> Self {
        Self { cfg }
    }

    /// Ask the question. Returns `None` without prompting when the
    /// prompt is missing, the question's condition is false, or the
    /// section's condition is false.
    pub fn ask(
        &self,
        ctx: &mut RunContext<'_>,
        section_visible: bool,
    ) -> Result<Option<Answer>, AskError> {
        let Some(prompt) = self.cfg.prompt_text() else {
            return Ok(None);
        };
        if !section_visible {
            return Ok(None);
        }
        if let Some(cond) = &self.cfg.condition
            && !condition::evaluate(cond, &ctx.as_of)?
        {
            return Ok(None);
        }

        let answer = match self.cfg.kind {
            QuestionKind::Integer => self
                .read_number(ctx, prompt)?
                .map(|n| Answer::Integer(n.round() as i64)),
            QuestionKind::Decimal => self.read_number(ctx, prompt)?.map(Answer::Real),
            QuestionKind::Line => self.read_text(ctx, prompt, false)?.map(Answer::Text),
            QuestionKind::Multiline => self.read_text(ctx, prompt, true)?.map(Answer::Text),
            QuestionKind::Date => ctx
                .prompter
                .line(prompt)?
                .and_then(|raw| timeparse::datetime(&raw, &ctx.as_of))
                .map(Answer::Timestamp),
            QuestionKind::Weather => Some(Answer::Weather(ctx.weather.fetch(&ctx.as_of)?)),
        };

        if let Some(answer) = &answer {
            eprintln!("{prompt}: {answer}");
        }
        Ok(answer)
    }

    /// Numbers outside `[min, max]` are asked again, forever.
    fn read_number(
        &self,
        ctx: &mut RunContext<'_>,
        prompt: &str,
    ) -> Result<Option<f64>, AskError> {
        let (min, max) = (self.cfg.min(), self.cfg.max());
        loop {
            match ctx.prompter.number(prompt, min, max)? {
                None => return Ok(None),
                Some(n) if n < min || n > max => {}
                Some(n) => return Ok(Some(n)),
            }
        }
    }

    /// First response under the primary prompt; with a secondary
    /// prompt configured, keep collecting until a blank response and
    /// join everything with newlines.
    fn read_text(
        &self,
        ctx: &mut RunContext<'_>,
        prompt: &str,
        multi: bool,
    ) -> Result<Option<String>, AskError> {
        let first = if multi {
            ctx.prompter.multiline(prompt)?
        } else {
            ctx.prompter.line(prompt)?
        };
        let Some(first) = first else {
            return Ok(None);
        };

        let mut parts = vec![first];
        if let Some(secondary) = &self.cfg.secondary_prompt {
            loop {
                let more = if multi {
                    ctx.prompter.multiline(secondary)?
                } else {
                    ctx.prompter.line(secondary)?
                };
                match more {
                    Some(text) => parts.push(text),
                    None => break,
                }
            }
        }
        Ok(Some(parts.join("\n").trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    use crate::prompt::ScriptedPrompter;
    use crate::weather::testing::{FixedWeather, NoWeather, sample_snapshot};

    fn question(yaml: &str) -> QuestionConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn at(hour: i8) -> Zoned {
        date(2025, 6, 15)
            .at(hour, 0, 0, 0)
            .to_zoned(jiff::tz::TimeZone::UTC)
            .unwrap()
    }

    fn ask(
        cfg: &QuestionConfig,
        responses: &[&str],
        hour: i8,
        section_visible: bool,
    ) -> Option<Answer> {
        let mut prompter = ScriptedPrompter::new(responses.iter().copied());
        let mut ctx = RunContext {
            as_of: at(hour),
            prompter: &mut prompter,
            weather: &NoWeather,
        };
        Question::new(cfg).ask(&mut ctx, section_visible).unwrap()
    }

    #[test]
    fn out_of_range_numbers_are_reprompted() {
        let cfg = question("{key: mood, type: numeric, prompt: Mood}");
        assert_eq!(ask(&cfg, &["0", "3"], 10, true), Some(Answer::Integer(3)));
    }

    #[test]
    fn integer_rounds_to_nearest() {
        let cfg = question("{key: mood, type: numeric, prompt: Mood}");
        assert_eq!(ask(&cfg, &["2.6"], 10, true), Some(Answer::Integer(3)));
    }

    #[test]
    fn decimal_keeps_fraction() {
        let cfg = question("{key: mood, type: decimal, prompt: Mood}");
        assert_eq!(ask(&cfg, &["2.6"], 10, true), Some(Answer::Real(2.6)));
    }

    #[test]
    fn blank_number_is_absent() {
        let cfg = question("{key: mood, type: numeric, prompt: Mood}");
        assert_eq!(ask(&cfg, &[""], 10, true), None);
    }

    #[test]
    fn missing_prompt_is_never_asked() {
        let cfg = question("{key: mood, type: numeric}");
        assert_eq!(ask(&cfg, &["3"], 10, true), None);
    }

    #[test]
    fn own_condition_false_is_absent() {
        let cfg = question("{key: j, type: line, prompt: Evening?, condition: after 5pm}");
        assert_eq!(ask(&cfg, &["yes"], 10, true), None);
        assert_eq!(
            ask(&cfg, &["yes"], 18, true),
            Some(Answer::Text("yes".into()))
        );
    }

    #[test]
    fn section_condition_false_is_absent() {
        let cfg = question("{key: j, type: line, prompt: Anything?}");
        assert_eq!(ask(&cfg, &["yes"], 10, false), None);
    }

    #[test]
    fn secondary_prompt_repeats_until_blank() {
        let cfg = question(
            "{key: grateful, type: line, prompt: Grateful for?, secondary_prompt: Anything else?}",
        );
        assert_eq!(
            ask(&cfg, &["coffee", "sunshine", ""], 10, true),
            Some(Answer::Text("coffee\nsunshine".into()))
        );
    }

    #[test]
    fn blank_first_response_is_absent() {
        let cfg = question("{key: journal, type: multiline, prompt: What's up?}");
        assert_eq!(ask(&cfg, &[""], 10, true), None);
    }

    #[test]
    fn date_answers_parse_naturally() {
        let cfg = question("{key: woke, type: date, prompt: Woke at?}");
        let Some(Answer::Timestamp(ts)) = ask(&cfg, &["6:30am"], 10, true) else {
            panic!("expected a timestamp");
        };
        assert_eq!((ts.hour(), ts.minute()), (6, 30));
    }

    #[test]
    fn unparseable_date_is_absent() {
        let cfg = question("{key: woke, type: date, prompt: Woke at?}");
        assert_eq!(ask(&cfg, &["dunno"], 10, true), None);
    }

    #[test]
    fn weather_question_embeds_a_snapshot() {
        let cfg = question("{key: weather, type: forecast, prompt: Weather}");
        let snapshot = sample_snapshot();
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        let mut ctx = RunContext {
            as_of: at(10),
            prompter: &mut prompter,
            weather: &FixedWeather(snapshot.clone()),
        };
        let answer = Question::new(&cfg).ask(&mut ctx, true).unwrap();
        assert_eq!(answer, Some(Answer::Weather(snapshot)));
    }

    #[test]
    fn weather_errors_propagate() {
        let cfg = question("{key: weather, type: weather, prompt: Weather}");
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        let mut ctx = RunContext {
            as_of: at(10),
            prompter: &mut prompter,
            weather: &NoWeather,
        };
        let err = Question::new(&cfg).ask(&mut ctx, true).unwrap_err();
        assert!(matches!(err, AskError::Weather(_)));
    }

    #[test]
    fn bad_condition_time_is_fatal() {
        let cfg = question("{key: j, type: line, prompt: Hi, condition: after 99pm}");
        let mut prompter = ScriptedPrompter::new(["hi"]);
        let mut ctx = RunContext {
            as_of: at(10),
            prompter: &mut prompter,
            weather: &NoWeather,
        };
        let err = Question::new(&cfg).ask(&mut ctx, true).unwrap_err();
        assert!(matches!(err, AskError::Condition(_)));
    }
}
