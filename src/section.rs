//! Sections: ordered groups of questions sharing one condition.
//!
//! Resolving a section asks every question in configured order and
//! collects the answers, so construction is where all prompting
//! happens. [`Sections`] preserves configuration order end to end —
//! it is the iteration order of both renderers.

use crate::answer::{self, AnswerTree};
use crate::config::SectionConfig;
use crate::question::{AskError, Question, RunContext};
use crate::{condition, config::QuestionConfig};

/// One resolved section: its config plus the collected answers.
#[derive(Debug)]
pub struct Section<'a> {
    cfg: &'a SectionConfig,
    pub answers: AnswerTree,
}

impl<'a> Section<'a> {
    /// Ask every question in the section, in configured order.
    ///
    /// The section's condition is evaluated once here; questions in a
    /// hidden section resolve to absent without prompting.
    pub fn resolve(cfg: &'a SectionConfig, ctx: &mut RunContext<'_>) -> Result<Self, AskError> {
        let visible = match &cfg.condition {
            Some(cond) => condition::evaluate(cond, &ctx.as_of)?,
            None => true,
        };

        let mut answers = AnswerTree::new();
        for question_cfg in &cfg.questions {
            // Prompt-less questions are never asked and contribute no key.
            if question_cfg.prompt_text().is_none() {
                continue;
            }
            let question = Question::new(question_cfg);
            if let Some(response) = question.ask(ctx, visible)? {
                let path: Vec<&str> = question_cfg.key.split('.').collect();
                answer::set_path(&mut answers, &path, response);
            }
        }

        Ok(Self { cfg, answers })
    }

    pub fn key(&self) -> &str {
        &self.cfg.key
    }

    pub fn title(&self) -> &str {
        &self.cfg.title
    }

    /// The askable questions, in configured order.
    pub fn questions(&self) -> impl Iterator<Item = &QuestionConfig> {
        self.cfg
            .questions
            .iter()
            .filter(|q| q.prompt_text().is_some())
    }
}

/// All of a journal's sections, keyed by section key, in
/// configuration order. Duplicate keys keep the first position but
/// the last definition wins.
#[derive(Debug)]
pub struct Sections<'a> {
    entries: Vec<Section<'a>>,
}

impl<'a> Sections<'a> {
    pub fn resolve(
        sections: &'a [SectionConfig],
        ctx: &mut RunContext<'_>,
    ) -> Result<Self, AskError> {
        let mut entries: Vec<Section<'a>> = Vec::new();
        for cfg in sections {
            let section = Section::resolve(cfg, ctx)?;
            match entries.iter_mut().find(|s| s.key() == section.key()) {
                Some(existing) => *existing = section,
                None => entries.push(section),
            }
        }
        Ok(Self { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section<'a>> {
        self.entries.iter()
    }
}
