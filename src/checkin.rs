//! One full checkin: prompt, render, persist.
//!
//! Construction walks every section (all prompting happens there);
//! the resolved answers are then rendered twice — once to Markdown
//! for humans, once to a JSON record for the history file. Fatal
//! errors during prompting leave no trace on disk because nothing is
//! persisted until all collection has finished.

use std::io::Write as _;
use std::path::PathBuf;
use std::{fs, io};

use jiff::Zoned;
use serde::Serialize;
use serde_json::Value;

use crate::answer::{self, Answer, AnswerTree};
use crate::config::{Config, ConfigError, JournalConfig, MarkdownMode, QuestionConfig, QuestionKind};
use crate::dayone;
use crate::question::{AskError, RunContext};
use crate::section::Sections;
use crate::storage::{self, CheckinRecord, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum CheckinError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ask(#[from] AskError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// What a Markdown render includes around the entry body.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub front_matter: bool,
    pub title: bool,
    pub date: bool,
    pub time: bool,
}

/// A fully collected entry for one journal and reference date.
#[derive(Debug)]
pub struct Checkin<'a> {
    key: String,
    config: &'a Config,
    journal: &'a JournalConfig,
    sections: Sections<'a>,
    title: String,
    as_of: Zoned,
}

impl<'a> Checkin<'a> {
    /// Build a checkin, asking every question of the selected
    /// journal. Fails fast on an unknown journal key, before any
    /// prompting.
    pub fn new(
        config: &'a Config,
        key: &str,
        ctx: &mut RunContext<'_>,
    ) -> Result<Self, CheckinError> {
        let journal = config.journal(key)?;

        // Noon stays "AM" here: the meridiem flips at 13:00, not 12:00.
        let meridiem = if ctx.as_of.hour() < 13 { "AM" } else { "PM" };
        let title = journal.title.replace("%M", meridiem);

        let sections = Sections::resolve(&journal.sections, ctx)?;

        Ok(Self {
            key: key.to_string(),
            config,
            journal,
            sections,
            title,
            as_of: ctx.as_of.clone(),
        })
    }

    // ── Markdown ──

    /// Render the entry to Markdown.
    pub fn to_markdown(&self, opts: RenderOptions) -> String {
        let mut out: Vec<String> = Vec::new();

        if opts.front_matter {
            #[derive(Serialize)]
            struct FrontMatter<'f> {
                title: &'f str,
                date: String,
            }
            let front = FrontMatter {
                title: &self.title,
                date: self.as_of.strftime("%Y-%m-%d %H:%M:%S").to_string(),
            };
            if let Ok(yaml) = serde_yaml::to_string(&front) {
                out.push("---".to_string());
                out.push(yaml.trim_end().to_string());
                out.push("---".to_string());
            }
        }

        if opts.title {
            if opts.date || opts.time {
                let mut parts = Vec::new();
                if opts.date {
                    parts.push("%Y-%m-%d");
                }
                if opts.time {
                    parts.push("%H:%M");
                }
                let fmt = parts.join(" ");
                let stamp = self.as_of.strftime(&fmt);
                out.push(format!("\n## {} {stamp}\n", self.title));
            } else {
                out.push(format!("\n## {}\n", self.title));
            }
        }

        for section in self.sections.iter() {
            out.push(format!("\n###### {}\n", section.title()));

            for question in section.questions() {
                let path: Vec<&str> = question.key.split('.').collect();
                let found = answer::get_path(&section.answers, &path);
                self.print_answer(&mut out, question, &path, found);
            }
        }

        out.join("\n")
    }

    /// Emit one answered question. Absent answers emit nothing.
    fn print_answer(
        &self,
        out: &mut Vec<String>,
        question: &QuestionConfig,
        path: &[&str],
        found: Option<&Answer>,
    ) {
        let prompt = question.prompt_text().unwrap_or_default();
        let leaf = path.last().copied().unwrap_or_default();

        match question.kind {
            QuestionKind::Weather => {
                let Some(Answer::Weather(weather)) = found else {
                    return;
                };
                out.push(format!("\n##### {prompt}\n"));
                // The key suffix picks the rendered facet.
                if leaf.ends_with("current") {
                    out.push(weather.current());
                } else if leaf.ends_with("moon") {
                    out.push(weather.moon());
                } else {
                    out.push(weather.to_markdown());
                }
            }
            QuestionKind::Integer | QuestionKind::Decimal => {
                if let Some(n @ (Answer::Integer(_) | Answer::Real(_))) = found {
                    out.push(format!("{prompt}: {n}  "));
                }
            }
            QuestionKind::Date => {
                if let Some(Answer::Timestamp(when)) = found {
                    out.push(format!("{prompt}: {}", when.strftime("%Y-%m-%d %H:%M")));
                }
            }
            QuestionKind::Line | QuestionKind::Multiline => {
                let Some(Answer::Text(text)) = found else {
                    return;
                };
                if !text.trim().is_empty() {
                    out.push(format!("\n##### {prompt}\n"));
                    out.push(text.clone());
                }
                out.push("\n* * * * * *\n".to_string());
            }
        }
    }

    // ── History record ──

    /// The persisted form: reference timestamp in UTC, answers with
    /// weather reduced to its summary and nesting preserved.
    pub fn record(&self) -> CheckinRecord {
        let mut data = serde_json::Map::new();
        for section in self.sections.iter() {
            data.insert(section.key().to_string(), tree_to_json(&section.answers));
        }
        CheckinRecord {
            date: self.as_of.timestamp(),
            data: Value::Object(data),
        }
    }

    // ── Persistence ──

    /// Persist the entry: history first, then Markdown, then the
    /// best-effort Day One export.
    pub fn save(&self) -> Result<(), CheckinError> {
        let dir = storage::data_dir(
            self.journal.entries_folder.as_deref(),
            self.config.entries_folder.as_deref(),
        )?;
        fs::create_dir_all(&dir)?;
        let db = dir.join(format!("{}.json", self.key));
        storage::append_record(&db, self.record())?;
        eprintln!("Saved {}", db.display());

        if let Some(mode) = self.journal.markdown_mode() {
            match mode {
                MarkdownMode::Single => self.save_single_markdown()?,
                MarkdownMode::Daily => self.save_daily_markdown()?,
                MarkdownMode::Individual => self.save_individual_markdown()?,
            }
        }

        if self.journal.dayone {
            let body = self.to_markdown(RenderOptions {
                title: true,
                ..RenderOptions::default()
            });
            dayone::export(
                &body,
                self.journal.journal.as_deref(),
                &self.journal.tags,
                &self.as_of,
            );
        }

        Ok(())
    }

    fn markdown_target(&self, filename: &str) -> Result<PathBuf, CheckinError> {
        let dir = storage::markdown_dir(
            self.journal.entries_folder.as_deref(),
            self.config.entries_folder.as_deref(),
            &self.key,
        )?;
        fs::create_dir_all(&dir)?;
        Ok(dir.join(filename))
    }

    /// Append to the journal's one evergreen file.
    fn save_single_markdown(&self) -> Result<(), CheckinError> {
        let target = self.markdown_target(&format!("{}.md", self.key))?;
        let body = self.to_markdown(RenderOptions::default());
        let mut file = fs::OpenOptions::new().create(true).append(true).open(&target)?;
        writeln!(
            file,
            "\n## {} {}\n\n{body}",
            self.title,
            self.as_of.strftime("%Y-%m-%d %H:%M:%S")
        )?;
        eprintln!("Added new entry to {}", target.display());
        Ok(())
    }

    /// One file per calendar day: front matter on creation, body-only
    /// appends afterwards.
    fn save_daily_markdown(&self) -> Result<(), CheckinError> {
        let filename = format!("{}_{}.md", self.key, self.as_of.strftime("%Y-%m-%d"));
        let target = self.markdown_target(&filename)?;

        if target.exists() {
            let body = self.to_markdown(RenderOptions {
                title: true,
                time: true,
                ..RenderOptions::default()
            });
            let mut file = fs::OpenOptions::new().append(true).open(&target)?;
            writeln!(file, "{body}")?;
        } else {
            let body = self.to_markdown(RenderOptions {
                front_matter: true,
                title: true,
                time: true,
                ..RenderOptions::default()
            });
            fs::write(&target, format!("{body}\n"))?;
        }
        eprintln!("Saved daily Markdown to {}", target.display());
        Ok(())
    }

    /// A fresh file per entry, named down to the minute.
    fn save_individual_markdown(&self) -> Result<(), CheckinError> {
        let filename = self.as_of.strftime("%Y-%m-%d_%H%M.md").to_string();
        let target = self.markdown_target(&filename)?;
        let body = self.to_markdown(RenderOptions {
            front_matter: true,
            title: true,
            ..RenderOptions::default()
        });
        fs::write(&target, format!("{body}\n"))?;
        eprintln!("Saved new entry to {}", target.display());
        Ok(())
    }
}

fn tree_to_json(tree: &AnswerTree) -> Value {
    let mut map = serde_json::Map::new();
    for (key, answer) in tree.iter() {
        map.insert(key.to_string(), answer_to_json(answer));
    }
    Value::Object(map)
}

fn answer_to_json(answer: &Answer) -> Value {
    match answer {
        Answer::Integer(n) => Value::from(*n),
        Answer::Real(n) => Value::from(*n),
        Answer::Text(s) => Value::from(s.clone()),
        Answer::Timestamp(t) => Value::from(t.timestamp().to_string()),
        Answer::Weather(w) => w.to_record(),
        Answer::Tree(tree) => tree_to_json(tree),
    }
}
