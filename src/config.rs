//! Journal configuration.
//!
//! Loaded once per run from `~/.config/journal/journals.yaml`. The
//! file describes every journal: its title, output destinations, and
//! the sections and questions to walk. Free-text question type
//! strings are resolved to a closed [`QuestionKind`] at load time so
//! the rest of the program dispatches on an enum, never on strings.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, de};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine home directory")]
    NoHome,

    #[error(
        "no config file found at {0}\n\
         Create one describing your journals (weather_api, zip, \
         entries_folder, journals)."
    )]
    Missing(PathBuf),

    #[error("could not read config at {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config at {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no journal with key {0:?} found")]
    UnknownJournal(String),
}

/// Top-level configuration: global defaults plus the journal map.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub weather_api: Option<String>,

    /// "F" or "C"; anything not starting with `c` means Fahrenheit.
    #[serde(default)]
    pub weather_deg: Option<String>,

    #[serde(default)]
    pub zip: Option<String>,

    #[serde(default)]
    pub entries_folder: Option<String>,

    pub journals: BTreeMap<String, JournalConfig>,
}

impl Config {
    /// Load config from `path`, or the default location when `None`.
    /// A missing file is a fatal configuration error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path().ok_or(ConfigError::NoHome)?,
        };

        if !path.exists() {
            return Err(ConfigError::Missing(path));
        }

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Unreadable {
            path: path.clone(),
            source,
        })?;
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Invalid { path, source })
    }

    /// The default config file path: `~/.config/journal/journals.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".config").join("journal").join("journals.yaml"))
    }

    /// The journal for `key`, failing fast when it isn't configured.
    pub fn journal(&self, key: &str) -> Result<&JournalConfig, ConfigError> {
        self.journals
            .get(key)
            .ok_or_else(|| ConfigError::UnknownJournal(key.to_string()))
    }
}

/// One named journal: title, destinations, and its ordered sections.
#[derive(Debug, Clone, Deserialize)]
pub struct JournalConfig {
    /// May contain `%M`, replaced with AM/PM at checkin time.
    pub title: String,

    #[serde(default)]
    markdown: Option<MarkdownSetting>,

    /// Export each entry to Day One via its CLI.
    #[serde(default)]
    pub dayone: bool,

    /// Day One journal name, when exporting.
    #[serde(default)]
    pub journal: Option<String>,

    /// Day One tags, when exporting.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Overrides the global entries folder for this journal.
    #[serde(default)]
    pub entries_folder: Option<String>,

    pub sections: Vec<SectionConfig>,
}

impl JournalConfig {
    /// The markdown destination mode, or `None` when markdown output
    /// is disabled.
    pub fn markdown_mode(&self) -> Option<MarkdownMode> {
        match &self.markdown {
            None | Some(MarkdownSetting::Enabled(false)) => None,
            Some(MarkdownSetting::Enabled(true)) => Some(MarkdownMode::Single),
            Some(MarkdownSetting::Mode(mode)) => Some(MarkdownMode::parse(mode)),
        }
    }
}

/// `markdown:` accepts a bare boolean or a mode string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum MarkdownSetting {
    Enabled(bool),
    Mode(String),
}

/// Where markdown renders of an entry land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkdownMode {
    /// Append every entry to one evergreen file per journal.
    Single,
    /// One file per calendar day.
    Daily,
    /// One new file per entry.
    Individual,
}

impl MarkdownMode {
    /// Unrecognized mode strings fall back to single-file append.
    fn parse(mode: &str) -> Self {
        let mode = mode.to_lowercase();
        if mode.starts_with("day") || mode.starts_with("daily") {
            Self::Daily
        } else if mode.starts_with("ind") || mode.starts_with("sep") {
            Self::Individual
        } else {
            Self::Single
        }
    }
}

/// An ordered, named group of questions sharing one condition.
#[derive(Debug, Clone, Deserialize)]
pub struct SectionConfig {
    pub key: String,
    pub title: String,

    /// Visibility condition; see [`crate::condition`].
    #[serde(default)]
    pub condition: Option<String>,

    pub questions: Vec<QuestionConfig>,
}

/// A single configured prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionConfig {
    /// Dot-separated segments nest the answer: `"mood.morning"`.
    pub key: String,

    #[serde(rename = "type")]
    pub kind: QuestionKind,

    #[serde(default)]
    pub prompt: Option<String>,

    /// When set, line/multiline questions repeat under this prompt
    /// until a blank response.
    #[serde(default)]
    pub secondary_prompt: Option<String>,

    #[serde(default)]
    min: Option<f64>,

    #[serde(default)]
    max: Option<f64>,

    #[serde(default)]
    pub condition: Option<String>,
}

impl QuestionConfig {
    pub fn min(&self) -> f64 {
        self.min.unwrap_or(1.0)
    }

    pub fn max(&self) -> f64 {
        self.max.unwrap_or(5.0)
    }

    /// The prompt, if present and non-blank. Questions without one
    /// are never asked.
    pub fn prompt_text(&self) -> Option<&str> {
        self.prompt.as_deref().filter(|p| !p.trim().is_empty())
    }
}

/// The closed set of question kinds, resolved from the config's
/// free-text `type` strings once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Integer,
    Decimal,
    Line,
    Multiline,
    Weather,
    Date,
}

impl QuestionKind {
    fn parse(raw: &str) -> Result<Self, String> {
        let lower = raw.to_lowercase();
        let matches = |prefixes: &[&str]| prefixes.iter().any(|p| lower.starts_with(p));

        if matches(&["int", "num"]) {
            Ok(Self::Integer)
        } else if matches(&["dec", "float", "real"]) {
            Ok(Self::Decimal)
        } else if matches(&["text", "string", "line"]) {
            Ok(Self::Line)
        } else if matches(&["multi"]) {
            Ok(Self::Multiline)
        } else if matches(&["weather", "forecast", "moon"]) {
            Ok(Self::Weather)
        } else if matches(&["date", "time"]) {
            Ok(Self::Date)
        } else {
            Err(format!("unknown question type {raw:?}"))
        }
    }
}

impl<'de> Deserialize<'de> for QuestionKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}
