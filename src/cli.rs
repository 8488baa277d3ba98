//! CLI interface for the journal tool.
//!
//! One invocation runs one checkin: `journal daily` prompts through
//! the `daily` journal's sections and persists the entry. The
//! interesting flags move the reference date, for backfilling
//! entries: `journal daily --date "yesterday 9pm"`.

use std::path::PathBuf;

use clap::Parser;

/// Journal — config-driven daily checkins.
#[derive(Debug, Parser)]
#[command(name = "journal", after_long_help = EXAMPLES_HELP)]
pub struct Cli {
    /// Journal key, as configured in journals.yaml.
    pub journal: String,

    /// Reference date for the entry (natural language: "yesterday
    /// 9pm", "2025-06-01 08:00"). Defaults to now.
    #[arg(long)]
    pub date: Option<String>,

    /// Config file path. Defaults to ~/.config/journal/journals.yaml.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

const EXAMPLES_HELP: &str = r#"Examples:
  journal daily
      Run the "daily" journal's checkin for right now.

  journal daily --date "yesterday 9pm"
      Backfill last night's entry; conditions and weather use that time.

  journal work --config ./journals.yaml
      Run against a local config file."#;
