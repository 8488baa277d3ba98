mod answer;
mod checkin;
mod cli;
mod condition;
mod config;
mod dayone;
mod prompt;
mod question;
mod section;
mod storage;
mod timeparse;
mod weather;

use std::process;

use clap::Parser;
use jiff::Zoned;

use checkin::Checkin;
use config::Config;
use prompt::{ConsolePrompter, GumPrompter, PromptProvider};
use question::RunContext;
use weather::{Units, WeatherApi};

fn main() {
    let cli = cli::Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let now = Zoned::now();
    let as_of = match &cli.date {
        Some(phrase) => match timeparse::datetime(phrase, &now) {
            Some(zoned) => zoned,
            None => {
                eprintln!("Error: could not parse date {phrase:?}");
                process::exit(1);
            }
        },
        None => now,
    };

    let weather = WeatherApi::new(
        config.weather_api.clone(),
        config.zip.clone(),
        Units::parse(config.weather_deg.as_deref()),
    );

    // Prefer gum's prompts when the helper is installed.
    let mut prompter: Box<dyn PromptProvider> = match GumPrompter::detect() {
        Some(gum) => Box::new(gum),
        None => Box::new(ConsolePrompter::stdin()),
    };

    let mut ctx = RunContext {
        as_of,
        prompter: prompter.as_mut(),
        weather: &weather,
    };

    let result = Checkin::new(&config, &cli.journal, &mut ctx).and_then(|entry| entry.save());
    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
