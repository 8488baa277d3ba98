//! Best-effort export to Day One via its `dayone2` CLI.
//!
//! Runs only after history and markdown persistence have completed;
//! nothing here can fail the checkin. Every problem is a warning on
//! stderr.

use std::io::Write as _;
use std::process::{Command, Stdio};

use jiff::Zoned;

use crate::prompt::find_on_path;

/// Pipe a rendered entry into `dayone2 new`.
pub fn export(body: &str, journal: Option<&str>, tags: &[String], date: &Zoned) {
    let Some(cli) = find_on_path("dayone2") else {
        eprintln!("Day One CLI not installed, no Day One entry created");
        return;
    };

    let mut command = Command::new(cli);
    if let Some(journal) = journal {
        command.args(["-j", journal]);
    }
    if !tags.is_empty() {
        command.arg("-t").args(tags);
    }
    command
        .args(["--date", &date.strftime("%Y-%m-%d %I:%M %p").to_string()])
        .args(["--", "new"])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    let outcome = (|| {
        let mut child = command.spawn()?;
        if let Some(stdin) = child.stdin.as_mut() {
            stdin.write_all(body.as_bytes())?;
        }
        child.wait()
    })();

    match outcome {
        Ok(status) if status.success() => {
            eprintln!("Entered one entry into Day One");
        }
        Ok(status) => {
            eprintln!("Day One export failed ({status}); entry saved locally");
        }
        Err(e) => {
            eprintln!("Day One export failed ({e}); entry saved locally");
        }
    }
}
