//! Input collection.
//!
//! Questions never read the terminal themselves; they go through a
//! [`PromptProvider`]. Two implementations ship: [`GumPrompter`]
//! shells out to the `gum` helper when it's on PATH, and
//! [`ConsolePrompter`] reads plain lines from stdin. Blank input
//! means "no answer" (or "done" for repeated prompts) in every
//! variant.

use std::env;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::Command;

/// Collects one response per call. `Ok(None)` means the user left the
/// prompt blank.
pub trait PromptProvider {
    /// Ask for a number within `[min, max]`. Range enforcement is the
    /// caller's job; parse retries are the provider's.
    fn number(&mut self, prompt: &str, min: f64, max: f64) -> io::Result<Option<f64>>;

    /// Ask for a single line of text.
    fn line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Ask for a multi-line response.
    fn multiline(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Locate a helper binary on PATH.
pub(crate) fn find_on_path(name: &str) -> Option<PathBuf> {
    env::split_paths(&env::var_os("PATH")?)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

// ── Console ──

/// Plain line-reader prompting. Prompts go to `output` (stderr in
/// production) so stdout stays clean.
pub struct ConsolePrompter<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompter<io::BufReader<io::Stdin>, io::Stderr> {
    pub fn stdin() -> Self {
        Self::new(io::BufReader::new(io::stdin()), io::stderr())
    }
}

impl<R: BufRead, W: io::Write> ConsolePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// One raw line, `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim_end_matches(['\r', '\n']).to_string()))
    }
}

impl<R: BufRead, W: io::Write> PromptProvider for ConsolePrompter<R, W> {
    fn number(&mut self, prompt: &str, min: f64, max: f64) -> io::Result<Option<f64>> {
        loop {
            write!(self.output, "{prompt} ({min}-{max}): ")?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            if line.trim().is_empty() {
                return Ok(None);
            }
            if let Ok(n) = line.trim().parse::<f64>() {
                return Ok(Some(n));
            }
            // Not a number; ask again.
        }
    }

    fn line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}: ")?;
        self.output.flush()?;
        let Some(line) = self.read_line()? else {
            return Ok(None);
        };
        Ok(if line.trim().is_empty() { None } else { Some(line) })
    }

    fn multiline(&mut self, prompt: &str) -> io::Result<Option<String>> {
        writeln!(self.output, "{prompt} (end with a single '.'):")?;
        self.output.flush()?;
        let mut lines = Vec::new();
        loop {
            match self.read_line()? {
                None => break,
                Some(line) if line.trim() == "." => break,
                Some(line) => lines.push(line),
            }
        }
        let text = lines.join("\n").trim().to_string();
        Ok(if text.is_empty() { None } else { Some(text) })
    }
}

// ── Gum ──

/// Prompting backed by the `gum` terminal helper.
pub struct GumPrompter {
    path: PathBuf,
}

impl GumPrompter {
    /// Use gum if it's on PATH.
    pub fn detect() -> Option<Self> {
        find_on_path("gum").map(|path| Self { path })
    }

    /// Run a gum subcommand and capture its stdout. A failed exit
    /// (e.g. the user aborting the prompt) reads as blank input.
    fn run(&self, args: &[&str]) -> io::Result<Option<String>> {
        let output = Command::new(&self.path).args(args).output()?;
        if !output.status.success() {
            return Ok(None);
        }
        let text = String::from_utf8_lossy(&output.stdout)
            .trim_end_matches(['\r', '\n'])
            .to_string();
        Ok(if text.trim().is_empty() { None } else { Some(text) })
    }
}

impl PromptProvider for GumPrompter {
    fn number(&mut self, prompt: &str, min: f64, max: f64) -> io::Result<Option<f64>> {
        loop {
            let placeholder = format!("{prompt} ({min}-{max})");
            let Some(text) = self.run(&["input", "--placeholder", &placeholder])? else {
                return Ok(None);
            };
            if let Ok(n) = text.trim().parse::<f64>() {
                return Ok(Some(n));
            }
        }
    }

    fn line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let placeholder = format!("{prompt} (blank to end editing)");
        self.run(&["input", "--placeholder", &placeholder])
    }

    fn multiline(&mut self, prompt: &str) -> io::Result<Option<String>> {
        eprintln!("{prompt} (CTRL-d to save)");
        self.run(&[
            "write",
            "--placeholder",
            prompt,
            "--width",
            "80",
            "--char-limit",
            "0",
        ])
    }
}

/// Deterministic prompting for tests: pops pre-scripted responses in
/// order. An empty-string response reads as blank input.
#[cfg(test)]
pub(crate) struct ScriptedPrompter {
    responses: std::collections::VecDeque<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub(crate) fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
        }
    }

    fn pop(&mut self) -> Option<String> {
        self.responses
            .pop_front()
            .filter(|r| !r.trim().is_empty())
    }
}

#[cfg(test)]
impl PromptProvider for ScriptedPrompter {
    fn number(&mut self, _prompt: &str, _min: f64, _max: f64) -> io::Result<Option<f64>> {
        Ok(self.pop().and_then(|r| r.trim().parse().ok()))
    }

    fn line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        Ok(self.pop())
    }

    fn multiline(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.line(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console(input: &str) -> ConsolePrompter<&[u8], Vec<u8>> {
        ConsolePrompter::new(input.as_bytes(), Vec::new())
    }

    #[test]
    fn line_returns_text() {
        let mut prompter = console("hello there\n");
        assert_eq!(prompter.line("Q").unwrap(), Some("hello there".into()));
    }

    #[test]
    fn blank_line_is_none() {
        let mut prompter = console("   \n");
        assert_eq!(prompter.line("Q").unwrap(), None);
    }

    #[test]
    fn end_of_input_is_none() {
        let mut prompter = console("");
        assert_eq!(prompter.line("Q").unwrap(), None);
    }

    #[test]
    fn number_retries_unparseable_input() {
        let mut prompter = console("three\n3\n");
        assert_eq!(prompter.number("Q", 1.0, 5.0).unwrap(), Some(3.0));
    }

    #[test]
    fn number_blank_is_none() {
        let mut prompter = console("\n");
        assert_eq!(prompter.number("Q", 1.0, 5.0).unwrap(), None);
    }

    #[test]
    fn multiline_collects_until_dot() {
        let mut prompter = console("first\nsecond\n.\n");
        assert_eq!(
            prompter.multiline("Q").unwrap(),
            Some("first\nsecond".into())
        );
    }

    #[test]
    fn multiline_collects_until_eof() {
        let mut prompter = console("only line\n");
        assert_eq!(prompter.multiline("Q").unwrap(), Some("only line".into()));
    }

    #[test]
    fn multiline_blank_is_none() {
        let mut prompter = console(".\n");
        assert_eq!(prompter.multiline("Q").unwrap(), None);
    }
}
