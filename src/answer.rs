//! Answers and the nested tree they're collected into.
//!
//! Every question resolves to at most one [`Answer`]. A section's
//! answers form an [`AnswerTree`], an insertion-ordered map that also
//! holds nested trees for dotted question keys: `"mood.morning"`
//! places its answer at `mood` → `morning`, with `mood` always a tree
//! and never a leaf.

use std::fmt;

use jiff::Zoned;

use crate::weather::WeatherSnapshot;

/// One captured answer. Skipped or blank questions produce no answer
/// at all rather than a variant here.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Integer(i64),
    Real(f64),
    Text(String),
    Timestamp(Zoned),
    Weather(WeatherSnapshot),
    Tree(AnswerTree),
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Real(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Timestamp(t) => write!(f, "{}", t.strftime("%Y-%m-%d %H:%M")),
            Self::Weather(w) => f.write_str(&w.brief()),
            Self::Tree(_) => f.write_str("…"),
        }
    }
}

/// Insertion-ordered map from question key to answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerTree {
    entries: Vec<(String, Answer)>,
}

impl AnswerTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an answer, replacing in place if the key already exists.
    pub fn insert(&mut self, key: impl Into<String>, answer: Answer) {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = answer;
        } else {
            self.entries.push((key, answer));
        }
    }

    pub fn get(&self, key: &str) -> Option<&Answer> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, a)| a)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Answer)> {
        self.entries.iter().map(|(k, a)| (k.as_str(), a))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The subtree under `key`, created (or converted from a leaf) if
    /// needed. Intermediate path segments are always trees.
    fn subtree(&mut self, key: &str) -> &mut AnswerTree {
        let idx = match self.entries.iter().position(|(k, _)| k == key) {
            Some(i) => {
                if !matches!(self.entries[i].1, Answer::Tree(_)) {
                    self.entries[i].1 = Answer::Tree(AnswerTree::new());
                }
                i
            }
            None => {
                self.entries.push((key.to_string(), Answer::Tree(AnswerTree::new())));
                self.entries.len() - 1
            }
        };
        let Answer::Tree(tree) = &mut self.entries[idx].1 else {
            unreachable!("subtree slot was just made a tree");
        };
        tree
    }
}

/// Write an answer at a dotted-key path, creating intermediate trees.
pub fn set_path(tree: &mut AnswerTree, path: &[&str], answer: Answer) {
    match path {
        [] => {}
        [last] => tree.insert(*last, answer),
        [head, rest @ ..] => set_path(tree.subtree(head), rest, answer),
    }
}

/// Look up an answer at a dotted-key path.
pub fn get_path<'a>(tree: &'a AnswerTree, path: &[&str]) -> Option<&'a Answer> {
    match path {
        [] => None,
        [last] => tree.get(last),
        [head, rest @ ..] => match tree.get(head)? {
            Answer::Tree(sub) => get_path(sub, rest),
            _ => None,
        },
    }
}
