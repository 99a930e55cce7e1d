use std::ops::Range;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Query is matched as plain text
    #[default]
    Literal,
    /// Query is a regular expression
    Regex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// One occurrence of the query in the buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub start: usize,
    pub end: usize,
    /// 0-based line of `start`
    pub line: usize,
    /// Byte column of `start` within its line
    pub column: usize,
}

impl Match {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// What a front end needs to bring a match into view
#[derive(Debug, Clone, PartialEq)]
pub struct Reveal {
    pub index: usize,
    pub range: Range<usize>,
    pub line: usize,
    pub scroll_offset: u32,
}

/// Case-insensitive in-buffer search with wrap-around navigation.
///
/// Matches are recomputed from scratch whenever the query, mode or buffer
/// content changes. A pattern that fails to compile simply finds nothing.
#[derive(Debug, Clone)]
pub struct SearchState {
    query: String,
    mode: SearchMode,
    line_height: u32,
    matches: Vec<Match>,
    current: usize,
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new(SearchMode::Literal, 20)
    }
}

impl SearchState {
    pub fn new(mode: SearchMode, line_height: u32) -> Self {
        Self {
            query: String::new(),
            mode,
            line_height,
            matches: Vec::new(),
            current: 0,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_match(&self) -> Option<&Match> {
        self.matches.get(self.current)
    }

    pub fn set_query(&mut self, query: &str, text: &str) {
        self.query = query.to_string();
        self.rescan(text);
    }

    pub fn set_mode(&mut self, mode: SearchMode, text: &str) {
        self.mode = mode;
        self.rescan(text);
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.matches.clear();
        self.current = 0;
    }

    /// Recompute every match against `text` and go back to the first one
    pub fn rescan(&mut self, text: &str) {
        self.current = 0;
        self.matches = match self.compile() {
            Some(regex) if !text.is_empty() => find_matches(&regex, text),
            _ => Vec::new(),
        };
        // Unicode case folding can pair code points of different widths
        // (KELVIN SIGN with `k`); literal hits must span exactly the query
        if self.mode == SearchMode::Literal {
            let len = self.query.len();
            self.matches.retain(|m| m.end - m.start == len);
        }
    }

    /// Move to the next or previous match, wrapping at either end
    pub fn navigate(&mut self, direction: Direction) -> Option<Reveal> {
        let count = self.matches.len();
        if count == 0 {
            return None;
        }

        self.current = match direction {
            Direction::Next => (self.current + 1) % count,
            Direction::Prev => (self.current + count - 1) % count,
        };
        self.reveal()
    }

    /// Reveal information for the current match without moving
    pub fn reveal(&self) -> Option<Reveal> {
        let m = self.matches.get(self.current)?;
        let line = u32::try_from(m.line).unwrap_or(u32::MAX);
        Some(Reveal {
            index: self.current,
            range: m.range(),
            line: m.line,
            scroll_offset: line.saturating_mul(self.line_height),
        })
    }

    /// "3/7" style counter, "0" when nothing matches
    pub fn status_label(&self) -> String {
        if self.matches.is_empty() {
            "0".to_string()
        } else {
            format!("{}/{}", self.current + 1, self.matches.len())
        }
    }

    fn compile(&self) -> Option<Regex> {
        if self.query.is_empty() {
            return None;
        }

        let pattern = match self.mode {
            SearchMode::Literal => regex::escape(&self.query),
            SearchMode::Regex => self.query.clone(),
        };

        match RegexBuilder::new(&pattern).case_insensitive(true).build() {
            Ok(regex) => Some(regex),
            Err(e) => {
                log::debug!("Ignoring invalid search pattern {:?}: {e}", self.query);
                None
            }
        }
    }
}

fn find_matches(regex: &Regex, text: &str) -> Vec<Match> {
    let mut matches = Vec::new();
    // Line bookkeeping advances with the matches, which arrive in order
    let mut line = 0;
    let mut line_start = 0;
    let mut scanned = 0;

    for found in regex.find_iter(text) {
        if found.start() == found.end() {
            continue;
        }

        for (i, byte) in text.as_bytes()[scanned..found.start()].iter().enumerate() {
            if *byte == b'\n' {
                line += 1;
                line_start = scanned + i + 1;
            }
        }
        scanned = found.start();

        matches.push(Match {
            start: found.start(),
            end: found.end(),
            line,
            column: found.start() - line_start,
        });
    }

    matches
}
