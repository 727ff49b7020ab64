// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Find/replace matching.
//!
//! Matches never span lines. A query is compiled into a [`Matcher`] once per
//! operation; the buffer keeps the last counted query as its active query so
//! that repeated "find next" calls and match highlighting agree.

/// Direction of search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

/// Everything the find/replace UI hands to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchQuery {
    pub target: String,
    pub replacement: Option<String>,
    pub direction: SearchDirection,
    pub case_sensitive: bool,
    pub whole_word: bool,
}

impl MatchQuery {
    /// A forward, case-insensitive, substring query.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    pub fn backward(mut self) -> Self {
        self.direction = SearchDirection::Backward;
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_whole_word(mut self, whole_word: bool) -> Self {
        self.whole_word = whole_word;
        self
    }

    pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = Some(replacement.into());
        self
    }

    pub fn is_forward(&self) -> bool {
        self.direction == SearchDirection::Forward
    }

    /// Target length in characters
    pub fn target_len(&self) -> usize {
        self.target.chars().count()
    }
}

/// Characters that make up a word for whole-word matching.
pub fn is_word_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// A query prepared for scanning lines of characters.
#[derive(Debug, Clone)]
pub struct Matcher {
    target: Vec<char>,
    case_sensitive: bool,
    whole_word: bool,
}

impl Matcher {
    pub fn new(query: &MatchQuery) -> Self {
        Self {
            target: query.target.chars().collect(),
            case_sensitive: query.case_sensitive,
            whole_word: query.whole_word,
        }
    }

    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    fn chars_match(&self, a: char, b: char) -> bool {
        if self.case_sensitive || a == b {
            return a == b;
        }
        a.to_lowercase().eq(b.to_lowercase())
    }

    /// Whether the target occurs in `line` starting exactly at `from`.
    pub fn is_match_at(&self, line: &[char], from: usize) -> bool {
        if self.target.is_empty() || from + self.target.len() > line.len() {
            return false;
        }
        let end = from + self.target.len();
        if self.whole_word
            && ((from > 0 && is_word_part(line[from - 1]))
                || (end < line.len() && is_word_part(line[end])))
        {
            return false;
        }
        line[from..end]
            .iter()
            .zip(&self.target)
            .all(|(&a, &b)| self.chars_match(a, b))
    }

    /// First match starting at or after `from`.
    pub fn index_of(&self, line: &[char], from: usize) -> Option<usize> {
        if self.target.is_empty() || line.len() < self.target.len() {
            return None;
        }
        let last = line.len() - self.target.len();
        (from..=last).find(|&i| self.is_match_at(line, i))
    }

    /// Last match starting at or before `from`.
    pub fn last_index_of(&self, line: &[char], from: usize) -> Option<usize> {
        if self.target.is_empty() || line.len() < self.target.len() {
            return None;
        }
        let start = from.min(line.len() - self.target.len());
        (0..=start).rev().find(|&i| self.is_match_at(line, i))
    }

    /// Start columns of all non-overlapping matches, scanning forward.
    pub fn find_all(&self, line: &[char]) -> Vec<usize> {
        let mut found = Vec::new();
        let mut pos = 0;
        while let Some(begin) = self.index_of(line, pos) {
            found.push(begin);
            pos = begin + self.target.len();
        }
        found
    }
}
