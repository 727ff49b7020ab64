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

//! Error types for the editing engine.
//!
//! Invariant violations (rows out of range, side tables out of step with the
//! buffer) are programmer errors and panic. The types here cover conditions
//! that are detected at construction time or reported back to the shell.

use thiserror::Error;

/// A literal grammar could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("empty pattern")]
    Empty,

    #[error("unclosed group starting at offset {0} in pattern {1:?}")]
    UnclosedGroup(usize, String),

    #[error("unclosed character class starting at offset {0} in pattern {1:?}")]
    UnclosedClass(usize, String),

    #[error("unexpected '{ch}' at offset {offset} in pattern {pattern:?}")]
    Unexpected {
        ch: char,
        offset: usize,
        pattern: String,
    },

    #[error("reversed class range {from}-{to} in pattern {pattern:?}")]
    ReversedRange {
        from: char,
        to: char,
        pattern: String,
    },
}

/// Engine configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// An edit request was refused. Nothing was changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("pasted text has {len} characters, the limit is {limit}")]
    PasteTooLarge { len: usize, limit: usize },
}
