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

//! A tiny pattern language for validating numeric literals.
//!
//! Patterns are concatenations of atoms, each optionally followed by `+`
//! (one or more) or `?` (zero or one):
//!
//! - a plain character, matched literally (`.` is a literal dot)
//! - a character class `[...]` with `a-z` style ranges; a `-` right after
//!   `[` or right before `]` is literal
//! - a group `(...)`, which may nest
//!
//! Matching is greedy and never backtracks: each atom consumes as much as it
//! can and the next atom starts where it stopped. Number grammars are written
//! so that this is enough.

use crate::error::PatternError;

/// Grammars accepted as numeric literals by the C-like highlighter.
pub const NUMBER_PATTERNS: [&str; 8] = [
    "0[lL]?",
    "[1-9]([0-9]+)?[lL]?",
    "0[xX][0-9a-fA-F]+[lL]?",
    "0[0-7]+[lL]?",
    "[0-9]+.([0-9]+)?([eE][+-]?[0-9]+)?[fFdD]?",
    ".[0-9]+([eE][+-]?[0-9]+)?[fFdD]?",
    "[0-9]+([eE][+-]?[0-9]+)[fFdD]?",
    "[0-9]+([eE][+-]?[0-9]+)?[fFdD]",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Atom {
    Class(Vec<char>),
    Group(Vec<Rule>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Rule {
    atom: Atom,
    min: usize,
    max: usize,
}

impl Rule {
    fn new(atom: Atom) -> Self {
        Self { atom, min: 1, max: 1 }
    }

    /// Greedy match at `pos`; returns the position after the match.
    fn match_at(&self, s: &[char], mut pos: usize) -> Option<usize> {
        let mut count = 0;
        match &self.atom {
            Atom::Class(set) => {
                while pos < s.len() && count < self.max && set.contains(&s[pos]) {
                    count += 1;
                    pos += 1;
                }
            }
            Atom::Group(rules) => {
                while count < self.max {
                    let Some(next) = match_sequence(rules, s, pos) else {
                        break;
                    };
                    count += 1;
                    if next == pos {
                        // An empty iteration would repeat forever
                        break;
                    }
                    pos = next;
                }
            }
        }
        (count >= self.min).then_some(pos)
    }
}

fn match_sequence(rules: &[Rule], s: &[char], mut pos: usize) -> Option<usize> {
    for rule in rules {
        pos = rule.match_at(s, pos)?;
    }
    Some(pos)
}

/// One compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    rules: Vec<Rule>,
}

impl Pattern {
    pub fn compile(source: &str) -> Result<Self, PatternError> {
        if source.is_empty() {
            return Err(PatternError::Empty);
        }
        let mut parser = Parser {
            source,
            chars: source.chars().collect(),
            pos: 0,
        };
        let rules = parser.sequence(None)?;
        Ok(Self { rules })
    }

    /// Length of the greedy match at the start of `s`, if any.
    pub fn match_len(&self, s: &[char]) -> Option<usize> {
        match_sequence(&self.rules, s, 0)
    }

    /// Whether the pattern consumes all of `s`.
    pub fn is_full_match(&self, s: &[char]) -> bool {
        self.match_len(s) == Some(s.len())
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl Parser<'_> {
    fn unexpected(&self, ch: char, offset: usize) -> PatternError {
        PatternError::Unexpected {
            ch,
            offset,
            pattern: self.source.to_string(),
        }
    }

    /// Parse atoms until the end of input, or until `)` when inside a group
    /// opened at offset `group`.
    fn sequence(&mut self, group: Option<usize>) -> Result<Vec<Rule>, PatternError> {
        let mut rules = Vec::new();
        while let Some(&c) = self.chars.get(self.pos) {
            let offset = self.pos;
            self.pos += 1;
            let atom = match c {
                '(' => Atom::Group(self.sequence(Some(offset))?),
                ')' if group.is_some() => return Ok(rules),
                '[' => Atom::Class(self.class(offset)?),
                ')' | ']' | '+' | '?' => return Err(self.unexpected(c, offset)),
                c => Atom::Class(vec![c]),
            };
            let mut rule = Rule::new(atom);
            match self.chars.get(self.pos) {
                Some('+') => {
                    rule.max = usize::MAX;
                    self.pos += 1;
                }
                Some('?') => {
                    rule.min = 0;
                    self.pos += 1;
                }
                _ => {}
            }
            rules.push(rule);
        }
        match group {
            Some(offset) => Err(PatternError::UnclosedGroup(offset, self.source.to_string())),
            None => Ok(rules),
        }
    }

    /// Parse a class body after its `[` at offset `open`.
    fn class(&mut self, open: usize) -> Result<Vec<char>, PatternError> {
        let source = self.source;
        let unclosed = || PatternError::UnclosedClass(open, source.to_string());
        let mut set = Vec::new();
        loop {
            let offset = self.pos;
            let c = *self.chars.get(offset).ok_or_else(unclosed)?;
            self.pos += 1;
            match c {
                ']' if set.is_empty() => return Err(self.unexpected(c, offset)),
                ']' => return Ok(set),
                '-' if offset > open + 1 && self.chars.get(offset + 1) != Some(&']') => {
                    let from = self.chars[offset - 1];
                    let to = *self.chars.get(offset + 1).ok_or_else(unclosed)?;
                    if to < from {
                        return Err(PatternError::ReversedRange {
                            from,
                            to,
                            pattern: source.to_string(),
                        });
                    }
                    // `from` is already in the set
                    set.extend((from..=to).skip(1));
                    self.pos += 1;
                }
                c => set.push(c),
            }
        }
    }
}

/// A set of alternative patterns; a string is accepted when any pattern
/// matches all of it.
#[derive(Debug, Clone)]
pub struct LiteralSet {
    patterns: Vec<Pattern>,
}

impl LiteralSet {
    pub fn compile(sources: &[&str]) -> Result<Self, PatternError> {
        let patterns = sources
            .iter()
            .map(|source| Pattern::compile(source))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// The numeric literal grammars.
    pub fn numbers() -> Result<Self, PatternError> {
        Self::compile(&NUMBER_PATTERNS)
    }

    pub fn accepts(&self, s: &[char]) -> bool {
        !s.is_empty() && self.patterns.iter().any(|p| p.is_full_match(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_number_grammars() {
        let numbers = LiteralSet::numbers().unwrap();
        for ok in [
            "0", "0L", "7", "42", "123l", "0x1F", "0XffL", "017", "1.", "1.5", "3.14e10",
            "2.5E-3f", ".5", ".5d", "1e9", "1E+2D", "10f",
        ] {
            assert!(numbers.accepts(&chars(ok)), "{ok} should be a number");
        }
        for bad in ["0x", "1e", "08x", "1.2.3", "abc", "1ee2", ""] {
            assert!(!numbers.accepts(&chars(bad)), "{bad} should not be a number");
        }
    }

    #[test]
    fn test_class_ranges() {
        let pattern = Pattern::compile("[a-c-]+").unwrap();
        assert!(pattern.is_full_match(&chars("abc-")));
        assert!(!pattern.is_full_match(&chars("abd")));

        let pattern = Pattern::compile("[+-]?x").unwrap();
        assert!(pattern.is_full_match(&chars("-x")));
        assert!(pattern.is_full_match(&chars("x")));
    }

    #[test]
    fn test_nested_groups() {
        let pattern = Pattern::compile("a(b(c)?)+").unwrap();
        assert!(pattern.is_full_match(&chars("abcbbc")));
        assert_eq!(pattern.match_len(&chars("abx")), Some(2));
        assert_eq!(pattern.match_len(&chars("ax")), None);
    }

    #[test]
    fn test_greedy_without_backtracking() {
        // The class eats the final digit the second atom needed
        let pattern = Pattern::compile("[0-9]+5").unwrap();
        assert!(!pattern.is_full_match(&chars("125")));
    }

    #[test]
    fn test_empty_group_repetition_terminates() {
        let pattern = Pattern::compile("(a?)+b").unwrap();
        assert!(pattern.is_full_match(&chars("b")));
        assert!(pattern.is_full_match(&chars("aab")));
    }

    #[test]
    fn test_malformed_patterns() {
        assert_eq!(Pattern::compile(""), Err(PatternError::Empty));
        assert!(matches!(
            Pattern::compile("ab(c"),
            Err(PatternError::UnclosedGroup(2, _))
        ));
        assert!(matches!(
            Pattern::compile("[0-9"),
            Err(PatternError::UnclosedClass(0, _))
        ));
        assert!(matches!(
            Pattern::compile("+a"),
            Err(PatternError::Unexpected { ch: '+', offset: 0, .. })
        ));
        assert!(matches!(
            Pattern::compile("a)"),
            Err(PatternError::Unexpected { ch: ')', .. })
        ));
        assert!(matches!(
            Pattern::compile("[z-a]"),
            Err(PatternError::ReversedRange { from: 'z', to: 'a', .. })
        ));
        assert!(LiteralSet::compile(&["0", "(("]).is_err());
    }
}
