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

//! Facts about a single Markdown line, derived without looking at its
//! neighbours.

use crate::highlight::is_blank;

/// Block container kinds. Lines only ever carry the first three; the
/// "possible" kinds appear on the open-block stack for lists interrupted by
/// a blank line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Blockquote,
    BulletList,
    OrderedList,
    PossibleBulletList,
    PossibleOrderedList,
}

impl BlockKind {
    pub fn is_list(self) -> bool {
        matches!(self, BlockKind::BulletList | BlockKind::OrderedList)
    }

    pub fn is_possible_list(self) -> bool {
        matches!(
            self,
            BlockKind::PossibleBulletList | BlockKind::PossibleOrderedList
        )
    }

    /// A list closed by a blank line may still resume.
    pub fn suspended(self) -> BlockKind {
        match self {
            BlockKind::BulletList => BlockKind::PossibleBulletList,
            BlockKind::OrderedList => BlockKind::PossibleOrderedList,
            other => other,
        }
    }

    pub fn resumed(self) -> BlockKind {
        match self {
            BlockKind::PossibleBulletList => BlockKind::BulletList,
            BlockKind::PossibleOrderedList => BlockKind::OrderedList,
            other => other,
        }
    }
}

/// A block container and the visual column of its marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub indent: usize,
}

/// What a line is on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixedStyle {
    #[default]
    Default,
    /// A run of `=`, a setext underline candidate
    EqualsRun,
    /// A run of `-`, a setext underline or thematic break candidate
    MinusRun,
    AtxHeading,
    ThematicBreak,
    BacktickFence,
    TildeFence,
    ReferenceWithTitle,
    ReferenceWithoutTitle,
    HtmlBoundary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineKind {
    CodeSpan,
    Emphasis,
    Autolink,
    Link,
    Image,
}

/// An inline element; `end` is the column of its last character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineSpan {
    pub kind: InlineKind,
    pub begin: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineData {
    pub fixed: FixedStyle,
    /// Visual indentation after the block markers
    pub indent: usize,
    /// First column after leading whitespace and block markers
    pub begin_col: usize,
    pub has_text: bool,
    pub blocks: Vec<Block>,
    pub inlines: Vec<InlineSpan>,
    /// The whole line is a link title: `"..."`, `'...'` or `(...)`
    pub title_only: bool,
}

fn find_blank(line: &[char], from: usize) -> Option<usize> {
    (from..line.len()).find(|&i| is_blank(line[i]))
}

fn find_non_blank(line: &[char], from: usize) -> Option<usize> {
    (from..line.len()).find(|&i| !is_blank(line[i]))
}

fn count_digits(line: &[char], from: usize) -> usize {
    line[from..].iter().take_while(|c| c.is_ascii_digit()).count()
}

/// Length of the run of `c` starting at `from`. The character at `from`
/// itself is always counted.
fn count_run(line: &[char], from: usize, c: char) -> usize {
    1 + line
        .get(from + 1..)
        .map_or(0, |rest| rest.iter().take_while(|&&x| x == c).count())
}

/// Next unescaped `c` at or after `from`.
fn find_char(line: &[char], from: usize, c: char) -> Option<usize> {
    let mut i = from;
    while i < line.len() {
        if line[i] == '\\' {
            i += 2;
            continue;
        }
        if line[i] == c {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// End column of the next run of exactly `count` copies of `c`.
fn find_run(line: &[char], from: usize, c: char, count: usize) -> Option<usize> {
    let mut pos = from;
    while pos < line.len() {
        pos = find_char(line, pos, c)?;
        let run = count_run(line, pos, c);
        if run == count {
            return Some(pos + count - 1);
        }
        pos += run;
    }
    None
}

/// Closing column of a link starting with `[` at `begin`: `[a](b)`,
/// `[a][b]` or `[a] [b]`.
fn link_end(line: &[char], begin: usize) -> Option<usize> {
    let pos = find_char(line, begin + 1, ']')?;
    match line.get(pos + 1)? {
        ' ' if line.get(pos + 2).is_some_and(|&c| c != '[') => None,
        ' ' => find_char(line, pos + 3, ']'),
        '[' => find_char(line, pos + 2, ']'),
        '(' => find_char(line, pos + 2, ')'),
        _ => None,
    }
}

fn image_end(line: &[char], begin: usize) -> Option<usize> {
    (line.get(begin + 1) == Some(&'['))
        .then(|| link_end(line, begin + 1))
        .flatten()
}

fn parse_inlines(line: &[char], begin: usize) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    let mut push = |kind, begin, end| spans.push(InlineSpan { kind, begin, end });
    let mut pos = begin;
    while pos < line.len() {
        let c = line[pos];
        match c {
            '`' => {
                let count = count_run(line, pos, c);
                match find_run(line, pos + count, c, count) {
                    Some(end) => {
                        push(InlineKind::CodeSpan, pos, end);
                        pos = end;
                    }
                    None => pos += count - 1,
                }
            }
            '*' | '_' => {
                let count = count_run(line, pos, c);
                let end = if count > 2 {
                    None
                } else {
                    find_run(line, pos + count, c, count)
                };
                match end {
                    Some(end) => {
                        push(InlineKind::Emphasis, pos, end);
                        pos = end;
                    }
                    None => pos += count - 1,
                }
            }
            '<' => {
                if let Some(end) = find_char(line, pos + 1, '>') {
                    push(InlineKind::Autolink, pos, end);
                    pos = end;
                }
            }
            '!' => {
                if let Some(end) = image_end(line, pos) {
                    push(InlineKind::Image, pos, end);
                    pos = end;
                }
            }
            '[' => {
                if let Some(end) = link_end(line, pos) {
                    push(InlineKind::Link, pos, end);
                    pos = end;
                }
            }
            _ => {}
        }
        pos += 1;
    }
    spans
}

/// Three or more of `*`, `-` or `_`, optionally separated by blanks.
fn has_thematic_break(line: &[char], begin: usize) -> bool {
    let Some(&c) = line.get(begin) else {
        return false;
    };
    if !matches!(c, '*' | '-' | '_') {
        return false;
    }
    let mut count = 1;
    for &x in &line[begin + 1..] {
        if x == c {
            count += 1;
        } else if !is_blank(x) {
            return false;
        }
    }
    count >= 3
}

/// Whether the rest of the line from `begin` is exactly one quoted or
/// parenthesized title, with blanks around it.
pub fn has_title(line: &[char], begin: usize) -> bool {
    let mut quoted = false;
    let mut pos = begin;
    while pos < line.len() {
        let c = line[pos];
        if is_blank(c) {
            pos += 1;
        } else if !quoted && matches!(c, '"' | '\'' | '(') {
            let close = if c == '(' { ')' } else { c };
            let Some(end) = find_char(line, pos + 1, close) else {
                return false;
            };
            quoted = true;
            pos = end + 1;
        } else {
            return false;
        }
    }
    quoted
}

/// Visual column of `col`, with tab stops every four columns.
fn visual_col(line: &[char], col: usize) -> usize {
    line[..col].iter().fold(0, |v, &c| {
        if c == '\t' {
            v + 4 - v % 4
        } else {
            v + 1
        }
    })
}

/// Classify a line. `row` matters only in that `=`/`-` runs on the first
/// row cannot underline anything.
pub fn parse_line(line: &[char], row: usize) -> LineData {
    let mut ld = LineData {
        title_only: has_title(line, 0),
        ..LineData::default()
    };
    let mut indent = 0;
    let mut begin_col = 0;
    let mut col = 0;

    while col < line.len() {
        let c = line[col];
        if is_blank(c) {
            indent += if c == '\t' {
                4 - visual_col(line, col) % 4
            } else {
                1
            };
            begin_col += 1;
            col += 1;
            continue;
        }

        let blocks = ld.blocks.len();
        if matches!(c, '*' | '+' | '-') && line.get(col + 1).is_some_and(|&n| is_blank(n)) {
            if find_non_blank(line, col + 1).is_some() {
                // Blanks may separate the characters of a thematic break
                if has_thematic_break(line, begin_col) {
                    ld.fixed = FixedStyle::ThematicBreak;
                    break;
                }
                ld.blocks.push(Block {
                    kind: BlockKind::BulletList,
                    indent,
                });
                indent += 1;
                begin_col += 1;
            }
        } else if matches!(c, '=' | '-') && ld.blocks.is_empty() && row > 0 {
            let len = count_run(line, col, c);
            if find_non_blank(line, col + len).is_none() {
                ld.fixed = if c == '=' {
                    FixedStyle::EqualsRun
                } else {
                    FixedStyle::MinusRun
                };
                break;
            }
        } else if c == '`' || c == '~' {
            if count_run(line, begin_col, c) >= 3 {
                ld.fixed = if c == '`' {
                    FixedStyle::BacktickFence
                } else {
                    FixedStyle::TildeFence
                };
                break;
            }
        } else if c == '#' {
            let hashes = count_run(line, col, '#');
            if hashes <= 6 && line.get(col + hashes).is_some_and(|&n| is_blank(n)) {
                ld.fixed = FixedStyle::AtxHeading;
                break;
            }
        } else if c == '>' {
            ld.blocks.push(Block {
                kind: BlockKind::Blockquote,
                indent,
            });
            indent += 1;
            begin_col += 1;
        } else if c.is_ascii_digit() {
            let len = count_digits(line, col);
            if col + len + 1 < line.len() && line[col + len] == '.' && is_blank(line[col + len + 1])
            {
                ld.blocks.push(Block {
                    kind: BlockKind::OrderedList,
                    indent,
                });
                col += len;
                indent += len + 1;
                begin_col += len + 1;
            }
        } else if c == '[' {
            if let Some(style) = reference_style(line, col) {
                ld.fixed = style;
                break;
            }
        } else if c == '<' && col == 0 {
            ld.fixed = FixedStyle::HtmlBoundary;
            break;
        }

        if blocks == ld.blocks.len() {
            ld.has_text = true;
            ld.inlines = parse_inlines(line, col);
            break;
        }
        col += 1;
    }

    ld.indent = indent;
    ld.begin_col = begin_col;
    if !matches!(ld.fixed, FixedStyle::ThematicBreak | FixedStyle::MinusRun)
        && has_thematic_break(line, begin_col)
    {
        ld.fixed = FixedStyle::ThematicBreak;
    }
    ld
}

/// Recognize a link reference definition `[id]: url "title"` starting at
/// the `[` in column `col`.
fn reference_style(line: &[char], col: usize) -> Option<FixedStyle> {
    let close = find_char(line, col + 1, ']')?;
    if line.get(close + 1) != Some(&':') {
        return None;
    }
    let url = find_non_blank(line, close + 2)?;
    match find_blank(line, url) {
        None => Some(FixedStyle::ReferenceWithoutTitle),
        Some(gap) if has_title(line, gap) => Some(FixedStyle::ReferenceWithTitle),
        Some(gap) if find_non_blank(line, gap + 1).is_none() => {
            Some(FixedStyle::ReferenceWithoutTitle)
        }
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str, row: usize) -> LineData {
        let line: Vec<char> = text.chars().collect();
        parse_line(&line, row)
    }

    fn spans(text: &str) -> Vec<(InlineKind, usize, usize)> {
        parse(text, 0)
            .inlines
            .iter()
            .map(|s| (s.kind, s.begin, s.end))
            .collect()
    }

    #[test]
    fn test_fixed_styles() {
        assert_eq!(parse("# Title", 0).fixed, FixedStyle::AtxHeading);
        assert_eq!(parse("####### x", 0).fixed, FixedStyle::Default);
        assert_eq!(parse("#tag", 0).fixed, FixedStyle::Default);
        assert_eq!(parse("===", 1).fixed, FixedStyle::EqualsRun);
        assert_eq!(parse("---", 1).fixed, FixedStyle::MinusRun);
        // The first row cannot be an underline
        assert_eq!(parse("---", 0).fixed, FixedStyle::ThematicBreak);
        assert_eq!(parse("* * *", 0).fixed, FixedStyle::ThematicBreak);
        assert_eq!(parse("```rust", 0).fixed, FixedStyle::BacktickFence);
        assert_eq!(parse("  ~~~", 0).fixed, FixedStyle::TildeFence);
        assert_eq!(parse("<div>", 0).fixed, FixedStyle::HtmlBoundary);
        assert_eq!(parse(" <div>", 0).fixed, FixedStyle::Default);
    }

    #[test]
    fn test_reference_definitions() {
        assert_eq!(
            parse("[id]: http://x \"Title\"", 0).fixed,
            FixedStyle::ReferenceWithTitle
        );
        assert_eq!(
            parse("[id]: http://x", 0).fixed,
            FixedStyle::ReferenceWithoutTitle
        );
        assert_eq!(
            parse("[id]: http://x   ", 0).fixed,
            FixedStyle::ReferenceWithoutTitle
        );
        assert_eq!(parse("[id]: http://x junk", 0).fixed, FixedStyle::Default);
        assert!(parse("  'a title'", 0).title_only);
        assert!(!parse("'a' b", 0).title_only);
    }

    #[test]
    fn test_block_markers() {
        let ld = parse("> - 1. item", 0);
        let kinds: Vec<(BlockKind, usize)> = ld.blocks.iter().map(|b| (b.kind, b.indent)).collect();
        assert_eq!(
            kinds,
            vec![
                (BlockKind::Blockquote, 0),
                (BlockKind::BulletList, 2),
                (BlockKind::OrderedList, 4),
            ]
        );
        assert_eq!(ld.begin_col, 7);
        assert_eq!(ld.indent, 7);
        assert!(ld.has_text);
    }

    #[test]
    fn test_tab_indent_uses_tab_stops() {
        let ld = parse("  \tcode", 0);
        assert_eq!(ld.indent, 4);
        assert_eq!(ld.begin_col, 3);
    }

    #[test]
    fn test_inline_spans() {
        assert_eq!(
            spans("*a* `b` __c__"),
            vec![
                (InlineKind::Emphasis, 0, 2),
                (InlineKind::CodeSpan, 4, 6),
                (InlineKind::Emphasis, 8, 12),
            ]
        );
        assert_eq!(
            spans("see [a](b) and ![i][r] <http://x>"),
            vec![
                (InlineKind::Link, 4, 9),
                (InlineKind::Image, 15, 21),
                (InlineKind::Autolink, 23, 32),
            ]
        );
        // Escaped delimiters do not close
        assert!(spans("*a\\*").is_empty());
        // Runs longer than two never emphasize
        assert!(spans("***a***").is_empty());
    }
}
