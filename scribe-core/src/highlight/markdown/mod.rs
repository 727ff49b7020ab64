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

//! Markdown highlighting in two passes.
//!
//! Pass one ([`line`]) classifies each line on its own and is cached per
//! row. Pass two ([`flow`]) walks the whole document to resolve constructs
//! that span lines: container nesting, indented and fenced code, HTML
//! blocks, reference titles and setext headings. Pass two reruns only when
//! a pass-one result or the row structure changed.

pub mod flow;
pub mod line;

use crate::buffer::Line;
use crate::rows::{LineEvent, RowTable};

use self::flow::{compute_flows, LineFlow, RunningStyle};
use self::line::{parse_line, FixedStyle, InlineKind, LineData};
use super::{ColorCode, Highlighter, SyntaxKind};

const COLOR_BLOCK: ColorCode = ColorCode::Important;
const COLOR_HEADING: ColorCode = ColorCode::PrimaryBlock;
const COLOR_HTML_BLOCK: ColorCode = ColorCode::PrimaryBlock;
const COLOR_THEMATIC_BREAK: ColorCode = ColorCode::PrimaryBlock;
const COLOR_CODE: ColorCode = ColorCode::SecondaryBlock;
const COLOR_EMPHASIS: ColorCode = ColorCode::PrimaryInline;
const COLOR_LINK: ColorCode = ColorCode::SecondaryInline;

#[derive(Debug)]
pub struct MarkdownHighlighter {
    lines: RowTable<LineData>,
    flows: Vec<LineFlow>,
}

impl MarkdownHighlighter {
    pub fn new(rows: usize) -> Self {
        Self {
            lines: RowTable::with_rows(rows),
            flows: Vec::new(),
        }
    }

    pub fn line_data(&self, row: usize) -> &LineData {
        self.lines.entry(row)
    }

    pub fn flow(&self, row: usize) -> LineFlow {
        self.flows[row]
    }

    /// Column where indented code text starts on a code row.
    fn code_begin(line: &[char], code_indent: usize) -> usize {
        let mut visual = 0;
        for (col, &c) in line.iter().enumerate() {
            visual += if c == '\t' { 4 - visual % 4 } else { 1 };
            if visual > code_indent {
                return col;
            }
        }
        0
    }

    /// Color of the part after the block markers, from the line's own style.
    fn fixed_color(&self, row: usize, ld: &LineData, flow: &LineFlow) -> Option<ColorCode> {
        if flow.setext {
            return Some(COLOR_HEADING);
        }
        match ld.fixed {
            FixedStyle::Default => None,
            FixedStyle::BacktickFence | FixedStyle::TildeFence => Some(COLOR_CODE),
            FixedStyle::EqualsRun | FixedStyle::MinusRun => {
                let up = row.checked_sub(1)?;
                let up_flow = &self.flows[up];
                if !up_flow.setext || up_flow.running == RunningStyle::Code {
                    return None;
                }
                if self.lines.entry(up).has_text {
                    // Underline of a heading
                    Some(COLOR_HEADING)
                } else if ld.fixed == FixedStyle::MinusRun {
                    Some(COLOR_THEMATIC_BREAK)
                } else {
                    None
                }
            }
            FixedStyle::AtxHeading => Some(COLOR_HEADING),
            FixedStyle::ThematicBreak => Some(COLOR_THEMATIC_BREAK),
            FixedStyle::ReferenceWithTitle | FixedStyle::ReferenceWithoutTitle => Some(COLOR_LINK),
            FixedStyle::HtmlBoundary => Some(COLOR_HTML_BLOCK),
        }
    }
}

impl Highlighter for MarkdownHighlighter {
    fn kind(&self) -> SyntaxKind {
        SyntaxKind::Markdown
    }

    fn row_count(&self) -> usize {
        self.lines.len()
    }

    fn apply(&mut self, event: LineEvent) {
        self.lines.apply(event);
        // Pass one treats the first row differently, so a row moving into
        // or out of it must be reparsed
        match event {
            LineEvent::Insert(0) if self.lines.len() > 1 => self.lines.apply(LineEvent::Set(1)),
            LineEvent::Remove(0) if !self.lines.is_empty() => self.lines.apply(LineEvent::Set(0)),
            _ => {}
        }
    }

    fn refresh(&mut self, lines: &[Line]) {
        let changed = self.lines.refresh(|row| parse_line(&lines[row], row));
        if changed || self.flows.len() != lines.len() {
            let data: Vec<&LineData> = (0..self.lines.len()).map(|row| self.lines.entry(row)).collect();
            self.flows = compute_flows(&data);
            tracing::trace!(rows = self.flows.len(), "recomputed markdown block structure");
        }
    }

    fn color_codes(&self, lines: &[Line], row: usize) -> Vec<ColorCode> {
        let line = &lines[row];
        let ld = self.lines.entry(row);
        let flow = self.flows[row];
        let mut codes = vec![ColorCode::Foreground; line.len()];

        match flow.running {
            RunningStyle::Title => codes.fill(COLOR_LINK),
            RunningStyle::FencedCode => codes.fill(COLOR_CODE),
            RunningStyle::HtmlBlock => codes.fill(COLOR_HTML_BLOCK),
            RunningStyle::Code => {
                let begin = Self::code_begin(line, flow.code_indent.unwrap_or(0));
                if !ld.blocks.is_empty() {
                    codes[..begin].fill(COLOR_BLOCK);
                }
                codes[begin..].fill(COLOR_CODE);
            }
            RunningStyle::Default => {
                let begin = ld.begin_col.min(line.len());
                if !ld.blocks.is_empty() {
                    codes[..begin].fill(COLOR_BLOCK);
                }
                if ld.fixed == FixedStyle::Default && !flow.setext {
                    for span in &ld.inlines {
                        let color = match span.kind {
                            InlineKind::CodeSpan => COLOR_CODE,
                            InlineKind::Emphasis => COLOR_EMPHASIS,
                            InlineKind::Autolink | InlineKind::Link | InlineKind::Image => {
                                COLOR_LINK
                            }
                        };
                        codes[span.begin..=span.end].fill(color);
                    }
                }
                if let Some(color) = self.fixed_color(row, ld, &flow) {
                    codes[begin..].fill(color);
                }
            }
        }
        codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ColorCode::*;

    fn lines(text: &str) -> Vec<Line> {
        text.split('\n').map(|l| l.chars().collect()).collect()
    }

    fn highlight(text: &str) -> Vec<Vec<ColorCode>> {
        let lines = lines(text);
        let mut h = MarkdownHighlighter::new(lines.len());
        h.refresh(&lines);
        (0..lines.len()).map(|row| h.color_codes(&lines, row)).collect()
    }

    #[test]
    fn test_fenced_code_block() {
        let codes = highlight("text\n```\nlet x = 1;\n```\nafter");
        assert!(codes[0].iter().all(|&c| c == Foreground));
        assert!(codes[1].iter().all(|&c| c == SecondaryBlock));
        assert!(codes[2].iter().all(|&c| c == SecondaryBlock));
        assert!(codes[3].iter().all(|&c| c == SecondaryBlock));
        assert!(codes[4].iter().all(|&c| c == Foreground));
    }

    #[test]
    fn test_headings() {
        let codes = highlight("# Title\nSub\n===\n\n---");
        assert!(codes[0].iter().all(|&c| c == PrimaryBlock));
        assert!(codes[1].iter().all(|&c| c == PrimaryBlock));
        assert!(codes[2].iter().all(|&c| c == PrimaryBlock));
        // A dash run under a blank line is a thematic break
        assert!(codes[4].iter().all(|&c| c == PrimaryBlock));
    }

    #[test]
    fn test_inline_and_blocks() {
        let codes = highlight("> *a* `b` [l](u)");
        let row = &codes[0];
        assert_eq!(&row[0..2], &[Important, Important]);
        assert_eq!(&row[2..5], &[PrimaryInline; 3]);
        assert_eq!(row[5], Foreground);
        assert_eq!(&row[6..9], &[SecondaryBlock; 3]);
        assert_eq!(&row[10..16], &[SecondaryInline; 6]);
    }

    #[test]
    fn test_indented_code_under_list() {
        let codes = highlight("-         code");
        // Marker and padding up to the code indent, then code
        assert_eq!(codes[0][0], Important);
        assert_eq!(codes[0][10], SecondaryBlock);
        assert_eq!(codes[0][13], SecondaryBlock);
    }

    #[test]
    fn test_reference_and_title() {
        let codes = highlight("[id]: http://x\n  \"Title\"");
        assert!(codes[0].iter().all(|&c| c == SecondaryInline));
        assert!(codes[1].iter().all(|&c| c == SecondaryInline));
    }

    #[test]
    fn test_rows_follow_edits() {
        let mut text = lines("a\n```\nb");
        let mut h = MarkdownHighlighter::new(text.len());
        h.refresh(&text);
        assert_eq!(h.color_codes(&text, 2), vec![Foreground]);

        // Close the fence
        text.push("```".chars().collect());
        h.apply(LineEvent::Insert(3));
        h.refresh(&text);
        assert_eq!(h.row_count(), 4);
        assert_eq!(h.color_codes(&text, 2), vec![SecondaryBlock]);

        // Removing the first row reparses the new first row
        text.remove(0);
        h.apply(LineEvent::Remove(0));
        h.refresh(&text);
        assert_eq!(h.row_count(), 3);
        assert_eq!(h.color_codes(&text, 1), vec![SecondaryBlock]);
    }
}
