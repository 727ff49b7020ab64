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

//! The whole-document pass: resolves what each line means in context.
//!
//! Walks rows top to bottom keeping a stack of open block containers,
//! deciding where indented code, fenced code, HTML blocks and reference
//! titles run, and which plain lines are setext headings.

use super::line::{Block, BlockKind, FixedStyle, LineData};

/// Style a line takes from its surroundings; overrides everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunningStyle {
    #[default]
    Default,
    Code,
    FencedCode,
    Title,
    HtmlBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineFlow {
    pub running: RunningStyle,
    /// Visual column where indented code content starts
    pub code_indent: Option<usize>,
    /// Underlined by the next line
    pub setext: bool,
}

fn is_breaking_blank(offset: isize, ld: &LineData) -> bool {
    offset <= 0 && !ld.has_text
}

/// Close containers the line ends, then open the ones it starts.
fn update_open_blocks(open: &mut Vec<Block>, ld: &LineData) {
    for i in (0..open.len()).rev() {
        let block = open[i];
        let offset = ld.indent as isize - block.indent as isize;
        if block.kind == BlockKind::Blockquote && is_breaking_blank(offset, ld) {
            open.truncate(i);
        } else if block.kind.is_list() && is_breaking_blank(offset, ld) {
            open.truncate(i);
            open.push(Block {
                kind: block.kind.suspended(),
                ..block
            });
        } else if block.kind.is_possible_list() {
            if ld.has_text {
                open.truncate(i);
                if offset >= 4 {
                    open.push(Block {
                        kind: block.kind.resumed(),
                        ..block
                    });
                }
            }
        } else {
            break;
        }
    }

    let mut matched = 0;
    for block in open.iter() {
        if ld.blocks.get(matched) == Some(block) {
            matched += 1;
        }
    }
    open.extend_from_slice(&ld.blocks[matched..]);
}

fn is_code_by_offset(kind: BlockKind, offset: isize) -> bool {
    (kind == BlockKind::Blockquote && offset >= 6) || (kind.is_list() && offset >= 8)
}

/// Indented code detection. `open_before` is the stack height before this
/// line's markers were pushed; a continuing code block pops them again.
fn code_indent(
    open: &mut Vec<Block>,
    ld: &LineData,
    current: Option<usize>,
    open_before: usize,
) -> Option<usize> {
    let indent = ld.blocks.first().map_or(ld.indent, |block| block.indent);

    if let Some(current) = current {
        if indent >= current {
            open.truncate(open_before);
            return Some(current);
        }
    }

    if open.is_empty() && indent >= 4 {
        return Some(indent);
    }
    if let Some(first) = open.first() {
        if first.indent >= 4 && indent >= first.indent {
            return Some(first.indent);
        }
    }

    // A nested marker indented far enough past its parent starts code
    let mut found = None;
    let mut len = open.len();
    while len >= 2 {
        let outer = open[len - 2];
        let inner = open[len - 1];
        if is_code_by_offset(outer.kind, inner.indent as isize - outer.indent as isize) {
            found = Some(inner.indent);
            open.truncate(len - 1);
        }
        len -= 1;
    }
    if found.is_some() {
        return found;
    }

    let last = open.last()?;
    is_code_by_offset(last.kind, ld.indent as isize - last.indent as isize).then_some(ld.indent)
}

/// Resolve every row. `data[row]` is the pass-one result for that row.
pub fn compute_flows(data: &[&LineData]) -> Vec<LineFlow> {
    let rows = data.len();
    let mut flows = vec![LineFlow::default(); rows];
    let mut open: Vec<Block> = Vec::new();
    let mut current_code: Option<usize> = None;

    let mut row = 0;
    while row < rows {
        let ld = data[row];
        flows[row].running = RunningStyle::Default;

        let open_before = open.len();
        update_open_blocks(&mut open, ld);
        current_code = code_indent(&mut open, ld, current_code, open_before);

        if current_code.is_some() {
            flows[row].running = RunningStyle::Code;
        } else {
            match ld.fixed {
                FixedStyle::ReferenceWithTitle => {
                    row += 1;
                    continue;
                }
                FixedStyle::ReferenceWithoutTitle => {
                    if row + 1 < rows && data[row + 1].title_only {
                        flows[row + 1] = LineFlow {
                            running: RunningStyle::Title,
                            ..LineFlow::default()
                        };
                        row += 1;
                    }
                    row += 1;
                    continue;
                }
                FixedStyle::BacktickFence | FixedStyle::TildeFence => {
                    let close = (row + 1..rows)
                        .find(|&r| data[r].fixed == ld.fixed && data[r].indent <= ld.indent);
                    if let Some(close) = close {
                        for flow in &mut flows[row + 1..close] {
                            flow.running = RunningStyle::FencedCode;
                        }
                        row = close + 1;
                        continue;
                    }
                }
                FixedStyle::HtmlBoundary => {
                    let starts = row == 0 || {
                        let up = data[row - 1];
                        up.blocks.is_empty() && !up.has_text
                    };
                    if starts {
                        let mut end = row + 1;
                        while end < rows {
                            let up = data[end - 1];
                            let here = data[end];
                            if up.fixed == FixedStyle::HtmlBoundary
                                && here.blocks.is_empty()
                                && !here.has_text
                            {
                                break;
                            }
                            flows[end].running = RunningStyle::HtmlBlock;
                            end += 1;
                        }
                        if end == rows {
                            // Unterminated: everything below is HTML
                            break;
                        }
                        row = end + 1;
                        continue;
                    }
                }
                _ => {}
            }
        }

        flows[row].code_indent = current_code;

        if row > 0
            && matches!(ld.fixed, FixedStyle::EqualsRun | FixedStyle::MinusRun)
            && flows[row].running != RunningStyle::Code
            && data[row - 1].fixed == FixedStyle::Default
        {
            flows[row - 1].setext = true;
        }
        row += 1;
    }
    flows
}

#[cfg(test)]
mod tests {
    use super::super::line::parse_line;
    use super::*;

    use RunningStyle as R;

    fn flows(text: &str) -> Vec<LineFlow> {
        let data: Vec<LineData> = text
            .split('\n')
            .enumerate()
            .map(|(row, line)| parse_line(&line.chars().collect::<Vec<_>>(), row))
            .collect();
        let refs: Vec<&LineData> = data.iter().collect();
        compute_flows(&refs)
    }

    fn running(text: &str) -> Vec<RunningStyle> {
        flows(text).iter().map(|f| f.running).collect()
    }

    #[test]
    fn test_indented_code() {
        assert_eq!(
            running("para\n\n    code\n    more\nend"),
            vec![R::Default, R::Default, R::Code, R::Code, R::Default]
        );
        assert_eq!(flows("    code")[0].code_indent, Some(4));
    }

    #[test]
    fn test_code_inside_blockquote_needs_more_indent() {
        assert_eq!(running(">    quoted"), vec![R::Default]);
        assert_eq!(running(">     code"), vec![R::Code]);
    }

    #[test]
    fn test_list_continuation_is_not_code() {
        // Text indented under a list item continues the item
        assert_eq!(
            running("- item\n\n    still item"),
            vec![R::Default, R::Default, R::Default]
        );
    }

    #[test]
    fn test_fenced_code() {
        assert_eq!(
            running("```\nlet x;\n```\ntext"),
            vec![R::Default, R::FencedCode, R::Default, R::Default]
        );
        assert_eq!(
            running("  ```\na\n```"),
            vec![R::Default, R::FencedCode, R::Default]
        );
        // A closing fence indented deeper than the opener does not close
        assert_eq!(
            running("```\na\n    ```\n```"),
            vec![R::Default, R::FencedCode, R::FencedCode, R::Default]
        );
    }

    #[test]
    fn test_unclosed_fence_marks_nothing() {
        assert_eq!(
            running("```\na\nb"),
            vec![R::Default, R::Default, R::Default]
        );
    }

    #[test]
    fn test_html_block() {
        assert_eq!(
            running("<div>\nx\n</div>\n\ny"),
            vec![R::Default, R::HtmlBlock, R::HtmlBlock, R::Default, R::Default]
        );
        // Must follow a blank line
        assert_eq!(
            running("text\n<div>\nx"),
            vec![R::Default, R::Default, R::Default]
        );
        // Unterminated blocks run to the end
        assert_eq!(
            running("<div>\nx\ny"),
            vec![R::Default, R::HtmlBlock, R::HtmlBlock]
        );
    }

    #[test]
    fn test_reference_title_on_next_line() {
        assert_eq!(
            running("[id]: http://x\n  \"Title\"\nafter"),
            vec![R::Default, R::Title, R::Default]
        );
        assert_eq!(
            running("[id]: http://x\nafter"),
            vec![R::Default, R::Default]
        );
    }

    #[test]
    fn test_setext() {
        let f = flows("Title\n===\n\n---");
        assert!(f[0].setext);
        assert!(!f[1].setext);
        // The blank line is underlined too; coloring decides it is a break
        assert!(f[2].setext);
    }
}
