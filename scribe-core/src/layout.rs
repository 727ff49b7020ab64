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

//! Maps buffer positions to pixel coordinates and back.
//!
//! Each row is measured once into a [`LineMetrics`]: the x offset of every
//! column and, with soft wrap on, the columns where the row breaks onto a
//! new visual line. Metrics live in a [`RowTable`] that replays the
//! buffer's line events and are recomputed lazily on the next query.
//! Document width and the running count of visual lines before each row are
//! cached on top and dropped whenever any row changes.

use unicode_width::UnicodeWidthChar;

use crate::buffer::Line;
use crate::config::{EngineConfig, GlyphConfig};
use crate::range::Position;
use crate::rows::{LineEvent, RowTable};

/// Font measurements.
pub trait GlyphMetrics: std::fmt::Debug + Send + Sync {
    /// Advance width of `c`. Never called for tabs.
    fn advance(&self, c: char) -> u32;

    /// Advance width of a space, the unit tab stops are measured in.
    fn space_advance(&self) -> u32 {
        self.advance(' ')
    }

    fn line_height(&self) -> u32;
}

/// Every glyph has the same advance, except that wide (East Asian) glyphs
/// take two when the font is monospaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedGlyphMetrics {
    pub advance: u32,
    pub line_height: u32,
    pub monospaced: bool,
}

impl From<&GlyphConfig> for FixedGlyphMetrics {
    fn from(config: &GlyphConfig) -> Self {
        Self {
            advance: config.advance,
            line_height: config.line_height,
            monospaced: config.monospaced,
        }
    }
}

impl GlyphMetrics for FixedGlyphMetrics {
    fn advance(&self, c: char) -> u32 {
        if self.monospaced && is_wide(c) {
            2 * self.advance
        } else {
            self.advance
        }
    }

    fn line_height(&self) -> u32 {
        self.line_height
    }
}

pub fn is_wide(c: char) -> bool {
    c.width() == Some(2)
}

/// Measured geometry of one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMetrics {
    /// x of each column within its visual line; `xs.len() == len + 1`
    pub xs: Vec<u32>,
    /// Columns that start a new visual line, ascending, followed by a
    /// `len + 1` sentinel
    pub wrap_points: Vec<usize>,
}

impl LineMetrics {
    pub fn segment_count(&self) -> usize {
        self.wrap_points.len()
    }

    /// Visual line within the row that `col` is drawn on.
    fn segment_of(&self, col: usize, at_wrap: bool) -> usize {
        self.wrap_points
            .iter()
            .position(|&point| (at_wrap && point == col) || point > col)
            .unwrap_or(self.wrap_points.len() - 1)
    }
}

/// Everything needed to measure a row, split out so a row can be measured
/// while the row table is borrowed.
#[derive(Debug)]
struct Measure {
    glyphs: Box<dyn GlyphMetrics>,
    tab_width: u32,
    /// Available width when wrapping, `None` when wrap is off
    wrap_width: Option<u32>,
}

impl Measure {
    fn char_width(&self, x: u32, c: char) -> u32 {
        if c == '\t' {
            // Next tab stop measured from the current x
            (x + self.tab_width) / self.tab_width * self.tab_width - x
        } else {
            self.glyphs.advance(c)
        }
    }

    fn line(&self, line: &[char]) -> LineMetrics {
        let len = line.len();
        let mut xs = vec![0; len + 1];
        let mut wrap_points = Vec::new();

        let mut col = 1;
        while col <= len {
            xs[col] = xs[col - 1] + self.char_width(xs[col - 1], line[col - 1]);
            if let Some(limit) = self.wrap_width {
                if xs[col] > limit {
                    if let Some(point) = Self::wrap_point(line, &xs, col) {
                        xs[point] = 0;
                        xs[point + 1] = self.char_width(0, line[point]);
                        wrap_points.push(point);
                        col = point + 2;
                        continue;
                    }
                }
            }
            col += 1;
        }
        wrap_points.push(len + 1);
        LineMetrics { xs, wrap_points }
    }

    /// Nearest column before `overflow` in the current visual line where the
    /// row may break: in front of a wide glyph, or after a wide glyph or
    /// whitespace.
    fn wrap_point(line: &[char], xs: &[u32], overflow: usize) -> Option<usize> {
        for i in (1..overflow).rev() {
            if xs[i] == 0 {
                // Start of the current visual line
                return None;
            }
            if is_wide(line[i]) {
                return Some(i);
            }
            if i > 1 {
                let before = line[i - 1];
                if is_wide(before) || before == ' ' || before == '\t' {
                    return Some(i);
                }
            }
        }
        None
    }
}

#[derive(Debug)]
pub struct Layout {
    measure: Measure,
    caret_width: u32,
    viewport_width: u32,
    viewport_height: u32,
    wrap: bool,
    rows: RowTable<LineMetrics>,
    /// Widest row plus the caret, when wrap is off
    width_cache: Option<u32>,
    /// `segments_before[row]` is the number of visual lines above `row`
    segments_before: Option<Vec<usize>>,
}

impl Layout {
    pub fn new(config: &EngineConfig, rows: usize) -> Self {
        Self::with_glyphs(
            config,
            Box::new(FixedGlyphMetrics::from(&config.glyph)),
            rows,
        )
    }

    pub fn with_glyphs(config: &EngineConfig, glyphs: Box<dyn GlyphMetrics>, rows: usize) -> Self {
        let tab_width = (config.tab_size as u32 * glyphs.space_advance()).max(1);
        Self {
            measure: Measure {
                glyphs,
                tab_width,
                wrap_width: None,
            },
            caret_width: config.glyph.caret_width,
            viewport_width: 0,
            viewport_height: 0,
            // Rows are not broken until a resize supplies the width
            wrap: config.wrap,
            rows: RowTable::with_rows(rows),
            width_cache: None,
            segments_before: None,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_wrap(&self) -> bool {
        self.wrap
    }

    pub fn line_height(&self) -> u32 {
        self.measure.glyphs.line_height()
    }

    pub fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    /// Drop every row for a new buffer of `rows` lines, keeping the glyphs
    /// and viewport.
    pub fn reset(&mut self, rows: usize) {
        self.rows = RowTable::with_rows(rows);
        self.invalidate_aggregates();
    }

    pub fn apply(&mut self, event: LineEvent) {
        self.rows.apply(event);
        self.invalidate_aggregates();
    }

    fn invalidate_aggregates(&mut self) {
        self.width_cache = None;
        self.segments_before = None;
    }

    /// New viewport size or wrap mode. Rows are remeasured only when the
    /// wrap width actually changed.
    pub fn resize(&mut self, width: u32, height: u32, wrap: bool) {
        self.viewport_width = width;
        self.viewport_height = height;
        self.wrap = wrap;
        let wrap_width = wrap.then(|| width.saturating_sub(self.caret_width));
        if wrap_width != self.measure.wrap_width {
            self.measure.wrap_width = wrap_width;
            self.rows.invalidate_all();
            self.invalidate_aggregates();
        }
    }

    pub fn metrics(&mut self, lines: &[Line], row: usize) -> &LineMetrics {
        let measure = &self.measure;
        self.rows.get_or_compute(row, || measure.line(&lines[row]))
    }

    /// x of the caret at `col`. With `at_wrap`, a column that starts a
    /// visual line is placed at the end of the previous one instead.
    pub fn x(&mut self, lines: &[Line], row: usize, col: usize, at_wrap: bool) -> u32 {
        if at_wrap && col > 0 {
            let before = self.metrics(lines, row).xs[col - 1];
            return before + self.measure.char_width(before, lines[row][col - 1]);
        }
        self.metrics(lines, row).xs[col]
    }

    /// y of the top of the visual line holding `col`.
    pub fn y(&mut self, lines: &[Line], row: usize, col: usize, at_wrap: bool) -> u32 {
        let segment = self.metrics(lines, row).segment_of(col, at_wrap);
        let above = self.segments_before(lines, row);
        (above + segment) as u32 * self.line_height()
    }

    /// Drawn width of the character at `col`.
    pub fn column_width(&mut self, lines: &[Line], row: usize, col: usize) -> u32 {
        let xs = &self.metrics(lines, row).xs;
        let (from, to) = (xs[col], xs[col + 1]);
        match to.checked_sub(from) {
            Some(width) if width > 0 => width,
            // The next column starts a visual line
            _ => self.measure.char_width(from, lines[row][col]),
        }
    }

    pub fn segment_count(&mut self, lines: &[Line], row: usize) -> usize {
        self.metrics(lines, row).segment_count()
    }

    fn segments_before(&mut self, lines: &[Line], row: usize) -> usize {
        if !self.wrap {
            return row;
        }
        if self.segments_before.is_none() {
            let mut running = 0;
            let mut before = Vec::with_capacity(lines.len() + 1);
            for r in 0..lines.len() {
                before.push(running);
                running += self.segment_count(lines, r);
            }
            before.push(running);
            self.segments_before = Some(before);
        }
        self.segments_before.as_ref().map_or(row, |before| before[row])
    }

    pub fn document_width(&mut self, lines: &[Line]) -> u32 {
        if self.wrap {
            return self.viewport_width;
        }
        if let Some(width) = self.width_cache {
            return width;
        }
        let mut widest = 0;
        for row in 0..lines.len() {
            let xs = &self.metrics(lines, row).xs;
            widest = widest.max(xs[xs.len() - 1]);
        }
        let width = widest + self.caret_width;
        self.width_cache = Some(width);
        width
    }

    pub fn document_height(&mut self, lines: &[Line]) -> u32 {
        let rows = lines.len();
        let visual = self.segments_before(lines, rows - 1) + self.segment_count(lines, rows - 1);
        visual as u32 * self.line_height()
    }

    /// The caret position closest to the point (x, y), and whether it sits
    /// at the end of a visual line that the row continues past.
    pub fn position_at(&mut self, lines: &[Line], x: u32, y: u32) -> (Position, bool) {
        let line_height = self.line_height();
        let y = y.min(self.document_height(lines).saturating_sub(line_height));

        let mut row = lines.len() - 1;
        for r in 1..lines.len() {
            if self.y(lines, r, 0, false) > y {
                row = r - 1;
                break;
            }
        }

        let len = lines[row].len();
        let mut col = len;
        let mut at_wrap = false;
        for c in 1..=len {
            let cur_y = self.y(lines, row, c, false);
            let cur_x = self.x(lines, row, c, false);
            if cur_y > y || (cur_y + line_height > y && cur_x > x) {
                let width = self.column_width(lines, row, c - 1);
                let prev_x = self.x(lines, row, c - 1, false);
                if x > prev_x + width / 2 {
                    col = c;
                    // Past the midpoint of the last glyph on a wrapped line
                    at_wrap = cur_y > y;
                } else if y > self.y(lines, row, c - 1, false) + line_height {
                    col = c;
                } else {
                    col = c - 1;
                }
                break;
            }
        }
        (Position::new(row, col), at_wrap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<Line> {
        text.split('\n').map(|l| l.chars().collect()).collect()
    }

    fn layout(rows: usize) -> Layout {
        // advance 8, line height 16, caret 1, tab size 4 => tab stops every 32
        Layout::new(&EngineConfig::default(), rows)
    }

    #[test]
    fn test_plain_offsets() {
        let text = lines("abc\nde");
        let mut layout = layout(2);
        assert_eq!(layout.metrics(&text, 0).xs, vec![0, 8, 16, 24]);
        assert_eq!(layout.x(&text, 1, 2, false), 16);
        assert_eq!(layout.y(&text, 1, 0, false), 16);
        assert_eq!(layout.document_width(&text), 25);
        assert_eq!(layout.document_height(&text), 32);
    }

    #[test]
    fn test_tab_stops_from_current_x() {
        let text = lines("\tx\nab\tx\nabcd\tx");
        let mut layout = layout(3);
        // From x = 0 the tab runs to the first stop
        assert_eq!(layout.x(&text, 0, 1, false), 32);
        // From x = 16 it only runs to the same stop
        assert_eq!(layout.x(&text, 1, 3, false), 32);
        assert_eq!(layout.column_width(&text, 1, 2), 16);
        // From exactly on a stop it runs a full tab
        assert_eq!(layout.x(&text, 2, 5, false), 64);
    }

    #[test]
    fn test_wide_glyphs() {
        let text = lines("a中b");
        let mut layout = layout(1);
        assert_eq!(layout.metrics(&text, 0).xs, vec![0, 8, 24, 32]);

        let config = EngineConfig {
            glyph: GlyphConfig {
                monospaced: false,
                ..GlyphConfig::default()
            },
            ..EngineConfig::default()
        };
        let mut proportional = Layout::new(&config, 1);
        assert_eq!(proportional.metrics(&text, 0).xs, vec![0, 8, 16, 24]);
    }

    #[test]
    fn test_wrap_at_space() {
        // 10 columns fit in 81 px, the caret takes one
        let text = lines("hello world again");
        let mut layout = layout(1);
        layout.resize(81, 160, true);

        let metrics = layout.metrics(&text, 0).clone();
        assert_eq!(metrics.wrap_points, vec![6, 12, 18]);
        assert_eq!(metrics.segment_count(), 3);
        assert_eq!(metrics.xs[6], 0);
        assert_eq!(metrics.xs[7], 8);

        assert_eq!(layout.y(&text, 0, 6, false), 16);
        // The end of the first visual line is the same column
        assert_eq!(layout.y(&text, 0, 6, true), 0);
        assert_eq!(layout.x(&text, 0, 6, true), 48);
        assert_eq!(layout.document_height(&text), 48);
        assert_eq!(layout.document_width(&text), 81);
    }

    #[test]
    fn test_unbreakable_row_overflows() {
        let text = lines("abcdefghijklmnop");
        let mut layout = layout(1);
        layout.resize(41, 160, true);
        assert_eq!(layout.segment_count(&text, 0), 1);
        assert_eq!(layout.x(&text, 0, 16, false), 128);
    }

    #[test]
    fn test_wrap_before_wide_glyph() {
        let text = lines("ab中文字");
        let mut layout = layout(1);
        // Four advances fit
        layout.resize(33, 160, true);
        let metrics = layout.metrics(&text, 0).clone();
        assert_eq!(metrics.wrap_points, vec![3, 6]);
        assert_eq!(metrics.xs, vec![0, 8, 16, 0, 16, 32]);
    }

    #[test]
    fn test_rows_follow_events() {
        let mut text = lines("a\nbb");
        let mut layout = layout(2);
        assert_eq!(layout.document_width(&text), 17);

        text.insert(1, "cccc".chars().collect());
        layout.apply(LineEvent::Insert(1));
        assert_eq!(layout.row_count(), 3);
        assert_eq!(layout.document_width(&text), 33);
        assert_eq!(layout.y(&text, 2, 0, false), 32);

        text[0] = "aaaaaaaa".chars().collect();
        layout.apply(LineEvent::Set(0));
        assert_eq!(layout.document_width(&text), 65);
    }

    #[test]
    fn test_position_at() {
        let text = lines("abcd\nxy");
        let mut layout = layout(2);
        assert_eq!(layout.position_at(&text, 0, 0), (Position::new(0, 0), false));
        // Left half of 'c' puts the caret before it, right half after
        assert_eq!(layout.position_at(&text, 19, 4), (Position::new(0, 2), false));
        assert_eq!(layout.position_at(&text, 21, 4), (Position::new(0, 3), false));
        // Past the end of a row
        assert_eq!(layout.position_at(&text, 500, 20), (Position::new(1, 2), false));
        // Below the document clamps to the last row
        assert_eq!(layout.position_at(&text, 0, 900), (Position::new(1, 0), false));
    }

    #[test]
    fn test_position_at_wrapped_row() {
        let text = lines("hello world");
        let mut layout = layout(1);
        layout.resize(81, 160, true);
        // Far right on the first visual line lands at its end
        assert_eq!(layout.position_at(&text, 500, 4), (Position::new(0, 6), true));
        // Far left on the second visual line lands at its start
        assert_eq!(layout.position_at(&text, 0, 20), (Position::new(0, 6), false));
        assert_eq!(layout.position_at(&text, 500, 20), (Position::new(0, 11), false));
    }
}
