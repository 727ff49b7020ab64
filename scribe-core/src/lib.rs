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

//! Text-editing engine: a line buffer with caret, selection and search,
//! incremental C-like and Markdown highlighters, an undoable command
//! history and a layout engine mapping positions to pixels.

use slotmap::new_key_type;

pub mod buffer;
pub mod config;
pub mod document;
pub mod error;
pub mod highlight;
pub mod history;
pub mod layout;
pub mod range;
pub mod rows;
pub mod search;
pub mod session;

new_key_type! {
    pub struct DocumentId;
}

pub use buffer::{Line, TextBuffer};
pub use config::{EngineConfig, GlyphConfig};
pub use document::{Document, DocumentInner};
pub use error::{ConfigError, EditError, PatternError};
pub use highlight::{ColorCode, Highlighter, Overlay, StyledCell, SyntaxKind};
pub use history::{Command, CommandKind, History, HistoryEntry};
pub use layout::{FixedGlyphMetrics, GlyphMetrics, Layout};
pub use range::{Position, TextRange};
pub use rows::LineEvent;
pub use search::{MatchQuery, SearchDirection};
pub use session::Session;
