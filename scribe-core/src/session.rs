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

use slotmap::SlotMap;

use crate::config::EngineConfig;
use crate::document::Document;
use crate::error::PatternError;
use crate::highlight::SyntaxKind;
use crate::DocumentId;

/// The set of open documents, all sharing one configuration.
#[derive(Debug, Default)]
pub struct Session {
    documents: SlotMap<DocumentId, Document>,
    config: EngineConfig,
}

impl Session {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            documents: SlotMap::with_key(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Open a document over `text`, highlighted as `kind`.
    pub fn open(&mut self, text: &str, kind: SyntaxKind) -> Result<DocumentId, PatternError> {
        let document = Document::new(text, kind, self.config.clone())?;
        let rows = document.line_count();
        let id = self.documents.insert(document);
        tracing::debug!(?id, ?kind, rows, "opened document");
        Ok(id)
    }

    /// Close a document. Its buffer and caches go with it once the last
    /// handle is dropped.
    pub fn close(&mut self, id: DocumentId) -> Option<Document> {
        let document = self.documents.remove(id)?;
        tracing::debug!(?id, "closed document");
        Some(document)
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.documents.keys()
    }

    /// Rebuild a document's buffer and caches under a different highlighter.
    /// Returns `Ok(false)` when `id` is not open.
    pub fn change_kind(&mut self, id: DocumentId, kind: SyntaxKind) -> Result<bool, PatternError> {
        let Some(document) = self.documents.get(id) else {
            return Ok(false);
        };
        document.change_kind(kind)?;
        tracing::debug!(?id, ?kind, "changed document kind");
        Ok(true)
    }
}
