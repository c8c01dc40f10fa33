//! LSP text document representation.
//!
//! [`TextDocument`] stores open file content with version tracking. Its
//! [`LineIndex`] is rebuilt after every edit so position lookups stay cheap
//! for the completion and hover requests that follow each keystroke.

use cotton_source::LineCol;
use cotton_source::LineIndex;
use cotton_source::Offset;
use cotton_source::PositionEncoding;
use tower_lsp_server::ls_types;

/// In-memory representation of an open document.
#[derive(Clone, Debug)]
pub struct TextDocument {
    content: String,
    version: i32,
    language_id: String,
    line_index: LineIndex,
}

impl TextDocument {
    #[must_use]
    pub fn new(content: String, version: i32, language_id: impl Into<String>) -> Self {
        let line_index = LineIndex::from_text(&content);
        Self {
            content,
            version,
            language_id: language_id.into(),
            line_index,
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn version(&self) -> i32 {
        self.version
    }

    #[must_use]
    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    #[must_use]
    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// Apply a batch of content changes from `textDocument/didChange`.
    ///
    /// Changes apply in order, each against the result of the previous one.
    /// A change whose range no longer maps into the document is dropped.
    pub fn update(
        &mut self,
        changes: Vec<ls_types::TextDocumentContentChangeEvent>,
        version: i32,
        encoding: PositionEncoding,
    ) {
        for change in changes {
            match change.range {
                Some(range) => self.apply_change(range, &change.text, encoding),
                None => self.set_content(change.text),
            }
        }
        self.version = version;
    }

    fn apply_change(&mut self, range: ls_types::Range, new_text: &str, encoding: PositionEncoding) {
        let (Some(start), Some(end)) = (
            self.position_to_offset(range.start, encoding),
            self.position_to_offset(range.end, encoding),
        ) else {
            tracing::warn!(?range, "Dropping change with a range outside the document");
            return;
        };

        let (start, end) = (start.as_usize(), end.as_usize().max(start.as_usize()));

        let mut content =
            String::with_capacity(self.content.len() - (end - start) + new_text.len());
        content.push_str(&self.content[..start]);
        content.push_str(new_text);
        content.push_str(&self.content[end..]);

        self.set_content(content);
    }

    pub fn set_content(&mut self, content: String) {
        self.content = content;
        self.line_index = LineIndex::from_text(&self.content);
    }

    #[must_use]
    pub fn position_to_offset(
        &self,
        position: ls_types::Position,
        encoding: PositionEncoding,
    ) -> Option<Offset> {
        let line_col = LineCol::new(position.line, position.character);
        self.line_index.offset(line_col, &self.content, encoding)
    }

    #[must_use]
    pub fn offset_to_position(&self, offset: Offset, encoding: PositionEncoding) -> ls_types::Position {
        let line_col = self.line_index.line_col(offset, &self.content, encoding);
        ls_types::Position::new(line_col.line(), line_col.column())
    }
}
