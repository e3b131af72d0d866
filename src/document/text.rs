//! Text utilities for position conversion.
//!
//! LSP positions use line/column where column is in UTF-16 code units; the
//! scanner works on byte offsets. This pre-computes line start offsets for
//! O(log n) lookup.

use tower_lsp::lsp_types::Position;

/// Pre-computed line index over a document snapshot.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset where each line starts.
    line_starts: Vec<usize>,
    /// Source text (needed for UTF-16 column calculation).
    source: String,
}

impl LineIndex {
    /// Build a line index from source text.
    pub fn new(source: String) -> Self {
        let mut line_starts = vec![0];

        for (i, c) in source.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }

        Self {
            line_starts,
            source,
        }
    }

    /// Get the source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Convert an LSP position to a byte offset, always on a char boundary.
    ///
    /// Total: out-of-bounds lines clamp to the end of the document and
    /// out-of-bounds columns clamp to the end of the line, so every position
    /// yields a valid caret offset.
    pub fn position_to_offset(&self, position: Position) -> usize {
        let line = position.line as usize;

        if line >= self.line_starts.len() {
            return self.source.len();
        }

        let line_start = self.line_starts[line];
        let line_end = self
            .line_starts
            .get(line + 1)
            .map(|&end| end.saturating_sub(1)) // Exclude newline
            .unwrap_or(self.source.len());

        let line_slice = &self.source[line_start..line_end];

        // Walk UTF-16 code units to find the byte offset
        let mut utf16_col = 0u32;
        for (i, c) in line_slice.char_indices() {
            if utf16_col >= position.character {
                return line_start + i;
            }
            utf16_col += c.len_utf16() as u32;
        }

        // Position is at or past end of line
        line_end.min(self.source.len())
    }
}
