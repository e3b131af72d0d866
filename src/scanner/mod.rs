//! Math-span membership detection.
//!
//! The core question this crate answers: does a caret offset lie inside a
//! math span (inline `$...$` or block `$$...$$`)? Two interchangeable
//! strategies implement it — a structural scan over a parsed span tree and a
//! textual streaming scan over the raw document. They agree everywhere except
//! for a caret sitting exactly one position past a closing delimiter, where
//! the structural scan answers outside and the textual scan answers inside;
//! both behaviors are fixed and tested.

mod spans;
mod textual;

use serde::Deserialize;

pub use spans::{scan_spans, MathSpan, SpanKind, SpanTree, StructuralScanner};
pub use textual::TextualScanner;

/// Decides caret membership in math spans.
///
/// Implementations are total: any caret offset is accepted, offsets past the
/// end of the document are clamped to the document length. Caret offsets are
/// byte offsets into the UTF-8 snapshot; callers only ever produce offsets on
/// char boundaries, and `$` is ASCII, so the scan operates on bytes.
pub trait MathScanner {
    /// Whether `caret` lies inside a math span of `text`.
    fn is_inside_math(&self, text: &str, caret: usize) -> bool;
}

/// Which scan strategy a watcher uses, fixed at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStrategy {
    /// Parse the document into a span tree, then resolve the caret against
    /// it. Closing delimiters are exclusive boundaries.
    #[default]
    Structural,
    /// Single left-to-right streaming pass with end-inclusive containment.
    Textual,
}

/// Construct the scanner for a strategy.
pub fn scanner_for(strategy: ScanStrategy) -> Box<dyn MathScanner + Send + Sync> {
    match strategy {
        ScanStrategy::Structural => Box::new(StructuralScanner),
        ScanStrategy::Textual => Box::new(TextualScanner),
    }
}

/// A math delimiter token found in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delimiter {
    /// A single `$` not followed by another `$`.
    Inline,
    /// A `$$` pair, consumed as one token.
    Block,
}

/// Classify the delimiter starting at byte `i`, if any.
///
/// A `$` preceded by an odd number of backslashes is escaped and never a
/// delimiter.
pub(crate) fn delimiter_at(bytes: &[u8], i: usize) -> Option<Delimiter> {
    if bytes[i] != b'$' || is_escaped(bytes, i) {
        return None;
    }
    if i + 1 < bytes.len() && bytes[i + 1] == b'$' {
        Some(Delimiter::Block)
    } else {
        Some(Delimiter::Inline)
    }
}

fn is_escaped(bytes: &[u8], i: usize) -> bool {
    let mut backslashes = 0;
    let mut j = i;
    while j > 0 && bytes[j - 1] == b'\\' {
        backslashes += 1;
        j -= 1;
    }
    backslashes % 2 == 1
}
