//! Span-tree parsing and the structural scan strategy.
//!
//! The document is parsed once into an ordered list of math spans, then
//! flattened into a tiling of delimiter/body/text nodes. Membership is
//! resolved against that tiling the way an editor syntax tree is consulted:
//! find the smallest node enclosing the caret, and at node boundaries fall
//! back to the caret's two neighbors. Closing delimiters are exclusive
//! boundaries here: a caret exactly past a closing `$$` is outside.

use std::ops::Range;

use super::{delimiter_at, Delimiter, MathScanner};

/// Inline `$...$` or block `$$...$$`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Inline,
    Block,
}

/// One delimiter pair resolved by the scan pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathSpan {
    pub kind: SpanKind,
    /// Byte range of the opening delimiter token.
    pub open: Range<usize>,
    /// Byte range of the closing delimiter token, or `None` when the
    /// document ends first.
    pub close: Option<Range<usize>>,
}

impl MathSpan {
    pub fn closed(&self) -> bool {
        self.close.is_some()
    }

    /// End of the span: past the closing token, or `doc_len` when
    /// unterminated.
    pub fn end(&self, doc_len: usize) -> usize {
        self.close.as_ref().map(|c| c.end).unwrap_or(doc_len)
    }
}

/// Resolve all math spans in `text`, left to right, without re-examining
/// consumed characters. Span ranges never overlap.
pub fn scan_spans(text: &str) -> Vec<MathSpan> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let Some(opener) = delimiter_at(bytes, i) else {
            i += 1;
            continue;
        };
        let (kind, token_len) = match opener {
            Delimiter::Block => (SpanKind::Block, 2),
            Delimiter::Inline => (SpanKind::Inline, 1),
        };
        let open = i..i + token_len;
        i = open.end;

        let mut close = None;
        while i < bytes.len() {
            match (kind, delimiter_at(bytes, i)) {
                (SpanKind::Block, Some(Delimiter::Block)) => {
                    close = Some(i..i + 2);
                    break;
                }
                (SpanKind::Inline, Some(Delimiter::Inline)) => {
                    close = Some(i..i + 1);
                    break;
                }
                _ => i += 1,
            }
        }
        i = close.as_ref().map(|c| c.end).unwrap_or(bytes.len());
        spans.push(MathSpan { kind, open, close });
    }

    spans
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Text,
    MathBegin,
    MathBody,
    MathEnd,
}

impl NodeKind {
    fn is_math(self) -> bool {
        self != NodeKind::Text
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    range: Range<usize>,
}

/// Flat tiling of a document into text and math-tagged nodes.
///
/// Nodes cover `[0, len)` in order with no gaps; empty nodes are never
/// stored, so node starts are strictly increasing.
#[derive(Debug, Clone)]
pub struct SpanTree {
    nodes: Vec<Node>,
}

impl SpanTree {
    pub fn parse(text: &str) -> Self {
        let len = text.len();
        let mut nodes = Vec::new();
        let mut cursor = 0;

        for span in scan_spans(text) {
            if span.open.start > cursor {
                nodes.push(Node {
                    kind: NodeKind::Text,
                    range: cursor..span.open.start,
                });
            }
            nodes.push(Node {
                kind: NodeKind::MathBegin,
                range: span.open.clone(),
            });
            let body_end = span.close.as_ref().map(|c| c.start).unwrap_or(len);
            if body_end > span.open.end {
                nodes.push(Node {
                    kind: NodeKind::MathBody,
                    range: span.open.end..body_end,
                });
            }
            match &span.close {
                Some(close) => {
                    nodes.push(Node {
                        kind: NodeKind::MathEnd,
                        range: close.clone(),
                    });
                    cursor = close.end;
                }
                None => cursor = len,
            }
        }
        if cursor < len {
            nodes.push(Node {
                kind: NodeKind::Text,
                range: cursor..len,
            });
        }

        SpanTree { nodes }
    }

    /// Whether `caret` lies inside a math region of the tiling.
    pub fn contains(&self, caret: usize) -> bool {
        // Index of the first node starting at or after the caret.
        let idx = self.nodes.partition_point(|n| n.range.start < caret);

        // Smallest node strictly enclosing the caret.
        if idx > 0 {
            let node = &self.nodes[idx - 1];
            if caret < node.range.end {
                return node.kind.is_math();
            }
        }

        // Caret sits on a node boundary: resolve both neighbors. It counts
        // as inside only when the preceding node is math but not a closing
        // delimiter (a caret right after a closing `$$` is outside) and the
        // following node, if any, is math too.
        let before = idx
            .checked_sub(1)
            .map(|i| &self.nodes[i])
            .filter(|n| n.range.end == caret);
        let after = self.nodes.get(idx).filter(|n| n.range.start == caret);

        match before {
            Some(b) => {
                b.kind.is_math()
                    && b.kind != NodeKind::MathEnd
                    && after.map_or(true, |a| a.kind.is_math())
            }
            None => false,
        }
    }
}

/// Structural scan strategy: parse, then resolve against the span tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralScanner;

impl MathScanner for StructuralScanner {
    fn is_inside_math(&self, text: &str, caret: usize) -> bool {
        let caret = caret.min(text.len());
        SpanTree::parse(text).contains(caret)
    }
}
