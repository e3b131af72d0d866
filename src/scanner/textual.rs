//! Streaming textual scan, the fallback strategy when no parsed tree is
//! wanted.
//!
//! One left-to-right pass over the raw bytes, resolving delimiter pairs as
//! they appear and never backtracking past a resolved span. Containment is
//! end-inclusive: a caret sitting exactly one position past a closing
//! delimiter still counts as inside. An unterminated opener extends to the
//! end of the document.

use super::{delimiter_at, Delimiter, MathScanner};

#[derive(Debug, Clone, Copy, Default)]
pub struct TextualScanner;

impl MathScanner for TextualScanner {
    fn is_inside_math(&self, text: &str, caret: usize) -> bool {
        let caret = caret.min(text.len());
        let bytes = text.as_bytes();
        let mut i = 0;

        while i < bytes.len() {
            match delimiter_at(bytes, i) {
                Some(Delimiter::Block) => {
                    let open = i;
                    i += 2;
                    let mut close = None;
                    while i < bytes.len() {
                        if delimiter_at(bytes, i) == Some(Delimiter::Block) {
                            close = Some(i + 2);
                            break;
                        }
                        i += 1;
                    }
                    match close {
                        Some(end) => {
                            if caret > open && caret <= end {
                                return true;
                            }
                            i = end;
                        }
                        None => return caret > open,
                    }
                }
                Some(Delimiter::Inline) => {
                    let open = i;
                    i += 1;
                    let mut close = None;
                    while i < bytes.len() {
                        // A `$` that starts a `$$` pair cannot close an
                        // inline span; its trailing `$` can.
                        if delimiter_at(bytes, i) == Some(Delimiter::Inline) {
                            close = Some(i + 1);
                            break;
                        }
                        i += 1;
                    }
                    match close {
                        Some(end) => {
                            if caret > open && caret <= end {
                                return true;
                            }
                            i = end;
                        }
                        None => return caret > open,
                    }
                }
                None => i += 1,
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inside(text: &str, caret: usize) -> bool {
        TextualScanner.is_inside_math(text, caret)
    }

    #[test]
    fn inline_single_line() {
        let doc = "a $x+y$ b";
        assert!(!inside(doc, 1));
        assert!(!inside(doc, 2)); // at the opening delimiter start
        assert!(inside(doc, 3)); // one past the opener
        assert!(inside(doc, 4));
        assert!(inside(doc, 7)); // just past the closer: end-inclusive
        assert!(!inside(doc, 8));
        assert!(!inside(doc, 9));
    }

    #[test]
    fn multi_line_block() {
        let doc = "line1\n$$\nx=1\n$$\nline2";
        assert!(!inside(doc, 2)); // on line1
        assert!(!inside(doc, 6)); // at the opening `$$`
        assert!(inside(doc, 7)); // between the opening dollars
        assert!(inside(doc, 10)); // on the x=1 line
        assert!(inside(doc, 15)); // just past the closing `$$`
        assert!(!inside(doc, 17)); // on line2
    }

    #[test]
    fn unterminated_block_runs_to_end() {
        let doc = "before $$x^2";
        assert!(inside(doc, doc.len()));
        assert!(inside(doc, 9));
        assert!(!inside(doc, 7)); // at the opener start
        assert!(!inside(doc, 3));
    }

    #[test]
    fn unterminated_inline_runs_to_end() {
        let doc = "a $x";
        assert!(inside(doc, 3));
        assert!(inside(doc, 4));
        assert!(!inside(doc, 2));
    }

    #[test]
    fn adjacent_spans_do_not_merge() {
        let doc = "$a$ $b$";
        assert!(inside(doc, 2));
        assert!(!inside(doc, 4)); // on the separating space, before the second opener
        assert!(inside(doc, 6));
    }

    #[test]
    fn stray_dollar_inside_block_is_content() {
        let doc = "$$ a $ b $$ c";
        assert!(inside(doc, 6));
        assert!(inside(doc, 9));
        assert!(!inside(doc, 12));
    }

    #[test]
    fn escaped_dollars_are_text() {
        let doc = r"cost \$5 and \$6";
        for caret in 0..=doc.len() {
            assert!(!inside(doc, caret), "caret {caret}");
        }
    }

    #[test]
    fn caret_past_end_is_clamped() {
        let doc = "before $$x^2";
        assert!(inside(doc, doc.len() + 100));
        assert!(!TextualScanner.is_inside_math("plain", 1000));
    }

    #[test]
    fn empty_document() {
        assert!(!inside("", 0));
    }
}
