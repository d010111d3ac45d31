//! Line-based lexer with SIMD-accelerated scanning.
//!
//! The lexer splits input into lines for the block parser and provides the
//! shared line-scanning primitives: blank detection, indentation
//! measurement, and block-quote marker stripping against an expected
//! nesting depth.
//!
//! # Performance
//!
//! - Zero-copy: lines borrow directly from input
//! - SIMD-accelerated newline scanning via `memchr`

use crate::span::Span;
use memchr::memchr;

/// A single line from the input with its source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// The line text (without trailing newline).
    pub text: &'a str,
    /// Byte span in the original input.
    pub span: Span,
}

/// The remainder of a line after block-quote markers have been consumed.
///
/// Produced by [`Line::unquote`]. `markers` reports how many `>` markers
/// were actually found, which may be fewer than the requested depth; the
/// caller decides whether that shortfall ends a nested region or is lazy
/// paragraph continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unquoted<'a> {
    /// Number of `>` markers consumed (at most the requested depth).
    pub markers: usize,
    /// Line content after the consumed markers, leading indentation kept.
    pub content: &'a str,
    /// Byte offset of `content` in the original input.
    pub offset: u32,
}

impl<'a> Unquoted<'a> {
    /// Check if the remaining content is empty or whitespace-only.
    #[inline(always)]
    pub fn is_blank(&self) -> bool {
        self.content.bytes().all(|b| b == b' ' || b == b'\t')
    }
}

impl<'a> Line<'a> {
    /// Check if this line contains only whitespace.
    #[inline(always)]
    pub fn is_blank(&self) -> bool {
        self.text.bytes().all(|b| b == b' ' || b == b'\t')
    }

    /// Get the line text with leading/trailing whitespace removed.
    #[inline(always)]
    pub fn trimmed(&self) -> &'a str {
        self.text.trim()
    }

    /// Consume up to `depth` leading `>` markers, each optionally followed
    /// by one space, interleaved with leading whitespace.
    ///
    /// Whitespace is only skipped ahead of a marker that is actually
    /// present, so the content keeps its own indentation (needed for
    /// indented-code detection inside quotes).
    pub fn unquote(&self, depth: usize) -> Unquoted<'a> {
        let bytes = self.text.as_bytes();
        let mut pos = 0;
        let mut markers = 0;

        while markers < depth {
            // Tentatively skip whitespace; only commit if a marker follows.
            let mut probe = pos;
            while probe < bytes.len() && (bytes[probe] == b' ' || bytes[probe] == b'\t') {
                probe += 1;
            }
            if probe < bytes.len() && bytes[probe] == b'>' {
                pos = probe + 1;
                markers += 1;
                // One optional space belongs to the marker.
                if pos < bytes.len() && bytes[pos] == b' ' {
                    pos += 1;
                }
            } else {
                break;
            }
        }

        Unquoted {
            markers,
            content: &self.text[pos..],
            offset: self.span.start + pos as u32,
        }
    }
}

/// Width in columns of a line's leading whitespace (tab counts as 4).
#[inline]
pub fn indent_width(s: &str) -> usize {
    let mut width = 0;
    for b in s.bytes() {
        match b {
            b' ' => width += 1,
            b'\t' => width += 4,
            _ => break,
        }
    }
    width
}

/// Strip up to `cols` columns of leading whitespace from a line.
///
/// Stops early at the first non-whitespace byte, so under-indented lines
/// lose only the indentation they have.
#[inline]
pub fn strip_indent(s: &str, cols: usize) -> &str {
    let bytes = s.as_bytes();
    let mut pos = 0;
    let mut width = 0;
    while pos < bytes.len() && width < cols {
        match bytes[pos] {
            b' ' => width += 1,
            b'\t' => width += 4,
            _ => break,
        }
        pos += 1;
    }
    &s[pos..]
}

/// Line-based lexer for the block parser.
///
/// Splits the input into [`Line`]s with efficient SIMD-accelerated newline
/// scanning. The block parser collects all lines up front so quote and
/// list recursion can re-walk regions by index.
pub struct Lexer<'a> {
    /// The complete input text.
    input: &'a str,
    /// Input as bytes for efficient scanning.
    bytes: &'a [u8],
    /// Current byte offset.
    offset: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            offset: 0,
        }
    }

    /// Check if all input has been consumed.
    #[inline(always)]
    pub fn is_eof(&self) -> bool {
        self.offset >= self.bytes.len()
    }

    /// Consume and return the next line.
    ///
    /// Returns `None` at end of input. Uses SIMD-accelerated newline
    /// scanning via `memchr`; CRLF endings are handled by excluding the CR
    /// from the line text.
    #[inline]
    pub fn next_line(&mut self) -> Option<Line<'a>> {
        if self.offset >= self.bytes.len() {
            return None;
        }

        let start = self.offset;

        let end = match memchr(b'\n', &self.bytes[start..]) {
            Some(pos) => start + pos,
            None => self.bytes.len(),
        };

        // Handle CRLF: check byte before newline is CR
        let text_end = if end > start && self.bytes[end - 1] == b'\r' {
            end - 1
        } else {
            end
        };

        // Advance past newline
        self.offset = if end < self.bytes.len() { end + 1 } else { end };

        Some(Line {
            // SAFETY: Input is valid UTF-8 (guaranteed by &str). We slice at byte positions
            // `start` (previous offset, always valid) and `text_end` (either at newline/CR
            // which are single-byte ASCII, or at input end). Both positions are valid UTF-8
            // char boundaries since newlines and CRs cannot appear mid-character in UTF-8.
            text: unsafe { self.input.get_unchecked(start..text_end) },
            span: Span::new(start as u32, text_end as u32),
        })
    }

    /// Collect every line of the input.
    #[inline]
    pub fn lines(mut self) -> Vec<Line<'a>> {
        let mut lines = Vec::with_capacity(self.bytes.len() / 32 + 1);
        while let Some(line) = self.next_line() {
            lines.push(line);
        }
        lines
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Line<'a>;

    #[inline]
    fn next(&mut self) -> Option<Line<'a>> {
        self.next_line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> Line<'_> {
        Line {
            text,
            span: Span::new(0, text.len() as u32),
        }
    }

    #[test]
    fn splits_lines_and_handles_crlf() {
        let lines = Lexer::new("a\r\nb\nc").lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text, "a");
        assert_eq!(lines[1].text, "b");
        assert_eq!(lines[2].text, "c");
        assert_eq!(lines[1].span, Span::new(3, 4));
    }

    #[test]
    fn unquote_counts_markers_up_to_depth() {
        let u = line(">> nested").unquote(1);
        assert_eq!(u.markers, 1);
        assert_eq!(u.content, "> nested");

        let u = line(">> nested").unquote(2);
        assert_eq!(u.markers, 2);
        assert_eq!(u.content, "nested");
    }

    #[test]
    fn unquote_reports_shortfall() {
        let u = line("plain text").unquote(2);
        assert_eq!(u.markers, 0);
        assert_eq!(u.content, "plain text");

        let u = line("> only one").unquote(2);
        assert_eq!(u.markers, 1);
        assert_eq!(u.content, "only one");
    }

    #[test]
    fn unquote_keeps_content_indent() {
        // One space belongs to the marker, the rest is content indent.
        let u = line(">     indented").unquote(1);
        assert_eq!(u.markers, 1);
        assert_eq!(u.content, "    indented");
    }

    #[test]
    fn indent_helpers() {
        assert_eq!(indent_width("    code"), 4);
        assert_eq!(indent_width("\tcode"), 4);
        assert_eq!(strip_indent("      six", 4), "  six");
        assert_eq!(strip_indent("one", 4), "one");
    }
}
