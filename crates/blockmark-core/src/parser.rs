//! Block-level Markdown parser.
//!
//! Borrows directly from input, avoiding String allocations where the
//! source text already contains the block's content verbatim.
//!
//! The grammar is total: every input, including empty or adversarial text,
//! resolves to some block sequence. Malformed constructs degrade to plain
//! paragraph text instead of raising errors.
//!
//! Classification runs a fixed-priority waterfall per line:
//! ATX header > setext underline > horizontal rule > (list, code, table —
//! paragraph-start only) > quote > link-reference (paragraph-start only) >
//! paragraph text. Quotes recurse back into the driver with an incremented
//! quote depth; list items recurse over re-sliced line views.

use std::borrow::Cow;
use std::collections::HashMap;

use log::debug;

use crate::ast::{
    Block, CodeBlock, CowStr, Document, Header, LinkReference, List, ListItem, ListKind,
    Paragraph, Quote, Table, TableRow,
};
use crate::lexer::{indent_width, strip_indent, Lexer, Line};
use crate::span::Span;

/// Parse a Markdown document into its block tree and reference table.
///
/// Runs synchronously on the calling thread with no suspension points; all
/// state is local to the call, so independent parses may run concurrently.
///
/// # Example
///
/// ```rust
/// let doc = blockmark_core::parse("# Title\n\nSome text.\n");
/// assert_eq!(doc.blocks.len(), 2);
/// ```
pub fn parse(input: &str) -> Document<'_> {
    debug!("parsing {} bytes", input.len());
    let lines = Lexer::new(input).lines();
    let parser = BlockParser { input };
    let (mut blocks, _) = parser.parse_region(&lines, 0, 0);
    let references = extract_references(&mut blocks);
    Document {
        blocks,
        references,
        span: Span::new(0, input.len() as u32),
    }
}

/// Walk the top-level block sequence once, moving link-reference
/// definitions out of the visible sequence and into the lookup table.
/// For a given id only the first definition encountered is retained;
/// later duplicates are dropped, not merged or overwritten.
fn extract_references<'a>(blocks: &mut Vec<Block<'a>>) -> HashMap<String, LinkReference<'a>> {
    let mut references = HashMap::new();
    for block in blocks.iter() {
        if let Block::LinkReference(reference) = block {
            references
                .entry(reference.id.to_lowercase())
                .or_insert_with(|| reference.clone());
        }
    }
    blocks.retain(|block| !matches!(block, Block::LinkReference(_)));
    references
}

/// Block parser over a pre-split line list.
///
/// Holds only the original input (for contiguity-based zero-copy joins);
/// all mutable parse state lives in [`parse_region`](Self::parse_region)
/// locals, one set per recursion level.
struct BlockParser<'a> {
    input: &'a str,
}

impl<'a> BlockParser<'a> {
    /// Parse a run of lines at the given quote depth, starting at `start`.
    ///
    /// Returns the blocks produced and the index of the first unconsumed
    /// line. The region ends at end of input, or — for nested quote
    /// regions — at the first paragraph-starting line that supplies fewer
    /// than `depth` quote markers.
    fn parse_region(
        &self,
        lines: &[Line<'a>],
        start: usize,
        depth: usize,
    ) -> (Vec<Block<'a>>, usize) {
        let mut blocks = Vec::with_capacity(8);
        let mut para = ParaBuffer::new();
        let mut i = start;

        while i < lines.len() {
            let line = lines[i];
            let unquoted = line.unquote(depth);

            if unquoted.is_blank() {
                para.flush_into(&mut blocks);
                i += 1;
                continue;
            }

            if unquoted.markers < depth {
                if para.is_empty() {
                    // Nested region ends before this line; control returns
                    // to the enclosing quote recognizer.
                    return (blocks, i);
                }
                // Lazy continuation: the stray markers stay as ordinary text.
                let text = line.text.trim_start();
                let offset = line.span.start + (line.text.len() - text.len()) as u32;
                para.push(text, offset);
                i += 1;
                continue;
            }

            let content = unquoted.content;
            let trimmed = content.trim();

            // ATX header, only at true start of line.
            if indent_width(content) == 0 && content.starts_with('#') {
                para.flush_into(&mut blocks);
                blocks.push(atx_header(content, unquoted.offset, line.span.end));
                i += 1;
                continue;
            }

            // A setext underline promotes the previous paragraph line into
            // a header. Only an in-progress paragraph qualifies; a lone
            // underline at paragraph start falls through (deliberately
            // narrower than most Markdown engines).
            if !para.is_empty() {
                if let Some(level) = underline_level(trimmed) {
                    let piece = para.pop_last();
                    para.flush_into(&mut blocks);
                    blocks.push(Block::Header(Header {
                        level,
                        text: Cow::Borrowed(piece.text.trim()),
                        span: Span::new(piece.offset, line.span.end),
                    }));
                    i += 1;
                    continue;
                }
            }

            // Checked after setext because both can start with '-'.
            if is_rule(trimmed) {
                para.flush_into(&mut blocks);
                blocks.push(Block::HorizontalRule(Span::new(
                    unquoted.offset,
                    line.span.end,
                )));
                i += 1;
                continue;
            }

            // Multi-line constructs only open a new paragraph position;
            // mid-paragraph they are absorbed as text (lazy continuation).
            if para.is_empty() {
                if let Some((block, next)) = self.try_list(lines, i, depth) {
                    blocks.push(block);
                    i = next;
                    continue;
                }
                if let Some((block, next)) = self.try_code(lines, i, depth) {
                    blocks.push(block);
                    i = next;
                    continue;
                }
                if let Some((block, next)) = self.try_table(lines, i, depth) {
                    blocks.push(block);
                    i = next;
                    continue;
                }
            }

            if trimmed.starts_with('>') {
                para.flush_into(&mut blocks);
                debug!("quote recursion at line {} depth {}", i, depth + 1);
                let (children, next) = self.parse_region(lines, i, depth + 1);
                // The first line carries depth+1 markers, so the recursive
                // call always consumes it.
                debug_assert!(next > i);
                blocks.push(Block::Quote(Quote {
                    blocks: children,
                    span: Span::new(unquoted.offset, lines[next - 1].span.end),
                }));
                i = next;
                continue;
            }

            if para.is_empty() {
                if let Some(reference) =
                    link_reference(trimmed, content, unquoted.offset, line.span.end)
                {
                    blocks.push(Block::LinkReference(reference));
                    i += 1;
                    continue;
                }
            }

            // Ordinary text: append to the pending paragraph. Trailing
            // spaces are kept on the piece for hard-break detection.
            let text = content.trim_start();
            let offset = unquoted.offset + (content.len() - text.len()) as u32;
            para.push(text, offset);
            i += 1;
        }

        para.flush_into(&mut blocks);
        (blocks, lines.len())
    }

    /// List recognizer: marker line plus greedily consumed follow-up lines
    /// that belong to the same or nested items by relative indentation.
    /// Each item's body recurses into the driver over de-indented line
    /// views, so items may contain arbitrary nested blocks.
    fn try_list(
        &self,
        lines: &[Line<'a>],
        i: usize,
        depth: usize,
    ) -> Option<(Block<'a>, usize)> {
        let unquoted = lines[i].unquote(depth);
        let content = unquoted.content;
        let base_indent = indent_width(content);
        let after = content.trim_start();
        let (kind, start_num, marker_len) = list_marker(after)?;
        let content_col = base_indent + marker_len;

        let mut items: Vec<ListItem<'a>> = Vec::with_capacity(4);
        let mut item_lines: Vec<Line<'a>> = Vec::new();
        let mut in_nested = false;
        item_lines.push(derive_line(
            &after[marker_len..],
            unquoted.offset + (content.len() - after.len() + marker_len) as u32,
        ));

        let mut j = i + 1;
        let mut end = lines[i].span.end;
        while j < lines.len() {
            let lu = lines[j].unquote(depth);
            if lu.is_blank() || lu.markers < depth {
                break;
            }
            let c = lu.content;
            let indent = indent_width(c);
            let rest = c.trim_start();

            if let Some((_, _, mlen)) = list_marker(rest) {
                if indent == base_indent {
                    items.push(self.finish_item(std::mem::take(&mut item_lines)));
                    in_nested = false;
                    item_lines.push(derive_line(
                        &rest[mlen..],
                        lu.offset + (c.len() - rest.len() + mlen) as u32,
                    ));
                } else if indent > base_indent {
                    // Nested item line: keep it in the current item's body,
                    // de-indented to the item's content column. The first
                    // nested marker gets a blank separator so the body
                    // recursion sees it at a paragraph start instead of
                    // absorbing it as lazy continuation text.
                    if !in_nested {
                        item_lines.push(derive_line("", lu.offset));
                        in_nested = true;
                    }
                    let stripped = strip_indent(c, content_col);
                    item_lines.push(derive_line(
                        stripped,
                        lu.offset + (c.len() - stripped.len()) as u32,
                    ));
                } else {
                    break;
                }
            } else if indent > base_indent {
                let stripped = strip_indent(c, content_col);
                item_lines.push(derive_line(
                    stripped,
                    lu.offset + (c.len() - stripped.len()) as u32,
                ));
            } else {
                break;
            }

            end = lines[j].span.end;
            j += 1;
        }

        items.push(self.finish_item(item_lines));
        debug!("list with {} items at line {}", items.len(), i);

        Some((
            Block::List(List {
                kind,
                start: start_num,
                items,
                span: Span::new(unquoted.offset, end),
            }),
            j,
        ))
    }

    fn finish_item(&self, item_lines: Vec<Line<'a>>) -> ListItem<'a> {
        let span = item_lines
            .iter()
            .map(|l| l.span)
            .reduce(Span::merge)
            .unwrap_or_default();
        let (blocks, _) = self.parse_region(&item_lines, 0, 0);
        ListItem { blocks, span }
    }

    /// Code recognizer: backtick-fenced form first, then the ≥4-space
    /// indented form. Content is stored verbatim, no further block or
    /// inline interpretation.
    fn try_code(
        &self,
        lines: &[Line<'a>],
        i: usize,
        depth: usize,
    ) -> Option<(Block<'a>, usize)> {
        let unquoted = lines[i].unquote(depth);
        let content = unquoted.content;
        let trimmed = content.trim();

        if let Some(info) = trimmed.strip_prefix("```") {
            let lang = info.trim();
            let mut pieces: Vec<(&'a str, u32)> = Vec::new();
            let mut j = i + 1;
            let mut end = lines[i].span.end;
            while j < lines.len() {
                let lu = lines[j].unquote(depth);
                if !lu.is_blank() && lu.markers < depth {
                    break;
                }
                if lu.content.trim() == "```" {
                    end = lines[j].span.end;
                    j += 1;
                    break;
                }
                pieces.push((lu.content, lu.offset));
                end = lines[j].span.end;
                j += 1;
            }
            return Some((
                Block::Code(CodeBlock {
                    lang: Cow::Borrowed(lang),
                    content: self.join_lines(&pieces),
                    span: Span::new(unquoted.offset, end),
                }),
                j,
            ));
        }

        if indent_width(content) >= 4 {
            let mut pieces: Vec<(&'a str, u32)> = Vec::new();
            let mut j = i;
            let mut end = lines[i].span.end;
            while j < lines.len() {
                let lu = lines[j].unquote(depth);
                if lu.is_blank() || lu.markers < depth || indent_width(lu.content) < 4 {
                    break;
                }
                let stripped = strip_indent(lu.content, 4);
                pieces.push((
                    stripped,
                    lu.offset + (lu.content.len() - stripped.len()) as u32,
                ));
                end = lines[j].span.end;
                j += 1;
            }
            return Some((
                Block::Code(CodeBlock {
                    lang: Cow::Borrowed(""),
                    content: self.join_lines(&pieces),
                    span: Span::new(unquoted.offset, end),
                }),
                j,
            ));
        }

        None
    }

    /// Table recognizer: a pipe row immediately followed by a dash/pipe
    /// separator row. Without the separator the candidate falls through to
    /// paragraph text.
    fn try_table(
        &self,
        lines: &[Line<'a>],
        i: usize,
        depth: usize,
    ) -> Option<(Block<'a>, usize)> {
        let unquoted = lines[i].unquote(depth);
        let header = unquoted.content.trim();
        if !header.starts_with('|') {
            return None;
        }

        let sep = lines.get(i + 1)?.unquote(depth);
        if sep.markers < depth || !is_table_separator(sep.content.trim()) {
            return None;
        }

        let mut rows = Vec::with_capacity(4);
        rows.push(TableRow {
            cells: split_row(header),
            header: true,
            span: Span::new(unquoted.offset, lines[i].span.end),
        });

        let mut j = i + 2;
        let mut end = lines[i + 1].span.end;
        while j < lines.len() {
            let lu = lines[j].unquote(depth);
            if lu.is_blank() || lu.markers < depth {
                break;
            }
            let row = lu.content.trim();
            if !row.starts_with('|') {
                break;
            }
            rows.push(TableRow {
                cells: split_row(row),
                header: false,
                span: Span::new(lu.offset, lines[j].span.end),
            });
            end = lines[j].span.end;
            j += 1;
        }

        Some((
            Block::Table(Table {
                rows,
                span: Span::new(unquoted.offset, end),
            }),
            j,
        ))
    }

    /// Join line pieces into code/paragraph content: borrow a single input
    /// slice when the pieces are contiguous in the source (separated by
    /// bare `\n`), otherwise build an owned joined string.
    fn join_lines(&self, pieces: &[(&'a str, u32)]) -> CowStr<'a> {
        match pieces {
            [] => Cow::Borrowed(""),
            [(text, _)] => Cow::Borrowed(text),
            _ => {
                let contiguous = pieces
                    .windows(2)
                    .all(|w| w[0].1 + w[0].0.len() as u32 + 1 == w[1].1);
                if contiguous {
                    let start = pieces[0].1 as usize;
                    let last = pieces[pieces.len() - 1];
                    let end = last.1 as usize + last.0.len();
                    Cow::Borrowed(&self.input[start..end])
                } else {
                    let total: usize = pieces.iter().map(|(t, _)| t.len() + 1).sum();
                    let mut joined = String::with_capacity(total);
                    for (k, (text, _)) in pieces.iter().enumerate() {
                        if k > 0 {
                            joined.push('\n');
                        }
                        joined.push_str(text);
                    }
                    Cow::Owned(joined)
                }
            }
        }
    }
}

/// Accumulator for the in-progress paragraph.
///
/// Each appended line is retained as a separate piece so the setext
/// recognizer can promote the most recent line without string surgery;
/// joining only happens at flush time.
struct ParaBuffer<'a> {
    pieces: Vec<Piece<'a>>,
}

#[derive(Clone, Copy)]
struct Piece<'a> {
    /// Line text, leading whitespace stripped, trailing kept for
    /// hard-break detection.
    text: &'a str,
    /// Byte offset of `text` in the original input.
    offset: u32,
}

impl<'a> ParaBuffer<'a> {
    fn new() -> Self {
        Self { pieces: Vec::new() }
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    #[inline]
    fn push(&mut self, text: &'a str, offset: u32) {
        self.pieces.push(Piece { text, offset });
    }

    /// Remove and return the most recently appended line.
    /// Callers must check `is_empty` first.
    fn pop_last(&mut self) -> Piece<'a> {
        self.pieces.pop().expect("paragraph buffer is empty")
    }

    /// Flush the buffered lines as a Paragraph block, if any.
    ///
    /// Lines are joined with a single space, except that a piece ending in
    /// two trailing spaces contributes an explicit `\n` break instead.
    fn flush_into(&mut self, blocks: &mut Vec<Block<'a>>) {
        if self.pieces.is_empty() {
            return;
        }
        let pieces = std::mem::take(&mut self.pieces);
        let first = pieces[0];
        let last = pieces[pieces.len() - 1];
        let span = Span::new(first.offset, last.offset + last.text.trim_end().len() as u32);

        let text: CowStr<'a> = if pieces.len() == 1 {
            Cow::Borrowed(first.text.trim_end())
        } else {
            let total: usize = pieces.iter().map(|p| p.text.len() + 1).sum();
            let mut joined = String::with_capacity(total);
            for (k, piece) in pieces.iter().enumerate() {
                if k > 0 {
                    joined.push(if pieces[k - 1].text.ends_with("  ") {
                        '\n'
                    } else {
                        ' '
                    });
                }
                joined.push_str(piece.text.trim_end());
            }
            Cow::Owned(joined)
        };

        blocks.push(Block::Paragraph(Paragraph { text, span }));
    }
}

/// Build an ATX header from a `#`-prefixed line: level is the run length
/// of leading hashes clamped to 6, text loses trailing hashes/whitespace.
fn atx_header(content: &str, offset: u32, line_end: u32) -> Block<'_> {
    let hashes = content.bytes().take_while(|&b| b == b'#').count();
    let level = hashes.min(6) as u8;
    let text = content[hashes..].trim().trim_end_matches('#').trim_end();
    Block::Header(Header {
        level,
        text: Cow::Borrowed(text),
        span: Span::new(offset, line_end),
    })
}

/// Setext underline: a line consisting solely of `=` (level 1) or `-`
/// (level 2).
fn underline_level(trimmed: &str) -> Option<u8> {
    if trimmed.is_empty() {
        None
    } else if trimmed.bytes().all(|b| b == b'=') {
        Some(1)
    } else if trimmed.bytes().all(|b| b == b'-') {
        Some(2)
    } else {
        None
    }
}

/// Horizontal rule: exactly one of `*`, `-`, `_` repeated at least three
/// times, whitespace-tolerant.
fn is_rule(trimmed: &str) -> bool {
    let mut rule_char = 0u8;
    let mut count = 0;
    for b in trimmed.bytes() {
        match b {
            b' ' | b'\t' => {}
            b'*' | b'-' | b'_' => {
                if rule_char == 0 {
                    rule_char = b;
                } else if rule_char != b {
                    return false;
                }
                count += 1;
            }
            _ => return false,
        }
    }
    count >= 3
}

/// Identify a list marker at the start of a (whitespace-stripped) line:
/// `digit+.` or one of `*`, `+`, `-`, each followed by whitespace.
/// Returns the kind, the ordered start number, and the byte length of the
/// marker including the one space that belongs to it.
fn list_marker(s: &str) -> Option<(ListKind, Option<u64>, usize)> {
    let bytes = s.as_bytes();
    match bytes.first()? {
        b'*' | b'+' | b'-' => {
            if bytes.len() >= 2 && (bytes[1] == b' ' || bytes[1] == b'\t') {
                Some((ListKind::Unordered, None, 2))
            } else {
                None
            }
        }
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if bytes.len() > digits + 1
                && bytes[digits] == b'.'
                && (bytes[digits + 1] == b' ' || bytes[digits + 1] == b'\t')
            {
                Some((ListKind::Ordered, s[..digits].parse().ok(), digits + 2))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Separator row between a table's header and body: pipes, dashes,
/// alignment colons and whitespace, with at least one dash.
fn is_table_separator(trimmed: &str) -> bool {
    trimmed.starts_with('|')
        && trimmed.contains('-')
        && trimmed
            .bytes()
            .all(|b| matches!(b, b'|' | b'-' | b':' | b' ' | b'\t'))
}

/// Split a pipe row into raw cell text, skipping the empty edges produced
/// by the outer pipes.
fn split_row(row: &str) -> Vec<CowStr<'_>> {
    let mut cells = Vec::with_capacity(8);
    for (k, part) in row.split('|').enumerate() {
        if k == 0 {
            continue;
        }
        let cell = part.trim();
        if cell.is_empty() {
            continue;
        }
        cells.push(Cow::Borrowed(cell));
    }
    cells
}

/// Link-reference definition: `[id]: target "optional title"` on a single
/// line. Anything that does not match exactly degrades to paragraph text.
fn link_reference<'a>(
    trimmed: &'a str,
    content: &'a str,
    content_offset: u32,
    line_end: u32,
) -> Option<LinkReference<'a>> {
    let rest = trimmed.strip_prefix('[')?;
    let close = rest.find(']')?;
    let id = rest[..close].trim();
    if id.is_empty() {
        return None;
    }
    let after = rest[close + 1..].strip_prefix(':')?.trim();
    if after.is_empty() {
        return None;
    }
    let (target, tail) = match after.find(char::is_whitespace) {
        Some(pos) => (&after[..pos], after[pos..].trim_start()),
        None => (after, ""),
    };
    let title = if tail.is_empty() {
        None
    } else if tail.len() >= 2 && tail.starts_with('"') && tail.ends_with('"') {
        Some(Cow::Borrowed(&tail[1..tail.len() - 1]))
    } else {
        return None;
    };

    let start = content_offset + (content.len() - content.trim_start().len()) as u32;
    Some(LinkReference {
        id: Cow::Borrowed(id),
        target: Cow::Borrowed(target),
        title,
        span: Span::new(start, line_end),
    })
}

/// A line view re-sliced out of a physical line (list item bodies). The
/// span still indexes the original input.
#[inline]
fn derive_line(text: &str, offset: u32) -> Line<'_> {
    Line {
        text,
        span: Span::new(offset, offset + text.len() as u32),
    }
}
