//! Abstract Syntax Tree types for parsed Markdown documents.
//!
//! This module contains all the block-level node types produced by the
//! parser. The AST is designed to be:
//!
//! - **Zero-copy**: Uses `Cow<'a, str>` to borrow from input when possible
//! - **Span-tracked**: Every node includes source location information
//! - **Closed**: The block set is a single enum, so dispatch sites match
//!   exhaustively
//!
//! Block text is raw: inline constructs (emphasis, links, code spans) are
//! left to a downstream inline processor, which receives each block's text
//! together with the document's reference table.

use std::collections::HashMap;

use crate::error::ResolveError;
use crate::span::Span;

/// A parsed Markdown document.
///
/// The document is the root of the AST: the ordered block sequence plus the
/// link-reference lookup table extracted from it. Built exactly once by a
/// single [`parse`](crate::parse) invocation and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Document<'a> {
    /// Content blocks in document order. Link-reference definitions have
    /// already been extracted into `references`.
    pub blocks: Vec<Block<'a>>,
    /// Link-reference definitions keyed by lowercased id.
    /// Only the first definition for a given id is retained.
    pub references: HashMap<String, LinkReference<'a>>,
    /// Source span covering the entire document.
    pub span: Span,
}

impl<'a> Document<'a> {
    /// Look up a link reference by id, case-insensitively.
    ///
    /// Returns `Ok(None)` for an id with no definition. A blank id is
    /// programmer misuse and is rejected.
    ///
    /// # Example
    ///
    /// ```rust
    /// let doc = blockmark_core::parse("[logo]: http://example.com/logo.png\n");
    /// let link = doc.resolve("LOGO").unwrap().unwrap();
    /// assert_eq!(link.target.as_ref(), "http://example.com/logo.png");
    /// assert!(doc.resolve("").is_err());
    /// ```
    pub fn resolve(&self, id: &str) -> Result<Option<&LinkReference<'a>>, ResolveError> {
        if id.trim().is_empty() {
            return Err(ResolveError::blank_id());
        }
        Ok(self.references.get(&id.to_lowercase()))
    }
}

/// Block-level AST nodes.
///
/// Blocks are the primary structural elements of a document. Quote and
/// List variants exclusively own their nested block sequences.
#[derive(Debug, Clone, PartialEq)]
pub enum Block<'a> {
    /// Text paragraph (raw text, inline parsing deferred).
    Paragraph(Paragraph<'a>),
    /// ATX or setext header (levels 1-6).
    Header(Header<'a>),
    /// Block quotation with nested blocks.
    Quote(Quote<'a>),
    /// Fenced or indented code block, content verbatim.
    Code(CodeBlock<'a>),
    /// Ordered or unordered list.
    List(List<'a>),
    /// Table with raw cell text.
    Table(Table<'a>),
    /// Horizontal rule / thematic break.
    HorizontalRule(Span),
    /// Link-reference definition. Present in the block stream only inside
    /// nested contexts; top-level definitions are moved into
    /// [`Document::references`].
    LinkReference(LinkReference<'a>),
}

/// Text paragraph.
///
/// Lines are joined with a single space; a line ending in two or more
/// trailing spaces contributes a `\n` hard-break marker instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph<'a> {
    /// Raw paragraph text.
    pub text: CowStr<'a>,
    /// Source span.
    pub span: Span,
}

/// Section header with level and raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct Header<'a> {
    /// Header level (1-6).
    pub level: u8,
    /// Raw header text.
    pub text: CowStr<'a>,
    /// Source span.
    pub span: Span,
}

/// Block quotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote<'a> {
    /// Quoted content blocks.
    pub blocks: Vec<Block<'a>>,
    /// Source span.
    pub span: Span,
}

/// Code block with verbatim content.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock<'a> {
    /// Language hint from the opening fence (empty for indented code).
    pub lang: CowStr<'a>,
    /// Raw code content, no block or inline interpretation.
    pub content: CowStr<'a>,
    /// Source span.
    pub span: Span,
}

/// List ordering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Numbered list (1. 2. 3.).
    Ordered,
    /// Bulleted list (- + *).
    Unordered,
}

/// A list block containing multiple items.
#[derive(Debug, Clone, PartialEq)]
pub struct List<'a> {
    /// Ordered or unordered.
    pub kind: ListKind,
    /// Starting number for ordered lists.
    pub start: Option<u64>,
    /// List items.
    pub items: Vec<ListItem<'a>>,
    /// Source span.
    pub span: Span,
}

/// A single list item (may contain nested blocks, including nested lists).
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem<'a> {
    /// Content blocks within the item.
    pub blocks: Vec<Block<'a>>,
    /// Source span.
    pub span: Span,
}

/// Table with a header row and body rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<'a> {
    /// All rows; the separator row is consumed, not stored.
    pub rows: Vec<TableRow<'a>>,
    /// Source span.
    pub span: Span,
}

/// A single table row of raw cell text.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow<'a> {
    /// Cells in this row.
    pub cells: Vec<CowStr<'a>>,
    /// Whether this is the header row.
    pub header: bool,
    /// Source span.
    pub span: Span,
}

/// A link-reference definition: `[id]: target "optional title"`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkReference<'a> {
    /// Reference id, compared case-insensitively.
    pub id: CowStr<'a>,
    /// Target URL.
    pub target: CowStr<'a>,
    /// Optional title.
    pub title: Option<CowStr<'a>>,
    /// Source span.
    pub span: Span,
}

/// Borrowed or owned string type for zero-copy parsing.
pub type CowStr<'a> = std::borrow::Cow<'a, str>;
