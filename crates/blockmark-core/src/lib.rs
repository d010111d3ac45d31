//! # Blockmark Core
//!
//! A block-level Markdown parser: converts raw markdown source into an
//! ordered tree of block elements (paragraphs, headers, lists, code,
//! tables, block quotes, horizontal rules) plus a link-reference table.
//!
//! Inline-span parsing (emphasis, links, code spans inside a block's text)
//! and rendering are downstream concerns; blocks carry raw text.
//!
//! ## Quick Start
//!
//! ```rust
//! let doc = blockmark_core::parse("# Hello World\n\nThis is a paragraph.");
//!
//! println!("Parsed {} blocks", doc.blocks.len());
//! ```
//!
//! ## Totality
//!
//! There is no "invalid markdown": every input resolves to some block
//! sequence (worst case, one large paragraph), so `parse` returns a
//! [`Document`] directly rather than a `Result`:
//!
//! ```rust
//! let doc = blockmark_core::parse("]]] *** not ( valid [ anything");
//! assert!(!doc.blocks.is_empty());
//! ```
//!
//! ## Reference links
//!
//! Link-reference definitions are extracted from the block sequence into a
//! case-insensitive lookup table; the first definition for an id wins:
//!
//! ```rust
//! let doc = blockmark_core::parse("[a]: http://x\n[a]: http://y\n");
//! assert!(doc.blocks.is_empty());
//! assert_eq!(doc.resolve("A").unwrap().unwrap().target.as_ref(), "http://x");
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;

pub use ast::{Block, Document, LinkReference, ListKind};
pub use error::ResolveError;
pub use parser::parse;
