//! Property tests for grammar totality.
//!
//! The parser must accept any input: no panics, no errors, every byte of
//! the source accounted for by the document span.

use proptest::prelude::*;

use blockmark_core::{parse, Block, ListKind};

proptest! {
    // Arbitrary printable text, including pathological marker soups.
    #[test]
    fn parse_never_fails(input in "\\PC{0,400}") {
        let doc = parse(&input);
        prop_assert_eq!(doc.span.end as usize, input.len());
    }

    // Heavy on block-structural characters to exercise every recognizer.
    #[test]
    fn parse_marker_soup(input in "[-*+>#=_|`:.\\[\\]\"a-z0-9 \t\r\n]{0,300}") {
        let doc = parse(&input);
        prop_assert_eq!(doc.span.end as usize, input.len());
    }

    #[test]
    fn parse_is_deterministic(input in "[-*+>#=_|`:.\\[\\]\"a-z0-9 \t\n]{0,300}") {
        let first = parse(&input);
        let second = parse(&input);
        prop_assert_eq!(first, second);
    }

    // Reference definitions never survive in the top-level block stream;
    // extraction moves them all into the lookup table.
    #[test]
    fn top_level_references_are_extracted(input in "[-*>#\\[\\]:/a-z0-9 \n]{0,300}") {
        let doc = parse(&input);
        prop_assert!(!doc
            .blocks
            .iter()
            .any(|b| matches!(b, Block::LinkReference(_))));
    }
}

#[test]
fn deep_quote_nesting() {
    let input = format!("{}deep", "> ".repeat(64));
    let doc = parse(&input);

    let mut block = &doc.blocks[0];
    let mut levels = 0;
    while let Block::Quote(q) = block {
        levels += 1;
        block = &q.blocks[0];
    }
    assert_eq!(levels, 64);
    assert!(matches!(block, Block::Paragraph(_)));
}

#[test]
fn long_single_paragraph() {
    let input = "word ".repeat(10_000);
    let doc = parse(&input);

    assert_eq!(doc.blocks.len(), 1);
}

// Re-serializing a parsed tree in canonical form and parsing again must
// reproduce the same block-type structure, if not byte-identical text.
#[test]
fn classification_is_idempotent() {
    let input = "\
# Title

Some prose here, wrapped
across two lines.

- alpha
- beta
  - gamma

1. one
2. two

```rust
fn f() {}
```

> quoted line

| a | b |
|---|---|
| c | d |

---

Final text.
";

    let first = parse(input);
    let mut rendered = String::new();
    render_blocks(&first.blocks, &mut rendered);
    let second = parse(&rendered);

    assert_eq!(kind_tree(&first.blocks), kind_tree(&second.blocks));
}

/// Canonical serialization: one construct per block, blocks separated by
/// blank lines, nested content re-prefixed per context.
fn render_blocks(blocks: &[Block], out: &mut String) {
    for block in blocks {
        match block {
            Block::Paragraph(p) => {
                out.push_str(&p.text);
                out.push_str("\n\n");
            }
            Block::Header(h) => {
                for _ in 0..h.level {
                    out.push('#');
                }
                out.push(' ');
                out.push_str(&h.text);
                out.push_str("\n\n");
            }
            Block::Quote(q) => {
                let mut inner = String::new();
                render_blocks(&q.blocks, &mut inner);
                for line in inner.lines() {
                    out.push_str("> ");
                    out.push_str(line);
                    out.push('\n');
                }
                out.push('\n');
            }
            Block::Code(c) => {
                out.push_str("```");
                out.push_str(&c.lang);
                out.push('\n');
                out.push_str(&c.content);
                out.push_str("\n```\n\n");
            }
            Block::List(l) => {
                for (n, item) in l.items.iter().enumerate() {
                    let marker = match l.kind {
                        ListKind::Ordered => {
                            format!("{}. ", l.start.unwrap_or(1) + n as u64)
                        }
                        ListKind::Unordered => "- ".to_string(),
                    };
                    let pad = " ".repeat(marker.len());
                    let mut inner = String::new();
                    render_blocks(&item.blocks, &mut inner);
                    let mut first = true;
                    for line in inner.lines().filter(|l| !l.trim().is_empty()) {
                        out.push_str(if first { &marker } else { &pad });
                        first = false;
                        out.push_str(line);
                        out.push('\n');
                    }
                }
                out.push('\n');
            }
            Block::Table(t) => {
                for row in &t.rows {
                    out.push('|');
                    for cell in &row.cells {
                        out.push(' ');
                        out.push_str(cell);
                        out.push_str(" |");
                    }
                    out.push('\n');
                    if row.header {
                        out.push('|');
                        for _ in &row.cells {
                            out.push_str("---|");
                        }
                        out.push('\n');
                    }
                }
                out.push('\n');
            }
            Block::HorizontalRule(_) => out.push_str("---\n\n"),
            Block::LinkReference(r) => {
                out.push('[');
                out.push_str(&r.id);
                out.push_str("]: ");
                out.push_str(&r.target);
                if let Some(title) = &r.title {
                    out.push_str(" \"");
                    out.push_str(title);
                    out.push('"');
                }
                out.push_str("\n\n");
            }
        }
    }
}

fn kind_tree(blocks: &[Block]) -> Vec<String> {
    blocks
        .iter()
        .map(|block| match block {
            Block::Paragraph(_) => "paragraph".to_string(),
            Block::Header(_) => "header".to_string(),
            Block::Code(_) => "code".to_string(),
            Block::Table(_) => "table".to_string(),
            Block::HorizontalRule(_) => "rule".to_string(),
            Block::LinkReference(_) => "reference".to_string(),
            Block::Quote(q) => format!("quote[{}]", kind_tree(&q.blocks).join(",")),
            Block::List(l) => format!(
                "list[{}]",
                l.items
                    .iter()
                    .map(|item| kind_tree(&item.blocks).join(","))
                    .collect::<Vec<_>>()
                    .join(";")
            ),
        })
        .collect()
}
