//! Blockmark CLI - Inspect Markdown block structure
//!
//! Usage:
//!   bmcli [OPTIONS] <FILE>
//!
//! Commands:
//!   parse     Parse and display document structure (default)
//!   refs      Show the link-reference table
//!   stats     Show document statistics

use std::env;
use std::fs;
use std::process;

use blockmark_core::ast::{Block, Document, ListKind};
use serde::Serialize;

fn main() {
    let args: Vec<String> = env::args().collect();

    match run(&args) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let config = parse_args(args)?;

    let input = fs::read_to_string(&config.file)
        .map_err(|e| format!("failed to read '{}': {}", config.file, e))?;

    let doc = blockmark_core::parse(&input);

    match config.command {
        Command::Parse => cmd_parse(&doc, &config),
        Command::Refs => cmd_refs(&doc, &config),
        Command::Stats => cmd_stats(&doc, &input),
    }
}

#[derive(Debug)]
struct Config {
    command: Command,
    file: String,
    format: OutputFormat,
    verbose: bool,
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Parse,
    Refs,
    Stats,
}

#[derive(Debug, Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_args(args: &[String]) -> Result<Config, String> {
    let mut command = Command::Parse;
    let mut format = OutputFormat::Text;
    let mut verbose = false;
    let mut file = None;

    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            "-V" | "--version" => {
                println!("bmcli {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "-v" | "--verbose" => verbose = true,
            "-j" | "--json" => format = OutputFormat::Json,
            "parse" => command = Command::Parse,
            "refs" => command = Command::Refs,
            "stats" => command = Command::Stats,
            _ if arg.starts_with('-') => {
                return Err(format!("unknown option: {}", arg));
            }
            _ => {
                if file.is_some() {
                    return Err("multiple files specified".to_string());
                }
                file = Some(arg.clone());
            }
        }
        i += 1;
    }

    let file = file.ok_or_else(|| "no input file specified".to_string())?;

    Ok(Config {
        command,
        file,
        format,
        verbose,
    })
}

fn print_help() {
    eprintln!(
        r#"bmcli - Markdown block structure inspector

USAGE:
    bmcli [OPTIONS] [COMMAND] <FILE>

COMMANDS:
    parse       Parse and display document structure (default)
    refs        Show the link-reference table
    stats       Show document statistics

OPTIONS:
    -v, --verbose    Show detailed block tree
    -j, --json       Output in JSON format
    -h, --help       Print help information
    -V, --version    Print version information

EXAMPLES:
    bmcli document.md           Parse a Markdown file
    bmcli -v document.md        Parse with verbose output
    bmcli -j document.md        Output the block tree as JSON
    bmcli refs document.md      List link-reference definitions
    bmcli stats document.md     Show document statistics
"#
    );
}

// =============================================================================
// Parse Command
// =============================================================================

fn cmd_parse(doc: &Document, config: &Config) -> Result<(), String> {
    match config.format {
        OutputFormat::Json => print_json(doc),
        OutputFormat::Text => {
            if config.verbose {
                print_document_verbose(doc);
            } else {
                print_document_summary(doc);
            }
        }
    }

    Ok(())
}

// =============================================================================
// Refs Command
// =============================================================================

fn cmd_refs(doc: &Document, config: &Config) -> Result<(), String> {
    if matches!(config.format, OutputFormat::Json) {
        let refs: Vec<_> = doc
            .references
            .iter()
            .map(|(id, r)| {
                serde_json::json!({
                    "id": id,
                    "target": &r.target,
                    "title": &r.title,
                })
            })
            .collect();
        println!("{}", serde_json::json!({ "references": refs }));
    } else {
        println!("References: {}", doc.references.len());
        let mut ids: Vec<_> = doc.references.keys().collect();
        ids.sort();
        for id in ids {
            let r = &doc.references[id];
            match &r.title {
                Some(title) => println!("  [{}] -> {} \"{}\"", id, r.target, title),
                None => println!("  [{}] -> {}", id, r.target),
            }
        }
    }
    Ok(())
}

// =============================================================================
// Stats Command
// =============================================================================

fn cmd_stats(doc: &Document, input: &str) -> Result<(), String> {
    let stats = DocumentStats::from_document(doc, input);

    println!("Document Statistics");
    println!("-------------------");
    println!("Content:");
    println!("  Total blocks:     {}", stats.total_blocks);
    println!("  Headers:          {}", stats.headers);
    println!("  Paragraphs:       {}", stats.paragraphs);
    println!("  Code blocks:      {}", stats.code_blocks);
    println!("  Lists:            {}", stats.lists);
    println!("  Tables:           {}", stats.tables);
    println!("  Quotes:           {}", stats.quotes);
    println!("  Horizontal rules: {}", stats.rules);
    println!("  References:       {}", doc.references.len());
    println!();
    println!("Size:");
    println!("  Characters:       {}", stats.chars);
    println!("  Words (est.):     {}", stats.words);
    println!("  Lines:            {}", stats.lines);

    Ok(())
}

struct DocumentStats {
    total_blocks: usize,
    headers: usize,
    paragraphs: usize,
    code_blocks: usize,
    lists: usize,
    tables: usize,
    quotes: usize,
    rules: usize,
    chars: usize,
    words: usize,
    lines: usize,
}

impl DocumentStats {
    fn from_document(doc: &Document, input: &str) -> Self {
        let mut stats = Self {
            total_blocks: 0,
            headers: 0,
            paragraphs: 0,
            code_blocks: 0,
            lists: 0,
            tables: 0,
            quotes: 0,
            rules: 0,
            chars: input.len(),
            words: input.split_whitespace().count(),
            lines: input.lines().count(),
        };

        stats.count_blocks(&doc.blocks);
        stats
    }

    fn count_blocks(&mut self, blocks: &[Block]) {
        for block in blocks {
            self.total_blocks += 1;
            match block {
                Block::Header(_) => self.headers += 1,
                Block::Paragraph(_) => self.paragraphs += 1,
                Block::Code(_) => self.code_blocks += 1,
                Block::List(l) => {
                    self.lists += 1;
                    for item in &l.items {
                        self.count_blocks(&item.blocks);
                    }
                }
                Block::Table(_) => self.tables += 1,
                Block::Quote(q) => {
                    self.quotes += 1;
                    self.count_blocks(&q.blocks);
                }
                Block::HorizontalRule(_) => self.rules += 1,
                Block::LinkReference(_) => {}
            }
        }
    }
}

// =============================================================================
// JSON Output
// =============================================================================

#[derive(Serialize)]
struct JsonDocument<'a> {
    blocks: Vec<JsonBlock<'a>>,
    references: Vec<JsonReference<'a>>,
}

#[derive(Serialize)]
struct JsonReference<'a> {
    id: &'a str,
    target: &'a str,
    title: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum JsonBlock<'a> {
    Paragraph {
        text: &'a str,
    },
    Header {
        level: u8,
        text: &'a str,
    },
    Quote {
        blocks: Vec<JsonBlock<'a>>,
    },
    Code {
        lang: &'a str,
        content: &'a str,
    },
    List {
        kind: &'a str,
        start: Option<u64>,
        items: Vec<Vec<JsonBlock<'a>>>,
    },
    Table {
        rows: Vec<JsonTableRow<'a>>,
    },
    HorizontalRule,
    LinkReference {
        id: &'a str,
        target: &'a str,
        title: Option<&'a str>,
    },
}

#[derive(Serialize)]
struct JsonTableRow<'a> {
    header: bool,
    cells: Vec<&'a str>,
}

fn print_json(doc: &Document) {
    let json_doc = convert_document(doc);
    println!("{}", serde_json::to_string_pretty(&json_doc).unwrap());
}

fn convert_document<'a>(doc: &'a Document) -> JsonDocument<'a> {
    let mut references: Vec<JsonReference<'a>> = doc
        .references
        .iter()
        .map(|(id, r)| JsonReference {
            id,
            target: &r.target,
            title: r.title.as_deref(),
        })
        .collect();
    references.sort_by(|a, b| a.id.cmp(b.id));

    JsonDocument {
        blocks: doc.blocks.iter().map(convert_block).collect(),
        references,
    }
}

fn convert_block<'a>(block: &'a Block) -> JsonBlock<'a> {
    match block {
        Block::Paragraph(p) => JsonBlock::Paragraph { text: &p.text },
        Block::Header(h) => JsonBlock::Header {
            level: h.level,
            text: &h.text,
        },
        Block::Quote(q) => JsonBlock::Quote {
            blocks: q.blocks.iter().map(convert_block).collect(),
        },
        Block::Code(c) => JsonBlock::Code {
            lang: &c.lang,
            content: &c.content,
        },
        Block::List(l) => JsonBlock::List {
            kind: match l.kind {
                ListKind::Ordered => "ordered",
                ListKind::Unordered => "unordered",
            },
            start: l.start,
            items: l
                .items
                .iter()
                .map(|item| item.blocks.iter().map(convert_block).collect())
                .collect(),
        },
        Block::Table(t) => JsonBlock::Table {
            rows: t
                .rows
                .iter()
                .map(|row| JsonTableRow {
                    header: row.header,
                    cells: row.cells.iter().map(|c| c.as_ref()).collect(),
                })
                .collect(),
        },
        Block::HorizontalRule(_) => JsonBlock::HorizontalRule,
        Block::LinkReference(r) => JsonBlock::LinkReference {
            id: &r.id,
            target: &r.target,
            title: r.title.as_deref(),
        },
    }
}

// =============================================================================
// Text Output
// =============================================================================

fn print_document_summary(doc: &Document) {
    println!("Blocks: {}", doc.blocks.len());
    for (i, block) in doc.blocks.iter().enumerate() {
        println!("  [{}] {}", i + 1, describe_block(block));
    }

    if !doc.references.is_empty() {
        println!("References: {}", doc.references.len());
    }
}

fn print_document_verbose(doc: &Document) {
    println!("=== Block Tree ===");
    println!();
    println!("Span: {}..{}", doc.span.start, doc.span.end);
    println!();

    for (i, block) in doc.blocks.iter().enumerate() {
        println!();
        println!("[{}] {}", i + 1, describe_block(block));
        print_block_verbose(block, 1);
    }

    if !doc.references.is_empty() {
        println!();
        println!("--- References ---");
        let mut ids: Vec<_> = doc.references.keys().collect();
        ids.sort();
        for id in ids {
            println!("  [{}] -> {}", id, doc.references[id].target);
        }
    }
}

fn describe_block(block: &Block) -> String {
    match block {
        Block::Paragraph(_) => "Paragraph".to_string(),
        Block::Header(h) => format!("Header (level {})", h.level),
        Block::Quote(q) => format!("Quote ({} blocks)", q.blocks.len()),
        Block::Code(c) => format!("Code (lang: {})", c.lang),
        Block::List(l) => format!("List ({:?}, {} items)", l.kind, l.items.len()),
        Block::Table(t) => format!("Table ({} rows)", t.rows.len()),
        Block::HorizontalRule(_) => "HorizontalRule".to_string(),
        Block::LinkReference(r) => format!("LinkReference ({})", r.id),
    }
}

fn print_block_verbose(block: &Block, indent: usize) {
    let prefix = "  ".repeat(indent);

    match block {
        Block::Paragraph(p) => {
            println!("{}Text: {}", prefix, preview(&p.text, 60));
        }
        Block::Header(h) => {
            println!("{}Text: {}", prefix, h.text);
        }
        Block::Quote(q) => {
            for (i, block) in q.blocks.iter().enumerate() {
                println!("{}Block {}: {}", prefix, i + 1, describe_block(block));
                print_block_verbose(block, indent + 1);
            }
        }
        Block::Code(c) => {
            println!("{}Content: {}", prefix, preview(&c.content, 60));
        }
        Block::List(l) => {
            for (i, item) in l.items.iter().enumerate() {
                println!("{}Item {}:", prefix, i + 1);
                for block in &item.blocks {
                    print_block_verbose(block, indent + 1);
                }
            }
        }
        Block::Table(t) => {
            for (i, row) in t.rows.iter().enumerate() {
                let header_marker = if row.header { " (header)" } else { "" };
                let cells: Vec<&str> = row.cells.iter().map(|c| c.as_ref()).collect();
                println!(
                    "{}Row {}{}: {}",
                    prefix,
                    i + 1,
                    header_marker,
                    cells.join(" | ")
                );
            }
        }
        Block::LinkReference(r) => {
            println!("{}[{}] -> {}", prefix, r.id, r.target);
        }
        Block::HorizontalRule(_) => {}
    }
}

fn preview(text: &str, max: usize) -> String {
    let short: String = text.chars().take(max).collect();
    let ellipsis = if text.chars().count() > max { "..." } else { "" };
    format!("{}{}", short.replace('\n', "\\n"), ellipsis)
}
