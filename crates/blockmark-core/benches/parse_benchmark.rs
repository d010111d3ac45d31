//! Benchmarks comparing blockmark parsing vs pulldown-cmark
//!
//! Run with: cargo bench -p blockmark-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pulldown_cmark::{Options, Parser as MdParser};

/// Sample document touching every block type
const SAMPLE: &str = r#"# Introduction

This is a paragraph with a few sentences of ordinary prose.
It wraps across lines and joins into a single block.

## Lists

- First item with some content
- Second item with more content
  - A nested item below it
- Third item concluding the list

1. Step one of the process
2. Step two continues
3. Step three completes

## Code Example

```rust
fn fibonacci(n: u64) -> u64 {
    match n {
        0 => 0,
        1 => 1,
        _ => fibonacci(n - 1) + fibonacci(n - 2),
    }
}
```

## Table

| Name    | Speed   | Memory |
| ------- | ------- | ------ |
| Fast    | 100ms   | 10MB   |
| Medium  | 500ms   | 50MB   |
| Slow    | 1000ms  | 100MB  |

## Quote

> The best code is no code at all.
> Every line of code you write is a liability.

---

[docs]: https://example.com/docs "Project Documentation"
[repo]: https://example.com/repo

End of document, see [docs] and [repo].
"#;

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    // Set throughput for bytes/sec reporting
    group.throughput(Throughput::Bytes(SAMPLE.len() as u64));

    group.bench_function("blockmark", |b| {
        b.iter(|| {
            let doc = blockmark_core::parse(black_box(SAMPLE));
            black_box(doc.blocks.len())
        })
    });

    group.bench_function("markdown_pulldown", |b| {
        b.iter(|| {
            let parser = MdParser::new_ext(black_box(SAMPLE), Options::all());
            let events: Vec<_> = parser.collect();
            black_box(events.len())
        })
    });

    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");

    // Test with different document sizes
    for size in [1, 5, 10, 20].iter() {
        let content: String = SAMPLE.repeat(*size);

        group.throughput(Throughput::Bytes(content.len() as u64));

        group.bench_with_input(BenchmarkId::new("blockmark", size), &content, |b, content| {
            b.iter(|| {
                let doc = blockmark_core::parse(black_box(content));
                black_box(doc.blocks.len())
            })
        });

        group.bench_with_input(BenchmarkId::new("markdown", size), &content, |b, content| {
            b.iter(|| {
                let parser = MdParser::new_ext(black_box(content), Options::all());
                let events: Vec<_> = parser.collect();
                black_box(events.len())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_scaling);
criterion_main!(benches);
