use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::Rng;

use textindex::core::types::{Document, FieldValue};
use textindex::index::builder::{Builder, DocumentAttributes, FieldAttributes};
use textindex::search::index::Index;

/// Helper to create test documents
fn create_test_document(id: u64, content_size: usize) -> Document {
    let mut rng = rand::thread_rng();
    let words = [
        "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "search", "index",
        "query", "token", "field", "score", "match",
    ];
    let content: String = (0..content_size)
        .map(|_| words[rng.gen_range(0..words.len())])
        .collect::<Vec<_>>()
        .join(" ");

    Document::new()
        .with_field("id", FieldValue::Text(format!("doc-{}", id)))
        .with_field("title", FieldValue::Text(format!("Document {}", id)))
        .with_field("content", FieldValue::Text(content))
}

fn build_index(doc_count: u64) -> Index {
    let mut builder = Builder::new();
    builder.reference("id");
    builder.field("title", FieldAttributes::default()).unwrap();
    builder.field("content", FieldAttributes::default()).unwrap();

    for id in 0..doc_count {
        let doc = create_test_document(id, 100);
        builder.add(&doc, DocumentAttributes::default()).unwrap();
    }

    builder.build().unwrap()
}

/// Benchmark index construction
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for doc_count in [10u64, 100, 500].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(doc_count),
            doc_count,
            |b, &doc_count| {
                b.iter(|| black_box(build_index(doc_count)));
            },
        );
    }

    group.finish();
}

/// Benchmark query execution against a prebuilt index
fn bench_search(c: &mut Criterion) {
    let index = build_index(500);

    c.bench_function("search_single_term", |b| {
        b.iter(|| black_box(index.search("fox").unwrap()));
    });

    c.bench_function("search_multi_term", |b| {
        b.iter(|| black_box(index.search("quick brown fox").unwrap()));
    });

    c.bench_function("search_wildcard", |b| {
        b.iter(|| black_box(index.search("qu*").unwrap()));
    });

    c.bench_function("search_fuzzy", |b| {
        b.iter(|| black_box(index.search("quik~1").unwrap()));
    });

    c.bench_function("search_required_prohibited", |b| {
        b.iter(|| black_box(index.search("+fox -lazy").unwrap()));
    });
}

/// Benchmark serialization round trip
fn bench_serialization(c: &mut Criterion) {
    let index = build_index(100);

    c.bench_function("to_json", |b| {
        b.iter(|| black_box(index.to_json().unwrap()));
    });

    let serialized = index.to_json().unwrap();
    c.bench_function("load", |b| {
        b.iter(|| black_box(Index::load(serialized.clone()).unwrap()));
    });
}

criterion_group!(benches, bench_build, bench_search, bench_serialization);
criterion_main!(benches);
