//! # Inspection Benchmarks
//!
//! Performance benchmarks for typed-value decoding, extraction and tree
//! expansion.
//!
//! Run with: `cargo bench -p cadscope-core`

use cadscope_core::{
    CollectorRegistry, Document, DocumentObject, FormatOptions, HostScope, MemberShape, Navigator,
    ObjectHandle, ObjectKind, ObjectTree, Point3d, TypedValue, TypedValueCodec, Value,
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// A typed-value list cycling through the common kinds.
fn create_records(size: usize) -> Vec<TypedValue> {
    (0..size)
        .map(|i| match i % 4 {
            0 => TypedValue::new(1000, Value::Text(format!("item-{}", i))),
            1 => TypedValue::new(1070, Value::Int16(i as i16)),
            2 => TypedValue::new(1040, Value::Double(i as f64 * 0.5)),
            _ => TypedValue::new(1010, Value::Point(Point3d::new(i as f64, 0.0, 0.0))),
        })
        .collect()
}

/// A block with N entities.
fn create_block(size: usize) -> Document {
    let mut block = DocumentObject::new(ObjectHandle(1), "BlockTableRecord", ObjectKind::EntityContainer);
    let mut entities = Vec::with_capacity(size);
    for i in 0..size {
        let handle = ObjectHandle(0x100 + i as u64);
        block = block.item(handle);
        entities.push(
            DocumentObject::new(handle, "Line", ObjectKind::Entity)
                .member("Length", "Double", "Curve", MemberShape::Spatial, Value::Double(i as f64))
                .member("Layer", "String", "Entity", MemberShape::Scalar, Value::Text("0".into())),
        );
    }

    let mut doc = Document::new(block);
    for entity in entities {
        doc.insert(entity);
    }
    doc
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("typed_value_decode");
    let codec = TypedValueCodec::default();

    for size in [16, 256, 4096] {
        let records = create_records(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| black_box(codec.decode(black_box(records))));
        });
    }
    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let doc = Document::sample();
    let scope = doc.open_scope();
    let registry = CollectorRegistry::standard(FormatOptions::default());

    c.bench_function("extract_sample_objects", |b| {
        b.iter(|| {
            for object in doc.objects() {
                let host = scope.resolve(object.handle).expect("resolve");
                black_box(registry.extract(host, &scope).expect("extract"));
            }
        });
    });
}

fn bench_expand(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_expand");
    let registry = CollectorRegistry::standard(FormatOptions::default());

    for size in [100, 1000, 10_000] {
        let doc = create_block(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &doc, |b, doc| {
            let scope = doc.open_scope();
            let nav = Navigator::new(&registry, &scope);
            b.iter(|| {
                let mut tree = ObjectTree::open(&nav).expect("open");
                tree.expand(&nav, &[]).expect("expand");
                black_box(tree.root().children().len())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_decode, bench_extract, bench_expand);
criterion_main!(benches);
