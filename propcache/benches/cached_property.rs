//! Cached Property Benchmarks
//!
//! Measures the three access paths of the caching descriptors.
//!
//! # Key Metrics
//!
//! - Hit: attribute lookup plus one dict probe
//! - Miss: hit cost plus the compute call and one dict insert
//! - Class access: returns the descriptor itself

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use propcache::api::{cache_base, cached_property, under_cached_property};
use propcache::{ClassBuilder, ClassObject, FunctionObject, Value};
use std::sync::Arc;

fn compute() -> Value {
    FunctionObject::new("prop", |_, _| Ok(Value::int(42))).into_value()
}

fn dict_class() -> Arc<ClassObject> {
    ClassBuilder::new("A")
        .attr("prop", cached_property(compute()))
        .build()
        .unwrap()
}

fn cache_class() -> Arc<ClassObject> {
    ClassBuilder::new("B")
        .base(cache_base().unwrap())
        .attr("prop", under_cached_property(compute()).unwrap())
        .build()
        .unwrap()
}

// =============================================================================
// Cache Hit
// =============================================================================

fn bench_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("hit");

    let a = Value::object(dict_class().instantiate());
    a.getattr("prop").unwrap();
    group.bench_function("cached_property", |b| {
        b.iter(|| black_box(a.getattr("prop").unwrap()))
    });

    let obj = Value::object(cache_class()).call(&[]).unwrap();
    obj.getattr("prop").unwrap();
    group.bench_function("under_cached_property", |b| {
        b.iter(|| black_box(obj.getattr("prop").unwrap()))
    });

    group.finish();
}

// =============================================================================
// Cache Miss
// =============================================================================

fn bench_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("miss");

    // Each iteration uses a fresh instance so every access computes.
    let cls = dict_class();
    group.bench_function("cached_property", |b| {
        b.iter_batched(
            || Value::object(cls.instantiate()),
            |a| black_box(a.getattr("prop").unwrap()),
            criterion::BatchSize::SmallInput,
        )
    });

    let cls = Value::object(cache_class());
    group.bench_function("under_cached_property", |b| {
        b.iter_batched(
            || cls.call(&[]).unwrap(),
            |obj| black_box(obj.getattr("prop").unwrap()),
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

// =============================================================================
// Class Access
// =============================================================================

fn bench_class_access(c: &mut Criterion) {
    let cls = Value::object(dict_class());
    c.bench_function("class_access", |b| {
        b.iter(|| black_box(cls.getattr("prop").unwrap()))
    });
}

criterion_group!(benches, bench_hit, bench_miss, bench_class_access);
criterion_main!(benches);
