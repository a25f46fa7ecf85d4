//! Performance benchmarks for key parsing, registration and resolution

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use tagdi::{parse_key, ContainerBuilder, ContainerExt};

#[derive(Debug, Clone)]
struct TestService {
    id: u32,
    data: Vec<u8>,
}

impl TestService {
    fn new(id: u32) -> Self {
        Self {
            id,
            data: vec![0; 1024],
        }
    }
}

fn populated_builder(count: u32) -> ContainerBuilder {
    let builder = ContainerBuilder::new();
    for id in 0..count {
        builder
            .set_factory(&format!("svc{id} #shared #group #priority={}", id % 7), move |_| {
                Ok(Arc::new(TestService::new(id)))
            })
            .unwrap();
    }
    builder
}

fn benchmark_key_parsing(c: &mut Criterion) {
    c.bench_function("parse_plain_key", |b| {
        b.iter(|| black_box(parse_key(black_box("service.name"))))
    });

    c.bench_function("parse_tagged_key", |b| {
        b.iter(|| black_box(parse_key(black_box(" service.name #shared #priority=3 #group=io "))))
    });
}

fn benchmark_registration(c: &mut Criterion) {
    c.bench_function("register_factory", |b| {
        b.iter(|| {
            let builder = ContainerBuilder::new();
            let result = builder.set_factory("svc #shared", |_| {
                Ok(Arc::new(TestService::new(black_box(42))))
            });
            black_box(result)
        })
    });

    c.bench_function("register_and_seal_100", |b| {
        b.iter(|| black_box(populated_builder(100).get_container().unwrap()))
    });
}

fn benchmark_resolution(c: &mut Criterion) {
    let builder = populated_builder(100);
    builder
        .set_factory("transient", |_| Ok(Arc::new(TestService::new(black_box(1)))))
        .unwrap();
    builder
        .set_factory("chain", |c| {
            let inner = c.get_as::<TestService>("svc1")?;
            Ok(Arc::new(inner.id + inner.data.len() as u32))
        })
        .unwrap();
    let container = builder.get_container().unwrap();

    c.bench_function("resolve_shared_cached", |b| {
        b.iter(|| black_box(container.get_as::<TestService>("svc0").unwrap()))
    });

    c.bench_function("resolve_transient", |b| {
        b.iter(|| black_box(container.get_as::<TestService>("transient").unwrap()))
    });

    c.bench_function("resolve_with_dependency", |b| {
        b.iter(|| black_box(container.get_as::<u32>("chain").unwrap()))
    });

    c.bench_function("resolve_tagged_100", |b| {
        b.iter(|| black_box(container.get_tagged_as::<TestService>("group", &[]).unwrap()))
    });

    c.bench_function("new_session", |b| {
        b.iter(|| black_box(builder.get_container().unwrap()))
    });
}

criterion_group!(
    benches,
    benchmark_key_parsing,
    benchmark_registration,
    benchmark_resolution
);
criterion_main!(benches);
