use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};
use sigil::{compose, from_str, parse, to_string, Composite, Value};

#[derive(Serialize, Deserialize, Clone)]
struct Product {
    sku: String,
    name: String,
    price: f64,
    quantity: u32,
}

fn products(count: u32) -> Vec<Product> {
    (0..count)
        .map(|i| Product {
            sku: format!("SKU{}", i),
            name: format!("Product \"{}\"", i),
            price: 9.99 + f64::from(i),
            quantity: i,
        })
        .collect()
}

/// A linked chain whose nodes all alias one shared catalogue.
fn shared_graph(len: usize) -> Value {
    let catalogue = Value::share(Value::array((0..20).map(Value::from).collect()));
    let nodes = (0..len)
        .map(|i| {
            Value::from(
                Composite::new("Node")
                    .with("id", i)
                    .with("catalogue", catalogue.clone()),
            )
        })
        .collect();
    Value::array(nodes)
}

fn benchmark_serde(c: &mut Criterion) {
    let mut group = c.benchmark_group("serde_products");

    for size in [10u32, 100, 500] {
        let data = products(size);
        let text = to_string(&data).unwrap();

        group.bench_with_input(BenchmarkId::new("serialize", size), &data, |b, data| {
            b.iter(|| to_string(black_box(data)))
        });
        group.bench_with_input(BenchmarkId::new("deserialize", size), &text, |b, text| {
            b.iter(|| from_str::<Vec<Product>>(black_box(text)))
        });
    }
    group.finish();
}

fn benchmark_value_trees(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_trees");

    for size in [10usize, 100, 1000] {
        let graph = shared_graph(size);
        let text = compose(&graph).unwrap();

        group.bench_with_input(BenchmarkId::new("compose_shared", size), &graph, |b, graph| {
            b.iter(|| compose(black_box(graph)))
        });
        group.bench_with_input(BenchmarkId::new("parse_aliased", size), &text, |b, text| {
            b.iter(|| parse(black_box(text)))
        });
    }
    group.finish();
}

fn benchmark_numeric_literals(c: &mut Criterion) {
    let text = compose(&Value::array(
        (0..200)
            .map(|i| Value::from(f64::from(i) * 1.25))
            .collect(),
    ))
    .unwrap();

    c.bench_function("parse_numeric_literals", |b| b.iter(|| parse(black_box(&text))));
    c.bench_function("convert_numeric_literals", |b| {
        let doc = parse(&text).unwrap();
        b.iter(|| {
            doc[0]
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.to::<f64>().unwrap())
                .sum::<f64>()
        })
    });
}

fn benchmark_comparison_with_json(c: &mut Criterion) {
    let data = products(100);
    let mut group = c.benchmark_group("comparison_with_json");

    group.bench_function("sigil_serialize", |b| b.iter(|| to_string(black_box(&data))));
    group.bench_function("json_serialize", |b| {
        b.iter(|| serde_json::to_string(black_box(&data)))
    });

    let text = to_string(&data).unwrap();
    let json = serde_json::to_string(&data).unwrap();
    group.bench_function("sigil_deserialize", |b| {
        b.iter(|| from_str::<Vec<Product>>(black_box(&text)))
    });
    group.bench_function("json_deserialize", |b| {
        b.iter(|| serde_json::from_str::<Vec<Product>>(black_box(&json)))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_serde,
    benchmark_value_trees,
    benchmark_numeric_literals,
    benchmark_comparison_with_json
);
criterion_main!(benches);
