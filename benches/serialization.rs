use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lino_codec::{decode, encode, from_str, to_string, Value};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone)]
struct Product {
    sku: String,
    name: String,
    price: f64,
    quantity: u32,
}

fn products(size: u32) -> Vec<Product> {
    (0..size)
        .map(|i| Product {
            sku: format!("SKU{}", i),
            name: format!("Product {}", i),
            price: 9.99 + f64::from(i),
            quantity: i,
        })
        .collect()
}

/// A list holding `size` references to one shared dict, plus a back edge.
fn shared_graph(size: usize) -> Value {
    let shared = lino_codec::lino!({ "id": 1, "name": "shared" });
    let root = Value::list(vec![shared; size]);
    root.as_list().unwrap().borrow_mut().push(root.clone());
    root
}

fn benchmark_encode_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_array");

    for size in [10, 50, 100, 500].iter() {
        let items = products(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| to_string(black_box(&items)))
        });
    }
    group.finish();
}

fn benchmark_decode_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_array");

    for size in [10, 50, 100, 500].iter() {
        let text = to_string(&products(*size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| from_str::<Vec<Product>>(black_box(text)))
        });
    }
    group.finish();
}

fn benchmark_shared_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared_graph");

    for size in [10, 100, 1000].iter() {
        let graph = shared_graph(*size);
        let text = encode(&graph).unwrap();

        group.bench_with_input(BenchmarkId::new("encode", size), &graph, |b, graph| {
            b.iter(|| encode(black_box(graph)))
        });
        group.bench_with_input(BenchmarkId::new("decode", size), &text, |b, text| {
            b.iter(|| {
                let value = decode(black_box(text)).unwrap();
                // break the cycle so each iteration frees its graph
                value.as_list().unwrap().borrow_mut().clear();
            })
        });

        graph.as_list().unwrap().borrow_mut().clear();
    }
    group.finish();
}

fn benchmark_strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("strings");

    let short = Value::from("short");
    let long = Value::from("a(b)\nc \u{e9} ".repeat(200));

    group.bench_function("encode_short", |b| b.iter(|| encode(black_box(&short))));
    group.bench_function("encode_long", |b| b.iter(|| encode(black_box(&long))));

    let long_text = encode(&long).unwrap();
    group.bench_function("decode_long", |b| b.iter(|| decode(black_box(&long_text))));

    group.finish();
}

fn benchmark_comparison_with_json(c: &mut Criterion) {
    let items = products(100);
    let mut group = c.benchmark_group("comparison");

    group.bench_function("lino_serialize", |b| b.iter(|| to_string(black_box(&items))));
    group.bench_function("json_serialize", |b| {
        b.iter(|| serde_json::to_string(black_box(&items)))
    });

    let lino_str = to_string(&items).unwrap();
    let json_str = serde_json::to_string(&items).unwrap();

    group.bench_function("lino_deserialize", |b| {
        b.iter(|| from_str::<Vec<Product>>(black_box(&lino_str)))
    });
    group.bench_function("json_deserialize", |b| {
        b.iter(|| serde_json::from_str::<Vec<Product>>(black_box(&json_str)))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_encode_array,
    benchmark_decode_array,
    benchmark_shared_graph,
    benchmark_strings,
    benchmark_comparison_with_json
);
criterion_main!(benches);
