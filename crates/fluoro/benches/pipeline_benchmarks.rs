//! Pipeline performance benchmarks.
//!
//! Measures orchestration overhead (progress accounting, row assembly,
//! output writing) with the mock engine standing in for real inference.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use fluoro::{
    DataTable, ExecutionConfig, MockEngine, NullPolicy, Parser, Predictor, ProgressAccounting,
};

const SMILES: &[&str] = &[
    "CCO",
    "FC(F)(F)C(=O)O",
    "c1ccccc1",
    "CC(=O)Nc1ccc(O)cc1",
    "OC(=O)C(F)F",
    "CC(C)Cc1ccc(cc1)C(C)C(=O)O",
];

/// Generate a two-column table; every tenth identifier is missing.
fn generate_table(rows: usize) -> DataTable {
    let rows: Vec<Vec<Option<String>>> = (0..rows)
        .map(|i| {
            let smiles = (i % 10 != 9).then(|| SMILES[i % SMILES.len()].to_string());
            vec![Some(format!("MOL_{:06}", i)), smiles]
        })
        .collect();
    DataTable::new(vec!["id".to_string(), "SMILES".to_string()], rows, b'\t')
}

fn generate_tsv(rows: usize) -> String {
    let mut out = Vec::new();
    fluoro::output::PredictionTable {
        input: generate_table(rows),
        columns: Default::default(),
    }
    .write_delimited(&mut out, b'\t')
    .expect("write table");
    String::from_utf8(out).expect("utf8")
}

/// Benchmark full runs over tables of various sizes.
fn bench_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict_table");

    for rows in [100, 1_000, 10_000].iter() {
        let table = generate_table(*rows);
        group.throughput(Throughput::Elements(*rows as u64));

        for accounting in [ProgressAccounting::PerProperty, ProgressAccounting::PerRow] {
            let config = ExecutionConfig::new()
                .with_identifier_column("SMILES")
                .with_null_policy(NullPolicy::SkipRow)
                .with_accounting(accounting);
            let predictor = Predictor::with_config(config).with_engine(MockEngine::new());

            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", accounting), rows),
                &table,
                |b, table| b.iter(|| predictor.predict(black_box(table))),
            );
        }
    }

    group.finish();
}

/// Benchmark parsing plus output serialization.
fn bench_io(c: &mut Criterion) {
    let mut group = c.benchmark_group("io");
    let text = generate_tsv(10_000);
    group.throughput(Throughput::Bytes(text.len() as u64));

    group.bench_function("parse_10k", |b| {
        let parser = Parser::new();
        b.iter(|| parser.parse_str(black_box(&text)))
    });

    let predictor = Predictor::with_config(ExecutionConfig::new().with_identifier_column("SMILES"));
    let output = predictor
        .predict(&generate_table(10_000))
        .expect("predict");

    group.bench_function("write_tsv_10k", |b| {
        b.iter(|| {
            let mut buf = Vec::with_capacity(text.len() * 2);
            output.write_delimited(&mut buf, b'\t').expect("write");
            buf
        })
    });

    group.bench_function("json_records_10k", |b| b.iter(|| output.to_json_records()));

    group.finish();
}

criterion_group!(benches, bench_predict, bench_io);
criterion_main!(benches);
