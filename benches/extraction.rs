//! Throughput of locating a data region and parsing it, for a large table behind a banner.

use std::hint::black_box;
use std::io::{Cursor, Read};

use criterion::{Criterion, Throughput, criterion_group, criterion_main};

use padded_csv_upload::ingestion::{CsvReadOptions, read_csv};
use padded_csv_upload::padded::{HeaderLength, padded_csv_reader};

const ROWS: usize = 100_000;

fn padded_report(rows: usize) -> Vec<u8> {
    let mut out = String::from("\"Daily export\"\n\"Region: all\"\n\n\"Generated nightly\"\n\"\",\"\"\n\"\",\"\"\n");
    out.push_str("id,name,amount\n");
    for i in 0..rows {
        out.push_str(&format!("{i},name_{i},{}.25\n", i % 997));
    }
    out.push_str("\"\",\"\"\n\"Total\",0\n");
    out.into_bytes()
}

fn bench_extraction(c: &mut Criterion) {
    let input = padded_report(ROWS);

    let mut group = c.benchmark_group("extraction");
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("region_only", |b| {
        b.iter(|| {
            let mut reader = padded_csv_reader(Cursor::new(input.as_slice()), HeaderLength::Auto).unwrap();
            let mut sink = Vec::with_capacity(input.len());
            reader.read_to_end(&mut sink).unwrap();
            black_box(sink.len());
        });
    });

    group.bench_function("region_and_parse", |b| {
        let options = CsvReadOptions::default();
        b.iter(|| {
            let reader = padded_csv_reader(Cursor::new(input.as_slice()), HeaderLength::Auto).unwrap();
            let ds = read_csv(reader, &options).unwrap();
            black_box(ds.row_count());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_extraction);
criterion_main!(benches);
