use criterion::{criterion_group, criterion_main};

mod http;

criterion_group!(
    benches,
    http::pipeline::bench_upload,
    http::pipeline::bench_retry_delay
);
criterion_main!(benches);
