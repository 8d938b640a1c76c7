use criterion::{black_box, criterion_group, criterion_main, Criterion};
use http::Uri;
use item_catalog::infra::pagination::{Page, PaginationParams};

fn page_links_benchmark(c: &mut Criterion) {
    let uri: Uri = "/api/items/?search=book&page=3&page_size=20".parse().unwrap();
    let params = PaginationParams::new(Some(3), Some(20));
    c.bench_function("page_links", |b| {
        b.iter(|| {
            Page::<()>::new(
                Vec::new(),
                black_box(150),
                black_box(&params),
                black_box(&uri),
                Some("localhost:8000"),
            )
        })
    });
}

criterion_group!(benches, page_links_benchmark);
criterion_main!(benches);
