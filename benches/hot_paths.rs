use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tower_map::data::parse_towers;
use tower_map::map::Viewport;

/// Synthetic tower CSV with the production header set.
fn synthetic_csv(rows: usize) -> String {
    let mut csv = String::from(
        "Latitude,Longitude,Owner Name,Status,Overall Height Above Ground (AGL),Structure City/State\n",
    );
    for i in 0..rows {
        let lat = 35.0 + (i % 200) as f64 * 0.01;
        let lon = -85.5 + (i % 300) as f64 * 0.01;
        csv.push_str(&format!(
            "{lat:.4},{lon:.4},\"Carrier {i}\",Constructed,{},\"CROSSVILLE, TN\"\n",
            50 + i % 150
        ));
    }
    csv
}

fn bench_parse(c: &mut Criterion) {
    let csv = synthetic_csv(10_000);
    c.bench_function("parse_towers_10k", |b| {
        b.iter(|| parse_towers(black_box(&csv)))
    });

    let dirty = synthetic_csv(5_000).replace("35.0", "not-a-number");
    c.bench_function("parse_towers_with_invalid_rows", |b| {
        b.iter(|| parse_towers(black_box(&dirty)))
    });
}

fn bench_projection(c: &mut Criterion) {
    let vp = Viewport::new(-84.5, 36.0, 60.0, 400, 200);
    c.bench_function("project_unproject", |b| {
        b.iter(|| {
            let (px, py) = vp.project(black_box(-84.3), black_box(36.1));
            vp.unproject(black_box(px), black_box(py))
        })
    });
}

criterion_group!(benches, bench_parse, bench_projection);
criterion_main!(benches);
