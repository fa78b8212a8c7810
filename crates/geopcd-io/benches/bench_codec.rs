use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use geopcd_io::{decode_points, encode_points, parse_header, RecordLayout};

const HEADER: &[u8] = b"VERSION 0.7
FIELDS x y z intensity rgb
SIZE 4 4 4 2 1
TYPE F F F U U
COUNT 1 1 1 1 3
WIDTH 0
HEIGHT 1
POINTS 0
DATA binary
";

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("pcd_codec");

    let Ok((header, _)) = parse_header(HEADER) else {
        panic!("bench header must parse");
    };
    let Ok(layout) = RecordLayout::from_header(&header) else {
        panic!("bench layout must resolve");
    };

    for num_points in [1_000usize, 100_000] {
        let data: Vec<u8> = (0..num_points * layout.record_size())
            .map(|i| (i % 251) as u8)
            .collect();

        group.bench_with_input(BenchmarkId::new("decode", num_points), &data, |b, data| {
            b.iter(|| black_box(decode_points(data, &layout, num_points)))
        });

        let Ok(points) = decode_points(&data, &layout, num_points) else {
            panic!("bench data must decode");
        };
        group.bench_with_input(
            BenchmarkId::new("encode", num_points),
            &points,
            |b, points| b.iter(|| black_box(encode_points(points, &layout))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
