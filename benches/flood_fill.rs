use criterion::{black_box, criterion_group, criterion_main, Criterion};

use anvil::PixelBuffer;

fn checkerboard(width: u32, height: u32) -> PixelBuffer {
    let mut bytes = vec![0u8; width as usize * height as usize * 4];
    for (i, px) in bytes.chunks_exact_mut(4).enumerate() {
        let on = i % 2 == 0;
        px.copy_from_slice(&if on { [255, 0, 0, 255] } else { [0, 0, 0, 0] });
    }
    PixelBuffer::from_raw(width, height, bytes).unwrap()
}

fn flood_fill_full_buffer(c: &mut Criterion) {
    c.bench_function("flood_fill_512x512_uniform", |b| {
        b.iter_batched(
            || PixelBuffer::new(512, 512),
            |mut buf| {
                buf.flood_fill(black_box(0), black_box(0), black_box((10, 200, 30, 255)), 0);
                buf
            },
            criterion::BatchSize::LargePost,
        );
    });

    c.bench_function("flood_fill_512x512_checkerboard_seed", |b| {
        b.iter_batched(
            || checkerboard(512, 512),
            |mut buf| {
                buf.flood_fill(black_box(0), black_box(0), black_box((10, 200, 30, 255)), 0);
                buf
            },
            criterion::BatchSize::LargePost,
        );
    });
}

criterion_group!(benches, flood_fill_full_buffer);
criterion_main!(benches);
