use criterion::{Criterion, criterion_group, criterion_main};
use eternal_lwo::{LodLayout, LodRecord, LwoHeader, LwoMesh, LwoModel, UnpackedGeometry, decode};
use glam::{Vec2, Vec3};
use std::hint::black_box;

fn create_test_model() -> LwoModel {
    LwoModel {
        header: LwoHeader {
            num_meshes: 1,
            selector_hash: 1,
            ..Default::default()
        },
        layout: LodLayout::Standard,
        meshes: vec![LwoMesh {
            material: "models/bench/material".to_string(),
            lods: vec![LodRecord::default(); 3],
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn create_grid(size: usize) -> UnpackedGeometry {
    let mut geometry = UnpackedGeometry::default();
    for row in 0..size {
        for col in 0..size {
            geometry.vertices.push(Vec3::new(col as f32, (row * col) as f32 * 0.01, row as f32));
            geometry.normals.push(Vec3::Y);
            geometry
                .uvs
                .push(Vec2::new(col as f32 / size as f32, row as f32 / size as f32));
            geometry.colors.push([153, 153, 153, 255]);
        }
    }
    for row in 0..size - 1 {
        for col in 0..size - 1 {
            let i = (row * size + col) as u32;
            let s = size as u32;
            geometry.faces.push([i, i + s, i + 1]);
            geometry.faces.push([i + 1, i + s, i + s + 1]);
        }
    }
    geometry
}

fn bench_decode(c: &mut Criterion) {
    let data = create_test_model().to_bytes().unwrap();

    c.bench_function("decode_header", |b| {
        b.iter(|| {
            let _decoded = decode(black_box(&data));
        })
    });
}

fn bench_pack(c: &mut Criterion) {
    let geometry = create_grid(200);

    c.bench_function("pack_geometry_40k", |b| {
        b.iter(|| {
            let (packed, _) = black_box(&geometry).pack().unwrap();
            packed.to_bytes().unwrap()
        })
    });
}

criterion_group!(benches, bench_decode, bench_pack);
criterion_main!(benches);
