//! Benchmarks for mesh-repair operations.
//!
//! Run with: cargo bench -p mesh-repair
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p mesh-repair -- --save-baseline main
//! 2. After changes: cargo bench -p mesh-repair -- --baseline main

#![allow(missing_docs, clippy::cast_possible_truncation, clippy::cast_precision_loss)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mesh_repair::{make_manifold, validate_mesh, weld_vertices, ManifoldParams};
use mesh_types::{box_mesh, Aabb, IndexedMesh, Point3, Vertex};

/// `n^3` unit boxes on a lattice, stored as an unwelded triangle soup.
fn box_soup(n: usize) -> IndexedMesh {
    let mut soup = IndexedMesh::new();
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                let min = Point3::new(i as f64 * 2.0, j as f64 * 2.0, k as f64 * 2.0);
                let cube = box_mesh(&Aabb::new(min, min + mesh_types::Vector3::repeat(1.0)));
                for face in &cube.faces {
                    let base = soup.vertices.len() as u32;
                    for &v in face {
                        soup.vertices.push(Vertex::new(cube.vertices[v as usize].position));
                    }
                    soup.faces.push([base, base + 1, base + 2]);
                }
            }
        }
    }
    soup
}

fn bench_weld(c: &mut Criterion) {
    let mut group = c.benchmark_group("weld_vertices");
    for n in [4, 8, 16] {
        let soup = box_soup(n);
        group.throughput(Throughput::Elements(soup.vertices.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &soup, |b, soup| {
            b.iter(|| {
                let mut mesh = soup.clone();
                black_box(weld_vertices(&mut mesh, 1e-6))
            });
        });
    }
    group.finish();
}

fn bench_make_manifold(c: &mut Criterion) {
    let mut group = c.benchmark_group("make_manifold");
    let params = ManifoldParams::default();
    for n in [4, 8] {
        let soup = box_soup(n);
        group.throughput(Throughput::Elements(soup.faces.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &soup, |b, soup| {
            b.iter(|| {
                let mut mesh = soup.clone();
                black_box(make_manifold(&mut mesh, &params))
            });
        });
    }
    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut mesh = box_soup(8);
    weld_vertices(&mut mesh, 1e-6);
    c.bench_function("validate_mesh", |b| b.iter(|| black_box(validate_mesh(&mesh))));
}

criterion_group!(benches, bench_weld, bench_make_manifold, bench_validate);
criterion_main!(benches);
