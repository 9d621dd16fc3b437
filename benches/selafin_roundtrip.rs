//! Benchmarks loading a synthetic Selafin file end to end: header parsing,
//! geometry materialization, and building this file's dataset groups.

use std::io::Write;

use criterion::{criterion_group, criterion_main, Criterion};
use mdal::DriverManager;

fn write_record(buf: &mut Vec<u8>, payload: &[u8]) {
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(payload);
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
}

fn build_sample_file(vertex_count: usize, timestep_count: usize) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bench.slf");
    let mut buf = Vec::new();

    let mut title = vec![b' '; 80];
    title[..8].copy_from_slice(b"SERAFIN ");
    write_record(&mut buf, &title);

    write_record(&mut buf, &[1i32.to_le_bytes(), 0i32.to_le_bytes()].concat());

    let mut name = vec![b' '; 32];
    name[..5].copy_from_slice(b"DEPTH");
    write_record(&mut buf, &name);

    let params: Vec<u8> = (0..10).flat_map(|_| 0i32.to_le_bytes()).collect();
    write_record(&mut buf, &params);

    let element_count = vertex_count.saturating_sub(2).max(1);
    write_record(
        &mut buf,
        &[element_count as i32, vertex_count as i32, 3, 1]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect::<Vec<u8>>(),
    );

    let connectivity: Vec<i32> = (0..element_count)
        .flat_map(|i| [i as i32 + 1, i as i32 + 2, i as i32 + 3])
        .collect();
    write_record(&mut buf, &connectivity.iter().flat_map(|v| v.to_le_bytes()).collect::<Vec<u8>>());

    let ipobo: Vec<i32> = vec![0; vertex_count];
    write_record(&mut buf, &ipobo.iter().flat_map(|v| v.to_le_bytes()).collect::<Vec<u8>>());

    let xs: Vec<f32> = (0..vertex_count).map(|i| i as f32).collect();
    write_record(&mut buf, &xs.iter().flat_map(|v| v.to_le_bytes()).collect::<Vec<u8>>());
    let ys: Vec<f32> = vec![0.0; vertex_count];
    write_record(&mut buf, &ys.iter().flat_map(|v| v.to_le_bytes()).collect::<Vec<u8>>());

    for step in 0..timestep_count {
        write_record(&mut buf, &(step as f32).to_le_bytes());
        let values: Vec<f32> = vec![1.0; vertex_count];
        write_record(&mut buf, &values.iter().flat_map(|v| v.to_le_bytes()).collect::<Vec<u8>>());
    }

    std::fs::File::create(&path).unwrap().write_all(&buf).unwrap();
    dir
}

fn bench_selafin_load(c: &mut Criterion) {
    let dir = build_sample_file(2_000, 50);
    let path = dir.path().join("bench.slf");
    let manager = DriverManager::new();

    c.bench_function("selafin_load_2000_vertices_50_timesteps", |b| {
        b.iter(|| {
            let mesh = manager.load(path.to_str().unwrap()).unwrap();
            std::hint::black_box(mesh.vertex_count());
        })
    });
}

criterion_group!(benches, bench_selafin_load);
criterion_main!(benches);
