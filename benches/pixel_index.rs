use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;

use std::f64::consts::PI;

use hpxsht::{
  ang_to_pix_nest, ang_to_pix_ring, nest_to_ring, nside_to_pixel_count, ring_to_nest, TWICE_PI,
};

fn gen_rand_ang(n: usize) -> Vec<(f64, f64)> {
  let mut rng = rand::thread_rng();
  (0..n)
    .map(|_| ((rng.gen::<f64>() * 2.0 - 1.0).acos().min(PI), rng.gen::<f64>() * TWICE_PI))
    .collect()
}

fn gen_rand_ipix(nside: u32, n: usize) -> Vec<u64> {
  let npix = nside_to_pixel_count(nside).unwrap();
  let mut rng = rand::thread_rng();
  (0..n).map(|_| rng.gen_range(0..npix)).collect()
}

fn benchmark_ang_to_pix(nside: u32, positions: &[(f64, f64)], nested: bool) -> u64 {
  let mut sum: u64 = 0;
  for (theta, phi) in positions {
    sum |= if nested {
      ang_to_pix_nest(nside, *theta, *phi).unwrap()
    } else {
      ang_to_pix_ring(nside, *theta, *phi).unwrap()
    };
  }
  sum
}

fn benchmark_conversion(nside: u32, ipix: &[u64], to_ring: bool) -> u64 {
  let mut sum: u64 = 0;
  for i in ipix {
    sum |= if to_ring {
      nest_to_ring(nside, *i).unwrap()
    } else {
      ring_to_nest(nside, *i).unwrap()
    };
  }
  sum
}

fn bench_ang_to_pix(c: &mut Criterion) {
  let mut group = c.benchmark_group("ang_to_pix");
  group.sample_size(10);

  let nside = 1 << 16;
  let positions = gen_rand_ang(black_box(1000000));
  group.bench_with_input(BenchmarkId::new("RING", 1), &1, |b, _| {
    b.iter(|| benchmark_ang_to_pix(nside, &positions, false))
  });
  group.bench_with_input(BenchmarkId::new("NESTED", 2), &2, |b, _| {
    b.iter(|| benchmark_ang_to_pix(nside, &positions, true))
  });
  group.finish();
}

fn bench_conversions(c: &mut Criterion) {
  let mut group = c.benchmark_group("Scheme conversions");
  group.sample_size(10);

  for depth in [4_u8, 12, 20] {
    let nside = 1_u32 << depth;
    let ipix = gen_rand_ipix(nside, black_box(1000000));
    group.bench_with_input(BenchmarkId::new("nest_to_ring", depth), &depth, |b, _| {
      b.iter(|| benchmark_conversion(nside, &ipix, true))
    });
    group.bench_with_input(BenchmarkId::new("ring_to_nest", depth), &depth, |b, _| {
      b.iter(|| benchmark_conversion(nside, &ipix, false))
    });
  }
  group.finish();
}

criterion_group!(pixel_index_benches, bench_ang_to_pix, bench_conversions);

criterion_main!(pixel_index_benches);
