use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use num::Complex;
use rand::Rng;

use hpxsht::{Alm, Sht};

fn gen_rand_alm(lmax: u32) -> Alm {
  let mut rng = rand::thread_rng();
  let mut alm = Alm::new(lmax, lmax).unwrap();
  for a in alm.coefs_mut() {
    *a = Complex::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
  }
  alm
}

fn bench_sht(c: &mut Criterion) {
  let mut group = c.benchmark_group("SHT");
  group.sample_size(10);

  for nside in [32_u32, 64] {
    let lmax = 2 * nside;
    let sht = Sht::new(nside, lmax, lmax).unwrap();
    let alm = gen_rand_alm(lmax);
    let map = sht.synthesize(&alm).unwrap();
    group.bench_with_input(BenchmarkId::new("synthesize", nside), &nside, |b, _| {
      b.iter(|| sht.synthesize(black_box(&alm)).unwrap())
    });
    group.bench_with_input(BenchmarkId::new("analyze", nside), &nside, |b, _| {
      b.iter(|| sht.analyze(black_box(&map), 0).unwrap())
    });
    group.bench_with_input(BenchmarkId::new("analyze 3 iterations", nside), &nside, |b, _| {
      b.iter(|| sht.analyze(black_box(&map), 3).unwrap())
    });
  }
  group.finish();
}

criterion_group!(sht_benches, bench_sht);

criterion_main!(sht_benches);
