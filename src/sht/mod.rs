//! Spherical harmonic transforms of real fields sampled on a RING map.
//!
//! The analysis (map to coefficients) is a quadrature, every pixel having the same weight
//! `4 pi / npix`. It is exact only for band-limited fields sampled at infinite resolution,
//! which is why it can be refined by Jacobi iterations: `a <- a + analyze(f - synthesize(a))`.
//!
//! Both transforms are separated in a Fourier step (along each ring) and a Legendre step
//! (for each order `m`), see Reinecke2013.

use log::{debug, trace};
use num::Complex;
use num_traits::Float;
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::alm::n_alm;
use crate::ring::{n_isolatitude_rings, ring_info_unsafe, RingInfo};
use crate::{
  check_nside_ring, get_thread_pool, n_pix_unsafe, Alm, HealpixError, HealpixMap, Scheme, FOUR_PI,
};

mod fourier;
mod legendre;

use self::fourier::RingDft;
use self::legendre::Legendre;

/// Computes the coefficients `a_lm`, `0 <= m <= mmax`, `m <= l <= lmax`, of the given RING map.
///
/// # Input
/// - `map`: the sampled field, in the RING scheme
/// - `lmax`, `mmax`: the band limits
/// - `iterations`: number of Jacobi refinement steps (`0` for a simple quadrature)
///
/// # Errors
/// `WrongScheme` if the map is not RING, `InvalidBandLimit` if `mmax > lmax`.
///
/// # Example
/// ```rust
/// use hpxsht::{analyze, HealpixMap, Scheme};
///
/// let mut map = HealpixMap::<f64>::new(4, Scheme::Ring).unwrap();
/// map.fill(1.0);
/// let alm = analyze(&map, 1, 1, 0).unwrap();
/// assert!((alm.get(0, 0).unwrap().re - 3.5449077018110318).abs() < 1e-12);
/// ```
pub fn analyze<V>(
  map: &HealpixMap<V>,
  lmax: u32,
  mmax: u32,
  iterations: u32,
) -> Result<Alm, HealpixError>
where
  V: Float + Send + Sync,
{
  check_ring_scheme(map.scheme())?;
  Sht::new(map.nside(), lmax, mmax)?.analyze(map, iterations)
}

/// Evaluates the real field of coefficients `alm` at the centers of the pixels of a RING map
/// of the given `nside`.
///
/// # Errors
/// `InvalidResolution` if `nside` is not valid.
///
/// # Example
/// ```rust
/// use hpxsht::{synthesize, Alm};
/// use num::Complex;
///
/// let mut alm = Alm::new(0, 0).unwrap();
/// alm.set(0, 0, Complex::new(1.0, 0.0)).unwrap();
/// let map = synthesize(&alm, 1).unwrap();
/// assert!(map.iter().all(|v| (v - 0.28209479177387814).abs() < 1e-15));
/// ```
pub fn synthesize(alm: &Alm, nside: u32) -> Result<HealpixMap<f64>, HealpixError> {
  Sht::new(nside, alm.lmax(), alm.mmax())?.synthesize(alm)
}

fn check_ring_scheme(scheme: Scheme) -> Result<(), HealpixError> {
  match scheme {
    Scheme::Ring => Ok(()),
    Scheme::Nested => Err(HealpixError::WrongScheme {
      expected: Scheme::Ring,
      actual: scheme,
    }),
  }
}

/// A transform plan for a given resolution and given band limits, holding the ring
/// geometry, the Fourier twiddle tables and the Legendre recurrence coefficients.
///
/// # Example
/// ```rust
/// use hpxsht::{Alm, Sht};
/// use num::Complex;
///
/// let sht = Sht::new(8, 6, 6).unwrap().with_n_threads(Some(2)).unwrap();
/// let mut alm = Alm::new(6, 6).unwrap();
/// alm.set(3, 2, Complex::new(0.5, -0.5)).unwrap();
/// let map = sht.synthesize(&alm).unwrap();
/// let back = sht.analyze(&map, 3).unwrap();
/// assert!(back.max_abs_diff(&alm).unwrap() < 1e-4);
/// ```
pub struct Sht {
  nside: u32,
  lmax: u32,
  mmax: u32,
  rings: Vec<RingInfo>,
  /// One table per ring length `4 (k + 1)`, `k` in `[0, nside[`
  dfts: Vec<RingDft>,
  legendre: Legendre,
  /// `None` to use the global rayon pool
  pool: Option<ThreadPool>,
}

impl Sht {
  /// # Errors
  /// `InvalidResolution` if `nside` is not valid, `InvalidBandLimit` if `mmax > lmax`.
  pub fn new(nside: u32, lmax: u32, mmax: u32) -> Result<Self, HealpixError> {
    check_nside_ring(nside)?;
    if mmax > lmax {
      return Err(HealpixError::InvalidBandLimit { lmax, mmax });
    }
    let nring = n_isolatitude_rings(nside);
    let rings: Vec<RingInfo> = (1..=nring).map(|r| ring_info_unsafe(nside, r)).collect();
    let dfts = (1..=nside as usize).map(|k| RingDft::new(k << 2)).collect();
    debug!(
      "SHT plan. nside: {}; lmax: {}; mmax: {}; n rings: {}; n coefficients: {}.",
      nside,
      lmax,
      mmax,
      nring,
      n_alm(lmax, mmax)
    );
    Ok(Self {
      nside,
      lmax,
      mmax,
      rings,
      dfts,
      legendre: Legendre::new(lmax, mmax),
      pool: None,
    })
  }

  /// Runs the transforms in a dedicated pool of `n` threads (`Some(n)`), or in the global
  /// rayon pool (`None`).
  ///
  /// # Errors
  /// `ThreadPool` if the pool can not be built.
  pub fn with_n_threads(mut self, n_threads: Option<usize>) -> Result<Self, HealpixError> {
    self.pool = match n_threads {
      Some(n) => {
        let pool = get_thread_pool(Some(n))?;
        debug!("SHT plan. n threads: {}.", pool.current_num_threads());
        Some(pool)
      }
      None => {
        debug!("SHT plan. n threads: {} (global pool).", rayon::current_num_threads());
        None
      }
    };
    Ok(self)
  }

  pub fn nside(&self) -> u32 {
    self.nside
  }

  pub fn lmax(&self) -> u32 {
    self.lmax
  }

  pub fn mmax(&self) -> u32 {
    self.mmax
  }

  /// Map to coefficients, see [analyze].
  ///
  /// # Errors
  /// `WrongScheme` if the map is not RING, `SizeMismatch` if its `nside` differs from the
  /// plan one.
  pub fn analyze<V>(&self, map: &HealpixMap<V>, iterations: u32) -> Result<Alm, HealpixError>
  where
    V: Float + Send + Sync,
  {
    check_ring_scheme(map.scheme())?;
    let npix = n_pix_unsafe(self.nside) as usize;
    if map.len() != npix {
      return Err(HealpixError::SizeMismatch {
        expected: npix,
        actual: map.len(),
      });
    }
    let values: Vec<f64> = map
      .iter()
      .map(|v| v.to_f64().unwrap_or(f64::NAN))
      .collect();
    let mut alm = self.install(|| self.analyze_values(&values))?;
    for i in 1..=iterations {
      let model = self.install(|| self.synthesize_values(&alm));
      let residual: Vec<f64> = values.iter().zip(&model).map(|(v, m)| v - m).collect();
      let rms = (residual.iter().map(|r| r * r).sum::<f64>() / npix as f64).sqrt();
      debug!("SHT iteration {}/{}. Residual RMS: {:e}.", i, iterations, rms);
      let correction = self.install(|| self.analyze_values(&residual))?;
      alm.add_scaled(&correction, 1.0)?;
    }
    Ok(alm)
  }

  /// Coefficients to RING map, see [synthesize].
  ///
  /// # Errors
  /// `SizeMismatch` if the coefficients band limits differ from the plan ones.
  pub fn synthesize(&self, alm: &Alm) -> Result<HealpixMap<f64>, HealpixError> {
    let expected = n_alm(self.lmax, self.mmax);
    if alm.lmax() != self.lmax || alm.mmax() != self.mmax || alm.len() != expected {
      return Err(HealpixError::SizeMismatch {
        expected,
        actual: alm.len(),
      });
    }
    let values = self.install(|| self.synthesize_values(alm));
    HealpixMap::from_vec_with_nside(self.nside, Scheme::Ring, values)
  }

  fn install<R, F>(&self, op: F) -> R
  where
    R: Send,
    F: FnOnce() -> R + Send,
  {
    match &self.pool {
      Some(pool) => pool.install(op),
      None => op(),
    }
  }

  #[inline]
  fn dft(&self, ring: &RingInfo) -> &RingDft {
    &self.dfts[(ring.n_pix >> 2) as usize - 1]
  }

  /// Single quadrature, no refinement.
  fn analyze_values(&self, values: &[f64]) -> Result<Alm, HealpixError> {
    let weight = FOUR_PI / values.len() as f64;
    // Fourier step: one vector of F_m per ring
    let phases: Vec<Vec<Complex<f64>>> = self
      .rings
      .par_iter()
      .map(|ring| {
        let from = ring.first_pix as usize;
        let to = from + ring.n_pix as usize;
        self.dft(ring).forward(&values[from..to], ring.phi0, self.mmax)
      })
      .collect();
    trace!("SHT analysis. Fourier sums done on {} rings.", phases.len());
    // Legendre step: one block of a_lm, l in [m, lmax], per order
    let blocks: Vec<Vec<Complex<f64>>> = (0..=self.mmax)
      .into_par_iter()
      .map(|m| {
        let len = (self.lmax - m) as usize + 1;
        let mut block = vec![Complex::new(0.0, 0.0); len];
        let mut lambda = vec![0.0; len];
        for (ring, phase) in self.rings.iter().zip(&phases) {
          self.legendre.eval(m, ring.z, ring.sin_theta, &mut lambda);
          let f_m = phase[m as usize] * weight;
          for (a, l) in block.iter_mut().zip(&lambda) {
            *a += f_m * *l;
          }
        }
        block
      })
      .collect();
    Alm::from_vec(self.lmax, self.mmax, blocks.concat())
  }

  fn synthesize_values(&self, alm: &Alm) -> Vec<f64> {
    // Legendre step: G_m for each ring, one vector per order
    let orders: Vec<Vec<Complex<f64>>> = (0..=self.mmax)
      .into_par_iter()
      .map(|m| {
        let coefs = alm.order(m);
        let mut lambda = vec![0.0; coefs.len()];
        self
          .rings
          .iter()
          .map(|ring| {
            self.legendre.eval(m, ring.z, ring.sin_theta, &mut lambda);
            coefs
              .iter()
              .zip(&lambda)
              .fold(Complex::new(0.0, 0.0), |acc, (a, l)| acc + *a * *l)
          })
          .collect()
      })
      .collect();
    trace!("SHT synthesis. Legendre sums done on {} orders.", orders.len());
    // Fourier step, one block of pixel values per ring
    let blocks: Vec<Vec<f64>> = self
      .rings
      .par_iter()
      .enumerate()
      .map(|(r, ring)| {
        let g: Vec<Complex<f64>> = orders.iter().map(|order| order[r]).collect();
        let mut out = vec![0.0; ring.n_pix as usize];
        self.dft(ring).backward(&g, ring.phi0, &mut out);
        out
      })
      .collect();
    blocks.concat()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::rngs::StdRng;
  use rand::{Rng, SeedableRng};

  fn init_logger() {
    let _ = env_logger::builder()
      .filter_level(log::LevelFilter::max())
      .is_test(true)
      .try_init();
  }

  fn random_alm(lmax: u32, mmax: u32, seed: u64) -> Alm {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut alm = Alm::new(lmax, mmax).unwrap();
    for m in 0..=mmax {
      for l in m..=lmax {
        let re = rng.gen_range(-1.0..1.0);
        let im = if m == 0 { 0.0 } else { rng.gen_range(-1.0..1.0) };
        alm.set(l, m, Complex::new(re, im)).unwrap();
      }
    }
    alm
  }

  #[test]
  fn testok_constant_field() {
    init_logger();
    let v = 2.5;
    let mut map = HealpixMap::<f64>::new(16, Scheme::Ring).unwrap();
    map.fill(v);
    let alm = analyze(&map, 8, 8, 3).unwrap();
    let a00 = alm.get(0, 0).unwrap();
    assert!((a00.re - v * FOUR_PI.sqrt()).abs() < 1e-6);
    assert!(a00.im.abs() < 1e-12);
    for (l, m) in alm.lm_iter().skip(1) {
      let a = alm.get(l, m).unwrap();
      assert!(a.norm() < 1e-6, "l: {}, m: {}, a: {}", l, m, a);
    }
  }

  #[test]
  fn testok_unit_monopole() {
    let mut map = HealpixMap::<f32>::new(4, Scheme::Ring).unwrap();
    map.fill(1.0);
    let alm = analyze(&map, 1, 1, 0).unwrap();
    assert!((alm.get(0, 0).unwrap().re - 3.5449077018110318).abs() < 1e-12);
  }

  #[test]
  fn testok_synthesize_monopole() {
    let mut alm = Alm::new(0, 0).unwrap();
    alm.set(0, 0, Complex::new(1.0, 0.0)).unwrap();
    let map = synthesize(&alm, 1).unwrap();
    assert_eq!(map.npix(), 12);
    assert_eq!(map.scheme(), Scheme::Ring);
    for v in map.iter() {
      assert!((v - 0.28209479177387814).abs() < 1e-15);
    }
  }

  #[test]
  fn testok_synthesize_closed_form() {
    // a_10 = 1, a_11 = 1: f = sqrt(3/4pi) cos(theta) - 2 sqrt(3/8pi) sin(theta) cos(phi)
    let mut alm = Alm::new(1, 1).unwrap();
    alm.set(1, 0, Complex::new(1.0, 0.0)).unwrap();
    alm.set(1, 1, Complex::new(1.0, 0.0)).unwrap();
    let map = synthesize(&alm, 3).unwrap();
    let c10 = (3.0 / FOUR_PI).sqrt();
    let c11 = (3.0 / (2.0 * FOUR_PI)).sqrt();
    for ipix in 0..map.npix() {
      let (theta, phi) = map.pix_to_ang(ipix).unwrap();
      let expected = c10 * theta.cos() - 2.0 * c11 * theta.sin() * phi.cos();
      assert!((map.get(ipix).unwrap() - expected).abs() < 1e-13, "ipix: {}", ipix);
    }
  }

  #[test]
  fn testok_synthesize_single_coefficient() {
    // a_32 = c: f = 2 lambda_32(cos theta) Re(c e^{2 i phi})
    let c = Complex::new(0.6, -0.3);
    let mut alm = Alm::new(3, 3).unwrap();
    alm.set(3, 2, c).unwrap();
    let map = synthesize(&alm, 4).unwrap();
    let k = 0.25 * (105.0 / (2.0 * std::f64::consts::PI)).sqrt();
    for ipix in 0..map.npix() {
      let (theta, phi) = map.pix_to_ang(ipix).unwrap();
      let lambda = k * theta.sin().powi(2) * theta.cos();
      let expected = 2.0 * lambda * (c.re * (2.0 * phi).cos() - c.im * (2.0 * phi).sin());
      let actual = *map.get(ipix).unwrap();
      assert!((actual - expected).abs() < 1e-13, "ipix: {}; {} != {}", ipix, actual, expected);
    }
  }

  #[test]
  fn testok_analyze_single_coefficient() {
    let c = Complex::new(0.6, -0.3);
    let mut alm = Alm::new(16, 16).unwrap();
    alm.set(15, 5, c).unwrap();
    let sht = Sht::new(16, 16, 16).unwrap();
    let map = sht.synthesize(&alm).unwrap();
    let back = sht.analyze(&map, 0).unwrap();
    assert!((back.get(15, 5).unwrap() - c).norm() < 5e-2, "{}", back.get(15, 5).unwrap());
    let back = sht.analyze(&map, 3).unwrap();
    assert!(back.max_abs_diff(&alm).unwrap() < 1e-3);
  }

  #[test]
  fn testok_band_limited_round_trip_at_twice_nside() {
    init_logger();
    let (nside, lmax) = (16, 32);
    let alm = random_alm(lmax, lmax, 3);
    let sht = Sht::new(nside, lmax, lmax).unwrap();
    let map = sht.synthesize(&alm).unwrap();
    let errors: Vec<f64> = (0..=3)
      .map(|it| sht.analyze(&map, it).unwrap().max_abs_diff(&alm).unwrap())
      .collect();
    for w in errors.windows(2) {
      assert!(w[1] < w[0], "errors: {:?}", errors);
    }
    assert!(errors[3] < errors[0] / 20.0, "errors: {:?}", errors);
  }

  #[test]
  fn testok_band_limited_round_trip() {
    init_logger();
    let (nside, lmax) = (8, 10);
    let alm = random_alm(lmax, lmax, 42);
    let map = synthesize(&alm, nside).unwrap();
    let sht = Sht::new(nside, lmax, lmax).unwrap();
    let errors: Vec<f64> = (0..=3)
      .map(|it| sht.analyze(&map, it).unwrap().max_abs_diff(&alm).unwrap())
      .collect();
    assert!(errors[0] < 5e-2, "errors: {:?}", errors);
    for w in errors.windows(2) {
      assert!(w[1] < w[0], "errors: {:?}", errors);
    }
  }

  #[test]
  fn testok_linearity() {
    let (nside, lmax, mmax) = (4, 9, 6);
    let a = random_alm(lmax, mmax, 1);
    let b = random_alm(lmax, mmax, 2);
    let c = -0.75;
    let mut sum = a.clone();
    sum.add_scaled(&b, c).unwrap();
    let sht = Sht::new(nside, lmax, mmax).unwrap();
    let fa = sht.synthesize(&a).unwrap();
    let fb = sht.synthesize(&b).unwrap();
    let fsum = sht.synthesize(&sum).unwrap();
    for ((s, x), y) in fsum.iter().zip(fa.iter()).zip(fb.iter()) {
      assert!((s - (x + c * y)).abs() < 1e-12);
    }
  }

  #[test]
  fn testok_dedicated_pool() {
    let alm = random_alm(12, 12, 7);
    let global = Sht::new(8, 12, 12).unwrap();
    let dedicated = Sht::new(8, 12, 12).unwrap().with_n_threads(Some(2)).unwrap();
    let m1 = global.synthesize(&alm).unwrap();
    let m2 = dedicated.synthesize(&alm).unwrap();
    assert_eq!(m1, m2);
    assert_eq!(global.analyze(&m1, 1).unwrap(), dedicated.analyze(&m2, 1).unwrap());
  }

  #[test]
  fn testerr_inputs() {
    let nested = HealpixMap::<f64>::new(8, Scheme::Nested).unwrap();
    assert_eq!(
      analyze(&nested, 10, 10, 0),
      Err(HealpixError::WrongScheme {
        expected: Scheme::Ring,
        actual: Scheme::Nested
      })
    );
    let ring = HealpixMap::<f64>::new(8, Scheme::Ring).unwrap();
    assert_eq!(
      analyze(&ring, 4, 5, 0),
      Err(HealpixError::InvalidBandLimit { lmax: 4, mmax: 5 })
    );
    assert!(matches!(Sht::new(0, 4, 4), Err(HealpixError::InvalidResolution { nside: 0 })));
    let sht = Sht::new(4, 4, 4).unwrap();
    assert_eq!(
      sht.analyze(&ring, 0).err(),
      Some(HealpixError::SizeMismatch {
        expected: 192,
        actual: 768
      })
    );
    assert_eq!(
      sht.synthesize(&Alm::new(4, 3).unwrap()).err(),
      Some(HealpixError::SizeMismatch {
        expected: 15,
        actual: 14
      })
    );
    assert!(synthesize(&Alm::new(2, 2).unwrap(), 0).is_err());
  }
}
