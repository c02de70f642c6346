//! Discrete Fourier sums along a ring of `n` equally spaced pixels, for orders `m` possibly
//! larger than `n` (aliased orders are folded onto `m mod n`).

use num::Complex;

use crate::TWICE_PI;

/// Table of the `n` roots of unity `e^{-2 i pi k / n}`, each one computed directly (no
/// accumulated rotation error).
pub struct RingDft {
  twiddles: Vec<Complex<f64>>,
}

impl RingDft {
  pub fn new(n: usize) -> Self {
    let twiddles = (0..n)
      .map(|k| {
        let (s, c) = (TWICE_PI * k as f64 / n as f64).sin_cos();
        Complex::new(c, -s)
      })
      .collect();
    Self { twiddles }
  }

  pub fn len(&self) -> usize {
    self.twiddles.len()
  }

  /// Forward sums `F_m = sum_j f_j e^{-i m (phi0 + 2 pi j / n)}`, for `m` in `[0, mmax]`.
  pub fn forward(&self, values: &[f64], phi0: f64, mmax: u32) -> Vec<Complex<f64>> {
    let n = self.len();
    debug_assert_eq!(values.len(), n);
    let n_distinct = n.min(mmax as usize + 1);
    let folded: Vec<Complex<f64>> = (0..n_distinct)
      .map(|k| {
        values
          .iter()
          .enumerate()
          .fold(Complex::new(0.0, 0.0), |acc, (j, f)| {
            acc + self.twiddles[(k * j) % n] * *f
          })
      })
      .collect();
    (0..=mmax as usize)
      .map(|m| folded[m % n] * Complex::from_polar(1.0, -(m as f64) * phi0))
      .collect()
  }

  /// Backward sums of a real signal given its non-negative orders `coefs[m] = G_m`:
  /// `f_j = Re(G_0) + 2 sum_{m >= 1} Re(G_m e^{i m (phi0 + 2 pi j / n)})`.
  pub fn backward(&self, coefs: &[Complex<f64>], phi0: f64, out: &mut [f64]) {
    let n = self.len();
    debug_assert_eq!(out.len(), n);
    let mut folded = vec![Complex::new(0.0, 0.0); n.min(coefs.len())];
    for (m, c) in coefs.iter().enumerate() {
      let weight = if m == 0 { 1.0 } else { 2.0 };
      folded[m % n] += *c * Complex::from_polar(weight, m as f64 * phi0);
    }
    for (j, o) in out.iter_mut().enumerate() {
      *o = folded
        .iter()
        .enumerate()
        .map(|(k, d)| (*d * self.twiddles[(k * j) % n].conj()).re)
        .sum();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn testok_forward_naive() {
    let n = 12;
    let phi0 = std::f64::consts::PI / n as f64;
    let values: Vec<f64> = (0..n).map(|j| (j as f64 * 0.7).sin() + 0.1 * j as f64).collect();
    let dft = RingDft::new(n);
    let mmax = 30;
    let got = dft.forward(&values, phi0, mmax);
    assert_eq!(got.len(), 31);
    for m in 0..=mmax as usize {
      let expected = values.iter().enumerate().fold(Complex::new(0.0, 0.0), |acc, (j, f)| {
        let phi = phi0 + TWICE_PI * j as f64 / n as f64;
        acc + Complex::from_polar(*f, -(m as f64) * phi)
      });
      assert!((got[m] - expected).norm() < 1e-12, "m: {}", m);
    }
  }

  #[test]
  fn testok_backward_naive() {
    let n = 8;
    let phi0 = 0.0;
    let coefs: Vec<Complex<f64>> = (0..=11)
      .map(|m| Complex::new(1.0 / (1.0 + m as f64), 0.3 * m as f64))
      .collect();
    let dft = RingDft::new(n);
    let mut got = vec![0.0; n];
    dft.backward(&coefs, phi0, &mut got);
    for (j, v) in got.iter().enumerate() {
      let phi = phi0 + TWICE_PI * j as f64 / n as f64;
      let expected: f64 = coefs
        .iter()
        .enumerate()
        .map(|(m, c)| {
          let w = if m == 0 { 1.0 } else { 2.0 };
          w * (*c * Complex::from_polar(1.0, m as f64 * phi)).re
        })
        .sum();
      assert!((v - expected).abs() < 1e-12, "j: {}", j);
    }
  }
}
