//! Orthonormal associated Legendre functions `lambda_lm(cos theta)`, such that
//! `Y_lm(theta, phi) = lambda_lm(cos theta) e^{i m phi}` (Condon-Shortley phase included).
//!
//! For a fixed order `m`, the values are obtained by the three terms recurrence on the degree:
//! ```math
//! \lambda_{mm} = -\sqrt{\frac{2m+1}{2m}} \sin\theta \lambda_{m-1,m-1}, \quad \lambda_{00} = \frac{1}{\sqrt{4\pi}}
//! \lambda_{lm} = a_{lm} (z \lambda_{l-1,m} - b_{lm} \lambda_{l-2,m})
//! ```
//! with `a_lm = sqrt((4l^2 - 1) / (l^2 - m^2))` and `b_lm = sqrt(((l-1)^2 - m^2) / (4(l-1)^2 - 1))`.

use crate::alm::n_alm;
use crate::FOUR_PI;

/// Pre-computed recurrence coefficients, for all orders up to `mmax` and degrees up to `lmax`.
pub struct Legendre {
  lmax: u32,
  mmax: u32,
  /// `sqrt((2k+1)/(2k))`, for `k` in `[1, mmax]` (index 0 unused)
  sectoral: Vec<f64>,
  /// `(a_lm, b_lm)`, stored like the `Alm` coefficients (the `l = m` entries are unused)
  ab: Vec<(f64, f64)>,
}

impl Legendre {
  /// No check is performed: `mmax <= lmax` is expected.
  pub fn new(lmax: u32, mmax: u32) -> Self {
    let sectoral = (0..=mmax)
      .map(|k| {
        if k == 0 {
          0.0
        } else {
          let k = k as f64;
          ((2.0 * k + 1.0) / (2.0 * k)).sqrt()
        }
      })
      .collect();
    let mut ab = Vec::with_capacity(n_alm(lmax, mmax));
    for m in 0..=mmax {
      let m2 = (m as f64).powi(2);
      ab.push((0.0, 0.0));
      for l in m + 1..=lmax {
        let l = l as f64;
        let lm1 = l - 1.0;
        let a = ((4.0 * l * l - 1.0) / (l * l - m2)).sqrt();
        let b = ((lm1 * lm1 - m2) / (4.0 * lm1 * lm1 - 1.0)).sqrt();
        ab.push((a, b));
      }
    }
    Self {
      lmax,
      mmax,
      sectoral,
      ab,
    }
  }

  /// Writes `lambda_lm(z)` for `l` in `[m, lmax]` into `out` (of length `lmax - m + 1`).
  ///
  /// # Input
  /// - `m`: the order, `<= mmax`
  /// - `z`, `sin_theta`: cosine and sine of the colatitude
  ///
  /// Values smaller than the smallest normal `f64` (large `m` close to the poles) are
  /// flushed to zero.
  pub fn eval(&self, m: u32, z: f64, sin_theta: f64, out: &mut [f64]) {
    debug_assert!(m <= self.mmax);
    debug_assert_eq!(out.len(), (self.lmax - m) as usize + 1);
    let mut lambda_mm = 1.0 / FOUR_PI.sqrt();
    for k in 1..=m as usize {
      lambda_mm *= -self.sectoral[k] * sin_theta;
      if lambda_mm.abs() < f64::MIN_POSITIVE {
        lambda_mm = 0.0;
        break;
      }
    }
    let from = order_offset(self.lmax, m);
    let ab = &self.ab[from..from + out.len()];
    let mut prev2 = 0.0;
    let mut prev1 = lambda_mm;
    out[0] = lambda_mm;
    for (o, (a, b)) in out.iter_mut().zip(ab).skip(1) {
      let cur = a * (z * prev1 - b * prev2);
      *o = cur;
      prev2 = prev1;
      prev1 = cur;
    }
  }
}

/// Index of `(l = m, m)` in an m-major storage, i.e. the start of the block of order `m`.
#[inline]
fn order_offset(lmax: u32, m: u32) -> usize {
  let (m, lmax) = (m as usize, lmax as usize);
  ((m * ((lmax << 1) + 1 - m)) >> 1) + m
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::f64::consts::PI;

  fn eval(leg: &Legendre, m: u32, theta: f64) -> Vec<f64> {
    let mut out = vec![0.0; (leg.lmax - m) as usize + 1];
    let (sth, z) = theta.sin_cos();
    leg.eval(m, z, sth, &mut out);
    out
  }

  #[test]
  fn testok_closed_forms() {
    let leg = Legendre::new(3, 3);
    for theta in [0.0, 0.3, 1.0, PI / 2.0, 2.5, PI] {
      let (sth, z) = f64::sin_cos(theta);
      let l0 = eval(&leg, 0, theta);
      assert!((l0[0] - 0.5 / PI.sqrt()).abs() < 1e-14);
      assert!((l0[1] - (3.0 / FOUR_PI).sqrt() * z).abs() < 1e-14);
      assert!((l0[2] - (5.0 / FOUR_PI).sqrt() * 0.5 * (3.0 * z * z - 1.0)).abs() < 1e-14);
      let l1 = eval(&leg, 1, theta);
      assert!((l1[0] + (3.0 / (8.0 * PI)).sqrt() * sth).abs() < 1e-14);
      assert!((l1[1] + (15.0 / (8.0 * PI)).sqrt() * sth * z).abs() < 1e-14);
      let l2 = eval(&leg, 2, theta);
      assert!((l2[0] - 0.25 * (15.0 / (2.0 * PI)).sqrt() * sth * sth).abs() < 1e-14);
      // l > m >= 1
      let l31 = -0.125 * (21.0 / PI).sqrt() * sth * (5.0 * z * z - 1.0);
      assert!((l1[2] - l31).abs() < 1e-14, "{} != {}", l1[2], l31);
      let l32 = 0.25 * (105.0 / (2.0 * PI)).sqrt() * sth * sth * z;
      assert!((l2[1] - l32).abs() < 1e-14, "{} != {}", l2[1], l32);
      let l3 = eval(&leg, 3, theta);
      assert!((l3[0] + 0.125 * (35.0 / PI).sqrt() * sth.powi(3)).abs() < 1e-14);
    }
  }

  #[test]
  fn testok_order_offset() {
    let (lmax, mmax) = (7, 5);
    let leg = Legendre::new(lmax, mmax);
    let alm = crate::Alm::new(lmax, mmax).unwrap();
    assert_eq!(leg.ab.len(), alm.len());
    for m in 0..=mmax {
      assert_eq!(order_offset(lmax, m), alm.index(m, m));
      // l = m placeholder at the start of each block
      assert_eq!(leg.ab[order_offset(lmax, m)], (0.0, 0.0));
    }
    assert_eq!(order_offset(lmax, mmax) + (lmax - mmax) as usize + 1, leg.ab.len());
  }

  #[test]
  fn testok_orthonormality() {
    // Gauss-Legendre-free check: midpoint rule on a fine grid in z
    let lmax = 8;
    let leg = Legendre::new(lmax, lmax);
    let n = 20000;
    for m in 0..=lmax {
      let mut gram = vec![0.0; ((lmax - m + 1) * (lmax - m + 1)) as usize];
      let len = (lmax - m + 1) as usize;
      let mut out = vec![0.0; len];
      for k in 0..n {
        let z = -1.0 + (k as f64 + 0.5) * 2.0 / n as f64;
        leg.eval(m, z, ((1.0 - z) * (1.0 + z)).sqrt(), &mut out);
        for i in 0..len {
          for j in 0..len {
            gram[i * len + j] += out[i] * out[j] * 2.0 / n as f64 * 2.0 * PI;
          }
        }
      }
      for i in 0..len {
        for j in 0..len {
          let expected = if i == j { 1.0 } else { 0.0 };
          assert!((gram[i * len + j] - expected).abs() < 1e-4, "m: {}, {} {}", m, i, j);
        }
      }
    }
  }

  #[test]
  fn testok_underflow() {
    let leg = Legendre::new(2000, 2000);
    let out = eval(&leg, 2000, 1e-3);
    assert!(out.iter().all(|v| v.is_finite()));
    assert!(out.iter().all(|v| *v == 0.0));
  }
}
