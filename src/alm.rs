//! Spherical harmonic coefficients `a_lm` of a real field, for `0 <= m <= mmax` and
//! `m <= l <= lmax` (negative orders follow from `a_l(-m) = (-1)^m conj(a_lm)`).

use num::Complex;
use serde::{Deserialize, Serialize};

use crate::HealpixError;

/// Number of coefficients stored for the given band limits.
///
/// # Example
/// ```rust
/// use hpxsht::alm::n_alm;
///
/// assert_eq!(n_alm(0, 0), 1);
/// assert_eq!(n_alm(2, 1), 5);
/// assert_eq!(n_alm(10, 10), 66);
/// ```
pub const fn n_alm(lmax: u32, mmax: u32) -> usize {
  let (lmax, mmax) = (lmax as usize, mmax as usize);
  (mmax + 1) * (lmax + 1) - ((mmax * (mmax + 1)) >> 1)
}

#[inline]
fn check_band_limit(lmax: u32, mmax: u32) -> Result<(), HealpixError> {
  if mmax > lmax {
    Err(HealpixError::InvalidBandLimit { lmax, mmax })
  } else {
    Ok(())
  }
}

/// Coefficient set, stored m-major: all `l` for `m = 0`, then all `l` for `m = 1`, ...
///
/// # Example
/// ```rust
/// use hpxsht::Alm;
/// use num::Complex;
///
/// let mut alm = Alm::new(2, 1).unwrap();
/// alm.set(2, 1, Complex::new(1.0, -1.0)).unwrap();
/// assert_eq!(alm.get(2, 1), Ok(Complex::new(1.0, -1.0)));
/// let lm: Vec<(u32, u32)> = alm.lm_iter().collect();
/// assert_eq!(lm, vec![(0, 0), (1, 0), (2, 0), (1, 1), (2, 1)]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AlmParts")]
pub struct Alm {
  lmax: u32,
  mmax: u32,
  coefs: Vec<Complex<f64>>,
}

/// Deserialized fields, checked by [Alm::from_vec] before becoming an [Alm].
#[derive(Deserialize)]
struct AlmParts {
  lmax: u32,
  mmax: u32,
  coefs: Vec<Complex<f64>>,
}

impl TryFrom<AlmParts> for Alm {
  type Error = HealpixError;

  fn try_from(parts: AlmParts) -> Result<Self, Self::Error> {
    Alm::from_vec(parts.lmax, parts.mmax, parts.coefs)
  }
}

impl Alm {
  /// Returns a set of null coefficients.
  ///
  /// # Errors
  /// `InvalidBandLimit` if `mmax > lmax`.
  pub fn new(lmax: u32, mmax: u32) -> Result<Self, HealpixError> {
    check_band_limit(lmax, mmax)?;
    Ok(Self {
      lmax,
      mmax,
      coefs: vec![Complex::new(0.0, 0.0); n_alm(lmax, mmax)],
    })
  }

  /// Wraps the given coefficients, stored m-major.
  ///
  /// # Errors
  /// `InvalidBandLimit` if `mmax > lmax`, `SizeMismatch` if `coefs.len() != n_alm(lmax, mmax)`.
  pub fn from_vec(lmax: u32, mmax: u32, coefs: Vec<Complex<f64>>) -> Result<Self, HealpixError> {
    check_band_limit(lmax, mmax)?;
    let expected = n_alm(lmax, mmax);
    if coefs.len() != expected {
      Err(HealpixError::SizeMismatch {
        expected,
        actual: coefs.len(),
      })
    } else {
      Ok(Self { lmax, mmax, coefs })
    }
  }

  pub fn lmax(&self) -> u32 {
    self.lmax
  }

  pub fn mmax(&self) -> u32 {
    self.mmax
  }

  pub fn len(&self) -> usize {
    self.coefs.len()
  }

  /// Always `false`: `a_00` is always stored.
  pub fn is_empty(&self) -> bool {
    self.coefs.is_empty()
  }

  /// Storage index of `a_lm`, i.e. `m (2 lmax + 1 - m) / 2 + l`, inputs not checked.
  #[inline]
  pub fn index(&self, l: u32, m: u32) -> usize {
    let (l, m, lmax) = (l as usize, m as usize, self.lmax as usize);
    ((m * ((lmax << 1) + 1 - m)) >> 1) + l
  }

  #[inline]
  fn checked_index(&self, l: u32, m: u32) -> Result<usize, HealpixError> {
    if m <= self.mmax && m <= l && l <= self.lmax {
      Ok(self.index(l, m))
    } else {
      Err(HealpixError::InvalidQuantumNumbers {
        l,
        m,
        lmax: self.lmax,
        mmax: self.mmax,
      })
    }
  }

  /// Returns `a_lm`.
  ///
  /// # Errors
  /// `InvalidQuantumNumbers` if `(l, m)` is not stored.
  pub fn get(&self, l: u32, m: u32) -> Result<Complex<f64>, HealpixError> {
    self.checked_index(l, m).map(|i| self.coefs[i])
  }

  /// Sets `a_lm`.
  ///
  /// # Errors
  /// `InvalidQuantumNumbers` if `(l, m)` is not stored.
  pub fn set(&mut self, l: u32, m: u32, value: Complex<f64>) -> Result<(), HealpixError> {
    let i = self.checked_index(l, m)?;
    self.coefs[i] = value;
    Ok(())
  }

  /// The `(l, m)` pairs, in storage order.
  pub fn lm_iter(&self) -> impl Iterator<Item = (u32, u32)> {
    let lmax = self.lmax;
    (0..=self.mmax).flat_map(move |m| (m..=lmax).map(move |l| (l, m)))
  }

  pub fn coefs(&self) -> &[Complex<f64>] {
    &self.coefs
  }

  pub fn coefs_mut(&mut self) -> &mut [Complex<f64>] {
    &mut self.coefs
  }

  pub fn into_vec(self) -> Vec<Complex<f64>> {
    self.coefs
  }

  /// The coefficients of order `m`, for `l` in `[m, lmax]`.
  pub(crate) fn order(&self, m: u32) -> &[Complex<f64>] {
    let from = self.index(m, m);
    &self.coefs[from..from + (self.lmax - m) as usize + 1]
  }

  /// `self += c * other`.
  ///
  /// # Errors
  /// `SizeMismatch` if both sets do not have the same band limits.
  pub fn add_scaled(&mut self, other: &Alm, c: f64) -> Result<(), HealpixError> {
    if self.lmax != other.lmax || self.mmax != other.mmax {
      return Err(HealpixError::SizeMismatch {
        expected: self.coefs.len(),
        actual: other.coefs.len(),
      });
    }
    for (a, b) in self.coefs.iter_mut().zip(&other.coefs) {
      *a += *b * c;
    }
    Ok(())
  }

  /// `self *= c`.
  pub fn scale(&mut self, c: f64) {
    for a in self.coefs.iter_mut() {
      *a *= c;
    }
  }

  /// Largest modulus of the difference between two sets of coefficients.
  ///
  /// # Errors
  /// `SizeMismatch` if both sets do not have the same band limits.
  pub fn max_abs_diff(&self, other: &Alm) -> Result<f64, HealpixError> {
    if self.lmax != other.lmax || self.mmax != other.mmax {
      return Err(HealpixError::SizeMismatch {
        expected: self.coefs.len(),
        actual: other.coefs.len(),
      });
    }
    Ok(
      self
        .coefs
        .iter()
        .zip(&other.coefs)
        .map(|(a, b)| (*a - *b).norm())
        .fold(0.0, f64::max),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn testok_index() {
    let alm = Alm::new(5, 3).unwrap();
    assert_eq!(alm.len(), n_alm(5, 3));
    for (i, (l, m)) in alm.lm_iter().enumerate() {
      assert_eq!(alm.index(l, m), i);
    }
    assert_eq!(alm.lm_iter().count(), alm.len());
    assert_eq!(alm.order(0).len(), 6);
    assert_eq!(alm.order(3).len(), 3);
  }

  #[test]
  fn testok_linear_combination() {
    let mut a = Alm::from_vec(1, 1, vec![Complex::new(1.0, 0.0); 3]).unwrap();
    let b = Alm::from_vec(1, 1, vec![Complex::new(0.0, 2.0); 3]).unwrap();
    a.add_scaled(&b, 0.5).unwrap();
    assert_eq!(a.get(1, 1), Ok(Complex::new(1.0, 1.0)));
    a.scale(2.0);
    assert_eq!(a.get(0, 0), Ok(Complex::new(2.0, 2.0)));
    assert_eq!(a.max_abs_diff(&a.clone()), Ok(0.0));
    assert!((a.max_abs_diff(&b).unwrap() - 2.0).abs() < 1e-15);
  }

  #[test]
  fn testerr_inputs() {
    assert_eq!(
      Alm::new(2, 3),
      Err(HealpixError::InvalidBandLimit { lmax: 2, mmax: 3 })
    );
    assert_eq!(
      Alm::from_vec(2, 2, vec![Complex::new(0.0, 0.0); 5]),
      Err(HealpixError::SizeMismatch {
        expected: 6,
        actual: 5
      })
    );
    let mut a = Alm::new(2, 1).unwrap();
    assert!(a.get(2, 2).is_err());
    assert!(a.get(0, 1).is_err());
    assert!(a.set(3, 0, Complex::new(1.0, 0.0)).is_err());
    let b = Alm::new(2, 2).unwrap();
    assert!(a.add_scaled(&b, 1.0).is_err());
  }

  #[test]
  fn testok_serde_round_trip() {
    let mut a = Alm::new(3, 2).unwrap();
    a.set(3, 2, Complex::new(0.5, -0.25)).unwrap();
    let bytes = bincode::serialize(&a).unwrap();
    let decoded: Alm = bincode::deserialize(&bytes).unwrap();
    assert_eq!(decoded, a);
  }

  #[test]
  fn testerr_deserialize_wrong_length() {
    // Same layout as an Alm, but 3 coefficients instead of 15
    let bytes = bincode::serialize(&(4_u32, 4_u32, vec![Complex::new(1.0, 0.0); 3])).unwrap();
    let decoded: Result<Alm, _> = bincode::deserialize(&bytes);
    assert!(decoded.is_err());
    let bytes = bincode::serialize(&(2_u32, 3_u32, vec![Complex::new(1.0, 0.0); 9])).unwrap();
    assert!(bincode::deserialize::<Alm>(&bytes).is_err());
  }
}
