use thiserror::Error;

use crate::scheme::Scheme;

/// Errors returned by the pixelization and transform functions.
/// All of them are input validation failures: an operation either fully succeeds or fails
/// without modifying its inputs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HealpixError {
  #[error("Invalid nside: {nside}. Expected a value in [1, 2^29] (and a power of 2 for the NESTED scheme).")]
  InvalidResolution { nside: u32 },
  #[error("Invalid number of pixels: {npix}. Expected 12 * nside^2.")]
  InvalidPixelCount { npix: u64 },
  #[error("Pixel index {ipix} out of range. Expected a value in [0, {npix}[.")]
  PixelIndexOutOfRange { ipix: u64, npix: u64 },
  #[error("Ring number {ring} out of range. Expected a value in [1, {nring}].")]
  RingIndexOutOfRange { ring: u32, nring: u32 },
  #[error("Invalid angle. Colatitude: {theta}, longitude: {phi}.")]
  InvalidAngle { theta: f64, phi: f64 },
  #[error("Degenerate vector ({x}, {y}, {z}): unable to normalize it.")]
  DegenerateVector { x: f64, y: f64, z: f64 },
  #[error("Wrong scheme. Expected: {expected:?}. Actual: {actual:?}.")]
  WrongScheme { expected: Scheme, actual: Scheme },
  #[error("Invalid band limit. lmax: {lmax}, mmax: {mmax}. Expected mmax <= lmax.")]
  InvalidBandLimit { lmax: u32, mmax: u32 },
  #[error("Invalid quantum numbers. l: {l}, m: {m}. Expected m <= mmax = {mmax} and m <= l <= lmax = {lmax}.")]
  InvalidQuantumNumbers { l: u32, m: u32, lmax: u32, mmax: u32 },
  #[error("Size mismatch. Expected: {expected}. Actual: {actual}.")]
  SizeMismatch { expected: usize, actual: usize },
  #[error("Unable to build the thread pool: {0}")]
  ThreadPool(String),
}

impl From<rayon::ThreadPoolBuildError> for HealpixError {
  fn from(err: rayon::ThreadPoolBuildError) -> Self {
    Self::ThreadPool(err.to_string())
  }
}
