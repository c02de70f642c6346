//! HEALPix pixelization of the sphere and spherical harmonic transforms.
//! See papers:
//! * Gorsky2005: "HEALPix: A Framework for High-Resolution Discretization and Fast Analysis of Data
//!   Distributed on the Sphere", Górski, K. M. et al., 2005; 2005ApJ...622..759G.
//! * Calabretta2007: "Mapping on the HEALPix grid", Calabretta, M. R. et Roukema, B. F., 2007; 2007MNRAS.381..865C
//! * Reinecke2013: "Libsharp - spherical harmonic transforms revisited", Reinecke, M. et Seljebotn, D. S., 2013; 2013A&A...554A.112R
//!
//! Pixel indices are 0-based in both the RING and the NESTED schemes.
//!
//! # Example
//! ```rust
//! use hpxsht::{nside_to_pixel_count, nest_to_ring, ring_to_nest};
//!
//! assert_eq!(nside_to_pixel_count(256).unwrap(), 786432);
//! assert_eq!(nest_to_ring(256, 0).unwrap(), 391808);
//! assert_eq!(ring_to_nest(256, 391808).unwrap(), 0);
//! ```

use std::f64::consts::PI;

use rayon::ThreadPool;

/// Constant = 2 * pi.
///
/// ```rust
/// use hpxsht::{TWICE_PI};
/// use std::f64::consts::PI;
/// assert_eq!(2f64 * PI, TWICE_PI);
/// ```
pub const TWICE_PI: f64 = 2.0 * PI;

/// Constant = 2 / pi.
pub const TWO_OVER_PI: f64 = 2.0 / PI;

/// Constant = 4 * pi, i.e. the area of the unit sphere.
pub const FOUR_PI: f64 = 4.0 * PI;

/// Constant = 29, i.e. the largest possible depth we can store on a signed positive long
/// (4 bits for base cells + 2 bits per depth + 2 remaining bits).
///
/// ```rust
/// use hpxsht::{DEPTH_MAX};
/// assert_eq!(29, DEPTH_MAX);
/// ```
pub const DEPTH_MAX: u8 = 29;

/// Constant = nside(29), i.e. the largest possible nside available when we store HEALPix
/// indices on a u64.
///
/// ```rust
/// use hpxsht::{DEPTH_MAX, NSIDE_MAX, nside};
/// assert_eq!(nside(DEPTH_MAX), NSIDE_MAX);
/// ```
pub const NSIDE_MAX: u32 = 536870912;

/// Limit on |z|=|cos(colatitude)| between the equatorial region and the polar caps.
/// Equals 2/3, see Eq. (1) in Gorsky2005.
pub const TRANSITION_Z: f64 = 2_f64 / 3_f64;

/// Above this |z| value, the colatitude is recovered from its sine (if available) rather
/// than from `z`, to preserve the accuracy near the poles.
pub(crate) const Z_NEAR_POLE: f64 = 0.99;

/// Simple trait used to implements `pow2` on f64.
pub trait Customf64 {
  fn pow2(self) -> f64;
}

impl Customf64 for f64 {
  /// Returns x^2
  #[inline]
  fn pow2(self) -> f64 {
    self * self
  }
}

/// Returns the number of pixels of a map of resolution `nside`.
///
/// # Input
/// - `nside`: the number of subdivisions of a base cell side, in `[1, 2^29]`
///   (any value for the RING scheme)
///
/// # Output
/// - `npix = 12 * nside^2`
///
/// # Errors
/// `InvalidResolution` if `nside` is `0` or larger than [NSIDE_MAX](constant.NSIDE_MAX.html).
/// A negative `nside` is not representable.
///
/// # Example
/// ```rust
/// use hpxsht::{nside_to_pixel_count};
///
/// assert_eq!(nside_to_pixel_count(1).unwrap(), 12);
/// assert_eq!(nside_to_pixel_count(4).unwrap(), 192);
/// assert_eq!(nside_to_pixel_count(256).unwrap(), 786432);
/// assert!(nside_to_pixel_count(0).is_err());
/// ```
pub fn nside_to_pixel_count(nside: u32) -> Result<u64, HealpixError> {
  check_nside_ring(nside)?;
  Ok(n_pix_unsafe(nside))
}

/// Returns the `nside` such that `12 * nside^2 == npix`.
///
/// # Errors
/// `InvalidPixelCount` if `npix` is not of the form `12 * nside^2` with a valid `nside`.
///
/// # Example
/// ```rust
/// use hpxsht::{pixel_count_to_nside};
///
/// assert_eq!(pixel_count_to_nside(192).unwrap(), 4);
/// assert_eq!(pixel_count_to_nside(786432).unwrap(), 256);
/// assert!(pixel_count_to_nside(191).is_err());
/// ```
pub fn pixel_count_to_nside(npix: u64) -> Result<u32, HealpixError> {
  let err = HealpixError::InvalidPixelCount { npix };
  if npix == 0 || npix % 12 != 0 {
    return Err(err);
  }
  let nside_square = npix / 12;
  let nside = isqrt(nside_square);
  if nside * nside != nside_square || nside > NSIDE_MAX as u64 {
    Err(err)
  } else {
    Ok(nside as u32)
  }
}

/// Returns the number of iso-latitude rings at the given `nside`, i.e. `4 * nside - 1`.
///
/// # Errors
/// `InvalidResolution` if `nside` is not in `[1, 2^29]`.
///
/// # Example
/// ```rust
/// use hpxsht::{nside_to_ring_count};
///
/// assert_eq!(nside_to_ring_count(1).unwrap(), 3);
/// assert_eq!(nside_to_ring_count(4).unwrap(), 15);
/// ```
pub fn nside_to_ring_count(nside: u32) -> Result<u32, HealpixError> {
  check_nside_ring(nside)?;
  Ok(ring::n_isolatitude_rings(nside))
}

/// Returns, for the given `depth`, the number of subdivision of a base cell side.
///
/// # Input
/// - `depth` must be in `[0, 29]`
///
/// # Output
/// - `nside` = 2^`depth`
///
/// # Panics
/// If `depth` is not valid (see [is_depth](fn.is_depth.html)), this method panics.
///
/// # Example
/// ```rust
/// use hpxsht::{nside};
///
/// assert_eq!(1, nside(0));
/// assert_eq!(256, nside(8));
/// for depth in 0..29 {
///     assert_eq!(2u32.pow(depth), nside(depth as u8));
/// }
/// ```
#[inline]
pub fn nside(depth: u8) -> u32 {
  check_depth(depth);
  nside_unsafe(depth)
}

/// Same as [nside](fn.nside.html) except that this version does not check the argument.
#[inline]
pub const fn nside_unsafe(depth: u8) -> u32 {
  1_u32 << depth
}

#[inline]
fn check_depth(depth: u8) {
  assert!(is_depth(depth), "Expected depth in [0, 29]");
}

/// Returns `true` if the given argument is a valid depth, i.e. if it is <= [DEPTH_MAX](constant.DEPTH_MAX.html).
#[inline]
pub const fn is_depth(depth: u8) -> bool {
  depth <= DEPTH_MAX
}

/// Returns, for the given `nside`, the number of subdivision of a base cell (i.e. the depth).
/// For the NESTED scheme only.
///
/// # Errors
/// `InvalidResolution` if `nside` is not a power of 2 in `[1, 2^29]`.
///
/// # Example
/// ```rust
/// use hpxsht::{nside, depth};
///
/// for d in 0..29 {
///     assert_eq!(d, depth(nside(d as u8)).unwrap());
/// }
/// assert!(depth(3).is_err());
/// ```
#[inline]
pub fn depth(nside: u32) -> Result<u8, HealpixError> {
  if is_nside(nside) {
    Ok(depth_unsafe(nside))
  } else {
    Err(HealpixError::InvalidResolution { nside })
  }
}

/// Same as [depth](fn.depth.html) except that this version does not check the argument.
#[inline]
pub const fn depth_unsafe(nside: u32) -> u8 {
  nside.trailing_zeros() as u8
}

/// Returns `true` if the given argument is a valid `nside` for the NESTED scheme, i.e.
/// if it is a power of 2, is != 0 and is <= [NSIDE_MAX](constant.NSIDE_MAX.html).
#[inline]
pub const fn is_nside(nside: u32) -> bool {
  nside.is_power_of_two() && nside <= NSIDE_MAX
}

/// Returns the number of distinct pixels at the given `depth`.
///
/// # Panics
/// If `depth` is not valid (see [is_depth](fn.is_depth.html)), this method panics.
///
/// ```rust
/// use hpxsht::{n_hash};
///
/// assert_eq!(12u64, n_hash(0u8));
/// assert_eq!(192u64, n_hash(2u8));
/// assert_eq!(786432u64, n_hash(8u8));
/// assert_eq!(3458764513820540928u64, n_hash(29u8));
/// ```
#[inline]
pub fn n_hash(depth: u8) -> u64 {
  check_depth(depth);
  n_hash_unsafe(depth)
}

/// Same as [n_hash](fn.n_hash.html) except that this version does not panic if the given
/// `depth` is out of range.
#[inline]
pub const fn n_hash_unsafe(depth: u8) -> u64 {
  12u64 << (depth << 1u8)
}

/// `12 * nside^2`, without checking `nside`.
#[inline]
pub(crate) const fn n_pix_unsafe(nside: u32) -> u64 {
  let n = nside as u64;
  12 * n * n
}

/// Checks that `nside` is a valid RING scheme resolution.
#[inline]
pub(crate) fn check_nside_ring(nside: u32) -> Result<(), HealpixError> {
  if nside == 0 || nside > NSIDE_MAX {
    Err(HealpixError::InvalidResolution { nside })
  } else {
    Ok(())
  }
}

/// Checks that `ipix` is in `[0, npix[`.
#[inline]
pub(crate) fn check_ipix(npix: u64, ipix: u64) -> Result<(), HealpixError> {
  if ipix < npix {
    Ok(())
  } else {
    Err(HealpixError::PixelIndexOutOfRange { ipix, npix })
  }
}

/// Exact integer square root (floor).
#[inline]
pub(crate) fn isqrt(x: u64) -> u64 {
  // The float approximation may be off by one for large values
  let mut r = (x as f64).sqrt() as u64;
  while r * r > x {
    r -= 1;
  }
  while (r + 1) * (r + 1) <= x {
    r += 1;
  }
  r
}

/// Returns a pool of thread containing:
/// * the maximum number of threads available on the machine, if `n_threads` is `None`
/// * the given number of threads in the `n_threads` option if it is `Some`.
pub fn get_thread_pool(n_threads: Option<usize>) -> Result<ThreadPool, HealpixError> {
  let mut pool_builder = rayon::ThreadPoolBuilder::new();
  if let Some(n_threads) = n_threads {
    pool_builder = pool_builder.num_threads(n_threads);
  }
  pool_builder.build().map_err(|e| e.into())
}

pub mod error;
pub use error::HealpixError;

/// Module containing the scheme tag and the scheme polymorphic functions
pub mod scheme;
pub use scheme::Scheme;

/// Module containing NESTED scheme methods
pub mod nested;
pub use nested::{
  ang_to_pix_nest, nest_to_ring, pix_to_ang_nest, pix_to_vec_nest, ring_to_nest, vec_to_pix_nest,
};

/// Module containing RING scheme methods
pub mod ring;
pub use ring::{ang_to_pix_ring, pix_to_ang_ring, pix_to_vec_ring, vec_to_pix_ring};

pub mod sph_geom;
pub use sph_geom::{ang_to_vec, coo3d::UnitVect3, coo3d::Vec3, vec_to_ang};

pub mod alm;
pub mod map;
pub use alm::Alm;
pub use map::HealpixMap;

/// Spherical harmonic transforms
pub mod sht;
pub use sht::{analyze, synthesize, Sht};

pub mod view;
