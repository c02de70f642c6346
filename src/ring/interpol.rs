//! Bilinear interpolation on the 4 pixel centers surrounding a position.

use std::f64::consts::PI;

use super::{n_isolatitude_rings, ring_above, ring_info_unsafe};
use crate::sph_geom::{check_ang, phi_in_0_2pi};
use crate::{check_nside_ring, n_pix_unsafe, nested, HealpixError, TWICE_PI};

/// Returns the RING indices and the weights of the 4 pixels to be used to interpolate a map
/// at the given position.
///
/// The 2 rings surrounding the position are used, and in each ring the 2 pixels surrounding
/// its longitude. Weights are linear in `phi` inside each ring, then linear in `theta`
/// between both rings. North of the first ring (south of the last ring), the missing ring is
/// replaced by the 4 pixels of the first (last) ring, taken with equal weights.
///
/// # Output
/// - 4 `(ipix, weight)` pairs, weights are non-negative and sum to 1.
///
/// # Errors
/// `InvalidResolution` for an invalid `nside`, `InvalidAngle` for an invalid position.
///
/// # Example
/// ```rust
/// use hpxsht::ring::bilinear_interpolation;
/// use hpxsht::pix_to_ang_ring;
///
/// // On a pixel center, the full weight goes to the pixel
/// let (theta, phi) = pix_to_ang_ring(8, 300).unwrap();
/// let pw = bilinear_interpolation(8, theta, phi).unwrap();
/// let w: f64 = pw.iter().filter(|(ipix, _)| *ipix == 300).map(|(_, w)| w).sum();
/// assert!((w - 1.0).abs() < 1e-12);
/// ```
pub fn bilinear_interpolation(
  nside: u32,
  theta: f64,
  phi: f64,
) -> Result<[(u64, f64); 4], HealpixError> {
  check_nside_ring(nside)?;
  check_ang(theta, phi)?;
  let phi = phi_in_0_2pi(phi);
  let nring = n_isolatitude_rings(nside);
  let ir1 = ring_above(nside, theta.cos());
  let ir2 = ir1 + 1;
  let mut pix = [0_u64; 4];
  let mut wgt = [0_f64; 4];
  let mut theta1 = 0.0;
  let mut theta2 = 0.0;
  if ir1 > 0 {
    theta1 = bracket(nside, ir1, phi, &mut pix[0..2], &mut wgt[0..2]);
  }
  if ir2 <= nring {
    theta2 = bracket(nside, ir2, phi, &mut pix[2..4], &mut wgt[2..4]);
  }
  if ir1 == 0 {
    // North of the first ring
    let wtheta = theta / theta2;
    wgt[2] *= wtheta;
    wgt[3] *= wtheta;
    let fac = (1.0 - wtheta) * 0.25;
    wgt[0] = fac;
    wgt[1] = fac;
    wgt[2] += fac;
    wgt[3] += fac;
    pix[0] = (pix[2] + 2) & 3;
    pix[1] = (pix[3] + 2) & 3;
  } else if ir2 > nring {
    // South of the last ring
    let wtheta = (theta - theta1) / (PI - theta1);
    wgt[0] *= 1.0 - wtheta;
    wgt[1] *= 1.0 - wtheta;
    let fac = wtheta * 0.25;
    wgt[0] += fac;
    wgt[1] += fac;
    wgt[2] = fac;
    wgt[3] = fac;
    let npix = n_pix_unsafe(nside);
    pix[2] = ((pix[0] + 2) & 3) + npix - 4;
    pix[3] = ((pix[1] + 2) & 3) + npix - 4;
  } else {
    let wtheta = (theta - theta1) / (theta2 - theta1);
    wgt[0] *= 1.0 - wtheta;
    wgt[1] *= 1.0 - wtheta;
    wgt[2] *= wtheta;
    wgt[3] *= wtheta;
  }
  Ok([
    (pix[0], wgt[0]),
    (pix[1], wgt[1]),
    (pix[2], wgt[2]),
    (pix[3], wgt[3]),
  ])
}

/// NESTED version of [bilinear_interpolation].
///
/// # Errors
/// `InvalidResolution` if `nside` is not a power of 2, `InvalidAngle` for an invalid position.
pub fn bilinear_interpolation_nest(
  nside: u32,
  theta: f64,
  phi: f64,
) -> Result<[(u64, f64); 4], HealpixError> {
  let layer = nested::layer(nside)?;
  bilinear_interpolation(nside, theta, phi)
    .map(|pw| pw.map(|(ipix, w)| (layer.from_ring(ipix), w)))
}

/// Sets the 2 pixels of the given ring surrounding `phi`, and their weights.
/// Returns the ring colatitude.
fn bracket(nside: u32, ring: u32, phi: f64, pix: &mut [u64], wgt: &mut [f64]) -> f64 {
  let info = ring_info_unsafe(nside, ring);
  let n = info.n_pix as i64;
  let dphi = TWICE_PI / info.n_pix as f64;
  let shift = if info.shifted { 0.5 } else { 0.0 };
  let tmp = phi / dphi - shift;
  let i1 = tmp.floor() as i64;
  let w1 = (phi - (i1 as f64 + shift) * dphi) / dphi;
  let i2 = (i1 + 1).rem_euclid(n);
  let i1 = i1.rem_euclid(n);
  pix[0] = info.first_pix + i1 as u64;
  pix[1] = info.first_pix + i2 as u64;
  wgt[0] = 1.0 - w1;
  wgt[1] = w1;
  info.theta
}
