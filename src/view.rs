//! Raster of a map in the Mollweide projection, e.g. to be colour-mapped and displayed by
//! an external tool.

use std::f64::consts::{FRAC_PI_2, PI};

use itertools::iproduct;
use log::debug;
use mapproj::{
  img2celestial::Img2Celestial, img2proj::ReversedEastPngImgXY2ProjXY, pseudocyl::mol::Mol,
  CanonicalProjection, CenteredProjection, ImgXY, LonLat,
};
use num_traits::Zero;

use crate::{HealpixError, HealpixMap};

/// Mollweide raster of the given map, centered on `(lon, lat) = (0, 0)`.
/// See [mollweide_centered].
///
/// # Example
/// ```rust
/// use hpxsht::{HealpixMap, Scheme};
/// use hpxsht::view::mollweide;
///
/// let mut map = HealpixMap::<f32>::new(4, Scheme::Nested).unwrap();
/// map.fill(1.0);
/// let img = mollweide(&map, (100, 50)).unwrap();
/// assert_eq!(img.len(), 5000);
/// assert_eq!(img[0], 0.0);   // upper left corner, outside of the ellipse
/// assert_eq!(img[25 * 100 + 50], 1.0);
/// ```
pub fn mollweide<V>(map: &HealpixMap<V>, img_size: (u16, u16)) -> Result<Vec<V>, HealpixError>
where
  V: Zero + Copy,
{
  mollweide_centered(map, img_size, None)
}

/// Mollweide raster of the given map.
///
/// # Input
/// - `map`: the map, in either scheme
/// - `img_size`: the number of columns and the number of rows of the raster
/// - `proj_center`: the `(lon, lat)`, in radians, of the projection center
///   (`(0, 0)` if `None`)
///
/// # Output
/// - the values, row-major from the top left corner, east being on the left (astronomical
///   convention). Raster pixels outside of the projection ellipse are set to `V::zero()`.
///
/// # Errors
/// `InvalidAngle` if a deprojected position is not valid.
pub fn mollweide_centered<V>(
  map: &HealpixMap<V>,
  img_size: (u16, u16),
  proj_center: Option<(f64, f64)>,
) -> Result<Vec<V>, HealpixError>
where
  V: Zero + Copy,
{
  let proj = Mol::new();
  let (size_x, size_y) = img_size;
  let proj_range_x = proj
    .bounds()
    .x_bounds()
    .as_ref()
    .cloned()
    .unwrap_or_else(|| -PI..=PI);
  let proj_range_y = proj
    .bounds()
    .y_bounds()
    .as_ref()
    .cloned()
    .unwrap_or_else(|| -PI..=PI);
  let img2proj =
    ReversedEastPngImgXY2ProjXY::from((size_x, size_y), (&proj_range_x, &proj_range_y));
  let mut img2cel = Img2Celestial::new(img2proj, CenteredProjection::new(proj));
  if let Some((lon, lat)) = proj_center {
    img2cel.set_proj_center_from_lonlat(&LonLat::new(lon, lat));
  }
  let values = map.values();
  let mut n_inside = 0_usize;
  let mut img = Vec::with_capacity(size_x as usize * size_y as usize);
  for (y, x) in iproduct!(0..size_y, 0..size_x) {
    if let Some(lonlat) = img2cel.img2lonlat(&ImgXY::new(x as f64, y as f64)) {
      let theta = (FRAC_PI_2 - lonlat.lat()).clamp(0.0, PI);
      let ipix = map.ang_to_pix(theta, lonlat.lon())?;
      img.push(values[ipix as usize]);
      n_inside += 1;
    } else {
      // Not in the proj area
      img.push(V::zero());
    }
  }
  debug!(
    "Mollweide raster. size: {}x{}; nside: {}; n pixels in the projection: {}.",
    size_x,
    size_y,
    map.nside(),
    n_inside
  );
  Ok(img)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Scheme;

  fn init_logger() {
    let _ = env_logger::builder()
      .filter_level(log::LevelFilter::max())
      .is_test(true)
      .try_init();
  }

  fn smooth_map(scheme: Scheme, lon0: f64) -> HealpixMap<f64> {
    let mut map = HealpixMap::<f64>::new(16, scheme).unwrap();
    for ipix in 0..map.npix() {
      let (theta, phi) = map.pix_to_ang(ipix).unwrap();
      map.set(ipix, theta.sin() * (phi - lon0).cos()).unwrap();
    }
    map
  }

  #[test]
  fn testok_mollweide_footprint() {
    init_logger();
    let mut map = HealpixMap::<f64>::new(4, Scheme::Ring).unwrap();
    map.fill(1.0);
    let (w, h) = (200_u16, 100_u16);
    let img = mollweide(&map, (w, h)).unwrap();
    assert_eq!(img.len(), 20000);
    assert_eq!(img[0], 0.0);
    assert_eq!(img[img.len() - 1], 0.0);
    assert_eq!(img[50 * 200 + 100], 1.0);
    let n_ones = img.iter().filter(|v| **v == 1.0).count();
    assert!(n_ones > 12000 && n_ones < 20000, "n_ones: {}", n_ones);
  }

  #[test]
  fn testok_mollweide_orientation() {
    // sin(theta) sin(phi): positive east of the central meridian, i.e. on the left
    let map = smooth_map(Scheme::Nested, FRAC_PI_2);
    let img = mollweide(&map, (200, 100)).unwrap();
    assert!(img[50 * 200 + 50] > 0.9, "{}", img[50 * 200 + 50]);
    assert!(img[50 * 200 + 150] < -0.9, "{}", img[50 * 200 + 150]);
  }

  #[test]
  fn testok_mollweide_centered() {
    let map = smooth_map(Scheme::Ring, 1.0);
    let img = mollweide_centered(&map, (200, 100), Some((1.0, 0.0))).unwrap();
    assert!((img[50 * 200 + 100] - 1.0).abs() < 0.05);
    let img = mollweide(&map, (200, 100)).unwrap();
    assert!((img[50 * 200 + 100] - 1_f64.cos()).abs() < 0.1);
  }
}
