//! Pixelized map container: a resolution, a scheme and one value per pixel.

use num_traits::{Float, Zero};
use serde::{Deserialize, Serialize};

use crate::sph_geom::coo3d::{UnitVect3, Vec3};
use crate::{
  check_ipix, nested, nside_to_pixel_count, pixel_count_to_nside, ring, HealpixError, Scheme,
};

/// A HEALPix map: `12 nside^2` values ordered according to the map `scheme`.
///
/// # Example
/// ```rust
/// use hpxsht::{HealpixMap, Scheme};
///
/// let mut map = HealpixMap::<f64>::new(4, Scheme::Ring).unwrap();
/// assert_eq!(map.npix(), 192);
/// map.set(10, 1.5).unwrap();
/// assert_eq!(map.get(10), Ok(&1.5));
/// let nested = map.to_nested().unwrap();
/// assert_eq!(nested.scheme(), Scheme::Nested);
/// assert_eq!(nested.to_ring().unwrap().get(10), Ok(&1.5));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
  try_from = "HealpixMapParts<V>",
  bound(deserialize = "V: Deserialize<'de>")
)]
pub struct HealpixMap<V> {
  nside: u32,
  scheme: Scheme,
  values: Vec<V>,
}

/// Deserialized fields, checked by [HealpixMap::from_vec_with_nside].
#[derive(Deserialize)]
struct HealpixMapParts<V> {
  nside: u32,
  scheme: Scheme,
  values: Vec<V>,
}

impl<V> TryFrom<HealpixMapParts<V>> for HealpixMap<V> {
  type Error = HealpixError;

  fn try_from(parts: HealpixMapParts<V>) -> Result<Self, Self::Error> {
    HealpixMap::from_vec_with_nside(parts.nside, parts.scheme, parts.values)
  }
}

impl<V: Zero + Clone> HealpixMap<V> {
  /// Creates a map of the given resolution and scheme, filled with zeros.
  ///
  /// # Errors
  /// `InvalidResolution` if `nside` is not valid for the given scheme.
  pub fn new(nside: u32, scheme: Scheme) -> Result<Self, HealpixError> {
    scheme.check_nside(nside)?;
    let npix = nside_to_pixel_count(nside)? as usize;
    Ok(Self {
      nside,
      scheme,
      values: vec![V::zero(); npix],
    })
  }
}

impl<V> HealpixMap<V> {
  /// Creates a map from the given values, the resolution being deduced from their number.
  ///
  /// # Errors
  /// `InvalidPixelCount` if `values.len()` is not of the form `12 nside^2`, `InvalidResolution`
  /// if the deduced `nside` is not a power of 2 for a NESTED map.
  pub fn from_vec(scheme: Scheme, values: Vec<V>) -> Result<Self, HealpixError> {
    let nside = pixel_count_to_nside(values.len() as u64)?;
    scheme.check_nside(nside)?;
    Ok(Self {
      nside,
      scheme,
      values,
    })
  }

  /// Creates a map from the given values, checking their number against `nside`.
  ///
  /// # Errors
  /// `InvalidResolution` if `nside` is not valid for the given scheme, `SizeMismatch` if
  /// `values.len() != 12 nside^2`.
  pub fn from_vec_with_nside(
    nside: u32,
    scheme: Scheme,
    values: Vec<V>,
  ) -> Result<Self, HealpixError> {
    scheme.check_nside(nside)?;
    let expected = nside_to_pixel_count(nside)? as usize;
    if values.len() != expected {
      return Err(HealpixError::SizeMismatch {
        expected,
        actual: values.len(),
      });
    }
    Ok(Self {
      nside,
      scheme,
      values,
    })
  }

  pub fn nside(&self) -> u32 {
    self.nside
  }

  pub fn scheme(&self) -> Scheme {
    self.scheme
  }

  /// Number of pixels, i.e. `12 nside^2`.
  pub fn npix(&self) -> u64 {
    self.values.len() as u64
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  /// Always `false`: a map contains at least 12 pixels.
  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// Value of the given pixel.
  ///
  /// # Errors
  /// `PixelIndexOutOfRange` if `ipix >= npix`.
  pub fn get(&self, ipix: u64) -> Result<&V, HealpixError> {
    check_ipix(self.npix(), ipix)?;
    Ok(&self.values[ipix as usize])
  }

  /// Sets the value of the given pixel.
  ///
  /// # Errors
  /// `PixelIndexOutOfRange` if `ipix >= npix`.
  pub fn set(&mut self, ipix: u64, value: V) -> Result<(), HealpixError> {
    check_ipix(self.npix(), ipix)?;
    self.values[ipix as usize] = value;
    Ok(())
  }

  pub fn values(&self) -> &[V] {
    &self.values
  }

  pub fn values_mut(&mut self) -> &mut [V] {
    &mut self.values
  }

  pub fn iter(&self) -> std::slice::Iter<'_, V> {
    self.values.iter()
  }

  pub fn into_vec(self) -> Vec<V> {
    self.values
  }

  pub fn ang_to_pix(&self, theta: f64, phi: f64) -> Result<u64, HealpixError> {
    self.scheme.ang_to_pix(self.nside, theta, phi)
  }

  pub fn vec_to_pix<T: Vec3>(&self, v: &T) -> Result<u64, HealpixError> {
    self.scheme.vec_to_pix(self.nside, v)
  }

  pub fn pix_to_ang(&self, ipix: u64) -> Result<(f64, f64), HealpixError> {
    self.scheme.pix_to_ang(self.nside, ipix)
  }

  pub fn pix_to_vec(&self, ipix: u64) -> Result<UnitVect3, HealpixError> {
    self.scheme.pix_to_vec(self.nside, ipix)
  }
}

impl<V: Clone> HealpixMap<V> {
  /// Sets all pixels to the given value.
  pub fn fill(&mut self, value: V) {
    self.values.fill(value);
  }

  /// Returns the same map in the RING scheme (no copy if already RING).
  ///
  /// # Errors
  /// Never fails for a NESTED map built by this crate (its `nside` is a power of 2).
  pub fn to_ring(self) -> Result<Self, HealpixError> {
    match self.scheme {
      Scheme::Ring => Ok(self),
      Scheme::Nested => {
        let layer = nested::layer(self.nside)?;
        let values = (0..self.npix())
          .map(|r| self.values[layer.from_ring(r) as usize].clone())
          .collect();
        Ok(Self {
          nside: self.nside,
          scheme: Scheme::Ring,
          values,
        })
      }
    }
  }

  /// Returns the same map in the NESTED scheme (no copy if already NESTED).
  ///
  /// # Errors
  /// `InvalidResolution` if the map `nside` is not a power of 2.
  pub fn to_nested(self) -> Result<Self, HealpixError> {
    match self.scheme {
      Scheme::Nested => Ok(self),
      Scheme::Ring => {
        let layer = nested::layer(self.nside)?;
        let values = (0..self.npix())
          .map(|n| self.values[layer.to_ring(n) as usize].clone())
          .collect();
        Ok(Self {
          nside: self.nside,
          scheme: Scheme::Nested,
          values,
        })
      }
    }
  }
}

impl<V: Float> HealpixMap<V> {
  /// Bilinear interpolation of the map value at the given position, from the 4 closest
  /// pixel centers (see [bilinear_interpolation](crate::ring::bilinear_interpolation)).
  ///
  /// # Errors
  /// `InvalidAngle` for an invalid position.
  pub fn interpolate(&self, theta: f64, phi: f64) -> Result<V, HealpixError> {
    let neighbours = ring::bilinear_interpolation(self.nside, theta, phi)?;
    let layer = match self.scheme {
      Scheme::Ring => None,
      Scheme::Nested => Some(nested::layer(self.nside)?),
    };
    Ok(neighbours.iter().fold(V::zero(), |acc, &(ipix, w)| {
      let ipix = layer.map(|l| l.from_ring(ipix)).unwrap_or(ipix);
      acc + self.values[ipix as usize] * num_traits::cast(w).unwrap_or_else(V::zero)
    }))
  }
}
