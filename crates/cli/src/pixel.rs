use std::{
  error::Error,
  io::{stdout, Write},
};

use clap::Args;

use hpxsht::{nest_to_ring, ring_to_nest, Scheme, Vec3};

fn scheme(nested: bool) -> Scheme {
  if nested {
    Scheme::Nested
  } else {
    Scheme::Ring
  }
}

/// Converts a NESTED index into a RING index
#[derive(Debug, Args)]
pub struct Nest2Ring {
  /// Resolution parameter, a power of 2
  nside: u32,
  /// NESTED index, 0-based
  ipix: u64,
}
impl Nest2Ring {
  pub fn exec(self) -> Result<(), Box<dyn Error>> {
    let ring = nest_to_ring(self.nside, self.ipix)?;
    writeln!(stdout(), "{}", ring).map_err(|e| e.into())
  }
}

/// Converts a RING index into a NESTED index
#[derive(Debug, Args)]
pub struct Ring2Nest {
  /// Resolution parameter, a power of 2
  nside: u32,
  /// RING index, 0-based
  ipix: u64,
}
impl Ring2Nest {
  pub fn exec(self) -> Result<(), Box<dyn Error>> {
    let nest = ring_to_nest(self.nside, self.ipix)?;
    writeln!(stdout(), "{}", nest).map_err(|e| e.into())
  }
}

/// Index of the pixel containing the given position
#[derive(Debug, Args)]
pub struct Ang2Pix {
  /// Resolution parameter
  nside: u32,
  /// Colatitude, in radians, in [0, pi]
  theta: f64,
  /// Longitude, in radians
  #[clap(allow_hyphen_values = true)]
  phi: f64,
  /// Use the NESTED scheme instead of the RING scheme
  #[clap(long)]
  nested: bool,
}
impl Ang2Pix {
  pub fn exec(self) -> Result<(), Box<dyn Error>> {
    let ipix = scheme(self.nested).ang_to_pix(self.nside, self.theta, self.phi)?;
    writeln!(stdout(), "{}", ipix).map_err(|e| e.into())
  }
}

/// Colatitude and longitude, in radians, of the center of the given pixel
#[derive(Debug, Args)]
pub struct Pix2Ang {
  /// Resolution parameter
  nside: u32,
  /// Pixel index, 0-based
  ipix: u64,
  /// Use the NESTED scheme instead of the RING scheme
  #[clap(long)]
  nested: bool,
}
impl Pix2Ang {
  pub fn exec(self) -> Result<(), Box<dyn Error>> {
    let (theta, phi) = scheme(self.nested).pix_to_ang(self.nside, self.ipix)?;
    writeln!(stdout(), "{:17.15} {:17.15}", theta, phi).map_err(|e| e.into())
  }
}

/// Index of the pixel containing the given direction (the vector needs not be normalized)
#[derive(Debug, Args)]
pub struct Vec2Pix {
  /// Resolution parameter
  nside: u32,
  #[clap(allow_hyphen_values = true)]
  x: f64,
  #[clap(allow_hyphen_values = true)]
  y: f64,
  #[clap(allow_hyphen_values = true)]
  z: f64,
  /// Use the NESTED scheme instead of the RING scheme
  #[clap(long)]
  nested: bool,
}
impl Vec2Pix {
  pub fn exec(self) -> Result<(), Box<dyn Error>> {
    let ipix = scheme(self.nested).vec_to_pix(self.nside, &[self.x, self.y, self.z])?;
    writeln!(stdout(), "{}", ipix).map_err(|e| e.into())
  }
}

/// Unit vector pointing to the center of the given pixel
#[derive(Debug, Args)]
pub struct Pix2Vec {
  /// Resolution parameter
  nside: u32,
  /// Pixel index, 0-based
  ipix: u64,
  /// Use the NESTED scheme instead of the RING scheme
  #[clap(long)]
  nested: bool,
}
impl Pix2Vec {
  pub fn exec(self) -> Result<(), Box<dyn Error>> {
    let v = scheme(self.nested).pix_to_vec(self.nside, self.ipix)?;
    writeln!(stdout(), "{:+17.15} {:+17.15} {:+17.15}", v.x(), v.y(), v.z()).map_err(|e| e.into())
  }
}
