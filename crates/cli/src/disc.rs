use std::{
  error::Error,
  io::{stdout, Write},
};

use clap::Args;

use hpxsht::ring::{disc::query_disc_nest, query_disc};

/// Sorted indices of the pixels inside a disc, one per line
#[derive(Debug, Args)]
pub struct Disc {
  /// Resolution parameter
  nside: u32,
  /// Colatitude of the disc center, in radians
  theta: f64,
  /// Longitude of the disc center, in radians
  #[clap(allow_hyphen_values = true)]
  phi: f64,
  /// Disc radius, in radians
  radius: f64,
  /// Returns all pixels overlapping the disc (and possibly a few more), not only the pixels
  /// whose center is in the disc
  #[clap(long)]
  inclusive: bool,
  /// Use the NESTED scheme instead of the RING scheme
  #[clap(long)]
  nested: bool,
}
impl Disc {
  pub fn exec(self) -> Result<(), Box<dyn Error>> {
    let pixels = if self.nested {
      query_disc_nest(self.nside, self.theta, self.phi, self.radius, self.inclusive)
    } else {
      query_disc(self.nside, self.theta, self.phi, self.radius, self.inclusive)
    }?;
    let mut handle = stdout().lock();
    for ipix in pixels {
      writeln!(&mut handle, "{}", ipix)?;
    }
    Ok(())
  }
}
