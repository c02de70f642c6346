use std::{
  error::Error,
  io::{stdout, Write},
  time::Instant,
};

use clap::Args;
use log::info;
use num::Complex;

use hpxsht::{Alm, Sht};

/// Synthesizes a map from a deterministic band-limited set of coefficients, analyzes it
/// back and prints the largest coefficient error for each number of refinement steps
#[derive(Debug, Args)]
pub struct ShtCheck {
  /// Resolution parameter
  nside: u32,
  /// Largest degree l
  lmax: u32,
  /// Largest order m (default: lmax)
  #[clap(long)]
  mmax: Option<u32>,
  /// Largest number of refinement iterations
  #[clap(short, long, default_value_t = 3)]
  iterations: u32,
  /// Number of threads (default: as many as available)
  #[clap(long)]
  n_threads: Option<usize>,
}
impl ShtCheck {
  pub fn exec(self) -> Result<(), Box<dyn Error>> {
    let mmax = self.mmax.unwrap_or(self.lmax);
    let sht = Sht::new(self.nside, self.lmax, mmax)?.with_n_threads(self.n_threads)?;
    let mut alm = Alm::new(self.lmax, mmax)?;
    for (l, m) in alm.lm_iter().collect::<Vec<_>>() {
      let (lf, mf) = (l as f64, m as f64);
      let re = (lf + 2.0 * mf).cos() / (1.0 + lf);
      let im = if m == 0 {
        0.0
      } else {
        (3.0 * lf + mf).sin() / (1.0 + lf)
      };
      alm.set(l, m, Complex::new(re, im))?;
    }
    let now = Instant::now();
    let map = sht.synthesize(&alm)?;
    info!("Synthesis done in {} ms", now.elapsed().as_millis());
    let mut handle = stdout().lock();
    writeln!(&mut handle, "{:>10} {:>22}", "iterations", "max_abs_error")?;
    for iterations in 0..=self.iterations {
      let now = Instant::now();
      let err = sht.analyze(&map, iterations)?.max_abs_diff(&alm)?;
      info!(
        "Analysis with {} iteration(s) done in {} ms",
        iterations,
        now.elapsed().as_millis()
      );
      writeln!(&mut handle, "{:>10} {:>22.15e}", iterations, err)?;
    }
    Ok(())
  }
}
