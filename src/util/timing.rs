//! Phase timing and conditional progress logging.
//!
//! No logging framework here, on purpose: phases are timed with
//! `std::time::Instant` and `println!` output is gated behind a quiet
//! flag, rather than pulling in `tracing`/`log` for a single-threaded,
//! batch-oriented tool.

use std::time::Instant;

pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Stopwatch { start: Instant::now() }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

pub fn log_if(verbose: bool, msg: impl std::fmt::Display) {
    if verbose {
        println!("{msg}");
    }
}
