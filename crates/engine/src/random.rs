//! Random sources for posterior sampling and uniform picks.
//!
//! Production code draws from the calling thread's generator, so concurrent
//! callers never contend on shared state. Tests inject [`SeededRandom`].

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Beta, Distribution};

pub trait RandomSource: Send + Sync {
    /// One draw from Beta(alpha, beta).
    fn beta(&self, alpha: f64, beta: f64) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index(&self, len: usize) -> usize;

    /// Uniform float in `[0, 1)`.
    fn unit(&self) -> f64;
}

fn sample_beta<R: Rng + ?Sized>(rng: &mut R, alpha: f64, beta: f64) -> f64 {
    match Beta::new(alpha, beta) {
        Ok(dist) => dist.sample(rng),
        // Only reachable with non-positive or non-finite shape parameters.
        Err(_) => alpha / (alpha + beta),
    }
}

/// Thread-local generator, fresh handle per call.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn beta(&self, alpha: f64, beta: f64) -> f64 {
        sample_beta(&mut rand::thread_rng(), alpha, beta)
    }

    fn index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }

    fn unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Deterministic generator for reproducible runs.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn beta(&self, alpha: f64, beta: f64) -> f64 {
        sample_beta(&mut *self.rng.lock(), alpha, beta)
    }

    fn index(&self, len: usize) -> usize {
        self.rng.lock().gen_range(0..len)
    }

    fn unit(&self) -> f64 {
        self.rng.lock().gen::<f64>()
    }
}
