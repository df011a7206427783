//! Thread-local randomness for augmentation transforms.
//!
//! Random transforms never own an RNG; they draw from the calling thread's
//! generator. Seeding it with [`init_worker_rng`] makes the `train` presets
//! reproducible per thread, while unseeded threads fall back to `rand::rng()`.

use rand::distr::uniform::{SampleRange, SampleUniform};
use rand::rngs::StdRng;
use rand::Rng as _;
use rand::SeedableRng;
use std::cell::RefCell;

thread_local! {
    /// Thread-local RNG for deterministic randomness in workers
    pub static WORKER_RNG: RefCell<Option<StdRng>> = const { RefCell::new(None) };
}

/// Initialize the calling thread's RNG from worker_id, epoch, and base seed.
/// Seed formula: base_seed + (epoch << 32) + worker_id
pub fn init_worker_rng(worker_id: usize, epoch: usize, base_seed: u64) {
    WORKER_RNG.with(|rng| {
        let seed = base_seed
            .wrapping_add((epoch as u64) << 32)
            .wrapping_add(worker_id as u64);
        *rng.borrow_mut() = Some(StdRng::seed_from_u64(seed));
    })
}

/// Drops the thread's seeded RNG so later draws use `rand::rng()` again.
pub fn reset_worker_rng() {
    WORKER_RNG.with(|rng| *rng.borrow_mut() = None);
}

/// Random bool from the worker RNG, or the thread RNG if unseeded.
pub fn worker_gen_bool(p: f64) -> bool {
    WORKER_RNG.with(|rng| match rng.borrow_mut().as_mut() {
        Some(rng) => rng.random_bool(p),
        None => rand::rng().random_bool(p),
    })
}

/// Uniform sample from `range` using the worker RNG, or the thread RNG if unseeded.
pub fn worker_gen_range<T, R>(range: R) -> T
where
    T: SampleUniform,
    R: SampleRange<T>,
{
    WORKER_RNG.with(|rng| match rng.borrow_mut().as_mut() {
        Some(rng) => rng.random_range(range),
        None => rand::rng().random_range(range),
    })
}
