use crate::math::{Real, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Derives a per-thread PRNG from the render's global seed and a work-item
/// index (row, column, or pixel index — callers pick whichever is stable
/// under their own decomposition). Never share one `SmallRng` across
/// threads: doing so would make output depend on scheduling order.
pub fn thread_rng_for(seed: u64, index: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed ^ index)
}

/// Uniform real in `[0, 1)`.
#[inline]
pub fn uniform01(rng: &mut SmallRng) -> Real {
    rng.gen::<Real>()
}

/// Uniform real in `[0, m)`.
#[inline]
pub fn uniform(rng: &mut SmallRng, m: Real) -> Real {
    rng.gen::<Real>() * m
}

/// Point uniformly distributed inside the unit disk (z = 0), used to jitter
/// the lens aperture in the thin-lens camera.
pub fn random_in_unit_disk(rng: &mut SmallRng) -> Vec3 {
    loop {
        let v = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 0.0);
        if v.length_squared() < 1.0 {
            return v;
        }
    }
}

/// Standard-normal sample via the Box–Muller transform, used for Gaussian
/// pixel jitter in the stochastic pinhole camera.
pub fn gaussian(rng: &mut SmallRng, std_dev: Real) -> Real {
    let u1: Real = uniform01(rng).max(1e-12);
    let u2: Real = uniform01(rng);
    let r = (-2.0 * u1.ln()).sqrt();
    r * (std::f64::consts::TAU * u2).cos() * std_dev
}
