//! Seeded key streams for hit-rate benchmarks.

use lfukit::traits::CoreCache;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Zipf};

#[derive(Debug, Clone, Copy)]
pub enum Workload {
    /// Uniform random keys in `[0, universe)`.
    Uniform,
    /// `hot_prob` of accesses go to the first `hot_fraction` of the universe.
    Hotset { hot_fraction: f64, hot_prob: f64 },
    /// Sequential scan in `[0, universe)`.
    Scan,
    /// Zipf with exponent `s`; larger is more skewed.
    Zipfian { s: f64 },
}

#[derive(Debug, Clone, Copy)]
pub struct WorkloadConfig {
    pub universe: u64,
    pub workload: Workload,
    pub seed: u64,
}

impl WorkloadConfig {
    pub fn generator(self) -> WorkloadGenerator {
        WorkloadGenerator::new(self.universe, self.workload, self.seed)
    }
}

pub struct WorkloadGenerator {
    universe: u64,
    workload: Workload,
    rng: SmallRng,
    scan_pos: u64,
    zipf: Option<Zipf<f64>>,
}

impl WorkloadGenerator {
    pub fn new(universe: u64, workload: Workload, seed: u64) -> Self {
        let universe = universe.max(1);
        let zipf = match workload {
            Workload::Zipfian { s } => Zipf::new(universe as f64, s).ok(),
            _ => None,
        };
        Self {
            universe,
            workload,
            rng: SmallRng::seed_from_u64(seed),
            scan_pos: 0,
            zipf,
        }
    }

    pub fn next_key(&mut self) -> u64 {
        match self.workload {
            Workload::Uniform => self.rng.random_range(0..self.universe),
            Workload::Hotset {
                hot_fraction,
                hot_prob,
            } => {
                let hot_fraction = hot_fraction.clamp(0.0, 1.0);
                let hot_size = ((self.universe as f64) * hot_fraction).round() as u64;
                let hot_size = hot_size.clamp(1, self.universe);
                if self.rng.random::<f64>() < hot_prob || hot_size == self.universe {
                    self.rng.random_range(0..hot_size)
                } else {
                    self.rng.random_range(hot_size..self.universe)
                }
            },
            Workload::Scan => {
                let key = self.scan_pos;
                self.scan_pos = (self.scan_pos + 1) % self.universe;
                key
            },
            Workload::Zipfian { .. } => match &self.zipf {
                // Zipf samples fall in [1, universe].
                Some(zipf) => (zipf.sample(&mut self.rng) as u64).saturating_sub(1),
                None => self.rng.random_range(0..self.universe),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HitRate {
    pub hits: u64,
    pub misses: u64,
}

impl HitRate {
    pub fn hit_rate(self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Read-through loop: `get`, and `insert` on a miss.
pub fn run_hit_rate<C>(
    cache: &mut C,
    generator: &mut WorkloadGenerator,
    operations: usize,
) -> HitRate
where
    C: CoreCache<u64, u64>,
{
    let mut stats = HitRate::default();
    for _ in 0..operations {
        let key = generator.next_key();
        if cache.get(&key).is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
            let _ = cache.insert(key, key);
        }
    }
    stats
}
