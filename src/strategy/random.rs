use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{least_bad, probe, CpuStrategy, Probe};
use crate::car::Car;
use crate::track::Track;
use crate::vector::Acceleration;

/// Any move that does not crash, picked uniformly at random.
#[derive(Debug, Clone)]
pub struct RandomStrategy {
    rng: StdRng,
}

impl RandomStrategy {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl CpuStrategy for RandomStrategy {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_acceleration(&mut self, car: &Car, track: &Track, others: &[Car]) -> Acceleration {
        let probes = probe(car, track, others);
        let safe: Vec<&Probe> = probes.iter().filter(|p| p.is_safe()).collect();
        match safe.choose(&mut self.rng) {
            Some(p) => p.acceleration,
            None => least_bad(&probes),
        }
    }
}
