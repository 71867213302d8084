use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::error::SimError;
use crate::index::DistributionIndex;
use crate::models::{classify, Pattern, Step};
use crate::window::VolatilityWindow;

/// Source of sampled returns, injected into the engine so runs are
/// reproducible under a fixed seed and stubbable in tests.
pub trait ReturnSampler {
    /// Draw one return uniformly at random, with replacement, from a
    /// non-empty bin. The engine never passes an empty bin.
    fn draw(&mut self, bin: &[f64]) -> f64;
}

/// Production sampler backed by a `StdRng`.
pub struct RngSampler {
    rng: StdRng,
}

impl RngSampler {
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

impl ReturnSampler for RngSampler {
    fn draw(&mut self, bin: &[f64]) -> f64 {
        bin[self.rng.gen_range(0..bin.len())]
    }
}

/// How many paths to generate and how far forward to walk each one.
#[derive(Debug, Clone, Copy)]
pub struct RunParams {
    /// Number of independent paths.
    pub generations: u32,
    /// Business days from today to the expiry date. Zero produces an
    /// empty projection.
    pub days_ahead: u32,
}

/// Drives repeated forward path generation from a shared read-only
/// index and a per-generation copy of the starting state.
///
/// Generations share nothing mutable: each one clones the starting
/// pattern, price and volatility window, so they could run on parallel
/// workers with per-worker sampler sub-streams without any locking. The
/// reference loop here is sequential.
#[derive(Debug)]
pub struct SimulationEngine<'a> {
    index: &'a DistributionIndex,
    start_pattern: Pattern,
    start_price: f64,
    start_window: VolatilityWindow,
}

impl<'a> SimulationEngine<'a> {
    pub fn new(
        index: &'a DistributionIndex,
        start_pattern: Pattern,
        start_price: f64,
        start_window: VolatilityWindow,
    ) -> Result<Self, SimError> {
        if start_pattern.width() != index.pattern_width() {
            return Err(SimError::PatternWidthMismatch {
                found: start_pattern.width(),
                expected: index.pattern_width(),
            });
        }
        Ok(Self {
            index,
            start_pattern,
            start_price,
            start_window,
        })
    }

    /// Walk `generations` independent paths of `days_ahead` steps each.
    ///
    /// Per step, in order: resolve the return bin for the current
    /// pattern, sample one return, estimate σ on the window *before*
    /// pushing the sampled return, classify, advance the pattern, apply
    /// the return to the price, then push the return into the window.
    /// Steps come back generation-major, day-minor. Any failure discards
    /// the whole run; no partial path is ever returned.
    pub fn run<S: ReturnSampler>(
        &self,
        params: RunParams,
        sampler: &mut S,
    ) -> Result<Vec<Step>, SimError> {
        if params.generations == 0 {
            return Err(SimError::ZeroGenerations);
        }

        let total = params.generations as usize * params.days_ahead as usize;
        let mut steps = Vec::with_capacity(total);

        for generation in 1..=params.generations {
            let mut pattern = self.start_pattern.clone();
            let mut price = self.start_price;
            let mut window = self.start_window.clone();

            for day in 1..=params.days_ahead {
                let bin = self.index.resolve_bin(&pattern)?;
                let ret = sampler.draw(bin);

                let std_dev = window.std_dev();
                let symbol = classify(std_dev, ret);
                pattern = pattern.advance(symbol);
                price *= 1.0 + ret;
                window.push(ret);

                steps.push(Step {
                    generation,
                    day,
                    pattern: pattern.clone(),
                    ret,
                    price,
                });
            }
        }

        info!(
            generations = params.generations,
            days_ahead = params.days_ahead,
            steps = steps.len(),
            "projection complete"
        );
        Ok(steps)
    }
}
