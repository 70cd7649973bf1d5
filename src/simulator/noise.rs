//! Random sources for the simulated physics.
//!
//! Every randomized quantity in the simulator is drawn through
//! [`NoiseSource`], so a seeded or scripted source makes trajectories
//! reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform source of values in `[0, 1)`.
pub trait NoiseSource: Send {
    fn unit(&mut self) -> f64;

    /// Uniform value in `[low, high)`.
    fn between(&mut self, low: f64, high: f64) -> f64 {
        low + self.unit() * (high - low)
    }

    /// Symmetric value in `[-span / 2, span / 2)`.
    fn centered(&mut self, span: f64) -> f64 {
        (self.unit() - 0.5) * span
    }
}

/// `StdRng`-backed source, either seeded or drawn from OS entropy.
#[derive(Debug, Clone)]
pub struct RngNoise {
    rng: StdRng,
}

impl RngNoise {
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_os_rng() }
    }
}

impl NoiseSource for RngNoise {
    fn unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Always returns the same value. Values are clamped into `[0, 1)`.
#[derive(Debug, Clone, Copy)]
pub struct FixedNoise(f64);

impl FixedNoise {
    pub fn new(value: f64) -> Self {
        Self(clamp_unit(value))
    }
}

impl NoiseSource for FixedNoise {
    fn unit(&mut self) -> f64 {
        self.0
    }
}

/// Cycles through a fixed list of values.
#[derive(Debug, Clone)]
pub struct ScriptedNoise {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedNoise {
    /// An empty script behaves like `FixedNoise::new(0.5)`.
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let mut values: Vec<f64> = values.into_iter().map(clamp_unit).collect();
        if values.is_empty() {
            values.push(0.5);
        }
        Self { values, cursor: 0 }
    }
}

impl NoiseSource for ScriptedNoise {
    fn unit(&mut self) -> f64 {
        let value = self.values[self.cursor];
        self.cursor = (self.cursor + 1) % self.values.len();
        value
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0 - f64::EPSILON)
}
