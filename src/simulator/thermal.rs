// src/simulator/thermal.rs - Heater trajectories for extruder and bed
use super::noise::NoiseSource;

/// Passive cooling never goes below this (°C).
pub const AMBIENT_TEMP: f64 = 20.0;

/// Tuning constants for one heater.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaterProfile {
    /// Heating rate range in °C per tick, before the approach factor.
    pub heat_rate: (f64, f64),
    /// Gap (°C) below which the heating rate scales down linearly.
    pub approach_span: f64,
    /// Full width of the noise applied once at target.
    pub jitter_span: f64,
    /// Maximum drift from target before the reading is resettled.
    pub tolerance: f64,
    /// Full width of the noise applied on resettle.
    pub resettle_span: f64,
    /// Passive cooling range in °C per tick.
    pub cool_rate: (f64, f64),
}

pub const EXTRUDER_PROFILE: HeaterProfile = HeaterProfile {
    heat_rate: (2.0, 5.0),
    approach_span: 50.0,
    jitter_span: 0.5,
    tolerance: 2.0,
    resettle_span: 1.5,
    cool_rate: (0.5, 1.0),
};

pub const BED_PROFILE: HeaterProfile = HeaterProfile {
    heat_rate: (1.0, 3.0),
    approach_span: 30.0,
    jitter_span: 0.3,
    tolerance: 1.5,
    resettle_span: 1.0,
    cool_rate: (0.2, 0.5),
};

#[derive(Debug, Clone, PartialEq)]
pub struct Heater {
    pub current: f64,
    /// `0.0` means no heating goal.
    pub target: f64,
    profile: HeaterProfile,
}

impl Heater {
    pub fn new(profile: HeaterProfile) -> Self {
        Self {
            current: AMBIENT_TEMP,
            target: 0.0,
            profile,
        }
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target.max(0.0);
    }

    pub fn clear_target(&mut self) {
        self.target = 0.0;
    }

    /// Advance one tick.
    pub fn step(&mut self, noise: &mut dyn NoiseSource) {
        let p = self.profile;
        if self.target > 0.0 {
            if self.current < self.target {
                let gap = self.target - self.current;
                let rate = noise.between(p.heat_rate.0, p.heat_rate.1);
                let next = self.current + rate * (gap / p.approach_span).min(1.0);
                self.current = next.min(self.target);
            } else {
                self.current += noise.centered(p.jitter_span);
                if (self.current - self.target).abs() > p.tolerance {
                    self.current = self.target + noise.centered(p.resettle_span);
                }
            }
        } else if self.current > AMBIENT_TEMP {
            self.current -= noise.between(p.cool_rate.0, p.cool_rate.1);
        }
        self.current = self.current.max(AMBIENT_TEMP);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::noise::{FixedNoise, RngNoise};

    #[test]
    fn test_idle_heater_stays_at_ambient() {
        let mut heater = Heater::new(EXTRUDER_PROFILE);
        let mut noise = RngNoise::seeded(3);
        for _ in 0..10 {
            heater.step(&mut noise);
        }
        assert_eq!(heater.current, AMBIENT_TEMP);
    }

    #[test]
    fn test_heating_rate_scales_with_gap() {
        let mut heater = Heater::new(EXTRUDER_PROFILE);
        heater.set_target(210.0);
        let mut noise = FixedNoise::new(0.0);
        // Gap 190 > 50, so the full base rate of 2.0 applies.
        heater.step(&mut noise);
        assert!((heater.current - 22.0).abs() < 1e-9);

        heater.current = 200.0;
        // Gap 10 of 50 scales the rate to 0.4.
        heater.step(&mut noise);
        assert!((heater.current - 200.4).abs() < 1e-9);
    }

    #[test]
    fn test_heating_never_overshoots() {
        let mut heater = Heater::new(BED_PROFILE);
        heater.set_target(60.0);
        heater.current = 59.99;
        heater.step(&mut FixedNoise::new(0.99));
        assert!(heater.current <= 60.0);
    }

    #[test]
    fn test_resettle_when_drift_exceeds_tolerance() {
        let mut heater = Heater::new(EXTRUDER_PROFILE);
        heater.set_target(200.0);
        heater.current = 205.0;
        heater.step(&mut FixedNoise::new(0.5));
        assert_eq!(heater.current, 200.0);
    }

    #[test]
    fn test_cooldown_floors_at_ambient() {
        let mut heater = Heater::new(BED_PROFILE);
        heater.current = 20.3;
        heater.step(&mut FixedNoise::new(0.99));
        assert_eq!(heater.current, AMBIENT_TEMP);
    }

    #[test]
    fn test_cooldown_rates() {
        let mut extruder = Heater::new(EXTRUDER_PROFILE);
        extruder.current = 100.0;
        extruder.step(&mut FixedNoise::new(0.0));
        assert!((extruder.current - 99.5).abs() < 1e-9);

        let mut bed = Heater::new(BED_PROFILE);
        bed.current = 50.0;
        bed.step(&mut FixedNoise::new(0.0));
        assert!((bed.current - 49.8).abs() < 1e-9);
    }
}
