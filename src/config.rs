use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::error::GardenError;

/// Everything needed to lay out a garden and its flock.
#[derive(Debug, Clone)]
pub struct GardenConfig {
    /// Flowers per side of the square planting grid.
    pub grid_size: usize,
    /// Distance between neighbouring flowers (metres).
    pub spacing: f32,
    pub butterfly_count: usize,
    /// Flowers closer than this to the gaze focus are told to open.
    pub attention_radius: f32,
    /// Seconds for a flower to go from bud to fully open.
    pub opening_duration: f32,
    /// Seconds for a flower to close again.
    pub closing_duration: f32,
    /// Butterfly cruising speed range (m/s).
    pub butterfly_speed: (f32, f32),
    /// Random designs draw from these ranges.
    pub flowers: FlowerRanges,
    /// Fixed seed for reproducible gardens; `None` seeds from entropy.
    pub seed: Option<u64>,
}

/// Ranges the random flower designs are drawn from.
#[derive(Debug, Clone)]
pub struct FlowerRanges {
    pub petal_count: (u32, u32),
    pub fold_angle: f32,
    pub open_angle: f32,
    pub flower_radius: (f32, f32),
    pub flower_height: f32,
    pub stem_radius: f32,
    pub stem_height: (f32, f32),
}

impl Default for FlowerRanges {
    fn default() -> Self {
        Self {
            petal_count: (3, 8),
            fold_angle: FRAC_PI_4,
            open_angle: FRAC_PI_2,
            flower_radius: (0.05, 0.15),
            flower_height: 0.3,
            stem_radius: 0.01,
            stem_height: (0.2, 0.7),
        }
    }
}

impl Default for GardenConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            spacing: 1.0,
            butterfly_count: 12,
            attention_radius: 3.0,
            opening_duration: 1.5,
            closing_duration: 3.0,
            butterfly_speed: (0.6, 1.2),
            flowers: FlowerRanges::default(),
            seed: None,
        }
    }
}

impl GardenConfig {
    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), GardenError> {
        if self.grid_size == 0 {
            return Err(GardenError::InvalidConfig("grid_size must be at least 1"));
        }
        if !(self.spacing > 0.0 && self.spacing.is_finite()) {
            return Err(GardenError::InvalidConfig("spacing must be positive"));
        }
        if !(self.attention_radius >= 0.0 && self.attention_radius.is_finite()) {
            return Err(GardenError::InvalidConfig("attention_radius must be non-negative"));
        }
        if !(self.opening_duration > 0.0 && self.closing_duration > 0.0) {
            return Err(GardenError::InvalidConfig("bloom durations must be positive"));
        }
        let (lo, hi) = self.butterfly_speed;
        if !(lo > 0.0 && hi >= lo && hi.is_finite()) {
            return Err(GardenError::InvalidConfig("butterfly_speed must be a positive range"));
        }

        let f = &self.flowers;
        if f.petal_count.0 < 3 || f.petal_count.1 < f.petal_count.0 {
            return Err(GardenError::InvalidConfig("petal_count range must start at 3 or more"));
        }
        if !(f.flower_radius.0 > 0.0 && f.flower_radius.1 >= f.flower_radius.0) {
            return Err(GardenError::InvalidConfig("flower_radius must be a positive range"));
        }
        if !(f.stem_height.0 >= 0.0 && f.stem_height.1 >= f.stem_height.0) {
            return Err(GardenError::InvalidConfig("stem_height must be a non-negative range"));
        }
        Ok(())
    }

    /// Half the width of the planted square.
    pub fn half_extent(&self) -> f32 {
        self.grid_size as f32 * self.spacing / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(GardenConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let mut c = GardenConfig::default();
        c.grid_size = 0;
        assert!(matches!(c.validate(), Err(GardenError::InvalidConfig(_))));

        let mut c = GardenConfig::default();
        c.closing_duration = 0.0;
        assert!(c.validate().is_err());

        let mut c = GardenConfig::default();
        c.butterfly_speed = (1.0, 0.5);
        assert!(c.validate().is_err());

        let mut c = GardenConfig::default();
        c.flowers.petal_count = (2, 6);
        assert!(c.validate().is_err());
    }
}
