use instant::Instant;

/// Which phase of a tick or frame is being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SystemPhase {
    Snapshot = 0,
    Attention = 1,
    Bloom = 2,
    Pose = 3,
    Goals = 4,
    Flight = 5,
    BuildMesh = 6,
    GpuUpload = 7,
    RenderSubmit = 8,
}

/// Number of timed phases.
pub const PHASE_COUNT: usize = 9;

impl SystemPhase {
    pub const ALL: [SystemPhase; PHASE_COUNT] = [
        Self::Snapshot,
        Self::Attention,
        Self::Bloom,
        Self::Pose,
        Self::Goals,
        Self::Flight,
        Self::BuildMesh,
        Self::GpuUpload,
        Self::RenderSubmit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Snapshot => "Snapshot",
            Self::Attention => "Attention",
            Self::Bloom => "Bloom",
            Self::Pose => "Pose",
            Self::Goals => "Goals",
            Self::Flight => "Flight",
            Self::BuildMesh => "Build Mesh",
            Self::GpuUpload => "GPU Upload",
            Self::RenderSubmit => "Render",
        }
    }
}

/// Per-phase timing, smoothed with an exponential moving average.
pub struct SystemTimers {
    /// Smoothed duration in microseconds per phase.
    pub durations_us: [f64; PHASE_COUNT],
    start: Instant,
}

const EMA_ALPHA: f64 = 0.1;

impl SystemTimers {
    pub fn new() -> Self {
        Self {
            durations_us: [0.0; PHASE_COUNT],
            start: Instant::now(),
        }
    }

    /// Call before a phase runs.
    pub fn begin(&mut self) {
        self.start = Instant::now();
    }

    /// Call after a phase finishes.
    pub fn end(&mut self, phase: SystemPhase) {
        let elapsed_us = self.start.elapsed().as_secs_f64() * 1_000_000.0;
        self.record(phase, elapsed_us);
    }

    fn record(&mut self, phase: SystemPhase, elapsed_us: f64) {
        let slot = &mut self.durations_us[phase as usize];
        *slot = *slot * (1.0 - EMA_ALPHA) + elapsed_us * EMA_ALPHA;
    }

    /// Sum of all phase durations (microseconds).
    pub fn total_us(&self) -> f64 {
        self.durations_us.iter().sum()
    }
}

impl Default for SystemTimers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moving_average_converges() {
        let mut t = SystemTimers::new();
        for _ in 0..200 {
            t.record(SystemPhase::Flight, 50.0);
        }
        assert!((t.durations_us[SystemPhase::Flight as usize] - 50.0).abs() < 1e-3);
        assert!((t.total_us() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn phases_are_indexed_in_order() {
        for (i, phase) in SystemPhase::ALL.iter().enumerate() {
            assert_eq!(*phase as usize, i);
        }
    }
}
