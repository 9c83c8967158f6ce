/// Fixed-capacity history of frame times. Overwrites the oldest sample.
pub struct FrameHistory {
    samples: Vec<f64>,
    head: usize,
    len: usize,
}

/// Summary of the samples currently held.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSummary {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

impl FrameHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity.max(1)],
            head: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, seconds: f64) {
        let cap = self.samples.len();
        self.samples[self.head] = seconds;
        self.head = (self.head + 1) % cap;
        self.len = (self.len + 1).min(cap);
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let cap = self.samples.len();
        let start = (self.head + cap - self.len) % cap;
        (0..self.len).map(move |i| self.samples[(start + i) % cap])
    }

    pub fn summary(&self) -> Option<FrameSummary> {
        if self.is_empty() {
            return None;
        }
        let mut sum = 0.0;
        let mut min = f64::MAX;
        let mut max = 0.0f64;
        for t in self.iter() {
            sum += t;
            min = min.min(t);
            max = max.max(t);
        }
        Some(FrameSummary {
            avg: sum / self.len as f64,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_the_newest_samples() {
        let mut h = FrameHistory::new(3);
        for t in [1.0, 2.0, 3.0, 4.0] {
            h.push(t);
        }
        assert_eq!(h.iter().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
        assert_eq!(
            h.summary(),
            Some(FrameSummary {
                avg: 3.0,
                min: 2.0,
                max: 4.0
            })
        );
    }

    #[test]
    fn empty_history_has_no_summary() {
        assert_eq!(FrameHistory::new(4).summary(), None);
    }
}
