//! Temporal score smoothing
//!
//! Exponential moving average over raw classifier output, favoring stability
//! over responsiveness.

/// Weight given to the newest raw score
pub const SMOOTHING_ALPHA: f64 = 0.15;

/// Smoothed score every session starts from
pub const BASELINE_SCORE: f64 = 30.0;

/// Holds the last smoothed stress estimate across ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreSmoother {
    value: f64,
}

impl Default for ScoreSmoother {
    fn default() -> Self {
        Self {
            value: BASELINE_SCORE,
        }
    }
}

impl ScoreSmoother {
    /// `alpha * raw + (1 - alpha) * previous`
    pub fn blend(previous: f64, raw: f64) -> f64 {
        SMOOTHING_ALPHA * raw + (1.0 - SMOOTHING_ALPHA) * previous
    }

    /// Smoothed value that `raw` would produce, without committing it
    pub fn peek(&self, raw: f64) -> f64 {
        Self::blend(self.value, raw)
    }

    /// Fold a raw 0-100 score into the average and return the new value
    pub fn update(&mut self, raw: f64) -> f64 {
        self.value = self.peek(raw);
        self.value
    }

    /// Overwrite the running value with an already-computed smoothed score
    pub fn set(&mut self, value: f64) {
        self.value = value;
    }

    pub fn reset(&mut self) {
        self.value = BASELINE_SCORE;
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Integer score exposed to callers (truncated, never rounded)
pub fn to_score(smoothed: f64) -> u32 {
    smoothed.floor().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_update_from_baseline() {
        let mut smoother = ScoreSmoother::default();
        let value = smoother.update(0.0);
        assert!((value - 25.5).abs() < 1e-9);
        assert_eq!(to_score(value), 25);
    }

    #[test]
    fn test_truncates_instead_of_rounding() {
        assert_eq!(to_score(25.99), 25);
        assert_eq!(to_score(70.0), 70);
        assert_eq!(to_score(0.2), 0);
    }

    #[test]
    fn test_converges_monotonically() {
        for target in [0.0, 55.0, 100.0] {
            let mut smoother = ScoreSmoother::default();
            let mut gap = (smoother.value() - target).abs();
            for _ in 0..50 {
                smoother.update(target);
                let next_gap = (smoother.value() - target).abs();
                if gap > 0.0 {
                    assert!(next_gap < gap, "gap grew towards {target}");
                }
                gap = next_gap;
            }
            assert!(gap < 1.0);
        }
    }

    #[test]
    fn test_peek_does_not_commit() {
        let smoother = ScoreSmoother::default();
        let peeked = smoother.peek(100.0);
        assert!((peeked - 40.5).abs() < 1e-9);
        assert_eq!(smoother.value(), BASELINE_SCORE);
    }

    #[test]
    fn test_reset_restores_baseline() {
        let mut smoother = ScoreSmoother::default();
        smoother.update(100.0);
        smoother.reset();
        assert_eq!(smoother.value(), 30.0);
    }
}
