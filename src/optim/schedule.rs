/// Exponential learning-rate decay keyed off the global step, so a run
/// restored at the correct step reproduces the intended schedule exactly.
///
/// `at(step) = initial * decay_rate^(step / decay_steps)` (continuous, not
/// staircased).
#[derive(Debug, Clone)]
pub struct ExponentialDecay {
    initial: f64,
    decay_rate: f64,
    decay_steps: u64,
}

impl ExponentialDecay {
    pub fn new(initial: f64, decay_rate: f64, decay_steps: u64) -> ExponentialDecay {
        assert!(decay_steps > 0, "decay_steps must be positive");
        ExponentialDecay { initial, decay_rate, decay_steps }
    }

    pub fn at(&self, step: u64) -> f64 {
        self.initial * self.decay_rate.powf(step as f64 / self.decay_steps as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_zero_is_the_initial_rate() {
        let schedule = ExponentialDecay::new(1e-4, 0.9, 10_000);
        assert_eq!(schedule.at(0), 1e-4);
    }

    #[test]
    fn one_full_decay_period_multiplies_by_the_rate() {
        let schedule = ExponentialDecay::new(1e-4, 0.9, 10_000);
        assert!((schedule.at(10_000) - 0.9e-4).abs() < 1e-12);
        assert!((schedule.at(20_000) - 0.81e-4).abs() < 1e-12);
    }

    #[test]
    fn decay_is_monotonically_decreasing() {
        let schedule = ExponentialDecay::new(1e-3, 0.5, 100);
        assert!(schedule.at(50) < schedule.at(0));
        assert!(schedule.at(150) < schedule.at(50));
    }
}
