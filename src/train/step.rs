use crate::error::HarnessError;

/// One party able to advance training, as seen by the loop controller.
///
/// The controller drives this and nothing else, so the loop can be
/// exercised with scripted implementations in tests.
pub trait TrainStep {
    /// Runs one optimization step (forward, backward, clipped update) and
    /// returns its training loss. Advances the global step by exactly one.
    fn step(&mut self) -> Result<f64, HarnessError>;

    /// Samples a fresh batch, runs the model forward only, and renders the
    /// task's human-readable comparison of target vs. prediction.
    fn report(&mut self) -> Result<String, HarnessError>;

    /// Completed optimization steps so far (restored value included).
    fn global_step(&self) -> u64;
}
