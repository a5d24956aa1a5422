use log::info;

use crate::error::HarnessError;
use crate::train::config::Config;
use crate::train::hooks::HookSchedule;
use crate::train::step::TrainStep;

/// Terminal state of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The iteration count was exhausted.
    Completed,
    /// A reporting window's average loss reached the stop threshold.
    StoppedEarly,
}

/// The loop-facing slice of the configuration.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub num_training_iterations: u64,
    pub report_interval: u64,
    pub stop_threshold: f64,
}

impl LoopConfig {
    pub fn from_config(config: &Config) -> LoopConfig {
        LoopConfig {
            num_training_iterations: config.num_training_iterations,
            report_interval: config.report_interval,
            stop_threshold: config.stop_threshold,
        }
    }
}

/// Drives training from the restored global step to the configured
/// iteration count.
///
/// Per iteration: one optimization step, window-loss accumulation, then the
/// hook schedule (its cadence is independent of reporting). On every
/// `report_interval`-th iteration the window average is logged together
/// with the task's rendering of a fresh forward pass, and training stops
/// early the moment the average reaches `stop_threshold`. Iterations off
/// the report boundary never evaluate or log. If the restored step is
/// already at or past the iteration count the body runs zero times.
pub fn run_loop<S: TrainStep>(
    runner: &mut S,
    hooks: &mut HookSchedule<S>,
    config: &LoopConfig,
) -> Result<Outcome, HarnessError> {
    assert!(config.report_interval > 0, "report_interval must be positive");

    let start_iteration = runner.global_step();
    let mut total_loss = 0.0;

    for iteration in start_iteration..config.num_training_iterations {
        let loss = runner.step()?;
        total_loss += loss;

        let completed = runner.global_step();
        hooks.fire_due(completed, runner)?;

        if (iteration + 1) % config.report_interval == 0 {
            let average = total_loss / config.report_interval as f64;
            let rendering = runner.report()?;
            info!("{}: Avg training loss {:.6}.\n{}", iteration, average, rendering);
            if average <= config.stop_threshold {
                info!("Training loss below {}, stopping early.", config.stop_threshold);
                return Ok(Outcome::StoppedEarly);
            }
            total_loss = 0.0;
        }
    }

    Ok(Outcome::Completed)
}
