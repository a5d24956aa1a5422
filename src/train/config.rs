use clap::Parser;
use std::path::PathBuf;

/// All run options, parsed once at process start and treated as immutable
/// afterwards; every component borrows the one instance.
#[derive(Debug, Clone, Parser)]
#[command(name = "dnc-train", about = "Train a memory-augmented recurrent model on a synthetic task")]
pub struct Config {
    // ── Model ───────────────────────────────────────────────────────────
    /// Size of the controller hidden layer.
    #[arg(long, default_value_t = 64)]
    pub hidden_size: usize,

    /// Number of stacked controller layers.
    #[arg(long, default_value_t = 1)]
    pub depth: usize,

    /// Number of memory slots.
    #[arg(long, default_value_t = 16)]
    pub memory_size: usize,

    /// Width of each memory slot.
    #[arg(long, default_value_t = 16)]
    pub word_size: usize,

    /// Number of memory write heads.
    #[arg(long, default_value_t = 1)]
    pub num_write_heads: usize,

    /// Number of memory read heads.
    #[arg(long, default_value_t = 4)]
    pub num_read_heads: usize,

    /// Maximum absolute value of controller and cell outputs.
    #[arg(long, default_value_t = 20.0)]
    pub clip_value: f64,

    /// Which recurrent cell to use as the controller: lstm or rnn.
    #[arg(long, default_value = "lstm")]
    pub controller_type: String,

    /// Use the memory-augmented cell rather than the raw controller.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub use_dnc: bool,

    // ── Optimizer ───────────────────────────────────────────────────────
    /// Gradient clipping norm limit.
    #[arg(long, default_value_t = 50.0)]
    pub max_grad_norm: f64,

    /// Optimizer learning rate.
    #[arg(long, default_value_t = 1e-4)]
    pub learning_rate: f64,

    /// Epsilon used by the RMSProp optimizer.
    #[arg(long, default_value_t = 1e-10)]
    pub optimizer_epsilon: f64,

    // ── Task ────────────────────────────────────────────────────────────
    /// Task to train on: repeat_copy, variable_assignment or addition.
    #[arg(long, default_value = "repeat_copy")]
    pub task: String,

    /// Batch size for training.
    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,

    /// Dimensionality of each vector to copy.
    #[arg(long, default_value_t = 4)]
    pub num_bits: usize,

    /// Lower limit on number of vectors in the observation pattern to copy.
    #[arg(long, default_value_t = 1)]
    pub min_length: usize,

    /// Upper limit on number of vectors in the observation pattern to copy.
    #[arg(long, default_value_t = 2)]
    pub max_length: usize,

    /// Lower limit on number of copy repeats.
    #[arg(long, default_value_t = 1)]
    pub min_repeats: usize,

    /// Upper limit on number of copy repeats.
    #[arg(long, default_value_t = 2)]
    pub max_repeats: usize,

    // ── Training loop ───────────────────────────────────────────────────
    /// Number of iterations to train for.
    #[arg(long, default_value_t = 100_000)]
    pub num_training_iterations: u64,

    /// Iterations between loss reports.
    #[arg(long, default_value_t = 100)]
    pub report_interval: u64,

    /// Checkpointing directory.
    #[arg(long, default_value = "/tmp/dnc")]
    pub checkpoint_dir: PathBuf,

    /// Checkpointing step interval; zero or negative disables checkpointing.
    #[arg(long, default_value_t = -1)]
    pub checkpoint_interval: i64,

    /// Summary step interval; zero or negative disables summaries.
    #[arg(long, default_value_t = -1)]
    pub summary_interval: i64,

    /// Average loss threshold for early stopping.
    #[arg(long, default_value_t = 1.0)]
    pub stop_threshold: f64,
}

impl Config {
    /// Default configuration for unit tests, without touching the CLI.
    pub fn default_for_tests() -> Config {
        Config::parse_from(["dnc-train"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_flags() {
        let config = Config::default_for_tests();
        assert_eq!(config.hidden_size, 64);
        assert_eq!(config.num_read_heads, 4);
        assert!(config.use_dnc);
        assert_eq!(config.task, "repeat_copy");
        assert_eq!(config.report_interval, 100);
        assert_eq!(config.checkpoint_interval, -1);
        assert_eq!(config.stop_threshold, 1.0);
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::parse_from([
            "dnc-train",
            "--task",
            "addition",
            "--use-dnc",
            "false",
            "--report-interval",
            "10",
        ]);
        assert_eq!(config.task, "addition");
        assert!(!config.use_dnc);
        assert_eq!(config.report_interval, 10);
    }
}
