pub mod batch;
pub mod repeat_copy;
pub mod variable_assignment;
pub mod addition;

pub use batch::{Batch, Observations};
pub use repeat_copy::RepeatCopy;
pub use variable_assignment::VariableAssignment;
pub use addition::Addition;

use std::f64::consts::LN_2;

use crate::error::HarnessError;
use crate::math::{Graph, Matrix, TensorId};
use crate::train::config::Config;

/// A pluggable synthetic data source.
///
/// The training loop is written entirely against this trait: it never
/// branches on which task it is running. New tasks plug in by implementing
/// these four operations and registering a constructor in [`build_task`].
pub trait Task {
    /// Samples a fresh random batch. Feature widths are fixed across calls;
    /// the time dimension may vary within the task's configured bounds.
    fn generate_batch(&mut self) -> Batch;

    /// Feature width of the task's output; sizes the model's final
    /// projection.
    fn target_size(&self) -> usize;

    /// Masked, differentiable scalar loss over the per-timestep logit nodes.
    /// Masked-out positions must not affect the value.
    fn cost(&self, graph: &mut Graph, logits: &[TensorId], batch: &Batch) -> TensorId;

    /// Display comparison of ground truth against the (rounded, masked,
    /// sigmoid-activated) model output. Logging only, never training signal.
    fn to_human_readable(&self, batch: &Batch, output: &[Matrix]) -> String;
}

/// Maps a task name to a constructed task. The one place task names are
/// interpreted; an unrecognized name fails here, before any session or
/// resource is acquired.
pub fn build_task(config: &Config) -> Result<Box<dyn Task>, HarnessError> {
    match config.task.as_str() {
        "repeat_copy" => Ok(Box::new(RepeatCopy::new(
            config.num_bits,
            config.batch_size,
            config.min_length,
            config.max_length,
            config.min_repeats,
            config.max_repeats,
            true,
        ))),
        "variable_assignment" => Ok(Box::new(VariableAssignment::new(config.batch_size, true))),
        "addition" => Ok(Box::new(Addition::new(config.batch_size, true))),
        other => Err(HarnessError::UnknownTask(other.to_string())),
    }
}

/// Masked sigmoid cross-entropy: per-bit CE summed over features and time,
/// averaged over the batch. With `in_bits` the value is divided by ln 2.
pub(crate) fn masked_sigmoid_cost(
    graph: &mut Graph,
    logits: &[TensorId],
    batch: &Batch,
    in_bits: bool,
) -> TensorId {
    let width = batch.target[0].cols;
    let ones = graph.constant(Matrix::from_vec(width, 1, vec![1.0; width]));

    let mut per_sample: Option<TensorId> = None;
    for (t, &step_logits) in logits.iter().enumerate() {
        let ce = graph.sigmoid_cross_entropy(step_logits, batch.target[t].clone());
        let summed = graph.matmul(ce, ones); // [batch, 1]
        let mask = graph.constant(batch.mask_column(t));
        let masked = graph.mul(summed, mask);
        per_sample = Some(match per_sample {
            Some(acc) => graph.add(acc, masked),
            None => masked,
        });
    }

    finalize_cost(graph, per_sample.expect("cost over an empty batch"), batch, in_bits)
}

/// Masked softmax cross-entropy: per-timestep categorical CE, averaged over
/// the batch. With `in_bits` the value is divided by ln 2.
pub(crate) fn masked_softmax_cost(
    graph: &mut Graph,
    logits: &[TensorId],
    batch: &Batch,
    in_bits: bool,
) -> TensorId {
    let mut per_sample: Option<TensorId> = None;
    for (t, &step_logits) in logits.iter().enumerate() {
        let ce = graph.softmax_cross_entropy_rows(step_logits, batch.target[t].clone()); // [batch, 1]
        let mask = graph.constant(batch.mask_column(t));
        let masked = graph.mul(ce, mask);
        per_sample = Some(match per_sample {
            Some(acc) => graph.add(acc, masked),
            None => masked,
        });
    }

    finalize_cost(graph, per_sample.expect("cost over an empty batch"), batch, in_bits)
}

fn finalize_cost(graph: &mut Graph, per_sample: TensorId, batch: &Batch, in_bits: bool) -> TensorId {
    let total = graph.sum_all(per_sample);
    let mut scale = 1.0 / batch.batch_size() as f64;
    if in_bits {
        scale /= LN_2;
    }
    graph.scale(total, scale)
}

/// Renders one sample of a time-major bit sequence as one line per channel,
/// '+' for an active bit and '-' otherwise. When a mask is given, timesteps
/// with mask 0 render as spaces.
pub(crate) fn bit_strip(
    steps: &[Matrix],
    mask: Option<&Matrix>,
    sample: usize,
    label: &str,
) -> String {
    let width = steps[0].cols;
    let mut lines = Vec::with_capacity(width + 1);
    lines.push(format!("{}:", label));
    for channel in 0..width {
        let mut line = String::with_capacity(steps.len() + 2);
        line.push_str("  ");
        for (t, step) in steps.iter().enumerate() {
            if mask.map_or(false, |m| m.get(t, sample) == 0.0) {
                line.push(' ');
            } else if step.get(sample, channel) >= 0.5 {
                line.push('+');
            } else {
                line.push('-');
            }
        }
        lines.push(line);
    }
    lines.join("\n")
}

/// Index of the maximum element in a slice.
pub(crate) fn argmax(row: &[f64]) -> usize {
    row.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
