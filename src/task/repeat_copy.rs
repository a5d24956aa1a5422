use rand::Rng;

use crate::math::{Graph, Matrix, TensorId};
use crate::task::batch::{Batch, Observations};
use crate::task::{bit_strip, masked_sigmoid_cost, Task};

/// Copy-with-repeats: the model observes a random bit pattern framed by a
/// start marker and a repeat-count channel, and must reproduce the pattern
/// the requested number of times, finishing with an end marker.
///
/// Observation layout per timestep (width `num_bits + 2`):
///   channels `0..num_bits`  the pattern bits,
///   channel  `num_bits`     start marker,
///   channel  `num_bits + 1` repeat count, normalized by `max_repeats`.
///
/// Target layout per timestep (width `num_bits + 1`):
///   channels `0..num_bits`  the repeated pattern,
///   channel  `num_bits`     end marker on the final target step.
///
/// Pattern length and repeat count are sampled per batch element; shorter
/// samples are zero-padded to the longest one and masked out.
pub struct RepeatCopy {
    num_bits: usize,
    batch_size: usize,
    min_length: usize,
    max_length: usize,
    min_repeats: usize,
    max_repeats: usize,
    log_prob_in_bits: bool,
}

impl RepeatCopy {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        num_bits: usize,
        batch_size: usize,
        min_length: usize,
        max_length: usize,
        min_repeats: usize,
        max_repeats: usize,
        log_prob_in_bits: bool,
    ) -> RepeatCopy {
        assert!(min_length >= 1 && min_length <= max_length);
        assert!(min_repeats >= 1 && min_repeats <= max_repeats);
        RepeatCopy {
            num_bits,
            batch_size,
            min_length,
            max_length,
            min_repeats,
            max_repeats,
            log_prob_in_bits,
        }
    }

    fn obs_width(&self) -> usize {
        self.num_bits + 2
    }
}

impl Task for RepeatCopy {
    fn generate_batch(&mut self) -> Batch {
        let mut rng = rand::thread_rng();

        let lengths: Vec<usize> = (0..self.batch_size)
            .map(|_| rng.gen_range(self.min_length..=self.max_length))
            .collect();
        let repeats: Vec<usize> = (0..self.batch_size)
            .map(|_| rng.gen_range(self.min_repeats..=self.max_repeats))
            .collect();
        let patterns: Vec<Vec<Vec<f64>>> = lengths
            .iter()
            .map(|&len| {
                (0..len)
                    .map(|_| (0..self.num_bits).map(|_| f64::from(rng.gen_range(0..2u8))).collect())
                    .collect()
            })
            .collect();

        // Per-sample schedule: start marker, pattern, repeat-count marker,
        // then the repeated pattern and a final end marker.
        let total_steps = lengths
            .iter()
            .zip(repeats.iter())
            .map(|(&len, &reps)| len * (reps + 1) + 3)
            .max()
            .unwrap_or(0);

        let mut observations = vec![Matrix::zeros(self.batch_size, self.obs_width()); total_steps];
        let mut target = vec![Matrix::zeros(self.batch_size, self.target_size()); total_steps];
        let mut mask = Matrix::zeros(total_steps, self.batch_size);

        for b in 0..self.batch_size {
            let len = lengths[b];
            let reps = repeats[b];

            observations[0].set(b, self.num_bits, 1.0);
            for (i, bits) in patterns[b].iter().enumerate() {
                for (c, &bit) in bits.iter().enumerate() {
                    observations[1 + i].set(b, c, bit);
                }
            }
            observations[1 + len].set(b, self.num_bits + 1, reps as f64 / self.max_repeats as f64);

            let answer_start = len + 2;
            for r in 0..reps {
                for (i, bits) in patterns[b].iter().enumerate() {
                    for (c, &bit) in bits.iter().enumerate() {
                        target[answer_start + r * len + i].set(b, c, bit);
                    }
                }
            }
            let end = answer_start + reps * len;
            target[end].set(b, self.num_bits, 1.0);

            for t in answer_start..=end {
                mask.set(t, b, 1.0);
            }
        }

        Batch {
            observations: Observations::Dense(observations),
            target,
            mask,
        }
    }

    fn target_size(&self) -> usize {
        self.num_bits + 1
    }

    fn cost(&self, graph: &mut Graph, logits: &[TensorId], batch: &Batch) -> TensorId {
        masked_sigmoid_cost(graph, logits, batch, self.log_prob_in_bits)
    }

    fn to_human_readable(&self, batch: &Batch, output: &[Matrix]) -> String {
        let obs = match &batch.observations {
            Observations::Dense(steps) => steps,
            Observations::Categorical(_) => unreachable!("repeat_copy emits dense observations"),
        };
        let mut sections = Vec::with_capacity(batch.batch_size());
        for b in 0..batch.batch_size() {
            sections.push(format!(
                "{}\n{}\n{}",
                bit_strip(obs, None, b, "Observations"),
                bit_strip(&batch.target, Some(&batch.mask), b, "Targets"),
                bit_strip(output, Some(&batch.mask), b, "Model output"),
            ));
        }
        sections.join("\n\n")
    }
}
