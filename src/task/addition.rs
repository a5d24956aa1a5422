use rand::Rng;

use crate::math::{Graph, Matrix, TensorId};
use crate::task::batch::{Batch, Observations};
use crate::task::{argmax, masked_softmax_cost, Task};

const NUM_DIGITS: usize = 2;
const PLUS: usize = 10;
const EQUALS: usize = 11;
const BLANK: usize = 12;
const VOCAB: usize = 13;

/// Addition: the model observes two zero-padded decimal numbers as digit
/// tokens, separated by a plus token and terminated by an equals token, and
/// must emit the digits of their sum during the trailing blank steps.
///
/// Observations are integer tokens over a 13-symbol vocabulary (digits 0-9,
/// '+', '=', blank); the vocabulary width equals `target_size`, so the
/// adapter one-hot expands them. The mask covers exactly the answer steps.
pub struct Addition {
    batch_size: usize,
    log_prob_in_bits: bool,
}

impl Addition {
    pub fn new(batch_size: usize, log_prob_in_bits: bool) -> Addition {
        Addition { batch_size, log_prob_in_bits }
    }

    /// Most-significant-first digits of `n`, zero-padded to `width`.
    fn digits(mut n: usize, width: usize) -> Vec<usize> {
        let mut out = vec![0; width];
        for slot in (0..width).rev() {
            out[slot] = n % 10;
            n /= 10;
        }
        out
    }
}

impl Task for Addition {
    fn generate_batch(&mut self) -> Batch {
        let mut rng = rand::thread_rng();
        let answer_len = NUM_DIGITS + 1;
        // a digits, '+', b digits, '=', answer blanks.
        let steps = 2 * NUM_DIGITS + 2 + answer_len;
        let limit = 10usize.pow(NUM_DIGITS as u32);

        let mut observations = vec![vec![BLANK; self.batch_size]; steps];
        let mut target = vec![Matrix::zeros(self.batch_size, VOCAB); steps];
        let mut mask = Matrix::zeros(steps, self.batch_size);

        for b in 0..self.batch_size {
            let a = rng.gen_range(0..limit);
            let c = rng.gen_range(0..limit);

            let mut t = 0;
            for d in Addition::digits(a, NUM_DIGITS) {
                observations[t][b] = d;
                t += 1;
            }
            observations[t][b] = PLUS;
            t += 1;
            for d in Addition::digits(c, NUM_DIGITS) {
                observations[t][b] = d;
                t += 1;
            }
            observations[t][b] = EQUALS;
            t += 1;

            for (i, d) in Addition::digits(a + c, answer_len).into_iter().enumerate() {
                target[t + i].set(b, d, 1.0);
                mask.set(t + i, b, 1.0);
            }
        }

        Batch {
            observations: Observations::Categorical(observations),
            target,
            mask,
        }
    }

    fn target_size(&self) -> usize {
        VOCAB
    }

    fn cost(&self, graph: &mut Graph, logits: &[TensorId], batch: &Batch) -> TensorId {
        masked_softmax_cost(graph, logits, batch, self.log_prob_in_bits)
    }

    fn to_human_readable(&self, batch: &Batch, output: &[Matrix]) -> String {
        let obs = match &batch.observations {
            Observations::Categorical(steps) => steps,
            Observations::Dense(_) => unreachable!("addition emits categorical tokens"),
        };
        let steps = batch.num_steps();
        let answer_start = steps - (NUM_DIGITS + 1);
        let mut lines = Vec::with_capacity(batch.batch_size());
        for b in 0..batch.batch_size() {
            let mut line = String::new();
            for t in 0..answer_start {
                match obs[t][b] {
                    PLUS => line.push('+'),
                    EQUALS => line.push('='),
                    BLANK => {}
                    d => line.push_str(&d.to_string()),
                }
            }
            let want: String = (answer_start..steps)
                .map(|t| argmax(batch.target[t].row(b)).to_string())
                .collect();
            let got: String = (answer_start..steps)
                .map(|t| argmax(output[t].row(b)).to_string())
                .collect();
            line.push_str(&format!("{} got {}", want, got));
            lines.push(line);
        }
        lines.join("\n")
    }
}
