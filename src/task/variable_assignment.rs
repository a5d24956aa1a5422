use rand::seq::SliceRandom;
use rand::Rng;

use crate::math::{Graph, Matrix, TensorId};
use crate::task::batch::{Batch, Observations};
use crate::task::{argmax, masked_softmax_cost, Task};

const NUM_VARIABLES: usize = 4;
const NUM_VALUES: usize = 8;

/// Variable assignment: the model observes a shuffled sequence of
/// (variable, value) pairs, then a query marker and one of the variables,
/// and must answer with the value assigned to it.
///
/// Observations are integer tokens: values `0..NUM_VALUES`, variables
/// `NUM_VALUES..NUM_VALUES + NUM_VARIABLES`, and a final query token. The
/// vocabulary width equals `target_size`, so the adapter's one-hot expansion
/// applies. The target is the one-hot answer token on the last step only.
pub struct VariableAssignment {
    batch_size: usize,
    log_prob_in_bits: bool,
}

impl VariableAssignment {
    pub fn new(batch_size: usize, log_prob_in_bits: bool) -> VariableAssignment {
        VariableAssignment { batch_size, log_prob_in_bits }
    }

    fn variable_token(var: usize) -> usize {
        NUM_VALUES + var
    }

    fn query_token() -> usize {
        NUM_VALUES + NUM_VARIABLES
    }
}

impl Task for VariableAssignment {
    fn generate_batch(&mut self) -> Batch {
        let mut rng = rand::thread_rng();
        // var token, value token per assignment, then query token + variable.
        let steps = 2 * NUM_VARIABLES + 2;

        let mut observations = vec![vec![0usize; self.batch_size]; steps];
        let mut target = vec![Matrix::zeros(self.batch_size, self.target_size()); steps];
        let mut mask = Matrix::zeros(steps, self.batch_size);

        for b in 0..self.batch_size {
            let values: Vec<usize> =
                (0..NUM_VARIABLES).map(|_| rng.gen_range(0..NUM_VALUES)).collect();
            let mut order: Vec<usize> = (0..NUM_VARIABLES).collect();
            order.shuffle(&mut rng);

            for (slot, &var) in order.iter().enumerate() {
                observations[2 * slot][b] = Self::variable_token(var);
                observations[2 * slot + 1][b] = values[var];
            }

            let queried = rng.gen_range(0..NUM_VARIABLES);
            observations[steps - 2][b] = Self::query_token();
            observations[steps - 1][b] = Self::variable_token(queried);

            target[steps - 1].set(b, values[queried], 1.0);
            mask.set(steps - 1, b, 1.0);
        }

        Batch {
            observations: Observations::Categorical(observations),
            target,
            mask,
        }
    }

    fn target_size(&self) -> usize {
        NUM_VALUES + NUM_VARIABLES + 1
    }

    fn cost(&self, graph: &mut Graph, logits: &[TensorId], batch: &Batch) -> TensorId {
        masked_softmax_cost(graph, logits, batch, self.log_prob_in_bits)
    }

    fn to_human_readable(&self, batch: &Batch, output: &[Matrix]) -> String {
        let obs = match &batch.observations {
            Observations::Categorical(steps) => steps,
            Observations::Dense(_) => unreachable!("variable_assignment emits categorical tokens"),
        };
        let steps = batch.num_steps();
        let mut lines = Vec::with_capacity(batch.batch_size());
        for b in 0..batch.batch_size() {
            let mut line = String::new();
            for slot in 0..NUM_VARIABLES {
                let var = obs[2 * slot][b] - NUM_VALUES;
                let val = obs[2 * slot + 1][b];
                line.push_str(&format!("x{}={} ", var, val));
            }
            let queried = obs[steps - 1][b] - NUM_VALUES;
            let want = argmax(batch.target[steps - 1].row(b));
            let got = argmax(output[steps - 1].row(b));
            line.push_str(&format!("? x{} -> want {} got {}", queried, want, got));
            lines.push(line);
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_answer_step_is_masked() {
        let mut task = VariableAssignment::new(3, true);
        let batch = task.generate_batch();
        let steps = batch.num_steps();
        for t in 0..steps {
            for b in 0..3 {
                let expected = if t == steps - 1 { 1.0 } else { 0.0 };
                assert_eq!(batch.mask.get(t, b), expected);
            }
        }
    }

    #[test]
    fn target_is_one_hot_over_the_vocabulary() {
        let mut task = VariableAssignment::new(5, true);
        let batch = task.generate_batch();
        let last = batch.num_steps() - 1;
        for b in 0..5 {
            let row = batch.target[last].row(b);
            assert_eq!(row.iter().filter(|&&v| v == 1.0).count(), 1);
            assert_eq!(row.iter().filter(|&&v| v == 0.0).count(), row.len() - 1);
        }
    }

    #[test]
    fn cost_ignores_masked_positions() {
        let mut task = VariableAssignment::new(2, true);
        let batch = task.generate_batch();
        let steps = batch.num_steps();
        let width = task.target_size();

        let mut graph = Graph::new();
        graph.freeze_params();

        let logits: Vec<Matrix> = (0..steps).map(|_| Matrix::random(2, width)).collect();
        let ids: Vec<_> = logits.iter().map(|m| graph.constant(m.clone())).collect();
        let baseline = {
            let c = task.cost(&mut graph, &ids, &batch);
            graph.scalar(c)
        };
        graph.reset();

        // Only the final step is masked in; scrambling every other step's
        // logits must leave the cost untouched.
        let mut scrambled = logits.clone();
        for step in scrambled.iter_mut().take(steps - 1) {
            for v in step.data.iter_mut() {
                *v += 42.0;
            }
        }
        let ids: Vec<_> = scrambled.iter().map(|m| graph.constant(m.clone())).collect();
        let perturbed = {
            let c = task.cost(&mut graph, &ids, &batch);
            graph.scalar(c)
        };

        assert!((baseline - perturbed).abs() < 1e-9);
    }

    #[test]
    fn answer_matches_the_queried_assignment() {
        let mut task = VariableAssignment::new(8, true);
        let batch = task.generate_batch();
        let obs = match &batch.observations {
            Observations::Categorical(steps) => steps,
            _ => panic!("expected categorical observations"),
        };
        let steps = batch.num_steps();
        for b in 0..8 {
            let queried = obs[steps - 1][b];
            // Find the assignment pair whose variable token matches the query.
            let mut assigned = None;
            for slot in 0..NUM_VARIABLES {
                if obs[2 * slot][b] == queried {
                    assigned = Some(obs[2 * slot + 1][b]);
                }
            }
            let want = argmax(batch.target[steps - 1].row(b));
            assert_eq!(Some(want), assigned);
        }
    }
}
