use crate::error::HarnessError;
use crate::math::{Graph, Matrix, TensorId};
use crate::model::controller::{ControllerType, LayerState, StackedController};
use crate::model::dnc::{DncCell, DncState};
use crate::model::Linear;
use crate::task::batch::{Batch, Observations};
use crate::train::config::Config;

/// Expands integer category indices into float one-hot rows: exactly one 1.0
/// per row, zeros elsewhere.
pub fn one_hot(indices: &[usize], width: usize) -> Matrix {
    let mut out = Matrix::zeros(indices.len(), width);
    for (row, &idx) in indices.iter().enumerate() {
        assert!(idx < width, "category index {} out of range {}", idx, width);
        out.set(row, idx, 1.0);
    }
    out
}

enum Core {
    Dnc(DncCell),
    Controller(StackedController),
}

enum CoreState {
    Dnc(DncState),
    Controller(Vec<LayerState>),
}

/// Wraps a recurrent cell into a fixed input-sequence → output-sequence
/// function of the task's required feature width.
///
/// Categorical observations are one-hot expanded over `target_size`
/// categories; dense observations pass through. The configured cell (memory
/// augmented or bare controller) is unrolled time-major from its zero
/// initial state, and a single shared per-timestep projection is appended
/// iff the cell's output width differs from `target_size`. Constructing the
/// model registers its trainable parameters on the graph; it has no other
/// side effects.
pub struct SequenceModel {
    core: Core,
    projection: Option<Linear>,
    target_size: usize,
}

impl SequenceModel {
    pub fn new(
        graph: &mut Graph,
        config: &Config,
        input_size: usize,
        target_size: usize,
    ) -> Result<SequenceModel, HarnessError> {
        let controller_type = ControllerType::parse(&config.controller_type)?;

        let (core, core_output) = if config.use_dnc {
            let cell = DncCell::new(
                graph,
                input_size,
                target_size,
                config.hidden_size,
                config.depth,
                controller_type,
                config.memory_size,
                config.word_size,
                config.num_read_heads,
                config.num_write_heads,
                config.clip_value,
            );
            let width = cell.output_size();
            (Core::Dnc(cell), width)
        } else {
            let ctrl = StackedController::new(
                graph,
                "controller",
                input_size,
                config.hidden_size,
                config.depth,
                controller_type,
            );
            let width = ctrl.output_size();
            (Core::Controller(ctrl), width)
        };

        let projection = if core_output != target_size {
            Some(Linear::new(graph, "final_projection", core_output, target_size))
        } else {
            None
        };

        Ok(SequenceModel { core, projection, target_size })
    }

    pub fn target_size(&self) -> usize {
        self.target_size
    }

    /// Runs the cell over the batch's full time dimension, one output node
    /// `[batch, target_size]` per input timestep.
    pub fn forward(&self, graph: &mut Graph, batch: &Batch) -> Vec<TensorId> {
        let inputs = self.encode(graph, &batch.observations);
        let batch_size = batch.batch_size();

        let mut state = match &self.core {
            Core::Dnc(cell) => CoreState::Dnc(cell.initial_state(graph, batch_size)),
            Core::Controller(ctrl) => CoreState::Controller(ctrl.initial_state(graph, batch_size)),
        };

        let mut outputs = Vec::with_capacity(inputs.len());
        for x in inputs {
            let (out, next) = match (&self.core, state) {
                (Core::Dnc(cell), CoreState::Dnc(prev)) => {
                    let (out, next) = cell.step(graph, x, &prev);
                    (out, CoreState::Dnc(next))
                }
                (Core::Controller(ctrl), CoreState::Controller(prev)) => {
                    let (out, next) = ctrl.step(graph, x, &prev);
                    (out, CoreState::Controller(next))
                }
                _ => unreachable!("state always matches the core variant"),
            };
            state = next;
            let out = match &self.projection {
                Some(projection) => projection.apply(graph, out),
                None => out,
            };
            outputs.push(out);
        }
        outputs
    }

    fn encode(&self, graph: &mut Graph, observations: &Observations) -> Vec<TensorId> {
        match observations {
            Observations::Dense(steps) => {
                steps.iter().map(|m| graph.constant(m.clone())).collect()
            }
            Observations::Categorical(steps) => steps
                .iter()
                .map(|indices| graph.constant(one_hot(indices, self.target_size)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(use_dnc: bool) -> Config {
        let mut config = Config::default_for_tests();
        config.use_dnc = use_dnc;
        config.hidden_size = 6;
        config.memory_size = 4;
        config.word_size = 3;
        config.num_read_heads = 1;
        config.num_write_heads = 1;
        config
    }

    #[test]
    fn one_hot_sets_exactly_one_per_row() {
        let m = one_hot(&[2, 0, 3], 5);
        assert_eq!(m.rows, 3);
        assert_eq!(m.cols, 5);
        for i in 0..3 {
            let row = m.row(i);
            assert_eq!(row.iter().filter(|&&v| v == 1.0).count(), 1);
            assert_eq!(row.iter().sum::<f64>(), 1.0);
        }
        assert_eq!(m.get(0, 2), 1.0);
        assert_eq!(m.get(1, 0), 1.0);
        assert_eq!(m.get(2, 3), 1.0);
    }

    #[test]
    fn categorical_sequences_become_time_by_batch_by_width() {
        // [T=3, B=2] indices with target_size 4 become three [2, 4] one-hot
        // matrices.
        let steps = vec![vec![0usize, 1], vec![2, 3], vec![1, 1]];
        let encoded: Vec<Matrix> = steps.iter().map(|s| one_hot(s, 4)).collect();
        assert_eq!(encoded.len(), 3);
        for m in &encoded {
            assert_eq!(m.rows, 2);
            assert_eq!(m.cols, 4);
            for i in 0..2 {
                assert_eq!(m.row(i).iter().sum::<f64>(), 1.0);
            }
        }
    }

    #[test]
    fn dnc_forward_produces_target_width_without_projection() {
        let mut graph = Graph::new();
        let config = test_config(true);
        let model = SequenceModel::new(&mut graph, &config, 3, 4).unwrap();
        graph.freeze_params();

        let batch = Batch {
            observations: Observations::Dense(vec![Matrix::random(2, 3); 4]),
            target: vec![Matrix::zeros(2, 4); 4],
            mask: Matrix::zeros(4, 2),
        };
        let outputs = model.forward(&mut graph, &batch);
        assert_eq!(outputs.len(), 4);
        for out in outputs {
            assert_eq!(graph.value(out).rows, 2);
            assert_eq!(graph.value(out).cols, 4);
        }
    }

    #[test]
    fn bare_controller_gets_a_shared_projection() {
        let mut graph = Graph::new();
        let config = test_config(false);
        // hidden_size 6 != target_size 4 forces the projection.
        let model = SequenceModel::new(&mut graph, &config, 4, 4).unwrap();
        graph.freeze_params();

        let batch = Batch {
            observations: Observations::Categorical(vec![vec![0, 1, 2], vec![3, 0, 1]]),
            target: vec![Matrix::zeros(3, 4); 2],
            mask: Matrix::zeros(2, 3),
        };
        let outputs = model.forward(&mut graph, &batch);
        assert_eq!(outputs.len(), 2);
        assert_eq!(graph.value(outputs[0]).cols, 4);
    }

    #[test]
    fn unknown_controller_type_is_a_configuration_error() {
        let mut graph = Graph::new();
        let mut config = test_config(true);
        config.controller_type = "transformer".to_string();
        assert!(SequenceModel::new(&mut graph, &config, 3, 4).is_err());
    }
}
