use crate::math::{Graph, TensorId};
use crate::model::controller::{ControllerType, LayerState, StackedController};
use crate::model::memory::{MemoryAccess, MemoryState};
use crate::model::Linear;

/// Memory-augmented recurrent cell: a stacked controller wired to an
/// external memory. The controller sees the observation concatenated with
/// the previous step's read words; the cell output is a shared linear map of
/// (controller output ++ reads), clamped to ±`clip_value`, as is the
/// controller output itself, to keep the recurrent unroll bounded.
pub struct DncCell {
    controller: StackedController,
    access: MemoryAccess,
    output: Linear,
    clip_value: f64,
    output_size: usize,
}

#[derive(Clone)]
pub struct DncState {
    controller: Vec<LayerState>,
    memory: MemoryState,
}

impl DncCell {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        graph: &mut Graph,
        input_size: usize,
        output_size: usize,
        hidden_size: usize,
        depth: usize,
        controller_type: ControllerType,
        memory_size: usize,
        word_size: usize,
        num_reads: usize,
        num_writes: usize,
        clip_value: f64,
    ) -> DncCell {
        let read_size = num_reads * word_size;
        let controller = StackedController::new(
            graph,
            "dnc/controller",
            input_size + read_size,
            hidden_size,
            depth,
            controller_type,
        );
        let access = MemoryAccess::new(
            graph,
            "dnc/access",
            controller.output_size(),
            memory_size,
            word_size,
            num_reads,
            num_writes,
        );
        let output = Linear::new(
            graph,
            "dnc/output",
            controller.output_size() + read_size,
            output_size,
        );
        DncCell { controller, access, output, clip_value, output_size }
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn initial_state(&self, graph: &mut Graph, batch_size: usize) -> DncState {
        DncState {
            controller: self.controller.initial_state(graph, batch_size),
            memory: self.access.initial_state(graph, batch_size),
        }
    }

    pub fn step(&self, graph: &mut Graph, x: TensorId, state: &DncState) -> (TensorId, DncState) {
        let ctrl_in = graph.concat_cols(x, state.memory.reads);
        let (h, controller) = self.controller.step(graph, ctrl_in, &state.controller);
        let h = graph.clamp(h, self.clip_value);
        let memory = self.access.step(graph, h, &state.memory);
        let combined = graph.concat_cols(h, memory.reads);
        let out = self.output.apply(graph, combined);
        let out = graph.clamp(out, self.clip_value);
        (out, DncState { controller, memory })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Matrix;

    #[test]
    fn step_emits_output_sized_rows_and_threads_state() {
        let mut graph = Graph::new();
        let cell = DncCell::new(&mut graph, 3, 4, 6, 1, ControllerType::Lstm, 4, 3, 2, 1, 20.0);
        graph.freeze_params();

        let state = cell.initial_state(&mut graph, 2);
        let x = graph.constant(Matrix::random(2, 3));
        let (out, next) = cell.step(&mut graph, x, &state);

        assert_eq!(graph.value(out).rows, 2);
        assert_eq!(graph.value(out).cols, 4);

        let x2 = graph.constant(Matrix::random(2, 3));
        let (out2, _) = cell.step(&mut graph, x2, &next);
        assert_eq!(graph.value(out2).cols, 4);
    }

    #[test]
    fn outputs_respect_the_clip_bound() {
        let mut graph = Graph::new();
        let cell = DncCell::new(&mut graph, 2, 3, 4, 1, ControllerType::Rnn, 3, 2, 1, 1, 0.5);
        graph.freeze_params();

        let state = cell.initial_state(&mut graph, 3);
        let x = graph.constant(Matrix::random(3, 2));
        let (out, _) = cell.step(&mut graph, x, &state);
        assert!(graph.value(out).data.iter().all(|v| v.abs() <= 0.5));
    }
}
