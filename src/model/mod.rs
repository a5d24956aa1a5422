pub mod controller;
pub mod memory;
pub mod dnc;
pub mod adapter;

pub use adapter::SequenceModel;
pub use controller::{ControllerType, StackedController};
pub use dnc::DncCell;
pub use memory::MemoryAccess;

use crate::math::{Graph, Matrix, TensorId};

/// A linear map `x * W + b` whose parameters live on the graph. Applying the
/// same `Linear` at several timesteps shares one set of weights.
pub(crate) struct Linear {
    w: TensorId,
    b: TensorId,
}

impl Linear {
    pub(crate) fn new(graph: &mut Graph, name: &str, input: usize, output: usize) -> Linear {
        Linear {
            w: graph.param(&format!("{}/w", name), Matrix::xavier(input, output)),
            b: graph.param(&format!("{}/b", name), Matrix::zeros(1, output)),
        }
    }

    pub(crate) fn apply(&self, graph: &mut Graph, x: TensorId) -> TensorId {
        let wx = graph.matmul(x, self.w);
        graph.broadcast_add_row(wx, self.b)
    }
}
