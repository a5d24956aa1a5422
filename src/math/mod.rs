pub mod matrix;
pub mod graph;

pub use matrix::Matrix;
pub use graph::{Graph, TensorId};
