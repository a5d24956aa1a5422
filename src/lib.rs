pub mod error;
pub mod math;
pub mod model;
pub mod optim;
pub mod persist;
pub mod task;
pub mod train;

// Convenience re-exports
pub use error::HarnessError;
pub use math::{Graph, Matrix, TensorId};
pub use model::SequenceModel;
pub use task::{build_task, Batch, Task};
pub use train::{run_loop, Config, GlobalStep, Outcome, Session, Trainer};
