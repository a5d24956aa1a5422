pub mod checkpoint;
pub mod summary;

pub use checkpoint::{apply_state, Checkpointer, CheckpointState};
pub use summary::{SummaryRecord, SummaryWriter};
