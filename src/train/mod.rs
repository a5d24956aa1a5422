pub mod config;
pub mod global_step;
pub mod hooks;
pub mod step;
pub mod trainer;
pub mod loop_fn;
pub mod session;

pub use config::Config;
pub use global_step::GlobalStep;
pub use hooks::HookSchedule;
pub use loop_fn::{run_loop, LoopConfig, Outcome};
pub use session::Session;
pub use step::TrainStep;
pub use trainer::Trainer;
