pub mod clip;
pub mod rmsprop;
pub mod schedule;

pub use clip::clip_by_global_norm;
pub use rmsprop::RmsProp;
pub use schedule::ExponentialDecay;
