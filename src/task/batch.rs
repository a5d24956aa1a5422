use crate::math::Matrix;

/// Observation tensor of one batch, time-major.
///
/// Dense observations carry one `[batch, features]` matrix per timestep.
/// Categorical observations carry integer category indices (one per batch
/// element per timestep) and are one-hot expanded by the model adapter.
#[derive(Debug, Clone)]
pub enum Observations {
    Dense(Vec<Matrix>),
    Categorical(Vec<Vec<usize>>),
}

/// One sampled (observations, target, mask) triple consumed by one training
/// step.
///
/// `target` holds one `[batch, target_size]` matrix per timestep. `mask` is
/// `[time, batch]` with entries that are exactly 0.0 or 1.0; positions with
/// mask 0 contribute to neither the loss nor the rendered report.
#[derive(Debug, Clone)]
pub struct Batch {
    pub observations: Observations,
    pub target: Vec<Matrix>,
    pub mask: Matrix,
}

impl Batch {
    pub fn num_steps(&self) -> usize {
        self.target.len()
    }

    pub fn batch_size(&self) -> usize {
        self.mask.cols
    }

    /// Mask values for timestep `t` as a `[batch, 1]` column.
    pub fn mask_column(&self, t: usize) -> Matrix {
        Matrix::from_vec(self.mask.cols, 1, self.mask.row(t).to_vec())
    }

    /// Feature width the model sees after any categorical expansion.
    pub fn observation_width(&self, target_size: usize) -> usize {
        match &self.observations {
            Observations::Dense(steps) => steps[0].cols,
            Observations::Categorical(_) => target_size,
        }
    }
}
