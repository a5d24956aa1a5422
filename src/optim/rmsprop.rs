use crate::math::{Graph, Matrix};

const DECAY: f64 = 0.9;

/// RMSProp: each parameter is scaled by the square root of a running mean
/// of its squared gradients. The cache is part of the optimizer state and
/// is persisted with checkpoints so a restored run continues the same
/// trajectory.
pub struct RmsProp {
    epsilon: f64,
    cache: Vec<Matrix>,
}

impl RmsProp {
    pub fn new(epsilon: f64) -> RmsProp {
        RmsProp { epsilon, cache: Vec::new() }
    }

    /// Applies one update to every parameter on the graph given pre-clipped
    /// gradients (one per parameter, in registration order).
    pub fn apply(&mut self, graph: &mut Graph, grads: &[Matrix], learning_rate: f64) {
        assert_eq!(grads.len(), graph.param_count(), "one gradient per parameter");
        if self.cache.is_empty() {
            self.cache = grads.iter().map(|g| Matrix::zeros(g.rows, g.cols)).collect();
        }

        for (index, grad) in grads.iter().enumerate() {
            let ms = &mut self.cache[index];
            let param = graph.param_value_mut(index);
            for k in 0..grad.data.len() {
                let g = grad.data[k];
                ms.data[k] = DECAY * ms.data[k] + (1.0 - DECAY) * g * g;
                param.data[k] -= learning_rate * g / (ms.data[k].sqrt() + self.epsilon);
            }
        }
    }

    pub fn cache(&self) -> &[Matrix] {
        &self.cache
    }

    pub fn set_cache(&mut self, cache: Vec<Matrix>) {
        self.cache = cache;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_update_moves_against_the_gradient() {
        let mut graph = Graph::new();
        graph.param("w", Matrix::from_vec(1, 2, vec![1.0, -1.0]));
        graph.freeze_params();

        let grads = vec![Matrix::from_vec(1, 2, vec![2.0, -2.0])];
        let mut opt = RmsProp::new(1e-10);
        opt.apply(&mut graph, &grads, 0.1);

        let w = graph.param_value(0);
        // ms = 0.1 * g^2 = 0.4; update = lr * g / sqrt(ms) = 0.1 * 2 / 0.6324...
        assert!(w.data[0] < 1.0);
        assert!(w.data[1] > -1.0);
        assert!((w.data[0] - (1.0 - 0.1 * 2.0 / 0.4f64.sqrt())).abs() < 1e-9);
    }

    #[test]
    fn cache_accumulates_across_steps() {
        let mut graph = Graph::new();
        graph.param("w", Matrix::from_vec(1, 1, vec![0.0]));
        graph.freeze_params();

        let grads = vec![Matrix::from_vec(1, 1, vec![1.0])];
        let mut opt = RmsProp::new(1e-10);
        opt.apply(&mut graph, &grads, 0.01);
        let first = opt.cache()[0].data[0];
        opt.apply(&mut graph, &grads, 0.01);
        let second = opt.cache()[0].data[0];
        assert!((first - 0.1).abs() < 1e-12);
        assert!(second > first);
    }
}
