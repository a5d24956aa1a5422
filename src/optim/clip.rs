use crate::math::Matrix;

/// Rescales `grads` jointly so their combined L2 norm does not exceed
/// `max_norm`; gradients below the cap pass through unchanged. Returns the
/// global norm before clipping.
pub fn clip_by_global_norm(grads: &mut [Matrix], max_norm: f64) -> f64 {
    let global_norm: f64 = grads.iter().map(Matrix::squared_norm).sum::<f64>().sqrt();
    if global_norm > max_norm && global_norm > 0.0 {
        let scale = max_norm / global_norm;
        for g in grads.iter_mut() {
            for v in g.data.iter_mut() {
                *v *= scale;
            }
        }
    }
    global_norm
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(grads: &[Matrix]) -> f64 {
        grads.iter().map(Matrix::squared_norm).sum::<f64>().sqrt()
    }

    #[test]
    fn norms_above_the_cap_are_rescaled_to_the_cap() {
        let mut grads = vec![
            Matrix::from_vec(1, 2, vec![3.0, 4.0]),
            Matrix::from_vec(2, 1, vec![12.0, 0.0]),
        ];
        // Combined norm = sqrt(9 + 16 + 144) = 13.
        let before = clip_by_global_norm(&mut grads, 5.0);
        assert!((before - 13.0).abs() < 1e-12);
        assert!((norm(&grads) - 5.0).abs() < 1e-9);
        // Direction is preserved.
        assert!((grads[0].data[0] / grads[0].data[1] - 3.0 / 4.0).abs() < 1e-12);
    }

    #[test]
    fn norms_below_the_cap_pass_through_unchanged() {
        let mut grads = vec![Matrix::from_vec(1, 2, vec![0.3, 0.4])];
        let before = clip_by_global_norm(&mut grads, 5.0);
        assert!((before - 0.5).abs() < 1e-12);
        assert_eq!(grads[0].data, vec![0.3, 0.4]);
    }

    #[test]
    fn zero_gradients_stay_zero() {
        let mut grads = vec![Matrix::zeros(2, 2)];
        let before = clip_by_global_norm(&mut grads, 1.0);
        assert_eq!(before, 0.0);
        assert!(grads[0].data.iter().all(|&v| v == 0.0));
    }
}
