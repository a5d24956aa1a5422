use crate::math::matrix::Matrix;

/// Handle to a node in the [`Graph`] tape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TensorId(pub(crate) usize);

/// Recorded forward operation; each variant stores the ids of its inputs so
/// the reverse sweep can route gradients back to them.
#[derive(Debug, Clone)]
enum Op {
    Leaf,
    MatMul { a: TensorId, b: TensorId },
    Add { a: TensorId, b: TensorId },
    Sub { a: TensorId, b: TensorId },
    Mul { a: TensorId, b: TensorId },
    Scale { a: TensorId, s: f64 },
    Sigmoid { a: TensorId },
    Tanh { a: TensorId },
    Softplus { a: TensorId },
    /// Symmetric clamp to [-bound, bound]; gradient passes through strictly
    /// inside the interval and is zero outside.
    Clamp { a: TensorId, bound: f64 },
    OneMinus { a: TensorId },
    /// Adds a [1, n] bias row to every row of a [m, n] input.
    BroadcastAddRow { a: TensorId, bias: TensorId },
    Transpose { a: TensorId },
    Row { a: TensorId, index: usize },
    SliceCols { a: TensorId, start: usize, len: usize },
    ConcatCols { a: TensorId, b: TensorId },
    ConcatRows { a: TensorId, b: TensorId },
    /// Elementwise multiply by a [1, 1] node.
    MulScalarNode { a: TensorId, s: TensorId },
    SoftmaxRows { a: TensorId },
    /// Elementwise sigmoid cross-entropy against a constant target.
    SigmoidCrossEntropy { logits: TensorId, target: Matrix },
    /// Per-row softmax cross-entropy against a constant target; output [m, 1].
    SoftmaxCrossEntropyRows { logits: TensorId, target: Matrix },
    SumAll { a: TensorId },
}

struct Node {
    value: Matrix,
    grad: Matrix,
    op: Op,
    name: Option<String>,
}

/// Reverse-mode autodiff tape over [`Matrix`] values.
///
/// Trainable parameters are registered first and survive for the lifetime of
/// the graph; everything recorded after [`Graph::freeze_params`] is an
/// activation and is discarded by [`Graph::reset`] between optimization
/// steps. Parameter nodes keep their ids across resets, so model structs can
/// hold `TensorId`s to their weights permanently.
pub struct Graph {
    nodes: Vec<Node>,
    boundary: usize,
    frozen: bool,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Graph {
        Graph { nodes: Vec::with_capacity(4096), boundary: 0, frozen: false }
    }

    /// Registers a named trainable parameter. Must be called before
    /// `freeze_params`.
    pub fn param(&mut self, name: &str, value: Matrix) -> TensorId {
        assert!(!self.frozen, "cannot register parameters after freeze_params");
        let grad = Matrix::zeros(value.rows, value.cols);
        self.nodes.push(Node { value, grad, op: Op::Leaf, name: Some(name.to_string()) });
        TensorId(self.nodes.len() - 1)
    }

    /// Records a non-trainable input (batch data, masks, initial state).
    pub fn constant(&mut self, value: Matrix) -> TensorId {
        let grad = Matrix::zeros(value.rows, value.cols);
        self.nodes.push(Node { value, grad, op: Op::Leaf, name: None });
        TensorId(self.nodes.len() - 1)
    }

    /// Marks the end of parameter registration; everything recorded from now
    /// on is transient and dropped by `reset`.
    pub fn freeze_params(&mut self) {
        self.boundary = self.nodes.len();
        self.frozen = true;
    }

    /// Drops all activation nodes, keeping parameters and their ids intact.
    pub fn reset(&mut self) {
        self.nodes.truncate(self.boundary);
    }

    pub fn zero_grads(&mut self) {
        for node in self.nodes.iter_mut() {
            for g in node.grad.data.iter_mut() {
                *g = 0.0;
            }
        }
    }

    pub fn value(&self, t: TensorId) -> &Matrix {
        &self.nodes[t.0].value
    }

    pub fn grad(&self, t: TensorId) -> &Matrix {
        &self.nodes[t.0].grad
    }

    pub fn scalar(&self, t: TensorId) -> f64 {
        let v = &self.nodes[t.0].value;
        assert_eq!(v.rows * v.cols, 1, "scalar() called on a non-scalar node");
        v.data[0]
    }

    // ── Parameter access (optimizer / checkpoint) ───────────────────────

    pub fn param_count(&self) -> usize {
        self.boundary
    }

    pub fn param_name(&self, index: usize) -> &str {
        assert!(index < self.boundary);
        self.nodes[index].name.as_deref().unwrap_or("")
    }

    pub fn param_value(&self, index: usize) -> &Matrix {
        assert!(index < self.boundary);
        &self.nodes[index].value
    }

    pub fn param_value_mut(&mut self, index: usize) -> &mut Matrix {
        assert!(index < self.boundary);
        &mut self.nodes[index].value
    }

    pub fn param_grads(&self) -> Vec<Matrix> {
        self.nodes[..self.boundary].iter().map(|n| n.grad.clone()).collect()
    }

    // ── Forward ops ─────────────────────────────────────────────────────

    fn push(&mut self, value: Matrix, op: Op) -> TensorId {
        let grad = Matrix::zeros(value.rows, value.cols);
        self.nodes.push(Node { value, grad, op, name: None });
        TensorId(self.nodes.len() - 1)
    }

    pub fn matmul(&mut self, a: TensorId, b: TensorId) -> TensorId {
        let value = self.nodes[a.0].value.matmul(&self.nodes[b.0].value);
        self.push(value, Op::MatMul { a, b })
    }

    pub fn add(&mut self, a: TensorId, b: TensorId) -> TensorId {
        let value = self.nodes[a.0].value.add(&self.nodes[b.0].value);
        self.push(value, Op::Add { a, b })
    }

    pub fn sub(&mut self, a: TensorId, b: TensorId) -> TensorId {
        let value = self.nodes[a.0].value.sub(&self.nodes[b.0].value);
        self.push(value, Op::Sub { a, b })
    }

    pub fn mul(&mut self, a: TensorId, b: TensorId) -> TensorId {
        let value = self.nodes[a.0].value.hadamard(&self.nodes[b.0].value);
        self.push(value, Op::Mul { a, b })
    }

    pub fn scale(&mut self, a: TensorId, s: f64) -> TensorId {
        let value = self.nodes[a.0].value.map(|x| x * s);
        self.push(value, Op::Scale { a, s })
    }

    pub fn sigmoid(&mut self, a: TensorId) -> TensorId {
        let value = self.nodes[a.0].value.map(sigmoid);
        self.push(value, Op::Sigmoid { a })
    }

    pub fn tanh(&mut self, a: TensorId) -> TensorId {
        let value = self.nodes[a.0].value.map(f64::tanh);
        self.push(value, Op::Tanh { a })
    }

    /// ln(1 + e^x), computed stably.
    pub fn softplus(&mut self, a: TensorId) -> TensorId {
        let value = self.nodes[a.0].value.map(softplus);
        self.push(value, Op::Softplus { a })
    }

    pub fn clamp(&mut self, a: TensorId, bound: f64) -> TensorId {
        let value = self.nodes[a.0].value.map(|x| x.clamp(-bound, bound));
        self.push(value, Op::Clamp { a, bound })
    }

    pub fn one_minus(&mut self, a: TensorId) -> TensorId {
        let value = self.nodes[a.0].value.map(|x| 1.0 - x);
        self.push(value, Op::OneMinus { a })
    }

    pub fn broadcast_add_row(&mut self, a: TensorId, bias: TensorId) -> TensorId {
        let av = &self.nodes[a.0].value;
        let bv = &self.nodes[bias.0].value;
        assert_eq!(bv.rows, 1, "bias must be a single row");
        assert_eq!(av.cols, bv.cols, "bias width must match input width");
        let mut value = av.clone();
        for i in 0..value.rows {
            for j in 0..value.cols {
                value.data[i * value.cols + j] += bv.data[j];
            }
        }
        self.push(value, Op::BroadcastAddRow { a, bias })
    }

    pub fn transpose(&mut self, a: TensorId) -> TensorId {
        let value = self.nodes[a.0].value.transpose();
        self.push(value, Op::Transpose { a })
    }

    pub fn row(&mut self, a: TensorId, index: usize) -> TensorId {
        let av = &self.nodes[a.0].value;
        assert!(index < av.rows);
        let value = Matrix::from_vec(1, av.cols, av.row(index).to_vec());
        self.push(value, Op::Row { a, index })
    }

    pub fn slice_cols(&mut self, a: TensorId, start: usize, len: usize) -> TensorId {
        let av = &self.nodes[a.0].value;
        assert!(start + len <= av.cols);
        let mut value = Matrix::zeros(av.rows, len);
        for i in 0..av.rows {
            for j in 0..len {
                value.data[i * len + j] = av.data[i * av.cols + start + j];
            }
        }
        self.push(value, Op::SliceCols { a, start, len })
    }

    pub fn concat_cols(&mut self, a: TensorId, b: TensorId) -> TensorId {
        let av = &self.nodes[a.0].value;
        let bv = &self.nodes[b.0].value;
        assert_eq!(av.rows, bv.rows, "concat_cols requires equal row counts");
        let cols = av.cols + bv.cols;
        let mut value = Matrix::zeros(av.rows, cols);
        for i in 0..av.rows {
            value.data[i * cols..i * cols + av.cols].copy_from_slice(av.row(i));
            value.data[i * cols + av.cols..(i + 1) * cols].copy_from_slice(bv.row(i));
        }
        self.push(value, Op::ConcatCols { a, b })
    }

    pub fn concat_rows(&mut self, a: TensorId, b: TensorId) -> TensorId {
        let av = &self.nodes[a.0].value;
        let bv = &self.nodes[b.0].value;
        assert_eq!(av.cols, bv.cols, "concat_rows requires equal column counts");
        let mut data = av.data.clone();
        data.extend_from_slice(&bv.data);
        let value = Matrix::from_vec(av.rows + bv.rows, av.cols, data);
        self.push(value, Op::ConcatRows { a, b })
    }

    pub fn mul_scalar_node(&mut self, a: TensorId, s: TensorId) -> TensorId {
        let sv = self.scalar(s);
        let value = self.nodes[a.0].value.map(|x| x * sv);
        self.push(value, Op::MulScalarNode { a, s })
    }

    pub fn softmax_rows(&mut self, a: TensorId) -> TensorId {
        let av = &self.nodes[a.0].value;
        let mut value = Matrix::zeros(av.rows, av.cols);
        for i in 0..av.rows {
            let row = av.row(i);
            let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let exps: Vec<f64> = row.iter().map(|&x| (x - max).exp()).collect();
            let total: f64 = exps.iter().sum();
            for (j, e) in exps.iter().enumerate() {
                value.data[i * av.cols + j] = e / total;
            }
        }
        self.push(value, Op::SoftmaxRows { a })
    }

    /// Elementwise sigmoid cross-entropy of `logits` against a 0/1 `target`
    /// matrix of the same shape, in the numerically stable form
    /// `max(x, 0) - x * t + ln(1 + e^-|x|)`.
    pub fn sigmoid_cross_entropy(&mut self, logits: TensorId, target: Matrix) -> TensorId {
        let lv = &self.nodes[logits.0].value;
        assert!(lv.same_shape(&target), "target must match logits shape");
        let value = lv.zip_with(&target, |x, t| x.max(0.0) - x * t + (-x.abs()).exp().ln_1p());
        self.push(value, Op::SigmoidCrossEntropy { logits, target })
    }

    /// Per-row softmax cross-entropy of `logits` against a one-hot (or soft,
    /// rows summing to one) `target`; output is [rows, 1].
    pub fn softmax_cross_entropy_rows(&mut self, logits: TensorId, target: Matrix) -> TensorId {
        let lv = &self.nodes[logits.0].value;
        assert!(lv.same_shape(&target), "target must match logits shape");
        let mut value = Matrix::zeros(lv.rows, 1);
        for i in 0..lv.rows {
            let row = lv.row(i);
            let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let log_sum: f64 = row.iter().map(|&x| (x - max).exp()).sum::<f64>().ln() + max;
            let dot: f64 = row.iter().zip(target.row(i)).map(|(&x, &t)| x * t).sum();
            value.data[i] = log_sum - dot;
        }
        self.push(value, Op::SoftmaxCrossEntropyRows { logits, target })
    }

    pub fn sum_all(&mut self, a: TensorId) -> TensorId {
        let value = Matrix::from_vec(1, 1, vec![self.nodes[a.0].value.sum()]);
        self.push(value, Op::SumAll { a })
    }

    // ── Backward ────────────────────────────────────────────────────────

    /// Runs the reverse sweep from `loss`, accumulating gradients into every
    /// node on the tape. The seed gradient is 1 for each entry of `loss`
    /// (normally a [1, 1] scalar).
    pub fn backward(&mut self, loss: TensorId) {
        for g in self.nodes[loss.0].grad.data.iter_mut() {
            *g = 1.0;
        }

        for idx in (0..=loss.0).rev() {
            let op = self.nodes[idx].op.clone();
            match op {
                Op::Leaf => {}
                Op::MatMul { a, b } => {
                    let grad = self.nodes[idx].grad.clone();
                    let bt = self.nodes[b.0].value.transpose();
                    let da = grad.matmul(&bt);
                    let at = self.nodes[a.0].value.transpose();
                    let db = at.matmul(&grad);
                    self.accumulate(a, &da);
                    self.accumulate(b, &db);
                }
                Op::Add { a, b } => {
                    let grad = self.nodes[idx].grad.clone();
                    self.accumulate(a, &grad);
                    self.accumulate(b, &grad);
                }
                Op::Sub { a, b } => {
                    let grad = self.nodes[idx].grad.clone();
                    self.accumulate(a, &grad);
                    let neg = grad.map(|x| -x);
                    self.accumulate(b, &neg);
                }
                Op::Mul { a, b } => {
                    let grad = self.nodes[idx].grad.clone();
                    let da = grad.hadamard(&self.nodes[b.0].value);
                    let db = grad.hadamard(&self.nodes[a.0].value);
                    self.accumulate(a, &da);
                    self.accumulate(b, &db);
                }
                Op::Scale { a, s } => {
                    let da = self.nodes[idx].grad.map(|x| x * s);
                    self.accumulate(a, &da);
                }
                Op::Sigmoid { a } => {
                    let da = self.nodes[idx].grad.hadamard(&self.nodes[idx].value.map(|y| y * (1.0 - y)));
                    self.accumulate(a, &da);
                }
                Op::Tanh { a } => {
                    let da = self.nodes[idx].grad.hadamard(&self.nodes[idx].value.map(|y| 1.0 - y * y));
                    self.accumulate(a, &da);
                }
                Op::Softplus { a } => {
                    let da = self.nodes[idx].grad.hadamard(&self.nodes[a.0].value.map(sigmoid));
                    self.accumulate(a, &da);
                }
                Op::Clamp { a, bound } => {
                    let da = self.nodes[idx]
                        .grad
                        .zip_with(&self.nodes[a.0].value, |g, x| if x.abs() < bound { g } else { 0.0 });
                    self.accumulate(a, &da);
                }
                Op::OneMinus { a } => {
                    let da = self.nodes[idx].grad.map(|x| -x);
                    self.accumulate(a, &da);
                }
                Op::BroadcastAddRow { a, bias } => {
                    let grad = self.nodes[idx].grad.clone();
                    self.accumulate(a, &grad);
                    let mut db = Matrix::zeros(1, grad.cols);
                    for i in 0..grad.rows {
                        for j in 0..grad.cols {
                            db.data[j] += grad.data[i * grad.cols + j];
                        }
                    }
                    self.accumulate(bias, &db);
                }
                Op::Transpose { a } => {
                    let da = self.nodes[idx].grad.transpose();
                    self.accumulate(a, &da);
                }
                Op::Row { a, index } => {
                    let grad = self.nodes[idx].grad.clone();
                    let target = &mut self.nodes[a.0].grad;
                    for j in 0..grad.cols {
                        target.data[index * target.cols + j] += grad.data[j];
                    }
                }
                Op::SliceCols { a, start, len } => {
                    let grad = self.nodes[idx].grad.clone();
                    let target = &mut self.nodes[a.0].grad;
                    for i in 0..grad.rows {
                        for j in 0..len {
                            target.data[i * target.cols + start + j] += grad.data[i * len + j];
                        }
                    }
                }
                Op::ConcatCols { a, b } => {
                    let grad = self.nodes[idx].grad.clone();
                    let a_cols = self.nodes[a.0].value.cols;
                    {
                        let ga = &mut self.nodes[a.0].grad;
                        for i in 0..grad.rows {
                            for j in 0..a_cols {
                                ga.data[i * a_cols + j] += grad.data[i * grad.cols + j];
                            }
                        }
                    }
                    let gb = &mut self.nodes[b.0].grad;
                    for i in 0..grad.rows {
                        for j in 0..gb.cols {
                            gb.data[i * gb.cols + j] += grad.data[i * grad.cols + a_cols + j];
                        }
                    }
                }
                Op::ConcatRows { a, b } => {
                    let grad = self.nodes[idx].grad.clone();
                    let a_rows = self.nodes[a.0].value.rows;
                    {
                        let ga = &mut self.nodes[a.0].grad;
                        for k in 0..a_rows * grad.cols {
                            ga.data[k] += grad.data[k];
                        }
                    }
                    let gb = &mut self.nodes[b.0].grad;
                    let offset = a_rows * grad.cols;
                    for k in 0..gb.data.len() {
                        gb.data[k] += grad.data[offset + k];
                    }
                }
                Op::MulScalarNode { a, s } => {
                    let grad = self.nodes[idx].grad.clone();
                    let sv = self.nodes[s.0].value.data[0];
                    let da = grad.map(|x| x * sv);
                    self.accumulate(a, &da);
                    let ds: f64 = grad
                        .data
                        .iter()
                        .zip(self.nodes[a.0].value.data.iter())
                        .map(|(&g, &x)| g * x)
                        .sum();
                    self.nodes[s.0].grad.data[0] += ds;
                }
                Op::SoftmaxRows { a } => {
                    let grad = self.nodes[idx].grad.clone();
                    let y = self.nodes[idx].value.clone();
                    let mut da = Matrix::zeros(grad.rows, grad.cols);
                    for i in 0..grad.rows {
                        let dot: f64 = grad.row(i).iter().zip(y.row(i)).map(|(&g, &p)| g * p).sum();
                        for j in 0..grad.cols {
                            da.data[i * grad.cols + j] = y.get(i, j) * (grad.get(i, j) - dot);
                        }
                    }
                    self.accumulate(a, &da);
                }
                Op::SigmoidCrossEntropy { logits, target } => {
                    let grad = self.nodes[idx].grad.clone();
                    let d = self.nodes[logits.0].value.zip_with(&target, |x, t| sigmoid(x) - t);
                    let da = grad.hadamard(&d);
                    self.accumulate(logits, &da);
                }
                Op::SoftmaxCrossEntropyRows { logits, target } => {
                    let grad = self.nodes[idx].grad.clone();
                    let lv = self.nodes[logits.0].value.clone();
                    let mut da = Matrix::zeros(lv.rows, lv.cols);
                    for i in 0..lv.rows {
                        let row = lv.row(i);
                        let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                        let exps: Vec<f64> = row.iter().map(|&x| (x - max).exp()).collect();
                        let total: f64 = exps.iter().sum();
                        for j in 0..lv.cols {
                            da.data[i * lv.cols + j] =
                                grad.data[i] * (exps[j] / total - target.get(i, j));
                        }
                    }
                    self.accumulate(logits, &da);
                }
                Op::SumAll { a } => {
                    let g = self.nodes[idx].grad.data[0];
                    let target = &mut self.nodes[a.0].grad;
                    for v in target.data.iter_mut() {
                        *v += g;
                    }
                }
            }
        }
    }

    fn accumulate(&mut self, t: TensorId, grad: &Matrix) {
        let target = &mut self.nodes[t.0].grad;
        debug_assert!(target.same_shape(grad));
        for (g, d) in target.data.iter_mut().zip(grad.data.iter()) {
            *g += d;
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn softplus(x: f64) -> f64 {
    // ln(1 + e^x) = max(x, 0) + ln(1 + e^-|x|)
    x.max(0.0) + (-x.abs()).exp().ln_1p()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-5;
    const TOL: f64 = 1e-6;

    /// Finite-difference check of d(loss)/d(param[k]) for a loss builder.
    fn check_gradients<F>(init: Matrix, build: F)
    where
        F: Fn(&mut Graph, TensorId) -> TensorId,
    {
        let mut g = Graph::new();
        let p = g.param("p", init.clone());
        g.freeze_params();

        let loss = build(&mut g, p);
        g.zero_grads();
        g.backward(loss);
        let analytic = g.grad(p).clone();
        g.reset();

        for k in 0..init.data.len() {
            let mut plus = init.clone();
            plus.data[k] += EPS;
            let mut minus = init.clone();
            minus.data[k] -= EPS;

            *g.param_value_mut(0) = plus;
            let lp = {
                let id = build(&mut g, p);
                let v = g.scalar(id);
                g.reset();
                v
            };
            *g.param_value_mut(0) = minus;
            let lm = {
                let id = build(&mut g, p);
                let v = g.scalar(id);
                g.reset();
                v
            };

            let numeric = (lp - lm) / (2.0 * EPS);
            assert!(
                (analytic.data[k] - numeric).abs() < TOL,
                "grad mismatch at {}: analytic {} vs numeric {}",
                k,
                analytic.data[k],
                numeric
            );
        }
    }

    #[test]
    fn matmul_sigmoid_gradients_match_finite_differences() {
        let init = Matrix::from_vec(2, 3, vec![0.1, -0.2, 0.3, 0.5, -0.4, 0.2]);
        check_gradients(init, |g, p| {
            let x = g.constant(Matrix::from_vec(1, 2, vec![0.7, -0.3]));
            let h = g.matmul(x, p);
            let s = g.sigmoid(h);
            g.sum_all(s)
        });
    }

    #[test]
    fn softmax_and_concat_gradients_match_finite_differences() {
        let init = Matrix::from_vec(2, 2, vec![0.4, -0.1, 0.2, 0.6]);
        check_gradients(init, |g, p| {
            let t = g.transpose(p);
            let c = g.concat_cols(p, t);
            let sm = g.softmax_rows(c);
            let r = g.row(sm, 1);
            let tn = g.tanh(r);
            g.sum_all(tn)
        });
    }

    #[test]
    fn sigmoid_cross_entropy_gradients_match_finite_differences() {
        let init = Matrix::from_vec(2, 2, vec![1.2, -0.7, 0.1, 0.9]);
        check_gradients(init, |g, p| {
            let target = Matrix::from_vec(2, 2, vec![1.0, 0.0, 0.0, 1.0]);
            let ce = g.sigmoid_cross_entropy(p, target);
            g.sum_all(ce)
        });
    }

    #[test]
    fn softmax_cross_entropy_gradients_match_finite_differences() {
        let init = Matrix::from_vec(2, 3, vec![0.5, -0.5, 0.1, -0.2, 0.8, 0.3]);
        check_gradients(init, |g, p| {
            let target = Matrix::from_vec(2, 3, vec![0.0, 1.0, 0.0, 1.0, 0.0, 0.0]);
            let ce = g.softmax_cross_entropy_rows(p, target);
            g.sum_all(ce)
        });
    }

    #[test]
    fn memory_style_ops_gradients_match_finite_differences() {
        // Exercises the op combination used by the memory module: scalar
        // strength, softmax addressing, erase/add outer products.
        let init = Matrix::from_vec(3, 2, vec![0.3, -0.2, 0.1, 0.4, -0.5, 0.2]);
        check_gradients(init, |g, p| {
            let key = g.constant(Matrix::from_vec(1, 2, vec![0.6, -0.4]));
            let kt = g.transpose(key);
            let scores = g.matmul(p, kt);
            let st = g.transpose(scores);
            let strength = g.constant(Matrix::from_vec(1, 1, vec![1.7]));
            let sharpened = g.mul_scalar_node(st, strength);
            let w = g.softmax_rows(sharpened);
            let read = g.matmul(w, p);
            let clipped = g.clamp(read, 10.0);
            g.sum_all(clipped)
        });
    }

    #[test]
    fn reset_keeps_parameters_and_their_ids() {
        let mut g = Graph::new();
        let p = g.param("w", Matrix::from_vec(1, 2, vec![1.0, 2.0]));
        g.freeze_params();

        let c = g.constant(Matrix::from_vec(2, 1, vec![3.0, 4.0]));
        let _ = g.matmul(p, c);
        g.reset();

        assert_eq!(g.param_count(), 1);
        assert_eq!(g.value(p).data, vec![1.0, 2.0]);
        assert_eq!(g.param_name(0), "w");
    }
}
