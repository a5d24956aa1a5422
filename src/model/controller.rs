use crate::error::HarnessError;
use crate::math::{Graph, Matrix, TensorId};

/// Recurrent cell family used as the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerType {
    Lstm,
    Rnn,
}

impl ControllerType {
    pub fn parse(name: &str) -> Result<ControllerType, HarnessError> {
        match name {
            "lstm" => Ok(ControllerType::Lstm),
            "rnn" => Ok(ControllerType::Rnn),
            other => Err(HarnessError::UnknownController(other.to_string())),
        }
    }
}

/// One gate's parameters: input weights, recurrent weights, bias.
struct Gate {
    wx: TensorId,
    wh: TensorId,
    b: TensorId,
}

impl Gate {
    fn new(graph: &mut Graph, name: &str, input: usize, hidden: usize, bias_init: f64) -> Gate {
        let mut bias = Matrix::zeros(1, hidden);
        for v in bias.data.iter_mut() {
            *v = bias_init;
        }
        Gate {
            wx: graph.param(&format!("{}/wx", name), Matrix::xavier(input, hidden)),
            wh: graph.param(&format!("{}/wh", name), Matrix::xavier(hidden, hidden)),
            b: graph.param(&format!("{}/b", name), bias),
        }
    }

    /// Pre-activation `x * Wx + h * Wh + b`.
    fn pre(&self, graph: &mut Graph, x: TensorId, h: TensorId) -> TensorId {
        let xw = graph.matmul(x, self.wx);
        let hw = graph.matmul(h, self.wh);
        let s = graph.add(xw, hw);
        graph.broadcast_add_row(s, self.b)
    }
}

enum RecurrentLayer {
    Lstm { input: Gate, forget: Gate, output: Gate, cell: Gate },
    Rnn { gate: Gate },
}

/// Per-layer recurrent state for one batch.
#[derive(Clone)]
pub struct LayerState {
    pub h: TensorId,
    pub c: Option<TensorId>,
}

/// A stack of `depth` recurrent layers; layer l feeds layer l+1.
pub struct StackedController {
    layers: Vec<RecurrentLayer>,
    hidden: usize,
}

impl StackedController {
    pub fn new(
        graph: &mut Graph,
        name: &str,
        input_size: usize,
        hidden: usize,
        depth: usize,
        kind: ControllerType,
    ) -> StackedController {
        assert!(depth >= 1, "controller depth must be at least 1");
        let mut layers = Vec::with_capacity(depth);
        for l in 0..depth {
            let in_size = if l == 0 { input_size } else { hidden };
            let prefix = format!("{}/l{}", name, l);
            layers.push(match kind {
                ControllerType::Lstm => RecurrentLayer::Lstm {
                    input: Gate::new(graph, &format!("{}/i", prefix), in_size, hidden, 0.0),
                    // Forget gate starts open so early gradients flow through time.
                    forget: Gate::new(graph, &format!("{}/f", prefix), in_size, hidden, 1.0),
                    output: Gate::new(graph, &format!("{}/o", prefix), in_size, hidden, 0.0),
                    cell: Gate::new(graph, &format!("{}/g", prefix), in_size, hidden, 0.0),
                },
                ControllerType::Rnn => RecurrentLayer::Rnn {
                    gate: Gate::new(graph, &prefix, in_size, hidden, 0.0),
                },
            });
        }
        StackedController { layers, hidden }
    }

    pub fn output_size(&self) -> usize {
        self.hidden
    }

    /// Zero state for a batch of `batch_size` rows.
    pub fn initial_state(&self, graph: &mut Graph, batch_size: usize) -> Vec<LayerState> {
        self.layers
            .iter()
            .map(|layer| {
                let h = graph.constant(Matrix::zeros(batch_size, self.hidden));
                let c = match layer {
                    RecurrentLayer::Lstm { .. } => {
                        Some(graph.constant(Matrix::zeros(batch_size, self.hidden)))
                    }
                    RecurrentLayer::Rnn { .. } => None,
                };
                LayerState { h, c }
            })
            .collect()
    }

    /// Advances the stack one timestep; returns the top layer's output and
    /// the next state.
    pub fn step(
        &self,
        graph: &mut Graph,
        x: TensorId,
        state: &[LayerState],
    ) -> (TensorId, Vec<LayerState>) {
        assert_eq!(state.len(), self.layers.len());
        let mut next = Vec::with_capacity(self.layers.len());
        let mut input = x;
        for (layer, prev) in self.layers.iter().zip(state.iter()) {
            let out = match layer {
                RecurrentLayer::Lstm { input: gi, forget: gf, output: go, cell: gc } => {
                    let c_prev = prev.c.expect("LSTM layer state carries a cell");
                    let i = gi.pre(graph, input, prev.h);
                    let i = graph.sigmoid(i);
                    let f = gf.pre(graph, input, prev.h);
                    let f = graph.sigmoid(f);
                    let o = go.pre(graph, input, prev.h);
                    let o = graph.sigmoid(o);
                    let g = gc.pre(graph, input, prev.h);
                    let g = graph.tanh(g);

                    let keep = graph.mul(f, c_prev);
                    let write = graph.mul(i, g);
                    let c = graph.add(keep, write);
                    let ct = graph.tanh(c);
                    let h = graph.mul(o, ct);
                    next.push(LayerState { h, c: Some(c) });
                    h
                }
                RecurrentLayer::Rnn { gate } => {
                    let z = gate.pre(graph, input, prev.h);
                    let h = graph.tanh(z);
                    next.push(LayerState { h, c: None });
                    h
                }
            };
            input = out;
        }
        (input, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_kinds_only() {
        assert_eq!(ControllerType::parse("lstm").unwrap(), ControllerType::Lstm);
        assert_eq!(ControllerType::parse("rnn").unwrap(), ControllerType::Rnn);
        assert!(ControllerType::parse("gru").is_err());
    }

    #[test]
    fn lstm_step_produces_batch_by_hidden_outputs() {
        let mut graph = Graph::new();
        let ctrl = StackedController::new(&mut graph, "ctrl", 3, 5, 2, ControllerType::Lstm);
        graph.freeze_params();

        let state = ctrl.initial_state(&mut graph, 4);
        let x = graph.constant(Matrix::random(4, 3));
        let (out, next) = ctrl.step(&mut graph, x, &state);

        assert_eq!(graph.value(out).rows, 4);
        assert_eq!(graph.value(out).cols, 5);
        assert_eq!(next.len(), 2);
        assert!(next[0].c.is_some());
    }

    #[test]
    fn rnn_layers_carry_no_cell_state() {
        let mut graph = Graph::new();
        let ctrl = StackedController::new(&mut graph, "ctrl", 2, 3, 1, ControllerType::Rnn);
        graph.freeze_params();

        let state = ctrl.initial_state(&mut graph, 1);
        assert!(state[0].c.is_none());
        let x = graph.constant(Matrix::random(1, 2));
        let (_, next) = ctrl.step(&mut graph, x, &state);
        assert!(next[0].c.is_none());
    }
}
