use crate::math::{Graph, Matrix, TensorId};
use crate::model::Linear;

/// External memory with content-based read and write heads.
///
/// The memory is `memory_size` slots of `word_size` words, one copy per
/// batch element. Each head derives a key and a softplus-sharpened strength
/// from the controller output; addressing weights are a softmax over the
/// strength-scaled slot/key scores. Write heads apply erase/add updates,
/// read heads blend slots by their weights; reads see the current step's
/// writes.
pub struct MemoryAccess {
    memory_size: usize,
    word_size: usize,
    num_reads: usize,
    num_writes: usize,
    write_keys: Linear,
    write_strengths: Linear,
    erase_vectors: Linear,
    write_vectors: Linear,
    read_keys: Linear,
    read_strengths: Linear,
}

/// Memory state threaded between timesteps: one slot matrix per batch
/// element plus the concatenated read words from the previous step.
#[derive(Clone)]
pub struct MemoryState {
    pub memory: Vec<TensorId>,
    pub reads: TensorId,
}

impl MemoryAccess {
    pub fn new(
        graph: &mut Graph,
        name: &str,
        controller_size: usize,
        memory_size: usize,
        word_size: usize,
        num_reads: usize,
        num_writes: usize,
    ) -> MemoryAccess {
        assert!(num_reads >= 1 && num_writes >= 1);
        MemoryAccess {
            memory_size,
            word_size,
            num_reads,
            num_writes,
            write_keys: Linear::new(
                graph,
                &format!("{}/write_keys", name),
                controller_size,
                num_writes * word_size,
            ),
            write_strengths: Linear::new(
                graph,
                &format!("{}/write_strengths", name),
                controller_size,
                num_writes,
            ),
            erase_vectors: Linear::new(
                graph,
                &format!("{}/erase_vectors", name),
                controller_size,
                num_writes * word_size,
            ),
            write_vectors: Linear::new(
                graph,
                &format!("{}/write_vectors", name),
                controller_size,
                num_writes * word_size,
            ),
            read_keys: Linear::new(
                graph,
                &format!("{}/read_keys", name),
                controller_size,
                num_reads * word_size,
            ),
            read_strengths: Linear::new(
                graph,
                &format!("{}/read_strengths", name),
                controller_size,
                num_reads,
            ),
        }
    }

    /// Width of the concatenated read words.
    pub fn read_size(&self) -> usize {
        self.num_reads * self.word_size
    }

    pub fn initial_state(&self, graph: &mut Graph, batch_size: usize) -> MemoryState {
        let memory = (0..batch_size)
            .map(|_| graph.constant(Matrix::zeros(self.memory_size, self.word_size)))
            .collect();
        let reads = graph.constant(Matrix::zeros(batch_size, self.read_size()));
        MemoryState { memory, reads }
    }

    /// Content-based addressing: softmax over strength-scaled memory/key
    /// scores. `key` is [1, word_size], `strength` is [1, 1]; the result is
    /// a [1, memory_size] weighting.
    fn address(
        &self,
        graph: &mut Graph,
        memory: TensorId,
        key: TensorId,
        strength: TensorId,
    ) -> TensorId {
        let kt = graph.transpose(key);
        let scores = graph.matmul(memory, kt);
        let scores = graph.transpose(scores);
        let sharp = graph.softplus(strength);
        let scaled = graph.mul_scalar_node(scores, sharp);
        graph.softmax_rows(scaled)
    }

    /// Advances the memory one timestep given the controller output
    /// `h` ([batch, controller_size]).
    pub fn step(&self, graph: &mut Graph, h: TensorId, prev: &MemoryState) -> MemoryState {
        let batch_size = prev.memory.len();
        let w = self.word_size;

        let write_keys = self.write_keys.apply(graph, h);
        let write_strengths = self.write_strengths.apply(graph, h);
        let erase_all = self.erase_vectors.apply(graph, h);
        let erase_all = graph.sigmoid(erase_all);
        let write_all = self.write_vectors.apply(graph, h);
        let read_keys = self.read_keys.apply(graph, h);
        let read_strengths = self.read_strengths.apply(graph, h);

        let mut memory = Vec::with_capacity(batch_size);
        let mut reads: Option<TensorId> = None;

        for b in 0..batch_size {
            let wk_row = graph.row(write_keys, b);
            let ws_row = graph.row(write_strengths, b);
            let er_row = graph.row(erase_all, b);
            let wv_row = graph.row(write_all, b);
            let rk_row = graph.row(read_keys, b);
            let rs_row = graph.row(read_strengths, b);

            let mut m = prev.memory[b];
            for head in 0..self.num_writes {
                let key = graph.slice_cols(wk_row, head * w, w);
                let strength = graph.slice_cols(ws_row, head, 1);
                let weights = self.address(graph, m, key, strength);
                let wt = graph.transpose(weights);

                let erase = graph.slice_cols(er_row, head * w, w);
                let erase_outer = graph.matmul(wt, erase);
                let keep = graph.one_minus(erase_outer);
                let kept = graph.mul(m, keep);

                let write = graph.slice_cols(wv_row, head * w, w);
                let write_outer = graph.matmul(wt, write);
                m = graph.add(kept, write_outer);
            }
            memory.push(m);

            let mut sample_reads: Option<TensorId> = None;
            for head in 0..self.num_reads {
                let key = graph.slice_cols(rk_row, head * w, w);
                let strength = graph.slice_cols(rs_row, head, 1);
                let weights = self.address(graph, m, key, strength);
                let word = graph.matmul(weights, m);
                sample_reads = Some(match sample_reads {
                    Some(acc) => graph.concat_cols(acc, word),
                    None => word,
                });
            }
            let sample_reads = sample_reads.expect("at least one read head");
            reads = Some(match reads {
                Some(acc) => graph.concat_rows(acc, sample_reads),
                None => sample_reads,
            });
        }

        MemoryState { memory, reads: reads.expect("non-empty batch") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_have_batch_rows_and_concatenated_head_columns() {
        let mut graph = Graph::new();
        let access = MemoryAccess::new(&mut graph, "mem", 6, 4, 3, 2, 1);
        graph.freeze_params();

        let state = access.initial_state(&mut graph, 5);
        assert_eq!(state.memory.len(), 5);

        let h = graph.constant(Matrix::random(5, 6));
        let next = access.step(&mut graph, h, &state);

        let reads = graph.value(next.reads);
        assert_eq!(reads.rows, 5);
        assert_eq!(reads.cols, 2 * 3);
        assert_eq!(graph.value(next.memory[0]).rows, 4);
        assert_eq!(graph.value(next.memory[0]).cols, 3);
    }

    #[test]
    fn addressing_weights_form_a_distribution() {
        let mut graph = Graph::new();
        let access = MemoryAccess::new(&mut graph, "mem", 4, 3, 2, 1, 1);
        graph.freeze_params();

        let memory = graph.constant(Matrix::random(3, 2));
        let key = graph.constant(Matrix::random(1, 2));
        let strength = graph.constant(Matrix::from_vec(1, 1, vec![0.8]));
        let weights = access.address(&mut graph, memory, key, strength);

        let v = graph.value(weights);
        assert_eq!(v.rows, 1);
        assert_eq!(v.cols, 3);
        assert!((v.sum() - 1.0).abs() < 1e-12);
        assert!(v.data.iter().all(|&x| x >= 0.0));
    }
}
