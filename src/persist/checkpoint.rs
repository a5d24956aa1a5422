use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;
use crate::math::{Graph, Matrix};
use crate::optim::RmsProp;

/// One serialized trainable parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamEntry {
    pub name: String,
    pub value: Matrix,
}

/// Everything needed to resume a run from the exact persisted step:
/// parameter values, the optimizer's running cache, and the global step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointState {
    pub global_step: u64,
    pub params: Vec<ParamEntry>,
    pub rms_cache: Vec<Matrix>,
}

/// Writes and reads the single latest checkpoint under a directory.
#[derive(Debug, Clone)]
pub struct Checkpointer {
    dir: PathBuf,
}

impl Checkpointer {
    pub fn new(dir: impl Into<PathBuf>) -> Checkpointer {
        Checkpointer { dir: dir.into() }
    }

    fn path(&self) -> PathBuf {
        self.dir.join("checkpoint.json")
    }

    /// Serializes the current parameters, optimizer cache and global step.
    pub fn save(
        &self,
        graph: &Graph,
        optimizer: &RmsProp,
        global_step: u64,
    ) -> Result<(), HarnessError> {
        std::fs::create_dir_all(&self.dir)?;
        let params = (0..graph.param_count())
            .map(|i| ParamEntry {
                name: graph.param_name(i).to_string(),
                value: graph.param_value(i).clone(),
            })
            .collect();
        let state = CheckpointState {
            global_step,
            params,
            rms_cache: optimizer.cache().to_vec(),
        };
        let file = File::create(self.path())?;
        let writer = BufWriter::new(file);
        serde_json::to_writer(writer, &state)?;
        Ok(())
    }

    /// Reads back the latest checkpoint; `None` when none has been written
    /// yet. A present but unreadable file is a fatal error.
    pub fn restore(&self) -> Result<Option<CheckpointState>, HarnessError> {
        if !self.path().exists() {
            return Ok(None);
        }
        let file = File::open(self.path())?;
        let reader = BufReader::new(file);
        let state = serde_json::from_reader(reader)?;
        Ok(Some(state))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Loads a restored state into the graph and optimizer. Parameters must
/// match the model by name, order and shape.
pub fn apply_state(
    state: &CheckpointState,
    graph: &mut Graph,
    optimizer: &mut RmsProp,
) -> Result<(), HarnessError> {
    if state.params.len() != graph.param_count() {
        return Err(HarnessError::CheckpointMismatch(format!(
            "checkpoint has {} parameters, model has {}",
            state.params.len(),
            graph.param_count()
        )));
    }
    for (index, entry) in state.params.iter().enumerate() {
        if entry.name != graph.param_name(index) {
            return Err(HarnessError::CheckpointMismatch(format!(
                "parameter {} is named {:?} in the checkpoint but {:?} in the model",
                index,
                entry.name,
                graph.param_name(index)
            )));
        }
        if !entry.value.same_shape(graph.param_value(index)) {
            return Err(HarnessError::CheckpointMismatch(format!(
                "parameter {:?} has shape {}x{} in the checkpoint but {}x{} in the model",
                entry.name,
                entry.value.rows,
                entry.value.cols,
                graph.param_value(index).rows,
                graph.param_value(index).cols
            )));
        }
        *graph.param_value_mut(index) = entry.value.clone();
    }
    if !state.rms_cache.is_empty() {
        optimizer.set_cache(state.rms_cache.clone());
    }
    Ok(())
}
