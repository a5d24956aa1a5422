use crate::error::HarnessError;
use crate::math::{Graph, Matrix};
use crate::model::SequenceModel;
use crate::optim::{clip_by_global_norm, ExponentialDecay, RmsProp};
use crate::persist::{apply_state, Checkpointer, CheckpointState};
use crate::task::Task;
use crate::train::config::Config;
use crate::train::global_step::GlobalStep;
use crate::train::step::TrainStep;

/// Learning-rate decay constants, keyed off the global step.
const DECAY_RATE: f64 = 0.9;
const DECAY_STEPS: u64 = 10_000;

/// Owns the whole optimization step: task, model, graph and optimizer.
///
/// Each `step` samples a batch, unrolls the model, backpropagates the
/// task's masked loss, clips all gradients by their global norm, applies a
/// decayed-learning-rate RMSProp update and advances the global step by
/// exactly one. The trainer is the only writer of the global step and of
/// the trainable parameters.
pub struct Trainer {
    graph: Graph,
    task: Box<dyn Task>,
    model: SequenceModel,
    optimizer: RmsProp,
    schedule: ExponentialDecay,
    max_grad_norm: f64,
    global_step: GlobalStep,
    last_loss: f64,
    last_lr: f64,
}

impl Trainer {
    pub fn new(
        config: &Config,
        mut task: Box<dyn Task>,
        global_step: GlobalStep,
    ) -> Result<Trainer, HarnessError> {
        let mut graph = Graph::new();
        // Observation width is fixed per run; one probe batch sizes the model.
        let probe = task.generate_batch();
        let input_size = probe.observation_width(task.target_size());
        let model = SequenceModel::new(&mut graph, config, input_size, task.target_size())?;
        graph.freeze_params();

        Ok(Trainer {
            graph,
            task,
            model,
            optimizer: RmsProp::new(config.optimizer_epsilon),
            schedule: ExponentialDecay::new(config.learning_rate, DECAY_RATE, DECAY_STEPS),
            max_grad_norm: config.max_grad_norm,
            global_step,
            last_loss: 0.0,
            last_lr: config.learning_rate,
        })
    }

    /// Loads restored parameters, optimizer cache and global step.
    pub fn restore(&mut self, state: &CheckpointState) -> Result<(), HarnessError> {
        apply_state(state, &mut self.graph, &mut self.optimizer)?;
        self.global_step.set(state.global_step);
        Ok(())
    }

    pub fn save(&self, checkpointer: &Checkpointer) -> Result<(), HarnessError> {
        checkpointer.save(&self.graph, &self.optimizer, self.global_step.get())
    }

    pub fn last_loss(&self) -> f64 {
        self.last_loss
    }

    pub fn last_lr(&self) -> f64 {
        self.last_lr
    }

    pub fn param_count(&self) -> usize {
        self.graph.param_count()
    }
}

impl TrainStep for Trainer {
    fn step(&mut self) -> Result<f64, HarnessError> {
        self.graph.reset();
        self.graph.zero_grads();

        let batch = self.task.generate_batch();
        let logits = self.model.forward(&mut self.graph, &batch);
        let loss_id = self.task.cost(&mut self.graph, &logits, &batch);
        let loss = self.graph.scalar(loss_id);
        self.graph.backward(loss_id);

        let mut grads = self.graph.param_grads();
        clip_by_global_norm(&mut grads, self.max_grad_norm);

        let lr = self.schedule.at(self.global_step.get());
        self.optimizer.apply(&mut self.graph, &grads, lr);
        self.global_step.increment();

        self.last_loss = loss;
        self.last_lr = lr;
        Ok(loss)
    }

    fn report(&mut self) -> Result<String, HarnessError> {
        self.graph.reset();

        let batch = self.task.generate_batch();
        let logits = self.model.forward(&mut self.graph, &batch);
        // Rounded, masked, sigmoid-activated prediction for display.
        let output: Vec<Matrix> = logits
            .iter()
            .enumerate()
            .map(|(t, &id)| {
                let mut m = self.graph.value(id).map(|x| 1.0 / (1.0 + (-x).exp()));
                for b in 0..batch.batch_size() {
                    let mask = batch.mask.get(t, b);
                    for c in 0..m.cols {
                        let v = (m.get(b, c) * mask).round();
                        m.set(b, c, v);
                    }
                }
                m
            })
            .collect();
        self.graph.reset();

        Ok(self.task.to_human_readable(&batch, &output))
    }

    fn global_step(&self) -> u64 {
        self.global_step.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::build_task;

    fn tiny_config() -> Config {
        let mut config = Config::default_for_tests();
        config.batch_size = 2;
        config.num_bits = 2;
        config.hidden_size = 8;
        config.memory_size = 4;
        config.word_size = 4;
        config.num_read_heads = 1;
        config.max_length = 1;
        config.max_repeats = 1;
        config
    }

    #[test]
    fn each_step_advances_the_global_step_once() {
        let config = tiny_config();
        let task = build_task(&config).unwrap();
        let step = GlobalStep::new();
        let mut trainer = Trainer::new(&config, task, step.clone()).unwrap();

        assert_eq!(step.get(), 0);
        let loss = trainer.step().unwrap();
        assert!(loss.is_finite());
        assert_eq!(step.get(), 1);
        trainer.step().unwrap();
        assert_eq!(step.get(), 2);
    }

    #[test]
    fn losses_stay_finite_over_several_steps() {
        let config = tiny_config();
        let task = build_task(&config).unwrap();
        let mut trainer = Trainer::new(&config, task, GlobalStep::new()).unwrap();
        for _ in 0..5 {
            let loss = trainer.step().unwrap();
            assert!(loss.is_finite());
            assert!(loss >= 0.0);
        }
    }

    #[test]
    fn report_renders_without_touching_the_global_step() {
        let config = tiny_config();
        let task = build_task(&config).unwrap();
        let step = GlobalStep::new();
        let mut trainer = Trainer::new(&config, task, step.clone()).unwrap();

        let rendering = trainer.report().unwrap();
        assert!(rendering.contains("Observations"));
        assert!(rendering.contains("Model output"));
        assert_eq!(step.get(), 0);
    }

    #[test]
    fn checkpoint_round_trip_restores_step_and_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let checkpointer = Checkpointer::new(dir.path());
        let config = tiny_config();

        let mut trainer =
            Trainer::new(&config, build_task(&config).unwrap(), GlobalStep::new()).unwrap();
        trainer.step().unwrap();
        trainer.step().unwrap();
        trainer.save(&checkpointer).unwrap();

        let step = GlobalStep::new();
        let mut resumed =
            Trainer::new(&config, build_task(&config).unwrap(), step.clone()).unwrap();
        let state = checkpointer.restore().unwrap().expect("checkpoint exists");
        resumed.restore(&state).unwrap();
        assert_eq!(step.get(), 2);
        assert_eq!(resumed.param_count(), trainer.param_count());
    }
}
