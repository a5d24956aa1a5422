use log::info;

use crate::error::HarnessError;
use crate::persist::{Checkpointer, SummaryWriter};
use crate::train::config::Config;
use crate::train::hooks::HookSchedule;
use crate::train::trainer::Trainer;

/// Session lifecycle around one training run.
///
/// Opening a session transparently restores the latest checkpoint from the
/// checkpoint directory when one exists, whatever the checkpoint interval
/// is. Closing performs the one shared shutdown for both terminal states:
/// a final checkpoint (when checkpointing is enabled) and the finished
/// signal. Every exit path of a run must pass through `close`.
pub struct Session {
    checkpointer: Checkpointer,
    save_on_close: bool,
}

impl Session {
    pub fn open(config: &Config, trainer: &mut Trainer) -> Result<Session, HarnessError> {
        let checkpointer = Checkpointer::new(config.checkpoint_dir.clone());
        if let Some(state) = checkpointer.restore()? {
            info!("Restoring from checkpoint at step {}.", state.global_step);
            trainer.restore(&state)?;
        }
        Ok(Session {
            checkpointer,
            save_on_close: config.checkpoint_interval > 0,
        })
    }

    /// Builds the persistence hook schedule: a checkpoint hook and a summary
    /// hook, each on its own step cadence, each disabled by a non-positive
    /// interval.
    pub fn hook_schedule(&self, config: &Config) -> HookSchedule<Trainer> {
        let mut hooks = HookSchedule::new();

        let checkpointer = self.checkpointer.clone();
        hooks.add(config.checkpoint_interval, move |_, trainer: &mut Trainer| {
            trainer.save(&checkpointer)
        });

        let writer = SummaryWriter::new(config.checkpoint_dir.clone());
        hooks.add(config.summary_interval, move |step, trainer: &mut Trainer| {
            writer.append(step, trainer.last_loss(), trainer.last_lr())
        });

        hooks
    }

    /// Releases the session: final checkpoint if enabled, then the finished
    /// signal. Used identically after normal completion and early stop.
    pub fn close(self, trainer: &Trainer) -> Result<(), HarnessError> {
        if self.save_on_close {
            trainer.save(&self.checkpointer)?;
        }
        info!("Finished.");
        Ok(())
    }
}
