use crate::error::HarnessError;

type HookAction<C> = Box<dyn FnMut(u64, &mut C) -> Result<(), HarnessError>>;

/// Step-cadence scheduler for persistence side effects.
///
/// Each hook is an (interval, action) pair checked against the global step
/// after every optimization step, entirely independent of the reporting
/// cadence: a report and a hook firing may or may not land on the same
/// step. A hook failure is fatal and aborts the run.
pub struct HookSchedule<C> {
    hooks: Vec<(u64, HookAction<C>)>,
}

impl<C> Default for HookSchedule<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> HookSchedule<C> {
    pub fn new() -> HookSchedule<C> {
        HookSchedule { hooks: Vec::new() }
    }

    /// Registers an action to fire every `interval` completed steps.
    /// Intervals of zero or below disable the hook entirely.
    pub fn add<F>(&mut self, interval: i64, action: F)
    where
        F: FnMut(u64, &mut C) -> Result<(), HarnessError> + 'static,
    {
        if interval > 0 {
            self.hooks.push((interval as u64, Box::new(action)));
        }
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Fires every hook whose interval divides the completed-step count.
    pub fn fire_due(&mut self, step: u64, context: &mut C) -> Result<(), HarnessError> {
        for (interval, action) in self.hooks.iter_mut() {
            if step > 0 && step % *interval == 0 {
                action(step, context)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hooks_fire_on_their_own_cadence() {
        let mut fired: Vec<(u64, u64)> = Vec::new();
        let mut schedule: HookSchedule<Vec<(u64, u64)>> = HookSchedule::new();
        schedule.add(2, |step, log| {
            log.push((2, step));
            Ok(())
        });
        schedule.add(3, |step, log| {
            log.push((3, step));
            Ok(())
        });

        for step in 1..=6 {
            schedule.fire_due(step, &mut fired).unwrap();
        }
        assert_eq!(fired, vec![(2, 2), (3, 3), (2, 4), (2, 6), (3, 6)]);
    }

    #[test]
    fn non_positive_intervals_are_never_registered() {
        let mut schedule: HookSchedule<()> = HookSchedule::new();
        schedule.add(0, |_, _| panic!("must not fire"));
        schedule.add(-1, |_, _| panic!("must not fire"));
        assert!(schedule.is_empty());
        schedule.fire_due(100, &mut ()).unwrap();
    }

    #[test]
    fn hook_errors_propagate() {
        let mut schedule: HookSchedule<()> = HookSchedule::new();
        schedule.add(1, |_, _| {
            Err(HarnessError::CheckpointMismatch("boom".to_string()))
        });
        assert!(schedule.fire_due(1, &mut ()).is_err());
    }
}
