use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Elapsed play time, measured in whole seconds between a start and an
/// optional stop instant.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElapsedClock {
    started_at: Option<DateTime<Utc>>,
    stopped_at: Option<DateTime<Utc>>,
}

impl ElapsedClock {
    /// Starts counting from zero, discarding any previous run.
    pub fn restart(&mut self, now: DateTime<Utc>) {
        self.started_at = Some(now);
        self.stopped_at = None;
    }

    /// Freezes the elapsed time. Does nothing unless running.
    pub fn stop(&mut self, now: DateTime<Utc>) {
        if self.is_running() {
            self.stopped_at = Some(now);
        }
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.stopped_at.is_none()
    }

    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u32 {
        if let Some(started_at) = self.started_at {
            (self.stopped_at.unwrap_or(now) - started_at)
                .num_seconds()
                .max(0) as u32
        } else {
            0
        }
    }
}

/// What the view must do with its elapsed-time ticker.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimerCommand {
    Restart,
    Stop,
}

/// Holds at most one live repeating-timer handle.
///
/// Handles are expected to cancel themselves on drop (as `gloo` intervals do),
/// so replacing or clearing the slot is what stops the old timer.
#[derive(Debug)]
pub struct TimerSlot<H> {
    handle: Option<H>,
}

impl<H> TimerSlot<H> {
    pub const fn empty() -> Self {
        Self { handle: None }
    }

    /// Clears the current timer before creating its replacement.
    pub fn start_with(&mut self, create: impl FnOnce() -> H) {
        self.handle = None;
        self.handle = Some(create());
    }

    /// Clears the current timer, returning whether one was running.
    pub fn cancel(&mut self) -> bool {
        self.handle.take().is_some()
    }

    /// Carries out a controller's timer command. `create` is only called on
    /// restart. Returns whether a timer is live afterwards.
    pub fn apply(&mut self, command: TimerCommand, create: impl FnOnce() -> H) -> bool {
        match command {
            TimerCommand::Restart => {
                self.start_with(create);
                true
            }
            TimerCommand::Stop => {
                if self.cancel() {
                    log::debug!("timer stopped");
                }
                false
            }
        }
    }
}

impl<H> Default for TimerSlot<H> {
    fn default() -> Self {
        Self::empty()
    }
}
