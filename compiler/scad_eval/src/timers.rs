//! Named stopwatch timers for diagnostic builtins.
//!
//! Each timer accumulates elapsed time across start/stop pairs. Ids are
//! never reused within a session.

use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

/// Opaque timer id handed out by [`TimerRegistry::create`].
pub type TimerId = u64;

/// Timer API misuse.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    #[error("timer {0} does not exist")]
    UnknownId(TimerId),
    #[error("timer {0} is already running")]
    AlreadyRunning(TimerId),
    #[error("timer {0} is not running")]
    NotRunning(TimerId),
}

#[derive(Default)]
struct Timer {
    accumulated: Duration,
    started: Option<Instant>,
}

impl Timer {
    fn elapsed(&self) -> Duration {
        match self.started {
            Some(start) => self.accumulated + start.elapsed(),
            None => self.accumulated,
        }
    }
}

/// All timers of one session.
#[derive(Default)]
pub struct TimerRegistry {
    timers: FxHashMap<TimerId, Timer>,
    next_id: TimerId,
}

impl TimerRegistry {
    pub fn new() -> Self {
        TimerRegistry::default()
    }

    /// Create a stopped timer with zero elapsed time.
    pub fn create(&mut self) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.timers.insert(id, Timer::default());
        id
    }

    fn get_mut(&mut self, id: TimerId) -> Result<&mut Timer, TimerError> {
        self.timers.get_mut(&id).ok_or(TimerError::UnknownId(id))
    }

    pub fn start(&mut self, id: TimerId) -> Result<(), TimerError> {
        let timer = self.get_mut(id)?;
        if timer.started.is_some() {
            return Err(TimerError::AlreadyRunning(id));
        }
        timer.started = Some(Instant::now());
        Ok(())
    }

    pub fn stop(&mut self, id: TimerId) -> Result<(), TimerError> {
        let timer = self.get_mut(id)?;
        let Some(start) = timer.started.take() else {
            return Err(TimerError::NotRunning(id));
        };
        timer.accumulated += start.elapsed();
        Ok(())
    }

    /// Reset accumulated time and stop the timer.
    pub fn clear(&mut self, id: TimerId) -> Result<(), TimerError> {
        let timer = self.get_mut(id)?;
        *timer = Timer::default();
        Ok(())
    }

    /// Accumulated time, including the current interval of a running timer.
    pub fn elapsed(&self, id: TimerId) -> Result<Duration, TimerError> {
        self.timers
            .get(&id)
            .map(Timer::elapsed)
            .ok_or(TimerError::UnknownId(id))
    }

    pub fn delete(&mut self, id: TimerId) -> Result<(), TimerError> {
        self.timers
            .remove(&id)
            .map(|_| ())
            .ok_or(TimerError::UnknownId(id))
    }

    pub fn is_running(&self, id: TimerId) -> bool {
        self.timers.get(&id).is_some_and(|t| t.started.is_some())
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
