//! Transient, cosmetic UI state with revert deadlines.
//!
//! Effects never read or write tasks or notes. The session loop decides
//! what "now" is and polls for reverts.

use crate::model::Section;
use std::time::{Duration, Instant};

pub const PROGRESS_PULSE: Duration = Duration::from_millis(1000);
pub const NOTES_SAVED: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    /// The input field for a section should be emptied. Has no revert.
    ClearInput(Section),
    ProgressPulse,
    NotesSaved,
}

impl Effect {
    pub fn duration(self) -> Duration {
        match self {
            Self::ClearInput(_) => Duration::ZERO,
            Self::ProgressPulse => PROGRESS_PULSE,
            Self::NotesSaved => NOTES_SAVED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectHandle(u64);

#[derive(Debug)]
struct Scheduled {
    handle: EffectHandle,
    effect: Effect,
    revert_at: Instant,
}

#[derive(Debug, Default)]
pub struct EffectScheduler {
    next_handle: u64,
    pending: Vec<Scheduled>,
}

impl EffectScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, effect: Effect, now: Instant) -> EffectHandle {
        let handle = EffectHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.push(Scheduled {
            handle,
            effect,
            revert_at: now + effect.duration(),
        });
        handle
    }

    /// Drops a scheduled effect. Returns false if it already reverted.
    pub fn cancel(&mut self, handle: EffectHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|scheduled| scheduled.handle != handle);
        self.pending.len() != before
    }

    pub fn is_active(&self, effect: Effect) -> bool {
        self.pending
            .iter()
            .any(|scheduled| scheduled.effect == effect)
    }

    pub fn active(&self) -> Vec<Effect> {
        let mut effects: Vec<Effect> = Vec::new();
        for scheduled in &self.pending {
            if !effects.contains(&scheduled.effect) {
                effects.push(scheduled.effect);
            }
        }
        effects
    }

    /// Removes and returns every effect whose revert time has passed.
    pub fn poll(&mut self, now: Instant) -> Vec<Effect> {
        let mut due = Vec::new();
        self.pending.retain(|scheduled| {
            if scheduled.revert_at <= now {
                due.push(scheduled.effect);
                false
            } else {
                true
            }
        });
        due
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|scheduled| scheduled.revert_at).min()
    }
}
