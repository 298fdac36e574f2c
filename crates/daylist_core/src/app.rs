use crate::effects::{Effect, EffectScheduler};
use crate::error::AppError;
use crate::model::{Section, Statistics, Task};
use crate::storage::KeyValueStore;
use crate::store::{LoadReport, TaskStore};
use crate::view::{self, Board};
use std::time::{Duration, Instant};
use tracing::debug;

/// A user action delivered by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Load,
    AddTask { text: String, section: Section },
    Toggle(i64),
    Delete(i64),
    SaveNotes(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Loaded(LoadReport),
    Added(Task),
    Toggled(Task),
    Deleted(Vec<Task>),
    NotesSaved,
    /// The action matched nothing (blank text, unknown id).
    Unchanged,
    Reverted(Vec<Effect>),
}

/// Everything a subscriber needs to redraw after one action.
#[derive(Debug, Clone)]
pub struct Frame {
    pub outcome: Outcome,
    pub board: Board,
    pub statistics: Statistics,
    pub notes: String,
    /// Effects triggered by this action, including ones with no revert.
    pub fired: Vec<Effect>,
    /// Effects still waiting for their revert.
    pub active: Vec<Effect>,
}

type Subscriber = Box<dyn FnMut(&Frame)>;

pub struct App<S> {
    store: TaskStore<S>,
    effects: EffectScheduler,
    subscribers: Vec<Subscriber>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(store: TaskStore<S>) -> Self {
        Self {
            store,
            effects: EffectScheduler::new(),
            subscribers: Vec::new(),
        }
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn effects(&self) -> &EffectScheduler {
        &self.effects
    }

    pub fn subscribe<F>(&mut self, subscriber: F)
    where
        F: FnMut(&Frame) + 'static,
    {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn dispatch(&mut self, action: Action, now: Instant) -> Result<Frame, AppError> {
        debug!(?action, "dispatch");
        let (outcome, fired) = match action {
            Action::Load => (Outcome::Loaded(self.store.load()?), Vec::new()),
            Action::AddTask { text, section } => match self.store.add_task(&text, section)? {
                Some(task) => (Outcome::Added(task), vec![Effect::ClearInput(section)]),
                None => (Outcome::Unchanged, Vec::new()),
            },
            Action::Toggle(id) => match self.store.toggle_task(id)? {
                Some(task) => (Outcome::Toggled(task), vec![Effect::ProgressPulse]),
                None => (Outcome::Unchanged, Vec::new()),
            },
            Action::Delete(id) => {
                let removed = self.store.delete_task(id)?;
                if removed.is_empty() {
                    (Outcome::Unchanged, Vec::new())
                } else {
                    (Outcome::Deleted(removed), Vec::new())
                }
            }
            Action::SaveNotes(value) => {
                self.store.save_notes(&value)?;
                (Outcome::NotesSaved, vec![Effect::NotesSaved])
            }
        };

        for effect in &fired {
            if effect.duration() > Duration::ZERO {
                self.effects.schedule(*effect, now);
            }
        }

        let frame = self.frame(outcome, fired);
        self.publish(&frame);
        Ok(frame)
    }

    /// Reverts due effects. Returns a frame only when something reverted.
    pub fn tick(&mut self, now: Instant) -> Option<Frame> {
        let reverted = self.effects.poll(now);
        if reverted.is_empty() {
            return None;
        }

        let frame = self.frame(Outcome::Reverted(reverted), Vec::new());
        self.publish(&frame);
        Some(frame)
    }

    pub fn snapshot(&self) -> Frame {
        self.frame(Outcome::Unchanged, Vec::new())
    }

    fn frame(&self, outcome: Outcome, fired: Vec<Effect>) -> Frame {
        Frame {
            outcome,
            board: view::render(&self.store),
            statistics: self.store.statistics(),
            notes: self.store.notes().to_string(),
            fired,
            active: self.effects.active(),
        }
    }

    fn publish(&mut self, frame: &Frame) {
        for subscriber in &mut self.subscribers {
            subscriber(frame);
        }
    }
}
