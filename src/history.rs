//! Append-only conversation and trace logs.
//!
//! Both logs only grow.  Readers always get a snapshot of everything appended
//! so far; an append that is still pending is either wholly visible or not at
//! all.

use std::sync::{Mutex, MutexGuard};

use crate::types::{TraceEntry, Turn, TurnId};

/// An ordered, append-only sequence.
#[derive(Debug)]
struct AppendLog<T> {
    entries: Mutex<Vec<T>>,
}

impl<T: Clone> AppendLog<T> {
    fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    // Appends never panic while holding the lock, so a poisoned lock still
    // guards a consistent vector.
    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn append(&self, entry: T) -> usize {
        let mut entries = self.lock();
        entries.push(entry);
        entries.len()
    }

    fn all(&self) -> Vec<T> {
        self.lock().clone()
    }

    fn len(&self) -> usize {
        self.lock().len()
    }

    fn get(&self, index: usize) -> Option<T> {
        self.lock().get(index).cloned()
    }
}

/// The ordered record of user and agent turns.
#[derive(Debug)]
pub struct ConversationLog {
    turns: AppendLog<Turn>,
}

impl ConversationLog {
    /// Creates an empty conversation log.
    pub fn new() -> Self {
        Self {
            turns: AppendLog::new(),
        }
    }

    /// Appends a turn and returns the new length of the log.
    pub fn append(&self, turn: Turn) -> usize {
        self.turns.append(turn)
    }

    /// Returns a snapshot of every turn appended so far.
    pub fn all(&self) -> Vec<Turn> {
        self.turns.all()
    }

    /// Returns the number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns true if no turn has been appended.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the turn at `index`, if any.
    pub fn get(&self, index: usize) -> Option<Turn> {
        self.turns.get(index)
    }

    /// Returns the number of agent turns.
    pub fn agent_turns(&self) -> usize {
        self.turns.lock().iter().filter(|t| t.is_agent()).count()
    }

    /// Returns the 1-based position of an agent turn among all agent turns.
    ///
    /// This is the index shown next to each agent reply, and it matches the
    /// position of the turn's [`TraceEntry`](crate::TraceEntry) in the
    /// [`TraceLog`] plus one.
    pub fn agent_index(&self, id: TurnId) -> Option<usize> {
        self.turns
            .lock()
            .iter()
            .filter(|t| t.is_agent())
            .position(|t| t.id == id)
            .map(|p| p + 1)
    }
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new()
    }
}

/// The ordered record of the agent's reasoning, one entry per agent turn.
#[derive(Debug)]
pub struct TraceLog {
    entries: AppendLog<TraceEntry>,
}

impl TraceLog {
    /// Creates an empty trace log.
    pub fn new() -> Self {
        Self {
            entries: AppendLog::new(),
        }
    }

    /// Appends an entry and returns the new length of the log.
    pub fn append(&self, entry: TraceEntry) -> usize {
        self.entries.append(entry)
    }

    /// Returns a snapshot of every entry appended so far.
    pub fn all(&self) -> Vec<TraceEntry> {
        self.entries.all()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entry has been appended.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the entry at `index`, if any.
    pub fn get(&self, index: usize) -> Option<TraceEntry> {
        self.entries.get(index)
    }
}

impl Default for TraceLog {
    fn default() -> Self {
        Self::new()
    }
}
