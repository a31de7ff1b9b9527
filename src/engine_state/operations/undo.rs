//! # Undo History
//!
//! Every finished edit leaves one [`UndoRecord`] holding the state each
//! changed position had before the edit. Records are kept per actor in a
//! bounded [`UndoHistory`]; once it is full, pushing a new record evicts the
//! oldest one.

use std::collections::{hash_map, HashMap, VecDeque};

use web_time::{SystemTime, UNIX_EPOCH};

use crate::engine_state::voxels::block::BlockState;
use crate::engine_state::voxels::grid::{Position, WorldId};
use crate::engine_state::ActorId;

/// Prior block states captured by a single edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UndoRecord {
    actor: ActorId,
    world: WorldId,
    timestamp_millis: u64,
    captured: HashMap<Position, BlockState>,
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

impl UndoRecord {
    /// Starts an empty record stamped with the current time.
    pub fn new(actor: ActorId, world: WorldId) -> Self {
        UndoRecord {
            actor,
            world,
            timestamp_millis: now_millis(),
            captured: HashMap::new(),
        }
    }

    /// Remembers `prior` as the state of `pos` before the edit.
    ///
    /// The first capture for a position wins: it is the state the position
    /// had before this edit touched it.
    pub fn capture(&mut self, pos: Position, prior: BlockState) {
        self.captured.entry(pos).or_insert(prior);
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub fn world(&self) -> WorldId {
        self.world
    }

    /// Milliseconds since the Unix epoch at which the edit started.
    pub fn timestamp_millis(&self) -> u64 {
        self.timestamp_millis
    }

    pub fn prior_state(&self, pos: Position) -> Option<BlockState> {
        self.captured.get(&pos).copied()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, Position, BlockState> {
        self.captured.iter()
    }

    pub fn len(&self) -> usize {
        self.captured.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captured.is_empty()
    }
}

impl IntoIterator for UndoRecord {
    type Item = (Position, BlockState);
    type IntoIter = hash_map::IntoIter<Position, BlockState>;

    fn into_iter(self) -> Self::IntoIter {
        self.captured.into_iter()
    }
}

/// A bounded stack of undo records, most recent on top.
#[derive(Debug)]
pub struct UndoHistory {
    records: VecDeque<UndoRecord>,
    capacity: usize,
}

impl UndoHistory {
    /// Creates a history holding at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        UndoHistory {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Pushes a record, evicting the oldest ones to stay within capacity.
    pub fn push(&mut self, record: UndoRecord) {
        if self.capacity == 0 {
            return;
        }
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Takes the most recent record.
    pub fn pop(&mut self) -> Option<UndoRecord> {
        self.records.pop_back()
    }

    pub fn peek(&self) -> Option<&UndoRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
