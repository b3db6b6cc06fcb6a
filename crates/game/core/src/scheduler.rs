//! Deadline-ordered task queue on the combat clock.
//!
//! Tasks are keyed by a monotonically increasing sequence number so that two
//! tasks due on the same tick run in the order they were scheduled. Cancelled
//! tasks are dropped from the lookup map and skipped lazily when they surface
//! from the heap.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::spell::CastStep;
use crate::state::{RelicId, Tick};

/// Who a task belongs to; cancelling an owner drops all of its tasks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskOwner {
    Caster,
    Relic(RelicId),
}

/// Work the engine runs when a task comes due.
#[derive(Clone, Debug, PartialEq)]
pub enum Task {
    RegenerateMana,
    PollStandStill(RelicId),
    DeferredCast {
        spell_name: String,
        steps: Vec<CastStep>,
    },
}

#[derive(Clone, Debug)]
struct Entry {
    owner: TaskOwner,
    task: Task,
    /// Repeat interval in milliseconds; `None` for one-shot tasks.
    period: Option<u64>,
}

/// A task popped from the queue.
#[derive(Clone, Debug, PartialEq)]
pub struct DueTask {
    pub at: Tick,
    pub owner: TaskOwner,
    pub task: Task,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<(Tick, u64)>>,
    entries: HashMap<u64, Entry>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_once(&mut self, at: Tick, owner: TaskOwner, task: Task) {
        self.insert(at, Entry {
            owner,
            task,
            period: None,
        });
    }

    /// Runs `task` every `period_ms`, first at `now + period_ms`.
    ///
    /// A zero period is treated as one millisecond.
    pub fn schedule_every(&mut self, now: Tick, period_ms: u64, owner: TaskOwner, task: Task) {
        let period = period_ms.max(1);
        self.insert(now + period, Entry {
            owner,
            task,
            period: Some(period),
        });
    }

    fn insert(&mut self, at: Tick, entry: Entry) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse((at, seq)));
        self.entries.insert(seq, entry);
    }

    /// Pops the earliest task due at or before `now`.
    ///
    /// Periodic tasks are re-queued one period after the deadline they just met.
    pub fn pop_due(&mut self, now: Tick) -> Option<DueTask> {
        while let Some(Reverse((at, seq))) = self.queue.peek().copied() {
            if at > now {
                return None;
            }
            self.queue.pop();
            let Some(entry) = self.entries.remove(&seq) else {
                continue;
            };
            let due = DueTask {
                at,
                owner: entry.owner,
                task: entry.task.clone(),
            };
            if let Some(period) = entry.period {
                self.insert(at + period, entry);
            }
            return Some(due);
        }
        None
    }

    /// Drops every task belonging to `owner`. Returns how many were dropped.
    pub fn cancel_owner(&mut self, owner: TaskOwner) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.owner != owner);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.entries.clear();
    }

    pub fn next_due(&self) -> Option<Tick> {
        self.queue
            .iter()
            .filter(|Reverse((_, seq))| self.entries.contains_key(seq))
            .map(|Reverse((at, _))| *at)
            .min()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
