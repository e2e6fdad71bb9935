//! Timer heap for virtual-time wakeups.
//!
//! This module provides a small min-heap of `(deadline, task)` pairs. The
//! scheduler releases expired entries whenever virtual time moves, and
//! peeks the earliest deadline to decide how far `advance_until_idle`
//! should jump.

use crate::types::{TaskId, Time};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Eq, PartialEq)]
struct TimerEntry {
    deadline: Time,
    task: TaskId,
    generation: u64,
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (earliest deadline first).
        // Generation breaks ties by insertion order, which keeps
        // equal-deadline wakeups deterministic.
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.generation.cmp(&self.generation))
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A min-heap of timers ordered by deadline, then insertion order.
#[derive(Debug, Default)]
pub(crate) struct TimerHeap {
    heap: BinaryHeap<TimerEntry>,
    next_generation: u64,
}

impl TimerHeap {
    /// Creates a new empty timer heap.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the number of timers in the heap.
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if the heap is empty.
    #[must_use]
    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Adds a timer for a task with the given deadline.
    pub(crate) fn insert(&mut self, task: TaskId, deadline: Time) {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.heap.push(TimerEntry {
            deadline,
            task,
            generation,
        });
    }

    /// Returns the earliest deadline, if any.
    #[must_use]
    pub(crate) fn peek_deadline(&self) -> Option<Time> {
        self.heap.peek().map(|e| e.deadline)
    }

    /// Returns the earliest entry's task and deadline without removing it.
    #[must_use]
    pub(crate) fn peek(&self) -> Option<(TaskId, Time)> {
        self.heap.peek().map(|e| (e.task, e.deadline))
    }

    /// Pops the earliest timer entry, returning its task and deadline.
    pub(crate) fn pop(&mut self) -> Option<(TaskId, Time)> {
        self.heap.pop().map(|e| (e.task, e.deadline))
    }

    /// Pops all tasks whose deadline is `<= now`, in deadline order.
    pub(crate) fn pop_expired(&mut self, now: Time) -> Vec<TaskId> {
        let mut expired = Vec::new();
        while let Some(entry) = self.heap.peek() {
            if entry.deadline > now {
                break;
            }
            if let Some(entry) = self.heap.pop() {
                expired.push(entry.task);
            }
        }
        expired
    }
}
