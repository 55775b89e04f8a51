use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug)]
struct Scheduled<T> {
    id: TaskId,
    due: Instant,
    task: T,
}

/// Deferred tasks keyed by due time. Tasks come out in non-decreasing due
/// order, ties in scheduling order. Nothing runs on its own: the owner calls
/// [`Scheduler::drain_due`] from its tick.
#[derive(Debug)]
pub struct Scheduler<T> {
    tasks: Vec<Scheduled<T>>,
    next_id: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 0,
        }
    }

    pub fn schedule(&mut self, now: Instant, delay: Duration, task: T) -> TaskId {
        self.schedule_at(now + delay, task)
    }

    pub fn schedule_at(&mut self, due: Instant, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        // Insert after every task due at or before `due` so equal deadlines
        // keep FIFO order.
        let idx = self.tasks.partition_point(|t| t.due <= due);
        self.tasks.insert(idx, Scheduled { id, due, task });
        id
    }

    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Drop every pending task. Returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.tasks.len();
        self.tasks.clear();
        n
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.tasks.first().map(|t| t.due)
    }

    /// Remove and return every task due at or before `now`, in firing order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<T> {
        let split = self.tasks.partition_point(|t| t.due <= now);
        self.tasks.drain(..split).map(|t| t.task).collect()
    }
}
