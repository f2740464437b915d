use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Timed tasks driven by an externally supplied clock.
///
/// Cancelled tasks are removed from the payload map and their heap entries
/// are skipped when they surface. Tasks sharing a deadline fire in the order
/// they were scheduled.
#[derive(Debug)]
pub struct Scheduler<T> {
    heap: BinaryHeap<Reverse<(Instant, TaskId)>>,
    tasks: HashMap<TaskId, T>,
    next_id: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            tasks: HashMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn schedule(&mut self, deadline: Instant, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.heap.push(Reverse((deadline, id)));
        self.tasks.insert(id, task);
        id
    }

    /// Returns `false` when the task already fired or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.tasks.remove(&id).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
        self.heap.clear();
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn next_deadline(&mut self) -> Option<Instant> {
        self.discard_cancelled_head();
        self.heap.peek().map(|Reverse((deadline, _))| *deadline)
    }

    /// Removes and returns every task whose deadline is at or before `now`,
    /// earliest first.
    pub fn drain_due(&mut self, now: Instant) -> Vec<(TaskId, T)> {
        let mut due = Vec::new();
        while let Some(Reverse((deadline, id))) = self.heap.peek().copied() {
            if deadline > now {
                break;
            }
            self.heap.pop();
            if let Some(task) = self.tasks.remove(&id) {
                due.push((id, task));
            }
        }
        due
    }

    fn discard_cancelled_head(&mut self) {
        while let Some(Reverse((_, id))) = self.heap.peek() {
            if self.tasks.contains_key(id) {
                break;
            }
            self.heap.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn tasks_fire_in_deadline_then_schedule_order() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::default();
        scheduler.schedule(t0 + ms(20), "late");
        scheduler.schedule(t0 + ms(10), "first");
        scheduler.schedule(t0 + ms(10), "second");

        assert!(scheduler.drain_due(t0 + ms(5)).is_empty());
        let fired: Vec<_> = scheduler
            .drain_due(t0 + ms(20))
            .into_iter()
            .map(|(_, t)| t)
            .collect();
        assert_eq!(fired, vec!["first", "second", "late"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn cancelled_task_never_fires() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::default();
        let keep = scheduler.schedule(t0 + ms(10), 1);
        let drop = scheduler.schedule(t0 + ms(5), 2);

        assert!(scheduler.cancel(drop));
        assert!(!scheduler.cancel(drop));
        assert_eq!(scheduler.next_deadline(), Some(t0 + ms(10)));

        let fired = scheduler.drain_due(t0 + ms(100));
        assert_eq!(fired, vec![(keep, 1)]);
        assert!(!scheduler.is_pending(keep));
    }

    #[test]
    fn cancel_all_empties_queue() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::default();
        scheduler.schedule(t0, ());
        scheduler.schedule(t0 + ms(1), ());
        scheduler.cancel_all();
        assert_eq!(scheduler.len(), 0);
        assert_eq!(scheduler.next_deadline(), None);
        assert!(scheduler.drain_due(t0 + ms(10)).is_empty());
    }

    #[test]
    fn ids_are_not_reused_after_cancel_all() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::default();
        let first = scheduler.schedule(t0, ());
        scheduler.cancel_all();
        let second = scheduler.schedule(t0, ());
        assert_ne!(first, second);
        assert!(!scheduler.cancel(first));
    }
}
