//! Deferred task scheduling
//!
//! Replaces timed coroutines ("wait N seconds, then...") with plain data.
//! A task is any value; the owner schedules it with a delay and collects the
//! due ones each tick, then handles them itself. Nothing here is cancellable.

/// A task waiting for its delay to elapse
#[derive(Debug, Clone)]
struct Scheduled<T> {
    due: f64,
    seq: u64,
    task: T,
}

/// Time-ordered queue of deferred tasks
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: f64,
    next_seq: u64,
    pending: Vec<Scheduled<T>>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_seq: 0,
            pending: Vec::new(),
        }
    }

    /// Queue `task` to become due after `delay` seconds
    pub fn schedule(&mut self, delay: f32, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Scheduled {
            due: self.now + f64::from(delay.max(0.0)),
            seq,
            task,
        });
    }

    /// Advance the clock and return every task that became due, in the
    /// order the tasks were scheduled.
    pub fn advance(&mut self, dt: f32) -> Vec<T> {
        self.now += f64::from(dt.max(0.0));
        let now = self.now;

        let (mut due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|s| s.due <= now);
        self.pending = waiting;

        due.sort_by_key(|s| s.seq);
        due.into_iter().map(|s| s.task).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_not_due_before_delay() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(1.0, "rearm");

        assert!(scheduler.advance(0.5).is_empty());
        assert_eq!(scheduler.advance(0.5), vec!["rearm"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_due_tasks_come_out_in_registration_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(0.3, 1);
        scheduler.schedule(0.1, 2);
        scheduler.schedule(0.2, 3);

        assert_eq!(scheduler.advance(1.0), vec![1, 2, 3]);
    }

    #[test]
    fn test_zero_delay_is_due_on_next_advance() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(0.0, 'x');
        assert_eq!(scheduler.advance(0.0), vec!['x']);
    }

    #[test]
    fn test_negative_delay_treated_as_zero() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(-5.0, 7);
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.advance(0.0), vec![7]);
    }
}
