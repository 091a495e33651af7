use crate::timers::Timers;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Shortest period an interval is rescheduled with, so a zero period cannot stall time.
const MIN_PERIOD: Duration = Duration::from_millis(1);

enum Kind {
    Once(Box<dyn FnOnce()>),
    Every(Duration, Box<dyn FnMut()>),
}

struct Task {
    due: Duration,
    seq: u64,
    kind: Kind,
}

#[derive(Default)]
struct Queue {
    now: Duration,
    next_seq: u64,
    tasks: Vec<Task>,
}

impl Queue {
    fn push(&mut self, due: Duration, kind: Kind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.push(Task { due, seq, kind });
    }
}

/// Deterministic timer service.  Clones share one queue and one clock.
#[derive(Clone, Default)]
pub struct VirtualTimers {
    queue: Rc<RefCell<Queue>>,
}

impl VirtualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.queue.borrow().now
    }

    pub(crate) fn set_now(&self, now: Duration) {
        let mut q = self.queue.borrow_mut();
        if now > q.now {
            q.now = now;
        }
    }

    /// Scheduled one-shot callbacks.
    pub fn timeouts(&self) -> usize {
        self.count(|k| matches!(k, Kind::Once(_)))
    }

    /// Registered repeating callbacks.
    pub fn intervals(&self) -> usize {
        self.count(|k| matches!(k, Kind::Every(..)))
    }

    fn count(&self, f: impl Fn(&Kind) -> bool) -> usize {
        self.queue.borrow().tasks.iter().filter(|t| f(&t.kind)).count()
    }

    /// Runs the earliest task due at or before `limit`.  Ties run in scheduling order.
    ///
    /// Returns `false` when nothing is due.
    pub fn run_next(&self, limit: Duration) -> bool {
        let task = {
            let mut q = self.queue.borrow_mut();
            let next = q
                .tasks
                .iter()
                .enumerate()
                .filter(|(_, t)| t.due <= limit)
                .min_by_key(|(_, t)| (t.due, t.seq))
                .map(|(i, _)| i);
            let Some(index) = next else {
                return false;
            };
            let task = q.tasks.swap_remove(index);
            if task.due > q.now {
                q.now = task.due;
            }
            task
        };
        match task.kind {
            Kind::Once(callback) => callback(),
            Kind::Every(period, mut callback) => {
                callback();
                let mut q = self.queue.borrow_mut();
                let due = task.due + period.max(MIN_PERIOD);
                q.push(due, Kind::Every(period, callback));
            }
        }
        true
    }

    /// Moves the clock forward by `by`, running everything that falls due.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;
        while self.run_next(target) {}
        self.set_now(target);
    }
}

impl Timers for VirtualTimers {
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) {
        let mut q = self.queue.borrow_mut();
        let due = q.now + delay;
        q.push(due, Kind::Once(callback));
    }

    fn set_interval(&self, period: Duration, callback: Box<dyn FnMut()>) {
        let mut q = self.queue.borrow_mut();
        let due = q.now + period.max(MIN_PERIOD);
        q.push(due, Kind::Every(period, callback));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_in_due_then_schedule_order() {
        let timers = VirtualTimers::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (name, ms) in [("b", 20u64), ("a", 10), ("c", 20)] {
            let log = Rc::clone(&log);
            let record = move || log.borrow_mut().push(name);
            timers.set_timeout(Duration::from_millis(ms), Box::new(record));
        }
        timers.advance(Duration::from_millis(15));
        assert_eq!(*log.borrow(), vec!["a"]);
        timers.advance(Duration::from_millis(5));
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(timers.timeouts(), 0);
    }

    #[test]
    fn intervals_repeat_and_callbacks_may_schedule() {
        let timers = VirtualTimers::new();
        let ticks = Rc::new(RefCell::new(0));
        let inner = timers.clone();
        let t = Rc::clone(&ticks);
        timers.set_interval(
            Duration::from_millis(100),
            Box::new(move || {
                *t.borrow_mut() += 1;
                inner.set_timeout(Duration::ZERO, Box::new(|| {}));
            }),
        );
        timers.advance(Duration::from_millis(350));
        assert_eq!(*ticks.borrow(), 3);
        assert_eq!(timers.intervals(), 1);
        assert_eq!(timers.timeouts(), 0);
        assert_eq!(timers.now(), Duration::from_millis(350));
    }
}
