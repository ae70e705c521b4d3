//! Timer service used by time-shifting combinators.
//!
//! [`Scheduler`] is the host contract; [`EventLoop`] is a deterministic
//! single-threaded host with a virtual clock, suitable both for embedding
//! and for tests.
use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Deferred callback.
pub type Task = Box<dyn FnOnce()>;

/// Identifies a scheduled task so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Runs callbacks after a delay.
pub trait Scheduler {
    /// Runs `task` once `after` has elapsed. Tasks with equal deadlines run
    /// in the order they were scheduled.
    fn schedule(&self, after: Duration, task: Task) -> TimerHandle;

    /// Discards a task that has not run yet. Unknown handles are ignored.
    fn cancel(&self, handle: TimerHandle);
}

#[derive(Default)]
struct Timers {
    now: Duration,
    next_id: u64,
    deadlines: BinaryHeap<Reverse<(Duration, u64)>>,
    tasks: HashMap<u64, Task>,
}

/// Virtual-time event loop.
///
/// Nothing runs until the loop is turned; time only advances to the
/// deadline of the task being run. Clones share the same loop.
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use std::time::Duration;
///
/// use reducers::{EventLoop, Scheduler};
///
/// let event_loop = EventLoop::new();
/// let fired = Rc::new(Cell::new(false));
/// let flag = fired.clone();
/// event_loop.schedule(Duration::from_millis(10), Box::new(move || flag.set(true)));
/// assert!(!fired.get());
/// assert_eq!(event_loop.run(), 1);
/// assert!(fired.get());
/// assert_eq!(event_loop.now(), Duration::from_millis(10));
/// ```
#[derive(Clone, Default)]
pub struct EventLoop {
    timers: Rc<RefCell<Timers>>,
}

impl EventLoop {
    /// A loop at time zero with nothing scheduled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.timers.borrow().now
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.timers.borrow().tasks.len()
    }

    /// `true` when no task is waiting.
    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Runs the next due task, if any. Returns `false` when there was
    /// nothing to run.
    pub fn turn(&self) -> bool {
        self.turn_until(None)
    }

    fn turn_until(&self, limit: Option<Duration>) -> bool {
        let task = {
            let mut timers = self.timers.borrow_mut();
            loop {
                let Some(&Reverse((deadline, id))) = timers.deadlines.peek() else {
                    return false;
                };
                if limit.is_some_and(|limit| deadline > limit) {
                    return false;
                }
                timers.deadlines.pop();
                // Cancelled tasks leave their deadline behind.
                if let Some(task) = timers.tasks.remove(&id) {
                    timers.now = deadline;
                    tracing::trace!(id, at = ?deadline, "running timer");
                    break task;
                }
            }
        };
        task();
        true
    }

    /// Runs tasks until none are left, including tasks scheduled while
    /// running. Returns how many ran.
    pub fn run(&self) -> usize {
        let mut count = 0;
        while self.turn() {
            count += 1;
        }
        count
    }

    /// Runs every task due within `span` from now, then advances the
    /// clock to the end of the span.
    pub fn run_for(&self, span: Duration) -> usize {
        let limit = self.now() + span;
        let mut count = 0;
        while self.turn_until(Some(limit)) {
            count += 1;
        }
        self.timers.borrow_mut().now = limit;
        count
    }
}

impl Scheduler for EventLoop {
    fn schedule(&self, after: Duration, task: Task) -> TimerHandle {
        let mut timers = self.timers.borrow_mut();
        let id = timers.next_id;
        timers.next_id += 1;
        let deadline = timers.now + after;
        timers.deadlines.push(Reverse((deadline, id)));
        timers.tasks.insert(id, task);
        TimerHandle(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        if self.timers.borrow_mut().tasks.remove(&handle.0).is_some() {
            tracing::trace!(id = handle.0, "cancelled timer");
        }
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timers = self.timers.borrow();
        f.debug_struct("EventLoop")
            .field("now", &timers.now)
            .field("pending", &timers.tasks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn push(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> Task {
        let log = log.clone();
        Box::new(move || log.borrow_mut().push(name))
    }

    #[test]
    fn runs_by_deadline_then_insertion() {
        let event_loop = EventLoop::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        event_loop.schedule(ms(20), push(&log, "c"));
        event_loop.schedule(ms(10), push(&log, "a"));
        event_loop.schedule(ms(10), push(&log, "b"));
        assert_eq!(event_loop.run(), 3);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(event_loop.now(), ms(20));
    }

    #[test]
    fn cancelled_tasks_never_run() {
        let event_loop = EventLoop::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let handle = event_loop.schedule(ms(5), push(&log, "a"));
        event_loop.schedule(ms(6), push(&log, "b"));
        event_loop.cancel(handle);
        assert_eq!(event_loop.pending(), 1);
        event_loop.run();
        assert_eq!(*log.borrow(), vec!["b"]);
    }

    #[test]
    fn tasks_scheduled_while_running_are_relative_to_their_deadline() {
        let event_loop = EventLoop::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let inner = event_loop.clone();
        let nested = log.clone();
        event_loop.schedule(
            ms(10),
            Box::new(move || {
                nested.borrow_mut().push("outer");
                inner.schedule(ms(10), push(&nested, "inner"));
            }),
        );
        event_loop.schedule(ms(15), push(&log, "middle"));
        event_loop.run();
        assert_eq!(*log.borrow(), vec!["outer", "middle", "inner"]);
        assert_eq!(event_loop.now(), ms(20));
    }

    #[test]
    fn run_for_stops_at_the_limit() {
        let event_loop = EventLoop::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        event_loop.schedule(ms(5), push(&log, "a"));
        event_loop.schedule(ms(15), push(&log, "b"));
        assert_eq!(event_loop.run_for(ms(10)), 1);
        assert_eq!(event_loop.now(), ms(10));
        assert_eq!(*log.borrow(), vec!["a"]);
        assert!(!event_loop.is_idle());
    }
}
