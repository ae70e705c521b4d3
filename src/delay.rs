//! Asynchronous re-emission of a source.
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::item::{Flow, Item};
use crate::scheduler::{Scheduler, TimerHandle};
use crate::source::{Next, Reducible, Source};

/// Smallest spacing between two re-emitted items. Host timers do not
/// reliably keep the order of callbacks closer than this.
pub const MIN_SPACING: Duration = Duration::from_millis(6);

/// Spacing used by [`Source::delay`].
pub const DEFAULT_SPACING: Duration = MIN_SPACING;

#[cfg(feature = "slice-deque")]
type Pending = slice_deque::SliceDeque<TimerHandle>;
#[cfg(not(feature = "slice-deque"))]
type Pending = std::collections::VecDeque<TimerHandle>;

struct Delay<T, E> {
    source: Source<T, E>,
    spacing: Duration,
    scheduler: Rc<dyn Scheduler>,
}

struct Delayed<T, E> {
    /// `None` once the downstream ended or stopped.
    next: Option<Next<T, E>>,
    pending: Pending,
}

fn deliver<T, E>(state: &RefCell<Delayed<T, E>>, scheduler: &dyn Scheduler, item: Item<T, E>) {
    let mut next = {
        let mut delayed = state.borrow_mut();
        delayed.pending.pop_front();
        match delayed.next.take() {
            Some(next) => next,
            None => return,
        }
    };
    let terminal = item.is_terminal();
    let flow = next(item);
    let mut delayed = state.borrow_mut();
    if terminal || flow.is_stop() {
        if !delayed.pending.is_empty() {
            tracing::debug!(pending = delayed.pending.len(), "cancelling delayed items");
        }
        while let Some(handle) = delayed.pending.pop_front() {
            scheduler.cancel(handle);
        }
    } else {
        delayed.next = Some(next);
    }
}

impl<T, E> Reducible<T, E> for Delay<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    fn reduce(&self, next: Next<T, E>) {
        let state = Rc::new(RefCell::new(Delayed { next: Some(next), pending: Pending::new() }));
        let scheduler = Rc::clone(&self.scheduler);
        let spacing = self.spacing;
        let mut offset = Duration::ZERO;
        self.source.drive(Box::new(move |item| {
            if state.borrow().next.is_none() {
                return Flow::Stop;
            }
            let target = Rc::clone(&state);
            let timers = Rc::clone(&scheduler);
            let handle = scheduler.schedule(
                offset,
                Box::new(move || deliver(&target, &*timers, item)),
            );
            state.borrow_mut().pending.push_back(handle);
            offset += spacing;
            Flow::Continue
        }));
    }
}

impl<T, E> Source<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    /// Re-emits this source through `scheduler`, [`DEFAULT_SPACING`]
    /// apart.
    pub fn delay<S>(self, scheduler: S) -> Source<T, E>
    where
        S: Scheduler + 'static,
    {
        self.delay_by(scheduler, DEFAULT_SPACING)
    }

    /// Re-emits this source through `scheduler`, the `k`-th item
    /// (counting from zero) `k * spacing` after the drive started. Spacing is floored at
    /// [`MIN_SPACING`].
    ///
    /// ```rust
    /// use std::time::Duration;
    ///
    /// use reducers::{into, EventLoop, Source};
    ///
    /// let event_loop = EventLoop::new();
    /// let delayed = Source::<i32>::from(vec![1, 2]).delay_by(event_loop.clone(), Duration::from_millis(10));
    /// let values = into(&delayed);
    /// assert!(values.is_pending());
    /// event_loop.run();
    /// assert_eq!(values.value(), Some(Ok(vec![1, 2])));
    /// assert_eq!(event_loop.now(), Duration::from_millis(20));
    /// ```
    pub fn delay_by<S>(self, scheduler: S, spacing: Duration) -> Source<T, E>
    where
        S: Scheduler + 'static,
    {
        Source::custom(Delay {
            source: self,
            spacing: spacing.max(MIN_SPACING),
            scheduler: Rc::new(scheduler),
        })
    }
}
