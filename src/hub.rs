//! Multicast adapter.
//!
//! A hub lets any number of consumers share one drive of its upstream
//! source. The first subscription opens the drive; later ones join it
//! and only see what is produced after they joined. When the last
//! subscriber is gone the drive is stopped and the hub goes idle, so the
//! next subscription starts production over.
use std::cell::RefCell;
use std::rc::Rc;

use crate::item::{Flow, Item};
use crate::source::{Next, Reducible, Source};

type Subscriber<T, E> = Rc<RefCell<Next<T, E>>>;

enum HubState<T, E> {
    /// No drive in progress.
    Idle,
    /// Upstream is being driven into these subscribers.
    Driving(Vec<Subscriber<T, E>>),
}

struct Hub<T, E> {
    upstream: Source<T, E>,
    state: Rc<RefCell<HubState<T, E>>>,
}

impl<T, E> Reducible<T, E> for Hub<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    fn reduce(&self, next: Next<T, E>) {
        let subscriber = Rc::new(RefCell::new(next));
        let idle = {
            let mut state = self.state.borrow_mut();
            match &mut *state {
                HubState::Idle => {
                    *state = HubState::Driving(vec![subscriber]);
                    true
                }
                HubState::Driving(subscribers) => {
                    subscribers.push(subscriber);
                    false
                }
            }
        };
        if idle {
            open(&self.upstream, Rc::clone(&self.state));
        }
    }
}

fn open<T, E>(upstream: &Source<T, E>, state: Rc<RefCell<HubState<T, E>>>)
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    tracing::debug!("hub opened");
    upstream.drive(Box::new(move |item| {
        match item {
            Item::Value(value) => dispatch(&state, value),
            terminal => drain(&state, terminal),
        }
        let mut state = state.borrow_mut();
        let finished = match &*state {
            HubState::Driving(subscribers) => subscribers.is_empty(),
            HubState::Idle => true,
        };
        if finished {
            if let HubState::Driving(_) = &*state {
                tracing::debug!("hub idle");
            }
            *state = HubState::Idle;
            Flow::Stop
        } else {
            Flow::Continue
        }
    }));
}

fn subscriber_at<T, E>(state: &RefCell<HubState<T, E>>, index: usize) -> Option<Subscriber<T, E>> {
    match &*state.borrow() {
        HubState::Driving(subscribers) => subscribers.get(index).cloned(),
        HubState::Idle => None,
    }
}

/// Hands `value` to every subscriber present when dispatch began.
///
/// The live list is walked rather than a snapshot: subscribers that join
/// while this runs are appended past `count` and wait for the next value.
fn dispatch<T, E>(state: &RefCell<HubState<T, E>>, value: T)
where
    T: Clone,
{
    let mut count = match &*state.borrow() {
        HubState::Driving(subscribers) => subscribers.len(),
        HubState::Idle => 0,
    };
    let mut index = 0;
    while index < count {
        let Some(subscriber) = subscriber_at(state, index) else {
            break;
        };
        let flow = (subscriber.borrow_mut())(Item::Value(value.clone()));
        if flow.is_stop() {
            if let HubState::Driving(subscribers) = &mut *state.borrow_mut() {
                if subscribers.get(index).is_some_and(|s| Rc::ptr_eq(s, &subscriber)) {
                    subscribers.remove(index);
                }
            }
            count -= 1;
            (subscriber.borrow_mut())(Item::End);
        } else {
            index += 1;
        }
    }
}

/// Delivers the terminal item to every subscriber, including those that
/// subscribe while this runs.
fn drain<T, E>(state: &RefCell<HubState<T, E>>, terminal: Item<T, E>)
where
    E: Clone,
{
    loop {
        let batch = match &mut *state.borrow_mut() {
            HubState::Driving(subscribers) => std::mem::take(subscribers),
            HubState::Idle => Vec::new(),
        };
        if batch.is_empty() {
            break;
        }
        for subscriber in batch {
            let item = match &terminal {
                Item::Error(error) => Item::Error(error.clone()),
                _ => Item::End,
            };
            (subscriber.borrow_mut())(item);
        }
    }
}

/// Turns `source` into a source that many consumers can drive at once
/// while sharing one production run.
///
/// Driving an idle hub starts the upstream; driving it while a run is in
/// progress joins that run. The empty source is its own hub.
///
/// ```rust
/// use reducers::{concat, hub, into, Source};
///
/// let shared = hub(Source::<i32>::from((1..=6).collect::<Vec<_>>()));
/// let parts = concat([shared.clone().take(2), shared.clone().take(3), shared]);
/// assert_eq!(into(&parts).value(), Some(Ok(vec![1, 2, 3, 4, 5, 6])));
/// ```
pub fn hub<T, E>(source: Source<T, E>) -> Source<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    match source {
        Source::Empty => Source::Empty,
        upstream => Source::custom(Hub {
            upstream,
            state: Rc::new(RefCell::new(HubState::Idle)),
        }),
    }
}
