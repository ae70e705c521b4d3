//! Bridge for pushing externally produced items into a stream.
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::item::{Flow, Item};
use crate::source::{Next, Reducible, Source};

struct Channel<T, E> {
    next: Option<Next<T, E>>,
    /// Items sent while the consumer was busy with an earlier one.
    deferred: VecDeque<Item<T, E>>,
    open: bool,
    ended: bool,
    reduced: bool,
}

/// A push-driven source fed by hand.
///
/// Items sent before a consumer is attached are dropped. Only one
/// consumer is served; wrap the event's source in a [`hub`](crate::hub)
/// to share it.
///
/// ```rust
/// use reducers::{into, Event};
///
/// let clicks = Event::<u32>::new();
/// let seen = into(&clicks.source());
/// clicks.emit(1);
/// clicks.emit(2);
/// assert!(seen.is_pending());
/// clicks.end();
/// assert_eq!(seen.value(), Some(Ok(vec![1, 2])));
/// ```
pub struct Event<T, E = crate::error::Failure> {
    channel: Rc<RefCell<Channel<T, E>>>,
}

impl<T, E> Clone for Event<T, E> {
    fn clone(&self) -> Self {
        Event { channel: Rc::clone(&self.channel) }
    }
}

impl<T, E> Default for Event<T, E> {
    fn default() -> Self {
        Event {
            channel: Rc::new(RefCell::new(Channel {
                next: None,
                deferred: VecDeque::new(),
                open: false,
                ended: false,
                reduced: false,
            })),
        }
    }
}

impl<T, E> Event<T, E> {
    /// An event with no consumer yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A consumer has been attached.
    pub fn is_open(&self) -> bool {
        self.channel.borrow().open
    }

    /// A terminal item has been sent.
    pub fn is_ended(&self) -> bool {
        self.channel.borrow().ended
    }

    /// The consumer is done, either because it stopped or because it was
    /// handed a terminal item.
    pub fn is_reduced(&self) -> bool {
        self.channel.borrow().reduced
    }

    /// Delivers `item` to the consumer. Returns [`Flow::Stop`] once no
    /// further values are wanted.
    pub fn send(&self, item: Item<T, E>) -> Flow {
        let taken = {
            let mut channel = self.channel.borrow_mut();
            if channel.ended || channel.reduced {
                return Flow::Stop;
            }
            let taken = channel.next.take();
            let terminal = item.is_terminal();
            if terminal {
                channel.ended = true;
            }
            if taken.is_none() && channel.open {
                channel.deferred.push_back(item);
                return if terminal { Flow::Stop } else { Flow::Continue };
            }
            taken
        };
        let Some(mut next) = taken else {
            tracing::trace!("event item dropped, no consumer ready");
            return Flow::Continue;
        };
        let mut terminal = item.is_terminal();
        let mut flow = next(item);
        while !terminal && !flow.is_stop() {
            let deferred = self.channel.borrow_mut().deferred.pop_front();
            let Some(item) = deferred else { break };
            terminal = item.is_terminal();
            flow = next(item);
        }
        let mut channel = self.channel.borrow_mut();
        if terminal || flow.is_stop() {
            channel.reduced = true;
            channel.deferred.clear();
            Flow::Stop
        } else {
            channel.next = Some(next);
            flow
        }
    }

    /// Sends a value.
    pub fn emit(&self, value: T) -> Flow {
        self.send(Item::Value(value))
    }

    /// Sends an error, ending the event.
    pub fn fail(&self, error: E) -> Flow {
        self.send(Item::Error(error))
    }

    /// Ends the event.
    pub fn end(&self) -> Flow {
        self.send(Item::End)
    }
}

impl<T, E> Event<T, E>
where
    T: 'static,
    E: 'static,
{
    /// The source consumers drive to receive this event's items.
    pub fn source(&self) -> Source<T, E> {
        Source::custom(self.clone())
    }
}

impl<T, E> Reducible<T, E> for Event<T, E> {
    fn reduce(&self, mut next: Next<T, E>) {
        let mut channel = self.channel.borrow_mut();
        if channel.ended {
            drop(channel);
            next(Item::End);
            return;
        }
        if channel.open {
            drop(channel);
            tracing::warn!("event already has a consumer, ending the new one");
            next(Item::End);
            return;
        }
        channel.open = true;
        channel.next = Some(next);
    }
}

impl<T, E> fmt::Debug for Event<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channel = self.channel.borrow();
        f.debug_struct("Event")
            .field("open", &channel.open)
            .field("ended", &channel.ended)
            .field("reduced", &channel.reduced)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fold::into;

    #[test]
    fn items_before_open_are_dropped() {
        let event = Event::<i32>::new();
        assert_eq!(event.emit(0), Flow::Continue);
        let values = into(&event.source());
        assert!(event.is_open());
        event.emit(1);
        event.end();
        assert!(event.is_ended());
        assert!(event.is_reduced());
        assert_eq!(values.value(), Some(Ok(vec![1])));
    }

    #[test]
    fn consumer_stop_reduces_the_event() {
        let event = Event::<i32>::new();
        let values = into(&event.source().take(1));
        assert_eq!(event.emit(1), Flow::Stop);
        assert!(event.is_reduced());
        assert!(!event.is_ended());
        assert_eq!(event.emit(2), Flow::Stop);
        assert_eq!(values.value(), Some(Ok(vec![1])));
    }

    #[test]
    fn end_sent_from_inside_the_consumer_is_delivered() {
        let event = Event::<i32>::new();
        let inner = event.clone();
        let values = into(&event.source().map(move |x| {
            if x == 2 {
                inner.end();
            }
            x
        }));
        event.emit(1);
        event.emit(2);
        assert!(event.is_reduced());
        assert_eq!(values.value(), Some(Ok(vec![1, 2])));
    }

    #[test]
    fn values_sent_from_inside_the_consumer_are_queued() {
        let event = Event::<i32>::new();
        let inner = event.clone();
        let values = into(&event.source().map(move |x| {
            match x {
                1 => assert_eq!(inner.emit(2), Flow::Continue),
                3 => assert_eq!(inner.end(), Flow::Stop),
                _ => {}
            }
            x
        }));
        assert_eq!(event.emit(1), Flow::Continue);
        assert!(values.is_pending());
        event.emit(3);
        assert!(event.is_reduced());
        assert_eq!(values.value(), Some(Ok(vec![1, 2, 3])));
    }

    #[test]
    fn ended_event_ends_new_consumers() {
        let event = Event::<i32>::new();
        event.end();
        assert_eq!(into(&event.source()).value(), Some(Ok(vec![])));
    }
}
