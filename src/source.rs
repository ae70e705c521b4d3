//! Reducible sources and the drive loop.
//!
//! A [`Source`] is anything that can be driven: it pushes its items into
//! a consumer callback until it is exhausted or the consumer asks it to
//! stop. Plain collections, single values and errors are sources as-is;
//! everything else (combinator outputs, bridges to external producers)
//! implements [`Reducible`] and is wrapped in [`Source::Custom`].
//!
//! Every drive goes through a guard that keeps the consumer contract
//! uniform no matter how well behaved the producer is:
//!
//! * a consumer sees its values followed by exactly one terminal item;
//! * a consumer that answers [`Flow::Stop`] immediately receives `End`
//!   and nothing after it.
use std::fmt;
use std::rc::Rc;

use crate::error::Failure;
use crate::item::{Flow, Item, Step};

/// Erased consumer callback.
pub type Next<T, E> = Box<dyn FnMut(Item<T, E>) -> Flow>;

/// Capability of producing items into a consumer.
///
/// Implementations may deliver synchronously, or keep `next` and deliver
/// later from a scheduler callback or an external event. They must stop
/// delivering values once `next` answers [`Flow::Stop`] or after they
/// delivered a terminal item.
pub trait Reducible<T, E> {
    /// Starts delivering items into `next`.
    fn reduce(&self, next: Next<T, E>);
}

/// A value capable of being driven.
///
/// Sources are immutable and cheap to clone; each drive starts the
/// underlying computation over (hubs excepted, see [`hub`](crate::hub)).
pub enum Source<T, E = Failure> {
    /// Ends immediately.
    Empty,
    /// One value, then `End`.
    Singular(T),
    /// Elements in index order, then `End`.
    Sequence(Rc<[T]>),
    /// A failed collection: a single `Error` item.
    Failed(E),
    /// Any other producer.
    Custom(Rc<dyn Reducible<T, E>>),
}

impl<T: Clone, E: Clone> Clone for Source<T, E> {
    fn clone(&self) -> Self {
        match self {
            Source::Empty => Source::Empty,
            Source::Singular(value) => Source::Singular(value.clone()),
            Source::Sequence(items) => Source::Sequence(Rc::clone(items)),
            Source::Failed(error) => Source::Failed(error.clone()),
            Source::Custom(reducible) => Source::Custom(Rc::clone(reducible)),
        }
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for Source<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Empty => f.write_str("Empty"),
            Source::Singular(value) => f.debug_tuple("Singular").field(value).finish(),
            Source::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
            Source::Failed(error) => f.debug_tuple("Failed").field(error).finish(),
            Source::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl<T, E> Default for Source<T, E> {
    fn default() -> Self {
        Source::Empty
    }
}

impl<T, E> Source<T, E> {
    /// The source with no values.
    pub fn empty() -> Self {
        Source::Empty
    }

    /// A source of exactly `value`.
    pub fn value(value: T) -> Self {
        Source::Singular(value)
    }

    /// A source failing with `error` before any value.
    pub fn error(error: E) -> Self {
        Source::Failed(error)
    }

    /// `true` for [`Source::Empty`] only; custom sources are never
    /// known to be empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, Source::Empty)
    }

    /// Wraps a custom producer.
    pub fn custom<R>(reducible: R) -> Self
    where
        R: Reducible<T, E> + 'static,
    {
        Source::Custom(Rc::new(reducible))
    }

    /// Custom source from a closure that is handed the consumer on each
    /// drive.
    ///
    /// ```rust
    /// use reducers::{into, Flow, Item, Source};
    ///
    /// let source: Source<i32> = Source::from_fn(|mut next| {
    ///     if next(Item::Value(1)) == Flow::Continue {
    ///         next(Item::Value(2));
    ///     }
    ///     next(Item::End);
    /// });
    /// assert_eq!(into(&source).value(), Some(Ok(vec![1, 2])));
    /// ```
    pub fn from_fn<F>(reduce: F) -> Self
    where
        F: Fn(Next<T, E>) + 'static,
    {
        Source::custom(FromFn(reduce))
    }

    /// Source whose content is produced by `f` every time it is driven.
    pub fn lazy<F>(f: F) -> Self
    where
        F: Fn() -> Source<T, E> + 'static,
        T: Clone + 'static,
        E: Clone + 'static,
    {
        Source::custom(Lazy(f))
    }
}

impl<T, E> Source<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    /// Drives this source into `next`.
    ///
    /// Synchronous sources are exhausted before this returns;
    /// asynchronous ones keep `next` and continue later.
    pub fn drive(&self, next: Next<T, E>) {
        let mut guard = Guard::new(next);
        match self {
            Source::Empty => {
                guard.send(Item::End);
            }
            Source::Singular(value) => {
                if guard.send(Item::Value(value.clone())) == Flow::Continue {
                    guard.send(Item::End);
                }
            }
            Source::Sequence(items) => {
                for value in items.iter() {
                    if guard.send(Item::Value(value.clone())).is_stop() {
                        return;
                    }
                }
                guard.send(Item::End);
            }
            Source::Failed(error) => {
                guard.send(Item::Error(error.clone()));
            }
            Source::Custom(reducible) => reducible.reduce(Box::new(move |item| guard.send(item))),
        }
    }
}

/// Drives `source` with a typed accumulator.
///
/// `f` is handed every item, terminal ones included, together with the
/// current accumulator. Returning [`Step::Stop`] ends the drive; `f`
/// then receives `End` with the wrapped accumulator.
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use reducers::{reduce, Item, Source, Step};
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let log = seen.clone();
/// let source: Source<i32> = Source::from(vec![1, 2, 3]);
/// reduce(&source, move |item, total| {
///     log.borrow_mut().push((item.clone(), total));
///     match item {
///         Item::Value(x) => Step::Continue(total + x),
///         _ => Step::Continue(total),
///     }
/// }, 0);
/// assert_eq!(seen.borrow().last(), Some(&(Item::End, 6)));
/// ```
pub fn reduce<T, E, A, F>(source: &Source<T, E>, mut f: F, initial: A)
where
    T: Clone + 'static,
    E: Clone + 'static,
    A: 'static,
    F: FnMut(Item<T, E>, A) -> Step<A> + 'static,
{
    let mut state = Some(initial);
    source.drive(Box::new(move |item| {
        let Some(accumulated) = state.take() else {
            return Flow::Stop;
        };
        let step = f(item, accumulated);
        let flow = step.flow();
        state = Some(step.into_inner());
        flow
    }));
}

/// Protocol guard placed in front of every consumer.
pub(crate) struct Guard<T, E> {
    next: Next<T, E>,
    closed: bool,
}

impl<T, E> Guard<T, E> {
    pub(crate) fn new(next: Next<T, E>) -> Self {
        Guard { next, closed: false }
    }

    pub(crate) fn send(&mut self, item: Item<T, E>) -> Flow {
        if self.closed {
            if item.is_value() {
                tracing::error!("source delivered a value after its consumer was closed");
                if cfg!(debug_assertions) {
                    panic!("source delivered a value after its consumer was closed");
                }
            }
            return Flow::Stop;
        }
        let terminal = item.is_terminal();
        let flow = (self.next)(item);
        if terminal {
            self.closed = true;
            return Flow::Stop;
        }
        if flow.is_stop() {
            self.closed = true;
            (self.next)(Item::End);
        }
        flow
    }
}

struct FromFn<F>(F);

impl<T, E, F> Reducible<T, E> for FromFn<F>
where
    F: Fn(Next<T, E>),
{
    fn reduce(&self, next: Next<T, E>) {
        (self.0)(next)
    }
}

struct Lazy<F>(F);

impl<T, E, F> Reducible<T, E> for Lazy<F>
where
    T: Clone + 'static,
    E: Clone + 'static,
    F: Fn() -> Source<T, E>,
{
    fn reduce(&self, next: Next<T, E>) {
        (self.0)().drive(next)
    }
}

impl<T, E> From<Vec<T>> for Source<T, E> {
    fn from(items: Vec<T>) -> Self {
        if items.is_empty() {
            Source::Empty
        } else {
            Source::Sequence(items.into())
        }
    }
}

impl<T: Clone, E> From<&[T]> for Source<T, E> {
    fn from(items: &[T]) -> Self {
        Source::from(items.to_vec())
    }
}

impl<T, E, const N: usize> From<[T; N]> for Source<T, E> {
    fn from(items: [T; N]) -> Self {
        Source::from(Vec::from(items))
    }
}

/// `None` is the empty source.
impl<T, E> From<Option<T>> for Source<T, E> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Source::Singular(value),
            None => Source::Empty,
        }
    }
}

/// Strings are sequences of their characters.
impl<E> From<&str> for Source<char, E> {
    fn from(text: &str) -> Self {
        text.chars().collect()
    }
}

impl<T, E> FromIterator<T> for Source<T, E> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Source::from(iter.into_iter().collect::<Vec<_>>())
    }
}
