//! Single-input combinators.
//!
//! Each combinator is a small [`Reducible`] that re-drives its input with
//! an inner consumer. [`transform`] threads `Error` and `End` straight
//! through, so the structs below only decide what happens to values.
use std::cell::Cell;
use std::rc::Rc;

use crate::item::{Flow, Item};
use crate::source::{Next, Reducible, Source};

/// Re-drives `source`, handing values to `policy` and passing terminal
/// items to `next` untouched.
pub(crate) fn transform<T, U, E, P>(source: &Source<T, E>, next: Next<U, E>, policy: P)
where
    T: Clone + 'static,
    U: 'static,
    E: Clone + 'static,
    P: FnMut(T, &mut Next<U, E>) -> Flow + 'static,
{
    transform_with_end(source, next, policy, |next| next(Item::End));
}

/// Like [`transform`], but `End` is handed to `on_end`, which must
/// finish with `End` unless `next` stopped first.
pub(crate) fn transform_with_end<T, U, E, P, F>(
    source: &Source<T, E>,
    mut next: Next<U, E>,
    mut policy: P,
    mut on_end: F,
) where
    T: Clone + 'static,
    U: 'static,
    E: Clone + 'static,
    P: FnMut(T, &mut Next<U, E>) -> Flow + 'static,
    F: FnMut(&mut Next<U, E>) -> Flow + 'static,
{
    source.drive(Box::new(move |item| match item {
        Item::Value(value) => policy(value, &mut next),
        Item::Error(error) => next(Item::Error(error)),
        Item::End => on_end(&mut next),
    }));
}

struct Map<T, E, F> {
    source: Source<T, E>,
    func: Rc<F>,
}

impl<T, U, E, F> Reducible<U, E> for Map<T, E, F>
where
    T: Clone + 'static,
    U: 'static,
    E: Clone + 'static,
    F: Fn(T) -> U + 'static,
{
    fn reduce(&self, next: Next<U, E>) {
        let func = Rc::clone(&self.func);
        transform(&self.source, next, move |value, next| next(Item::Value(func(value))));
    }
}

struct TryMap<T, E, F> {
    source: Source<T, E>,
    func: Rc<F>,
}

impl<T, U, E, F> Reducible<U, E> for TryMap<T, E, F>
where
    T: Clone + 'static,
    U: 'static,
    E: Clone + 'static,
    F: Fn(T) -> Result<U, E> + 'static,
{
    fn reduce(&self, next: Next<U, E>) {
        let func = Rc::clone(&self.func);
        transform(&self.source, next, move |value, next| match func(value) {
            Ok(mapped) => next(Item::Value(mapped)),
            Err(error) => next(Item::Error(error)),
        });
    }
}

struct Filter<T, E, F> {
    source: Source<T, E>,
    func: Rc<F>,
}

impl<T, E, F> Reducible<T, E> for Filter<T, E, F>
where
    T: Clone + 'static,
    E: Clone + 'static,
    F: Fn(&T) -> bool + 'static,
{
    fn reduce(&self, next: Next<T, E>) {
        let func = Rc::clone(&self.func);
        transform(&self.source, next, move |value, next| {
            if func(&value) {
                next(Item::Value(value))
            } else {
                Flow::Continue
            }
        });
    }
}

struct FilterMap<T, E, F> {
    source: Source<T, E>,
    func: Rc<F>,
}

impl<T, U, E, F> Reducible<U, E> for FilterMap<T, E, F>
where
    T: Clone + 'static,
    U: 'static,
    E: Clone + 'static,
    F: Fn(T) -> Option<U> + 'static,
{
    fn reduce(&self, next: Next<U, E>) {
        let func = Rc::clone(&self.func);
        transform(&self.source, next, move |value, next| match func(value) {
            Some(mapped) => next(Item::Value(mapped)),
            None => Flow::Continue,
        });
    }
}

struct TakeCount<T, E> {
    source: Source<T, E>,
    count: usize,
}

impl<T, E> Reducible<T, E> for TakeCount<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    fn reduce(&self, next: Next<T, E>) {
        let mut left = self.count;
        transform(&self.source, next, move |value, next| {
            left -= 1;
            let flow = next(Item::Value(value));
            // The upstream guard hands us `End` once we stop it.
            if left == 0 {
                Flow::Stop
            } else {
                flow
            }
        });
    }
}

struct TakeWhile<T, E, F> {
    source: Source<T, E>,
    func: Rc<F>,
}

impl<T, E, F> Reducible<T, E> for TakeWhile<T, E, F>
where
    T: Clone + 'static,
    E: Clone + 'static,
    F: Fn(&T) -> bool + 'static,
{
    fn reduce(&self, next: Next<T, E>) {
        let func = Rc::clone(&self.func);
        transform(&self.source, next, move |value, next| {
            if func(&value) {
                next(Item::Value(value))
            } else {
                Flow::Stop
            }
        });
    }
}

struct DropCount<T, E> {
    source: Source<T, E>,
    count: usize,
}

impl<T, E> Reducible<T, E> for DropCount<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    fn reduce(&self, next: Next<T, E>) {
        let mut left = self.count;
        transform(&self.source, next, move |value, next| {
            if left > 0 {
                left -= 1;
                Flow::Continue
            } else {
                next(Item::Value(value))
            }
        });
    }
}

struct DropWhile<T, E, F> {
    source: Source<T, E>,
    func: Rc<F>,
}

impl<T, E, F> Reducible<T, E> for DropWhile<T, E, F>
where
    T: Clone + 'static,
    E: Clone + 'static,
    F: Fn(&T) -> bool + 'static,
{
    fn reduce(&self, next: Next<T, E>) {
        let func = Rc::clone(&self.func);
        let mut dropping = true;
        transform(&self.source, next, move |value, next| {
            if dropping && func(&value) {
                return Flow::Continue;
            }
            dropping = false;
            next(Item::Value(value))
        });
    }
}

struct Reductions<T, E, S, F> {
    source: Source<T, E>,
    func: Rc<F>,
    initial: S,
}

impl<T, E, S, F> Reducible<S, E> for Reductions<T, E, S, F>
where
    T: Clone + 'static,
    E: Clone + 'static,
    S: Clone + 'static,
    F: Fn(S, T) -> S + 'static,
{
    fn reduce(&self, next: Next<S, E>) {
        let func = Rc::clone(&self.func);
        let mut state = self.initial.clone();
        transform(&self.source, next, move |value, next| {
            state = func(state.clone(), value);
            next(Item::Value(state.clone()))
        });
    }
}

struct UnseededReductions<T, E, F> {
    source: Source<T, E>,
    func: Rc<F>,
}

impl<T, E, F> Reducible<T, E> for UnseededReductions<T, E, F>
where
    T: Clone + Default + 'static,
    E: Clone + 'static,
    F: Fn(T, T) -> T + 'static,
{
    fn reduce(&self, next: Next<T, E>) {
        let func = Rc::clone(&self.func);
        let seeded = Rc::new(Cell::new(false));
        let seen = Rc::clone(&seeded);
        let mut state: Option<T> = None;
        transform_with_end(
            &self.source,
            next,
            move |value, next| {
                let current = match state.take() {
                    Some(previous) => func(previous, value),
                    None => value,
                };
                seen.set(true);
                state = Some(current.clone());
                next(Item::Value(current))
            },
            move |next| {
                if !seeded.get() && next(Item::Value(T::default())).is_stop() {
                    return Flow::Stop;
                }
                next(Item::End)
            },
        );
    }
}

impl<T, E> Source<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    /// Transforms every value with `func`.
    ///
    /// `func` is not invoked until the result is driven.
    pub fn map<U, F>(self, func: F) -> Source<U, E>
    where
        U: 'static,
        F: Fn(T) -> U + 'static,
    {
        Source::custom(Map { source: self, func: Rc::new(func) })
    }

    /// Like [`map`](Source::map), but an `Err` from `func` is delivered
    /// as an error item at that position.
    pub fn try_map<U, F>(self, func: F) -> Source<U, E>
    where
        U: 'static,
        F: Fn(T) -> Result<U, E> + 'static,
    {
        Source::custom(TryMap { source: self, func: Rc::new(func) })
    }

    /// Values for which `func` holds.
    pub fn filter<F>(self, func: F) -> Source<T, E>
    where
        F: Fn(&T) -> bool + 'static,
    {
        Source::custom(Filter { source: self, func: Rc::new(func) })
    }

    /// Values `func` maps to `Some`, unwrapped.
    pub fn filter_map<U, F>(self, func: F) -> Source<U, E>
    where
        U: 'static,
        F: Fn(T) -> Option<U> + 'static,
    {
        Source::custom(FilterMap { source: self, func: Rc::new(func) })
    }

    /// First `count` values. `usize::MAX` means all of them.
    pub fn take(self, count: usize) -> Source<T, E> {
        match count {
            0 => Source::Empty,
            usize::MAX => self,
            count => Source::custom(TakeCount { source: self, count }),
        }
    }

    /// Values up to, not including, the first one failing `func`.
    pub fn take_while<F>(self, func: F) -> Source<T, E>
    where
        F: Fn(&T) -> bool + 'static,
    {
        Source::custom(TakeWhile { source: self, func: Rc::new(func) })
    }

    /// Everything but the first `count` values. `usize::MAX` drops all
    /// of them.
    ///
    /// Errors are never counted as dropped values.
    pub fn drop(self, count: usize) -> Source<T, E> {
        match count {
            0 => self,
            usize::MAX => Source::Empty,
            count => Source::custom(DropCount { source: self, count }),
        }
    }

    /// Everything from the first value failing `func` on.
    pub fn drop_while<F>(self, func: F) -> Source<T, E>
    where
        F: Fn(&T) -> bool + 'static,
    {
        Source::custom(DropWhile { source: self, func: Rc::new(func) })
    }

    /// Running fold: emits every intermediate state seeded at `initial`.
    ///
    /// ```rust
    /// use reducers::{into, Source};
    ///
    /// let sums = Source::<i32>::from(vec![1, 1, 1, 1]).reductions(0, |s, x| s + x);
    /// assert_eq!(into(&sums).value(), Some(Ok(vec![1, 2, 3, 4])));
    /// ```
    pub fn reductions<S, F>(self, initial: S, func: F) -> Source<S, E>
    where
        S: Clone + 'static,
        F: Fn(S, T) -> S + 'static,
    {
        Source::custom(Reductions { source: self, func: Rc::new(func), initial })
    }

    /// Running fold without a seed: the first value is the first state.
    /// An empty input yields `T::default()`.
    pub fn reductions_unseeded<F>(self, func: F) -> Source<T, E>
    where
        T: Default,
        F: Fn(T, T) -> T + 'static,
    {
        Source::custom(UnseededReductions { source: self, func: Rc::new(func) })
    }
}
