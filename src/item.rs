//! Values exchanged between producers and consumers.

/// One position of a stream as seen by a consumer.
///
/// `Error` and `End` are terminal: a consumer sees at most one of them
/// per drive, and nothing after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Item<T, E> {
    /// Ordinary payload.
    Value(T),
    /// A data error at this position.
    Error(E),
    /// The producer is exhausted.
    End,
}

impl<T, E> Item<T, E> {
    /// Returns `true` for `Value`.
    #[inline]
    pub const fn is_value(&self) -> bool {
        matches!(self, Item::Value(_))
    }

    /// Returns `true` for `Error` and `End`.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        !self.is_value()
    }

    /// The payload, if this is a value.
    #[inline]
    pub fn value(self) -> Option<T> {
        match self {
            Item::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Maps the payload, leaving terminal items alone.
    pub fn map<U, F>(self, f: F) -> Item<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Item::Value(value) => Item::Value(f(value)),
            Item::Error(error) => Item::Error(error),
            Item::End => Item::End,
        }
    }
}

/// Answer of an erased consumer to the item it was just handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    /// More values are welcome.
    Continue,
    /// No more values are wanted on this drive.
    Stop,
}

impl Flow {
    /// Returns `true` for `Stop`.
    #[inline]
    pub const fn is_stop(self) -> bool {
        matches!(self, Flow::Stop)
    }
}

/// Accumulator returned by a typed consumer.
///
/// `Stop` wraps the final accumulator and asks the producer to stop;
/// the consumer still receives one `End` afterwards, carrying the
/// wrapped value.
///
/// ```rust
/// use reducers::{fold, Source, Step};
///
/// let source: Source<i32> = Source::from(vec![1, 2, 3]);
/// let first = fold(&source, |value, _| Step::Stop(value), 0);
/// assert_eq!(first.value(), Some(Ok(1)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step<A> {
    /// Keep going with this accumulator.
    Continue(A),
    /// Finish with this accumulator.
    Stop(A),
}

impl<A> Step<A> {
    /// Returns `true` for `Stop`.
    #[inline]
    pub const fn is_stop(&self) -> bool {
        matches!(self, Step::Stop(_))
    }

    /// Unwraps the accumulator regardless of the variant.
    #[inline]
    pub fn into_inner(self) -> A {
        match self {
            Step::Continue(state) | Step::Stop(state) => state,
        }
    }

    /// The erased answer matching this step.
    #[inline]
    pub fn flow(&self) -> Flow {
        match self {
            Step::Continue(_) => Flow::Continue,
            Step::Stop(_) => Flow::Stop,
        }
    }
}

impl<A> From<A> for Step<A> {
    fn from(state: A) -> Self {
        Step::Continue(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_items() {
        assert!(Item::<i32, ()>::End.is_terminal());
        assert!(Item::<i32, ()>::Error(()).is_terminal());
        assert!(!Item::<i32, ()>::Value(1).is_terminal());
    }

    #[test]
    fn map_leaves_terminals_alone() {
        let item: Item<i32, &str> = Item::Error("boom");
        assert_eq!(item.map(|x| x * 2), Item::Error("boom"));
        assert_eq!(Item::<i32, &str>::Value(4).map(|x| x * 2), Item::Value(8));
    }

    #[test]
    fn plain_accumulator_continues() {
        let step: Step<i32> = 3.into();
        assert_eq!(step, Step::Continue(3));
        assert_eq!(Step::Stop(4).into_inner(), 4);
        assert!(Step::Stop(()).flow().is_stop());
    }
}
