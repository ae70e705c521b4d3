//! Sequential composition.
use crate::item::{Flow, Item};
use crate::source::{Next, Reducible, Source};

struct Concat<T, E> {
    left: Source<T, E>,
    right: Source<T, E>,
}

impl<T, E> Reducible<T, E> for Concat<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    fn reduce(&self, next: Next<T, E>) {
        let right = self.right.clone();
        let mut next = Some(next);
        let mut stopped = false;
        self.left.drive(Box::new(move |item| {
            // `End` after a downstream stop belongs to the downstream, not
            // to the right-hand side.
            if let (Item::End, false) = (&item, stopped) {
                if let Some(next) = next.take() {
                    right.drive(next);
                }
                return Flow::Stop;
            }
            match next.as_mut() {
                Some(next) => {
                    let flow = next(item);
                    stopped |= flow.is_stop();
                    flow
                }
                None => Flow::Stop,
            }
        }));
    }
}

impl<T, E> Source<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    /// Drives `self`, then `other`.
    ///
    /// An error in `self` is forwarded and `other` is never driven.
    pub fn concat(self, other: impl Into<Source<T, E>>) -> Source<T, E> {
        match (self, other.into()) {
            (Source::Empty, right) => right,
            (left, Source::Empty) => left,
            (left, right) => Source::custom(Concat { left, right }),
        }
    }
}

/// Concatenates `sources` left to right.
///
/// ```rust
/// use reducers::{concat, into, Source};
///
/// let joined: Source<i32> = concat([vec![1].into(), vec![2, 3].into(), vec![4, 5, 6].into()]);
/// assert_eq!(into(&joined).value(), Some(Ok(vec![1, 2, 3, 4, 5, 6])));
/// ```
pub fn concat<T, E, I>(sources: I) -> Source<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
    I: IntoIterator<Item = Source<T, E>>,
{
    sources
        .into_iter()
        .fold(Source::Empty, |joined, source| joined.concat(source))
}
