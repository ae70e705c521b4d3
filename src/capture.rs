//! Error recovery.
use std::rc::Rc;

use crate::item::{Flow, Item};
use crate::source::{Next, Reducible, Source};

struct Capture<T, E, F> {
    source: Source<T, E>,
    recover: Rc<F>,
}

impl<T, E, F> Reducible<T, E> for Capture<T, E, F>
where
    T: Clone + 'static,
    E: Clone + 'static,
    F: Fn(E) -> Source<T, E> + 'static,
{
    fn reduce(&self, next: Next<T, E>) {
        let recover = Rc::clone(&self.recover);
        // `None` once the drive switched over to the replacement.
        let mut forwarding = Some(next);
        self.source.drive(Box::new(move |item| match item {
            Item::Error(error) => {
                if let Some(next) = forwarding.take() {
                    tracing::debug!("substituting recovery source for stream error");
                    recover(error).drive(next);
                }
                Flow::Stop
            }
            item => match forwarding.as_mut() {
                Some(next) => next(item),
                None => Flow::Stop,
            },
        }));
    }
}

impl<T, E> Source<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    /// Replaces the remainder of the stream with `recover(error)` when an
    /// error is reached.
    ///
    /// `recover` runs at most once per drive and only if the consumer
    /// actually drives as far as the error. Errors produced by the
    /// replacement are forwarded as they are.
    ///
    /// ```rust
    /// use reducers::{concat, into, Failure, Source};
    ///
    /// let broken: Source<String> = concat([
    ///     Source::from(vec!["a".to_string()]),
    ///     Source::error(Failure::new("boom")),
    /// ]);
    /// let recovered = broken.capture(|error| Source::value(error.message().to_string()));
    /// assert_eq!(
    ///     into(&recovered).value(),
    ///     Some(Ok(vec!["a".to_string(), "boom".to_string()]))
    /// );
    /// ```
    pub fn capture<F>(self, recover: F) -> Source<T, E>
    where
        F: Fn(E) -> Source<T, E> + 'static,
    {
        Source::custom(Capture { source: self, recover: Rc::new(recover) })
    }
}
