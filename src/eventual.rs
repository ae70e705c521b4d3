//! Single-assignment results of asynchronous drives.
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};

use crate::error::EventualError;

/// Write side of an [`Eventual`]. Resolves it at most once.
pub struct Resolver<T> {
    sender: Option<oneshot::Sender<T>>,
}

impl<T> Resolver<T> {
    /// Resolves the eventual. Returns `false` if it was already resolved
    /// or nobody is left to observe it.
    pub fn resolve(&mut self, value: T) -> bool {
        match self.sender.take() {
            Some(sender) => sender.send(value).is_ok(),
            None => false,
        }
    }

    /// `true` once [`resolve`](Resolver::resolve) was called.
    pub fn is_resolved(&self) -> bool {
        self.sender.is_none()
    }
}

impl<T> fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver").field("resolved", &self.is_resolved()).finish()
    }
}

/// Read side: a value that becomes available once.
///
/// It can be inspected synchronously with [`value`](Eventual::value) or
/// awaited. Clones observe the same value.
pub struct Eventual<T> {
    inner: Shared<oneshot::Receiver<T>>,
}

impl<T> Clone for Eventual<T> {
    fn clone(&self) -> Self {
        Eventual { inner: self.inner.clone() }
    }
}

/// Creates a pending eventual and its resolver.
///
/// ```rust
/// use reducers::eventual;
///
/// let (mut resolver, value) = eventual::<i32>();
/// assert!(value.is_pending());
/// resolver.resolve(4);
/// assert_eq!(value.value(), Some(4));
/// ```
pub fn eventual<T: Clone>() -> (Resolver<T>, Eventual<T>) {
    let (sender, receiver) = oneshot::channel();
    (Resolver { sender: Some(sender) }, Eventual { inner: receiver.shared() })
}

impl<T: Clone> Eventual<T> {
    fn poll_now(&self) -> Option<Result<T, EventualError>> {
        self.inner
            .clone()
            .now_or_never()
            .map(|result| result.map_err(|_| EventualError::Abandoned))
    }

    /// The resolved value, or `None` while pending or if abandoned.
    pub fn value(&self) -> Option<T> {
        self.poll_now().and_then(Result::ok)
    }

    /// `true` until the eventual is resolved or abandoned.
    pub fn is_pending(&self) -> bool {
        self.poll_now().is_none()
    }

    /// `true` once the resolver was dropped without resolving.
    pub fn is_abandoned(&self) -> bool {
        matches!(self.poll_now(), Some(Err(EventualError::Abandoned)))
    }
}

impl<T: Clone> Future for Eventual<T> {
    type Output = Result<T, EventualError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner
            .poll_unpin(cx)
            .map(|result| result.map_err(|_| EventualError::Abandoned))
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Eventual<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.poll_now() {
            Some(Ok(value)) => f.debug_tuple("Eventual").field(&value).finish(),
            Some(Err(error)) => f.debug_tuple("Eventual").field(&error).finish(),
            None => f.write_str("Eventual(<pending>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn resolves_once() {
        let (mut resolver, value) = eventual();
        assert!(resolver.resolve("first"));
        assert!(!resolver.resolve("second"));
        assert_eq!(value.value(), Some("first"));
        assert_eq!(value.clone().value(), Some("first"));
    }

    #[test]
    fn dropped_resolver_abandons() {
        let (resolver, value) = eventual::<u8>();
        assert!(value.is_pending());
        drop(resolver);
        assert!(value.is_abandoned());
        assert_eq!(block_on(value), Err(EventualError::Abandoned));
    }

    #[test]
    fn can_be_awaited() {
        let (mut resolver, value) = eventual();
        resolver.resolve(vec![1, 2]);
        assert_eq!(block_on(value), Ok(vec![1, 2]));
    }
}
