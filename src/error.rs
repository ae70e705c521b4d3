use std::fmt;
use std::rc::Rc;

use thiserror::Error;

/// Errors reported by the crate itself, as opposed to data errors that
/// flow through a stream.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EventualError {
    /// The resolver was dropped before a value was delivered, which
    /// happens when a drive is abandoned without reaching its end.
    #[error("eventual value was dropped before it was resolved")]
    Abandoned,
}

/// General purpose data error carried by streams that have no error
/// type of their own.
///
/// Cloning is cheap; the message is shared.
#[derive(Error, Clone, PartialEq, Eq, Hash)]
#[error("{message}")]
pub struct Failure {
    message: Rc<str>,
}

impl Failure {
    /// Creates a failure carrying `message`.
    pub fn new(message: impl Into<Rc<str>>) -> Self {
        Failure { message: message.into() }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failure({:?})", &*self.message)
    }
}

impl From<&str> for Failure {
    fn from(message: &str) -> Self {
        Failure::new(message)
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Failure::new(message)
    }
}
