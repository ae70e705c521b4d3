#![crate_type = "lib"]
#![warn(missing_docs)]

//! Push-based lazy streams.
//!
//! A [`Source`] pushes items into a consumer when it is driven. Sources
//! are composed with combinators (`map`, `filter`, `take`, [`concat`],
//! [`merge`], [`hub`], ...) that do no work until the result is driven,
//! and are finally drained with [`fold`] or [`into`], which resolve an
//! [`Eventual`].
//!
//! Every consumer sees its values followed by exactly one terminal item,
//! [`Item::End`] or [`Item::Error`]. A consumer answering [`Flow::Stop`]
//! stops the whole chain above it; it then receives `End` and nothing
//! else.
//!
//! ```rust
//! use reducers::{fold, Source};
//!
//! let source: Source<i32> = Source::from(vec![1, 2, 3, 4, 5, 6]);
//! let total = fold(&source.filter(|x| x % 2 == 0).map(|x| x * 10), |x, sum| sum + x, 0);
//! assert_eq!(total.value(), Some(Ok(120)));
//! ```
//!
//! Everything is single-threaded. Asynchronous sources ([`Event`],
//! [`Source::delay`]) deliver from host callbacks, for which
//! [`EventLoop`] provides a deterministic implementation.

pub use concat::concat;
pub use delay::{DEFAULT_SPACING, MIN_SPACING};
pub use error::{EventualError, Failure};
pub use event::Event;
pub use eventual::{eventual, Eventual, Resolver};
pub use fold::{fold, into, into_buffer, try_fold};
pub use hub::hub;
pub use item::{Flow, Item, Step};
pub use merge::merge;
pub use scheduler::{EventLoop, Scheduler, Task, TimerHandle};
pub use source::{reduce, Next, Reducible, Source};

mod capture;
mod concat;
mod delay;
mod error;
mod event;
mod eventual;
mod fold;
mod hub;
mod item;
mod merge;
mod scheduler;
mod source;
mod stream;
