//! Flattening of a source of sources in arrival order.
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::item::{Flow, Item};
use crate::source::{Next, Reducible, Source};

struct Merge<T, E> {
    sources: Source<Source<T, E>, E>,
}

/// State shared by the outer drive and every branch of one merge drive.
struct Branches<T, E> {
    next: RefCell<Next<T, E>>,
    /// Branches still running, the outer source included.
    open: Cell<usize>,
    ended: Cell<bool>,
    /// A delivery to `next` is on the stack.
    busy: Cell<bool>,
    /// Items other branches sent while `busy`.
    queue: RefCell<VecDeque<Item<T, E>>>,
}

impl<T, E> Branches<T, E> {
    fn forward(&self, item: Item<T, E>) -> Flow {
        if self.ended.get() {
            return Flow::Stop;
        }
        if self.busy.get() {
            let flow = if item.is_terminal() { Flow::Stop } else { Flow::Continue };
            self.queue.borrow_mut().push_back(item);
            return flow;
        }
        self.busy.set(true);
        let flow = self.deliver(item);
        loop {
            let queued = self.queue.borrow_mut().pop_front();
            let Some(item) = queued else { break };
            if self.ended.get() {
                self.queue.borrow_mut().clear();
                break;
            }
            self.deliver(item);
        }
        self.busy.set(false);
        if self.ended.get() {
            Flow::Stop
        } else {
            flow
        }
    }

    fn deliver(&self, item: Item<T, E>) -> Flow {
        match item {
            Item::Value(value) => {
                let flow = (self.next.borrow_mut())(Item::Value(value));
                if flow.is_stop() {
                    self.ended.set(true);
                }
                flow
            }
            Item::End => {
                let open = self.open.get() - 1;
                self.open.set(open);
                if open == 0 {
                    self.ended.set(true);
                    (self.next.borrow_mut())(Item::End);
                }
                Flow::Stop
            }
            Item::Error(error) => {
                self.ended.set(true);
                (self.next.borrow_mut())(Item::Error(error));
                Flow::Stop
            }
        }
    }
}

impl<T, E> Reducible<T, E> for Merge<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    fn reduce(&self, next: Next<T, E>) {
        let branches = Rc::new(Branches {
            next: RefCell::new(next),
            open: Cell::new(1),
            ended: Cell::new(false),
            busy: Cell::new(false),
            queue: RefCell::new(VecDeque::new()),
        });
        self.sources.drive(Box::new(move |item| match item {
            Item::Value(source) => {
                if branches.ended.get() {
                    return Flow::Stop;
                }
                branches.open.set(branches.open.get() + 1);
                let branch = Rc::clone(&branches);
                source.drive(Box::new(move |item| branch.forward(item)));
                if branches.ended.get() {
                    Flow::Stop
                } else {
                    Flow::Continue
                }
            }
            Item::Error(error) => branches.forward(Item::Error(error)),
            Item::End => branches.forward(Item::End),
        }));
    }
}

/// Flattens `sources`, delivering values in the order branches produce
/// them.
///
/// Every inner source starts as soon as it is reached. With synchronous
/// branches that reproduces index order; asynchronous branches interleave
/// by time. Items a branch sends while another branch's item is being
/// delivered are queued and follow it. The composite ends once the outer source and every branch
/// ended; the first error ends it too.
///
/// ```rust
/// use reducers::{into, merge, Source};
///
/// let nested: Source<Source<i32>> = Source::from(vec![
///     Source::from(vec![1]),
///     Source::from(vec![2, 3]),
///     Source::from(vec![4, 5, 6]),
/// ]);
/// assert_eq!(into(&merge(nested)).value(), Some(Ok(vec![1, 2, 3, 4, 5, 6])));
/// ```
pub fn merge<T, E>(sources: Source<Source<T, E>, E>) -> Source<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    match sources {
        Source::Empty => Source::Empty,
        Source::Failed(error) => Source::Failed(error),
        Source::Singular(source) => source,
        sources => Source::custom(Merge { sources }),
    }
}

impl<T, E> Source<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    /// Maps every value to a source and merges the results.
    pub fn expand<U, F>(self, func: F) -> Source<U, E>
    where
        U: Clone + 'static,
        F: Fn(T) -> Source<U, E> + 'static,
    {
        merge(self.map(func))
    }
}
