extern crate proptest;
extern crate reducers;

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use reducers::{concat, hub, into, merge, Flow, Item, Source};

fn values(source: &Source<i32>) -> Vec<i32> {
    into(source).value().expect("synchronous drive").expect("no error")
}

/// Records everything a consumer is handed, stopping after `stop_after`
/// values when given.
fn recorded(source: &Source<i32>, stop_after: Option<usize>) -> Vec<Item<i32, reducers::Failure>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    let mut seen = 0;
    source.drive(Box::new(move |item| {
        let is_value = item.is_value();
        sink.borrow_mut().push(item);
        if is_value {
            seen += 1;
            if stop_after == Some(seen) {
                return Flow::Stop;
            }
        }
        Flow::Continue
    }));
    let items = log.borrow().clone();
    items
}

fn arb_items() -> impl Strategy<Value = Vec<i32>> {
    proptest::collection::vec(-50i32..50, 0..24)
}

proptest! {
    #[test]
    fn concat_is_append(a in arb_items(), b in arb_items()) {
        let joined = concat([Source::from(a.clone()), Source::from(b.clone())]);
        let mut expected = a;
        expected.extend(b);
        prop_assert_eq!(values(&joined), expected);
    }

    #[test]
    fn take_and_drop_split_the_stream(items in arb_items(), n in 0usize..30) {
        let source = Source::from(items.clone());
        let split = n.min(items.len());
        prop_assert_eq!(values(&source.clone().take(n)), items[..split].to_vec());
        prop_assert_eq!(values(&source.drop(n)), items[split..].to_vec());
    }

    #[test]
    fn every_drive_ends_exactly_once(items in arb_items(), stop in proptest::option::of(1usize..30)) {
        let pipeline = Source::from(items)
            .map(|x| x * 2)
            .filter(|x| x % 3 != 0)
            .reductions(0, |sum, x| sum + x);
        let log = recorded(&pipeline, stop);
        let terminals = log.iter().filter(|item| item.is_terminal()).count();
        prop_assert_eq!(terminals, 1);
        prop_assert_eq!(log.last(), Some(&Item::End));
    }

    #[test]
    fn redriving_is_idempotent(items in arb_items()) {
        let source = hub(merge(Source::from(vec![
            Source::from(items.clone()),
            Source::from(items).map(|x| x + 1),
        ])));
        prop_assert_eq!(values(&source), values(&source));
    }

    #[test]
    fn filter_matches_iterator(items in arb_items()) {
        let kept = values(&Source::from(items.clone()).filter(|x| *x > 0));
        let expected: Vec<i32> = items.into_iter().filter(|x| *x > 0).collect();
        prop_assert_eq!(kept, expected);
    }
}
