extern crate reducers;

use std::time::Duration;

use reducers::{into, merge, Event, EventLoop, Failure, Source};

type Text = Source<&'static str>;

fn words(items: &[&'static str]) -> Text {
    Source::from(items)
}

fn nested(sources: Vec<Text>) -> Source<Text> {
    Source::from(sources)
}

fn drained(event_loop: &EventLoop, source: &Text) -> Result<Vec<&'static str>, Failure> {
    let result = into(source);
    event_loop.run();
    result.value().expect("drive completed")
}

#[test]
fn flattens_and_rereduces() {
    let merged = merge(nested(vec![words(&["1"]), words(&["2", "3"]), words(&["4", "5", "6"])]));
    let expected = vec!["1", "2", "3", "4", "5", "6"];
    assert_eq!(into(&merged).value(), Some(Ok(expected.clone())));
    assert_eq!(into(&merged).value(), Some(Ok(expected)));
}

#[test]
fn empty_branches() {
    let empties = merge(nested(vec![Text::empty(), Text::empty()]));
    assert_eq!(into(&empties).value(), Some(Ok(vec![])));
    let mixed = merge(nested(vec![Text::empty(), words(&["1", "2"]), Text::empty()]));
    assert_eq!(into(&mixed).value(), Some(Ok(vec!["1", "2"])));
    assert!(merge(Source::<Text>::empty()).is_empty());
}

#[test]
fn merges_merged_streams() {
    let inner = merge(nested(vec![words(&["1", "2"]), words(&["a", "b"])]));
    let outer = merge(nested(vec![words(&[">"]), inner, Text::empty()]));
    assert_eq!(into(&outer).value(), Some(Ok(vec![">", "1", "2", "a", "b"])));
}

#[test]
fn orders_by_time() {
    let event_loop = EventLoop::new();
    let delayed = words(&["3", "2", "1"]).delay(event_loop.clone());
    let merged = merge(nested(vec![
        delayed.clone(),
        words(&["|"]),
        delayed,
        words(&["a", "b"]),
        Text::empty(),
    ]));
    assert_eq!(
        drained(&event_loop, &merged),
        Ok(vec!["|", "a", "b", "3", "3", "2", "2", "1", "1"])
    );
}

#[test]
fn errors_end_the_merge() {
    let event_loop = EventLoop::new();
    let broken = words(&["3", "2", "1"])
        .concat(Source::error(Failure::new("Boom!")))
        .delay(event_loop.clone());
    let merged = merge(nested(vec![words(&[">"]), broken, words(&["1", "2"])]));
    let recovered = merged.capture(|_| words(&["Boom!"]));
    assert_eq!(
        drained(&event_loop, &recovered),
        Ok(vec![">", "1", "2", "3", "2", "1", "Boom!"])
    );
}

#[test]
fn first_error_wins() {
    let event_loop = EventLoop::new();
    let first = Text::error(Failure::new("first")).delay(event_loop.clone());
    let second = words(&["late"])
        .concat(Text::error(Failure::new("second")))
        .delay_by(event_loop.clone(), Duration::from_millis(20));
    let merged = merge(nested(vec![second, first]));
    assert_eq!(drained(&event_loop, &merged), Err(Failure::new("first")));
}

#[test]
fn stop_reaches_every_branch() {
    let event_loop = EventLoop::new();
    let left = words(&["a", "b", "c"]).delay(event_loop.clone());
    let right = words(&["x", "y", "z"]).delay(event_loop.clone());
    let merged = merge(nested(vec![left, right])).take(3);
    assert_eq!(drained(&event_loop, &merged), Ok(vec!["a", "x", "b"]));
    assert!(event_loop.is_idle());
}

#[test]
fn expand_maps_then_merges() {
    let event_loop = EventLoop::new();
    let expanded = Source::<u64>::from(vec![3, 1, 2]).expand({
        let event_loop = event_loop.clone();
        move |x| {
            Source::from(vec![None, Some(x)])
                .delay_by(event_loop.clone(), Duration::from_millis(10 * x))
                .filter_map(|v| v)
        }
    });
    let result = into(&expanded);
    event_loop.run();
    assert_eq!(result.value(), Some(Ok(vec![1, 2, 3])));
}

#[test]
fn values_sent_during_a_delivery_are_queued() {
    let left = Event::<&'static str>::new();
    let right = Event::<&'static str>::new();
    let inner = right.clone();
    let merged = merge(nested(vec![left.source(), right.source()])).map(move |x| {
        if x == "a" {
            inner.emit("b");
        }
        x
    });
    let values = into(&merged);
    left.emit("a");
    left.emit("c");
    left.end();
    assert!(values.is_pending());
    right.end();
    assert_eq!(values.value(), Some(Ok(vec!["a", "b", "c"])));
}
