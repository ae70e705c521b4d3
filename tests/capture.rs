extern crate reducers;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use reducers::{concat, into, Failure, Source};

fn values(source: &Source<String>) -> Vec<String> {
    into(source).value().expect("synchronous drive").expect("no error")
}

fn strings(items: &[&str]) -> Source<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn reading<T: ToString + 'static>(f: impl Fn() -> T + 'static) -> Source<String> {
    Source::lazy(move || Source::value(f().to_string()))
}

#[test]
fn empty_stream_is_never_recovered() {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let captured = Source::<String>::empty().capture(move |_| {
        counter.set(counter.get() + 1);
        Source::empty()
    });
    let calls_now = calls.clone();
    let actual = concat([captured, reading(move || calls_now.get())]);
    assert_eq!(values(&actual), vec!["0"]);
}

#[test]
fn healthy_stream_is_untouched() {
    let captured = strings(&["1", "2"]).capture(|_| strings(&["3", "4"]));
    assert_eq!(values(&captured), vec!["1", "2"]);
}

#[test]
fn error_is_substituted() {
    let captured = Source::<String>::error(Failure::new("Boom!"))
        .capture(|error| strings(&["catch", error.message()]));
    assert_eq!(values(&captured), vec!["catch", "Boom!"]);
}

#[test]
fn recovery_may_leak_errors() {
    let source = concat([strings(&["h", "i"]), Source::error(Failure::new("Boom!"))]);
    let captured = source.capture(|error| {
        concat([
            Source::value(error.message().to_string()),
            Source::error(Failure::new("brax")),
        ])
    });
    let actual = captured.capture(|error| Source::value(error.message().to_string()));
    assert_eq!(values(&actual), vec!["h", "i", "Boom!", "brax"]);
}

#[test]
fn recovers_on_every_drive() {
    let calls = Rc::new(Cell::new(0));
    let reason = Rc::new(RefCell::new(String::new()));
    let (counter, last) = (calls.clone(), reason.clone());
    let captured = Source::<String>::error(Failure::new("Boom!!")).capture(move |error| {
        counter.set(counter.get() + 1);
        *last.borrow_mut() = error.message().to_string();
        Source::empty()
    });
    let count = || {
        let calls = calls.clone();
        reading(move || calls.get())
    };
    let message = || {
        let reason = reason.clone();
        reading(move || reason.borrow().clone())
    };
    let actual = concat([captured.clone(), count(), message(), captured, count(), message()]);
    assert_eq!(values(&actual), vec!["1", "Boom!!", "2", "Boom!!"]);
}

#[test]
fn substitution_is_lazy() {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let broken = concat([strings(&["1", "2", "3", "4"]), Source::error(Failure::new("boom"))]);
    let captured = broken.capture(move |_| {
        counter.set(counter.get() + 1);
        strings(&["5", "6", "7"])
    });
    let count = || {
        let calls = calls.clone();
        reading(move || calls.get())
    };
    let actual = concat([captured.clone().take(1), count(), captured, count()]);
    assert_eq!(
        values(&actual),
        vec!["1", "0", "1", "2", "3", "4", "5", "6", "7", "1"]
    );
}

#[test]
fn empty_recovery_ends_the_stream() {
    let broken = concat([strings(&["1", "2", "3"]), Source::error(Failure::new("Boom!"))]);
    let captured = broken.capture(|_| Source::empty());
    assert_eq!(values(&captured), vec!["1", "2", "3"]);
}
