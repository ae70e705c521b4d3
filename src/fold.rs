//! Terminal reductions into an [`Eventual`].
use crate::eventual::{eventual, Eventual, Resolver};
use crate::item::{Flow, Item, Step};
use crate::source::Source;

fn settle<A, E>(resolver: &mut Resolver<Result<A, E>>, state: &mut Option<A>, error: Option<E>) {
    let outcome = match error {
        Some(error) => Err(error),
        None => match state.take() {
            Some(accumulated) => Ok(accumulated),
            None => return,
        },
    };
    resolver.resolve(outcome);
}

/// Accumulates every value of `source` with `f`, starting from `initial`.
///
/// The result resolves once the source ends, errors, or `f` returns
/// [`Step::Stop`]. A stop wins over anything the source would have
/// produced afterwards, errors included.
///
/// ```rust
/// use reducers::{fold, Source};
///
/// let numbers: Source<i32> = Source::from(vec![1, 2, 3, 4]);
/// assert_eq!(fold(&numbers, |x, sum| sum + x, 0).value(), Some(Ok(10)));
/// assert_eq!(fold(&Source::<i32>::empty(), |x, sum| sum + x, 7).value(), Some(Ok(7)));
/// ```
pub fn fold<T, E, A, R, F>(source: &Source<T, E>, mut f: F, initial: A) -> Eventual<Result<A, E>>
where
    T: Clone + 'static,
    E: Clone + 'static,
    A: Clone + 'static,
    R: Into<Step<A>>,
    F: FnMut(T, A) -> R + 'static,
{
    try_fold(source, move |value, accumulated| Ok(f(value, accumulated)), initial)
}

/// Like [`fold`], but `f` may fail. The first `Err` it returns resolves
/// the result with that error and stops the drive.
///
/// ```rust
/// use reducers::{try_fold, Failure, Source};
///
/// let numbers: Source<u8> = Source::from(vec![100, 100, 100]);
/// let total = try_fold(
///     &numbers,
///     |x, sum: u8| sum.checked_add(x).ok_or_else(|| Failure::new("overflow")),
///     0,
/// );
/// assert_eq!(total.value(), Some(Err(Failure::new("overflow"))));
/// ```
pub fn try_fold<T, E, A, R, F>(source: &Source<T, E>, mut f: F, initial: A) -> Eventual<Result<A, E>>
where
    T: Clone + 'static,
    E: Clone + 'static,
    A: Clone + 'static,
    R: Into<Step<A>>,
    F: FnMut(T, A) -> Result<R, E> + 'static,
{
    let (mut resolver, result) = eventual();
    let mut state = Some(initial);
    source.drive(Box::new(move |item| {
        match item {
            Item::Value(value) => {
                let Some(accumulated) = state.take() else {
                    return Flow::Stop;
                };
                match f(value, accumulated).map(Into::<Step<A>>::into) {
                    Ok(Step::Continue(accumulated)) => {
                        state = Some(accumulated);
                        return Flow::Continue;
                    }
                    Ok(Step::Stop(accumulated)) => {
                        state = Some(accumulated);
                        settle(&mut resolver, &mut state, None);
                    }
                    Err(error) => settle(&mut resolver, &mut state, Some(error)),
                }
            }
            Item::Error(error) => settle(&mut resolver, &mut state, Some(error)),
            Item::End => settle(&mut resolver, &mut state, None),
        }
        Flow::Stop
    }));
    result
}

/// Collects every value of `source` into a `Vec`.
///
/// ```rust
/// use reducers::{into, Source};
///
/// let letters: Source<char> = Source::from("abc");
/// assert_eq!(into(&letters).value(), Some(Ok(vec!['a', 'b', 'c'])));
/// ```
pub fn into<T, E>(source: &Source<T, E>) -> Eventual<Result<Vec<T>, E>>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    into_buffer(source, Vec::new())
}

/// Collects every value of `source` onto the end of `buffer`.
pub fn into_buffer<T, E, B>(source: &Source<T, E>, buffer: B) -> Eventual<Result<B, E>>
where
    T: Clone + 'static,
    E: Clone + 'static,
    B: Extend<T> + Clone + 'static,
{
    fold(
        source,
        |value, mut buffer: B| {
            buffer.extend(Some(value));
            buffer
        },
        buffer,
    )
}
