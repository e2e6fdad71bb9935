//! Lazily-evaluated, restartable emission sequences.
//!
//! A [`LazySequence`] is a *description* of a production procedure, not a
//! running producer: nothing executes until a collection run is started,
//! and every run builds a fresh producer future with fresh state. The
//! producer emits values through an [`Emitter`] and may suspend on the
//! virtual clock between emissions, so a consumer only observes values as
//! the test driver advances time.

use crate::cx::Cx;
use crate::error::Error;
use crate::stream::{Stream, StreamExt};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

type ProducerFuture = Pin<Box<dyn Future<Output = Result<(), Error>>>>;
type ProducerFactory<T> = dyn Fn(Cx, Emitter<T>) -> ProducerFuture;

/// Handle a producer uses to emit values into the current collection run.
///
/// Emitting never suspends; values queue until the consuming stream
/// drains them at its next poll boundary, preserving production order.
pub struct Emitter<T> {
    queue: Rc<RefCell<VecDeque<T>>>,
}

impl<T> Emitter<T> {
    /// Emits a value into the current collection run.
    pub fn emit(&self, value: T) {
        self.queue.borrow_mut().push_back(value);
    }
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            queue: Rc::clone(&self.queue),
        }
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("queued", &self.queue.borrow().len())
            .finish()
    }
}

/// A restartable, pull-driven producer of values.
///
/// # Example
///
/// ```ignore
/// let sequence = LazySequence::new(move |cx, emitter| async move {
///     for round in 0..5 {
///         cx.sleep(Duration::from_millis(100)).await;
///         emitter.emit(round);
///     }
///     Ok(())
/// });
///
/// sequence.collect(&cx, |value| observed.push(value)).await?;
/// ```
///
/// Each [`collect`](Self::collect) (or [`stream`](Self::stream)) call
/// re-executes the production procedure from the beginning; no state is
/// shared between runs.
pub struct LazySequence<T> {
    factory: Box<ProducerFactory<T>>,
}

impl<T> LazySequence<T> {
    /// Creates a sequence from a producer factory.
    ///
    /// `factory` is invoked once per collection run. It receives the
    /// collecting task's capability context (for virtual-time delays) and
    /// the run's emitter.
    pub fn new<F, Fut>(factory: F) -> Self
    where
        F: Fn(Cx, Emitter<T>) -> Fut + 'static,
        Fut: Future<Output = Result<(), Error>> + 'static,
    {
        Self {
            factory: Box::new(move |cx, emitter| Box::pin(factory(cx, emitter))),
        }
    }

    /// Starts a fresh collection run as a [`Stream`].
    ///
    /// The stream is cold: the producer does not execute until the stream
    /// is polled. Values arrive as `Ok` items in production order; a
    /// producer failure terminates the stream with one `Err` item after
    /// any already-emitted values have been delivered.
    #[must_use]
    pub fn stream(&self, cx: &Cx) -> SequenceStream<T> {
        let queue = Rc::new(RefCell::new(VecDeque::new()));
        let emitter = Emitter {
            queue: Rc::clone(&queue),
        };
        SequenceStream {
            queue,
            producer: Some((self.factory)(cx.clone(), emitter)),
            failure: None,
        }
    }

    /// Drives a fresh collection run to completion, invoking `on_each`
    /// once per produced value, in production order.
    ///
    /// If the producer suspends on the virtual clock, the collecting task
    /// suspends with it and resumes when the scheduler releases it.
    ///
    /// # Errors
    ///
    /// A producer failure surfaces here, to the immediate caller. Values
    /// emitted before the failure have already been delivered to
    /// `on_each`.
    pub async fn collect<F>(&self, cx: &Cx, mut on_each: F) -> Result<(), Error>
    where
        F: FnMut(T),
    {
        let mut stream = self.stream(cx);
        while let Some(item) = stream.next().await {
            on_each(item?);
        }
        Ok(())
    }
}

impl<T> fmt::Debug for LazySequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazySequence").finish_non_exhaustive()
    }
}

/// A single collection run of a [`LazySequence`].
///
/// Created by [`LazySequence::stream`].
pub struct SequenceStream<T> {
    queue: Rc<RefCell<VecDeque<T>>>,
    producer: Option<ProducerFuture>,
    failure: Option<Error>,
}

impl<T> Stream for SequenceStream<T> {
    type Item = Result<T, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            // Deliver values already produced before driving the producer
            // further, so emissions retain production order.
            if let Some(value) = this.queue.borrow_mut().pop_front() {
                return Poll::Ready(Some(Ok(value)));
            }
            match this.producer.as_mut() {
                Some(producer) => match producer.as_mut().poll(cx) {
                    Poll::Ready(Ok(())) => {
                        this.producer = None;
                    }
                    Poll::Ready(Err(error)) => {
                        this.producer = None;
                        this.failure = Some(error);
                    }
                    Poll::Pending => return Poll::Pending,
                },
                None => {
                    return Poll::Ready(this.failure.take().map(Err));
                }
            }
        }
    }
}

impl<T> fmt::Debug for SequenceStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceStream")
            .field("queued", &self.queue.borrow().len())
            .field("running", &self.producer.is_some())
            .finish()
    }
}
