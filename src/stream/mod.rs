//! Async stream processing primitives.
//!
//! This module provides the [`Stream`] trait, the [`LazySequence`]
//! emission abstraction built on it, and small adaptors for tests.
//!
//! # Core Traits
//!
//! - [`Stream`]: The async equivalent of [`Iterator`], producing values
//!   over time
//! - [`StreamExt`]: Combinator extension methods (currently [`next`](StreamExt::next))
//!
//! # Producers
//!
//! - [`LazySequence`]: restartable production procedure collected once
//!   per run
//! - [`iter`]: converts any iterator into an always-ready stream

mod iter;
mod next;
mod sequence;
mod stream;

pub use iter::{iter, Iter};
pub use next::Next;
pub use sequence::{Emitter, LazySequence, SequenceStream};
pub use stream::Stream;

/// Extension methods for [`Stream`].
pub trait StreamExt: Stream {
    /// Returns a future resolving to the next item in the stream, or
    /// `None` once the stream has terminated.
    fn next(&mut self) -> Next<'_, Self>
    where
        Self: Unpin,
    {
        Next::new(self)
    }
}

impl<S: Stream + ?Sized> StreamExt for S {}
