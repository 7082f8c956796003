//! Composable wrapper layers
//!
//! Wrappers nest: the last one applied is the outermost, runs its entry
//! logic first and its exit logic last. Order is exactly what the caller
//! wrote; nothing is reordered or deduplicated.
//!
//! Two ways to build a stack:
//!
//! - statically, through [`CallableExt`] and [`Layer`], which keeps the
//!   concrete wrapper types;
//! - dynamically, from a list of [`Behavior`]s (for example read from the
//!   config file), which yields a [`BoxedCallable`](crate::BoxedCallable).

pub mod behavior;
pub mod compose;

pub use behavior::Behavior;
pub use compose::{wrap, Stack, WrapContext};

use crate::callable::Callable;
use crate::sink::CallSink;
use crate::wrappers::{Logged, Memoized, RoleGuardLayer, RoleGuarded};
use std::hash::Hash;
use std::sync::Arc;

/// Turns one callable into another with added behavior
pub trait Layer<C> {
    /// The wrapped callable
    type Wrapped;

    fn wrap(self, unit: C) -> Self::Wrapped;
}

/// Wrapping shortcuts available on every callable
///
/// Each method consumes the receiver and returns it wrapped, so chained
/// calls read innermost-first:
///
/// ```
/// use callwrap::{unit, Callable, CallableExt, MemorySink, RolePolicy};
/// use std::sync::Arc;
///
/// let sink = Arc::new(MemorySink::new());
/// let add = unit("add", |(a, b): (i64, i64), _| Ok(a + b))
///     .logged(sink.clone())
///     .guarded(RolePolicy::require("admin").for_caller("admin"));
///
/// assert_eq!(add.call_positional((2, 3)).unwrap(), 5);
/// assert_eq!(sink.lines().len(), 2);
/// ```
pub trait CallableExt<A>: Callable<A> + Sized {
    /// Apply an arbitrary layer
    fn layer<L: Layer<Self>>(self, layer: L) -> L::Wrapped {
        layer.wrap(self)
    }

    fn logged(self, sink: Arc<dyn CallSink>) -> Logged<Self> {
        Logged::new(self, sink)
    }

    fn guarded(self, guard: RoleGuardLayer) -> RoleGuarded<Self> {
        guard.wrap(self)
    }

    fn memoized(self) -> Memoized<Self, A, Self::Output>
    where
        A: Eq + Hash,
    {
        Memoized::new(self)
    }
}

impl<A, C: Callable<A>> CallableExt<A> for C {}
