//! callwrap - composable call wrappers
//!
//! Wraps a callable in logging, role-based guards and result memoization
//! without touching the callable itself. Wrapped units keep the exact call
//! signature of the unit inside them, so stacks of wrappers compose freely.

pub mod builtin;
pub mod callable;
pub mod cli;
pub mod config;
pub mod error;
pub mod layer;
pub mod sink;
pub mod wrappers;

pub use callable::{unit, BoxedCallable, Callable, FnUnit, Kwargs, Recursive};
pub use error::{CallError, CallResult};
pub use layer::{Behavior, CallableExt, Layer, Stack, WrapContext};
pub use sink::{CallRecord, CallSink, JsonLinesSink, MemorySink, StdoutSink, TracingSink};
pub use wrappers::{
    CacheStats, LogLayer, Logged, Memoized, RoleGuardLayer, RoleGuarded, RolePolicy,
};
