//! Wrappers that add behavior around a callable
//!
//! Each wrapper implements [`Callable`](crate::Callable) with the same
//! argument and output types as the unit it wraps.

pub mod authorize;
pub mod logging;
pub mod memoize;

pub use authorize::{RoleGuardLayer, RoleGuarded, RolePolicy};
pub use logging::{LogLayer, Logged};
pub use memoize::{CacheStats, Memoized};
