//! Result memoization keyed on positional arguments
//!
//! # Keying
//!
//! The key is the positional argument value, compared with `Eq`/`Hash`.
//! Keyword arguments are forwarded to the inner unit on a miss but are not
//! part of the key: two calls that differ only in keyword arguments share
//! one entry, and the second gets the first one's result.
//!
//! # Lifetime
//!
//! The cache belongs to one wrapper, starts empty and only grows. There is
//! no eviction; entries live as long as the wrapper does.
//!
//! # Recursion
//!
//! The lock is released while the inner unit runs. A [`Recursive`] unit
//! bound to this wrapper re-enters it for every subcall and shares the
//! cache. A unit that recurses through its own bare body bypasses the
//! wrapper entirely and gets no benefit; binding is up to the caller.
//!
//! [`Recursive`]: crate::callable::Recursive

use crate::callable::{Callable, Kwargs};
use crate::error::{CallError, CallResult};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard};
use tracing::trace;

/// Statistics about memo cache usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Calls answered from the cache
    pub hits: u64,
    /// Calls that ran the inner unit
    pub misses: u64,
    /// Number of stored results
    pub entries: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Caches the inner unit's successful results
///
/// Each key is written at most once. Concurrent misses on the same key may
/// both run the inner unit; the first result stored wins and every caller
/// gets the stored value back. Failures are never cached.
pub struct Memoized<C, A, O> {
    inner: C,
    cache: RwLock<HashMap<A, O>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<C, A, O> Memoized<C, A, O>
where
    A: Eq + Hash,
{
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

impl<C, A, O> Memoized<C, A, O>
where
    C: Callable<A, Output = O>,
    A: Eq + Hash,
{
    pub fn stats(&self) -> CallResult<CacheStats> {
        Ok(CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len()? as u64,
        })
    }

    pub fn len(&self) -> CallResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> CallResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Whether a result is stored for these arguments
    pub fn contains(&self, args: &A) -> CallResult<bool> {
        Ok(self.read()?.contains_key(args))
    }

    /// A poisoned lock fails every access, reads included
    fn read(&self) -> CallResult<RwLockReadGuard<'_, HashMap<A, O>>> {
        self.cache
            .read()
            .map_err(|_| CallError::CachePoisoned(self.inner.name().to_string()))
    }

    fn lookup(&self, args: &A) -> CallResult<Option<O>>
    where
        O: Clone,
    {
        Ok(self.read()?.get(args).cloned())
    }

    /// Store `value` unless an entry already exists; returns the stored value
    fn store(&self, args: A, value: O) -> CallResult<O>
    where
        O: Clone,
    {
        let mut cache = self
            .cache
            .write()
            .map_err(|_| CallError::CachePoisoned(self.inner.name().to_string()))?;
        Ok(cache.entry(args).or_insert(value).clone())
    }
}

impl<C, A, O> Callable<A> for Memoized<C, A, O>
where
    C: Callable<A, Output = O>,
    A: Eq + Hash + Clone,
    O: Clone,
{
    type Output = O;

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn call(&self, args: A, kwargs: &Kwargs) -> CallResult<O> {
        if let Some(hit) = self.lookup(&args)? {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(unit = self.inner.name(), "Memo hit");
            return Ok(hit);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!(unit = self.inner.name(), "Memo miss");

        let value = self.inner.call(args.clone(), kwargs)?;
        self.store(args, value)
    }
}
