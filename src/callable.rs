//! The callable abstraction every unit and wrapper implements
//!
//! A unit takes a positional argument value `A` (usually a tuple) plus a
//! map of keyword arguments and produces one output. Wrappers implement the
//! same trait, so a wrapped unit can stand in anywhere the bare unit could.

use crate::error::{CallError, CallResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock, Weak};

/// Keyword arguments, ordered by key
///
/// Renders as a JSON object, `{}` when empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kwargs(BTreeMap<String, Value>);

impl Kwargs {
    /// Create an empty keyword map
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a keyword argument, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl fmt::Display for Kwargs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Kwargs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A unit of computation with a fixed invocation signature
///
/// `A` is the positional argument value. The trait is object safe, so
/// `dyn Callable<A, Output = O>` can be used wherever the concrete type
/// is not known until runtime.
pub trait Callable<A> {
    /// Value produced by a successful call
    type Output;

    /// Stable name used in log records and errors
    fn name(&self) -> &str;

    /// Invoke the unit
    fn call(&self, args: A, kwargs: &Kwargs) -> CallResult<Self::Output>;

    /// Invoke the unit with no keyword arguments
    fn call_positional(&self, args: A) -> CallResult<Self::Output> {
        self.call(args, &Kwargs::new())
    }
}

impl<A, C: Callable<A> + ?Sized> Callable<A> for &C {
    type Output = C::Output;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn call(&self, args: A, kwargs: &Kwargs) -> CallResult<Self::Output> {
        (**self).call(args, kwargs)
    }
}

impl<A, C: Callable<A> + ?Sized> Callable<A> for Box<C> {
    type Output = C::Output;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn call(&self, args: A, kwargs: &Kwargs) -> CallResult<Self::Output> {
        (**self).call(args, kwargs)
    }
}

impl<A, C: Callable<A> + ?Sized> Callable<A> for Arc<C> {
    type Output = C::Output;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn call(&self, args: A, kwargs: &Kwargs) -> CallResult<Self::Output> {
        (**self).call(args, kwargs)
    }
}

/// Shared, type-erased callable
pub type BoxedCallable<A, O> = Arc<dyn Callable<A, Output = O> + Send + Sync>;

/// A named closure
pub struct FnUnit<F, A, O> {
    name: String,
    func: F,
    _signature: PhantomData<fn(A) -> O>,
}

/// Turn a closure into a named unit
///
/// ```
/// use callwrap::{unit, Callable};
///
/// let add = unit("add", |(a, b): (i64, i64), _| Ok(a + b));
/// assert_eq!(add.call_positional((2, 3)).unwrap(), 5);
/// ```
pub fn unit<F, A, O>(name: impl Into<String>, func: F) -> FnUnit<F, A, O>
where
    F: Fn(A, &Kwargs) -> CallResult<O>,
{
    FnUnit {
        name: name.into(),
        func,
        _signature: PhantomData,
    }
}

impl<F, A, O> Callable<A> for FnUnit<F, A, O>
where
    F: Fn(A, &Kwargs) -> CallResult<O>,
{
    type Output = O;

    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, args: A, kwargs: &Kwargs) -> CallResult<O> {
        (self.func)(args, kwargs)
    }
}

type RecursiveBody<A, O> =
    dyn Fn(&dyn Callable<A, Output = O>, A, &Kwargs) -> CallResult<O> + Send + Sync;

/// A unit whose body calls back into "itself"
///
/// The body receives a handle to recurse through. Once [`Recursive::bind`]
/// has been given the composed callable (for example a memoized wrapper
/// around this unit), every recursive call goes through that wrapper and
/// shares its cache. Until then, or after the wrapper is dropped, the body
/// recurses through its own bare body and no wrapper sees the subcalls.
///
/// The back reference is weak: the wrapper owns the unit, never the
/// other way around.
pub struct Recursive<A, O> {
    name: String,
    body: Box<RecursiveBody<A, O>>,
    outer: OnceLock<Weak<dyn Callable<A, Output = O> + Send + Sync>>,
}

impl<A: 'static, O: 'static> Recursive<A, O> {
    /// Create a recursive unit; the first body argument is the recursion handle
    pub fn new<F>(name: impl Into<String>, body: F) -> Arc<Self>
    where
        F: Fn(&dyn Callable<A, Output = O>, A, &Kwargs) -> CallResult<O> + Send + Sync + 'static,
    {
        Arc::new(Self {
            name: name.into(),
            body: Box::new(body),
            outer: OnceLock::new(),
        })
    }

    /// Route recursive calls through `outer`
    ///
    /// Can only be done once per unit.
    pub fn bind(&self, outer: &BoxedCallable<A, O>) -> CallResult<()> {
        self.outer
            .set(Arc::downgrade(outer))
            .map_err(|_| CallError::AlreadyBound(self.name.clone()))
    }

    /// Whether recursion currently reaches a live wrapper
    pub fn is_bound(&self) -> bool {
        self.outer
            .get()
            .is_some_and(|outer| outer.strong_count() > 0)
    }
}

impl<A: 'static, O: 'static> Callable<A> for Recursive<A, O> {
    type Output = O;

    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, args: A, kwargs: &Kwargs) -> CallResult<O> {
        match self.outer.get().and_then(Weak::upgrade) {
            Some(outer) => (self.body)(&*outer, args, kwargs),
            None => (self.body)(self, args, kwargs),
        }
    }
}
