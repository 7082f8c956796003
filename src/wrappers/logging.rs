//! Pre/post call logging

use crate::callable::{Callable, Kwargs};
use crate::error::CallResult;
use crate::layer::Layer;
use crate::sink::{CallRecord, CallSink};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

/// Emits a record before and after each call to the inner unit
///
/// If the inner unit fails, the "started" record has already been written
/// and no "returned" record follows. The error is passed through as is.
pub struct Logged<C> {
    inner: C,
    name: Option<String>,
    sink: Arc<dyn CallSink>,
}

impl<C> Logged<C> {
    pub fn new(inner: C, sink: Arc<dyn CallSink>) -> Self {
        Self {
            inner,
            name: None,
            sink,
        }
    }

    /// Log under a different name than the inner unit reports
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl<A, C> Callable<A> for Logged<C>
where
    A: Debug,
    C: Callable<A>,
    C::Output: Debug,
{
    type Output = C::Output;

    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.inner.name())
    }

    fn call(&self, args: A, kwargs: &Kwargs) -> CallResult<Self::Output> {
        let name = self.name.as_deref().unwrap_or_else(|| self.inner.name());
        self.sink.record(&CallRecord::started(name, &args, kwargs));

        match self.inner.call(args, kwargs) {
            Ok(result) => {
                self.sink.record(&CallRecord::returned(name, &result));
                Ok(result)
            }
            Err(e) => {
                debug!(unit = name, error = %e, "Call failed, no return record");
                Err(e)
            }
        }
    }
}

/// Layer form of [`Logged`]
#[derive(Clone)]
pub struct LogLayer {
    sink: Arc<dyn CallSink>,
    name: Option<String>,
}

impl LogLayer {
    pub fn new(sink: Arc<dyn CallSink>) -> Self {
        Self { sink, name: None }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl<C> Layer<C> for LogLayer {
    type Wrapped = Logged<C>;

    fn wrap(self, unit: C) -> Logged<C> {
        Logged {
            inner: unit,
            name: self.name,
            sink: self.sink,
        }
    }
}
