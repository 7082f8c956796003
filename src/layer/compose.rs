//! Runtime composition from behavior lists

use crate::callable::BoxedCallable;
use crate::error::CallError;
use crate::layer::behavior::Behavior;
use crate::layer::Layer;
use crate::sink::CallSink;
use crate::wrappers::{Logged, Memoized, RolePolicy};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// What a behavior needs from its surroundings when it is applied
#[derive(Clone)]
pub struct WrapContext {
    /// Where `log` behaviors write
    pub sink: Arc<dyn CallSink>,

    /// Caller role bound into `authorize` behaviors that don't name one
    pub caller_role: String,
}

impl WrapContext {
    pub fn new(sink: Arc<dyn CallSink>, caller_role: impl Into<String>) -> Self {
        Self {
            sink,
            caller_role: caller_role.into(),
        }
    }
}

/// Apply one behavior to a unit
pub fn wrap<A, O>(
    unit: BoxedCallable<A, O>,
    behavior: &Behavior,
    ctx: &WrapContext,
) -> BoxedCallable<A, O>
where
    A: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    O: Clone + Debug + Send + Sync + 'static,
{
    match behavior {
        Behavior::Log => Arc::new(Logged::new(unit, Arc::clone(&ctx.sink))),
        Behavior::Authorize { role, caller } => {
            let caller = caller.as_deref().unwrap_or(&ctx.caller_role);
            Arc::new(RolePolicy::require(role.as_str()).for_caller(caller).wrap(unit))
        }
        Behavior::Memoize => Arc::new(Memoized::new(unit)),
    }
}

/// Ordered list of behaviors, innermost first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stack {
    behaviors: Vec<Behavior>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a behavior outside everything added so far
    pub fn with(mut self, behavior: Behavior) -> Self {
        self.behaviors.push(behavior);
        self
    }

    pub fn behaviors(&self) -> &[Behavior] {
        &self.behaviors
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    /// Wrap `unit` in every behavior, first one innermost
    pub fn compose<A, O>(
        &self,
        unit: BoxedCallable<A, O>,
        ctx: &WrapContext,
    ) -> BoxedCallable<A, O>
    where
        A: Eq + Hash + Clone + Debug + Send + Sync + 'static,
        O: Clone + Debug + Send + Sync + 'static,
    {
        debug!(unit = unit.name(), stack = %self, "Composing");
        self.behaviors
            .iter()
            .fold(unit, |inner, behavior| wrap(inner, behavior, ctx))
    }
}

impl From<Vec<Behavior>> for Stack {
    fn from(behaviors: Vec<Behavior>) -> Self {
        Self { behaviors }
    }
}

impl FromStr for Stack {
    type Err = CallError;

    /// Comma-separated short forms, e.g. `log,memoize,authorize:admin`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Behavior::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::from)
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.behaviors.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::{unit, Callable, Kwargs, Recursive};
    use crate::sink::MemorySink;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn ctx(sink: Arc<MemorySink>, role: &str) -> WrapContext {
        WrapContext::new(sink, role)
    }

    #[test]
    fn parses_and_displays() {
        let stack: Stack = "log, memoize,authorize:admin".parse().unwrap();
        assert_eq!(
            stack.behaviors(),
            &[Behavior::Log, Behavior::Memoize, Behavior::authorize("admin")]
        );
        assert_eq!(stack.to_string(), "log,memoize,authorize:admin");
        assert!("".parse::<Stack>().unwrap().is_empty());
    }

    #[test]
    fn duplicate_behaviors_are_kept() {
        let sink = Arc::new(MemorySink::new());
        let stack = Stack::new().with(Behavior::Log).with(Behavior::Log);
        let add: BoxedCallable<(i64, i64), i64> =
            Arc::new(unit("add", |(a, b): (i64, i64), _| Ok(a + b)));

        let composed = stack.compose(add, &ctx(sink.clone(), "user"));
        composed.call_positional((1, 1)).unwrap();

        assert_eq!(sink.records().len(), 4);
    }

    #[test]
    fn authorize_uses_context_role_unless_overridden() {
        let sink = Arc::new(MemorySink::new());
        let noop: BoxedCallable<(), ()> = Arc::new(unit("noop", |_: (), _| Ok(())));

        let denied = wrap(
            noop.clone(),
            &Behavior::authorize("admin"),
            &ctx(sink.clone(), "user"),
        );
        assert!(denied.call_positional(()).unwrap_err().is_forbidden());

        let overridden = Behavior::Authorize {
            role: "admin".to_string(),
            caller: Some("admin".to_string()),
        };
        let allowed = wrap(noop, &overridden, &ctx(sink, "user"));
        assert!(allowed.call_positional(()).is_ok());
    }

    #[test]
    fn composed_recursion_shares_the_cache() {
        let calls = Arc::new(AtomicU64::new(0));
        let seen = calls.clone();
        let fib = Recursive::new("fib", move |fib, n: u64, kwargs: &Kwargs| {
            seen.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                return Ok(n);
            }
            Ok(fib.call(n - 1, kwargs)? + fib.call(n - 2, kwargs)?)
        });

        let sink = Arc::new(MemorySink::new());
        let stack: Stack = "log,memoize".parse().unwrap();
        let base: BoxedCallable<u64, u64> = fib.clone();
        let composed = stack.compose(base, &ctx(sink.clone(), "user"));
        fib.bind(&composed).unwrap();

        assert_eq!(composed.call_positional(10).unwrap(), 55);
        assert_eq!(calls.load(Ordering::SeqCst), 11);
        // Logging sits inside the cache, so only misses are logged.
        assert_eq!(sink.records().len(), 22);
    }
}
