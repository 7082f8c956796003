//! Built-in integer units for the command line
//!
//! All built-ins share one signature, [`Positional`] in and `i64` out, so any
//! of them can be run through any stack.

use crate::callable::{unit, BoxedCallable, Callable, Kwargs, Recursive};
use crate::error::{CallError, CallResult};
use crate::layer::{Stack, WrapContext};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Integer positional arguments; `Debug` renders like a tuple
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Positional(pub Vec<i64>);

impl Positional {
    /// Parse command line values
    pub fn parse(unit: &str, raw: &[String]) -> CallResult<Self> {
        raw.iter()
            .map(|value| {
                value.trim().parse::<i64>().map_err(|_| {
                    CallError::invalid_args(unit, format!("'{}' is not an integer", value))
                })
            })
            .collect::<CallResult<Vec<_>>>()
            .map(Self)
    }

    fn exactly<const N: usize>(&self, unit: &str) -> CallResult<[i64; N]> {
        <[i64; N]>::try_from(self.0.as_slice()).map_err(|_| {
            CallError::invalid_args(
                unit,
                format!("expected {} argument(s), got {}", N, self.0.len()),
            )
        })
    }
}

impl fmt::Debug for Positional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        match parts.as_slice() {
            [single] => write!(f, "({},)", single),
            _ => write!(f, "({})", parts.join(", ")),
        }
    }
}

/// Name and one-line description of every built-in
pub const UNITS: &[(&str, &str)] = &[
    ("add", "Sum of two integers"),
    ("mul", "Product of any number of integers, times the `scale` keyword (default 1)"),
    ("square", "Square of one integer"),
    ("fib", "Fibonacci number at an index, computed recursively"),
];

/// fib(92) is the largest value that fits in an `i64`
const MAX_FIB_INDEX: i64 = 92;

/// A built-in ready to be composed
pub struct BuiltinUnit {
    base: BoxedCallable<Positional, i64>,
    recursive: Option<Arc<Recursive<Positional, i64>>>,
    computations: Arc<AtomicU64>,
}

/// A composed built-in
pub struct Composed {
    pub callable: BoxedCallable<Positional, i64>,
    computations: Arc<AtomicU64>,
}

impl Composed {
    /// How many times the base body has run
    pub fn computations(&self) -> u64 {
        self.computations.load(Ordering::Relaxed)
    }
}

impl BuiltinUnit {
    pub fn name(&self) -> &str {
        self.base.name()
    }

    /// Wrap in `stack`; recursive built-ins recurse through the result
    pub fn compose(self, stack: &Stack, ctx: &WrapContext) -> CallResult<Composed> {
        let callable = stack.compose(self.base, ctx);
        if let Some(recursive) = &self.recursive {
            recursive.bind(&callable)?;
        }
        Ok(Composed {
            callable,
            computations: self.computations,
        })
    }
}

fn boxed<C>(callable: C) -> BoxedCallable<Positional, i64>
where
    C: Callable<Positional, Output = i64> + Send + Sync + 'static,
{
    Arc::new(callable)
}

fn checked(unit: &str, value: Option<i64>) -> CallResult<i64> {
    value.ok_or_else(|| CallError::failed(unit, "integer overflow"))
}

/// Look up a built-in by name
pub fn resolve(name: &str) -> CallResult<BuiltinUnit> {
    let computations = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&computations);

    let (base, recursive) = match name {
        "add" => (
            boxed(unit("add", move |args: Positional, _: &Kwargs| {
                counter.fetch_add(1, Ordering::Relaxed);
                let [a, b] = args.exactly::<2>("add")?;
                checked("add", a.checked_add(b))
            })),
            None,
        ),
        "mul" => (
            boxed(unit("mul", move |args: Positional, kwargs: &Kwargs| {
                counter.fetch_add(1, Ordering::Relaxed);
                let scale = match kwargs.get("scale") {
                    None => 1,
                    Some(v) => v.as_i64().ok_or_else(|| {
                        CallError::invalid_args("mul", "`scale` must be an integer")
                    })?,
                };
                let product = args
                    .0
                    .iter()
                    .try_fold(1i64, |acc, x| acc.checked_mul(*x));
                checked("mul", product.and_then(|p| p.checked_mul(scale)))
            })),
            None,
        ),
        "square" => (
            boxed(unit("square", move |args: Positional, _: &Kwargs| {
                counter.fetch_add(1, Ordering::Relaxed);
                let [x] = args.exactly::<1>("square")?;
                checked("square", x.checked_mul(x))
            })),
            None,
        ),
        "fib" => {
            let fib = Recursive::new("fib", move |fib, args: Positional, kwargs: &Kwargs| {
                counter.fetch_add(1, Ordering::Relaxed);
                let [n] = args.exactly::<1>("fib")?;
                if n < 0 {
                    return Err(CallError::invalid_args("fib", "index must be non-negative"));
                }
                if n > MAX_FIB_INDEX {
                    return Err(CallError::invalid_args("fib", "index must be at most 92"));
                }
                if n < 2 {
                    return Ok(n);
                }
                let a = fib.call(Positional(vec![n - 1]), kwargs)?;
                let b = fib.call(Positional(vec![n - 2]), kwargs)?;
                checked("fib", a.checked_add(b))
            });
            (boxed(fib.clone()), Some(fib))
        }
        other => return Err(CallError::UnknownUnit(other.to_string())),
    };

    Ok(BuiltinUnit {
        base,
        recursive,
        computations,
    })
}
