//! Run command - invoke a built-in unit through a wrapper stack

use crate::builtin::{self, Positional};
use crate::callable::{Callable, Kwargs};
use crate::cli::args::RunArgs;
use crate::config::Config;
use crate::error::CallResult;
use crate::layer::{Behavior, Stack, WrapContext};
use crate::sink;
use tracing::{debug, info};

/// Execute the run command
pub fn execute(args: RunArgs, config: &Config) -> CallResult<()> {
    let unit = builtin::resolve(&args.unit)?;
    let positional = Positional::parse(&args.unit, &args.args)?;
    let kwargs: Kwargs = args.kwargs.into_iter().collect();

    let stack = select_stack(args.bare, args.stack, config);
    let caller_role = args
        .caller
        .unwrap_or_else(|| config.identity.role.clone());
    debug!("Caller role: {}", caller_role);

    let ctx = WrapContext::new(sink::from_config(&config.logging), caller_role);
    let composed = unit.compose(&stack, &ctx)?;

    let mut result = None;
    for _ in 0..args.repeat {
        result = Some(composed.callable.call(positional.clone(), &kwargs)?);
    }

    if let Some(value) = result {
        println!("{}", value);
    }
    info!(
        "{} base computation(s) for {} call(s) through [{}]",
        composed.computations(),
        args.repeat,
        stack
    );

    Ok(())
}

/// `--bare` wins, then an explicit `--stack`, then the configured stack
fn select_stack(bare: bool, explicit: Vec<Behavior>, config: &Config) -> Stack {
    if bare {
        Stack::new()
    } else if !explicit.is_empty() {
        Stack::from(explicit)
    } else {
        config.stack.behaviors.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_overrides_config() {
        let config = Config::default();
        assert!(select_stack(true, vec![], &config).is_empty());
    }

    #[test]
    fn explicit_stack_overrides_config() {
        let config = Config::default();
        let stack = select_stack(false, vec![Behavior::Memoize], &config);
        assert_eq!(stack.behaviors(), &[Behavior::Memoize]);
    }

    #[test]
    fn falls_back_to_config() {
        let config = Config::default();
        assert_eq!(select_stack(false, vec![], &config), config.stack.behaviors);
    }
}
