//! Role-based call guard
//!
//! Construction happens in two steps. [`RolePolicy::require`] fixes the
//! role a unit demands; [`RolePolicy::for_caller`] fixes the role of whoever
//! will be calling and yields a [`RoleGuardLayer`] that can wrap any number
//! of units. Both roles are fixed from then on and are not re-read per call.

use crate::callable::{Callable, Kwargs};
use crate::error::{CallError, CallResult};
use crate::layer::Layer;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The role a guarded unit requires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePolicy {
    required_role: String,
}

impl RolePolicy {
    pub fn require(role: impl Into<String>) -> Self {
        Self {
            required_role: role.into(),
        }
    }

    pub fn required_role(&self) -> &str {
        &self.required_role
    }

    /// Exact, case-sensitive comparison
    pub fn permits(&self, caller_role: &str) -> bool {
        self.required_role == caller_role
    }

    /// Bind the caller's role, producing a guard factory
    pub fn for_caller(&self, caller_role: impl Into<String>) -> RoleGuardLayer {
        RoleGuardLayer {
            policy: self.clone(),
            caller_role: caller_role.into(),
        }
    }
}

/// A policy with the caller role bound; wraps units into [`RoleGuarded`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGuardLayer {
    policy: RolePolicy,
    caller_role: String,
}

impl RoleGuardLayer {
    pub fn policy(&self) -> &RolePolicy {
        &self.policy
    }

    pub fn caller_role(&self) -> &str {
        &self.caller_role
    }
}

impl<C> Layer<C> for RoleGuardLayer {
    type Wrapped = RoleGuarded<C>;

    fn wrap(self, unit: C) -> RoleGuarded<C> {
        RoleGuarded {
            inner: unit,
            policy: self.policy,
            caller_role: self.caller_role,
        }
    }
}

/// Refuses calls unless the bound caller role matches the policy
///
/// On refusal the inner unit is never invoked.
pub struct RoleGuarded<C> {
    inner: C,
    policy: RolePolicy,
    caller_role: String,
}

impl<A, C: Callable<A>> Callable<A> for RoleGuarded<C> {
    type Output = C::Output;

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn call(&self, args: A, kwargs: &Kwargs) -> CallResult<Self::Output> {
        if !self.policy.permits(&self.caller_role) {
            warn!(
                unit = self.inner.name(),
                required = %self.policy.required_role,
                caller = %self.caller_role,
                "Call refused"
            );
            return Err(CallError::Forbidden {
                name: self.inner.name().to_string(),
                required: self.policy.required_role.clone(),
                caller: self.caller_role.clone(),
            });
        }

        self.inner.call(args, kwargs)
    }
}
