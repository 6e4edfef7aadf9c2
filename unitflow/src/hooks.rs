//! Pre- and post-execution hooks for unit invocation.
//!
//! Hooks are registered per concrete unit type in the contract registry.
//! Before hooks run in list order ahead of the unit body; after hooks run
//! in reverse list order once the body has completed. An erroring before
//! hook halts invocation, so the body never runs and the unit is not
//! ledgered.

use crate::context::Context;
use crate::errors::UnitResult;

/// A hook invoked before a unit's body.
pub trait BeforeHook: Send + Sync {
    /// Runs the hook.
    ///
    /// # Errors
    ///
    /// An error halts invocation before the unit body executes.
    fn call(&self, ctx: &Context) -> UnitResult;
}

/// A hook invoked after a unit's body has completed.
pub trait AfterHook: Send + Sync {
    /// Runs the hook.
    ///
    /// # Errors
    ///
    /// An error propagates to the chain driver; the unit stays ledgered.
    fn call(&self, ctx: &Context) -> UnitResult;
}

impl<F> BeforeHook for F
where
    F: Fn(&Context) -> UnitResult + Send + Sync,
{
    fn call(&self, ctx: &Context) -> UnitResult {
        self(ctx)
    }
}

impl<F> AfterHook for F
where
    F: Fn(&Context) -> UnitResult + Send + Sync,
{
    fn call(&self, ctx: &Context) -> UnitResult {
        self(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::UnitflowError;

    #[test]
    fn test_closure_as_before_hook() {
        let hook = |ctx: &Context| {
            ctx.set("seen", serde_json::json!(true));
            Ok(())
        };

        let ctx = Context::new();
        BeforeHook::call(&hook, &ctx).unwrap();

        assert_eq!(ctx.get("seen"), serde_json::json!(true));
    }

    #[test]
    fn test_closure_hook_can_halt() {
        let hook = |_ctx: &Context| Err(UnitflowError::execution("halt"));

        let ctx = Context::new();
        let result = BeforeHook::call(&hook, &ctx);

        assert!(result.is_err());
    }
}
