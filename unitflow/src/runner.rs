//! The invocation machinery for a single unit of work.
//!
//! Invocation is: before hooks (validation first) → body → completion
//! recording → after hooks. Hooks come from the contract registry, keyed
//! by the unit's concrete type.

use crate::context::Context;
use crate::contract;
use crate::errors::UnitResult;
use crate::unit::UnitHandle;
use tracing::debug;

/// Invokes one unit against a context.
///
/// Before hooks run in registration order with the validation hook in
/// front; an erroring before hook halts invocation and the unit is never
/// ledgered. After hooks run in reverse registration order. Completion is
/// recorded between the body and the after hooks: a unit whose body
/// finished stays compensable even when an after hook errors.
///
/// # Errors
///
/// Propagates the first error from a hook or from the unit body.
pub fn invoke(unit: &UnitHandle, ctx: &Context) -> UnitResult {
    let (before, after) = contract::hooks_for(unit.contract_key());

    debug!(run_id = %ctx.run_id(), unit = %unit.name(), "invoking unit");
    ctx.emit(
        "unit.started",
        Some(serde_json::json!({ "unit": unit.name() })),
    );

    for hook in &before {
        if let Err(error) = hook.call(ctx) {
            ctx.emit(
                "unit.failed",
                Some(serde_json::json!({ "unit": unit.name(), "phase": "before" })),
            );
            return Err(error);
        }
    }

    if let Err(error) = unit.call(ctx) {
        ctx.emit(
            "unit.failed",
            Some(serde_json::json!({ "unit": unit.name(), "phase": "call" })),
        );
        return Err(error);
    }

    ctx.record_completion(unit.clone());

    for hook in after.iter().rev() {
        if let Err(error) = hook.call(ctx) {
            ctx.emit(
                "unit.failed",
                Some(serde_json::json!({ "unit": unit.name(), "phase": "after" })),
            );
            return Err(error);
        }
    }

    ctx.emit(
        "unit.completed",
        Some(serde_json::json!({ "unit": unit.name() })),
    );
    Ok(())
}
