//! Organizers: chains of units sharing one context.
//!
//! An organizer owns an ordered list of units, drives them through the
//! runner against a single shared [`Context`], catches the business
//! failure signal and triggers rollback. Organizers are themselves units
//! of work, so they nest; nested members ledger into the same context,
//! which keeps reverse-order rollback correct across boundaries.

use crate::context::{Context, ContextSource};
use crate::errors::{UnitResult, UnitflowError};
use crate::runner;
use crate::unit::{UnitHandle, UnitOfWork};
use tracing::debug;

/// A named, ordered chain of units of work.
#[derive(Debug)]
pub struct Organizer {
    name: String,
    units: Vec<UnitHandle>,
}

impl Organizer {
    /// Starts building an organizer.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> OrganizerBuilder {
        OrganizerBuilder {
            name: name.into(),
            units: Vec::new(),
        }
    }

    /// Returns the organizer's units in invocation order.
    #[must_use]
    pub fn units(&self) -> &[UnitHandle] {
        &self.units
    }

    fn execute(&self, ctx: &Context) -> UnitResult {
        debug!(
            run_id = %ctx.run_id(),
            organizer = %self.name,
            units = self.units.len(),
            "running organizer"
        );
        for unit in &self.units {
            runner::invoke(unit, ctx)?;
        }
        Ok(())
    }

    /// Runs the chain, catching a declared business failure.
    ///
    /// Builds a fresh context from `source` (or reuses an existing one).
    /// When a unit declares failure, completed units are rolled back and
    /// the failed context is returned as `Ok` for the caller to inspect
    /// via [`Context::failure`]. Any other error also triggers rollback
    /// but propagates as `Err`.
    ///
    /// # Errors
    ///
    /// Returns missing-attribute errors and execution defects; never a
    /// business failure.
    pub fn run(&self, source: impl Into<ContextSource>) -> Result<Context, UnitflowError> {
        let ctx = Context::build(source);
        ctx.emit(
            "organizer.started",
            Some(serde_json::json!({ "organizer": self.name })),
        );
        match self.execute(&ctx) {
            Ok(()) => {
                ctx.emit(
                    "organizer.completed",
                    Some(serde_json::json!({ "organizer": self.name })),
                );
                Ok(ctx)
            }
            Err(UnitflowError::Failed(_)) => {
                ctx.rollback();
                ctx.emit(
                    "organizer.failed",
                    Some(serde_json::json!({ "organizer": self.name })),
                );
                Ok(ctx)
            }
            Err(error) => {
                ctx.rollback();
                ctx.emit(
                    "organizer.failed",
                    Some(serde_json::json!({ "organizer": self.name })),
                );
                Err(error)
            }
        }
    }

    /// Runs the chain, propagating a business failure as an error.
    ///
    /// # Errors
    ///
    /// Returns every error the chain produces, business failures
    /// included, always after rolling back completed units.
    pub fn run_strict(&self, source: impl Into<ContextSource>) -> Result<Context, UnitflowError> {
        let ctx = Context::build(source);
        match self.execute(&ctx) {
            Ok(()) => Ok(ctx),
            Err(error) => {
                ctx.rollback();
                Err(error)
            }
        }
    }
}

impl UnitOfWork for Organizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, ctx: &Context) -> UnitResult {
        // As a nested unit the organizer propagates the first error and
        // leaves rollback to the outermost driver.
        self.execute(ctx)
    }
}

/// Builds an [`Organizer`] from units in invocation order.
#[derive(Debug)]
pub struct OrganizerBuilder {
    name: String,
    units: Vec<UnitHandle>,
}

impl OrganizerBuilder {
    /// Appends a unit to the chain.
    #[must_use]
    pub fn unit<T: UnitOfWork>(mut self, unit: T) -> Self {
        self.units.push(UnitHandle::new(unit));
        self
    }

    /// Appends an already-wrapped unit handle.
    #[must_use]
    pub fn handle(mut self, handle: UnitHandle) -> Self {
        self.units.push(handle);
        self
    }

    /// Finishes the build.
    #[must_use]
    pub fn build(self) -> Organizer {
        Organizer {
            name: self.name,
            units: self.units,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::FnUnit;
    use std::collections::HashMap;

    #[test]
    fn test_run_flows_data_between_units() -> anyhow::Result<()> {
        let organizer = Organizer::builder("math")
            .unit(FnUnit::new("add_ten", |ctx: &Context| {
                let n = ctx.get_as::<i64>("n").unwrap_or(0);
                ctx.set("n", serde_json::json!(n + 10));
                Ok(())
            }))
            .unit(FnUnit::new("triple", |ctx: &Context| {
                let n = ctx.get_as::<i64>("n").unwrap_or(0);
                ctx.set("n", serde_json::json!(n * 3));
                Ok(())
            }))
            .build();

        let mut values = HashMap::new();
        values.insert("n".to_string(), serde_json::json!(5));

        let ctx = organizer.run(values)?;

        assert!(ctx.success());
        assert_eq!(ctx.get("n"), serde_json::json!(45));
        assert_eq!(ctx.called(), vec!["add_ten", "triple"]);
        Ok(())
    }

    #[test]
    fn test_run_reuses_existing_context() -> anyhow::Result<()> {
        let organizer = Organizer::builder("noop_chain")
            .unit(FnUnit::new("noop", |_ctx: &Context| Ok(())))
            .build();

        let existing = Context::new();
        existing.set("seed", serde_json::json!(1));

        let ctx = organizer.run(&existing)?;

        assert!(ctx.same_as(&existing));
        assert_eq!(ctx.get("seed"), serde_json::json!(1));
        Ok(())
    }

    #[test]
    fn test_run_captures_business_failure() {
        let organizer = Organizer::builder("doomed")
            .unit(FnUnit::new("ok", |_ctx: &Context| Ok(())))
            .unit(FnUnit::new("bad", |ctx: &Context| {
                let mut extra = HashMap::new();
                extra.insert("reason".to_string(), serde_json::json!("nope"));
                Err(ctx.fail(extra).into())
            }))
            .build();

        let ctx = organizer.run(HashMap::new()).unwrap();

        assert!(ctx.failure());
        assert!(ctx.rolled_back());
        assert_eq!(ctx.get("reason"), serde_json::json!("nope"));
    }

    #[test]
    fn test_run_strict_propagates_business_failure() {
        let organizer = Organizer::builder("doomed")
            .unit(FnUnit::new("bad", |ctx: &Context| {
                Err(ctx.fail(HashMap::new()).into())
            }))
            .build();

        let err = organizer.run_strict(HashMap::new()).unwrap_err();

        assert!(err.is_failure());
        let failed = err.failure_context().unwrap();
        assert!(failed.failure());
    }

    #[test]
    fn test_empty_organizer_succeeds() {
        let organizer = Organizer::builder("empty").build();
        let ctx = organizer.run(HashMap::new()).unwrap();

        assert!(ctx.success());
        assert!(ctx.called().is_empty());
    }
}
