//! Unit-of-work trait and implementations.
//!
//! Units are the fundamental pieces of business logic invoked with a
//! shared [`Context`]. A unit may optionally define a compensation that
//! undoes its effects during rollback.

use crate::context::Context;
use crate::errors::UnitResult;
use std::any::TypeId;
use std::fmt::Debug;
use std::sync::Arc;

/// Trait for units of work.
///
/// Units read and write the shared [`Context`], declare business failure
/// through [`Context::fail`], and may define a compensation invoked in
/// reverse completion order when a later unit fails.
pub trait UnitOfWork: Send + Sync + Debug + 'static {
    /// Returns the name of the unit.
    fn name(&self) -> &str;

    /// Executes the unit's body.
    ///
    /// # Errors
    ///
    /// Returns the failure signal from [`Context::fail`], or any other
    /// error the body propagates.
    fn call(&self, ctx: &Context) -> UnitResult;

    /// Compensates (undoes) the unit's effects during rollback.
    ///
    /// The default implementation is a no-op, suitable for read-only
    /// units.
    ///
    /// # Errors
    ///
    /// Returns an error if compensation fails; rollback logs it and
    /// continues with earlier units.
    fn rollback(&self, ctx: &Context) -> UnitResult {
        let _ = ctx;
        Ok(())
    }
}

/// An erased unit paired with the concrete type identity it was
/// constructed from.
///
/// The type identity keys the per-type contract registry (required
/// attributes and hooks), so it is captured here, at the one boundary
/// where the concrete type is statically known.
#[derive(Clone)]
pub struct UnitHandle {
    unit: Arc<dyn UnitOfWork>,
    key: TypeId,
}

impl UnitHandle {
    /// Wraps a unit, capturing its concrete type identity.
    #[must_use]
    pub fn new<T: UnitOfWork>(unit: T) -> Self {
        Self {
            unit: Arc::new(unit),
            key: TypeId::of::<T>(),
        }
    }

    /// Wraps an already-shared unit.
    #[must_use]
    pub fn from_arc<T: UnitOfWork>(unit: Arc<T>) -> Self {
        Self {
            unit,
            key: TypeId::of::<T>(),
        }
    }

    /// Returns the unit's name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.unit.name()
    }

    /// Returns the concrete type identity keying the contract registry.
    #[must_use]
    pub fn contract_key(&self) -> TypeId {
        self.key
    }

    /// Executes the unit's body.
    ///
    /// # Errors
    ///
    /// Propagates whatever the body returns.
    pub fn call(&self, ctx: &Context) -> UnitResult {
        self.unit.call(ctx)
    }

    /// Invokes the unit's compensation.
    ///
    /// # Errors
    ///
    /// Propagates whatever the compensation returns.
    pub fn rollback(&self, ctx: &Context) -> UnitResult {
        self.unit.rollback(ctx)
    }
}

impl Debug for UnitHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitHandle")
            .field("name", &self.unit.name())
            .finish()
    }
}

/// A closure-based unit with an optional rollback closure.
pub struct FnUnit<F>
where
    F: Fn(&Context) -> UnitResult + Send + Sync + 'static,
{
    name: String,
    func: F,
    compensation: Option<Box<dyn Fn(&Context) -> UnitResult + Send + Sync>>,
}

impl<F> FnUnit<F>
where
    F: Fn(&Context) -> UnitResult + Send + Sync + 'static,
{
    /// Creates a new closure-based unit.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
            compensation: None,
        }
    }

    /// Attaches a rollback closure.
    #[must_use]
    pub fn with_rollback(
        mut self,
        compensation: impl Fn(&Context) -> UnitResult + Send + Sync + 'static,
    ) -> Self {
        self.compensation = Some(Box::new(compensation));
        self
    }
}

impl<F> Debug for FnUnit<F>
where
    F: Fn(&Context) -> UnitResult + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnUnit").field("name", &self.name).finish()
    }
}

impl<F> UnitOfWork for FnUnit<F>
where
    F: Fn(&Context) -> UnitResult + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, ctx: &Context) -> UnitResult {
        (self.func)(ctx)
    }

    fn rollback(&self, ctx: &Context) -> UnitResult {
        match &self.compensation {
            Some(compensation) => compensation(ctx),
            None => Ok(()),
        }
    }
}

/// A no-op unit for testing.
#[derive(Debug, Clone)]
pub struct NoOpUnit {
    name: String,
}

impl NoOpUnit {
    /// Creates a new no-op unit.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl UnitOfWork for NoOpUnit {
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, _ctx: &Context) -> UnitResult {
        Ok(())
    }
}
