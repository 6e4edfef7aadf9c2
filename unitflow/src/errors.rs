//! Error types for the unitflow framework.
//!
//! The taxonomy separates declared business failures (which carry the
//! failed [`Context`]) from caller contract violations (missing required
//! attributes) and from unrelated execution defects.

use crate::context::Context;
use thiserror::Error;

/// The business-failure signal raised by [`Context::fail`].
///
/// Carries the same shared [`Context`] instance that was failed, already
/// marked and already holding any attributes merged by the `fail` call.
/// Invoking machinery catches this to distinguish an intentional failure
/// from a defect.
#[derive(Debug, Clone, Error)]
#[error("unit of work signalled failure")]
pub struct Failure {
    context: Context,
}

impl Failure {
    /// Creates a failure signal carrying the given context.
    #[must_use]
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    /// Returns the failed context.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Consumes the signal and returns the failed context.
    #[must_use]
    pub fn into_context(self) -> Context {
        self.context
    }
}

/// Error raised by precondition validation when a required attribute is
/// absent from the context.
///
/// Identifies only the first missing name in declaration order; it is not
/// routed through [`Context::fail`] and never marks the context failed.
#[derive(Debug, Clone, Error)]
#[error("Required attribute {name} is missing")]
pub struct MissingAttributeError {
    /// The first missing attribute name, in declaration order.
    pub name: String,
}

impl MissingAttributeError {
    /// Creates a new missing-attribute error.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The main error type for unitflow operations.
#[derive(Debug, Error)]
pub enum UnitflowError {
    /// A unit of work declared a business failure.
    #[error("{0}")]
    Failed(#[from] Failure),

    /// A unit of work was invoked without a required attribute.
    #[error("{0}")]
    MissingAttribute(#[from] MissingAttributeError),

    /// An unrelated defect propagated out of a unit body or hook.
    #[error("unit execution error: {0}")]
    Execution(String),
}

impl UnitflowError {
    /// Creates an execution-defect error.
    #[must_use]
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Returns true if this is a declared business failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the failed context when this is a business failure.
    #[must_use]
    pub fn failure_context(&self) -> Option<&Context> {
        match self {
            Self::Failed(failure) => Some(failure.context()),
            _ => None,
        }
    }
}

/// Result alias for unit bodies, hooks and the runner.
pub type UnitResult = Result<(), UnitflowError>;
