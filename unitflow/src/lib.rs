//! # Unitflow
//!
//! A unit-of-work framework for composing business logic into chains.
//!
//! Unitflow provides:
//!
//! - **Shared contexts**: a dynamic attribute bag passed by reference
//!   through every unit in a chain
//! - **Declared failure**: a typed, catchable signal carrying the failed
//!   context, distinct from defects
//! - **Compensating rollback**: completed units are ledgered and undone
//!   in reverse order when a later unit fails
//! - **Declarative preconditions**: per-type required attributes enforced
//!   ahead of every unit body
//! - **Event-driven observability**: lifecycle events for units, chains
//!   and rollback
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use unitflow::prelude::*;
//!
//! // Compose a chain
//! let checkout = Organizer::builder("checkout")
//!     .unit(ReserveStock::new())
//!     .unit(ChargeCard::new())
//!     .unit(ShipOrder::new())
//!     .build();
//!
//! // Run it over raw attributes
//! let ctx = checkout.run(order_values)?;
//! if ctx.failure() {
//!     println!("checkout failed: {}", ctx.get("reason"));
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod context;
pub mod contract;
pub mod errors;
pub mod events;
pub mod hooks;
pub mod organizer;
pub mod runner;
pub mod unit;


/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::context::{
        AttributeBag, CallLedger, Context, ContextSource, RunIdentity,
    };
    pub use crate::contract::{
        effective_requirements, inherit, require, required, Requirements,
    };
    pub use crate::errors::{
        Failure, MissingAttributeError, UnitResult, UnitflowError,
    };
    pub use crate::events::{
        CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink,
    };
    pub use crate::hooks::{AfterHook, BeforeHook};
    pub use crate::organizer::{Organizer, OrganizerBuilder};
    pub use crate::runner::invoke;
    pub use crate::unit::{FnUnit, NoOpUnit, UnitHandle, UnitOfWork};
}
