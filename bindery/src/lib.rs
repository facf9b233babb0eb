//! # bindery
//!
//! A runtime dependency-composition engine.
//!
//! Bindings map capabilities (usually trait objects) to implementations under a
//! lifecycle policy. On request the registry builds a cycle-free resolution tree,
//! selects a producer for every node and creates the instances bottom-up,
//! reusing them as the lifecycle allows.
//!
//! ## Example
//! ```
//! use std::sync::Arc;
//! use bindery::{
//!     Binding, FactoryBuilder, ImplementationBuilder, Produce, Registry,
//!     implements
//! };
//!
//! trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! trait Scheduler: Send + Sync {
//!     fn next_run(&self) -> u64;
//! }
//!
//! #[derive(Default)]
//! struct FixedClock;
//!
//! impl Clock for FixedClock {
//!     fn now(&self) -> u64 { 100 }
//! }
//!
//! struct Cron {
//!     clock: Arc<dyn Clock>,
//! }
//!
//! impl Scheduler for Cron {
//!     fn next_run(&self) -> u64 { self.clock.now() + 60 }
//! }
//!
//! impl Produce for Cron {
//!     fn producers(implementation: ImplementationBuilder<Self>) -> ImplementationBuilder<Self> {
//!         implementation.producer(|clock: Arc<dyn Clock>| Ok(Self { clock }))
//!     }
//! }
//!
//! implements! { FixedClock => dyn Clock }
//! implements! { Cron => dyn Scheduler }
//!
//! let registry = Registry::new().with_builder(FactoryBuilder);
//! registry.register(&Binding::singleton::<dyn Clock, FixedClock>()).unwrap();
//! registry.register(&Binding::transient::<dyn Scheduler, Cron>()).unwrap();
//!
//! let scheduler = registry.get::<dyn Scheduler>().unwrap();
//! assert_eq!(scheduler.next_run(), 160);
//! ```
//!
//! ## Feature flags
//! - `macros` - the [`producers`] attribute macro
//! - `tracing` - events for registration, producer selection and construction
//! - `serde` - `Serialize`/`Deserialize` for [`Limits`]

pub use crate::{
    binding::{Binding, BindingBuilder, Lifecycle},
    builder::{FactoryBuilder, InstanceBuilder},
    capability::{Capability, CapabilitySet, Implements},
    error::Error,
    implementation::{Implementation, ImplementationBuilder, Produce},
    limits::Limits,
    loader::{StaticTypeLoader, TypeLoader},
    producer::{Dependency, FromArgs, GenericFactory, Instance, Producer, Service},
    registry::{Bindings, Registry},
    selection::{Resolvable, select_producer},
};

#[cfg(feature = "macros")]
pub use bindery_macros::producers;

pub mod binding;
pub mod builder;
pub mod capability;
pub mod error;
pub mod graph;
pub mod implementation;
pub mod limits;
pub mod loader;
pub mod producer;
pub mod registry;
pub mod selection;

mod materialize;
mod resolver;
