//! Implementation types and the producers that construct them

use crate::{
    capability::{Capability, Implements},
    error::Error,
    producer::{FromArgs, GenericFactory, Instance, Producer, Service},
};
use std::{
    any::{TypeId, type_name},
    collections::HashMap,
    fmt::{Debug, Formatter},
    marker::PhantomData,
    sync::Arc
};

type ViewFn = Arc<
    dyn Fn(&Instance) -> Option<Service>
    + Send
    + Sync
>;

/// A trait that describes how a type is constructed by the registry
///
/// Any type that implements [`Default`] is produced by its `default()` function.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use bindery::{Produce, ImplementationBuilder, error::Error};
///
/// trait Clock: Send + Sync {}
///
/// struct Scheduler {
///     clock: Arc<dyn Clock>
/// }
///
/// impl Produce for Scheduler {
///     fn producers(implementation: ImplementationBuilder<Self>) -> ImplementationBuilder<Self> {
///         implementation.producer(|clock: Arc<dyn Clock>| Ok(Self { clock }))
///     }
/// }
/// ```
pub trait Produce: Sized + Send + Sync + 'static {
    /// Adds the producers of `Self` to the implementation description
    fn producers(implementation: ImplementationBuilder<Self>) -> ImplementationBuilder<Self>;
}

impl<T: Default + Send + Sync + 'static> Produce for T {
    #[inline]
    fn producers(implementation: ImplementationBuilder<Self>) -> ImplementationBuilder<Self> {
        implementation.producer(T::default)
    }
}

struct Inner {
    id: TypeId,
    name: &'static str,
    producers: Vec<Producer>,
    views: HashMap<Capability, ViewFn>,
}

/// A concrete implementation type: its producers and
/// the capabilities it can be viewed as
#[derive(Clone)]
pub struct Implementation {
    inner: Arc<Inner>
}

impl Debug for Implementation {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Implementation")
            .field("name", &self.inner.name)
            .field("producers", &self.inner.producers)
            .finish()
    }
}

impl PartialEq for Implementation {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Implementation {}

impl Implementation {
    /// Starts describing `T` with the producers declared by its [`Produce`] impl
    #[inline]
    pub fn of<T: Produce>() -> ImplementationBuilder<T> {
        T::producers(ImplementationBuilder::new())
    }

    /// Starts describing `T` without any producers
    #[inline]
    pub fn builder<T: Send + Sync + 'static>() -> ImplementationBuilder<T> {
        ImplementationBuilder::new()
    }

    /// Returns the [`TypeId`] of the implementation type
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.inner.id
    }

    /// Returns the implementation type name
    #[inline]
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Returns all producers of this implementation
    #[inline]
    pub fn producers(&self) -> &[Producer] {
        &self.inner.producers
    }

    /// Returns `true` if an instance can be viewed as the capability
    #[inline]
    pub fn implements(&self, capability: &Capability) -> bool {
        self.inner.views.contains_key(capability)
    }

    /// Views an instance of this implementation as the capability
    pub fn view(&self, capability: &Capability, instance: &Instance) -> Result<Service, Error> {
        let view = self.inner.views
            .get(capability)
            .ok_or(Error::NotAssignable {
                capability: capability.name(),
                implementation: self.inner.name,
            })?;
        view(instance).ok_or(Error::ResolveFailed(self.inner.name))
    }
}

/// A typed builder of an [`Implementation`]
pub struct ImplementationBuilder<T> {
    producers: Vec<Producer>,
    views: HashMap<Capability, ViewFn>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Default for ImplementationBuilder<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> ImplementationBuilder<T> {
    /// Creates a builder that can already view `T` as itself
    #[inline]
    pub fn new() -> Self {
        let builder = Self {
            producers: Vec::new(),
            views: HashMap::new(),
            _marker: PhantomData,
        };
        builder.implements::<T>()
    }

    /// Adds a producer
    pub fn producer<F, Args>(mut self, factory: F) -> Self
    where
        F: GenericFactory<Args, Output = T>,
        Args: FromArgs
    {
        self.producers.push(Producer::new(factory));
        self
    }

    /// Adds a producer marked as preferred
    pub fn preferred<F, Args>(mut self, factory: F) -> Self
    where
        F: GenericFactory<Args, Output = T>,
        Args: FromArgs
    {
        self.producers.push(Producer::new(factory).preferred());
        self
    }

    /// Adds an already described producer, usually one built with [`Producer::from_fn`].
    ///
    /// The factory must return an instance of `T`, otherwise viewing it fails
    /// with [`Error::ResolveFailed`].
    pub fn with_producer(mut self, producer: Producer) -> Self {
        self.producers.push(producer);
        self
    }

    /// Declares that `T` can be viewed as the capability `C`
    pub fn implements<C>(mut self) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        T: Implements<C>
    {
        let view: ViewFn = Arc::new(|instance: &Instance| {
            instance
                .clone()
                .downcast::<T>()
                .ok()
                .map(|t| Arc::new(<T as Implements<C>>::upcast(t)) as Service)
        });
        self.views.insert(Capability::of::<C>(), view);
        self
    }

    /// Builds the implementation description
    #[inline]
    pub fn build(self) -> Implementation {
        Implementation {
            inner: Arc::new(Inner {
                id: TypeId::of::<T>(),
                name: type_name::<T>(),
                producers: self.producers,
                views: self.views,
            })
        }
    }
}
