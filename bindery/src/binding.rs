//! Bindings: capabilities mapped to implementations under a lifecycle policy

use self::cache::Cache;
use crate::{
    builder::InstanceBuilder,
    capability::{Capability, CapabilitySet, Implements},
    error::Error,
    implementation::{Implementation, Produce},
    loader::TypeLoader,
    producer::{Dependency, Instance, Producer, Service},
};
use indexmap::IndexMap;
use std::{
    fmt::{Debug, Formatter},
    sync::Arc
};

mod cache;

/// Describes how long a created instance lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// One instance per implementation, created on first request and reused forever
    Singleton,

    /// A new instance on every request
    Transient,

    /// One instance per capability, reused within the same binding
    Scoped,
}

struct Inner {
    lifecycle: Lifecycle,
    is_set: bool,
    capabilities: CapabilitySet,
    entries: IndexMap<Capability, Implementation>,
    cache: Cache,
}

/// A capability to implementation mapping with a lifecycle policy.
///
/// A non-set binding maps exactly one capability. A set binding privately owns
/// a group of distinct capabilities and resolves dependencies within the group
/// first. Scoped bindings are always set bindings: the binding object is the scope.
///
/// `Binding` is a cheap handle; clones refer to the same binding and share its cache.
///
/// # Example
/// ```
/// use bindery::{Binding, BindingBuilder, implements};
///
/// trait Cache: Send + Sync {}
///
/// #[derive(Default)]
/// struct Memory;
///
/// impl Cache for Memory {}
/// implements! { Memory => dyn Cache }
///
/// let single = Binding::singleton::<dyn Cache, Memory>();
/// assert!(!single.is_set());
///
/// let scope = BindingBuilder::scoped()
///     .bind::<dyn Cache, Memory>()
///     .unwrap()
///     .build();
/// assert!(scope.is_set());
/// ```
#[derive(Clone)]
pub struct Binding {
    inner: Arc<Inner>
}

impl Debug for Binding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("lifecycle", &self.inner.lifecycle)
            .field("is_set", &self.inner.is_set)
            .field("capabilities", &self.inner.capabilities)
            .finish()
    }
}

impl PartialEq for Binding {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Binding {}

impl Binding {
    /// Creates a singleton binding of `C` to `T`
    #[inline]
    pub fn singleton<C, T>() -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        T: Produce + Implements<C>
    {
        Self::single::<C, T>(Lifecycle::Singleton)
    }

    /// Creates a transient binding of `C` to `T`
    #[inline]
    pub fn transient<C, T>() -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        T: Produce + Implements<C>
    {
        Self::single::<C, T>(Lifecycle::Transient)
    }

    fn single<C, T>(lifecycle: Lifecycle) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        T: Produce + Implements<C>
    {
        let mut entries = IndexMap::with_capacity(1);
        entries.insert(
            Capability::of::<C>(),
            Implementation::of::<T>().implements::<C>().build());
        Self::from_parts(lifecycle, false, entries)
    }

    fn from_parts(
        lifecycle: Lifecycle,
        is_set: bool,
        entries: IndexMap<Capability, Implementation>
    ) -> Self {
        let cache = Cache::new(lifecycle, &entries);
        Self {
            inner: Arc::new(Inner {
                lifecycle,
                is_set,
                capabilities: entries.keys().copied().collect(),
                entries,
                cache,
            })
        }
    }

    /// Returns `true` if both handles refer to the same binding
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Identity of the binding, stable while any handle is alive
    #[inline]
    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    /// Returns the lifecycle policy
    #[inline]
    pub fn lifecycle(&self) -> Lifecycle {
        self.inner.lifecycle
    }

    /// Returns `true` if the binding owns a private set of capabilities
    #[inline]
    pub fn is_set(&self) -> bool {
        self.inner.is_set
    }

    /// Returns all capabilities of the binding
    #[inline]
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.inner.capabilities
    }

    /// Returns `true` if the binding maps the capability
    #[inline]
    pub fn contains(&self, capability: &Capability) -> bool {
        self.inner.capabilities.contains(capability)
    }

    /// Returns `true` if the binding has no capability
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Returns the implementation bound to the capability
    #[inline]
    pub fn implementation(&self, capability: &Capability) -> Option<&Implementation> {
        self.inner.entries.get(capability)
    }

    /// Returns the only capability of a non-set binding
    #[inline]
    pub(crate) fn first(&self) -> Option<&Capability> {
        self.inner.entries.keys().next()
    }

    /// Returns the instance this binding has already created for `C`.
    ///
    /// Fails with [`Error::UnknownService`] if `C` is not bound here and with
    /// [`Error::NotMaterialized`] if nothing has been created for it yet.
    /// Transient bindings never hold instances.
    pub fn get<C: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<C>, Error> {
        let capability = Capability::of::<C>();
        let implementation = self
            .implementation(&capability)
            .ok_or(Error::UnknownService(capability.name()))?;
        let instance = self
            .cached(&capability, implementation)
            .ok_or(Error::NotMaterialized(capability.name()))?;
        let service = implementation.view(&capability, &instance)?;
        <Arc<C>>::from_service(&service)
    }

    /// Returns an already created instance for the capability path
    #[inline]
    pub(crate) fn cached(
        &self,
        capability: &Capability,
        implementation: &Implementation
    ) -> Option<Instance> {
        self.inner.cache.get(capability, implementation)
    }

    /// Creates an instance following the lifecycle policy.
    ///
    /// Transient bindings always invoke the builder. Singleton and scoped
    /// bindings invoke it once per cache cell and return the cached instance afterwards.
    ///
    /// Fails with [`Error::UnknownService`] if the capability is not bound here and
    /// with [`Error::NotAssignable`] if `implementation` is not the one bound to it.
    pub fn create(
        &self,
        builder: &dyn InstanceBuilder,
        capability: &Capability,
        implementation: &Implementation,
        producer: &Producer,
        args: &[Service]
    ) -> Result<Instance, Error> {
        let bound = self
            .implementation(capability)
            .ok_or(Error::UnknownService(capability.name()))?;
        if bound != implementation {
            return Err(Error::NotAssignable {
                capability: capability.name(),
                implementation: implementation.name(),
            });
        }
        let Some(cell) = self.inner.cache.cell(capability, implementation) else {
            return Self::invoke(builder, implementation, producer, args);
        };
        if let Some(instance) = cell.get() {
            return Ok(instance.clone());
        }
        let instance = Self::invoke(builder, implementation, producer, args)?;
        Ok(cell.get_or_init(|| instance).clone())
    }

    #[inline]
    fn invoke(
        builder: &dyn InstanceBuilder,
        implementation: &Implementation,
        producer: &Producer,
        args: &[Service]
    ) -> Result<Instance, Error> {
        #[cfg(feature = "tracing")]
        tracing::trace!("constructing {} with {} argument(s)", implementation.name(), args.len());

        builder.create(implementation, producer, args)
    }
}

/// Builds a [`Binding`]
#[derive(Debug)]
pub struct BindingBuilder {
    lifecycle: Lifecycle,
    is_set: bool,
    entries: IndexMap<Capability, Implementation>,
}

impl BindingBuilder {
    /// Starts a non-set singleton binding
    #[inline]
    pub fn singleton() -> Self {
        Self::new(Lifecycle::Singleton, false)
    }

    /// Starts a non-set transient binding
    #[inline]
    pub fn transient() -> Self {
        Self::new(Lifecycle::Transient, false)
    }

    /// Starts a scoped set binding
    #[inline]
    pub fn scoped() -> Self {
        Self::new(Lifecycle::Scoped, true)
    }

    /// Starts a set binding with the given lifecycle
    #[inline]
    pub fn set(lifecycle: Lifecycle) -> Self {
        Self::new(lifecycle, true)
    }

    #[inline]
    fn new(lifecycle: Lifecycle, is_set: bool) -> Self {
        Self {
            lifecycle,
            is_set,
            entries: IndexMap::new(),
        }
    }

    /// Binds the capability `C` to the implementation `T`.
    ///
    /// Fails with [`Error::DuplicateBinding`] if `C` is already bound here,
    /// or if a non-set binding already has its capability.
    pub fn bind<C, T>(self) -> Result<Self, Error>
    where
        C: ?Sized + Send + Sync + 'static,
        T: Produce + Implements<C>
    {
        let implementation = Implementation::of::<T>()
            .implements::<C>()
            .build();
        self.bind_implementation(Capability::of::<C>(), implementation)
    }

    /// Binds a capability to an already described implementation.
    ///
    /// Fails with [`Error::NotAssignable`] if the implementation can not be viewed as the capability.
    pub fn bind_implementation(
        mut self,
        capability: Capability,
        implementation: Implementation
    ) -> Result<Self, Error> {
        if !implementation.implements(&capability) {
            return Err(Error::NotAssignable {
                capability: capability.name(),
                implementation: implementation.name(),
            });
        }
        if self.entries.contains_key(&capability) || (!self.is_set && !self.entries.is_empty()) {
            return Err(Error::DuplicateBinding(capability.name()));
        }
        self.entries.insert(capability, implementation);
        Ok(self)
    }

    /// Binds a capability and an implementation resolved by a [`TypeLoader`]
    ///
    /// Loader failures surface as [`Error::TypeResolutionFailure`].
    pub fn bind_loaded(
        self,
        loader: &dyn TypeLoader,
        capability: &str,
        implementation: &str
    ) -> Result<Self, Error> {
        let loaded_capability = loader
            .load_capability(capability)
            .map_err(|err| Error::type_resolution(capability, err))?;
        let loaded_implementation = loader
            .load_implementation(implementation)
            .map_err(|err| Error::type_resolution(implementation, err))?;
        self.bind_implementation(loaded_capability, loaded_implementation)
    }

    /// Builds the binding
    #[inline]
    pub fn build(self) -> Binding {
        Binding::from_parts(self.lifecycle, self.is_set, self.entries)
    }
}
