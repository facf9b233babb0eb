//! The binding registry

use crate::{
    binding::Binding,
    builder::InstanceBuilder,
    capability::{Capability, CapabilitySet},
    error::Error,
    limits::Limits,
    materialize::Materializer,
    producer::{Dependency, Service},
    resolver::Resolver,
};
use indexmap::IndexMap;
use std::{
    collections::HashMap,
    fmt::{Debug, Formatter},
    sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, TryLockError},
    vec::IntoIter
};

struct State {
    builder: Option<Arc<dyn InstanceBuilder>>,
    limits: Limits,
    singles: HashMap<Capability, Binding>,
    sets: IndexMap<CapabilitySet, Binding>,
}

impl State {
    /// Resolves and materializes the capability through the binding
    fn produce(&self, capability: Capability, binding: &Binding) -> Result<Service, Error> {
        let builder = self.builder
            .as_deref()
            .ok_or(Error::BuilderNotConfigured)?;
        let resolution = Resolver::new(&self.singles, &self.limits)
            .resolve(capability, binding)?;
        Materializer::new(builder, &self.limits)
            .materialize(&resolution)
    }

    #[inline]
    fn in_sets(&self, capability: &Capability) -> bool {
        self.sets.keys().any(|set| set.contains(capability))
    }
}

/// Holds all bindings and resolves capabilities into instances.
///
/// Every operation runs under one lock, so a slow constructor blocks all
/// other operations on the same registry. Constructors receive their
/// dependencies as arguments and must not call back into the registry.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use bindery::{Registry, Binding, FactoryBuilder, implements};
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// #[derive(Default)]
/// struct English;
///
/// impl Greeter for English {
///     fn greet(&self) -> String { "hello".into() }
/// }
///
/// implements! { English => dyn Greeter }
///
/// let registry = Registry::new().with_builder(FactoryBuilder);
/// registry.register(&Binding::singleton::<dyn Greeter, English>()).unwrap();
///
/// let greeter: Arc<dyn Greeter> = registry.get::<dyn Greeter>().unwrap();
/// assert_eq!(greeter.greet(), "hello");
/// ```
pub struct Registry {
    state: Mutex<State>,
}

impl Debug for Registry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = match self.state.try_lock() {
            Ok(state) => state,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return f.write_str("Registry { <locked> }"),
        };
        f.debug_struct("Registry")
            .field("limits", &state.limits)
            .field("singles", &state.singles.len())
            .field("sets", &state.sets.len())
            .field("has_builder", &state.builder.is_some())
            .finish()
    }
}

impl Default for Registry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates an empty registry without an instance builder
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                builder: None,
                limits: Limits::default(),
                singles: HashMap::new(),
                sets: IndexMap::new(),
            })
        }
    }

    /// Returns the process-wide registry.
    ///
    /// It starts without an instance builder; install one with [`Registry::set_builder`]
    /// before registering bindings.
    pub fn global() -> &'static Self {
        static INSTANCE: OnceLock<Registry> = OnceLock::new();
        INSTANCE.get_or_init(Registry::new)
    }

    /// Installs the instance builder
    pub fn with_builder<B: InstanceBuilder>(self, builder: B) -> Self {
        self.set_builder(builder);
        self
    }

    /// Installs or replaces the instance builder
    pub fn set_builder<B: InstanceBuilder>(&self, builder: B) {
        self.lock().builder = Some(Arc::new(builder));
    }

    /// Sets the resolution limits
    pub fn with_limits(self, limits: Limits) -> Self {
        self.lock().limits = limits;
        self
    }

    /// Updates the resolution limits
    ///
    /// # Example
    /// ```
    /// use bindery::Registry;
    ///
    /// Registry::global().configure(|limits| limits.with_max_resolve_steps(512));
    /// ```
    pub fn configure<F>(&self, config: F)
    where
        F: FnOnce(Limits) -> Limits
    {
        let mut state = self.lock();
        state.limits = config(state.limits);
    }

    /// Returns the current resolution limits
    pub fn limits(&self) -> Limits {
        self.lock().limits
    }

    /// Registers a binding.
    ///
    /// Fails with [`Error::BuilderNotConfigured`] if no instance builder is installed,
    /// with [`Error::IncompleteBinding`] if the binding is empty and
    /// with [`Error::DuplicateBinding`] if its capability (or capability set) is taken.
    pub fn register(&self, binding: &Binding) -> Result<(), Error> {
        let mut state = self.lock();
        if state.builder.is_none() {
            return Err(Error::BuilderNotConfigured);
        }
        let Some(capability) = binding.first().copied() else {
            return Err(Error::IncompleteBinding);
        };

        if binding.is_set() {
            if state.sets.contains_key(binding.capabilities()) {
                return Err(Error::DuplicateBinding(capability.name()));
            }
            state.sets.insert(binding.capabilities().clone(), binding.clone());
        } else {
            if state.singles.contains_key(&capability) {
                return Err(Error::DuplicateBinding(capability.name()));
            }
            state.singles.insert(capability, binding.clone());
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("registered {:?} binding of {:?}", binding.lifecycle(), binding.capabilities());

        Ok(())
    }

    /// Removes a registered binding.
    ///
    /// Instances already created by the binding are not affected.
    /// Fails with [`Error::IncompleteBinding`] for an empty binding and with
    /// [`Error::UnknownBinding`] if this very binding is not registered.
    pub fn deregister(&self, binding: &Binding) -> Result<(), Error> {
        let mut state = self.lock();
        let Some(capability) = binding.first().copied() else {
            return Err(Error::IncompleteBinding);
        };

        let registered = if binding.is_set() {
            state.sets.get(binding.capabilities())
        } else {
            state.singles.get(&capability)
        };
        if !registered.is_some_and(|registered| registered.ptr_eq(binding)) {
            return Err(Error::UnknownBinding);
        }

        if binding.is_set() {
            state.sets.shift_remove(binding.capabilities());
        } else {
            state.singles.remove(&capability);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("deregistered {:?} binding of {:?}", binding.lifecycle(), binding.capabilities());

        Ok(())
    }

    /// Resolves an instance of the capability `C` from a non-set binding
    pub fn get<C: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<C>, Error> {
        let service = self.get_service(&Capability::of::<C>())?;
        <Arc<C>>::from_service(&service)
    }

    /// Resolves the capability from a non-set binding.
    ///
    /// Fails with [`Error::UnknownService`] if nothing provides it and with
    /// [`Error::WrongAccessor`] if only set bindings contain it.
    pub fn get_service(&self, capability: &Capability) -> Result<Service, Error> {
        let state = self.lock();
        match state.singles.get(capability) {
            Some(binding) => state.produce(*capability, binding),
            None if state.in_sets(capability) => Err(Error::WrongAccessor(capability.name())),
            None => Err(Error::UnknownService(capability.name())),
        }
    }

    /// Returns every set binding that contains the capability `C`.
    ///
    /// See [`Registry::bindings_containing_capability`].
    #[inline]
    pub fn bindings_containing<C: ?Sized + 'static>(&self) -> Result<Bindings<'_>, Error> {
        self.bindings_containing_capability(&Capability::of::<C>())
    }

    /// Returns every set binding that contains the capability.
    ///
    /// Each binding creates its instance for the capability right before it is yielded,
    /// so the instance can be fetched with [`Binding::get`] afterwards.
    /// The returned iterator holds the registry lock until it is dropped.
    ///
    /// Fails with [`Error::WrongAccessor`] if the capability has a non-set binding
    /// and with [`Error::UnknownService`] if no set binding contains it.
    pub fn bindings_containing_capability(&self, capability: &Capability) -> Result<Bindings<'_>, Error> {
        let state = self.lock();
        if state.singles.contains_key(capability) {
            return Err(Error::WrongAccessor(capability.name()));
        }
        let pending = state.sets
            .iter()
            .filter(|(set, _)| set.contains(capability))
            .map(|(_, binding)| binding.clone())
            .collect::<Vec<_>>();
        if pending.is_empty() {
            return Err(Error::UnknownService(capability.name()));
        }
        Ok(Bindings {
            state,
            capability: *capability,
            pending: pending.into_iter(),
        })
    }

    /// Returns `true` if the capability `C` is registered in any binding
    #[inline]
    pub fn has<C: ?Sized + 'static>(&self) -> bool {
        self.has_capability(&Capability::of::<C>())
    }

    /// Returns `true` if the capability is registered in any binding
    pub fn has_capability(&self, capability: &Capability) -> bool {
        let state = self.lock();
        state.singles.contains_key(capability) || state.in_sets(capability)
    }

    /// Same as [`Registry::has`], but returns `None` instead of waiting
    /// while another operation holds the registry lock
    pub fn try_has<C: ?Sized + 'static>(&self) -> Option<bool> {
        let capability = Capability::of::<C>();
        let state = match self.state.try_lock() {
            Ok(state) => state,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return None,
        };
        Some(state.singles.contains_key(&capability) || state.in_sets(&capability))
    }

    /// Tables are mutated only after validation, so a poisoned lock still guards a consistent state
    #[inline]
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// A one-pass iterator over the set bindings that contain a capability.
///
/// Created by [`Registry::bindings_containing`]. Holds the registry lock until dropped.
pub struct Bindings<'a> {
    state: MutexGuard<'a, State>,
    capability: Capability,
    pending: IntoIter<Binding>,
}

impl Debug for Bindings<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bindings")
            .field("capability", &self.capability)
            .field("remaining", &self.pending.len())
            .finish()
    }
}

impl Iterator for Bindings<'_> {
    type Item = Result<Binding, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let binding = self.pending.next()?;
        Some(self.state
            .produce(self.capability, &binding)
            .map(|_| binding))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pending.size_hint()
    }
}

impl ExactSizeIterator for Bindings<'_> {}
