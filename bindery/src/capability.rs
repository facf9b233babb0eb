//! Capability identifiers and the contracts implementations are viewed through

use std::{
    any::{TypeId, type_name},
    cmp::Ordering,
    collections::BTreeSet,
    fmt::{Debug, Display, Formatter},
    hash::{Hash, Hasher},
    sync::Arc
};

/// An opaque identifier of a contract a consumer depends on.
///
/// Usually a trait object type, but any `'static` type can be a capability.
///
/// # Example
/// ```
/// use bindery::Capability;
///
/// trait Cache: Send + Sync {}
///
/// let cache = Capability::of::<dyn Cache>();
/// assert_eq!(cache, Capability::of::<dyn Cache>());
/// assert_ne!(cache, Capability::of::<String>());
/// ```
#[derive(Clone, Copy)]
pub struct Capability {
    id: TypeId,
    name: &'static str,
}

impl Capability {
    /// Creates a capability for the type `C`
    #[inline]
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: type_name::<C>(),
        }
    }

    /// Returns the [`TypeId`] of the capability type
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Returns the capability type name
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for Capability {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Capability {}

impl Hash for Capability {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Capability {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Capability {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Debug for Capability {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Capability({})", self.name)
    }
}

impl Display for Capability {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// An ordered set of capabilities, the registry key of a set binding
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    /// Creates an empty set
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a capability, returns `false` if it was already present
    #[inline]
    pub fn insert(&mut self, capability: Capability) -> bool {
        self.0.insert(capability)
    }

    /// Returns `true` if the set contains the capability
    #[inline]
    pub fn contains(&self, capability: &Capability) -> bool {
        self.0.contains(capability)
    }

    /// Returns the number of capabilities in the set
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the capabilities in a stable order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.0.iter()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    #[inline]
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Describes how an implementation is viewed as the capability `C`.
///
/// Every type implements itself. Trait object views are declared
/// with the [`implements!`](crate::implements) macro.
pub trait Implements<C: ?Sized + 'static>: Send + Sync + 'static {
    /// Coerces the shared implementation into the capability pointer
    fn upcast(self: Arc<Self>) -> Arc<C>;
}

impl<T: Send + Sync + 'static> Implements<T> for T {
    #[inline]
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Declares that a type can be viewed as one or more trait object capabilities.
///
/// # Example
/// ```
/// use bindery::{implements, Implements};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
///
/// impl Greeter for English {
///     fn greet(&self) -> String { "hello".into() }
/// }
///
/// implements! { English => dyn Greeter }
///
/// let greeter = <English as Implements<dyn Greeter>>::upcast(Arc::new(English));
/// assert_eq!(greeter.greet(), "hello");
/// ```
#[macro_export]
macro_rules! implements {
    ($implementation:ty => $($capability:ty),+ $(,)?) => {
        $(
            impl $crate::Implements<$capability> for $implementation {
                #[inline]
                fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$capability> {
                    self
                }
            }
        )+
    };
}
