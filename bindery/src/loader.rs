//! Type loaders for bindings whose types are known only by name

use crate::{
    capability::Capability,
    error::BoxError,
    implementation::Implementation
};
use std::{
    collections::HashMap,
    error::Error as StdError,
    fmt::{Display, Formatter}
};

/// Resolves capabilities and implementations from locator strings.
///
/// Used by [`BindingBuilder::bind_loaded`](crate::BindingBuilder::bind_loaded).
pub trait TypeLoader: Send + Sync {
    /// Resolves an implementation by its locator
    fn load_implementation(&self, locator: &str) -> Result<Implementation, BoxError>;

    /// Resolves a capability by its locator
    fn load_capability(&self, locator: &str) -> Result<Capability, BoxError>;
}

/// The locator is not known to the [`StaticTypeLoader`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLocator(pub String);

impl Display for UnknownLocator {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\" not found", self.0)
    }
}

impl StdError for UnknownLocator {}

/// A [`TypeLoader`] backed by a name-keyed table filled at startup
///
/// # Example
/// ```
/// use bindery::{Implementation, StaticTypeLoader, TypeLoader, implements};
///
/// trait Codec: Send + Sync {}
///
/// #[derive(Default)]
/// struct Gzip;
///
/// impl Codec for Gzip {}
/// implements! { Gzip => dyn Codec }
///
/// let loader = StaticTypeLoader::new()
///     .with_capability::<dyn Codec>("codecs.Codec")
///     .with_implementation("codecs.Gzip", Implementation::of::<Gzip>()
///         .implements::<dyn Codec>()
///         .build());
///
/// assert!(loader.load_capability("codecs.Codec").is_ok());
/// assert!(loader.load_implementation("codecs.Brotli").is_err());
/// ```
#[derive(Debug, Default)]
pub struct StaticTypeLoader {
    capabilities: HashMap<String, Capability>,
    implementations: HashMap<String, Implementation>,
}

impl StaticTypeLoader {
    /// Creates an empty loader
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the capability `C` under the locator
    pub fn with_capability<C: ?Sized + 'static>(mut self, locator: impl Into<String>) -> Self {
        self.capabilities.insert(locator.into(), Capability::of::<C>());
        self
    }

    /// Registers an implementation under the locator
    pub fn with_implementation(mut self, locator: impl Into<String>, implementation: Implementation) -> Self {
        self.implementations.insert(locator.into(), implementation);
        self
    }
}

impl TypeLoader for StaticTypeLoader {
    fn load_implementation(&self, locator: &str) -> Result<Implementation, BoxError> {
        self.implementations
            .get(locator)
            .cloned()
            .ok_or_else(|| UnknownLocator(locator.into()).into())
    }

    fn load_capability(&self, locator: &str) -> Result<Capability, BoxError> {
        self.capabilities
            .get(locator)
            .copied()
            .ok_or_else(|| UnknownLocator(locator.into()).into())
    }
}
