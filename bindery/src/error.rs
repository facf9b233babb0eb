//! Describes dependency resolution errors

use std::{
    error::Error as StdError,
    fmt::{Display, Formatter}
};

/// A boxed error produced by a collaborator (type loader or user factory)
pub type BoxError = Box<
    dyn StdError
    + Send
    + Sync
>;

/// Errors produced by the registry, the resolver and the instance builder
#[derive(Debug)]
pub enum Error {
    /// No raw constructor was installed before the first registration
    BuilderNotConfigured,

    /// Binding has no capability or no implementation
    IncompleteBinding,

    /// Capability (or capability set) is already taken
    DuplicateBinding(&'static str),

    /// Binding is not registered
    UnknownBinding,

    /// Capability is not registered at all
    UnknownService(&'static str),

    /// Capability lives only in set bindings and must be fetched with
    /// [`Registry::bindings_containing`](crate::Registry::bindings_containing),
    /// or it has a non-set binding and must be fetched with
    /// [`Registry::get`](crate::Registry::get)
    WrongAccessor(&'static str),

    /// No producer has all of its parameters resolvable
    NoSuitableConstructor(&'static str),

    /// The two best producers take the same number of parameters
    AmbiguousConstructors(&'static str),

    /// More than one producer is marked as preferred
    AmbiguousMarking(&'static str),

    /// Implementation declares more producers than allowed
    TooManyConstructors(&'static str),

    /// Producer or node has more parameters than allowed
    TooManyParameters(&'static str),

    /// Dependency graph contains a cycle through this capability
    DependencyCycle(&'static str),

    /// Resolution exceeded the configured step ceiling
    ResolutionOverflow(&'static str),

    /// Implementation can not be viewed as the capability
    NotAssignable {
        /// Capability type name
        capability: &'static str,
        /// Implementation type name
        implementation: &'static str,
    },

    /// Instance does not have the requested type
    ResolveFailed(&'static str),

    /// Scope has not produced the capability yet
    NotMaterialized(&'static str),

    /// Type loader failed to resolve a locator
    TypeResolutionFailure {
        /// Locator passed to the loader
        locator: String,
        /// Underlying cause
        source: BoxError,
    },

    /// A user factory failed to construct an instance
    Construction(BoxError),
}

impl Error {
    /// Wraps any error raised while constructing an instance
    #[inline]
    pub fn construction(err: impl Into<BoxError>) -> Self {
        Self::Construction(err.into())
    }

    /// Wraps a type loader failure together with the locator that caused it
    #[inline]
    pub fn type_resolution(locator: impl Into<String>, err: impl Into<BoxError>) -> Self {
        Self::TypeResolutionFailure {
            locator: locator.into(),
            source: err.into(),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::BuilderNotConfigured => write!(f, "Binding Error: no instance builder installed"),
            Error::IncompleteBinding => write!(f, "Binding Error: binding has no capability or no implementation"),
            Error::DuplicateBinding(name) => write!(f, "Binding Error: capability is already bound: {name}"),
            Error::UnknownBinding => write!(f, "Binding Error: binding is not registered"),
            Error::UnknownService(name) => write!(f, "Services Error: service not registered: {name}"),
            Error::WrongAccessor(name) => write!(f, "Services Error: wrong accessor for the service: {name}"),
            Error::NoSuitableConstructor(name) => write!(f, "Resolve Error: no suitable constructor found for: {name}"),
            Error::AmbiguousConstructors(name) => write!(f, "Resolve Error: ambiguous constructors found for: {name}"),
            Error::AmbiguousMarking(name) => write!(f, "Resolve Error: more than one preferred constructor for: {name}"),
            Error::TooManyConstructors(name) => write!(f, "Resolve Error: too many constructors for: {name}"),
            Error::TooManyParameters(name) => write!(f, "Resolve Error: too many parameters for: {name}"),
            Error::DependencyCycle(name) => write!(f, "Resolve Error: dependency cycle detected at: {name}"),
            Error::ResolutionOverflow(limit) => write!(f, "Resolve Error: resolution aborted, raise the {limit} limit or fix the bindings"),
            Error::NotAssignable { capability, implementation } => {
                write!(f, "Binding Error: {implementation} does not implement {capability}")
            },
            Error::ResolveFailed(name) => write!(f, "Services Error: unable to resolve the service: {name}"),
            Error::NotMaterialized(name) => write!(f, "Services Error: service is not created in this scope yet: {name}"),
            Error::TypeResolutionFailure { locator, source } => {
                write!(f, "Loader Error: unable to load \"{locator}\": {source}")
            },
            Error::Construction(err) => write!(f, "{err}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::TypeResolutionFailure { source, .. } => Some(source.as_ref()),
            Error::Construction(err) => Some(err.as_ref()),
            _ => None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as StdError;
    use super::Error;

    #[test]
    fn it_formats_registry_errors() {
        let err = Error::UnknownService("dyn app::Cache");

        assert_eq!(err.to_string(), "Services Error: service not registered: dyn app::Cache");
    }

    #[test]
    fn it_keeps_loader_cause() {
        let err = Error::type_resolution("plugins::Service", "not found");

        assert_eq!(err.to_string(), "Loader Error: unable to load \"plugins::Service\": not found");
        assert_eq!(err.source().unwrap().to_string(), "not found");
    }

    #[test]
    fn it_displays_construction_error_unchanged() {
        let err = Error::construction("connection refused");

        assert_eq!(err.to_string(), "connection refused");
        assert!(err.source().is_some());
    }
}
