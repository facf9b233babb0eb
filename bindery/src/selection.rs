//! Producer selection

use crate::{
    binding::Binding,
    capability::{Capability, CapabilitySet},
    error::Error,
    implementation::Implementation,
    limits::Limits,
    producer::Producer,
};
use std::collections::HashMap;

/// Answers whether a capability can be supplied as a producer argument
pub trait Resolvable {
    /// Returns `true` if the capability can be resolved
    fn can_resolve(&self, capability: &Capability) -> bool;
}

impl Resolvable for CapabilitySet {
    #[inline]
    fn can_resolve(&self, capability: &Capability) -> bool {
        self.contains(capability)
    }
}

impl<V> Resolvable for HashMap<Capability, V> {
    #[inline]
    fn can_resolve(&self, capability: &Capability) -> bool {
        self.contains_key(capability)
    }
}

/// The capabilities visible to a producer of a binding:
/// the binding's private set when it is a set binding, then the non-set table
pub(crate) struct ResolutionScope<'a> {
    private: Option<&'a CapabilitySet>,
    singles: &'a HashMap<Capability, Binding>,
}

impl<'a> ResolutionScope<'a> {
    #[inline]
    pub(crate) fn new(binding: &'a Binding, singles: &'a HashMap<Capability, Binding>) -> Self {
        Self {
            private: binding.is_set().then(|| binding.capabilities()),
            singles,
        }
    }
}

impl Resolvable for ResolutionScope<'_> {
    #[inline]
    fn can_resolve(&self, capability: &Capability) -> bool {
        self.private.is_some_and(|set| set.can_resolve(capability))
            || self.singles.can_resolve(capability)
    }
}

/// Selects the producer used to construct the implementation.
///
/// A single preferred producer wins outright. Otherwise the producer with the
/// most parameters among those whose parameters are all resolvable is chosen;
/// a tie on the parameter count is an error.
pub fn select_producer<'a, R>(
    implementation: &'a Implementation,
    scope: &R,
    limits: &Limits
) -> Result<&'a Producer, Error>
where
    R: Resolvable + ?Sized
{
    let name = implementation.name();
    let producers = implementation.producers();
    if producers.len() > limits.max_producers() {
        return Err(Error::TooManyConstructors(name));
    }

    let mut preferred = producers.iter().filter(|p| p.is_preferred());
    let selected = match (preferred.next(), preferred.next()) {
        (Some(_), Some(_)) => return Err(Error::AmbiguousMarking(name)),
        (Some(producer), None) => producer,
        (None, _) => select_by_arity(name, producers, scope)?,
    };

    if selected.arity() > limits.max_parameters() {
        return Err(Error::TooManyParameters(name));
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("selected producer of {name} with {} parameter(s)", selected.arity());

    Ok(selected)
}

fn select_by_arity<'a, R>(
    name: &'static str,
    producers: &'a [Producer],
    scope: &R
) -> Result<&'a Producer, Error>
where
    R: Resolvable + ?Sized
{
    let mut best: Option<&Producer> = None;
    let mut tied = false;
    let eligible = producers
        .iter()
        .filter(|p| p.params().iter().all(|c| scope.can_resolve(c)));
    for producer in eligible {
        match best {
            Some(current) if current.arity() > producer.arity() => {},
            Some(current) if current.arity() == producer.arity() => tied = true,
            _ => {
                best = Some(producer);
                tied = false;
            }
        }
    }
    match best {
        None => Err(Error::NoSuitableConstructor(name)),
        Some(_) if tied => Err(Error::AmbiguousConstructors(name)),
        Some(producer) => Ok(producer),
    }
}
