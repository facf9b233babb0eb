//! Extractors for fetching producer arguments from resolved services

use super::Service;
use crate::{capability::Capability, error::Error};
use std::{any::type_name, sync::Arc};

/// A single producer parameter
pub trait Dependency: Sized + Send + Sync + 'static {
    /// The capability this parameter requires
    fn capability() -> Capability;

    /// Extracts `Self` from a resolved service
    fn from_service(service: &Service) -> Result<Self, Error>;
}

impl<C: ?Sized + Send + Sync + 'static> Dependency for Arc<C> {
    #[inline]
    fn capability() -> Capability {
        Capability::of::<C>()
    }

    #[inline]
    fn from_service(service: &Service) -> Result<Self, Error> {
        service
            .downcast_ref::<Arc<C>>()
            .cloned()
            .ok_or(Error::ResolveFailed(type_name::<C>()))
    }
}

/// An ordered list of producer parameters
pub trait FromArgs: Sized + Send + Sync {
    /// Capabilities of the parameters, in order
    fn capabilities() -> Vec<Capability>;

    /// Extracts `Self` from resolved services, in parameter order
    fn from_args(args: &[Service]) -> Result<Self, Error>;
}

impl FromArgs for () {
    #[inline]
    fn capabilities() -> Vec<Capability> {
        Vec::new()
    }

    #[inline]
    fn from_args(_: &[Service]) -> Result<Self, Error> {
        Ok(())
    }
}

// Same peeling as the factory arities, one tuple length per step
macro_rules! dependency_tuples {
    () => {};
    ($head:ident $($tail:ident)*) => {
        impl<$head: Dependency, $($tail: Dependency,)*> FromArgs for ($head, $($tail,)*) {
            #[inline]
            fn capabilities() -> Vec<Capability> {
                vec![$head::capability(), $($tail::capability(),)*]
            }

            #[inline]
            fn from_args(args: &[Service]) -> Result<Self, Error> {
                let mut args = args.iter();
                Ok((
                    take::<$head>(&mut args)?,
                    $(take::<$tail>(&mut args)?,)*
                ))
            }
        }

        dependency_tuples! { $($tail)* }
    };
}

#[inline]
fn take<D: Dependency>(args: &mut std::slice::Iter<'_, Service>) -> Result<D, Error> {
    let service = args.next().ok_or(Error::ResolveFailed(type_name::<D>()))?;
    D::from_service(service)
}

dependency_tuples! { D1 D2 D3 D4 D5 D6 D7 D8 }
