//! Typed producer functions
//!
//! A producer function takes its dependencies as `Arc<C>` arguments, in the
//! order they are declared. Functions without dependencies return the value
//! itself, functions with dependencies return `Result<T, Error>` so that a
//! failure of the user code reaches the caller unchanged.

use crate::error::Error;

/// The largest number of dependencies a typed producer function can take
pub const MAX_ARITY: usize = 8;

/// A producer function over an argument tuple `Args`
pub trait GenericFactory<Args>: Send + Sync + 'static {
    /// The implementation type it produces
    type Output;

    /// Produces the implementation from already extracted dependencies
    fn produce(&self, args: Args) -> Result<Self::Output, Error>;
}

impl<F, R> GenericFactory<()> for F
where
    F: Fn() -> R + Send + Sync + 'static
{
    type Output = R;

    #[inline]
    fn produce(&self, _: ()) -> Result<R, Error> {
        Ok(self())
    }
}

// Peels one dependency per step, so every arity up to the full list is covered
macro_rules! fallible_arities {
    () => {};
    ($head:ident $($tail:ident)*) => {
        impl<F, R, $head, $($tail,)*> GenericFactory<($head, $($tail,)*)> for F
        where
            F: Fn($head, $($tail),*) -> Result<R, Error> + Send + Sync + 'static,
        {
            type Output = R;

            #[inline]
            #[allow(non_snake_case)]
            fn produce(&self, ($head, $($tail,)*): ($head, $($tail,)*)) -> Result<R, Error> {
                self($head, $($tail),*)
            }
        }

        fallible_arities! { $($tail)* }
    };
}

fallible_arities! { D1 D2 D3 D4 D5 D6 D7 D8 }
