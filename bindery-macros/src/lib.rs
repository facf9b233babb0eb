//! Proc-Macros for the bindery dependency-composition engine
//!

use proc_macro::TokenStream;
use syn::parse_macro_input;

mod producers;

/// Implements the `Produce` trait from the functions of an inherent impl block
/// that are marked with `#[producer]` or `#[producer(preferred)]`.
///
/// Marked functions take their dependencies as `Arc<C>` arguments and return
/// either `Self` or `Result<Self, bindery::error::Error>`.
/// Functions without arguments must return `Self`.
///
/// Types that implement `Default` are already produced by `Default::default`
/// and can not use this macro.
///
/// # Example
/// ```ignore
/// use std::sync::Arc;
/// use bindery::producers;
///
/// struct Cron {
///     clock: Arc<dyn Clock>,
/// }
///
/// #[producers]
/// impl Cron {
///     #[producer]
///     fn new(clock: Arc<dyn Clock>) -> Self {
///         Self { clock }
///     }
/// }
///
/// // This expands to:
/// // impl Produce for Cron {
/// //     fn producers(implementation: ImplementationBuilder<Self>) -> ImplementationBuilder<Self> {
/// //         implementation.producer(|__arg0: Arc<dyn Clock>| Ok(Self::new(__arg0)))
/// //     }
/// // }
/// ```
/// # Errors
/// This macro will fail to compile if:
/// - It is not applied to an inherent impl block
/// - A marked function has a receiver or more than 8 arguments
/// - A marked function without arguments returns a `Result`
/// - The attribute argument is anything other than `preferred`
#[proc_macro_attribute]
pub fn producers(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as syn::ItemImpl);
    producers::expand_producers(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
