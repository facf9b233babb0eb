//! Macros for producer discovery

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::{
    Attribute, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, Meta, ReturnType, Type,
    spanned::Spanned
};

const ATTRIBUTE: &str = "producer";
// Mirrors `bindery::producer::factory::MAX_ARITY`
const MAX_ARGS: usize = 8;

/// How a marked function is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marking {
    Regular,
    Preferred,
}

/// Reads the `#[producer]` attribute, `None` if the function is not marked
pub(crate) fn parse_marking(attrs: &[Attribute]) -> syn::Result<Option<Marking>> {
    let Some(attr) = attrs.iter().find(|a| a.path().is_ident(ATTRIBUTE)) else {
        return Ok(None);
    };
    match &attr.meta {
        Meta::Path(_) => Ok(Some(Marking::Regular)),
        Meta::List(_) => {
            let ident: Ident = attr.parse_args()?;
            if ident == "preferred" {
                Ok(Some(Marking::Preferred))
            } else {
                Err(syn::Error::new(ident.span(), "expected `preferred`"))
            }
        },
        Meta::NameValue(meta) => Err(syn::Error::new(meta.span(), "expected `#[producer]` or `#[producer(preferred)]`")),
    }
}

fn returns_result(output: &ReturnType) -> bool {
    match output {
        ReturnType::Type(_, ty) => match ty.as_ref() {
            Type::Path(path) => path.path.segments
                .last()
                .is_some_and(|segment| segment.ident == "Result"),
            _ => false,
        },
        ReturnType::Default => false,
    }
}

/// Builds the factory expression registered for one marked function
fn expand_factory(function: &ImplItemFn) -> syn::Result<TokenStream> {
    let name = &function.sig.ident;
    let mut types = Vec::new();
    for arg in &function.sig.inputs {
        match arg {
            FnArg::Receiver(receiver) => {
                return Err(syn::Error::new(receiver.span(), "producers can not take `self`"));
            },
            FnArg::Typed(pat) => types.push(pat.ty.as_ref()),
        }
    }
    if types.len() > MAX_ARGS {
        return Err(syn::Error::new(
            function.sig.inputs.span(),
            format!("producers can take at most {MAX_ARGS} arguments")));
    }

    let fallible = returns_result(&function.sig.output);
    if types.is_empty() {
        if fallible {
            return Err(syn::Error::new(
                function.sig.output.span(),
                "producers without arguments must return `Self`"));
        }
        return Ok(quote! { Self::#name });
    }

    let args = (0..types.len())
        .map(|i| format_ident!("__arg{}", i, span = Span::mixed_site()))
        .collect::<Vec<_>>();
    let call = quote! { Self::#name(#(#args),*) };
    let body = if fallible {
        call
    } else {
        quote! { ::core::result::Result::Ok::<_, ::bindery::error::Error>(#call) }
    };
    Ok(quote! { |#(#args: #types),*| #body })
}

/// Creates the `Produce` implementation and strips the `#[producer]` attributes
pub(super) fn expand_producers(mut input: ItemImpl) -> syn::Result<TokenStream> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new(path.span(), "`#[producers]` expects an inherent impl block"));
    }

    let mut registrations = Vec::new();
    for item in input.items.iter_mut() {
        let ImplItem::Fn(function) = item else {
            continue;
        };
        let Some(marking) = parse_marking(&function.attrs)? else {
            continue;
        };
        function.attrs.retain(|a| !a.path().is_ident(ATTRIBUTE));

        let factory = expand_factory(function)?;
        registrations.push(match marking {
            Marking::Regular => quote! { .producer(#factory) },
            Marking::Preferred => quote! { .preferred(#factory) },
        });
    }

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        #input

        impl #impl_generics ::bindery::Produce for #self_ty #where_clause {
            fn producers(
                implementation: ::bindery::ImplementationBuilder<Self>
            ) -> ::bindery::ImplementationBuilder<Self> {
                implementation #(#registrations)*
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn it_reads_markings() {
        let function: ImplItemFn = parse_quote! {
            #[producer]
            fn new() -> Self { Self }
        };
        assert_eq!(parse_marking(&function.attrs).unwrap(), Some(Marking::Regular));

        let function: ImplItemFn = parse_quote! {
            #[producer(preferred)]
            fn new() -> Self { Self }
        };
        assert_eq!(parse_marking(&function.attrs).unwrap(), Some(Marking::Preferred));

        let function: ImplItemFn = parse_quote! {
            fn new() -> Self { Self }
        };
        assert_eq!(parse_marking(&function.attrs).unwrap(), None);
    }

    #[test]
    fn it_fails_on_unknown_marking() {
        let function: ImplItemFn = parse_quote! {
            #[producer(fastest)]
            fn new() -> Self { Self }
        };

        assert!(parse_marking(&function.attrs).is_err());
    }

    #[test]
    fn it_detects_fallible_producers() {
        let function: ImplItemFn = parse_quote! {
            fn new(a: Arc<dyn A>) -> Result<Self, Error> { todo!() }
        };

        assert!(returns_result(&function.sig.output));
    }

    #[test]
    fn it_rejects_receivers() {
        let function: ImplItemFn = parse_quote! {
            fn new(&self) -> Self { todo!() }
        };

        assert!(expand_factory(&function).is_err());
    }

    #[test]
    fn it_rejects_fallible_producer_without_arguments() {
        let function: ImplItemFn = parse_quote! {
            fn new() -> Result<Self, Error> { todo!() }
        };

        assert!(expand_factory(&function).is_err());
    }

    #[test]
    fn it_strips_markings_and_implements_produce() {
        let input: ItemImpl = parse_quote! {
            impl Cron {
                #[producer]
                fn new(clock: Arc<dyn Clock>) -> Self { todo!() }

                fn helper(&self) {}
            }
        };

        let output = expand_producers(input).unwrap().to_string();

        assert!(!output.contains("# [producer]"));
        assert!(output.contains(":: bindery :: Produce for Cron"));
        assert!(output.contains(". producer ("));
    }

    #[test]
    fn it_rejects_trait_impls() {
        let input: ItemImpl = parse_quote! {
            impl Default for Cron {
                fn default() -> Self { todo!() }
            }
        };

        assert!(expand_producers(input).is_err());
    }
}
