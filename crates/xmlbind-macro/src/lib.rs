//! Derive macro backing the `xmlbind` crate.
//!
//! `#[derive(FromXml)]` reads the `#[xml(...)]` attributes of a named-field
//! struct and generates the type's binding table (`FromXml::mapping`) plus
//! its `FromElement` impl, which is the recursion seam the object builder
//! dispatches through.
//!
//! Recognized attributes:
//!
//! - container: `#[xml(root = "tag")]`
//! - field: `#[xml(attribute)]`, `#[xml(attribute = "name")]`
//! - field: `#[xml(element)]`, `#[xml(element = "tag")]`
//! - field: `#[xml(elements)]`, `#[xml(elements = "wrapper")]`,
//!   `#[xml(elements(inline))]`; the field must be a `Vec<T>`
//!
//! Omitted names default to the lowerCamelCase form of the field
//! identifier. Fields without an `#[xml(...)]` attribute are left unbound.

use heck::ToLowerCamelCase;
use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{
    Data, DeriveInput, Error, Fields, GenericArgument, LitStr, PathArguments, Token, Type,
    parse_macro_input, spanned::Spanned,
};

#[proc_macro_derive(FromXml, attributes(xml))]
pub fn derive_from_xml(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// One field's parsed binding declaration.
enum Binding {
    Attribute { name: Option<String> },
    Element { tag: Option<String> },
    Elements { inline: bool, wrapper: Option<String> },
}

fn expand(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            other => {
                return Err(Error::new(
                    other.span(),
                    "FromXml can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(Error::new(
                input.ident.span(),
                "FromXml can only be derived for structs",
            ));
        }
    };

    let root = parse_container_attrs(&input)?;
    let root_expr = match &root {
        Some(tag) => {
            let lit = LitStr::new(tag, Span::call_site());
            quote!(::core::option::Option::Some(#lit))
        }
        None => quote!(::core::option::Option::None),
    };

    let mut binding_calls = Vec::new();
    for field in fields {
        let Some(binding) = parse_field_attrs(field)? else {
            continue;
        };
        let field_ident = field.ident.as_ref().expect("named field");
        let field_str = field_ident.to_string();
        let default_name = field_str.to_lower_camel_case();
        let ty = &field.ty;

        match binding {
            Binding::Attribute { name } => {
                let name = LitStr::new(name.as_deref().unwrap_or(&default_name), field.span());
                binding_calls.push(quote! {
                    .attribute(#name, |value: &mut Self, raw: &str| {
                        value.#field_ident =
                            <#ty as ::xmlbind::FromText>::from_text(#name, raw)?;
                        ::core::result::Result::Ok(())
                    })
                });
            }
            Binding::Element { tag } => {
                let tag = LitStr::new(tag.as_deref().unwrap_or(&default_name), field.span());
                binding_calls.push(quote! {
                    .element(#tag, |value: &mut Self, cursor: &mut ::xmlbind::Cursor<'_>| {
                        value.#field_ident =
                            <#ty as ::xmlbind::FromElement>::from_element(cursor)?;
                        ::core::result::Result::Ok(())
                    })
                });
            }
            Binding::Elements { inline, wrapper } => {
                let item = vec_item_type(ty).ok_or_else(|| {
                    Error::new(
                        ty.span(),
                        "#[xml(elements)] requires the field to be a Vec<T>",
                    )
                })?;
                let field_lit = LitStr::new(&field_str, field.span());
                let append = quote! {
                    |value: &mut Self, cursor: &mut ::xmlbind::Cursor<'_>| {
                        value.#field_ident.push(
                            <#item as ::xmlbind::FromElement>::from_element(cursor)?,
                        );
                        ::core::result::Result::Ok(())
                    }
                };
                if inline {
                    binding_calls.push(quote! {
                        .list_inline(
                            #field_lit,
                            <#item as ::xmlbind::FromXml>::ROOT,
                            #append,
                        )
                    });
                } else {
                    let wrapper =
                        LitStr::new(wrapper.as_deref().unwrap_or(&default_name), field.span());
                    binding_calls.push(quote! {
                        .list_wrapped(#field_lit, #wrapper, #append)
                    });
                }
            }
        }
    }

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::xmlbind::FromXml for #ident #ty_generics #where_clause {
            const ROOT: ::core::option::Option<&'static str> = #root_expr;

            fn mapping() -> ::xmlbind::Mapping<Self> {
                ::xmlbind::Mapping::<Self>::new(<Self as ::xmlbind::FromXml>::ROOT)
                    #(#binding_calls)*
            }
        }

        #[automatically_derived]
        impl #impl_generics ::xmlbind::FromElement for #ident #ty_generics #where_clause {
            fn from_element(
                cursor: &mut ::xmlbind::Cursor<'_>,
            ) -> ::xmlbind::Result<Self> {
                ::xmlbind::build(cursor)
            }
        }
    })
}

fn parse_container_attrs(input: &DeriveInput) -> syn::Result<Option<String>> {
    let mut root = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("xml") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("root") {
                let lit: LitStr = meta.value()?.parse()?;
                root = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unsupported container attribute; expected `root = \"...\"`"))
            }
        })?;
    }
    Ok(root)
}

fn parse_field_attrs(field: &syn::Field) -> syn::Result<Option<Binding>> {
    let mut binding = None;
    for attr in &field.attrs {
        if !attr.path().is_ident("xml") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if binding.is_some() {
                return Err(meta.error("field declares more than one xml binding"));
            }
            if meta.path.is_ident("attribute") {
                let name = optional_name(&meta)?;
                binding = Some(Binding::Attribute { name });
                Ok(())
            } else if meta.path.is_ident("element") {
                let tag = optional_name(&meta)?;
                binding = Some(Binding::Element { tag });
                Ok(())
            } else if meta.path.is_ident("elements") {
                if meta.input.peek(syn::token::Paren) {
                    let mut inline = false;
                    meta.parse_nested_meta(|inner| {
                        if inner.path.is_ident("inline") {
                            inline = true;
                            Ok(())
                        } else {
                            Err(inner.error("unsupported list option; expected `inline`"))
                        }
                    })?;
                    binding = Some(Binding::Elements {
                        inline,
                        wrapper: None,
                    });
                } else {
                    let wrapper = optional_name(&meta)?;
                    binding = Some(Binding::Elements {
                        inline: false,
                        wrapper,
                    });
                }
                Ok(())
            } else {
                Err(meta.error(
                    "unsupported xml binding; expected `attribute`, `element`, or `elements`",
                ))
            }
        })?;
    }
    Ok(binding)
}

fn optional_name(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<Option<String>> {
    if meta.input.peek(Token![=]) {
        let lit: LitStr = meta.value()?.parse()?;
        Ok(Some(lit.value()))
    } else {
        Ok(None)
    }
}

/// Extracts `T` from a `Vec<T>` field type, syntactically.
fn vec_item_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Vec" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(item) => Some(item),
        _ => None,
    })
}
