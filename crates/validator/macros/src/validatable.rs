use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Attribute, DeriveInput, GenericParam, LitStr, parse_macro_input, parse_quote};

use crate::support::utils;

pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(input) {
        Ok(ts) => ts.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// Parsed `#[validate(...)]` on one field.
#[derive(Default)]
struct FieldAttrs {
    rules: Option<LitStr>,
    name: Option<LitStr>,
    skip: bool,
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    let mut first = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("validate")) {
        first.get_or_insert(attr);
        // Shorthand: #[validate("required,email")]
        if let Ok(rules) = attr.parse_args::<LitStr>() {
            set_once(&mut out.rules, rules, attr)?;
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rules") {
                let rules: LitStr = meta.value()?.parse()?;
                set_once(&mut out.rules, rules, attr)
            } else if meta.path.is_ident("name") {
                let name: LitStr = meta.value()?.parse()?;
                if name.value().is_empty() {
                    return Err(meta.error("`name` must not be empty"));
                }
                set_once(&mut out.name, name, attr)
            } else if meta.path.is_ident("skip") {
                out.skip = true;
                Ok(())
            } else {
                Err(meta.error("expected `rules = \"...\"`, `name = \"...\"` or `skip`"))
            }
        })?;
    }

    if let Some(attr) = first
        && out.skip
        && (out.rules.is_some() || out.name.is_some())
    {
        return Err(syn::Error::new_spanned(
            attr,
            "`skip` cannot be combined with other `validate` options",
        ));
    }
    Ok(out)
}

fn set_once(slot: &mut Option<LitStr>, value: LitStr, attr: &Attribute) -> syn::Result<()> {
    if slot.is_some() {
        return Err(syn::Error::new_spanned(attr, "duplicate `validate` option"));
    }
    *slot = Some(value);
    Ok(())
}

fn expand(mut input: DeriveInput) -> syn::Result<TokenStream2> {
    let fields = utils::require_named_fields(&input)?.named.clone();
    let struct_name = &input.ident;
    let type_name = struct_name.unraw().to_string();

    let mut pushes = Vec::new();
    for field in &fields {
        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let Some(ident) = &field.ident else {
            continue;
        };
        let field_name = ident.unraw().to_string();

        let mut value = quote! {
            ::tagrule::FieldValue::new(#field_name, ::tagrule::Validatable::to_value(&self.#ident))
        };
        if let Some(rules) = &attrs.rules {
            value = quote! { #value.with_rules(#rules) };
        }
        if let Some(name) = &attrs.name {
            value = quote! { #value.with_display_name(#name) };
        }
        pushes.push(value);
    }

    let has_lifetimes = input.generics.lifetimes().next().is_some();
    for param in &mut input.generics.params {
        if let GenericParam::Type(ty) = param {
            ty.bounds.push(parse_quote!(::tagrule::Validatable));
            if !has_lifetimes {
                ty.bounds.push(parse_quote!('static));
            }
        }
    }
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let root = if has_lifetimes {
        quote! { ::tagrule::StructValue::anonymous(#type_name) }
    } else {
        quote! { ::tagrule::StructValue::new::<Self>(#type_name) }
    };

    Ok(quote! {
        impl #impl_generics ::tagrule::Validatable for #struct_name #ty_generics #where_clause {
            fn to_value(&self) -> ::tagrule::Value {
                ::tagrule::Value::Struct(#root #( .with_field(#pushes) )*)
            }
        }
    })
}
