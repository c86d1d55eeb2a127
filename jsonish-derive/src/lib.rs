//! Derive macro for `jsonish::FromValue`.
//!
//! Generates a schema plus a coercion implementation from an ordinary Rust
//! struct or enum, the way `serde_derive` generates `Deserialize`. Structs
//! become `Schema::Object` and use the object coercer's field-matching
//! helpers (`jsonish::coercer::object`); C-like enums (unit variants only)
//! become `Schema::Enum` and resolve through the literal/enum matcher
//! (`jsonish::coercer::literal`); data-carrying enums (each variant a single
//! unnamed field) become `Schema::Union` and resolve through the union
//! coercer (`jsonish::coercer::union`).
//!
//! Attributes, all under `#[jsonish(...)]`:
//! - on a field: `alias = "other_name"` (repeatable) — extra accepted key
//!   spellings beyond the automatic case-convention tier.
//! - on a struct: `strict` — undeclared input keys add an `ExtraKey` penalty
//!   instead of being silently ignored.
//! - on an enum: `discriminator = "field"` — inspect this object field to
//!   pick a union variant directly, skipping the two-phase resolution.
//! - on a union variant: `tag = "value"` — the discriminator value selecting
//!   this variant.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse_macro_input, Data, DataEnum, DataStruct, DeriveInput, Fields, GenericArgument, LitStr,
    PathArguments, Type,
};

#[proc_macro_derive(FromValue, attributes(jsonish))]
pub fn derive_from_value(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(data_struct) => derive_struct(name, data_struct, &input.attrs),
        Data::Enum(data_enum) => derive_enum(name, data_enum, &input.attrs),
        Data::Union(_) => {
            return syn::Error::new_spanned(&input, "FromValue cannot be derived for unions")
                .to_compile_error()
                .into();
        }
    };

    let expanded = quote! {
        impl #impl_generics ::jsonish::FromValue for #name #ty_generics #where_clause {
            #body
        }
    };

    TokenStream::from(expanded)
}

fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(p) = ty {
        if let Some(seg) = p.path.segments.last() {
            return seg.ident == "Option";
        }
    }
    false
}

/// True if `ty` is exactly `Box<self_ident>` — the direct self-reference
/// shape a recursive struct/enum uses to contain itself (spec §4.2.7).
fn is_box_of_self(ty: &Type, self_ident: &syn::Ident) -> bool {
    box_inner(ty).is_some_and(|inner| type_is_ident(&inner, self_ident))
}

fn box_inner(ty: &Type) -> Option<Type> {
    if let Type::Path(p) = ty {
        if let Some(seg) = p.path.segments.last() {
            if seg.ident == "Box" {
                if let PathArguments::AngleBracketed(args) = &seg.arguments {
                    if let Some(GenericArgument::Type(inner)) = args.args.first() {
                        return Some(inner.clone());
                    }
                }
            }
        }
    }
    None
}

fn type_is_ident(ty: &Type, ident: &syn::Ident) -> bool {
    matches!(ty, Type::Path(p) if p.path.segments.last().is_some_and(|seg| seg.ident == *ident))
}

/// The schema expression for one field/variant's declared type: a direct
/// `Box<Self>` occurrence becomes a lazily-resolved `Schema::RecursiveAlias`
/// instead of eagerly calling `<Box<Self> as FromValue>::schema()`, which
/// would recurse into `Self::schema()` again and never return.
fn field_schema_expr(
    ty: &Type,
    self_ident: &syn::Ident,
    self_name: &str,
) -> proc_macro2::TokenStream {
    if is_box_of_self(ty, self_ident) {
        quote! {
            ::jsonish::Schema::RecursiveAlias {
                name: #self_name.to_string(),
                resolve: ::std::sync::Arc::new(|| <Self as ::jsonish::FromValue>::schema()),
            }
        }
    } else {
        quote! { <#ty as ::jsonish::FromValue>::schema() }
    }
}

fn option_inner(ty: &Type) -> Type {
    if let Type::Path(p) = ty {
        if let Some(seg) = p.path.segments.last() {
            if seg.ident == "Option" {
                if let PathArguments::AngleBracketed(args) = &seg.arguments {
                    if let Some(GenericArgument::Type(inner)) = args.args.first() {
                        return inner.clone();
                    }
                }
            }
        }
    }
    ty.clone()
}

/// Reads every `alias = "..."` inside `#[jsonish(...)]` attributes.
fn jsonish_aliases(attrs: &[syn::Attribute]) -> Vec<String> {
    let mut out = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("jsonish") {
            continue;
        }
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("alias") {
                let value = meta.value()?;
                let lit: LitStr = value.parse()?;
                out.push(lit.value());
            }
            Ok(())
        });
    }
    out
}

/// Reads a single string-valued key (`discriminator = "..."` or
/// `tag = "..."`) out of `#[jsonish(...)]` attributes.
fn jsonish_string_attr(attrs: &[syn::Attribute], key: &str) -> Option<String> {
    let mut found = None;
    for attr in attrs {
        if !attr.path().is_ident("jsonish") {
            continue;
        }
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(key) {
                let value = meta.value()?;
                let lit: LitStr = value.parse()?;
                found = Some(lit.value());
            }
            Ok(())
        });
    }
    found
}

fn jsonish_flag(attrs: &[syn::Attribute], key: &str) -> bool {
    for attr in attrs {
        if !attr.path().is_ident("jsonish") {
            continue;
        }
        let mut found = false;
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(key) {
                found = true;
            }
            Ok(())
        });
        if found {
            return true;
        }
    }
    false
}

fn derive_struct(
    name: &syn::Ident,
    data: &DataStruct,
    attrs: &[syn::Attribute],
) -> proc_macro2::TokenStream {
    let fields = match &data.fields {
        Fields::Named(named) => &named.named,
        _ => {
            return syn::Error::new_spanned(
                &data.fields,
                "FromValue only supports structs with named fields",
            )
            .to_compile_error();
        }
    };

    let name_str = name.to_string();
    let strict = jsonish_flag(attrs, "strict");

    let field_idents: Vec<_> = fields.iter().map(|f| f.ident.clone().unwrap()).collect();
    let field_names: Vec<String> = field_idents.iter().map(|i| i.to_string()).collect();
    let field_types: Vec<_> = fields.iter().map(|f| f.ty.clone()).collect();
    let field_optional: Vec<bool> = field_types.iter().map(is_option_type).collect();
    let field_inner_types: Vec<_> = field_types
        .iter()
        .zip(&field_optional)
        .map(|(ty, opt)| if *opt { option_inner(ty) } else { ty.clone() })
        .collect();
    let field_aliases: Vec<Vec<String>> =
        fields.iter().map(|f| jsonish_aliases(&f.attrs)).collect();

    let required_count = field_optional.iter().filter(|o| !**o).count();
    let sole_required_name = if required_count == 1 {
        field_names
            .iter()
            .zip(&field_optional)
            .find(|(_, opt)| !**opt)
            .map(|(n, _)| n.clone())
    } else {
        None
    };

    let schema_fields = field_names
        .iter()
        .zip(&field_inner_types)
        .zip(&field_optional)
        .zip(&field_aliases)
        .map(|(((fname, fty), opt), aliases)| {
            let opt_call = opt.then(|| quote! { .optional() });
            let field_schema = field_schema_expr(fty, name, &name_str);
            quote! {
                ::jsonish::schema::Field::new(#fname, #field_schema)
                    #opt_call
                    .with_aliases(vec![#(#aliases.to_string()),*])
            }
        });

    let single_value_rescue = match &sole_required_name {
        Some(field_name) => quote! {
            other => {
                vec![(#field_name.to_string(), other.clone())]
            }
        },
        None => quote! {
            other => {
                return Err(::jsonish::error::CoerceError::coercion_failed(
                    #name_str,
                    format!("expected an object, found {other:?}"),
                ));
            }
        },
    };

    let idx_idents: Vec<_> = field_idents
        .iter()
        .map(|i| syn::Ident::new(&format!("__idx_{i}"), i.span()))
        .collect();

    let find_idx_stmts = field_names
        .iter()
        .zip(&field_aliases)
        .zip(&idx_idents)
        .zip(&field_optional)
        .map(|(((fname, aliases), idx_ident), is_optional)| {
            let required = !*is_optional;
            quote! {
                let #idx_ident = ::jsonish::coercer::object::find_best_key(
                    &__entries,
                    &::jsonish::coercer::object::FieldSpec {
                        name: #fname,
                        aliases: &[#(#aliases),*],
                        required: #required,
                    },
                );
                if let Some(i) = #idx_ident {
                    __claimed[i] = true;
                }
            }
        });

    let missing_required_names: Vec<&String> = field_names
        .iter()
        .zip(&field_optional)
        .filter(|(_, opt)| !**opt)
        .map(|(n, _)| n)
        .collect();
    let missing_idx_checks: Vec<_> = field_idents
        .iter()
        .zip(&field_optional)
        .zip(&idx_idents)
        .filter(|((_, opt), _)| !**opt)
        .map(|((_, _), idx_ident)| quote! { #idx_ident.is_none() })
        .collect();

    let field_extractions =
        field_idents
            .iter()
            .zip(&field_types)
            .zip(&field_inner_types)
            .zip(&field_optional)
            .zip(&idx_idents)
            .map(|((((ident, declared_ty), inner_ty), opt), idx_ident)| {
                if *opt {
                    quote! {
                        let #ident: #declared_ty = match #idx_ident {
                            Some(i) => {
                                match ::jsonish::coercer::coerce::<#declared_ty>(&__entries[i].1, ctx) {
                                    Ok((v, mut fl)) => {
                                        __flags.append(&mut fl);
                                        v
                                    }
                                    Err(_) => {
                                        __flags.push(::jsonish::Flag::DefaultButHadValue);
                                        None
                                    }
                                }
                            }
                            None => {
                                __flags.push(::jsonish::Flag::OptionalDefaultFromNoValue);
                                None
                            }
                        };
                    }
                } else {
                    let fname = ident.to_string();
                    quote! {
                        let #ident: #inner_ty = match #idx_ident {
                            Some(i) => {
                                let (v, mut fl) = ::jsonish::coercer::coerce::<#inner_ty>(&__entries[i].1, ctx)?;
                                __flags.append(&mut fl);
                                v
                            }
                            None if __missing_required.len() == 1 && __unclaimed.len() == 1 => {
                                let i = __unclaimed[0];
                                let (v, mut fl) = ::jsonish::coercer::coerce::<#inner_ty>(&__entries[i].1, ctx)?;
                                __flags.push(::jsonish::Flag::ImpliedKey);
                                __flags.append(&mut fl);
                                __claimed[i] = true;
                                v
                            }
                            None => {
                                return Err(::jsonish::coercer::object::required_field_missing(#fname));
                            }
                        };
                    }
                }
            });

    quote! {
        fn schema() -> ::jsonish::Schema {
            ::jsonish::Schema::Object {
                name: #name_str.to_string(),
                fields: vec![#(#schema_fields),*],
                strict: #strict,
            }
        }

        fn try_cast(value: &::jsonish::value::Value, ctx: &mut ::jsonish::CoerceCtx) -> Option<Self> {
            match Self::coerce(value, ctx) {
                Ok((v, flags)) if flags.is_empty() => Some(v),
                _ => None,
            }
        }

        fn coerce(
            value: &::jsonish::value::Value,
            ctx: &mut ::jsonish::CoerceCtx,
        ) -> ::std::result::Result<(Self, Vec<::jsonish::Flag>), ::jsonish::error::CoerceError> {
            let (unwrapped, _) = value.unwrap_layers();
            let __entries: Vec<(String, ::jsonish::value::Value)> = match unwrapped {
                ::jsonish::value::Value::Object(entries, _) => entries.clone(),
                #single_value_rescue
            };
            let __entries = ::jsonish::coercer::object::consolidate_duplicates(&__entries);
            let mut __claimed = vec![false; __entries.len()];
            let mut __flags: Vec<::jsonish::Flag> = Vec::new();

            #(#find_idx_stmts)*

            let __missing_required: Vec<&str> = {
                let names: &[&str] = &[#(#missing_required_names),*];
                let missing: &[bool] = &[#(#missing_idx_checks),*];
                names
                    .iter()
                    .zip(missing.iter())
                    .filter(|(_, m)| **m)
                    .map(|(n, _)| *n)
                    .collect()
            };
            let __unclaimed: Vec<usize> = (0..__entries.len()).filter(|i| !__claimed[*i]).collect();

            #(#field_extractions)*

            for i in 0..__entries.len() {
                if !__claimed[i] {
                    if let Some(flag) = ::jsonish::coercer::object::extra_key_flag(#strict) {
                        __flags.push(flag);
                    }
                }
            }

            Ok((Self { #(#field_idents),* }, __flags))
        }
    }
}

fn derive_enum(
    name: &syn::Ident,
    data: &DataEnum,
    attrs: &[syn::Attribute],
) -> proc_macro2::TokenStream {
    let all_unit = data.variants.iter().all(|v| matches!(v.fields, Fields::Unit));
    if all_unit {
        return derive_unit_enum(name, data);
    }

    let all_newtype = data
        .variants
        .iter()
        .all(|v| matches!(&v.fields, Fields::Unnamed(f) if f.unnamed.len() == 1));
    if all_newtype {
        return derive_union_enum(name, data, attrs);
    }

    syn::Error::new_spanned(
        name,
        "FromValue enums must either have only unit variants (an Enum schema) \
         or only single-field tuple variants (a Union schema)",
    )
    .to_compile_error()
}

fn derive_unit_enum(name: &syn::Ident, data: &DataEnum) -> proc_macro2::TokenStream {
    let name_str = name.to_string();
    let variant_idents: Vec<_> = data.variants.iter().map(|v| v.ident.clone()).collect();
    let variant_names: Vec<String> = variant_idents.iter().map(|i| i.to_string()).collect();
    let variant_aliases: Vec<Vec<String>> =
        data.variants.iter().map(|v| jsonish_aliases(&v.attrs)).collect();
    let variant_indices: Vec<usize> = (0..variant_idents.len()).collect();

    let schema_values = variant_names.iter().zip(&variant_aliases).map(|(vname, aliases)| {
        quote! {
            {
                let mut value = ::jsonish::schema::EnumValue::new(#vname);
                #(value = value.with_alias(#aliases);)*
                value
            }
        }
    });

    let match_arms = variant_indices.iter().zip(&variant_idents).map(|(i, ident)| {
        quote! { #i => Self::#ident, }
    });

    quote! {
        fn schema() -> ::jsonish::Schema {
            ::jsonish::Schema::Enum {
                name: #name_str.to_string(),
                values: vec![#(#schema_values),*],
            }
        }

        fn try_cast(value: &::jsonish::value::Value, ctx: &mut ::jsonish::CoerceCtx) -> Option<Self> {
            match Self::coerce(value, ctx) {
                Ok((v, flags)) if flags.is_empty() => Some(v),
                _ => None,
            }
        }

        fn coerce(
            value: &::jsonish::value::Value,
            _ctx: &mut ::jsonish::CoerceCtx,
        ) -> ::std::result::Result<(Self, Vec<::jsonish::Flag>), ::jsonish::error::CoerceError> {
            let (scalar, mut flags) = ::jsonish::coercer::literal::extract_scalar(value)?;
            let (text, mut str_flags) = ::jsonish::coercer::primitives::coerce_string_value(&scalar)?;
            flags.append(&mut str_flags);
            let candidates: &[&str] = &[#(#variant_names),*];
            let (idx, mut match_flags) = ::jsonish::coercer::literal::match_enum(candidates, &text)?;
            flags.append(&mut match_flags);
            let result = match idx {
                #(#match_arms)*
                _ => {
                    return Err(::jsonish::error::CoerceError::coercion_failed(
                        #name_str,
                        format!("no variant matched `{text}`"),
                    ))
                }
            };
            Ok((result, flags))
        }
    }
}

fn derive_union_enum(
    name: &syn::Ident,
    data: &DataEnum,
    attrs: &[syn::Attribute],
) -> proc_macro2::TokenStream {
    let name_str = name.to_string();
    let discriminator = jsonish_string_attr(attrs, "discriminator");
    let discriminator_expr = match &discriminator {
        Some(d) => quote! { Some(#d) },
        None => quote! { None },
    };

    let variant_idents: Vec<_> = data.variants.iter().map(|v| v.ident.clone()).collect();
    let variant_inner_types: Vec<_> = data
        .variants
        .iter()
        .map(|v| match &v.fields {
            Fields::Unnamed(f) => f.unnamed[0].ty.clone(),
            _ => unreachable!("checked by derive_enum"),
        })
        .collect();
    let variant_tags: Vec<Option<String>> =
        data.variants.iter().map(|v| jsonish_string_attr(&v.attrs, "tag")).collect();
    let schema_node_names: Vec<String> = variant_idents
        .iter()
        .map(|i| format!("{name_str}::{i}"))
        .collect();

    let schema_options = variant_inner_types
        .iter()
        .map(|ty| field_schema_expr(ty, name, &name_str));

    let branches = (0..variant_idents.len()).map(|i| {
        let ident = &variant_idents[i];
        let ty = &variant_inner_types[i];
        let node = &schema_node_names[i];
        let tag_expr = match &variant_tags[i] {
            Some(t) => quote! { Some(#t) },
            None => quote! { None },
        };
        quote! {
            ::jsonish::coercer::union::UnionBranch {
                declaration_index: #i,
                schema_node: #node,
                discriminator_tag: #tag_expr,
                try_cast: Box::new(|v, ctx| {
                    match ::jsonish::coercer::coerce::<#ty>(v, ctx) {
                        Ok((val, flags)) if flags.is_empty() => Some(Self::#ident(val)),
                        _ => None,
                    }
                }),
                coerce: Box::new(|v, ctx| {
                    let (val, flags) = ::jsonish::coercer::coerce::<#ty>(v, ctx)?;
                    Ok((Self::#ident(val), flags))
                }),
            }
        }
    });

    quote! {
        fn schema() -> ::jsonish::Schema {
            ::jsonish::Schema::Union {
                name: #name_str.to_string(),
                options: vec![#(#schema_options),*],
                discriminator: #discriminator_expr.map(|field: &str| ::jsonish::schema::Discriminator {
                    field: field.to_string(),
                }),
            }
        }

        fn try_cast(value: &::jsonish::value::Value, ctx: &mut ::jsonish::CoerceCtx) -> Option<Self> {
            match Self::coerce(value, ctx) {
                Ok((v, flags)) if flags.is_empty() => Some(v),
                _ => None,
            }
        }

        fn coerce(
            value: &::jsonish::value::Value,
            ctx: &mut ::jsonish::CoerceCtx,
        ) -> ::std::result::Result<(Self, Vec<::jsonish::Flag>), ::jsonish::error::CoerceError> {
            let branches: Vec<::jsonish::coercer::union::UnionBranch<'_, Self>> = vec![#(#branches),*];
            ::jsonish::coercer::union::resolve(value, ctx, #discriminator_expr, &branches)
        }
    }
}
