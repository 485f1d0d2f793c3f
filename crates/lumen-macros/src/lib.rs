// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! This crate provides procedural macros for the lumen reflection facility.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, Data, DeriveInput, Expr, ExprLit, ExprUnary, Fields, Lit, LitStr, UnOp,
};

/// A derive macro that implements the `lumen_core::reflect::Reflect` trait.
///
/// Fields are exposed in declaration order. Field attributes:
///
/// - `#[reflect(skip)]` hides the field (its type need not implement `Reflect`).
/// - `#[reflect(read_only)]` marks the field display-only.
/// - `#[reflect(key = value)]` attaches a display hint, e.g. `min = 0.0`,
///   `max = 1.0` or `tooltip = "..."`. Values may be bool, integer, float or
///   string literals.
///
/// The generated code names `::lumen_core`. Crates that only reach it through
/// a re-export set the path on the struct, e.g.
/// `#[reflect(crate = "lumen_editor::lumen_core")]`.
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct ReflectedField {
    ident: syn::Ident,
    ty: syn::Type,
    read_only: bool,
    meta: Vec<(String, MetaLiteral)>,
}

enum MetaLiteral {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl MetaLiteral {
    fn to_tokens(&self, krate: &syn::Path) -> TokenStream2 {
        match self {
            MetaLiteral::Bool(v) => quote! { #krate::reflect::MetaValue::Bool(#v) },
            MetaLiteral::Int(v) => quote! { #krate::reflect::MetaValue::Int(#v) },
            MetaLiteral::Float(v) => quote! { #krate::reflect::MetaValue::Float(#v) },
            MetaLiteral::Str(v) => quote! { #krate::reflect::MetaValue::Str(#v) },
        }
    }
}

/// Reads `#[reflect(crate = "...")]` from the struct, defaulting to `::lumen_core`.
fn crate_path(input: &DeriveInput) -> syn::Result<syn::Path> {
    let mut krate = None;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("reflect")) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("crate") {
                let lit: LitStr = nested.value()?.parse()?;
                krate = Some(lit.parse::<syn::Path>()?);
                Ok(())
            } else {
                Err(nested.error("unsupported struct attribute, expected `crate`"))
            }
        })?;
    }
    Ok(krate.unwrap_or_else(|| syn::parse_quote!(::lumen_core)))
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let krate = crate_path(input)?;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => Some(&named.named),
            Fields::Unit => None,
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    name,
                    "#[derive(Reflect)] requires named fields; use impl_reflect_value! for newtypes",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "#[derive(Reflect)] only supports structs",
            ))
        }
    };

    let mut fields = Vec::new();
    for field in named.into_iter().flatten() {
        if let Some(reflected) = parse_field(field)? {
            fields.push(reflected);
        }
    }

    let count = fields.len();
    let infos = fields.iter().map(|f| {
        let field_name = f.ident.to_string();
        let ty = &f.ty;
        let read_only = f.read_only;
        let meta = f.meta.iter().map(|(key, value)| {
            let value = value.to_tokens(&krate);
            quote! { (#key, #value) }
        });
        quote! {
            #krate::reflect::FieldInfo {
                name: #field_name,
                type_name: stringify!(#ty),
                read_only: #read_only,
                meta: &[#(#meta),*],
            }
        }
    });
    let indices: Vec<usize> = (0..count).collect();
    let idents: Vec<&syn::Ident> = fields.iter().map(|f| &f.ident).collect();

    Ok(quote! {
        impl #impl_generics #krate::reflect::Reflect for #name #ty_generics #where_clause {
            fn type_info(&self) -> #krate::reflect::TypeInfo {
                #krate::reflect::TypeInfo::of::<Self>()
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }

            fn fields(&self) -> &'static [#krate::reflect::FieldInfo] {
                static FIELDS: [#krate::reflect::FieldInfo; #count] = [#(#infos),*];
                &FIELDS
            }

            #[allow(unreachable_patterns)]
            fn field(&self, index: usize) -> ::std::option::Option<&dyn #krate::reflect::Reflect> {
                match index {
                    #(#indices => ::std::option::Option::Some(&self.#idents as &dyn #krate::reflect::Reflect),)*
                    _ => ::std::option::Option::None,
                }
            }

            #[allow(unreachable_patterns)]
            fn field_mut(&mut self, index: usize) -> ::std::option::Option<&mut dyn #krate::reflect::Reflect> {
                match index {
                    #(#indices => ::std::option::Option::Some(&mut self.#idents as &mut dyn #krate::reflect::Reflect),)*
                    _ => ::std::option::Option::None,
                }
            }
        }
    })
}

/// Returns `None` for `#[reflect(skip)]` fields.
fn parse_field(field: &syn::Field) -> syn::Result<Option<ReflectedField>> {
    let Some(ident) = field.ident.clone() else {
        return Err(syn::Error::new_spanned(field, "expected a named field"));
    };

    let mut skip = false;
    let mut read_only = false;
    let mut meta = Vec::new();

    for attr in field.attrs.iter().filter(|a| a.path().is_ident("reflect")) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("skip") {
                skip = true;
                return Ok(());
            }
            if nested.path.is_ident("read_only") {
                read_only = true;
                return Ok(());
            }

            let key = nested
                .path
                .get_ident()
                .ok_or_else(|| nested.error("expected a plain identifier"))?
                .to_string();
            let expr: Expr = nested.value()?.parse()?;
            meta.push((key, eval_literal(&expr)?));
            Ok(())
        })?;
    }

    if skip {
        return Ok(None);
    }

    Ok(Some(ReflectedField {
        ident,
        ty: field.ty.clone(),
        read_only,
        meta,
    }))
}

fn eval_literal(expr: &Expr) -> syn::Result<MetaLiteral> {
    match expr {
        Expr::Lit(ExprLit { lit, .. }) => match lit {
            Lit::Bool(b) => Ok(MetaLiteral::Bool(b.value)),
            Lit::Int(i) => Ok(MetaLiteral::Int(i.base10_parse()?)),
            Lit::Float(f) => Ok(MetaLiteral::Float(f.base10_parse()?)),
            Lit::Str(s) => Ok(MetaLiteral::Str(s.value())),
            other => Err(syn::Error::new_spanned(other, "unsupported metadata literal")),
        },
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr: inner,
            ..
        }) => match eval_literal(inner)? {
            MetaLiteral::Int(v) => Ok(MetaLiteral::Int(-v)),
            MetaLiteral::Float(v) => Ok(MetaLiteral::Float(-v)),
            _ => Err(syn::Error::new_spanned(expr, "only numbers can be negated")),
        },
        Expr::Group(group) => eval_literal(&group.expr),
        _ => Err(syn::Error::new_spanned(
            expr,
            "metadata values must be literals",
        )),
    }
}
