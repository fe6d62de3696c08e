//! Extraction of header declarations from Rust source using syn

use anyhow::{Context, Result, bail};
use quote::ToTokens;
use syn::{Item, ItemFn, ItemMod, ReturnType, Type as SynType};

use crate::model::{ExportedFunction, Parameter, Type, TypeTag};

/// Module in `types.rs` holding the raw tag numbers
pub const TAG_MODULE: &str = "sexptype";

/// Read the `SEXPTYPE` constants from the tag module in `source`
pub fn parse_type_tags(source: &str) -> Result<Vec<TypeTag>> {
    let file = syn::parse_file(source).context("Failed to parse type source")?;

    for item in &file.items {
        if let Item::Mod(item_mod) = item {
            if item_mod.ident == TAG_MODULE {
                return parse_tag_module(item_mod);
            }
        }
    }
    bail!("no `pub mod {TAG_MODULE}` found")
}

fn parse_tag_module(item_mod: &ItemMod) -> Result<Vec<TypeTag>> {
    let mut tags = Vec::new();
    let Some((_, items)) = &item_mod.content else {
        return Ok(tags);
    };

    for item in items {
        let Item::Const(const_item) = item else {
            continue;
        };
        if !matches!(const_item.vis, syn::Visibility::Public(_)) {
            continue;
        }
        let name = const_item.ident.to_string();
        let value = match &*const_item.expr {
            syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Int(int),
                ..
            }) => int
                .base10_parse::<u32>()
                .with_context(|| format!("Invalid value for {name}"))?,
            other => bail!(
                "{name} must be an integer literal, found `{}`",
                other.to_token_stream()
            ),
        };
        tags.push(TypeTag {
            name,
            value,
            doc: extract_doc_comments(&const_item.attrs),
        });
    }
    Ok(tags)
}

/// Read every unmangled `extern "C"` function in `source`
pub fn parse_exports(source: &str) -> Result<Vec<ExportedFunction>> {
    let file = syn::parse_file(source).context("Failed to parse FFI source")?;

    let mut functions = Vec::new();
    for item in &file.items {
        if let Item::Fn(func) = item {
            if is_exported(func) {
                functions.push(parse_function(func));
            }
        }
    }
    Ok(functions)
}

fn is_exported(func: &ItemFn) -> bool {
    let extern_c = func
        .sig
        .abi
        .as_ref()
        .and_then(|abi| abi.name.as_ref())
        .is_some_and(|name| name.value() == "C");
    extern_c && func.attrs.iter().any(is_no_mangle)
}

/// `#[no_mangle]` or the 2024 spelling `#[unsafe(no_mangle)]`
fn is_no_mangle(attr: &syn::Attribute) -> bool {
    let text = attr.meta.to_token_stream().to_string().replace(' ', "");
    text == "no_mangle" || text == "unsafe(no_mangle)"
}

fn parse_function(func: &ItemFn) -> ExportedFunction {
    let mut params = Vec::new();
    for input in &func.sig.inputs {
        if let syn::FnArg::Typed(pat_type) = input {
            let name = if let syn::Pat::Ident(ident) = &*pat_type.pat {
                ident.ident.to_string()
            } else {
                "arg".to_string()
            };
            params.push(Parameter {
                name,
                ty: Type::new(&type_to_string(&pat_type.ty)),
            });
        }
    }

    let return_type = match &func.sig.output {
        ReturnType::Default => Type::new("()"),
        ReturnType::Type(_, ty) => Type::new(&type_to_string(ty)),
    };

    ExportedFunction {
        name: func.sig.ident.to_string(),
        params,
        return_type,
        doc_comment: extract_doc_comments(&func.attrs),
    }
}

/// Doc comment lines, trimmed and joined with newlines
fn extract_doc_comments(attrs: &[syn::Attribute]) -> String {
    let mut lines = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        if let syn::Meta::NameValue(meta) = &attr.meta {
            if let syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(lit_str),
                ..
            }) = &meta.value
            {
                lines.push(lit_str.value().trim().to_string());
            }
        }
    }
    lines.join("\n")
}

fn type_to_string(ty: &SynType) -> String {
    match ty {
        SynType::Path(type_path) => match type_path.path.segments.last() {
            Some(segment) => segment.ident.to_string(),
            None => ty.to_token_stream().to_string(),
        },
        SynType::Ptr(type_ptr) => {
            let mutability = if type_ptr.mutability.is_some() {
                "*mut "
            } else {
                "*const "
            };
            format!("{}{}", mutability, type_to_string(&type_ptr.elem))
        }
        SynType::Tuple(type_tuple) if type_tuple.elems.is_empty() => "()".to_string(),
        _ => ty.to_token_stream().to_string(),
    }
}
