//! `#[derive(LogRecord)]` for fixed-layout, little-endian log page records.
//!
//! Fields are decoded in declaration order through the `Wire` trait of the
//! `nvme_logpage` crate. Reserved gaps are declared with
//! `#[record(skip = N)]` on the field that follows them, and a struct level
//! `#[record(size = N)]` pads the record out to its documented size.
//!
//! The generated code names `crate::cursor` and `crate::error`, so the derive
//! is only usable from inside `nvme_logpage`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse, Attribute, Field, Fields, Ident, ItemStruct, LitInt, Type};

#[proc_macro_derive(LogRecord, attributes(record))]
pub fn log_record(input: TokenStream) -> TokenStream {
    let ast: ItemStruct = match parse(input) {
        Ok(ast) => ast,
        Err(e) => return e.to_compile_error().into(),
    };

    match expand(ast) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

struct RecordField {
    ident: Ident,
    ty: Type,
    skip: usize,
}

fn expand(ast: ItemStruct) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &ast.ident;
    let record_size = get_attr_usize(&ast.attrs, "size")?;

    let named = match &ast.fields {
        Fields::Named(fields) => &fields.named,
        _ => {
            return Err(syn::Error::new_spanned(
                &ast.ident,
                "LogRecord needs a struct with named fields",
            ))
        }
    };

    let mut fields = vec![];
    for field in named {
        fields.push(record_field(field)?);
    }

    let field_sizes = fields.iter().map(|f| {
        let ty = &f.ty;
        let skip = f.skip;
        quote! { + #skip + <#ty as crate::cursor::Wire>::SIZE }
    });

    let size = match record_size {
        Some(size) => quote! { #size },
        None => quote! { Self::FIELDS_SIZE },
    };

    let field_getters = fields.iter().map(|f| {
        let ident = &f.ident;
        let ty = &f.ty;
        quote! {
            pub fn #ident(&self) -> #ty {
                self.#ident
            }
        }
    });

    let field_ctors = fields.iter().map(|f| {
        let ident = &f.ident;
        let ty = &f.ty;
        let skip = f.skip;
        let skip = if skip > 0 {
            quote! { cursor.skip(#skip)?; }
        } else {
            quote! {}
        };
        quote! {
            #skip
            let #ident = <#ty as crate::cursor::Wire>::read(cursor)?;
        }
    });

    let field_names = fields.iter().map(|f| &f.ident);

    Ok(quote! {
        impl #struct_name {
            const FIELDS_SIZE: usize = 0 #(#field_sizes)*;
            const PADDING: usize = Self::SIZE - Self::FIELDS_SIZE;

            /// Size of the record on the wire, reserved bytes included.
            pub const SIZE: usize = #size;

            #(#field_getters)*

            /// Decodes one record and leaves the cursor just past it.
            pub fn decode(
                cursor: &mut crate::cursor::Cursor<'_>,
            ) -> ::std::result::Result<Self, crate::error::DecodeError> {
                cursor.ensure(Self::SIZE)?;

                #(#field_ctors)*

                cursor.skip(Self::PADDING)?;

                Ok(#struct_name {
                    #(#field_names),*
                })
            }

            pub fn from_bytes(
                buf: &[u8],
            ) -> ::std::result::Result<Self, crate::error::DecodeError> {
                Self::decode(&mut crate::cursor::Cursor::new(buf))
            }
        }
    })
}

fn record_field(field: &Field) -> syn::Result<RecordField> {
    let ident = match &field.ident {
        Some(ident) => ident.clone(),
        None => return Err(syn::Error::new_spanned(field, "unnamed field")),
    };

    Ok(RecordField {
        ident,
        ty: field.ty.clone(),
        skip: get_attr_usize(&field.attrs, "skip")?.unwrap_or(0),
    })
}

fn get_attr_usize(attrs: &[Attribute], name: &str) -> syn::Result<Option<usize>> {
    let mut value = None;

    for attr in attrs.iter().filter(|a| a.path().is_ident("record")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(name) {
                let lit: LitInt = meta.value()?.parse()?;
                value = Some(lit.base10_parse::<usize>()?);
                Ok(())
            } else {
                Err(meta.error(format!("expected `{}`", name)))
            }
        })?;
    }

    Ok(value)
}
