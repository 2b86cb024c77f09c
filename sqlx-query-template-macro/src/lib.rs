use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, Field, parse_macro_input};

/// How a struct field is bound.
#[derive(Clone, Copy, PartialEq, Eq)]
enum FieldMode {
    Bind,
    SkipNone,
    Ignore,
}

/// Derive macro binding a struct's fields as positional template arguments.
///
/// Fields are converted with `Value::from` in declaration order, so the
/// struct lines up with the placeholders of the template it is used with.
///
/// # Attributes
///
/// ## `#[arg(skip_none)]`
/// For `Option<T>` fields: `None` binds `skip()`, dropping the enclosing
/// block, instead of `NULL`.
///
/// ## `#[arg(ignore)]`
/// Leaves the field out of the argument list.
///
/// # Example
/// ```ignore
/// use sqlx_query_template::{Dialect, QueryArgs};
///
/// #[derive(QueryArgs)]
/// struct UserQuery<'a> {
///     name: &'a str,
///     #[arg(skip_none)]
///     min_age: Option<i32>,
///     #[arg(ignore)]
///     label: String,
/// }
///
/// let sql = Dialect::Sqlite.template().build(
///     "SELECT * FROM users WHERE name = ?{ AND age > ?d}",
///     UserQuery { name: "ann", min_age: None, label: String::new() },
/// );
/// ```
///
/// # Generated Implementation
/// Implements `IntoArgs` for the struct.
#[proc_macro_derive(QueryArgs, attributes(arg))]
pub fn query_args(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(expanded) => expanded.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let syn::Data::Struct(data_struct) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "QueryArgs can only be derived for structs",
        ));
    };

    let mut pushes = Vec::new();
    for (i, field) in data_struct.fields.iter().enumerate() {
        let member = match &field.ident {
            Some(ident) => quote! { #ident },
            None => {
                let index = syn::Index::from(i);
                quote! { #index }
            }
        };
        match field_mode(field)? {
            FieldMode::Bind => pushes.push(quote! {
                args.push(::sqlx_query_template::Value::from(self.#member));
            }),
            FieldMode::SkipNone => pushes.push(quote! {
                args.push(match self.#member {
                    ::std::option::Option::Some(v) => ::sqlx_query_template::Value::from(v),
                    ::std::option::Option::None => ::sqlx_query_template::skip(),
                });
            }),
            FieldMode::Ignore => {}
        }
    }
    let count = pushes.len();

    Ok(quote! {
        impl #impl_generics ::sqlx_query_template::IntoArgs for #name #ty_generics #where_clause {
            #[allow(unused_mut)]
            fn into_args(self) -> ::std::vec::Vec<::sqlx_query_template::Value> {
                let mut args = ::std::vec::Vec::with_capacity(#count);
                #(#pushes)*
                args
            }
        }
    })
}

fn field_mode(field: &Field) -> syn::Result<FieldMode> {
    let mut mode = FieldMode::Bind;
    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("arg")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip_none") {
                mode = FieldMode::SkipNone;
                Ok(())
            } else if meta.path.is_ident("ignore") {
                mode = FieldMode::Ignore;
                Ok(())
            } else {
                Err(meta.error("unsupported arg attribute, expected `skip_none` or `ignore`"))
            }
        })?;
    }
    Ok(mode)
}
