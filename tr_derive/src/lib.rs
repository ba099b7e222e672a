mod attrs;

use std::borrow::Cow;

use proc_macro2::{TokenStream, Ident, Span};
use syn::{DeriveInput, Data, Fields, DataStruct, FieldsNamed, FieldsUnnamed};
use quote::quote;
use attrs::helper_arg;

fn read_derive_impl(input: &DeriveInput) -> TokenStream {
	let (fields, tuple) = match &input.data {
		Data::Struct(DataStruct { fields: Fields::Named(FieldsNamed { named, .. }), .. }) => (named, false),
		Data::Struct(DataStruct { fields: Fields::Unnamed(FieldsUnnamed { unnamed, .. }), .. }) => (unnamed, true),
		_ => unimplemented!("only tuple struct or struct with named fields supported"),
	};
	let mut body = quote! {};
	let mut initializer = quote! {};
	for (index, field) in fields.iter().enumerate() {
		let mut field_expr = match helper_arg(&field.attrs, "list") {
			Some(len_type) => quote! { tr_reader::read_list::<_, _, #len_type>(reader)? },//read a count, read that many items
			None => quote! { tr_reader::Readable::read(reader)? },
		};
		if let Some(num) = helper_arg(&field.attrs, "skip") {
			field_expr = quote! {{
				tr_reader::skip(reader, #num)?;
				#field_expr
			}};
		}
		let field_ident = match &field.ident {
			Some(field_ident) => Cow::Borrowed(field_ident),
			None => Cow::Owned(Ident::new(&format!("field{}", index), Span::call_site())),
		};
		body = quote! {
			#body
			let #field_ident = #field_expr;
		};
		initializer = quote! { #initializer #field_ident, };
	}
	if let Some(num) = helper_arg(&input.attrs, "skip_after") {
		body = quote! {
			#body
			tr_reader::skip(reader, #num)?;
		};
	}
	initializer = if tuple { quote! { (#initializer) } } else { quote! { {#initializer} } };
	let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
	let type_name = &input.ident;
	quote! {
		impl #impl_generics tr_reader::Readable for #type_name #ty_generics #where_clause {
			fn read<R: std::io::Read>(reader: &mut R) -> std::io::Result<Self> {
				#body
				Ok(#type_name #initializer)
			}
		}
	}
}

/// Reads a fixed little-endian record field by field.
/// 
/// Field attributes: `#[list(u16)]` / `#[list(u32)]` read a count then that many items,
/// `#[skip(N)]` skips N bytes before the field.
/// Struct attribute: `#[skip_after(N)]` skips N trailing bytes.
#[proc_macro_derive(Readable, attributes(list, skip, skip_after))]
pub fn read_derive(tokens: proc_macro::TokenStream) -> proc_macro::TokenStream {
	read_derive_impl(&syn::parse_macro_input!(tokens)).into()
}
