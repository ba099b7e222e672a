use proc_macro2::TokenStream;
use syn::{Attribute, Meta, MetaList};

/// Tokens of the single `#[name(...)]` helper attribute among `attrs`, if present.
pub fn helper_arg<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a TokenStream> {
	let mut found = None;
	for attr in attrs.iter().filter(|attr| attr.path().is_ident(name)) {
		let Meta::List(MetaList { tokens, .. }) = &attr.meta else {
			panic!("#[{}] takes one argument", name);
		};
		if found.replace(tokens).is_some() {
			panic!("#[{}] used more than once", name);
		}
	}
	found
}
