use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident};

fn parse_enum(input: TokenStream, macro_name: &str) -> (DeriveInput, Vec<Ident>) {
    let ast: DeriveInput = syn::parse(input).expect("unable to parse input");

    let name = &ast.ident;
    let Data::Enum(data) = &ast.data else {
        panic!("{macro_name} derive macro can only be applied to enums; {name} is not an enum");
    };

    let variants = data
        .variants
        .iter()
        .map(|variant| {
            let variant_name = &variant.ident;
            assert!(
                matches!(variant.fields, Fields::Unit),
                "{macro_name} only supports fieldless variants; {name}::{variant_name} has fields"
            );
            variant_name.clone()
        })
        .collect();

    (ast, variants)
}

pub fn enum_display(input: TokenStream) -> TokenStream {
    let (ast, variants) = parse_enum(input, "EnumDisplay");
    let name = &ast.ident;

    let variant_strs = variants.iter().map(Ident::to_string);

    let expanded = quote! {
        impl #name {
            pub fn to_str(&self) -> &'static str {
                match self {
                    #(Self::#variants => #variant_strs,)*
                }
            }
        }

        impl ::std::fmt::Display for #name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.to_str())
            }
        }
    };

    expanded.into()
}

pub fn enum_from_str(input: TokenStream) -> TokenStream {
    let (ast, variants) = parse_enum(input, "EnumFromStr");
    let name = &ast.ident;

    let lowercase_strs = variants.iter().map(|variant| variant.to_string().to_ascii_lowercase());
    let err_fmt_string = format!("invalid {name} string: '{{}}'");

    let expanded = quote! {
        impl ::std::str::FromStr for #name {
            type Err = ::std::string::String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    #(#lowercase_strs => ::std::result::Result::Ok(Self::#variants),)*
                    _ => ::std::result::Result::Err(::std::format!(#err_fmt_string, s)),
                }
            }
        }
    };

    expanded.into()
}

pub fn enum_all(input: TokenStream) -> TokenStream {
    let (ast, variants) = parse_enum(input, "EnumAll");
    let name = &ast.ident;

    let len = variants.len();
    let expanded = quote! {
        impl #name {
            pub const ALL: [Self; #len] = [#(Self::#variants,)*];
        }
    };

    expanded.into()
}

pub fn custom_value_enum(input: TokenStream) -> TokenStream {
    let ast: DeriveInput = syn::parse(input).expect("unable to parse input");
    let name = &ast.ident;

    let expanded = quote! {
        impl ::clap::ValueEnum for #name {
            fn value_variants<'a>() -> &'a [Self] {
                &Self::ALL
            }

            fn to_possible_value(&self) -> ::std::option::Option<::clap::builder::PossibleValue> {
                ::std::option::Option::Some(::clap::builder::PossibleValue::new(self.to_str()))
            }
        }
    };

    expanded.into()
}
