mod enums;

use proc_macro::TokenStream;

/// Implement `std::fmt::Display` for a fieldless enum, along with a `to_str(&self) -> &'static str`
/// method. Each variant displays as its identifier.
#[proc_macro_derive(EnumDisplay)]
pub fn enum_display(input: TokenStream) -> TokenStream {
    enums::enum_display(input)
}

/// Implement `std::str::FromStr` for a fieldless enum. Matching is case-insensitive.
#[proc_macro_derive(EnumFromStr)]
pub fn enum_from_str(input: TokenStream) -> TokenStream {
    enums::enum_from_str(input)
}

/// Add an `ALL` associated constant containing every variant in declaration order.
#[proc_macro_derive(EnumAll)]
pub fn enum_all(input: TokenStream) -> TokenStream {
    enums::enum_all(input)
}

/// Implement `clap::ValueEnum` on top of `EnumAll` and `EnumDisplay`.
#[proc_macro_derive(CustomValueEnum)]
pub fn custom_value_enum(input: TokenStream) -> TokenStream {
    enums::custom_value_enum(input)
}
