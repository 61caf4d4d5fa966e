pub mod boxedarray;
pub mod color;
pub mod macros;
pub mod num;
