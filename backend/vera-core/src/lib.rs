//! Debug-side decoder and encoder for the VERA video chip's memory and registers.
//!
//! Everything here reads chip state through [`VeraInterface`] and never holds on to it between
//! calls; each decode or render works from a fresh copy of the bytes it needs.

pub mod api;
pub mod bitplane;
pub mod memory;
pub mod palette;
pub mod registers;
pub mod render;
pub mod vera;

pub use api::{RegisterBlock, VeraDebugView, VeraInterface};
pub use registers::Layer;
pub use vera::{Vera, VeraLoadError};
pub use vera_config::{BitsPerPixel, VeraDebugConfig};
