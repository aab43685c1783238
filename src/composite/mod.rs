//! Pixel compositing.
//!
//! Turns loaded volumes into [`PackedDisplayBuffer`]s: intensity images are
//! packed channel by channel, label maps are colored through a
//! [`ClassScheme`].

pub mod display;
pub mod scheme;

pub use display::{image_to_buffer, label_to_buffer, pack_rgba, unpack_rgba, PackedDisplayBuffer};
pub use scheme::{ClassColorTable, ClassInfo, ClassScheme, BACKGROUND};
