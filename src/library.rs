//! Music library: scanning files and assembling them into albums of discs.
//!
//! `scan` walks a directory and reads tags, `Library::from_tracks` groups the
//! result into albums and presses each album onto vinyl sides.

mod album;
mod display;
mod model;
mod scan;

pub use album::{Album, AlbumId, Library};
pub use display::compose_display;
pub use model::Track;
pub use scan::scan;

#[cfg(test)]
mod tests;
