//! Session state for the record shelf.
//!
//! `App` (in `app::model`) owns the pressed library and tracks which album
//! and side the cursor is on, which side is on the platter, and the playback
//! toggles the runtime and UI read.

mod model;

pub use model::*;
