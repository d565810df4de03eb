//! Data models for the restaurant notebook.
//!
//! The JSON shape matches the file the browser client reads and writes, so a
//! document loaded here can be saved back without losing fields.

mod content;
mod cuisine;
mod document;
mod entry;

pub use content::*;
pub use cuisine::*;
pub use document::*;
pub use entry::*;
