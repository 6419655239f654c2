//! Schema inference for source databases of unknown shape.
//!
//! Rows are normalized into [`Item`]s, a presentation [`Pattern`] is picked
//! from their content (or a manual hint), and each item is projected through
//! an optional caller [`Mapping`] into a display-ready [`MappedItem`].
//! Everything here is pure and synchronous.

pub mod mapping;
pub mod normalize;
pub mod pattern;
pub mod property;
pub mod resolve;
pub mod types;

pub use mapping::parse_mapping;
pub use normalize::normalize;
pub use pattern::resolve_pattern;
pub use resolve::resolve_items;
pub use types::{Item, MappedItem, Mapping, Pattern};
