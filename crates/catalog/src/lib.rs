//! Catalog data model.
//!
//! Catalog items are supplied whole by an external loader when a sale session
//! starts; this crate owns their shape, not their lifecycle. Only the cart
//! engine mutates an item's `stock` while a session is active.

pub mod item;

pub use item::{CatalogItem, ItemId};
