//! Sale-cart reservation engine.
//!
//! This crate contains the stock-reservation rules for an active sale
//! session, implemented purely as deterministic domain logic (no IO, no
//! HTTP, no storage). A cart holds a snapshot of the catalog and reserves
//! units out of it; every mutation keeps reservations and remaining stock
//! partitioning the opening stock exactly.

pub mod cart;
pub mod error;

pub use cart::{
    AddItem, CartCleared, CartLine, CartOpened, ClearCart, ItemAdded, LineReleased, OpenCart,
    QuantitySet, SaleCart, SaleCartCommand, SaleCartEvent, SaleCartId, SetQuantity,
};
pub use error::CartError;
