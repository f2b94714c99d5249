use thiserror::Error;

use tillpos_catalog::ItemId;
use tillpos_core::DomainError;

/// Cart-level rejection.
///
/// The first three variants are recoverable business rejections: the caller
/// may retry with adjusted input or surface the condition to the operator,
/// and the aggregate is guaranteed unchanged. `Domain` wraps precondition
/// violations (unknown catalog items, lifecycle misuse, malformed
/// snapshots) which signal a caller or collaborator bug such as a
/// catalog/cart desynchronization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Attempted reservation of an item with zero remaining stock.
    #[error("item {item_id} is out of stock")]
    OutOfStock { item_id: ItemId },

    /// Attempted quantity increase exceeding remaining stock.
    ///
    /// `available` is the largest reachable quantity for the line
    /// (current reservation plus remaining stock).
    #[error("insufficient stock for item {item_id}: requested {requested}, at most {available} available")]
    InsufficientStock {
        item_id: ItemId,
        requested: i64,
        available: i64,
    },

    /// Quantity update on an item with no cart line.
    #[error("no cart line for item {item_id}")]
    LineNotFound { item_id: ItemId },

    /// Deterministic domain failure (validation, invariant, conflict).
    #[error(transparent)]
    Domain(#[from] DomainError),
}
