use serde::{Deserialize, Serialize};

use tillpos_core::{AggregateId, DomainError, DomainResult, Entity};

/// Catalog item identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub AggregateId);

impl ItemId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A sellable catalog item with its remaining stock.
///
/// `stock` is the number of units still available for reservation. While a
/// sale session is active, the cart engine is the only writer of this field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: u64,
    /// Units currently available for reservation. Never negative.
    pub stock: i64,
}

impl CatalogItem {
    /// Build a validated catalog item.
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        unit_price: u64,
        stock: i64,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if stock < 0 {
            return Err(DomainError::validation("stock cannot be negative"));
        }
        Ok(Self {
            id,
            name,
            unit_price,
            stock,
        })
    }
}

impl Entity for CatalogItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_item_id() -> ItemId {
        ItemId::new(AggregateId::new())
    }

    #[test]
    fn new_builds_validated_item() {
        let id = test_item_id();
        let item = CatalogItem::new(id, "Keyboard", 1550, 4).unwrap();
        assert_eq!(item.id, id);
        assert_eq!(item.name, "Keyboard");
        assert_eq!(item.unit_price, 1550);
        assert_eq!(item.stock, 4);
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = CatalogItem::new(test_item_id(), "  ", 100, 1).unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("name")),
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn negative_stock_is_rejected() {
        let err = CatalogItem::new(test_item_id(), "Mouse", 100, -1).unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("stock")),
            _ => panic!("Expected Validation error"),
        }
    }
}
