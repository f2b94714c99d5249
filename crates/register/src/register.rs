use chrono::Utc;

use tillpos_cart::{
    AddItem, CartError, CartLine, ClearCart, OpenCart, SaleCart, SaleCartCommand, SaleCartId,
    SetQuantity,
};
use tillpos_catalog::{CatalogItem, ItemId};
use tillpos_core::{Aggregate, AggregateId, AggregateRoot};
use tillpos_events::Event;

/// One active sale session over a single cart aggregate.
///
/// The catalog source supplies the item snapshot once, at [`Register::open`];
/// after every mutation the presentation collaborator reads the views
/// ([`Register::catalog`], [`Register::lines`], [`Register::total`]) and owns
/// all rendering and error display.
pub struct Register {
    cart: SaleCart,
}

impl Register {
    /// Open a session over a catalog snapshot supplied by the external loader.
    pub fn open(items: Vec<CatalogItem>) -> Result<Self, CartError> {
        let cart_id = SaleCartId::new(AggregateId::new());
        let mut cart = SaleCart::empty(cart_id);
        let cmd = SaleCartCommand::OpenCart(OpenCart {
            cart_id,
            items,
            occurred_at: Utc::now(),
        });
        Self::execute(&mut cart, cmd)?;
        Ok(Self { cart })
    }

    /// Reserve one unit of `item_id`.
    pub fn add_item(&mut self, item_id: ItemId) -> Result<(), CartError> {
        let cmd = SaleCartCommand::AddItem(AddItem {
            cart_id: self.cart.id_typed(),
            item_id,
            occurred_at: Utc::now(),
        });
        Self::execute(&mut self.cart, cmd)
    }

    /// Set the reserved quantity for `item_id`; 0 or less releases the line.
    pub fn set_quantity(&mut self, item_id: ItemId, quantity: i64) -> Result<(), CartError> {
        let cmd = SaleCartCommand::SetQuantity(SetQuantity {
            cart_id: self.cart.id_typed(),
            item_id,
            quantity,
            occurred_at: Utc::now(),
        });
        Self::execute(&mut self.cart, cmd)
    }

    /// Return every reserved unit and empty the cart.
    ///
    /// Obtaining operator confirmation happens before this call, outside
    /// this crate. Clearing an already-empty cart is a no-op.
    pub fn clear_cart(&mut self) -> Result<(), CartError> {
        let cmd = SaleCartCommand::ClearCart(ClearCart {
            cart_id: self.cart.id_typed(),
            occurred_at: Utc::now(),
        });
        Self::execute(&mut self.cart, cmd)
    }

    /// Catalog view with stock already net of reservations.
    pub fn catalog(&self) -> &[CatalogItem] {
        self.cart.items()
    }

    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    /// Running total of the cart, in smallest currency unit.
    pub fn total(&self) -> u64 {
        self.cart.total()
    }

    fn execute(cart: &mut SaleCart, cmd: SaleCartCommand) -> Result<(), CartError> {
        match cart.handle(&cmd) {
            Ok(events) => {
                for event in &events {
                    cart.apply(event);
                    tracing::debug!("applied {} (version {})", event.event_type(), cart.version());
                }
                Ok(())
            }
            Err(err) => {
                tracing::debug!("cart command rejected: {err}");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tillpos_core::AggregateId;

    fn test_item(unit_price: u64, stock: i64) -> CatalogItem {
        CatalogItem::new(ItemId::new(AggregateId::new()), "Test item", unit_price, stock).unwrap()
    }

    #[test]
    fn open_exposes_the_snapshot_unreserved() {
        let items = vec![test_item(100, 5), test_item(250, 2)];
        let register = Register::open(items.clone()).unwrap();

        assert_eq!(register.catalog(), items.as_slice());
        assert!(register.lines().is_empty());
        assert_eq!(register.total(), 0);
    }

    #[test]
    fn views_track_mutations() {
        let item = test_item(100, 5);
        let item_id = item.id;
        let mut register = Register::open(vec![item]).unwrap();

        register.add_item(item_id).unwrap();
        register.set_quantity(item_id, 3).unwrap();

        assert_eq!(register.catalog()[0].stock, 2);
        assert_eq!(register.lines()[0].quantity, 3);
        assert_eq!(register.total(), 300);
    }

    #[test]
    fn rejections_leave_the_views_unchanged() {
        let item = test_item(100, 1);
        let item_id = item.id;
        let mut register = Register::open(vec![item]).unwrap();

        register.add_item(item_id).unwrap();
        let err = register.add_item(item_id).unwrap_err();

        assert_eq!(err, CartError::OutOfStock { item_id });
        assert_eq!(register.catalog()[0].stock, 0);
        assert_eq!(register.lines()[0].quantity, 1);
    }

    #[test]
    fn clear_cart_restores_the_snapshot() {
        let item = test_item(100, 5);
        let item_id = item.id;
        let mut register = Register::open(vec![item]).unwrap();

        register.add_item(item_id).unwrap();
        register.add_item(item_id).unwrap();
        register.clear_cart().unwrap();

        assert_eq!(register.catalog()[0].stock, 5);
        assert!(register.lines().is_empty());
        assert_eq!(register.total(), 0);
    }
}
