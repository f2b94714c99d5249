use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tillpos_catalog::{CatalogItem, ItemId};
use tillpos_core::{Aggregate, AggregateId, AggregateRoot, DomainError};
use tillpos_events::Event;

use crate::error::CartError;

/// Sale cart identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaleCartId(pub AggregateId);

impl SaleCartId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for SaleCartId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Cart line: one reservation of an item, strictly positive quantity.
///
/// A line that would reach quantity 0 is removed instead of being retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: ItemId,
    pub quantity: i64,
    /// Price in smallest currency unit (e.g., cents), captured when the
    /// line was created.
    pub unit_price: u64,
}

impl CartLine {
    /// Line subtotal, derived on demand (never cached).
    pub fn subtotal(&self) -> u64 {
        self.quantity as u64 * self.unit_price
    }
}

/// Aggregate root: SaleCart.
///
/// Owns a catalog snapshot and the cart lines reserving units out of it.
/// Invariant, after every applied event: for every item,
/// `opening_stock == item.stock + reserved_quantity(item)`. Stock is never
/// negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleCart {
    id: SaleCartId,
    items: Vec<CatalogItem>,
    lines: Vec<CartLine>,
    version: u64,
    opened: bool,
}

impl SaleCart {
    /// Create an empty, not-yet-opened aggregate instance.
    pub fn empty(id: SaleCartId) -> Self {
        Self {
            id,
            items: Vec::new(),
            lines: Vec::new(),
            version: 0,
            opened: false,
        }
    }

    pub fn id_typed(&self) -> SaleCartId {
        self.id
    }

    /// Catalog snapshot with stock net of reservations.
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn item(&self, item_id: &ItemId) -> Option<&CatalogItem> {
        self.items.iter().find(|i| i.id == *item_id)
    }

    pub fn line(&self, item_id: &ItemId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.item_id == *item_id)
    }

    /// Units currently held by the cart line for `item_id` (0 without one).
    pub fn reserved_quantity(&self, item_id: &ItemId) -> i64 {
        self.line(item_id).map_or(0, |l| l.quantity)
    }

    /// Sum of line subtotals, in smallest currency unit.
    pub fn total(&self) -> u64 {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }
}

impl AggregateRoot for SaleCart {
    type Id = SaleCartId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: OpenCart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenCart {
    pub cart_id: SaleCartId,
    pub items: Vec<CatalogItem>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub cart_id: SaleCartId,
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetQuantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetQuantity {
    pub cart_id: SaleCartId,
    pub item_id: ItemId,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ClearCart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearCart {
    pub cart_id: SaleCartId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleCartCommand {
    OpenCart(OpenCart),
    AddItem(AddItem),
    SetQuantity(SetQuantity),
    ClearCart(ClearCart),
}

/// Event: CartOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartOpened {
    pub cart_id: SaleCartId,
    pub items: Vec<CatalogItem>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub cart_id: SaleCartId,
    pub item_id: ItemId,
    pub unit_price: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuantitySet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantitySet {
    pub cart_id: SaleCartId,
    pub item_id: ItemId,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineReleased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineReleased {
    pub cart_id: SaleCartId,
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CartCleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCleared {
    pub cart_id: SaleCartId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleCartEvent {
    CartOpened(CartOpened),
    ItemAdded(ItemAdded),
    QuantitySet(QuantitySet),
    LineReleased(LineReleased),
    CartCleared(CartCleared),
}

impl Event for SaleCartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SaleCartEvent::CartOpened(_) => "cart.opened",
            SaleCartEvent::ItemAdded(_) => "cart.item_added",
            SaleCartEvent::QuantitySet(_) => "cart.quantity_set",
            SaleCartEvent::LineReleased(_) => "cart.line_released",
            SaleCartEvent::CartCleared(_) => "cart.cleared",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SaleCartEvent::CartOpened(e) => e.occurred_at,
            SaleCartEvent::ItemAdded(e) => e.occurred_at,
            SaleCartEvent::QuantitySet(e) => e.occurred_at,
            SaleCartEvent::LineReleased(e) => e.occurred_at,
            SaleCartEvent::CartCleared(e) => e.occurred_at,
        }
    }
}

impl Aggregate for SaleCart {
    type Command = SaleCartCommand;
    type Event = SaleCartEvent;
    type Error = CartError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            SaleCartEvent::CartOpened(e) => {
                self.id = e.cart_id;
                self.items = e.items.clone();
                self.lines.clear();
                self.opened = true;
            }
            SaleCartEvent::ItemAdded(e) => {
                if let Some(item) = self.items.iter_mut().find(|i| i.id == e.item_id) {
                    item.stock -= 1;
                }
                match self.lines.iter_mut().find(|l| l.item_id == e.item_id) {
                    Some(line) => line.quantity += 1,
                    None => self.lines.push(CartLine {
                        item_id: e.item_id,
                        quantity: 1,
                        unit_price: e.unit_price,
                    }),
                }
            }
            SaleCartEvent::QuantitySet(e) => {
                if let Some(line) = self.lines.iter_mut().find(|l| l.item_id == e.item_id) {
                    let delta = e.quantity - line.quantity;
                    line.quantity = e.quantity;
                    if let Some(item) = self.items.iter_mut().find(|i| i.id == e.item_id) {
                        item.stock -= delta;
                    }
                }
            }
            SaleCartEvent::LineReleased(e) => {
                if let Some(pos) = self.lines.iter().position(|l| l.item_id == e.item_id) {
                    let line = self.lines.remove(pos);
                    if let Some(item) = self.items.iter_mut().find(|i| i.id == e.item_id) {
                        item.stock += line.quantity;
                    }
                }
            }
            SaleCartEvent::CartCleared(_) => {
                for line in core::mem::take(&mut self.lines) {
                    if let Some(item) = self.items.iter_mut().find(|i| i.id == line.item_id) {
                        item.stock += line.quantity;
                    }
                }
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            SaleCartCommand::OpenCart(cmd) => self.handle_open(cmd),
            SaleCartCommand::AddItem(cmd) => self.handle_add_item(cmd),
            SaleCartCommand::SetQuantity(cmd) => self.handle_set_quantity(cmd),
            SaleCartCommand::ClearCart(cmd) => self.handle_clear(cmd),
        }
    }
}

impl SaleCart {
    fn ensure_open(&self) -> Result<(), CartError> {
        if !self.opened {
            return Err(DomainError::not_found().into());
        }
        Ok(())
    }

    fn ensure_cart_id(&self, cart_id: SaleCartId) -> Result<(), CartError> {
        if self.id != cart_id {
            return Err(DomainError::invariant("cart_id mismatch").into());
        }
        Ok(())
    }

    fn catalog_item(&self, item_id: ItemId) -> Result<&CatalogItem, CartError> {
        self.item(&item_id).ok_or_else(|| {
            DomainError::invariant(format!("item {} is not in the catalog snapshot", item_id))
                .into()
        })
    }

    fn handle_open(&self, cmd: &OpenCart) -> Result<Vec<SaleCartEvent>, CartError> {
        if self.opened {
            return Err(DomainError::conflict("cart already open").into());
        }

        let mut seen = HashSet::new();
        for item in &cmd.items {
            if item.stock < 0 {
                return Err(DomainError::validation(format!(
                    "negative stock for item {}",
                    item.id
                ))
                .into());
            }
            if !seen.insert(item.id) {
                return Err(DomainError::validation(format!(
                    "duplicate item {} in catalog snapshot",
                    item.id
                ))
                .into());
            }
        }

        Ok(vec![SaleCartEvent::CartOpened(CartOpened {
            cart_id: cmd.cart_id,
            items: cmd.items.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_item(&self, cmd: &AddItem) -> Result<Vec<SaleCartEvent>, CartError> {
        self.ensure_open()?;
        self.ensure_cart_id(cmd.cart_id)?;

        let item = self.catalog_item(cmd.item_id)?;

        if item.stock <= 0 {
            return Err(CartError::OutOfStock {
                item_id: cmd.item_id,
            });
        }

        Ok(vec![SaleCartEvent::ItemAdded(ItemAdded {
            cart_id: cmd.cart_id,
            item_id: cmd.item_id,
            unit_price: item.unit_price,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_quantity(&self, cmd: &SetQuantity) -> Result<Vec<SaleCartEvent>, CartError> {
        self.ensure_open()?;
        self.ensure_cart_id(cmd.cart_id)?;

        let line = self.line(&cmd.item_id).ok_or(CartError::LineNotFound {
            item_id: cmd.item_id,
        })?;

        // A line never exists at quantity zero; releasing returns every
        // reserved unit and removes the line.
        if cmd.quantity <= 0 {
            return Ok(vec![SaleCartEvent::LineReleased(LineReleased {
                cart_id: cmd.cart_id,
                item_id: cmd.item_id,
                occurred_at: cmd.occurred_at,
            })]);
        }

        let delta = cmd.quantity - line.quantity;
        if delta > 0 {
            let item = self.catalog_item(cmd.item_id)?;
            if item.stock < delta {
                return Err(CartError::InsufficientStock {
                    item_id: cmd.item_id,
                    requested: cmd.quantity,
                    available: line.quantity + item.stock,
                });
            }
        }

        Ok(vec![SaleCartEvent::QuantitySet(QuantitySet {
            cart_id: cmd.cart_id,
            item_id: cmd.item_id,
            quantity: cmd.quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_clear(&self, cmd: &ClearCart) -> Result<Vec<SaleCartEvent>, CartError> {
        self.ensure_open()?;
        self.ensure_cart_id(cmd.cart_id)?;

        // Clearing an empty cart is a total no-op.
        if self.lines.is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![SaleCartEvent::CartCleared(CartCleared {
            cart_id: cmd.cart_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
