//! Per-user paper ledger: open positions plus the append-only order log.
//!
//! A `Ledger` is a plain state container. It is loaded from the key-value
//! store on first access and saved after every mutation; callers mutate a
//! clone and swap it in only once the save succeeded.

use crate::services::kv_store::{KeyValueStore, StoreError};
use crate::services::trading::TradingError;
use crate::types::{Order, OrderAction, Position, RealizedPnl, Settlement};

/// Store key for a user's positions.
pub fn portfolio_key(email: &str) -> String {
    format!("portfolio:{}", email)
}

/// Store key for a user's order log.
pub fn orders_key(email: &str) -> String {
    format!("orders:{}", email)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    /// Open positions in first-bought order
    positions: Vec<Position>,
    /// Settled orders, oldest first
    orders: Vec<Order>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a user's ledger; missing keys mean an empty ledger.
    pub fn load(store: &dyn KeyValueStore, email: &str) -> Result<Self, StoreError> {
        let positions = match store.get(&portfolio_key(email))? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };
        let orders = match store.get(&orders_key(email))? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };

        Ok(Self { positions, orders })
    }

    /// Persist positions and orders in one write.
    pub fn save(&self, store: &dyn KeyValueStore, email: &str) -> Result<(), StoreError> {
        let positions = serde_json::to_string(&self.positions)?;
        let orders = serde_json::to_string(&self.orders)?;
        store.set_many(&[(portfolio_key(email), positions), (orders_key(email), orders)])
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.symbol == symbol)
    }

    /// Order log, oldest first.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Up to `limit` orders, newest first.
    pub fn recent_orders(&self, limit: usize) -> Vec<Order> {
        self.orders.iter().rev().take(limit).cloned().collect()
    }

    /// Apply a priced order to the ledger.
    ///
    /// Sells beyond the held quantity fail with `InsufficientHoldings` and
    /// leave the ledger untouched.
    pub fn settle(&mut self, mut order: Order) -> Result<Settlement, TradingError> {
        let realized_pnl = match order.action {
            OrderAction::Buy => {
                self.buy(&order)?;
                None
            }
            OrderAction::Sell => Some(self.sell(&order)?),
        };

        order.realized_pnl = realized_pnl;
        let position = self.position(&order.symbol).cloned();
        self.orders.push(order.clone());

        Ok(Settlement {
            order,
            position,
            realized_pnl,
        })
    }

    fn buy(&mut self, order: &Order) -> Result<(), TradingError> {
        match self.positions.iter_mut().find(|p| p.symbol == order.symbol) {
            Some(position) => position.add(order.quantity, order.price).ok_or_else(|| {
                TradingError::InvalidQuantity(format!(
                    "Position in {} would exceed {} shares",
                    order.symbol,
                    u64::MAX
                ))
            }),
            None => {
                self.positions.push(Position::new(
                    order.symbol.clone(),
                    order.name.clone(),
                    order.quantity,
                    order.price,
                ));
                Ok(())
            }
        }
    }

    fn sell(&mut self, order: &Order) -> Result<RealizedPnl, TradingError> {
        let index = self
            .positions
            .iter()
            .position(|p| p.symbol == order.symbol && p.quantity >= order.quantity)
            .ok_or_else(|| TradingError::InsufficientHoldings {
                symbol: order.symbol.clone(),
                requested: order.quantity,
                held: self.position(&order.symbol).map(|p| p.quantity).unwrap_or(0),
            })?;

        let position = &mut self.positions[index];
        let pnl = RealizedPnl::compute(position.avg_price, order.price, order.quantity);

        position.quantity -= order.quantity;
        if position.quantity == 0 {
            self.positions.remove(index);
        }

        Ok(pnl)
    }
}
