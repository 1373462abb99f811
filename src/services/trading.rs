//! Trading Service
//!
//! Settles paper orders against the simulated watchlist:
//! - Order placement (market at the current quote, limit at the caller's price)
//! - Order preview (the confirmation dialog's dry run)
//! - Portfolio valuation at current quotes
//! - Order history and ledger reset
//!
//! Each user's ledger sits behind its own mutex in a DashMap, so different
//! users never contend. Settlement runs on a clone of the ledger which is
//! persisted before it replaces the live one.

use crate::services::kv_store::{KeyValueStore, StoreError};
use crate::services::ledger::Ledger;
use crate::services::price_simulator::PriceSimulator;
use crate::types::{
    Holding, Instrument, Order, OrderAction, OrderPreview, OrderType, PlaceOrderRequest,
    PortfolioSummary, RealizedPnl, Settlement,
};
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Default number of orders returned by `orders`.
pub const DEFAULT_ORDER_LIMIT: usize = 50;

/// Upper bound on `orders` limit.
pub const MAX_ORDER_LIMIT: usize = 500;

/// Trading service errors.
#[derive(Debug, Error)]
pub enum TradingError {
    #[error("Insufficient holdings for {symbol}: requested {requested}, held {held}")]
    InsufficientHoldings {
        symbol: String,
        requested: u64,
        held: u64,
    },

    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for TradingError {
    fn from(e: StoreError) -> Self {
        TradingError::Storage(e.to_string())
    }
}

/// A request that passed validation, priced and ready to settle.
struct PricedOrder {
    instrument: Instrument,
    action: OrderAction,
    order_type: OrderType,
    quantity: u64,
    price: f64,
}

/// Paper trading service.
#[derive(Clone)]
pub struct TradingService {
    store: Arc<dyn KeyValueStore>,
    simulator: Arc<PriceSimulator>,
    ledgers: Arc<DashMap<String, Arc<Mutex<Ledger>>>>,
    max_order_quantity: u64,
}

impl TradingService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        simulator: Arc<PriceSimulator>,
        max_order_quantity: u64,
    ) -> Self {
        Self {
            store,
            simulator,
            ledgers: Arc::new(DashMap::new()),
            max_order_quantity,
        }
    }

    // =========================================================================
    // Order Management
    // =========================================================================

    /// Place an order for a user and settle it immediately.
    pub async fn place_order(
        &self,
        email: &str,
        request: &PlaceOrderRequest,
    ) -> Result<Settlement, TradingError> {
        let priced = self.price_request(request)?;
        let ledger = self.ledger(email)?;
        let mut live = ledger.lock().await;

        let mut next = live.clone();
        let order = Order::new(
            priced.instrument.symbol.clone(),
            priced.instrument.name.clone(),
            priced.action,
            priced.order_type,
            priced.quantity,
            priced.price,
        );
        let settlement = next.settle(order)?;

        if let Err(e) = next.save(self.store.as_ref(), email) {
            warn!("Failed to persist ledger for {}: {}", email, e);
            return Err(e.into());
        }
        *live = next;

        info!(
            "Placed order {} for {}: {} {} {} @ {:.2}",
            settlement.order.id,
            email,
            settlement.order.action,
            settlement.order.quantity,
            settlement.order.symbol,
            settlement.order.price
        );

        Ok(settlement)
    }

    /// Dry-run an order: what it would cost and, for sells, what it would
    /// realize. Reports the same errors `place_order` would.
    pub async fn preview(
        &self,
        email: &str,
        request: &PlaceOrderRequest,
    ) -> Result<OrderPreview, TradingError> {
        let priced = self.price_request(request)?;
        let ledger = self.ledger(email)?;
        let ledger = ledger.lock().await;

        let holding = ledger.position(&priced.instrument.symbol).cloned();
        let expected_pnl = match priced.action {
            OrderAction::Buy => None,
            OrderAction::Sell => {
                let held = holding.as_ref().map(|p| p.quantity).unwrap_or(0);
                match &holding {
                    Some(position) if held >= priced.quantity => Some(RealizedPnl::compute(
                        position.avg_price,
                        priced.price,
                        priced.quantity,
                    )),
                    _ => {
                        return Err(TradingError::InsufficientHoldings {
                            symbol: priced.instrument.symbol.clone(),
                            requested: priced.quantity,
                            held,
                        })
                    }
                }
            }
        };

        Ok(OrderPreview {
            symbol: priced.instrument.symbol,
            name: priced.instrument.name,
            action: priced.action,
            order_type: priced.order_type,
            quantity: priced.quantity,
            execution_price: priced.price,
            total_amount: priced.price * priced.quantity as f64,
            holding,
            expected_pnl,
        })
    }

    /// Order log, newest first.
    pub async fn orders(&self, email: &str, limit: Option<usize>) -> Result<Vec<Order>, TradingError> {
        let limit = limit.unwrap_or(DEFAULT_ORDER_LIMIT).min(MAX_ORDER_LIMIT);
        let ledger = self.ledger(email)?;
        let ledger = ledger.lock().await;
        Ok(ledger.recent_orders(limit))
    }

    // =========================================================================
    // Portfolio
    // =========================================================================

    /// Positions valued at the current quotes.
    pub async fn portfolio(&self, email: &str) -> Result<PortfolioSummary, TradingError> {
        let ledger = self.ledger(email)?;
        let ledger = ledger.lock().await;
        let snapshot = self.simulator.snapshot();

        let holdings = ledger
            .positions()
            .iter()
            .map(|position| {
                let price = snapshot
                    .quote(&position.symbol)
                    .map(|q| q.current_price)
                    .unwrap_or(position.avg_price);
                Holding::value(position, price)
            })
            .collect();

        Ok(PortfolioSummary::from_holdings(holdings))
    }

    /// Clear a user's positions and order log.
    pub async fn reset(&self, email: &str) -> Result<(), TradingError> {
        let ledger = self.ledger(email)?;
        let mut live = ledger.lock().await;

        let next = Ledger::new();
        next.save(self.store.as_ref(), email)?;
        *live = next;

        info!("Reset ledger for {}", email);
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// The user's live ledger, loading it from the store on first access.
    fn ledger(&self, email: &str) -> Result<Arc<Mutex<Ledger>>, TradingError> {
        if let Some(ledger) = self.ledgers.get(email) {
            return Ok(Arc::clone(ledger.value()));
        }

        let loaded = Ledger::load(self.store.as_ref(), email)?;
        debug!(
            "Loaded ledger for {} ({} positions, {} orders)",
            email,
            loaded.positions().len(),
            loaded.orders().len()
        );

        let entry = self
            .ledgers
            .entry(email.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(loaded)));
        Ok(Arc::clone(entry.value()))
    }

    /// Validate a request and fix its execution price.
    fn price_request(&self, request: &PlaceOrderRequest) -> Result<PricedOrder, TradingError> {
        if request.quantity <= 0 {
            return Err(TradingError::InvalidQuantity(format!(
                "quantity must be a positive integer, got {}",
                request.quantity
            )));
        }
        let quantity = request.quantity as u64;
        if quantity > self.max_order_quantity {
            return Err(TradingError::InvalidQuantity(format!(
                "quantity {} exceeds the maximum of {}",
                quantity, self.max_order_quantity
            )));
        }

        let instrument = self
            .simulator
            .instrument(&request.symbol)
            .cloned()
            .ok_or_else(|| TradingError::UnknownInstrument(request.symbol.clone()))?;

        let price = match request.order_type {
            OrderType::Market => self
                .simulator
                .quote(&instrument.symbol)
                .map(|q| q.current_price)
                .ok_or_else(|| TradingError::UnknownInstrument(request.symbol.clone()))?,
            OrderType::Limit => match request.limit_price {
                Some(price) if price.is_finite() && price > 0.0 => price,
                Some(price) => {
                    return Err(TradingError::InvalidPrice(format!(
                        "limit price must be positive, got {}",
                        price
                    )))
                }
                None => {
                    return Err(TradingError::InvalidPrice(
                        "limit orders require a limit price".to_string(),
                    ))
                }
            },
        };

        Ok(PricedOrder {
            instrument,
            action: request.action,
            order_type: request.order_type,
            quantity,
            price,
        })
    }
}
