//! Trading Types
//!
//! Types for the paper ledger: positions, the order log, and the request and
//! report shapes exchanged with the dashboard.

use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

/// Order action (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderAction::Buy => write!(f, "buy"),
            OrderAction::Sell => write!(f, "sell"),
        }
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Settle at the current simulated quote
    #[default]
    Market,
    /// Settle at the caller's limit price, verbatim
    Limit,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Market => write!(f, "market"),
            OrderType::Limit => write!(f, "limit"),
        }
    }
}

// =============================================================================
// Ledger Types
// =============================================================================

/// A held position. Quantity is always positive while it sits in a ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: String,
    pub name: String,
    pub quantity: u64,
    /// Weighted-average cost per share, full precision
    pub avg_price: f64,
}

impl Position {
    pub fn new(symbol: String, name: String, quantity: u64, avg_price: f64) -> Self {
        Self {
            symbol,
            name,
            quantity,
            avg_price,
        }
    }

    /// Total cost of the held lot.
    pub fn invested(&self) -> f64 {
        self.avg_price * self.quantity as f64
    }

    /// Fold a buy into the position: money-weighted average cost.
    ///
    /// Returns `None` and leaves the position untouched if the quantity
    /// would overflow.
    pub fn add(&mut self, quantity: u64, price: f64) -> Option<()> {
        let total_qty = self.quantity.checked_add(quantity)?;
        let total_cost = self.avg_price * self.quantity as f64 + price * quantity as f64;
        self.avg_price = total_cost / total_qty as f64;
        self.quantity = total_qty;
        Some(())
    }
}

/// Realized profit or loss reported for a sell. Never stored in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealizedPnl {
    pub amount: f64,
    pub percent: f64,
}

impl RealizedPnl {
    /// P&L of selling `quantity` at `price` against an average cost.
    pub fn compute(avg_price: f64, price: f64, quantity: u64) -> Self {
        let amount = (price - avg_price) * quantity as f64;
        let percent = if avg_price > 0.0 {
            (price - avg_price) / avg_price * 100.0
        } else {
            0.0
        };
        Self { amount, percent }
    }
}

/// Immutable record of a settled order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order ID
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub action: OrderAction,
    #[serde(default)]
    pub order_type: OrderType,
    pub quantity: u64,
    /// Execution price
    pub price: f64,
    /// Realized P&L (sells only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realized_pnl: Option<RealizedPnl>,
    /// When the order settled (ms)
    pub timestamp: i64,
}

impl Order {
    /// Create a new order record stamped with the current time.
    pub fn new(
        symbol: String,
        name: String,
        action: OrderAction,
        order_type: OrderType,
        quantity: u64,
        price: f64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            symbol,
            name,
            action,
            order_type,
            quantity,
            price,
            realized_pnl: None,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Notional value of the order.
    pub fn total_amount(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

// =============================================================================
// Request/Response Types for API
// =============================================================================

/// Request to place (or preview) an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub symbol: String,
    pub action: OrderAction,
    /// Signed so that zero and negative values reach validation
    pub quantity: i64,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<f64>,
    /// Price the client displayed; informational only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_price: Option<f64>,
}

impl PlaceOrderRequest {
    pub fn market(symbol: &str, action: OrderAction, quantity: i64) -> Self {
        Self {
            symbol: symbol.to_string(),
            action,
            quantity,
            order_type: OrderType::Market,
            limit_price: None,
            reference_price: None,
        }
    }

    pub fn limit(symbol: &str, action: OrderAction, quantity: i64, limit_price: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            action,
            quantity,
            order_type: OrderType::Limit,
            limit_price: Some(limit_price),
            reference_price: None,
        }
    }
}

/// Outcome of a settled order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub order: Order,
    /// Position after settlement; absent once fully sold
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realized_pnl: Option<RealizedPnl>,
}

/// Dry-run of an order as the confirmation dialog shows it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPreview {
    pub symbol: String,
    pub name: String,
    pub action: OrderAction,
    pub order_type: OrderType,
    pub quantity: u64,
    pub execution_price: f64,
    pub total_amount: f64,
    /// Holding before the order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holding: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_pnl: Option<RealizedPnl>,
}

/// A position valued at the current quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub symbol: String,
    pub name: String,
    pub quantity: u64,
    pub avg_price: f64,
    pub current_price: f64,
    pub invested: f64,
    pub current_value: f64,
    pub pnl: f64,
    pub pnl_percent: f64,
}

impl Holding {
    pub fn value(position: &Position, current_price: f64) -> Self {
        let invested = position.invested();
        let current_value = current_price * position.quantity as f64;
        let pnl = current_value - invested;
        let pnl_percent = if invested > 0.0 {
            pnl / invested * 100.0
        } else {
            0.0
        };

        Self {
            symbol: position.symbol.clone(),
            name: position.name.clone(),
            quantity: position.quantity,
            avg_price: position.avg_price,
            current_price,
            invested,
            current_value,
            pnl,
            pnl_percent,
        }
    }
}

/// Portfolio valued at current quotes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub holdings: Vec<Holding>,
    pub total_invested: f64,
    pub current_value: f64,
    pub total_pnl: f64,
    pub total_pnl_percent: f64,
}

impl PortfolioSummary {
    pub fn from_holdings(holdings: Vec<Holding>) -> Self {
        let total_invested: f64 = holdings.iter().map(|h| h.invested).sum();
        let current_value: f64 = holdings.iter().map(|h| h.current_value).sum();
        let total_pnl = current_value - total_invested;
        let total_pnl_percent = if total_invested > 0.0 {
            total_pnl / total_invested * 100.0
        } else {
            0.0
        };

        Self {
            holdings,
            total_invested,
            current_value,
            total_pnl,
            total_pnl_percent,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}
