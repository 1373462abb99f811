use super::Instrument;
use serde::{Deserialize, Serialize};

/// Simulated market state for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub base_price: f64,
    pub current_price: f64,
    pub previous_price: f64,
    /// Absolute change against the previous tick
    pub change: f64,
    /// Percent change against the previous tick
    pub change_percent: f64,
}

impl Quote {
    /// Opening quote for an instrument: current = previous = base, no change.
    pub fn opening(instrument: &Instrument) -> Self {
        Self {
            symbol: instrument.symbol.clone(),
            name: instrument.name.clone(),
            base_price: instrument.base_price,
            current_price: instrument.base_price,
            previous_price: instrument.base_price,
            change: 0.0,
            change_percent: 0.0,
        }
    }

    /// Next quote after the price moved to `new_price`.
    pub fn advance(&self, new_price: f64) -> Self {
        let change = new_price - self.current_price;
        let change_percent = if self.current_price != 0.0 {
            change / self.current_price * 100.0
        } else {
            0.0
        };

        Self {
            symbol: self.symbol.clone(),
            name: self.name.clone(),
            base_price: self.base_price,
            current_price: new_price,
            previous_price: self.current_price,
            change,
            change_percent,
        }
    }

    pub fn is_up(&self) -> bool {
        self.change > 0.0
    }

    pub fn is_down(&self) -> bool {
        self.change < 0.0
    }
}

/// A complete watchlist as of one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistSnapshot {
    /// Monotonic tick counter (0 = opening snapshot)
    pub tick: u64,
    /// When this snapshot was produced (ms)
    pub timestamp: i64,
    pub quotes: Vec<Quote>,
}

impl WatchlistSnapshot {
    pub fn opening(instruments: &[Instrument]) -> Self {
        Self {
            tick: 0,
            timestamp: chrono::Utc::now().timestamp_millis(),
            quotes: instruments.iter().map(Quote::opening).collect(),
        }
    }

    /// Look up a quote by symbol (case-insensitive).
    pub fn quote(&self, symbol: &str) -> Option<&Quote> {
        self.quotes
            .iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Quotes restricted to the given symbols; all quotes when `symbols` is empty.
    pub fn filtered<'a>(&'a self, symbols: &[String]) -> Vec<&'a Quote> {
        if symbols.is_empty() {
            return self.quotes.iter().collect();
        }
        self.quotes
            .iter()
            .filter(|q| symbols.iter().any(|s| s.eq_ignore_ascii_case(&q.symbol)))
            .collect()
    }

    pub fn advancers(&self) -> usize {
        self.quotes.iter().filter(|q| q.is_up()).count()
    }

    pub fn decliners(&self) -> usize {
        self.quotes.iter().filter(|q| q.is_down()).count()
    }

    /// Quote with the largest percent gain this tick.
    pub fn top_gainer(&self) -> Option<&Quote> {
        self.quotes
            .iter()
            .max_by(|a, b| a.change_percent.total_cmp(&b.change_percent))
    }

    /// Quote with the largest percent loss this tick.
    pub fn top_loser(&self) -> Option<&Quote> {
        self.quotes
            .iter()
            .min_by(|a, b| a.change_percent.total_cmp(&b.change_percent))
    }
}
