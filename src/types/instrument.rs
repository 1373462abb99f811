//! Instrument Types
//!
//! Static reference data for the simulated NSE watchlist.

use serde::{Deserialize, Serialize};

/// Industry sector of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sector {
    #[serde(rename = "IT")]
    It,
    Banking,
    Pharma,
    Auto,
    #[serde(rename = "FMCG")]
    Fmcg,
    Metals,
    Diversified,
}

impl Sector {
    /// All sectors in display order.
    pub const ALL: [Sector; 7] = [
        Sector::It,
        Sector::Banking,
        Sector::Pharma,
        Sector::Auto,
        Sector::Fmcg,
        Sector::Metals,
        Sector::Diversified,
    ];
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sector::It => write!(f, "IT"),
            Sector::Banking => write!(f, "Banking"),
            Sector::Pharma => write!(f, "Pharma"),
            Sector::Auto => write!(f, "Auto"),
            Sector::Fmcg => write!(f, "FMCG"),
            Sector::Metals => write!(f, "Metals"),
            Sector::Diversified => write!(f, "Diversified"),
        }
    }
}

/// A tradable instrument. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    /// Ticker symbol (e.g., "TCS")
    pub symbol: String,
    /// Display name
    pub name: String,
    /// Reference price the simulator jitters around
    pub base_price: f64,
    /// Industry sector
    pub sector: Sector,
}

impl Instrument {
    pub fn new(symbol: &str, name: &str, base_price: f64, sector: Sector) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            base_price,
            sector,
        }
    }

    /// Whether this entry is usable as reference data.
    pub fn is_valid(&self) -> bool {
        !self.symbol.trim().is_empty() && self.base_price.is_finite() && self.base_price > 0.0
    }
}

/// The default 26-stock universe.
pub fn default_instruments() -> Vec<Instrument> {
    use Sector::*;

    vec![
        Instrument::new("TCS", "Tata Consultancy Services", 3680.0, It),
        Instrument::new("INFY", "Infosys", 1520.0, It),
        Instrument::new("WIPRO", "Wipro", 445.0, It),
        Instrument::new("HCLTECH", "HCL Technologies", 1285.0, It),
        Instrument::new("TECHM", "Tech Mahindra", 1075.0, It),
        Instrument::new("HDFC", "HDFC Bank", 1645.0, Banking),
        Instrument::new("ICICIBANK", "ICICI Bank", 985.0, Banking),
        Instrument::new("SBIN", "State Bank of India", 612.0, Banking),
        Instrument::new("KOTAKBANK", "Kotak Mahindra Bank", 1750.0, Banking),
        Instrument::new("AXISBANK", "Axis Bank", 1085.0, Banking),
        Instrument::new("SUNPHARMA", "Sun Pharmaceutical", 1680.0, Pharma),
        Instrument::new("DRREDDY", "Dr Reddy's Laboratories", 5850.0, Pharma),
        Instrument::new("CIPLA", "Cipla", 1450.0, Pharma),
        Instrument::new("BIOCON", "Biocon", 325.0, Pharma),
        Instrument::new("MARUTI", "Maruti Suzuki", 10850.0, Auto),
        Instrument::new("TATAMOTORS", "Tata Motors", 785.0, Auto),
        Instrument::new("MAHINDRA", "Mahindra & Mahindra", 2850.0, Auto),
        Instrument::new("BAJAJ_AUTO", "Bajaj Auto", 9250.0, Auto),
        Instrument::new("HINDUNILVR", "Hindustan Unilever", 2385.0, Fmcg),
        Instrument::new("ITC", "ITC Limited", 465.0, Fmcg),
        Instrument::new("NESTLEIND", "Nestle India", 2250.0, Fmcg),
        Instrument::new("BRITANNIA", "Britannia Industries", 4850.0, Fmcg),
        Instrument::new("TATASTEEL", "Tata Steel", 168.0, Metals),
        Instrument::new("JSWSTEEL", "JSW Steel", 1160.0, Metals),
        Instrument::new("HINDALCO", "Hindalco Industries", 778.0, Metals),
        Instrument::new("RELIANCE", "Reliance Industries", 2450.0, Diversified),
    ]
}
