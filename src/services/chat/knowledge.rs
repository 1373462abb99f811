//! Static research data behind the chat responder.

use crate::types::Sector;

/// Fundamentals for one listed company.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fundamentals {
    pub symbol: &'static str,
    pub sector: Sector,
    /// Price/earnings ratio
    pub pe: f64,
    /// Return on equity, %
    pub roe: f64,
    /// Debt/equity
    pub debt: f64,
    /// Net margin, %
    pub margin: f64,
    /// Dividend yield, %
    pub dividend: f64,
    /// Growth, % YoY
    pub growth: f64,
}

#[allow(clippy::too_many_arguments)]
const fn f(
    symbol: &'static str,
    sector: Sector,
    pe: f64,
    roe: f64,
    debt: f64,
    margin: f64,
    dividend: f64,
    growth: f64,
) -> Fundamentals {
    Fundamentals {
        symbol,
        sector,
        pe,
        roe,
        debt,
        margin,
        dividend,
        growth,
    }
}

pub static FUNDAMENTALS: [Fundamentals; 26] = [
    f("TCS", Sector::It, 28.0, 46.0, 0.0, 25.0, 2.8, 10.0),
    f("INFY", Sector::It, 27.0, 28.0, 0.0, 22.0, 2.5, 12.0),
    f("WIPRO", Sector::It, 24.0, 16.0, 0.0, 17.0, 3.2, 8.0),
    f("HCLTECH", Sector::It, 25.0, 22.0, 0.0, 20.0, 4.5, 11.0),
    f("TECHM", Sector::It, 23.0, 18.0, 0.2, 14.0, 2.1, 9.0),
    f("HDFC", Sector::Banking, 19.0, 17.0, 0.0, 0.0, 1.3, 18.0),
    f("ICICIBANK", Sector::Banking, 16.0, 16.0, 0.0, 0.0, 2.5, 20.0),
    f("SBIN", Sector::Banking, 11.0, 14.0, 0.0, 0.0, 3.8, 15.0),
    f("KOTAKBANK", Sector::Banking, 18.0, 15.0, 0.0, 0.0, 0.8, 16.0),
    f("AXISBANK", Sector::Banking, 13.0, 13.0, 0.0, 0.0, 1.2, 17.0),
    f("SUNPHARMA", Sector::Pharma, 35.0, 12.0, 0.1, 16.0, 1.2, 11.0),
    f("DRREDDY", Sector::Pharma, 28.0, 14.0, 0.3, 18.0, 1.8, 13.0),
    f("CIPLA", Sector::Pharma, 26.0, 16.0, 0.2, 17.0, 2.2, 12.0),
    f("BIOCON", Sector::Pharma, 32.0, 11.0, 0.4, 14.0, 0.9, 15.0),
    f("MARUTI", Sector::Auto, 26.0, 17.0, 0.0, 10.0, 2.2, 14.0),
    f("TATAMOTORS", Sector::Auto, 18.0, 25.0, 2.1, 7.0, 0.0, 22.0),
    f("MAHINDRA", Sector::Auto, 22.0, 19.0, 0.8, 12.0, 1.5, 18.0),
    f("BAJAJ_AUTO", Sector::Auto, 24.0, 28.0, 0.0, 16.0, 3.5, 13.0),
    f("HINDUNILVR", Sector::Fmcg, 58.0, 82.0, 0.0, 15.0, 2.8, 8.0),
    f("ITC", Sector::Fmcg, 24.0, 27.0, 0.0, 28.0, 5.5, 7.0),
    f("NESTLEIND", Sector::Fmcg, 68.0, 92.0, 0.0, 17.0, 1.9, 12.0),
    f("BRITANNIA", Sector::Fmcg, 52.0, 32.0, 0.1, 14.0, 2.1, 10.0),
    f("TATASTEEL", Sector::Metals, 29.0, 9.0, 1.8, 8.0, 2.1, 8.0),
    f("JSWSTEEL", Sector::Metals, 46.0, 8.0, 1.2, 11.0, 0.3, 14.0),
    f("HINDALCO", Sector::Metals, 10.0, 15.0, 1.5, 7.0, 0.6, 11.0),
    f("RELIANCE", Sector::Diversified, 24.0, 9.0, 0.5, 8.0, 1.8, 12.0),
];

pub fn fundamentals(symbol: &str) -> Option<&'static Fundamentals> {
    FUNDAMENTALS
        .iter()
        .find(|f| f.symbol.eq_ignore_ascii_case(symbol))
}

/// Sector-level view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorOutlook {
    pub outlook: &'static str,
    pub drivers: &'static str,
    pub risks: &'static str,
}

pub fn sector_outlook(sector: Sector) -> SectorOutlook {
    let (outlook, drivers, risks) = match sector {
        Sector::It => (
            "Positive",
            "AI/Digital transformation, Cloud migration",
            "US recession, currency",
        ),
        Sector::Banking => (
            "Strong",
            "Credit growth 12-15%, improving asset quality",
            "Interest rate changes",
        ),
        Sector::Auto => ("Positive", "EV adoption, rural recovery", "Commodity prices"),
        Sector::Pharma => ("Stable", "US generics, domestic growth", "FDA issues"),
        Sector::Fmcg => ("Moderate", "Rural consumption", "Raw material inflation"),
        Sector::Metals => (
            "Cyclical",
            "Infrastructure capex, global demand",
            "China slowdown, commodity prices",
        ),
        Sector::Diversified => (
            "Positive",
            "Multiple business engines",
            "Sector-specific headwinds",
        ),
    };

    SectorOutlook {
        outlook,
        drivers,
        risks,
    }
}
