//! Price Simulator
//!
//! Produces a synthetic quote for every watchlist instrument on a fixed
//! interval. Each tick draws a uniform offset within `±band` of the
//! instrument's base price; prices never drift away from the base.
//!
//! The current watchlist is one immutable `WatchlistSnapshot` behind an
//! `RwLock`. A tick builds its replacement off to the side and swaps it in
//! under the write lock, so readers see either the old or the new watchlist.

use crate::types::{Instrument, Quote, WatchlistSnapshot};
use rand::Rng;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Capacity of the tick broadcast channel.
const TICK_CHANNEL_CAPACITY: usize = 16;

/// Errors loading instrument reference data.
#[derive(Debug, thiserror::Error)]
pub enum InstrumentLoadError {
    #[error("Failed to read instruments file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid instruments JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid instrument: {0}")]
    Invalid(String),
}

/// Load an instrument universe from a JSON array of
/// `{symbol, name, basePrice, sector}`.
pub fn load_instruments<P: AsRef<Path>>(path: P) -> Result<Vec<Instrument>, InstrumentLoadError> {
    let raw = std::fs::read_to_string(path)?;
    parse_instruments(&raw)
}

/// Parse and validate an instrument universe.
pub fn parse_instruments(raw: &str) -> Result<Vec<Instrument>, InstrumentLoadError> {
    let instruments: Vec<Instrument> = serde_json::from_str(raw)?;
    if instruments.is_empty() {
        return Err(InstrumentLoadError::Invalid("empty universe".to_string()));
    }

    let mut seen = HashSet::new();
    for instrument in &instruments {
        if !instrument.is_valid() {
            return Err(InstrumentLoadError::Invalid(instrument.symbol.clone()));
        }
        if !seen.insert(instrument.symbol.to_uppercase()) {
            return Err(InstrumentLoadError::Invalid(format!(
                "duplicate symbol {}",
                instrument.symbol
            )));
        }
    }

    Ok(instruments)
}

/// Round to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Synthetic price source for the watchlist.
pub struct PriceSimulator {
    instruments: Vec<Instrument>,
    band_pct: f64,
    snapshot: RwLock<Arc<WatchlistSnapshot>>,
    tx: broadcast::Sender<Arc<WatchlistSnapshot>>,
}

impl PriceSimulator {
    /// Create a simulator whose opening snapshot quotes every instrument at
    /// its base price.
    pub fn new(instruments: Vec<Instrument>, band_pct: f64) -> Arc<Self> {
        let (tx, _) = broadcast::channel(TICK_CHANNEL_CAPACITY);
        let snapshot = WatchlistSnapshot::opening(&instruments);

        info!(
            "Price simulator ready with {} instruments (band ±{:.2}%)",
            instruments.len(),
            band_pct * 100.0
        );

        Arc::new(Self {
            instruments,
            band_pct,
            snapshot: RwLock::new(Arc::new(snapshot)),
            tx,
        })
    }

    /// Spawn the background task that ticks every `interval`.
    pub fn start(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let simulator = Arc::clone(self);
        info!("Starting price ticks every {:?}", interval);

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                simulator.tick();
            }
        })
    }

    /// Advance every quote once using the thread-local RNG.
    pub fn tick(&self) -> Arc<WatchlistSnapshot> {
        self.tick_with(&mut rand::thread_rng())
    }

    /// Advance every quote once using the given RNG.
    pub fn tick_with<R: Rng>(&self, rng: &mut R) -> Arc<WatchlistSnapshot> {
        let previous = self.snapshot();

        let quotes = previous
            .quotes
            .iter()
            .map(|quote| {
                let offset = rng.gen_range(-1.0_f64..=1.0) * quote.base_price * self.band_pct;
                quote.advance(round2(quote.base_price + offset))
            })
            .collect();

        let next = Arc::new(WatchlistSnapshot {
            tick: previous.tick + 1,
            timestamp: chrono::Utc::now().timestamp_millis(),
            quotes,
        });

        {
            let mut guard = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
            *guard = Arc::clone(&next);
        }

        // No subscribers is fine.
        let receivers = self.tx.send(Arc::clone(&next)).unwrap_or(0);
        debug!("Tick {} published to {} receivers", next.tick, receivers);

        next
    }

    /// The current watchlist.
    pub fn snapshot(&self) -> Arc<WatchlistSnapshot> {
        let guard = self.snapshot.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Current quote for a symbol (case-insensitive).
    pub fn quote(&self, symbol: &str) -> Option<Quote> {
        self.snapshot().quote(symbol).cloned()
    }

    /// Reference data for a symbol (case-insensitive).
    pub fn instrument(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments
            .iter()
            .find(|i| i.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    /// Receive every completed snapshot.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<WatchlistSnapshot>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{default_instruments, Sector};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_opening_snapshot() {
        let sim = PriceSimulator::new(default_instruments(), 0.01);
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.tick, 0);
        assert_eq!(snapshot.quotes.len(), 26);
        for quote in &snapshot.quotes {
            assert_eq!(quote.current_price, quote.base_price);
            assert_eq!(quote.change, 0.0);
        }
    }

    #[test]
    fn test_tick_stays_in_band_and_rounds() {
        let sim = PriceSimulator::new(default_instruments(), 0.01);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let snapshot = sim.tick_with(&mut rng);
            for quote in &snapshot.quotes {
                let band = quote.base_price * 0.01 + 0.005;
                assert!((quote.current_price - quote.base_price).abs() <= band);
                assert!((quote.current_price * 100.0 - (quote.current_price * 100.0).round()).abs() < 1e-6);
            }
        }
        assert_eq!(sim.snapshot().tick, 200);
    }

    #[test]
    fn test_change_is_against_previous_tick() {
        let sim = PriceSimulator::new(default_instruments(), 0.01);
        let mut rng = StdRng::seed_from_u64(42);

        let first = sim.tick_with(&mut rng);
        let second = sim.tick_with(&mut rng);

        for (a, b) in first.quotes.iter().zip(&second.quotes) {
            assert_eq!(b.previous_price, a.current_price);
            assert!((b.change - (b.current_price - a.current_price)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_same_seed_same_prices() {
        let a = PriceSimulator::new(default_instruments(), 0.01);
        let b = PriceSimulator::new(default_instruments(), 0.01);

        let sa = a.tick_with(&mut StdRng::seed_from_u64(1));
        let sb = b.tick_with(&mut StdRng::seed_from_u64(1));
        assert_eq!(sa.quotes, sb.quotes);
    }

    #[test]
    fn test_lookups() {
        let sim = PriceSimulator::new(default_instruments(), 0.01);
        assert_eq!(sim.quote("infy").map(|q| q.symbol), Some("INFY".to_string()));
        assert_eq!(sim.instrument("Itc").map(|i| i.sector), Some(Sector::Fmcg));
        assert!(sim.quote("NOPE").is_none());
        assert_eq!(sim.instruments().len(), 26);
    }

    #[tokio::test]
    async fn test_tick_is_broadcast() {
        let sim = PriceSimulator::new(default_instruments(), 0.01);
        let mut rx = sim.subscribe();

        sim.tick();
        let received = rx.recv().await.unwrap();
        assert_eq!(received.tick, 1);
    }

    #[test]
    fn test_parse_instruments() {
        let raw = r#"[{"symbol":"ABC","name":"Abc","basePrice":10.0,"sector":"Auto"}]"#;
        assert_eq!(parse_instruments(raw).unwrap().len(), 1);

        assert!(parse_instruments("[]").is_err());
        let dup = r#"[{"symbol":"A","name":"A","basePrice":1.0,"sector":"IT"},
                      {"symbol":"a","name":"A","basePrice":1.0,"sector":"IT"}]"#;
        assert!(matches!(
            parse_instruments(dup),
            Err(InstrumentLoadError::Invalid(_))
        ));
        let bad = r#"[{"symbol":"A","name":"A","basePrice":-1.0,"sector":"IT"}]"#;
        assert!(parse_instruments(bad).is_err());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.005_1), 1.01);
        assert_eq!(round2(99.994), 99.99);
        assert_eq!(round2(-0.126), -0.13);
    }
}
