//! Tests for the paper ledger and its persistence
//!
//! Tests cover:
//! - Weighted average cost on buys
//! - Realized P&L on sells
//! - Oversell rejection
//! - Order log ordering
//! - Save/load through both stores
//! - Storage failures leaving the live ledger untouched
//! - Concurrent buys for one user interleaved with ticks

use dalal::services::{
    KeyValueStore, Ledger, MemoryKvStore, PriceSimulator, SqliteKvStore, StoreError, TradingError,
    TradingService,
};
use dalal::types::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

fn order(symbol: &str, action: OrderAction, quantity: u64, price: f64) -> Order {
    Order::new(
        symbol.to_string(),
        format!("{} Ltd", symbol),
        action,
        OrderType::Limit,
        quantity,
        price,
    )
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

// =============================================================================
// Ledger Tests
// =============================================================================

mod ledger_tests {
    use super::*;

    #[test]
    fn test_buy_buy_sell_scenario() {
        let mut ledger = Ledger::new();

        assert_ok!(ledger.settle(order("TCS", OrderAction::Buy, 10, 100.0)));
        let second = assert_ok!(ledger.settle(order("TCS", OrderAction::Buy, 10, 120.0)));
        let position = second.position.unwrap();
        assert_eq!(position.quantity, 20);
        assert!(close(position.avg_price, 110.0));

        let sell = assert_ok!(ledger.settle(order("TCS", OrderAction::Sell, 15, 130.0)));
        let pnl = sell.realized_pnl.unwrap();
        assert!(close(pnl.amount, 300.0));
        assert!(close(pnl.percent, 20.0 / 110.0 * 100.0));
        assert_eq!(sell.order.realized_pnl, Some(pnl));

        let position = ledger.position("TCS").unwrap();
        assert_eq!(position.quantity, 5);
        assert!(close(position.avg_price, 110.0));

        let before = ledger.clone();
        let err = assert_err!(ledger.settle(order("TCS", OrderAction::Sell, 6, 130.0)));
        match err {
            TradingError::InsufficientHoldings {
                symbol,
                requested,
                held,
            } => {
                assert_eq!(symbol, "TCS");
                assert_eq!(requested, 6);
                assert_eq!(held, 5);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_weighted_average_randomized() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let mut ledger = Ledger::new();
            let mut quantity = 0u64;
            let mut cost = 0.0f64;

            for _ in 0..rng.gen_range(1..20) {
                let qty = rng.gen_range(1..500u64);
                let price = (rng.gen_range(10.0..5000.0f64) * 100.0).round() / 100.0;
                assert_ok!(ledger.settle(order("INFY", OrderAction::Buy, qty, price)));
                quantity += qty;
                cost += qty as f64 * price;
            }

            let position = ledger.position("INFY").unwrap();
            assert_eq!(position.quantity, quantity);
            assert!(
                close(position.avg_price, cost / quantity as f64),
                "avg {} vs expected {}",
                position.avg_price,
                cost / quantity as f64
            );
        }
    }

    #[test]
    fn test_quantities_never_negative() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut ledger = Ledger::new();
        let symbols = ["TCS", "INFY", "ITC"];

        for _ in 0..500 {
            let symbol = symbols[rng.gen_range(0..symbols.len())];
            let action = if rng.gen_bool(0.5) {
                OrderAction::Buy
            } else {
                OrderAction::Sell
            };
            let qty = rng.gen_range(1..50u64);
            let held = ledger.position(symbol).map(|p| p.quantity).unwrap_or(0);
            let logged = ledger.orders().len();

            match ledger.settle(order(symbol, action, qty, 100.0)) {
                Ok(_) => assert_eq!(ledger.orders().len(), logged + 1),
                Err(TradingError::InsufficientHoldings { .. }) => {
                    assert_eq!(action, OrderAction::Sell);
                    assert!(qty > held);
                    assert_eq!(ledger.orders().len(), logged);
                }
                Err(other) => panic!("unexpected error: {:?}", other),
            }

            for position in ledger.positions() {
                assert!(position.quantity > 0);
            }
        }
    }

    #[test]
    fn test_order_log_is_append_only() {
        let mut ledger = Ledger::new();
        let mut ids = Vec::new();

        for price in [100.0, 101.0, 102.0] {
            let settled = assert_ok!(ledger.settle(order("ITC", OrderAction::Buy, 1, price)));
            ids.push(settled.order.id);
        }
        assert_ok!(ledger.settle(order("ITC", OrderAction::Sell, 3, 105.0)));

        let logged: Vec<&str> = ledger.orders().iter().map(|o| o.id.as_str()).collect();
        assert_eq!(&logged[..3], &ids.iter().map(String::as_str).collect::<Vec<_>>()[..]);
        assert!(ledger.positions().is_empty());

        let recent = ledger.recent_orders(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].action, OrderAction::Sell);
        assert_eq!(recent[1].id, ids[2]);
    }
}

// =============================================================================
// Persistence Tests
// =============================================================================

mod persistence_tests {
    use super::*;

    fn round_trip(store: &dyn KeyValueStore) {
        let mut ledger = Ledger::new();
        ledger
            .settle(order("HDFCBANK", OrderAction::Buy, 7, 1650.25))
            .unwrap();
        ledger
            .settle(order("HDFCBANK", OrderAction::Sell, 2, 1700.0))
            .unwrap();

        ledger.save(store, "a@b.com").unwrap();
        let loaded = Ledger::load(store, "a@b.com").unwrap();
        assert_eq!(loaded, ledger);

        let other = Ledger::load(store, "other@b.com").unwrap();
        assert_eq!(other, Ledger::new());
    }

    #[test]
    fn test_round_trip_memory() {
        round_trip(&MemoryKvStore::new());
    }

    #[test]
    fn test_round_trip_sqlite() {
        round_trip(&SqliteKvStore::new_in_memory().unwrap());
    }

    /// Reads work, writes always fail.
    struct FailingStore {
        inner: MemoryKvStore,
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set_many(&self, _entries: &[(String, String)]) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk full".into()))
        }

        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk full".into()))
        }
    }

    #[tokio::test]
    async fn test_storage_failure_leaves_ledger_unchanged() {
        let store: Arc<dyn KeyValueStore> = Arc::new(FailingStore {
            inner: MemoryKvStore::new(),
        });
        let simulator = PriceSimulator::new(default_instruments(), 0.0);
        let trading = TradingService::new(store, simulator, 1000);

        let result = trading
            .place_order("a@b.com", &PlaceOrderRequest::market("TCS", OrderAction::Buy, 5))
            .await;
        assert!(matches!(result, Err(TradingError::Storage(_))));

        let portfolio = trading.portfolio("a@b.com").await.unwrap();
        assert!(portfolio.is_empty());
        assert!(trading.orders("a@b.com", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_service_state_survives_reopen() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());

        let first = TradingService::new(
            Arc::clone(&store),
            PriceSimulator::new(default_instruments(), 0.0),
            1000,
        );
        first
            .place_order("a@b.com", &PlaceOrderRequest::limit("INFY", OrderAction::Buy, 4, 1500.0))
            .await
            .unwrap();

        let second = TradingService::new(store, PriceSimulator::new(default_instruments(), 0.0), 1000);
        let portfolio = second.portfolio("a@b.com").await.unwrap();
        assert_eq!(portfolio.holdings.len(), 1);
        assert_eq!(portfolio.holdings[0].quantity, 4);
        assert!(close(portfolio.holdings[0].avg_price, 1500.0));
    }
}

// =============================================================================
// Concurrency Tests
// =============================================================================

mod concurrency_tests {
    use super::*;

    const BUYERS: u64 = 100;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_buys_for_one_user_all_settle() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let simulator = PriceSimulator::new(default_instruments(), 0.01);
        let trading = TradingService::new(Arc::clone(&store), Arc::clone(&simulator), 1000);

        let mut buys = Vec::new();
        let mut ticks = Vec::new();
        for i in 0..BUYERS {
            let trading = trading.clone();
            buys.push(tokio::spawn(async move {
                trading
                    .place_order("a@b.com", &PlaceOrderRequest::market("TCS", OrderAction::Buy, 1))
                    .await
            }));

            if i % 10 == 0 {
                let simulator = Arc::clone(&simulator);
                ticks.push(tokio::spawn(async move {
                    simulator.tick();
                }));
            }
        }

        for buy in buys {
            assert_ok!(buy.await.unwrap());
        }
        for tick in ticks {
            tick.await.unwrap();
        }

        assert!(simulator.snapshot().tick >= 1);

        let portfolio = trading.portfolio("a@b.com").await.unwrap();
        assert_eq!(portfolio.holdings.len(), 1);
        assert_eq!(portfolio.holdings[0].quantity, BUYERS);
        assert_eq!(
            trading.orders("a@b.com", Some(500)).await.unwrap().len() as u64,
            BUYERS
        );

        // Every settlement reached the store
        let reopened = TradingService::new(store, simulator, 1000);
        let portfolio = reopened.portfolio("a@b.com").await.unwrap();
        assert_eq!(portfolio.holdings[0].quantity, BUYERS);
    }
}
