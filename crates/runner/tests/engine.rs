//! Trading engine integration tests
//!
//! Drives the fully wired engine: submission through the risk gate,
//! asynchronous exchange dispatch, fill routing into the position
//! book, strategy persistence across restarts, and crash recovery from
//! the fill journal.

use std::sync::Arc;
use std::time::Duration;

use hermes_core::{Exchange, LifecycleState, OrderId, OrderStatus, ParamValue, Side,
    StrategyDefinition, TimeInForce};
use hermes_gateway::{OrderRequest, SimulatedExchange};
use hermes_risk_manager::RiskLimits;
use hermes_runner::{EngineConfig, TradingEngine};
use rust_decimal_macros::dec;

/// Records strategy fill dispatches for assertions
struct CountingHandler {
    fills: std::sync::Mutex<Vec<(u64, rust_decimal::Decimal)>>,
}

impl hermes_order_manager::FillHandler for CountingHandler {
    fn on_fill(
        &self,
        order: &hermes_core::Order,
        quantity: rust_decimal::Decimal,
        _price: rust_decimal::Decimal,
    ) {
        self.fills.lock().unwrap().push((order.id, quantity));
    }
}

fn engine_in(dir: &tempfile::TempDir) -> (TradingEngine, Arc<SimulatedExchange>) {
    engine_with_limits(dir, RiskLimits::default())
}

fn engine_with_limits(
    dir: &tempfile::TempDir,
    limits: RiskLimits,
) -> (TradingEngine, Arc<SimulatedExchange>) {
    let adapter = Arc::new(SimulatedExchange::new());
    let config = EngineConfig::new(dir.path()).with_limits(limits);
    let engine = TradingEngine::new(config, adapter.clone()).unwrap();
    (engine, adapter)
}

/// Poll until the order reaches `status` or the deadline passes
async fn wait_for_status(engine: &TradingEngine, id: OrderId, status: OrderStatus) {
    for _ in 0..200 {
        if engine.order(id).map(|o| o.status) == Some(status) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "order {id} never reached {status:?}, still {:?}",
        engine.order(id).map(|o| o.status)
    );
}

#[tokio::test]
async fn limit_buy_fills_into_a_position() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, adapter) = engine_in(&dir);

    let order = engine
        .submit(OrderRequest::limit(
            "X",
            Exchange::Sim,
            Side::Buy,
            dec!(100),
            dec!(10000),
            TimeInForce::Day,
        ))
        .unwrap();
    assert_eq!(order.status, OrderStatus::Submitted);

    // The spawned dispatch task acknowledges through the adapter
    wait_for_status(&engine, order.id, OrderStatus::Accepted).await;
    assert_eq!(adapter.submitted_order_ids(), vec![order.id]);
    assert!(engine.order(order.id).unwrap().exchange_order_id.is_some());

    // Two partial executions
    engine.on_exchange_fill(order.id, dec!(40), dec!(9990)).unwrap();
    let done = engine.on_exchange_fill(order.id, dec!(60), dec!(10010)).unwrap();

    assert_eq!(done.status, OrderStatus::Filled);
    assert_eq!(done.filled_quantity, dec!(100));
    // (40 * 9990 + 60 * 10010) / 100 = 10002
    assert_eq!(done.avg_fill_price, Some(dec!(10002)));

    let position = engine.position("X", Exchange::Sim).unwrap();
    assert_eq!(position.quantity, dec!(100));
    assert_eq!(position.avg_entry_price, dec!(10002));

    engine.shutdown().unwrap();
}

#[tokio::test]
async fn risk_rejection_names_the_breached_limit() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, adapter) = engine_with_limits(
        &dir,
        RiskLimits {
            max_net_exposure: dec!(1000),
            ..Default::default()
        },
    );

    let order = engine
        .submit(OrderRequest::limit(
            "X",
            Exchange::Sim,
            Side::Buy,
            dec!(100),
            dec!(50),
            TimeInForce::Day,
        ))
        .unwrap();

    assert_eq!(order.status, OrderStatus::Rejected);
    let reason = order.reject_reason.unwrap();
    assert!(reason.contains("max net exposure"), "reason: {reason}");

    // Rejected orders never reach the adapter
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(adapter.submitted_order_ids().is_empty());
}

#[tokio::test]
async fn order_fatal_exchange_error_rejects_the_order() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, adapter) = engine_in(&dir);
    adapter.fail_next(hermes_gateway::ExchangeError::Client {
        status: 422,
        message: "unknown symbol".into(),
    });

    let order = engine
        .submit(OrderRequest::limit(
            "BOGUS",
            Exchange::Sim,
            Side::Buy,
            dec!(1),
            dec!(10),
            TimeInForce::Day,
        ))
        .unwrap();

    wait_for_status(&engine, order.id, OrderStatus::Rejected).await;
    let reason = engine.order(order.id).unwrap().reject_reason.unwrap();
    assert!(reason.contains("unknown symbol"), "reason: {reason}");
}

#[tokio::test]
async fn cancel_propagates_to_the_exchange() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, adapter) = engine_in(&dir);

    let order = engine
        .submit(OrderRequest::limit(
            "X",
            Exchange::Sim,
            Side::Sell,
            dec!(5),
            dec!(100),
            TimeInForce::Gtc,
        ))
        .unwrap();
    wait_for_status(&engine, order.id, OrderStatus::Accepted).await;

    let cancelled = engine.cancel(order.id).unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    // The spawned task forwards the cancel to the adapter
    for _ in 0..200 {
        if !adapter.cancelled_order_ids().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(
        adapter.cancelled_order_ids(),
        vec![cancelled.exchange_order_id.unwrap()]
    );
}

#[tokio::test]
async fn strategies_survive_restart_with_separator_values() {
    let dir = tempfile::tempdir().unwrap();
    let gnarly = "fast|slow;a=b,c\nd";

    {
        let (engine, _) = engine_in(&dir);
        let def = StrategyDefinition::new("mm-1", "Maker", "market-maker", Exchange::Sim)
            .with_symbols(["X", "Y", "X"])
            .with_param("mode", ParamValue::Text(gnarly.into()))
            .with_param("depth", ParamValue::Int(3))
            .with_lifecycle(LifecycleState::Running);
        engine.save_strategy(&def).unwrap();
        engine.delete_strategy("mm-0").unwrap();
        engine.shutdown().unwrap();
    }

    let (engine, _) = engine_in(&dir);
    let def = engine.strategy("mm-1").unwrap();
    assert_eq!(def.param("mode"), Some(&ParamValue::Text(gnarly.into())));
    assert_eq!(def.symbols, vec!["X", "Y", "X"]);
    assert_eq!(def.lifecycle, LifecycleState::Running);
    assert_eq!(engine.strategies().len(), 1);
}

#[tokio::test]
async fn tombstoned_strategy_stays_deleted_across_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let (engine, _) = engine_in(&dir);
        let a = StrategyDefinition::new("a", "A", "noop", Exchange::Sim);
        let b = StrategyDefinition::new("b", "B", "noop", Exchange::Sim);
        engine.save_strategy(&a).unwrap();
        assert!(engine.delete_strategy("a").unwrap());
        engine.save_strategy(&b).unwrap();
        engine.shutdown().unwrap();
    }

    let (engine, _) = engine_in(&dir);
    assert!(engine.strategy("a").is_none());
    let all = engine.strategies();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, "b");
}

#[tokio::test]
async fn positions_recover_from_the_fill_journal() {
    let dir = tempfile::tempdir().unwrap();

    // First life: orders filled, then the process "dies" without any
    // position snapshot being persisted
    {
        let (engine, _) = engine_in(&dir);
        let order = engine
            .submit(OrderRequest::limit(
                "X",
                Exchange::Sim,
                Side::Buy,
                dec!(100),
                dec!(10000),
                TimeInForce::Day,
            ))
            .unwrap();
        engine.on_exchange_fill(order.id, dec!(40), dec!(9990)).unwrap();
        engine.on_exchange_fill(order.id, dec!(60), dec!(10010)).unwrap();
        engine.shutdown().unwrap();
    }

    // Second life: the journal replay rebuilds the position book
    let (engine, _) = engine_in(&dir);
    let position = engine.position("X", Exchange::Sim).unwrap();
    assert_eq!(position.quantity, dec!(100));
    assert_eq!(position.avg_entry_price, dec!(10002));

    // Replaying again applies nothing: recovery is idempotent
    assert_eq!(engine.recover().unwrap(), 0);
    assert_eq!(engine.position("X", Exchange::Sim).unwrap().quantity, dec!(100));
}

#[tokio::test]
async fn recovery_continues_the_fill_sequence() {
    let dir = tempfile::tempdir().unwrap();

    {
        let (engine, _) = engine_in(&dir);
        let order = engine
            .submit(OrderRequest::limit(
                "X",
                Exchange::Sim,
                Side::Buy,
                dec!(2),
                dec!(10),
                TimeInForce::Day,
            ))
            .unwrap();
        engine.on_exchange_fill(order.id, dec!(2), dec!(10)).unwrap();
        engine.shutdown().unwrap();
    }

    // Second life: new fills continue the journal without clashing
    let (engine, _) = engine_in(&dir);
    let order = engine
        .submit(OrderRequest::limit(
            "X",
            Exchange::Sim,
            Side::Sell,
            dec!(1),
            dec!(12),
            TimeInForce::Day,
        ))
        .unwrap();
    engine.on_exchange_fill(order.id, dec!(1), dec!(12)).unwrap();
    engine.shutdown().unwrap();

    // Third life: both lives' fills replay cleanly
    let (engine, _) = engine_in(&dir);
    let position = engine.position("X", Exchange::Sim).unwrap();
    assert_eq!(position.quantity, dec!(1));
    assert_eq!(position.realized_pnl, dec!(2));
}

#[tokio::test]
async fn strategy_fill_dispatch_reaches_the_handler() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, _) = engine_in(&dir);

    let handler = Arc::new(CountingHandler {
        fills: std::sync::Mutex::new(Vec::new()),
    });
    engine.register_fill_handler("strat-9", handler.clone());

    let order = engine
        .submit(
            OrderRequest::limit("X", Exchange::Sim, Side::Buy, dec!(10), dec!(5), TimeInForce::Day)
                .for_strategy("strat-9"),
        )
        .unwrap();
    engine.on_exchange_fill(order.id, dec!(10), dec!(5)).unwrap();

    let fills = handler.fills.lock().unwrap().clone();
    assert_eq!(fills, vec![(order.id, dec!(10))]);
}

#[tokio::test]
async fn daily_order_budget_resets_on_roll_day() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, _) = engine_with_limits(
        &dir,
        RiskLimits {
            max_orders_per_day: 1,
            ..Default::default()
        },
    );

    let request = OrderRequest::limit("X", Exchange::Sim, Side::Buy, dec!(1), dec!(10), TimeInForce::Day);

    let first = engine.submit(request.clone()).unwrap();
    assert_eq!(first.status, OrderStatus::Submitted);

    let second = engine.submit(request.clone()).unwrap();
    assert_eq!(second.status, OrderStatus::Rejected);
    assert!(second.reject_reason.unwrap().contains("max orders per day"));

    engine.roll_day(chrono::NaiveDate::from_ymd_opt(2024, 6, 4).unwrap());
    let third = engine.submit(request).unwrap();
    assert_eq!(third.status, OrderStatus::Submitted);
}
