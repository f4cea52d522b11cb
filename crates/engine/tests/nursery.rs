use chrono::Utc;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Engine, EngineError, InboundCmd, LedgerKind, MoneyCents, OutboundCmd, OutboundItem,
    PageRequest, Quantity, UpdateOutboundCmd, UpdateOutboundItem,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn qty(units: i64) -> Quantity {
    Quantity::units(units)
}

fn price(value: &str) -> MoneyCents {
    value.parse().unwrap()
}

async fn stock(engine: &Engine, plant_id: i32) -> Quantity {
    engine
        .all_plants()
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.id == plant_id)
        .map(|p| p.quantity)
        .unwrap()
}

async fn receive(engine: &Engine, name: &str, units: i64, unit_price: &str) -> i32 {
    engine
        .inbound(
            InboundCmd::new(name, qty(units), price(unit_price))
                .spec("D8")
                .unit("tree"),
        )
        .await
        .unwrap()
        .plant_id
}

#[tokio::test]
async fn inbound_creates_plant_and_ledger_row() {
    let (engine, _db) = engine_with_db().await;

    let receipt = engine
        .inbound(
            InboundCmd::new("Ginkgo", qty(10), price("20.00"))
                .spec("D8")
                .unit("tree")
                .category("Trees")
                .location("Block A"),
        )
        .await
        .unwrap();
    assert!(receipt.order_no.starts_with("IN"));

    let plants = engine.all_plants().await.unwrap();
    assert_eq!(plants.len(), 1);
    let plant = &plants[0];
    assert_eq!(plant.id, receipt.plant_id);
    assert_eq!(plant.quantity, qty(10));
    assert_eq!(plant.price, price("20.00"));
    assert_eq!(plant.category.as_deref(), Some("Trees"));

    let ledger = engine
        .list_transactions(Some(LedgerKind::In), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(ledger.total, 1);
    let row = &ledger.items[0];
    assert_eq!(row.id, receipt.transaction_id);
    assert_eq!(row.plant_id, Some(plant.id));
    assert_eq!(row.total_price, price("200.00"));
    assert_eq!(row.operator.as_deref(), Some("Admin"));
    assert_eq!(row.location.as_deref(), Some("Block A"));
}

#[tokio::test]
async fn inbound_merges_with_weighted_average_price() {
    let (engine, _db) = engine_with_db().await;

    let first = receive(&engine, "Ginkgo", 10, "10.00").await;
    let second = receive(&engine, "Ginkgo", 30, "20.00").await;
    assert_eq!(first, second);

    let plants = engine.all_plants().await.unwrap();
    assert_eq!(plants.len(), 1);
    assert_eq!(plants[0].quantity, qty(40));
    assert_eq!(plants[0].price, price("17.50"));

    // Same name with another spec is a separate stock line.
    engine
        .inbound(InboundCmd::new("Ginkgo", qty(5), price("30.00")).spec("D10").unit("tree"))
        .await
        .unwrap();
    assert_eq!(engine.all_plants().await.unwrap().len(), 2);
}

#[tokio::test]
async fn weighted_average_matches_total_value_over_quantity() {
    let (engine, _db) = engine_with_db().await;

    let deliveries = [(3, "12.10"), (7, "9.99"), (11, "15.00"), (2, "0.35")];
    let mut total_value = 0i64;
    let mut total_qty = 0i64;
    let mut plant_id = 0;
    for (units, unit_price) in deliveries {
        plant_id = receive(&engine, "Maple", units, unit_price).await;
        total_value += units * price(unit_price).cents();
        total_qty += units;
    }

    let plant = engine
        .all_plants()
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.id == plant_id)
        .unwrap();
    assert_eq!(plant.quantity, qty(total_qty));
    let expected = (total_value as f64 / total_qty as f64).round() as i64;
    assert!((plant.price.cents() - expected).abs() <= 1);
}

#[tokio::test]
async fn inbound_key_is_unicode_normalized() {
    let (engine, _db) = engine_with_db().await;

    let composed = receive(&engine, "Caf\u{e9} rose", 2, "5.00").await;
    let decomposed = receive(&engine, "Cafe\u{301} rose ", 3, "5.00").await;
    assert_eq!(composed, decomposed);
    assert_eq!(stock(&engine, composed).await, qty(5));
}

#[tokio::test]
async fn inbound_rejects_bad_input() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .inbound(InboundCmd::new("  ", qty(1), price("1.00")))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = engine
        .inbound(InboundCmd::new("Ginkgo", Quantity::ZERO, price("1.00")))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .inbound(InboundCmd::new("Ginkgo", qty(1), price("-1.00")))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    assert!(engine.all_plants().await.unwrap().is_empty());
}

#[tokio::test]
async fn outbound_decrements_stock_and_records_snapshots() {
    let (engine, _db) = engine_with_db().await;
    let plant_id = receive(&engine, "Ginkgo", 20, "10.00").await;

    let receipt = engine
        .outbound(OutboundCmd {
            items: vec![
                OutboundItem::inventory(plant_id, qty(5), price("25.00")),
                OutboundItem::non_inventory("Soil bags", qty(3), price("4.00")),
            ],
            destination: Some("North park".to_string()),
            operator: Some("Lin".to_string()),
            remark: Some("spring planting".to_string()),
        })
        .await
        .unwrap();

    assert!(receipt.order_no.starts_with("OUT"));
    assert_eq!(receipt.transaction_ids.len(), 2);
    assert_eq!(receipt.total_price, price("137.00"));
    assert_eq!(stock(&engine, plant_id).await, qty(15));

    let orders = engine.list_outbound_orders().await.unwrap();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order.order_no, receipt.order_no);
    assert_eq!(order.item_count, 2);
    assert_eq!(order.total_price, price("137.00"));
    assert_eq!(order.destination.as_deref(), Some("North park"));

    let stock_row = &order.items[0];
    assert_eq!(stock_row.plant_name, "Ginkgo");
    assert_eq!(stock_row.spec.as_deref(), Some("D8"));
    assert_eq!(stock_row.remark.as_deref(), Some("spring planting"));

    let passthrough = &order.items[1];
    assert_eq!(passthrough.plant_id, None);
    assert_eq!(passthrough.spec.as_deref(), Some("-"));
    assert_eq!(passthrough.unit.as_deref(), Some("pcs"));
    assert_eq!(passthrough.location.as_deref(), Some("non-inventory"));
    assert_eq!(
        passthrough.remark.as_deref(),
        Some("spring planting [non-inventory]")
    );
}

#[tokio::test]
async fn outbound_validates_same_plant_cumulatively() {
    let (engine, _db) = engine_with_db().await;
    let plant_id = receive(&engine, "Ginkgo", 10, "10.00").await;

    let err = engine
        .outbound(OutboundCmd {
            items: vec![
                OutboundItem::inventory(plant_id, qty(6), price("1.00")),
                OutboundItem::inventory(plant_id, qty(6), price("1.00")),
            ],
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientStock(_)));

    // Nothing of the rejected order was committed.
    assert_eq!(stock(&engine, plant_id).await, qty(10));
    let outs = engine
        .list_transactions(Some(LedgerKind::Out), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(outs.total, 0);
}

#[tokio::test]
async fn stock_never_goes_negative() {
    let (engine, _db) = engine_with_db().await;
    let plant_id = receive(&engine, "Ginkgo", 10, "10.00").await;

    for requested in [4, 4, 4, 2, 1] {
        let result = engine
            .outbound(OutboundCmd {
                items: vec![OutboundItem::inventory(plant_id, qty(requested), price("1.00"))],
                ..Default::default()
            })
            .await;
        let left = stock(&engine, plant_id).await;
        assert!(left >= Quantity::ZERO);
        if result.is_err() {
            assert!(left < qty(requested));
        }
    }
    assert_eq!(stock(&engine, plant_id).await, Quantity::ZERO);
}

#[tokio::test]
async fn outbound_skips_empty_lines_and_rejects_empty_orders() {
    let (engine, _db) = engine_with_db().await;
    let plant_id = receive(&engine, "Ginkgo", 10, "10.00").await;

    let err = engine
        .outbound(OutboundCmd {
            items: vec![OutboundItem::inventory(plant_id, Quantity::ZERO, price("1.00"))],
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let receipt = engine
        .outbound(OutboundCmd {
            items: vec![
                OutboundItem::inventory(plant_id, Quantity::ZERO, price("1.00")),
                OutboundItem::inventory(plant_id, qty(2), price("1.00")),
            ],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(receipt.transaction_ids.len(), 1);

    let err = engine
        .outbound(OutboundCmd {
            items: vec![OutboundItem::inventory(999, qty(1), price("1.00"))],
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn deleting_outbound_order_restores_consumed_quantities() {
    let (engine, _db) = engine_with_db().await;
    let ginkgo = receive(&engine, "Ginkgo", 10, "10.00").await;
    let maple = receive(&engine, "Maple", 8, "12.00").await;

    let receipt = engine
        .outbound(OutboundCmd {
            items: vec![
                OutboundItem::inventory(ginkgo, qty(4), price("20.00")),
                OutboundItem::inventory(maple, qty(8), price("20.00")),
                OutboundItem::inventory(ginkgo, Quantity::new(150), price("20.00")),
                OutboundItem::non_inventory("Stakes", qty(10), price("1.00")),
            ],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(stock(&engine, ginkgo).await, Quantity::new(450));
    assert_eq!(stock(&engine, maple).await, Quantity::ZERO);

    engine.delete_outbound_order(&receipt.order_no).await.unwrap();

    assert_eq!(stock(&engine, ginkgo).await, qty(10));
    assert_eq!(stock(&engine, maple).await, qty(8));
    assert!(engine.list_outbound_orders().await.unwrap().is_empty());

    let err = engine
        .delete_outbound_order(&receipt.order_no)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn back_to_back_outbound_orders_stay_separate() {
    let (engine, _db) = engine_with_db().await;
    let ginkgo = receive(&engine, "Ginkgo", 10, "10.00").await;

    let mut order_nos = Vec::new();
    for _ in 0..5 {
        let receipt = engine
            .outbound(OutboundCmd {
                items: vec![OutboundItem::inventory(ginkgo, qty(1), price("20.00"))],
                ..Default::default()
            })
            .await
            .unwrap();
        order_nos.push(receipt.order_no);
    }
    let mut distinct = order_nos.clone();
    distinct.sort();
    distinct.dedup();
    assert_eq!(distinct.len(), 5);
    assert_eq!(stock(&engine, ginkgo).await, qty(5));

    engine.delete_outbound_order(&order_nos[0]).await.unwrap();
    assert_eq!(stock(&engine, ginkgo).await, qty(6));
    assert_eq!(engine.list_outbound_orders().await.unwrap().len(), 4);
}

#[tokio::test]
async fn updating_outbound_order_moves_stock_difference() {
    let (engine, _db) = engine_with_db().await;
    let plant_id = receive(&engine, "Ginkgo", 10, "10.00").await;

    let receipt = engine
        .outbound(OutboundCmd {
            items: vec![OutboundItem::inventory(plant_id, qty(6), price("15.00"))],
            operator: Some("Lin".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let row_id = receipt.transaction_ids[0];
    assert_eq!(stock(&engine, plant_id).await, qty(4));

    // Asking for more than is left fails and changes nothing.
    let err = engine
        .update_outbound_order(
            &receipt.order_no,
            UpdateOutboundCmd {
                items: vec![UpdateOutboundItem {
                    id: row_id,
                    quantity: Some(qty(11)),
                    price: None,
                }],
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientStock(_)));
    assert_eq!(stock(&engine, plant_id).await, qty(4));

    let order = engine
        .update_outbound_order(
            &receipt.order_no,
            UpdateOutboundCmd {
                operator: Some("Wu".to_string()),
                destination: Some("South yard".to_string()),
                remark: None,
                items: vec![UpdateOutboundItem {
                    id: row_id,
                    quantity: Some(qty(2)),
                    price: Some(price("16.00")),
                }],
            },
        )
        .await
        .unwrap();
    assert_eq!(stock(&engine, plant_id).await, qty(8));
    assert_eq!(order.total_price, price("32.00"));
    assert_eq!(order.operator.as_deref(), Some("Wu"));
    assert_eq!(order.destination.as_deref(), Some("South yard"));
    assert_eq!(order.items[0].quantity, qty(2));

    let order = engine
        .update_outbound_order(
            &receipt.order_no,
            UpdateOutboundCmd {
                items: vec![UpdateOutboundItem {
                    id: row_id,
                    quantity: Some(qty(10)),
                    price: None,
                }],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(stock(&engine, plant_id).await, Quantity::ZERO);
    assert_eq!(order.total_price, price("160.00"));

    let err = engine
        .update_outbound_order(
            &receipt.order_no,
            UpdateOutboundCmd {
                items: vec![UpdateOutboundItem {
                    id: row_id,
                    quantity: Some(Quantity::ZERO),
                    price: None,
                }],
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn inventory_lists_only_plants_in_stock() {
    let (engine, _db) = engine_with_db().await;
    let ginkgo = receive(&engine, "Ginkgo", 5, "10.00").await;
    receive(&engine, "Maple", 5, "10.00").await;
    receive(&engine, "Magnolia", 5, "10.00").await;

    engine
        .outbound(OutboundCmd {
            items: vec![OutboundItem::inventory(ginkgo, qty(5), price("10.00"))],
            ..Default::default()
        })
        .await
        .unwrap();

    let page = engine
        .list_inventory(None, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);

    let page = engine
        .list_inventory(Some("Mag"), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "Magnolia");
}

#[tokio::test]
async fn stats_summarize_stock_and_activity() {
    let (engine, _db) = engine_with_db().await;
    engine
        .inbound(InboundCmd::new("Ginkgo", qty(120), price("10.00")).category("Trees"))
        .await
        .unwrap();
    engine
        .inbound(InboundCmd::new("Maple", qty(30), price("10.00")).category("Trees"))
        .await
        .unwrap();
    let rose = engine
        .inbound(InboundCmd::new("Rose", qty(60), price("2.00")))
        .await
        .unwrap()
        .plant_id;
    engine
        .outbound(OutboundCmd {
            items: vec![OutboundItem::inventory(rose, qty(20), price("3.00"))],
            ..Default::default()
        })
        .await
        .unwrap();

    let stats = engine.nursery_stats(Utc::now()).await.unwrap();
    assert_eq!(stats.varieties_in_stock, 3);
    assert_eq!(stats.outbound_this_month, 1);
    assert_eq!(stats.categories_in_stock, 1);
    assert_eq!(stats.low_stock, 2);
    assert_eq!(stats.top_plants[0].name, "Ginkgo");
    assert_eq!(stats.recent_transactions.len(), 4);
    assert_eq!(stats.recent_transactions[0].kind, LedgerKind::Out);

    let trees = stats
        .category_distribution
        .iter()
        .find(|c| c.category == "Trees")
        .unwrap();
    assert_eq!(trees.count, 2);
    assert!(
        stats
            .category_distribution
            .iter()
            .any(|c| c.category == "uncategorized" && c.count == 1)
    );
}
