use chrono::{NaiveDate, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Engine, EngineError, MoneyCents, OrderFilter, OrderNew, OrderUpdate, PageRequest, PayFilter,
    PayNew, PayUpdate, PayerFilter, PayerNew, PayerType, PayerUpdate, SupplierFilter, SupplierNew,
    SupplierUpdate,
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

fn money(value: &str) -> MoneyCents {
    value.parse().unwrap()
}

fn supplier_cmd(name: &str) -> SupplierNew {
    SupplierNew {
        type_id: 1,
        name: name.to_string(),
        contact_person: "Zhang Wei".to_string(),
        phone: "13800000000".to_string(),
        email: None,
        bank_name: "Agricultural Bank".to_string(),
        account_number: "6228480012345678901".to_string(),
        address: Some("12 Garden Road".to_string()),
        remark: None,
    }
}

fn order_cmd(number: &str, supplier_id: Option<i32>, amount: &str) -> OrderNew {
    OrderNew {
        order_number: number.to_string(),
        material_name: "Granite kerb".to_string(),
        supplier_id,
        order_amount: Some(money(amount)),
        ..Default::default()
    }
}

fn pay_cmd(number: &str, order_id: Option<i32>, amount: &str) -> PayNew {
    PayNew {
        pay_number: number.to_string(),
        order_id,
        current_payment_amount: Some(money(amount)),
        ..Default::default()
    }
}

#[tokio::test]
async fn supplier_crud_and_filters() {
    let (engine, _db) = engine_with_db().await;

    let green = engine.new_supplier(supplier_cmd("Green Stone Co")).await.unwrap();
    engine.new_supplier(supplier_cmd("Blue River Ltd")).await.unwrap();
    assert_eq!(green.account_number, "6228480012345678901");

    let page = engine
        .list_suppliers(
            &SupplierFilter {
                name: Some("Stone".to_string()),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, green.id);

    let all = engine
        .list_suppliers(&SupplierFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.total, 2);
    assert_eq!(all.items[0].name, "Blue River Ltd");

    let updated = engine
        .update_supplier(
            green.id,
            SupplierUpdate {
                phone: Some("021-5555".to_string()),
                address: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.phone, "021-5555");
    assert_eq!(updated.address, None);
    assert_eq!(updated.name, "Green Stone Co");

    let err = engine
        .update_supplier(
            green.id,
            SupplierUpdate {
                name: Some("  ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    engine.delete_supplier(green.id).await.unwrap();
    let err = engine.supplier(green.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn supplier_requires_mandatory_fields() {
    let (engine, _db) = engine_with_db().await;

    let mut cmd = supplier_cmd("Green Stone Co");
    cmd.bank_name = String::new();
    let err = engine.new_supplier(cmd).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let mut cmd = supplier_cmd("Green Stone Co");
    cmd.type_id = 0;
    assert!(engine.new_supplier(cmd).await.is_err());
}

#[tokio::test]
async fn supplier_import_is_all_or_nothing() {
    let (engine, _db) = engine_with_db().await;

    let mut broken = supplier_cmd("Broken");
    broken.phone = String::new();
    let err = engine
        .import_suppliers(vec![supplier_cmd("First"), broken])
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidInput("row 2: Invalid input: phone must not be empty".to_string())
    );
    assert!(engine.all_suppliers().await.unwrap().is_empty());

    let inserted = engine
        .import_suppliers(vec![supplier_cmd("First"), supplier_cmd("Second")])
        .await
        .unwrap();
    assert_eq!(inserted, 2);
    assert_eq!(engine.all_suppliers().await.unwrap().len(), 2);
}

#[tokio::test]
async fn payer_type_is_validated() {
    let (engine, _db) = engine_with_db().await;

    let payer = engine
        .new_payer(PayerNew {
            type_id: 2,
            name: "Li Na".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(payer.payer_type, PayerType::Individual);

    let err = engine
        .new_payer(PayerNew {
            type_id: 3,
            name: "Nobody".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let payer = engine
        .update_payer(
            payer.id,
            PayerUpdate {
                type_id: Some(1),
                bank_name: Some("City Bank".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(payer.payer_type, PayerType::Organisation);

    let page = engine
        .list_payers(
            &PayerFilter {
                type_id: Some(1),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn order_balance_tracks_payments() {
    let (engine, _db) = engine_with_db().await;
    let supplier = engine.new_supplier(supplier_cmd("Green Stone Co")).await.unwrap();

    let order = engine
        .new_order(order_cmd("PO-001", Some(supplier.id), "1000.00"))
        .await
        .unwrap();
    assert_eq!(order.supplier_name.as_deref(), Some("Green Stone Co"));
    assert_eq!(order.order_balance, money("1000.00"));

    let payer = engine
        .new_payer(PayerNew {
            type_id: 1,
            name: "City Works".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let first = engine
        .new_pay(PayNew {
            payer_supplier_id: Some(payer.id),
            payee_supplier_id: Some(supplier.id),
            ..pay_cmd("PAY-001", Some(order.order.id), "300.00")
        })
        .await
        .unwrap();
    assert_eq!(first.order_number.as_deref(), Some("PO-001"));
    assert_eq!(first.payer_name.as_deref(), Some("City Works"));
    assert_eq!(first.payee_name.as_deref(), Some("Green Stone Co"));

    engine
        .new_pay(pay_cmd("PAY-002", Some(order.order.id), "250.50"))
        .await
        .unwrap();

    let order = engine.order(order.order.id).await.unwrap();
    assert_eq!(order.payment_count(), 2);
    assert_eq!(order.paid_total, money("550.50"));
    assert_eq!(order.order_balance, money("449.50"));

    engine
        .update_pay(
            first.pay.id,
            PayUpdate {
                current_payment_amount: Some(Some(money("400.00"))),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let order = engine.order(order.order.id).await.unwrap();
    assert_eq!(order.order_balance, money("349.50"));
}

#[tokio::test]
async fn order_numbers_are_unique() {
    let (engine, _db) = engine_with_db().await;

    let first = engine
        .new_order(order_cmd("PO-001", None, "10.00"))
        .await
        .unwrap();
    let err = engine
        .new_order(order_cmd("PO-001", None, "20.00"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("PO-001".to_string()));

    let second = engine
        .new_order(order_cmd("PO-002", None, "20.00"))
        .await
        .unwrap();
    let err = engine
        .update_order(
            second.order.id,
            OrderUpdate {
                order_number: Some("PO-001".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    // Keeping its own number is fine.
    engine
        .update_order(
            first.order.id,
            OrderUpdate {
                order_number: Some("PO-001".to_string()),
                material_name: Some("Basalt kerb".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn order_update_clears_optional_columns() {
    let (engine, _db) = engine_with_db().await;
    let supplier = engine.new_supplier(supplier_cmd("Green Stone Co")).await.unwrap();
    let order = engine
        .new_order(OrderNew {
            cutting_time: NaiveDate::from_ymd_opt(2026, 1, 5),
            estimated_arrival_time: NaiveDate::from_ymd_opt(2026, 1, 20),
            ..order_cmd("PO-001", Some(supplier.id), "100.00")
        })
        .await
        .unwrap();

    // Absent fields stay.
    let kept = engine
        .update_order(
            order.order.id,
            OrderUpdate {
                material_name: Some("Basalt kerb".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(kept.order.supplier_id, Some(supplier.id));
    assert_eq!(kept.order.cutting_time, NaiveDate::from_ymd_opt(2026, 1, 5));
    assert_eq!(kept.order.order_amount, Some(money("100.00")));

    let cleared = engine
        .update_order(
            order.order.id,
            OrderUpdate {
                supplier_id: Some(None),
                cutting_time: Some(None),
                estimated_arrival_time: Some(None),
                order_amount: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.order.supplier_id, None);
    assert_eq!(cleared.supplier_name, None);
    assert_eq!(cleared.order.cutting_time, None);
    assert_eq!(cleared.order.estimated_arrival_time, None);
    assert_eq!(cleared.order.order_amount, None);
    assert_eq!(cleared.order.material_name, "Basalt kerb");

    let pay = engine
        .new_pay(PayNew {
            invoice_amount: Some(money("20.00")),
            ..pay_cmd("PAY-001", Some(order.order.id), "20.00")
        })
        .await
        .unwrap();
    let pay = engine
        .update_pay(
            pay.pay.id,
            PayUpdate {
                order_id: Some(None),
                invoice_amount: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(pay.pay.order_id, None);
    assert_eq!(pay.pay.invoice_amount, None);
    assert_eq!(pay.pay.current_payment_amount, Some(money("20.00")));
}

#[tokio::test]
async fn order_rejects_unknown_supplier_and_negative_amount() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .new_order(order_cmd("PO-001", Some(42), "10.00"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .new_order(order_cmd("PO-001", None, "-10.00"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn order_filters() {
    let (engine, _db) = engine_with_db().await;
    let supplier = engine.new_supplier(supplier_cmd("Green Stone Co")).await.unwrap();

    engine
        .new_order(OrderNew {
            cutting_time: NaiveDate::from_ymd_opt(2026, 3, 1),
            ..order_cmd("PO-001", Some(supplier.id), "1234.50")
        })
        .await
        .unwrap();
    engine
        .new_order(order_cmd("PO-002", None, "99.00"))
        .await
        .unwrap();

    let by_supplier = engine
        .list_orders(
            &OrderFilter {
                supplier_name: Some("Green".to_string()),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_supplier.total, 1);
    assert_eq!(by_supplier.items[0].order.order_number, "PO-001");

    let by_amount = engine
        .list_orders(
            &OrderFilter {
                order_amount: Some("34.5".to_string()),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_amount.total, 1);

    let by_date = engine
        .list_orders(
            &OrderFilter {
                cutting_time: Some("2026-03-01".to_string()),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_date.total, 1);

    let malformed = engine
        .list_orders(
            &OrderFilter {
                cutting_time: Some("yesterday".to_string()),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(malformed.total, 2);
    assert_eq!(malformed.items[0].order.order_number, "PO-002");
}

#[tokio::test]
async fn deletes_detach_references() {
    let (engine, _db) = engine_with_db().await;
    let supplier = engine.new_supplier(supplier_cmd("Green Stone Co")).await.unwrap();
    let payer = engine
        .new_payer(PayerNew {
            type_id: 1,
            name: "City Works".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let order = engine
        .new_order(order_cmd("PO-001", Some(supplier.id), "100.00"))
        .await
        .unwrap();
    let pay = engine
        .new_pay(PayNew {
            payer_supplier_id: Some(payer.id),
            payee_supplier_id: Some(supplier.id),
            ..pay_cmd("PAY-001", Some(order.order.id), "40.00")
        })
        .await
        .unwrap();

    engine.delete_supplier(supplier.id).await.unwrap();
    let order_after = engine.order(order.order.id).await.unwrap();
    assert_eq!(order_after.order.supplier_id, None);
    assert_eq!(engine.pay(pay.pay.id).await.unwrap().pay.payee_supplier_id, None);

    engine.delete_payer(payer.id).await.unwrap();
    assert_eq!(engine.pay(pay.pay.id).await.unwrap().pay.payer_supplier_id, None);

    engine.delete_order(order.order.id).await.unwrap();
    assert_eq!(engine.pay(pay.pay.id).await.unwrap().pay.order_id, None);

    engine.delete_pay(pay.pay.id).await.unwrap();
    let err = engine.delete_pay(pay.pay.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn pay_filters_and_unique_numbers() {
    let (engine, _db) = engine_with_db().await;
    let order = engine
        .new_order(order_cmd("PO-777", None, "100.00"))
        .await
        .unwrap();
    engine
        .new_pay(PayNew {
            payment_status: Some("paid".to_string()),
            create_at: Some(Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap()),
            ..pay_cmd("PAY-001", Some(order.order.id), "100.00")
        })
        .await
        .unwrap();
    engine
        .new_pay(pay_cmd("PAY-002", None, "5.00"))
        .await
        .unwrap();

    let err = engine
        .new_pay(pay_cmd("PAY-002", None, "5.00"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let by_order = engine
        .list_pays(
            &PayFilter {
                order_number: Some("777".to_string()),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_order.total, 1);
    assert_eq!(by_order.items[0].pay.pay_number, "PAY-001");

    let by_day = engine
        .list_pays(
            &PayFilter {
                create_at: Some("2026-05-04".to_string()),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_day.total, 1);
}

#[tokio::test]
async fn dashboard_aggregates_orders_and_payments() {
    let (engine, _db) = engine_with_db().await;
    let big = engine.new_supplier(supplier_cmd("Big Supplier")).await.unwrap();
    let small = engine.new_supplier(supplier_cmd("Small Supplier")).await.unwrap();

    let order = engine
        .new_order(order_cmd("PO-001", Some(big.id), "900.00"))
        .await
        .unwrap();
    engine
        .new_order(order_cmd("PO-002", Some(big.id), "100.00"))
        .await
        .unwrap();
    engine
        .new_order(order_cmd("PO-003", Some(small.id), "50.00"))
        .await
        .unwrap();
    engine
        .new_pay(PayNew {
            payment_status: Some("paid".to_string()),
            ..pay_cmd("PAY-001", Some(order.order.id), "300.00")
        })
        .await
        .unwrap();
    engine
        .new_pay(pay_cmd("PAY-002", None, "20.00"))
        .await
        .unwrap();

    let overview = engine.dashboard_overview().await.unwrap();
    assert_eq!(overview.order_total, money("1050.00"));
    assert_eq!(overview.paid_total, money("320.00"));
    assert_eq!(overview.pending, money("730.00"));
    assert_eq!(overview.order_count, 3);
    assert_eq!(overview.pay_count, 2);
    assert_eq!(overview.supplier_count, 2);
    assert_eq!(overview.payer_count, 0);

    let statuses = engine.payment_status_distribution().await.unwrap();
    assert_eq!(statuses.len(), 2);
    let unset = statuses.iter().find(|s| s.status == "unset").unwrap();
    assert_eq!(unset.count, 1);
    assert_eq!(unset.amount, money("20.00"));

    let trend = engine.monthly_trend(Utc::now()).await.unwrap();
    assert_eq!(trend.len(), 12);
    let current = trend.last().unwrap();
    assert_eq!(current.month, Utc::now().format("%Y-%m").to_string());
    assert_eq!(current.order_count, 3);
    assert_eq!(current.pay_amount, money("320.00"));

    let top = engine.top_suppliers().await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].name, "Big Supplier");
    assert_eq!(top[0].order_count, 2);
    assert_eq!(top[0].order_amount, money("1000.00"));
}
