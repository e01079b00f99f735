//! End-to-end ledger scenarios through the order services

mod common;

use common::{count, file_pool, memory_pool, serum_key};
use shared::error::ErrorCode;
use shared::models::{
    BillingEventQuery, INBOUND_FEE, InboundItemInput, InboundItemUpdate, InboundOrderCreate,
    InboundOrderUpdate, InboundStatus, OUTBOUND_FEE, OutboundItemInput, OutboundItemUpdate,
    OutboundOrderCreate, OutboundOrderUpdate, OutboundStatus, RefType, StockTransactionQuery,
    TxnType,
};
use sqlx::SqlitePool;
use wms_server::billing;
use wms_server::db::repository::{OrderKind, order_log};
use wms_server::ledger;
use wms_server::orders::{inbound, inbound_items, outbound, outbound_items};

fn inbound_order(order_no: &str, status: InboundStatus, qty: &[i64]) -> InboundOrderCreate {
    InboundOrderCreate {
        order_no: order_no.into(),
        client_id: 1,
        warehouse_id: 1,
        status,
        inbound_date: None,
        note: None,
        items: qty
            .iter()
            .map(|&qty| InboundItemInput {
                product_id: 5,
                lot_id: 9,
                location_id: None,
                qty,
                invoice_price: None,
                currency: None,
                note: None,
            })
            .collect(),
    }
}

fn outbound_order(order_no: &str, qty: i64) -> OutboundOrderCreate {
    OutboundOrderCreate {
        order_no: order_no.into(),
        client_id: 1,
        warehouse_id: 1,
        status: OutboundStatus::Draft,
        order_date: None,
        note: None,
        items: vec![OutboundItemInput {
            product_id: 5,
            lot_id: 9,
            location_id: None,
            qty,
            box_type: Some("M".into()),
            box_count: 1,
            note: None,
        }],
    }
}

fn set_inbound(status: InboundStatus) -> InboundOrderUpdate {
    InboundOrderUpdate {
        status: Some(status),
        ..Default::default()
    }
}

fn set_outbound(status: OutboundStatus) -> OutboundOrderUpdate {
    OutboundOrderUpdate {
        status: Some(status),
        ..Default::default()
    }
}

async fn balance(pool: &SqlitePool) -> i64 {
    ledger::available_qty(pool, &serum_key()).await.unwrap()
}

async fn live_billing(pool: &SqlitePool, service_code: &str) -> Vec<shared::models::BillingEvent> {
    billing::list_billing_events(
        pool,
        &BillingEventQuery {
            service_code: Some(service_code.into()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
}

/// Draft order with one item of 10, then received
async fn receive_ten(pool: &SqlitePool) -> (i64, i64) {
    let detail = inbound::create_order(pool, inbound_order("IN-1", InboundStatus::Draft, &[10]), None)
        .await
        .unwrap();
    assert_eq!(balance(pool).await, 0);
    inbound::update_order(pool, detail.order.id, set_inbound(InboundStatus::Received), Some(7))
        .await
        .unwrap();
    (detail.order.id, detail.items[0].id)
}

#[tokio::test]
async fn receiving_an_order_adds_stock_and_bills_it() {
    let pool = memory_pool().await;
    let (_, item_id) = receive_ten(&pool).await;

    assert_eq!(balance(&pool).await, 10);

    let txns = ledger::list_stock_txns(&pool, &StockTransactionQuery::default())
        .await
        .unwrap();
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].txn_type, TxnType::InboundReceive);
    assert_eq!(txns[0].ref_type, RefType::InboundItem);
    assert_eq!(txns[0].ref_id, item_id);
    assert_eq!(txns[0].qty_in, 10);
    assert_eq!(txns[0].created_by, Some(7));

    let events = live_billing(&pool, INBOUND_FEE).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].qty, 10);
    assert_eq!(events[0].pricing_policy, "KRW_FIXED");
    assert_eq!(events[0].amount_krw, 0);
}

#[tokio::test]
async fn cancelling_a_received_order_reverses_everything() {
    let pool = memory_pool().await;
    let (order_id, _) = receive_ten(&pool).await;

    inbound::update_order(&pool, order_id, set_inbound(InboundStatus::Cancelled), None)
        .await
        .unwrap();

    assert_eq!(balance(&pool).await, 0);
    let all = ledger::list_stock_txns(
        &pool,
        &StockTransactionQuery {
            include_deleted: true,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(all.len(), 1);
    assert!(all[0].deleted_at.is_some());
    assert!(live_billing(&pool, INBOUND_FEE).await.is_empty());

    let actions: Vec<String> = order_log::list(&pool, OrderKind::Inbound, order_id)
        .await
        .unwrap()
        .into_iter()
        .map(|log| log.action)
        .collect();
    assert_eq!(actions, ["create", "receive", "cancel"]);
}

#[tokio::test]
async fn shipping_without_stock_fails_cleanly() {
    let pool = memory_pool().await;
    let order_id = outbound::create_order(&pool, outbound_order("OUT-1", 4), None)
        .await
        .unwrap()
        .order
        .id;

    let err = outbound::update_order(&pool, order_id, set_outbound(OutboundStatus::Shipped), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);

    assert_eq!(balance(&pool).await, 0);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM stock_transactions").await, 0);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM outbound_service_events").await, 0);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM billing_events").await, 0);
    let order = outbound::get_order(&pool, order_id).await.unwrap().order;
    assert_eq!(order.status, OutboundStatus::Draft);
}

#[tokio::test]
async fn shipping_takes_stock_and_freezes_items() {
    let pool = memory_pool().await;
    receive_ten(&pool).await;

    let detail = outbound::create_order(&pool, outbound_order("OUT-1", 4), None)
        .await
        .unwrap();
    let order_id = detail.order.id;
    let item_id = detail.items[0].id;
    outbound::update_order(&pool, order_id, set_outbound(OutboundStatus::Shipped), None)
        .await
        .unwrap();

    assert_eq!(balance(&pool).await, 6);
    let shipments = ledger::list_stock_txns(
        &pool,
        &StockTransactionQuery {
            ref_type: Some(RefType::OutboundItem),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(shipments.len(), 1);
    assert_eq!(shipments[0].txn_type, TxnType::OutboundShip);
    assert_eq!(shipments[0].qty_out, 4);

    let service = billing::service_events::list_for_order(&pool, order_id).await.unwrap();
    assert_eq!(service.len(), 1);
    assert_eq!(service[0].stock_txn_id, shipments[0].id);

    let fees = live_billing(&pool, OUTBOUND_FEE).await;
    assert_eq!(fees.len(), 1);
    assert_eq!(fees[0].qty, 4);

    let patch = OutboundItemUpdate {
        qty: Some(2),
        ..Default::default()
    };
    let err = outbound_items::update_item(&pool, item_id, patch, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderLocked);
    assert_eq!(outbound_items::get_item(&pool, item_id).await.unwrap().qty, 4);
    assert_eq!(balance(&pool).await, 6);
}

#[tokio::test]
async fn moving_a_received_item_to_a_draft_order() {
    let pool = memory_pool().await;
    let (source, item_id) = receive_ten(&pool).await;
    let target = inbound::create_order(&pool, inbound_order("IN-3", InboundStatus::Draft, &[]), None)
        .await
        .unwrap()
        .order
        .id;

    let patch = InboundItemUpdate {
        inbound_order_id: Some(target),
        ..Default::default()
    };
    inbound_items::update_item(&pool, item_id, patch, None)
        .await
        .unwrap();

    assert_eq!(balance(&pool).await, 0);
    assert!(live_billing(&pool, INBOUND_FEE).await.is_empty());

    let source_log = order_log::list(&pool, OrderKind::Inbound, source).await.unwrap();
    assert_eq!(source_log.last().unwrap().action, "item_move_out");
    let target_log = order_log::list(&pool, OrderKind::Inbound, target).await.unwrap();
    assert_eq!(target_log.last().unwrap().action, "item_move_in");

    // receiving the destination brings the stock back under the same transaction row
    inbound::update_order(&pool, target, set_inbound(InboundStatus::Received), None)
        .await
        .unwrap();
    assert_eq!(balance(&pool).await, 10);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM stock_transactions").await, 1);
    let fees = live_billing(&pool, INBOUND_FEE).await;
    assert_eq!(fees.len(), 1);
    assert_eq!(fees[0].reference_id, target);
}

#[tokio::test]
async fn changing_owner_of_a_received_order_is_rejected() {
    let pool = memory_pool().await;
    let (order_id, _) = receive_ten(&pool).await;

    let patch = InboundOrderUpdate {
        client_id: Some(2),
        ..Default::default()
    };
    let err = inbound::update_order(&pool, order_id, patch, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderLockedFields);
    assert_eq!(inbound::get_order(&pool, order_id).await.unwrap().order.client_id, 1);
    assert_eq!(balance(&pool).await, 10);
}

#[tokio::test]
async fn repeated_toggles_leave_one_billing_event() {
    let pool = memory_pool().await;
    receive_ten(&pool).await;
    let order_id = outbound::create_order(&pool, outbound_order("OUT-1", 3), None)
        .await
        .unwrap()
        .order
        .id;

    for status in [
        OutboundStatus::Shipped,
        OutboundStatus::Packed,
        OutboundStatus::Delivered,
        OutboundStatus::Cancelled,
        OutboundStatus::Shipped,
    ] {
        outbound::update_order(&pool, order_id, set_outbound(status), None)
            .await
            .unwrap();
    }

    assert_eq!(balance(&pool).await, 7);
    assert_eq!(live_billing(&pool, OUTBOUND_FEE).await.len(), 1);
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM billing_events WHERE service_code = 'OUTBOUND_FEE'").await,
        1
    );
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM outbound_service_events WHERE deleted_at IS NULL").await,
        1
    );
}

#[tokio::test]
async fn concurrent_shipments_never_oversell() {
    let dir = tempfile::tempdir().unwrap();
    let pool = file_pool(dir.path()).await;
    receive_ten(&pool).await;

    let first = outbound::create_order(&pool, outbound_order("OUT-1", 6), None)
        .await
        .unwrap()
        .order
        .id;
    let second = outbound::create_order(&pool, outbound_order("OUT-2", 6), None)
        .await
        .unwrap()
        .order
        .id;

    let (a, b) = tokio::join!(
        outbound::update_order(&pool, first, set_outbound(OutboundStatus::Shipped), None),
        outbound::update_order(&pool, second, set_outbound(OutboundStatus::Shipped), None),
    );

    let failures: Vec<_> = [a, b].into_iter().filter_map(Result::err).collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].code, ErrorCode::InsufficientStock);
    assert_eq!(balance(&pool).await, 4);
}
