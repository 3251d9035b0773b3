mod common;

use boxtrack_core::{BoxStatus, Error, NewTransaction, TransactionType};
use boxtrack_networking::{api, Method, Route};
use chrono::NaiveDate;
use common::{envelope, Harness, REFRESH};
use serde_json::json;

fn purchase_date() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 17)
        .and_then(|d| d.and_hms_opt(9, 45, 0))
        .unwrap()
}

#[tokio::test]
async fn deposit_rejects_bad_amounts_without_a_request() {
    let h = Harness::signed_in().await;

    for amount in ["", "abc", "0", "-10"] {
        let err = api::deposit(&h.client, amount).await.unwrap_err();
        assert_eq!(
            err.field_errors().and_then(|f| f.first("amount")),
            Some(api::INVALID_AMOUNT_MESSAGE)
        );
    }
    assert!(h.transport.requests().is_empty());
}

#[tokio::test]
async fn withdraw_sends_delete_with_body_and_surfaces_field_errors() {
    let h = Harness::signed_in().await;
    h.transport.on(
        Method::DELETE,
        "balance/",
        400,
        json!({"success": false, "message": "Bad request", "data": {"amount": "Insufficient balance"}}),
    );

    let reply = api::withdraw(&h.client, "5000").await.unwrap();

    assert!(!reply.success);
    assert_eq!(reply.field_errors.first("amount"), Some("Insufficient balance"));
    let sent = h.transport.requests().pop().unwrap();
    assert_eq!(sent.method, Method::DELETE);
    assert_eq!(sent.body, Some(json!({"amount": "5000"})));
}

#[tokio::test]
async fn lists_boxes_by_status() {
    let h = Harness::signed_in().await;
    h.transport.on(
        Method::GET,
        "boxes/?closed=true",
        200,
        envelope(json!([{
            "id": 4,
            "coin_symbol": "ETH",
            "coin_name": "Ethereum",
            "amount": "0.00000000",
            "average_buy_price": "2000.00000000",
            "current_price": "N/A",
            "value": "N/A",
            "profit_loss_value": "150.00000000",
            "profit_loss_percentage": "7.50000000",
            "age": 12,
            "is_closed": true
        }])),
    );

    let closed = api::list_boxes(&h.client, BoxStatus::Closed).await.unwrap();

    assert_eq!(closed.len(), 1);
    assert!(closed[0].closed);
    assert_eq!(closed[0].age_days, 12);
    assert!(!closed[0].current_price.is_available());
    assert_eq!(h.transport.count("boxes/?closed=true"), 1);
}

#[tokio::test]
async fn ledger_rows_are_stamped_with_their_box() {
    let h = Harness::signed_in().await;
    h.transport.on(
        Method::GET,
        "boxes/9/transactions/",
        200,
        envelope(json!([
            {"id": 31, "type": "sell", "amount": "1", "price": "110", "value": "110", "fee": "0.1",
             "transaction_date": "2024-05-18 10:00", "profit_loss_value": "10", "profit_loss_percentage": "10"},
            {"id": 30, "type": "buy", "amount": "1", "price": "100", "value": "100", "fee": "0.1",
             "transaction_date": "2024-05-17 09:45"}
        ])),
    );

    let ledger = api::list_transactions(&h.client, 9).await.unwrap();

    assert_eq!(ledger.iter().map(|t| t.id).collect::<Vec<_>>(), vec![31, 30]);
    assert!(ledger.iter().all(|t| t.box_id == 9));
    assert!(ledger[0].realized_profit_loss().is_some());
    assert!(ledger[1].realized_profit_loss().is_none());
}

#[tokio::test]
async fn create_transaction_validates_before_sending() {
    let h = Harness::signed_in().await;
    let form = NewTransaction::new("", TransactionType::Buy, "abc", "1", purchase_date());

    let err = api::create_transaction(&h.client, &form).await.unwrap_err();

    assert!(matches!(err, Error::ValidationFailure(_)));
    let fields = err.field_errors().unwrap();
    assert_eq!(fields.first("coin_symbol"), Some("Coin symbol is required"));
    assert_eq!(fields.first("price"), Some("Valid price is required"));
    assert!(h.transport.requests().is_empty());
}

#[tokio::test]
async fn create_transaction_posts_normalized_body() {
    let h = Harness::signed_in().await;
    h.transport.on(
        Method::POST,
        "transactions/",
        201,
        json!({"success": true, "message": "Created", "data": {"transaction_id": 77, "coin_name": "Bitcoin"}}),
    );
    let form = NewTransaction::new("btc", TransactionType::Buy, "64000", "0.25", purchase_date()).with_fee("1.5");

    let reply = api::create_transaction(&h.client, &form).await.unwrap();

    assert_eq!(reply.status, 201);
    assert_eq!(reply.data.map(|r| r.transaction_id), Some(77));
    let sent = h.transport.requests().pop().unwrap();
    assert_eq!(
        sent.body,
        Some(json!({
            "coin_symbol": "BTC",
            "type": "buy",
            "price": "64000",
            "amount": "0.25",
            "fee": "1.5",
            "transaction_date": "2024-05-17 09:45"
        }))
    );
}

#[tokio::test]
async fn delete_transaction_reports_status() {
    let h = Harness::signed_in().await;
    h.transport.on(Method::DELETE, "transactions/31/", 204, serde_json::Value::Null);
    h.transport.on(
        Method::DELETE,
        "transactions/32/",
        400,
        json!({"success": false, "message": "You cannot delete closed box transactions", "data": null}),
    );

    let deleted = api::delete_transaction(&h.client, 31).await.unwrap();
    assert_eq!(deleted.status, 204);

    let refused = api::delete_transaction(&h.client, 32).await.unwrap();
    assert!(!refused.success);
    assert_eq!(refused.message, "You cannot delete closed box transactions");
}

#[tokio::test]
async fn close_box_uses_patch() {
    let h = Harness::signed_in().await;
    h.transport.on(
        Method::PATCH,
        "boxes/4/close/",
        200,
        json!({"success": true, "message": "Box closed", "data": {"box": "Ethereum"}}),
    );

    let reply = api::close_box(&h.client, 4).await.unwrap();

    assert_eq!(reply.data.map(|b| b.coin_name).as_deref(), Some("Ethereum"));
    assert_eq!(h.transport.paths(), vec![REFRESH.to_string(), "boxes/4/close/".to_string()]);
}

#[tokio::test]
async fn balance_history_newest_first() {
    let h = Harness::signed_in().await;
    h.transport.on(
        Method::GET,
        "balance/history/",
        200,
        envelope(json!([
            {"usdt_balance": "900.00000000", "coin_balance": "600.00000000", "total_balance": "1500.00000000", "timestamp": "2024-05-18T00:00:00Z"},
            {"usdt_balance": "1000.00000000", "coin_balance": "0.00000000", "total_balance": "1000.00000000", "timestamp": "2024-05-17T00:00:00Z"}
        ])),
    );

    let history = api::balance_history(&h.client).await.unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].total_balance.value(), Some(1500.0));
}

#[tokio::test]
async fn logout_ends_session_on_any_answer() {
    let h = Harness::signed_in().await;
    h.transport.on(Method::POST, "auth/logout/", 500, json!({"detail": "boom"}));

    api::logout(&h.client).await.unwrap();

    assert!(h.stored().await.is_none());
    assert_eq!(h.session.route(), Route::Login);
    let sent = h.transport.requests().pop().unwrap();
    assert_eq!(sent.body, Some(json!({"refresh": "r1"})));
    assert_eq!(sent.bearer.as_deref(), Some("a2"));
}

#[tokio::test]
async fn logout_without_answer_keeps_session() {
    let h = Harness::signed_in().await;
    h.transport.fail(Method::POST, "auth/logout/");

    let result = api::logout(&h.client).await;

    assert!(matches!(result, Err(Error::TransportFault(_))));
    assert!(h.stored().await.is_some());
    assert_eq!(h.session.route(), Route::Dashboard);
}

#[tokio::test]
async fn logout_without_session_sends_nothing() {
    let h = Harness::signed_out().await;

    let result = api::logout(&h.client).await;

    assert!(matches!(result, Err(Error::Unauthenticated)));
    assert!(h.transport.requests().is_empty());
}
