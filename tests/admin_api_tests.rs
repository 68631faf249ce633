// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin invoice management endpoints.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use merchant_api_mock::config::Config;
use merchant_api_mock::db::InvoiceDb;
use serde_json::json;
use tower::ServiceExt;

fn invoice_json(order_id: &str) -> serde_json::Value {
    json!({
        "order_id": order_id,
        "title": "Acme Trading Co.",
        "tax_number": "91310000MA1FL8XQ30",
        "amount": 12_800,
    })
}

#[tokio::test]
async fn test_bulk_add_and_list() {
    let (app, _state) = common::create_test_app();

    let response = app
        .clone()
        .oneshot(common::request(
            "POST",
            "/admin/invoices/bulk",
            None,
            Some(json!({
                "invoices": [invoice_json("order-1"), invoice_json("order-2")]
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(json["data"]["inserted"], 2);
    let first = &json["data"]["invoices"][0];
    assert!(first["id"].as_str().unwrap().starts_with("inv_"));
    assert_eq!(first["status"], "pending");

    let response = app
        .oneshot(common::request(
            "GET",
            "/admin/invoices?order_id=order-2",
            None,
            None,
        ))
        .await
        .unwrap();
    let json = common::body_json(response).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["invoices"][0]["order_id"], "order-2");
}

#[tokio::test]
async fn test_bulk_add_validates_each_invoice() {
    let (app, state) = common::create_test_app();

    let mut bad = invoice_json("order-2");
    bad["amount"] = json!(0);
    let response = app
        .clone()
        .oneshot(common::request(
            "POST",
            "/admin/invoices/bulk",
            None,
            Some(json!({ "invoices": [invoice_json("order-1"), bad] })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::body_json(response).await["code"], 1001);

    let response = app
        .oneshot(common::request(
            "POST",
            "/admin/invoices/bulk",
            None,
            Some(json!({ "invoices": [] })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let page = state
        .db
        .list_invoices(&Default::default(), Default::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_duplicate_id_rolls_back_batch() {
    let (app, state) = common::create_test_app();

    let mut first = invoice_json("order-1");
    first["id"] = json!("inv_dup");
    let mut second = invoice_json("order-2");
    second["id"] = json!("inv_dup");

    let response = app
        .oneshot(common::request(
            "POST",
            "/admin/invoices/bulk",
            None,
            Some(json!({ "invoices": [first, second] })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(common::body_json(response).await["code"], 5002);

    let page = state
        .db
        .list_invoices(&Default::default(), Default::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_generate_mock_invoices() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(common::request(
            "POST",
            "/admin/invoices/generate",
            None,
            Some(json!({ "count": 10 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(json["data"]["inserted"], 10);
    for invoice in json["data"]["invoices"].as_array().unwrap() {
        assert_eq!(invoice["order_id"].as_str().unwrap().len(), 19);
        if invoice["status"] == "rejected" {
            assert!(invoice["reject_reason"].is_string());
        }
    }

    let page = state
        .db
        .list_invoices(&Default::default(), Default::default())
        .await
        .unwrap();
    assert_eq!(page.total, 10);
}

#[tokio::test]
async fn test_generate_count_bounds() {
    let (app, _state) = common::create_test_app();

    for count in [0, 101] {
        let response = app
            .clone()
            .oneshot(common::request(
                "POST",
                "/admin/invoices/generate",
                None,
                Some(json!({ "count": count })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "count {}", count);
    }
}

#[tokio::test]
async fn test_update_and_delete_invoice() {
    let (app, _state) = common::create_test_app();

    let mut invoice = invoice_json("order-1");
    invoice["id"] = json!("inv_edit");
    app.clone()
        .oneshot(common::request(
            "POST",
            "/admin/invoices/bulk",
            None,
            Some(json!({ "invoices": [invoice] })),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(common::request(
            "PUT",
            "/admin/invoices/inv_edit",
            None,
            Some(json!({ "amount": 99_900, "title": "Renamed Co." })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(json["data"]["amount"], 99_900);
    assert_eq!(json["data"]["title"], "Renamed Co.");
    assert_eq!(json["data"]["order_id"], "order-1");

    let response = app
        .clone()
        .oneshot(common::request(
            "PUT",
            "/admin/invoices/inv_edit",
            None,
            Some(json!({})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(common::request("DELETE", "/admin/invoices/inv_edit", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(json["data"]["id"], "inv_edit");
    assert_eq!(json["data"]["deleted"], true);

    let response = app
        .oneshot(common::request("DELETE", "/admin/invoices/inv_edit", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(common::body_json(response).await["code"], 1006);
}

#[tokio::test]
async fn test_admin_key_enforced_when_configured() {
    let config = Config {
        admin_api_key: Some("let-me-in".to_string()),
        ..Config::default()
    };
    let (app, _state) = common::create_app_with(config, InvoiceDb::new_memory());

    let response = app
        .clone()
        .oneshot(common::request("GET", "/admin/invoices", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(common::body_json(response).await["code"], 1002);

    let request = Request::builder()
        .uri("/admin/invoices")
        .header("x-admin-key", "wrong")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/admin/invoices")
        .header("x-admin-key", "let-me-in")
        .header(header::ACCEPT, "application/json")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_routes_ignore_access_tokens() {
    let config = Config {
        admin_api_key: Some("let-me-in".to_string()),
        ..Config::default()
    };
    let (app, state) = common::create_app_with(config, InvoiceDb::new_memory());
    let token = common::access_token(&state, "u1");

    let response = app
        .oneshot(common::request("GET", "/admin/invoices", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bulk_rejected_invoice_needs_reason() {
    let (app, state) = common::create_test_app();

    let mut rejected = invoice_json("order-1");
    rejected["status"] = json!("rejected");
    let response = app
        .clone()
        .oneshot(common::request(
            "POST",
            "/admin/invoices/bulk",
            None,
            Some(json!({ "invoices": [rejected.clone()] })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::body_json(response).await["code"], 1001);
    let page = state
        .db
        .list_invoices(&Default::default(), Default::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);

    rejected["reject_reason"] = json!("Title does not match order");
    let response = app
        .oneshot(common::request(
            "POST",
            "/admin/invoices/bulk",
            None,
            Some(json!({ "invoices": [rejected] })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(
        json["data"]["invoices"][0]["reject_reason"],
        "Title does not match order"
    );
}

#[tokio::test]
async fn test_patch_status_keeps_reason_consistent() {
    let (app, _state) = common::create_test_app();

    let mut invoice = invoice_json("order-1");
    invoice["id"] = json!("inv_flip");
    invoice["status"] = json!("rejected");
    invoice["reject_reason"] = json!("Missing tax number");
    app.clone()
        .oneshot(common::request(
            "POST",
            "/admin/invoices/bulk",
            None,
            Some(json!({ "invoices": [invoice] })),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(common::request(
            "PUT",
            "/admin/invoices/inv_flip",
            None,
            Some(json!({ "status": "approved" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(json["data"]["status"], "approved");
    assert!(json["data"]["reject_reason"].is_null());

    let response = app
        .oneshot(common::request(
            "PUT",
            "/admin/invoices/inv_flip",
            None,
            Some(json!({ "status": "rejected" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::body_json(response).await["code"], 1001);
}
