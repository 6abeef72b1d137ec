//! Integration tests for the API server.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use branchbook_api::config::ApiConfig;
use branchbook_api::{create_app, AppState};
use branchbook_core::{AccountType, EmployeeRole, Money, NewEmployee};
use branchbook_db::{Database, DbConfig};

const DAY: &str = "2025-03-14";

struct Seed {
    app: Router,
    branch_id: i64,
    cash_id: i64,
    customer_id: i64,
    salesperson_id: i64,
    worker_id: i64,
    supplier_id: i64,
    product_id: i64,
}

async fn setup() -> Seed {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let branch_id = db.branches().create("Mirpur").await.unwrap();
    let cash = db
        .accounts()
        .create(branch_id, "Cash Box", AccountType::Cash, Money::from_cents(100_000))
        .await
        .unwrap();
    let customer = db
        .customers()
        .create(branch_id, "Rahim", "01700000000")
        .await
        .unwrap();
    let salesperson = db
        .employees()
        .create(
            branch_id,
            &NewEmployee {
                name: "Sumi".into(),
                role: EmployeeRole::Salesperson,
                mobile: "01711111111".into(),
                base_salary: Money::from_cents(1_500_000),
            },
        )
        .await
        .unwrap();
    let worker = db
        .employees()
        .create(
            branch_id,
            &NewEmployee {
                name: "Jamal".into(),
                role: EmployeeRole::Worker,
                mobile: "01722222222".into(),
                base_salary: Money::from_cents(1_200_000),
            },
        )
        .await
        .unwrap();
    let supplier = db
        .suppliers()
        .create(branch_id, "Fabric House", "01733333333")
        .await
        .unwrap();
    let product = db.products().create(branch_id, "Panjabi", 10).await.unwrap();

    let state = Arc::new(AppState::new(db, ApiConfig::default()));
    Seed {
        app: create_app(state),
        branch_id,
        cash_id: cash.id,
        customer_id: customer.id,
        salesperson_id: salesperson.id,
        worker_id: worker.id,
        supplier_id: supplier.id,
        product_id: product.id,
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    branch_id: Option<i64>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = branch_id {
        builder = builder.header("X-Branch-ID", id.to_string());
    }
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&value).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn order_body(seed: &Seed, memo: &str, received: i64) -> Value {
    json!({
        "memo_no": memo,
        "order_date": DAY,
        "delivery_date": null,
        "salesperson_id": seed.salesperson_id,
        "customer_id": seed.customer_id,
        "payment_account_id": seed.cash_id,
        "total_amount": 10_000,
        "received_amount": received,
        "notes": null,
        "items": [{ "product_id": seed.product_id, "quantity": 2, "subtotal": 10_000 }]
    })
}

async fn cash_balance(seed: &Seed) -> i64 {
    let (_, json) = send(&seed.app, "GET", "/api/v1/accounts", Some(seed.branch_id), None).await;
    json["accounts"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["id"] == seed.cash_id)
        .unwrap()["current_balance"]
        .as_i64()
        .unwrap()
}

#[tokio::test]
async fn test_ping() {
    let seed = setup().await;
    let (status, json) = send(&seed.app, "GET", "/api/v1/ping", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["error"], false);
    assert_eq!(json["status"], "success");
    assert_eq!(json["database"], "ok");
}

#[tokio::test]
async fn test_missing_branch_header_rejected() {
    let seed = setup().await;
    let (status, json) = send(&seed.app, "GET", "/api/v1/orders", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], true);
    assert_eq!(json["status"], "error");
    assert_eq!(
        json["message"],
        "Branch ID not found. Include 'X-Branch-ID' header"
    );

    let (status, _) = send(&seed.app, "GET", "/api/v1/orders", Some(0), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_order_lifecycle_over_http() {
    let seed = setup().await;
    let branch = Some(seed.branch_id);

    let (status, json) = send(
        &seed.app,
        "POST",
        "/api/v1/orders",
        branch,
        Some(order_body(&seed, "0314ORD1", 4_000)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["message"], "Order added successfully");
    let order_id = json["order_id"].as_i64().unwrap();
    assert_eq!(cash_balance(&seed).await, 104_000);

    let (status, json) = send(
        &seed.app,
        "GET",
        &format!("/api/v1/orders/{order_id}"),
        branch,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["order"]["memo_no"], "0314ORD1");
    assert_eq!(json["order"]["due_amount"], 6_000);
    assert_eq!(json["order"]["items"][0]["product_name"], "Panjabi");

    let (_, json) = send(&seed.app, "GET", "/api/v1/orders?status=pending", branch, None).await;
    assert_eq!(json["total_count"], 1);
    let (_, json) = send(&seed.app, "GET", "/api/v1/orders?status=delivered", branch, None).await;
    assert_eq!(json["total_count"], 0);
    let (_, json) = send(&seed.app, "GET", "/api/v1/orders?status=all&search=Rahim", branch, None).await;
    assert_eq!(json["total_count"], 1);

    // Overpaying the due is rejected and changes nothing
    let (status, _) = send(
        &seed.app,
        "POST",
        &format!("/api/v1/orders/{order_id}/deliveries"),
        branch,
        Some(json!({
            "transaction_date": DAY,
            "delivered_by": seed.salesperson_id,
            "quantity_delivered": 2,
            "amount": 7_000,
            "payment_account_id": seed.cash_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(cash_balance(&seed).await, 104_000);

    let (status, json) = send(
        &seed.app,
        "POST",
        &format!("/api/v1/orders/{order_id}/deliveries"),
        branch,
        Some(json!({
            "transaction_date": DAY,
            "delivered_by": seed.salesperson_id,
            "quantity_delivered": 2,
            "amount": 6_000,
            "payment_account_id": seed.cash_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["order_status"], "delivered");
    assert_eq!(json["due_amount"], 0);
    assert_eq!(cash_balance(&seed).await, 110_000);

    // Delivered orders can no longer be edited
    let (status, json) = send(
        &seed.app,
        "PATCH",
        &format!("/api/v1/orders/{order_id}"),
        branch,
        Some(order_body(&seed, "0314ORD1", 5_000)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], true);
}

#[tokio::test]
async fn test_duplicate_memo_is_conflict() {
    let seed = setup().await;
    let branch = Some(seed.branch_id);

    let (status, _) = send(
        &seed.app,
        "POST",
        "/api/v1/orders",
        branch,
        Some(order_body(&seed, "0314DUPE", 0)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = send(
        &seed.app,
        "POST",
        "/api/v1/orders",
        branch,
        Some(order_body(&seed, "0314DUPE", 0)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["message"], "duplicate memo number not allowed");
}

#[tokio::test]
async fn test_missing_order_is_not_found() {
    let seed = setup().await;
    let (status, json) = send(&seed.app, "GET", "/api/v1/orders/999", Some(seed.branch_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], true);
}

#[tokio::test]
async fn test_sale_moves_stock_and_cash() {
    let seed = setup().await;
    let branch = Some(seed.branch_id);

    let (status, json) = send(
        &seed.app,
        "POST",
        "/api/v1/sales",
        branch,
        Some(json!({
            "memo_no": "0314SAL1",
            "sale_date": DAY,
            "salesperson_id": seed.salesperson_id,
            "customer_id": seed.customer_id,
            "payment_account_id": seed.cash_id,
            "total_amount": 5_000,
            "received_amount": 5_000,
            "notes": null,
            "items": [{ "product_id": seed.product_id, "quantity": 3, "subtotal": 5_000 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let sale_id = json["sale_id"].as_i64().unwrap();
    assert_eq!(cash_balance(&seed).await, 105_000);

    let (_, json) = send(&seed.app, "GET", "/api/v1/products", branch, None).await;
    assert_eq!(json["products"][0]["quantity"], 7);

    let (status, json) = send(
        &seed.app,
        "GET",
        &format!("/api/v1/sales/{sale_id}"),
        branch,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["sale"]["total_items"], 3);

    let (_, json) = send(
        &seed.app,
        "GET",
        &format!("/api/v1/reports/branch?start_date={DAY}&end_date={DAY}"),
        branch,
        None,
    )
    .await;
    assert_eq!(json["totals"]["cash"], 5_000);
    assert_eq!(json["totals"]["sales_amount"], 5_000);
    assert_eq!(json["totals"]["ready_made"], 3);
}

#[tokio::test]
async fn test_purchase_create_report_delete() {
    let seed = setup().await;
    let branch = Some(seed.branch_id);

    let (status, json) = send(
        &seed.app,
        "POST",
        "/api/v1/purchases",
        branch,
        Some(json!({
            "memo_no": "0314PUR1",
            "purchase_date": DAY,
            "supplier_id": seed.supplier_id,
            "total_amount": 20_000,
            "notes": "cotton"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let purchase_id = json["purchase_id"].as_i64().unwrap();
    assert_eq!(cash_balance(&seed).await, 80_000);

    let (status, json) = send(
        &seed.app,
        "GET",
        &format!("/api/v1/purchases?start_date={DAY}&end_date={DAY}&search=Fabric&page=1"),
        branch,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totals"]["total_purchases"], 1);
    assert_eq!(json["totals"]["total_amount"], 20_000);
    assert_eq!(json["purchases"][0]["supplier_name"], "Fabric House");

    let (status, _) = send(
        &seed.app,
        "DELETE",
        &format!("/api/v1/purchases/{purchase_id}"),
        branch,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cash_balance(&seed).await, 100_000);

    let (status, _) = send(
        &seed.app,
        "GET",
        &format!("/api/v1/purchases/{purchase_id}"),
        branch,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_salary_record_and_update() {
    let seed = setup().await;
    let branch = Some(seed.branch_id);

    let (status, json) = send(
        &seed.app,
        "POST",
        "/api/v1/employees/salaries",
        branch,
        Some(json!({
            "memo_no": "0314SLR1",
            "employee_id": seed.worker_id,
            "sheet_date": DAY,
            "amount": 12_000,
            "notes": null
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["memo_no"], "0314SLR1");
    assert_eq!(cash_balance(&seed).await, 88_000);

    let (status, _) = send(
        &seed.app,
        "PATCH",
        "/api/v1/employees/salaries/0314SLR1",
        branch,
        Some(json!({
            "memo_no": null,
            "employee_id": seed.worker_id,
            "sheet_date": DAY,
            "amount": 10_000,
            "notes": "corrected"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cash_balance(&seed).await, 90_000);

    let (_, json) = send(
        &seed.app,
        "GET",
        &format!("/api/v1/reports/employee/salaries?start_date={DAY}&end_date={DAY}"),
        branch,
        None,
    )
    .await;
    assert_eq!(json["totals"]["total_salary"], 10_000);

    let (status, _) = send(
        &seed.app,
        "PATCH",
        "/api/v1/employees/salaries/NOPE",
        branch,
        Some(json!({
            "memo_no": null,
            "employee_id": seed.worker_id,
            "sheet_date": DAY,
            "amount": 1,
            "notes": null
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_worker_progress_report() {
    let seed = setup().await;
    let branch = Some(seed.branch_id);

    let (status, _) = send(
        &seed.app,
        "POST",
        "/api/v1/employees/worker-progress",
        branch,
        Some(json!({
            "memo_no": "0314WRK1",
            "employee_id": seed.worker_id,
            "sheet_date": DAY,
            "production_units": 12,
            "overtime_hours": 1.5,
            "advance_payment": 500
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = send(
        &seed.app,
        "GET",
        &format!("/api/v1/reports/worker/progress?start_date={DAY}&end_date={DAY}&report_type=monthly"),
        branch,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["report_type"], "monthly");
    assert_eq!(json["rows"][0]["period"], "2025-03");
    assert_eq!(json["rows"][0]["production_units"], 12);
    assert_eq!(json["rows"][0]["advance_payment"], 500);
}

#[tokio::test]
async fn test_order_overview_report_type() {
    let seed = setup().await;
    let branch = Some(seed.branch_id);

    send(
        &seed.app,
        "POST",
        "/api/v1/orders",
        branch,
        Some(order_body(&seed, "0314OVR1", 0)),
    )
    .await;

    let (status, json) = send(
        &seed.app,
        "GET",
        &format!("/api/v1/reports/orders/overview?report_type=weekly&date={DAY}"),
        branch,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["overview"]["pending"]["count"], 1);
    assert_eq!(json["overview"]["total"]["amount"], 10_000);

    let (status, json) = send(
        &seed.app,
        "GET",
        "/api/v1/reports/orders/overview?report_type=hourly",
        branch,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], true);
}

#[tokio::test]
async fn test_transactions_listing() {
    let seed = setup().await;
    let branch = Some(seed.branch_id);

    send(
        &seed.app,
        "POST",
        "/api/v1/orders",
        branch,
        Some(order_body(&seed, "0314TRX1", 4_000)),
    )
    .await;

    let (status, json) = send(
        &seed.app,
        "GET",
        &format!("/api/v1/transactions?start_date={DAY}&end_date={DAY}&transaction_type=Advance%20Payment"),
        branch,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_count"], 1);
    assert_eq!(json["transactions"][0]["memo_no"], "ORDER-0314TRX1");

    let (status, json) = send(
        &seed.app,
        "GET",
        &format!("/api/v1/transactions/summary?start_date={DAY}&end_date={DAY}"),
        branch,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["summary"][0]["amount"], 4_000);
}

#[tokio::test]
async fn test_legacy_paging_names() {
    let seed = setup().await;
    let branch = Some(seed.branch_id);

    for memo in ["0314PG01", "0314PG02"] {
        send(&seed.app, "POST", "/api/v1/orders", branch, Some(order_body(&seed, memo, 1_000))).await;
    }

    let (status, json) = send(
        &seed.app,
        "GET",
        "/api/v1/orders?status=all&pageIndex=1&pageLength=1",
        branch,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_count"], 2);
    assert_eq!(json["page"], 1);
    assert_eq!(json["orders"].as_array().unwrap().len(), 1);

    let (_, json) = send(&seed.app, "GET", "/api/v1/sales?pageIndex=0&pageLength=5", branch, None).await;
    assert_eq!(json["page"], 0);
    assert_eq!(json["total_count"], 0);
}

#[tokio::test]
async fn test_order_without_advance_over_http() {
    let seed = setup().await;
    let branch = Some(seed.branch_id);

    let mut body = order_body(&seed, "0314NOAD", 0);
    body.as_object_mut().unwrap().remove("payment_account_id");
    let (status, json) = send(&seed.app, "POST", "/api/v1/orders", branch, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(cash_balance(&seed).await, 100_000);

    let order_id = json["order_id"].as_i64().unwrap();
    let (_, json) = send(&seed.app, "GET", &format!("/api/v1/orders/{order_id}"), branch, None).await;
    assert_eq!(json["order"]["payment_account_id"], 0);
    assert_eq!(json["order"]["due_amount"], 10_000);

    // Money received still needs an account
    let mut body = order_body(&seed, "0314NOAC", 500);
    body.as_object_mut().unwrap().remove("payment_account_id");
    let (status, _) = send(&seed.app, "POST", "/api/v1/orders", branch, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_customer_directory() {
    let seed = setup().await;
    let branch = Some(seed.branch_id);

    let (status, json) = send(
        &seed.app,
        "POST",
        "/api/v1/customers",
        branch,
        Some(json!({ "name": "  Karim ", "mobile": "01799999999" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["customer"]["name"], "Karim");
    let karim_id = json["customer"]["id"].as_i64().unwrap();

    let (status, _) = send(&seed.app, "POST", "/api/v1/customers", branch, Some(json!({ "name": " " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, json) = send(&seed.app, "GET", "/api/v1/customers?search=0179", branch, None).await;
    assert_eq!(json["total_count"], 1);
    assert_eq!(json["customers"][0]["id"], karim_id);

    let (_, json) = send(&seed.app, "GET", "/api/v1/customers?limit=1", branch, None).await;
    assert_eq!(json["total_count"], 2);
    assert_eq!(json["customers"].as_array().unwrap().len(), 1);

    // Rahim owes 6,000 after a partly paid order
    send(&seed.app, "POST", "/api/v1/orders", branch, Some(order_body(&seed, "0314DUE1", 4_000))).await;
    let (status, json) = send(&seed.app, "GET", "/api/v1/customers/with-due", branch, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_count"], 1);
    assert_eq!(json["customers"][0]["id"], seed.customer_id);
    assert_eq!(json["customers"][0]["due_amount"], 6_000);

    let (_, json) = send(&seed.app, "GET", "/api/v1/customers/filter?name=kar", branch, None).await;
    assert_eq!(json["customers"].as_array().unwrap().len(), 1);
    assert_eq!(json["customers"][0]["name"], "Karim");

    let (status, json) = send(
        &seed.app,
        "PATCH",
        &format!("/api/v1/customers/{}", seed.customer_id),
        branch,
        Some(json!({ "name": "Rahim Uddin", "mobile": "01700000001" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["customer"]["name"], "Rahim Uddin");
    assert_eq!(json["customer"]["due_amount"], 6_000);

    let (status, json) = send(
        &seed.app,
        "GET",
        &format!("/api/v1/customers/{}", seed.customer_id),
        branch,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["customer"]["mobile"], "01700000001");

    // Another branch cannot see the customer
    let (status, _) = send(
        &seed.app,
        "GET",
        &format!("/api/v1/customers/{}", seed.customer_id),
        Some(seed.branch_id + 1),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_supplier_crud() {
    let seed = setup().await;
    let branch = Some(seed.branch_id);

    let (status, json) = send(
        &seed.app,
        "POST",
        "/api/v1/suppliers",
        branch,
        Some(json!({ "name": "Button Mart", "mobile": "01811111111" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let spare_id = json["supplier"]["id"].as_i64().unwrap();

    let (_, json) = send(&seed.app, "GET", "/api/v1/suppliers", branch, None).await;
    assert_eq!(json["total_count"], 2);
    assert_eq!(json["suppliers"][0]["name"], "Button Mart");

    let (status, json) = send(
        &seed.app,
        "PATCH",
        &format!("/api/v1/suppliers/{spare_id}"),
        branch,
        Some(json!({ "name": "Button Mart Ltd", "mobile": "01811111111" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["supplier"]["name"], "Button Mart Ltd");

    let (status, _) = send(&seed.app, "DELETE", &format!("/api/v1/suppliers/{spare_id}"), branch, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&seed.app, "GET", &format!("/api/v1/suppliers/{spare_id}"), branch, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A supplier with purchases stays
    send(
        &seed.app,
        "POST",
        "/api/v1/purchases",
        branch,
        Some(json!({
            "memo_no": "0314PUR9",
            "purchase_date": DAY,
            "supplier_id": seed.supplier_id,
            "total_amount": 2_000,
            "notes": null
        })),
    )
    .await;
    let (status, json) = send(
        &seed.app,
        "DELETE",
        &format!("/api/v1/suppliers/{}", seed.supplier_id),
        branch,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], true);
}

#[tokio::test]
async fn test_employee_directory() {
    let seed = setup().await;
    let branch = Some(seed.branch_id);

    let (status, json) = send(
        &seed.app,
        "POST",
        "/api/v1/employees",
        branch,
        Some(json!({
            "name": "Nila",
            "role": "salesperson",
            "mobile": "01744444444",
            "base_salary": 1_400_000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let nila_id = json["employee"]["id"].as_i64().unwrap();

    let (_, json) = send(&seed.app, "GET", "/api/v1/employees?role=salesperson", branch, None).await;
    assert_eq!(json["total_count"], 2);

    let (_, json) = send(&seed.app, "GET", "/api/v1/employees?pageIndex=1&pageLength=2", branch, None).await;
    assert_eq!(json["total_count"], 3);
    assert_eq!(json["page"], 1);
    assert_eq!(json["employees"].as_array().unwrap().len(), 1);

    let (status, json) = send(
        &seed.app,
        "PATCH",
        &format!("/api/v1/employees/{nila_id}"),
        branch,
        Some(json!({ "name": "Nila Akter", "role": "manager", "base_salary": 2_000_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["employee"]["role"], "manager");
    assert_eq!(json["employee"]["base_salary"], 2_000_000);

    let (status, _) = send(
        &seed.app,
        "PATCH",
        &format!("/api/v1/employees/{nila_id}"),
        branch,
        Some(json!({ "name": "Nila", "role": "manager", "base_salary": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&seed.app, "DELETE", &format!("/api/v1/employees/{nila_id}"), branch, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&seed.app, "GET", &format!("/api/v1/employees/{nila_id}"), branch, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The salesperson on an order cannot be removed
    send(&seed.app, "POST", "/api/v1/orders", branch, Some(order_body(&seed, "0314EMP1", 1_000))).await;
    let (status, _) = send(
        &seed.app,
        "DELETE",
        &format!("/api/v1/employees/{}", seed.salesperson_id),
        branch,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
