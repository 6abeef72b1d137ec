//! Order endpoints.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use branchbook_core::validation::validate_search_query;
use branchbook_core::{Money, NewOrder, OrderDelivery, OrderStatus};
use branchbook_db::{OrderDetails, OrderQuery, OrderSummary};

use crate::error::ApiError;
use crate::extract::BranchId;
use crate::response::{Empty, Success};
use crate::routes::page_request;
use crate::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct OrderListParams {
    #[serde(alias = "pageIndex")]
    pub page: Option<i64>,
    #[serde(alias = "pageLength")]
    pub limit: Option<i64>,
    pub search: Option<String>,
    /// `all` (or absent) disables the status filter.
    pub status: Option<String>,
}

impl OrderListParams {
    fn status(&self) -> Result<Option<OrderStatus>, ApiError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => Ok(None),
            Some(raw) => Ok(Some(raw.parse::<OrderStatus>()?)),
        }
    }
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct OrderCreated {
    pub order_id: i64,
    pub memo_no: String,
}

#[derive(Debug, Serialize)]
pub struct OrderList {
    pub orders: Vec<OrderSummary>,
    pub total_count: i64,
    pub page: i64,
}

#[derive(Debug, Serialize)]
pub struct OrderView {
    pub order: OrderDetails,
}

#[derive(Debug, Serialize)]
pub struct DeliveryRecorded {
    pub order_status: OrderStatus,
    pub delivered_items: i64,
    pub remaining_items: i64,
    pub received_amount: Money,
    pub due_amount: Money,
}

// -- Handlers --

/// POST /orders
#[tracing::instrument(skip(state, order))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Json(order): Json<NewOrder>,
) -> Result<(StatusCode, Json<Success<OrderCreated>>), ApiError> {
    let created = state.db.orders().create(branch_id, &order).await?;
    Ok(Success::new(
        "Order added successfully",
        OrderCreated {
            order_id: created.id,
            memo_no: created.memo_no,
        },
    )
    .with_status(StatusCode::CREATED))
}

/// GET /orders
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Query(params): Query<OrderListParams>,
) -> Result<Success<OrderList>, ApiError> {
    let query = OrderQuery {
        search: validate_search_query(params.search.as_deref())?,
        status: params.status()?,
        page: page_request(&state, params.page, params.limit),
    };
    let page = state.db.orders().list(branch_id, &query).await?;
    Ok(Success::new(
        "Orders retrieved successfully",
        OrderList {
            orders: page.rows,
            total_count: page.total_count,
            page: query.page.page,
        },
    ))
}

/// GET /orders/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Path(order_id): Path<i64>,
) -> Result<Success<OrderView>, ApiError> {
    let order = state.db.orders().get_details(branch_id, order_id).await?;
    Ok(Success::new("Order retrieved successfully", OrderView { order }))
}

/// PATCH /orders/{id}
#[tracing::instrument(skip(state, order))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Path(order_id): Path<i64>,
    Json(order): Json<NewOrder>,
) -> Result<Success<Empty>, ApiError> {
    state.db.orders().update(branch_id, order_id, &order).await?;
    Ok(Success::message("Order updated successfully"))
}

/// POST /orders/{id}/deliveries
#[tracing::instrument(skip(state, delivery))]
pub async fn deliver(
    State(state): State<Arc<AppState>>,
    BranchId(branch_id): BranchId,
    Path(order_id): Path<i64>,
    Json(delivery): Json<OrderDelivery>,
) -> Result<(StatusCode, Json<Success<DeliveryRecorded>>), ApiError> {
    let plan = state
        .db
        .orders()
        .record_delivery(branch_id, order_id, &delivery)
        .await?;
    Ok(Success::new(
        "Delivery recorded successfully",
        DeliveryRecorded {
            order_status: plan.status,
            delivered_items: plan.delivered_items,
            remaining_items: plan.remaining_items,
            received_amount: plan.received_amount,
            due_amount: plan.due_after,
        },
    )
    .with_status(StatusCode::CREATED))
}
