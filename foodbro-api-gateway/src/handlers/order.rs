use axum::{
    Router,
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
    routing::{get, patch, post},
};
use foodbro_proto::order_service::{
    CreateOrderPayload, GetOrderPayload, ListOrdersPayload, Order, OrderState, PaymentState,
    UpdateOrderStatusPayload,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::*;

use super::{AppState, authenticate, require_admin};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/mine", get(list_my_orders))
        .route("/orders/restaurant", get(list_restaurant_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", patch(update_order_status))
}

fn state_str(state: i32) -> &'static str {
    match OrderState::try_from(state) {
        Ok(OrderState::Pending) => "pending",
        Ok(OrderState::Confirmed) => "confirmed",
        Ok(OrderState::Preparing) => "preparing",
        Ok(OrderState::OutForDelivery) => "out_for_delivery",
        Ok(OrderState::Delivered) => "delivered",
        Ok(OrderState::Cancelled) => "cancelled",
        Err(_) => "unknown",
    }
}

fn parse_state(status: &str) -> Option<OrderState> {
    match status {
        "pending" => Some(OrderState::Pending),
        "confirmed" => Some(OrderState::Confirmed),
        "preparing" => Some(OrderState::Preparing),
        "out_for_delivery" => Some(OrderState::OutForDelivery),
        "delivered" => Some(OrderState::Delivered),
        "cancelled" => Some(OrderState::Cancelled),
        _ => None,
    }
}

fn payment_state_str(state: i32) -> &'static str {
    match PaymentState::try_from(state) {
        Ok(PaymentState::PaymentPending) => "pending",
        Ok(PaymentState::Paid) => "paid",
        Err(_) => "unknown",
    }
}

fn order_response(order: Order) -> OrderResponse {
    OrderResponse {
        id: order.id,
        user_id: order.user_id,
        restaurant_id: order.restaurant_id,
        status: state_str(order.state).to_string(),
        payment_status: payment_state_str(order.payment_state).to_string(),
        line_items: order
            .line_items
            .into_iter()
            .map(|line| OrderLineResponse {
                menu_item_id: line.menu_item_id,
                name: line.name,
                quantity: line.quantity,
                unit_price: line.unit_price.map(|m| m.amount).unwrap_or_default(),
                line_total: line.line_total.map(|m| m.amount).unwrap_or_default(),
            })
            .collect(),
        subtotal: order.subtotal.map(|m| m.amount).unwrap_or_default(),
        tax: order.tax.map(|m| m.amount).unwrap_or_default(),
        delivery_fee: order.delivery_fee.map(|m| m.amount).unwrap_or_default(),
        total_amount: order.total_amount.map(|m| m.amount).unwrap_or_default(),
        delivery_address: order.delivery_address,
        created_at: order
            .created_at
            .and_then(|ts| chrono::DateTime::from_timestamp(ts.seconds, ts.nanos as u32)),
    }
}

#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order placed", body = OrderResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 409, description = "Empty or cross-restaurant cart", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "orders"
)]
#[instrument(skip(state))]
pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    let principal = authenticate(&headers, &mut auth_client).await?;

    let mut order_client = state.order_client.clone();
    let response = order_client
        .create_order(tonic::Request::new(CreateOrderPayload {
            user_id: principal.user_id.to_string(),
            delivery_address: payload.delivery_address,
        }))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(order_response(response.into_inner())))
}

#[utoipa::path(
    get,
    path = "/orders/mine",
    responses(
        (status = 200, description = "The caller's orders, newest first", body = [OrderResponse]),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "orders"
)]
#[instrument(skip(state))]
pub async fn list_my_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    let principal = authenticate(&headers, &mut auth_client).await?;

    let mut order_client = state.order_client.clone();
    let response = order_client
        .list_orders(tonic::Request::new(ListOrdersPayload {
            user_id: Some(principal.user_id.to_string()),
            restaurant_id: None,
        }))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(
        response
            .into_inner()
            .orders
            .into_iter()
            .map(order_response)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/orders/restaurant",
    responses(
        (status = 200, description = "The restaurant's orders, newest first", body = [OrderResponse]),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Caller is not a restaurant administrator", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "orders"
)]
#[instrument(skip(state))]
pub async fn list_restaurant_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    let principal = require_admin(&headers, &mut auth_client).await?;

    let mut order_client = state.order_client.clone();
    let response = order_client
        .list_orders(tonic::Request::new(ListOrdersPayload {
            user_id: None,
            restaurant_id: Some(principal.user_id.to_string()),
        }))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(
        response
            .into_inner()
            .orders
            .into_iter()
            .map(order_response)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    responses(
        (status = 200, description = "Order details", body = OrderResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Order belongs to someone else", body = ApiErrorResponse),
        (status = 404, description = "Order not found", body = ApiErrorResponse),
    ),
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    security(
        ("bearer" = [])
    ),
    tag = "orders"
)]
#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    let principal = authenticate(&headers, &mut auth_client).await?;

    let mut order_client = state.order_client.clone();
    let response = order_client
        .get_order(tonic::Request::new(GetOrderPayload {
            id: order_id.to_string(),
        }))
        .await
        .map_err(ApiError::from)?;

    let order = response.into_inner();

    // Readable by the ordering user and the fulfilling restaurant only.
    let caller = principal.user_id.to_string();
    if order.user_id != caller && order.restaurant_id != caller {
        return Err(ApiError::Forbidden);
    }

    Ok(Json(order_response(order)))
}

#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Updated order", body = OrderResponse),
        (status = 400, description = "Unknown status value", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Caller is not the fulfilling restaurant", body = ApiErrorResponse),
        (status = 404, description = "Order not found", body = ApiErrorResponse),
        (status = 409, description = "Illegal status transition", body = ApiErrorResponse),
    ),
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    security(
        ("bearer" = [])
    ),
    tag = "orders"
)]
#[instrument(skip(state))]
pub async fn update_order_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    let principal = require_admin(&headers, &mut auth_client).await?;

    let new_state = parse_state(&payload.status)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown status {:?}", payload.status)))?;

    let mut order_client = state.order_client.clone();
    let response = order_client
        .update_order_status(tonic::Request::new(UpdateOrderStatusPayload {
            id: order_id.to_string(),
            restaurant_id: principal.user_id.to_string(),
            state: new_state.into(),
        }))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(order_response(response.into_inner())))
}
