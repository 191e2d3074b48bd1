use axum::{
    Router,
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
    routing::{get, patch, post},
};
use foodbro_proto::order_service::{
    AddCartItemPayload, Cart, ClearCartPayload, GetCartPayload, RemoveCartItemPayload,
    UpdateCartItemPayload,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::*;

use super::{AppState, authenticate};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart", get(get_cart).delete(clear_cart))
        .route("/cart/items", post(add_cart_item))
        .route(
            "/cart/items/{menu_item_id}",
            patch(update_cart_item).delete(remove_cart_item),
        )
}

fn cart_response(cart: Cart) -> CartResponse {
    CartResponse {
        user_id: cart.user_id,
        line_items: cart
            .line_items
            .into_iter()
            .map(|line| CartLineResponse {
                menu_item_id: line.menu_item_id,
                name: line.name,
                quantity: line.quantity,
                unit_price: line.unit_price.map(|m| m.amount).unwrap_or_default(),
                line_total: line.line_total.map(|m| m.amount).unwrap_or_default(),
            })
            .collect(),
        total_price: cart.total_price.map(|m| m.amount).unwrap_or_default(),
    }
}

#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "The caller's cart, possibly empty", body = CartResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "cart"
)]
#[instrument(skip(state))]
pub async fn get_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CartResponse>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    let principal = authenticate(&headers, &mut auth_client).await?;

    let mut order_client = state.order_client.clone();
    let response = order_client
        .get_cart(tonic::Request::new(GetCartPayload {
            user_id: principal.user_id.to_string(),
        }))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(cart_response(response.into_inner())))
}

#[utoipa::path(
    post,
    path = "/cart/items",
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 400, description = "Invalid quantity", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Menu item not found", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "cart"
)]
#[instrument(skip(state))]
pub async fn add_cart_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<AddCartItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    let principal = authenticate(&headers, &mut auth_client).await?;

    let mut order_client = state.order_client.clone();
    let response = order_client
        .add_cart_item(tonic::Request::new(AddCartItemPayload {
            user_id: principal.user_id.to_string(),
            menu_item_id: payload.menu_item_id.to_string(),
            quantity: payload.quantity,
        }))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(cart_response(response.into_inner())))
}

#[utoipa::path(
    patch,
    path = "/cart/items/{menu_item_id}",
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 400, description = "Invalid quantity", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Cart or line not found", body = ApiErrorResponse),
    ),
    params(
        ("menu_item_id" = Uuid, Path, description = "Menu item the line refers to")
    ),
    security(
        ("bearer" = [])
    ),
    tag = "cart"
)]
#[instrument(skip(state))]
pub async fn update_cart_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(menu_item_id): Path<Uuid>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    let principal = authenticate(&headers, &mut auth_client).await?;

    let mut order_client = state.order_client.clone();
    let response = order_client
        .update_cart_item(tonic::Request::new(UpdateCartItemPayload {
            user_id: principal.user_id.to_string(),
            menu_item_id: menu_item_id.to_string(),
            quantity: payload.quantity,
        }))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(cart_response(response.into_inner())))
}

#[utoipa::path(
    delete,
    path = "/cart/items/{menu_item_id}",
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Cart or line not found", body = ApiErrorResponse),
    ),
    params(
        ("menu_item_id" = Uuid, Path, description = "Menu item the line refers to")
    ),
    security(
        ("bearer" = [])
    ),
    tag = "cart"
)]
#[instrument(skip(state))]
pub async fn remove_cart_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(menu_item_id): Path<Uuid>,
) -> Result<Json<CartResponse>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    let principal = authenticate(&headers, &mut auth_client).await?;

    let mut order_client = state.order_client.clone();
    let response = order_client
        .remove_cart_item(tonic::Request::new(RemoveCartItemPayload {
            user_id: principal.user_id.to_string(),
            menu_item_id: menu_item_id.to_string(),
        }))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(cart_response(response.into_inner())))
}

#[utoipa::path(
    delete,
    path = "/cart",
    responses(
        (status = 200, description = "Emptied cart", body = CartResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Cart not found", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "cart"
)]
#[instrument(skip(state))]
pub async fn clear_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CartResponse>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    let principal = authenticate(&headers, &mut auth_client).await?;

    let mut order_client = state.order_client.clone();
    let response = order_client
        .clear_cart(tonic::Request::new(ClearCartPayload {
            user_id: principal.user_id.to_string(),
        }))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(cart_response(response.into_inner())))
}
