use axum::{
    Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Json,
    routing::{get, post},
};
use foodbro_proto::common::Money;
use foodbro_proto::restaurant_service::{
    CreateMenuItemPayload, DeleteMenuItemPayload, GetMenuItemPayload, ListMenuItemsPayload,
    MenuItem, UpdateMenuItemPayload,
};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::*;

use super::{AppState, authenticate, require_admin};

#[derive(Debug, Deserialize)]
pub struct MenuListQuery {
    pub search: Option<String>,
    pub max_price: Option<String>,
    pub min_rating: Option<f32>,
    pub min_discount: Option<f32>,
    pub veg_only: Option<bool>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/restaurants/{restaurant_id}/menu", get(list_menu_items))
        .route("/menu", post(create_menu_item))
        .route(
            "/menu/{id}",
            get(get_menu_item)
                .patch(update_menu_item)
                .delete(delete_menu_item),
        )
}

fn menu_item_response(item: MenuItem) -> MenuItemResponse {
    MenuItemResponse {
        id: item.id,
        restaurant_id: item.restaurant_id,
        name: item.name,
        description: item.description,
        category: item.category,
        price: item.price.map(|m| m.amount).unwrap_or_default(),
        available_qty: item.available_qty,
        discount_percentage: item.discount_percentage,
        vegetarian: item.vegetarian,
        rating: item.rating,
        image_url: item.image_url,
    }
}

#[utoipa::path(
    get,
    path = "/restaurants/{restaurant_id}/menu",
    responses(
        (status = 200, description = "Menu items matching the filters", body = [MenuItemResponse]),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    params(
        ("restaurant_id" = Uuid, Path, description = "Restaurant to browse"),
        ("search" = Option<String>, Query, description = "Substring match over name, description and category"),
        ("max_price" = Option<String>, Query, description = "Upper price bound as a decimal string"),
        ("min_rating" = Option<f32>, Query, description = "Lower rating bound"),
        ("min_discount" = Option<f32>, Query, description = "Lower discount-percentage bound"),
        ("veg_only" = Option<bool>, Query, description = "Only vegetarian items"),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "menu"
)]
#[instrument(skip(state))]
pub async fn list_menu_items(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(restaurant_id): Path<Uuid>,
    Query(query): Query<MenuListQuery>,
) -> Result<Json<Vec<MenuItemResponse>>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    authenticate(&headers, &mut auth_client).await?;

    let mut restaurant_client = state.restaurant_client.clone();
    let response = restaurant_client
        .list_menu_items(tonic::Request::new(ListMenuItemsPayload {
            restaurant_id: restaurant_id.to_string(),
            search: query.search,
            max_price: query.max_price.map(|amount| Money { amount }),
            min_rating: query.min_rating,
            min_discount: query.min_discount,
            veg_only: query.veg_only,
        }))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(
        response
            .into_inner()
            .items
            .into_iter()
            .map(menu_item_response)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/menu/{id}",
    responses(
        (status = 200, description = "Menu item details", body = MenuItemResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Menu item not found", body = ApiErrorResponse),
    ),
    params(
        ("id" = Uuid, Path, description = "Menu item ID")
    ),
    security(
        ("bearer" = [])
    ),
    tag = "menu"
)]
#[instrument(skip(state))]
pub async fn get_menu_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<MenuItemResponse>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    authenticate(&headers, &mut auth_client).await?;

    let mut restaurant_client = state.restaurant_client.clone();
    let response = restaurant_client
        .get_menu_item(tonic::Request::new(GetMenuItemPayload {
            id: id.to_string(),
        }))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(menu_item_response(response.into_inner())))
}

#[utoipa::path(
    post,
    path = "/menu",
    request_body = CreateMenuItemRequest,
    responses(
        (status = 200, description = "Created menu item", body = MenuItemResponse),
        (status = 400, description = "Invalid field", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Caller is not a restaurant administrator", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "menu"
)]
#[instrument(skip(state))]
pub async fn create_menu_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateMenuItemRequest>,
) -> Result<Json<MenuItemResponse>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    let principal = require_admin(&headers, &mut auth_client).await?;

    let mut restaurant_client = state.restaurant_client.clone();
    let response = restaurant_client
        .create_menu_item(tonic::Request::new(CreateMenuItemPayload {
            restaurant_id: principal.user_id.to_string(),
            name: payload.name,
            description: payload.description,
            category: payload.category,
            price: Some(Money {
                amount: payload.price,
            }),
            available_qty: payload.available_qty,
            discount_percentage: payload.discount_percentage,
            vegetarian: payload.vegetarian,
            image_url: payload.image_url,
        }))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(menu_item_response(response.into_inner())))
}

#[utoipa::path(
    patch,
    path = "/menu/{id}",
    request_body = UpdateMenuItemRequest,
    responses(
        (status = 200, description = "Updated menu item", body = MenuItemResponse),
        (status = 400, description = "Invalid field", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Item belongs to another restaurant", body = ApiErrorResponse),
        (status = 404, description = "Menu item not found", body = ApiErrorResponse),
    ),
    params(
        ("id" = Uuid, Path, description = "Menu item ID")
    ),
    security(
        ("bearer" = [])
    ),
    tag = "menu"
)]
#[instrument(skip(state))]
pub async fn update_menu_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMenuItemRequest>,
) -> Result<Json<MenuItemResponse>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    let principal = require_admin(&headers, &mut auth_client).await?;

    let mut restaurant_client = state.restaurant_client.clone();
    let response = restaurant_client
        .update_menu_item(tonic::Request::new(UpdateMenuItemPayload {
            id: id.to_string(),
            restaurant_id: principal.user_id.to_string(),
            name: payload.name,
            description: payload.description,
            category: payload.category,
            price: payload.price.map(|amount| Money { amount }),
            available_qty: payload.available_qty,
            discount_percentage: payload.discount_percentage,
            vegetarian: payload.vegetarian,
            image_url: payload.image_url,
        }))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(menu_item_response(response.into_inner())))
}

#[utoipa::path(
    delete,
    path = "/menu/{id}",
    responses(
        (status = 200, description = "Menu item deleted", body = DeleteMenuItemResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Item belongs to another restaurant", body = ApiErrorResponse),
        (status = 404, description = "Menu item not found", body = ApiErrorResponse),
    ),
    params(
        ("id" = Uuid, Path, description = "Menu item ID")
    ),
    security(
        ("bearer" = [])
    ),
    tag = "menu"
)]
#[instrument(skip(state))]
pub async fn delete_menu_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteMenuItemResponse>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    let principal = require_admin(&headers, &mut auth_client).await?;

    let mut restaurant_client = state.restaurant_client.clone();
    restaurant_client
        .delete_menu_item(tonic::Request::new(DeleteMenuItemPayload {
            id: id.to_string(),
            restaurant_id: principal.user_id.to_string(),
        }))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(DeleteMenuItemResponse {
        message: "Menu item deleted successfully".to_string(),
    }))
}
