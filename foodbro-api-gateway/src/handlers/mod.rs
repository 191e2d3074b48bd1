pub mod cart;
pub mod menu;
pub mod order;

// Re-export routers for easier importing
pub use cart::router as cart_router;
pub use menu::router as menu_router;
pub use order::router as order_router;

use axum::http::HeaderMap;
use foodbro_proto::auth_service::{
    auth_service_client::AuthServiceClient, GetTokenInfoPayload, UserRole,
};
use foodbro_proto::order_service::order_service_client::OrderServiceClient;
use foodbro_proto::restaurant_service::restaurant_service_client::RestaurantServiceClient;
use tonic::transport::Channel;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub auth_client: AuthServiceClient<Channel>,
    pub restaurant_client: RestaurantServiceClient<Channel>,
    pub order_client: OrderServiceClient<Channel>,
}

/// Verified caller identity, as reported by the auth service.
pub struct Principal {
    pub user_id: Uuid,
    pub role: UserRole,
}

async fn authenticate(
    headers: &HeaderMap,
    auth_client: &mut AuthServiceClient<Channel>,
) -> Result<Principal, ApiError> {
    let auth_header = headers
        .get("authorization")
        .ok_or(ApiError::AuthenticationFailed)?
        .to_str()
        .map_err(|_| ApiError::InvalidToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::InvalidToken)?;

    let request = tonic::Request::new(GetTokenInfoPayload {
        token: token.to_string(),
    });

    let response = auth_client
        .get_token_info(request)
        .await
        .map_err(|_| ApiError::InvalidToken)?;

    let info = response.into_inner();
    let role = UserRole::try_from(info.role).map_err(|_| ApiError::InvalidToken)?;
    let user_id = info.user_id.parse().map_err(|_| ApiError::InvalidToken)?;

    Ok(Principal { user_id, role })
}

/// Admin-only routes: the caller's account id doubles as the restaurant id.
async fn require_admin(
    headers: &HeaderMap,
    auth_client: &mut AuthServiceClient<Channel>,
) -> Result<Principal, ApiError> {
    let principal = authenticate(headers, auth_client).await?;
    if principal.role != UserRole::Admin {
        return Err(ApiError::Forbidden);
    }
    Ok(principal)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        cart::get_cart,
        cart::add_cart_item,
        cart::update_cart_item,
        cart::remove_cart_item,
        cart::clear_cart,
        order::create_order,
        order::list_my_orders,
        order::list_restaurant_orders,
        order::get_order,
        order::update_order_status,
        menu::list_menu_items,
        menu::get_menu_item,
        menu::create_menu_item,
        menu::update_menu_item,
        menu::delete_menu_item,
    ),
    components(
        schemas(
            crate::models::AddCartItemRequest,
            crate::models::UpdateCartItemRequest,
            crate::models::CartLineResponse,
            crate::models::CartResponse,
            crate::models::CreateOrderRequest,
            crate::models::OrderLineResponse,
            crate::models::OrderResponse,
            crate::models::UpdateOrderStatusRequest,
            crate::models::CreateMenuItemRequest,
            crate::models::UpdateMenuItemRequest,
            crate::models::MenuItemResponse,
            crate::models::DeleteMenuItemResponse,
            crate::models::ApiErrorResponse,
        )
    ),
    tags(
        (name = "cart", description = "Shopping cart"),
        (name = "orders", description = "Order placement and fulfillment"),
        (name = "menu", description = "Restaurant menu management"),
    )
)]
pub struct ApiDoc;
