use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    /// Menu item to add to the cart
    pub menu_item_id: Uuid,
    /// Number of units to add (must be positive)
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    /// New quantity for the line (must be positive)
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineResponse {
    pub menu_item_id: String,
    pub name: String,
    pub quantity: i32,
    /// Unit price as a decimal string
    pub unit_price: String,
    /// Line total (unit price × quantity) as a decimal string
    pub line_total: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub user_id: String,
    pub line_items: Vec<CartLineResponse>,
    /// Sum of all line totals at current menu prices
    pub total_price: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    /// Address the order should be delivered to
    pub delivery_address: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLineResponse {
    pub menu_item_id: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: String,
    pub user_id: String,
    pub restaurant_id: String,
    /// One of: pending, confirmed, preparing, out_for_delivery, delivered, cancelled
    pub status: String,
    /// One of: pending, paid
    pub payment_status: String,
    pub line_items: Vec<OrderLineResponse>,
    pub subtotal: String,
    pub tax: String,
    pub delivery_fee: String,
    pub total_amount: String,
    pub delivery_address: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    /// Target status; must be a legal transition from the current one
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateMenuItemRequest {
    pub name: String,
    pub description: String,
    pub category: String,
    /// Unit price as a decimal string
    pub price: String,
    pub available_qty: i32,
    #[serde(default)]
    pub discount_percentage: f32,
    #[serde(default)]
    pub vegetarian: bool,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateMenuItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Unit price as a decimal string
    pub price: Option<String>,
    pub available_qty: Option<i32>,
    pub discount_percentage: Option<f32>,
    pub vegetarian: Option<bool>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuItemResponse {
    pub id: String,
    pub restaurant_id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: String,
    pub available_qty: i32,
    pub discount_percentage: f32,
    pub vegetarian: bool,
    pub rating: f32,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteMenuItemResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Error message
    pub error: String,
}
