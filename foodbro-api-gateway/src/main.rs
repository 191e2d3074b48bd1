use axum::Router;
use dotenvy::dotenv;
use foodbro_proto::{
    auth_service::auth_service_client::AuthServiceClient,
    order_service::order_service_client::OrderServiceClient,
    restaurant_service::restaurant_service_client::RestaurantServiceClient,
};
use tower_http::cors::CorsLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod error;
mod handlers;
mod models;

use handlers::{ApiDoc, AppState, cart_router, menu_router, order_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let auth_service_endpoint =
        std::env::var("AUTH_SERVICE_ENDPOINT").expect("AUTH_SERVICE_ENDPOINT required");
    let restaurant_service_endpoint =
        std::env::var("RESTAURANT_SERVICE_ENDPOINT").expect("RESTAURANT_SERVICE_ENDPOINT required");
    let order_service_endpoint =
        std::env::var("ORDER_SERVICE_ENDPOINT").expect("ORDER_SERVICE_ENDPOINT required");

    let auth_client = AuthServiceClient::connect(auth_service_endpoint).await?;
    let restaurant_client = RestaurantServiceClient::connect(restaurant_service_endpoint).await?;
    let order_client = OrderServiceClient::connect(order_service_endpoint).await?;

    let state = AppState {
        auth_client,
        restaurant_client,
        order_client,
    };

    let app = Router::new()
        .merge(cart_router())
        .merge(order_router())
        .merge(menu_router())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(CorsLayer::permissive());

    let listen_addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8100".to_string());
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!("API Gateway listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
