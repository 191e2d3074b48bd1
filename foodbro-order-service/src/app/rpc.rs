use diesel::prelude::*;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tonic::transport::Server;
use tonic::{Request, Response, Status};
use uuid::Uuid;

use foodbro_proto::order_service::order_service_server::{OrderService, OrderServiceServer};
use foodbro_proto::order_service::{
    AddCartItemPayload, Cart, ClearCartPayload, CreateOrderPayload, GetCartPayload,
    GetOrderPayload, ListOrdersPayload, ListOrdersResponse, Order, OrderState as ProtoOrderState,
    RemoveCartItemPayload, UpdateCartItemPayload, UpdateOrderStatusPayload,
};

use foodbro_order_service::cart::{self, CartError};
use foodbro_order_service::checkout::{self, CheckoutError};
use foodbro_order_service::serializer::{serialize_cart, serialize_order};
use foodbro_order_service::{establish_connection, models, schema};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

#[derive(Default)]
pub struct OrderServiceImpl {}

fn parse_uuid(value: &str, what: &str) -> Result<Uuid, Status> {
    value
        .parse::<Uuid>()
        .map_err(|_| Status::invalid_argument(format!("Invalid {}", what)))
}

fn cart_error_status(err: CartError) -> Status {
    match err {
        CartError::InvalidQuantity | CartError::ExceedsAvailableQty => {
            Status::invalid_argument(err.to_string())
        }
        CartError::MenuItemNotFound | CartError::CartNotFound | CartError::LineNotFound => {
            Status::not_found(err.to_string())
        }
        CartError::Database(_) => Status::internal("Internal server error"),
    }
}

fn checkout_error_status(err: CheckoutError) -> Status {
    match err {
        CheckoutError::CartEmpty
        | CheckoutError::MixedRestaurants
        | CheckoutError::InvalidTransition { .. } => Status::failed_precondition(err.to_string()),
        CheckoutError::MenuItemNotFound | CheckoutError::OrderNotFound => {
            Status::not_found(err.to_string())
        }
        CheckoutError::NotOrderOwner => Status::permission_denied(err.to_string()),
        CheckoutError::Database(_) => Status::internal("Internal server error"),
    }
}

#[tonic::async_trait]
impl OrderService for OrderServiceImpl {
    async fn get_cart(&self, request: Request<GetCartPayload>) -> Result<Response<Cart>, Status> {
        let payload = request.into_inner();
        let user_id = parse_uuid(&payload.user_id, "user id")?;

        let conn = &mut establish_connection();
        let view = cart::get_cart(user_id, conn).map_err(cart_error_status)?;

        Ok(Response::new(serialize_cart(&view)))
    }

    async fn add_cart_item(
        &self,
        request: Request<AddCartItemPayload>,
    ) -> Result<Response<Cart>, Status> {
        let payload = request.into_inner();
        let user_id = parse_uuid(&payload.user_id, "user id")?;
        let menu_item_id = parse_uuid(&payload.menu_item_id, "menu item id")?;

        let conn = &mut establish_connection();
        let view = cart::add_item(user_id, menu_item_id, payload.quantity, conn)
            .map_err(cart_error_status)?;

        Ok(Response::new(serialize_cart(&view)))
    }

    async fn update_cart_item(
        &self,
        request: Request<UpdateCartItemPayload>,
    ) -> Result<Response<Cart>, Status> {
        let payload = request.into_inner();
        let user_id = parse_uuid(&payload.user_id, "user id")?;
        let menu_item_id = parse_uuid(&payload.menu_item_id, "menu item id")?;

        let conn = &mut establish_connection();
        let view = cart::update_item_quantity(user_id, menu_item_id, payload.quantity, conn)
            .map_err(cart_error_status)?;

        Ok(Response::new(serialize_cart(&view)))
    }

    async fn remove_cart_item(
        &self,
        request: Request<RemoveCartItemPayload>,
    ) -> Result<Response<Cart>, Status> {
        let payload = request.into_inner();
        let user_id = parse_uuid(&payload.user_id, "user id")?;
        let menu_item_id = parse_uuid(&payload.menu_item_id, "menu item id")?;

        let conn = &mut establish_connection();
        let view =
            cart::remove_item(user_id, menu_item_id, conn).map_err(cart_error_status)?;

        Ok(Response::new(serialize_cart(&view)))
    }

    async fn clear_cart(
        &self,
        request: Request<ClearCartPayload>,
    ) -> Result<Response<Cart>, Status> {
        let payload = request.into_inner();
        let user_id = parse_uuid(&payload.user_id, "user id")?;

        let conn = &mut establish_connection();
        let view = cart::clear_cart(user_id, conn).map_err(cart_error_status)?;

        Ok(Response::new(serialize_cart(&view)))
    }

    async fn create_order(
        &self,
        request: Request<CreateOrderPayload>,
    ) -> Result<Response<Order>, Status> {
        let payload = request.into_inner();
        let user_id = parse_uuid(&payload.user_id, "user id")?;
        if payload.delivery_address.trim().is_empty() {
            return Err(Status::invalid_argument("Delivery address required"));
        }

        let conn = &mut establish_connection();
        let (order, line_items) =
            checkout::create_order(user_id, payload.delivery_address, conn)
                .map_err(checkout_error_status)?;

        Ok(Response::new(serialize_order(&order, &line_items)))
    }

    async fn get_order(
        &self,
        request: Request<GetOrderPayload>,
    ) -> Result<Response<Order>, Status> {
        let payload = request.into_inner();
        let oid = parse_uuid(&payload.id, "order id")?;

        let conn = &mut establish_connection();
        let order = match schema::orders::table
            .select(models::Order::as_select())
            .find(&oid)
            .get_result::<models::Order>(conn)
        {
            Ok(order) => order,
            Err(diesel::result::Error::NotFound) => {
                return Err(Status::not_found("order not found"))
            }
            Err(_) => return Err(Status::internal("Internal server error")),
        };
        let line_items = schema::order_line_items::table
            .select(models::OrderLineItem::as_select())
            .filter(schema::order_line_items::order_id.eq(&oid))
            .get_results(conn)
            .map_err(|_| Status::internal("Internal server error"))?;

        Ok(Response::new(serialize_order(&order, &line_items)))
    }

    async fn list_orders(
        &self,
        request: Request<ListOrdersPayload>,
    ) -> Result<Response<ListOrdersResponse>, Status> {
        let payload = request.into_inner();
        let conn = &mut establish_connection();

        let mut query = schema::orders::table
            .select(models::Order::as_select())
            .into_boxed();

        if let Some(user_id) = payload.user_id {
            let uid = parse_uuid(&user_id, "user id")?;
            query = query.filter(schema::orders::user_id.eq(uid));
        }
        if let Some(restaurant_id) = payload.restaurant_id {
            let rid = parse_uuid(&restaurant_id, "restaurant id")?;
            query = query.filter(schema::orders::restaurant_id.eq(rid));
        }

        let orders = query
            .order(schema::orders::created_at.desc())
            .get_results::<models::Order>(conn)
            .map_err(|_| Status::internal("Internal server error"))?;

        let orders = orders
            .into_iter()
            .map(|order| {
                let line_items = schema::order_line_items::table
                    .select(models::OrderLineItem::as_select())
                    .filter(schema::order_line_items::order_id.eq(&order.id))
                    .get_results(conn)
                    .map_err(|_| Status::internal("Internal server error"))?;
                Ok(serialize_order(&order, &line_items))
            })
            .collect::<Result<Vec<_>, Status>>()?;

        Ok(Response::new(ListOrdersResponse { orders }))
    }

    async fn update_order_status(
        &self,
        request: Request<UpdateOrderStatusPayload>,
    ) -> Result<Response<Order>, Status> {
        let payload = request.into_inner();
        let oid = parse_uuid(&payload.id, "order id")?;
        let rid = parse_uuid(&payload.restaurant_id, "restaurant id")?;
        let state = ProtoOrderState::try_from(payload.state)
            .map_err(|_| Status::invalid_argument("Invalid order state"))?;

        let conn = &mut establish_connection();
        let (order, line_items) =
            checkout::update_order_status(oid, rid, models::OrderState::from(state), conn)
                .map_err(checkout_error_status)?;

        Ok(Response::new(serialize_order(&order, &line_items)))
    }
}

pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = establish_connection();
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run migrations");

    let addr = "0.0.0.0:8103".parse().unwrap();
    let order_service = OrderServiceImpl::default();

    let (mut health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<OrderServiceServer<OrderServiceImpl>>()
        .await;

    println!("listening on {}", addr);

    Server::builder()
        .add_service(health_service)
        .add_service(OrderServiceServer::new(order_service))
        .serve(addr)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use diesel::prelude::*;
    use foodbro_proto::common::Money;
    use std::str::FromStr;

    fn setup_database() {
        let conn = &mut establish_connection();
        diesel::delete(schema::outbox::table).execute(conn).unwrap();
        diesel::delete(schema::order_line_items::table)
            .execute(conn)
            .unwrap();
        diesel::delete(schema::orders::table).execute(conn).unwrap();
        diesel::delete(schema::cart_line_items::table)
            .execute(conn)
            .unwrap();
        diesel::delete(schema::carts::table).execute(conn).unwrap();
        diesel::delete(schema::menu_items::table)
            .execute(conn)
            .unwrap();
    }

    fn seed_menu_item(restaurant_id: Uuid, name: &str, price: &str, available_qty: i32) -> models::MenuItem {
        let conn = &mut establish_connection();
        let item = models::MenuItem {
            id: Uuid::new_v4(),
            restaurant_id,
            name: name.to_string(),
            price: BigDecimal::from_str(price).unwrap(),
            available_qty,
        };
        diesel::insert_into(schema::menu_items::table)
            .values(&item)
            .execute(conn)
            .unwrap();
        item
    }

    fn amount(money: &Option<Money>) -> BigDecimal {
        money.as_ref().unwrap().amount.parse().unwrap()
    }

    async fn add_to_cart(
        service: &OrderServiceImpl,
        user_id: Uuid,
        menu_item_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, Status> {
        service
            .add_cart_item(Request::new(AddCartItemPayload {
                user_id: user_id.to_string(),
                menu_item_id: menu_item_id.to_string(),
                quantity,
            }))
            .await
            .map(|r| r.into_inner())
    }

    #[tokio::test]
    async fn test_add_item_creates_cart_and_totals() {
        setup_database();

        let service = OrderServiceImpl::default();
        let user_id = Uuid::new_v4();
        let item = seed_menu_item(Uuid::new_v4(), "Veg Biryani", "100", 50);

        let cart = add_to_cart(&service, user_id, item.id, 2).await.unwrap();

        assert_eq!(cart.line_items.len(), 1);
        assert_eq!(cart.line_items[0].quantity, 2);
        assert_eq!(amount(&cart.total_price), BigDecimal::from(200));
    }

    #[tokio::test]
    async fn test_add_item_increments_existing_line() {
        setup_database();

        let service = OrderServiceImpl::default();
        let user_id = Uuid::new_v4();
        let item = seed_menu_item(Uuid::new_v4(), "Veg Biryani", "100", 50);

        add_to_cart(&service, user_id, item.id, 2).await.unwrap();
        let cart = add_to_cart(&service, user_id, item.id, 3).await.unwrap();

        assert_eq!(cart.line_items.len(), 1);
        assert_eq!(cart.line_items[0].quantity, 5);
        assert_eq!(amount(&cart.total_price), BigDecimal::from(500));
    }

    #[tokio::test]
    async fn test_add_item_rejects_non_positive_quantity() {
        setup_database();

        let service = OrderServiceImpl::default();
        let user_id = Uuid::new_v4();
        let item = seed_menu_item(Uuid::new_v4(), "Veg Biryani", "100", 50);

        for quantity in [0, -3] {
            let response = add_to_cart(&service, user_id, item.id, quantity).await;
            assert!(response.is_err());
            assert_eq!(
                response.unwrap_err().code(),
                tonic::Code::InvalidArgument
            );
        }

        // nothing was created
        let conn = &mut establish_connection();
        let carts = schema::carts::table.count().get_result::<i64>(conn).unwrap();
        assert_eq!(carts, 0);
    }

    #[tokio::test]
    async fn test_add_item_unknown_menu_item() {
        setup_database();

        let service = OrderServiceImpl::default();
        let response = add_to_cart(&service, Uuid::new_v4(), Uuid::new_v4(), 1).await;

        assert!(response.is_err());
        assert_eq!(response.unwrap_err().code(), tonic::Code::NotFound);
    }

    #[tokio::test]
    async fn test_add_item_exceeds_available_qty() {
        setup_database();

        let service = OrderServiceImpl::default();
        let user_id = Uuid::new_v4();
        let item = seed_menu_item(Uuid::new_v4(), "Veg Biryani", "100", 3);

        add_to_cart(&service, user_id, item.id, 2).await.unwrap();
        let response = add_to_cart(&service, user_id, item.id, 2).await;

        assert!(response.is_err());
        assert_eq!(response.unwrap_err().code(), tonic::Code::InvalidArgument);

        // the failed add left the existing line alone
        let cart = service
            .get_cart(Request::new(GetCartPayload {
                user_id: user_id.to_string(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(cart.line_items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_update_cart_item_sets_quantity() {
        setup_database();

        let service = OrderServiceImpl::default();
        let user_id = Uuid::new_v4();
        let item = seed_menu_item(Uuid::new_v4(), "Veg Biryani", "100", 50);

        add_to_cart(&service, user_id, item.id, 2).await.unwrap();
        let cart = service
            .update_cart_item(Request::new(UpdateCartItemPayload {
                user_id: user_id.to_string(),
                menu_item_id: item.id.to_string(),
                quantity: 7,
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(cart.line_items[0].quantity, 7);
        assert_eq!(amount(&cart.total_price), BigDecimal::from(700));
    }

    #[tokio::test]
    async fn test_update_cart_item_missing_line() {
        setup_database();

        let service = OrderServiceImpl::default();
        let user_id = Uuid::new_v4();
        let item = seed_menu_item(Uuid::new_v4(), "Veg Biryani", "100", 50);
        let other = seed_menu_item(Uuid::new_v4(), "Dal Makhani", "80", 50);

        add_to_cart(&service, user_id, item.id, 2).await.unwrap();
        let response = service
            .update_cart_item(Request::new(UpdateCartItemPayload {
                user_id: user_id.to_string(),
                menu_item_id: other.id.to_string(),
                quantity: 1,
            }))
            .await;

        assert!(response.is_err());
        assert_eq!(response.unwrap_err().code(), tonic::Code::NotFound);
    }

    #[tokio::test]
    async fn test_remove_missing_line_leaves_cart_unchanged() {
        setup_database();

        let service = OrderServiceImpl::default();
        let user_id = Uuid::new_v4();
        let item = seed_menu_item(Uuid::new_v4(), "Veg Biryani", "100", 50);

        add_to_cart(&service, user_id, item.id, 2).await.unwrap();
        let response = service
            .remove_cart_item(Request::new(RemoveCartItemPayload {
                user_id: user_id.to_string(),
                menu_item_id: Uuid::new_v4().to_string(),
            }))
            .await;

        assert!(response.is_err());
        assert_eq!(response.unwrap_err().code(), tonic::Code::NotFound);

        let cart = service
            .get_cart(Request::new(GetCartPayload {
                user_id: user_id.to_string(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(cart.line_items.len(), 1);
        assert_eq!(amount(&cart.total_price), BigDecimal::from(200));
    }

    #[tokio::test]
    async fn test_remove_item_reprices_remaining_lines() {
        setup_database();

        let service = OrderServiceImpl::default();
        let user_id = Uuid::new_v4();
        let restaurant_id = Uuid::new_v4();
        let biryani = seed_menu_item(restaurant_id, "Veg Biryani", "100", 50);
        let dal = seed_menu_item(restaurant_id, "Dal Makhani", "80", 50);

        add_to_cart(&service, user_id, biryani.id, 1).await.unwrap();
        add_to_cart(&service, user_id, dal.id, 2).await.unwrap();

        let cart = service
            .remove_cart_item(Request::new(RemoveCartItemPayload {
                user_id: user_id.to_string(),
                menu_item_id: biryani.id.to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(cart.line_items.len(), 1);
        assert_eq!(amount(&cart.total_price), BigDecimal::from(160));
    }

    #[tokio::test]
    async fn test_get_cart_without_cart_is_empty() {
        setup_database();

        let service = OrderServiceImpl::default();
        let cart = service
            .get_cart(Request::new(GetCartPayload {
                user_id: Uuid::new_v4().to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(cart.line_items.is_empty());
        assert_eq!(amount(&cart.total_price), BigDecimal::from(0));
    }

    #[tokio::test]
    async fn test_clear_cart_contract_both_ways() {
        setup_database();

        let service = OrderServiceImpl::default();
        let user_id = Uuid::new_v4();
        let item = seed_menu_item(Uuid::new_v4(), "Veg Biryani", "100", 50);

        // no cart row yet
        let response = service
            .clear_cart(Request::new(ClearCartPayload {
                user_id: user_id.to_string(),
            }))
            .await;
        assert!(response.is_err());
        assert_eq!(response.unwrap_err().code(), tonic::Code::NotFound);

        add_to_cart(&service, user_id, item.id, 2).await.unwrap();
        let cart = service
            .clear_cart(Request::new(ClearCartPayload {
                user_id: user_id.to_string(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(cart.line_items.is_empty());
        assert_eq!(amount(&cart.total_price), BigDecimal::from(0));

        // clearing the now-empty cart succeeds and stays at zero
        let cart = service
            .clear_cart(Request::new(ClearCartPayload {
                user_id: user_id.to_string(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(cart.line_items.is_empty());
        assert_eq!(amount(&cart.total_price), BigDecimal::from(0));
    }

    #[tokio::test]
    async fn test_cart_total_follows_price_change() {
        setup_database();

        let service = OrderServiceImpl::default();
        let user_id = Uuid::new_v4();
        let item = seed_menu_item(Uuid::new_v4(), "Veg Biryani", "100", 50);

        add_to_cart(&service, user_id, item.id, 2).await.unwrap();

        // restaurant revises the price while the items sit in the cart
        let conn = &mut establish_connection();
        diesel::update(schema::menu_items::table.find(item.id))
            .set(schema::menu_items::price.eq(BigDecimal::from(120)))
            .execute(conn)
            .unwrap();

        let cart = service
            .update_cart_item(Request::new(UpdateCartItemPayload {
                user_id: user_id.to_string(),
                menu_item_id: item.id.to_string(),
                quantity: 2,
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(amount(&cart.total_price), BigDecimal::from(240));
    }

    #[tokio::test]
    async fn test_create_order_computes_charges_and_empties_cart() {
        setup_database();

        let service = OrderServiceImpl::default();
        let user_id = Uuid::new_v4();
        let restaurant_id = Uuid::new_v4();
        let item = seed_menu_item(restaurant_id, "Veg Biryani", "100", 50);

        add_to_cart(&service, user_id, item.id, 1).await.unwrap();

        let order = service
            .create_order(Request::new(CreateOrderPayload {
                user_id: user_id.to_string(),
                delivery_address: "42 MG Road, Bengaluru".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(order.restaurant_id, restaurant_id.to_string());
        assert_eq!(amount(&order.subtotal), BigDecimal::from(100));
        assert_eq!(amount(&order.tax), BigDecimal::from_str("5.00").unwrap());
        assert_eq!(amount(&order.delivery_fee), BigDecimal::from(50));
        assert_eq!(
            amount(&order.total_amount),
            BigDecimal::from_str("155.00").unwrap()
        );
        assert_eq!(order.line_items.len(), 1);
        assert_eq!(
            amount(&order.line_items[0].line_total),
            BigDecimal::from(100)
        );
        assert_eq!(order.state, ProtoOrderState::Pending as i32);

        // the cart is emptied as part of the same transaction
        let cart = service
            .get_cart(Request::new(GetCartPayload {
                user_id: user_id.to_string(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(cart.line_items.is_empty());
        assert_eq!(amount(&cart.total_price), BigDecimal::from(0));

        let conn = &mut establish_connection();
        let stored_total = schema::carts::table
            .find(user_id)
            .select(schema::carts::total_price)
            .get_result::<BigDecimal>(conn)
            .unwrap();
        assert_eq!(stored_total, BigDecimal::from(0));
    }

    #[tokio::test]
    async fn test_create_order_empty_cart() {
        setup_database();

        let service = OrderServiceImpl::default();
        let user_id = Uuid::new_v4();
        let item = seed_menu_item(Uuid::new_v4(), "Veg Biryani", "100", 50);

        // no cart at all
        let response = service
            .create_order(Request::new(CreateOrderPayload {
                user_id: user_id.to_string(),
                delivery_address: "42 MG Road, Bengaluru".to_string(),
            }))
            .await;
        assert!(response.is_err());
        assert_eq!(
            response.unwrap_err().code(),
            tonic::Code::FailedPrecondition
        );

        // cart exists but has been cleared
        add_to_cart(&service, user_id, item.id, 1).await.unwrap();
        service
            .clear_cart(Request::new(ClearCartPayload {
                user_id: user_id.to_string(),
            }))
            .await
            .unwrap();
        let response = service
            .create_order(Request::new(CreateOrderPayload {
                user_id: user_id.to_string(),
                delivery_address: "42 MG Road, Bengaluru".to_string(),
            }))
            .await;
        assert!(response.is_err());
        assert_eq!(
            response.unwrap_err().code(),
            tonic::Code::FailedPrecondition
        );
    }

    #[tokio::test]
    async fn test_create_order_rejects_mixed_restaurants() {
        setup_database();

        let service = OrderServiceImpl::default();
        let user_id = Uuid::new_v4();
        let biryani = seed_menu_item(Uuid::new_v4(), "Veg Biryani", "100", 50);
        let pizza = seed_menu_item(Uuid::new_v4(), "Margherita Pizza", "250", 50);

        add_to_cart(&service, user_id, biryani.id, 1).await.unwrap();
        add_to_cart(&service, user_id, pizza.id, 1).await.unwrap();

        let response = service
            .create_order(Request::new(CreateOrderPayload {
                user_id: user_id.to_string(),
                delivery_address: "42 MG Road, Bengaluru".to_string(),
            }))
            .await;

        assert!(response.is_err());
        assert_eq!(
            response.unwrap_err().code(),
            tonic::Code::FailedPrecondition
        );

        // the failed checkout did not touch the cart
        let cart = service
            .get_cart(Request::new(GetCartPayload {
                user_id: user_id.to_string(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(cart.line_items.len(), 2);
        assert_eq!(amount(&cart.total_price), BigDecimal::from(350));

        let conn = &mut establish_connection();
        let orders = schema::orders::table
            .count()
            .get_result::<i64>(conn)
            .unwrap();
        assert_eq!(orders, 0);
    }

    #[tokio::test]
    async fn test_order_lines_price_at_checkout_time() {
        setup_database();

        let service = OrderServiceImpl::default();
        let user_id = Uuid::new_v4();
        let item = seed_menu_item(Uuid::new_v4(), "Veg Biryani", "100", 50);

        add_to_cart(&service, user_id, item.id, 2).await.unwrap();

        let conn = &mut establish_connection();
        diesel::update(schema::menu_items::table.find(item.id))
            .set(schema::menu_items::price.eq(BigDecimal::from(110)))
            .execute(conn)
            .unwrap();

        let order = service
            .create_order(Request::new(CreateOrderPayload {
                user_id: user_id.to_string(),
                delivery_address: "42 MG Road, Bengaluru".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(amount(&order.line_items[0].unit_price), BigDecimal::from(110));
        assert_eq!(amount(&order.subtotal), BigDecimal::from(220));
    }

    #[tokio::test]
    async fn test_update_order_status_follows_transition_graph() {
        setup_database();

        let service = OrderServiceImpl::default();
        let user_id = Uuid::new_v4();
        let restaurant_id = Uuid::new_v4();
        let item = seed_menu_item(restaurant_id, "Veg Biryani", "100", 50);

        add_to_cart(&service, user_id, item.id, 1).await.unwrap();
        let order = service
            .create_order(Request::new(CreateOrderPayload {
                user_id: user_id.to_string(),
                delivery_address: "42 MG Road, Bengaluru".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        let updated = service
            .update_order_status(Request::new(UpdateOrderStatusPayload {
                id: order.id.clone(),
                restaurant_id: restaurant_id.to_string(),
                state: ProtoOrderState::Confirmed.into(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(updated.state, ProtoOrderState::Confirmed as i32);

        // skipping straight to delivered is not a legal edge
        let response = service
            .update_order_status(Request::new(UpdateOrderStatusPayload {
                id: order.id.clone(),
                restaurant_id: restaurant_id.to_string(),
                state: ProtoOrderState::Delivered.into(),
            }))
            .await;
        assert!(response.is_err());
        assert_eq!(
            response.unwrap_err().code(),
            tonic::Code::FailedPrecondition
        );
    }

    #[tokio::test]
    async fn test_update_order_status_requires_owning_restaurant() {
        setup_database();

        let service = OrderServiceImpl::default();
        let user_id = Uuid::new_v4();
        let restaurant_id = Uuid::new_v4();
        let item = seed_menu_item(restaurant_id, "Veg Biryani", "100", 50);

        add_to_cart(&service, user_id, item.id, 1).await.unwrap();
        let order = service
            .create_order(Request::new(CreateOrderPayload {
                user_id: user_id.to_string(),
                delivery_address: "42 MG Road, Bengaluru".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        let response = service
            .update_order_status(Request::new(UpdateOrderStatusPayload {
                id: order.id,
                restaurant_id: Uuid::new_v4().to_string(),
                state: ProtoOrderState::Confirmed.into(),
            }))
            .await;

        assert!(response.is_err());
        assert_eq!(response.unwrap_err().code(), tonic::Code::PermissionDenied);
    }

    #[tokio::test]
    async fn test_update_order_status_unknown_order() {
        setup_database();

        let service = OrderServiceImpl::default();
        let response = service
            .update_order_status(Request::new(UpdateOrderStatusPayload {
                id: Uuid::new_v4().to_string(),
                restaurant_id: Uuid::new_v4().to_string(),
                state: ProtoOrderState::Confirmed.into(),
            }))
            .await;

        assert!(response.is_err());
        assert_eq!(response.unwrap_err().code(), tonic::Code::NotFound);
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        setup_database();

        let service = OrderServiceImpl::default();
        let user_id = Uuid::new_v4();
        let restaurant_id = Uuid::new_v4();
        let item = seed_menu_item(restaurant_id, "Veg Biryani", "100", 50);

        add_to_cart(&service, user_id, item.id, 1).await.unwrap();
        let first = service
            .create_order(Request::new(CreateOrderPayload {
                user_id: user_id.to_string(),
                delivery_address: "42 MG Road, Bengaluru".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        add_to_cart(&service, user_id, item.id, 2).await.unwrap();
        let second = service
            .create_order(Request::new(CreateOrderPayload {
                user_id: user_id.to_string(),
                delivery_address: "42 MG Road, Bengaluru".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        let listed = service
            .list_orders(Request::new(ListOrdersPayload {
                user_id: Some(user_id.to_string()),
                restaurant_id: None,
            }))
            .await
            .unwrap()
            .into_inner()
            .orders;

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);

        let by_restaurant = service
            .list_orders(Request::new(ListOrdersPayload {
                user_id: None,
                restaurant_id: Some(restaurant_id.to_string()),
            }))
            .await
            .unwrap()
            .into_inner()
            .orders;
        assert_eq!(by_restaurant.len(), 2);
    }
}
