use bigdecimal::BigDecimal;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tonic::transport::Server;
use tonic::{Request, Response, Status};
use uuid::Uuid;

use foodbro_proto::common::Money;
use foodbro_proto::restaurant_service::restaurant_service_server::{
    RestaurantService, RestaurantServiceServer,
};
use foodbro_proto::restaurant_service::{
    CreateMenuItemPayload, DeleteMenuItemPayload, DeleteMenuItemResponse, GetMenuItemPayload,
    ListMenuItemsPayload, ListMenuItemsResponse, MenuItem, UpdateMenuItemPayload,
};

use foodbro_restaurant_service::menu::{
    self, MenuError, MenuFilter, MenuItemChanges, NewMenuItem,
};
use foodbro_restaurant_service::serializer::serialize_menu_item;
use foodbro_restaurant_service::establish_connection;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

#[derive(Default)]
pub struct RestaurantServiceImpl {}

fn parse_uuid(value: &str, what: &str) -> Result<Uuid, Status> {
    value
        .parse::<Uuid>()
        .map_err(|_| Status::invalid_argument(format!("Invalid {}", what)))
}

fn parse_money(money: Option<Money>, what: &str) -> Result<BigDecimal, Status> {
    money
        .ok_or(Status::invalid_argument(format!("{} required", what)))?
        .amount
        .parse::<BigDecimal>()
        .map_err(|_| Status::invalid_argument(format!("Invalid {}", what)))
}

fn menu_error_status(err: MenuError) -> Status {
    match err {
        MenuError::NotFound => Status::not_found(err.to_string()),
        MenuError::NotOwner => Status::permission_denied(err.to_string()),
        MenuError::InvalidField(_) => Status::invalid_argument(err.to_string()),
        MenuError::Database(_) => Status::internal("Internal server error"),
    }
}

#[tonic::async_trait]
impl RestaurantService for RestaurantServiceImpl {
    async fn create_menu_item(
        &self,
        request: Request<CreateMenuItemPayload>,
    ) -> Result<Response<MenuItem>, Status> {
        let payload = request.into_inner();
        let new = NewMenuItem {
            restaurant_id: parse_uuid(&payload.restaurant_id, "restaurant id")?,
            name: payload.name,
            description: payload.description,
            category: payload.category,
            price: parse_money(payload.price, "price")?,
            available_qty: payload.available_qty,
            discount_percentage: payload.discount_percentage,
            vegetarian: payload.vegetarian,
            image_url: payload.image_url,
        };

        let conn = &mut establish_connection();
        let item = menu::create_menu_item(new, conn).map_err(menu_error_status)?;

        Ok(Response::new(serialize_menu_item(&item)))
    }

    async fn get_menu_item(
        &self,
        request: Request<GetMenuItemPayload>,
    ) -> Result<Response<MenuItem>, Status> {
        let payload = request.into_inner();
        let id = parse_uuid(&payload.id, "menu item id")?;

        let conn = &mut establish_connection();
        let item = menu::get_menu_item(id, conn).map_err(menu_error_status)?;

        Ok(Response::new(serialize_menu_item(&item)))
    }

    async fn list_menu_items(
        &self,
        request: Request<ListMenuItemsPayload>,
    ) -> Result<Response<ListMenuItemsResponse>, Status> {
        let payload = request.into_inner();
        let restaurant_id = parse_uuid(&payload.restaurant_id, "restaurant id")?;

        let max_price = match payload.max_price {
            Some(money) => Some(
                money
                    .amount
                    .parse::<BigDecimal>()
                    .map_err(|_| Status::invalid_argument("Invalid max price"))?,
            ),
            None => None,
        };
        let filter = MenuFilter {
            search: payload.search,
            max_price,
            min_rating: payload.min_rating,
            min_discount: payload.min_discount,
            veg_only: payload.veg_only.unwrap_or(false),
        };

        let conn = &mut establish_connection();
        let items = menu::list_menu_items(restaurant_id, filter, conn).map_err(menu_error_status)?;

        Ok(Response::new(ListMenuItemsResponse {
            items: items.iter().map(serialize_menu_item).collect(),
        }))
    }

    async fn update_menu_item(
        &self,
        request: Request<UpdateMenuItemPayload>,
    ) -> Result<Response<MenuItem>, Status> {
        let payload = request.into_inner();
        let id = parse_uuid(&payload.id, "menu item id")?;
        let caller = parse_uuid(&payload.restaurant_id, "restaurant id")?;

        let price = match payload.price {
            Some(money) => Some(
                money
                    .amount
                    .parse::<BigDecimal>()
                    .map_err(|_| Status::invalid_argument("Invalid price"))?,
            ),
            None => None,
        };
        let changes = MenuItemChanges {
            name: payload.name,
            description: payload.description,
            category: payload.category,
            price,
            available_qty: payload.available_qty,
            discount_percentage: payload.discount_percentage,
            vegetarian: payload.vegetarian,
            image_url: payload.image_url,
        };

        let conn = &mut establish_connection();
        let item = menu::update_menu_item(id, caller, changes, conn).map_err(menu_error_status)?;

        Ok(Response::new(serialize_menu_item(&item)))
    }

    async fn delete_menu_item(
        &self,
        request: Request<DeleteMenuItemPayload>,
    ) -> Result<Response<DeleteMenuItemResponse>, Status> {
        let payload = request.into_inner();
        let id = parse_uuid(&payload.id, "menu item id")?;
        let caller = parse_uuid(&payload.restaurant_id, "restaurant id")?;

        let conn = &mut establish_connection();
        menu::delete_menu_item(id, caller, conn).map_err(menu_error_status)?;

        Ok(Response::new(DeleteMenuItemResponse {}))
    }
}

pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = establish_connection();
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run migrations");

    let addr = "0.0.0.0:8101".parse().unwrap();
    let restaurant_service = RestaurantServiceImpl::default();

    let (mut health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<RestaurantServiceServer<RestaurantServiceImpl>>()
        .await;

    println!("listening on {}", addr);

    Server::builder()
        .add_service(health_service)
        .add_service(RestaurantServiceServer::new(restaurant_service))
        .serve(addr)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::prelude::*;
    use diesel::RunQueryDsl;
    use foodbro_restaurant_service::{models, schema};

    fn setup_database() {
        let conn = &mut establish_connection();
        diesel::delete(schema::outbox::table).execute(conn).unwrap();
        diesel::delete(schema::menu_items::table)
            .execute(conn)
            .unwrap();
    }

    fn create_payload(restaurant_id: Uuid) -> CreateMenuItemPayload {
        CreateMenuItemPayload {
            restaurant_id: restaurant_id.to_string(),
            name: "Margherita Pizza".to_string(),
            description: "Tomato, mozzarella, basil".to_string(),
            category: "Pizza".to_string(),
            price: Some(Money {
                amount: "250.00".to_string(),
            }),
            available_qty: 20,
            discount_percentage: 10.0,
            vegetarian: true,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_menu_item() {
        setup_database();

        let service = RestaurantServiceImpl::default();
        let restaurant_id = Uuid::new_v4();
        let response = service
            .create_menu_item(Request::new(create_payload(restaurant_id)))
            .await
            .unwrap();
        let item = response.into_inner();

        assert_eq!(item.name, "Margherita Pizza");
        assert_eq!(item.restaurant_id, restaurant_id.to_string());

        let conn = &mut establish_connection();
        let created = schema::menu_items::table
            .find(item.id.parse::<Uuid>().unwrap())
            .first::<models::MenuItem>(conn)
            .unwrap();
        assert_eq!(created.name, "Margherita Pizza");
        assert_eq!(
            created.price,
            BigDecimal::parse_bytes(b"250.00", 10).unwrap()
        );
        assert_eq!(created.available_qty, 20);

        let outbox_rows = schema::outbox::table
            .count()
            .get_result::<i64>(conn)
            .unwrap();
        assert_eq!(outbox_rows, 1);
    }

    #[tokio::test]
    async fn test_create_menu_item_invalid_price() {
        setup_database();

        let service = RestaurantServiceImpl::default();
        let mut payload = create_payload(Uuid::new_v4());
        payload.price = Some(Money {
            amount: "invalid".to_string(),
        });

        let response = service.create_menu_item(Request::new(payload)).await;
        assert!(response.is_err());
        assert_eq!(response.unwrap_err().code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_create_menu_item_negative_price() {
        setup_database();

        let service = RestaurantServiceImpl::default();
        let mut payload = create_payload(Uuid::new_v4());
        payload.price = Some(Money {
            amount: "-10".to_string(),
        });

        let response = service.create_menu_item(Request::new(payload)).await;
        assert!(response.is_err());
        assert_eq!(response.unwrap_err().code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_update_menu_item_requires_owner() {
        setup_database();

        let service = RestaurantServiceImpl::default();
        let restaurant_id = Uuid::new_v4();
        let created = service
            .create_menu_item(Request::new(create_payload(restaurant_id)))
            .await
            .unwrap()
            .into_inner();

        let response = service
            .update_menu_item(Request::new(UpdateMenuItemPayload {
                id: created.id,
                restaurant_id: Uuid::new_v4().to_string(),
                name: Some("Pirate Pizza".to_string()),
                description: None,
                category: None,
                price: None,
                available_qty: None,
                discount_percentage: None,
                vegetarian: None,
                image_url: None,
            }))
            .await;

        assert!(response.is_err());
        assert_eq!(response.unwrap_err().code(), tonic::Code::PermissionDenied);
    }

    #[tokio::test]
    async fn test_update_menu_item_changes_price() {
        setup_database();

        let service = RestaurantServiceImpl::default();
        let restaurant_id = Uuid::new_v4();
        let created = service
            .create_menu_item(Request::new(create_payload(restaurant_id)))
            .await
            .unwrap()
            .into_inner();

        let response = service
            .update_menu_item(Request::new(UpdateMenuItemPayload {
                id: created.id.clone(),
                restaurant_id: restaurant_id.to_string(),
                name: None,
                description: None,
                category: None,
                price: Some(Money {
                    amount: "300.00".to_string(),
                }),
                available_qty: None,
                discount_percentage: None,
                vegetarian: None,
                image_url: None,
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(response.price.unwrap().amount, "300.00");

        let conn = &mut establish_connection();
        let updated = schema::menu_items::table
            .find(created.id.parse::<Uuid>().unwrap())
            .first::<models::MenuItem>(conn)
            .unwrap();
        assert_eq!(
            updated.price,
            BigDecimal::parse_bytes(b"300.00", 10).unwrap()
        );
    }

    #[tokio::test]
    async fn test_delete_menu_item() {
        setup_database();

        let service = RestaurantServiceImpl::default();
        let restaurant_id = Uuid::new_v4();
        let created = service
            .create_menu_item(Request::new(create_payload(restaurant_id)))
            .await
            .unwrap()
            .into_inner();

        service
            .delete_menu_item(Request::new(DeleteMenuItemPayload {
                id: created.id.clone(),
                restaurant_id: restaurant_id.to_string(),
            }))
            .await
            .unwrap();

        let conn = &mut establish_connection();
        let remaining = schema::menu_items::table
            .count()
            .get_result::<i64>(conn)
            .unwrap();
        assert_eq!(remaining, 0);

        // create + delete each leave an event behind
        let outbox_rows = schema::outbox::table
            .count()
            .get_result::<i64>(conn)
            .unwrap();
        assert_eq!(outbox_rows, 2);
    }

    #[tokio::test]
    async fn test_list_menu_items_veg_only() {
        setup_database();

        let service = RestaurantServiceImpl::default();
        let restaurant_id = Uuid::new_v4();
        service
            .create_menu_item(Request::new(create_payload(restaurant_id)))
            .await
            .unwrap();
        let mut chicken = create_payload(restaurant_id);
        chicken.name = "Chicken Wings".to_string();
        chicken.vegetarian = false;
        service
            .create_menu_item(Request::new(chicken))
            .await
            .unwrap();

        let response = service
            .list_menu_items(Request::new(ListMenuItemsPayload {
                restaurant_id: restaurant_id.to_string(),
                search: None,
                max_price: None,
                min_rating: None,
                min_discount: None,
                veg_only: Some(true),
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].name, "Margherita Pizza");
    }
}
