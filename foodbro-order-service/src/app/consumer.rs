use std::{env, thread::sleep, time::Duration};

use diesel::{delete, insert_into, prelude::*, PgConnection};
use dotenvy::dotenv;
use foodbro_order_service::{establish_connection, models, schema};
use foodbro_proto::restaurant_service::{restaurant_event, RestaurantEvent};
use kafka::{
    client::{FetchOffset, GroupOffsetStorage},
    consumer::Consumer,
};
use prost::Message;
use uuid::Uuid;

const GROUP: &str = "order-service";

const RESTAURANT_EVENT_CHANNEL: &str = "restaurant.event";

fn upsert_menu_item(
    item: foodbro_proto::restaurant_service::MenuItem,
    conn: &mut PgConnection,
) -> Result<(), diesel::result::Error> {
    let row = models::MenuItem {
        id: item.id.parse::<Uuid>().unwrap(),
        restaurant_id: item.restaurant_id.parse::<Uuid>().unwrap(),
        name: item.name,
        price: item.price.unwrap().amount.parse().unwrap(),
        available_qty: item.available_qty,
    };

    insert_into(schema::menu_items::table)
        .values(&row)
        .on_conflict(schema::menu_items::id)
        .do_update()
        .set(&row)
        .execute(conn)
        .map(|_| ())
}

fn process_event(
    event: RestaurantEvent,
    conn: &mut PgConnection,
) -> Result<(), diesel::result::Error> {
    match event.event.unwrap() {
        restaurant_event::Event::MenuItemCreated(event) => {
            upsert_menu_item(event.menu_item.unwrap(), conn)
        }
        restaurant_event::Event::MenuItemRevised(event) => {
            upsert_menu_item(event.menu_item.unwrap(), conn)
        }
        restaurant_event::Event::MenuItemDeleted(event) => {
            let id = event.menu_item_id.parse::<Uuid>().unwrap();
            delete(schema::menu_items::table.find(id))
                .execute(conn)
                .map(|_| ())
        }
    }
}

pub fn main() {
    dotenv().ok();
    let kafka_url = env::var("KAFKA_URL").expect("KAFKA_URL must be set");

    let mut conn = establish_connection();
    let mut consumer = Consumer::from_hosts(vec![kafka_url])
        .with_topic(RESTAURANT_EVENT_CHANNEL.to_string())
        .with_group(GROUP.to_string())
        .with_fallback_offset(FetchOffset::Earliest)
        .with_offset_storage(Some(GroupOffsetStorage::Kafka))
        .create()
        .unwrap();

    loop {
        let mss = consumer.poll().expect("Cannot poll messages");
        if mss.is_empty() {
            sleep(Duration::from_secs(1));
            continue;
        }

        for ms in mss.iter() {
            for m in ms.messages() {
                let event = RestaurantEvent::decode(m.value)
                    .expect("Cannot decode restaurant event");
                process_event(event, &mut conn).expect(&format!(
                    "Failed to process message {} {}",
                    ms.topic(),
                    m.offset
                ));
            }
            let _ = consumer.consume_messageset(ms);
        }
        consumer
            .commit_consumed()
            .expect("Error while commit consumed");
    }
}
