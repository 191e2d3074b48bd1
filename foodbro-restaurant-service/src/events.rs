use diesel::{prelude::*, PgConnection};
use foodbro_proto::restaurant_service::{
    restaurant_event, MenuItemCreatedEvent, MenuItemDeletedEvent, MenuItemRevisedEvent,
    RestaurantEvent,
};
use prost::Message;
use uuid::Uuid;

use crate::serializer::serialize_menu_item;
use crate::{models, models::NewOutbox, schema, EVENT_CHANNEL};

pub struct RestaurantEventPublisher<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> RestaurantEventPublisher<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    pub fn menu_item_created(
        &mut self,
        item: &models::MenuItem,
    ) -> Result<(), diesel::result::Error> {
        let event = RestaurantEvent {
            event: Some(restaurant_event::Event::MenuItemCreated(
                MenuItemCreatedEvent {
                    menu_item: Some(serialize_menu_item(item)),
                },
            )),
        };
        self.publish(event, &item.restaurant_id)
    }

    pub fn menu_item_revised(
        &mut self,
        item: &models::MenuItem,
    ) -> Result<(), diesel::result::Error> {
        let event = RestaurantEvent {
            event: Some(restaurant_event::Event::MenuItemRevised(
                MenuItemRevisedEvent {
                    menu_item: Some(serialize_menu_item(item)),
                },
            )),
        };
        self.publish(event, &item.restaurant_id)
    }

    pub fn menu_item_deleted(
        &mut self,
        item: &models::MenuItem,
    ) -> Result<(), diesel::result::Error> {
        let event = RestaurantEvent {
            event: Some(restaurant_event::Event::MenuItemDeleted(
                MenuItemDeletedEvent {
                    restaurant_id: item.restaurant_id.to_string(),
                    menu_item_id: item.id.to_string(),
                },
            )),
        };
        self.publish(event, &item.restaurant_id)
    }

    fn publish(
        &mut self,
        event: RestaurantEvent,
        restaurant_id: &Uuid,
    ) -> Result<(), diesel::result::Error> {
        let mut buf = Vec::new();
        event.encode(&mut buf).unwrap();

        diesel::insert_into(schema::outbox::table)
            .values(NewOutbox {
                topic: EVENT_CHANNEL.to_string(),
                key: restaurant_id.to_string(),
                value: buf,
            })
            .execute(self.conn)
            .map(|_| ())
    }
}
