use diesel::{prelude::*, PgConnection};
use foodbro_proto::order_service::{
    order_event, OrderCreatedEvent, OrderEvent, OrderState, OrderStatusChangedEvent,
};
use prost::Message;
use uuid::Uuid;

use crate::serializer::serialize_order;
use crate::{models, models::NewOutbox, schema, EVENT_CHANNEL};

pub struct OrderEventPublisher<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> OrderEventPublisher<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    pub fn order_created(
        &mut self,
        order: &models::Order,
        line_items: &[models::OrderLineItem],
    ) -> Result<(), diesel::result::Error> {
        let event = OrderEvent {
            event: Some(order_event::Event::OrderCreated(OrderCreatedEvent {
                order: Some(serialize_order(order, line_items)),
            })),
        };
        self.publish(event, &order.id)
    }

    pub fn order_status_changed(
        &mut self,
        order: &models::Order,
    ) -> Result<(), diesel::result::Error> {
        let event = OrderEvent {
            event: Some(order_event::Event::OrderStatusChanged(
                OrderStatusChangedEvent {
                    id: order.id.to_string(),
                    state: OrderState::from(order.state).into(),
                },
            )),
        };
        self.publish(event, &order.id)
    }

    fn publish(&mut self, event: OrderEvent, order_id: &Uuid) -> Result<(), diesel::result::Error> {
        let mut buf = Vec::new();
        event.encode(&mut buf).unwrap();

        diesel::insert_into(schema::outbox::table)
            .values(NewOutbox {
                topic: EVENT_CHANNEL.to_string(),
                key: order_id.to_string(),
                value: buf,
            })
            .execute(self.conn)
            .map(|_| ())
    }
}
