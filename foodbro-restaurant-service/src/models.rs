use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::{menu_items, outbox};

#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, PartialEq, Clone)]
#[diesel(table_name = menu_items)]
pub struct MenuItem {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: BigDecimal,
    pub available_qty: i32,
    pub discount_percentage: f32,
    pub vegetarian: bool,
    pub rating: f32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Debug, PartialEq)]
#[diesel(table_name = outbox)]
pub struct Outbox {
    pub id: i32,
    pub topic: String,
    pub key: String,
    pub value: Vec<u8>,
}

#[derive(Insertable, Debug, PartialEq)]
#[diesel(table_name = outbox)]
pub struct NewOutbox {
    pub topic: String,
    pub key: String,
    pub value: Vec<u8>,
}
