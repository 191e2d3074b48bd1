use std::io::Write;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::{
    deserialize::{self, FromSql, FromSqlRow},
    expression::AsExpression,
    pg::{Pg, PgValue},
    prelude::*,
    serialize::{self, IsNull, Output, ToSql},
};
use uuid::Uuid;

use crate::schema::{cart_line_items, carts, menu_items, order_line_items, orders, outbox};

#[derive(FromSqlRow, AsExpression, PartialEq, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::OrderState)]
pub enum OrderState {
    Pending,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderState {
    /// Transition graph for order fulfillment. Delivered and Cancelled are
    /// terminal.
    pub fn can_transition_to(self, next: OrderState) -> bool {
        use OrderState::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Preparing)
                | (Confirmed, Cancelled)
                | (Preparing, OutForDelivery)
                | (OutForDelivery, Delivered)
        )
    }
}

impl ToSql<crate::schema::sql_types::OrderState, Pg> for OrderState {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            OrderState::Pending => out.write_all(b"PENDING")?,
            OrderState::Confirmed => out.write_all(b"CONFIRMED")?,
            OrderState::Preparing => out.write_all(b"PREPARING")?,
            OrderState::OutForDelivery => out.write_all(b"OUT_FOR_DELIVERY")?,
            OrderState::Delivered => out.write_all(b"DELIVERED")?,
            OrderState::Cancelled => out.write_all(b"CANCELLED")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::OrderState, Pg> for OrderState {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"PENDING" => Ok(OrderState::Pending),
            b"CONFIRMED" => Ok(OrderState::Confirmed),
            b"PREPARING" => Ok(OrderState::Preparing),
            b"OUT_FOR_DELIVERY" => Ok(OrderState::OutForDelivery),
            b"DELIVERED" => Ok(OrderState::Delivered),
            b"CANCELLED" => Ok(OrderState::Cancelled),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl From<foodbro_proto::order_service::OrderState> for OrderState {
    fn from(s: foodbro_proto::order_service::OrderState) -> Self {
        match s {
            foodbro_proto::order_service::OrderState::Pending => OrderState::Pending,
            foodbro_proto::order_service::OrderState::Confirmed => OrderState::Confirmed,
            foodbro_proto::order_service::OrderState::Preparing => OrderState::Preparing,
            foodbro_proto::order_service::OrderState::OutForDelivery => OrderState::OutForDelivery,
            foodbro_proto::order_service::OrderState::Delivered => OrderState::Delivered,
            foodbro_proto::order_service::OrderState::Cancelled => OrderState::Cancelled,
        }
    }
}

impl From<OrderState> for foodbro_proto::order_service::OrderState {
    fn from(s: OrderState) -> Self {
        match s {
            OrderState::Pending => foodbro_proto::order_service::OrderState::Pending,
            OrderState::Confirmed => foodbro_proto::order_service::OrderState::Confirmed,
            OrderState::Preparing => foodbro_proto::order_service::OrderState::Preparing,
            OrderState::OutForDelivery => foodbro_proto::order_service::OrderState::OutForDelivery,
            OrderState::Delivered => foodbro_proto::order_service::OrderState::Delivered,
            OrderState::Cancelled => foodbro_proto::order_service::OrderState::Cancelled,
        }
    }
}

#[derive(FromSqlRow, AsExpression, PartialEq, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::PaymentState)]
pub enum PaymentState {
    Pending,
    Paid,
}

impl ToSql<crate::schema::sql_types::PaymentState, Pg> for PaymentState {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            PaymentState::Pending => out.write_all(b"PENDING")?,
            PaymentState::Paid => out.write_all(b"PAID")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::PaymentState, Pg> for PaymentState {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"PENDING" => Ok(PaymentState::Pending),
            b"PAID" => Ok(PaymentState::Paid),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl From<PaymentState> for foodbro_proto::order_service::PaymentState {
    fn from(s: PaymentState) -> Self {
        match s {
            PaymentState::Pending => foodbro_proto::order_service::PaymentState::PaymentPending,
            PaymentState::Paid => foodbro_proto::order_service::PaymentState::Paid,
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, PartialEq)]
#[diesel(table_name = carts, primary_key(user_id))]
pub struct Cart {
    pub user_id: Uuid,
    pub total_price: BigDecimal,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, PartialEq)]
#[diesel(belongs_to(Cart, foreign_key = cart_user_id))]
#[diesel(table_name = cart_line_items)]
pub struct CartLineItem {
    pub id: Uuid,
    pub cart_user_id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, Debug, PartialEq, Clone)]
#[diesel(table_name = menu_items)]
pub struct MenuItem {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub available_qty: i32,
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, PartialEq)]
#[diesel(table_name = orders)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub restaurant_id: Uuid,
    pub state: OrderState,
    pub payment_state: PaymentState,
    pub subtotal: BigDecimal,
    pub tax: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub total_amount: BigDecimal,
    pub delivery_address: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, PartialEq)]
#[diesel(belongs_to(Order))]
#[diesel(table_name = order_line_items)]
pub struct OrderLineItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub line_total: BigDecimal,
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
