use foodbro_proto::{
    common::Money,
    order_service::{Cart, CartLineItem, Order, OrderLineItem, OrderState, PaymentState},
};
use prost_types::Timestamp;

use crate::cart::CartView;
use crate::models;

pub fn serialize_cart(view: &CartView) -> Cart {
    Cart {
        user_id: view.user_id.to_string(),
        line_items: view
            .lines
            .iter()
            .map(|l| CartLineItem {
                menu_item_id: l.menu_item_id.to_string(),
                name: l.name.clone(),
                quantity: l.quantity,
                unit_price: Some(Money {
                    amount: l.unit_price.to_string(),
                }),
                line_total: Some(Money {
                    amount: l.line_total.to_string(),
                }),
            })
            .collect(),
        total_price: Some(Money {
            amount: view.total_price.to_string(),
        }),
    }
}

pub fn serialize_order(order: &models::Order, line_items: &[models::OrderLineItem]) -> Order {
    Order {
        id: order.id.to_string(),
        user_id: order.user_id.to_string(),
        restaurant_id: order.restaurant_id.to_string(),
        state: OrderState::from(order.state).into(),
        payment_state: PaymentState::from(order.payment_state).into(),
        line_items: line_items
            .iter()
            .map(|i| OrderLineItem {
                menu_item_id: i.menu_item_id.to_string(),
                name: i.name.clone(),
                quantity: i.quantity,
                unit_price: Some(Money {
                    amount: i.unit_price.to_string(),
                }),
                line_total: Some(Money {
                    amount: i.line_total.to_string(),
                }),
            })
            .collect(),
        subtotal: Some(Money {
            amount: order.subtotal.to_string(),
        }),
        tax: Some(Money {
            amount: order.tax.to_string(),
        }),
        delivery_fee: Some(Money {
            amount: order.delivery_fee.to_string(),
        }),
        total_amount: Some(Money {
            amount: order.total_amount.to_string(),
        }),
        delivery_address: order.delivery_address.to_string(),
        created_at: Some(Timestamp {
            seconds: order.created_at.timestamp(),
            nanos: order.created_at.timestamp_subsec_nanos() as i32,
        }),
    }
}
