use std::collections::HashMap;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::{delete, insert_into, prelude::*, update, PgConnection};
use thiserror::Error;
use uuid::Uuid;

use crate::events::OrderEventPublisher;
use crate::{models, schema};

/// Flat tax rate applied to the subtotal of every order.
pub const TAX_RATE: &str = "0.05";
/// Fixed delivery fee in currency units.
pub const DELIVERY_FEE: &str = "50";

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("cart is empty")]
    CartEmpty,
    #[error("items must be from the same restaurant")]
    MixedRestaurants,
    #[error("menu item not found")]
    MenuItemNotFound,
    #[error("order not found")]
    OrderNotFound,
    #[error("order belongs to another restaurant")]
    NotOrderOwner,
    #[error("cannot change order status from {from:?} to {to:?}")]
    InvalidTransition {
        from: models::OrderState,
        to: models::OrderState,
    },
    #[error("unexpected internal error")]
    Database(#[from] diesel::result::Error),
}

#[derive(Debug, PartialEq)]
pub struct Charges {
    pub subtotal: BigDecimal,
    pub tax: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub total_amount: BigDecimal,
}

pub fn compute_charges(subtotal: BigDecimal) -> Charges {
    let tax = &subtotal * BigDecimal::from_str(TAX_RATE).unwrap();
    let delivery_fee = BigDecimal::from_str(DELIVERY_FEE).unwrap();
    let total_amount = &subtotal + &tax + &delivery_fee;
    Charges {
        subtotal,
        tax,
        delivery_fee,
        total_amount,
    }
}

/// Materializes the user's cart into an order and empties the cart, all in
/// one transaction. Line totals and the subtotal are recomputed from the
/// replica's current prices; the stored cart total is never trusted here.
pub fn create_order(
    user_id: Uuid,
    delivery_address: String,
    conn: &mut PgConnection,
) -> Result<(models::Order, Vec<models::OrderLineItem>), CheckoutError> {
    conn.transaction(|conn| {
        // Locking the cart row serializes checkout against concurrent cart
        // mutations for the same user. A missing row counts as an empty cart.
        match schema::carts::table
            .select(models::Cart::as_select())
            .find(user_id)
            .for_update()
            .get_result::<models::Cart>(conn)
        {
            Ok(_) => {}
            Err(diesel::result::Error::NotFound) => return Err(CheckoutError::CartEmpty),
            Err(e) => return Err(CheckoutError::Database(e)),
        };

        let lines = schema::cart_line_items::table
            .select(models::CartLineItem::as_select())
            .filter(schema::cart_line_items::cart_user_id.eq(user_id))
            .order((
                schema::cart_line_items::created_at.asc(),
                schema::cart_line_items::id.asc(),
            ))
            .get_results::<models::CartLineItem>(conn)?;
        if lines.is_empty() {
            return Err(CheckoutError::CartEmpty);
        }

        let menu_item_ids = lines.iter().map(|l| l.menu_item_id).collect::<Vec<_>>();
        let menu_items = schema::menu_items::table
            .select(models::MenuItem::as_select())
            .filter(schema::menu_items::id.eq_any(&menu_item_ids))
            .get_results::<models::MenuItem>(conn)?
            .into_iter()
            .map(|i| (i.id, i))
            .collect::<HashMap<_, _>>();

        let paired = lines
            .iter()
            .map(|line| {
                let item = menu_items
                    .get(&line.menu_item_id)
                    .ok_or(CheckoutError::MenuItemNotFound)?;
                Ok((line, item))
            })
            .collect::<Result<Vec<_>, CheckoutError>>()?;

        let restaurant_id = paired[0].1.restaurant_id;
        if paired.iter().any(|(_, item)| item.restaurant_id != restaurant_id) {
            return Err(CheckoutError::MixedRestaurants);
        }

        let order_id = Uuid::new_v4();
        let order_lines = paired
            .iter()
            .map(|(line, item)| models::OrderLineItem {
                id: Uuid::new_v4(),
                order_id,
                menu_item_id: item.id,
                name: item.name.clone(),
                quantity: line.quantity,
                unit_price: item.price.clone(),
                line_total: item.price.clone() * BigDecimal::from(line.quantity),
            })
            .collect::<Vec<_>>();

        let subtotal = order_lines
            .iter()
            .map(|l| l.line_total.clone())
            .sum::<BigDecimal>();
        let charges = compute_charges(subtotal);

        let order = models::Order {
            id: order_id,
            user_id,
            restaurant_id,
            state: models::OrderState::Pending,
            payment_state: models::PaymentState::Pending,
            subtotal: charges.subtotal,
            tax: charges.tax,
            delivery_fee: charges.delivery_fee,
            total_amount: charges.total_amount,
            delivery_address,
            created_at: Utc::now(),
        };

        insert_into(schema::orders::table)
            .values(&order)
            .execute(conn)?;
        insert_into(schema::order_line_items::table)
            .values(&order_lines)
            .execute(conn)?;

        let mut publisher = OrderEventPublisher::new(conn);
        publisher.order_created(&order, &order_lines)?;

        // The cart is emptied only once the order rows are in; a rollback
        // anywhere above leaves it untouched.
        delete(
            schema::cart_line_items::table
                .filter(schema::cart_line_items::cart_user_id.eq(user_id)),
        )
        .execute(conn)?;
        update(schema::carts::table.find(user_id))
            .set((
                schema::carts::total_price.eq(BigDecimal::from(0)),
                schema::carts::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?;

        Ok((order, order_lines))
    })
}

pub fn update_order_status(
    order_id: Uuid,
    caller_restaurant_id: Uuid,
    new_state: models::OrderState,
    conn: &mut PgConnection,
) -> Result<(models::Order, Vec<models::OrderLineItem>), CheckoutError> {
    conn.transaction(|conn| {
        let mut order = schema::orders::table
            .select(models::Order::as_select())
            .find(&order_id)
            .for_update()
            .get_result::<models::Order>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => CheckoutError::OrderNotFound,
                e => CheckoutError::Database(e),
            })?;

        if order.restaurant_id != caller_restaurant_id {
            return Err(CheckoutError::NotOrderOwner);
        }
        if !order.state.can_transition_to(new_state) {
            return Err(CheckoutError::InvalidTransition {
                from: order.state,
                to: new_state,
            });
        }

        update(schema::orders::table.find(&order_id))
            .set(schema::orders::state.eq(new_state))
            .execute(conn)?;
        order.state = new_state;

        let mut publisher = OrderEventPublisher::new(conn);
        publisher.order_status_changed(&order)?;

        let line_items = schema::order_line_items::table
            .select(models::OrderLineItem::as_select())
            .filter(schema::order_line_items::order_id.eq(&order_id))
            .get_results(conn)?;

        Ok((order, line_items))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charges_apply_flat_tax_and_delivery_fee() {
        let charges = compute_charges(BigDecimal::from(100));
        assert_eq!(charges.subtotal, BigDecimal::from(100));
        assert_eq!(charges.tax, BigDecimal::from_str("5.00").unwrap());
        assert_eq!(charges.delivery_fee, BigDecimal::from(50));
        assert_eq!(charges.total_amount, BigDecimal::from_str("155.00").unwrap());
    }

    #[test]
    fn zero_subtotal_still_pays_delivery() {
        let charges = compute_charges(BigDecimal::from(0));
        assert_eq!(charges.tax, BigDecimal::from(0));
        assert_eq!(charges.total_amount, BigDecimal::from(50));
    }

    #[test]
    fn fractional_subtotals_stay_exact() {
        let charges = compute_charges(BigDecimal::from_str("199.90").unwrap());
        assert_eq!(charges.tax, BigDecimal::from_str("9.995").unwrap());
        assert_eq!(
            charges.total_amount,
            BigDecimal::from_str("259.895").unwrap()
        );
    }
}
