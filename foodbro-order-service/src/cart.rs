use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::{delete, insert_into, prelude::*, update, PgConnection};
use thiserror::Error;
use uuid::Uuid;

use crate::{models, schema};

#[derive(Error, Debug)]
pub enum CartError {
    #[error("quantity must be a positive integer")]
    InvalidQuantity,
    #[error("quantity exceeds available stock")]
    ExceedsAvailableQty,
    #[error("menu item not found")]
    MenuItemNotFound,
    #[error("cart not found")]
    CartNotFound,
    #[error("item not found in cart")]
    LineNotFound,
    #[error("unexpected internal error")]
    Database(#[from] diesel::result::Error),
}

/// A cart line priced against the current menu replica.
#[derive(Debug, PartialEq, Clone)]
pub struct PricedLine {
    pub menu_item_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub line_total: BigDecimal,
}

#[derive(Debug, PartialEq)]
pub struct CartView {
    pub user_id: Uuid,
    pub lines: Vec<PricedLine>,
    pub total_price: BigDecimal,
}

impl CartView {
    pub fn empty(user_id: Uuid) -> Self {
        CartView {
            user_id,
            lines: vec![],
            total_price: BigDecimal::from(0),
        }
    }
}

fn priced(line: &models::CartLineItem, item: &models::MenuItem) -> PricedLine {
    let line_total = item.price.clone() * BigDecimal::from(line.quantity);
    PricedLine {
        menu_item_id: line.menu_item_id,
        name: item.name.clone(),
        quantity: line.quantity,
        unit_price: item.price.clone(),
        line_total,
    }
}

pub fn total_of(lines: &[PricedLine]) -> BigDecimal {
    lines.iter().map(|l| l.line_total.clone()).sum()
}

fn lock_cart(user_id: Uuid, conn: &mut PgConnection) -> Result<models::Cart, CartError> {
    schema::carts::table
        .select(models::Cart::as_select())
        .find(user_id)
        .for_update()
        .get_result::<models::Cart>(conn)
        .map_err(|e| match e {
            diesel::result::Error::NotFound => CartError::CartNotFound,
            e => CartError::Database(e),
        })
}

fn find_menu_item(menu_item_id: Uuid, conn: &mut PgConnection) -> Result<models::MenuItem, CartError> {
    schema::menu_items::table
        .select(models::MenuItem::as_select())
        .find(menu_item_id)
        .get_result::<models::MenuItem>(conn)
        .map_err(|e| match e {
            diesel::result::Error::NotFound => CartError::MenuItemNotFound,
            e => CartError::Database(e),
        })
}

/// Prices every line of the cart against the replica's current prices.
/// Insertion order is preserved.
fn load_view(user_id: Uuid, conn: &mut PgConnection) -> Result<CartView, CartError> {
    let lines = schema::cart_line_items::table
        .select(models::CartLineItem::as_select())
        .filter(schema::cart_line_items::cart_user_id.eq(user_id))
        .order((
            schema::cart_line_items::created_at.asc(),
            schema::cart_line_items::id.asc(),
        ))
        .get_results::<models::CartLineItem>(conn)?;

    let menu_item_ids = lines.iter().map(|l| l.menu_item_id).collect::<Vec<_>>();
    let menu_items = schema::menu_items::table
        .select(models::MenuItem::as_select())
        .filter(schema::menu_items::id.eq_any(&menu_item_ids))
        .get_results::<models::MenuItem>(conn)?
        .into_iter()
        .map(|i| (i.id, i))
        .collect::<HashMap<_, _>>();

    let priced_lines = lines
        .iter()
        .map(|line| {
            let item = menu_items
                .get(&line.menu_item_id)
                .ok_or(CartError::MenuItemNotFound)?;
            Ok(priced(line, item))
        })
        .collect::<Result<Vec<_>, CartError>>()?;

    let total_price = total_of(&priced_lines);
    Ok(CartView {
        user_id,
        lines: priced_lines,
        total_price,
    })
}

/// Reprices the cart from the replica and writes the new total back. Called
/// after every mutation; the stored total is never adjusted incrementally.
fn refresh_total(user_id: Uuid, conn: &mut PgConnection) -> Result<CartView, CartError> {
    let view = load_view(user_id, conn)?;
    update(schema::carts::table.find(user_id))
        .set((
            schema::carts::total_price.eq(&view.total_price),
            schema::carts::updated_at.eq(Utc::now()),
        ))
        .execute(conn)?;
    Ok(view)
}

pub fn get_cart(user_id: Uuid, conn: &mut PgConnection) -> Result<CartView, CartError> {
    let cart = schema::carts::table
        .select(models::Cart::as_select())
        .find(user_id)
        .first::<models::Cart>(conn)
        .optional()?;

    match cart {
        None => Ok(CartView::empty(user_id)),
        Some(_) => load_view(user_id, conn),
    }
}

pub fn add_item(
    user_id: Uuid,
    menu_item_id: Uuid,
    quantity: i32,
    conn: &mut PgConnection,
) -> Result<CartView, CartError> {
    if quantity <= 0 {
        return Err(CartError::InvalidQuantity);
    }

    conn.transaction(|conn| {
        // Create-if-absent keeps one cart per user even when two first adds
        // race; the row lock below serializes the rest.
        insert_into(schema::carts::table)
            .values((
                schema::carts::user_id.eq(user_id),
                schema::carts::total_price.eq(BigDecimal::from(0)),
            ))
            .on_conflict_do_nothing()
            .execute(conn)?;

        lock_cart(user_id, conn)?;

        let menu_item = find_menu_item(menu_item_id, conn)?;

        let existing = schema::cart_line_items::table
            .select(models::CartLineItem::as_select())
            .filter(schema::cart_line_items::cart_user_id.eq(user_id))
            .filter(schema::cart_line_items::menu_item_id.eq(menu_item_id))
            .first::<models::CartLineItem>(conn)
            .optional()?;

        let new_quantity = existing.as_ref().map(|l| l.quantity).unwrap_or(0) + quantity;
        if new_quantity > menu_item.available_qty {
            return Err(CartError::ExceedsAvailableQty);
        }

        match existing {
            Some(line) => {
                update(schema::cart_line_items::table.find(line.id))
                    .set(schema::cart_line_items::quantity.eq(new_quantity))
                    .execute(conn)?;
            }
            None => {
                insert_into(schema::cart_line_items::table)
                    .values(&models::CartLineItem {
                        id: Uuid::new_v4(),
                        cart_user_id: user_id,
                        menu_item_id,
                        quantity,
                        created_at: Utc::now(),
                    })
                    .execute(conn)?;
            }
        }

        refresh_total(user_id, conn)
    })
}

pub fn update_item_quantity(
    user_id: Uuid,
    menu_item_id: Uuid,
    quantity: i32,
    conn: &mut PgConnection,
) -> Result<CartView, CartError> {
    if quantity <= 0 {
        return Err(CartError::InvalidQuantity);
    }

    conn.transaction(|conn| {
        lock_cart(user_id, conn)?;

        let line = schema::cart_line_items::table
            .select(models::CartLineItem::as_select())
            .filter(schema::cart_line_items::cart_user_id.eq(user_id))
            .filter(schema::cart_line_items::menu_item_id.eq(menu_item_id))
            .first::<models::CartLineItem>(conn)
            .optional()?
            .ok_or(CartError::LineNotFound)?;

        let menu_item = find_menu_item(menu_item_id, conn)?;
        if quantity > menu_item.available_qty {
            return Err(CartError::ExceedsAvailableQty);
        }

        update(schema::cart_line_items::table.find(line.id))
            .set(schema::cart_line_items::quantity.eq(quantity))
            .execute(conn)?;

        refresh_total(user_id, conn)
    })
}

pub fn remove_item(
    user_id: Uuid,
    menu_item_id: Uuid,
    conn: &mut PgConnection,
) -> Result<CartView, CartError> {
    conn.transaction(|conn| {
        lock_cart(user_id, conn)?;

        let deleted = delete(
            schema::cart_line_items::table
                .filter(schema::cart_line_items::cart_user_id.eq(user_id))
                .filter(schema::cart_line_items::menu_item_id.eq(menu_item_id)),
        )
        .execute(conn)?;
        if deleted == 0 {
            return Err(CartError::LineNotFound);
        }

        refresh_total(user_id, conn)
    })
}

pub fn clear_cart(user_id: Uuid, conn: &mut PgConnection) -> Result<CartView, CartError> {
    conn.transaction(|conn| {
        lock_cart(user_id, conn)?;

        delete(
            schema::cart_line_items::table
                .filter(schema::cart_line_items::cart_user_id.eq(user_id)),
        )
        .execute(conn)?;

        refresh_total(user_id, conn)
    })
}
