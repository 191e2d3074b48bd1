use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::{delete, insert_into, prelude::*, update, PgConnection};
use thiserror::Error;
use uuid::Uuid;

use crate::events::RestaurantEventPublisher;
use crate::{models, schema};

#[derive(Error, Debug)]
pub enum MenuError {
    #[error("menu item not found")]
    NotFound,
    #[error("menu item belongs to another restaurant")]
    NotOwner,
    #[error("{0}")]
    InvalidField(String),
    #[error("unexpected internal error")]
    Database(#[from] diesel::result::Error),
}

pub struct NewMenuItem {
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: BigDecimal,
    pub available_qty: i32,
    pub discount_percentage: f32,
    pub vegetarian: bool,
    pub image_url: Option<String>,
}

#[derive(Debug, Default)]
pub struct MenuItemChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<BigDecimal>,
    pub available_qty: Option<i32>,
    pub discount_percentage: Option<f32>,
    pub vegetarian: Option<bool>,
    pub image_url: Option<String>,
}

#[derive(Debug, Default)]
pub struct MenuFilter {
    pub search: Option<String>,
    pub max_price: Option<BigDecimal>,
    pub min_rating: Option<f32>,
    pub min_discount: Option<f32>,
    pub veg_only: bool,
}

fn validate_fields(
    name: &str,
    price: &BigDecimal,
    available_qty: i32,
    discount_percentage: f32,
) -> Result<(), MenuError> {
    if name.trim().is_empty() {
        return Err(MenuError::InvalidField("name is required".to_string()));
    }
    if *price < BigDecimal::from(0) {
        return Err(MenuError::InvalidField(
            "price must be non-negative".to_string(),
        ));
    }
    if available_qty < 0 {
        return Err(MenuError::InvalidField(
            "available quantity must be non-negative".to_string(),
        ));
    }
    if !(0.0..=100.0).contains(&discount_percentage) {
        return Err(MenuError::InvalidField(
            "discount percentage must be between 0 and 100".to_string(),
        ));
    }
    Ok(())
}

pub fn create_menu_item(
    new: NewMenuItem,
    conn: &mut PgConnection,
) -> Result<models::MenuItem, MenuError> {
    validate_fields(
        &new.name,
        &new.price,
        new.available_qty,
        new.discount_percentage,
    )?;

    let item = models::MenuItem {
        id: Uuid::new_v4(),
        restaurant_id: new.restaurant_id,
        name: new.name,
        description: new.description,
        category: new.category,
        price: new.price,
        available_qty: new.available_qty,
        discount_percentage: new.discount_percentage,
        vegetarian: new.vegetarian,
        rating: 0.0,
        image_url: new.image_url,
        created_at: Utc::now(),
    };

    conn.transaction(|conn| {
        insert_into(schema::menu_items::table)
            .values(&item)
            .execute(conn)?;

        let mut publisher = RestaurantEventPublisher::new(conn);
        publisher.menu_item_created(&item)?;

        Ok(item)
    })
}

pub fn get_menu_item(id: Uuid, conn: &mut PgConnection) -> Result<models::MenuItem, MenuError> {
    schema::menu_items::table
        .select(models::MenuItem::as_select())
        .find(&id)
        .get_result::<models::MenuItem>(conn)
        .map_err(|e| match e {
            diesel::result::Error::NotFound => MenuError::NotFound,
            e => MenuError::Database(e),
        })
}

pub fn list_menu_items(
    restaurant_id: Uuid,
    filter: MenuFilter,
    conn: &mut PgConnection,
) -> Result<Vec<models::MenuItem>, MenuError> {
    let mut query = schema::menu_items::table
        .select(models::MenuItem::as_select())
        .filter(schema::menu_items::restaurant_id.eq(restaurant_id))
        .into_boxed();

    if let Some(search) = filter.search {
        let pattern = format!("%{}%", search);
        query = query.filter(
            schema::menu_items::name
                .ilike(pattern.clone())
                .or(schema::menu_items::description.ilike(pattern.clone()))
                .or(schema::menu_items::category.ilike(pattern)),
        );
    }
    if let Some(max_price) = filter.max_price {
        query = query.filter(schema::menu_items::price.le(max_price));
    }
    if let Some(min_rating) = filter.min_rating {
        query = query.filter(schema::menu_items::rating.ge(min_rating));
    }
    if let Some(min_discount) = filter.min_discount {
        query = query.filter(schema::menu_items::discount_percentage.ge(min_discount));
    }
    if filter.veg_only {
        query = query.filter(schema::menu_items::vegetarian.eq(true));
    }

    let items = query
        .order(schema::menu_items::created_at.asc())
        .get_results(conn)?;
    Ok(items)
}

pub fn update_menu_item(
    id: Uuid,
    caller: Uuid,
    changes: MenuItemChanges,
    conn: &mut PgConnection,
) -> Result<models::MenuItem, MenuError> {
    conn.transaction(|conn| {
        let mut item = schema::menu_items::table
            .select(models::MenuItem::as_select())
            .find(&id)
            .for_update()
            .get_result::<models::MenuItem>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => MenuError::NotFound,
                e => MenuError::Database(e),
            })?;

        if item.restaurant_id != caller {
            return Err(MenuError::NotOwner);
        }

        if let Some(name) = changes.name {
            item.name = name;
        }
        if let Some(description) = changes.description {
            item.description = description;
        }
        if let Some(category) = changes.category {
            item.category = category;
        }
        if let Some(price) = changes.price {
            item.price = price;
        }
        if let Some(available_qty) = changes.available_qty {
            item.available_qty = available_qty;
        }
        if let Some(discount_percentage) = changes.discount_percentage {
            item.discount_percentage = discount_percentage;
        }
        if let Some(vegetarian) = changes.vegetarian {
            item.vegetarian = vegetarian;
        }
        if let Some(image_url) = changes.image_url {
            item.image_url = Some(image_url);
        }

        validate_fields(
            &item.name,
            &item.price,
            item.available_qty,
            item.discount_percentage,
        )?;

        update(schema::menu_items::table.find(&item.id))
            .set((
                schema::menu_items::name.eq(&item.name),
                schema::menu_items::description.eq(&item.description),
                schema::menu_items::category.eq(&item.category),
                schema::menu_items::price.eq(&item.price),
                schema::menu_items::available_qty.eq(item.available_qty),
                schema::menu_items::discount_percentage.eq(item.discount_percentage),
                schema::menu_items::vegetarian.eq(item.vegetarian),
                schema::menu_items::image_url.eq(&item.image_url),
            ))
            .execute(conn)?;

        let mut publisher = RestaurantEventPublisher::new(conn);
        publisher.menu_item_revised(&item)?;

        Ok(item)
    })
}

pub fn delete_menu_item(id: Uuid, caller: Uuid, conn: &mut PgConnection) -> Result<(), MenuError> {
    conn.transaction(|conn| {
        let item = schema::menu_items::table
            .select(models::MenuItem::as_select())
            .find(&id)
            .for_update()
            .get_result::<models::MenuItem>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => MenuError::NotFound,
                e => MenuError::Database(e),
            })?;

        if item.restaurant_id != caller {
            return Err(MenuError::NotOwner);
        }

        delete(schema::menu_items::table.find(&item.id)).execute(conn)?;

        let mut publisher = RestaurantEventPublisher::new(conn);
        publisher.menu_item_deleted(&item)?;

        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_name() {
        let err = validate_fields("  ", &BigDecimal::from(10), 5, 0.0).unwrap_err();
        assert!(matches!(err, MenuError::InvalidField(_)));
    }

    #[test]
    fn rejects_negative_price() {
        let err = validate_fields("Paneer Tikka", &BigDecimal::from(-1), 5, 0.0).unwrap_err();
        assert!(matches!(err, MenuError::InvalidField(_)));
    }

    #[test]
    fn rejects_negative_quantity() {
        let err = validate_fields("Paneer Tikka", &BigDecimal::from(10), -1, 0.0).unwrap_err();
        assert!(matches!(err, MenuError::InvalidField(_)));
    }

    #[test]
    fn rejects_discount_out_of_range() {
        let err = validate_fields("Paneer Tikka", &BigDecimal::from(10), 5, 150.0).unwrap_err();
        assert!(matches!(err, MenuError::InvalidField(_)));
        let err = validate_fields("Paneer Tikka", &BigDecimal::from(10), 5, -5.0).unwrap_err();
        assert!(matches!(err, MenuError::InvalidField(_)));
    }

    #[test]
    fn accepts_boundary_discounts() {
        assert!(validate_fields("Paneer Tikka", &BigDecimal::from(10), 5, 0.0).is_ok());
        assert!(validate_fields("Paneer Tikka", &BigDecimal::from(10), 5, 100.0).is_ok());
    }

    #[test]
    fn accepts_zero_price_and_quantity() {
        assert!(validate_fields("Water", &BigDecimal::from(0), 0, 0.0).is_ok());
    }
}
