use foodbro_proto::{common::Money, restaurant_service::MenuItem};

use crate::models;

pub fn serialize_menu_item(item: &models::MenuItem) -> MenuItem {
    MenuItem {
        id: item.id.to_string(),
        restaurant_id: item.restaurant_id.to_string(),
        name: item.name.clone(),
        description: item.description.clone(),
        category: item.category.clone(),
        price: Some(Money {
            amount: item.price.to_string(),
        }),
        available_qty: item.available_qty,
        discount_percentage: item.discount_percentage,
        vegetarian: item.vegetarian,
        rating: item.rating,
        image_url: item.image_url.clone(),
    }
}
