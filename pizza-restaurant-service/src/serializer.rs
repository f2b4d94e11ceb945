//! Transmittable views of the catalog records.
//!
//! Each view expands the relationships of its root exactly once. Nested
//! association records never point back at the record that contains them, and
//! parents nested under an association never carry their `restaurant_pizzas`.

use serde::Serialize;

use crate::models::{Pizza, Price, Restaurant, RestaurantPizza};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RestaurantSummary {
    pub id: i32,
    pub name: String,
    pub address: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PizzaSummary {
    pub id: i32,
    pub name: String,
    pub ingredients: String,
}

/// An offering listed under its restaurant.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RestaurantOffering {
    pub id: i32,
    pub price: Price,
    pub restaurant_id: i32,
    pub pizza_id: i32,
    pub pizza: PizzaSummary,
}

/// An offering listed under its pizza.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PizzaOffering {
    pub id: i32,
    pub price: Price,
    pub restaurant_id: i32,
    pub pizza_id: i32,
    pub restaurant: RestaurantSummary,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RestaurantDetails {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub restaurant_pizzas: Vec<RestaurantOffering>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PizzaDetails {
    pub id: i32,
    pub name: String,
    pub ingredients: String,
    pub restaurant_pizzas: Vec<PizzaOffering>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RestaurantPizzaDetails {
    pub id: i32,
    pub price: Price,
    pub restaurant_id: i32,
    pub pizza_id: i32,
    pub restaurant: RestaurantSummary,
    pub pizza: PizzaSummary,
}

pub fn serialize_restaurant(restaurant: &Restaurant) -> RestaurantSummary {
    RestaurantSummary {
        id: restaurant.id,
        name: restaurant.name.clone(),
        address: restaurant.address.clone(),
    }
}

pub fn serialize_pizza(pizza: &Pizza) -> PizzaSummary {
    PizzaSummary {
        id: pizza.id,
        name: pizza.name.clone(),
        ingredients: pizza.ingredients.clone(),
    }
}

pub fn serialize_restaurant_details(
    restaurant: &Restaurant,
    offerings: &[(RestaurantPizza, Pizza)],
) -> RestaurantDetails {
    RestaurantDetails {
        id: restaurant.id,
        name: restaurant.name.clone(),
        address: restaurant.address.clone(),
        restaurant_pizzas: offerings
            .iter()
            .map(|(rp, pizza)| RestaurantOffering {
                id: rp.id,
                price: rp.price,
                restaurant_id: rp.restaurant_id,
                pizza_id: rp.pizza_id,
                pizza: serialize_pizza(pizza),
            })
            .collect(),
    }
}

pub fn serialize_pizza_details(
    pizza: &Pizza,
    offerings: &[(RestaurantPizza, Restaurant)],
) -> PizzaDetails {
    PizzaDetails {
        id: pizza.id,
        name: pizza.name.clone(),
        ingredients: pizza.ingredients.clone(),
        restaurant_pizzas: offerings
            .iter()
            .map(|(rp, restaurant)| PizzaOffering {
                id: rp.id,
                price: rp.price,
                restaurant_id: rp.restaurant_id,
                pizza_id: rp.pizza_id,
                restaurant: serialize_restaurant(restaurant),
            })
            .collect(),
    }
}

pub fn serialize_restaurant_pizza_details(
    restaurant_pizza: &RestaurantPizza,
    restaurant: &Restaurant,
    pizza: &Pizza,
) -> RestaurantPizzaDetails {
    RestaurantPizzaDetails {
        id: restaurant_pizza.id,
        price: restaurant_pizza.price,
        restaurant_id: restaurant_pizza.restaurant_id,
        pizza_id: restaurant_pizza.pizza_id,
        restaurant: serialize_restaurant(restaurant),
        pizza: serialize_pizza(pizza),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::validate_price;
    use serde_json::json;

    fn karens() -> Restaurant {
        Restaurant {
            id: 1,
            name: "Karen's Pizza Shack".to_string(),
            address: "address1".to_string(),
        }
    }

    fn emma() -> Pizza {
        Pizza {
            id: 2,
            name: "Emma".to_string(),
            ingredients: "Dough, Tomato Sauce, Cheese".to_string(),
        }
    }

    fn offering(id: i32, price: i64) -> RestaurantPizza {
        RestaurantPizza {
            id,
            price: validate_price(price).unwrap(),
            restaurant_id: 1,
            pizza_id: 2,
        }
    }

    #[test]
    fn test_restaurant_summary_has_only_scalars() {
        let value = serde_json::to_value(serialize_restaurant(&karens())).unwrap();
        assert_eq!(
            value,
            json!({"id": 1, "name": "Karen's Pizza Shack", "address": "address1"})
        );
    }

    #[test]
    fn test_restaurant_details_omit_back_reference() {
        let details = serialize_restaurant_details(
            &karens(),
            &[(offering(10, 5), emma()), (offering(11, 30), emma())],
        );
        let value = serde_json::to_value(&details).unwrap();

        let nested = value["restaurant_pizzas"].as_array().unwrap();
        assert_eq!(nested.len(), 2);
        for entry in nested {
            assert!(entry.get("restaurant").is_none());
            assert_eq!(entry["restaurant_id"], json!(1));
            assert!(entry["pizza"].get("restaurant_pizzas").is_none());
        }
        assert_eq!(nested[0]["price"], json!(5));
        assert_eq!(nested[1]["pizza"]["name"], json!("Emma"));
    }

    #[test]
    fn test_pizza_details_omit_back_reference() {
        let details = serialize_pizza_details(&emma(), &[(offering(10, 7), karens())]);
        let value = serde_json::to_value(&details).unwrap();

        assert_eq!(value["ingredients"], json!("Dough, Tomato Sauce, Cheese"));
        let entry = &value["restaurant_pizzas"][0];
        assert!(entry.get("pizza").is_none());
        assert_eq!(entry["restaurant"]["address"], json!("address1"));
        assert!(entry["restaurant"].get("restaurant_pizzas").is_none());
    }

    #[test]
    fn test_restaurant_pizza_details_expose_both_parents() {
        let details = serialize_restaurant_pizza_details(&offering(10, 15), &karens(), &emma());
        let value = serde_json::to_value(&details).unwrap();

        assert_eq!(
            value,
            json!({
                "id": 10,
                "price": 15,
                "restaurant_id": 1,
                "pizza_id": 2,
                "restaurant": {"id": 1, "name": "Karen's Pizza Shack", "address": "address1"},
                "pizza": {"id": 2, "name": "Emma", "ingredients": "Dough, Tomato Sauce, Cheese"},
            })
        );
        assert!(value["restaurant"].get("restaurant_pizzas").is_none());
        assert!(value["pizza"].get("restaurant_pizzas").is_none());
    }

    #[test]
    fn test_restaurant_without_offerings() {
        let value = serde_json::to_value(serialize_restaurant_details(&karens(), &[])).unwrap();
        assert_eq!(value["restaurant_pizzas"], json!([]));
    }
}
