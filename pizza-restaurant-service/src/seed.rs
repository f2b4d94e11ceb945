use diesel::{insert_into, prelude::*, SqliteConnection};
use tracing::info;

use crate::error::CatalogError;
use crate::models::{NewPizza, NewRestaurant, NewRestaurantPizza, Pizza, Restaurant};
use crate::schema::{pizzas, restaurant_pizzas, restaurants};

const RESTAURANTS: [(&str, &str); 3] = [
    ("Karen's Pizza Shack", "address1"),
    ("Sanjay's Pizza", "address2"),
    ("Kiki's Pizza", "address3"),
];

const PIZZAS: [(&str, &str); 3] = [
    ("Emma", "Dough, Tomato Sauce, Cheese"),
    ("Geri", "Dough, Tomato Sauce, Cheese, Pepperoni"),
    ("Melanie", "Dough, Sauce, Ricotta, Red peppers, Mustard"),
];

/// Prices for the n-th restaurant selling the n-th pizza.
const PRICES: [i64; 3] = [1, 4, 5];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub restaurants: usize,
    pub pizzas: usize,
    pub restaurant_pizzas: usize,
}

/// Wipes the catalog and loads the demo data set.
pub fn seed(conn: &mut SqliteConnection) -> Result<SeedSummary, CatalogError> {
    let summary = conn.transaction::<_, CatalogError, _>(|conn| {
        diesel::delete(restaurant_pizzas::table).execute(conn)?;
        diesel::delete(restaurants::table).execute(conn)?;
        diesel::delete(pizzas::table).execute(conn)?;

        let seeded_restaurants = RESTAURANTS
            .iter()
            .map(|&(name, address)| {
                insert_into(restaurants::table)
                    .values(&NewRestaurant { name, address })
                    .returning(Restaurant::as_returning())
                    .get_result(conn)
            })
            .collect::<QueryResult<Vec<Restaurant>>>()?;

        let seeded_pizzas = PIZZAS
            .iter()
            .map(|&(name, ingredients)| {
                insert_into(pizzas::table)
                    .values(&NewPizza { name, ingredients })
                    .returning(Pizza::as_returning())
                    .get_result(conn)
            })
            .collect::<QueryResult<Vec<Pizza>>>()?;

        let offerings = seeded_restaurants
            .iter()
            .zip(&seeded_pizzas)
            .zip(PRICES)
            .map(|((restaurant, pizza), price)| {
                NewRestaurantPizza::new(restaurant.id, pizza.id, price)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let seeded_offerings = insert_into(restaurant_pizzas::table)
            .values(&offerings)
            .execute(conn)?;

        Ok(SeedSummary {
            restaurants: seeded_restaurants.len(),
            pizzas: seeded_pizzas.len(),
            restaurant_pizzas: seeded_offerings,
        })
    })?;

    info!(
        restaurants = summary.restaurants,
        pizzas = summary.pizzas,
        restaurant_pizzas = summary.restaurant_pizzas,
        "seeded catalog"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{create_restaurant, get_restaurant, list_pizzas, list_restaurants};
    use crate::test_connection;

    #[test]
    fn test_seed() {
        let conn = &mut test_connection();

        let summary = seed(conn).unwrap();
        assert_eq!(
            summary,
            SeedSummary {
                restaurants: 3,
                pizzas: 3,
                restaurant_pizzas: 3,
            }
        );

        let restaurants = list_restaurants(conn).unwrap();
        assert_eq!(restaurants[0].name, "Karen's Pizza Shack");

        let details = get_restaurant(conn, restaurants[1].id).unwrap();
        assert_eq!(details.restaurant_pizzas.len(), 1);
        assert_eq!(details.restaurant_pizzas[0].pizza.name, "Geri");
        assert_eq!(details.restaurant_pizzas[0].price.get(), 4);
    }

    #[test]
    fn test_seed_replaces_existing_rows() {
        let conn = &mut test_connection();
        create_restaurant(conn, "Leftover", "nowhere").unwrap();

        seed(conn).unwrap();
        seed(conn).unwrap();

        let restaurants = list_restaurants(conn).unwrap();
        assert_eq!(restaurants.len(), 3);
        assert!(restaurants.iter().all(|r| r.name != "Leftover"));
        assert_eq!(list_pizzas(conn).unwrap().len(), 3);
    }
}
