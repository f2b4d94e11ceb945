use diesel::{insert_into, prelude::*, SqliteConnection};
use tracing::{debug, info, warn};

use crate::error::CatalogError;
use crate::models::{
    NewPizza, NewRestaurant, NewRestaurantPizza, Pizza, PizzaChanges, Restaurant,
    RestaurantChanges, RestaurantPizza,
};
use crate::schema::{pizzas, restaurant_pizzas, restaurants};
use crate::serializer::{
    serialize_pizza_details, serialize_restaurant_details, serialize_restaurant_pizza_details,
    PizzaDetails, RestaurantDetails, RestaurantPizzaDetails,
};

pub fn create_restaurant(
    conn: &mut SqliteConnection,
    name: &str,
    address: &str,
) -> Result<Restaurant, CatalogError> {
    let restaurant = conn.transaction::<Restaurant, CatalogError, _>(|conn| {
        Ok(insert_into(restaurants::table)
            .values(&NewRestaurant { name, address })
            .returning(Restaurant::as_returning())
            .get_result(conn)?)
    })?;

    info!(restaurant_id = restaurant.id, "created restaurant");
    Ok(restaurant)
}

pub fn update_restaurant(
    conn: &mut SqliteConnection,
    id: i32,
    changes: &RestaurantChanges,
) -> Result<Restaurant, CatalogError> {
    conn.transaction::<_, CatalogError, _>(|conn| {
        let restaurant = find_restaurant(conn, id)?;
        if changes.is_empty() {
            return Ok(restaurant);
        }

        let updated: Restaurant = diesel::update(&restaurant)
            .set(changes)
            .returning(Restaurant::as_returning())
            .get_result(conn)?;
        info!(restaurant_id = id, "updated restaurant");
        Ok(updated)
    })
}

pub fn list_restaurants(conn: &mut SqliteConnection) -> Result<Vec<Restaurant>, CatalogError> {
    Ok(restaurants::table
        .select(Restaurant::as_select())
        .order(restaurants::id.asc())
        .load(conn)?)
}

/// Every restaurant with its offerings, in id order.
pub fn list_restaurant_details(
    conn: &mut SqliteConnection,
) -> Result<Vec<RestaurantDetails>, CatalogError> {
    conn.transaction::<_, CatalogError, _>(|conn| {
        let restaurants = list_restaurants(conn)?;
        let offerings = RestaurantPizza::belonging_to(&restaurants)
            .inner_join(pizzas::table)
            .select((RestaurantPizza::as_select(), Pizza::as_select()))
            .order(restaurant_pizzas::id.asc())
            .load::<(RestaurantPizza, Pizza)>(conn)?
            .grouped_by(&restaurants);

        Ok(restaurants
            .iter()
            .zip(offerings)
            .map(|(restaurant, offerings)| serialize_restaurant_details(restaurant, &offerings))
            .collect())
    })
}

pub fn find_restaurant(conn: &mut SqliteConnection, id: i32) -> Result<Restaurant, CatalogError> {
    restaurants::table
        .find(id)
        .select(Restaurant::as_select())
        .first(conn)
        .optional()?
        .ok_or(CatalogError::RestaurantNotFound(id))
}

/// Loads a restaurant together with its offerings, each offering carrying the
/// pizza it sells.
pub fn get_restaurant(
    conn: &mut SqliteConnection,
    id: i32,
) -> Result<RestaurantDetails, CatalogError> {
    conn.transaction::<_, CatalogError, _>(|conn| {
        let restaurant = find_restaurant(conn, id)?;
        let offerings = RestaurantPizza::belonging_to(&restaurant)
            .inner_join(pizzas::table)
            .select((RestaurantPizza::as_select(), Pizza::as_select()))
            .order(restaurant_pizzas::id.asc())
            .load::<(RestaurantPizza, Pizza)>(conn)?;

        debug!(restaurant_id = id, offerings = offerings.len(), "loaded restaurant");
        Ok(serialize_restaurant_details(&restaurant, &offerings))
    })
}

/// Deletes a restaurant and every offering that references it. Returns the
/// number of offerings removed. Nothing is removed if any step fails.
pub fn delete_restaurant(conn: &mut SqliteConnection, id: i32) -> Result<usize, CatalogError> {
    conn.transaction::<_, CatalogError, _>(|conn| {
        let restaurant = find_restaurant(conn, id)?;
        let removed = diesel::delete(RestaurantPizza::belonging_to(&restaurant)).execute(conn)?;
        diesel::delete(&restaurant).execute(conn)?;

        info!(restaurant_id = id, removed, "deleted restaurant");
        Ok(removed)
    })
}

pub fn create_pizza(
    conn: &mut SqliteConnection,
    name: &str,
    ingredients: &str,
) -> Result<Pizza, CatalogError> {
    let pizza = conn.transaction::<Pizza, CatalogError, _>(|conn| {
        Ok(insert_into(pizzas::table)
            .values(&NewPizza { name, ingredients })
            .returning(Pizza::as_returning())
            .get_result(conn)?)
    })?;

    info!(pizza_id = pizza.id, "created pizza");
    Ok(pizza)
}

pub fn update_pizza(
    conn: &mut SqliteConnection,
    id: i32,
    changes: &PizzaChanges,
) -> Result<Pizza, CatalogError> {
    conn.transaction::<_, CatalogError, _>(|conn| {
        let pizza = find_pizza(conn, id)?;
        if changes.is_empty() {
            return Ok(pizza);
        }

        let updated: Pizza = diesel::update(&pizza)
            .set(changes)
            .returning(Pizza::as_returning())
            .get_result(conn)?;
        info!(pizza_id = id, "updated pizza");
        Ok(updated)
    })
}

pub fn list_pizzas(conn: &mut SqliteConnection) -> Result<Vec<Pizza>, CatalogError> {
    Ok(pizzas::table
        .select(Pizza::as_select())
        .order(pizzas::id.asc())
        .load(conn)?)
}

pub fn list_pizza_details(conn: &mut SqliteConnection) -> Result<Vec<PizzaDetails>, CatalogError> {
    conn.transaction::<_, CatalogError, _>(|conn| {
        let pizzas = list_pizzas(conn)?;
        let offerings = RestaurantPizza::belonging_to(&pizzas)
            .inner_join(restaurants::table)
            .select((RestaurantPizza::as_select(), Restaurant::as_select()))
            .order(restaurant_pizzas::id.asc())
            .load::<(RestaurantPizza, Restaurant)>(conn)?
            .grouped_by(&pizzas);

        Ok(pizzas
            .iter()
            .zip(offerings)
            .map(|(pizza, offerings)| serialize_pizza_details(pizza, &offerings))
            .collect())
    })
}

pub fn find_pizza(conn: &mut SqliteConnection, id: i32) -> Result<Pizza, CatalogError> {
    pizzas::table
        .find(id)
        .select(Pizza::as_select())
        .first(conn)
        .optional()?
        .ok_or(CatalogError::PizzaNotFound(id))
}

pub fn get_pizza(conn: &mut SqliteConnection, id: i32) -> Result<PizzaDetails, CatalogError> {
    conn.transaction::<_, CatalogError, _>(|conn| {
        let pizza = find_pizza(conn, id)?;
        let offerings = RestaurantPizza::belonging_to(&pizza)
            .inner_join(restaurants::table)
            .select((RestaurantPizza::as_select(), Restaurant::as_select()))
            .order(restaurant_pizzas::id.asc())
            .load::<(RestaurantPizza, Restaurant)>(conn)?;

        debug!(pizza_id = id, offerings = offerings.len(), "loaded pizza");
        Ok(serialize_pizza_details(&pizza, &offerings))
    })
}

pub fn delete_pizza(conn: &mut SqliteConnection, id: i32) -> Result<usize, CatalogError> {
    conn.transaction::<_, CatalogError, _>(|conn| {
        let pizza = find_pizza(conn, id)?;
        let removed = diesel::delete(RestaurantPizza::belonging_to(&pizza)).execute(conn)?;
        diesel::delete(&pizza).execute(conn)?;

        info!(pizza_id = id, removed, "deleted pizza");
        Ok(removed)
    })
}

/// Records that a restaurant sells a pizza at `price`. The price is checked
/// before anything touches the database; both parents must already exist.
pub fn create_restaurant_pizza(
    conn: &mut SqliteConnection,
    restaurant_id: i32,
    pizza_id: i32,
    price: i64,
) -> Result<RestaurantPizzaDetails, CatalogError> {
    let new_restaurant_pizza = NewRestaurantPizza::new(restaurant_id, pizza_id, price)
        .inspect_err(|err| warn!(restaurant_id, pizza_id, %err, "rejected restaurant pizza"))?;

    let details = conn.transaction::<_, CatalogError, _>(|conn| {
        let restaurant = find_restaurant(conn, restaurant_id)?;
        let pizza = find_pizza(conn, pizza_id)?;
        let restaurant_pizza: RestaurantPizza = insert_into(restaurant_pizzas::table)
            .values(&new_restaurant_pizza)
            .returning(RestaurantPizza::as_returning())
            .get_result(conn)?;

        Ok(serialize_restaurant_pizza_details(
            &restaurant_pizza,
            &restaurant,
            &pizza,
        ))
    })?;

    info!(
        restaurant_pizza_id = details.id,
        restaurant_id, pizza_id, price, "created restaurant pizza"
    );
    Ok(details)
}

pub fn find_restaurant_pizza(
    conn: &mut SqliteConnection,
    id: i32,
) -> Result<RestaurantPizza, CatalogError> {
    restaurant_pizzas::table
        .find(id)
        .select(RestaurantPizza::as_select())
        .first(conn)
        .optional()?
        .ok_or(CatalogError::RestaurantPizzaNotFound(id))
}

pub fn get_restaurant_pizza(
    conn: &mut SqliteConnection,
    id: i32,
) -> Result<RestaurantPizzaDetails, CatalogError> {
    conn.transaction::<_, CatalogError, _>(|conn| {
        let restaurant_pizza = find_restaurant_pizza(conn, id)?;
        let restaurant = find_restaurant(conn, restaurant_pizza.restaurant_id)?;
        let pizza = find_pizza(conn, restaurant_pizza.pizza_id)?;
        Ok(serialize_restaurant_pizza_details(
            &restaurant_pizza,
            &restaurant,
            &pizza,
        ))
    })
}

pub fn update_restaurant_pizza_price(
    conn: &mut SqliteConnection,
    id: i32,
    price: i64,
) -> Result<RestaurantPizzaDetails, CatalogError> {
    conn.transaction::<_, CatalogError, _>(|conn| {
        let mut restaurant_pizza = find_restaurant_pizza(conn, id)?;
        restaurant_pizza
            .set_price(price)
            .inspect_err(|err| warn!(restaurant_pizza_id = id, %err, "rejected price update"))?;

        diesel::update(&restaurant_pizza)
            .set(restaurant_pizzas::price.eq(restaurant_pizza.price))
            .execute(conn)?;
        let restaurant = find_restaurant(conn, restaurant_pizza.restaurant_id)?;
        let pizza = find_pizza(conn, restaurant_pizza.pizza_id)?;

        info!(restaurant_pizza_id = id, price, "updated restaurant pizza price");
        Ok(serialize_restaurant_pizza_details(
            &restaurant_pizza,
            &restaurant,
            &pizza,
        ))
    })
}

pub fn delete_restaurant_pizza(conn: &mut SqliteConnection, id: i32) -> Result<(), CatalogError> {
    let deleted = diesel::delete(restaurant_pizzas::table.find(id)).execute(conn)?;
    if deleted == 0 {
        return Err(CatalogError::RestaurantPizzaNotFound(id));
    }

    info!(restaurant_pizza_id = id, "deleted restaurant pizza");
    Ok(())
}
