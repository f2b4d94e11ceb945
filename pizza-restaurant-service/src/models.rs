use std::fmt;

use diesel::{
    backend::Backend,
    deserialize::{self, FromSql, FromSqlRow},
    expression::AsExpression,
    prelude::*,
    serialize::{self, Output, ToSql},
    sql_types::Integer,
    sqlite::Sqlite,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::{pizzas, restaurant_pizzas, restaurants};

pub const MIN_PRICE: i64 = 1;
pub const MAX_PRICE: i64 = 30;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid price {value}: must be between {min} and {max}", min = MIN_PRICE, max = MAX_PRICE)]
    Price { value: i64 },
}

/// Checks a candidate price against the allowed range and returns it unchanged
/// when it fits.
pub fn validate_price(value: i64) -> Result<Price, ValidationError> {
    if (MIN_PRICE..=MAX_PRICE).contains(&value) {
        Ok(Price(value as i32))
    } else {
        Err(ValidationError::Price { value })
    }
}

/// Price of a pizza at a restaurant. Only obtainable through [`validate_price`],
/// so every value held in memory or read back from the database is in range.
#[derive(
    FromSqlRow,
    AsExpression,
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[diesel(sql_type = Integer)]
#[serde(try_from = "i64", into = "i32")]
pub struct Price(i32);

impl Price {
    pub fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i64> for Price {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        validate_price(value)
    }
}

impl From<Price> for i32 {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql<Integer, Sqlite> for Price {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        <i32 as ToSql<Integer, Sqlite>>::to_sql(&self.0, out)
    }
}

impl FromSql<Integer, Sqlite> for Price {
    fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let value = <i32 as FromSql<Integer, Sqlite>>::from_sql(bytes)?;
        Ok(validate_price(value.into())?)
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = restaurants)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Restaurant {
    pub id: i32,
    pub name: String,
    pub address: String,
}

#[derive(Insertable, Debug, PartialEq)]
#[diesel(table_name = restaurants)]
pub struct NewRestaurant<'a> {
    pub name: &'a str,
    pub address: &'a str,
}

#[derive(AsChangeset, Default, Debug, PartialEq)]
#[diesel(table_name = restaurants)]
pub struct RestaurantChanges {
    pub name: Option<String>,
    pub address: Option<String>,
}

impl RestaurantChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.address.is_none()
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = pizzas)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Pizza {
    pub id: i32,
    pub name: String,
    pub ingredients: String,
}

#[derive(Insertable, Debug, PartialEq)]
#[diesel(table_name = pizzas)]
pub struct NewPizza<'a> {
    pub name: &'a str,
    pub ingredients: &'a str,
}

#[derive(AsChangeset, Default, Debug, PartialEq)]
#[diesel(table_name = pizzas)]
pub struct PizzaChanges {
    pub name: Option<String>,
    pub ingredients: Option<String>,
}

impl PizzaChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.ingredients.is_none()
    }
}

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Restaurant))]
#[diesel(belongs_to(Pizza))]
#[diesel(table_name = restaurant_pizzas)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RestaurantPizza {
    pub id: i32,
    pub price: Price,
    pub restaurant_id: i32,
    pub pizza_id: i32,
}

impl RestaurantPizza {
    /// Replaces the price. On error the current price is left untouched.
    pub fn set_price(&mut self, value: i64) -> Result<(), ValidationError> {
        self.price = validate_price(value)?;
        Ok(())
    }
}

#[derive(Insertable, Debug, PartialEq)]
#[diesel(table_name = restaurant_pizzas)]
pub struct NewRestaurantPizza {
    pub price: Price,
    pub restaurant_id: i32,
    pub pizza_id: i32,
}

impl NewRestaurantPizza {
    pub fn new(restaurant_id: i32, pizza_id: i32, price: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            price: validate_price(price)?,
            restaurant_id,
            pizza_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_price_accepts_whole_range() {
        for p in MIN_PRICE..=MAX_PRICE {
            let price = validate_price(p).unwrap();
            assert_eq!(i64::from(price.get()), p);
        }
    }

    #[test]
    fn test_validate_price_rejects_out_of_range() {
        for p in [i64::MIN, -1, 0, 31, 100, i64::MAX] {
            assert_eq!(validate_price(p), Err(ValidationError::Price { value: p }));
        }
    }

    #[test]
    fn test_validate_price_boundaries() {
        assert!(validate_price(0).is_err());
        assert!(validate_price(1).is_ok());
        assert!(validate_price(15).is_ok());
        assert!(validate_price(30).is_ok());
        assert!(validate_price(31).is_err());
    }

    #[test]
    fn test_set_price_keeps_previous_value_on_error() {
        let mut restaurant_pizza = RestaurantPizza {
            id: 1,
            price: validate_price(10).unwrap(),
            restaurant_id: 1,
            pizza_id: 1,
        };

        assert!(restaurant_pizza.set_price(0).is_err());
        assert_eq!(restaurant_pizza.price.get(), 10);

        restaurant_pizza.set_price(25).unwrap();
        assert_eq!(restaurant_pizza.price.get(), 25);
    }

    #[test]
    fn test_new_restaurant_pizza_validates_price() {
        assert!(NewRestaurantPizza::new(1, 2, 31).is_err());

        let new_restaurant_pizza = NewRestaurantPizza::new(1, 2, 5).unwrap();
        assert_eq!(new_restaurant_pizza.price.get(), 5);
        assert_eq!(new_restaurant_pizza.restaurant_id, 1);
        assert_eq!(new_restaurant_pizza.pizza_id, 2);
    }

    #[test]
    fn test_price_json() {
        let price: Price = serde_json::from_str("12").unwrap();
        assert_eq!(price.get(), 12);
        assert_eq!(serde_json::to_string(&price).unwrap(), "12");
        assert!(serde_json::from_str::<Price>("0").is_err());
        assert!(serde_json::from_str::<Price>("31").is_err());
    }

    #[test]
    fn test_validation_error_message() {
        assert_eq!(
            ValidationError::Price { value: 42 }.to_string(),
            "invalid price 42: must be between 1 and 30"
        );
    }
}
