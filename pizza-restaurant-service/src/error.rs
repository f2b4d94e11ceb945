use diesel::ConnectionError;
use thiserror::Error;

use crate::models::ValidationError;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Restaurant {0} not found")]
    RestaurantNotFound(i32),
    #[error("Pizza {0} not found")]
    PizzaNotFound(i32),
    #[error("RestaurantPizza {0} not found")]
    RestaurantPizzaNotFound(i32),
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("Failed to connect to database: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Failed to run migrations: {0}")]
    Migration(String),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::RestaurantNotFound(_)
                | CatalogError::PizzaNotFound(_)
                | CatalogError::RestaurantPizzaNotFound(_)
        )
    }
}
