use std::error::Error;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::error;
use tracing_subscriber::EnvFilter;

use pizza_restaurant_service::config::Config;
use pizza_restaurant_service::models::{PizzaChanges, RestaurantChanges};
use pizza_restaurant_service::serializer::{serialize_pizza, serialize_restaurant};
use pizza_restaurant_service::{establish_connection, run_migrations, seed, service, CatalogError};

const EXIT_FAILURE: u8 = 1;
const EXIT_NOT_FOUND: u8 = 2;

#[derive(Parser)]
#[command(version, about = "Pizza restaurant catalog")]
struct Cli {
    /// SQLite database file. Overrides DATABASE_URL.
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations and exit
    Migrate,
    /// Replace all rows with the demo catalog
    Seed,
    Restaurants,
    Restaurant {
        id: i32,
    },
    CreateRestaurant {
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: String,
    },
    UpdateRestaurant {
        id: i32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    DeleteRestaurant {
        id: i32,
    },
    Pizzas,
    Pizza {
        id: i32,
    },
    CreatePizza {
        #[arg(long)]
        name: String,
        #[arg(long)]
        ingredients: String,
    },
    UpdatePizza {
        id: i32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        ingredients: Option<String>,
    },
    DeletePizza {
        id: i32,
    },
    /// Offer a pizza at a restaurant
    Offer {
        restaurant_id: i32,
        pizza_id: i32,
        #[arg(allow_negative_numbers = true)]
        price: i64,
    },
    /// Change the price of an offering
    Reprice {
        id: i32,
        #[arg(allow_negative_numbers = true)]
        price: i64,
    },
    RestaurantPizza {
        id: i32,
    },
    DeleteRestaurantPizza {
        id: i32,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = Config::from_env()?;
    if let Some(database_url) = cli.database_url {
        config.database_url = database_url;
    }

    let conn = &mut establish_connection(&config.database_url)?;
    let applied = run_migrations(conn)?;

    match cli.command {
        Commands::Migrate => println!("applied {} migration(s)", applied),
        Commands::Seed => {
            let summary = seed::seed(conn)?;
            println!(
                "seeded {} restaurants, {} pizzas, {} restaurant pizzas",
                summary.restaurants, summary.pizzas, summary.restaurant_pizzas
            );
        }
        Commands::Restaurants => {
            print_json(&service::list_restaurant_details(conn)?)?;
        }
        Commands::Restaurant { id } => print_json(&service::get_restaurant(conn, id)?)?,
        Commands::CreateRestaurant { name, address } => {
            let restaurant = service::create_restaurant(conn, &name, &address)?;
            print_json(&serialize_restaurant(&restaurant))?;
        }
        Commands::UpdateRestaurant { id, name, address } => {
            let restaurant =
                service::update_restaurant(conn, id, &RestaurantChanges { name, address })?;
            print_json(&serialize_restaurant(&restaurant))?;
        }
        Commands::DeleteRestaurant { id } => {
            let removed = service::delete_restaurant(conn, id)?;
            println!("deleted restaurant {} and {} restaurant pizza(s)", id, removed);
        }
        Commands::Pizzas => {
            print_json(&service::list_pizza_details(conn)?)?;
        }
        Commands::Pizza { id } => print_json(&service::get_pizza(conn, id)?)?,
        Commands::CreatePizza { name, ingredients } => {
            let pizza = service::create_pizza(conn, &name, &ingredients)?;
            print_json(&serialize_pizza(&pizza))?;
        }
        Commands::UpdatePizza {
            id,
            name,
            ingredients,
        } => {
            let pizza = service::update_pizza(conn, id, &PizzaChanges { name, ingredients })?;
            print_json(&serialize_pizza(&pizza))?;
        }
        Commands::DeletePizza { id } => {
            let removed = service::delete_pizza(conn, id)?;
            println!("deleted pizza {} and {} restaurant pizza(s)", id, removed);
        }
        Commands::Offer {
            restaurant_id,
            pizza_id,
            price,
        } => print_json(&service::create_restaurant_pizza(
            conn,
            restaurant_id,
            pizza_id,
            price,
        )?)?,
        Commands::Reprice { id, price } => {
            print_json(&service::update_restaurant_pizza_price(conn, id, price)?)?;
        }
        Commands::RestaurantPizza { id } => {
            print_json(&service::get_restaurant_pizza(conn, id)?)?
        }
        Commands::DeleteRestaurantPizza { id } => {
            service::delete_restaurant_pizza(conn, id)?;
            println!("deleted restaurant pizza {}", id);
        }
    }

    Ok(())
}

fn exit_status(err: &(dyn Error + 'static)) -> u8 {
    match err.downcast_ref::<CatalogError>() {
        Some(err) if err.is_not_found() => EXIT_NOT_FOUND,
        _ => EXIT_FAILURE,
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "command failed");
            eprintln!("error: {}", err);
            ExitCode::from(exit_status(err.as_ref()))
        }
    }
}
