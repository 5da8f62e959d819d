//! Seed the database with the sample catalog.
//!
//! Inserts two users with a cart each, two items, and three cart lines:
//!
//! | User | Password | Cart contents |
//! |---|---|---|
//! | `testuser1` | `testpassword1` | `item1` x1, `item2` x2 (total 50.00) |
//! | `testuser2` | `testpassword2` | `item1` x5 (total 50.00) |
//!
//! If any sample user already exists nothing is written, so running it twice
//! is harmless.

use rust_decimal::Decimal;
use tracing::info;

use shopping_cart_api::db::{PgStore, Store};
use shopping_cart_api::models::{NewCart, NewCartItem, NewItem, NewUser};
use shopping_cart_api::services::password::hash_password;
use shopping_cart_core::{Price, Quantity, Username};

use super::{CommandError, connect};

struct SampleItem {
    name: &'static str,
    description: &'static str,
    price: Decimal,
}

struct SampleUser {
    username: &'static str,
    password: &'static str,
    /// `(index into the item list, quantity)`
    lines: &'static [(usize, i64)],
}

const USERS: [SampleUser; 2] = [
    SampleUser {
        username: "testuser1",
        password: "testpassword1",
        lines: &[(0, 1), (1, 2)],
    },
    SampleUser {
        username: "testuser2",
        password: "testpassword2",
        lines: &[(0, 5)],
    },
];

fn sample_items() -> [SampleItem; 2] {
    [
        SampleItem {
            name: "item1",
            description: "description1",
            price: Decimal::new(1000, 2),
        },
        SampleItem {
            name: "item2",
            description: "description2",
            price: Decimal::new(2000, 2),
        },
    ]
}

fn invalid(field: &'static str, err: impl ToString) -> CommandError {
    CommandError::Invalid {
        field,
        message: err.to_string(),
    }
}

/// Seed the database named by `CART_DATABASE_URL`.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let store = PgStore::new(connect().await?);
    seed(&store).await?;
    Ok(())
}

/// Insert the sample users, items, carts and cart lines into `store`.
///
/// Returns `false` without writing anything when a sample user is already
/// present.
///
/// # Errors
///
/// Returns an error if the store rejects an insert.
pub async fn seed(store: &dyn Store) -> Result<bool, CommandError> {
    let existing = store.list_users().await?;
    if let Some(user) = existing
        .iter()
        .find(|user| USERS.iter().any(|sample| sample.username == user.username.as_str()))
    {
        info!(username = %user.username, "Sample data already present, skipping");
        return Ok(false);
    }

    let mut items = Vec::new();
    for sample in sample_items() {
        let item = store
            .create_item(NewItem {
                name: sample.name.to_owned(),
                description: sample.description.to_owned(),
                price: Price::parse(sample.price).map_err(|e| invalid("price", e))?,
            })
            .await?;
        info!(item_id = %item.id, name = %item.name, "Item seeded");
        items.push(item);
    }

    for sample in &USERS {
        let user = store
            .create_user(NewUser {
                username: Username::parse(sample.username).map_err(|e| invalid("username", e))?,
                password_hash: hash_password(sample.password)?,
            })
            .await?;
        let cart = store.create_cart(NewCart { user: user.id }).await?;
        info!(user_id = %user.id, cart_id = %cart.id, username = %user.username, "User seeded");

        for &(index, quantity) in sample.lines {
            let item = items
                .get(index)
                .ok_or_else(|| invalid("item", format!("no sample item #{index}")))?;
            store
                .create_cart_item(NewCartItem {
                    cart: cart.id,
                    item: item.id,
                    quantity: Quantity::new(quantity).map_err(|e| invalid("quantity", e))?,
                })
                .await?;
        }
    }

    info!(users = USERS.len(), items = items.len(), "Seeding complete");
    Ok(true)
}
