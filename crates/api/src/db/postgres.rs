//! `PostgreSQL` entity store.
//!
//! Uniqueness, references and cascades are enforced by the schema; this module
//! translates the named constraint violations back into field errors.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use shopping_cart_core::{CartId, CartItemId, ItemId, Price, Quantity, UserId, Username};

use super::{RepositoryError, Store, violation};
use crate::models::{
    Cart, CartChanges, CartFilter, CartItem, CartItemChanges, CartItemFilter, CartLine, Item,
    ItemChanges, NewCart, NewCartItem, NewItem, NewUser, User, UserChanges,
};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    password: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;
        Ok(Self {
            id: UserId::new(row.id),
            username,
            password_hash: row.password,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: i32,
    name: String,
    description: String,
    price: Decimal,
}

impl TryFrom<ItemRow> for Item {
    type Error = RepositoryError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ItemId::new(row.id),
            name: row.name,
            description: row.description,
            price: parse_price(row.price)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: i32,
    user_id: i32,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            id: CartId::new(row.id),
            user: UserId::new(row.user_id),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: i32,
    cart_id: i32,
    item_id: i32,
    quantity: i32,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = RepositoryError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        let quantity = Quantity::new(i64::from(row.quantity)).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid quantity in database: {e}"))
        })?;
        Ok(Self {
            id: CartItemId::new(row.id),
            cart: CartId::new(row.cart_id),
            item: ItemId::new(row.item_id),
            quantity,
        })
    }
}

/// Cart item joined with its item's price.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: i32,
    cart_id: i32,
    item_id: i32,
    quantity: i32,
    price: Decimal,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let cart_item = CartItem::try_from(CartItemRow {
            id: row.id,
            cart_id: row.cart_id,
            item_id: row.item_id,
            quantity: row.quantity,
        })?;
        Ok(Self {
            cart_item,
            unit_price: parse_price(row.price)?,
        })
    }
}

fn parse_price(amount: Decimal) -> Result<Price, RepositoryError> {
    Price::parse(amount)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid price in database: {e}")))
}

fn collect<R, T>(rows: Vec<R>) -> Result<Vec<T>, RepositoryError>
where
    T: TryFrom<R, Error = RepositoryError>,
{
    rows.into_iter().map(T::try_from).collect()
}

// =============================================================================
// Constraint Translation
// =============================================================================

/// A foreign key the failing statement wrote: `(constraint, field, id)`.
type Reference<'a> = (&'a str, &'a str, i32);

/// Map a write failure onto field errors when it names one of our constraints.
fn translate(err: sqlx::Error, references: &[Reference<'_>]) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && let Some(constraint) = db_err.constraint()
    {
        match constraint {
            "users_username_key" => return violation::duplicate_username(),
            "carts_user_id_key" => return violation::duplicate_cart(),
            "cart_items_cart_id_item_id_key" => return violation::duplicate_cart_item(),
            _ => {}
        }
        if db_err.is_foreign_key_violation()
            && let Some((_, field, id)) = references.iter().find(|(name, ..)| *name == constraint)
        {
            return violation::missing_reference(field, id);
        }
    }
    RepositoryError::Database(err)
}

// =============================================================================
// Store
// =============================================================================

/// Entity store backed by a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // =========================================================================
    // Users
    // =========================================================================

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, UserRow>("SELECT id, username, password FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn create_user(&self, new: NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (username, password)
            VALUES ($1, $2)
            RETURNING id, username, password
            ",
        )
        .bind(&new.username)
        .bind(&new.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| translate(e, &[]))?;
        User::try_from(row)
    }

    async fn update_user(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(
            r"
            UPDATE users
            SET username = COALESCE($2, username),
                password = COALESCE($3, password)
            WHERE id = $1
            RETURNING id, username, password
            ",
        )
        .bind(id)
        .bind(changes.username.as_ref())
        .bind(changes.password_hash.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| translate(e, &[]))?
        .map(User::try_from)
        .transpose()
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Items
    // =========================================================================

    async fn list_items(&self) -> Result<Vec<Item>, RepositoryError> {
        let rows = sqlx::query_as::<_, ItemRow>(
            "SELECT id, name, description, price FROM items ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        sqlx::query_as::<_, ItemRow>(
            "SELECT id, name, description, price FROM items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Item::try_from)
        .transpose()
    }

    async fn create_item(&self, new: NewItem) -> Result<Item, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r"
            INSERT INTO items (name, description, price)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, price
            ",
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| translate(e, &[]))?;
        Item::try_from(row)
    }

    async fn update_item(
        &self,
        id: ItemId,
        changes: ItemChanges,
    ) -> Result<Option<Item>, RepositoryError> {
        sqlx::query_as::<_, ItemRow>(
            r"
            UPDATE items
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price)
            WHERE id = $1
            RETURNING id, name, description, price
            ",
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.price)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| translate(e, &[]))?
        .map(Item::try_from)
        .transpose()
    }

    async fn delete_item(&self, id: ItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Carts
    // =========================================================================

    async fn list_carts(&self, filter: CartFilter) -> Result<Vec<Cart>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartRow>(
            r"
            SELECT id, user_id
            FROM carts
            WHERE ($1::INTEGER IS NULL OR user_id = $1)
            ORDER BY id
            ",
        )
        .bind(filter.user)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Cart::from).collect())
    }

    async fn get_cart(&self, id: CartId) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>("SELECT id, user_id FROM carts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Cart::from))
    }

    async fn cart_for_user(&self, user: UserId) -> Result<Option<Cart>, RepositoryError> {
        let row =
            sqlx::query_as::<_, CartRow>("SELECT id, user_id FROM carts WHERE user_id = $1")
                .bind(user)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Cart::from))
    }

    async fn create_cart(&self, new: NewCart) -> Result<Cart, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            "INSERT INTO carts (user_id) VALUES ($1) RETURNING id, user_id",
        )
        .bind(new.user)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| translate(e, &[("carts_user_id_fkey", "user", new.user.as_i32())]))?;
        Ok(Cart::from(row))
    }

    async fn update_cart(
        &self,
        id: CartId,
        changes: CartChanges,
    ) -> Result<Option<Cart>, RepositoryError> {
        let references: Vec<Reference<'_>> = changes
            .user
            .map(|user| ("carts_user_id_fkey", "user", user.as_i32()))
            .into_iter()
            .collect();
        let row = sqlx::query_as::<_, CartRow>(
            r"
            UPDATE carts
            SET user_id = COALESCE($2, user_id)
            WHERE id = $1
            RETURNING id, user_id
            ",
        )
        .bind(id)
        .bind(changes.user)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| translate(e, &references))?;
        Ok(row.map(Cart::from))
    }

    async fn delete_cart(&self, id: CartId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM carts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn cart_lines(&self, cart: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT ci.id, ci.cart_id, ci.item_id, ci.quantity, i.price
            FROM cart_items ci
            JOIN items i ON i.id = ci.item_id
            WHERE ci.cart_id = $1
            ORDER BY ci.id
            ",
        )
        .bind(cart)
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    // =========================================================================
    // Cart items
    // =========================================================================

    async fn list_cart_items(
        &self,
        filter: CartItemFilter,
    ) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT ci.id, ci.cart_id, ci.item_id, ci.quantity
            FROM cart_items ci
            JOIN carts c ON c.id = ci.cart_id
            WHERE ($1::INTEGER IS NULL OR c.user_id = $1)
              AND ($2::INTEGER IS NULL OR ci.cart_id = $2)
            ORDER BY ci.id
            ",
        )
        .bind(filter.user)
        .bind(filter.cart)
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn get_cart_item(&self, id: CartItemId) -> Result<Option<CartItem>, RepositoryError> {
        sqlx::query_as::<_, CartItemRow>(
            "SELECT id, cart_id, item_id, quantity FROM cart_items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(CartItem::try_from)
        .transpose()
    }

    async fn create_cart_item(&self, new: NewCartItem) -> Result<CartItem, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(
            r"
            INSERT INTO cart_items (cart_id, item_id, quantity)
            VALUES ($1, $2, $3)
            RETURNING id, cart_id, item_id, quantity
            ",
        )
        .bind(new.cart)
        .bind(new.item)
        .bind(new.quantity)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            translate(
                e,
                &[
                    ("cart_items_cart_id_fkey", "cart", new.cart.as_i32()),
                    ("cart_items_item_id_fkey", "item", new.item.as_i32()),
                ],
            )
        })?;
        CartItem::try_from(row)
    }

    async fn update_cart_item(
        &self,
        id: CartItemId,
        changes: CartItemChanges,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let references: Vec<Reference<'_>> = [
            changes
                .cart
                .map(|cart| ("cart_items_cart_id_fkey", "cart", cart.as_i32())),
            changes
                .item
                .map(|item| ("cart_items_item_id_fkey", "item", item.as_i32())),
        ]
        .into_iter()
        .flatten()
        .collect();
        sqlx::query_as::<_, CartItemRow>(
            r"
            UPDATE cart_items
            SET cart_id = COALESCE($2, cart_id),
                item_id = COALESCE($3, item_id),
                quantity = COALESCE($4, quantity)
            WHERE id = $1
            RETURNING id, cart_id, item_id, quantity
            ",
        )
        .bind(id)
        .bind(changes.cart)
        .bind(changes.item)
        .bind(changes.quantity)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| translate(e, &references))?
        .map(CartItem::try_from)
        .transpose()
    }

    async fn delete_cart_item(&self, id: CartItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
