//! In-process entity store.
//!
//! Mirrors the `PostgreSQL` schema: the same unique keys, the same reference
//! checks and the same cascades. Ids come from per-table sequences and are
//! never reused. All tables sit behind one lock, so each operation is atomic.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use shopping_cart_core::{CartId, CartItemId, ItemId, UserId};

use super::{RepositoryError, Store, violation};
use crate::models::{
    Cart, CartChanges, CartFilter, CartItem, CartItemChanges, CartItemFilter, CartLine, Item,
    ItemChanges, NewCart, NewCartItem, NewItem, NewUser, User, UserChanges,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    items: BTreeMap<ItemId, Item>,
    carts: BTreeMap<CartId, Cart>,
    cart_items: BTreeMap<CartItemId, CartItem>,
    sequences: Sequences,
}

/// Last id handed out per table.
#[derive(Debug, Default)]
struct Sequences {
    users: i32,
    items: i32,
    carts: i32,
    cart_items: i32,
}

fn next(sequence: &mut i32) -> Result<i32, RepositoryError> {
    *sequence = sequence
        .checked_add(1)
        .ok_or_else(|| RepositoryError::DataCorruption("id sequence exhausted".to_owned()))?;
    Ok(*sequence)
}

impl Tables {
    // =========================================================================
    // Constraint checks
    // =========================================================================

    fn check_username(&self, user: &User) -> Result<(), RepositoryError> {
        let taken = self
            .users
            .values()
            .any(|other| other.id != user.id && other.username == user.username);
        if taken {
            return Err(violation::duplicate_username());
        }
        Ok(())
    }

    fn check_cart(&self, cart: &Cart) -> Result<(), RepositoryError> {
        if !self.users.contains_key(&cart.user) {
            return Err(violation::missing_reference("user", cart.user));
        }
        let taken = self
            .carts
            .values()
            .any(|other| other.id != cart.id && other.user == cart.user);
        if taken {
            return Err(violation::duplicate_cart());
        }
        Ok(())
    }

    fn check_cart_item(&self, cart_item: &CartItem) -> Result<(), RepositoryError> {
        if !self.carts.contains_key(&cart_item.cart) {
            return Err(violation::missing_reference("cart", cart_item.cart));
        }
        if !self.items.contains_key(&cart_item.item) {
            return Err(violation::missing_reference("item", cart_item.item));
        }
        let taken = self.cart_items.values().any(|other| {
            other.id != cart_item.id && other.cart == cart_item.cart && other.item == cart_item.item
        });
        if taken {
            return Err(violation::duplicate_cart_item());
        }
        Ok(())
    }

    // =========================================================================
    // Cascades
    // =========================================================================

    fn remove_cart(&mut self, id: CartId) -> bool {
        let removed = self.carts.remove(&id).is_some();
        if removed {
            self.cart_items.retain(|_, cart_item| cart_item.cart != id);
        }
        removed
    }

    fn remove_user(&mut self, id: UserId) -> bool {
        let removed = self.users.remove(&id).is_some();
        if removed {
            let carts: Vec<CartId> = self
                .carts
                .values()
                .filter(|cart| cart.user == id)
                .map(|cart| cart.id)
                .collect();
            for cart in carts {
                self.remove_cart(cart);
            }
        }
        removed
    }

    fn remove_item(&mut self, id: ItemId) -> bool {
        let removed = self.items.remove(&id).is_some();
        if removed {
            self.cart_items.retain(|_, cart_item| cart_item.item != id);
        }
        removed
    }
}

/// Entity store held in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    // =========================================================================
    // Users
    // =========================================================================

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create_user(&self, new: NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;
        let mut user = User {
            id: UserId::new(0),
            username: new.username,
            password_hash: new.password_hash,
        };
        tables.check_username(&user)?;
        user.id = UserId::new(next(&mut tables.sequences.users)?);
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<User>, RepositoryError> {
        let mut tables = self.tables.write().await;
        let Some(mut user) = tables.users.get(&id).cloned() else {
            return Ok(None);
        };
        user.apply(changes);
        tables.check_username(&user)?;
        tables.users.insert(id, user.clone());
        Ok(Some(user))
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, RepositoryError> {
        Ok(self.tables.write().await.remove_user(id))
    }

    // =========================================================================
    // Items
    // =========================================================================

    async fn list_items(&self) -> Result<Vec<Item>, RepositoryError> {
        Ok(self.tables.read().await.items.values().cloned().collect())
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        Ok(self.tables.read().await.items.get(&id).cloned())
    }

    async fn create_item(&self, new: NewItem) -> Result<Item, RepositoryError> {
        let mut tables = self.tables.write().await;
        let item = Item {
            id: ItemId::new(next(&mut tables.sequences.items)?),
            name: new.name,
            description: new.description,
            price: new.price,
        };
        tables.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn update_item(
        &self,
        id: ItemId,
        changes: ItemChanges,
    ) -> Result<Option<Item>, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(tables.items.get_mut(&id).map(|item| {
            item.apply(changes);
            item.clone()
        }))
    }

    async fn delete_item(&self, id: ItemId) -> Result<bool, RepositoryError> {
        Ok(self.tables.write().await.remove_item(id))
    }

    // =========================================================================
    // Carts
    // =========================================================================

    async fn list_carts(&self, filter: CartFilter) -> Result<Vec<Cart>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .carts
            .values()
            .filter(|cart| filter.user.is_none_or(|user| cart.user == user))
            .copied()
            .collect())
    }

    async fn get_cart(&self, id: CartId) -> Result<Option<Cart>, RepositoryError> {
        Ok(self.tables.read().await.carts.get(&id).copied())
    }

    async fn cart_for_user(&self, user: UserId) -> Result<Option<Cart>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.carts.values().find(|cart| cart.user == user).copied())
    }

    async fn create_cart(&self, new: NewCart) -> Result<Cart, RepositoryError> {
        let mut tables = self.tables.write().await;
        let mut cart = Cart {
            id: CartId::new(0),
            user: new.user,
        };
        tables.check_cart(&cart)?;
        cart.id = CartId::new(next(&mut tables.sequences.carts)?);
        tables.carts.insert(cart.id, cart);
        Ok(cart)
    }

    async fn update_cart(
        &self,
        id: CartId,
        changes: CartChanges,
    ) -> Result<Option<Cart>, RepositoryError> {
        let mut tables = self.tables.write().await;
        let Some(mut cart) = tables.carts.get(&id).copied() else {
            return Ok(None);
        };
        cart.apply(changes);
        tables.check_cart(&cart)?;
        tables.carts.insert(id, cart);
        Ok(Some(cart))
    }

    async fn delete_cart(&self, id: CartId) -> Result<bool, RepositoryError> {
        Ok(self.tables.write().await.remove_cart(id))
    }

    async fn cart_lines(&self, cart: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        let tables = self.tables.read().await;
        tables
            .cart_items
            .values()
            .filter(|cart_item| cart_item.cart == cart)
            .map(|cart_item| {
                let item = tables.items.get(&cart_item.item).ok_or_else(|| {
                    RepositoryError::DataCorruption(format!(
                        "cart item {} references missing item {}",
                        cart_item.id, cart_item.item
                    ))
                })?;
                Ok(CartLine {
                    cart_item: *cart_item,
                    unit_price: item.price,
                })
            })
            .collect()
    }

    // =========================================================================
    // Cart items
    // =========================================================================

    async fn list_cart_items(
        &self,
        filter: CartItemFilter,
    ) -> Result<Vec<CartItem>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .cart_items
            .values()
            .filter(|cart_item| filter.cart.is_none_or(|cart| cart_item.cart == cart))
            .filter(|cart_item| {
                filter.user.is_none_or(|user| {
                    tables
                        .carts
                        .get(&cart_item.cart)
                        .is_some_and(|cart| cart.user == user)
                })
            })
            .copied()
            .collect())
    }

    async fn get_cart_item(&self, id: CartItemId) -> Result<Option<CartItem>, RepositoryError> {
        Ok(self.tables.read().await.cart_items.get(&id).copied())
    }

    async fn create_cart_item(&self, new: NewCartItem) -> Result<CartItem, RepositoryError> {
        let mut tables = self.tables.write().await;
        let mut cart_item = CartItem {
            id: CartItemId::new(0),
            cart: new.cart,
            item: new.item,
            quantity: new.quantity,
        };
        tables.check_cart_item(&cart_item)?;
        cart_item.id = CartItemId::new(next(&mut tables.sequences.cart_items)?);
        tables.cart_items.insert(cart_item.id, cart_item);
        Ok(cart_item)
    }

    async fn update_cart_item(
        &self,
        id: CartItemId,
        changes: CartItemChanges,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let mut tables = self.tables.write().await;
        let Some(mut cart_item) = tables.cart_items.get(&id).copied() else {
            return Ok(None);
        };
        cart_item.apply(changes);
        tables.check_cart_item(&cart_item)?;
        tables.cart_items.insert(id, cart_item);
        Ok(Some(cart_item))
    }

    async fn delete_cart_item(&self, id: CartItemId) -> Result<bool, RepositoryError> {
        Ok(self.tables.write().await.cart_items.remove(&id).is_some())
    }
}
