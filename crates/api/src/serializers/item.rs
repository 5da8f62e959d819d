//! Item representation and input validation.

use serde::Serialize;

use shopping_cart_core::{ItemId, Price};

use super::{Body, FieldReader};
use crate::error::ApiError;
use crate::models::{Item, ItemChanges, NewItem};

/// Maximum length of an item's name and description.
pub const TEXT_MAX_LENGTH: usize = 200;

/// A catalog item as rendered to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRepresentation {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    /// Rendered as a fixed two-decimal string.
    pub price: Price,
}

impl From<Item> for ItemRepresentation {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            price: item.price,
        }
    }
}

fn read(reader: &mut FieldReader<'_>) -> (Option<String>, Option<String>, Option<Price>) {
    (
        reader.string("name", TEXT_MAX_LENGTH),
        reader.string("description", TEXT_MAX_LENGTH),
        reader.price("price"),
    )
}

/// Validate a create body.
///
/// # Errors
///
/// Returns `ApiError::Invalid` listing every bad field.
pub fn validate_new(body: &Body) -> Result<NewItem, ApiError> {
    let mut reader = FieldReader::new(body);
    let (name, description, price) = read(&mut reader);
    reader.finish(|| {
        Some(NewItem {
            name: name?,
            description: description?,
            price: price?,
        })
    })
}

/// Validate an update body.
///
/// # Errors
///
/// Returns `ApiError::Invalid` listing every bad field.
pub fn validate_changes(body: &Body, partial: bool) -> Result<ItemChanges, ApiError> {
    let mut reader = if partial {
        FieldReader::partial(body)
    } else {
        FieldReader::new(body)
    };
    let (name, description, price) = read(&mut reader);
    reader.finish(|| {
        Some(ItemChanges {
            name,
            description,
            price,
        })
    })
}
