//! The item model and the payloads used to create and change items.

use crate::infra::validation::{self, not_null, required, Field, Valid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

/// The longest name an item may have, in characters.
pub const MAX_NAME_LENGTH: usize = 100;

/// The kind of an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Electronics,
    Clothing,
    Books,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Electronics, Category::Clothing, Category::Books];

    /// The stored and serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "ELECTRONICS",
            Category::Clothing => "CLOTHING",
            Category::Books => "BOOKS",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A category outside of the known set.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("\"{0}\" is not a valid choice.")]
pub struct UnknownCategory(String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl TryFrom<String> for Category {
    type Error = UnknownCategory;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// An existing item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Item {
    /// The item's id.
    #[schema(example = 1)]
    pub id: i64,
    /// The item's name.
    #[schema(example = "The Rust Programming Language")]
    pub name: String,
    /// The item's category.
    #[sqlx(try_from = "String")]
    pub category: Category,
    /// The item's description. Empty if none was given.
    #[schema(example = "A book about Rust")]
    pub description: String,
    /// When the item was created.
    #[schema(example = "2024-10-15T12:00:00Z")]
    pub created_at: DateTime<Utc>,
}

/// A new item that has passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub category: Category,
    pub description: String,
}

/// Changes to an existing item. Fields that are `None` are left as they are.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub category: Option<Category>,
    pub description: Option<String>,
}

/// The body of a create or full update request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct ItemPayload {
    /// The item's name.
    #[schema(value_type = String, example = "The Rust Programming Language")]
    #[validate(required(message = "This field is required."), custom(function = "validate_name"))]
    pub name: Field<String>,
    /// The item's category.
    #[schema(value_type = Category, example = "BOOKS")]
    #[validate(
        required(message = "This field is required."),
        custom(function = "validate_category")
    )]
    pub category: Field<String>,
    /// The item's description. Left unchanged by a full update when omitted.
    #[schema(value_type = Option<String>, example = "A book about Rust")]
    #[validate(custom(function = "not_null"))]
    pub description: Field<String>,
}

/// The body of a partial update request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct ItemPatch {
    /// The item's new name.
    #[schema(value_type = Option<String>, example = "The Rust Programming Language, 2nd edition")]
    #[validate(custom(function = "validate_name"))]
    pub name: Field<String>,
    /// The item's new category.
    #[schema(value_type = Option<Category>, example = "BOOKS")]
    #[validate(custom(function = "validate_category"))]
    pub category: Field<String>,
    /// The item's new description.
    #[schema(value_type = Option<String>)]
    #[validate(custom(function = "not_null"))]
    pub description: Field<String>,
}

fn validate_name(name: &Field<String>) -> Result<(), ValidationError> {
    let Field::Value(name) = name else {
        return not_null(name);
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(validation::error("blank", "This field may not be blank."));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(validation::error(
            "max_length",
            "Ensure this field has no more than 100 characters.",
        ));
    }
    Ok(())
}

fn validate_category(category: &Field<String>) -> Result<(), ValidationError> {
    let Field::Value(category) = category else {
        return not_null(category);
    };
    if category.is_empty() {
        return Err(validation::error("blank", "This field may not be blank."));
    }
    category
        .parse::<Category>()
        .map(|_| ())
        .map_err(invalid_category)
}

fn invalid_category(unknown: UnknownCategory) -> ValidationError {
    let mut error = ValidationError::new("invalid_choice");
    error.message = Some(unknown.to_string().into());
    error
}

fn parse_category(category: String) -> Result<Category, ValidationErrors> {
    category.parse().map_err(|unknown| {
        let mut errors = ValidationErrors::new();
        errors.add("category", invalid_category(unknown));
        errors
    })
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

impl TryFrom<Valid<ItemPayload>> for NewItem {
    type Error = ValidationErrors;

    fn try_from(payload: Valid<ItemPayload>) -> Result<Self, Self::Error> {
        let payload = payload.into_inner();
        Ok(NewItem {
            name: trimmed(required("name", payload.name.value())?),
            category: parse_category(required("category", payload.category.value())?)?,
            description: payload.description.value().map(trimmed).unwrap_or_default(),
        })
    }
}

impl TryFrom<Valid<ItemPayload>> for ItemChanges {
    type Error = ValidationErrors;

    fn try_from(payload: Valid<ItemPayload>) -> Result<Self, Self::Error> {
        let payload = payload.into_inner();
        Ok(ItemChanges {
            name: Some(trimmed(required("name", payload.name.value())?)),
            category: Some(parse_category(required("category", payload.category.value())?)?),
            description: payload.description.value().map(trimmed),
        })
    }
}

impl TryFrom<Valid<ItemPatch>> for ItemChanges {
    type Error = ValidationErrors;

    fn try_from(patch: Valid<ItemPatch>) -> Result<Self, Self::Error> {
        let patch = patch.into_inner();
        Ok(ItemChanges {
            name: patch.name.value().map(trimmed),
            category: patch.category.value().map(parse_category).transpose()?,
            description: patch.description.value().map(trimmed),
        })
    }
}

impl ItemChanges {
    /// Applies the changes to an item in place.
    pub fn apply_to(self, item: &mut Item) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(description) = self.description {
            item.description = description;
        }
    }
}
