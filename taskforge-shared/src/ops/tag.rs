/// Tag operations
///
/// The tag vocabulary is global: reads are open to any authenticated
/// user, writes require the admin role. Name uniqueness is enforced here
/// as a field-level validation failure, not a conflict, so a duplicate
/// name surfaces next to any other problems with the payload.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::auth::authorization::require_admin;
use crate::auth::middleware::Identity;
use crate::models::tag::{self, CreateTag, Tag, UpdateTag};
use crate::models::Page;

use super::{collect_field_errors, validation_message, OpError};

fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());

    if valid {
        Ok(())
    } else {
        Err(validation_message(
            "hex_color",
            "The color must be a hex color such as #3B82F6.",
        ))
    }
}

/// Payload for creating a tag
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTagInput {
    #[validate(length(
        min = 1,
        max = 50,
        message = "The name must be between 1 and 50 characters."
    ))]
    pub name: String,

    /// Defaults to `#3B82F6` when absent
    #[validate(custom(function = "validate_hex_color"))]
    pub color: Option<String>,
}

/// Payload for a partial tag update
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTagInput {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl Validate for UpdateTagInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(ref name) = self.name {
            let len = name.chars().count();
            if len < 1 || len > 50 {
                errors.add(
                    "name",
                    validation_message(
                        "length",
                        "The name must be between 1 and 50 characters.",
                    ),
                );
            }
        }

        if let Some(ref color) = self.color {
            if let Err(error) = validate_hex_color(color) {
                errors.add("color", error);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Lists the whole vocabulary, unpaginated
pub async fn list_all(pool: &PgPool) -> Result<Vec<Tag>, OpError> {
    let tags = Tag::list_all(pool).await?;
    Ok(tags)
}

/// Lists one page of tags, optionally searched by name
pub async fn search(
    pool: &PgPool,
    search: Option<&str>,
    page: i64,
    per_page: i64,
) -> Result<Page<Tag>, OpError> {
    let tags = Tag::search(pool, search, page, per_page).await?;
    Ok(tags)
}

/// Fetches a single tag
pub async fn get(pool: &PgPool, id: Uuid) -> Result<Tag, OpError> {
    Tag::find_by_id(pool, id).await?.ok_or(OpError::NotFound)
}

/// Creates a tag (admin only)
pub async fn create(
    pool: &PgPool,
    identity: &Identity,
    input: CreateTagInput,
) -> Result<Tag, OpError> {
    require_admin(identity)?;

    input
        .validate()
        .map_err(|e| OpError::Validation(collect_field_errors(&e)))?;

    if Tag::name_exists(pool, &input.name, None).await? {
        return Err(OpError::field("name", "The name has already been taken."));
    }

    let tag = Tag::create(
        pool,
        CreateTag {
            name: input.name,
            color: input.color.unwrap_or_else(|| tag::DEFAULT_COLOR.to_string()),
        },
    )
    .await?;

    tracing::info!(tag_id = %tag.id, name = %tag.name, "tag created");

    Ok(tag)
}

/// Applies a partial update to a tag (admin only)
///
/// The uniqueness check excludes the tag itself, so saving a tag without
/// renaming it never trips on its own name.
pub async fn update(
    pool: &PgPool,
    identity: &Identity,
    id: Uuid,
    input: UpdateTagInput,
) -> Result<Tag, OpError> {
    require_admin(identity)?;

    Tag::find_by_id(pool, id).await?.ok_or(OpError::NotFound)?;

    input
        .validate()
        .map_err(|e| OpError::Validation(collect_field_errors(&e)))?;

    if let Some(ref name) = input.name {
        if Tag::name_exists(pool, name, Some(id)).await? {
            return Err(OpError::field("name", "The name has already been taken."));
        }
    }

    let tag = Tag::update(
        pool,
        id,
        UpdateTag {
            name: input.name,
            color: input.color,
        },
    )
    .await?
    .ok_or(OpError::NotFound)?;

    Ok(tag)
}

/// Deletes a tag (admin only); task associations cascade, tasks survive
pub async fn remove(pool: &PgPool, identity: &Identity, id: Uuid) -> Result<(), OpError> {
    require_admin(identity)?;

    if !Tag::delete(pool, id).await? {
        return Err(OpError::NotFound);
    }

    tracing::info!(tag_id = %id, "tag deleted");

    Ok(())
}
