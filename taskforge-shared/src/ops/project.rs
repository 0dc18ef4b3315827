/// Project operations
///
/// Listings are always scoped to the acting user before any filter is
/// applied; single-resource operations go through the guard, which
/// decides existence before ownership.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::auth::authorization::find_owned_project;
use crate::auth::middleware::Identity;
use crate::models::project::{
    CreateProject, Project, ProjectFilter, ProjectStatus, UpdateProject,
};
use crate::models::Page;

use super::{collect_field_errors, double_option, validation_message, OpError};

/// Payload for creating a project
///
/// The owner is never part of the payload; it comes from the acting
/// identity.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectInput {
    #[validate(length(
        min = 1,
        max = 255,
        message = "The name must be between 1 and 255 characters."
    ))]
    pub name: String,

    #[validate(length(max = 2000, message = "The description may not be greater than 2000 characters."))]
    pub description: Option<String>,

    /// Defaults to `active` when absent
    pub status: Option<ProjectStatus>,
}

/// Payload for a partial project update
///
/// Absent fields are untouched. `description` distinguishes absent from
/// an explicit `null`, which clears the value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectInput {
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    pub status: Option<ProjectStatus>,
}

impl Validate for UpdateProjectInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(ref name) = self.name {
            let len = name.chars().count();
            if len < 1 || len > 255 {
                errors.add(
                    "name",
                    validation_message(
                        "length",
                        "The name must be between 1 and 255 characters.",
                    ),
                );
            }
        }

        if let Some(Some(ref description)) = self.description {
            if description.chars().count() > 2000 {
                errors.add(
                    "description",
                    validation_message(
                        "length",
                        "The description may not be greater than 2000 characters.",
                    ),
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Lists one page of the caller's projects
pub async fn list(
    pool: &PgPool,
    identity: &Identity,
    filter: &ProjectFilter,
    page: i64,
    per_page: i64,
) -> Result<Page<Project>, OpError> {
    let projects = Project::search(pool, identity.user_id, filter, page, per_page).await?;
    Ok(projects)
}

/// Creates a project owned by the caller
pub async fn create(
    pool: &PgPool,
    identity: &Identity,
    input: CreateProjectInput,
) -> Result<Project, OpError> {
    input
        .validate()
        .map_err(|e| OpError::Validation(collect_field_errors(&e)))?;

    let project = Project::create(
        pool,
        CreateProject {
            user_id: identity.user_id,
            name: input.name,
            description: input.description,
            status: input.status.unwrap_or_default(),
        },
    )
    .await?;

    tracing::info!(project_id = %project.id, user_id = %identity.user_id, "project created");

    Ok(project)
}

/// Fetches one of the caller's projects
pub async fn get(pool: &PgPool, identity: &Identity, id: Uuid) -> Result<Project, OpError> {
    let project = find_owned_project(pool, identity, id).await?;
    Ok(project)
}

/// Applies a partial update to one of the caller's projects
pub async fn update(
    pool: &PgPool,
    identity: &Identity,
    id: Uuid,
    input: UpdateProjectInput,
) -> Result<Project, OpError> {
    find_owned_project(pool, identity, id).await?;

    input
        .validate()
        .map_err(|e| OpError::Validation(collect_field_errors(&e)))?;

    let project = Project::update(
        pool,
        id,
        UpdateProject {
            name: input.name,
            description: input.description,
            status: input.status,
        },
    )
    .await?
    .ok_or(OpError::NotFound)?;

    Ok(project)
}

/// Deletes one of the caller's projects; its tasks cascade
pub async fn remove(pool: &PgPool, identity: &Identity, id: Uuid) -> Result<(), OpError> {
    find_owned_project(pool, identity, id).await?;

    if !Project::delete(pool, id).await? {
        return Err(OpError::NotFound);
    }

    tracing::info!(project_id = %id, user_id = %identity.user_id, "project deleted");

    Ok(())
}
