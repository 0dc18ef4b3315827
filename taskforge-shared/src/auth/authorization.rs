/// Authorization guard
///
/// Centralizes every access decision so route handlers and the
/// interactive surface never re-derive them. Two rules cover the whole
/// system:
///
/// 1. **Ownership**: projects and tasks are visible only to the owning
///    user. There is no admin bypass for owned resources.
/// 2. **Role**: the tag vocabulary is readable by everyone but writable
///    only by administrators.
///
/// Existence is always decided before access: a resource that is not
/// there is `NotFound` even when the caller would also have been denied,
/// so responses never reveal whether someone else's resource exists.
///
/// # Example
///
/// ```no_run
/// use taskforge_shared::auth::authorization::find_owned_project;
/// use taskforge_shared::auth::middleware::Identity;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, identity: Identity, project_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let project = find_owned_project(&pool, &identity, project_id).await?;
/// println!("authorized for {}", project.name);
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use super::middleware::Identity;
use crate::models::project::Project;
use crate::models::task::Task;

/// Message returned for role failures on admin-only operations.
pub const ADMIN_REQUIRED_MESSAGE: &str = "Forbidden. Admin access required.";

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Resource does not exist
    #[error("Resource not found")]
    NotFound,

    /// Caller does not own the resource
    #[error("Forbidden")]
    Forbidden,

    /// Operation is restricted to administrators
    #[error("{ADMIN_REQUIRED_MESSAGE}")]
    AdminRequired,

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Loads a project the caller is allowed to act on
///
/// # Errors
///
/// `NotFound` if no such project exists, `Forbidden` if it exists but
/// belongs to someone else. The checks run in that order.
pub async fn find_owned_project(
    pool: &PgPool,
    identity: &Identity,
    project_id: Uuid,
) -> Result<Project, AuthzError> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(AuthzError::NotFound)?;

    if project.user_id != identity.user_id {
        return Err(AuthzError::Forbidden);
    }

    Ok(project)
}

/// Loads a task through its project path
///
/// Both conditions must hold: the caller owns the path project, and the
/// task actually belongs to that project. A real task reached through the
/// wrong project is `Forbidden`, not `NotFound`; a missing project or
/// task is `NotFound` before any ownership comparison.
pub async fn find_project_task(
    pool: &PgPool,
    identity: &Identity,
    project_id: Uuid,
    task_id: Uuid,
) -> Result<(Project, Task), AuthzError> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(AuthzError::NotFound)?;

    let task = Task::find_by_id(pool, task_id)
        .await?
        .ok_or(AuthzError::NotFound)?;

    if project.user_id != identity.user_id || task.project_id != project.id {
        return Err(AuthzError::Forbidden);
    }

    Ok((project, task))
}

/// Requires the caller to be an administrator
///
/// Guards every tag write. Reads of the tag vocabulary are open to any
/// authenticated user and never pass through here.
pub fn require_admin(identity: &Identity) -> Result<(), AuthzError> {
    if !identity.is_admin() {
        return Err(AuthzError::AdminRequired);
    }

    Ok(())
}
