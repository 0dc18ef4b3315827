/// Dashboard aggregation
///
/// Collects the caller's own counts and recent activity. Administrators
/// additionally get system-wide totals; for everyone else that section
/// is omitted from the serialized output.

use serde::Serialize;
use sqlx::PgPool;

use crate::auth::middleware::Identity;
use crate::models::project::Project;
use crate::models::tag::Tag;
use crate::models::task::{Task, TaskStatus};
use crate::models::user::User;

use super::OpError;

/// How many recent tasks the dashboard shows.
pub const RECENT_TASK_LIMIT: i64 = 5;

/// System-wide totals, admin only
#[derive(Debug, Clone, Serialize)]
pub struct AdminTotals {
    pub total_users: i64,
    pub total_projects: i64,
    pub total_tasks: i64,
    pub total_tags: i64,
}

/// The caller's dashboard
#[derive(Debug, Serialize)]
pub struct Dashboard {
    /// Number of projects the caller owns
    pub total_projects: i64,

    /// Number of tasks the caller created
    pub total_tasks: i64,

    pub pending_tasks: i64,
    pub in_progress_tasks: i64,
    pub completed_tasks: i64,

    /// Tasks past their due date and not completed
    pub overdue_tasks: i64,

    /// The caller's most recently created tasks
    pub recent_tasks: Vec<Task>,

    /// Present only for administrators
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<AdminTotals>,
}

/// Builds the dashboard for the acting identity
pub async fn build(pool: &PgPool, identity: &Identity) -> Result<Dashboard, OpError> {
    let user_id = identity.user_id;

    let total_projects = Project::count_by_user(pool, user_id, None).await?;
    let total_tasks = Task::count_by_user(pool, user_id, None).await?;
    let pending_tasks = Task::count_by_user(pool, user_id, Some(TaskStatus::Pending)).await?;
    let in_progress_tasks =
        Task::count_by_user(pool, user_id, Some(TaskStatus::InProgress)).await?;
    let completed_tasks = Task::count_by_user(pool, user_id, Some(TaskStatus::Completed)).await?;
    let overdue_tasks = Task::count_overdue(pool, user_id).await?;
    let recent_tasks = Task::recent_by_user(pool, user_id, RECENT_TASK_LIMIT).await?;

    let admin = if identity.is_admin() {
        Some(AdminTotals {
            total_users: User::count(pool).await?,
            total_projects: Project::count(pool).await?,
            total_tasks: Task::count(pool).await?,
            total_tags: Tag::count(pool).await?,
        })
    } else {
        None
    };

    Ok(Dashboard {
        total_projects,
        total_tasks,
        pending_tasks,
        in_progress_tasks,
        completed_tasks,
        overdue_tasks,
        recent_tasks,
        admin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_section_skipped_when_absent() {
        let dashboard = Dashboard {
            total_projects: 2,
            total_tasks: 5,
            pending_tasks: 1,
            in_progress_tasks: 2,
            completed_tasks: 2,
            overdue_tasks: 0,
            recent_tasks: vec![],
            admin: None,
        };

        let json = serde_json::to_value(&dashboard).unwrap();
        assert!(json.get("admin").is_none());
        assert_eq!(json["total_projects"], 2);
    }
}
