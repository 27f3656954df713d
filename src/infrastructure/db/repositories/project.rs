use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, EntityTrait, sea_query::OnConflict,
};

use crate::{
    error::{AppError, Result},
    infrastructure::db::entities::{Project, project},
};

/// Read-through view over persisted projects (Component C). `list` is the only
/// operation the scheduler's refresh loop calls; the rest back the moderator CRUD
/// surface. The repository does not notify the scheduler of writes — the refresh loop
/// polls `list` on its own cadence (§4.C).
pub struct ProjectRepository;

impl ProjectRepository {
    pub async fn list<C: ConnectionTrait>(connection: &C) -> Result<Vec<project::Model>> {
        Ok(Project::find().all(connection).await?)
    }

    pub async fn exists<C: ConnectionTrait>(connection: &C, name: &str) -> Result<bool> {
        Ok(Project::find_by_id(name).one(connection).await?.is_some())
    }

    pub async fn find<C: ConnectionTrait>(
        connection: &C,
        name: &str,
    ) -> Result<Option<project::Model>> {
        Ok(Project::find_by_id(name).one(connection).await?)
    }

    pub async fn create<C: ConnectionTrait>(
        connection: &C,
        name: &str,
        x: i32,
        y: i32,
        priority: i32,
        base64_image: &str,
    ) -> Result<project::Model> {
        if Self::exists(connection, name).await? {
            return Err(AppError::ProjectNameExists);
        }

        let active = project::ActiveModel {
            project_name: Set(name.to_string()),
            position_x: Set(x),
            position_y: Set(y),
            project_priority: Set(priority),
            base64_image: Set(base64_image.to_string()),
        };
        Ok(active.insert(connection).await?)
    }

    /// Moderator edit of an existing project. Uses upsert-on-name semantics so a
    /// re-submission with the same name is treated as an update rather than a conflict.
    pub async fn upsert<C: ConnectionTrait>(
        connection: &C,
        name: &str,
        x: i32,
        y: i32,
        priority: i32,
        base64_image: &str,
    ) -> Result<project::Model> {
        let active = project::ActiveModel {
            project_name: Set(name.to_string()),
            position_x: Set(x),
            position_y: Set(y),
            project_priority: Set(priority),
            base64_image: Set(base64_image.to_string()),
        };

        Project::insert(active)
            .on_conflict(
                OnConflict::column(project::Column::ProjectName)
                    .update_columns([
                        project::Column::PositionX,
                        project::Column::PositionY,
                        project::Column::ProjectPriority,
                        project::Column::Base64Image,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(connection)
            .await
            .map_err(AppError::from)
    }

    pub async fn delete<C: ConnectionTrait>(connection: &C, name: &str) -> Result<()> {
        let result = Project::delete_by_id(name).exec(connection).await?;
        if result.rows_affected == 0 {
            return Err(AppError::ProjectNotFound);
        }
        Ok(())
    }
}
