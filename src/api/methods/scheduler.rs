use axum::{Json, extract::State};

use crate::{
    AppState,
    api::{extractors::AuthUser, types::{ProjectDetails, SubmitTaskRequest, TaskResponse}},
    error::{Message, Result},
    infrastructure::db::repositories::{ProjectRepository, UserRepository},
    services::scheduler::validator,
};

/// `GET /task` (§4.H). Assigns one open unit to the caller, or 409 if they already
/// have one outstanding or the pool is empty.
pub async fn get_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<TaskResponse>> {
    let unit = state.task_store.assign(user.user_id)?;
    Ok(Json(unit.into()))
}

/// `POST /task {x, y, rgb}` (§4.H). Verifies the submission against the freshest
/// canvas pixel available and, on success, releases the lease and credits the user.
pub async fn submit_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<SubmitTaskRequest>,
) -> Result<Json<Message>> {
    let unit = request.into_unit()?;

    validator::validate_and_submit(&state.task_store, &state.canvas_client, user.user_id, unit)
        .await?;

    UserRepository::increment_pixels_completed(state.db.get_connection(), user.user_id).await?;
    Ok(Json(Message {
        message: "Task submitted".to_string(),
    }))
}

/// `GET /projects` (§4.H). Plain metadata listing; requires only a valid session, not
/// moderator status.
pub async fn list_projects(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<ProjectDetails>>> {
    let projects = ProjectRepository::list(state.db.get_connection()).await?;
    Ok(Json(projects.into_iter().map(ProjectDetails::from).collect()))
}
