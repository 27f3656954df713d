use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    api::{extractors::ModeratorUser, types::ProjectDetails},
    error::{Message, Result},
    infrastructure::db::repositories::ProjectRepository,
    services::image,
};

/// `POST /projects` (moderator only). Validates the image decodes before persisting,
/// so a malformed upload fails at write time rather than silently dropping out of
/// every future refresh tick.
pub async fn create_project(
    State(state): State<AppState>,
    _moderator: ModeratorUser,
    Json(body): Json<ProjectDetails>,
) -> Result<Json<ProjectDetails>> {
    image::decode_base64_png(&body.image)?;

    let project = ProjectRepository::create(
        state.db.get_connection(),
        &body.name,
        body.x,
        body.y,
        body.priority,
        &body.image,
    )
    .await?;

    Ok(Json(project.into()))
}

/// `PUT /projects/{name}` (moderator only). Upserts so re-submitting an existing name
/// edits it in place; takes effect at the next refresh tick (§4.C).
pub async fn update_project(
    State(state): State<AppState>,
    _moderator: ModeratorUser,
    Path(name): Path<String>,
    Json(body): Json<ProjectDetails>,
) -> Result<Json<ProjectDetails>> {
    image::decode_base64_png(&body.image)?;

    let project = ProjectRepository::upsert(
        state.db.get_connection(),
        &name,
        body.x,
        body.y,
        body.priority,
        &body.image,
    )
    .await?;

    Ok(Json(project.into()))
}

/// `DELETE /projects/{name}` (moderator only).
pub async fn delete_project(
    State(state): State<AppState>,
    _moderator: ModeratorUser,
    Path(name): Path<String>,
) -> Result<Json<Message>> {
    ProjectRepository::delete(state.db.get_connection(), &name).await?;
    Ok(Json(Message {
        message: "Project deleted".to_string(),
    }))
}
