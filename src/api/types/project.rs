use serde::{Deserialize, Serialize};

use crate::infrastructure::db::entities::project;

/// Wire shape for a project (§6): `{name, x, y, priority, image}`, `image` a
/// base64-encoded PNG. Used both as the moderator CRUD body and the `GET /projects`
/// list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDetails {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub priority: i32,
    pub image: String,
}

impl From<project::Model> for ProjectDetails {
    fn from(model: project::Model) -> Self {
        Self {
            name: model.project_name,
            x: model.position_x,
            y: model.position_y,
            priority: model.project_priority,
            image: model.base64_image,
        }
    }
}
