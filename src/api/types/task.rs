use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    services::scheduler::{Rgb, Unit},
};

/// Wire shape for a work unit (§6): `{x, y, rgb}`, `rgb` a lowercase 6-hex-digit string.
#[derive(Debug, Clone, Serialize)]
pub struct TaskResponse {
    pub x: i32,
    pub y: i32,
    pub rgb: String,
}

impl From<Unit> for TaskResponse {
    fn from(unit: Unit) -> Self {
        Self {
            x: unit.x,
            y: unit.y,
            rgb: unit.rgb.to_hex(),
        }
    }
}

/// Submission body for `POST /task`. `rgb` is validated against `[0-9a-fA-F]{6}`, same
/// as the server's own `TaskResponse` formatting. Unit identity ignores `project_name`
/// (§3), so the unit reconstructed here carries none and still compares equal to
/// whatever the Task Store has on record.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitTaskRequest {
    pub x: i32,
    pub y: i32,
    pub rgb: String,
}

impl SubmitTaskRequest {
    pub fn into_unit(self) -> Result<Unit> {
        let rgb = Rgb::from_hex(&self.rgb)?;
        Ok(Unit::new(self.x, self.y, rgb, String::new()))
    }
}
