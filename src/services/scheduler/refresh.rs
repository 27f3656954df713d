use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::{
    infrastructure::db::repositories::ProjectRepository,
    services::{
        canvas::CanvasClient,
        image,
        scheduler::{diff, store::TaskStore, types::DecodedProject},
    },
};

/// Component F: the sole writer of the snapshot. Runs forever, reloading projects,
/// refreshing the canvas, recomputing the diff, and reconciling the Task Store every
/// `refresh_interval`. Never crashes on upstream failure — it logs and keeps the last
/// known-good snapshot, per §4.F and the "source bugs" note in §9 that explicitly calls
/// out blanking the snapshot on failure as a bug to not reproduce.
pub async fn run(
    store: TaskStore,
    db: DatabaseConnection,
    canvas_client: std::sync::Arc<CanvasClient>,
    refresh_interval: Duration,
) {
    loop {
        match tick(&store, &db, &canvas_client).await {
            Ok(unit_count) => {
                tracing::debug!(open_units = unit_count, "refresh tick committed");
            }
            Err(reason) => {
                tracing::warn!(reason, "refresh tick skipped, keeping last snapshot");
            }
        }
        tokio::time::sleep(refresh_interval).await;
    }
}

async fn tick(
    store: &TaskStore,
    db: &DatabaseConnection,
    canvas_client: &CanvasClient,
) -> Result<usize, &'static str> {
    let projects = ProjectRepository::list(db)
        .await
        .map_err(|_| "failed to load projects")?;

    let snapshot = canvas_client
        .get_canvas()
        .await
        .map_err(|_| "failed to fetch canvas snapshot")?;

    let decoded: Vec<DecodedProject> = projects
        .into_iter()
        .filter_map(|project| {
            match image::decode_base64_png(&project.base64_image) {
                Ok(image) => Some(DecodedProject {
                    name: project.project_name,
                    x: project.position_x,
                    y: project.position_y,
                    priority: project.project_priority,
                    image,
                }),
                Err(error) => {
                    tracing::warn!(project = %project.project_name, %error, "skipping project with malformed image");
                    None
                }
            }
        })
        .collect();

    let new_units = diff::compute_units(&decoded, &snapshot);
    let unit_count = new_units.len();
    let new_units = new_units.into_values().collect();

    store.commit_refresh(snapshot, new_units);
    Ok(unit_count)
}
