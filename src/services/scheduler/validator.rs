use std::time::{Duration, Instant};

use crate::{
    error::{AppError, Result},
    services::{
        canvas::CanvasClient,
        scheduler::{store::TaskStore, types::Unit},
    },
};

/// Component G. Confirms a submitted unit against the freshest pixel value the system
/// can obtain without either blocking forever on the rate limiter or hammering the
/// upstream canvas needlessly.
pub async fn validate_and_submit(
    store: &TaskStore,
    canvas_client: &CanvasClient,
    user_id: i64,
    unit: Unit,
) -> Result<()> {
    store.check_assignment(user_id, &unit)?;

    let submit_time = Instant::now();
    let deadline = submit_time + store.lease_duration();

    let fastest = get_fastest_pixel(store, canvas_client, unit.x, unit.y, submit_time, deadline)
        .await?;

    if fastest == unit.rgb {
        store.submit(user_id, &unit)
    } else {
        Err(AppError::Unverified)
    }
}

/// `get_fastest_pixel` (§4.G): the freshness oracle. If the snapshot already reflects
/// everything up to `submit_time`, use it for free. Otherwise race a single-pixel fetch
/// against the next scheduled refresh and take whichever is faster; ties (including
/// both-zero) favor the snapshot to avoid spending the rate-limited pixel budget.
async fn get_fastest_pixel(
    store: &TaskStore,
    canvas_client: &CanvasClient,
    x: i32,
    y: i32,
    submit_time: Instant,
    deadline: Instant,
) -> Result<crate::services::scheduler::types::Rgb> {
    if Instant::now() >= deadline {
        return Err(AppError::ValidationTimeout);
    }

    if let Some(snapshot_time) = store.snapshot_time()
        && snapshot_time >= submit_time
    {
        return store.snapshot_pixel(x, y).ok_or(AppError::CanvasUnavailable);
    }

    let now = Instant::now();
    let t_snapshot = next_refresh_wait(store, now);
    let t_pixel = canvas_client.pixel_wait_time().await;

    if t_pixel < t_snapshot {
        if sleep_or_timeout(t_pixel, deadline).await.is_err() {
            return Err(AppError::ValidationTimeout);
        }
        match canvas_client.get_pixel(x, y).await {
            Ok(rgb) => return Ok(rgb),
            Err(_) => {
                // Upstream single-pixel fetch failed; fall back to waiting for the
                // snapshot instead of failing the whole validation outright.
                if sleep_or_timeout(t_snapshot, deadline).await.is_err() {
                    return Err(AppError::ValidationTimeout);
                }
                return store.snapshot_pixel(x, y).ok_or(AppError::CanvasUnavailable);
            }
        }
    }

    if sleep_or_timeout(t_snapshot, deadline).await.is_err() {
        return Err(AppError::ValidationTimeout);
    }
    store.snapshot_pixel(x, y).ok_or(AppError::CanvasUnavailable)
}

/// Time until the next scheduled full refresh, estimated from the last committed
/// snapshot. With no snapshot yet, there's nothing to estimate against, so the single
/// pixel path is preferred by reporting a wait at least as long as any real rate limit.
fn next_refresh_wait(store: &TaskStore, now: Instant) -> Duration {
    match store.snapshot_time() {
        Some(last) => (last + store.refresh_interval()).saturating_duration_since(now),
        None => Duration::from_secs(u64::MAX / 2),
    }
}

async fn sleep_or_timeout(duration: Duration, deadline: Instant) -> std::result::Result<(), ()> {
    let now = Instant::now();
    if now >= deadline {
        return Err(());
    }
    let remaining = deadline - now;
    if duration <= remaining {
        if duration > Duration::ZERO {
            tokio::time::sleep(duration).await;
        }
        Ok(())
    } else {
        tokio::time::sleep(remaining).await;
        Err(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::{config::CanvasConfig, services::scheduler::types::{Rgb, Snapshot}};

    fn store_with_snapshot(rgb: Rgb, snapshot_age: Duration) -> TaskStore {
        let store = TaskStore::new(Duration::from_secs(5), Duration::from_secs(2));
        let unit = Unit::new(1, 1, rgb, "p");
        store.commit_refresh(
            Snapshot {
                width: 4,
                height: 4,
                pixels: vec![rgb; 16],
                fetched_at: Instant::now() - snapshot_age,
            },
            HashSet::from([unit]),
        );
        store
    }

    #[tokio::test]
    async fn validator_accepts_when_snapshot_already_matches() {
        let rgb = Rgb(0xff, 0x00, 0x00);
        let store = store_with_snapshot(rgb, Duration::ZERO);
        let canvas_client = CanvasClient::new(&CanvasConfig {
            api_token: "token".into(),
            api_base_url: "http://localhost".into(),
        });

        let unit = store.assign(1).unwrap();
        validate_and_submit(&store, &canvas_client, 1, unit)
            .await
            .unwrap();
        assert_eq!(store.assigned_len(), 0);
    }

    #[tokio::test]
    async fn validator_rejects_a_task_assigned_to_someone_else() {
        let rgb = Rgb(0x00, 0xff, 0x00);
        let store = store_with_snapshot(rgb, Duration::ZERO);
        let canvas_client = CanvasClient::new(&CanvasConfig {
            api_token: "token".into(),
            api_base_url: "http://localhost".into(),
        });

        store.assign(1).unwrap();
        let unit = Unit::new(1, 1, rgb, "p");

        let err = validate_and_submit(&store, &canvas_client, 2, unit)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotYourTask));
    }
}
