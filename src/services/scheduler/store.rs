use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use rand::Rng;

use crate::{
    error::{AppError, Result},
    services::scheduler::types::{Assignment, Snapshot, Unit},
};

struct Inner {
    open: HashSet<Unit>,
    assigned: HashMap<i64, Assignment>,
    reverse: HashMap<Unit, i64>,
    snapshot: Option<Snapshot>,
    snapshot_time: Option<Instant>,
}

/// Component E. All mutable state lives behind one `Mutex`, exactly as §5 requires —
/// every operation below acquires the lock, mutates, and releases before any await
/// point; nothing suspends while holding it. `TaskStore` is itself a cheap `Clone`
/// (an `Arc` handle) so `assign` can hand a clone to the timer task it spawns for the
/// lease reclaim, rather than threading a separate `Arc<TaskStore>` through callers.
#[derive(Clone)]
pub struct TaskStore {
    inner: Arc<Mutex<Inner>>,
    lease_duration: Duration,
    refresh_interval: Duration,
}

impl TaskStore {
    pub fn new(lease_duration: Duration, refresh_interval: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                open: HashSet::new(),
                assigned: HashMap::new(),
                reverse: HashMap::new(),
                snapshot: None,
                snapshot_time: None,
            })),
            lease_duration,
            refresh_interval,
        }
    }

    pub fn lease_duration(&self) -> Duration {
        self.lease_duration
    }

    /// `TASK_REFRESH_TIME` — how often the refresh loop commits a new snapshot. The
    /// freshness oracle (§4.G) uses this, not `lease_duration`, to estimate `t_snapshot`.
    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Picks a unit from `open` uniformly at random, moves it to `assigned[user]`, and
    /// arms a reclaim timer for `now + lease_duration`.
    pub fn assign(&self, user_id: i64) -> Result<Unit> {
        let unit = {
            let mut inner = self.inner.lock().expect("task store mutex poisoned");

            if inner.assigned.contains_key(&user_id) {
                return Err(AppError::AlreadyAssigned);
            }
            if inner.open.is_empty() {
                return Err(AppError::NoTasksAvailable);
            }

            let index = rand::rng().random_range(0..inner.open.len());
            let unit = inner
                .open
                .iter()
                .nth(index)
                .cloned()
                .expect("index is within open's length");

            let now = Instant::now();
            inner.open.remove(&unit);
            inner.assigned.insert(
                user_id,
                Assignment {
                    user_id,
                    unit: unit.clone(),
                    leased_at: now,
                    expires_at: now + self.lease_duration,
                },
            );
            inner.reverse.insert(unit.clone(), user_id);
            unit
        };

        self.arm_reclaim(user_id, unit.clone());
        Ok(unit)
    }

    fn arm_reclaim(&self, user_id: i64, unit: Unit) {
        let store = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(store.lease_duration).await;
            store.reclaim(user_id, &unit);
        });
    }

    /// Reclaim idempotency (§4.E): the callback carries the exact unit it was armed
    /// with. If the user has since submitted, or been reassigned to a different unit,
    /// this is a no-op — a stale timer firing after the fact changes nothing.
    fn reclaim(&self, user_id: i64, armed_unit: &Unit) {
        let mut inner = self.inner.lock().expect("task store mutex poisoned");
        if inner.assigned.get(&user_id).map(|a| &a.unit) == Some(armed_unit) {
            inner.assigned.remove(&user_id);
            inner.reverse.remove(armed_unit);
            inner.open.insert(armed_unit.clone());
        }
    }

    /// Verifies `unit` is currently assigned to `user_id` without mutating anything —
    /// used by the submission validator before it spends time on freshness checks.
    pub fn check_assignment(&self, user_id: i64, unit: &Unit) -> Result<()> {
        let inner = self.inner.lock().expect("task store mutex poisoned");
        match inner.reverse.get(unit) {
            None => Err(AppError::UnknownTask),
            Some(&owner) if owner != user_id => Err(AppError::NotYourTask),
            Some(_) => Ok(()),
        }
    }

    /// `expires_at` of the caller's current lease, if any — surfaced so `GET /task` can
    /// tell a client how long it has left without exposing internal timer plumbing.
    pub fn lease_expires_at(&self, user_id: i64) -> Option<Instant> {
        self.inner
            .lock()
            .expect("task store mutex poisoned")
            .assigned
            .get(&user_id)
            .map(|a| a.expires_at)
    }

    /// Commits an already-externally-verified submission: removes the assignment
    /// without returning the unit to `open` (§4.E — the pixel is now painted).
    pub fn submit(&self, user_id: i64, unit: &Unit) -> Result<()> {
        let mut inner = self.inner.lock().expect("task store mutex poisoned");
        match inner.reverse.get(unit) {
            None => Err(AppError::UnknownTask),
            Some(&owner) if owner != user_id => Err(AppError::NotYourTask),
            Some(_) => {
                inner.assigned.remove(&user_id);
                inner.reverse.remove(unit);
                Ok(())
            }
        }
    }

    /// Commits a refresh cycle's results: installs the new snapshot and reconciles the
    /// tracked unit set against it, all under one lock acquisition (§4.F step 4).
    pub fn commit_refresh(&self, snapshot: Snapshot, new_units: HashSet<Unit>) {
        let mut inner = self.inner.lock().expect("task store mutex poisoned");
        inner.snapshot_time = Some(Instant::now());
        inner.snapshot = Some(snapshot);
        Self::reconcile_locked(&mut inner, new_units);
    }

    fn reconcile_locked(inner: &mut Inner, new_units: HashSet<Unit>) {
        let current: HashSet<Unit> = inner
            .open
            .iter()
            .cloned()
            .chain(inner.assigned.values().map(|a| a.unit.clone()))
            .collect();

        for stale in current.difference(&new_units) {
            if inner.open.remove(stale) {
                continue;
            }
            if let Some(&owner) = inner.reverse.get(stale) {
                inner.assigned.remove(&owner);
                inner.reverse.remove(stale);
            }
        }

        for fresh in new_units.difference(&current) {
            inner.open.insert(fresh.clone());
        }
    }

    pub fn snapshot_time(&self) -> Option<Instant> {
        self.inner
            .lock()
            .expect("task store mutex poisoned")
            .snapshot_time
    }

    pub fn snapshot_pixel(&self, x: i32, y: i32) -> Option<crate::services::scheduler::types::Rgb> {
        self.inner
            .lock()
            .expect("task store mutex poisoned")
            .snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.get(x, y))
    }

    pub fn open_len(&self) -> usize {
        self.inner.lock().expect("task store mutex poisoned").open.len()
    }

    pub fn assigned_len(&self) -> usize {
        self.inner
            .lock()
            .expect("task store mutex poisoned")
            .assigned
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scheduler::types::Rgb;

    fn unit(x: i32, y: i32, rgb: (u8, u8, u8)) -> Unit {
        Unit::new(x, y, Rgb(rgb.0, rgb.1, rgb.2), "p")
    }

    #[test]
    fn assign_then_submit_removes_without_reopening() {
        let store = TaskStore::new(Duration::from_secs(5), Duration::from_secs(2));
        store.commit_refresh(blank_snapshot(), HashSet::from([unit(1, 1, (255, 0, 0))]));

        let assigned = store.assign(1).unwrap();
        assert_eq!(assigned, unit(1, 1, (255, 0, 0)));
        assert_eq!(store.open_len(), 0);
        assert_eq!(store.assigned_len(), 1);

        store.submit(1, &assigned).unwrap();
        assert_eq!(store.open_len(), 0);
        assert_eq!(store.assigned_len(), 0);
    }

    #[test]
    fn second_assign_for_same_user_is_rejected() {
        let store = TaskStore::new(Duration::from_secs(5), Duration::from_secs(2));
        store.commit_refresh(
            blank_snapshot(),
            HashSet::from([unit(1, 1, (255, 0, 0)), unit(2, 2, (0, 255, 0))]),
        );

        store.assign(1).unwrap();
        let err = store.assign(1).unwrap_err();
        assert!(matches!(err, AppError::AlreadyAssigned));
    }

    #[test]
    fn assign_with_empty_pool_is_rejected() {
        let store = TaskStore::new(Duration::from_secs(5), Duration::from_secs(2));
        let err = store.assign(1).unwrap_err();
        assert!(matches!(err, AppError::NoTasksAvailable));
    }

    #[test]
    fn submit_with_wrong_owner_is_not_your_task() {
        let store = TaskStore::new(Duration::from_secs(5), Duration::from_secs(2));
        store.commit_refresh(blank_snapshot(), HashSet::from([unit(1, 1, (255, 0, 0))]));

        let assigned = store.assign(1).unwrap();
        let err = store.submit(2, &assigned).unwrap_err();
        assert!(matches!(err, AppError::NotYourTask));
    }

    #[test]
    fn submit_unknown_unit_is_unknown_task() {
        let store = TaskStore::new(Duration::from_secs(5), Duration::from_secs(2));
        store.commit_refresh(blank_snapshot(), HashSet::from([unit(1, 1, (255, 0, 0))]));
        store.assign(1).unwrap();

        let err = store.submit(1, &unit(9, 9, (1, 2, 3))).unwrap_err();
        assert!(matches!(err, AppError::UnknownTask));
    }

    #[test]
    fn reconcile_drops_units_no_longer_present() {
        let store = TaskStore::new(Duration::from_secs(5), Duration::from_secs(2));
        store.commit_refresh(
            blank_snapshot(),
            HashSet::from([unit(1, 1, (255, 0, 0)), unit(2, 2, (0, 255, 0))]),
        );
        let assigned = store.assign(1).unwrap();

        // Next refresh: project covering (1,1) was removed; (2,2) still needed.
        store.commit_refresh(blank_snapshot(), HashSet::from([unit(2, 2, (0, 255, 0))]));

        let err = store.submit(1, &assigned).unwrap_err();
        assert!(matches!(err, AppError::UnknownTask));
        assert_eq!(store.open_len(), 1);
    }

    #[test]
    fn reconcile_preserves_assignments_still_in_new_set() {
        let store = TaskStore::new(Duration::from_secs(5), Duration::from_secs(2));
        let u = unit(1, 1, (255, 0, 0));
        store.commit_refresh(blank_snapshot(), HashSet::from([u.clone()]));
        store.assign(1).unwrap();

        store.commit_refresh(blank_snapshot(), HashSet::from([u.clone()]));
        assert_eq!(store.assigned_len(), 1);
        store.submit(1, &u).unwrap();
    }

    #[test]
    fn lease_expires_at_reflects_the_armed_lease() {
        let store = TaskStore::new(Duration::from_secs(5), Duration::from_secs(2));
        store.commit_refresh(blank_snapshot(), HashSet::from([unit(1, 1, (255, 0, 0))]));

        assert!(store.lease_expires_at(1).is_none());
        store.assign(1).unwrap();

        let expires_at = store.lease_expires_at(1).unwrap();
        assert!(expires_at > Instant::now());
        assert!(expires_at <= Instant::now() + Duration::from_secs(5));
    }

    #[test]
    fn reconcile_is_idempotent() {
        let store = TaskStore::new(Duration::from_secs(5), Duration::from_secs(2));
        let units = HashSet::from([unit(1, 1, (255, 0, 0)), unit(2, 2, (0, 255, 0))]);
        store.commit_refresh(blank_snapshot(), units.clone());
        let after_first = store.open_len();
        store.commit_refresh(blank_snapshot(), units);
        assert_eq!(store.open_len(), after_first);
    }

    #[tokio::test(start_paused = true)]
    async fn lease_expiry_returns_unit_to_open_and_is_idempotent() {
        let store = TaskStore::new(Duration::from_secs(5), Duration::from_secs(2));
        store.commit_refresh(blank_snapshot(), HashSet::from([unit(1, 1, (255, 0, 0))]));

        store.assign(1).unwrap();
        assert_eq!(store.assigned_len(), 1);

        tokio::time::advance(Duration::from_secs(6)).await;
        tokio::task::yield_now().await;

        assert_eq!(store.assigned_len(), 0);
        assert_eq!(store.open_len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_before_lease_expiry_makes_the_timer_a_no_op() {
        let store = TaskStore::new(Duration::from_secs(5), Duration::from_secs(2));
        store.commit_refresh(blank_snapshot(), HashSet::from([unit(1, 1, (255, 0, 0))]));

        let assigned = store.assign(1).unwrap();
        store.submit(1, &assigned).unwrap();

        tokio::time::advance(Duration::from_secs(6)).await;
        tokio::task::yield_now().await;

        // The unit was consumed by submit, not reopened by the stale reclaim.
        assert_eq!(store.open_len(), 0);
        assert_eq!(store.assigned_len(), 0);
    }

    fn blank_snapshot() -> Snapshot {
        Snapshot {
            width: 16,
            height: 16,
            pixels: vec![Rgb(0, 0, 0); 256],
            fetched_at: Instant::now(),
        }
    }
}
