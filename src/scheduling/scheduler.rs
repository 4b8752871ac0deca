// src/scheduling/scheduler.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    SchedulingRules, TimeWindow, derive_status, find_conflict, status_advance, truncate_to_minute,
};
use crate::error::SchedulingError;
use crate::models::{Appointment, AppointmentDetails, AppointmentRequest};
use crate::store::AppointmentStore;

/// Validates and commits appointments against a store, and keeps persisted
/// statuses in step with the clock.
///
/// Create and edit run their check-then-write sequence under one writer lock,
/// so two requests in this process can't both pass validation for the same
/// slot. Other processes are held off by the store's own overlap constraint.
pub struct AppointmentScheduler {
    store: Arc<dyn AppointmentStore>,
    rules: SchedulingRules,
    write_lock: Mutex<()>,
}

impl AppointmentScheduler {
    pub fn new(store: Arc<dyn AppointmentStore>, rules: SchedulingRules) -> Self {
        Self {
            store,
            rules,
            write_lock: Mutex::new(()),
        }
    }

    pub fn rules(&self) -> &SchedulingRules {
        &self.rules
    }

    pub async fn create(
        &self,
        req: &AppointmentRequest,
        now: DateTime<Utc>,
    ) -> Result<Appointment, SchedulingError> {
        let details = self.prepare(req)?;
        if details.window.start < truncate_to_minute(now) {
            return Err(SchedulingError::StartInPast);
        }

        let _writer = self.write_lock.lock().await;
        self.validate_window(&details.window, None).await?;

        let id = self.store.insert_appointment(&details).await?;
        info!(appointment_id = %id, start = %details.window.start, "appointment created");

        self.store
            .get_appointment(id)
            .await?
            .ok_or(SchedulingError::NotFound)
    }

    /// Only appointments still pending (after bringing their status up to
    /// date) may be edited. The edit puts the appointment back to `Pending`.
    pub async fn edit(
        &self,
        id: Uuid,
        req: &AppointmentRequest,
        now: DateTime<Utc>,
    ) -> Result<Appointment, SchedulingError> {
        let details = self.prepare(req)?;

        let _writer = self.write_lock.lock().await;
        let mut current = self
            .store
            .get_appointment(id)
            .await?
            .ok_or(SchedulingError::NotFound)?;
        self.synchronize(&mut current, now).await;
        if !current.status.is_editable() {
            return Err(SchedulingError::EditNotAllowed);
        }

        self.validate_window(&details.window, Some(id)).await?;

        if !self.store.update_appointment(id, &details).await? {
            return Err(SchedulingError::NotFound);
        }
        info!(appointment_id = %id, start = %details.window.start, "appointment updated");

        self.store
            .get_appointment(id)
            .await?
            .ok_or(SchedulingError::NotFound)
    }

    /// Allowed in any status.
    pub async fn delete(&self, id: Uuid) -> Result<(), SchedulingError> {
        if !self.store.delete_appointment(id).await? {
            return Err(SchedulingError::NotFound);
        }
        info!(appointment_id = %id, "appointment deleted");
        Ok(())
    }

    pub async fn list(&self, now: DateTime<Utc>) -> Result<Vec<Appointment>, SchedulingError> {
        let mut all = self.store.list_appointments().await?;
        for appt in all.iter_mut() {
            self.synchronize(appt, now).await;
        }
        Ok(all)
    }

    pub async fn view(&self, id: Uuid, now: DateTime<Utc>) -> Result<Appointment, SchedulingError> {
        let mut appt = self
            .store
            .get_appointment(id)
            .await?
            .ok_or(SchedulingError::NotFound)?;
        self.synchronize(&mut appt, now).await;
        Ok(appt)
    }

    /// Dry run of the create/edit time checks. Returns the window the
    /// appointment would occupy. Without `exclude_id` the slot is checked as a
    /// new booking, so a start before the current minute is rejected too.
    pub async fn check(
        &self,
        start: DateTime<Utc>,
        exclude_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<TimeWindow, SchedulingError> {
        let window = self.rules.window_for(start).ok_or_else(start_out_of_range)?;
        if exclude_id.is_none() && window.start < truncate_to_minute(now) {
            return Err(SchedulingError::StartInPast);
        }
        self.validate_window(&window, exclude_id).await?;
        Ok(window)
    }

    /// Brings every persisted status up to date. Returns how many were written.
    pub async fn sync_all(&self, now: DateTime<Utc>) -> Result<usize, SchedulingError> {
        let mut all = self.store.list_appointments().await?;
        let mut written = 0;
        for appt in all.iter_mut() {
            if self.synchronize(appt, now).await {
                written += 1;
            }
        }
        Ok(written)
    }

    /// Periodically runs [`sync_all`](Self::sync_all) until the runtime shuts down.
    pub fn spawn_status_sync(self: Arc<Self>, every: std::time::Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match self.sync_all(Utc::now()).await {
                    Ok(0) => {}
                    Ok(n) => debug!(updated = n, "appointment statuses synchronized"),
                    Err(e) => warn!(error = %e, "status sync pass failed"),
                }
            }
        })
    }

    async fn validate_window(
        &self,
        window: &TimeWindow,
        exclude_id: Option<Uuid>,
    ) -> Result<(), SchedulingError> {
        let candidates = self.store.overlap_candidates(window, exclude_id).await?;
        if let Some(other) = find_conflict(window, &candidates, exclude_id) {
            debug!(conflicts_with = %other, start = %window.start, "slot already taken");
            return Err(SchedulingError::SchedulingConflict);
        }

        if !self.rules.is_within_service_hours(window.start) {
            return Err(SchedulingError::InvalidServiceHours);
        }
        Ok(())
    }

    /// Moves `appt.status` forward to the clock-derived status and writes it
    /// back. A failed write is logged and the derived status is kept in
    /// memory. Returns whether the write changed the persisted row.
    async fn synchronize(&self, appt: &mut Appointment, now: DateTime<Utc>) -> bool {
        let derived = derive_status(now, &appt.window());
        let Some(next) = status_advance(appt.status, derived) else {
            return false;
        };

        let written = match self.store.update_status(appt.appointment_id, next).await {
            Ok(changed) => changed,
            Err(e) => {
                warn!(appointment_id = %appt.appointment_id, error = %e, "status write-back failed");
                false
            }
        };
        appt.status = next;
        written
    }

    fn prepare(&self, req: &AppointmentRequest) -> Result<AppointmentDetails, SchedulingError> {
        let patient_name = req.patient_name.trim();
        if patient_name.is_empty() {
            return Err(SchedulingError::Validation("patient_name is required".into()));
        }
        let title = req.title.trim();
        if title.is_empty() {
            return Err(SchedulingError::Validation("title is required".into()));
        }
        if req.contact < 0 {
            return Err(SchedulingError::Validation(
                "contact must be a non-negative number".into(),
            ));
        }
        let description = req
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(AppointmentDetails {
            patient_name: patient_name.to_string(),
            contact: req.contact,
            title: title.to_string(),
            description,
            window: self
                .rules
                .window_for(req.start_at)
                .ok_or_else(start_out_of_range)?,
        })
    }
}

fn start_out_of_range() -> SchedulingError {
    SchedulingError::Validation("start_at is out of range".into())
}
