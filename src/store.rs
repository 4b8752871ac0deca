// src/store.rs

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Appointment, AppointmentDetails, AppointmentStatus};
use crate::scheduling::TimeWindow;

// SQLSTATE exclusion_violation, raised by appointment_no_overlap.
const EXCLUSION_VIOLATION: &str = "23P01";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// The store itself refused an overlapping interval.
    #[error("interval overlaps an existing appointment")]
    Exclusion,
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.code().as_deref() == Some(EXCLUSION_VIOLATION) {
                return StoreError::Exclusion;
            }
        }
        StoreError::Unavailable(format!("db error: {e}"))
    }
}

/// Persistent home of appointments. The scheduler reads a fresh snapshot on
/// every call and never keeps its own copy.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// All appointments, ordered by start.
    async fn list_appointments(&self) -> Result<Vec<Appointment>, StoreError>;

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, StoreError>;

    /// Inserts with status `Pending` and returns the new id.
    async fn insert_appointment(&self, details: &AppointmentDetails) -> Result<Uuid, StoreError>;

    /// Replaces the editable fields and resets status to `Pending`.
    /// Returns false when `id` does not exist.
    async fn update_appointment(
        &self,
        id: Uuid,
        details: &AppointmentDetails,
    ) -> Result<bool, StoreError>;

    /// Moves the persisted status forward to `status`. A row already at or
    /// past it is left alone; returns whether a row changed.
    async fn update_status(&self, id: Uuid, status: AppointmentStatus)
    -> Result<bool, StoreError>;

    async fn delete_appointment(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Appointments that may overlap `window`. A superset is acceptable; callers
    /// apply the exact rule themselves.
    async fn overlap_candidates(
        &self,
        window: &TimeWindow,
        exclude_id: Option<Uuid>,
    ) -> Result<Vec<Appointment>, StoreError>;
}

#[derive(Clone)]
pub struct PgAppointmentStore {
    db: sqlx::PgPool,
}

impl PgAppointmentStore {
    pub fn new(db: sqlx::PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AppointmentStore for PgAppointmentStore {
    async fn list_appointments(&self) -> Result<Vec<Appointment>, StoreError> {
        let rows = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT appointment_id, patient_name, contact, title, description,
                   start_at, end_at, status, created_at, updated_at
            FROM appointment
            ORDER BY start_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        let row = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT appointment_id, patient_name, contact, title, description,
                   start_at, end_at, status, created_at, updated_at
            FROM appointment
            WHERE appointment_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn insert_appointment(&self, details: &AppointmentDetails) -> Result<Uuid, StoreError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO appointment
                (patient_name, contact, title, description, start_at, end_at, status)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7)
            RETURNING appointment_id
            "#,
        )
        .bind(&details.patient_name)
        .bind(details.contact)
        .bind(&details.title)
        .bind(details.description.as_deref())
        .bind(details.window.start)
        .bind(details.window.end)
        .bind(AppointmentStatus::Pending)
        .fetch_one(&self.db)
        .await?;
        Ok(id)
    }

    async fn update_appointment(
        &self,
        id: Uuid,
        details: &AppointmentDetails,
    ) -> Result<bool, StoreError> {
        let res = sqlx::query(
            r#"
            UPDATE appointment
            SET patient_name = $2,
                contact      = $3,
                title        = $4,
                description  = $5,
                start_at     = $6,
                end_at       = $7,
                status       = $8,
                updated_at   = now()
            WHERE appointment_id = $1
            "#,
        )
        .bind(id)
        .bind(&details.patient_name)
        .bind(details.contact)
        .bind(&details.title)
        .bind(details.description.as_deref())
        .bind(details.window.start)
        .bind(details.window.end)
        .bind(AppointmentStatus::Pending)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<bool, StoreError> {
        let res = sqlx::query(
            r#"
            UPDATE appointment
            SET status = $2, updated_at = now()
            WHERE appointment_id = $1 AND status < $2
            "#,
        )
        .bind(id)
        .bind(status)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_appointment(&self, id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query(r#"DELETE FROM appointment WHERE appointment_id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn overlap_candidates(
        &self,
        window: &TimeWindow,
        exclude_id: Option<Uuid>,
    ) -> Result<Vec<Appointment>, StoreError> {
        let rows = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT appointment_id, patient_name, contact, title, description,
                   start_at, end_at, status, created_at, updated_at
            FROM appointment
            WHERE start_at < $2
              AND end_at > $1
              AND ($3::uuid IS NULL OR appointment_id <> $3)
            ORDER BY start_at ASC
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .bind(exclude_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
