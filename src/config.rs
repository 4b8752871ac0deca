use std::env;

use anyhow::Context;
use chrono::FixedOffset;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub session_ttl_hours: i64,
    /// Offset of the clinic's wall clock from UTC; service hours are checked in this zone.
    pub clinic_utc_offset_minutes: i32,
    pub appointment_minutes: i64,
    /// 0 disables the background status sync.
    pub status_sync_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let session_ttl_hours = env::var("SESSION_TTL_HOURS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(24);
        let clinic_utc_offset_minutes = env::var("CLINIC_UTC_OFFSET_MINUTES")
            .ok()
            .and_then(|s| s.parse::<i32>().ok())
            .unwrap_or(-5 * 60);
        let appointment_minutes = env::var("APPOINTMENT_MINUTES")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|m| *m > 0)
            .unwrap_or(30);
        let status_sync_interval_secs = env::var("STATUS_SYNC_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);

        Ok(Self {
            database_url,
            bind_addr,
            session_ttl_hours,
            clinic_utc_offset_minutes,
            appointment_minutes,
            status_sync_interval_secs,
        })
    }

    pub fn clinic_offset(&self) -> anyhow::Result<FixedOffset> {
        self.clinic_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .with_context(|| {
                format!(
                    "CLINIC_UTC_OFFSET_MINUTES out of range: {}",
                    self.clinic_utc_offset_minutes
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_offset(minutes: i32) -> Config {
        Config {
            database_url: "postgres://localhost/dcms".into(),
            bind_addr: "127.0.0.1:8080".into(),
            session_ttl_hours: 24,
            clinic_utc_offset_minutes: minutes,
            appointment_minutes: 30,
            status_sync_interval_secs: 60,
        }
    }

    #[test]
    fn clinic_offset_in_range() {
        let offset = with_offset(-300).clinic_offset().unwrap();
        assert_eq!(offset.local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn clinic_offset_out_of_range_is_an_error() {
        assert!(with_offset(24 * 60).clinic_offset().is_err());
        assert!(with_offset(i32::MAX).clinic_offset().is_err());
        assert!(with_offset(i32::MIN).clinic_offset().is_err());
    }
}
