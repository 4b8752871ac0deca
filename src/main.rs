mod auth;
mod config;
mod middleware;

mod db;
mod error;
mod models;
mod routes;
mod scheduling;
mod store;

use std::sync::Arc;

use crate::{
    config::Config,
    models::AppState,
    scheduling::{AppointmentScheduler, SchedulingRules},
    store::PgAppointmentStore,
};

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use axum::http::header;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cfg = Config::from_env()?;
    let pool = db::connect_pg(&cfg.database_url).await?;

    let rules = SchedulingRules::new(cfg.clinic_offset()?, cfg.appointment_minutes);
    tracing::info!(
        clinic_offset = %rules.clinic_offset,
        appointment_minutes = cfg.appointment_minutes,
        "scheduling rules loaded"
    );
    let store = Arc::new(PgAppointmentStore::new(pool.clone()));
    let scheduler = Arc::new(AppointmentScheduler::new(store, rules));

    if cfg.status_sync_interval_secs > 0 {
        scheduler
            .clone()
            .spawn_status_sync(std::time::Duration::from_secs(cfg.status_sync_interval_secs));
    }

    let state = AppState {
        db: pool,
        session_ttl_hours: cfg.session_ttl_hours,
        scheduler,
    };

    // Browser front-ends are served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]);

    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!("Listening on http://{}", cfg.bind_addr);
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
