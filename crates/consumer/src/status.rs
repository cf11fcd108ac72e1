//! `GET /schema-status`: is the locally compiled schema the registry's latest?
//!
//! | Outcome | Status |
//! |---|---|
//! | subject not registered | 404 |
//! | schemas match | 200 |
//! | schemas differ | 417 |
//! | registry unreachable | 500 |

use anyhow::Context;
use axum::{extract::State, http::StatusCode, routing::get, Router};
use order_registry::{check_freshness, Freshness, SchemaRegistry};
use order_schema::RecordSchema;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// What the status endpoint compares.
#[derive(Clone)]
pub struct StatusState {
    pub registry: Arc<dyn SchemaRegistry>,
    pub subject: String,
    pub schema: Arc<RecordSchema>,
}

pub fn router(state: StatusState) -> Router {
    Router::new()
        .route("/schema-status", get(schema_status))
        .with_state(state)
}

/// Bind `addr` and serve the status endpoint until the task is dropped.
pub async fn serve_status(addr: SocketAddr, state: StatusState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind status endpoint to {addr}"))?;
    tracing::info!("Schema status endpoint listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .await
        .context("Status endpoint failed")
}

async fn schema_status(State(state): State<StatusState>) -> (StatusCode, String) {
    let freshness = check_freshness(state.registry.as_ref(), &state.subject, &state.schema).await;
    (status_code(&freshness), freshness.message())
}

fn status_code(freshness: &Freshness) -> StatusCode {
    match freshness {
        Freshness::SubjectNotFound { .. } => StatusCode::NOT_FOUND,
        Freshness::UpToDate { .. } => StatusCode::OK,
        Freshness::Outdated { .. } => StatusCode::EXPECTATION_FAILED,
        Freshness::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
