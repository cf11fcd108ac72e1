//! Integration tests for the registry client against an in-process fake registry.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use order_registry::{check_freshness, Freshness, RegistryClient, RegistryError, SchemaRegistry};
use order_schema::{CompatibilityLevel, RecordSchema, ORDER_SCHEMA_JSON};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tower::ServiceBuilder;

#[derive(Default)]
struct RegistryState {
    /// (subject, schema text) in registration order; index + 1 is the schema id
    schemas: Vec<(String, String)>,
    subject_level: Option<String>,
    global_level: Option<String>,
}

type Shared = Arc<Mutex<RegistryState>>;

async fn list_subjects(State(state): State<Shared>) -> Json<Vec<String>> {
    let state = state.lock().unwrap();
    let mut subjects: Vec<String> = state.schemas.iter().map(|(s, _)| s.clone()).collect();
    subjects.dedup();
    Json(subjects)
}

async fn latest_version(State(state): State<Shared>, Path(subject): Path<String>) -> Response {
    let state = state.lock().unwrap();
    let versions: Vec<(usize, &String)> = state
        .schemas
        .iter()
        .enumerate()
        .filter(|(_, (s, _))| *s == subject)
        .map(|(idx, (_, schema))| (idx, schema))
        .collect();

    match versions.last() {
        Some((idx, schema)) => Json(json!({
            "subject": subject,
            "version": versions.len(),
            "id": idx + 1,
            "schema": schema,
        }))
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error_code": 40401, "message": "Subject not found."})),
        )
            .into_response(),
    }
}

async fn register(
    State(state): State<Shared>,
    Path(subject): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let schema = body["schema"].as_str().unwrap_or_default().to_string();
    let mut state = state.lock().unwrap();
    if let Some(idx) = state
        .schemas
        .iter()
        .position(|(s, text)| *s == subject && *text == schema)
    {
        return Json(json!({"id": idx + 1})).into_response();
    }
    state.schemas.push((subject, schema));
    Json(json!({"id": state.schemas.len()})).into_response()
}

async fn schema_by_id(State(state): State<Shared>, Path(id): Path<usize>) -> Response {
    let state = state.lock().unwrap();
    match id.checked_sub(1).and_then(|idx| state.schemas.get(idx)) {
        Some((_, schema)) => Json(json!({"schema": schema})).into_response(),
        None => (StatusCode::NOT_FOUND, "Schema not found").into_response(),
    }
}

async fn subject_config(State(state): State<Shared>, Path(_subject): Path<String>) -> Response {
    match &state.lock().unwrap().subject_level {
        Some(level) => Json(json!({"compatibilityLevel": level})).into_response(),
        None => (StatusCode::NOT_FOUND, "Subject not found").into_response(),
    }
}

async fn global_config(State(state): State<Shared>) -> Response {
    match &state.lock().unwrap().global_level {
        Some(level) => Json(json!({"compatibilityLevel": level})).into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "no config").into_response(),
    }
}

/// Start a fake registry and return its base URL.
async fn start_fake_registry(state: Shared) -> anyhow::Result<String> {
    let app = Router::new()
        .route("/subjects", get(list_subjects))
        .route("/subjects/:subject/versions/latest", get(latest_version))
        .route(
            "/subjects/:subject/versions",
            axum::routing::post(register),
        )
        .route("/schemas/ids/:id", get(schema_by_id))
        .route("/config/:subject", get(subject_config))
        .route("/config", get(global_config))
        .layer(ServiceBuilder::new())
        .with_state(state);

    // Bind to any available port
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Ok(format!("http://{addr}"))
}

#[tokio::test]
async fn test_register_then_lookup() {
    let _ = tracing_subscriber::fmt().with_env_filter("debug").try_init();

    let state = Shared::default();
    let url = start_fake_registry(state.clone()).await.unwrap();
    let client = RegistryClient::new(&url).unwrap();

    let id = client
        .register_schema("orders-value", ORDER_SCHEMA_JSON)
        .await
        .unwrap();
    assert_eq!(id, 1);

    // Registering the same text again returns the same id
    let again = client
        .register_schema("orders-value", ORDER_SCHEMA_JSON)
        .await
        .unwrap();
    assert_eq!(again, id);

    assert_eq!(client.subjects().await.unwrap(), vec!["orders-value"]);
    assert_eq!(client.schema_by_id(id).await.unwrap(), ORDER_SCHEMA_JSON);

    let latest = client.latest_schema("orders-value").await.unwrap();
    assert_eq!(latest.version, 1);
    assert_eq!(latest.id, 1);
}

#[tokio::test]
async fn test_subject_with_slash_stays_one_segment() {
    let state = Shared::default();
    let url = start_fake_registry(state.clone()).await.unwrap();
    let client = RegistryClient::new(&url).unwrap();

    let id = client
        .register_schema("team/orders-value", ORDER_SCHEMA_JSON)
        .await
        .unwrap();
    assert_eq!(state.lock().unwrap().schemas[0].0, "team/orders-value");

    let latest = client.latest_schema("team/orders-value").await.unwrap();
    assert_eq!(latest.subject, "team/orders-value");
    assert_eq!(latest.id, id);
}

#[tokio::test]
async fn test_missing_subject_and_id() {
    let url = start_fake_registry(Shared::default()).await.unwrap();
    let client = RegistryClient::new(&url).unwrap();

    assert!(matches!(
        client.latest_schema("orders-value").await,
        Err(RegistryError::SubjectNotFound(s)) if s == "orders-value"
    ));
    assert!(matches!(
        client.schema_by_id(42).await,
        Err(RegistryError::SchemaNotFound(42))
    ));
}

#[tokio::test]
async fn test_compatibility_level_fallbacks() {
    let state = Shared::default();
    let url = start_fake_registry(state.clone()).await.unwrap();
    let client = RegistryClient::new(&url).unwrap();

    // Neither subject nor global level configured
    assert_eq!(
        client.compatibility_level("orders-value").await.unwrap(),
        CompatibilityLevel::Backward
    );

    state.lock().unwrap().global_level = Some("FORWARD".to_string());
    assert_eq!(
        client.compatibility_level("orders-value").await.unwrap(),
        CompatibilityLevel::Forward
    );

    state.lock().unwrap().subject_level = Some("FULL_TRANSITIVE".to_string());
    assert_eq!(
        client.compatibility_level("orders-value").await.unwrap(),
        CompatibilityLevel::FullTransitive
    );
}

#[tokio::test]
async fn test_freshness_over_http() {
    let state = Shared::default();
    let url = start_fake_registry(state.clone()).await.unwrap();
    let client = RegistryClient::new(&url).unwrap();
    let local = RecordSchema::order().unwrap();

    assert!(matches!(
        check_freshness(&client, "orders-value", &local).await,
        Freshness::SubjectNotFound { .. }
    ));

    // Same schema, different formatting
    client
        .register_schema("orders-value", &local.to_json().unwrap())
        .await
        .unwrap();
    assert!(check_freshness(&client, "orders-value", &local)
        .await
        .is_up_to_date());

    client
        .register_schema(
            "orders-value",
            r#"{"type":"record","name":"Order","fields":[{"name":"id","type":"string"}]}"#,
        )
        .await
        .unwrap();
    assert!(matches!(
        check_freshness(&client, "orders-value", &local).await,
        Freshness::Outdated { .. }
    ));
}

#[tokio::test]
async fn test_unreachable_registry() {
    // Nothing listens on the discard port
    let client = RegistryClient::new("http://127.0.0.1:9").unwrap();
    assert!(matches!(
        client.subjects().await,
        Err(RegistryError::Http(_))
    ));
}
