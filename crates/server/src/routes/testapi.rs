//! Echo endpoint the dashboard uses to check connectivity.

use axum::{Json, Router, routing::get};
use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};

use crate::state::AppState;

/// Build the test API router. Not covered by the token guard.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/testapi", get(ping).post(echo))
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `GET /api/testapi`
pub async fn ping() -> Json<Value> {
    Json(json!({
        "message": "Test API is working!",
        "timestamp": timestamp(),
    }))
}

/// `POST /api/testapi`: echo the JSON body back.
pub async fn echo(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "message": "POST request received",
        "data": body,
        "timestamp": timestamp(),
    }))
}
