/*
 * Responsibility
 * - GET /health (疎通用, whitelist で常に public)
 */
use axum::Json;
use serde_json::{Value, json};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
