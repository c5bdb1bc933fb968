//! WBS node endpoints
//!
//! # Endpoints
//!
//! - `GET /api/health` - Health check endpoint
//! - `GET /api/wbs/tree` - Nested breakdown
//! - `GET /api/wbs/nodes` - All nodes, flat
//! - `POST /api/wbs/nodes` - Create a node
//! - `GET /api/wbs/nodes/:id` - Get a node by ID
//! - `PATCH /api/wbs/nodes/:id` - Update a node
//! - `DELETE /api/wbs/nodes/:id` - Delete a node and its subtree
//! - `GET /api/wbs/nodes/:id/children` - Direct children of a node
//! - `PATCH /api/wbs/nodes/:id/move` - Reparent and/or reposition a node

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AppState, HttpError};
use wbs_core::{NewWbsNode, WbsNode, WbsNodeUpdate, WbsNodeWithChildren};

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub node_count: usize,
}

/// Plain confirmation body for delete and move
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of a move request
///
/// Both fields are taken loosely: `newParentId` may be missing, `null` or an
/// empty string (all meaning root), and `newPosition` may be a number or a
/// numeric string. A position that does not parse becomes 0.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MoveNodeInput {
    pub new_parent_id: Value,
    pub new_position: Value,
}

impl MoveNodeInput {
    pub fn parent_id(&self) -> Result<Option<&str>, HttpError> {
        match &self.new_parent_id {
            Value::Null => Ok(None),
            Value::String(id) if id.is_empty() => Ok(None),
            Value::String(id) => Ok(Some(id.as_str())),
            other => Err(HttpError::invalid_data(format!(
                "newParentId must be a string or null, got {}",
                other
            ))),
        }
    }

    pub fn position(&self) -> Result<u32, HttpError> {
        let position = match &self.new_position {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_u64().map(|v| i64::try_from(v).unwrap_or(i64::MAX)))
                .or_else(|| n.as_f64().map(|v| v.trunc() as i64))
                .unwrap_or(0),
            Value::String(s) => parse_leading_integer(s).unwrap_or(0),
            _ => 0,
        };

        if position < 0 {
            return Err(HttpError::invalid_data(format!(
                "newPosition must not be negative, got {}",
                position
            )));
        }
        Ok(u32::try_from(position).unwrap_or(u32::MAX))
    }
}

/// Integer prefix of `raw`, after leading whitespace and an optional sign
fn parse_leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Health check endpoint
///
/// # Example
///
/// ```bash
/// curl http://localhost:5000/api/health
/// ```
async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        node_count: state.service.node_count().await,
    })
}

/// Nested projection of the whole breakdown, roots and siblings sorted by position
///
/// # Example
///
/// ```bash
/// curl http://localhost:5000/api/wbs/tree
/// ```
async fn get_tree(State(state): State<AppState>) -> Json<Vec<WbsNodeWithChildren>> {
    Json(state.service.get_tree().await)
}

async fn list_nodes(State(state): State<AppState>) -> Json<Vec<WbsNode>> {
    Json(state.service.list_nodes().await)
}

/// Get a node by ID
///
/// # Example
///
/// ```bash
/// curl http://localhost:5000/api/wbs/nodes/planning
/// ```
async fn get_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WbsNode>, HttpError> {
    state
        .service
        .get_node(&id)
        .await
        .map(Json)
        .ok_or_else(HttpError::node_not_found)
}

/// Direct children of a node, sorted by position
///
/// # Example
///
/// ```bash
/// curl http://localhost:5000/api/wbs/nodes/root/children
/// ```
async fn get_children(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<WbsNode>>, HttpError> {
    if state.service.get_node(&id).await.is_none() {
        return Err(HttpError::node_not_found());
    }
    Ok(Json(state.service.get_children(Some(&id)).await))
}

/// Create a new node
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:5000/api/wbs/nodes \
///   -H "Content-Type: application/json" \
///   -d '{
///     "name": "Load Testing",
///     "parentId": "testing",
///     "position": 0,
///     "level": 2
///   }'
/// ```
async fn create_node(
    State(state): State<AppState>,
    payload: Result<Json<NewWbsNode>, JsonRejection>,
) -> Result<(StatusCode, Json<WbsNode>), HttpError> {
    let Json(attributes) = payload?;
    attributes.validate()?;

    let node = state.service.create_node(attributes).await.map_err(|e| {
        tracing::warn!("❌ Node creation rejected: {}", e);
        HttpError::from(e)
    })?;

    tracing::debug!("✅ Created node: {}", node.id);
    Ok((StatusCode::CREATED, Json(node)))
}

/// Update an existing node
///
/// Omitted fields are left unchanged; optional text fields and `parentId`
/// may be cleared with an explicit `null`.
///
/// # Example
///
/// ```bash
/// curl -X PATCH http://localhost:5000/api/wbs/nodes/testing \
///   -H "Content-Type: application/json" \
///   -d '{"expanded": true, "responsible": null}'
/// ```
async fn update_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<WbsNodeUpdate>, JsonRejection>,
) -> Result<Json<WbsNode>, HttpError> {
    let Json(update) = payload?;
    update.validate()?;

    tracing::info!("📝 UPDATE request for node: {}", id);
    state
        .service
        .update_node(&id, update)
        .await?
        .map(Json)
        .ok_or_else(HttpError::node_not_found)
}

/// Delete a node and every descendant
///
/// # Example
///
/// ```bash
/// curl -X DELETE http://localhost:5000/api/wbs/nodes/planning
/// ```
async fn delete_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, HttpError> {
    if !state.service.delete_node(&id).await {
        return Err(HttpError::node_not_found());
    }

    tracing::debug!("✅ Deleted node: {}", id);
    Ok(Json(MessageResponse::new("Node deleted successfully")))
}

/// Move a node under a new parent (or to root) at a position
///
/// Siblings at or after the target position shift down by one.
///
/// # Example
///
/// ```bash
/// curl -X PATCH http://localhost:5000/api/wbs/nodes/design/move \
///   -H "Content-Type: application/json" \
///   -d '{"newParentId": "development", "newPosition": 0}'
/// ```
async fn move_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MoveNodeInput>, JsonRejection>,
) -> Result<Json<MessageResponse>, HttpError> {
    let Json(input) = payload?;
    let parent_id = input.parent_id()?;
    let position = input.position()?;

    if !state.service.move_node(&id, parent_id, position).await? {
        return Err(HttpError::node_not_found());
    }

    tracing::debug!("✅ Moved node: {}", id);
    Ok(Json(MessageResponse::new("Node moved successfully")))
}

/// Router with every WBS endpoint
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/wbs/tree", get(get_tree))
        .route("/api/wbs/nodes", get(list_nodes).post(create_node))
        .route(
            "/api/wbs/nodes/:id",
            get(get_node).patch(update_node).delete(delete_node),
        )
        .route("/api/wbs/nodes/:id/children", get(get_children))
        .route("/api/wbs/nodes/:id/move", patch(move_node))
        .with_state(state)
}
