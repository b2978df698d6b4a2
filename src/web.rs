//! HTTP surface for authorization checks and introspection.
//!
//! The check endpoint takes the request parameter bag explicitly in the body,
//! so callers proxying on behalf of an inbound request pass that request's
//! params through unchanged.

use crate::authz::types::{CheckRequest, CheckResponse, RuleListResponse};
use crate::authz::Auth;
use crate::errors::AuthError;
use crate::settings::Settings;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<Auth>,
}

pub fn router(auth: Arc<Auth>) -> Router {
    Router::new()
        .route("/v1/check", post(handle_check))
        .route("/v1/users/{uid}/rules", get(handle_rules))
        .route("/v1/users/{uid}/groups", get(handle_groups))
        .route("/healthz", get(health))
        .with_state(AppState { auth })
}

pub async fn serve(settings: &Settings, auth: Arc<Auth>) -> Result<(), AuthError> {
    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .map_err(|e| AuthError::Other(format!("Invalid listen address: {e}")))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");
    axum::serve(listener, router(auth)).await?;
    Ok(())
}

async fn handle_check(
    State(state): State<AppState>,
    Json(req): Json<CheckRequest>,
) -> impl IntoResponse {
    match state
        .auth
        .check(&req.names, req.uid, req.relation, req.mode, &req.params)
        .await
    {
        Ok(allowed) => Json(CheckResponse { allowed }).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn handle_rules(State(state): State<AppState>, Path(uid): Path<i64>) -> impl IntoResponse {
    match state.auth.rule_list(uid).await {
        Ok(rules) => Json(RuleListResponse {
            superuser: rules.is_superuser(),
            rules: rules.names().map(str::to_string).collect(),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn handle_groups(State(state): State<AppState>, Path(uid): Path<i64>) -> impl IntoResponse {
    match state.auth.groups(uid).await {
        Ok(groups) => Json(groups).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
