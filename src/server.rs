// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! HTTP delivery surface - serves analysis results to the dashboard.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::info;

use crate::engine::BundleEngine;
use crate::error::AnalysisError;
use crate::rpc::LedgerClient;

/// Start the analysis server. One route per contract: the serialized
/// analysis for a mint, and a liveness probe.
pub async fn serve<L: LedgerClient + 'static>(
    engine: BundleEngine<L>,
    port: u16,
) -> Result<(), String> {
    let app = Router::new()
        .route("/analyze/:mint", get(handle_analyze::<L>))
        .route("/health", get(health_check))
        .with_state(Arc::new(engine));

    let addr = format!("0.0.0.0:{}", port);
    info!("🌐 starting analysis server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind: {}", e))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

/// Callers get either a complete (possibly degraded) analysis or one typed
/// error body - never a partial payload.
async fn handle_analyze<L: LedgerClient + 'static>(
    State(engine): State<Arc<BundleEngine<L>>>,
    Path(mint): Path<String>,
) -> Response {
    match engine.analyze(&mint).await {
        Ok(analysis) => (StatusCode::OK, Json(analysis)).into_response(),
        Err(e @ AnalysisError::MintNotFound { .. }) => {
            (StatusCode::NOT_FOUND, Json(json!({ "error": e.to_string() }))).into_response()
        }
        Err(e) => {
            (StatusCode::BAD_GATEWAY, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}
