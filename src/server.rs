// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! REST surface of the service.
//!
//! | Method | Path | Success |
//! |--------|------|---------|
//! | `GET` | `/` | 200 server info |
//! | `GET` | `/clusters` | 200 cluster list |
//! | `POST` | `/clusters` | 201 created cluster, `Location` header |
//! | `GET` | `/clusters/{name}` | 200 cluster |
//! | `PUT` | `/clusters/{name}` | 202 updated cluster |
//! | `DELETE` | `/clusters/{name}` | 204 |
//! | `GET` | `/metrics` | 200 Prometheus text |
//! | `GET` | `/healthz` | 200 `ok` |

use crate::constants::{APP_NAME, CLUSTERS_PATH};
use crate::context::Context;
use crate::errors::ClusterError;
use crate::http_errors::{
    ApiError, TITLE_CREATE, TITLE_DELETE, TITLE_GET, TITLE_LIST, TITLE_METRICS, TITLE_UPDATE,
};
use crate::metrics::gather_metrics;
use crate::models::{ApplicationInfo, ClusterList, NewCluster, ServerInfo, SingleCluster};
use crate::workflows;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};

/// Shared handler state
pub type AppState = Arc<Context>;

static REQUEST_ID: AtomicU64 = AtomicU64::new(0);

/// Build the router over `ctx`.
pub fn router(ctx: AppState) -> Router {
    Router::new()
        .route("/", get(server_info))
        .route(CLUSTERS_PATH, get(list_clusters).post(create_cluster))
        .route(
            "/clusters/{name}",
            get(find_cluster).put(update_cluster).delete(delete_cluster),
        )
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(health))
        .layer(middleware::from_fn(log_requests))
        .with_state(ctx)
}

/// Serve `ctx` on `addr` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve<F>(addr: SocketAddr, ctx: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("REST API listening on {}", addr);
    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn log_requests(request: Request, next: Next) -> Response {
    let id = REQUEST_ID.fetch_add(1, Ordering::Relaxed) + 1;
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let span = info_span!("request", id, method = %method, path = %path);
    let response = next.run(request).instrument(span).await;

    info!(
        id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "Handled request"
    );
    response
}

fn reject(title: &'static str, error: &ClusterError) -> ApiError {
    let api_error = ApiError::from_cluster(title, error);
    if api_error.status.is_server_error() {
        warn!(title, error = %error, "Request failed");
    } else {
        info!(title, error = %error, "Request rejected");
    }
    api_error
}

fn read_body(
    title: &'static str,
    body: Result<Json<NewCluster>, JsonRejection>,
) -> Result<NewCluster, ApiError> {
    body.map(|Json(request)| request)
        .map_err(|rejection| ApiError::bad_request(title, rejection.body_text()))
}

async fn server_info(State(ctx): State<AppState>) -> Json<ServerInfo> {
    Json(ServerInfo {
        application: ApplicationInfo {
            name: APP_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            web_service_name: ctx.environment.web_service_name.clone(),
        },
    })
}

async fn health() -> &'static str {
    "ok"
}

async fn metrics_handler() -> Result<String, ApiError> {
    gather_metrics().map_err(|e| ApiError::internal(TITLE_METRICS, e.to_string()))
}

async fn list_clusters(State(ctx): State<AppState>) -> Result<Json<ClusterList>, ApiError> {
    let clusters = workflows::list_clusters(&ctx)
        .await
        .map_err(|e| reject(TITLE_LIST, &e))?;
    Ok(Json(ClusterList { clusters }))
}

async fn create_cluster(
    State(ctx): State<AppState>,
    body: Result<Json<NewCluster>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = read_body(TITLE_CREATE, body)?;
    let cluster = workflows::create_cluster(&ctx, &request)
        .await
        .map_err(|e| reject(TITLE_CREATE, &e))?;

    let location = format!("{CLUSTERS_PATH}/{}", cluster.name);
    let mut response = (StatusCode::CREATED, Json(SingleCluster { cluster })).into_response();
    if let Ok(value) = HeaderValue::from_str(&location) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    Ok(response)
}

async fn find_cluster(
    State(ctx): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SingleCluster>, ApiError> {
    let cluster = workflows::find_cluster(&ctx, &name)
        .await
        .map_err(|e| reject(TITLE_GET, &e))?;
    Ok(Json(SingleCluster { cluster }))
}

async fn update_cluster(
    State(ctx): State<AppState>,
    Path(name): Path<String>,
    body: Result<Json<NewCluster>, JsonRejection>,
) -> Result<(StatusCode, Json<SingleCluster>), ApiError> {
    let request = read_body(TITLE_UPDATE, body)?;
    let cluster = workflows::update_cluster(&ctx, &name, &request)
        .await
        .map_err(|e| reject(TITLE_UPDATE, &e))?;
    Ok((StatusCode::ACCEPTED, Json(SingleCluster { cluster })))
}

async fn delete_cluster(
    State(ctx): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    workflows::delete_cluster(&ctx, &name)
        .await
        .map_err(|e| reject(TITLE_DELETE, &e))?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod server_tests;
