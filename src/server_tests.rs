// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `server.rs`

#[cfg(test)]
mod tests {
    use crate::models::{ClusterList, ErrorResponse, ServerInfo, SingleCluster};
    use crate::platform::fake::{test_context, FakeOp, FakePlatform};
    use crate::server::router;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use serde::de::DeserializeOwned;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn send(fake: &Arc<FakePlatform>, method: Method, uri: &str, body: Option<&str>) -> Response {
        let app = router(Arc::new(test_context(fake)));
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        app.oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    async fn json<T: DeserializeOwned>(response: Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_server_info() {
        let fake = Arc::new(FakePlatform::new());
        let response = send(&fake, Method::GET, "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let info: ServerInfo = json(response).await;
        assert_eq!(info.application.name, "spark-clusters");
        assert_eq!(info.application.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(info.application.web_service_name, "spark-clusters-web");
    }

    #[tokio::test]
    async fn test_healthz() {
        let fake = Arc::new(FakePlatform::new());
        let response = send(&fake, Method::GET, "/healthz", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn test_create_returns_location() {
        let fake = Arc::new(FakePlatform::new());
        let body = r#"{"name":"c1","config":{"workerCount":2}}"#;
        let response = send(&fake, Method::POST, "/clusters", Some(body)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/clusters/c1"
        );

        let created: SingleCluster = json(response).await;
        assert_eq!(created.cluster.name, "c1");
        assert_eq!(created.cluster.config.worker_count, 2);
        assert_eq!(created.cluster.pods.len(), 3);
    }

    #[tokio::test]
    async fn test_create_conflict_is_error_body() {
        let fake = Arc::new(FakePlatform::new());
        fake.seed_cluster("c1", 1).await;

        let response = send(&fake, Method::POST, "/clusters", Some(r#"{"name":"c1"}"#)).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body: ErrorResponse = json(response).await;
        assert_eq!(body.errors.len(), 1);
        assert_eq!(body.errors[0].status, 409);
        assert_eq!(body.errors[0].title, "Cannot create cluster");
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let fake = Arc::new(FakePlatform::new());
        let response = send(&fake, Method::POST, "/clusters", Some("{not json")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = json(response).await;
        assert_eq!(body.errors[0].title, "Cannot create cluster");
        assert_eq!(fake.calls(FakeOp::CreateDeployment), 0);
    }

    #[tokio::test]
    async fn test_list_clusters() {
        let fake = Arc::new(FakePlatform::new());
        fake.seed_cluster("a", 2).await;

        let response = send(&fake, Method::GET, "/clusters", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let list: ClusterList = json(response).await;
        assert_eq!(list.clusters.len(), 1);
        assert_eq!(list.clusters[0].href, "/clusters/a");
        assert_eq!(list.clusters[0].worker_count, 2);
    }

    #[tokio::test]
    async fn test_list_failure() {
        let fake = Arc::new(FakePlatform::new());
        fake.fail(FakeOp::ListPods, "");

        let response = send(&fake, Method::GET, "/clusters", None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = json(response).await;
        assert_eq!(body.errors[0].title, "Cannot list clusters");
    }

    #[tokio::test]
    async fn test_get_unknown_cluster() {
        let fake = Arc::new(FakePlatform::new());
        let response = send(&fake, Method::GET, "/clusters/ghost", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: ErrorResponse = json(response).await;
        assert_eq!(body.errors[0].title, "Cannot get cluster");
        assert_eq!(body.errors[0].details, "No such cluster");
    }

    #[tokio::test]
    async fn test_get_cluster() {
        let fake = Arc::new(FakePlatform::new());
        fake.seed_cluster("c1", 1).await;

        let response = send(&fake, Method::GET, "/clusters/c1", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let found: SingleCluster = json(response).await;
        assert_eq!(found.cluster.master_url, "spark://c1:7077");
    }

    #[tokio::test]
    async fn test_update_is_accepted() {
        let fake = Arc::new(FakePlatform::new());
        fake.seed_cluster("c1", 1).await;

        let body = r#"{"name":"c1","config":{"workerCount":4}}"#;
        let response = send(&fake, Method::PUT, "/clusters/c1", Some(body)).await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let updated: SingleCluster = json(response).await;
        assert_eq!(updated.cluster.config.worker_count, 4);
    }

    #[tokio::test]
    async fn test_update_rename_is_conflict() {
        let fake = Arc::new(FakePlatform::new());
        fake.seed_cluster("c1", 1).await;

        let body = r#"{"name":"c2","config":{"workerCount":4}}"#;
        let response = send(&fake, Method::PUT, "/clusters/c1", Some(body)).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let err: ErrorResponse = json(response).await;
        assert_eq!(err.errors[0].title, "Cannot update cluster");
        assert_eq!(
            err.errors[0].details,
            "Changing the cluster name is not supported"
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let fake = Arc::new(FakePlatform::new());
        fake.seed_cluster("c1", 1).await;

        let response = send(&fake, Method::DELETE, "/clusters/c1", None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&fake, Method::DELETE, "/clusters/c1", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: ErrorResponse = json(response).await;
        assert_eq!(body.errors[0].title, "Cluster deletion failed");
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let fake = Arc::new(FakePlatform::new());
        send(&fake, Method::GET, "/clusters/ghost", None).await;

        let response = send(&fake, Method::GET, "/metrics", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("spark_clusters_operations_total"));
    }
}
