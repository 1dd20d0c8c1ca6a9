//! HTTP server for the org panel API

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use super::handler::*;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;

/// Build the API router over `state`
pub fn router(state: AppState, client_origin: Option<&str>) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/status", get(status_handler))
        .route("/api/users", get(users_handler))
        .route("/api/users/with-location", get(users_with_location_handler))
        .route("/api/users/by-principal/:principal", get(user_by_principal_handler))
        .route("/api/users/photo/:principal", get(photo_handler))
        .route("/api/users/photos", post(photos_handler))
        .route("/api/users/management-chain/:principal", get(management_chain_handler))
        .route("/api/users/org-tree/:principal", get(org_tree_handler))
        .route("/api/users/search/:term", get(search_handler))
        .route("/api/users/location/filter", get(location_filter_handler))
        .route("/api/users/stats/locations", get(location_stats_handler))
        .route("/api/users/:id", get(user_by_id_handler))
        .route("/api/users/:id/direct-reports", get(direct_reports_handler))
        .route("/api/users/:id/direct-reports-details", get(direct_reports_details_handler))
        .route("/api/search/chat", post(chat_handler))
        .layer(cors_layer(client_origin))
        .with_state(state)
}

fn cors_layer(client_origin: Option<&str>) -> CorsLayer {
    let Some(origin) = client_origin else {
        return CorsLayer::permissive();
    };

    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
        Err(_) => {
            warn!("Ignoring invalid client origin {:?}, allowing any origin", origin);
            CorsLayer::permissive()
        }
    }
}

/// HTTP server serving the org panel API
pub struct HttpServer {
    state: AppState,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(state: AppState, config: ServerConfig) -> Self {
        Self { state, config }
    }

    /// Bind and serve until the process stops
    pub async fn start(&self) -> std::io::Result<()> {
        let app = router(self.state.clone(), self.config.client_origin.as_deref());

        let addr = format!("{}:{}", self.config.address, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!("Server running on http://{}", addr);

        axum::serve(listener, app).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::org::{
        Directory, DirectReportLink, Employee, InMemoryRecordStore, ManagerLink, PhotoRecord, RecordStore,
        ReportSummary, StoreError, StoreResult,
    };
    use crate::org::{EmployeeId, PrincipalName};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let mut store = InMemoryRecordStore::new();
        let boss = Employee::new("1", "boss@x.com", "Boss").with_title("VP");
        let ann = Employee::new("2", "ann@x.com", "Ann");
        let ben = Employee::new("3", "ben@x.com", "ben");
        for e in [&boss, &ann, &ben] {
            store.insert_user(e.clone());
        }
        store.insert_manager_link(ManagerLink::new("ann@x.com", "boss@x.com"));
        store.insert_manager_link(ManagerLink::new("ben@x.com", "boss@x.com"));
        store.insert_direct_report_link(DirectReportLink {
            user_principal_name: "boss@x.com".into(),
            direct_reports: vec![ReportSummary::from(&ben), ReportSummary::from(&ann)],
        });
        store.insert_photo(PhotoRecord {
            user_principal_name: "ann@x.com".into(),
            photo: "data:image/png;base64,QU5O".into(),
        });
        router(AppState::new(Directory::new(Arc::new(store)), 10), None)
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, req).await
    }

    #[tokio::test]
    async fn test_health_and_status() {
        let (status, body) = get_json(app(), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = get_json(app(), "/api/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["storage"]["users"], 3);
    }

    #[tokio::test]
    async fn test_user_lookups() {
        let (status, body) = get_json(app(), "/api/users/2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["displayName"], "Ann");
        assert_eq!(body["photo"], "data:image/png;base64,QU5O");

        let (status, body) = get_json(app(), "/api/users/404").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found");

        let (status, body) = get_json(app(), "/api/users/by-principal/ben@x.com").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "3");
    }

    #[tokio::test]
    async fn test_org_tree_and_null() {
        let (status, body) = get_json(app(), "/api/users/org-tree/ann@x.com").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["managementChain"][0]["displayName"], "Boss");
        assert_eq!(body["currentUser"]["isCurrentUser"], true);
        let peers: Vec<&str> = body["peers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["displayName"].as_str().unwrap())
            .collect();
        assert_eq!(peers, vec!["Ann", "ben"]);

        let (status, body) = get_json(app(), "/api/users/org-tree/nobody@x.com").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_null());
    }

    #[tokio::test]
    async fn test_direct_reports_routes() {
        let (_, basic) = get_json(app(), "/api/users/1/direct-reports").await;
        assert_eq!(basic[0]["displayName"], "ben");

        let (_, details) = get_json(app(), "/api/users/1/direct-reports-details").await;
        assert_eq!(details[0]["displayName"], "Ann");
        assert_eq!(details[0]["hasDirectReports"], false);

        let (status, empty) = get_json(app(), "/api/users/404/direct-reports-details").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(empty, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_photos() {
        let (status, body) = get_json(app(), "/api/users/photo/ben@x.com").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Photo not found");

        let (status, body) = post_json(
            app(),
            "/api/users/photos",
            serde_json::json!({ "userPrincipalNames": ["ann@x.com", "ben@x.com"] }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_object().unwrap().len(), 1);

        let (status, _) = post_json(app(), "/api/users/photos", serde_json::json!({ "userPrincipalNames": "ann" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat() {
        let (status, body) = post_json(
            app(),
            "/api/search/chat",
            serde_json::json!({ "message": "who is my manager?", "userPrincipalName": "ann@x.com" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["response"].as_str().unwrap().contains("**Boss** - VP"));

        let (status, body) = post_json(app(), "/api/search/chat", serde_json::json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Message is required");
    }

    struct BrokenStore;

    #[async_trait]
    impl RecordStore for BrokenStore {
        async fn user_by_principal(&self, _: &PrincipalName) -> StoreResult<Option<Employee>> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn user_by_id(&self, _: &EmployeeId) -> StoreResult<Option<Employee>> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn manager_link(&self, _: &PrincipalName) -> StoreResult<Option<ManagerLink>> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn direct_report_link(&self, _: &PrincipalName) -> StoreResult<Option<DirectReportLink>> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn photo(&self, _: &PrincipalName) -> StoreResult<Option<String>> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn all_users(&self) -> StoreResult<Vec<Employee>> {
            Err(StoreError::Unavailable("down".into()))
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_500() {
        let app = router(AppState::new(Directory::new(Arc::new(BrokenStore)), 10), None);
        let (status, body) = get_json(app, "/api/users/org-tree/ann@x.com").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch org tree");
    }
}
