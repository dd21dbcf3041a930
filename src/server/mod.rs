//! HTTP API for the bid optimizer.
//!
//! The front end uploads performance data to `/optimize`, receives a
//! download id, and fetches the generated report from `/download/{id}`.
//! The `/ads/*` routes front the advertising API directly.

mod auth;
mod error;
mod handlers;
mod reports;
mod types;

pub use auth::AuthState;
pub use error::ApiError;
pub use reports::ReportStore;
pub use types::{AdsOptimizeRequest, ErrorResponse, OptimizeParams, OptimizeResponse};

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use secrecy::SecretString;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::ads::{AdsApi, InMemoryAdsApi};
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::optimizer::{BidOptimizer, BidPolicy};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct ServerState {
    pub optimizer: Arc<BidOptimizer>,
    pub ads: Arc<dyn AdsApi>,
    pub reports: ReportStore,
}

/// Router-level settings: auth, CORS, and body limit.
pub struct RouterOptions {
    pub api_token: Option<Arc<SecretString>>,
    pub cors_origin: Option<HeaderValue>,
    pub max_upload_bytes: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            api_token: None,
            cors_origin: None,
            max_upload_bytes: ServerConfig::default().max_upload_bytes,
        }
    }
}

/// The optimizer's HTTP server.
pub struct OptimizerServer;

impl OptimizerServer {
    /// Build the axum router.
    pub fn router(state: ServerState, options: RouterOptions) -> Router {
        let mut api = Router::new()
            .route("/optimize", post(handlers::optimize))
            .route("/download/{download_id}", get(handlers::download))
            .route("/ads/targets", get(handlers::list_targets))
            .route("/ads/bids", post(handlers::update_bids))
            .route("/ads/optimize", post(handlers::optimize_ads));

        if let Some(token) = options.api_token {
            api = api.route_layer(axum::middleware::from_fn_with_state(
                AuthState { token },
                auth::auth_middleware,
            ));
        }

        let cors = match options.cors_origin {
            Some(origin) => CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(Any)
                .allow_headers(Any),
            None => CorsLayer::permissive(),
        };

        api
            // Unauthenticated routes (added after the layer).
            .route("/health", get(handlers::health))
            .layer(DefaultBodyLimit::max(options.max_upload_bytes))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn start(
        config: ServerConfig,
        policy: BidPolicy,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let ServerConfig {
            bind_addr,
            api_token,
            cors_origin,
            max_upload_bytes,
            max_stored_reports,
            demo_catalog,
        } = config;

        let cors_origin = cors_origin
            .map(|o| {
                HeaderValue::from_str(&o).map_err(|_| ServerError::InvalidCorsOrigin(o.clone()))
            })
            .transpose()?;

        if api_token.is_none() {
            tracing::warn!("PPC_API_TOKEN is not set, API routes are unauthenticated");
        }

        let ads: Arc<dyn AdsApi> = if demo_catalog {
            Arc::new(InMemoryAdsApi::with_demo_catalog())
        } else {
            Arc::new(InMemoryAdsApi::default())
        };

        let state = ServerState {
            optimizer: Arc::new(BidOptimizer::with_policy(policy).map_err(ServerError::Policy)?),
            ads,
            reports: ReportStore::new(max_stored_reports),
        };
        let options = RouterOptions {
            api_token: api_token.map(Arc::new),
            cors_origin,
            max_upload_bytes,
        };
        let router = Self::router(state, options);

        let listener = tokio::net::TcpListener::bind(bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind_addr.to_string(),
                source,
            })?;

        let local: SocketAddr = listener.local_addr()?;
        tracing::info!("Optimizer API listening on {}", local);

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("Optimizer API shutting down");
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tower::ServiceExt;

    use super::*;
    use crate::ads::{ApiResponse, BidUpdateResult};
    use crate::optimizer::Target;

    const UPLOAD: &str = r#"{
        "targets": [
            {
                "id": "kw-001", "campaign_id": "camp-abc", "ad_group_id": "ag-123",
                "kind": "BROAD", "current_bid": "0.75",
                "impressions": 1500, "clicks": 50, "cost": "37.5", "sales": "250"
            },
            {
                "id": "kw-004", "campaign_id": "camp-abc", "ad_group_id": "ag-123",
                "kind": "EXACT", "current_bid": "1.00",
                "impressions": 100, "clicks": 5, "cost": "1.50", "sales": "0"
            }
        ]
    }"#;

    fn test_state() -> ServerState {
        ServerState {
            optimizer: Arc::new(BidOptimizer::new()),
            ads: Arc::new(InMemoryAdsApi::with_demo_catalog()),
            reports: ReportStore::new(10),
        }
    }

    fn test_router() -> Router {
        OptimizerServer::router(test_state(), RouterOptions::default())
    }

    fn authed_router(token: &str) -> Router {
        OptimizerServer::router(
            test_state(),
            RouterOptions {
                api_token: Some(Arc::new(SecretString::from(token.to_string()))),
                ..RouterOptions::default()
            },
        )
    }

    async fn body_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn upload(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_requires_no_auth() {
        let router = authed_router("secret");
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn optimize_then_download() {
        let router = test_router();

        let resp = router
            .clone()
            .oneshot(upload(
                "/optimize?target_acos=30&increase_spend=true&aov=25",
                UPLOAD,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let ack: OptimizeResponse = body_json(resp).await;
        assert_eq!(ack.summary.total_count, 2);
        assert_eq!(ack.summary.updates_recommended_count, 2);
        assert_eq!(ack.summary.promising_count, 1);

        let req = Request::builder()
            .uri(format!("/download/{}", ack.download_id))
            .body(Body::empty())
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp
            .headers()
            .get(axum::http::header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment;"));

        let report: serde_json::Value = body_json(resp).await;
        assert_eq!(report["download_id"], ack.download_id.to_string());
        assert_eq!(report["results"][0]["recommended_bid"], "0.90");
        assert_eq!(report["results"][1]["recommended_bid"], "1.05");
        assert_eq!(report["results"][1]["is_promising"], true);
    }

    #[tokio::test]
    async fn optimize_rejects_invalid_batch_wholesale() {
        let router = test_router();
        let body = r#"[
            {"id": "a", "campaign_id": "c", "ad_group_id": "g", "current_bid": "1",
             "impressions": 100, "clicks": 5, "cost": "1", "sales": "0"},
            {"id": "b", "campaign_id": "c", "ad_group_id": "g", "current_bid": "1",
             "impressions": 5, "clicks": 10, "cost": "1", "sales": "0"}
        ]"#;

        let resp = router
            .oneshot(upload("/optimize?target_acos=30", body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let err: ErrorResponse = body_json(resp).await;
        assert!(err.detail.contains("clicks (10) exceed impressions (5)"));
    }

    #[tokio::test]
    async fn optimize_rejects_unrepresentable_amounts() {
        let router = test_router();
        let body = r#"[
            {"id": "tiny", "campaign_id": "c", "ad_group_id": "g", "current_bid": "1",
             "impressions": 100, "clicks": 5, "cost": "10000000000",
             "sales": "0.00000000000000000001"}
        ]"#;

        let resp = router
            .clone()
            .oneshot(upload("/optimize?target_acos=30", body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let err: ErrorResponse = body_json(resp).await;
        assert!(err.detail.contains("target tiny: acos is out of range"));

        let body = r#"[
            {"id": "huge", "campaign_id": "c", "ad_group_id": "g",
             "current_bid": "70000000000000000000000000000",
             "impressions": 100, "clicks": 5, "cost": "1", "sales": "0"}
        ]"#;
        let resp = router
            .oneshot(upload("/optimize?target_acos=30", body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let ack: OptimizeResponse = body_json(resp).await;
        assert_eq!(ack.summary.updates_recommended_count, 0);
    }

    #[tokio::test]
    async fn optimize_reports_bad_input_as_detail() {
        let router = test_router();

        let resp = router
            .clone()
            .oneshot(upload("/optimize?target_acos=30", ""))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let err: ErrorResponse = body_json(resp).await;
        assert_eq!(err.detail, "uploaded file is empty");

        let resp = router
            .clone()
            .oneshot(upload("/optimize?target_acos=0", UPLOAD))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = router
            .oneshot(upload("/optimize", UPLOAD))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let err: ErrorResponse = body_json(resp).await;
        assert!(!err.detail.is_empty());
    }

    #[tokio::test]
    async fn download_unknown_id_is_404() {
        let router = test_router();
        let req = Request::builder()
            .uri(format!("/download/{}", uuid::Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let err: ErrorResponse = body_json(resp).await;
        assert!(err.detail.contains("not found"));
    }

    #[tokio::test]
    async fn api_routes_reject_missing_or_wrong_token() {
        let router = authed_router("secret");

        let resp = router
            .clone()
            .oneshot(upload("/optimize?target_acos=30", UPLOAD))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = Request::builder()
            .method("POST")
            .uri("/optimize?target_acos=30")
            .header("Authorization", "Bearer totally-bogus")
            .body(Body::from(UPLOAD))
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn api_routes_accept_header_or_query_token() {
        let router = authed_router("secret");

        let req = Request::builder()
            .method("POST")
            .uri("/optimize?target_acos=30")
            .header("Authorization", "Bearer secret")
            .body(Body::from(UPLOAD))
            .unwrap();
        let resp = router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let ack: OptimizeResponse = body_json(resp).await;

        let req = Request::builder()
            .uri(format!("/download/{}?token=secret", ack.download_id))
            .body(Body::empty())
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn query_token_is_percent_decoded() {
        let router = authed_router("a+b&c%d");

        let req = Request::builder()
            .method("POST")
            .uri("/optimize?target_acos=30&token=a%2Bb%26c%25d")
            .body(Body::from(UPLOAD))
            .unwrap();
        let resp = router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let req = Request::builder()
            .method("POST")
            .uri("/optimize?target_acos=30&token=a+b&c%d")
            .body(Body::from(UPLOAD))
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn ads_targets_filter_by_query() {
        let router = test_router();
        let req = Request::builder()
            .uri("/ads/targets?campaign_id=camp-xyz")
            .body(Body::empty())
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body: ApiResponse<Vec<Target>> = body_json(resp).await;
        assert!(body.success);
        let ids: Vec<&str> = body.data.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["tgt-001", "tgt-002"]);
    }

    #[tokio::test]
    async fn ads_bid_update_reports_per_target() {
        let router = test_router();
        let req = Request::builder()
            .method("POST")
            .uri("/ads/bids")
            .header("Content-Type", "application/json")
            .body(Body::from(
                r#"{"adjustments": [
                    {"target_id": "kw-001", "bid": "0.80"},
                    {"target_id": "missing", "bid": "0.80"}
                ]}"#,
            ))
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body: ApiResponse<Vec<BidUpdateResult>> = body_json(resp).await;
        assert_eq!(
            body.data,
            vec![
                BidUpdateResult::applied("kw-001"),
                BidUpdateResult::rejected("missing", "target not found"),
            ]
        );
    }

    #[tokio::test]
    async fn ads_optimize_runs_cycle() {
        let state = test_state();
        let ads = state.ads.clone();
        let router = OptimizerServer::router(state, RouterOptions::default());

        let req = Request::builder()
            .method("POST")
            .uri("/ads/optimize")
            .header("Content-Type", "application/json")
            .body(Body::from(
                r#"{"campaign_id": "camp-xyz", "target_acos": 10, "increase_spend": false}"#,
            ))
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let targets = ads
            .get_optimizable_targets(&crate::ads::TargetQuery::default())
            .await
            .unwrap();
        let tgt = targets.iter().find(|t| t.id == "tgt-001").unwrap();
        assert_eq!(tgt.current_bid, dec!(0.50));
    }
}
