//! HTTP server for the refollow relay
//!
//! # Routes
//!
//! - `GET /` - Liveness check (plain text)
//! - `GET /refollow?fid=<fid>&refresh=true` - Following, followers, and not-following-back
//! - `POST /logout` - Clear the freshness cookie
//! - `GET /metrics` - Prometheus metrics
//!
//! Cross-origin requests are accepted from any origin with credentials, so
//! the freshness cookie travels with browser requests from the frontend.
//!
//! # Example
//!
//! ```no_run
//! use refollow::cache::CacheConfig;
//! use refollow::gate::CreatorRequirement;
//! use refollow::server::RefollowServer;
//! use refollow::service::RefollowService;
//! use refollow::upstream::NeynarClient;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = NeynarClient::new("https://api.neynar.com", "key", Duration::from_secs(30))
//!         .expect("Failed to create client");
//!     let service = RefollowService::new(
//!         Arc::new(client),
//!         CacheConfig::default(),
//!         CreatorRequirement::empty(),
//!     );
//!
//!     RefollowServer::new(service, false)
//!         .run("127.0.0.1:3001")
//!         .await
//!         .expect("Server failed");
//! }
//! ```

use crate::aggregator::AggregatedResult;
use crate::cache::{cookie_marks_prior_fetch, FreshnessRequest};
use crate::graph::Fid;
use crate::service::RefollowService;
use crate::{metrics, RefollowError, Result};
use axum::{
    extract::{Query, State},
    http::{header, Method},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Name of the cookie marking a prior successful fetch
pub const CACHE_COOKIE: &str = "refollow_cache_ts";

/// Plain-text body of the liveness route
pub const LIVENESS_MESSAGE: &str = "Refollow backend is running";

/// Shared server state
struct AppState {
    service: RefollowService,
    /// Mark cookies `Secure` (production)
    secure_cookies: bool,
}

/// HTTP server for the refollow relay
pub struct RefollowServer {
    state: Arc<AppState>,
}

impl RefollowServer {
    /// Create a server around a service
    pub fn new(service: RefollowService, secure_cookies: bool) -> Self {
        Self {
            state: Arc::new(AppState {
                service,
                secure_cookies,
            }),
        }
    }

    /// The router serving this server's state
    pub fn router(&self) -> Router {
        Self::build_router(self.state.clone())
    }

    fn build_router(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/", get(liveness))
            .route("/refollow", get(get_refollow))
            .route("/logout", post(logout))
            .route("/metrics", get(metrics_handler))
            .layer(cors_layer())
            .with_state(state)
    }

    /// Run the server on the given address
    pub async fn run(self, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| RefollowError::Startup(format!("Failed to bind {}: {}", addr, e)))?;

        tracing::info!(
            addr = addr,
            cache_ttl_secs = self.state.service.cache_ttl().as_secs(),
            required_creators = self.state.service.requirement().creators().len(),
            secure_cookies = self.state.secure_cookies,
            "Refollow server listening"
        );

        axum::serve(listener, Self::build_router(self.state))
            .await
            .map_err(RefollowError::Io)
    }

    /// Get a reference to the service (for testing)
    pub fn service(&self) -> &RefollowService {
        &self.state.service
    }
}

/// Any origin, credentials allowed
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}

/// Freshness cookie carrying `timestamp_ms`, living as long as a cache entry
pub fn freshness_cookie(timestamp_ms: i64, ttl: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((CACHE_COOKIE, timestamp_ms.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::None)
        .secure(secure)
        .max_age(time::Duration::seconds(
            i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
        ))
        .build()
}

// ============================================================================
// Request/Response types
// ============================================================================

/// Query parameters for `/refollow`
#[derive(Debug, Default, Deserialize)]
pub struct RefollowParams {
    pub fid: Option<String>,
    pub refresh: Option<String>,
}

impl RefollowParams {
    /// Only the literal `true` forces a refresh
    pub fn force_refresh(&self) -> bool {
        self.refresh.as_deref() == Some("true")
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for RefollowError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let outcome = match &self {
            RefollowError::Validation(msg) => {
                tracing::debug!(error = %msg, "Rejected refollow request");
                "invalid"
            }
            RefollowError::GateDenied { required, .. } => {
                tracing::info!(required = ?required, "Gate denied refollow request");
                "denied"
            }
            other => {
                tracing::error!(error = %other, "Refollow request failed");
                "error"
            }
        };
        metrics::record_request(outcome);

        (
            status,
            Json(ErrorResponse {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}

fn parse_fid(raw: Option<&str>) -> Result<Fid> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| RefollowError::Validation("Missing fid".to_string()))?;
    raw.parse()
        .map_err(|_| RefollowError::Validation(format!("Invalid fid: {}", raw)))
}

// ============================================================================
// Handlers
// ============================================================================

async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

async fn get_refollow(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RefollowParams>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<AggregatedResult>)> {
    let fid = parse_fid(params.fid.as_deref())?;

    let freshness = FreshnessRequest {
        force_refresh: params.force_refresh(),
        has_prior_fetch: cookie_marks_prior_fetch(jar.get(CACHE_COOKIE).map(|c| c.value())),
    };

    let outcome = state.service.refollow(fid, freshness).await?;

    let jar = if outcome.from_cache {
        jar
    } else {
        jar.add(freshness_cookie(
            chrono::Utc::now().timestamp_millis(),
            state.service.cache_ttl(),
            state.secure_cookies,
        ))
    };

    metrics::record_request("ok");
    Ok((jar, Json(outcome.result)))
}

async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    // Sent unconditionally, whether or not the request carried the cookie
    let expired = Cookie::build((CACHE_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::None)
        .secure(state.secure_cookies)
        .max_age(time::Duration::ZERO);

    (jar.add(expired), Json(serde_json::json!({ "ok": true })))
}

async fn metrics_handler() -> Result<String> {
    metrics::encode_metrics()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::gate::CreatorRequirement;
    use crate::graph::{Direction, Profile};
    use crate::upstream::{FollowPage, GraphProvider};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    /// Provider that must never be reached
    struct UnreachableProvider;

    #[async_trait]
    impl GraphProvider for UnreachableProvider {
        async fn lookup_username(&self, _username: &str) -> Result<Option<Fid>> {
            panic!("upstream must not be called");
        }

        async fn follow_page(
            &self,
            _direction: Direction,
            _subject: Fid,
            _cursor: Option<&str>,
            _limit: u32,
        ) -> Result<FollowPage> {
            panic!("upstream must not be called");
        }

        async fn bulk_profiles(&self, _fids: &[Fid]) -> Result<Vec<Profile>> {
            panic!("upstream must not be called");
        }
    }

    fn create_test_server(secure: bool) -> RefollowServer {
        let service = RefollowService::new(
            Arc::new(UnreachableProvider),
            CacheConfig::default(),
            CreatorRequirement::empty(),
        );
        RefollowServer::new(service, secure)
    }

    #[tokio::test]
    async fn test_liveness_endpoint() {
        let app = create_test_server(false).router();

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], LIVENESS_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_missing_fid_is_bad_request() {
        for uri in ["/refollow", "/refollow?fid=", "/refollow?refresh=true"] {
            let app = create_test_server(false).router();
            let response = app
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri {}", uri);
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
            assert!(!error.error.is_empty());
        }
    }

    #[tokio::test]
    async fn test_non_numeric_fid_is_bad_request() {
        let app = create_test_server(false).router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/refollow?fid=alice")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let app = create_test_server(true).router();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/logout")
                    .header(header::COOKIE, format!("{}=1700000000000", CACHE_COOKIE))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("removal cookie")
            .to_str()
            .unwrap()
            .to_string();
        assert!(set_cookie.starts_with(&format!("{}=", CACHE_COOKIE)));
        assert!(set_cookie.contains("Max-Age=0"));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_logout_without_cookie_still_expires_it() {
        let app = create_test_server(false).router();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/logout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("expired cookie")
            .to_str()
            .unwrap()
            .to_string();
        assert!(set_cookie.starts_with(&format!("{}=;", CACHE_COOKIE)));
        assert!(set_cookie.contains("Max-Age=0"));
        assert!(set_cookie.contains("Path=/"));
    }

    #[tokio::test]
    async fn test_cors_allows_credentials() {
        let app = create_test_server(false).router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::ORIGIN, "https://frontend.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://frontend.example"
        );
        assert_eq!(
            headers
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .unwrap(),
            "true"
        );
    }

    #[test]
    fn test_freshness_cookie_attributes() {
        let cookie = freshness_cookie(1_700_000_000_000, Duration::from_secs(300), true);
        assert_eq!(cookie.name(), CACHE_COOKIE);
        assert_eq!(cookie.value(), "1700000000000");
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(300)));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_freshness_cookie_huge_ttl_saturates() {
        let cookie = freshness_cookie(1, Duration::from_secs(u64::MAX), false);
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(i64::MAX)));
    }

    #[test]
    fn test_force_refresh_only_on_true() {
        let params = |r: Option<&str>| RefollowParams {
            fid: Some("1".to_string()),
            refresh: r.map(str::to_string),
        };
        assert!(params(Some("true")).force_refresh());
        assert!(!params(Some("1")).force_refresh());
        assert!(!params(None).force_refresh());
    }
}
