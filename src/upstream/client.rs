//! HTTP client for the Neynar social-graph API

use super::{shapes, FollowPage, GraphProvider};
use crate::config::RefollowConfig;
use crate::graph::{Direction, Fid, Profile};
use crate::{metrics, RefollowError, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Header carrying the service credential
const API_KEY_HEADER: &str = "x-api-key";

const USER_BY_USERNAME_PATH: &str = "/v2/farcaster/user/by_username";
const FOLLOWING_PATH: &str = "/v2/farcaster/following";
const FOLLOWERS_PATH: &str = "/v2/farcaster/followers";
const USER_BULK_PATH: &str = "/v2/farcaster/user/bulk";

/// Authenticated client for the upstream provider
///
/// Every request carries the API key. Non-2xx responses are logged with
/// their body and surface as [`RefollowError::Upstream`]. Nothing is retried.
#[derive(Debug, Clone)]
pub struct NeynarClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl NeynarClient {
    /// Create a client against `base_url` using `api_key`
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .default_headers({
                let mut headers = header::HeaderMap::new();
                headers.insert(
                    header::USER_AGENT,
                    header::HeaderValue::from_static("refollow/0.1"),
                );
                headers.insert(
                    header::ACCEPT,
                    header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()?;

        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Create a client from the loaded configuration
    ///
    /// Fails with a startup error when no API key is configured.
    pub fn from_config(config: &RefollowConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        Self::new(
            config.upstream.base_url.clone(),
            api_key,
            Duration::from_secs(config.upstream.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a GET against `path` with `query` and decode the JSON body
    pub async fn call<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        debug!(path = %path, params = query.len(), "Calling upstream");
        metrics::record_upstream_call(path);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await
            .inspect_err(|e| {
                warn!(path = %path, error = %e, "Upstream request failed");
                metrics::record_upstream_error(path);
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                path = %path,
                status = status.as_u16(),
                body = %body,
                "Upstream returned non-success status"
            );
            metrics::record_upstream_error(path);
            return Err(RefollowError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl GraphProvider for NeynarClient {
    async fn lookup_username(&self, username: &str) -> Result<Option<Fid>> {
        let query = [("username", username.to_string())];
        match self
            .call::<shapes::UserResponse>(USER_BY_USERNAME_PATH, &query)
            .await
        {
            Ok(body) => Ok(shapes::username_fid(body)),
            Err(RefollowError::Upstream { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn follow_page(
        &self,
        direction: Direction,
        subject: Fid,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<FollowPage> {
        let path = match direction {
            Direction::Following => FOLLOWING_PATH,
            Direction::Followers => FOLLOWERS_PATH,
        };

        let mut query = vec![("fid", subject.to_string()), ("limit", limit.to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }

        let body: shapes::UsersResponse = self.call(path, &query).await?;
        Ok(shapes::follow_page(body))
    }

    async fn bulk_profiles(&self, fids: &[Fid]) -> Result<Vec<Profile>> {
        let joined = fids
            .iter()
            .map(Fid::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let body: shapes::UsersResponse =
            self.call(USER_BULK_PATH, &[("fids", joined)]).await?;
        Ok(shapes::profiles(body))
    }
}
