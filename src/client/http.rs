//! HTTP transport for [`UserLookup`](super::UserLookup).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use crate::client::{LookupError, UserLookup};
use crate::config::UserServiceConfig;
use crate::domain::{UserId, UserInfo};

/// Errors building the client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid user service URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Calls the user subsystem's REST API.
#[derive(Clone)]
pub struct HttpUserClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUserClient {
    pub fn new(config: &UserServiceConfig) -> Result<Self, ClientError> {
        Url::parse(&config.base_url).map_err(|source| ClientError::InvalidBaseUrl {
            url: config.base_url.clone(),
            source,
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn user_url(&self, id: UserId) -> String {
        format!("{}/api/users/{}", self.base_url, id)
    }
}

#[async_trait]
impl UserLookup for HttpUserClient {
    async fn fetch_user(&self, id: UserId) -> Result<UserInfo, LookupError> {
        let url = self.user_url(id);
        tracing::debug!(user_id = id, url = %url, "Fetching user");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::OK => response
                .json::<UserInfo>()
                .await
                .map_err(|e| LookupError::Unavailable(format!("invalid user payload: {e}"))),
            StatusCode::NOT_FOUND => Err(LookupError::NotFound(id)),
            status => Err(LookupError::Unavailable(format!("user service returned {status}"))),
        }
    }
}

impl std::fmt::Debug for HttpUserClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpUserClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_url_trims_slash() {
        let client = HttpUserClient::new(&UserServiceConfig {
            base_url: "http://users.internal:8081/".to_string(),
            request_timeout_ms: 1000,
        })
        .unwrap();
        assert_eq!(client.user_url(7), "http://users.internal:8081/api/users/7");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpUserClient::new(&UserServiceConfig {
            base_url: "not a url".to_string(),
            request_timeout_ms: 1000,
        })
        .unwrap_err();
        assert!(err.to_string().contains("not a url"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpUserClient::new(&UserServiceConfig {
            base_url: format!("http://{addr}"),
            request_timeout_ms: 1000,
        })
        .unwrap();

        let err = client.fetch_user(1).await.unwrap_err();
        assert!(matches!(err, LookupError::Unavailable(_)));
    }
}
