//! Credential selection for outbound Google API requests.

use std::fmt;
use std::sync::Arc;

use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::RequestBuilder;
use tracing::{debug, info};

use crate::error::{AuthError, AuthResult};
use crate::token_cache::TokenCache;

/// Environment variable holding a pre-issued OAuth access token.
const STATIC_TOKEN_VAR: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// How requests to a Google API are authorized.
#[derive(Clone)]
pub enum Credentials {
    /// No credentials (emulators, local mocks).
    Anonymous,
    /// API key passed as the `key` query parameter.
    ApiKey(String),
    /// Fixed bearer token, never refreshed.
    StaticToken(String),
    /// OAuth token from a service account or the metadata server.
    OAuth(Arc<TokenCache>),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Anonymous => f.write_str("Anonymous"),
            Credentials::ApiKey(_) => f.write_str("ApiKey(***)"),
            Credentials::StaticToken(_) => f.write_str("StaticToken(***)"),
            Credentials::OAuth(cache) => write!(f, "OAuth({})", cache.scope()),
        }
    }
}

impl Credentials {
    /// Resolve credentials from the environment.
    ///
    /// Order: the API key variable named by `api_key_var` (if given and
    /// non-empty), then `GOOGLE_OAUTH_ACCESS_TOKEN`, then service account /
    /// application default credentials for `scope`.
    pub async fn from_env(api_key_var: Option<&str>, scope: &'static str) -> AuthResult<Self> {
        if let Some(var) = api_key_var {
            if let Some(key) = non_empty_var(var) {
                debug!("Using API key from {}", var);
                return Ok(Credentials::ApiKey(key));
            }
        }

        if let Some(token) = non_empty_var(STATIC_TOKEN_VAR) {
            debug!("Using static access token from {}", STATIC_TOKEN_VAR);
            return Ok(Credentials::StaticToken(token));
        }

        let provider = create_token_provider().await?;
        Ok(Credentials::OAuth(Arc::new(TokenCache::new(provider, scope))))
    }

    /// Attach credentials to a request.
    pub async fn authorize(&self, request: RequestBuilder) -> AuthResult<RequestBuilder> {
        match self {
            Credentials::Anonymous => Ok(request),
            Credentials::ApiKey(key) => Ok(request.query(&[("key", key.as_str())])),
            Credentials::StaticToken(token) => Ok(request.bearer_auth(token)),
            Credentials::OAuth(cache) => {
                let token = cache.get_token().await?;
                Ok(request.bearer_auth(token))
            }
        }
    }

    /// True if a rejected token can be replaced by a fresh one.
    pub fn can_refresh(&self) -> bool {
        matches!(self, Credentials::OAuth(_))
    }

    /// Drop any cached token so the next request fetches a new one.
    pub async fn invalidate(&self) {
        if let Credentials::OAuth(cache) = self {
            cache.invalidate().await;
        }
    }
}

/// Service account from `GOOGLE_APPLICATION_CREDENTIALS`, falling back to
/// the default provider chain (metadata server, gcloud).
pub async fn create_token_provider() -> AuthResult<Arc<dyn TokenProvider>> {
    let service_account = CustomServiceAccount::from_env().map_err(|e| {
        AuthError::not_configured(format!("Failed to load service account: {}", e))
    })?;

    if let Some(sa) = service_account {
        info!("Using service account from GOOGLE_APPLICATION_CREDENTIALS");
        return Ok(Arc::new(sa));
    }

    gcp_auth::provider().await.map_err(|e| {
        AuthError::not_configured(format!(
            "No Google credentials found. Set GOOGLE_APPLICATION_CREDENTIALS \
             or run on a host with a metadata server: {}",
            e
        ))
    })
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_debug_hides_secrets() {
        let creds = Credentials::ApiKey("super-secret".to_string());
        assert_eq!(format!("{:?}", creds), "ApiKey(***)");

        let creds = Credentials::StaticToken("ya29.secret".to_string());
        assert!(!format!("{:?}", creds).contains("ya29"));
    }

    #[tokio::test]
    async fn test_api_key_is_added_as_query_param() {
        let client = reqwest::Client::new();
        let creds = Credentials::ApiKey("abc123".to_string());
        let request = creds
            .authorize(client.get("http://localhost/v1/images:annotate"))
            .await
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.url().query(), Some("key=abc123"));
    }

    #[tokio::test]
    async fn test_static_token_sets_bearer_header() {
        let client = reqwest::Client::new();
        let creds = Credentials::StaticToken("tok".to_string());
        let request = creds
            .authorize(client.get("http://localhost/"))
            .await
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer tok"
        );
        assert!(!creds.can_refresh());
    }

    #[tokio::test]
    #[serial]
    async fn test_from_env_prefers_api_key() {
        std::env::set_var("VLAB_TEST_API_KEY", "key-from-env");
        let creds = Credentials::from_env(Some("VLAB_TEST_API_KEY"), crate::VISION_SCOPE)
            .await
            .unwrap();
        assert!(matches!(creds, Credentials::ApiKey(ref k) if k == "key-from-env"));
        std::env::remove_var("VLAB_TEST_API_KEY");
    }

    #[tokio::test]
    #[serial]
    async fn test_from_env_static_token() {
        std::env::remove_var("VLAB_TEST_API_KEY");
        std::env::set_var(STATIC_TOKEN_VAR, "static");
        let creds = Credentials::from_env(Some("VLAB_TEST_API_KEY"), crate::STORAGE_SCOPE)
            .await
            .unwrap();
        assert!(matches!(creds, Credentials::StaticToken(_)));
        std::env::remove_var(STATIC_TOKEN_VAR);
    }
}
