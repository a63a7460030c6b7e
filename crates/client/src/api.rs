//! Out-of-core collaborators: capability check, token verification,
//! album listing.
//!
//! These are plain request/response operations with no internal state
//! machine. A failed capability check is fatal to the whole page: the
//! caller surfaces it and never constructs the engine.

use reqwest::RequestBuilder;
use uplift_protocol::{
    Album, AlbumsResponse, CheckResponse, TokenVerifyRequest, TokenVerifyResponse,
};

use crate::error::ClientError;

/// Client for the upload service's auxiliary API endpoints.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Creates a client for the service at `base_url`.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_client(http, base_url, token))
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &str, token: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Attaches the `token` header when a token is present.
    fn with_token(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.header("token", token),
            None => builder,
        }
    }

    /// Fetches server capabilities (`GET api/check`).
    pub async fn check(&self) -> Result<CheckResponse, ClientError> {
        let url = format!("{}/api/check", self.base_url);
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }

    /// Verifies a token (`POST api/tokens/verify`).
    ///
    /// A rejected token is reported in the response body
    /// (`success: false`), not as an `Err`.
    pub async fn verify_token(&self, token: &str) -> Result<TokenVerifyResponse, ClientError> {
        let url = format!("{}/api/tokens/verify", self.base_url);
        let body = TokenVerifyRequest {
            token: token.to_string(),
        };
        let resp = self.http.post(&url).json(&body).send().await?;
        Ok(resp.json().await?)
    }

    /// Lists the user's albums (`GET api/albums`).
    pub async fn albums(&self) -> Result<Vec<Album>, ClientError> {
        let url = format!("{}/api/albums", self.base_url);
        let resp = self.with_token(self.http.get(&url)).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        let parsed: AlbumsResponse = resp.json().await?;
        Ok(parsed.albums)
    }
}
