use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::auth::session::Session;
use crate::error::{ClientError, ClientResult};

/// Thin wrapper over `reqwest` that attaches the session's bearer token.
///
/// The token is attached whenever present and never checked for freshness.
/// Calls without a token go out unauthenticated. Non-2xx responses come back
/// as `ClientError::Status` with the response body, untouched.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: reqwest::Client,
    base_url: Url,
}

impl Gateway {
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pixelhub/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        // Trailing slash so relative joins keep any path prefix.
        let mut base = base_url.trim_end_matches('/').to_string();
        base.push('/');

        Ok(Self {
            client,
            base_url: Url::parse(&base)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, session: &Session, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = self.url(path)?;
        tracing::debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        Ok(match &session.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> ClientResult<T> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    pub async fn get<T: DeserializeOwned>(&self, session: &Session, path: &str) -> ClientResult<T> {
        Self::send(self.request(session, Method::GET, path)?).await
    }

    pub async fn post<B, T>(&self, session: &Session, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        Self::send(self.request(session, Method::POST, path)?.json(body)).await
    }

    pub async fn put<B, T>(&self, session: &Session, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        Self::send(self.request(session, Method::PUT, path)?.json(body)).await
    }
}
