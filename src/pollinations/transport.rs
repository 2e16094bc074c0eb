use crate::error::{ArtGenError, Result};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Url};

/// A single outbound GET.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub url: Url,
    pub bearer: Option<String>,
    pub user_agent: String,
}

impl UpstreamRequest {
    pub fn new(url: Url, user_agent: impl Into<String>) -> Self {
        Self {
            url,
            bearer: None,
            user_agent: user_agent.into(),
        }
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

/// Status line and final location of a response, after redirects.
#[derive(Debug, Clone)]
pub struct UpstreamHead {
    pub status: u16,
    pub final_url: String,
    pub content_type: Option<String>,
}

impl UpstreamHead {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub head: UpstreamHead,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and reports where it ended up, leaving the body unread.
    async fn resolve(&self, request: UpstreamRequest) -> Result<UpstreamHead>;

    /// Sends the request and reads the whole body.
    async fn fetch(&self, request: UpstreamRequest) -> Result<UpstreamResponse>;
}

/// `reqwest`-backed transport. Redirects are followed with reqwest's
/// default policy.
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn send(&self, request: UpstreamRequest) -> Result<reqwest::Response> {
        let mut builder = self
            .client
            .get(request.url)
            .header(USER_AGENT, request.user_agent);
        if let Some(token) = request.bearer {
            builder = builder.bearer_auth(token);
        }

        builder
            .send()
            .await
            .map_err(|e| ArtGenError::RequestError(format!("Pollinations request failed: {}", e)))
    }

    fn head_of(response: &reqwest::Response) -> UpstreamHead {
        UpstreamHead {
            status: response.status().as_u16(),
            final_url: response.url().to_string(),
            content_type: response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(String::from),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn resolve(&self, request: UpstreamRequest) -> Result<UpstreamHead> {
        let response = self.send(request).await?;
        Ok(Self::head_of(&response))
    }

    async fn fetch(&self, request: UpstreamRequest) -> Result<UpstreamResponse> {
        let response = self.send(request).await?;
        let head = Self::head_of(&response);
        let body = response
            .bytes()
            .await
            .map_err(|e| ArtGenError::ResponseError(e.to_string()))?;

        Ok(UpstreamResponse {
            head,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Answers every request with the same canned response and records
    /// what it was asked.
    #[derive(Clone)]
    pub struct FakeTransport {
        response: Option<UpstreamResponse>,
        calls: Arc<Mutex<Vec<UpstreamRequest>>>,
    }

    impl FakeTransport {
        pub fn responding(status: u16, final_url: &str) -> Self {
            Self {
                response: Some(UpstreamResponse {
                    head: UpstreamHead {
                        status,
                        final_url: final_url.to_string(),
                        content_type: None,
                    },
                    body: Vec::new(),
                }),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn with_body(mut self, content_type: &str, body: &[u8]) -> Self {
            if let Some(response) = self.response.as_mut() {
                response.head.content_type = Some(content_type.to_string());
                response.body = body.to_vec();
            }
            self
        }

        /// Fails every request at the transport level.
        pub fn unreachable() -> Self {
            Self {
                response: None,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn calls(&self) -> Vec<UpstreamRequest> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, request: UpstreamRequest) -> Result<UpstreamResponse> {
            self.calls.lock().unwrap().push(request);
            self.response
                .clone()
                .ok_or_else(|| ArtGenError::RequestError("connection refused".into()))
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn resolve(&self, request: UpstreamRequest) -> Result<UpstreamHead> {
            self.record(request).map(|r| r.head)
        }

        async fn fetch(&self, request: UpstreamRequest) -> Result<UpstreamResponse> {
            self.record(request)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range() {
        let head = |status| UpstreamHead {
            status,
            final_url: String::new(),
            content_type: None,
        };
        assert!(head(200).is_success());
        assert!(head(204).is_success());
        assert!(!head(302).is_success());
        assert!(!head(503).is_success());
    }
}
