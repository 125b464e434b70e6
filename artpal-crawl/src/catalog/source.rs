//! Page retrieval behind the catalog sampler

use crate::error::NavigationError;
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

/// Retrieves the HTML of one catalog page
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_html(&self, url: &Url) -> Result<String, NavigationError>;
}

/// HTTP page source; the catalog serves its listings as static markup
pub struct HttpPageSource {
    client: Client,
    require_https: bool,
}

impl HttpPageSource {
    pub fn new(user_agent: &str, require_https: bool) -> Result<Self, NavigationError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(NavigationError::Client)?;

        Ok(Self {
            client,
            require_https,
        })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_html(&self, url: &Url) -> Result<String, NavigationError> {
        if self.require_https && url.scheme() != "https" {
            return Err(NavigationError::InvalidUrl {
                url: url.to_string(),
                reason: "https required".to_string(),
            });
        }

        debug!(url = %url, "Fetching catalog page");

        let request_error = |source| NavigationError::Request {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(NavigationError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(request_error)
    }
}
