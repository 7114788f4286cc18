//! Community directory API client.

use super::error::DirectoryError;
use super::parse_terminals;
use super::types::TerminalDto;

/// Configuration for the directory client.
#[derive(Debug, Clone)]
pub struct DirectoryClientConfig {
    /// Base URL for the API; the directory lives at `{base_url}/directory/`
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl DirectoryClientConfig {
    /// Create a new config for the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 30,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Client for the directory API.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    http: reqwest::Client,
    base_url: String,
}

impl DirectoryClient {
    /// Create a new directory client.
    pub fn new(config: DirectoryClientConfig) -> Result<Self, DirectoryError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL the directory is fetched from.
    pub fn url(&self) -> String {
        format!("{}/directory/", self.base_url)
    }

    /// Fetch the whole directory.
    pub async fn fetch_all(&self) -> Result<Vec<TerminalDto>, DirectoryError> {
        let response = self.http.get(self.url()).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        parse_terminals(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = DirectoryClientConfig::new("https://example.org/api");
        assert_eq!(config.base_url, "https://example.org/api");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.with_timeout(5).timeout_secs, 5);
    }

    #[test]
    fn url_ignores_trailing_slash() {
        let client = DirectoryClient::new(DirectoryClientConfig::new("https://example.org/api/"))
            .unwrap();
        assert_eq!(client.url(), "https://example.org/api/directory/");
    }
}
