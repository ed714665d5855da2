pub mod auth;
pub mod validate;

use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Method;

use crate::config::{Config, Env};

const PROD_API_BASE: &str = "https://api.hubapi.com";
const QA_API_BASE: &str = "https://api.hubapiqa.com";

/// Credentials attached to a request.
#[derive(Debug, Clone)]
pub enum Auth {
    None,
    ApiKey(String),
    Bearer(String),
}

pub struct ApiClient {
    pub base_url: String,
    pub http_client: Client,
}

impl ApiClient {
    pub fn new(config: &Config, env: Env) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.http_timeout())
            .user_agent(concat!("cms-lint/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url(config, env),
            http_client,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn request(&self, method: Method, path: &str, auth: &Auth) -> RequestBuilder {
        let url = self.url(path);
        tracing::debug!(%method, %url, "api request");
        let request = self.http_client.request(method, url);
        match auth {
            Auth::None => request,
            Auth::ApiKey(key) => request.query(&[("hapikey", key)]),
            Auth::Bearer(token) => request.bearer_auth(token),
        }
    }
}

/// API origin for `env`, unless the config overrides it.
pub fn base_url(config: &Config, env: Env) -> String {
    if let Some(url) = &config.api_base_url {
        return url.clone();
    }
    match env {
        Env::Prod => PROD_API_BASE.to_string(),
        Env::Qa => QA_API_BASE.to_string(),
    }
}
