use crate::error::ClientError;
use crate::request::RequestBuilder;
use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use tether_core::config::AdminApiConfig;
use tracing::debug;

/// Handle on the gateway Admin API.
///
/// Cheap to clone; every request starts from the configured base URL.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: reqwest::Client,
    base: Url,
}

impl AdminClient {
    /// Build a client from config: base URL, admin token header, extra
    /// headers and the optional transport timeout.
    pub fn new(config: &AdminApiConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            insert_header(&mut headers, &config.api_key_header, key)?;
        }
        for (name, value) in &config.headers {
            insert_header(&mut headers, name, value)?;
        }

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("tether/", env!("CARGO_PKG_VERSION")));
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }

        let client = Self::with_http(builder.build()?, &config.url)?;
        debug!(base = %client.base, "Admin API client ready");
        Ok(client)
    }

    /// Wrap an already configured `reqwest::Client`.
    pub fn with_http(http: reqwest::Client, base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http,
            base: normalize_base(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Start a new request rooted at the base URL.
    pub fn request(&self) -> RequestBuilder {
        RequestBuilder::new(self.http.clone(), self.base.clone())
    }
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> Result<(), ClientError> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ClientError::Header(name.to_string()))?;
    let mut value =
        HeaderValue::from_str(value).map_err(|_| ClientError::Header(name.to_string()))?;
    value.set_sensitive(true);
    headers.insert(name, value);
    Ok(())
}

/// Parse the base URL and make sure its path ends in `/`.
fn normalize_base(raw: &str) -> Result<Url, ClientError> {
    let invalid = |reason: &str| ClientError::Url {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let mut url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("not a base URL"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
