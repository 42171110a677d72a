use crate::error::ClientError;
use http::{Method, StatusCode};
use reqwest::Url;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Body attached to an Admin API request.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Serialized as `application/json`.
    Json(Value),
    /// Serialized as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
}

impl RequestBody {
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(RequestBody::Json(serde_json::to_value(value)?))
    }

    pub fn form<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        RequestBody::Form(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Json(_) => Some("application/json"),
            RequestBody::Form(_) => Some("application/x-www-form-urlencoded"),
        }
    }
}

/// Status plus the decoded body of a successful response.
#[derive(Debug)]
pub struct Response<T> {
    pub status: StatusCode,
    pub body: Option<T>,
}

/// Fluent request builder.
///
/// `path("plugins/")` appends slash-separated segments; a trailing `/`
/// is kept only until the next segment is appended. `segment(id)` appends
/// one literal segment, percent-encoded.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    http: reqwest::Client,
    base: Url,
    segments: Vec<String>,
    method: Method,
    body: RequestBody,
}

impl RequestBuilder {
    pub(crate) fn new(http: reqwest::Client, base: Url) -> Self {
        Self {
            http,
            base,
            segments: Vec::new(),
            method: Method::GET,
            body: RequestBody::Empty,
        }
    }

    pub fn path(mut self, path: &str) -> Self {
        if self.segments.last().is_some_and(String::is_empty) {
            self.segments.pop();
        }
        self.segments.extend(
            path.trim_start_matches('/')
                .split('/')
                .map(str::to_string),
        );
        self
    }

    pub fn segment(mut self, segment: &str) -> Self {
        if self.segments.last().is_some_and(String::is_empty) {
            self.segments.pop();
        }
        self.segments.push(segment.to_string());
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn get(self, path: &str) -> Self {
        self.method(Method::GET).path(path)
    }

    pub fn post(self, path: &str) -> Self {
        self.method(Method::POST).path(path)
    }

    pub fn patch(self, path: &str) -> Self {
        self.method(Method::PATCH).path(path)
    }

    pub fn delete(self, path: &str) -> Self {
        self.method(Method::DELETE).path(path)
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn current_method(&self) -> &Method {
        &self.method
    }

    pub fn current_body(&self) -> &RequestBody {
        &self.body
    }

    /// Compose the full request URL.
    pub fn url(&self) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Url {
                url: self.base.to_string(),
                reason: "not a base URL".into(),
            })?
            .pop_if_empty()
            .extend(&self.segments);
        Ok(url)
    }

    /// Send the request and decode a 2xx body into `T`.
    ///
    /// Non-2xx responses are not errors here; callers branch on `status`.
    pub async fn receive<T: DeserializeOwned>(self) -> Result<Response<T>, ClientError> {
        let (status, bytes) = self.execute().await?;
        let body = if status.is_success() && !bytes.is_empty() {
            Some(serde_json::from_slice(&bytes).map_err(ClientError::Decode)?)
        } else {
            None
        };
        Ok(Response { status, body })
    }

    /// Send the request, discarding the body.
    pub async fn send(self) -> Result<StatusCode, ClientError> {
        let (status, _) = self.execute().await?;
        Ok(status)
    }

    async fn execute(self) -> Result<(StatusCode, Vec<u8>), ClientError> {
        let url = self.url()?;
        debug!(method = %self.method, url = %url, "Admin API request");

        let request = self.http.request(self.method, url);
        let request = match &self.body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(value),
            RequestBody::Form(pairs) => request.form(pairs),
        };

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(status = status.as_u16(), len = bytes.len(), "Admin API response");
        Ok((status, bytes.to_vec()))
    }
}
