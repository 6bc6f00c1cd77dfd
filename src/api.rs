// API client module: contains a small blocking HTTP client that talks to
// the XPrivacyLua REST API. Every call is a single synchronous round trip;
// there is no retry, paging or caching.

use std::fmt;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Base URL of the REST API when reached through `adb forward tcp:8271 tcp:8271`.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8271/api/v1";

/// Header carrying the API key on every request.
pub const HEADER_API_KEY: &str = "X-API-Key";

/// Errors returned by [`ApiClient`]. The binary prints them and exits non-zero.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("API key is not a valid header value")]
    InvalidApiKey,

    #[error("error making request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned {status}{body}")]
    Status { status: StatusCode, body: ErrorBody },
}

/// Body of a non-2xx response. The server normally answers with
/// `{"status": "error", "code": .., "message": ..}` but anything is accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    Empty,
    Json(Value),
    Text(String),
}

impl ErrorBody {
    fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            return ErrorBody::Empty;
        }
        match serde_json::from_str(&text) {
            Ok(json) => ErrorBody::Json(json),
            Err(_) => ErrorBody::Text(text),
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorBody::Empty => Ok(()),
            ErrorBody::Json(json) => {
                let pretty = serde_json::to_string_pretty(json).map_err(|_| fmt::Error)?;
                write!(f, "\nAPI error: {pretty}")
            }
            ErrorBody::Text(text) => write!(f, "\nResponse: {text}"),
        }
    }
}

/// Body of `PUT /apps/{pkg}/restrictions/{id}`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct RestrictionUpdate {
    pub enabled: bool,
}

/// Fake location for an app. Only latitude and longitude are required;
/// unset fields are left out of the JSON body and the server fills in
/// `time` with the current time when it is missing.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing: Option<f64>,
    /// Fix time in milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Location {
            latitude,
            longitude,
            ..Default::default()
        }
    }
}

/// Simple API client that holds a reqwest blocking client (with the API key
/// installed as a default header) and the base URL of the REST API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for `base_url` authenticating with `api_key`.
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, ApiError> {
        let base_url = parse_base_url(base_url)?;

        let mut key = HeaderValue::from_str(api_key).map_err(|_| ApiError::InvalidApiKey)?;
        key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_API_KEY, key);

        let client = Client::builder().default_headers(headers).build()?;
        Ok(ApiClient { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /restrictions`: all restriction groups known to the server.
    pub fn get_restrictions(&self) -> Result<Value, ApiError> {
        self.send(self.request(Method::GET, &["restrictions"])?)
    }

    /// `GET /apps`: installed apps with their restriction status.
    pub fn get_apps(&self) -> Result<Value, ApiError> {
        self.send(self.request(Method::GET, &["apps"])?)
    }

    pub fn get_app(&self, package_name: &str) -> Result<Value, ApiError> {
        self.send(self.request(Method::GET, &["apps", package_name])?)
    }

    pub fn get_app_restrictions(&self, package_name: &str) -> Result<Value, ApiError> {
        self.send(self.request(Method::GET, &["apps", package_name, "restrictions"])?)
    }

    /// Enable or disable one restriction for an app.
    pub fn set_app_restriction(
        &self,
        package_name: &str,
        restriction_id: &str,
        enabled: bool,
    ) -> Result<Value, ApiError> {
        let request = self.request(
            Method::PUT,
            &["apps", package_name, "restrictions", restriction_id],
        )?;
        self.send(request.json(&RestrictionUpdate { enabled }))
    }

    pub fn get_location(&self, package_name: &str) -> Result<Value, ApiError> {
        self.send(self.request(Method::GET, &["apps", package_name, "location"])?)
    }

    /// Set the fake location reported to an app.
    pub fn set_location(&self, package_name: &str, location: &Location) -> Result<Value, ApiError> {
        let request = self.request(Method::PUT, &["apps", package_name, "location"])?;
        self.send(request.json(location))
    }

    /// Drop the fake location so the app sees the real one again.
    pub fn reset_location(&self, package_name: &str) -> Result<Value, ApiError> {
        self.send(self.request(Method::DELETE, &["apps", package_name, "location"])?)
    }

    /// Append `segments` to the base URL. Each segment is percent-encoded,
    /// so identifiers cannot introduce extra path components.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Builds a bodiless request; callers that need a payload attach it.
    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "sending request");
        Ok(self.client.request(method, url))
    }

    fn send(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send()?;
        let status = response.status();
        debug!(%status, "received response");

        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(ApiError::Status {
                status,
                body: ErrorBody::from_text(text),
            });
        }
        Ok(response.json()?)
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, ApiError> {
    let url = Url::parse(base_url).map_err(|e| ApiError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
    }
    Ok(url)
}
