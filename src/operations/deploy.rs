//! Application package registration
//!
//! Sends a filled application package to an OGC API - Processes endpoint.
//! Registration is a single synchronous request; the only follow-up is the
//! opt-in replacement of an already registered process.

use crate::error::{AppPackError, Result};
use crate::package::AppPackageDocument;
use reqwest::blocking::{Client, Response};
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default bound on the registration request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the authentication token
pub const AUTH_HEADER: &str = "proxy-ticket";

/// What the registry did with the package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeployAction {
    /// New process created by the POST
    Registered,
    /// Existing process overwritten by the PUT that follows a conflict
    Replaced,
}

/// Successful registration response
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct DeployOutcome {
    pub status: u16,
    pub body: String,
    pub action: DeployAction,
}

/// Blocking client for an application package registration endpoint
#[derive(Debug, Clone)]
pub struct DeployClient {
    http: Client,
    endpoint: Url,
    token: Option<String>,
    allow_anonymous: bool,
    replace_existing: bool,
}

impl DeployClient {
    /// Build a client for `endpoint` with a request timeout
    ///
    /// # Errors
    ///
    /// Returns a deploy error if the endpoint is not an absolute URL or the
    /// HTTP client cannot be built
    #[inline]
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint.trim()).map_err(|e| {
            AppPackError::network(format!("Invalid registration endpoint '{endpoint}': {e}"))
        })?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppPackError::network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            token: None,
            allow_anonymous: false,
            replace_existing: false,
        })
    }

    /// Send `token` in the authentication header; a blank token counts as none
    #[must_use]
    #[inline]
    pub fn with_token<S: Into<String>>(mut self, token: S) -> Self {
        let token = token.into();
        self.token = (!token.trim().is_empty()).then_some(token);
        self
    }

    /// Send the request even when no token is configured
    #[must_use]
    #[inline]
    pub const fn with_allow_anonymous(mut self, allow_anonymous: bool) -> Self {
        self.allow_anonymous = allow_anonymous;
        self
    }

    /// On HTTP 409, overwrite the existing process with a PUT
    #[must_use]
    #[inline]
    pub const fn with_replace_existing(mut self, replace_existing: bool) -> Self {
        self.replace_existing = replace_existing;
        self
    }

    /// Register `package` with the endpoint
    ///
    /// # Errors
    ///
    /// Returns a deploy error:
    /// - Before any request, when no token is set and anonymous access is not allowed
    /// - Carrying the status code and response body for any non-2xx response
    /// - With the failure message for network errors
    #[inline]
    pub fn deploy(&self, package: &AppPackageDocument) -> Result<DeployOutcome> {
        if self.token.is_none() {
            if !self.allow_anonymous {
                return Err(AppPackError::network(format!(
                    "No authentication token for the '{AUTH_HEADER}' header; \
                    set MAAP_PGT or --token, or pass --allow-anonymous"
                )));
            }
            warn!("Sending the registration request without an authentication token");
        }

        info!("Registering application package with {}", self.endpoint);
        let (status, body) = self.send(Method::POST, self.endpoint.clone(), package)?;

        if status.is_success() {
            info!("Application package registered (HTTP {})", status.as_u16());
            return Ok(DeployOutcome {
                status: status.as_u16(),
                body,
                action: DeployAction::Registered,
            });
        }

        if status == StatusCode::CONFLICT && self.replace_existing {
            return self.replace(package, &body);
        }

        Err(AppPackError::Deploy {
            status: Some(status.as_u16()),
            body,
        })
    }

    fn replace(&self, package: &AppPackageDocument, conflict_body: &str) -> Result<DeployOutcome> {
        let process_id = conflicting_process_id(conflict_body).ok_or_else(|| {
            AppPackError::Deploy {
                status: Some(StatusCode::CONFLICT.as_u16()),
                body: format!(
                    "process already exists and the response does not name it: {conflict_body}"
                ),
            }
        })?;

        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppPackError::network(format!(
                    "Registration endpoint {} cannot have path segments",
                    self.endpoint
                ))
            })?
            .pop_if_empty()
            .push(&process_id);

        info!("Process '{}' already exists; replacing it at {}", process_id, url);
        let (status, body) = self.send(Method::PUT, url, package)?;

        if status.is_success() {
            return Ok(DeployOutcome {
                status: status.as_u16(),
                body,
                action: DeployAction::Replaced,
            });
        }

        Err(AppPackError::Deploy {
            status: Some(status.as_u16()),
            body,
        })
    }

    fn send(
        &self,
        method: Method,
        url: Url,
        package: &AppPackageDocument,
    ) -> Result<(StatusCode, String)> {
        let mut request = self.http.request(method.clone(), url.clone()).json(package);
        if let Some(token) = self.token.as_ref() {
            request = request.header(AUTH_HEADER, token);
        }

        let response: Response = request
            .send()
            .map_err(|e| AppPackError::network(format!("{method} {url} failed: {e}")))?;

        let status = response.status();
        let body = response.text().map_err(|e| {
            AppPackError::network(format!("Failed to read response from {url}: {e}"))
        })?;
        debug!("{} {} -> {}: {}", method, url, status, body);

        Ok((status, body))
    }
}

/// `additionalProperties.processID` of a 409 response body
fn conflicting_process_id(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("additionalProperties")?
        .get("processID")?
        .as_str()
        .map(str::to_owned)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;
    use crate::package::{DEFAULT_APP_PACKAGE_TEMPLATE, PackageMetadata};

    #[test]
    fn process_id_from_conflict_body() {
        let body = r#"{"detail": "exists", "additionalProperties": {"processID": "sample_print"}}"#;
        assert_eq!(conflicting_process_id(body).as_deref(), Some("sample_print"));
        assert_eq!(conflicting_process_id(r#"{"detail": "exists"}"#), None);
        assert_eq!(conflicting_process_id("not json"), None);
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let client = DeployClient::new("https://example.org/processes", DEFAULT_TIMEOUT)
            .unwrap()
            .with_token("  ");
        assert_eq!(client.token, None);

        let package = AppPackageDocument::from_template_str(DEFAULT_APP_PACKAGE_TEMPLATE)
            .unwrap()
            .fill("https://example.org/process.cwl", &PackageMetadata::default())
            .unwrap();
        let err = client.deploy(&package).unwrap_err();
        assert!(matches!(err, AppPackError::Deploy { status: None, .. }));
        assert!(err.to_string().contains("No authentication token"));
    }

    #[test]
    fn rejects_relative_endpoint() {
        let err = DeployClient::new("/processes", DEFAULT_TIMEOUT).unwrap_err();
        assert!(matches!(err, AppPackError::Deploy { status: None, .. }));
    }
}
