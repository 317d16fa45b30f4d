//! Throttled JSON transport underneath the API surfaces.
//!
//! What this module provides:
//! - [`RestClient`]: a reqwest wrapper with bearer auth baked into the
//!   default headers and a client-wide requests-per-second ceiling.
//! - Error mapping that surfaces the upstream JSON `message` field on
//!   non-success responses.
//!
//! The rate limit is enforced *before* each request is issued; the actual
//! request frequency can be lower than the ceiling when requests take
//! longer to complete than the minimum spacing between them.

use std::num::NonZeroU32;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::errors::{ApiClientError, ClientInitError};

/// JSON REST core shared by the vendor API clients.
#[derive(Debug)]
pub struct RestClient {
    base_url: String,
    http: reqwest::Client,
    limiter: DefaultDirectRateLimiter,
}

impl RestClient {
    /// Builds a client for `base_url` with bearer auth and a
    /// `requests_per_sec_max` ceiling.
    pub fn new(
        base_url: impl Into<String>,
        api_key: &SecretString,
        requests_per_sec_max: NonZeroU32,
    ) -> Result<Self, ClientInitError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder().default_headers(headers).build()?;
        let limiter = RateLimiter::direct(Quota::per_second(requests_per_sec_max));

        Ok(Self { base_url: base_url.into(), http, limiter })
    }

    /// GETs `{base_url}/{path}` and decodes the JSON body into `T`.
    ///
    /// Waits on the rate limiter first. Non-success responses become
    /// [`ApiClientError::Status`] carrying the upstream `message` when the
    /// error body is JSON.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiClientError> {
        self.limiter.until_ready().await;

        let url = join_url(&self.base_url, path);
        let resp = self.http.get(&url).query(query).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| body.get("message").and_then(|m| m.as_str()).map(str::to_owned))
                .unwrap_or_default();
            return Err(ApiClientError::Status { status, url, message });
        }

        Ok(resp.json::<T>().await?)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
