//! HTTP transport for the remote preference/identity store.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`, each raced against
//! a bounded timeout. Server-side (SSR): every operation reports
//! [`StoreError::Unavailable`] so callers take their local fallback path.
//!
//! ERROR HANDLING
//! ==============
//! Failures map onto [`StoreError`] variants instead of panics; callers never
//! see a transport exception, only a `Result` they can degrade on.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use super::{RemoteStore, StoreError};
use crate::identity::fingerprint::DeviceSignals;
use crate::prefs::record::PreferenceRecord;

#[cfg(any(test, feature = "hydrate"))]
use super::types::ApiEnvelope;
#[cfg(feature = "hydrate")]
use super::types::{
    BindDeviceRequest, LookupDeviceData, LookupDeviceRequest, PreferencesDoc, RegisterDeviceData,
    RegisterDeviceRequest, SavePreferencesRequest, TouchDeviceRequest, VerifyDeviceData,
    VerifyDeviceRequest,
};

/// Transport configuration, owned by the composition root.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Prefix for every endpoint, without a trailing slash.
    pub base_url: String,
    /// Per-request budget; elapsed requests count as failed.
    pub timeout_ms: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "/api".to_owned(),
            timeout_ms: 4_000,
        }
    }
}

/// Production [`RemoteStore`] over HTTP.
#[derive(Clone, Debug, Default)]
pub struct HttpStore {
    config: StoreConfig,
}

impl HttpStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }
}

#[cfg(any(test, feature = "hydrate"))]
fn health_endpoint(base: &str) -> String {
    format!("{base}/health")
}

#[cfg(any(test, feature = "hydrate"))]
fn verify_endpoint(base: &str) -> String {
    format!("{base}/devices/verify")
}

#[cfg(any(test, feature = "hydrate"))]
fn lookup_endpoint(base: &str) -> String {
    format!("{base}/devices/lookup")
}

#[cfg(any(test, feature = "hydrate"))]
fn register_endpoint(base: &str) -> String {
    format!("{base}/devices")
}

#[cfg(any(test, feature = "hydrate"))]
fn seen_endpoint(base: &str) -> String {
    format!("{base}/devices/seen")
}

#[cfg(any(test, feature = "hydrate"))]
fn preferences_endpoint(base: &str, identity: &str) -> String {
    format!("{base}/preferences/user/{identity}")
}

#[cfg(any(test, feature = "hydrate"))]
fn login_endpoint(base: &str) -> String {
    format!("{base}/users/login")
}

/// Reject non-success envelopes and missing payloads.
#[cfg(any(test, feature = "hydrate"))]
fn unwrap_envelope<T>(envelope: ApiEnvelope<T>) -> Result<T, StoreError> {
    if !envelope.success {
        return Err(StoreError::Rejected(
            envelope
                .message
                .unwrap_or_else(|| "request failed".to_owned()),
        ));
    }
    envelope
        .data
        .ok_or_else(|| StoreError::Decode("missing data field".to_owned()))
}

#[cfg(feature = "hydrate")]
async fn with_timeout<T>(
    timeout_ms: u32,
    fut: impl std::future::Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    use futures::future::{Either, select};

    let timer = gloo_timers::future::TimeoutFuture::new(timeout_ms);
    futures::pin_mut!(fut);
    futures::pin_mut!(timer);
    match select(fut, timer).await {
        Either::Left((out, _)) => out,
        Either::Right(_) => Err(StoreError::Timeout(timeout_ms)),
    }
}

#[cfg(feature = "hydrate")]
async fn decode_response<T: serde::de::DeserializeOwned>(
    resp: gloo_net::http::Response,
) -> Result<ApiEnvelope<T>, StoreError> {
    if !resp.ok() {
        return Err(StoreError::Status(resp.status()));
    }
    resp.json::<ApiEnvelope<T>>()
        .await
        .map_err(|e| StoreError::Decode(e.to_string()))
}

#[cfg(feature = "hydrate")]
impl HttpStore {
    async fn get_envelope<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<ApiEnvelope<T>, StoreError> {
        let fut = async {
            let resp = gloo_net::http::Request::get(url)
                .send()
                .await
                .map_err(|e| StoreError::Network(e.to_string()))?;
            decode_response(resp).await
        };
        with_timeout(self.config.timeout_ms, fut).await
    }

    async fn post_envelope<T, B>(&self, url: &str, body: &B) -> Result<ApiEnvelope<T>, StoreError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize,
    {
        let request = gloo_net::http::Request::post(url)
            .json(body)
            .map_err(|e| StoreError::Network(e.to_string()))?;
        let fut = async {
            let resp = request
                .send()
                .await
                .map_err(|e| StoreError::Network(e.to_string()))?;
            decode_response(resp).await
        };
        with_timeout(self.config.timeout_ms, fut).await
    }

    /// POST where only the envelope's success flag matters.
    async fn post_ack<B: serde::Serialize>(&self, url: &str, body: &B) -> Result<(), StoreError> {
        let env = self.post_envelope::<serde_json::Value, _>(url, body).await?;
        if env.success {
            Ok(())
        } else {
            Err(StoreError::Rejected(
                env.message.unwrap_or_else(|| "request failed".to_owned()),
            ))
        }
    }
}

impl RemoteStore for HttpStore {
    async fn health(&self) -> bool {
        #[cfg(feature = "hydrate")]
        {
            let fut = async {
                gloo_net::http::Request::get(&health_endpoint(&self.config.base_url))
                    .send()
                    .await
                    .map(|resp| resp.ok())
                    .map_err(|e| StoreError::Network(e.to_string()))
            };
            with_timeout(self.config.timeout_ms, fut)
                .await
                .unwrap_or(false)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            false
        }
    }

    async fn verify_device(&self, device_id: &str) -> Result<bool, StoreError> {
        #[cfg(feature = "hydrate")]
        {
            let env = self
                .post_envelope::<VerifyDeviceData, _>(
                    &verify_endpoint(&self.config.base_url),
                    &VerifyDeviceRequest { device_id },
                )
                .await?;
            Ok(unwrap_envelope(env)?.exists)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = device_id;
            Err(StoreError::Unavailable)
        }
    }

    async fn find_device_by_fingerprint(
        &self,
        fingerprint_hash: &str,
    ) -> Result<Option<String>, StoreError> {
        #[cfg(feature = "hydrate")]
        {
            let env = self
                .post_envelope::<LookupDeviceData, _>(
                    &lookup_endpoint(&self.config.base_url),
                    &LookupDeviceRequest { fingerprint_hash },
                )
                .await?;
            Ok(unwrap_envelope(env)?.device_id)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = fingerprint_hash;
            Err(StoreError::Unavailable)
        }
    }

    async fn register_device(
        &self,
        signals: &DeviceSignals,
        fingerprint_hash: &str,
    ) -> Result<String, StoreError> {
        #[cfg(feature = "hydrate")]
        {
            let env = self
                .post_envelope::<RegisterDeviceData, _>(
                    &register_endpoint(&self.config.base_url),
                    &RegisterDeviceRequest {
                        fingerprint_hash,
                        fingerprint: signals,
                        user_agent: &signals.user_agent,
                        platform: &signals.platform,
                        timezone: &signals.timezone,
                    },
                )
                .await?;
            Ok(unwrap_envelope(env)?.device_id)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (signals, fingerprint_hash);
            Err(StoreError::Unavailable)
        }
    }

    async fn touch_device(&self, device_id: &str) -> Result<(), StoreError> {
        #[cfg(feature = "hydrate")]
        {
            self.post_ack(
                &seen_endpoint(&self.config.base_url),
                &TouchDeviceRequest { device_id },
            )
            .await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = device_id;
            Err(StoreError::Unavailable)
        }
    }

    async fn fetch_preferences(
        &self,
        identity: &str,
    ) -> Result<Option<PreferenceRecord>, StoreError> {
        #[cfg(feature = "hydrate")]
        {
            let env = self
                .get_envelope::<PreferencesDoc>(&preferences_endpoint(
                    &self.config.base_url,
                    identity,
                ))
                .await?;
            let doc = unwrap_envelope(env)?;
            if doc.preferences.is_empty() {
                Ok(None)
            } else {
                Ok(Some(doc.preferences.into_record()))
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = identity;
            Err(StoreError::Unavailable)
        }
    }

    async fn store_preferences(
        &self,
        identity: &str,
        record: &PreferenceRecord,
    ) -> Result<(), StoreError> {
        #[cfg(feature = "hydrate")]
        {
            self.post_ack(
                &preferences_endpoint(&self.config.base_url, identity),
                &SavePreferencesRequest {
                    device_id: identity,
                    preferences: record,
                },
            )
            .await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (identity, record);
            Err(StoreError::Unavailable)
        }
    }

    async fn bind_device(&self, username: &str, device_id: &str) -> Result<(), StoreError> {
        #[cfg(feature = "hydrate")]
        {
            self.post_ack(
                &login_endpoint(&self.config.base_url),
                &BindDeviceRequest {
                    username,
                    device: device_id,
                },
            )
            .await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (username, device_id);
            Err(StoreError::Unavailable)
        }
    }
}
