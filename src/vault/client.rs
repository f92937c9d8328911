// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Vault HTTP implementation of [`SecretsClient`] (KV v2, sys and token endpoints)

use crate::config::Config;
use crate::constants::VAULT_TOKEN_HEADER;
use crate::error::{CertSyncError, Result, StoreError, StoreResult};
use crate::types::{SecretPayload, TokenInfo};
use crate::vault::models::{
    Envelope, ErrorBody, KvMetadata, KvVersion, KvWriteRequest, KvWriteResult, RenewRequest,
    SealStatus, TokenLookup, UnsealRequest,
};
use crate::vault::transport::{HttpService, ReqwestTransport};
use crate::vault::SecretsClient;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::CONTENT_TYPE;
use http::{Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tower::util::BoxCloneSyncService;
use tower::{BoxError, Service, ServiceExt};
use tracing::{debug, instrument};
use url::Url;

/// Client for a Vault server. Cheap to clone.
#[derive(Clone)]
pub struct VaultClient {
    service: HttpService,
    base_url: Url,
    token: String,
}

impl VaultClient {
    /// Build a client on top of any HTTP service
    pub fn new<S>(service: S, base_url: Url, token: impl Into<String>) -> Self
    where
        S: Service<Request<Bytes>, Response = Response<Bytes>, Error = BoxError>
            + Clone
            + Send
            + Sync
            + 'static,
        S::Future: Send + 'static,
    {
        Self {
            service: BoxCloneSyncService::new(service),
            base_url,
            token: token.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = ReqwestTransport::new(config.vault_timeout).map_err(|e| {
            CertSyncError::Config(format!("failed to build HTTP client: {}", e))
        })?;
        Ok(Self::new(
            transport,
            config.vault_url.clone(),
            config.vault_token.clone(),
        ))
    }

    /// `{base}/v1/{segments...}`
    fn endpoint(&self, segments: &[&str]) -> StoreResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                StoreError::InvalidRequest(format!("'{}' cannot be used as a base URL", self.base_url))
            })?
            .pop_if_empty()
            .push("v1")
            .extend(segments);
        Ok(url)
    }

    /// `{base}/v1/{mount}/{kind}/{path}` for the KV v2 engine
    fn kv_url(&self, mount: &str, kind: &str, path: &str) -> StoreResult<Url> {
        if mount.is_empty() || mount.contains('/') || is_dot_segment(mount) {
            return Err(StoreError::InvalidRequest(format!(
                "invalid mount point '{}'",
                mount
            )));
        }

        // Segments are sent as given, so an empty one is refused rather than collapsed
        let parts: Vec<&str> = path.split('/').collect();
        if parts.iter().any(|s| s.is_empty() || is_dot_segment(s)) {
            return Err(StoreError::InvalidRequest(format!(
                "invalid secret path '{}'",
                path
            )));
        }

        let mut segments = vec![mount, kind];
        segments.extend(parts);
        self.endpoint(&segments)
    }

    async fn send(
        &self,
        method: Method,
        url: &Url,
        body: Option<Vec<u8>>,
    ) -> StoreResult<(StatusCode, Bytes)> {
        let mut builder = Request::builder()
            .method(method.clone())
            .uri(url.as_str())
            .header(VAULT_TOKEN_HEADER, &self.token);
        if body.is_some() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(body.map(Bytes::from).unwrap_or_default())
            .map_err(|e| StoreError::InvalidRequest(format!("failed to build request: {}", e)))?;

        debug!("{} {}", method, url.path());
        let response = self
            .service
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| StoreError::Transport(format!("{} {}: {}", method, url.path(), e)))?;

        let (parts, body) = response.into_parts();
        Ok((parts.status, body))
    }

    /// Send a request and decode a successful JSON response
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &Url,
        body: Option<Vec<u8>>,
    ) -> StoreResult<T> {
        let (status, bytes) = self.send(method, url, body).await?;
        if !status.is_success() {
            return Err(status_error(status, &bytes, url));
        }
        decode(&bytes, url)
    }

    /// Read a KV v2 secret version, always raising on deleted versions
    async fn read_version(
        &self,
        mount: &str,
        path: &str,
        version: Option<u64>,
    ) -> StoreResult<(SecretPayload, u64)> {
        let mut url = self.kv_url(mount, "data", path)?;
        if let Some(version) = version {
            url.query_pairs_mut()
                .append_pair("version", &version.to_string());
        }

        let (status, bytes) = self.send(Method::GET, &url, None).await?;

        // Deleted versions come back as 404 with metadata attached
        if status == StatusCode::NOT_FOUND {
            if let Ok(envelope) = serde_json::from_slice::<Envelope<KvVersion>>(&bytes) {
                if envelope.data.metadata.is_deleted() {
                    return Err(StoreError::DeletedVersion {
                        version: envelope.data.metadata.version,
                    });
                }
            }
        }
        if !status.is_success() {
            return Err(status_error(status, &bytes, &url));
        }

        let KvVersion { data, metadata } = decode::<Envelope<KvVersion>>(&bytes, &url)?.data;
        if metadata.is_deleted() {
            return Err(StoreError::DeletedVersion {
                version: metadata.version,
            });
        }
        let payload = data.ok_or_else(|| {
            StoreError::UnexpectedResponse(format!("{}: response carries no data", url.path()))
        })?;

        Ok((payload, metadata.version))
    }
}

#[async_trait]
impl SecretsClient for VaultClient {
    #[instrument(skip(self))]
    async fn current_version(&self, mount: &str, path: &str) -> StoreResult<u64> {
        let url = self.kv_url(mount, "metadata", path)?;
        let metadata: Envelope<KvMetadata> = self.call(Method::GET, &url, None).await?;
        Ok(metadata.data.current_version)
    }

    #[instrument(skip(self))]
    async fn fetch_version(
        &self,
        mount: &str,
        path: &str,
        version: u64,
    ) -> StoreResult<SecretPayload> {
        let (payload, returned) = self.read_version(mount, path, Some(version)).await?;
        if returned != version {
            return Err(StoreError::UnexpectedResponse(format!(
                "requested version {} of {}/{} but received version {}",
                version, mount, path, returned
            )));
        }
        Ok(payload)
    }

    #[instrument(skip(self))]
    async fn fetch_latest(&self, mount: &str, path: &str) -> StoreResult<(SecretPayload, u64)> {
        self.read_version(mount, path, None).await
    }

    #[instrument(skip(self, payload))]
    async fn write_version(
        &self,
        mount: &str,
        path: &str,
        payload: &SecretPayload,
    ) -> StoreResult<u64> {
        let url = self.kv_url(mount, "data", path)?;
        let body = encode(&KvWriteRequest { data: payload })?;
        let result: Envelope<KvWriteResult> = self.call(Method::POST, &url, Some(body)).await?;
        Ok(result.data.version)
    }

    async fn is_sealed(&self) -> StoreResult<bool> {
        let url = self.endpoint(&["sys", "seal-status"])?;
        let status: SealStatus = self.call(Method::GET, &url, None).await?;
        Ok(status.sealed)
    }

    async fn submit_unseal_keys(&self, keys: &[String]) -> StoreResult<bool> {
        if keys.is_empty() {
            return Err(StoreError::InvalidRequest(
                "no unseal key shares provided".to_string(),
            ));
        }

        let url = self.endpoint(&["sys", "unseal"])?;
        let mut sealed = true;
        for (i, key) in keys.iter().enumerate() {
            let body = encode(&UnsealRequest { key })?;
            let status: SealStatus = self.call(Method::PUT, &url, Some(body)).await?;
            sealed = status.sealed;
            debug!("Submitted unseal key share {}/{}", i + 1, keys.len());
            if !sealed {
                break;
            }
        }
        Ok(sealed)
    }

    async fn lookup_self_token(&self) -> StoreResult<TokenInfo> {
        let url = self.endpoint(&["auth", "token", "lookup-self"])?;
        let lookup: Envelope<TokenLookup> = self.call(Method::GET, &url, None).await?;

        let expire_time = match lookup.data.expire_time.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(raw)
                    .map_err(|e| {
                        StoreError::UnexpectedResponse(format!(
                            "invalid token expire_time '{}': {}",
                            raw, e
                        ))
                    })?
                    .with_timezone(&Utc),
            ),
        };

        Ok(TokenInfo {
            expire_time,
            renewable: lookup.data.renewable,
        })
    }

    async fn renew_self_token(&self, increment: Duration) -> StoreResult<()> {
        let url = self.endpoint(&["auth", "token", "renew-self"])?;
        let body = encode(&RenewRequest {
            increment: format!("{}s", increment.as_secs()),
        })?;
        let (status, bytes) = self.send(Method::POST, &url, Some(body)).await?;
        if !status.is_success() {
            return Err(status_error(status, &bytes, &url));
        }
        Ok(())
    }
}

fn is_dot_segment(segment: &str) -> bool {
    segment == "." || segment == ".."
}

fn encode<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
    serde_json::to_vec(value)
        .map_err(|e| StoreError::InvalidRequest(format!("failed to encode request: {}", e)))
}

fn decode<T: DeserializeOwned>(bytes: &[u8], url: &Url) -> StoreResult<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| StoreError::UnexpectedResponse(format!("{}: {}", url.path(), e)))
}

/// Map a non-2xx response onto the store error taxonomy
fn status_error(status: StatusCode, bytes: &[u8], url: &Url) -> StoreError {
    let errors = serde_json::from_slice::<ErrorBody>(bytes)
        .map(|b| b.errors)
        .unwrap_or_default();
    let detail = if errors.is_empty() {
        format!("{} (HTTP {})", url.path(), status.as_u16())
    } else {
        format!("{}: {}", url.path(), errors.join("; "))
    };

    match status {
        StatusCode::BAD_REQUEST => StoreError::InvalidRequest(detail),
        StatusCode::UNAUTHORIZED => StoreError::Unauthenticated(detail),
        StatusCode::FORBIDDEN => StoreError::PermissionDenied(detail),
        StatusCode::NOT_FOUND => StoreError::NotFound(detail),
        StatusCode::SERVICE_UNAVAILABLE => StoreError::Sealed,
        _ => StoreError::UnexpectedResponse(format!("HTTP {}: {}", status.as_u16(), detail)),
    }
}
