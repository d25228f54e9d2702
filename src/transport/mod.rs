// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Abacus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Abacus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Transport-agnostic image store interface.
//!
//! Callers pick one implementation at startup — the in-process store for an
//! embedding shell, the HTTP client otherwise — and everything downstream
//! talks to the trait. Both transports implement identical semantics.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::uploads::{ImagePayload, UploadError, UploadFolder};

/// Pre-upload size guard applied by every transport before any transfer.
pub const MAX_FILE_SIZE: usize = 2 * 1024 * 1024;

/// Re-encode qualities tried, in order, after a failed upload. Exhausting the
/// ladder means the caller keeps the inline (unpersisted) representation.
pub const QUALITY_LADDER: [f32; 4] = [0.8, 0.6, 0.4, 0.2];

#[derive(Debug)]
pub enum TransportError {
    TooLarge {
        size: usize,
    },
    Store {
        source: UploadError,
    },
    Request {
        source: reqwest::Error,
    },
    Endpoint {
        status: u16,
        message: String,
    },
    Encode {
        message: String,
    },
    Unsupported {
        operation: &'static str,
    },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLarge { size } => {
                write!(f, "payload of {size} bytes exceeds the {MAX_FILE_SIZE} byte limit")
            }
            Self::Store { source } => write!(f, "image store error: {source}"),
            Self::Request { source } => write!(f, "request error: {source}"),
            Self::Endpoint { status, message } => {
                write!(f, "endpoint rejected the request (status={status}): {message}")
            }
            Self::Encode { message } => write!(f, "cannot re-encode image: {message}"),
            Self::Unsupported { operation } => {
                write!(f, "operation not supported by this transport: {operation}")
            }
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store { source } => Some(source),
            Self::Request { source } => Some(source),
            _ => None,
        }
    }
}

/// Stored image reference as seen through a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub filename: String,
    pub url: String,
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist an image payload; the returned reference is usable immediately.
    async fn save_image(
        &self,
        name: &str,
        payload: ImagePayload,
    ) -> Result<StoredImage, TransportError>;

    /// Delete a stored image by filename or URL.
    async fn delete_image(&self, reference: &str) -> Result<(), TransportError>;

    /// Reveal the stored file in the OS file browser.
    async fn reveal(&self, reference: &str) -> Result<PathBuf, TransportError>;
}

fn guard_size(bytes: &[u8]) -> Result<(), TransportError> {
    if bytes.len() > MAX_FILE_SIZE {
        return Err(TransportError::TooLarge { size: bytes.len() });
    }
    Ok(())
}

/// In-process transport: calls straight into the upload folder.
pub struct DirectImageStore {
    folder: Arc<UploadFolder>,
}

impl DirectImageStore {
    pub fn new(folder: Arc<UploadFolder>) -> Self {
        Self { folder }
    }
}

#[async_trait]
impl ImageStore for DirectImageStore {
    async fn save_image(
        &self,
        name: &str,
        payload: ImagePayload,
    ) -> Result<StoredImage, TransportError> {
        let (bytes, _) = payload.decode().map_err(|source| TransportError::Store { source })?;
        guard_size(&bytes)?;

        let saved = self
            .folder
            .save_image(name, &payload)
            .map_err(|source| TransportError::Store { source })?;
        Ok(StoredImage { filename: saved.filename, url: saved.relative_url })
    }

    async fn delete_image(&self, reference: &str) -> Result<(), TransportError> {
        self.folder
            .delete_image(reference)
            .map(|_| ())
            .map_err(|source| TransportError::Store { source })
    }

    async fn reveal(&self, reference: &str) -> Result<PathBuf, TransportError> {
        let path = if let Some(stripped) = reference.strip_prefix("file://") {
            PathBuf::from(stripped)
        } else if reference.starts_with("/assets/") {
            self.folder
                .resolve_relative(reference)
                .map_err(|source| TransportError::Store { source })?
        } else {
            PathBuf::from(reference)
        };

        self.folder.reveal(&path).map_err(|source| TransportError::Store { source })
    }
}

#[derive(Debug, Deserialize)]
struct UploadEndpointResponse {
    url: String,
}

#[derive(Debug, Deserialize)]
struct EndpointError {
    error: String,
}

/// HTTP transport: talks to the stand-alone upload service.
pub struct HttpImageStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpImageStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { base_url, client: reqwest::Client::new() }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn endpoint_error(response: reqwest::Response) -> TransportError {
        let status = response.status().as_u16();
        let message = match response.json::<EndpointError>().await {
            Ok(body) => body.error,
            Err(_) => "server error".to_owned(),
        };
        TransportError::Endpoint { status, message }
    }
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn save_image(
        &self,
        name: &str,
        payload: ImagePayload,
    ) -> Result<StoredImage, TransportError> {
        let (bytes, _) = payload.decode().map_err(|source| TransportError::Store { source })?;
        guard_size(&bytes)?;

        let part = reqwest::multipart::Part::bytes(bytes).file_name(name.to_owned());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint("/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|source| TransportError::Request { source })?;
        if !response.status().is_success() {
            return Err(Self::endpoint_error(response).await);
        }

        let body: UploadEndpointResponse = response
            .json()
            .await
            .map_err(|source| TransportError::Request { source })?;
        let filename = body
            .url
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(body.url.as_str())
            .to_owned();
        Ok(StoredImage { filename, url: body.url })
    }

    async fn delete_image(&self, reference: &str) -> Result<(), TransportError> {
        let response = self
            .client
            .post(self.endpoint("/delete"))
            .json(&serde_json::json!({ "url": reference }))
            .send()
            .await
            .map_err(|source| TransportError::Request { source })?;
        if !response.status().is_success() {
            return Err(Self::endpoint_error(response).await);
        }
        Ok(())
    }

    async fn reveal(&self, _reference: &str) -> Result<PathBuf, TransportError> {
        // the web fallback cannot reach the OS file manager
        Err(TransportError::Unsupported { operation: "reveal" })
    }
}

/// Caller-side upload policy: try the payload as-is, then re-encode at each
/// ladder quality. The final error means the caller keeps the inline
/// representation for the session.
pub async fn save_with_fallback<F>(
    store: &dyn ImageStore,
    name: &str,
    payload: ImagePayload,
    mut encode: F,
) -> Result<StoredImage, TransportError>
where
    F: FnMut(f32) -> Result<Vec<u8>, String>,
{
    let mut last_error = match store.save_image(name, payload).await {
        Ok(stored) => return Ok(stored),
        Err(err) => {
            debug!(error = %err, "initial upload failed, walking the quality ladder");
            err
        }
    };

    for quality in QUALITY_LADDER {
        let bytes = match encode(quality) {
            Ok(bytes) => bytes,
            Err(message) => {
                last_error = TransportError::Encode { message };
                continue;
            }
        };
        match store.save_image(name, ImagePayload::Bytes(bytes)).await {
            Ok(stored) => return Ok(stored),
            Err(err) => {
                debug!(quality, error = %err, "upload failed at ladder quality");
                last_error = err;
            }
        }
    }

    Err(last_error)
}

#[cfg(test)]
mod tests;
