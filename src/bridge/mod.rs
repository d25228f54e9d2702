// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Abacus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Abacus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! In-process transport for an embedding shell.
//!
//! Mirrors the HTTP service's semantics over direct calls. Every response is a
//! structured `{ok, ...}` value; errors never cross the bridge boundary as
//! panics.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::uploads::{ImagePayload, UploadFolder};

#[derive(Debug, Clone, Deserialize)]
pub struct SaveImageParams {
    pub name: String,
    pub base64: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveImageResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteImageParams {
    pub filename: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteImageResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShowItemResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShowRelativeResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The surface an embedding shell exposes to its renderer.
pub struct ShellBridge {
    folder: Arc<UploadFolder>,
}

impl ShellBridge {
    pub fn new(folder: Arc<UploadFolder>) -> Self {
        Self { folder }
    }

    /// Store a base64 data-URI payload; returns a `file://` URL usable for
    /// display and later deletion.
    pub fn save_image(&self, params: &SaveImageParams) -> SaveImageResponse {
        match self.folder.save_image(&params.name, &ImagePayload::DataUri(params.base64.clone()))
        {
            Ok(saved) => SaveImageResponse {
                ok: true,
                url: Some(format!("file://{}", saved.path.display())),
                filename: Some(saved.filename),
                error: None,
            },
            Err(err) => {
                warn!(name = %params.name, error = %err, "bridge save failed");
                SaveImageResponse { ok: false, url: None, filename: None, error: Some(err.to_string()) }
            }
        }
    }

    pub fn delete_image(&self, params: &DeleteImageParams) -> DeleteImageResponse {
        match self.folder.delete_image(&params.filename) {
            Ok(_) => DeleteImageResponse { ok: true, error: None },
            Err(err) => DeleteImageResponse { ok: false, error: Some(err.to_string()) },
        }
    }

    /// Reveal an absolute file path in the OS file browser.
    pub fn show_item(&self, path: &str) -> ShowItemResponse {
        match self.folder.reveal(&PathBuf::from(path)) {
            Ok(_) => ShowItemResponse { ok: true, error: None },
            Err(err) => ShowItemResponse { ok: false, error: Some(err.to_string()) },
        }
    }

    /// Resolve a store-relative reference (`/assets/...`) and reveal it.
    pub fn show_relative(&self, reference: &str) -> ShowRelativeResponse {
        let path = match self.folder.resolve_relative(reference) {
            Ok(path) => path,
            Err(err) => {
                return ShowRelativeResponse { ok: false, path: None, error: Some(err.to_string()) };
            }
        };

        match self.folder.reveal(&path) {
            Ok(resolved) => ShowRelativeResponse {
                ok: true,
                path: Some(resolved.display().to_string()),
                error: None,
            },
            Err(err) => ShowRelativeResponse { ok: false, path: None, error: Some(err.to_string()) },
        }
    }
}
