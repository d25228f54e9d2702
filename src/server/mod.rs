// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Abacus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Abacus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Stand-alone HTTP transport for the image store.
//!
//! `POST /upload` (multipart field `file`), `POST /delete` (JSON `{url}` or
//! `{filename}`), and `GET /assets/...` static serving, with permissive CORS
//! for local-only use. Semantics match the in-process bridge exactly.

use std::sync::Arc;

use axum::extract::{Multipart, Path as UrlPath, Request, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::uploads::{ImagePayload, UploadError, UploadFolder};

pub const DEFAULT_PORT: u16 = 3001;
pub const PORT_ENV_VAR: &str = "UPLOAD_PORT";

/// Port to serve on: `UPLOAD_PORT` when set and parsable, 3001 otherwise.
pub fn port_from_env() -> u16 {
    std::env::var(PORT_ENV_VAR)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

#[derive(Clone)]
struct AppState {
    folder: Arc<UploadFolder>,
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    url: String,
}

#[derive(Debug, Serialize)]
struct DeleteResponse {
    ok: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Default, Deserialize)]
struct DeleteRequest {
    url: Option<String>,
    filename: Option<String>,
}

pub fn upload_router(folder: Arc<UploadFolder>) -> Router {
    Router::new()
        .route("/upload", post(upload))
        .route("/delete", post(delete))
        .route("/assets/{*path}", get(asset))
        .layer(middleware::from_fn(cors))
        .with_state(AppState { folder })
}

/// Serve the upload service on the given listener until it closes.
pub async fn serve(
    listener: tokio::net::TcpListener,
    folder: Arc<UploadFolder>,
) -> std::io::Result<()> {
    axum::serve(listener, upload_router(folder)).await
}

async fn cors(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::OK.into_response();
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers
        .insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET,POST,OPTIONS"));
    headers
        .insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"));
}

async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut file: Option<(String, Vec<u8>)> = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                let name = field.file_name().unwrap_or("upload").to_owned();
                match field.bytes().await {
                    Ok(bytes) => {
                        file = Some((name, bytes.to_vec()));
                        break;
                    }
                    Err(err) => {
                        warn!(error = %err, "cannot read multipart field");
                        return error_response(StatusCode::BAD_REQUEST, "invalid multipart payload");
                    }
                }
            }
            Ok(None) => break,
            Err(err) => {
                warn!(error = %err, "cannot parse multipart request");
                return error_response(StatusCode::BAD_REQUEST, "invalid multipart payload");
            }
        }
    }

    let Some((name, bytes)) = file else {
        return error_response(StatusCode::BAD_REQUEST, "no file");
    };

    match state.folder.save_image(&name, &ImagePayload::Bytes(bytes)) {
        Ok(saved) => {
            info!(filename = %saved.filename, "stored upload");
            Json(UploadResponse { url: saved.relative_url }).into_response()
        }
        Err(err) => {
            warn!(error = %err, "cannot store upload");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "server error")
        }
    }
}

async fn delete(State(state): State<AppState>, Json(request): Json<DeleteRequest>) -> Response {
    let Some(reference) = request.filename.or(request.url) else {
        return error_response(StatusCode::BAD_REQUEST, "missing filename or url");
    };

    match state.folder.delete_image(&reference) {
        Ok(path) => {
            info!(path = %path.display(), "deleted upload");
            Json(DeleteResponse { ok: true }).into_response()
        }
        Err(UploadError::MissingFilename) => {
            error_response(StatusCode::BAD_REQUEST, "missing filename or url")
        }
        Err(UploadError::InvalidFilename { .. } | UploadError::SymlinkRefused { .. }) => {
            error_response(StatusCode::BAD_REQUEST, "invalid filename")
        }
        Err(UploadError::NotFound { .. }) => error_response(StatusCode::NOT_FOUND, "not found"),
        Err(err) => {
            warn!(error = %err, "cannot delete upload");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "delete failed")
        }
    }
}

async fn asset(State(state): State<AppState>, UrlPath(path): UrlPath<String>) -> Response {
    let resolved = match state.folder.resolve_asset(&path) {
        Ok(resolved) => resolved,
        Err(UploadError::NotFound { .. }) => {
            return error_response(StatusCode::NOT_FOUND, "not found");
        }
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "invalid path"),
    };

    match tokio::fs::read(&resolved).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&resolved).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response()
        }
        Err(err) => {
            warn!(path = %resolved.display(), error = %err, "cannot read asset");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "server error")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse { error: message.to_owned() })).into_response()
}
