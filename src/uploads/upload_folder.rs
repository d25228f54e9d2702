// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Abacus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Abacus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::Rng;
use regex::Regex;

use crate::store::WriteDurability;

const ASSETS_SUBDIR: &str = "assets";
const UPLOADS_SUBDIR: &str = "uploads";

/// Store-relative prefix every uploaded file is addressable under.
pub const UPLOADS_URL_PREFIX: &str = "/assets/uploads/";

#[derive(Debug)]
pub enum UploadError {
    MissingFilename,
    InvalidFilename {
        name: String,
    },
    InvalidDataUri,
    NotFound {
        path: PathBuf,
    },
    SymlinkRefused {
        path: PathBuf,
    },
    Io {
        path: PathBuf,
        source: io::Error,
    },
    RevealFailed {
        path: PathBuf,
        source: io::Error,
    },
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFilename => write!(f, "missing filename or url"),
            Self::InvalidFilename { name } => write!(f, "invalid filename: {name:?}"),
            Self::InvalidDataUri => write!(f, "payload is not a base64 data uri"),
            Self::NotFound { path } => write!(f, "not found: {path:?}"),
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to operate on symlink at {path:?}")
            }
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::RevealFailed { path, source } => {
                write!(f, "cannot reveal {path:?} in file manager: {source}")
            }
        }
    }
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } | Self::RevealFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Upload payload: raw bytes, or the embedded `data:<mime>;base64,<data>` form
/// the bridge receives. Only the base64 portion of a data URI is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
    Bytes(Vec<u8>),
    DataUri(String),
}

impl ImagePayload {
    /// Raw bytes plus the mime type named by a data URI, if any.
    pub fn decode(&self) -> Result<(Vec<u8>, Option<String>), UploadError> {
        match self {
            Self::Bytes(bytes) => Ok((bytes.clone(), None)),
            Self::DataUri(raw) => {
                let captures =
                    data_uri_pattern().captures(raw).ok_or(UploadError::InvalidDataUri)?;
                let mime = captures.get(1).map(|m| m.as_str().to_owned());
                let header_end =
                    captures.get(0).map(|m| m.end()).ok_or(UploadError::InvalidDataUri)?;
                let bytes = BASE64
                    .decode(raw[header_end..].trim())
                    .map_err(|_| UploadError::InvalidDataUri)?;
                Ok((bytes, mime))
            }
        }
    }
}

fn data_uri_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^data:([A-Za-z0-9.+-]+/[A-Za-z0-9.+-]+)?(?:;charset=[^;,]+)?;base64,")
            .expect("hard-coded data uri pattern is valid")
    })
}

/// Result of a completed save. The file is on disk when this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    pub filename: String,
    pub relative_url: String,
    pub path: PathBuf,
}

/// The single filesystem location all stored images must reside under; the
/// security boundary for every path-safety check in this module.
#[derive(Debug, Clone)]
pub struct UploadFolder {
    root: PathBuf,
    durability: WriteDurability,
}

impl UploadFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), durability: WriteDurability::default() }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join(ASSETS_SUBDIR)
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.assets_dir().join(UPLOADS_SUBDIR)
    }

    /// Persist an image payload under a fresh collision-resistant name.
    ///
    /// The caller-supplied name contributes only its extension (after basename
    /// reduction); when it has none, the data URI's mime type decides. The
    /// write completes before returning, so the reference is usable
    /// immediately.
    pub fn save_image(
        &self,
        original_name: &str,
        payload: &ImagePayload,
    ) -> Result<SavedImage, UploadError> {
        let (bytes, mime) = payload.decode()?;
        let extension = extension_for(original_name, mime.as_deref());

        let dir = self.uploads_dir();
        fs::create_dir_all(&dir)
            .map_err(|source| UploadError::Io { path: dir.clone(), source })?;

        // the time+random name makes collisions unlikely; loop on the off
        // chance two saves land in the same millisecond with the same suffix
        loop {
            let filename = generate_filename(&extension);
            let path = dir.join(&filename);

            let mut file = match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(UploadError::Io { path, source }),
            };

            file.write_all(&bytes)
                .map_err(|source| UploadError::Io { path: path.clone(), source })?;
            if self.durability == WriteDurability::Durable {
                file.sync_all()
                    .map_err(|source| UploadError::Io { path: path.clone(), source })?;
            }

            let relative_url = format!("{UPLOADS_URL_PREFIX}{filename}");
            return Ok(SavedImage { filename, relative_url, path });
        }
    }

    /// Delete a stored image by filename or URL.
    ///
    /// Input is reduced to its basename and the joined path is re-verified to
    /// be a descendant of the upload directory; violations are refused with
    /// [`UploadError::InvalidFilename`] before any filesystem access.
    pub fn delete_image(&self, name_or_url: &str) -> Result<PathBuf, UploadError> {
        let path = self.stored_path(name_or_url)?;

        match fs::symlink_metadata(&path) {
            Ok(md) if md.file_type().is_symlink() => {
                return Err(UploadError::SymlinkRefused { path });
            }
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(UploadError::NotFound { path });
            }
            Err(source) => return Err(UploadError::Io { path, source }),
        }

        fs::remove_file(&path).map_err(|source| UploadError::Io { path: path.clone(), source })?;
        Ok(path)
    }

    /// Absolute path a stored reference would live at, after basename
    /// reduction and the descendant check. Performs no I/O.
    pub fn stored_path(&self, name_or_url: &str) -> Result<PathBuf, UploadError> {
        let name = basename(name_or_url).ok_or(UploadError::MissingFilename)?;
        if name == "." || name == ".." {
            return Err(UploadError::InvalidFilename { name: name.to_owned() });
        }

        let dir = self.uploads_dir();
        let path = dir.join(name);
        if !path.starts_with(&dir) {
            return Err(UploadError::InvalidFilename { name: name.to_owned() });
        }
        Ok(path)
    }

    /// Resolve a store-relative reference (`/assets/...`) to an absolute path.
    pub fn resolve_relative(&self, reference: &str) -> Result<PathBuf, UploadError> {
        let rel = reference
            .strip_prefix("/assets/")
            .ok_or_else(|| UploadError::InvalidFilename { name: reference.to_owned() })?;
        self.resolve_asset(rel)
    }

    /// Resolve a path relative to the assets directory (static file serving).
    /// Every component must be a plain name; `..`, roots, and prefixes are
    /// refused before touching the filesystem.
    pub fn resolve_asset(&self, rel: &str) -> Result<PathBuf, UploadError> {
        let rel_path = Path::new(rel);
        for component in rel_path.components() {
            if !matches!(component, Component::Normal(_)) {
                return Err(UploadError::InvalidFilename { name: rel.to_owned() });
            }
        }

        let path = self.assets_dir().join(rel_path);
        if !path.is_file() {
            return Err(UploadError::NotFound { path });
        }
        Ok(path)
    }

    /// Reveal a file in the OS file browser by opening its containing
    /// directory. Fails with `NotFound` when the file is absent.
    pub fn reveal(&self, path: &Path) -> Result<PathBuf, UploadError> {
        if !path.exists() {
            return Err(UploadError::NotFound { path: path.to_path_buf() });
        }
        let target = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(path);
        open::that(target).map_err(|source| UploadError::RevealFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(path.to_path_buf())
    }
}

/// Last non-empty path segment of the input, if any.
fn basename(name_or_url: &str) -> Option<&str> {
    name_or_url.rsplit(['/', '\\']).find(|segment| !segment.is_empty())
}

fn extension_for(original_name: &str, mime: Option<&str>) -> String {
    if let Some(ext) = basename(original_name)
        .map(Path::new)
        .and_then(Path::extension)
        .and_then(|e| e.to_str())
    {
        return format!(".{ext}");
    }

    let Some(mime) = mime else {
        return String::new();
    };
    let ext = match mime {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        other => mime_guess::get_mime_extensions_str(other)
            .and_then(|exts| exts.first())
            .copied(),
    };
    ext.map(|e| format!(".{e}")).unwrap_or_default()
}

fn generate_filename(extension: &str) -> String {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    let suffix: u32 = rand::rng().random_range(0..1_000_000);
    format!("img_{millis}_{suffix:06}{extension}")
}
