// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Abacus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Abacus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

/// Reference to a counter/item image.
///
/// `Inline` holds an embedded `data:` URI that lives only in memory for the
/// current session; `Stored` holds a reference into the upload folder (a
/// store-relative `/assets/uploads/...` path or a `file://` URL). The raw
/// string is classified exactly once, here — everything downstream matches on
/// the variant instead of re-testing prefixes.
///
/// Serialized as the raw string so persisted blobs keep the legacy shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageRef {
    Inline(String),
    Stored(String),
}

impl ImageRef {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.starts_with("data:") {
            Self::Inline(raw)
        } else {
            Self::Stored(raw)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Inline(raw) | Self::Stored(raw) => raw,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Inline(_))
    }

    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored(_))
    }

    /// The stored reference, if any. Inline images have no stored counterpart.
    pub fn stored_reference(&self) -> Option<&str> {
        match self {
            Self::Stored(raw) => Some(raw),
            Self::Inline(_) => None,
        }
    }

    /// Last path segment of a stored reference (the on-disk filename).
    pub fn filename(&self) -> Option<&str> {
        self.stored_reference()
            .and_then(|raw| raw.rsplit(['/', '\\']).next())
            .filter(|name| !name.is_empty())
    }
}

impl From<String> for ImageRef {
    fn from(raw: String) -> Self {
        Self::from_raw(raw)
    }
}

impl From<ImageRef> for String {
    fn from(image: ImageRef) -> Self {
        match image {
            ImageRef::Inline(raw) | ImageRef::Stored(raw) => raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ImageRef;

    #[test]
    fn classifies_data_uris_as_inline() {
        let image = ImageRef::from_raw("data:image/png;base64,AAAA");
        assert!(image.is_inline());
        assert_eq!(image.stored_reference(), None);
        assert_eq!(image.filename(), None);
    }

    #[test]
    fn classifies_paths_and_urls_as_stored() {
        let relative = ImageRef::from_raw("/assets/uploads/img_1_000001.jpg");
        assert!(relative.is_stored());
        assert_eq!(relative.filename(), Some("img_1_000001.jpg"));

        let file_url = ImageRef::from_raw("file:///data/assets/uploads/img_2_000002.png");
        assert!(file_url.is_stored());
        assert_eq!(file_url.filename(), Some("img_2_000002.png"));
    }

    #[test]
    fn serializes_to_the_raw_string() {
        let image = ImageRef::from_raw("/assets/uploads/a.jpg");
        let json = serde_json::to_string(&image).unwrap();
        assert_eq!(json, "\"/assets/uploads/a.jpg\"");

        let parsed: ImageRef = serde_json::from_str("\"data:image/png;base64,AA\"").unwrap();
        assert!(parsed.is_inline());
    }
}
