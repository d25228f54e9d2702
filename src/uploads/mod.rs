// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Abacus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Abacus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Directory-backed image store.
//!
//! Uploaded payloads land under `<data-dir>/assets/uploads/` with
//! collision-resistant names; deletion and resolution reduce caller input to a
//! basename and refuse anything that would escape the upload directory, before
//! any filesystem access.

pub mod upload_folder;

pub use upload_folder::{
    ImagePayload, SavedImage, UploadError, UploadFolder, UPLOADS_URL_PREFIX,
};
