// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Abacus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Abacus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Key-value persistence for the tally and income roots.
//!
//! One JSON blob per key under `<data-dir>/state/`, written atomically. Loads
//! never fail: missing or unparsable blobs yield empty roots, and legacy
//! bare-array blobs are migrated in memory (never written back automatically).

pub mod state_folder;

pub use state_folder::{StateFolder, StoreError, WriteDurability, DEFAULT_CATEGORY_NAME};
