// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Abacus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Abacus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persisted data model: tally root (categories + counters), income root, and
//! image references.
//!
//! All types serialize to the legacy JSON shape the store has always used, so
//! existing blobs load unchanged.

mod ids;
mod image;
mod income;
mod tally;

pub use ids::{CategoryId, CounterId, ItemId};
pub use image::ImageRef;
pub use income::{IncomeItem, IncomeRoot};
pub use tally::{Category, Counter, TallyRoot};
