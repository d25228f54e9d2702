// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Abacus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Abacus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Abacus — counter-tracking core (persisted tallies, income ledger, image uploads).
//!
//! The crate is a single-crate layout: pure domain ops over persisted roots, a
//! folder-backed key-value store, and an image upload service exposed through an
//! in-process bridge and a stand-alone HTTP endpoint with identical semantics.

pub mod bridge;
pub mod controller;
pub mod model;
pub mod ops;
pub mod server;
pub mod store;
pub mod transport;
pub mod uploads;
