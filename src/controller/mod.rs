// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Abacus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Abacus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Explicit state containers for the persisted roots.
//!
//! One controller per logical view owns an in-memory root. Every mutation
//! syncs against the shared [`ChangeSignal`] first (full reload when another
//! controller wrote), applies a pure op, persists, runs best-effort image
//! cleanup, and bumps the signal so other holders reload.

mod signal;

pub use signal::ChangeSignal;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

use crate::model::{CategoryId, CounterId, ImageRef, IncomeRoot, ItemId, TallyRoot};
use crate::ops::{self, Applied, ApplyError, Event, IncomeOp, TallyOp};
use crate::store::StateFolder;
use crate::transport::ImageStore;

fn now_unix_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

async fn cleanup_images(images: &dyn ImageStore, applied: &Applied) {
    for image in &applied.removed_images {
        if let Some(reference) = image.stored_reference() {
            // continue-on-error: an orphaned file never blocks the cascade
            if let Err(err) = images.delete_image(reference).await {
                warn!(reference, error = %err, "cannot delete stored image");
            }
        }
    }
}

/// Controller for the categories/counters root.
pub struct TallyController {
    root: TallyRoot,
    folder: Arc<StateFolder>,
    images: Arc<dyn ImageStore>,
    signal: ChangeSignal,
    seen_rev: u64,
}

impl TallyController {
    pub fn new(
        folder: Arc<StateFolder>,
        images: Arc<dyn ImageStore>,
        signal: ChangeSignal,
    ) -> Self {
        let root = folder.load_tally();
        let seen_rev = signal.current();
        Self { root, folder, images, signal, seen_rev }
    }

    pub fn root(&self) -> &TallyRoot {
        &self.root
    }

    /// Full reload when another controller signalled a change since the last
    /// sync. No partial merging: the store is the source of truth.
    pub fn sync(&mut self) {
        if self.signal.current() != self.seen_rev {
            self.reload();
        }
    }

    pub fn reload(&mut self) {
        self.root = self.folder.load_tally();
        self.seen_rev = self.signal.current();
    }

    /// Apply one op and persist. Returned events (threshold crossings) are for
    /// the caller to surface; destructive ops assume the caller already
    /// confirmed with the user.
    pub async fn apply(&mut self, op: TallyOp) -> Result<Vec<Event>, ApplyError> {
        self.sync();
        let applied = ops::apply_tally(&mut self.root, op)?;
        self.persist();
        cleanup_images(self.images.as_ref(), &applied).await;
        Ok(applied.events)
    }

    /// Create a category under a freshly allocated id; returns that id.
    pub async fn create_category(&mut self, name: &str) -> Result<CategoryId, ApplyError> {
        self.sync();
        let mut raw = now_unix_ms();
        while self.root.category(CategoryId::new(raw)).is_some() {
            raw += 1;
        }
        let category_id = CategoryId::new(raw);
        self.apply(TallyOp::CreateCategory { category_id, name: name.to_owned() }).await?;
        Ok(category_id)
    }

    /// Create a counter under a freshly allocated id; returns that id.
    pub async fn create_counter(
        &mut self,
        category_id: CategoryId,
        name: &str,
        image: Option<ImageRef>,
        max_value: Option<u32>,
    ) -> Result<CounterId, ApplyError> {
        self.sync();
        let mut raw = now_unix_ms();
        while self.root.counter(CounterId::new(raw)).is_some() {
            raw += 1;
        }
        let counter_id = CounterId::new(raw);
        self.apply(TallyOp::CreateCounter {
            counter_id,
            category_id,
            name: name.to_owned(),
            image,
            max_value,
        })
        .await?;
        Ok(counter_id)
    }

    fn persist(&mut self) {
        // a failed persist must not crash an in-progress interaction; the
        // in-memory state keeps the change for the rest of the session
        if let Err(err) = self.folder.save_tally(&self.root) {
            warn!(error = %err, "cannot persist tally root");
        }
        self.seen_rev = self.signal.bump();
    }
}

/// Controller for the income-ledger root.
pub struct IncomeController {
    root: IncomeRoot,
    folder: Arc<StateFolder>,
    images: Arc<dyn ImageStore>,
    signal: ChangeSignal,
    seen_rev: u64,
}

impl IncomeController {
    pub fn new(
        folder: Arc<StateFolder>,
        images: Arc<dyn ImageStore>,
        signal: ChangeSignal,
    ) -> Self {
        let root = folder.load_income();
        let seen_rev = signal.current();
        Self { root, folder, images, signal, seen_rev }
    }

    pub fn root(&self) -> &IncomeRoot {
        &self.root
    }

    pub fn sync(&mut self) {
        if self.signal.current() != self.seen_rev {
            self.reload();
        }
    }

    pub fn reload(&mut self) {
        self.root = self.folder.load_income();
        self.seen_rev = self.signal.current();
    }

    pub async fn apply(&mut self, op: IncomeOp) -> Result<(), ApplyError> {
        self.sync();
        let applied = ops::apply_income(&mut self.root, op)?;
        self.persist();
        cleanup_images(self.images.as_ref(), &applied).await;
        Ok(())
    }

    /// Add a ledger item under a freshly allocated id; returns that id.
    pub async fn add_item(
        &mut self,
        name: &str,
        price: f64,
        qty: u32,
        img: Option<ImageRef>,
    ) -> Result<ItemId, ApplyError> {
        self.sync();
        let mut raw = now_unix_ms();
        while self.root.item(ItemId::new(raw)).is_some() {
            raw += 1;
        }
        let item_id = ItemId::new(raw);
        self.apply(IncomeOp::AddItem {
            item_id,
            name: name.to_owned(),
            price,
            qty,
            img,
        })
        .await?;
        Ok(item_id)
    }

    fn persist(&mut self) {
        if let Err(err) = self.folder.save_income(&self.root) {
            warn!(error = %err, "cannot persist income root");
        }
        self.seen_rev = self.signal.bump();
    }
}

#[cfg(test)]
mod tests;
