// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Abacus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Abacus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use super::{ChangeSignal, IncomeController, TallyController};
use crate::model::ImageRef;
use crate::ops::{Event, IncomeOp, TallyOp};
use crate::store::StateFolder;
use crate::transport::{DirectImageStore, ImageStore};
use crate::uploads::{ImagePayload, UploadFolder};

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: std::path::PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = env::temp_dir();
        path.push(format!("abacus-{prefix}-{}-{nanos}-{counter}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

struct ControllerTestCtx {
    _tmp: TempDir,
    state: Arc<StateFolder>,
    uploads: Arc<UploadFolder>,
    images: Arc<dyn ImageStore>,
    signal: ChangeSignal,
}

impl ControllerTestCtx {
    fn new(prefix: &str) -> Self {
        let tmp = TempDir::new(prefix);
        let state = Arc::new(StateFolder::new(tmp.path()));
        let uploads = Arc::new(UploadFolder::new(tmp.path()));
        let images: Arc<dyn ImageStore> = Arc::new(DirectImageStore::new(uploads.clone()));
        Self { _tmp: tmp, state, uploads, images, signal: ChangeSignal::new() }
    }

    fn tally(&self) -> TallyController {
        TallyController::new(self.state.clone(), self.images.clone(), self.signal.clone())
    }

    fn income(&self) -> IncomeController {
        IncomeController::new(self.state.clone(), self.images.clone(), self.signal.clone())
    }
}

#[tokio::test]
async fn mutations_persist_and_other_holders_reload_on_sync() {
    let ctx = ControllerTestCtx::new("controller-sync");
    let mut writer = ctx.tally();
    let mut reader = ctx.tally();

    let category_id = writer.create_category("Work").await.expect("create category");
    writer
        .create_counter(category_id, "pushups", None, Some(5))
        .await
        .expect("create counter");

    // the reader still holds its stale copy until it syncs
    assert!(reader.root().categories.is_empty());
    reader.sync();
    assert_eq!(reader.root().categories.len(), 1);
    assert_eq!(reader.root().counters.len(), 1);

    // and the store itself has the write
    assert_eq!(ctx.state.load_tally().counters.len(), 1);
}

#[tokio::test]
async fn threshold_events_are_returned_to_the_caller() {
    let ctx = ControllerTestCtx::new("controller-threshold");
    let mut controller = ctx.tally();

    let category_id = controller.create_category("Work").await.expect("category");
    let counter_id = controller
        .create_counter(category_id, "pushups", None, Some(2))
        .await
        .expect("counter");

    let events = controller.apply(TallyOp::Increase { counter_id }).await.expect("inc");
    assert!(events.is_empty());

    let events = controller.apply(TallyOp::Increase { counter_id }).await.expect("inc");
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], Event::ThresholdReached { max_value: 2, .. }));
}

#[tokio::test]
async fn delete_category_removes_stored_files_and_always_completes() {
    let ctx = ControllerTestCtx::new("controller-cascade");
    let mut controller = ctx.tally();

    let category_id = controller.create_category("Work").await.expect("category");

    // one counter with a real stored file, one whose file is already gone
    let saved = ctx
        .uploads
        .save_image("a.png", &ImagePayload::Bytes(vec![1, 2]))
        .expect("save");
    controller
        .create_counter(
            category_id,
            "with-file",
            Some(ImageRef::from_raw(saved.relative_url.clone())),
            None,
        )
        .await
        .expect("counter");
    controller
        .create_counter(
            category_id,
            "ghost-file",
            Some(ImageRef::from_raw("/assets/uploads/ghost.png")),
            None,
        )
        .await
        .expect("counter");

    controller.apply(TallyOp::DeleteCategory { category_id }).await.expect("cascade");

    // the cascade completed even though one image delete failed
    assert!(controller.root().categories.is_empty());
    assert!(controller.root().counters.is_empty());
    assert!(!saved.path.exists());
    assert!(ctx.state.load_tally().counters.is_empty());
}

#[tokio::test]
async fn income_controller_round_trips_through_the_store() {
    let ctx = ControllerTestCtx::new("controller-income");
    let mut controller = ctx.income();

    let item_id = controller.add_item("ore", 2.0, 1, None).await.expect("add");
    controller.apply(IncomeOp::IncrementQty { item_id }).await.expect("inc");
    controller
        .apply(IncomeOp::SetDailyGoldPrice { price: 100.0 })
        .await
        .expect("gold");

    let mut reader = ctx.income();
    reader.sync();
    assert_eq!(reader.root().items.len(), 1);
    assert_eq!(reader.root().items[0].qty, 2);
    assert_eq!(reader.root().daily_gold_price, 100.0);
    assert_eq!(reader.root().total_by_gold(), 400.0);
}
