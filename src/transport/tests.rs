// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Abacus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Abacus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use super::{
    save_with_fallback, DirectImageStore, ImageStore, StoredImage, TransportError, MAX_FILE_SIZE,
};
use crate::uploads::{ImagePayload, UploadFolder};

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: PathBuf,
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

/// Test double that fails a configurable number of saves before accepting.
struct FlakyStore {
    failures_left: AtomicUsize,
    saves: AtomicUsize,
}

impl FlakyStore {
    fn failing(failures: usize) -> Self {
        Self { failures_left: AtomicUsize::new(failures), saves: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl ImageStore for FlakyStore {
    async fn save_image(
        &self,
        _name: &str,
        _payload: ImagePayload,
    ) -> Result<StoredImage, TransportError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
        {
            return Err(TransportError::Endpoint { status: 500, message: "server error".to_owned() });
        }
        Ok(StoredImage {
            filename: "img_1_000001.jpg".to_owned(),
            url: "/assets/uploads/img_1_000001.jpg".to_owned(),
        })
    }

    async fn delete_image(&self, _reference: &str) -> Result<(), TransportError> {
        Ok(())
    }

    async fn reveal(&self, _reference: &str) -> Result<PathBuf, TransportError> {
        Err(TransportError::Unsupported { operation: "reveal" })
    }
}

#[tokio::test]
async fn fallback_walks_every_ladder_quality_then_gives_up() {
    let store = FlakyStore::failing(usize::MAX);
    let qualities = Arc::new(Mutex::new(Vec::new()));
    let recorded = qualities.clone();

    let result = save_with_fallback(
        &store,
        "photo.jpg",
        ImagePayload::Bytes(vec![1, 2, 3]),
        move |quality| {
            recorded.lock().unwrap().push(quality);
            Ok(vec![0; 8])
        },
    )
    .await;

    assert!(result.is_err());
    assert_eq!(*qualities.lock().unwrap(), vec![0.8, 0.6, 0.4, 0.2]);
    // one initial attempt plus one per ladder rung
    assert_eq!(store.saves.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn fallback_stops_at_the_first_accepted_quality() {
    // initial attempt and the 0.8 rung fail, 0.6 succeeds
    let store = FlakyStore::failing(2);
    let qualities = Arc::new(Mutex::new(Vec::new()));
    let recorded = qualities.clone();

    let stored = save_with_fallback(
        &store,
        "photo.jpg",
        ImagePayload::Bytes(vec![1, 2, 3]),
        move |quality| {
            recorded.lock().unwrap().push(quality);
            Ok(vec![0; 8])
        },
    )
    .await
    .expect("ladder save");

    assert_eq!(stored.url, "/assets/uploads/img_1_000001.jpg");
    assert_eq!(*qualities.lock().unwrap(), vec![0.8, 0.6]);
    assert_eq!(store.saves.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn encoder_failures_fall_through_to_the_next_rung() {
    let store = FlakyStore::failing(1);

    let result = save_with_fallback(
        &store,
        "photo.jpg",
        ImagePayload::Bytes(vec![1]),
        |_quality| Err("encoder broke".to_owned()),
    )
    .await;

    match result {
        Err(TransportError::Encode { message }) => assert_eq!(message, "encoder broke"),
        other => panic!("expected Encode error, got: {other:?}"),
    }
    // only the initial attempt hit the store
    assert_eq!(store.saves.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn direct_store_round_trips_and_applies_the_size_guard() {
    let tmp = TempDir::new("direct-store");
    let folder = Arc::new(UploadFolder::new(tmp.path()));
    let store = DirectImageStore::new(folder.clone());

    let stored = store
        .save_image("photo.png", ImagePayload::Bytes(vec![7, 8, 9]))
        .await
        .expect("save");
    assert!(stored.url.starts_with("/assets/uploads/"));
    assert!(folder.uploads_dir().join(&stored.filename).is_file());

    store.delete_image(&stored.url).await.expect("delete");
    assert!(!folder.uploads_dir().join(&stored.filename).exists());

    let err = store
        .save_image("big.png", ImagePayload::Bytes(vec![0; MAX_FILE_SIZE + 1]))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::TooLarge { .. }));
}
