// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Abacus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Abacus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared state-changed revision.
///
/// The owner of a mutation bumps the revision after writing to the store;
/// every other holder compares against the revision it last saw and reloads
/// the full root when it moved.
#[derive(Debug, Clone, Default)]
pub struct ChangeSignal {
    rev: Arc<AtomicU64>,
}

impl ChangeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.rev.load(Ordering::SeqCst)
    }

    pub fn bump(&self) -> u64 {
        self.rev.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::ChangeSignal;

    #[test]
    fn bump_is_visible_through_clones() {
        let signal = ChangeSignal::new();
        let observer = signal.clone();
        assert_eq!(observer.current(), 0);

        assert_eq!(signal.bump(), 1);
        assert_eq!(observer.current(), 1);
    }
}
