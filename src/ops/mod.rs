// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Abacus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Abacus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation operations for the tally and income roots.
//!
//! Ops are pure: they validate, mutate the in-memory root, and report what
//! happened. Persistence and best-effort image deletion belong to the
//! controller layer. Validation failures reject before any mutation.

use std::fmt;

use crate::model::{CategoryId, CounterId, ImageRef, IncomeRoot, ItemId, TallyRoot};

#[derive(Debug, Clone, PartialEq)]
pub enum TallyOp {
    Increase {
        counter_id: CounterId,
    },
    Decrease {
        counter_id: CounterId,
    },
    Reset {
        counter_id: CounterId,
    },
    /// Zero every counter in one category. Destructive and scoped; callers
    /// confirm with the user before applying.
    ResetAll {
        category_id: CategoryId,
    },
    /// Set (or clear, with `None`) the threshold uniformly for one category.
    ApplyBatchThreshold {
        category_id: CategoryId,
        max_value: Option<u32>,
    },
    CreateCategory {
        category_id: CategoryId,
        name: String,
    },
    RenameCategory {
        category_id: CategoryId,
        name: String,
    },
    /// Cascade: removes the category and every counter under it. Callers
    /// confirm first; stored images of removed counters are reported back for
    /// best-effort deletion.
    DeleteCategory {
        category_id: CategoryId,
    },
    CreateCounter {
        counter_id: CounterId,
        category_id: CategoryId,
        name: String,
        image: Option<ImageRef>,
        max_value: Option<u32>,
    },
    /// Edit name/threshold; `image` replaces the current image only when
    /// `Some` (the edit form leaves it untouched otherwise).
    UpdateCounter {
        counter_id: CounterId,
        name: String,
        max_value: Option<u32>,
        image: Option<ImageRef>,
    },
    SetCounterImage {
        counter_id: CounterId,
        image: Option<ImageRef>,
    },
    DeleteCounter {
        counter_id: CounterId,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum IncomeOp {
    AddItem {
        item_id: ItemId,
        name: String,
        price: f64,
        qty: u32,
        img: Option<ImageRef>,
    },
    /// Full-row edit; `img` is the form's final value and replaces the current
    /// image (which may clear it).
    UpdateItem {
        item_id: ItemId,
        name: String,
        price: f64,
        qty: u32,
        img: Option<ImageRef>,
    },
    RemoveItem {
        item_id: ItemId,
    },
    SetQty {
        item_id: ItemId,
        qty: u32,
    },
    IncrementQty {
        item_id: ItemId,
    },
    DecrementQty {
        item_id: ItemId,
    },
    ResetAllQty,
    SetDailyGoldPrice {
        price: f64,
    },
}

/// Domain events surfaced to the caller for notification display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The counter's value landed exactly on its threshold. Emitted once per
    /// crossing: moving past the threshold does not re-trigger, resetting and
    /// re-reaching it does.
    ThresholdReached {
        counter_id: CounterId,
        name: String,
        max_value: u32,
    },
}

/// Outcome of a successfully applied op.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Applied {
    pub events: Vec<Event>,
    /// Stored image references orphaned by the op. The controller deletes them
    /// best-effort; the state mutation stands regardless of the outcome.
    pub removed_images: Vec<ImageRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApplyError {
    EmptyName,
    ZeroThreshold,
    DuplicateCategoryName { name: String },
    UnknownCategory { category_id: CategoryId },
    UnknownCounter { counter_id: CounterId },
    CategoryIdTaken { category_id: CategoryId },
    CounterIdTaken { counter_id: CounterId },
    UnknownItem { item_id: ItemId },
    ItemIdTaken { item_id: ItemId },
    InvalidPrice { price: f64 },
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must be non-empty after trimming"),
            Self::ZeroThreshold => write!(f, "threshold must be a positive integer"),
            Self::DuplicateCategoryName { name } => {
                write!(f, "a category named {name:?} already exists")
            }
            Self::UnknownCategory { category_id } => {
                write!(f, "category not found (id={category_id})")
            }
            Self::UnknownCounter { counter_id } => {
                write!(f, "counter not found (id={counter_id})")
            }
            Self::CategoryIdTaken { category_id } => {
                write!(f, "category id already in use (id={category_id})")
            }
            Self::CounterIdTaken { counter_id } => {
                write!(f, "counter id already in use (id={counter_id})")
            }
            Self::UnknownItem { item_id } => write!(f, "income item not found (id={item_id})"),
            Self::ItemIdTaken { item_id } => {
                write!(f, "income item id already in use (id={item_id})")
            }
            Self::InvalidPrice { price } => {
                write!(f, "price must be a finite non-negative number (got {price})")
            }
        }
    }
}

impl std::error::Error for ApplyError {}

/// Apply one tally op. On error the root is untouched.
pub fn apply_tally(root: &mut TallyRoot, op: TallyOp) -> Result<Applied, ApplyError> {
    match op {
        TallyOp::Increase { counter_id } => apply_increase(root, counter_id),
        TallyOp::Decrease { counter_id } => apply_decrease(root, counter_id),
        TallyOp::Reset { counter_id } => apply_reset(root, counter_id),
        TallyOp::ResetAll { category_id } => apply_reset_all(root, category_id),
        TallyOp::ApplyBatchThreshold { category_id, max_value } => {
            apply_batch_threshold(root, category_id, max_value)
        }
        TallyOp::CreateCategory { category_id, name } => {
            apply_create_category(root, category_id, &name)
        }
        TallyOp::RenameCategory { category_id, name } => {
            apply_rename_category(root, category_id, &name)
        }
        TallyOp::DeleteCategory { category_id } => apply_delete_category(root, category_id),
        TallyOp::CreateCounter { counter_id, category_id, name, image, max_value } => {
            apply_create_counter(root, counter_id, category_id, &name, image, max_value)
        }
        TallyOp::UpdateCounter { counter_id, name, max_value, image } => {
            apply_update_counter(root, counter_id, &name, max_value, image)
        }
        TallyOp::SetCounterImage { counter_id, image } => {
            apply_set_counter_image(root, counter_id, image)
        }
        TallyOp::DeleteCounter { counter_id } => apply_delete_counter(root, counter_id),
    }
}

/// Apply one income op. On error the root is untouched.
pub fn apply_income(root: &mut IncomeRoot, op: IncomeOp) -> Result<Applied, ApplyError> {
    match op {
        IncomeOp::AddItem { item_id, name, price, qty, img } => {
            apply_add_item(root, item_id, &name, price, qty, img)
        }
        IncomeOp::UpdateItem { item_id, name, price, qty, img } => {
            apply_update_item(root, item_id, &name, price, qty, img)
        }
        IncomeOp::RemoveItem { item_id } => apply_remove_item(root, item_id),
        IncomeOp::SetQty { item_id, qty } => apply_set_qty(root, item_id, qty),
        IncomeOp::IncrementQty { item_id } => apply_increment_qty(root, item_id),
        IncomeOp::DecrementQty { item_id } => apply_decrement_qty(root, item_id),
        IncomeOp::ResetAllQty => apply_reset_all_qty(root),
        IncomeOp::SetDailyGoldPrice { price } => apply_set_daily_gold_price(root, price),
    }
}

// Extracted op-application implementation for tally/income mutations.
include!("ops_impl.rs");
