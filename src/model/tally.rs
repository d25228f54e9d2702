// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Abacus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Abacus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

use super::ids::{CategoryId, CounterId};
use super::image::ImageRef;

/// A named grouping that scopes a set of counters. Deleting a category
/// cascades to every counter referencing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A named integer tally with an optional image and optional maximum threshold.
///
/// `value` is non-negative by construction; landing exactly on `max_value` is a
/// notifiable event, not a cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counter {
    pub id: CounterId,
    pub name: String,
    pub value: u32,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub max_value: Option<u32>,
    pub category_id: CategoryId,
}

/// The top-level persisted container for categories and counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyRoot {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub counters: Vec<Counter>,
}

impl TallyRoot {
    pub fn category(&self, category_id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    pub fn category_mut(&mut self, category_id: CategoryId) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.id == category_id)
    }

    pub fn counter(&self, counter_id: CounterId) -> Option<&Counter> {
        self.counters.iter().find(|c| c.id == counter_id)
    }

    pub fn counter_mut(&mut self, counter_id: CounterId) -> Option<&mut Counter> {
        self.counters.iter_mut().find(|c| c.id == counter_id)
    }

    pub fn counters_in(&self, category_id: CategoryId) -> impl Iterator<Item = &Counter> {
        self.counters.iter().filter(move |c| c.category_id == category_id)
    }

    /// Case-insensitive duplicate check over trimmed names; `exclude` skips the
    /// category being renamed.
    pub fn category_name_taken(&self, name: &str, exclude: Option<CategoryId>) -> bool {
        let needle = name.trim().to_lowercase();
        self.categories
            .iter()
            .filter(|c| Some(c.id) != exclude)
            .any(|c| c.name.trim().to_lowercase() == needle)
    }

    /// Sum of all counter values (the header total in the counters view).
    pub fn total_value(&self) -> u64 {
        self.counters.iter().map(|c| u64::from(c.value)).sum()
    }

    /// Copy safe to serialize into the local store: inline `data:` images are
    /// dropped so a single oversized image cannot blow the store quota. The
    /// receiver keeps its in-memory images untouched.
    pub fn persistable(&self) -> TallyRoot {
        TallyRoot {
            categories: self.categories.clone(),
            counters: self
                .counters
                .iter()
                .map(|counter| {
                    let mut copy = counter.clone();
                    if copy.image.as_ref().is_some_and(ImageRef::is_inline) {
                        copy.image = None;
                    }
                    copy
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, Counter, TallyRoot};
    use crate::model::{CategoryId, CounterId, ImageRef};

    fn counter(id: i64, category_id: i64) -> Counter {
        Counter {
            id: CounterId::new(id),
            name: format!("c{id}"),
            value: 0,
            image: None,
            max_value: None,
            category_id: CategoryId::new(category_id),
        }
    }

    #[test]
    fn counter_serializes_with_legacy_field_names() {
        let mut subject = counter(1, 7);
        subject.max_value = Some(5);
        subject.image = Some(ImageRef::from_raw("/assets/uploads/a.jpg"));

        let json = serde_json::to_value(&subject).unwrap();
        assert_eq!(json["maxValue"], 5);
        assert_eq!(json["categoryId"], 7);
        assert_eq!(json["image"], "/assets/uploads/a.jpg");
    }

    #[test]
    fn persistable_drops_inline_images_without_mutating_the_original() {
        let mut inline = counter(1, 7);
        inline.image = Some(ImageRef::from_raw("data:image/png;base64,AAAA"));
        let mut stored = counter(2, 7);
        stored.image = Some(ImageRef::from_raw("/assets/uploads/b.jpg"));

        let root = TallyRoot {
            categories: vec![Category { id: CategoryId::new(7), name: "Work".to_owned() }],
            counters: vec![inline, stored],
        };

        let copy = root.persistable();
        assert_eq!(copy.counters[0].image, None);
        assert_eq!(
            copy.counters[1].image,
            Some(ImageRef::from_raw("/assets/uploads/b.jpg"))
        );

        // the source root still holds the inline image for this session
        assert!(root.counters[0].image.as_ref().unwrap().is_inline());
    }

    #[test]
    fn category_name_check_is_case_insensitive_and_trims() {
        let root = TallyRoot {
            categories: vec![Category { id: CategoryId::new(1), name: "Work".to_owned() }],
            counters: Vec::new(),
        };

        assert!(root.category_name_taken("  wOrK ", None));
        assert!(!root.category_name_taken("Home", None));
        assert!(!root.category_name_taken("work", Some(CategoryId::new(1))));
    }
}
