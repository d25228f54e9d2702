// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Abacus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Abacus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

use super::ids::ItemId;
use super::image::ImageRef;

/// Price unit: the ledger enters prices in 万 (10,000 currency units).
pub const WAN: f64 = 10_000.0;

/// One line of the income ledger. `price` is in 万; amounts are derived, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeItem {
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    pub qty: u32,
    #[serde(default)]
    pub img: Option<ImageRef>,
}

impl IncomeItem {
    /// Amount in currency units: price (万) × qty × 10,000.
    pub fn amount(&self) -> f64 {
        self.price * f64::from(self.qty) * WAN
    }

    /// Amount at the daily gold price (元/万): price (万) × qty × gold price.
    pub fn gold_amount(&self, daily_gold_price: f64) -> f64 {
        self.price * f64::from(self.qty) * daily_gold_price
    }
}

/// The persisted income-ledger root: items plus the scalar daily gold price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeRoot {
    #[serde(default)]
    pub items: Vec<IncomeItem>,
    #[serde(rename = "dailyGoldPrice", default)]
    pub daily_gold_price: f64,
}

impl IncomeRoot {
    pub fn item(&self, item_id: ItemId) -> Option<&IncomeItem> {
        self.items.iter().find(|it| it.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: ItemId) -> Option<&mut IncomeItem> {
        self.items.iter_mut().find(|it| it.id == item_id)
    }

    /// Grand total in 万: sum of price × qty across all items.
    pub fn total_wan(&self) -> f64 {
        self.items.iter().map(|it| it.price * f64::from(it.qty)).sum()
    }

    /// Grand total in currency units at the daily gold price.
    pub fn total_by_gold(&self) -> f64 {
        self.total_wan() * self.daily_gold_price
    }

    /// Case-insensitive substring filter over item names.
    pub fn filter_by_name(&self, query: &str) -> Vec<&IncomeItem> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.items.iter().collect();
        }
        self.items
            .iter()
            .filter(|it| it.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Copy safe to serialize into the local store; see
    /// [`TallyRoot::persistable`](super::TallyRoot::persistable).
    pub fn persistable(&self) -> IncomeRoot {
        IncomeRoot {
            daily_gold_price: self.daily_gold_price,
            items: self
                .items
                .iter()
                .map(|item| {
                    let mut copy = item.clone();
                    if copy.img.as_ref().is_some_and(ImageRef::is_inline) {
                        copy.img = None;
                    }
                    copy
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{IncomeItem, IncomeRoot};
    use crate::model::{ImageRef, ItemId};

    fn item(id: i64, price: f64, qty: u32) -> IncomeItem {
        IncomeItem { id: ItemId::new(id), name: format!("item{id}"), price, qty, img: None }
    }

    #[test]
    fn amounts_are_derived_from_price_and_qty() {
        let subject = item(1, 2.5, 4);
        assert_eq!(subject.amount(), 100_000.0);
        assert_eq!(subject.gold_amount(800.0), 8_000.0);
    }

    #[test]
    fn grand_totals_sum_across_items() {
        let root = IncomeRoot {
            items: vec![item(1, 2.0, 3), item(2, 0.5, 2)],
            daily_gold_price: 100.0,
        };
        assert_eq!(root.total_wan(), 7.0);
        assert_eq!(root.total_by_gold(), 700.0);
    }

    #[test]
    fn filter_matches_name_substrings_case_insensitively() {
        let mut root = IncomeRoot::default();
        root.items.push(IncomeItem {
            id: ItemId::new(1),
            name: "Gold Ore".to_owned(),
            price: 1.0,
            qty: 1,
            img: None,
        });
        root.items.push(IncomeItem {
            id: ItemId::new(2),
            name: "Silver".to_owned(),
            price: 1.0,
            qty: 1,
            img: None,
        });

        let hits = root.filter_by_name("gold");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, ItemId::new(1));
        assert_eq!(root.filter_by_name("  ").len(), 2);
    }

    #[test]
    fn persistable_drops_inline_images_only() {
        let mut root = IncomeRoot::default();
        let mut inline = item(1, 1.0, 1);
        inline.img = Some(ImageRef::from_raw("data:image/jpeg;base64,AA"));
        let mut stored = item(2, 1.0, 1);
        stored.img = Some(ImageRef::from_raw("/assets/uploads/x.jpg"));
        root.items = vec![inline, stored];

        let copy = root.persistable();
        assert_eq!(copy.items[0].img, None);
        assert!(copy.items[1].img.is_some());
        assert!(root.items[0].img.is_some());
    }
}
