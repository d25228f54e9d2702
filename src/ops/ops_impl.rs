// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Abacus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Abacus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

// Tally/income op application helpers, included by `ops/mod.rs`.
use crate::model::{Category, Counter, IncomeItem};

fn validated_name(name: &str) -> Result<String, ApplyError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApplyError::EmptyName);
    }
    Ok(trimmed.to_owned())
}

fn validated_threshold(max_value: Option<u32>) -> Result<Option<u32>, ApplyError> {
    match max_value {
        Some(0) => Err(ApplyError::ZeroThreshold),
        other => Ok(other),
    }
}

fn validated_price(price: f64) -> Result<f64, ApplyError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ApplyError::InvalidPrice { price });
    }
    Ok(price)
}

fn stored_only(image: Option<ImageRef>) -> Vec<ImageRef> {
    image.into_iter().filter(ImageRef::is_stored).collect()
}

fn apply_increase(root: &mut TallyRoot, counter_id: CounterId) -> Result<Applied, ApplyError> {
    let counter = root
        .counter_mut(counter_id)
        .ok_or(ApplyError::UnknownCounter { counter_id })?;
    counter.value = counter.value.saturating_add(1);

    let mut applied = Applied::default();
    if counter.max_value == Some(counter.value) {
        applied.events.push(Event::ThresholdReached {
            counter_id,
            name: counter.name.clone(),
            max_value: counter.value,
        });
    }
    Ok(applied)
}

fn apply_decrease(root: &mut TallyRoot, counter_id: CounterId) -> Result<Applied, ApplyError> {
    let counter = root
        .counter_mut(counter_id)
        .ok_or(ApplyError::UnknownCounter { counter_id })?;
    counter.value = counter.value.saturating_sub(1);
    Ok(Applied::default())
}

fn apply_reset(root: &mut TallyRoot, counter_id: CounterId) -> Result<Applied, ApplyError> {
    let counter = root
        .counter_mut(counter_id)
        .ok_or(ApplyError::UnknownCounter { counter_id })?;
    counter.value = 0;
    Ok(Applied::default())
}

fn apply_reset_all(root: &mut TallyRoot, category_id: CategoryId) -> Result<Applied, ApplyError> {
    if root.category(category_id).is_none() {
        return Err(ApplyError::UnknownCategory { category_id });
    }
    for counter in root.counters.iter_mut().filter(|c| c.category_id == category_id) {
        counter.value = 0;
    }
    Ok(Applied::default())
}

fn apply_batch_threshold(
    root: &mut TallyRoot,
    category_id: CategoryId,
    max_value: Option<u32>,
) -> Result<Applied, ApplyError> {
    let max_value = validated_threshold(max_value)?;
    if root.category(category_id).is_none() {
        return Err(ApplyError::UnknownCategory { category_id });
    }
    for counter in root.counters.iter_mut().filter(|c| c.category_id == category_id) {
        counter.max_value = max_value;
    }
    Ok(Applied::default())
}

fn apply_create_category(
    root: &mut TallyRoot,
    category_id: CategoryId,
    name: &str,
) -> Result<Applied, ApplyError> {
    let name = validated_name(name)?;
    if root.category(category_id).is_some() {
        return Err(ApplyError::CategoryIdTaken { category_id });
    }
    if root.category_name_taken(&name, None) {
        return Err(ApplyError::DuplicateCategoryName { name });
    }
    root.categories.push(Category { id: category_id, name });
    Ok(Applied::default())
}

fn apply_rename_category(
    root: &mut TallyRoot,
    category_id: CategoryId,
    name: &str,
) -> Result<Applied, ApplyError> {
    let name = validated_name(name)?;
    if root.category(category_id).is_none() {
        return Err(ApplyError::UnknownCategory { category_id });
    }
    if root.category_name_taken(&name, Some(category_id)) {
        return Err(ApplyError::DuplicateCategoryName { name });
    }
    let category = root
        .category_mut(category_id)
        .ok_or(ApplyError::UnknownCategory { category_id })?;
    category.name = name;
    Ok(Applied::default())
}

fn apply_delete_category(
    root: &mut TallyRoot,
    category_id: CategoryId,
) -> Result<Applied, ApplyError> {
    if root.category(category_id).is_none() {
        return Err(ApplyError::UnknownCategory { category_id });
    }

    let mut applied = Applied::default();
    for counter in root.counters_in(category_id) {
        if let Some(image) = counter.image.as_ref().filter(|img| img.is_stored()) {
            applied.removed_images.push(image.clone());
        }
    }

    root.counters.retain(|c| c.category_id != category_id);
    root.categories.retain(|c| c.id != category_id);
    Ok(applied)
}

fn apply_create_counter(
    root: &mut TallyRoot,
    counter_id: CounterId,
    category_id: CategoryId,
    name: &str,
    image: Option<ImageRef>,
    max_value: Option<u32>,
) -> Result<Applied, ApplyError> {
    let name = validated_name(name)?;
    let max_value = validated_threshold(max_value)?;
    if root.category(category_id).is_none() {
        return Err(ApplyError::UnknownCategory { category_id });
    }
    if root.counter(counter_id).is_some() {
        return Err(ApplyError::CounterIdTaken { counter_id });
    }
    root.counters.push(Counter {
        id: counter_id,
        name,
        value: 0,
        image,
        max_value,
        category_id,
    });
    Ok(Applied::default())
}

fn apply_update_counter(
    root: &mut TallyRoot,
    counter_id: CounterId,
    name: &str,
    max_value: Option<u32>,
    image: Option<ImageRef>,
) -> Result<Applied, ApplyError> {
    let name = validated_name(name)?;
    let max_value = validated_threshold(max_value)?;
    let counter = root
        .counter_mut(counter_id)
        .ok_or(ApplyError::UnknownCounter { counter_id })?;
    counter.name = name;
    counter.max_value = max_value;
    if let Some(image) = image {
        counter.image = Some(image);
    }
    Ok(Applied::default())
}

fn apply_set_counter_image(
    root: &mut TallyRoot,
    counter_id: CounterId,
    image: Option<ImageRef>,
) -> Result<Applied, ApplyError> {
    let counter = root
        .counter_mut(counter_id)
        .ok_or(ApplyError::UnknownCounter { counter_id })?;
    counter.image = image;
    Ok(Applied::default())
}

fn apply_delete_counter(
    root: &mut TallyRoot,
    counter_id: CounterId,
) -> Result<Applied, ApplyError> {
    let counter = root
        .counter(counter_id)
        .ok_or(ApplyError::UnknownCounter { counter_id })?;
    let removed_images = stored_only(counter.image.clone());
    root.counters.retain(|c| c.id != counter_id);
    Ok(Applied { events: Vec::new(), removed_images })
}

fn apply_add_item(
    root: &mut IncomeRoot,
    item_id: ItemId,
    name: &str,
    price: f64,
    qty: u32,
    img: Option<ImageRef>,
) -> Result<Applied, ApplyError> {
    let name = validated_name(name)?;
    let price = validated_price(price)?;
    if root.item(item_id).is_some() {
        return Err(ApplyError::ItemIdTaken { item_id });
    }
    root.items.push(IncomeItem { id: item_id, name, price, qty, img });
    Ok(Applied::default())
}

fn apply_update_item(
    root: &mut IncomeRoot,
    item_id: ItemId,
    name: &str,
    price: f64,
    qty: u32,
    img: Option<ImageRef>,
) -> Result<Applied, ApplyError> {
    let name = validated_name(name)?;
    let price = validated_price(price)?;
    let item = root
        .item_mut(item_id)
        .ok_or(ApplyError::UnknownItem { item_id })?;
    item.name = name;
    item.price = price;
    item.qty = qty;
    item.img = img;
    Ok(Applied::default())
}

fn apply_remove_item(root: &mut IncomeRoot, item_id: ItemId) -> Result<Applied, ApplyError> {
    let item = root.item(item_id).ok_or(ApplyError::UnknownItem { item_id })?;
    let removed_images = stored_only(item.img.clone());
    root.items.retain(|it| it.id != item_id);
    Ok(Applied { events: Vec::new(), removed_images })
}

fn apply_set_qty(root: &mut IncomeRoot, item_id: ItemId, qty: u32) -> Result<Applied, ApplyError> {
    let item = root
        .item_mut(item_id)
        .ok_or(ApplyError::UnknownItem { item_id })?;
    item.qty = qty;
    Ok(Applied::default())
}

fn apply_increment_qty(root: &mut IncomeRoot, item_id: ItemId) -> Result<Applied, ApplyError> {
    let item = root
        .item_mut(item_id)
        .ok_or(ApplyError::UnknownItem { item_id })?;
    item.qty = item.qty.saturating_add(1);
    Ok(Applied::default())
}

fn apply_decrement_qty(root: &mut IncomeRoot, item_id: ItemId) -> Result<Applied, ApplyError> {
    let item = root
        .item_mut(item_id)
        .ok_or(ApplyError::UnknownItem { item_id })?;
    item.qty = item.qty.saturating_sub(1);
    Ok(Applied::default())
}

fn apply_reset_all_qty(root: &mut IncomeRoot) -> Result<Applied, ApplyError> {
    for item in &mut root.items {
        item.qty = 0;
    }
    Ok(Applied::default())
}

fn apply_set_daily_gold_price(root: &mut IncomeRoot, price: f64) -> Result<Applied, ApplyError> {
    let price = validated_price(price)?;
    root.daily_gold_price = price;
    Ok(Applied::default())
}
