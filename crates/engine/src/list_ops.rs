use std::collections::BTreeMap;

use bridaldesk_core::{FieldValue, ItemId, ListItem, next_item_id};

use crate::error::EngineError;
use crate::group::ListSpec;

/// Required fields of `spec` that `fields` leaves empty.
pub fn missing_required<'a>(spec: &'a ListSpec, fields: &BTreeMap<String, FieldValue>) -> Vec<&'a str> {
    spec.required
        .iter()
        .filter(|name| fields.get(name.as_str()).is_none_or(FieldValue::is_empty))
        .map(String::as_str)
        .collect()
}

fn check_required(spec: &ListSpec, fields: &BTreeMap<String, FieldValue>) -> Result<(), EngineError> {
    let missing = missing_required(spec, fields);
    if missing.is_empty() {
        return Ok(());
    }
    Err(EngineError::Validation(format!(
        "{}: required field(s) empty: {}",
        spec.field,
        missing.join(", ")
    )))
}

/// Validate and append a new row with the next sequential id.
pub fn append(
    spec: &ListSpec,
    items: &[ListItem],
    mut fields: BTreeMap<String, FieldValue>,
) -> Result<(Vec<ListItem>, ItemId), EngineError> {
    // A caller-supplied id is never trusted.
    fields.remove(bridaldesk_core::list_item::ITEM_ID_FIELD);
    check_required(spec, &fields)?;
    let id = next_item_id(items)?;
    let mut next = items.to_vec();
    next.push(ListItem::new(id, fields));
    Ok((next, id))
}

/// Merge `patch` into the row with `id`.
pub fn update(
    spec: &ListSpec,
    items: &[ListItem],
    id: ItemId,
    mut patch: BTreeMap<String, FieldValue>,
) -> Result<Vec<ListItem>, EngineError> {
    patch.remove(bridaldesk_core::list_item::ITEM_ID_FIELD);
    let mut next = items.to_vec();
    let item = next
        .iter_mut()
        .find(|item| item.id == id)
        .ok_or_else(|| EngineError::ItemNotFound {
            field: spec.field.clone(),
            id: id.get(),
        })?;
    let mut merged = item.fields.clone();
    merged.extend(patch);
    check_required(spec, &merged)?;
    item.fields = merged;
    Ok(next)
}

/// Drop the row with `id`. Surviving rows keep their ids.
pub fn remove(spec: &ListSpec, items: &[ListItem], id: ItemId) -> Result<Vec<ListItem>, EngineError> {
    if !items.iter().any(|item| item.id == id) {
        return Err(EngineError::ItemNotFound {
            field: spec.field.clone(),
            id: id.get(),
        });
    }
    Ok(items.iter().filter(|item| item.id != id).cloned().collect())
}
