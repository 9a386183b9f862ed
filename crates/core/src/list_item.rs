use std::collections::BTreeMap;

use crate::{CoreError, FieldValue, ItemId};

pub const ITEM_ID_FIELD: &str = "id";

/// One row of a list-valued field (a payment, a custom line item, a tent size).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub id: ItemId,
    pub fields: BTreeMap<String, FieldValue>,
}

impl ListItem {
    pub fn new(id: ItemId, fields: BTreeMap<String, FieldValue>) -> Self {
        Self { id, fields }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Stored form: the item's fields plus an integer `id` entry.
    pub fn to_value(&self) -> Result<FieldValue, CoreError> {
        let id = i64::try_from(self.id.get())
            .map_err(|_| CoreError::InvalidItem(format!("id {} out of range", self.id)))?;
        let mut map = self.fields.clone();
        map.insert(ITEM_ID_FIELD.to_string(), FieldValue::Integer(id));
        Ok(FieldValue::Map(map))
    }

    pub fn from_value(value: &FieldValue) -> Result<Self, CoreError> {
        let map = value
            .as_map()
            .ok_or_else(|| CoreError::InvalidItem("list entry is not an object".into()))?;
        let id = match map.get(ITEM_ID_FIELD) {
            Some(FieldValue::Integer(n)) if *n > 0 => ItemId::new(*n as u64),
            Some(other) => {
                return Err(CoreError::InvalidItem(format!("bad id value: {other:?}")));
            }
            None => return Err(CoreError::InvalidItem("missing id".into())),
        };
        let fields = map
            .iter()
            .filter(|(k, _)| k.as_str() != ITEM_ID_FIELD)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(Self { id, fields })
    }
}

/// Decode a list-valued field. `Null` reads as an empty list.
pub fn decode_items(value: &FieldValue) -> Result<Vec<ListItem>, CoreError> {
    match value {
        FieldValue::Null => Ok(Vec::new()),
        FieldValue::List(entries) => entries.iter().map(ListItem::from_value).collect(),
        other => Err(CoreError::InvalidItem(format!("expected a list, found {other:?}"))),
    }
}

pub fn encode_items(items: &[ListItem]) -> Result<FieldValue, CoreError> {
    let entries = items
        .iter()
        .map(ListItem::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(FieldValue::List(entries))
}

/// `max(existing ids) + 1`, or 1 for an empty list. Ids of removed rows are
/// never handed out again while a larger id survives. Ids stay within the
/// positive `i64` range so they can always be stored.
pub fn next_item_id(items: &[ListItem]) -> Result<ItemId, CoreError> {
    let max = items.iter().map(|item| item.id.get()).max().unwrap_or(0);
    match max.checked_add(1) {
        Some(next) if i64::try_from(next).is_ok() => Ok(ItemId::new(next)),
        _ => Err(CoreError::InvalidItem(format!("no id left after {max}"))),
    }
}
