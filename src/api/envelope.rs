//! Normalization of list responses.
//!
//! The backend is not consistent about its envelope: items arrive under
//! `data` or `results`, `total_pages` may be missing, and some endpoints
//! return a bare array. Everything is folded into a [`CollectionPage`].

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{CollectionPage, EntityId, ReferenceOption};
use crate::controller::PageSize;
use crate::error::{ConsoleError, Result};

const ITEM_KEYS: &[&str] = &["data", "results"];

/// Convert a list response body into a page of `E`.
pub fn normalize_list<E: DeserializeOwned>(body: Value, page_size: PageSize) -> Result<CollectionPage<E>> {
    match body {
        Value::Array(_) => {
            let items: Vec<E> = serde_json::from_value(body)?;
            Ok(CollectionPage::single(items))
        }
        Value::Object(mut map) => {
            let raw_items = ITEM_KEYS
                .iter()
                .find_map(|key| map.remove(*key).filter(|v| !v.is_null()))
                .unwrap_or_else(|| Value::Array(Vec::new()));
            let items: Vec<E> = serde_json::from_value(raw_items)?;

            let total_count = map.get("count").and_then(Value::as_u64);
            let total_pages = map
                .get("total_pages")
                .and_then(Value::as_u64)
                .or_else(|| {
                    let size = page_size.get()? as u64;
                    total_count.map(|count| count.div_ceil(size))
                })
                .unwrap_or(1)
                .clamp(1, u32::MAX as u64) as u32;

            Ok(CollectionPage {
                items,
                total_pages,
                total_count,
            })
        }
        other => Err(ConsoleError::Other(format!(
            "unexpected list response: expected an object or array, got {}",
            json_kind(&other)
        ))),
    }
}

/// Records of a list response, wherever the backend put them.
pub(crate) fn list_records(body: Value) -> Result<Vec<Value>> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match ITEM_KEYS
            .iter()
            .find_map(|key| map.remove(*key).filter(|v| !v.is_null()))
        {
            Some(Value::Array(items)) => Ok(items),
            _ => Ok(Vec::new()),
        },
        other => Err(ConsoleError::Other(format!(
            "unexpected list response: expected an object or array, got {}",
            json_kind(&other)
        ))),
    }
}

/// Build form options from a list response, reading labels from `label_fields`.
///
/// Label fields may be dotted paths into nested records (`product.name`).
/// Records without a numeric `id` are skipped.
pub fn reference_options(body: Value, label_fields: &[&str]) -> Result<Vec<ReferenceOption>> {
    Ok(list_records(body)?
        .iter()
        .filter_map(|record| {
            let id: EntityId = record.get("id")?.as_u64()?;
            let label = label_fields
                .iter()
                .find_map(|field| lookup(record, field).and_then(label_text))
                .unwrap_or_else(|| format!("#{id}"));
            Some(ReferenceOption { id, label })
        })
        .collect())
}

/// Message carried in an error body, if any.
pub fn error_message(body: &Value) -> Option<String> {
    ["error", "detail", "message"]
        .iter()
        .find_map(|key| body.get(*key).and_then(label_text))
}

fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(record, |value, key| value.get(key))
}

fn label_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
