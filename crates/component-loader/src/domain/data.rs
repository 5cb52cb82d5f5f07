//! Constructor data assembly
//!
//! Data handed to a component constructor is a shallow merge of three
//! layers, later layers winning per key:
//!
//! ```text
//! factory defaults  <  node data-attributes  <  scan data
//! ```
//!
//! Values are replaced whole; nested objects are not merged.

use serde_json::{Map, Value};

/// Key/value payload passed to component constructors.
pub type ComponentData = Map<String, Value>;

/// Merge `layers` left to right into a fresh map.
#[must_use]
pub fn merge_layers<'a>(layers: impl IntoIterator<Item = &'a ComponentData>) -> ComponentData {
    let mut merged = ComponentData::new();
    for layer in layers {
        for (key, value) in layer {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Collect data-attributes of a node into a data layer.
///
/// Every attribute starting with `prefix` contributes one entry, except the
/// names listed in `skip` (marker and identity attributes). The prefix is
/// stripped and the rest converted from kebab-case to camelCase.
#[must_use]
pub fn attribute_data(attributes: &[(String, String)], prefix: &str, skip: &[&str]) -> ComponentData {
    attributes
        .iter()
        .filter(|(name, _)| !skip.contains(&name.as_str()))
        .filter_map(|(name, value)| {
            let rest = name.strip_prefix(prefix)?;
            if rest.is_empty() {
                return None;
            }
            Some((kebab_to_camel(rest), Value::String(value.clone())))
        })
        .collect()
}

/// `first-param` → `firstParam`
#[must_use]
pub fn kebab_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
