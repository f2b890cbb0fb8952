//! # Share Links
//!
//! Encodes a [`CalculatorItem`] as a URL query string and back, so a filled
//! in calculator can be bookmarked or sent as a link.
//!
//! The input is serialized to JSON and flattened:
//!
//! - nested fields use dotted keys: `down_payment.percent=20`
//! - array elements use numeric segments: `plan.tiered.tiers.0.rate_pct=5`
//! - `null` fields are omitted
//! - empty arrays and objects are written as `[]` and `{}`
//! - a string that would parse as JSON (`"42"`, `"true"`, `"[]"`) is written
//!   JSON-quoted so it decodes as a string again
//!
//! Decoding reverses each step, so `from_query(&to_query(item)?)? == item`.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::{CalculatorItem, VatInput};
//! use calc_core::share::{from_query, to_query};
//!
//! let item = CalculatorItem::Vat(VatInput { amount: 100.0, rate_pct: 20.0, mode: Default::default() });
//! let query = to_query(&item).unwrap();
//! assert!(query.contains("type=Vat"));
//! assert_eq!(from_query(&query).unwrap(), item);
//! ```

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use url::{form_urlencoded, Url};

use crate::calculations::CalculatorItem;
use crate::errors::{CalcError, CalcResult};

/// Flattened `(key, value)` pairs for an input, in key order
pub fn query_pairs(item: &CalculatorItem) -> CalcResult<Vec<(String, String)>> {
    let value = serde_json::to_value(item)?;
    let mut pairs = Vec::new();
    flatten("", &value, &mut pairs);
    Ok(pairs)
}

fn flatten(prefix: &str, value: &Value, pairs: &mut Vec<(String, String)>) {
    let key = |segment: &str| {
        if prefix.is_empty() {
            segment.to_string()
        } else {
            format!("{}.{}", prefix, segment)
        }
    };
    match value {
        Value::Null => {}
        Value::Object(map) if map.is_empty() => pairs.push((prefix.to_string(), "{}".to_string())),
        Value::Array(items) if items.is_empty() => pairs.push((prefix.to_string(), "[]".to_string())),
        Value::Object(map) => {
            for (name, child) in map {
                flatten(&key(name), child, pairs);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                flatten(&key(&i.to_string()), child, pairs);
            }
        }
        Value::String(s) => {
            let text = if serde_json::from_str::<Value>(s).is_ok() {
                Value::String(s.clone()).to_string()
            } else {
                s.clone()
            };
            pairs.push((prefix.to_string(), text));
        }
        Value::Bool(_) | Value::Number(_) => pairs.push((prefix.to_string(), value.to_string())),
    }
}

/// Encode an input as a form-urlencoded query string (no leading `?`).
pub fn to_query(item: &CalculatorItem) -> CalcResult<String> {
    let pairs = query_pairs(item)?;
    Ok(form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish())
}

/// Attach an input's query to `base_url`, replacing any existing query.
pub fn share_url(base_url: &str, item: &CalculatorItem) -> CalcResult<String> {
    let mut url = Url::parse(base_url)
        .map_err(|e| CalcError::invalid_input("base_url", base_url, format!("Invalid URL: {}", e)))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(CalcError::invalid_input(
                "base_url",
                base_url,
                format!("Unsupported scheme '{}', expected http or https", other),
            ));
        }
    }
    url.query_pairs_mut().clear().extend_pairs(query_pairs(item)?);
    Ok(url.to_string())
}

/// One node of the key tree rebuilt from dotted keys
enum Node {
    Leaf(Value),
    Branch(BTreeMap<String, Node>),
}

impl Node {
    fn into_value(self) -> Value {
        match self {
            Node::Leaf(value) => value,
            Node::Branch(children) => {
                let indices: Option<Vec<usize>> = children.keys().map(|k| k.parse().ok()).collect();
                match indices.map(is_dense) {
                    Some(true) => {
                        let mut items: Vec<(usize, Value)> = children
                            .into_iter()
                            .filter_map(|(k, node)| k.parse().ok().map(|i| (i, node.into_value())))
                            .collect();
                        items.sort_by_key(|(i, _)| *i);
                        Value::Array(items.into_iter().map(|(_, v)| v).collect())
                    }
                    _ => {
                        let map: Map<String, Value> =
                            children.into_iter().map(|(k, node)| (k, node.into_value())).collect();
                        Value::Object(map)
                    }
                }
            }
        }
    }
}

/// Keys are exactly `0..n`
fn is_dense(mut indices: Vec<usize>) -> bool {
    indices.sort_unstable();
    indices.iter().enumerate().all(|(expected, actual)| expected == *actual)
}

fn insert(root: &mut BTreeMap<String, Node>, key: &str, value: Value) -> CalcResult<()> {
    let conflict = || CalcError::invalid_input("query", key, "Key is used both as a value and as a group");
    let mut segments = key.split('.').peekable();
    let mut level = root;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            if level.contains_key(segment) {
                return Err(conflict());
            }
            level.insert(segment.to_string(), Node::Leaf(value));
            return Ok(());
        }
        let node = level
            .entry(segment.to_string())
            .or_insert_with(|| Node::Branch(BTreeMap::new()));
        level = match node {
            Node::Branch(children) => children,
            Node::Leaf(_) => return Err(conflict()),
        };
    }
    Ok(())
}

/// Rebuild an input from a query string or a full share URL.
pub fn from_query(query_or_url: &str) -> CalcResult<CalculatorItem> {
    let trimmed = query_or_url.trim();
    let query = match Url::parse(trimmed) {
        Ok(url) => url.query().unwrap_or_default().to_string(),
        Err(_) => trimmed.trim_start_matches('?').to_string(),
    };

    let mut root = BTreeMap::new();
    for (key, raw) in form_urlencoded::parse(query.as_bytes()) {
        if key.is_empty() {
            continue;
        }
        let value = serde_json::from_str::<Value>(&raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        insert(&mut root, &key, value)?;
    }
    if !root.contains_key("type") {
        return Err(CalcError::missing_field("type"));
    }

    let value = Node::Branch(root).into_value();
    tracing::debug!(query = %query, "decoded share query");
    serde_json::from_value(value).map_err(|e| CalcError::invalid_input("query", query.clone(), e.to_string()))
}
