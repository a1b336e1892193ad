#![allow(dead_code)]
//! Keyframe value payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Value carried by one keyframe: either a single scalar (written to
/// `target[prop]`) or a map of sub-properties, each interpolated and
/// written independently.
///
/// Serde note: untagged, so authoring JSON stays `5.0` or `{"x":0,"y":1}`.
/// A `BTreeMap` keeps sub-property write order deterministic across runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyValue {
    Scalar(f64),
    Fields(BTreeMap<String, f64>),
}

impl KeyValue {
    #[inline]
    pub fn is_scalar(&self) -> bool {
        matches!(self, KeyValue::Scalar(_))
    }

    #[inline]
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            KeyValue::Scalar(v) => Some(*v),
            KeyValue::Fields(_) => None,
        }
    }

    #[inline]
    pub fn fields(&self) -> Option<&BTreeMap<String, f64>> {
        match self {
            KeyValue::Scalar(_) => None,
            KeyValue::Fields(map) => Some(map),
        }
    }

    /// Look up one sub-property; `None` for scalars and missing keys.
    #[inline]
    pub fn field(&self, key: &str) -> Option<f64> {
        self.fields().and_then(|map| map.get(key).copied())
    }

    /// Build a field map from `(key, value)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        KeyValue::Fields(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }
}

impl From<f64> for KeyValue {
    fn from(v: f64) -> Self {
        KeyValue::Scalar(v)
    }
}
