//! Metric records reported by the external metrics command.
//!
//! The command prints a JSON array of `{key, value, unit}` objects. Each
//! collection cycle decodes a fresh `Metrics` value; nothing is retained
//! between cycles.

use std::ops::Deref;

use serde::Deserialize;

use crate::error::DecodeError;

/// A single gauge reading.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Metric {
    pub key: String,
    pub value: f64,
    pub unit: String,
}

impl Metric {
    pub fn new(key: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value,
            unit: unit.into(),
        }
    }
}

/// An ordered collection of metrics from one cycle.
///
/// Keys are not required to be unique; duplicates are kept in order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Metrics(Vec<Metric>);

impl Metrics {
    /// Decode the JSON array of metrics at the start of `output`.
    ///
    /// Only the first JSON value is read. Whatever follows it, such as a
    /// warning the command wrote to stderr, is ignored. A first value that
    /// is missing or is not an array of complete metrics is an error.
    pub fn decode(output: &[u8]) -> Result<Self, DecodeError> {
        let mut values = serde_json::Deserializer::from_slice(output).into_iter::<Metrics>();
        match values.next() {
            Some(metrics) => Ok(metrics?),
            None => Err(DecodeError::Empty),
        }
    }

    /// First metric with the given key.
    pub fn find(&self, key: &str) -> Option<&Metric> {
        self.0.iter().find(|m| m.key == key)
    }
}

impl Deref for Metrics {
    type Target = [Metric];

    fn deref(&self) -> &[Metric] {
        &self.0
    }
}

impl From<Vec<Metric>> for Metrics {
    fn from(metrics: Vec<Metric>) -> Self {
        Self(metrics)
    }
}

impl<'a> IntoIterator for &'a Metrics {
    type Item = &'a Metric;
    type IntoIter = std::slice::Iter<'a, Metric>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_single_metric() {
        let metrics = Metrics::decode(br#"[{"key":"cpu","value":42.5,"unit":"Percent"}]"#).unwrap();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0], Metric::new("cpu", 42.5, "Percent"));
    }

    #[test]
    fn decode_preserves_order_and_duplicates() {
        let output = br#"[
            {"key": "b", "value": 2, "unit": "s"},
            {"key": "a", "value": 1, "unit": "s"},
            {"key": "b", "value": 3, "unit": "ms"}
        ]"#;
        let metrics = Metrics::decode(output).unwrap();
        let keys: Vec<&str> = metrics.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, ["b", "a", "b"]);
        assert_eq!(metrics[2].unit, "ms");
    }

    #[test]
    fn decode_empty_array() {
        let metrics = Metrics::decode(b"[]\n").unwrap();
        assert!(metrics.is_empty());
    }

    #[test]
    fn decode_ignores_unknown_fields() {
        let metrics =
            Metrics::decode(br#"[{"key":"k","value":1.0,"unit":"u","extra":true}]"#).unwrap();
        assert_eq!(metrics[0], Metric::new("k", 1.0, "u"));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(Metrics::decode(b"not json").is_err());
    }

    #[test]
    fn decode_rejects_object() {
        assert!(Metrics::decode(br#"{"key":"k","value":1,"unit":"u"}"#).is_err());
    }

    #[test]
    fn decode_rejects_missing_value() {
        assert!(Metrics::decode(br#"[{"key":"k","unit":"u"}]"#).is_err());
    }

    #[test]
    fn decode_ignores_output_after_the_array() {
        let output = b"[{\"key\":\"k\",\"value\":1,\"unit\":\"u\"}]\nwarning: slow\n";
        let metrics = Metrics::decode(output).unwrap();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0], Metric::new("k", 1.0, "u"));

        assert!(Metrics::decode(b"[] [1, 2]").unwrap().is_empty());
    }

    #[test]
    fn decode_rejects_empty_output() {
        assert!(matches!(Metrics::decode(b""), Err(DecodeError::Empty)));
        assert!(matches!(Metrics::decode(b" \n\t"), Err(DecodeError::Empty)));
    }

    #[test]
    fn decode_rejects_null() {
        assert!(matches!(Metrics::decode(b"null"), Err(DecodeError::Json(_))));
    }

    #[test]
    fn decode_rejects_garbage_before_the_array() {
        assert!(Metrics::decode(b"warning: slow\n[]").is_err());
    }

    #[test]
    fn find_returns_first_match() {
        let metrics: Metrics = vec![
            Metric::new("dup", 1.0, "s"),
            Metric::new("other", 5.0, "s"),
            Metric::new("dup", 2.0, "s"),
        ]
        .into();

        assert_eq!(metrics.find("dup").map(|m| m.value), Some(1.0));
        assert_eq!(metrics.find("other").map(|m| m.value), Some(5.0));
        assert!(metrics.find("missing").is_none());
    }
}
