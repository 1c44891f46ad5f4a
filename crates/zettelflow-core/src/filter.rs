//! `key==value` selection on note metadata

use crate::error::{PipelineError, PipelineResult};
use serde_yaml::Value;
use std::fmt;
use std::str::FromStr;

/// Keeps notes whose metadata has `key` equal to `value`, or, when the field
/// is a list, containing `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFilter {
    pub key: String,
    pub value: String,
}

impl MetadataFilter {
    /// Parse `key==value`. Surrounding whitespace on either side is ignored.
    pub fn parse(expr: &str) -> PipelineResult<Self> {
        let (key, value) = expr.split_once("==").ok_or_else(|| {
            PipelineError::configuration(format!(
                "invalid filter '{expr}', expected key==value"
            ))
        })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(PipelineError::configuration(format!(
                "invalid filter '{expr}', key is empty"
            )));
        }

        Ok(Self {
            key: key.to_string(),
            value: value.trim().to_string(),
        })
    }

    /// Test a metadata block. Unparseable metadata never matches.
    pub fn matches(&self, metadata: &str) -> bool {
        let Ok(Value::Mapping(map)) = serde_yaml::from_str::<Value>(metadata) else {
            return false;
        };

        match map.get(self.key.as_str()) {
            Some(Value::Sequence(items)) => items.iter().any(|item| self.scalar_eq(item)),
            Some(other) => self.scalar_eq(other),
            None => false,
        }
    }

    fn scalar_eq(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => s == &self.value,
            Value::Bool(b) => b.to_string() == self.value,
            Value::Number(n) => n.to_string() == self.value,
            _ => false,
        }
    }
}

impl FromStr for MetadataFilter {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MetadataFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=={}", self.key, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_and_value() {
        let filter = MetadataFilter::parse(" status == draft ").unwrap();
        assert_eq!(filter.key, "status");
        assert_eq!(filter.value, "draft");
        assert_eq!(filter.to_string(), "status==draft");
    }

    #[test]
    fn rejects_malformed_expressions() {
        assert!(MetadataFilter::parse("status=draft").is_err());
        assert!(MetadataFilter::parse("==draft").is_err());
    }

    #[test]
    fn matches_scalar_fields() {
        let filter = MetadataFilter::parse("status==draft").unwrap();
        assert!(filter.matches("title: A\nstatus: draft"));
        assert!(!filter.matches("title: A\nstatus: final"));
        assert!(!filter.matches("title: A"));
    }

    #[test]
    fn matches_list_membership() {
        let filter = MetadataFilter::parse("tags==rust").unwrap();
        assert!(filter.matches("tags: [notes, rust]"));
        assert!(!filter.matches("tags: []"));
    }

    #[test]
    fn matches_numbers_and_bools() {
        assert!(MetadataFilter::parse("year==2024").unwrap().matches("year: 2024"));
        assert!(MetadataFilter::parse("done==true").unwrap().matches("done: true"));
    }

    #[test]
    fn invalid_or_empty_metadata_never_matches() {
        let filter = MetadataFilter::parse("a==b").unwrap();
        assert!(!filter.matches(""));
        assert!(!filter.matches("a: [unclosed"));
        assert!(!filter.matches("- just\n- a list"));
    }
}
