//! Field-level validation messages

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::types::{AppError, AppResult};

/// Validation messages keyed by field path (`montant`, `cotisations.2.mois`)
///
/// Validation runs to completion and collects every failure before anything
/// is persisted; [`FieldErrors::into_result`] turns a non-empty collection
/// into a single [`AppError`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Merge another collection as is
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Merge another collection, prefixing its fields (`prefix.field`)
    pub fn merge_prefixed(&mut self, prefix: &str, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0
                .entry(format!("{prefix}.{field}"))
                .or_default()
                .extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one message
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn first_message(&self) -> Option<String> {
        self.0.values().flat_map(|v| v.iter()).next().cloned()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error
    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::invalid_fields(&self))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_merge_prefixed() {
        let mut item = FieldErrors::new();
        item.add("montant", "negative");

        let mut batch = FieldErrors::new();
        batch.merge_prefixed("cotisations.1", item);

        assert!(batch.contains("cotisations.1.montant"));
        assert_eq!(batch.get("cotisations.1.montant").unwrap(), ["negative"]);
    }

    #[test]
    fn test_serializes_as_object() {
        let mut errors = FieldErrors::new();
        errors.add("nom", "required");
        let json = serde_json::to_string(&errors).unwrap();
        assert_eq!(json, r#"{"nom":["required"]}"#);
    }
}
