//! Key-value records of episode statistics.
use crate::error::RolloutError;
use chrono::prelude::{DateTime, Local};
use std::collections::{
    hash_map::{Iter, Keys},
    HashMap,
};

/// Represents possible types of values that can be stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single floating-point value, e.g. the return of an episode.
    Scalar(f64),

    /// A timestamp with local timezone.
    DateTime(DateTime<Local>),

    /// A text value.
    String(String),
}

/// A container of key-value pairs of various data types.
///
/// ```rust
/// use phoenix_core::record::{Record, RecordValue};
///
/// let mut record = Record::from_scalar("Episode return", 5.0);
/// record.insert("Episode length", RecordValue::Scalar(1.0));
///
/// assert_eq!(record.get_scalar("Episode return").unwrap(), 5.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f64) -> Self {
        let mut record = Self::empty();
        record.insert(name, RecordValue::Scalar(value));
        record
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Returns an iterator over the keys in the record.
    pub fn keys(&self) -> Keys<String, RecordValue> {
        self.0.keys()
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Merges two records, consuming both.
    ///
    /// Values of `record` overwrite values of `self` with the same key.
    pub fn merge(self, record: Record) -> Self {
        Record(self.0.into_iter().chain(record.0).collect())
    }

    /// Gets a scalar value from the record.
    pub fn get_scalar(&self, k: &str) -> Result<f64, RolloutError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(RolloutError::RecordValueTypeError("Scalar".to_string())),
            None => Err(RolloutError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a string value from the record.
    pub fn get_string(&self, k: &str) -> Result<String, RolloutError> {
        match self.0.get(k) {
            Some(RecordValue::String(s)) => Ok(s.clone()),
            Some(_) => Err(RolloutError::RecordValueTypeError("String".to_string())),
            None => Err(RolloutError::RecordKeyError(k.to_string())),
        }
    }

    /// Checks if the record is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_errors() {
        let record = Record::from_slice(&[
            ("Episode return", RecordValue::Scalar(1.5)),
            ("Env", RecordValue::String("DroneHoverBulletEnv-v0".to_string())),
        ]);
        assert_eq!(record.get_scalar("Episode return"), Ok(1.5));
        assert_eq!(
            record.get_scalar("Env"),
            Err(RolloutError::RecordValueTypeError("Scalar".to_string()))
        );
        assert_eq!(
            record.get_scalar("Episode cost"),
            Err(RolloutError::RecordKeyError("Episode cost".to_string()))
        );
    }

    #[test]
    fn test_merge_overwrites() {
        let a = Record::from_scalar("x", 1.0).merge(Record::from_scalar("y", 2.0));
        let b = a.merge(Record::from_scalar("x", 3.0));
        assert_eq!(b.len(), 2);
        assert_eq!(b.get_scalar("x"), Ok(3.0));
        assert_eq!(b.get_scalar("y"), Ok(2.0));
    }
}
