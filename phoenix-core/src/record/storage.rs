//! Aggregation of stored records.
use super::{Record, RecordValue};
use std::collections::BTreeSet;

/// A storage of records with aggregation.
///
/// Scalars stored under the same key are summarized by their minimum,
/// maximum, mean and median. For other value types the most recent value is
/// kept.
#[derive(Debug, Default)]
pub struct RecordStorage {
    data: Vec<Record>,
}

fn min(vs: &[f64]) -> RecordValue {
    RecordValue::Scalar(vs.iter().cloned().fold(f64::INFINITY, f64::min))
}

fn max(vs: &[f64]) -> RecordValue {
    RecordValue::Scalar(vs.iter().cloned().fold(f64::NEG_INFINITY, f64::max))
}

fn mean(vs: &[f64]) -> RecordValue {
    RecordValue::Scalar(vs.iter().sum::<f64>() / vs.len() as f64)
}

fn median(mut vs: Vec<f64>) -> RecordValue {
    vs.sort_by(|x, y| x.total_cmp(y));
    RecordValue::Scalar(vs[vs.len() / 2])
}

impl RecordStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self { data: vec![] }
    }

    /// Stores a record.
    pub fn store(&mut self, record: Record) {
        self.data.push(record);
    }

    fn keys(&self) -> BTreeSet<String> {
        self.data
            .iter()
            .flat_map(|record| record.keys().cloned())
            .collect()
    }

    fn latest(&self, key: &str) -> Option<&RecordValue> {
        self.data.iter().rev().find_map(|record| record.get(key))
    }

    fn scalar(&self, key: &str) -> Record {
        let vs: Vec<f64> = self
            .data
            .iter()
            .filter_map(|record| match record.get(key) {
                Some(RecordValue::Scalar(v)) => Some(*v),
                _ => None,
            })
            .collect();

        if vs.len() == 1 {
            Record::from_scalar(key, vs[0])
        } else {
            Record::from_slice(&[
                (format!("{}_min", key), min(&vs)),
                (format!("{}_max", key), max(&vs)),
                (format!("{}_mean", key), mean(&vs)),
                (format!("{}_median", key), median(vs)),
            ])
        }
    }

    /// Aggregates all stored records and clears the storage.
    pub fn aggregate(&mut self) -> Record {
        let mut record = Record::empty();

        for key in self.keys().iter() {
            let r = match self.latest(key) {
                Some(RecordValue::Scalar(..)) => self.scalar(key),
                Some(value) => Record::from_slice(&[(key.as_str(), value.clone())]),
                None => continue,
            };
            record = record.merge(r);
        }

        self.data = vec![];

        record
    }
}
