use std::collections::HashMap;

use crate::model::SourceRecord;
use crate::normalize::NameNormalizer;

/// Normalized name → source records sharing that name.
///
/// Keys iterate in first-seen order and records keep fetch order within a
/// key. Same-named players are kept side by side; the matcher decides
/// between them.
#[derive(Debug, Clone, Default)]
pub struct EligibilityIndex {
    entries: Vec<(String, Vec<SourceRecord>)>,
    lookup: HashMap<String, usize>,
    record_count: usize,
}

impl EligibilityIndex {
    pub fn build(records: impl IntoIterator<Item = SourceRecord>, names: &NameNormalizer) -> Self {
        let mut index = Self::default();
        for record in records {
            let key = names.normalize(&record.name);
            let slot = match index.lookup.get(&key) {
                Some(&slot) => slot,
                None => {
                    index.entries.push((key.clone(), Vec::new()));
                    index.lookup.insert(key, index.entries.len() - 1);
                    index.entries.len() - 1
                }
            };
            index.entries[slot].1.push(record);
            index.record_count += 1;
        }
        index
    }

    /// Records filed under `key`; empty when the key is absent.
    pub fn candidates(&self, key: &str) -> &[SourceRecord] {
        self.lookup
            .get(key)
            .map(|&slot| self.entries[slot].1.as_slice())
            .unwrap_or(&[])
    }

    /// `(key, records)` pairs in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[SourceRecord])> {
        self.entries
            .iter()
            .map(|(key, records)| (key.as_str(), records.as_slice()))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }
}
